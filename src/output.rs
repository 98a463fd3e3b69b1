//! Result tables on disk.

use clap::ValueEnum;
use itm::Prediction;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    #[default]
    Csv,
    Json,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Json => "json",
        }
    }
}

/// Writes the table of one site into `directory` (created if needed), as
/// `<site>.csv` or `<site>.json`. Returns the path written.
pub fn write_site(
    directory: &Path,
    site: &str,
    rows: &[Prediction],
    format: Format,
) -> Result<PathBuf, Error> {
    let path = directory.join(format!("{site}.{}", format.extension()));
    let io = |source: std::io::Error| Error::Write {
        path: path.clone(),
        source,
    };

    fs::create_dir_all(directory).map_err(io)?;
    let mut out = BufWriter::new(File::create(&path).map_err(io)?);

    match format {
        Format::Csv => write_csv(&mut out, rows).map_err(io)?,
        Format::Json => serde_json::to_writer_pretty(&mut out, rows)?,
    }

    out.flush().map_err(io)?;
    Ok(path)
}

/// Floats are written in their shortest form that reads back exactly.
fn write_csv(out: &mut impl Write, rows: &[Prediction]) -> std::io::Result<()> {
    writeln!(out, "distance_km,confidence_level_%,propagation_loss_dB")?;
    for row in rows {
        writeln!(out, "{},{},{}", row.distance_km, row.confidence, row.loss_db)?;
    }
    Ok(())
}
