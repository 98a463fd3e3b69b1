//! Longley-Rice area predictions from scenario files.
//!
//! Reads a JSON scenario (or uses the built-in reference scenario), estimates
//! the terrain irregularity around each site, runs the area mode of the ITM
//! over the scenario's distances, and writes one loss table per site.
//!
//! Usage:
//!   itm-area --config scenario.json --output tables --format csv

#![forbid(unsafe_code)]

mod config;
mod error;
mod output;
mod terrain;

use anyhow::Result;
use clap::Parser;
use itm::{predict, AreaPrediction, Warning};
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::{ScenarioConfig, Site};
use error::Error;
use output::Format;
use terrain::TerrainSource;

#[derive(Parser, Debug)]
#[command(
    name = "itm-area",
    about = "Longley-Rice area mode: propagation loss versus distance"
)]
struct Args {
    /// Scenario file (JSON); the reference scenario when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to write one table per site into
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Table format
    #[arg(short, long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let written = run(&args)?;
    info!("wrote {} tables to {:?}", written.len(), args.output);

    Ok(())
}

fn run(args: &Args) -> Result<Vec<PathBuf>, Error> {
    let config = match &args.config {
        Some(path) => {
            info!("loading scenario from {:?}", path);
            ScenarioConfig::load(path)?
        }
        None => {
            info!("no scenario given, using the reference scenario");
            ScenarioConfig::default()
        }
    };

    let sites = config.sites()?;
    let terrain = config.terrain.source()?;

    let predictions = sites
        .par_iter()
        .map(|site| predict_site(&config, terrain.as_ref(), site))
        .collect::<Result<Vec<_>, Error>>()?;

    let mut written = Vec::with_capacity(sites.len());
    for (site, prediction) in sites.iter().zip(predictions) {
        if prediction.warning > Warning::None {
            warn!(site = %site.name, warning = %prediction.warning, "results may be unreliable");
        } else {
            info!(site = %site.name, rows = prediction.rows.len(), "predicted");
        }

        written.push(output::write_site(
            &args.output,
            &site.name,
            &prediction.rows,
            args.format,
        )?);
    }

    Ok(written)
}

fn predict_site(
    config: &ScenarioConfig,
    terrain: &dyn TerrainSource,
    site: &Site,
) -> Result<AreaPrediction, Error> {
    let dh = terrain
        .irregularity(site.position, site.radius)
        .map_err(|source| Error::Terrain {
            site: site.name.clone(),
            source,
        })?;

    info!(site = %site.name, dh, "terrain irregularity");
    Ok(predict(&config.scenario(dh)?))
}
