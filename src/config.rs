//! Scenario files.
//!
//! A scenario is a JSON document; every field has a default, so a file only
//! needs to name what differs from the reference scenario (a 20 MHz broadcast
//! link between two very carefully sited low antennas over terrain with an
//! irregularity of 102 m). Radio parameters use the integer codes of the ITM.

use geo::Point;
use itm::{
    AreaScenario, Climate, DistanceSweep, ImpedanceRule, Polarisation, Settings, SitingCriteria,
    Variability, Warning,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

use crate::error::Error;
use crate::terrain::{FixedIrregularity, RadialProfiles, TerrainSource};

/// Most distances a sweep may ask for.
const MAX_DISTANCES: usize = 100_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Antenna heights above ground (m).
    pub heights: (f64, f64),

    /// Frequency (MHz).
    pub frequency: f64,

    /// Surface refractivity (N-units).
    pub surface_refractivity: f64,

    /// Average system elevation above sea level (m).
    pub general_elevation: f64,

    /// Relative permittivity of the ground.
    pub permittivity: f64,

    /// Ground conductivity (S/m).
    pub conductivity: f64,

    /// 1 equatorial, 2 continental subtropical, 3 maritime subtropical,
    /// 4 desert, 5 continental temperate, 6 maritime temperate over land,
    /// 7 maritime temperate over sea.
    pub climate: i32,

    /// 0 horizontal, anything else vertical.
    pub polarisation: i32,

    /// 0 single message, 1 accidental, 2 mobile, 3 broadcast; +10 without
    /// location variability, +20 without situation variability.
    pub variability: i32,

    /// 0 random, 1 careful, 2 very careful.
    pub siting: (i32, i32),

    pub impedance: ImpedanceRule,

    /// Percentage of time.
    pub time: f64,

    /// Percentage of locations.
    pub location: f64,

    /// Confidence levels (%).
    pub confidences: Vec<f64>,

    /// Distances (km).
    pub sweep: DistanceSweep,

    pub terrain: TerrainConfig,

    pub sites: Vec<SiteConfig>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            heights: (3.3, 1.3),
            frequency: 20.0,
            surface_refractivity: 301.0,
            general_elevation: 0.0,
            permittivity: 15.0,
            conductivity: 0.001,
            climate: 5,
            polarisation: 1,
            variability: 3,
            siting: (2, 2),
            impedance: ImpedanceRule::RealRoot,
            time: 50.0,
            location: 50.0,
            confidences: vec![50.0, 90.0, 10.0],
            sweep: DistanceSweep::default(),
            terrain: TerrainConfig::default(),
            sites: vec![SiteConfig::default()],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TerrainConfig {
    /// Known terrain irregularity (m), the same for every site.
    Fixed { irregularity: f64 },

    /// Elevation profiles (m) sampled every `interval` metres along radials
    /// from `origin` (longitude, latitude).
    Radials {
        origin: (f64, f64),
        interval: f64,
        radials: Vec<Vec<f64>>,
    },
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig::Fixed {
            irregularity: 102.0,
        }
    }
}

impl TerrainConfig {
    pub fn source(&self) -> Result<Box<dyn TerrainSource>, Error> {
        Ok(match self {
            TerrainConfig::Fixed { irregularity } => {
                if *irregularity < 0.0 {
                    return Err(Error::Config(format!(
                        "terrain irregularity must not be negative, got {irregularity}"
                    )));
                }
                Box::new(FixedIrregularity(*irregularity))
            }
            TerrainConfig::Radials {
                origin,
                interval,
                radials,
            } => {
                if *interval <= 0.0 {
                    return Err(itm::InputError::Interval(*interval).into());
                }
                Box::new(RadialProfiles {
                    origin: Point::new(origin.0, origin.1),
                    interval: *interval,
                    radials: radials.clone(),
                })
            }
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,

    /// Longitude, latitude (degrees).
    pub position: (f64, f64),

    /// How far around the site terrain is considered (m).
    #[serde(default = "default_radius")]
    pub radius: f64,
}

fn default_radius() -> f64 {
    20e3
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "area".into(),
            position: (0.0, 0.0),
            radius: default_radius(),
        }
    }
}

/// A place to predict around.
#[derive(Clone, Debug, PartialEq)]
pub struct Site {
    /// Where it is
    pub position: Point<f64>,

    /// How far around it terrain matters (m)
    pub radius: f64,

    /// What it's called
    pub name: String,
}

impl ScenarioConfig {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.into(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|source| Error::ParseConfig {
            path: path.into(),
            source,
        })
    }

    /// Validates the radio parameters into model settings.
    ///
    /// Impossible climate and variability codes are replaced by the ITM
    /// defaults; the returned warning says so.
    pub fn settings(&self) -> Result<(Settings, Warning), Error> {
        let mut warning = Warning::None;

        if self.frequency.is_nan() || self.frequency <= 0.0 {
            return Err(Error::Config(format!(
                "frequency must be positive, got {}",
                self.frequency
            )));
        }

        let climate = Climate::from_code(self.climate).unwrap_or_else(|err| {
            warn!(%err, "using the default climate");
            warning.raise(Warning::Substituted);
            Climate::default()
        });

        let (variability, substituted) = Variability::from_code_or_default(self.variability);
        if substituted != Warning::None {
            warn!(code = self.variability, "using single message variability");
        }
        warning.raise(substituted);

        let settings = Settings {
            permittivity: self.permittivity,
            conductivity: self.conductivity,
            climate,
            surface_refractivity: self.surface_refractivity,
            frequency: self.frequency,
            polarisation: Polarisation::from_code(self.polarisation),
            variability,
            impedance: self.impedance,
        };

        Ok((settings, warning))
    }

    /// Builds the area scenario of one site.
    pub fn scenario(&self, terrain_irregularity: f64) -> Result<AreaScenario, Error> {
        let (settings, input_warning) = self.settings()?;

        for h in [self.heights.0, self.heights.1] {
            if h.is_nan() || h <= 0.0 {
                return Err(Error::Config(format!("antenna heights must be positive, got {h}")));
            }
        }

        let percentages = [self.time, self.location]
            .into_iter()
            .chain(self.confidences.iter().copied());
        for p in percentages {
            if p.is_nan() || p <= 0.0 || p >= 100.0 {
                return Err(Error::Config(format!(
                    "percentages must be strictly between 0 and 100, got {p}"
                )));
            }
        }

        if self.confidences.is_empty() {
            return Err(Error::Config("no confidence levels".into()));
        }

        let sweep = self.sweep;
        let bounds = [
            sweep.start,
            sweep.first_step,
            sweep.first_end,
            sweep.second_step,
            sweep.second_end,
        ];
        if bounds.iter().any(|d| !d.is_finite()) {
            return Err(Error::Config(format!("sweep distances must be finite, got {sweep:?}")));
        }
        let count = sweep.count();
        if count > MAX_DISTANCES {
            return Err(Error::Config(format!(
                "sweep asks for {count} distances, at most {MAX_DISTANCES} are allowed"
            )));
        }

        Ok(AreaScenario {
            settings,
            heights: self.heights,
            siting: (
                SitingCriteria::from_code(self.siting.0)?,
                SitingCriteria::from_code(self.siting.1)?,
            ),
            terrain_irregularity,
            general_elevation: self.general_elevation,
            time: self.time,
            location: self.location,
            confidences: self.confidences.clone(),
            sweep,
            input_warning,
        })
    }

    /// Sites to predict around. Names become file names, so they must be
    /// present and distinct.
    pub fn sites(&self) -> Result<Vec<Site>, Error> {
        let mut seen = HashSet::new();
        self.sites
            .iter()
            .map(|site| {
                let name = site.name.trim();
                if name.is_empty() || name.contains(['/', '\\']) {
                    return Err(Error::Config(format!("bad site name {:?}", site.name)));
                }
                if !seen.insert(name) {
                    return Err(Error::Config(format!("duplicate site name {name:?}")));
                }

                Ok(Site {
                    position: Point::new(site.position.0, site.position.1),
                    radius: site.radius,
                    name: name.to_string(),
                })
            })
            .collect()
    }
}
