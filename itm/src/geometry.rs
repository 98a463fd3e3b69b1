//! Path geometry: effective heights, horizons, terrain irregularity.
//!
//! There are two ways to get there. In area mode the terrain is only known
//! statistically (through its irregularity) and the horizons are estimated
//! from empirical formulae, depending on how carefully the terminals were
//! sited. In point-to-point mode they are read off an elevation profile: see
//! [`Geometry::from_profile`](crate::profile).
//!
//! See ITM sections `<42>` through `<47>`.

use crate::environment::Environment;
use crate::error::InputError;
use serde::{Deserialize, Serialize};

/// How carefully a terminal was placed relative to the terrain around it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SitingCriteria {
    #[default]
    Random,
    Careful,
    VeryCareful,
}

impl SitingCriteria {
    /// Parses the ITM integer code (0 random, 1 careful, 2 very careful).
    pub fn from_code(code: i32) -> Result<Self, InputError> {
        match code {
            0 => Ok(SitingCriteria::Random),
            1 => Ok(SitingCriteria::Careful),
            2 => Ok(SitingCriteria::VeryCareful),
            _ => Err(InputError::UnknownSiting(code)),
        }
    }
}

/// Which kind of inputs the geometry was derived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Area,
    PointToPoint,
}

/// Geometry of a path, per terminal as _(tx, rx)_ pairs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    pub mode: Mode,

    /// Structural heights of the antennas above ground.
    pub heights: (f64, f64), // <hg>

    /// Terminal effective heights: adjusted against horizons (or obstructions).
    pub effective_heights: (f64, f64), // <he>

    /// Distances from each terminal to its radio horizon.
    pub horizon_distances: (f64, f64), // <dl>

    /// Elevation angles of the horizons from each terminal at the heights of
    /// the antennas, in radians.
    pub elevation_angles: (f64, f64), // <the>

    /// Interdecile range of terrain elevations.
    pub terrain_irregularity: f64, // <dh>

    /// Path length. Only known in point-to-point mode: zero for area mode.
    pub length: f64, // <dist>
}

impl Geometry {
    /// Area mode: estimates effective heights and horizons from siting.
    ///
    /// See ITM section `<42>` (qlra).
    pub fn area(
        heights: (f64, f64),
        siting: (SitingCriteria, SitingCriteria),
        terrain_irregularity: f64,
        environment: &Environment,
    ) -> Self {
        fn effective_height(hg: f64, siting: SitingCriteria, dh: f64) -> f64 {
            let mut q = match siting {
                SitingCriteria::Random => return hg,
                SitingCriteria::Careful => 4.0,
                SitingCriteria::VeryCareful => 9.0,
            };

            if hg < 5.0 {
                q *= (0.3141593 * hg).sin();
            }

            hg + (1.0 + q) * (-(20f64.min(2.0 * hg / dh.max(1e-3)))).exp()
        }

        let dh = terrain_irregularity;
        let gme = environment.effective_curvature;
        let he = (
            effective_height(heights.0, siting.0, dh),
            effective_height(heights.1, siting.1, dh),
        );
        let dl = (
            empirical_horizon_distance(he.0, gme, dh),
            empirical_horizon_distance(he.1, gme, dh),
        );

        Self {
            mode: Mode::Area,
            heights,
            effective_heights: he,
            horizon_distances: dl,
            elevation_angles: (
                empirical_elevation_angle(he.0, dl.0, gme, dh),
                empirical_elevation_angle(he.1, dl.1, gme, dh),
            ),
            terrain_irregularity,
            length: 0.0,
        }
    }
}

/// Horizon distance from a terminal over terrain of irregularity `dh`.
///
/// Smooth-earth horizon reduced by the terrain. Fig/3.3 in T.A.
pub(crate) fn empirical_horizon_distance(he: f64, gme: f64, dh: f64) -> f64 {
    (2.0 * he / gme).sqrt() * (-0.07 * (dh / he.max(5.0)).sqrt()).exp()
}

/// Horizon elevation angle from a terminal. Fig/3.4 in T.A.
pub(crate) fn empirical_elevation_angle(he: f64, dl: f64, gme: f64, dh: f64) -> f64 {
    let q = (2.0 * he / gme).sqrt();
    (0.65 * dh * (q / dl - 1.0) - 2.0 * he) / q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Climate, ImpedanceRule, Polarisation, Settings, Variability};
    use approx::assert_relative_eq;

    fn environment() -> Environment {
        let settings = Settings {
            permittivity: 15.0,
            conductivity: 0.001,
            climate: Climate::ContinentalTemperate,
            surface_refractivity: 301.0,
            frequency: 20.0,
            polarisation: Polarisation::Vertical,
            variability: Variability::default(),
            impedance: ImpedanceRule::RealRoot,
        };
        Environment::new(&settings, 0.0)
    }

    #[test]
    fn very_careful_siting() {
        let g = Geometry::area(
            (3.3, 1.3),
            (SitingCriteria::VeryCareful, SitingCriteria::VeryCareful),
            102.0,
            &environment(),
        );

        assert_relative_eq!(g.effective_heights.0, 11.498639094803742, max_relative = 1e-12);
        assert_relative_eq!(g.effective_heights.1, 5.759204322989962, max_relative = 1e-12);
        assert_relative_eq!(g.horizon_distances.0, 11345.173927944848, max_relative = 1e-12);
        assert_relative_eq!(g.horizon_distances.1, 7366.727439513914, max_relative = 1e-12);
        assert_relative_eq!(g.elevation_angles.0, -0.0005458450533421674, max_relative = 1e-9);
        assert_relative_eq!(g.elevation_angles.1, 0.0011318367943851503, max_relative = 1e-9);
    }

    #[test]
    fn random_siting_keeps_structural_height() {
        let g = Geometry::area(
            (10.0, 2.0),
            (SitingCriteria::Random, SitingCriteria::Careful),
            90.0,
            &environment(),
        );

        assert_eq!(g.effective_heights.0, 10.0);
        assert!(g.effective_heights.1 > 2.0);
        assert_eq!(g.mode, Mode::Area);
    }

    #[test]
    fn siting_codes() {
        assert_eq!(SitingCriteria::from_code(2).unwrap(), SitingCriteria::VeryCareful);
        assert!(SitingCriteria::from_code(3).is_err());
    }
}
