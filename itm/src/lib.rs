//! The Longley-Rice Irregular Terrain Model for RF.
//!
//! This is the [Irregular Terrain Model][ITM68] (ITM), also known as
//! Longley-Rice, an empirical RF propagation model developed at the U.S.
//! National Telecommunications and Information Administration around the
//! 1960s by Anita Longley and Phil Rice. It follows version 1.2.2 of the
//! algorithm. Sections of the [LaTeX documentation][ITM122] of that version
//! are referenced with `<N>` in the code, and George Hufford's 1999 memo
//! describing “[The Algorithm][GH1999]” is referenced as T.A.
//!
//! Both modes of the model are available:
//!
//!  - **area mode** ([`area`]), where the terrain is only described by its
//!    irregularity and the siting of the antennas, and attenuation is wanted
//!    over a range of distances;
//!
//!  - **point-to-point mode** ([`profile`]), where an elevation profile
//!    between the two terminals is known.
//!
//! All state lives in a [`Model`] value: there is nothing global, so as many
//! models as wanted can be computed concurrently.
//!
//! This implementation is released in the Public Domain, although note that the
//! NTIA requests any use of the ITM is properly credited.
//!
//! [GH1999]: https://www.its.bldrdoc.gov/media/50676/itm_alg.pdf
//! [ITM122]: https://www.its.bldrdoc.gov/media/50674/itm.pdf
//! [ITM68]: https://www.its.bldrdoc.gov/resources/radio-propagation-software/itm/itm.aspx

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod area;
pub mod climate;
pub mod diffraction;
pub mod environment;
pub mod error;
pub mod formulae;
pub mod geometry;
pub mod irregularity;
pub mod line_of_sight;
pub mod profile;
pub mod propagation;
pub mod scatter;
pub mod variability;
pub mod warning;

pub use area::{predict, AreaPrediction, AreaScenario, DistanceSweep, Prediction};
pub use climate::Climate;
pub use diffraction::{height_gain, knife_edge};
pub use environment::{Environment, ImpedanceRule};
pub use error::InputError;
pub use formulae::{inverse_normal_complementary, inverse_normal_complementary_each};
pub use geometry::{Geometry, Mode, SitingCriteria};
pub use irregularity::interdecile_range;
pub use profile::{point_to_point, Dominant, PathMode, PointToPoint, Profile};
pub use propagation::Regime;
pub use variability::{ModeOfVariability, Refresh, Variability};
pub use warning::Warning;

use diffraction::Diffraction;
use propagation::{DiffractionFit, Horizons, LineOfSightFit, ScatterFit};
use variability::Statistics;

/// The polarisation of the radio wave.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Polarisation {
    #[default]
    Horizontal,
    Vertical,
}

impl Polarisation {
    /// ITM flag: zero is horizontal, anything else vertical.
    pub fn from_code(code: i32) -> Self {
        if code == 0 {
            Polarisation::Horizontal
        } else {
            Polarisation::Vertical
        }
    }
}

/// Input settings for the model.
///
/// Refer to [ITU-R P.527] to derive ground permittivity and conductivity for
/// your region/terrain and frequency.
///
/// [ITU-R P.527]: https://www.itu.int/dms_pubrec/itu-r/rec/p/R-REC-P.527-4-201706-I!!PDF-E.pdf
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    /// Relative permittivity of the ground (aka "dielectric constant").
    pub permittivity: f64,

    /// Conductivity of the ground (in siemens per metre).
    pub conductivity: f64,

    /// Type of climate.
    pub climate: Climate,

    /// Surface refractivity reduced to sea level (N-units).
    pub surface_refractivity: f64,

    /// Frequency of modeled wave (MHz).
    pub frequency: f64,

    /// Polarisation of modeled wave.
    pub polarisation: Polarisation,

    /// How time, location and situation variability combine.
    pub variability: Variability,

    /// How to derive the ground impedance.
    pub impedance: ImpedanceRule,
}

/// Propagation model instance.
///
/// Holds all state related to one instance of the Irregular Terrain Model:
/// the derived environment and geometry, the fitted attenuation curves, the
/// cached statistics, and the warning accumulated so far.
///
/// Query it with [`Model::attenuation_at`] at non-decreasing distances, each
/// followed by any number of [`Model::variability`] queries.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    settings: Settings,
    environment: Environment,
    geometry: Geometry,
    horizons: Horizons,

    diffraction: DiffractionFit,
    line_of_sight: Option<LineOfSightFit>,
    scatter: Option<ScatterFit>,

    distance: f64,  // <dist>
    reference: f64, // <aref>

    statistics: Statistics,
    refresh: Refresh,

    warning: Warning,
}

impl Model {
    /// Creates a model over a derived environment and geometry.
    ///
    /// The diffraction line is fitted and the inputs are range-checked
    /// immediately; see [`Model::warning`].
    pub fn new(settings: Settings, environment: Environment, geometry: Geometry) -> Self {
        let horizons = Horizons::new(&environment, &geometry);
        let diffraction = Diffraction::new(&environment, &geometry, &horizons);
        let diffraction = DiffractionFit::new(&diffraction, &horizons);

        let mut model = Self {
            settings,
            environment,
            geometry,
            horizons,
            diffraction,
            line_of_sight: None,
            scatter: None,
            distance: 0.0,
            reference: 0.0,
            statistics: Statistics::default(),
            refresh: Refresh::Climate,
            warning: Warning::None,
        };

        model.check_path();
        debug!(
            dlsa = horizons.smooth_earth_total,
            dla = horizons.total,
            tha = horizons.bending,
            warning = ?model.warning,
            "model ready"
        );

        model
    }

    /// Creates an area-mode model.
    ///
    ///  - `general_elevation` is the mean elevation of the system above sea
    ///    level, used to correct the surface refractivity;
    ///
    ///  - `heights` are the structural heights of the antennas, and `siting`
    ///    how carefully they were placed;
    ///
    ///  - `terrain_irregularity` is the interdecile range of elevations (m).
    pub fn area(
        settings: Settings,
        general_elevation: f64,
        heights: (f64, f64),
        siting: (SitingCriteria, SitingCriteria),
        terrain_irregularity: f64,
    ) -> Self {
        let environment = Environment::new(&settings, general_elevation);
        let geometry = Geometry::area(heights, siting, terrain_irregularity, &environment);
        Self::new(settings, environment, geometry)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn horizons(&self) -> &Horizons {
        &self.horizons
    }

    /// Distance of the last attenuation query.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Reference attenuation at the last queried distance.
    pub fn reference_attenuation(&self) -> f64 {
        self.reference
    }

    /// Free-space basic transmission loss (dB) at the last queried distance.
    pub fn free_space_loss(&self) -> f64 {
        8.685890 * (2.0 * self.environment.wave_number * self.distance).ln()
    }

    /// Worst warning raised so far.
    pub fn warning(&self) -> Warning {
        self.warning
    }

    /// Merges a warning into the model's, for conditions noticed outside of
    /// it (such as substituted inputs).
    pub fn raise(&mut self, level: Warning) {
        if level > self.warning {
            debug!(?level, distance = self.distance, "warning raised");
        }
        self.warning.raise(level);
    }
}
