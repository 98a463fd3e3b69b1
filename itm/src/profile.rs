//! Point-to-point mode: a known elevation profile between the terminals.

use crate::environment::Environment;
use crate::error::InputError;
use crate::formulae::{fortran_dim, inverse_normal_complementary, least_squares_linear_fit};
use crate::geometry::{empirical_elevation_angle, empirical_horizon_distance, Geometry, Mode};
use crate::irregularity::interdecile_range;
use crate::{Model, Regime, Settings, Warning};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Equally spaced ground elevations from the transmitter to the receiver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Distance between two samples (m).
    pub interval: f64,
    /// Elevations above sea level (m), transmitter first.
    pub elevations: Vec<f64>,
}

impl Profile {
    pub fn new(interval: f64, elevations: Vec<f64>) -> Result<Self, InputError> {
        if elevations.len() < 2 {
            return Err(InputError::ShortProfile(elevations.len()));
        }

        if interval.is_nan() || interval <= 0.0 {
            return Err(InputError::Interval(interval));
        }

        Ok(Self {
            interval,
            elevations,
        })
    }

    /// Number of intervals. <np>
    fn intervals(&self) -> usize {
        self.elevations.len() - 1
    }

    /// Path length (m).
    pub fn length(&self) -> f64 {
        self.intervals() as f64 * self.interval
    }

    /// Mean elevation of the central part of the profile, used as the system
    /// elevation for refractivity.
    pub fn general_elevation(&self) -> f64 {
        let np = self.intervals();
        let ja = (3.0 + 0.1 * np as f64) as usize;
        let jb = (np + 6).saturating_sub(ja);

        let from = (ja - 3).min(np);
        let to = (jb - 2).clamp(from + 1, np + 1);
        let centre = &self.elevations[from..to];
        centre.iter().sum::<f64>() / centre.len() as f64
    }
}

impl Geometry {
    /// Point-to-point mode: finds horizons, effective heights and terrain
    /// irregularity along a profile.
    ///
    /// See ITM sections `<43>` through `<47>` (qlrpfl, hzns).
    pub fn from_profile(heights: (f64, f64), profile: &Profile, environment: &Environment) -> Self {
        let gme = environment.effective_curvature;
        let pfl = &profile.elevations;
        let np = profile.intervals();
        let interval = profile.interval;
        let length = profile.length();

        let (mut the, mut dl) = find_horizons(heights, profile, gme);

        fn make_xl(hg: f64, dl: f64) -> f64 {
            (15.0 * hg).min(0.1 * dl)
        }

        let xl = (make_xl(heights.0, dl.0), length - make_xl(heights.1, dl.1));
        let dh = interdecile_range(pfl, interval, xl);

        let he;
        if dl.0 + dl.1 > 1.5 * length {
            // line of sight: redo the horizons with the area-mode formulae <45>
            let (za, zb) = least_squares_linear_fit(interval, pfl, xl);
            let mut h = (
                heights.0 + fortran_dim(pfl[0], za),
                heights.1 + fortran_dim(pfl[np], zb),
            );
            dl = (
                empirical_horizon_distance(h.0, gme, dh),
                empirical_horizon_distance(h.1, gme, dh),
            );

            let q = dl.0 + dl.1;
            if q <= length {
                // rounded horizon, or two obstructions, in the path
                let q = (length / q).powf(2.0);
                h = (h.0 * q, h.1 * q);
                dl = (
                    empirical_horizon_distance(h.0, gme, dh),
                    empirical_horizon_distance(h.1, gme, dh),
                );
            }

            the = (
                empirical_elevation_angle(h.0, dl.0, gme, dh),
                empirical_elevation_angle(h.1, dl.1, gme, dh),
            );
            he = h;
        } else {
            // transhorizon effective heights <46>
            let (za, _) = least_squares_linear_fit(interval, pfl, (xl.0, 0.9 * dl.0));
            let (_, zb) = least_squares_linear_fit(interval, pfl, (length - 0.9 * dl.1, xl.1));
            he = (
                heights.0 + fortran_dim(pfl[0], za),
                heights.1 + fortran_dim(pfl[np], zb),
            );
        }

        Self {
            mode: Mode::PointToPoint,
            heights,
            effective_heights: he,
            horizon_distances: dl,
            elevation_angles: the,
            terrain_irregularity: dh,
            length,
        }
    }
}

/// Horizon elevation angles and distances along a profile, accounting for
/// the earth's curvature.
///
/// We advance along the elevation profile looking both from the TX and from
/// the RX at the same time. The RX side only starts once the TX has found an
/// obstruction: until then the path is clear from both ends.
///
/// See ITM section `<47>` (hzns).
fn find_horizons(heights: (f64, f64), profile: &Profile, gme: f64) -> ((f64, f64), (f64, f64)) {
    let pfl = &profile.elevations;
    let np = profile.intervals();
    let length = profile.length();

    // absolute heights of terminals
    let za = pfl[0] + heights.0;
    let zb = pfl[np] + heights.1;

    let qc = 0.5 * gme;
    let q = qc * length;
    let slope = (zb - za) / length;

    let mut the = (slope - q, -slope - q);
    let mut dl = (length, length);

    if np < 2 {
        return (the, dl);
    }

    let mut sa = 0.0;
    let mut sb = length;
    let mut clear = true;

    for &z in &pfl[1..np] {
        sa += profile.interval;
        sb -= profile.interval;

        let q = z - (qc * sa + the.0) * sa - za;
        if q > 0.0 {
            the.0 += q / sa;
            dl.0 = sa;
            clear = false;
        }

        if !clear {
            let q = z - (qc * sb + the.1) * sb - zb;
            if q > 0.0 {
                the.1 += q / sb;
                dl.1 = sb;
            }
        }
    }

    (the, dl)
}

/// What dominates the attenuation past the horizon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dominant {
    Diffraction,
    Troposcatter,
}

/// Kind of path, from the horizons found along the profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathMode {
    LineOfSight,
    SingleHorizon(Dominant),
    DoubleHorizon(Dominant),
}

impl fmt::Display for PathMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (horizons, dominant) = match self {
            PathMode::LineOfSight => return f.write_str("Line-Of-Sight Mode"),
            PathMode::SingleHorizon(d) => ("Single Horizon", d),
            PathMode::DoubleHorizon(d) => ("Double Horizon", d),
        };

        match dominant {
            Dominant::Diffraction => write!(f, "{}, Diffraction Dominant", horizons),
            Dominant::Troposcatter => write!(f, "{}, Troposcatter Dominant", horizons),
        }
    }
}

/// Result of a point-to-point computation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointToPoint {
    /// Free-space basic transmission loss (dB).
    pub free_space_loss: f64,
    /// Attenuation relative to free space (dB).
    pub attenuation: f64,
    /// Total loss (dB).
    pub loss: f64,
    pub mode: PathMode,
    pub warning: Warning,
}

/// Computes the loss over a profile.
///
///  - `heights` are the antenna heights above ground, transmitter first;
///
///  - `reliability` is the fraction of time and `confidence` the fraction of
///    situations, both in _(0, 1)_.
///
/// Location variability is taken at its median.
pub fn point_to_point(
    profile: &Profile,
    heights: (f64, f64),
    settings: &Settings,
    reliability: f64,
    confidence: f64,
) -> PointToPoint {
    let zr = inverse_normal_complementary(reliability);
    let zc = inverse_normal_complementary(confidence);

    let environment = Environment::new(settings, profile.general_elevation());
    let geometry = Geometry::from_profile(heights, profile, &environment);
    let mut model = Model::new(*settings, environment, geometry);

    let length = geometry.length;
    model.attenuation_at(length);
    let attenuation = model.variability(zr, 0.0, zc);
    let free_space_loss =
        32.45 + 20.0 * settings.frequency.log10() + 20.0 * (length / 1000.0).log10();

    PointToPoint {
        free_space_loss,
        attenuation,
        loss: free_space_loss + attenuation,
        mode: path_mode(&model),
        warning: model.warning(),
    }
}

fn path_mode(model: &Model) -> PathMode {
    let horizons = model.horizons();
    let length = model.geometry().length;

    let beyond = (length - horizons.total) as i64;
    if beyond < 0 {
        return PathMode::LineOfSight;
    }

    let dominant = match model.regime() {
        Some(Regime::Scatter(_)) => Dominant::Troposcatter,
        _ => Dominant::Diffraction,
    };

    if beyond == 0 {
        PathMode::SingleHorizon(dominant)
    } else {
        PathMode::DoubleHorizon(dominant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Climate, ImpedanceRule, Polarisation, Variability};
    use approx::assert_abs_diff_eq;

    fn settings() -> Settings {
        Settings {
            permittivity: 15.0,
            conductivity: 0.005,
            climate: Climate::ContinentalTemperate,
            surface_refractivity: 301.0,
            frequency: 900.0,
            polarisation: Polarisation::Vertical,
            variability: Variability::from_code(12).unwrap(),
            impedance: ImpedanceRule::ComplexRoot,
        }
    }

    fn flat() -> Vec<f64> {
        vec![100.0; 101]
    }

    fn hill() -> Vec<f64> {
        (0..101)
            .map(|i| 100.0 + 80.0 * (-((i as f64 - 50.0) / 8.0).powf(2.0)).exp())
            .collect()
    }

    #[test]
    fn profile_validation() {
        assert!(Profile::new(10.0, vec![1.0]).is_err());
        assert!(Profile::new(0.0, vec![1.0, 2.0]).is_err());
        assert_eq!(Profile::new(10.0, vec![1.0, 2.0, 3.0]).unwrap().length(), 20.0);
    }

    #[test]
    fn general_elevation_of_a_flat_profile() {
        let p = Profile::new(50.0, flat()).unwrap();
        assert_eq!(p.general_elevation(), 100.0);

        let short = Profile::new(50.0, vec![10.0, 20.0]).unwrap();
        assert_eq!(short.general_elevation(), 15.0);
    }

    #[test]
    fn short_flat_path_is_line_of_sight() {
        let p = Profile::new(50.0, flat()).unwrap();
        let r = point_to_point(&p, (30.0, 10.0), &settings(), 0.5, 0.5);

        assert_eq!(r.mode, PathMode::LineOfSight);
        assert_abs_diff_eq!(r.loss, 105.50972108833145, epsilon = 1e-6);
    }

    #[test]
    fn longer_flat_paths() {
        let p = Profile::new(200.0, flat()).unwrap();
        let r = point_to_point(&p, (30.0, 10.0), &settings(), 0.5, 0.5);
        assert_eq!(r.mode, PathMode::LineOfSight);
        assert_abs_diff_eq!(r.loss, 125.63266519426242, epsilon = 1e-6);

        let p = Profile::new(1000.0, flat()).unwrap();
        let r = point_to_point(&p, (30.0, 10.0), &settings(), 0.5, 0.5);
        assert_eq!(r.mode, PathMode::DoubleHorizon(Dominant::Troposcatter));
        assert_abs_diff_eq!(r.loss, 184.42469576746475, epsilon = 1e-6);
    }

    #[test]
    fn hill_obstructs() {
        let p = Profile::new(50.0, hill()).unwrap();
        let env = Environment::new(&settings(), p.general_elevation());
        let g = Geometry::from_profile((30.0, 10.0), &p, &env);
        assert_eq!(g.horizon_distances, (2500.0, 2450.0));

        let r = point_to_point(&p, (30.0, 10.0), &settings(), 0.5, 0.5);
        assert_eq!(r.mode, PathMode::DoubleHorizon(Dominant::Diffraction));
        assert_abs_diff_eq!(r.loss, 154.76322490122323, epsilon = 1e-6);
    }

    #[test]
    fn mode_strings() {
        assert_eq!(PathMode::LineOfSight.to_string(), "Line-Of-Sight Mode");
        assert_eq!(
            PathMode::SingleHorizon(Dominant::Troposcatter).to_string(),
            "Single Horizon, Troposcatter Dominant"
        );
    }
}
