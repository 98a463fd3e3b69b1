//! Where terrain irregularity comes from.
//!
//! Area mode only needs one number per site: the interdecile range of terrain
//! elevations around it. Elevation data proper is out of scope here, so
//! sources either carry that number directly or work from elevation profiles
//! that were already sampled outward from a point.

use geo::{HaversineDistance, Point};
use itm::interdecile_range;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TerrainError {
    #[error("no elevation profiles available")]
    NoProfiles,

    #[error("profiles are sampled around {origin:?}, which is {distance:.0} m away")]
    OutsideCoverage { origin: (f64, f64), distance: f64 },

    #[error("radius must be positive, got {0}")]
    Radius(f64),
}

/// Anything that can estimate terrain irregularity (m) around a point.
pub trait TerrainSource: Send + Sync {
    /// Interdecile range of elevations within `radius` metres of `centre`.
    fn irregularity(&self, centre: Point<f64>, radius: f64) -> Result<f64, TerrainError>;
}

/// The same known irregularity everywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedIrregularity(pub f64);

impl TerrainSource for FixedIrregularity {
    fn irregularity(&self, _centre: Point<f64>, _radius: f64) -> Result<f64, TerrainError> {
        Ok(self.0)
    }
}

/// Elevation profiles sampled along radials out of one point.
#[derive(Clone, Debug, PartialEq)]
pub struct RadialProfiles {
    /// Where every radial starts.
    pub origin: Point<f64>,

    /// Distance between samples (m).
    pub interval: f64,

    /// Elevations (m), starting at the origin.
    pub radials: Vec<Vec<f64>>,
}

impl TerrainSource for RadialProfiles {
    fn irregularity(&self, centre: Point<f64>, radius: f64) -> Result<f64, TerrainError> {
        if radius.is_nan() || radius <= 0.0 {
            return Err(TerrainError::Radius(radius));
        }

        let distance = self.origin.haversine_distance(&centre);
        if distance > self.interval {
            return Err(TerrainError::OutsideCoverage {
                origin: self.origin.x_y(),
                distance,
            });
        }

        if self.radials.is_empty() {
            return Err(TerrainError::NoProfiles);
        }

        let samples = (radius / self.interval) as usize;
        let total: f64 = self
            .radials
            .iter()
            .map(|radial| {
                let end = samples.min(radial.len().saturating_sub(1));
                let radial = radial.get(..=end).unwrap_or_default();
                interdecile_range(radial, self.interval, (0.0, end as f64 * self.interval))
            })
            .sum();

        let dh = total / self.radials.len() as f64;
        debug!(radials = self.radials.len(), radius, dh, "terrain irregularity");
        Ok(dh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn rough(phase: f64) -> Vec<f64> {
        (0..801)
            .map(|i| 200.0 + 40.0 * (i as f64 * 0.37 + phase).sin())
            .collect()
    }

    #[test]
    fn fixed_is_fixed() {
        let source = FixedIrregularity(90.0);
        assert_eq!(source.irregularity(Point::new(10.0, 50.0), 1.0), Ok(90.0));
    }

    #[test]
    fn flat_radials_are_smooth() {
        let source = RadialProfiles {
            origin: Point::new(-0.074916, 51.424134),
            interval: 50.0,
            radials: vec![vec![30.0; 401]; 4],
        };
        let dh = source
            .irregularity(Point::new(-0.074916, 51.424134), 20e3)
            .unwrap();
        assert_abs_diff_eq!(dh, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn mean_over_radials() {
        let one = RadialProfiles {
            origin: Point::new(0.0, 0.0),
            interval: 25.0,
            radials: vec![rough(0.0)],
        };
        let two = RadialProfiles {
            radials: vec![rough(0.0), vec![0.0; 801]],
            ..one.clone()
        };

        let centre = Point::new(0.0, 0.0);
        let single = one.irregularity(centre, 20e3).unwrap();
        assert!(single > 0.0);
        assert_abs_diff_eq!(two.irregularity(centre, 20e3).unwrap(), single / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn radius_truncates_radials() {
        let mut radial = vec![100.0; 201];
        radial.extend((0..200).map(|i| if i % 2 == 0 { 0.0 } else { 500.0 }));
        let source = RadialProfiles {
            origin: Point::new(0.0, 0.0),
            interval: 100.0,
            radials: vec![radial],
        };

        let centre = Point::new(0.0, 0.0);
        assert_abs_diff_eq!(source.irregularity(centre, 20e3).unwrap(), 0.0, epsilon = 1e-9);
        assert!(source.irregularity(centre, 40e3).unwrap() > 0.0);
    }

    #[test]
    fn centre_must_be_the_origin() {
        let source = RadialProfiles {
            origin: Point::new(0.0, 0.0),
            interval: 90.0,
            radials: vec![vec![0.0; 10]],
        };

        // 0.01° of longitude on the equator is about 1.1 km.
        assert!(matches!(
            source.irregularity(Point::new(0.01, 0.0), 500.0),
            Err(TerrainError::OutsideCoverage { .. })
        ));
        assert!(source.irregularity(Point::new(0.0005, 0.0), 500.0).is_ok());
    }

    #[test]
    fn bad_inputs() {
        let empty = RadialProfiles {
            origin: Point::new(0.0, 0.0),
            interval: 90.0,
            radials: Vec::new(),
        };
        let centre = Point::new(0.0, 0.0);
        assert_eq!(empty.irregularity(centre, 500.0), Err(TerrainError::NoProfiles));
        assert_eq!(empty.irregularity(centre, 0.0), Err(TerrainError::Radius(0.0)));
    }
}
