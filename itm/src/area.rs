//! Area prediction mode: loss versus distance tables.

use crate::formulae::{inverse_normal_complementary, inverse_normal_complementary_each};
use crate::{Model, Settings, SitingCriteria, Warning};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Distances to compute, in kilometres.
///
/// A fine range from `start` to `first_end` by `first_step`, then optionally a
/// coarser range to `second_end` by `second_step`. End points are adjusted to
/// land on a whole number of steps.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceSweep {
    pub start: f64,
    pub first_step: f64,
    pub first_end: f64,
    pub second_step: f64,
    pub second_end: f64,
}

impl Default for DistanceSweep {
    fn default() -> Self {
        Self {
            start: 10.0,
            first_step: 10.0,
            first_end: 150.0,
            second_step: 50.0,
            second_end: 500.0,
        }
    }
}

impl DistanceSweep {
    /// Expands the sweep into its distances, in increasing order.
    pub fn distances(&self) -> Vec<f64> {
        let (start, count, fine) = self.layout();

        let mut distances = Vec::with_capacity(count);
        let mut d = start;
        let mut step = self.first_step;
        for i in 0..count {
            distances.push(d);
            if i + 1 == fine {
                step = self.second_step;
            }
            d += step;
        }

        distances
    }

    /// How many distances [`distances`](DistanceSweep::distances) yields.
    pub fn count(&self) -> usize {
        self.layout().1
    }

    /// First distance, number of distances, and how many of them use the
    /// first step (0 when there is no second range).
    fn layout(&self) -> (f64, usize, usize) {
        let mut start = self.start;
        if start <= 0.0 {
            start = self.first_step;
        }
        if start <= 0.0 {
            start = 2.0;
        }

        let mut count;
        let first_end;
        if self.first_end <= start || self.first_step <= 0.0 {
            count = 1;
            first_end = start;
        } else {
            count = ((self.first_end - start) / self.first_step + 1.75).floor() as usize;
            first_end = start + (count - 1) as f64 * self.first_step;
        }

        let fine = if self.second_end <= first_end || self.second_step <= 0.0 {
            0
        } else {
            let fine = count;
            count = count.saturating_add(
                ((self.second_end - first_end) / self.second_step + 0.75).floor() as usize,
            );
            fine
        };

        (start, count, fine)
    }
}

/// Everything needed for one area-mode table.
#[derive(Clone, Debug, PartialEq)]
pub struct AreaScenario {
    pub settings: Settings,

    /// Antenna heights above ground (m).
    pub heights: (f64, f64),
    pub siting: (SitingCriteria, SitingCriteria),

    /// Interdecile range of terrain elevations (m).
    pub terrain_irregularity: f64,

    /// Mean system elevation above sea level (m).
    pub general_elevation: f64,

    /// Percentage of time.
    pub time: f64,
    /// Percentage of locations.
    pub location: f64,
    /// Confidence levels (percentages); one row per level and distance.
    pub confidences: Vec<f64>,

    pub sweep: DistanceSweep,

    /// Warning already raised while assembling the inputs.
    pub input_warning: Warning,
}

/// One row of an area-mode table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub distance_km: f64,
    #[serde(rename = "confidence_level_%")]
    pub confidence: f64,
    #[serde(rename = "propagation_loss_dB")]
    pub loss_db: f64,
}

/// An area-mode table and how much to trust it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaPrediction {
    pub rows: Vec<Prediction>,
    pub warning: Warning,
}

/// Runs the area mode over a sweep of distances.
///
/// Rows are ordered by distance, then by confidence in the requested order.
/// Each loss is the free-space loss plus the attenuation not exceeded for the
/// requested time, location and confidence.
pub fn predict(scenario: &AreaScenario) -> AreaPrediction {
    let zt = inverse_normal_complementary(scenario.time / 100.0);
    let zl = inverse_normal_complementary(scenario.location / 100.0);
    let fractions: Vec<f64> = scenario.confidences.iter().map(|c| c / 100.0).collect();
    let zc = inverse_normal_complementary_each(&fractions);

    let mut model = Model::area(
        scenario.settings,
        scenario.general_elevation,
        scenario.heights,
        scenario.siting,
        scenario.terrain_irregularity,
    );
    model.raise(scenario.input_warning);

    let distances = scenario.sweep.distances();
    let mut rows = Vec::with_capacity(distances.len() * zc.len());
    for km in distances {
        model.attenuation_at(km * 1000.0);
        let free_space = model.free_space_loss();

        for (&confidence, &z) in scenario.confidences.iter().zip(zc.iter()) {
            rows.push(Prediction {
                distance_km: km,
                confidence,
                loss_db: free_space + model.variability(zt, zl, z),
            });
        }
    }

    debug!(rows = rows.len(), warning = ?model.warning(), "area prediction done");
    AreaPrediction {
        rows,
        warning: model.warning(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_sweep() {
        let d = DistanceSweep::default().distances();
        assert_eq!(d.len(), 22);
        assert_eq!(d[0], 10.0);
        assert_eq!(d[14], 150.0);
        assert_eq!(d[15], 200.0);
        assert_eq!(d[21], 500.0);
    }

    #[test]
    fn single_distance() {
        let sweep = DistanceSweep {
            start: 0.0,
            first_step: 0.0,
            first_end: 100.0,
            second_step: 0.0,
            second_end: 0.0,
        };
        assert_eq!(sweep.distances(), vec![2.0]);
    }

    #[test]
    fn single_then_coarse() {
        let sweep = DistanceSweep {
            start: 5.0,
            first_step: 10.0,
            first_end: 5.0,
            second_step: 20.0,
            second_end: 45.0,
        };
        assert_eq!(sweep.distances(), vec![5.0, 25.0, 45.0]);
    }

    #[test]
    fn ends_snap_to_steps() {
        let sweep = DistanceSweep {
            start: 1.0,
            first_step: 2.0,
            first_end: 6.0,
            second_step: 0.0,
            second_end: 0.0,
        };
        // floor((6 - 1) / 2 + 1.75) = 4 points
        assert_eq!(sweep.distances(), vec![1.0, 3.0, 5.0, 7.0]);
    }

    #[test]
    fn count_without_expanding() {
        assert_eq!(DistanceSweep::default().count(), 22);

        let fine = DistanceSweep {
            first_step: 1e-9,
            ..DistanceSweep::default()
        };
        assert!(fine.count() > 1_000_000);
    }
}
