//! Reference attenuation as a function of distance.
//!
//! Three regimes, each a fitted curve: a logarithmic fit of the line-of-sight
//! submodel up to the smooth-earth horizon, then the straight diffraction
//! line, then the straight scatter line from where it crosses the diffraction
//! line. The diffraction line is fitted when the model is built; the other two
//! only when a distance first falls in their range.
//!
//! See ITM sections `<4>` through `<9>` (lrprop).

use crate::diffraction::Diffraction;
use crate::environment::Environment;
use crate::formulae::fortran_dim;
use crate::geometry::Geometry;
use crate::line_of_sight::LineOfSight;
use crate::scatter::Scatter;
use crate::variability::Refresh;
use crate::{Model, Warning};
use tracing::{debug, trace, warn};

/// Horizon quantities shared by the submodels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Horizons {
    /// Smooth-earth horizon distances. <dls>
    pub smooth_earth: (f64, f64),
    /// Sum of the smooth-earth horizon distances. <dlsa>
    pub smooth_earth_total: f64,
    /// Sum of the actual horizon distances. <dla>
    pub total: f64,
    /// Total bending angle. <tha>
    pub bending: f64,
    /// Distance under which the heights are too different for the model. <dmin>
    pub minimum_distance: f64,
    /// Characteristic length of the earth's curvature at this wave number. <xae>
    pub curvature_scale: f64,
}

impl Horizons {
    /// See ITM section `<5>`.
    pub fn new(environment: &Environment, geometry: &Geometry) -> Self {
        let gme = environment.effective_curvature;
        let he = geometry.effective_heights;
        let dl = geometry.horizon_distances;
        let the = geometry.elevation_angles;

        let smooth_earth = ((2.0 * he.0 / gme).sqrt(), (2.0 * he.1 / gme).sqrt());
        let total = dl.0 + dl.1;

        Self {
            smooth_earth,
            smooth_earth_total: smooth_earth.0 + smooth_earth.1,
            total,
            bending: (the.0 + the.1).max(-total * gme),
            minimum_distance: (he.0 - he.1).abs() / 200e-3,
            curvature_scale: (environment.wave_number * gme.powf(2.0)).powf(-1.0 / 3.0),
        }
    }
}

/// Straight line of the diffraction regime. <aed, emd>
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiffractionFit {
    pub intercept: f64,
    pub slope: f64,
}

impl DiffractionFit {
    /// Fits the line through two diffraction evaluations beyond the horizons.
    ///
    /// See ITM section `<6>`.
    pub(crate) fn new(diffraction: &Diffraction, horizons: &Horizons) -> Self {
        let xae = horizons.curvature_scale;
        let d3 = horizons
            .smooth_earth_total
            .max(1.3787 * xae + horizons.total);
        let d4 = d3 + 2.7574 * xae;
        let a3 = diffraction.attenuation(d3);
        let a4 = diffraction.attenuation(d4);

        let slope = (a4 - a3) / (d4 - d3);
        Self {
            intercept: a3 - slope * d3,
            slope,
        }
    }

    pub fn at(&self, distance: f64) -> f64 {
        self.intercept + self.slope * distance
    }
}

/// Logarithmic curve of the line-of-sight regime. <ael, ak1, ak2>
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineOfSightFit {
    pub intercept: f64,
    pub linear: f64,
    pub logarithmic: f64,
}

impl LineOfSightFit {
    /// Fits _A = ael + ak1 d + ak2 ln d_ through two line-of-sight evaluations
    /// and the diffraction line at the smooth-earth horizon.
    ///
    /// See ITM section `<7>`.
    fn new(
        los: &LineOfSight,
        horizons: &Horizons,
        diffraction: DiffractionFit,
        wn: f64,
        he: (f64, f64),
    ) -> Self {
        let dla = horizons.total;
        let (aed, emd) = (diffraction.intercept, diffraction.slope);

        let d2 = horizons.smooth_earth_total;
        let a2 = aed + d2 * emd;
        let mut d0 = 1.908 * wn * he.0 * he.1;
        let d1 = if aed >= 0.0 {
            d0 = d0.min(0.5 * dla);
            d0 + 0.25 * (dla - d0)
        } else {
            (-aed / emd).max(0.25 * dla)
        };

        let a1 = los.attenuation(d1);

        let mut fitted = None;
        if d0 < d1 {
            let a0 = los.attenuation(d0);
            let q = (d2 / d0).ln();
            let mut ak2 = 0f64.max(
                ((d2 - d0) * (a1 - a0) - (d1 - d0) * (a2 - a0))
                    / ((d2 - d0) * (d1 / d0).ln() - (d1 - d0) * q),
            );

            if aed >= 0.0 || ak2 > 0.0 {
                let mut ak1 = (a2 - a0 - ak2 * q) / (d2 - d0);
                if ak1 < 0.0 {
                    ak1 = 0.0;
                    ak2 = fortran_dim(a2, a0) / q;
                    if ak2 == 0.0 {
                        ak1 = emd;
                    }
                }
                fitted = Some((ak1, ak2));
            }
        }

        let (linear, logarithmic) = fitted.unwrap_or_else(|| {
            let ak1 = fortran_dim(a2, a1) / (d2 - d1);
            (if ak1 == 0.0 { emd } else { ak1 }, 0.0)
        });

        Self {
            intercept: a2 - linear * d2 - logarithmic * d2.ln(),
            linear,
            logarithmic,
        }
    }

    pub fn at(&self, distance: f64) -> f64 {
        self.intercept + self.linear * distance + self.logarithmic * distance.ln()
    }
}

/// Straight line of the scatter regime, and where it takes over. <aes, ems, dx>
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterFit {
    pub intercept: f64,
    pub slope: f64,
    /// Distance past which the scatter line applies.
    pub takeover: f64,
}

impl ScatterFit {
    /// Fits the line through two scatter evaluations well beyond the horizons,
    /// and joins it to the diffraction line. If the scatter submodel does not
    /// apply, the diffraction line is carried on instead.
    ///
    /// See ITM section `<8>`.
    fn new(
        mut scatter: Scatter,
        horizons: &Horizons,
        diffraction: DiffractionFit,
        wn: f64,
    ) -> Self {
        let (aed, emd) = (diffraction.intercept, diffraction.slope);

        let d5 = horizons.total + 200e3;
        let d6 = d5 + 200e3;
        let a6 = scatter.attenuation(d6);
        let a5 = scatter.attenuation(d5);

        if a5 < 1000.0 {
            let slope = (a6 - a5) / 200e3;
            let takeover = horizons.smooth_earth_total.max(
                (horizons.total + 0.3 * horizons.curvature_scale * (47.7 * wn).ln())
                    .max((a5 - aed - slope * d5) / (emd - slope)),
            );

            Self {
                intercept: (emd - slope) * takeover + aed,
                slope,
                takeover,
            }
        } else {
            Self {
                intercept: aed,
                slope: emd,
                takeover: 10e6,
            }
        }
    }

    pub fn at(&self, distance: f64) -> f64 {
        self.intercept + self.slope * distance
    }
}

/// Which propagation mechanism applies at a distance, with its fitted curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Regime {
    LineOfSight(LineOfSightFit),
    Diffraction(DiffractionFit),
    Scatter(ScatterFit),
}

impl Regime {
    /// Evaluates the regime's curve.
    pub fn attenuation(&self, distance: f64) -> f64 {
        match self {
            Regime::LineOfSight(fit) => fit.at(distance),
            Regime::Diffraction(fit) => fit.at(distance),
            Regime::Scatter(fit) => fit.at(distance),
        }
    }
}

impl Model {
    /// Range checks on the path, once per model.
    ///
    /// See ITM section `<5>`.
    pub(crate) fn check_path(&mut self) {
        let wn = self.environment.wave_number;
        let hg = self.geometry.heights;
        let dls = self.horizons.smooth_earth;

        if !(0.838..=210.0).contains(&wn) {
            self.raise(Warning::Caution);
        }

        for h in [hg.0, hg.1] {
            if !(1.0..=1000.0).contains(&h) {
                self.raise(Warning::Caution);
            }
        }

        let the = self.geometry.elevation_angles;
        let dl = self.geometry.horizon_distances;
        for (the, dl, dls) in [(the.0, dl.0, dls.0), (the.1, dl.1, dls.1)] {
            if the.abs() > 200e-3 || dl < 0.1 * dls || dl > 3.0 * dls {
                self.raise(Warning::CombinationOutOfRange);
            }
        }

        let ens = self.environment.effective_refractivity;
        let gme = self.environment.effective_curvature;
        let zgnd = self.environment.transfer_impedance;
        if !(250.0..=400.0).contains(&ens)
            || !(75e-9..=250e-9).contains(&gme)
            || zgnd.re <= zgnd.im.abs()
            || !(0.419..=420.0).contains(&wn)
        {
            self.raise(Warning::OutOfRange);
        }

        for h in [hg.0, hg.1] {
            if !(0.5..=3000.0).contains(&h) {
                self.raise(Warning::OutOfRange);
            }
        }
    }

    /// Computes the reference attenuation (in dB) at `distance` metres.
    ///
    /// Distances must come in non-decreasing order over the life of a model.
    /// The result is also kept for the next [`Model::variability`] query.
    ///
    /// See ITM section `<4>`.
    pub fn attenuation_at(&mut self, distance: f64) -> f64 {
        if distance < self.distance {
            warn!(
                previous = self.distance,
                distance, "distances should not decrease within one model"
            );
        }

        self.distance = distance;
        self.refresh = self.refresh.max(Refresh::Distance);

        if distance > 0.0 {
            if distance > 1000e3 {
                self.raise(Warning::Caution);
            }
            if distance < self.horizons.minimum_distance {
                self.raise(Warning::CombinationOutOfRange);
            }
            if !(1e3..=2000e3).contains(&distance) {
                self.raise(Warning::OutOfRange);
            }
        }

        let regime = self.regime_at(distance);
        self.reference = regime.attenuation(distance).max(0.0);
        trace!(distance, ?regime, attenuation = self.reference, "reference attenuation");
        self.reference
    }

    /// Picks the regime for `distance`, fitting it first if needed.
    fn regime_at(&mut self, distance: f64) -> Regime {
        if distance > 0.0 && distance < self.horizons.smooth_earth_total {
            let fit = match self.line_of_sight {
                Some(fit) => fit,
                None => {
                    let los = LineOfSight::new(
                        &self.environment,
                        &self.geometry,
                        &self.horizons,
                        self.diffraction,
                    );
                    let fit = LineOfSightFit::new(
                        &los,
                        &self.horizons,
                        self.diffraction,
                        self.environment.wave_number,
                        self.geometry.effective_heights,
                    );
                    debug!(?fit, "fitted line-of-sight regime");
                    self.line_of_sight = Some(fit);
                    fit
                }
            };

            return Regime::LineOfSight(fit);
        }

        let fit = match self.scatter {
            Some(fit) => fit,
            None => {
                let scatter = Scatter::new(&self.environment, &self.geometry, &self.horizons);
                let fit = ScatterFit::new(
                    scatter,
                    &self.horizons,
                    self.diffraction,
                    self.environment.wave_number,
                );
                debug!(?fit, "fitted scatter regime");
                self.scatter = Some(fit);
                fit
            }
        };

        if distance > fit.takeover {
            Regime::Scatter(fit)
        } else {
            Regime::Diffraction(self.diffraction)
        }
    }

    /// The regime of the last computed distance.
    pub fn regime(&self) -> Option<Regime> {
        if self.distance > 0.0 && self.distance < self.horizons.smooth_earth_total {
            self.line_of_sight.map(Regime::LineOfSight)
        } else {
            self.scatter.map(|fit| {
                if self.distance > fit.takeover {
                    Regime::Scatter(fit)
                } else {
                    Regime::Diffraction(self.diffraction)
                }
            })
        }
    }
}
