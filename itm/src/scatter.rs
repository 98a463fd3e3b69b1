//! Troposcatter submodel.
//!
//! See ITM sections `<19>` through `<24>`, and T.A. section 4.

use crate::environment::Environment;
use crate::formulae::fortran_dim;
use crate::geometry::Geometry;
use crate::propagation::Horizons;

/// Returned when the scatter geometry is meaningless (both terminals too
/// close to the scattering volume).
const INVALID: f64 = 1001.0;

/// Frequency gain function _H₀_.
///
/// See ITM section `<23>` (h0f).
fn frequency_gain(r: f64, et: f64) -> f64 {
    const A: [f64; 5] = [25.0, 80.0, 177.0, 395.0, 705.0];
    const B: [f64; 5] = [24.0, 45.0, 68.0, 80.0, 105.0];

    let (it, q) = match et.trunc() as i64 {
        i if i <= 0 => (1, 0.0),
        i if i >= 5 => (5, 0.0),
        i => (i as usize, et - i as f64),
    };

    let x = (1.0 / r).powf(2.0);
    let h = 4.343 * ((A[it - 1] * x + B[it - 1]) * x + 1.0).ln();
    if q != 0.0 {
        (1.0 - q) * h + q * 4.343 * ((A[it] * x + B[it]) * x + 1.0).ln()
    } else {
        h
    }
}

/// Attenuation function _F(θd)_.
///
/// See ITM section `<24>` (ahd).
fn angular_distance(td: f64) -> f64 {
    const A: [f64; 3] = [133.4, 104.6, 71.8];
    const B: [f64; 3] = [0.332e-3, 0.212e-3, 0.157e-3];
    const C: [f64; 3] = [-4.343, -1.086, 2.171];

    let i = if td <= 10e3 {
        0
    } else if td <= 70e3 {
        1
    } else {
        2
    };

    A[i] + B[i] * td + C[i] * td.ln()
}

/// Scatter attenuation over a path.
///
/// Carries the _H₀_ of the previous evaluation: once it is established above
/// 15 dB it is kept rather than recomputed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scatter {
    ad: f64,
    rr: f64,
    etq: f64,
    h0s: f64,

    wave_number: f64,
    effective_curvature: f64,
    effective_refractivity: f64,
    effective_heights: (f64, f64),
    elevation_angles: (f64, f64),
    bending: f64,
}

impl Scatter {
    /// See ITM section `<20>`.
    pub fn new(environment: &Environment, geometry: &Geometry, horizons: &Horizons) -> Self {
        let he = geometry.effective_heights;
        let dl = geometry.horizon_distances;
        let ens = environment.effective_refractivity;

        let (mut ad, mut rr) = (dl.0 - dl.1, he.1 / he.0);
        if ad < 0.0 {
            ad = -ad;
            rr = 1.0 / rr;
        }

        Self {
            ad,
            rr,
            etq: (5.67e-6 * ens - 2.32e-3) * ens + 0.031,
            h0s: -15.0,

            wave_number: environment.wave_number,
            effective_curvature: environment.effective_curvature,
            effective_refractivity: ens,
            effective_heights: he,
            elevation_angles: geometry.elevation_angles,
            bending: horizons.bending,
        }
    }

    /// Scatter attenuation at `distance` metres. At or above 1000 dB, the
    /// result means the scatter submodel does not apply.
    ///
    /// See ITM section `<21>`.
    pub fn attenuation(&mut self, distance: f64) -> f64 {
        let wn = self.wave_number;
        let gme = self.effective_curvature;
        let he = self.effective_heights;
        let (d, ad) = (distance, self.ad);

        let h0 = if self.h0s > 15.0 {
            self.h0s
        } else {
            let th = self.elevation_angles.0 + self.elevation_angles.1 + d * gme;
            let mut r2 = 2.0 * wn * th;
            let r1 = r2 * he.0;
            r2 *= he.1;

            if r1 < 0.2 && r2 < 0.2 {
                return INVALID;
            }

            let mut ss = (d - ad) / (d + ad);
            let mut q = self.rr / ss;
            ss = ss.max(0.1);
            q = q.max(0.1).min(10.0);

            // height of the crossover point of the horizon rays
            let z0 = (d - ad) * (d + ad) * th * 0.25 / d;
            let temp = (z0 / 8.0e3).min(1.7).powf(6.0);
            let et = (self.etq * (-temp).exp() + 1.0) * z0 / 1.7556e3;
            let ett = et.max(1.0);

            let mut h0 = (frequency_gain(r1, ett) + frequency_gain(r2, ett)) * 0.5;
            h0 += h0.min((1.38 - ett.ln()) * ss.ln() * q.ln() * 0.49);
            h0 = fortran_dim(h0, 0.0);

            if et < 1.0 {
                let temp = (1.0 + 1.4142 / r1) * (1.0 + 1.4142 / r2);
                h0 = et * h0
                    + (1.0 - et) * 4.343 * ((temp * temp) * (r1 + r2) / (r1 + r2 + 2.8284)).ln();
            }

            if h0 > 15.0 && self.h0s >= 0.0 {
                self.h0s
            } else {
                h0
            }
        };

        self.h0s = h0;

        let th = self.bending + d * gme;
        angular_distance(th * d) + 4.343 * (47.7 * wn * th.powf(4.0)).ln()
            - 0.1 * (self.effective_refractivity - 301.0) * (-th * d / 40e3).exp()
            + h0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn frequency_gain_interpolates_between_columns() {
        let low = frequency_gain(2.0, 2.0);
        let high = frequency_gain(2.0, 3.0);
        let mid = frequency_gain(2.0, 2.5);
        assert_abs_diff_eq!(mid, 0.5 * (low + high), epsilon = 1e-12);
    }

    #[test]
    fn frequency_gain_clamps_efficiency() {
        assert_eq!(frequency_gain(3.0, 0.2), frequency_gain(3.0, 1.0));
        assert_eq!(frequency_gain(3.0, 7.5), frequency_gain(3.0, 5.0));
    }

    #[test]
    fn angular_distance_is_piecewise() {
        assert_abs_diff_eq!(
            angular_distance(5e3),
            133.4 + 0.332e-3 * 5e3 - 4.343 * 5e3f64.ln(),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            angular_distance(100e3),
            71.8 + 0.157e-3 * 100e3 + 2.171 * 100e3f64.ln(),
            epsilon = 1e-12
        );
    }
}
