//! Diffraction submodel.
//!
//! Attenuation beyond the horizon is a weighted mix of a double knife-edge
//! term and a smooth rounded-earth term, plus a clutter allowance. See ITM
//! sections `<10>` through `<15>`, and T.A. section 4.

use crate::environment::Environment;
use crate::geometry::{Geometry, Mode};
use crate::propagation::Horizons;

/// Attenuation over a single knife edge, as a function of _v²_.
///
/// A numerical approximation to the Fresnel integral. Arguments at or below
/// zero are floored to a tiny positive value, so a knife edge that does not
/// obstruct the path still costs about 6 dB.
///
/// See ITM section `<13>` and Fig/4.26 in T.A.
pub fn knife_edge(v2: f64) -> f64 {
    let v2 = v2.max(1e-5);
    if v2 < 5.76 {
        6.02 + 9.11 * v2.sqrt() - 1.27 * v2
    } else {
        12.953 + 4.343 * v2.ln()
    }
}

/// Height-gain function for the rounded-earth diffraction.
///
/// `x` is the normalised distance and `pk` the normalised surface admittance.
///
/// See ITM section `<14>` and Fig/4.27 in T.A.
pub fn height_gain(x: f64, pk: f64) -> f64 {
    if x < 200.0 {
        let w = -pk.ln();
        if pk < 1e-5 || x * w.powf(3.0) > 5495.0 {
            if x > 1.0 {
                17.372 * x.ln() - 117.0
            } else {
                -117.0
            }
        } else {
            2.5e-5 * x * x / pk - 8.686 * w - 15.0
        }
    } else {
        let f = 0.05751 * x - 4.343 * x.ln();
        if x < 2000.0 {
            let w = 0.0134 * x * (-0.005 * x).exp();
            (1.0 - w) * f + w * (17.372 * x.ln() - 117.0)
        } else {
            f
        }
    }
}

/// Diffraction attenuation over a path.
///
/// All distance-independent work is done once, on construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Diffraction {
    wd1: f64,
    xd1: f64,
    afo: f64,
    qk: f64,
    aht: f64,
    xht: f64,

    wave_number: f64,
    effective_curvature: f64,
    horizon_distances: (f64, f64),
    terrain_irregularity: f64,
    total_horizon: f64,
    bending: f64,
}

impl Diffraction {
    /// See ITM section `<11>`.
    pub fn new(environment: &Environment, geometry: &Geometry, horizons: &Horizons) -> Self {
        let wn = environment.wave_number;
        let gme = environment.effective_curvature;
        let (hg, he, dl) = (
            geometry.heights,
            geometry.effective_heights,
            geometry.horizon_distances,
        );
        let dh = geometry.terrain_irregularity;

        let mut q = hg.0 * hg.1;
        let qk = he.0 * he.1 - q;
        if geometry.mode == Mode::PointToPoint {
            q += 10.0;
        }

        let wd1 = (1.0 + qk / q).sqrt();
        let xd1 = horizons.total + horizons.bending / gme;

        // clutter allowance
        let mut q = (1.0 - 0.8 * (-horizons.smooth_earth_total / 50e3).exp()) * dh;
        q *= 0.78 * (-(q / 16.0).powf(0.25)).exp();
        let afo = 15f64.min(2.171 * (1.0 + 4.77e-4 * hg.0 * hg.1 * wn * q).ln());

        let qk = 1.0 / environment.transfer_impedance.norm();

        // height-gain at the horizons
        fn horizon_term(dl: f64, he: f64, wn: f64, qk: f64) -> (f64, f64) {
            let a = 0.5 * dl.powf(2.0) / he;
            let wa = (a * wn).powf(1.0 / 3.0);
            let pk = qk / wa;
            let q = (1.607 - pk) * 151.0 * wa * dl / a;
            (q, height_gain(q, pk))
        }

        let (x0, f0) = horizon_term(dl.0, he.0, wn, qk);
        let (x1, f1) = horizon_term(dl.1, he.1, wn, qk);

        Self {
            wd1,
            xd1,
            afo,
            qk,
            aht: 20.0 + f0 + f1,
            xht: 0.0 + x0 + x1,

            wave_number: wn,
            effective_curvature: gme,
            horizon_distances: dl,
            terrain_irregularity: dh,
            total_horizon: horizons.total,
            bending: horizons.bending,
        }
    }

    /// Diffraction attenuation at `distance` metres, beyond the horizons.
    ///
    /// See ITM section `<12>`.
    pub fn attenuation(&self, distance: f64) -> f64 {
        let wn = self.wave_number;
        let dl = self.horizon_distances;

        let th = self.bending + distance * self.effective_curvature;
        let ds = distance - self.total_horizon;

        // double knife-edge
        let q = 0.0795775 * wn * ds * th.powf(2.0);
        let adv = knife_edge(q * dl.0 / (ds + dl.0)) + knife_edge(q * dl.1 / (ds + dl.1));

        // rounded earth
        let a = ds / th;
        let wa = (a * wn).powf(1.0 / 3.0);
        let pk = self.qk / wa;
        let q = (1.607 - pk) * 151.0 * wa * th + self.xht;
        let ar = 0.05751 * q - 4.343 * q.ln() - self.aht;

        let q = (self.wd1 + self.xd1 / distance)
            * ((1.0 - 0.8 * (-distance / 50e3).exp()) * self.terrain_irregularity * wn)
                .min(6283.2);
        let wd = 25.1 / (25.1 + q.sqrt());

        ar * wd + (1.0 - wd) * adv + self.afo
    }
}
