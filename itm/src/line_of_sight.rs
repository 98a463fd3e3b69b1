//! Line-of-sight submodel.
//!
//! A two-ray (direct plus ground-reflected) model, faded into the extended
//! diffraction line as terrain gets rougher. See ITM sections `<16>` through
//! `<18>`, and T.A. section 4.

use crate::environment::Environment;
use crate::formulae::complex_quotient;
use crate::geometry::Geometry;
use crate::propagation::{DiffractionFit, Horizons};
use num_complex::Complex64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineOfSight {
    /// Weight of the two-ray term against the diffraction line.
    wls: f64,

    wave_number: f64,
    effective_heights: (f64, f64),
    terrain_irregularity: f64,
    transfer_impedance: Complex64,
    diffraction: DiffractionFit,
}

impl LineOfSight {
    /// See ITM section `<17>`.
    pub fn new(
        environment: &Environment,
        geometry: &Geometry,
        horizons: &Horizons,
        diffraction: DiffractionFit,
    ) -> Self {
        let wn = environment.wave_number;
        let dh = geometry.terrain_irregularity;

        Self {
            wls: 0.021 / (0.021 + wn * dh / horizons.smooth_earth_total.max(10e3)),
            wave_number: wn,
            effective_heights: geometry.effective_heights,
            terrain_irregularity: dh,
            transfer_impedance: environment.transfer_impedance,
            diffraction,
        }
    }

    /// Line-of-sight attenuation at `distance` metres.
    ///
    /// See ITM section `<18>`.
    pub fn attenuation(&self, distance: f64) -> f64 {
        let wn = self.wave_number;
        let he = self.effective_heights;
        let zgnd = self.transfer_impedance;

        // terrain roughness at this distance
        let q = (1.0 - 0.8 * (-distance / 50e3).exp()) * self.terrain_irregularity;
        let s = 0.78 * q * (-(q / 16.0).powf(0.25)).exp();

        // reflection coefficient at the grazing angle
        let q = he.0 + he.1;
        let sps = q / (distance * distance + q * q).sqrt();
        let grazing = Complex64::new(sps, 0.0);
        let mut r = complex_quotient(grazing - zgnd, grazing + zgnd)
            * (-(10f64.min(wn * s * sps))).exp();
        let q = r.norm().powf(2.0);
        if q < 0.25 || q < sps {
            r = r * (sps / q).sqrt();
        }

        let alt = self.diffraction.at(distance);

        // phase difference between the two rays
        let mut q = wn * he.0 * he.1 * 2.0 / distance;
        if q > 1.57 {
            q = 3.14 - 2.4649 / q;
        }

        let two_ray = -4.343 * (Complex64::new(q.cos(), -q.sin()) + r).norm().powf(2.0).ln();
        (two_ray - alt) * self.wls + alt
    }
}
