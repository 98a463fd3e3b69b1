//! Radio environment of a system: wave number, refractivity, earth curvature,
//! ground impedance.
//!
//! See ITM section `<41>`.

use crate::formulae::complex_quotient;
use crate::{Polarisation, Settings};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// The carrier or central frequency (in MHz).
///
/// This is pre-computed (in the paper) assuming a speed of light **in air** of
/// 299.7 metres per microsecond. See Fig/1.1 in T.A.
const CARRIER_FREQUENCY: f64 = 47.7;

/// Actual earth curvature (1/m).
const EARTH_CURVATURE: f64 = 157e-9;

/// How the ground transfer impedance is derived from the complex permittivity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImpedanceRule {
    /// _√(zq − 1)_ taken over the complex permittivity, as in ITM 1.2.2.
    #[default]
    ComplexRoot,

    /// _√(ε − 1)_ taken over the real permittivity only. This is what the
    /// published area-mode reference tables were computed with.
    RealRoot,
}

/// Derived radio environment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Environment {
    /// [Wave number] of the carrier/central frequency (in radians per metre).
    ///
    /// [Wave number]: https://en.wikipedia.org/wiki/Wavenumber
    pub wave_number: f64, // <wn>

    /// General elevation: the mean elevation of the modeled system.
    pub general_elevation: f64, // <zsys>

    /// Effective surface refractivity at the system's elevation.
    pub effective_refractivity: f64, // <ens>

    /// Earth's effective curvature at the system's elevation.
    pub effective_curvature: f64, // <gme>

    /// Surface transfer impedance to the ground.
    pub transfer_impedance: Complex64, // <zgnd>
}

impl Environment {
    pub fn new(settings: &Settings, general_elevation: f64) -> Self {
        // Fig/1.1 in T.A.
        let wave_number = settings.frequency / CARRIER_FREQUENCY;

        let mut effective_refractivity = settings.surface_refractivity;
        if general_elevation != 0.0 {
            // Fig/1.2 in T.A.
            effective_refractivity *= (-general_elevation / 9460.0).exp();
        }

        // Fig/1.3 in T.A.
        let effective_curvature =
            EARTH_CURVATURE * (1.0 - 0.04665 * (effective_refractivity / 179.3).exp());

        // Fig/1.5 in T.A.
        let permittivity = Complex64::new(
            settings.permittivity,
            376.62 * settings.conductivity / wave_number,
        );

        // Fig/1.4 in T.A.
        let mut transfer_impedance = match settings.impedance {
            ImpedanceRule::ComplexRoot => (permittivity - 1.0).sqrt(),
            ImpedanceRule::RealRoot => Complex64::new((permittivity.re - 1.0).sqrt(), 0.0),
        };
        if settings.polarisation == Polarisation::Vertical {
            transfer_impedance = complex_quotient(transfer_impedance, permittivity);
        }

        Self {
            wave_number,
            general_elevation,
            effective_refractivity,
            effective_curvature,
            transfer_impedance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Climate, Variability};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn unit_settings(impedance: ImpedanceRule) -> Settings {
        Settings {
            permittivity: 1.0,
            conductivity: 1.0,
            climate: Climate::ContinentalTemperate,
            surface_refractivity: 1.0,
            frequency: 1.0,
            polarisation: Polarisation::Vertical,
            variability: Variability::default(),
            impedance,
        }
    }

    #[test]
    fn unit_inputs() {
        let env = Environment::new(&unit_settings(ImpedanceRule::ComplexRoot), 1.0);

        assert_relative_eq!(env.wave_number, 0.020964360587002094, max_relative = 1e-15);
        assert_relative_eq!(env.effective_curvature, 1.4963499220004568e-7, max_relative = 1e-12);
        assert_relative_eq!(env.effective_refractivity, 0.9998942973416766, max_relative = 1e-15);
        assert_abs_diff_eq!(env.transfer_impedance.re, 0.0052759, epsilon = 1e-7);
        assert_abs_diff_eq!(env.transfer_impedance.im, -0.0052753, epsilon = 1e-7);
    }

    #[test]
    fn real_root_ignores_conductivity_under_the_root() {
        let mut settings = unit_settings(ImpedanceRule::RealRoot);
        settings.permittivity = 15.0;
        settings.polarisation = Polarisation::Horizontal;
        let env = Environment::new(&settings, 0.0);

        assert_eq!(env.transfer_impedance, Complex64::new(14f64.sqrt(), 0.0));
        assert_eq!(env.effective_refractivity, 1.0);
    }
}
