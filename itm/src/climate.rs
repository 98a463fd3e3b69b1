//! Radio climates and their long-term fading constants.
//!
//! The constants are Table 5.1 of T.A. Each climate has three curves (median
//! attenuation and the spread below and above it), two frequency factors, and
//! the two parameters used to bend the upper spread.

use crate::error::InputError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Radio-climate regions.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Climate {
    Equatorial,
    ContinentalSubtropical,
    MaritimeSubtropical,
    Desert,
    #[default]
    ContinentalTemperate,
    MaritimeTemperateOverLand,
    MaritimeTemperateOverSea,
}

impl Climate {
    /// Parses the ITM integer code (1 to 7).
    pub fn from_code(code: i32) -> Result<Self, InputError> {
        Ok(match code {
            1 => Climate::Equatorial,
            2 => Climate::ContinentalSubtropical,
            3 => Climate::MaritimeSubtropical,
            4 => Climate::Desert,
            5 => Climate::ContinentalTemperate,
            6 => Climate::MaritimeTemperateOverLand,
            7 => Climate::MaritimeTemperateOverSea,
            _ => return Err(InputError::UnknownClimate(code)),
        })
    }

    /// The ITM integer code.
    pub fn code(self) -> i32 {
        match self {
            Climate::Equatorial => 1,
            Climate::ContinentalSubtropical => 2,
            Climate::MaritimeSubtropical => 3,
            Climate::Desert => 4,
            Climate::ContinentalTemperate => 5,
            Climate::MaritimeTemperateOverLand => 6,
            Climate::MaritimeTemperateOverSea => 7,
        }
    }
}

impl fmt::Display for Climate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Climate::Equatorial => "equatorial",
            Climate::ContinentalSubtropical => "continental subtropical",
            Climate::MaritimeSubtropical => "maritime subtropical",
            Climate::Desert => "desert",
            Climate::ContinentalTemperate => "continental temperate",
            Climate::MaritimeTemperateOverLand => "maritime temperate, over land",
            Climate::MaritimeTemperateOverSea => "maritime temperate, over sea",
        })
    }
}

/// One long-term fading curve, as a function of effective distance.
///
/// This function's only reference is in the FORTRAN source. No comment is
/// given as to how it was derived, and whether the figures in the research are
/// from this function or the function is fit from the figures. See
/// [Technical Note 101 Volume I][TN101-I] and [Volume II][TN101-II], sections
/// 10 and III respectively.
///
/// [TN101-I]: https://www.its.bldrdoc.gov/publications/2726.aspx
/// [TN101-II]: https://www.its.bldrdoc.gov/publications/2727.aspx
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Curve {
    pub b: (f64, f64),
    pub x: (f64, f64, f64),
}

impl Curve {
    const fn new(b: (f64, f64), x: (f64, f64, f64)) -> Self {
        Self { b, x }
    }

    /// Evaluates the curve at effective distance `de` (metres).
    pub fn at(&self, de: f64) -> f64 {
        (self.b.0 + self.b.1 / (1.0 + ((de - self.x.1) / self.x.2).powf(2.0)))
            * (de / self.x.0).powf(2.0)
            / (1.0 + (de / self.x.0).powf(2.0))
    }
}

/// Climate constants for long-term fading calculations.
///
/// To get the constants for a climate, use:
///
/// ```
/// # use longleyrice::climate::{Climate, ClimateConstants};
/// let cc: ClimateConstants = Climate::Desert.into();
/// assert_eq!(cc.zd, 20.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClimateConstants {
    pub climate: Climate,

    /// Median attenuation curve. <bv, xv>
    pub median: Curve,
    /// Spread below the median. <bsm, xsm>
    pub spread_below: Curve,
    /// Spread above the median. <bsp, xsp>
    pub spread_above: Curve,

    /// CD (Table 5.1 of T.A.)
    pub cd: f64,
    /// ZD (Table 5.1 of T.A.)
    pub zd: f64,

    /// Frequency factor for the spread below the median. <bfm>
    pub frequency_below: (f64, f64, f64),
    /// Frequency factor for the spread above the median. <bfp>
    pub frequency_above: (f64, f64, f64),
}

impl ClimateConstants {
    /// Frequency factors _(gm, gp)_ for a wave number.
    pub fn frequency_factors(&self, wave_number: f64) -> (f64, f64) {
        fn factor(c: (f64, f64, f64), q: f64) -> f64 {
            c.0 + c.1 / ((c.2 * q).powf(2.0) + 1.0)
        }

        let q = (0.133 * wave_number).ln();
        (
            factor(self.frequency_below, q),
            factor(self.frequency_above, q),
        )
    }
}

impl Default for ClimateConstants {
    fn default() -> Self {
        Climate::default().into()
    }
}

impl From<Climate> for ClimateConstants {
    #[rustfmt::skip]
    fn from(climate: Climate) -> Self {
        let (median, spread_below, spread_above, cd, zd, frequency_below, frequency_above) = match climate {
            Climate::Equatorial => (
                Curve::new((-9.67, 12.7), (144.9e3, 190.3e3, 133.8e3)),
                Curve::new((2.13, 159.5), (762.2e3, 123.6e3, 94.5e3)),
                Curve::new((2.11, 102.3), (636.9e3, 134.8e3, 95.6e3)),
                1.224, 1.282, (1.0, 0.0, 0.0), (1.0, 0.0, 0.0),
            ),
            Climate::ContinentalSubtropical => (
                Curve::new((-0.62, 9.19), (228.9e3, 205.2e3, 143.6e3)),
                Curve::new((2.66, 7.67), (100.4e3, 172.5e3, 136.4e3)),
                Curve::new((6.87, 15.53), (138.7e3, 143.7e3, 98.6e3)),
                0.801, 2.161, (1.0, 0.0, 0.0), (0.93, 0.31, 2.00),
            ),
            Climate::MaritimeSubtropical => (
                Curve::new((1.26, 15.5), (262.6e3, 185.2e3, 99.8e3)),
                Curve::new((6.11, 6.65), (138.2e3, 242.2e3, 178.6e3)),
                Curve::new((10.08, 9.60), (165.3e3, 225.7e3, 129.7e3)),
                1.380, 1.282, (1.0, 0.0, 0.0), (1.0, 0.0, 0.0),
            ),
            Climate::Desert => (
                Curve::new((-9.21, 9.05), (84.1e3, 101.1e3, 98.6e3)),
                Curve::new((1.98, 13.11), (139.1e3, 132.7e3, 193.5e3)),
                Curve::new((3.68, 159.3), (464.4e3, 93.1e3, 94.2e3)),
                1.000, 20.0, (1.0, 0.0, 0.0), (0.93, 0.19, 1.79),
            ),
            Climate::ContinentalTemperate => (
                Curve::new((-0.62, 9.19), (228.9e3, 205.2e3, 143.6e3)),
                Curve::new((2.68, 7.16), (93.7e3, 186.8e3, 133.5e3)),
                Curve::new((4.75, 8.12), (93.2e3, 135.9e3, 113.4e3)),
                1.224, 1.282, (0.92, 0.25, 1.77), (0.93, 0.31, 2.00),
            ),
            Climate::MaritimeTemperateOverLand => (
                Curve::new((-0.39, 2.86), (141.7e3, 315.9e3, 167.4e3)),
                Curve::new((6.86, 10.38), (187.8e3, 169.6e3, 108.9e3)),
                Curve::new((8.58, 13.97), (216.0e3, 152.0e3, 122.7e3)),
                1.518, 1.282, (1.0, 0.0, 0.0), (1.0, 0.0, 0.0),
            ),
            Climate::MaritimeTemperateOverSea => (
                Curve::new((3.15, 857.9), (2222.0e3, 164.8e3, 116.3e3)),
                Curve::new((8.51, 169.8), (609.8e3, 119.9e3, 106.6e3)),
                Curve::new((8.43, 8.19), (136.2e3, 188.5e3, 122.9e3)),
                1.518, 1.282, (1.0, 0.0, 0.0), (1.0, 0.0, 0.0),
            ),
        };

        Self {
            climate,
            median,
            spread_below,
            spread_above,
            cd,
            zd,
            frequency_below,
            frequency_above,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for code in 1..=7 {
            assert_eq!(Climate::from_code(code).unwrap().code(), code);
        }
        assert!(Climate::from_code(0).is_err());
        assert!(Climate::from_code(8).is_err());
    }

    #[test]
    fn curves_vanish_at_zero_distance() {
        let cc: ClimateConstants = Climate::MaritimeSubtropical.into();
        assert_eq!(cc.median.at(0.0), 0.0);
        assert!(cc.spread_above.at(100e3) > 0.0);
    }

    #[test]
    fn flat_frequency_factors_are_one() {
        let cc: ClimateConstants = Climate::Equatorial.into();
        assert_eq!(cc.frequency_factors(20.0), (1.0, 1.0));
    }
}
