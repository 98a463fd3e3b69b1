//! Validity of a computation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How much confidence to place in a result.
///
/// Ordered from best to worst. A scenario only ever moves down the list: use
/// [`Warning::raise`] to merge a new condition into an existing level. The
/// discriminants are the ITM error codes.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Warning {
    /// No problem found.
    #[default]
    None = 0,

    /// Some parameters are nearly out of range. Use results with caution.
    Caution = 1,

    /// Defaults were substituted for impossible parameters.
    Substituted = 2,

    /// A combination of parameters is out of range. Results are probably
    /// invalid.
    CombinationOutOfRange = 3,

    /// Some parameters are out of range. Results are probably invalid.
    OutOfRange = 4,
}

impl Warning {
    /// Keeps the worse of the current level and `level`.
    pub fn raise(&mut self, level: Warning) {
        *self = (*self).max(level);
    }

    /// The ITM error code.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Warning::None => "no warning",
            Warning::Caution => "some parameters are nearly out of range",
            Warning::Substituted => "default parameters substituted for impossible ones",
            Warning::CombinationOutOfRange => "a combination of parameters is out of range",
            Warning::OutOfRange => "some parameters are out of range",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raising_keeps_the_worst() {
        let mut w = Warning::None;
        w.raise(Warning::CombinationOutOfRange);
        w.raise(Warning::Caution);
        assert_eq!(w, Warning::CombinationOutOfRange);
        w.raise(Warning::OutOfRange);
        assert_eq!(w.code(), 4);
    }
}
