//! Statistics: long-term fading and the spread of attenuation over time,
//! locations and situations.
//!
//! See ITM sections `<25>` through `<40>` (avar), and T.A. section 5.

use crate::climate::{Climate, ClimateConstants};
use crate::error::InputError;
use crate::{Model, Warning};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the three kinds of variability combine into one statistic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeOfVariability {
    /// One quantile for everything: time, location and situation variability
    /// are all folded into confidence.
    #[default]
    SingleMessage,

    /// Time variability is kept apart; location and situation variability
    /// are folded into confidence.
    Accidental,

    /// Time and location variability are combined; situation variability is
    /// folded into confidence.
    Mobile,

    /// Time and location variability are kept apart; situation variability
    /// is folded into confidence.
    Broadcast,
}

/// Mode of variability, and which variabilities are considered at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variability {
    pub mode: ModeOfVariability,

    /// Whether location variability is modeled. ITM code +10 removes it, for
    /// example when the terminals are fixed in place on a known profile.
    pub location: bool,

    /// Whether situation variability is modeled. ITM code +20 removes it, for
    /// interference problems.
    pub situation: bool,
}

impl Default for Variability {
    fn default() -> Self {
        Self {
            mode: ModeOfVariability::default(),
            location: true,
            situation: true,
        }
    }
}

impl Variability {
    /// Parses the ITM integer code: 0 to 3 for the mode, plus 10 to
    /// eliminate location variability and/or 20 to eliminate situation
    /// variability.
    pub fn from_code(code: i32) -> Result<Self, InputError> {
        let (mode, location, situation) = Self::split_code(code);
        Ok(Self {
            mode: mode.ok_or(InputError::UnknownVariability(code))?,
            location,
            situation,
        })
    }

    /// Like [`Variability::from_code`], but falls back to single message mode
    /// when the mode part of the code is impossible, keeping the flags.
    pub fn from_code_or_default(code: i32) -> (Self, Warning) {
        let (mode, location, situation) = Self::split_code(code);
        let variability = Self {
            mode: mode.unwrap_or_default(),
            location,
            situation,
        };

        if mode.is_some() {
            (variability, Warning::None)
        } else {
            (variability, Warning::Substituted)
        }
    }

    fn split_code(code: i32) -> (Option<ModeOfVariability>, bool, bool) {
        let mut kdv = code;
        let situation = kdv < 20;
        if !situation {
            kdv -= 20;
        }

        let location = kdv < 10;
        if !location {
            kdv -= 10;
        }

        let mode = match kdv {
            0 => Some(ModeOfVariability::SingleMessage),
            1 => Some(ModeOfVariability::Accidental),
            2 => Some(ModeOfVariability::Mobile),
            3 => Some(ModeOfVariability::Broadcast),
            _ => None,
        };

        (mode, location, situation)
    }

    /// The ITM integer code.
    pub fn code(&self) -> i32 {
        let mut code = self.mode as i32;
        if !self.location {
            code += 10;
        }
        if !self.situation {
            code += 20;
        }
        code
    }
}

/// How much of the statistics must be recomputed before the next query.
///
/// Ordered: each level also recomputes everything below it. <lvar>
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Refresh {
    /// Everything is up to date.
    #[default]
    Current = 0,
    /// The distance changed.
    Distance = 1,
    /// Antenna heights changed.
    System = 2,
    /// The frequency changed.
    Frequency = 3,
    /// The mode of variability changed.
    Mode = 4,
    /// The climate changed.
    Climate = 5,
}

/// Cached statistics, valid until the next refresh.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Statistics {
    constants: ClimateConstants,
    gm: f64,
    gp: f64,
    dexa: f64,
    de: f64,
    vmd: f64,
    sgtm: f64,
    sgtp: f64,
    sgtd: f64,
    tgtd: f64,
    sgl: f64,
    vs0: f64,
}

/// Constants _rt_ and _rl_ of T.A. section 5.
const TIME_RATIO: f64 = 7.8;
const LOCATION_RATIO: f64 = 24.0;

impl Statistics {
    fn for_climate(climate: Climate) -> Self {
        Self {
            constants: climate.into(),
            ..Self::default()
        }
    }
}

impl Model {
    /// Brings the cached statistics up to date.
    ///
    /// See ITM sections `<26>` through `<31>`.
    fn refresh_statistics(&mut self) {
        let level = self.refresh;
        if level == Refresh::Current {
            return;
        }

        let wn = self.environment.wave_number;
        let he = self.geometry.effective_heights;
        let dist = self.distance;
        let dh = self.geometry.terrain_irregularity;
        let variability = self.settings.variability;

        if level >= Refresh::Climate {
            self.statistics = Statistics::for_climate(self.settings.climate);
        }

        let st = &mut self.statistics;

        if level >= Refresh::Frequency {
            let (gm, gp) = st.constants.frequency_factors(wn);
            st.gm = gm;
            st.gp = gp;
        }

        if level >= Refresh::System {
            st.dexa = (18e6 * he.0).sqrt()
                + (18e6 * he.1).sqrt()
                + (575.7e12 / wn).powf(1.0 / 3.0);
        }

        // effective distance
        st.de = if dist < st.dexa {
            130e3 * dist / st.dexa
        } else {
            130e3 + dist - st.dexa
        };

        let cc = st.constants;
        st.vmd = cc.median.at(st.de);
        st.sgtm = cc.spread_below.at(st.de) * st.gm;
        st.sgtp = cc.spread_above.at(st.de) * st.gp;
        st.sgtd = st.sgtp * cc.cd;
        st.tgtd = (st.sgtp - st.sgtd) * cc.zd;

        st.sgl = if variability.location {
            let q = (1.0 - 0.8 * (-dist / 50e3).exp()) * dh * wn;
            10.0 * q / (q + 13.0)
        } else {
            0.0
        };

        st.vs0 = if variability.situation {
            (5.0 + 3.0 * (-st.de / 100e3).exp()).powf(2.0)
        } else {
            0.0
        };

        debug!(?level, de = st.de, vmd = st.vmd, "refreshed statistics");
        self.refresh = Refresh::Current;
    }

    /// Attenuation (in dB) not exceeded for the given standard normal
    /// deviates of time, location and situation (confidence).
    ///
    /// Uses the reference attenuation of the last
    /// [`attenuation_at`](Model::attenuation_at) query. Depending on the mode
    /// of variability, some deviates are replaced by others: in single
    /// message mode only `zc` matters; in accidental mode `zl` follows `zc`;
    /// in mobile mode `zl` follows `zt`.
    ///
    /// Deviates beyond ±3.1 raise a caution.
    ///
    /// See ITM sections `<32>` through `<40>`.
    pub fn variability(&mut self, zt: f64, zl: f64, zc: f64) -> f64 {
        self.refresh_statistics();

        let mode = self.settings.variability.mode;
        let (zt, zl) = match mode {
            ModeOfVariability::SingleMessage => (zc, zc),
            ModeOfVariability::Accidental => (zt, zc),
            ModeOfVariability::Mobile => (zt, zt),
            ModeOfVariability::Broadcast => (zt, zl),
        };

        if zt.abs() > 3.1 || zl.abs() > 3.1 || zc.abs() > 3.1 {
            self.raise(Warning::Caution);
        }

        let st = &self.statistics;
        let sgt = if zt < 0.0 {
            st.sgtm
        } else if zt <= st.constants.zd {
            st.sgtp
        } else {
            st.sgtd + st.tgtd / zt
        };

        let vs = st.vs0
            + (sgt * zt).powf(2.0) / (TIME_RATIO + zc * zc)
            + (st.sgl * zl).powf(2.0) / (LOCATION_RATIO + zc * zc);

        let (yr, sgc) = match mode {
            ModeOfVariability::SingleMessage => (0.0, (sgt * sgt + st.sgl.powf(2.0) + vs).sqrt()),
            ModeOfVariability::Accidental => (sgt * zt, (st.sgl.powf(2.0) + vs).sqrt()),
            ModeOfVariability::Mobile => ((sgt * sgt + st.sgl.powf(2.0)).sqrt() * zt, vs.sqrt()),
            ModeOfVariability::Broadcast => (sgt * zt + st.sgl * zl, vs.sqrt()),
        };

        let av = self.reference - st.vmd - yr - sgc * zc;
        if av < 0.0 {
            av * (29.0 - av) / (29.0 - 10.0 * av)
        } else {
            av
        }
    }

    /// Marks part of the statistics as stale.
    ///
    /// Only needed when the model is reused across an input change it cannot
    /// see: each new distance already refreshes what depends on distance.
    pub fn invalidate(&mut self, level: Refresh) {
        self.refresh = self.refresh.max(level);
    }
}
