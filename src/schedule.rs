//! Exploration-rate schedules for epsilon-greedy selection.

use std::fmt;
use std::str::FromStr;

use crate::error::{BanditError, Result};

/// How epsilon evolves over the rounds of one experiment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EpsilonSchedule {
    /// `1 - i/N`: pure exploration on round 0, `1/N` on the last round.
    #[default]
    LinearDecay,
    /// `1 / (i + 1)`.
    InverseTime,
    /// Fixed rate. [`EpsilonSchedule::epsilon`] clamps it into `[0, 1]` (NaN reads as
    /// `0`); build through [`EpsilonSchedule::constant`] to reject such rates instead.
    Constant(f64),
}

impl EpsilonSchedule {
    /// Fixed-rate schedule; `e` must lie in `[0, 1]`.
    pub fn constant(e: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&e) {
            return Err(BanditError::precondition(format!(
                "constant epsilon must be in [0, 1], got {e}"
            )));
        }
        Ok(EpsilonSchedule::Constant(e))
    }

    /// Exploration probability for 0-based round `round` out of `num_rounds`.
    ///
    /// Always within `[0, 1]`.
    pub fn epsilon(&self, round: usize, num_rounds: usize) -> f64 {
        let e = match *self {
            EpsilonSchedule::LinearDecay => {
                if num_rounds == 0 {
                    return 0.0;
                }
                1.0 - (round as f64) / (num_rounds as f64)
            }
            EpsilonSchedule::InverseTime => 1.0 / ((round as f64) + 1.0),
            EpsilonSchedule::Constant(e) => e,
        };
        if e.is_finite() {
            e.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl fmt::Display for EpsilonSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpsilonSchedule::LinearDecay => f.write_str("linear"),
            EpsilonSchedule::InverseTime => f.write_str("inverse"),
            EpsilonSchedule::Constant(e) => write!(f, "constant:{e}"),
        }
    }
}

/// Parses `linear`, `inverse`, or `constant:<e>`.
impl FromStr for EpsilonSchedule {
    type Err = BanditError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "linear" | "linear_decay" => return Ok(EpsilonSchedule::LinearDecay),
            "inverse" | "inverse_time" => return Ok(EpsilonSchedule::InverseTime),
            _ => {}
        }
        if let Some(raw) = s.strip_prefix("constant:") {
            let e: f64 = raw.parse().map_err(|_| {
                BanditError::precondition(format!("invalid constant epsilon {raw:?}"))
            })?;
            return EpsilonSchedule::constant(e);
        }
        Err(BanditError::precondition(format!(
            "unknown epsilon schedule {s:?} (expected linear, inverse or constant:<e>)"
        )))
    }
}
