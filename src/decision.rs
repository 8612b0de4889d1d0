//! Per-round decision records.
//!
//! Every round of an experiment produces one [`RoundRecord`]: which arm was chosen,
//! why (explore vs exploit), the epsilon in force and the payoff observed. Records
//! are what export sinks append to tabular stores and what replays consume.

use std::fmt;

/// Why an arm was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SelectionKind {
    /// Uniform random pick (probability epsilon).
    Explore,
    /// Highest current estimate, lowest index on ties.
    Exploit,
}

impl SelectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SelectionKind::Explore => "explore",
            SelectionKind::Exploit => "exploit",
        }
    }
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One round of an experiment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundRecord {
    /// 0-based round index.
    pub round_index: usize,
    /// Index of the chosen arm in construction order.
    pub arm_index: usize,
    /// Name of the chosen arm.
    pub arm: String,
    /// Payoff drawn from the chosen arm.
    pub observed_payoff: f64,
    /// Exploration probability used this round.
    pub epsilon: f64,
    pub kind: SelectionKind,
}

/// Index of the largest estimate; ties go to the lowest index.
///
/// Returns `None` for an empty slice. NaN estimates never win.
pub fn greedy_index(estimates: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut best_value = f64::NEG_INFINITY;
    for (i, &v) in estimates.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        // Strict `>` keeps the earliest index on exact ties.
        if best.is_none() || v > best_value {
            best = Some(i);
            best_value = v;
        }
    }
    best.or(if estimates.is_empty() { None } else { Some(0) })
}
