//! Bandit arms: one selectable tone with a fixed true payoff and a learned estimate.
//!
//! Two payoff models are provided:
//! - [`BernoulliArm`]: payoff is `1.0` with probability `true_rate`, else `0.0`.
//! - [`GaussianArm`]: payoff is drawn from `Normal(true_rate, std_dev)` (click-through
//!   rate simulation; default `std_dev` is [`DEFAULT_GAUSSIAN_STD_DEV`]).
//!
//! Arms never own a random source. The caller passes one in, so a single seeded
//! generator drives a whole experiment.

use rand::{Rng, RngCore};
use rand_distr::{Bernoulli, Distribution, Normal};
use std::fmt;
use std::str::FromStr;

use crate::error::{BanditError, Result};

/// Standard deviation used by the Gaussian payoff model unless overridden.
pub const DEFAULT_GAUSSIAN_STD_DEV: f64 = 0.05;

/// Capability set shared by every payoff model.
pub trait PayoffArm: fmt::Debug {
    /// Arm name (unique within an experiment).
    fn name(&self) -> &str;

    /// Ground-truth expected payoff. Never changes after construction.
    fn true_rate(&self) -> f64;

    /// Draw one realization of the payoff.
    fn sample(&self, rng: &mut dyn RngCore) -> f64;

    /// Fold one observed payoff into the running mean.
    fn update(&mut self, observed: f64);

    /// Current sample-mean estimate (`0.0` before any update).
    fn estimate(&self) -> f64;

    /// Number of updates so far.
    fn pull_count(&self) -> u64;

    /// Estimate recorded after each update, oldest first.
    fn history(&self) -> &[f64];
}

/// Running sample mean plus its learning curve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningEstimate {
    estimate: f64,
    pulls: u64,
    history: Vec<f64>,
}

impl RunningEstimate {
    pub fn new() -> Self {
        Self::default()
    }

    /// `estimate += (observed - estimate) / n`, then record the new estimate.
    pub fn update(&mut self, observed: f64) {
        self.pulls = self.pulls.saturating_add(1);
        self.estimate += (observed - self.estimate) / (self.pulls as f64);
        self.history.push(self.estimate);
    }

    pub fn estimate(&self) -> f64 {
        self.estimate
    }

    pub fn pulls(&self) -> u64 {
        self.pulls
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }
}

/// Arm with a `{0, 1}` payoff.
#[derive(Debug, Clone)]
pub struct BernoulliArm {
    name: String,
    true_rate: f64,
    dist: Bernoulli,
    stats: RunningEstimate,
}

impl BernoulliArm {
    /// `true_rate` must be a probability in `[0, 1]`.
    pub fn new(name: impl Into<String>, true_rate: f64) -> Result<Self> {
        let name = name.into();
        let dist = Bernoulli::new(true_rate).map_err(|_| {
            BanditError::precondition(format!(
                "arm {name:?}: bernoulli rate must be in [0, 1], got {true_rate}"
            ))
        })?;
        Ok(Self {
            name,
            true_rate,
            dist,
            stats: RunningEstimate::new(),
        })
    }
}

impl PayoffArm for BernoulliArm {
    fn name(&self) -> &str {
        &self.name
    }

    fn true_rate(&self) -> f64 {
        self.true_rate
    }

    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        if self.dist.sample(rng) {
            1.0
        } else {
            0.0
        }
    }

    fn update(&mut self, observed: f64) {
        self.stats.update(observed);
    }

    fn estimate(&self) -> f64 {
        self.stats.estimate()
    }

    fn pull_count(&self) -> u64 {
        self.stats.pulls()
    }

    fn history(&self) -> &[f64] {
        self.stats.history()
    }
}

/// Arm with a normally distributed payoff centred on `true_rate`.
#[derive(Debug, Clone)]
pub struct GaussianArm {
    name: String,
    true_rate: f64,
    dist: Normal<f64>,
    stats: RunningEstimate,
}

impl GaussianArm {
    /// Gaussian arm with the default standard deviation.
    pub fn new(name: impl Into<String>, true_rate: f64) -> Result<Self> {
        Self::with_std_dev(name, true_rate, DEFAULT_GAUSSIAN_STD_DEV)
    }

    /// `true_rate` must be finite; `std_dev` must be finite and `> 0`.
    pub fn with_std_dev(name: impl Into<String>, true_rate: f64, std_dev: f64) -> Result<Self> {
        let name = name.into();
        if !true_rate.is_finite() {
            return Err(BanditError::precondition(format!(
                "arm {name:?}: true rate must be finite, got {true_rate}"
            )));
        }
        if !(std_dev.is_finite() && std_dev > 0.0) {
            return Err(BanditError::precondition(format!(
                "arm {name:?}: std dev must be finite and > 0, got {std_dev}"
            )));
        }
        let dist = Normal::new(true_rate, std_dev)
            .map_err(|e| BanditError::precondition(format!("arm {name:?}: {e}")))?;
        Ok(Self {
            name,
            true_rate,
            dist,
            stats: RunningEstimate::new(),
        })
    }

    pub fn std_dev(&self) -> f64 {
        self.dist.std_dev()
    }
}

impl PayoffArm for GaussianArm {
    fn name(&self) -> &str {
        &self.name
    }

    fn true_rate(&self) -> f64 {
        self.true_rate
    }

    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        self.dist.sample(rng)
    }

    fn update(&mut self, observed: f64) {
        self.stats.update(observed);
    }

    fn estimate(&self) -> f64 {
        self.stats.estimate()
    }

    fn pull_count(&self) -> u64 {
        self.stats.pulls()
    }

    fn history(&self) -> &[f64] {
        self.stats.history()
    }
}

/// Which payoff distribution every arm of an experiment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PayoffModel {
    Bernoulli,
    #[default]
    Gaussian,
}

impl PayoffModel {
    /// Build an arm of this model. `std_dev` is ignored for Bernoulli arms.
    pub fn build_arm(
        self,
        name: impl Into<String>,
        true_rate: f64,
        std_dev: f64,
    ) -> Result<Box<dyn PayoffArm>> {
        Ok(match self {
            PayoffModel::Bernoulli => Box::new(BernoulliArm::new(name, true_rate)?),
            PayoffModel::Gaussian => Box::new(GaussianArm::with_std_dev(name, true_rate, std_dev)?),
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PayoffModel::Bernoulli => "bernoulli",
            PayoffModel::Gaussian => "gaussian",
        }
    }
}

impl fmt::Display for PayoffModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayoffModel {
    type Err = BanditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bernoulli" => Ok(PayoffModel::Bernoulli),
            "gaussian" | "normal" => Ok(PayoffModel::Gaussian),
            other => Err(BanditError::precondition(format!(
                "unknown payoff model {other:?} (expected bernoulli or gaussian)"
            ))),
        }
    }
}

/// Draw a uniform index in `0..k`. `k` must be non-zero.
pub(crate) fn uniform_index(rng: &mut dyn RngCore, k: usize) -> usize {
    rng.random_range(0..k)
}
