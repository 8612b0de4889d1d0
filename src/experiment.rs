//! Epsilon-greedy experiment runner.
//!
//! An [`Experiment`] owns a fixed, ordered set of arms and a random source.
//! [`Experiment::run`] executes a bounded number of select → sample → record → update
//! rounds and returns an [`ExperimentReport`]. Runs are single-shot: a second run on the same instance is a
//! [`BanditError::State`] error, so repeated experiments construct a new runner.
//!
//! Notes:
//! - Seedable: [`Experiment::new`] seeds a `StdRng` from [`ExperimentConfig::seed`]
//!   (default `0`), [`Experiment::with_rng`] injects any generator.
//! - Same config + same seed → identical reward and regret logs.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::collections::BTreeSet;
use std::fmt;

use crate::arm::{uniform_index, PayoffArm, PayoffModel, DEFAULT_GAUSSIAN_STD_DEV};
use crate::decision::{greedy_index, RoundRecord, SelectionKind};
use crate::error::{BanditError, Result};
use crate::export::RoundSink;
use crate::report::{ArmReport, ExperimentReport};
use crate::schedule::EpsilonSchedule;

/// How per-round regret is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RegretMode {
    /// `chosen.true_rate - observed`: gap between the chosen arm's expectation and
    /// the payoff actually drawn.
    #[default]
    Realized,
    /// `best.true_rate - chosen.true_rate`: conventional pseudo-regret against the
    /// best arm.
    Expected,
}

impl std::str::FromStr for RegretMode {
    type Err = BanditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "realized" => Ok(RegretMode::Realized),
            "expected" | "pseudo" => Ok(RegretMode::Expected),
            other => Err(BanditError::precondition(format!(
                "unknown regret mode {other:?} (expected realized or expected)"
            ))),
        }
    }
}

/// Experiment configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExperimentConfig {
    /// Payoff distribution applied to every arm.
    pub model: PayoffModel,
    /// Standard deviation for [`PayoffModel::Gaussian`] arms.
    pub gaussian_std_dev: f64,
    pub schedule: EpsilonSchedule,
    pub regret: RegretMode,
    /// Seed for the internal RNG (ignored by [`Experiment::with_rng`]).
    pub seed: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            model: PayoffModel::default(),
            gaussian_std_dev: DEFAULT_GAUSSIAN_STD_DEV,
            schedule: EpsilonSchedule::default(),
            regret: RegretMode::default(),
            seed: 0,
        }
    }
}

impl ExperimentConfig {
    pub fn with_model(mut self, model: PayoffModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_schedule(mut self, schedule: EpsilonSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_regret(mut self, regret: RegretMode) -> Self {
        self.regret = regret;
        self
    }

    pub fn with_gaussian_std_dev(mut self, std_dev: f64) -> Self {
        self.gaussian_std_dev = std_dev;
        self
    }
}

/// Lifecycle of an [`Experiment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentState {
    /// Constructed, never run.
    Configured,
    /// Inside [`Experiment::run`].
    Running,
    /// A run finished; [`Experiment::report`] is available.
    Completed,
}

impl fmt::Display for ExperimentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExperimentState::Configured => "configured",
            ExperimentState::Running => "running",
            ExperimentState::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Seedable epsilon-greedy experiment over a fixed set of arms.
#[derive(Debug)]
pub struct Experiment<R = StdRng> {
    cfg: ExperimentConfig,
    arms: Vec<Box<dyn PayoffArm>>,
    rng: R,
    state: ExperimentState,
    epsilon: f64,
    selections: Vec<usize>,
    reward_log: Vec<f64>,
    regret_log: Vec<f64>,
}

impl Experiment<StdRng> {
    /// Build arms from `(name, true_rate)` pairs and seed the RNG from `cfg.seed`.
    pub fn new<I, S>(arms: I, cfg: ExperimentConfig) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self::with_rng(arms, cfg, StdRng::seed_from_u64(cfg.seed))
    }
}

impl<R: RngCore> Experiment<R> {
    /// Build arms from `(name, true_rate)` pairs and use `rng` for every draw.
    ///
    /// Arm order is preserved and defines tie-breaking. Duplicate names and rates the
    /// payoff model rejects are [`BanditError::Precondition`]. An empty arm set is
    /// accepted here and rejected by [`Experiment::run`].
    pub fn with_rng<I, S>(arms: I, cfg: ExperimentConfig, rng: R) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let mut built: Vec<Box<dyn PayoffArm>> = Vec::new();
        for (name, rate) in arms {
            let name: String = name.into();
            if !seen.insert(name.clone()) {
                return Err(BanditError::precondition(format!(
                    "duplicate arm name {name:?}"
                )));
            }
            built.push(cfg.model.build_arm(name, rate, cfg.gaussian_std_dev)?);
        }
        Ok(Self {
            cfg,
            arms: built,
            rng,
            state: ExperimentState::Configured,
            epsilon: 1.0,
            selections: Vec::new(),
            reward_log: Vec::new(),
            regret_log: Vec::new(),
        })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.cfg
    }

    pub fn state(&self) -> ExperimentState {
        self.state
    }

    /// Arms in construction order.
    pub fn arms(&self) -> &[Box<dyn PayoffArm>] {
        &self.arms
    }

    /// Epsilon used by the most recent round (`1.0` before any round).
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Run exactly `num_rounds` rounds and return the report.
    pub fn run(&mut self, num_rounds: usize) -> Result<ExperimentReport> {
        self.run_inner(num_rounds, None)
    }

    /// Like [`Experiment::run`], handing every round's record to `sink`.
    pub fn run_with_sink(
        &mut self,
        num_rounds: usize,
        sink: &mut dyn RoundSink,
    ) -> Result<ExperimentReport> {
        self.run_inner(num_rounds, Some(sink))
    }

    /// Report of the completed run.
    pub fn report(&self) -> Result<ExperimentReport> {
        if self.state != ExperimentState::Completed {
            return Err(BanditError::state(format!(
                "no completed run to report (experiment is {})",
                self.state
            )));
        }
        Ok(ExperimentReport::new(
            self.cfg.model,
            self.arms
                .iter()
                .map(|a| ArmReport::from_arm(a.as_ref()))
                .collect(),
            self.selections.clone(),
            self.reward_log.clone(),
            self.regret_log.clone(),
        ))
    }

    fn run_inner(
        &mut self,
        num_rounds: usize,
        mut sink: Option<&mut dyn RoundSink>,
    ) -> Result<ExperimentReport> {
        if self.state != ExperimentState::Configured {
            return Err(BanditError::state(format!(
                "experiment is {}; construct a new experiment to run again",
                self.state
            )));
        }
        if num_rounds == 0 {
            return Err(BanditError::precondition("num_rounds must be > 0"));
        }
        if self.arms.is_empty() {
            return Err(BanditError::precondition("experiment has no arms"));
        }

        tracing::info!(
            arms = self.arms.len(),
            rounds = num_rounds,
            model = %self.cfg.model,
            schedule = %self.cfg.schedule,
            "experiment started"
        );

        self.state = ExperimentState::Running;
        self.selections.reserve(num_rounds);
        self.reward_log.reserve(num_rounds);
        self.regret_log.reserve(num_rounds);

        let best_true_rate = self
            .arms
            .iter()
            .map(|a| a.true_rate())
            .fold(f64::NEG_INFINITY, f64::max);

        for round in 0..num_rounds {
            let epsilon = self.cfg.schedule.epsilon(round, num_rounds);
            self.epsilon = epsilon;
            let (idx, kind) = self.select(epsilon);

            let arm = &mut self.arms[idx];
            let observed = arm.sample(&mut self.rng);
            let regret = match self.cfg.regret {
                RegretMode::Realized => arm.true_rate() - observed,
                RegretMode::Expected => best_true_rate - arm.true_rate(),
            };
            self.regret_log.push(regret);
            self.reward_log.push(observed);
            self.selections.push(idx);
            arm.update(observed);

            tracing::trace!(
                round,
                arm = arm.name(),
                %kind,
                epsilon,
                observed,
                "round"
            );

            if let Some(s) = sink.as_deref_mut() {
                s.record(&RoundRecord {
                    round_index: round,
                    arm_index: idx,
                    arm: arm.name().to_string(),
                    observed_payoff: observed,
                    epsilon,
                    kind,
                });
            }
        }

        self.state = ExperimentState::Completed;
        let report = self.report()?;
        tracing::info!(
            rounds = report.num_rounds,
            total_regret = report.total_regret,
            mean_reward = report.mean_reward(),
            mean_regret = report.mean_regret(),
            best_arm = report.best_arm().map(|a| a.name.as_str()).unwrap_or(""),
            "experiment finished"
        );
        Ok(report)
    }

    fn select(&mut self, epsilon: f64) -> (usize, SelectionKind) {
        let k = self.arms.len();
        if self.rng.random::<f64>() < epsilon {
            return (uniform_index(&mut self.rng, k), SelectionKind::Explore);
        }
        let estimates: Vec<f64> = self.arms.iter().map(|a| a.estimate()).collect();
        (greedy_index(&estimates).unwrap_or(0), SelectionKind::Exploit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tones() -> Vec<(&'static str, f64)> {
        vec![("persuasive", 0.2), ("exciting", 0.5), ("funny", 0.8)]
    }

    #[test]
    fn report_before_run_is_state_error() {
        let e = Experiment::new(tones(), ExperimentConfig::default()).unwrap();
        assert!(matches!(e.report(), Err(BanditError::State(_))));
        assert_eq!(e.state(), ExperimentState::Configured);
    }

    #[test]
    fn zero_rounds_is_precondition_error() {
        let mut e = Experiment::new(tones(), ExperimentConfig::default()).unwrap();
        assert!(matches!(e.run(0), Err(BanditError::Precondition(_))));
        // A rejected call leaves the experiment runnable.
        assert_eq!(e.state(), ExperimentState::Configured);
        assert!(e.run(5).is_ok());
    }

    #[test]
    fn no_arms_is_precondition_error() {
        let arms: Vec<(String, f64)> = Vec::new();
        let mut e = Experiment::new(arms, ExperimentConfig::default()).unwrap();
        assert!(matches!(e.run(10), Err(BanditError::Precondition(_))));
    }

    #[test]
    fn duplicate_arm_names_rejected() {
        let r = Experiment::new(vec![("a", 0.1), ("a", 0.2)], ExperimentConfig::default());
        assert!(matches!(r, Err(BanditError::Precondition(_))));
    }

    #[test]
    fn bernoulli_rate_out_of_range_rejected() {
        let cfg = ExperimentConfig::default().with_model(PayoffModel::Bernoulli);
        assert!(Experiment::new(vec![("a", 1.2)], cfg).is_err());
    }

    #[test]
    fn second_run_is_state_error() {
        let mut e = Experiment::new(tones(), ExperimentConfig::default()).unwrap();
        e.run(10).unwrap();
        assert!(matches!(e.run(10), Err(BanditError::State(_))));
        assert_eq!(e.report().unwrap().num_rounds, 10);
    }

    #[test]
    fn logs_have_one_entry_per_round() {
        let mut e = Experiment::new(tones(), ExperimentConfig::default()).unwrap();
        let r = e.run(250).unwrap();
        assert_eq!(r.rewards.len(), 250);
        assert_eq!(r.regrets.len(), 250);
        assert_eq!(r.selections.len(), 250);
        assert_eq!(r.cumulative_regret.len(), 250);
        let pulls: u64 = r.arms.iter().map(|a| a.pull_count).sum();
        assert_eq!(pulls, 250);
        for a in &r.arms {
            assert_eq!(a.history.len() as u64, a.pull_count);
        }
        assert_eq!(e.state(), ExperimentState::Completed);
    }

    #[test]
    fn last_epsilon_is_one_over_n() {
        let mut e = Experiment::new(tones(), ExperimentConfig::default()).unwrap();
        assert_eq!(e.epsilon(), 1.0);
        e.run(20).unwrap();
        assert!((e.epsilon() - 1.0 / 20.0).abs() < 1e-12);
    }

    #[test]
    fn realized_regret_matches_definition() {
        let mut e = Experiment::new(tones(), ExperimentConfig::default()).unwrap();
        let r = e.run(50).unwrap();
        for t in 0..50 {
            let arm = &r.arms[r.selections[t]];
            assert_eq!(r.regrets[t], arm.true_rate - r.rewards[t]);
        }
    }

    #[test]
    fn expected_regret_is_gap_to_best_arm() {
        let cfg = ExperimentConfig::default().with_regret(RegretMode::Expected);
        let mut e = Experiment::new(tones(), cfg).unwrap();
        let r = e.run(50).unwrap();
        for t in 0..50 {
            let arm = &r.arms[r.selections[t]];
            assert!((r.regrets[t] - (0.8 - arm.true_rate)).abs() < 1e-12);
            assert!(r.regrets[t] >= 0.0);
        }
    }

    #[test]
    fn zero_epsilon_always_exploits_lowest_index_first() {
        // Every estimate starts at 0, so the first greedy pick is arm 0.
        let cfg = ExperimentConfig::default()
            .with_model(PayoffModel::Bernoulli)
            .with_schedule(EpsilonSchedule::Constant(0.0));
        let mut e = Experiment::new(vec![("a", 1.0), ("b", 1.0)], cfg).unwrap();
        let r = e.run(10).unwrap();
        assert!(r.selections.iter().all(|&i| i == 0));
    }

    #[test]
    fn sink_sees_every_round() {
        let mut records: Vec<RoundRecord> = Vec::new();
        let mut e = Experiment::new(tones(), ExperimentConfig::default()).unwrap();
        let r = e.run_with_sink(40, &mut records).unwrap();
        assert_eq!(records.len(), 40);
        for (t, rec) in records.iter().enumerate() {
            assert_eq!(rec.round_index, t);
            assert_eq!(rec.arm_index, r.selections[t]);
            assert_eq!(rec.arm, r.arms[rec.arm_index].name);
            assert_eq!(rec.observed_payoff, r.rewards[t]);
        }
        assert_eq!(records[0].kind, SelectionKind::Explore);
        assert_eq!(records[0].epsilon, 1.0);
    }

    #[test]
    fn injected_rng_is_used() {
        let cfg = ExperimentConfig::default();
        let mut a = Experiment::with_rng(tones(), cfg, StdRng::seed_from_u64(9)).unwrap();
        let mut b = Experiment::new(tones(), cfg.with_seed(9)).unwrap();
        assert_eq!(a.run(30).unwrap().rewards, b.run(30).unwrap().rewards);
    }

    #[test]
    fn regret_mode_parses() {
        assert_eq!(
            "realized".parse::<RegretMode>().unwrap(),
            RegretMode::Realized
        );
        assert_eq!(
            "Expected".parse::<RegretMode>().unwrap(),
            RegretMode::Expected
        );
        assert!("other".parse::<RegretMode>().is_err());
    }
}
