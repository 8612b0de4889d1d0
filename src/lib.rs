//! `adtone`: seedable epsilon-greedy bandit experiments for advertisement tones.
//!
//! Each tone ("persuasive", "exciting", "funny", ...) is an arm with a true payoff
//! rate the policy never sees. An [`Experiment`] repeatedly picks an arm, draws a
//! payoff, records regret and updates the arm's running estimate, with an exploration
//! rate that decays over the run.
//!
//! **Goals:**
//! - **Deterministic by default**: same arms + config + seed → same logs.
//! - **Data out, not pictures**: reports carry learning curves and regret totals;
//!   plotting and storage are left to the caller.
//! - **Small K**: a handful of tones per experiment.
//!
//! **Pieces:**
//! - [`PayoffArm`] with [`BernoulliArm`] (`{0, 1}` payoff) and [`GaussianArm`]
//!   (`Normal(true_rate, 0.05)` click-through simulation), picked via [`PayoffModel`].
//! - [`EpsilonSchedule`]: linear decay `1 - i/N` (default), `1/(i+1)`, or constant.
//! - [`Experiment`]: the select → sample → regret → update loop.
//! - [`ExperimentReport`]: estimates, learning curves, reward/regret logs.
//! - [`RoundSink`] / [`CsvRoundWriter`]: per-round export hook.
//! - [`prompt`]: ad-copy prompt construction for an external [`Completer`], with a
//!   seedable presentation order ([`shuffled_tones`]).
//! - [`feedback`]: dashboard aggregation over user selections.
//!
//! ```rust
//! use adtone::{Experiment, ExperimentConfig, PayoffModel};
//!
//! let cfg = ExperimentConfig::default()
//!     .with_model(PayoffModel::Bernoulli)
//!     .with_seed(7);
//! let mut exp = Experiment::new(
//!     [("persuasive", 0.2), ("exciting", 0.5), ("funny", 0.8)],
//!     cfg,
//! )
//! .unwrap();
//! let report = exp.run(500).unwrap();
//! assert_eq!(report.rewards.len(), 500);
//! assert_eq!(report.cumulative_regret.len(), 500);
//! ```
//!
//! **Regret.** By default a round's regret is `chosen.true_rate - observed`, the gap
//! between the chosen arm's expectation and its realized payoff. This is not the
//! textbook definition; [`RegretMode::Expected`] gives the conventional
//! `best.true_rate - chosen.true_rate`.
//!
//! **Non-goals:** no networking, persistence or concurrency. A run is single-shot.

#![forbid(unsafe_code)]

mod error;
pub use error::*;

mod arm;
pub use arm::*;

mod schedule;
pub use schedule::*;

mod decision;
pub use decision::*;

mod report;
pub use report::*;

mod export;
pub use export::*;

mod experiment;
pub use experiment::*;

pub mod feedback;
pub mod prompt;

pub use feedback::{DashboardSummary, Selection};
pub use prompt::{
    build_prompt, generate_candidates, generate_shuffled_candidates, shuffled_tones, AdCandidate,
    AdLength, AdRequest, Completer, Tone,
};
