//! Experiment reports.
//!
//! A report is plain data: per-arm estimates and learning curves, the reward and
//! regret logs, and the running regret total. Plotting and persistence happen
//! outside this crate.

use std::fmt;

use crate::arm::{PayoffArm, PayoffModel};
use crate::decision::greedy_index;

/// Final state of one arm.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmReport {
    pub name: String,
    pub true_rate: f64,
    pub estimate: f64,
    pub pull_count: u64,
    /// Estimate after each update (the arm's learning curve).
    pub history: Vec<f64>,
}

impl ArmReport {
    pub(crate) fn from_arm(arm: &dyn PayoffArm) -> Self {
        Self {
            name: arm.name().to_string(),
            true_rate: arm.true_rate(),
            estimate: arm.estimate(),
            pull_count: arm.pull_count(),
            history: arm.history().to_vec(),
        }
    }
}

/// Borrowed learning curve for one arm, handed to a plotting collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningCurve<'a> {
    pub arm: &'a str,
    pub true_rate: f64,
    pub points: &'a [f64],
}

/// Outcome of a completed experiment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExperimentReport {
    pub model: PayoffModel,
    pub num_rounds: usize,
    /// Arms in construction order.
    pub arms: Vec<ArmReport>,
    /// Chosen arm index per round.
    pub selections: Vec<usize>,
    /// Observed payoff per round.
    pub rewards: Vec<f64>,
    /// Instantaneous regret per round.
    pub regrets: Vec<f64>,
    /// Running sum of `regrets`.
    pub cumulative_regret: Vec<f64>,
    /// Last value of `cumulative_regret` (`0.0` if empty).
    pub total_regret: f64,
}

impl ExperimentReport {
    pub(crate) fn new(
        model: PayoffModel,
        arms: Vec<ArmReport>,
        selections: Vec<usize>,
        rewards: Vec<f64>,
        regrets: Vec<f64>,
    ) -> Self {
        let cumulative_regret = cumulative_sum(&regrets);
        let total_regret = cumulative_regret.last().copied().unwrap_or(0.0);
        Self {
            model,
            num_rounds: rewards.len(),
            arms,
            selections,
            rewards,
            regrets,
            cumulative_regret,
            total_regret,
        }
    }

    pub fn total_reward(&self) -> f64 {
        self.rewards.iter().sum()
    }

    /// Average observed payoff per round.
    pub fn mean_reward(&self) -> f64 {
        mean(&self.rewards)
    }

    /// Average regret per round.
    pub fn mean_regret(&self) -> f64 {
        mean(&self.regrets)
    }

    /// Arm with the highest final estimate (lowest index on ties).
    pub fn best_arm(&self) -> Option<&ArmReport> {
        let estimates: Vec<f64> = self.arms.iter().map(|a| a.estimate).collect();
        greedy_index(&estimates).and_then(|i| self.arms.get(i))
    }

    /// One learning curve per arm, in construction order.
    pub fn learning_curves(&self) -> Vec<LearningCurve<'_>> {
        self.arms
            .iter()
            .map(|a| LearningCurve {
                arm: &a.name,
                true_rate: a.true_rate,
                points: &a.history,
            })
            .collect()
    }

    /// Pulls per arm over the final `fraction` of rounds.
    ///
    /// `fraction` is clamped to `[0, 1]`; at least one round is counted when any exist
    /// and `fraction > 0`.
    pub fn tail_pull_counts(&self, fraction: f64) -> Vec<u64> {
        let mut counts = vec![0u64; self.arms.len()];
        let n = self.selections.len();
        let f = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if n == 0 || f == 0.0 {
            return counts;
        }
        let tail = ((n as f64) * f).ceil().max(1.0) as usize;
        for &i in &self.selections[n - tail.min(n)..] {
            if let Some(c) = counts.get_mut(i) {
                *c += 1;
            }
        }
        counts
    }
}

impl fmt::Display for ExperimentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} rounds ({} payoff), total regret {:.4}, mean reward {:.4}, mean regret {:.4}",
            self.num_rounds,
            self.model,
            self.total_regret,
            self.mean_reward(),
            self.mean_regret()
        )?;
        for a in &self.arms {
            writeln!(
                f,
                "  {:<16} true {:.4}  estimate {:.4}  pulls {}",
                a.name, a.true_rate, a.estimate, a.pull_count
            )?;
        }
        Ok(())
    }
}

fn cumulative_sum(xs: &[f64]) -> Vec<f64> {
    let mut acc = 0.0;
    xs.iter()
        .map(|&x| {
            acc += x;
            acc
        })
        .collect()
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<f64>() / (xs.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arm(name: &str, estimate: f64, history: Vec<f64>) -> ArmReport {
        ArmReport {
            name: name.to_string(),
            true_rate: 0.5,
            estimate,
            pull_count: history.len() as u64,
            history,
        }
    }

    fn sample_report() -> ExperimentReport {
        ExperimentReport::new(
            PayoffModel::Bernoulli,
            vec![arm("a", 0.25, vec![0.0, 0.5, 0.25]), arm("b", 1.0, vec![1.0, 1.0])],
            vec![0, 1, 0, 1, 0],
            vec![0.0, 1.0, 1.0, 1.0, 0.0],
            vec![0.5, -0.5, -0.5, -0.5, 0.5],
        )
    }

    #[test]
    fn cumulative_regret_is_running_total() {
        let r = sample_report();
        assert_eq!(r.cumulative_regret, vec![0.5, 0.0, -0.5, -1.0, -0.5]);
        assert_eq!(r.total_regret, -0.5);
        assert_eq!(r.num_rounds, 5);
    }

    #[test]
    fn means_and_totals() {
        let r = sample_report();
        assert_eq!(r.total_reward(), 3.0);
        assert!((r.mean_reward() - 0.6).abs() < 1e-12);
        assert!((r.mean_regret() + 0.1).abs() < 1e-12);
    }

    #[test]
    fn best_arm_uses_final_estimate() {
        assert_eq!(sample_report().best_arm().unwrap().name, "b");
    }

    #[test]
    fn learning_curves_borrow_histories() {
        let r = sample_report();
        let curves = r.learning_curves();
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].arm, "a");
        assert_eq!(curves[0].points, &[0.0, 0.5, 0.25]);
    }

    #[test]
    fn tail_pull_counts_cover_final_rounds() {
        let r = sample_report();
        assert_eq!(r.tail_pull_counts(1.0), vec![3, 2]);
        assert_eq!(r.tail_pull_counts(0.4), vec![1, 1]);
        assert_eq!(r.tail_pull_counts(0.1), vec![1, 0]);
        assert_eq!(r.tail_pull_counts(0.0), vec![0, 0]);
    }

    #[test]
    fn empty_report_is_well_defined() {
        let r = ExperimentReport::new(
            PayoffModel::Gaussian,
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(r.total_regret, 0.0);
        assert_eq!(r.mean_reward(), 0.0);
        assert!(r.best_arm().is_none());
    }

    #[test]
    fn display_lists_every_arm() {
        let s = sample_report().to_string();
        assert!(s.contains("5 rounds (bernoulli payoff)"));
        assert!(s.contains("  a "));
        assert!(s.contains("  b "));
    }
}
