//! `adtone`: run an epsilon-greedy tone experiment from the command line.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use adtone::{
    write_report_json, CsvRoundWriter, EpsilonSchedule, Experiment, ExperimentConfig, PayoffModel,
    RegretMode,
};
use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "adtone")]
#[command(about = "Epsilon-greedy bandit experiment over advertisement tones")]
#[command(version)]
struct Cli {
    /// Arm as name=rate (repeatable). Defaults to persuasive=0.2 exciting=0.5 funny=0.8
    #[arg(long = "arm", value_parser = parse_arm)]
    arms: Vec<(String, f64)>,

    /// Number of rounds
    #[arg(long, default_value_t = 1000, env = "ADTONE_ROUNDS")]
    rounds: usize,

    /// Payoff model: bernoulli or gaussian
    #[arg(long, default_value = "gaussian", env = "ADTONE_MODEL")]
    model: PayoffModel,

    /// Standard deviation of gaussian payoffs
    #[arg(long, default_value_t = adtone::DEFAULT_GAUSSIAN_STD_DEV)]
    std_dev: f64,

    /// Epsilon schedule: linear, inverse or constant:<e>
    #[arg(long, default_value = "linear", env = "ADTONE_SCHEDULE")]
    schedule: EpsilonSchedule,

    /// Regret definition: realized or expected
    #[arg(long, default_value = "realized")]
    regret: RegretMode,

    /// RNG seed
    #[arg(long, default_value_t = 0, env = "ADTONE_SEED")]
    seed: u64,

    /// Write per-round records as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the full report as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

fn parse_arm(s: &str) -> Result<(String, f64), String> {
    let (name, rate) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=rate, got {s:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty arm name in {s:?}"));
    }
    let rate: f64 = rate
        .trim()
        .parse()
        .map_err(|e| format!("invalid rate in {s:?}: {e}"))?;
    Ok((name.to_string(), rate))
}

fn default_arms() -> Vec<(String, f64)> {
    vec![
        ("persuasive".to_string(), 0.2),
        ("exciting".to_string(), 0.5),
        ("funny".to_string(), 0.8),
    ]
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adtone=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.rounds == 0 {
        bail!("--rounds must be > 0");
    }

    let cfg = ExperimentConfig::default()
        .with_model(cli.model)
        .with_gaussian_std_dev(cli.std_dev)
        .with_schedule(cli.schedule)
        .with_regret(cli.regret)
        .with_seed(cli.seed);

    let arms = if cli.arms.is_empty() {
        default_arms()
    } else {
        cli.arms
    };

    let mut experiment = Experiment::new(arms, cfg).context("invalid experiment setup")?;

    let report = match &cli.csv {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut writer = CsvRoundWriter::new(BufWriter::new(file))?;
            let report = experiment.run_with_sink(cli.rounds, &mut writer)?;
            let rows = writer.rows();
            writer
                .finish()
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), rows, "round records written");
            report
        }
        None => experiment.run(cli.rounds)?,
    };

    if let Some(path) = &cli.json {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_report_json(BufWriter::new(file), &report)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }

    print!("{report}");
    Ok(())
}
