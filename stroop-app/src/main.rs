mod app;
mod cli;
mod participant;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use stroop_core::{DetectionRecord, Participant, TrialRecord};
use stroop_experiment::{
    DetectionSession, ExperimentConfig, StroopSession, TsvSink, timestamped_path,
};
use stroop_render::FontVec;
use stroop_timing::HighPrecisionTimer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::{App, DisplayOptions};
use cli::{Cli, Study};
use participant::PromptError;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ExperimentConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ExperimentConfig::default(),
    };

    let participant = match participant::resolve(&cli) {
        Ok(participant) => participant,
        Err(PromptError::Cancelled) => {
            info!("participant information cancelled, exiting");
            return Ok(());
        }
        Err(err) => return Err(err).context("reading participant information"),
    };

    let font = stroop_render::load_font(cli.font.as_deref())?;
    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("creating {}", cli.output_dir.display()))?;

    let rng = match cli.seed {
        Some(seed) => {
            info!(seed, "seeded trial randomization");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    };
    let path = timestamped_path(
        &cli.output_dir,
        cli.study.file_prefix(),
        &participant.id,
        Local::now(),
    );
    let display = DisplayOptions {
        title: cli.study.title().to_string(),
        windowed: cli.windowed,
    };

    match cli.study {
        Study::Stroop => run_stroop(config, participant, rng, &path, font, display),
        Study::Detection => run_detection(config, participant, rng, &path, font, display),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn run_stroop(
    config: ExperimentConfig,
    participant: Participant,
    rng: StdRng,
    path: &Path,
    font: FontVec,
    display: DisplayOptions,
) -> Result<()> {
    let sink = TsvSink::create::<TrialRecord>(path)
        .with_context(|| format!("creating {}", path.display()))?;
    info!(path = %path.display(), participant = %participant.id, "writing trial data");

    let session = StroopSession::new(
        config.stroop,
        participant,
        HighPrecisionTimer::new(),
        rng,
        sink,
    )?
    .with_output_path(path);
    let session = App::new(session, font, display).run()?;

    match session.summary() {
        Some(summary) => info!(
            trials = summary.total_trials,
            correct = summary.correct_trials,
            accuracy_pct = summary.accuracy_pct,
            mean_rt = summary.mean_rt,
            mean_rt_correct = summary.mean_rt_correct,
            "session summary"
        ),
        None => info!("no trials recorded"),
    }
    info!(rows = session.records().len(), path = %path.display(), "data saved");
    Ok(())
}

fn run_detection(
    config: ExperimentConfig,
    participant: Participant,
    rng: StdRng,
    path: &Path,
    font: FontVec,
    display: DisplayOptions,
) -> Result<()> {
    let sink = TsvSink::create::<DetectionRecord>(path)
        .with_context(|| format!("creating {}", path.display()))?;
    info!(path = %path.display(), participant = %participant.id, "writing detection data");

    let session = DetectionSession::new(
        config.detection,
        participant,
        HighPrecisionTimer::new(),
        rng,
        sink,
    )?;
    let session = App::new(session, font, display).run()?;

    info!(rows = session.answered(), path = %path.display(), "data saved");
    Ok(())
}
