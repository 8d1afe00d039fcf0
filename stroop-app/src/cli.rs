use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stroop_core::Gender;

#[derive(Debug, Parser, Clone)]
#[command(name = "stroop-prime")]
#[command(about = "Masked-prime Stroop experiment and prime-detection pilot")]
pub struct Cli {
    #[command(subcommand)]
    pub study: Study,

    /// JSON file overriding the default experiment parameters.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// TrueType/OpenType font for all text; a system font is used otherwise.
    #[arg(long, global = true)]
    pub font: Option<PathBuf>,

    /// Directory the TSV data file is written to.
    #[arg(long, global = true, default_value = ".")]
    pub output_dir: PathBuf,

    /// Run in a normal window instead of full screen.
    #[arg(long, global = true)]
    pub windowed: bool,

    /// Seed for trial randomization (reproducible trial order).
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Participant ID; when missing, all participant fields are asked for on the terminal.
    #[arg(long, global = true)]
    pub participant_id: Option<String>,

    #[arg(long, global = true)]
    pub age: Option<String>,

    /// male, female, other or "prefer not to say"
    #[arg(long, global = true)]
    pub gender: Option<Gender>,
}

#[derive(Debug, Subcommand, Clone, Copy, PartialEq, Eq)]
pub enum Study {
    /// Masked-prime Stroop / color-block task
    Stroop,
    /// Prime-visibility pilot
    Detection,
}

impl Study {
    pub fn file_prefix(self) -> &'static str {
        match self {
            Study::Stroop => "stroop_data",
            Study::Detection => "prime_detection_data",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Study::Stroop => "Stroop Prime Experiment",
            Study::Detection => "Prime Detection",
        }
    }
}
