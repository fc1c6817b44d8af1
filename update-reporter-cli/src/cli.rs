use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

/// Deliver a dependency update report to the configured notification
/// services
#[derive(Parser)]
#[command(name = "update-reporter", version)]
pub struct Cli {
    /// Path to the update-check result JSON file
    #[arg(short, long)]
    pub input: PathBuf,

    /// TOML settings file with an [update-check] section; environment
    /// variables override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Machine-readable mode: suppress per-service status lines
    #[arg(long)]
    pub json: bool,

    /// Render reports without contacting any service
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,
}
