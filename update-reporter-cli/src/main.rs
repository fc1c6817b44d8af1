mod cli;

use std::fs;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::level_filters::LevelFilter;

use cli::Cli;
use update_reporter::io::ConsoleSink;
use update_reporter::{
    CheckResult, Configuration, Options, OutputBehavior, Reporter, Style, Verbosity,
};

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.verbosity.tracing_level_filter())
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    }
}

async fn run(args: Cli) -> anyhow::Result<bool> {
    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let result: CheckResult = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse check result {}", args.input.display()))?;

    let configuration = match &args.config {
        Some(path) => Configuration::from_settings_file(path)?,
        None => Configuration::empty(),
    };

    let style = if args.json { Style::Json } else { Style::Normal };
    let verbosity = if args.verbosity.is_silent() {
        Verbosity::Quiet
    } else if args.verbosity.tracing_level_filter() > LevelFilter::INFO {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };

    let mut reporter = Reporter::new(configuration);
    reporter.set_behavior(OutputBehavior::new(style, verbosity, Arc::new(ConsoleSink)));
    reporter.set_options(Options {
        dry_run: args.dry_run,
    });

    let run = reporter.report(&result).await?;
    for outcome in run.outcomes() {
        if let Err(source) = &outcome.result {
            eprintln!("error: {source}");
        }
    }

    Ok(run.successful())
}
