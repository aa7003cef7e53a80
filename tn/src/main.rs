//! Turnstile - CLI entry point
//!
//! Builds the sink, runs both workers and joins them before exiting.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use turnstile::cli::{Cli, Command, RunArgs};
use turnstile::config::Config;
use turnstile::{
    ConsoleSink, FileSink, Layout, Participant, RunReport, Sequence, Session, Sink, TeeSink, Worker, WriterSink,
};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > config file > WARN, keeping stdout for symbols
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to WARN", s);
                tracing::Level::WARN
            }
        },
        None => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to install subscriber: {}", e))?;

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

/// Config values with CLI overrides applied
#[derive(Debug)]
struct Settings {
    output: Option<PathBuf>,
    console: bool,
    delay: Duration,
    timeout: Option<Duration>,
}

impl Settings {
    fn resolve(config: &Config, run: &RunArgs) -> Self {
        Self {
            output: run.output.clone().or_else(|| config.output_path.clone()),
            console: config.console && !run.no_console,
            delay: run.delay_ms.map(Duration::from_millis).unwrap_or_else(|| config.delay()),
            timeout: run.timeout_ms.map(Duration::from_millis).or_else(|| config.turn_timeout()),
        }
    }

    fn apply(&self, worker: Worker) -> Worker {
        let worker = worker.with_delay(self.delay);
        match self.timeout {
            Some(timeout) => worker.with_timeout(timeout),
            None => worker,
        }
    }
}

fn build_sink(settings: &Settings, console_layout: Layout, file_layout: Layout) -> Result<Box<dyn Sink>> {
    let console: Option<Box<dyn Sink>> = if settings.console {
        Some(Box::new(ConsoleSink::stdout(console_layout)))
    } else {
        None
    };

    let file: Option<Box<dyn Sink>> = match &settings.output {
        Some(path) => {
            let sink = FileSink::create(path, file_layout)
                .context(format!("Failed to open output file: {}", path.display()))?;
            Some(Box::new(sink))
        }
        None => None,
    };

    let sink: Box<dyn Sink> = match (console, file) {
        (Some(console), Some(file)) => Box::new(TeeSink::new(console, file)),
        (Some(sink), None) | (None, Some(sink)) => sink,
        (None, None) => Box::new(WriterSink::new(io::sink(), Layout::Stream)),
    };
    Ok(sink)
}

fn execute(
    session: Session,
    settings: &Settings,
    console_layout: Layout,
    file_layout: Layout,
) -> Result<RunReport<Box<dyn Sink>>> {
    debug!(?settings, "execute: called");
    // Sink is opened before any worker starts; failure aborts the run
    let sink = build_sink(settings, console_layout, file_layout)?;
    let session = session.map_workers(|worker| settings.apply(worker));
    let report = session.run(sink).context("Turn-taking session failed")?;
    info!(total = report.total(), "execute: session complete");
    Ok(report)
}

fn print_summary(report: &RunReport<Box<dyn Sink>>) {
    println!(
        "{} {} symbols written ({}: {}, {}: {})",
        "✓".green(),
        report.total(),
        Participant::A,
        report.a.emitted,
        Participant::B,
        report.b.emitted
    );
}

fn cmd_letters(config: &Config, run: &RunArgs) -> Result<()> {
    let settings = Settings::resolve(config, run);
    let report = execute(Session::letters(), &settings, Layout::Columns, Layout::Stream)?;
    print_summary(&report);
    if let Some(path) = &settings.output {
        println!("Written AaBbCc...Zz pattern to {}", path.display().to_string().cyan());
    }
    Ok(())
}

fn cmd_odd_even(config: &Config, max: Option<u64>, run: &RunArgs) -> Result<()> {
    let settings = Settings::resolve(config, run);
    let max = max.unwrap_or(config.odd_even_max);
    let labels = Layout::Labelled {
        a: "Odd".to_string(),
        b: "Even".to_string(),
    };
    let report = execute(Session::odd_even(max), &settings, labels, Layout::Lines)?;
    println!("Both threads finished printing up to {}.", max);
    print_summary(&report);
    Ok(())
}

fn cmd_run(config: &Config, a: Sequence, b: Sequence, run: &RunArgs) -> Result<()> {
    let settings = Settings::resolve(config, run);
    let session = Session::new(Worker::new(Participant::A, a), Worker::new(Participant::B, b))?;
    let report = execute(session, &settings, Layout::Columns, Layout::Stream)?;
    print_summary(&report);
    if let Some(path) = &settings.output {
        println!("Written to {}", path.display().to_string().cyan());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log level from config file is needed before the full load
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!("turnstile starting");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Letters { run } => cmd_letters(&config, &run),
        Command::OddEven { max, run } => cmd_odd_even(&config, max, &run),
        Command::Run { a, b, run } => cmd_run(&config, a, b, &run),
    }
}
