//! CLI argument parsing for turnstile

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::sequence::Sequence;

#[derive(Parser, Debug)]
#[command(name = "tn")]
#[command(author, version, about = "Two threads taking strict turns on one output", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interleave the uppercase and lowercase alphabets (AaBb...Zz)
    Letters {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Count up with one thread printing odd numbers and the other even
    OddEven {
        /// Highest number to print (default: 100)
        #[arg(short, long)]
        max: Option<u64>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Interleave two arbitrary sequences
    Run {
        /// Participant A's symbols: a range like A-Z or literal symbols like AB
        #[arg(required = true, value_parser = parse_sequence)]
        a: Sequence,

        /// Participant B's symbols
        #[arg(required = true, value_parser = parse_sequence)]
        b: Sequence,

        #[command(flatten)]
        run: RunArgs,
    },
}

/// Options shared by every run command; each overrides the config file
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Also write the interleaved stream to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not echo symbols to stdout
    #[arg(long)]
    pub no_console: bool,

    /// Pause after each handoff, in milliseconds
    #[arg(short, long)]
    pub delay_ms: Option<u64>,

    /// Give up waiting for a turn after this many milliseconds
    #[arg(short, long)]
    pub timeout_ms: Option<u64>,
}

fn parse_sequence(s: &str) -> Result<Sequence, String> {
    s.parse().map_err(|e: crate::error::SequenceError| e.to_string())
}
