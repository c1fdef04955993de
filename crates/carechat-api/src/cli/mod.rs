//! CLI command definitions for the `carechat` binary.
//!
//! Uses clap derive macros for argument parsing. Storage-backed commands
//! share one `AppState`; `register` runs intake only and never touches the
//! database.

pub mod chat_log;
pub mod register;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use carechat_observe::tracing_setup::LogFormat;

/// Healthcare chatbot session intake and chat logging.
#[derive(Parser)]
#[command(name = "carechat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormatArg::Pretty, global = true)]
    pub log_format: LogFormatArg,

    /// Path to a TOML config file with a `[store]` table.
    #[arg(long, env = "CARECHAT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default filter directive derived from `-v` / `--quiet`.
    pub fn filter_directive(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,carechat=debug",
            _ => "trace",
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a registration and start a session (no storage).
    Register {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        /// Date of birth as YYYY-MM-DD.
        #[arg(long)]
        date_of_birth: String,

        #[arg(long, default_value = "general")]
        healthcare_context: String,

        #[arg(long, default_value = "balanced")]
        privacy_style: String,
    },

    /// Create the chat log table if it does not exist.
    #[command(name = "init-db")]
    InitDb,

    /// Append one chat exchange to the log.
    Log {
        #[arg(long)]
        session_id: String,

        #[arg(long)]
        healthcare_context: String,

        #[arg(long)]
        privacy_style: String,

        #[arg(long)]
        user_input: String,

        #[arg(long)]
        bot_reply: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        age: Option<u32>,
    },

    /// Show a single chat log entry.
    Show {
        /// Entry id.
        id: i64,
    },

    /// List a session's exchanges in write order.
    History {
        session_id: String,

        /// Maximum number of entries to show.
        #[arg(short, long)]
        limit: Option<i64>,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
