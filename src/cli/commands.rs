use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `Solace` - wellbeing companion for university students.
#[derive(Parser, Debug)]
#[command(name = "solace")]
#[command(version)]
#[command(about = "A turn-based wellbeing companion for university students.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP gateway (POST /chat, GET /health, CSV export)
    Serve {
        /// Port to listen on (overrides config; use 0 for a random port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
    },

    /// Chat with the companion in the terminal
    Chat {
        /// Session id to continue (default: a fresh one)
        #[arg(short, long)]
        session: Option<String>,

        /// Send one message, print the reply and exit
        #[arg(short, long)]
        message: Option<String>,

        /// Student type: domestic, international
        #[arg(long)]
        student_type: Option<String>,

        /// Region: local, southeast_asia, europe, other
        #[arg(long)]
        region: Option<String>,

        /// Reply language hint (vi, en, zh, ko, ja)
        #[arg(long)]
        language: Option<String>,
    },

    /// Show the resolved configuration
    Status,

    /// Export the turn journal as CSV
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}
