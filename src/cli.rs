use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "remote-starter")]
#[command(about = "Remote Starter - Start, stop and monitor local launcher scripts from a browser")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to remote-starter.yaml)
    #[arg(short, long, env = "REMOTE_STARTER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding config.json and processes.json
    #[arg(long, env = "REMOTE_STARTER_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Address to listen on (e.g., 0.0.0.0:9999)
    #[arg(long, env = "REMOTE_STARTER_LISTEN", global = true)]
    pub listen: Option<String>,

    /// URL segment guarding the mutating routes
    #[arg(long, env = "REMOTE_STARTER_SECRET_PATH", global = true)]
    pub secret_path: Option<String>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the control panel (default)
    Serve,
    /// List registered applications in display order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Log filter implied by -v/-q, or None to defer to RUST_LOG.
    pub fn log_filter(&self) -> Option<&'static str> {
        match (self.quiet, self.verbose) {
            (true, _) => Some("error"),
            (false, 0) => None,
            (false, 1) => Some("debug"),
            (false, _) => Some("trace"),
        }
    }
}
