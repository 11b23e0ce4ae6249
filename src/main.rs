mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use output::{CliOutput, QuietOutput, UserOutput};
use remote_starter::config::{PanelConfig, Parser as ConfigParser};
use remote_starter::Error as PanelError;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if let Some(panel_error) = e.downcast_ref::<PanelError>() {
            eprintln!("Error: {}", panel_error);
            if let Some(suggestion) = panel_error.suggestion() {
                eprintln!("\nHint: {}", suggestion);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_filter())?;

    let config = load_config(&cli)?;

    let out: Box<dyn UserOutput> = if cli.quiet {
        Box::new(QuietOutput)
    } else {
        Box::new(CliOutput)
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::run_serve(&config, out.as_ref()).await,
        Commands::List { json } => commands::run_list(&config, json, out.as_ref()),
    }
}

/// Config file values, overridden by CLI flags and REMOTE_STARTER_* env vars.
fn load_config(cli: &Cli) -> anyhow::Result<PanelConfig> {
    let mut config = ConfigParser::new().load(cli.config.as_deref())?;

    if let Some(ref data_dir) = cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(ref listen) = cli.listen {
        config.listen = listen.clone();
    }
    if let Some(ref secret_path) = cli.secret_path {
        config.secret_path = secret_path.clone();
    }

    config.validate()?;
    Ok(config)
}

fn init_tracing(filter: Option<&str>) -> anyhow::Result<()> {
    let env_filter = match filter {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    Ok(())
}
