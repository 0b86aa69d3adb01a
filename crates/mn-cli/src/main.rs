use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use mn_core::SegmentBuilder;
use tracing_subscriber::EnvFilter;

use mn_cli::commands::{list, sources};
use mn_cli::{Cli, Commands, Config};

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so stdout stays clean for --json
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout();
    match cli.command {
        Some(Commands::List {
            json,
            toggles,
            progress,
            demo,
        }) => {
            let source_list = if demo {
                mn_fetch::demo::sources().context("failed to build demo sources")?
            } else {
                load_config(cli.config.as_deref())?.build_sources()?
            };
            let options = list::ListOptions {
                json,
                toggles,
                progress,
            };
            list::run(&mut stdout, source_list, &SegmentBuilder::default(), &options).await?;
        }
        Some(Commands::Sources) => {
            let config = load_config(cli.config.as_deref())?;
            sources::run(&mut stdout, &config)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
