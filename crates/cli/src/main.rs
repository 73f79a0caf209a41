//! coordctl: resolve and probe coordination-service tasks

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod commands;
mod tracing;

use crate::cli::{Cli, Commands, parse};
use crate::tracing::{TracingConfig, TracingFormat};
use coordination_client::ClusterConfig;

#[tokio::main]
async fn main() {
    if let Err(error) = run_main().await {
        eprintln!("{error:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> miette::Result<()> {
    let cli = parse();

    let tracing_config = TracingConfig {
        format: if cli.json {
            TracingFormat::Json
        } else {
            TracingFormat::Pretty
        },
        level: cli.level.into(),
        filter: cli.log_filter.clone(),
    };
    crate::tracing::init_tracing(&tracing_config)?;

    run(cli).await
}

async fn run(cli: Cli) -> miette::Result<()> {
    let cluster = ClusterConfig::load(&cli.cluster)?;

    let report = match cli.command {
        Commands::Resolve { targets } => commands::resolve(&cluster, &targets)?,
        Commands::Probe {
            targets,
            exclusive,
            repeat,
        } => commands::probe(cluster, &targets, exclusive, repeat).await?,
    };

    for line in report {
        println!("{line}");
    }
    Ok(())
}
