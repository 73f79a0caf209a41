use crate::tracing::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "coordctl")]
#[command(about = "Probe coordination-service tasks through the client cache")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(long, global = true, help = "Output logs in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        help = "Tracing filter directives, overriding --level and RUST_LOG"
    )]
    pub log_filter: Option<String>,

    #[arg(
        long,
        short = 'c',
        global = true,
        env = "COORDCTL_CLUSTER",
        help = "Path to the cluster TOML file",
        default_value = "cluster.toml"
    )]
    pub cluster: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Print the endpoint each target resolves to")]
    Resolve {
        #[arg(required = true, help = "Targets such as /job:worker/replica:0/task:1")]
        targets: Vec<String>,
    },
    #[command(about = "Connect to each target and report the channel used")]
    Probe {
        #[arg(required = true, help = "Targets such as /job:worker/replica:0/task:1")]
        targets: Vec<String>,
        #[arg(long, help = "Open a caller-owned channel instead of the shared one")]
        exclusive: bool,
        #[arg(long, default_value_t = 1, help = "Number of lookups per target")]
        repeat: usize,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe() {
        let cli = Cli::try_parse_from([
            "coordctl",
            "--cluster",
            "prod.toml",
            "probe",
            "/job:worker/task:0",
            "--exclusive",
            "--repeat",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.cluster, PathBuf::from("prod.toml"));
        match cli.command {
            Commands::Probe {
                targets,
                exclusive,
                repeat,
            } => {
                assert_eq!(targets, ["/job:worker/task:0"]);
                assert!(exclusive);
                assert_eq!(repeat, 3);
            }
            Commands::Resolve { .. } => panic!("expected probe"),
        }
    }

    #[test]
    fn test_parse_log_filter() {
        let cli = Cli::try_parse_from([
            "coordctl",
            "resolve",
            "/job:chief/task:0",
            "--log-filter",
            "coordination_client=debug",
        ])
        .unwrap();
        assert_eq!(cli.log_filter.as_deref(), Some("coordination_client=debug"));

        let cli = Cli::try_parse_from(["coordctl", "resolve", "/job:chief/task:0"]).unwrap();
        assert!(cli.log_filter.is_none());
    }

    #[test]
    fn test_targets_required() {
        assert!(Cli::try_parse_from(["coordctl", "resolve"]).is_err());
    }
}
