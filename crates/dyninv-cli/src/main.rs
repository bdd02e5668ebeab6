//! dyninv CLI
//!
//! Command-line front end for building inventories from remote HTTP(S) sources

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail};
use dyninv_core::{InventorySource, RemoteInventorySource};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "dyninv", version)]
#[command(about = "Build host inventories from remote HTTP(S) sources", long_about = None)]
struct Cli {
    /// Config file (defaults to $DYNINV_CONFIG or the standard locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

/// Flags that take precedence over the config file
#[derive(Args, Debug, Default)]
struct Overrides {
    /// CA bundle used to verify HTTPS servers
    #[arg(long, global = true)]
    ca_bundle: Option<PathBuf>,

    /// Skip certificate verification when the CA bundle is missing
    #[arg(long, global = true)]
    insecure: bool,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log level or filter directive
    #[arg(long, global = true)]
    log_level: Option<String>,
}

impl Overrides {
    fn apply(&self, config: &mut Config) {
        if let Some(bundle) = &self.ca_bundle {
            config.source.security.ca_bundle.clone_from(bundle);
        }
        if self.insecure {
            config.source.security.insecure = true;
        }
        if let Some(secs) = self.timeout {
            config.source.timeout_secs = Some(secs);
        }
        if let Some(level) = &self.log_level {
            config.log_level.clone_from(level);
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the full inventory as JSON
    List {
        /// Normalized source path or URL
        source: String,
    },
    /// Print one host's variables as JSON
    Host {
        /// Normalized source path or URL
        source: String,
        /// Host name
        name: String,
    },
    /// Print groups and members as a tree
    Graph {
        /// Normalized source path or URL
        source: String,
    },
    /// Check whether a source string is handled by the remote plugin
    Verify {
        /// Normalized source path or URL
        source: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(Config::locate);
    let mut config = match &config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    cli.overrides.apply(&mut config);

    init_tracing(cli.overrides.log_level.is_some(), &config.log_level)?;
    match &config_path {
        Some(path) => debug!(path = %path.display(), "loaded config"),
        None => debug!("no config file found, using defaults"),
    }

    run(cli.command, &config).await
}

/// Log to stderr; an explicit `--log-level` beats `RUST_LOG`, which beats the config file
fn init_tracing(explicit: bool, level: &str) -> Result<()> {
    let filter = if explicit {
        EnvFilter::try_new(level)?
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn run(command: Commands, config: &Config) -> Result<ExitCode> {
    let plugin = RemoteInventorySource::from_config(&config.source);

    match command {
        Commands::List { source } => {
            let snapshot = plugin.parse(&source).await?;
            println!("{}", serde_json::to_string_pretty(snapshot.graph())?);
        }
        Commands::Host { source, name } => {
            let snapshot = plugin.parse(&source).await?;
            let Some(host) = snapshot.graph().host(&name) else {
                bail!("unknown host `{name}` in {}", snapshot.source());
            };
            let json = serde_json::to_string_pretty(&host.variables)
                .wrap_err_with(|| format!("cannot encode variables of {name}"))?;
            println!("{json}");
        }
        Commands::Graph { source } => {
            let snapshot = plugin.parse(&source).await?;
            print!("{}", render::tree(snapshot.graph()));
        }
        Commands::Verify { source } => {
            if plugin.accepts(&source) {
                println!("accepted: {source}");
            } else {
                warn!(plugin = plugin.name(), "source not accepted");
                println!("rejected: {source}");
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_with_global_flags() {
        let cli = Cli::try_parse_from([
            "dyninv",
            "list",
            "https:/inventory.example.com/v1",
            "--insecure",
            "--timeout",
            "20",
        ])
        .unwrap();

        assert!(cli.overrides.insecure);
        assert_eq!(cli.overrides.timeout, Some(20));
        assert!(matches!(cli.command, Commands::List { ref source } if source == "https:/inventory.example.com/v1"));
    }

    #[test]
    fn test_parse_host() {
        let cli = Cli::try_parse_from([
            "dyninv",
            "--ca-bundle",
            "/opt/ca.pem",
            "host",
            "https:/inventory.example.com/v1",
            "web01",
        ])
        .unwrap();

        assert_eq!(cli.overrides.ca_bundle, Some(PathBuf::from("/opt/ca.pem")));
        match cli.command {
            Commands::Host { name, .. } => assert_eq!(name, "web01"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_host_requires_name() {
        assert!(Cli::try_parse_from(["dyninv", "host", "https:/inventory.example.com"]).is_err());
    }

    #[test]
    fn test_overrides_win_over_config() {
        let mut config = Config::default();
        config.source.timeout_secs = Some(60);

        let overrides = Overrides {
            ca_bundle: Some(PathBuf::from("/opt/ca.pem")),
            insecure: true,
            timeout: Some(5),
            log_level: Some("debug".to_string()),
        };
        overrides.apply(&mut config);

        assert_eq!(config.source.security.ca_bundle, PathBuf::from("/opt/ca.pem"));
        assert!(config.source.security.insecure);
        assert_eq!(config.source.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_absent_overrides_keep_config() {
        let mut config = Config::default();
        config.source.security.insecure = true;
        config.source.timeout_secs = Some(60);

        Overrides::default().apply(&mut config);

        assert!(config.source.security.insecure);
        assert_eq!(config.source.timeout_secs, Some(60));
        assert_eq!(config.log_level, "info");
    }

    #[tokio::test]
    async fn test_verify_rejects_plain_names() {
        let code = run(
            Commands::Verify {
                source: "inventory.ini".to_string(),
            },
            &Config::default(),
        )
        .await
        .unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn test_verify_accepts_normalized_url() {
        let code = run(
            Commands::Verify {
                source: "/srv/ansible/https:/inventory.example.com/v1".to_string(),
            },
            &Config::default(),
        )
        .await
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn test_source_without_scheme_fails() {
        let result = run(
            Commands::List {
                source: "inventory.example.com".to_string(),
            },
            &Config::default(),
        )
        .await;
        assert!(result.is_err());
    }
}
