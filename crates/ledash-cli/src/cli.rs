use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ledash_client::{BackendKind, ClientConfig, Dashboard};

use crate::entries::{EntriesCommand, run_entries};
use crate::error::Result;
use crate::panel::{
    FlashCommand, PauseCommand, ScrollCommand, run_flash, run_health, run_pause, run_scroll,
};
use crate::util::{CliOutput, init_tracing};
use crate::watch::{WatchArgs, run_watch};

#[derive(Debug, Parser)]
#[command(
    name = "ledash",
    about = "Drive an LED text panel: entries, pause, scroll and flash",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Print one JSON document per result instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the panel is. Flags override the config file, which overrides the
/// built-in defaults.
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// JSON config file.
    #[arg(long, env = "LEDASH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// http, datastore or memory.
    #[arg(long, env = "LEDASH_BACKEND", global = true)]
    pub backend: Option<BackendKind>,

    #[arg(long, env = "LEDASH_DRIVER_URL", global = true)]
    pub driver_url: Option<String>,

    #[arg(long, env = "LEDASH_DATASTORE_URL", global = true)]
    pub datastore_url: Option<String>,

    #[arg(long, env = "LEDASH_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "LEDASH_PANEL_ID", global = true)]
    pub panel_id: Option<String>,

    /// Per-request timeout in milliseconds.
    #[arg(long, env = "LEDASH_TIMEOUT_MS", global = true)]
    pub timeout_ms: Option<u64>,
}

impl ConnectionArgs {
    pub fn resolve(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_path(path)?,
            None => ClientConfig::default(),
        };
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(url) = &self.driver_url {
            config.driver_url.clone_from(url);
        }
        if let Some(url) = &self.datastore_url {
            config.datastore.url.clone_from(url);
        }
        if let Some(key) = &self.api_key {
            config.datastore.api_key = Some(key.clone());
        }
        if let Some(panel_id) = &self.panel_id {
            config.datastore.panel_id.clone_from(panel_id);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.request_timeout_ms = Some(timeout_ms);
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Whether the panel is up.
    Health,

    /// Show or change whether effects animate.
    Pause {
        #[command(subcommand)]
        action: Option<PauseCommand>,
    },

    /// List, add, remove and reorder entries.
    Entries {
        #[command(subcommand)]
        action: Option<EntriesCommand>,
    },

    /// Show or move the first visible entry.
    Scroll {
        #[command(subcommand)]
        action: Option<ScrollCommand>,
    },

    /// Show the flash state or blink the panel once.
    Flash {
        #[command(subcommand)]
        action: Option<FlashCommand>,
    },

    /// Poll the panel and print its state after every tick.
    Watch(WatchArgs),
}

pub fn run_from_env() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let config = cli.connection.resolve()?;
    let dashboard = config.dashboard()?;
    run_with(&dashboard, &config, cli.command, CliOutput::new(cli.json))
}

/// Runs `command` against an already connected dashboard.
pub fn run_with(
    dashboard: &Dashboard,
    config: &ClientConfig,
    command: Commands,
    out: CliOutput,
) -> Result<()> {
    match command {
        Commands::Health => run_health(dashboard, out),
        Commands::Pause { action } => run_pause(dashboard, action.unwrap_or_default(), out),
        Commands::Entries { action } => run_entries(dashboard, action.unwrap_or_default(), out),
        Commands::Scroll { action } => run_scroll(dashboard, action.unwrap_or_default(), out),
        Commands::Flash { action } => run_flash(dashboard, action.unwrap_or_default(), out),
        Commands::Watch(args) => run_watch(dashboard, config, &args, out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_the_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ledash.json");
        std::fs::write(
            &path,
            r#"{"backend": "http", "driver_url": "http://panel:3001", "poll_interval_ms": 250}"#,
        )
        .expect("write config");

        let cli = Cli::try_parse_from([
            "ledash",
            "--config",
            path.to_str().expect("utf-8 path"),
            "--backend",
            "memory",
            "health",
        ])
        .expect("parse");
        let config = cli.connection.resolve().expect("resolve");
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.driver_url, "http://panel:3001");
        assert_eq!(config.poll_interval_ms, 250);
    }

    #[test]
    fn datastore_flags_fill_the_datastore_section() {
        let cli = Cli::try_parse_from([
            "ledash",
            "--backend",
            "datastore",
            "--datastore-url",
            "https://db.example",
            "--panel-id",
            "p-7",
            "pause",
        ])
        .expect("parse");
        let config = cli.connection.resolve().expect("resolve");
        assert_eq!(config.datastore.url, "https://db.example");
        assert_eq!(config.datastore.panel_id, "p-7");
    }

    #[test]
    fn unknown_backend_is_a_parse_error() {
        assert!(Cli::try_parse_from(["ledash", "--backend", "sqlite", "health"]).is_err());
    }

    #[test]
    fn global_flags_work_after_the_subcommand() {
        let cli = Cli::try_parse_from(["ledash", "scroll", "down", "--json"]).expect("parse");
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Scroll {
                action: Some(ScrollCommand::Down)
            }
        ));
    }
}
