//! Command-line interface.
//!
//! Flags given to `run` override values read from the config file.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::DaemonConfig;

/// Directory name under `$HOME` used when `--home` is not given.
pub const DEFAULT_HOME_DIR: &str = ".price-requester";

#[derive(Debug, Parser)]
#[command(name = "price-requester")]
#[command(about = "Periodically submits oracle price requests to the chain", long_about = None)]
pub struct Cli {
    /// Home directory for config and cached files
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// The home directory, falling back to `$HOME/.price-requester`.
    pub fn home_dir(&self) -> PathBuf {
        match &self.home {
            Some(home) => home.clone(),
            None => std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_default()
                .join(DEFAULT_HOME_DIR),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the request daemon
    Run(RunArgs),
    /// Inspect configured signing keys
    Keys {
        #[command(subcommand)]
        command: KeysCommand,
    },
    /// Inspect the effective configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum KeysCommand {
    /// List key names and addresses
    List,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the configuration as TOML
    Show,
    /// Set one top-level value in <home>/config.toml
    Set {
        /// Field name, e.g. chain_id or symbols
        key: String,
        /// New value; lists are comma-separated
        value: String,
    },
}

/// Overrides for `run`. Unset flags keep the file value.
#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Config file (default: <home>/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub chain_id: Option<String>,

    /// Node RPC URI
    #[arg(long)]
    pub node: Option<String>,

    /// Requester address
    #[arg(long)]
    pub requester: Option<String>,

    #[arg(long)]
    pub oracle_script_id: Option<u64>,

    #[arg(long)]
    pub ask_count: Option<u64>,

    #[arg(long)]
    pub min_count: Option<u64>,

    /// Comma-separated symbols, e.g. BTC,ETH
    #[arg(long, value_delimiter = ',')]
    pub symbols: Option<Vec<String>>,

    /// Gas prices, e.g. 0.0025uband
    #[arg(long)]
    pub gas_prices: Option<String>,

    #[arg(long)]
    pub log_level: Option<String>,

    #[arg(long, value_parser = humantime::parse_duration)]
    pub broadcast_timeout: Option<Duration>,

    #[arg(long, value_parser = humantime::parse_duration)]
    pub rpc_poll_interval: Option<Duration>,

    #[arg(long, value_parser = humantime::parse_duration)]
    pub request_interval: Option<Duration>,

    #[arg(long)]
    pub max_try: Option<u64>,

    /// Address for the Prometheus endpoint; empty disables it
    #[arg(long)]
    pub metrics_listen_addr: Option<String>,
}

impl RunArgs {
    /// Config path for this invocation.
    pub fn config_path(&self, home: &std::path::Path) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| home.join("config.toml"))
    }

    /// Overlay every flag that was given onto `config`.
    pub fn apply_to(&self, config: &mut DaemonConfig) {
        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(value) = &self.$field {
                        config.$field = value.clone();
                    }
                )*
            };
        }

        overlay!(
            chain_id,
            node,
            requester,
            oracle_script_id,
            ask_count,
            min_count,
            symbols,
            gas_prices,
            log_level,
            broadcast_timeout,
            rpc_poll_interval,
            request_interval,
            max_try,
            metrics_listen_addr,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_overrides() {
        let cli = Cli::try_parse_from([
            "price-requester",
            "--home",
            "/tmp/pr",
            "run",
            "--chain-id",
            "band-laozi",
            "--symbols",
            "BTC,ETH,BAND",
            "--rpc-poll-interval",
            "2s",
        ])
        .unwrap();

        assert_eq!(cli.home_dir(), PathBuf::from("/tmp/pr"));
        let Commands::Run(ref args) = cli.command else {
            panic!("expected run");
        };

        let mut config = DaemonConfig::default();
        args.apply_to(&mut config);
        assert_eq!(config.chain_id, "band-laozi");
        assert_eq!(config.symbols, vec!["BTC", "ETH", "BAND"]);
        assert_eq!(config.rpc_poll_interval, Duration::from_secs(2));
        // Untouched fields keep their values.
        assert_eq!(config.oracle_script_id, 37);
        assert_eq!(args.config_path(&cli.home_dir()), PathBuf::from("/tmp/pr/config.toml"));
    }

    #[test]
    fn test_no_flags_leaves_config_alone() {
        let mut config = DaemonConfig {
            chain_id: "from-file".into(),
            ..Default::default()
        };
        RunArgs::default().apply_to(&mut config);
        assert_eq!(config.chain_id, "from-file");
    }

    #[test]
    fn test_subcommands() {
        let cli = Cli::try_parse_from(["price-requester", "keys", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Keys {
                command: KeysCommand::List
            }
        ));

        let cli = Cli::try_parse_from(["price-requester", "config", "show", "--home", "h"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommand::Show
            }
        ));
        assert_eq!(cli.home_dir(), PathBuf::from("h"));
    }

    #[test]
    fn test_config_set() {
        let cli =
            Cli::try_parse_from(["price-requester", "config", "set", "symbols", "BTC,ETH"]).unwrap();
        let Commands::Config {
            command: ConfigCommand::Set { key, value },
        } = cli.command
        else {
            panic!("expected config set");
        };
        assert_eq!(key, "symbols");
        assert_eq!(value, "BTC,ETH");
    }

    #[test]
    fn test_bad_duration_is_rejected() {
        let result = Cli::try_parse_from(["price-requester", "run", "--request-interval", "soon"]);
        assert!(result.is_err());
    }
}
