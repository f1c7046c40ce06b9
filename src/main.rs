use clap::Parser;

use price_requester::blockchain::wallet::{EnvKeyring, Keyring};
use price_requester::cli::{Cli, Commands, ConfigCommand, KeysCommand};
use price_requester::config::{load_config, save_config, set_value};
use price_requester::lifecycle::run_daemon;
use price_requester::observability::logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let home = cli.home_dir();

    match cli.command {
        Commands::Run(args) => {
            let mut config = load_config(&args.config_path(&home))?;
            args.apply_to(&mut config);

            init_logging(&config.log_level);
            tracing::info!(home = %home.display(), chain_id = %config.chain_id, "Starting price requester");

            if let Err(e) = run_daemon(&config, &home).await {
                tracing::error!(error = %e, "Daemon stopped");
                return Err(e.into());
            }
        }
        Commands::Keys {
            command: KeysCommand::List,
        } => {
            let config = load_config(&home.join("config.toml"))?;
            let keyring = EnvKeyring::load(&config.keys, &config.bech32_prefix)?;
            for key in keyring.list_keys() {
                println!("{} => {}", key.name, key.address);
            }
        }
        Commands::Config {
            command: ConfigCommand::Show,
        } => {
            let config = load_config(&home.join("config.toml"))?;
            println!("{}", toml::to_string_pretty(&config)?);
        }
        Commands::Config {
            command: ConfigCommand::Set { key, value },
        } => {
            let path = home.join("config.toml");
            let config = set_value(&load_config(&path)?, &key, &value)?;
            save_config(&path, &config)?;
            println!("{} = {}", key, value);
        }
    }

    Ok(())
}
