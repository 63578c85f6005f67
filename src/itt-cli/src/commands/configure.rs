//! Configuration command handlers

use anyhow::{Context, Result};

use crate::cli::ConfigCommand;
use crate::config::Config;

pub fn handle(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => show_config(&Config::load()?),
        ConfigCommand::Path => {
            println!("{}", Config::config_path()?.display());
            Ok(())
        }
        ConfigCommand::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("{} = {}", key, value);
            if let Ok(path) = Config::config_path() {
                println!("Config saved to: {}", path.display());
            }
            Ok(())
        }
    }
}

/// Display current configuration
fn show_config(config: &Config) -> Result<()> {
    let text = toml::to_string_pretty(config).context("Failed to serialize config")?;
    if text.trim().is_empty() {
        println!("Nothing configured");
    } else {
        print!("{}", text);
    }

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
    Ok(())
}
