use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;

use super::OutputFormat;
use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init,
}

const DEFAULT_CONFIG: &str = r#"# nutrisync configuration

# Path to the local cache (default: ~/.local/share/nutrisync/cache.db)
# cache_path: ~/.local/share/nutrisync/cache.db

# Signed-in user. Leave unset to work locally only.
# user_id: your-user-id

# Remote store. Leave unset to work locally only.
# remote:
#   database_url: sqlite:///path/to/remote.db
#   timeout_secs: 5

sync:
  # cache_first | latest_timestamp | remote_authoritative
  read_policy: cache_first
  # signed_delta | fixed_increment
  water_policy: signed_delta
"#;

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!("cache_path: {}", config.cache_path.value.display());
                        println!("  source: {}", config.cache_path.source);
                        println!();

                        println!(
                            "user_id: {}",
                            config.user_id.value.as_deref().unwrap_or("(not signed in)")
                        );
                        println!("  source: {}", config.user_id.source);
                        println!();

                        println!(
                            "remote.database_url: {}",
                            config
                                .remote
                                .database_url
                                .as_deref()
                                .unwrap_or("(not configured)")
                        );
                        println!("remote.timeout_secs: {}", config.remote.timeout_secs);
                        println!();

                        println!("sync.read_policy: {}", config.sync.read_policy);
                        println!("sync.water_policy: {}", config.sync.water_policy);
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = Config::default_config_path();

                if config_path.exists() {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'nutrisync config show' to view current configuration.");
                    return Ok(());
                }

                if let Some(parent) = config_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                let mut file = fs::File::create(&config_path)?;
                file.write_all(DEFAULT_CONFIG.as_bytes())?;

                println!("Created config file: {}", config_path.display());
                println!("\nEdit this file to customize your settings.");
                Ok(())
            }
        }
    }
}
