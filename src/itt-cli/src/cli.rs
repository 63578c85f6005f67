//! CLI argument definitions for itt

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "itt")]
#[command(about = "Island Troll Tribes dataset builder", long_about = None)]
pub struct Cli {
    /// Debug logging when RUST_LOG is unset
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline and write the dataset
    #[command(visible_alias = "r")]
    Run {
        /// Directory holding the object tables and war3map.j
        #[arg(short, long, env = "WAR3MAP_DIR")]
        archive_dir: Option<PathBuf>,

        /// Root of the .wurst source tree
        #[arg(short, long, env = "WURST_SOURCE_DIR")]
        source_dir: Option<PathBuf>,

        /// Curated category-mappings.json
        #[arg(short, long)]
        mappings: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the issue summary only, write nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Decode a packed integer object id (e.g. 1227894832 -> I000)
    Decode { value: f64 },

    /// Encode a four character object code as its integer form
    Encode { code: String },

    /// Show the slug for a display name
    Slug { name: String },

    /// Classify a name without curated data from the archive
    Classify {
        #[command(subcommand)]
        command: ClassifyCommand,
    },

    /// Show or change the configuration file
    #[command(visible_alias = "c")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ClassifyCommand {
    /// Ability category by name
    Ability {
        name: String,

        /// Curated category-mappings.json
        #[arg(short, long)]
        mappings: Option<PathBuf>,
    },

    /// Item category by name
    Item {
        name: String,

        /// Object code, used for curated lookups
        #[arg(long, default_value = "")]
        id: String,

        /// Curated category-mappings.json
        #[arg(short, long)]
        mappings: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the current configuration
    Show,

    /// Print the config file location
    Path,

    /// Set one configuration value
    Set { key: String, value: String },
}
