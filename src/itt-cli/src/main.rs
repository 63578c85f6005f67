mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;

fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "itt=debug,itt_cli=debug"
    } else {
        "itt=info,itt_cli=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            archive_dir,
            source_dir,
            mappings,
            output,
            dry_run,
        } => commands::run::handle(commands::run::RunArgs {
            archive_dir,
            source_dir,
            mappings,
            output,
            dry_run,
        })?,

        Commands::Decode { value } => commands::lookup::decode(value)?,

        Commands::Encode { code } => commands::lookup::encode(&code)?,

        Commands::Slug { name } => commands::lookup::slug(&name),

        Commands::Classify { command } => match command {
            ClassifyCommand::Ability { name, mappings } => {
                commands::lookup::classify_ability(&name, mappings.as_deref())?;
            }
            ClassifyCommand::Item { name, id, mappings } => {
                commands::lookup::classify_item(&name, &id, mappings.as_deref())?;
            }
        },

        Commands::Config { command } => commands::configure::handle(command)?,
    }

    Ok(())
}
