mod cli;
mod commands;
mod config;
mod data;
mod dispatch;

use anyhow::Result;
use clap::Parser;
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;
use commands::configure::Settings;
use data::Session;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "armory=debug",
        _ => "armory=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let session = Session::new(Config::load()?, cli.catalog);

    match cli.command {
        Commands::Weapons {
            inventory,
            name,
            format,
        } => {
            commands::weapons::handle(&session, inventory.as_deref(), name.as_deref(), format)?;
        }

        Commands::Browse { hash, name, format } => {
            commands::browse::handle(&session, hash, name.as_deref(), format)?;
        }

        Commands::Variants { hash } => {
            commands::variants::handle(&session, hash)?;
        }

        Commands::Masterwork {
            instance,
            inventory,
        } => {
            commands::masterwork::handle(&session, instance, inventory.as_deref())?;
        }

        Commands::Wishlist { store, command } => {
            dispatch::dispatch_wishlist(&session, store.as_deref(), command)?;
        }

        Commands::Configure {
            catalog_dir,
            inventory,
            wishlist,
            tags,
            show,
        } => {
            let settings = Settings {
                catalog_dir,
                inventory,
                wishlist,
                tags,
            };
            commands::configure::handle(settings, show)?;
        }
    }

    Ok(())
}
