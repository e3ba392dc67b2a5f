//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting armory CLI defaults.

use crate::config::Config;
use anyhow::Result;
use std::path::PathBuf;

/// Values given on the command line; `None` leaves a setting untouched
#[derive(Debug, Default)]
pub struct Settings {
    pub catalog_dir: Option<PathBuf>,
    pub inventory: Option<PathBuf>,
    pub wishlist: Option<PathBuf>,
    pub tags: Option<Vec<String>>,
}

impl Settings {
    fn is_empty(&self) -> bool {
        self.catalog_dir.is_none()
            && self.inventory.is_none()
            && self.wishlist.is_none()
            && self.tags.is_none()
    }
}

/// Handle the configure command
pub fn handle(settings: Settings, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if settings.is_empty() {
        show_usage();
        return Ok(());
    }

    apply(&mut config, settings);
    config.save()?;
    println!("Configuration updated");
    if let Ok(path) = Config::config_path() {
        println!("Config saved to: {}", path.display());
    }
    Ok(())
}

fn apply(config: &mut Config, settings: Settings) {
    if let Some(dir) = settings.catalog_dir {
        config.catalog_dir = Some(dir);
    }
    if let Some(path) = settings.inventory {
        config.inventory = Some(path);
    }
    if let Some(path) = settings.wishlist {
        config.wishlist = Some(path);
    }
    if let Some(tags) = settings.tags {
        config.default_tags = tags;
    }
}

/// Display current configuration
fn show_config(config: &Config) {
    match &config.catalog_dir {
        Some(dir) => println!("Catalog directory: {}", dir.display()),
        None => println!("No catalog directory configured"),
    }
    match &config.inventory {
        Some(path) => println!("Inventory: {}", path.display()),
        None => println!("No inventory configured"),
    }
    if let Ok(path) = config.wishlist_path() {
        println!("Wishlist store: {}", path.display());
    }
    if !config.default_tags.is_empty() {
        println!("Default tags: {}", config.default_tags.join(", "));
    }
    println!(
        "Minimum tier: {}{}",
        config.engine.min_tier,
        if config.engine.include_exotics { " (exotics included)" } else { "" }
    );

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: armory configure --catalog-dir DIR [--inventory FILE] [--wishlist FILE] [--tags a,b]");
    println!("   or: armory configure --show");
    println!();
    println!("Note: the catalog directory holds the item, plug set and socket type");
    println!("      tables exported from the game manifest.");
}
