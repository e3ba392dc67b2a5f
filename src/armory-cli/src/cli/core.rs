//! Core CLI definitions

use armory::InstanceId;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use super::wishlist::WishlistCommand;

#[derive(Parser)]
#[command(name = "armory")]
#[command(about = "Weapon consolidation and perk coverage", long_about = None)]
pub struct Cli {
    /// Directory with catalog table JSON files (uses configured default if not provided)
    #[arg(long, global = true, env = "ARMORY_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for listings
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Consolidate owned weapons into perk matrices
    #[command(visible_alias = "w")]
    Weapons {
        /// Inventory export (uses configured default if not provided)
        #[arg(short, long)]
        inventory: Option<PathBuf>,

        /// Only show weapons whose name contains this text
        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Show catalog perk matrices without ownership
    #[command(visible_alias = "b")]
    Browse {
        /// Weapon hash (signed or unsigned)
        #[arg(value_parser = parse_hash, allow_negative_numbers = true)]
        hash: Option<u32>,

        /// Only show weapons whose name contains this text
        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// List every cosmetic variant of a weapon hash
    #[command(visible_alias = "v")]
    Variants {
        /// Weapon hash (signed or unsigned)
        #[arg(value_parser = parse_hash, allow_negative_numbers = true)]
        hash: u32,
    },

    /// Show the masterwork committed on one owned copy
    #[command(visible_alias = "m")]
    Masterwork {
        /// Item instance id
        instance: InstanceId,

        /// Inventory export (uses configured default if not provided)
        #[arg(short, long)]
        inventory: Option<PathBuf>,
    },

    /// Wishlist operations (add, import, export, match)
    #[command(visible_alias = "l")]
    Wishlist {
        /// Wishlist store (uses configured default if not provided)
        #[arg(long, global = true)]
        store: Option<PathBuf>,

        #[command(subcommand)]
        command: WishlistCommand,
    },

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set default catalog directory
        #[arg(long)]
        catalog_dir: Option<PathBuf>,

        /// Set default inventory export
        #[arg(long)]
        inventory: Option<PathBuf>,

        /// Set wishlist store location
        #[arg(long)]
        wishlist: Option<PathBuf>,

        /// Set default tags for new wishlist entries (comma-separated)
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

/// Accept catalog hashes in either 32-bit representation
pub fn parse_hash(s: &str) -> Result<u32, String> {
    s.trim()
        .parse::<i64>()
        .ok()
        .and_then(armory::hash::to_unsigned)
        .ok_or_else(|| format!("invalid item hash: {s}"))
}
