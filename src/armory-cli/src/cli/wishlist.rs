//! Wishlist command CLI definitions

use clap::Subcommand;
use std::path::PathBuf;

use super::core::{parse_hash, OutputFormat};

#[derive(Subcommand)]
pub enum WishlistCommand {
    /// Store a desired roll for a weapon
    Add {
        /// Weapon hash (any cosmetic variant)
        #[arg(value_parser = parse_hash, allow_negative_numbers = true)]
        weapon: u32,

        /// Perk hashes (comma-separated); several in one column are alternatives
        #[arg(short, long, value_delimiter = ',', value_parser = parse_hash, allow_hyphen_values = true)]
        perks: Vec<u32>,

        /// Notes for the roll
        #[arg(long)]
        notes: Option<String>,

        /// Tags (comma-separated, uses configured defaults if not provided)
        #[arg(short, long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
    },

    /// Import a DIM wishlist file into the store
    Import {
        /// DIM wishlist text file
        input: PathBuf,
    },

    /// Write the store as a DIM wishlist file
    Export {
        /// Output file (stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write one line per perk combination instead of per roll
        #[arg(long)]
        expanded: bool,

        /// Title header
        #[arg(long)]
        title: Option<String>,

        /// Description header
        #[arg(long)]
        description: Option<String>,
    },

    /// Show which owned copies satisfy each stored roll
    Match {
        /// Inventory export (uses configured default if not provided)
        #[arg(short, long)]
        inventory: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}
