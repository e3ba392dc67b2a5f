//! CLI argument definitions for armory
//!
//! This module contains all clap-derived structs and enums for CLI parsing.

mod core;
mod wishlist;

pub use core::{Cli, Commands, OutputFormat};
pub use wishlist::WishlistCommand;
