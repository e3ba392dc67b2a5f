//! Command handlers
//!
//! Each module handles one top-level subcommand.

pub mod browse;
pub mod configure;
pub mod masterwork;
pub mod variants;
pub mod weapons;
pub mod wishlist;
