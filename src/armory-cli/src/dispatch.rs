//! Command dispatch functions
//!
//! Keeps the nested subcommand matches out of main.

use std::path::Path;

use anyhow::Result;

use crate::cli::WishlistCommand;
use crate::commands;
use crate::data::Session;

/// Dispatch wishlist subcommands
pub fn dispatch_wishlist(
    session: &Session,
    store: Option<&Path>,
    command: WishlistCommand,
) -> Result<()> {
    let store = session.wishlist_path(store)?;

    match command {
        WishlistCommand::Add {
            weapon,
            perks,
            notes,
            tags,
        } => commands::wishlist::add(session, &store, weapon, perks, notes, tags),

        WishlistCommand::Import { input } => commands::wishlist::import(session, &store, &input),

        WishlistCommand::Export {
            output,
            expanded,
            title,
            description,
        } => commands::wishlist::export(
            session,
            &store,
            output.as_deref(),
            expanded,
            title,
            description,
        ),

        WishlistCommand::Match { inventory, format } => {
            commands::wishlist::check_matches(session, &store, inventory.as_deref(), format)
        }
    }
}
