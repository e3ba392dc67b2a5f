//! Catalog browse command handlers

use anyhow::{bail, Result};
use armory::PerkMatrixBuilder;

use super::weapons::{filter_by_name, print_weapons};
use crate::cli::OutputFormat;
use crate::data::Session;

/// Handle the browse command: one weapon by hash, or every tracked weapon
pub fn handle(
    session: &Session,
    hash: Option<u32>,
    name: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let catalog = session.catalog()?;
    let builder = PerkMatrixBuilder::with_config(&catalog, session.config.engine.clone());

    let weapons = match hash {
        Some(hash) => match builder.build_for_definition(hash) {
            Some(weapon) => vec![weapon],
            None => bail!("{hash} is not a weapon in the catalog"),
        },
        None => builder.build_catalog_view(&session.config.engine.weapon_policy()),
    };

    print_weapons(&filter_by_name(weapons, name), format)
}
