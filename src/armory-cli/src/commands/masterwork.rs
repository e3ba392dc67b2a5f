//! Per-copy masterwork lookup command handlers

use anyhow::{bail, Result};
use armory::{InstanceId, PerkMatrixBuilder};
use std::path::Path;

use super::weapons::load_instances;
use crate::data::Session;

/// Handle the masterwork command
pub fn handle(session: &Session, instance: InstanceId, inventory: Option<&Path>) -> Result<()> {
    let catalog = session.catalog()?;
    let instances = load_instances(session, &catalog, inventory)?;
    let weapons =
        PerkMatrixBuilder::with_config(&catalog, session.config.engine.clone()).build(&instances);

    let Some(weapon) = weapons.iter().find(|w| w.instance(instance).is_some()) else {
        bail!("No owned weapon with instance id {instance}");
    };

    match weapon.masterwork_of(instance) {
        Some(perk) => println!("{} ({instance}): {} [{}]", weapon.name, perk.name, perk.hash),
        None => println!("{} ({instance}): no masterwork", weapon.name),
    }
    Ok(())
}
