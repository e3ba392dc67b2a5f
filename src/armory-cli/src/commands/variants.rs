//! Cosmetic variant lookup command handlers

use anyhow::Result;
use armory::Catalog;

use crate::data::Session;

/// Handle the variants command
pub fn handle(session: &Session, hash: u32) -> Result<()> {
    let catalog = session.catalog()?;
    for line in describe(&catalog, hash) {
        println!("{line}");
    }
    Ok(())
}

fn describe(catalog: &Catalog, hash: u32) -> Vec<String> {
    let Some(group) = catalog.variant_group(hash) else {
        let name = catalog.item(hash).map_or("unknown", |d| d.name());
        return vec![format!("{hash}  {name} (no variants)")];
    };

    let mut lines = vec![format!("{}  ({} variants)", group.key.name, group.members.len())];
    for member in &group.members {
        let mut line = format!("  {}", member.hash);
        if member.hash == group.primary_hash() {
            line.push_str("  primary");
        }
        if member.is_holofoil {
            line.push_str("  holofoil");
        }
        lines.push(line);
    }
    lines
}
