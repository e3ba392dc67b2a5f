//! Wishlist command handlers

use anyhow::{Context, Result};
use armory::{
    Catalog, DedupedWeapon, EntryCoverage, ExportMode, PerkMatrixBuilder, Wishlist, WishlistFile,
    WishlistItem,
};
use serde::Serialize;
use std::fs;
use std::path::Path;

use super::weapons::load_instances;
use crate::cli::OutputFormat;
use crate::data::{self, Session};

/// Add one roll to the store
pub fn add(
    session: &Session,
    store: &Path,
    weapon: u32,
    perks: Vec<u32>,
    notes: Option<String>,
    tags: Option<Vec<String>>,
) -> Result<()> {
    let catalog = session.catalog()?;
    let mut wishlist = data::load_wishlist(store)?;

    let mut item = WishlistItem::new(weapon, perks)
        .with_tags(tags.unwrap_or_else(|| session.config.default_tags.clone()));
    if let Some(notes) = notes {
        item = item.with_notes(notes);
    }

    if wishlist.insert_collapsed(item, &catalog) {
        data::save_wishlist(store, &wishlist)?;
        println!("Added roll for {weapon} ({} entries)", wishlist.len());
    } else {
        println!("An identical roll for {weapon} is already stored");
    }
    Ok(())
}

/// Merge a DIM wishlist file into the store
pub fn import(session: &Session, store: &Path, input: &Path) -> Result<()> {
    let catalog = session.catalog()?;
    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let mut wishlist = data::load_wishlist(store)?;

    let (added, skipped) = merge_file(&mut wishlist, &text, &catalog);
    data::save_wishlist(store, &wishlist)?;

    println!("Imported {added} roll(s) from {}", input.display());
    if skipped > 0 {
        println!("{skipped} line(s) skipped; rerun with -v for details");
    }
    Ok(())
}

/// Parse `text` into `wishlist`, returning (added, rejected lines)
fn merge_file(wishlist: &mut Wishlist, text: &str, catalog: &Catalog) -> (usize, usize) {
    let (file, errors) = WishlistFile::parse(text);
    let added = file
        .items
        .into_iter()
        .filter(|item| wishlist.insert_collapsed(item.clone(), catalog))
        .count();
    (added, errors.len())
}

/// Render the store as a DIM wishlist file
pub fn export(
    session: &Session,
    store: &Path,
    output: Option<&Path>,
    expanded: bool,
    title: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let catalog = session.catalog()?;
    let wishlist = data::load_wishlist(store)?;
    let mode = if expanded {
        ExportMode::Expanded
    } else {
        ExportMode::Compact
    };

    let file = WishlistFile {
        title,
        description,
        items: wishlist.items().to_vec(),
    };
    let text = file.render(&catalog, mode);

    match output {
        Some(path) => {
            fs::write(path, &text).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} roll(s) to {}", wishlist.len(), path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

#[derive(Serialize)]
struct WeaponCoverage<'a> {
    name: &'a str,
    primary_hash: u32,
    entries: Vec<EntryCoverage>,
}

/// Report which owned copies satisfy each stored roll
pub fn check_matches(
    session: &Session,
    store: &Path,
    inventory: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let catalog = session.catalog()?;
    let wishlist = data::load_wishlist(store)?;
    let instances = load_instances(session, &catalog, inventory)?;
    let weapons =
        PerkMatrixBuilder::with_config(&catalog, session.config.engine.clone()).build(&instances);

    let report = coverage_report(&wishlist, &catalog, &weapons);
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("Failed to serialize matches")?;
            println!("{json}");
        }
        OutputFormat::Table => {
            if report.is_empty() {
                println!("No stored rolls apply to owned weapons");
            }
            for weapon in &report {
                println!("{} ({})", weapon.name, weapon.primary_hash);
                for entry in &weapon.entries {
                    println!("  {}", format_entry(entry));
                }
            }
        }
    }
    Ok(())
}

fn coverage_report<'a>(
    wishlist: &Wishlist,
    catalog: &Catalog,
    weapons: &'a [DedupedWeapon],
) -> Vec<WeaponCoverage<'a>> {
    weapons
        .iter()
        .filter_map(|weapon| {
            let entries = wishlist.coverage(catalog, weapon);
            (!entries.is_empty()).then(|| WeaponCoverage {
                name: &weapon.name,
                primary_hash: weapon.primary_hash,
                entries,
            })
        })
        .collect()
}

fn format_entry(entry: &EntryCoverage) -> String {
    let perks: Vec<String> = entry.item.perk_hashes.iter().map(u32::to_string).collect();
    let copies = if entry.matching_instances.is_empty() {
        "no matching copies".to_string()
    } else {
        let ids: Vec<String> = entry.matching_instances.iter().map(|id| id.to_string()).collect();
        format!("matched by {}", ids.join(", "))
    };
    match &entry.item.notes {
        Some(notes) => format!("[{}] {notes}: {copies}", perks.join(", ")),
        None => format!("[{}]: {copies}", perks.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armory::InstanceId;
    use serde_json::json;

    fn catalog() -> Catalog {
        let items = json!({
            "1": { "hash": 1, "displayProperties": { "name": "Ace" }, "itemType": 3, "seasonHash": 4 },
            "2": { "hash": 2, "displayProperties": { "name": "Ace" }, "itemType": 3, "seasonHash": 4, "isHolofoil": true }
        });
        Catalog::from_json_tables(&items.to_string(), "{}", None).unwrap()
    }

    #[test]
    fn test_merge_file_collapses_variants_and_counts_errors() {
        let text = "title:Mine\n\
                    dimwishlist:item=1&perks=10,20#notes:pve\n\
                    dimwishlist:item=2&perks=10,20#notes:pve\n\
                    dimwishlist:item=abc&perks=10\n";
        let mut wishlist = Wishlist::new();
        let (added, skipped) = merge_file(&mut wishlist, text, &catalog());

        assert_eq!(added, 1);
        assert_eq!(skipped, 1);
        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn test_format_entry() {
        let entry = EntryCoverage {
            item: WishlistItem::new(1, [10, 20]).with_notes("pve"),
            matching_instances: vec![InstanceId(7)],
        };
        assert_eq!(format_entry(&entry), "[10, 20] pve: matched by 7");

        let entry = EntryCoverage {
            item: WishlistItem::new(1, [10]),
            matching_instances: Vec::new(),
        };
        assert_eq!(format_entry(&entry), "[10]: no matching copies");
    }
}
