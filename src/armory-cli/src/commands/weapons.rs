//! Owned weapon consolidation command handlers

use anyhow::{Context, Result};
use armory::{Catalog, DedupedWeapon, InstanceParser, PerkColumn, PerkMatrixBuilder, WeaponInstance};
use std::path::Path;

use crate::cli::OutputFormat;
use crate::data::{self, Session};

/// Handle the weapons command
pub fn handle(
    session: &Session,
    inventory: Option<&Path>,
    name: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let catalog = session.catalog()?;
    let instances = load_instances(session, &catalog, inventory)?;

    let weapons = PerkMatrixBuilder::with_config(&catalog, session.config.engine.clone())
        .build(&instances);
    let weapons = filter_by_name(weapons, name);
    print_weapons(&weapons, format)
}

/// Read and parse the inventory export, reporting dropped records
pub fn load_instances(
    session: &Session,
    catalog: &Catalog,
    inventory: Option<&Path>,
) -> Result<Vec<WeaponInstance>> {
    let path = session.inventory_path(inventory)?;
    let records = data::load_inventory(&path)?;
    let (instances, report) =
        InstanceParser::from_config(catalog, &session.config.engine).parse_all(&records);

    if report.unknown_weapon > 0 {
        eprintln!(
            "Warning: {} record(s) reference weapons missing from the catalog",
            report.unknown_weapon
        );
    }
    if report.bad_instance_id > 0 {
        eprintln!(
            "Warning: {} record(s) have no usable instance id",
            report.bad_instance_id
        );
    }
    Ok(instances)
}

/// Keep weapons whose name contains `name`, case-insensitively
pub fn filter_by_name(weapons: Vec<DedupedWeapon>, name: Option<&str>) -> Vec<DedupedWeapon> {
    let Some(needle) = name.map(str::to_lowercase) else {
        return weapons;
    };
    weapons
        .into_iter()
        .filter(|w| w.name.to_lowercase().contains(&needle))
        .collect()
}

pub fn print_weapons(weapons: &[DedupedWeapon], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(weapons).context("Failed to serialize weapons")?;
            println!("{json}");
        }
        OutputFormat::Table => {
            if weapons.is_empty() {
                println!("No weapons found");
            }
            for weapon in weapons {
                println!("{}", format_weapon(weapon));
            }
        }
    }
    Ok(())
}

/// Human-readable perk matrix for one weapon
pub fn format_weapon(weapon: &DedupedWeapon) -> String {
    let mut out = format!(
        "{} ({})  {}/{} perks ({:.1}%)",
        weapon.name,
        weapon.primary_hash,
        weapon.total_perks_owned,
        weapon.total_perks_possible,
        weapon.completion_percentage
    );
    if weapon.has_holofoil {
        out.push_str("  [holofoil]");
    }
    out.push('\n');

    let variants: Vec<String> = weapon
        .variant_hashes
        .iter()
        .map(|v| {
            if v.is_holofoil {
                format!("{}*", v.hash)
            } else {
                v.hash.to_string()
            }
        })
        .collect();
    out.push_str(&format!("  Variants: {}\n", variants.join(", ")));
    if !weapon.instances.is_empty() {
        out.push_str(&format!("  Copies:   {}\n", weapon.instances.len()));
    }

    for column in &weapon.perk_matrix {
        out.push_str(&format!("  {:<13} {}\n", column.column_name, format_column(column)));
    }
    out
}

fn format_column(column: &PerkColumn) -> String {
    let mut cells: Vec<String> = column
        .available_perks
        .iter()
        .map(|p| format!("[{}] {}", if p.is_owned { 'x' } else { ' ' }, p.name))
        .collect();
    cells.extend(
        column
            .retired_perks
            .iter()
            .map(|p| format!("[{}] {} (retired)", if p.is_owned { 'x' } else { ' ' }, p.name)),
    );
    cells.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use armory::VariantHash;

    fn weapon(name: &str) -> DedupedWeapon {
        DedupedWeapon {
            primary_hash: 10,
            name: name.into(),
            variant_hashes: vec![
                VariantHash { hash: 10, is_holofoil: false },
                VariantHash { hash: 11, is_holofoil: true },
            ],
            perk_matrix: Vec::new(),
            intrinsic_perks: Vec::new(),
            masterwork_perks: Vec::new(),
            instances: Vec::new(),
            total_perks_owned: 1,
            total_perks_possible: 4,
            completion_percentage: 25.0,
            masterwork_socket_index: None,
            has_holofoil: true,
        }
    }

    #[test]
    fn test_filter_by_name() {
        let weapons = vec![weapon("Fatebringer"), weapon("Palindrome")];
        let kept = filter_by_name(weapons.clone(), Some("fate"));
        assert_eq!(kept.len(), 1);
        assert_eq!(filter_by_name(weapons, None).len(), 2);
    }

    #[test]
    fn test_format_weapon_header() {
        let text = format_weapon(&weapon("Fatebringer"));
        assert!(text.starts_with("Fatebringer (10)  1/4 perks (25.0%)  [holofoil]\n"));
        assert!(text.contains("Variants: 10, 11*"));
    }
}
