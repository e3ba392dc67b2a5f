//! Cosmetic variant grouping
//!
//! The catalog often carries several hashes for what is mechanically one
//! weapon: reissues with a different watermark, holofoil copies, and so on.
//! Weapons are grouped by `(name, season)`; definitions without a season
//! fall back to their watermark, and definitions with neither share one
//! "no watermark" bucket per name.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::hash::ItemHash;
use crate::manifest::ItemDefinition;

/// What distinguishes same-named weapons from each other
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum VariantDiscriminator {
    Season(ItemHash),
    Watermark(String),
    NoWatermark,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VariantKey {
    pub name: String,
    pub discriminator: VariantDiscriminator,
}

impl VariantKey {
    /// Grouping key for a definition, or `None` for unnamed definitions
    pub fn for_definition(def: &ItemDefinition) -> Option<Self> {
        let name = def.name().trim();
        if name.is_empty() {
            return None;
        }
        let discriminator = match (def.season(), def.watermark()) {
            (Some(season), _) => VariantDiscriminator::Season(season),
            (None, Some(watermark)) => VariantDiscriminator::Watermark(watermark.to_string()),
            (None, None) => VariantDiscriminator::NoWatermark,
        };
        Some(Self {
            name: name.to_string(),
            discriminator,
        })
    }
}

/// One catalog hash of a variant group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VariantMember {
    pub hash: ItemHash,
    pub is_holofoil: bool,
}

impl VariantMember {
    /// Sort key: non-holofoil first, then ascending hash
    pub fn order_key(&self) -> (bool, ItemHash) {
        (self.is_holofoil, self.hash)
    }
}

/// An equivalence class of cosmetically-distinct weapon hashes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantGroup {
    pub key: VariantKey,
    /// Ordered non-holofoil first, then by ascending hash
    pub members: Vec<VariantMember>,
}

impl VariantGroup {
    /// Deterministic representative: first non-holofoil member by hash,
    /// otherwise the lowest holofoil hash.
    pub fn primary_hash(&self) -> ItemHash {
        self.members[0].hash
    }

    pub fn hashes(&self) -> Vec<ItemHash> {
        self.members.iter().map(|m| m.hash).collect()
    }

    pub fn contains(&self, hash: ItemHash) -> bool {
        self.members.iter().any(|m| m.hash == hash)
    }

    pub fn has_holofoil(&self) -> bool {
        self.members.iter().any(|m| m.is_holofoil)
    }
}

/// Precomputed hash → group index over every weapon definition
#[derive(Debug, Clone, Default)]
pub struct VariantIndex {
    groups: Vec<VariantGroup>,
    by_hash: HashMap<ItemHash, usize>,
}

impl VariantIndex {
    pub fn build<'a>(definitions: impl IntoIterator<Item = &'a ItemDefinition>) -> Self {
        let mut keyed: BTreeMap<VariantKey, Vec<VariantMember>> = BTreeMap::new();
        for def in definitions.into_iter().filter(|d| d.is_weapon()) {
            let Some(key) = VariantKey::for_definition(def) else {
                continue;
            };
            keyed.entry(key).or_default().push(VariantMember {
                hash: def.hash,
                is_holofoil: def.is_holofoil,
            });
        }

        let mut groups = Vec::with_capacity(keyed.len());
        let mut by_hash = HashMap::new();
        for (key, mut members) in keyed {
            members.sort_by_key(VariantMember::order_key);
            members.dedup_by_key(|m| m.hash);
            let index = groups.len();
            for member in &members {
                by_hash.insert(member.hash, index);
            }
            groups.push(VariantGroup { key, members });
        }

        Self { groups, by_hash }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[VariantGroup] {
        &self.groups
    }

    pub fn group_of(&self, hash: ItemHash) -> Option<&VariantGroup> {
        self.by_hash.get(&hash).map(|&i| &self.groups[i])
    }

    /// Every hash in `hash`'s group; just `[hash]` if it isn't grouped
    pub fn variant_hashes(&self, hash: ItemHash) -> Vec<ItemHash> {
        match self.group_of(hash) {
            Some(group) => group.hashes(),
            None => vec![hash],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn weapon(hash: u32, name: &str, season: Option<u32>, watermark: Option<&str>, holo: bool) -> ItemDefinition {
        serde_json::from_value(json!({
            "hash": hash,
            "displayProperties": { "name": name },
            "itemType": 3,
            "seasonHash": season,
            "iconWatermark": watermark,
            "isHolofoil": holo,
        }))
        .unwrap()
    }

    #[test]
    fn test_groups_by_name_and_season() {
        let defs = vec![
            weapon(20, "Fatebringer", Some(1), None, true),
            weapon(10, "Fatebringer", Some(1), None, false),
            weapon(30, "Fatebringer", Some(2), None, false),
            weapon(40, "Palindrome", Some(1), None, false),
        ];
        let index = VariantIndex::build(&defs);

        assert_eq!(index.variant_hashes(20), vec![10, 20]);
        assert_eq!(index.variant_hashes(10), vec![10, 20]);
        assert_eq!(index.variant_hashes(30), vec![30]);
        assert_eq!(index.variant_hashes(40), vec![40]);
        assert_eq!(index.group_of(20).unwrap().primary_hash(), 10);
        assert!(index.group_of(10).unwrap().has_holofoil());
    }

    #[test]
    fn test_watermark_fallback_and_no_watermark_bucket() {
        let defs = vec![
            weapon(1, "Gnawing Hunger", None, Some("/wm/a.png"), false),
            weapon(2, "Gnawing Hunger", None, Some("/wm/a.png"), false),
            weapon(3, "Gnawing Hunger", None, Some("/wm/b.png"), false),
            weapon(4, "Gnawing Hunger", None, None, false),
            weapon(5, "Gnawing Hunger", None, Some("  "), false),
        ];
        let index = VariantIndex::build(&defs);
        assert_eq!(index.variant_hashes(1), vec![1, 2]);
        assert_eq!(index.variant_hashes(3), vec![3]);
        assert_eq!(index.variant_hashes(4), vec![4, 5]);
    }

    #[test]
    fn test_unknown_hash_maps_to_itself() {
        let index = VariantIndex::build(std::iter::empty());
        assert!(index.is_empty());
        assert_eq!(index.variant_hashes(12345), vec![12345]);
    }

    #[test]
    fn test_holofoil_only_group_picks_lowest_hash() {
        let defs = vec![
            weapon(9, "Mini-Tool", Some(3), None, true),
            weapon(8, "Mini-Tool", Some(3), None, true),
        ];
        let index = VariantIndex::build(&defs);
        assert_eq!(index.group_of(9).unwrap().primary_hash(), 8);
    }

    #[test]
    fn test_symmetric_and_transitive() {
        let defs = vec![
            weapon(1, "A", Some(1), None, false),
            weapon(2, "A", Some(1), None, true),
            weapon(3, "A", Some(1), None, false),
        ];
        let index = VariantIndex::build(&defs);
        for a in [1, 2, 3] {
            for b in index.variant_hashes(a) {
                assert!(index.variant_hashes(b).contains(&a));
                assert_eq!(index.variant_hashes(b), index.variant_hashes(a));
            }
        }
    }

    #[test]
    fn test_non_weapons_are_not_grouped() {
        let perk: ItemDefinition = serde_json::from_value(json!({
            "hash": 77, "displayProperties": { "name": "Outlaw" }, "itemType": 19
        }))
        .unwrap();
        let index = VariantIndex::build([&perk]);
        assert!(index.group_of(77).is_none());
    }
}
