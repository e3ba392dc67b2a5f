//! Enhanced perk resolution
//!
//! Enhanced perks are separate catalog hashes with the same functional name
//! as their base perk, prefixed with "Enhanced ". Within one plug pool, plugs
//! whose names match once that prefix is stripped form a [`PerkFamily`]:
//! one logical perk that may be rolled under several hashes. Families that
//! share a hash across pools are merged.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::hash::ItemHash;
use crate::manifest::{ItemDefinition, PlugSet};
use crate::reference::ENHANCED_PREFIX;

/// Functional perk name with the enhanced prefix removed
pub fn normalized_perk_name(name: &str) -> &str {
    let name = name.trim();
    name.strip_prefix(ENHANCED_PREFIX).unwrap_or(name).trim()
}

/// Whether a plug definition is the enhanced form of a perk
pub fn is_enhanced(def: &ItemDefinition) -> bool {
    def.name().trim_start().starts_with(ENHANCED_PREFIX)
        || def.item_type_display_name.starts_with("Enhanced")
}

/// A base perk together with its enhanced and duplicate-named hashes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerkFamily {
    /// Every hash of this logical perk, ascending
    pub members: Vec<ItemHash>,
    pub base_hash: ItemHash,
    pub enhanced_hash: Option<ItemHash>,
}

impl PerkFamily {
    pub(crate) fn from_members<'a, F>(mut members: Vec<ItemHash>, lookup: &F) -> Self
    where
        F: Fn(ItemHash) -> Option<&'a ItemDefinition>,
    {
        members.sort_unstable();
        members.dedup();
        let enhanced_flags: Vec<bool> = members
            .iter()
            .map(|&h| lookup(h).is_some_and(is_enhanced))
            .collect();
        let base_hash = members
            .iter()
            .zip(&enhanced_flags)
            .find(|(_, enhanced)| !**enhanced)
            .map(|(h, _)| *h)
            .unwrap_or(members[0]);
        let enhanced_hash = members
            .iter()
            .zip(&enhanced_flags)
            .find(|(_, enhanced)| **enhanced)
            .map(|(h, _)| *h);
        Self {
            members,
            base_hash,
            enhanced_hash,
        }
    }

    pub fn contains(&self, hash: ItemHash) -> bool {
        self.members.binary_search(&hash).is_ok()
    }

    pub fn has_enhanced_variant(&self) -> bool {
        self.enhanced_hash.is_some()
    }
}

/// Group a pool of plug hashes into families, preserving first appearance.
///
/// Plugs without a definition (or without a name) stay on their own.
pub fn group_by_name<'a, F>(hashes: &[ItemHash], lookup: &F) -> Vec<PerkFamily>
where
    F: Fn(ItemHash) -> Option<&'a ItemDefinition>,
{
    let mut order: Vec<Vec<ItemHash>> = Vec::new();
    let mut by_name: HashMap<&'a str, usize> = HashMap::new();
    for &hash in hashes {
        if order.iter().any(|members| members.contains(&hash)) {
            continue;
        }
        let name = lookup(hash)
            .map(|def| normalized_perk_name(def.name()))
            .filter(|n| !n.is_empty());
        match name.and_then(|n| by_name.get(n).copied().map(|i| (n, i))) {
            Some((_, index)) => order[index].push(hash),
            None => {
                if let Some(n) = name {
                    by_name.insert(n, order.len());
                }
                order.push(vec![hash]);
            }
        }
    }
    order
        .into_iter()
        .map(|members| PerkFamily::from_members(members, lookup))
        .collect()
}

/// Catalog-wide base/enhanced links, built once per catalog
#[derive(Debug, Clone, Default)]
pub struct EnhancedIndex {
    families: Vec<PerkFamily>,
    by_hash: HashMap<ItemHash, usize>,
}

impl EnhancedIndex {
    pub fn build<'a, I, F>(plug_sets: I, lookup: F) -> Self
    where
        I: IntoIterator<Item = &'a PlugSet>,
        F: Fn(ItemHash) -> Option<&'a ItemDefinition>,
    {
        let mut sets: Vec<&PlugSet> = plug_sets.into_iter().collect();
        sets.sort_by_key(|s| s.hash);

        let mut links = UnionFind::default();
        for set in sets {
            let pool: Vec<ItemHash> = set.plug_hashes().collect();
            for family in group_by_name(&pool, &lookup) {
                if family.members.len() < 2 {
                    continue;
                }
                let first = family.members[0];
                for &other in &family.members[1..] {
                    links.union(first, other);
                }
            }
        }

        let mut grouped: BTreeMap<ItemHash, Vec<ItemHash>> = BTreeMap::new();
        for hash in links.hashes() {
            let root = links.find(hash);
            grouped.entry(root).or_default().push(hash);
        }

        let mut families: Vec<PerkFamily> = grouped
            .into_values()
            .map(|members| PerkFamily::from_members(members, &lookup))
            .collect();
        families.sort_by_key(|f| f.members[0]);

        let mut by_hash = HashMap::new();
        for (index, family) in families.iter().enumerate() {
            for &member in &family.members {
                by_hash.insert(member, index);
            }
        }

        Self { families, by_hash }
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    pub fn family(&self, hash: ItemHash) -> Option<&PerkFamily> {
        self.by_hash.get(&hash).map(|&i| &self.families[i])
    }

    /// Every hash of `hash`'s family; `[hash]` if it has no siblings
    pub fn variant_hashes(&self, hash: ItemHash) -> Vec<ItemHash> {
        match self.family(hash) {
            Some(family) => family.members.clone(),
            None => vec![hash],
        }
    }
}

#[derive(Debug, Default)]
struct UnionFind {
    parent: HashMap<ItemHash, ItemHash>,
}

impl UnionFind {
    fn find(&mut self, hash: ItemHash) -> ItemHash {
        let parent = *self.parent.entry(hash).or_insert(hash);
        if parent == hash {
            return hash;
        }
        let root = self.find(parent);
        self.parent.insert(hash, root);
        root
    }

    fn union(&mut self, a: ItemHash, b: ItemHash) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Lower hash becomes the root so results don't depend on order
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent.insert(child, root);
        }
    }

    fn hashes(&self) -> Vec<ItemHash> {
        let mut hashes: Vec<_> = self.parent.keys().copied().collect();
        hashes.sort_unstable();
        hashes
    }
}
