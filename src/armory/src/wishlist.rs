//! Wishlist matching
//!
//! A selection is a set of perk hashes. Hashes are grouped by the column
//! they belong to: any one selected perk satisfies its column, and every
//! constrained column must be satisfied. Columns with nothing selected don't
//! constrain anything. Every comparison goes through a perk's full variant
//! set, so base and enhanced copies are interchangeable.
//!
//! Stored entries are keyed by weapon hash, but lookups treat every
//! cosmetic variant of a weapon as the same weapon.

pub mod dim;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::columns::ColumnRole;
use crate::dedupe::{held_plugs, socket_on, DedupedWeapon, PerkColumn};
use crate::hash::ItemHash;
use crate::inventory::{InstanceId, WeaponInstance};
use crate::manifest::Catalog;

/// Perk hashes a player has picked
pub type Selection = BTreeSet<ItemHash>;

/// A desired roll for one weapon
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WishlistItem {
    pub weapon_hash: ItemHash,
    pub perk_hashes: Vec<ItemHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl WishlistItem {
    pub fn new(weapon_hash: ItemHash, perk_hashes: impl IntoIterator<Item = ItemHash>) -> Self {
        let mut perk_hashes: Vec<ItemHash> = perk_hashes.into_iter().collect();
        dedup_in_order(&mut perk_hashes);
        Self {
            weapon_hash,
            perk_hashes,
            notes: None,
            tags: Vec::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        self.notes = (!notes.trim().is_empty()).then_some(notes);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// What makes two entries the same roll, regardless of which variant
    /// hash they were stored under
    pub fn identity(&self) -> (BTreeSet<ItemHash>, Option<&str>) {
        (
            self.perk_hashes.iter().copied().collect(),
            self.notes.as_deref().map(str::trim),
        )
    }

    pub fn selection(&self) -> Selection {
        self.perk_hashes.iter().copied().collect()
    }
}

fn dedup_in_order(hashes: &mut Vec<ItemHash>) {
    let mut seen = BTreeSet::new();
    hashes.retain(|h| seen.insert(*h));
}

// ============================================================================
// Selection <-> stored entries
// ============================================================================

/// Store a selection for `weapon_hash`. Perks are ordered by column, then by
/// their position in the column; hashes outside every column go last.
pub fn selection_to_wishlist_item(
    selection: &Selection,
    weapon_hash: ItemHash,
    columns: &[PerkColumn],
) -> WishlistItem {
    let mut ordered: Vec<(usize, usize, ItemHash)> = selection
        .iter()
        .map(|&hash| match locate(columns, hash) {
            Some((column, position)) => (column, position, hash),
            None => (usize::MAX, 0, hash),
        })
        .collect();
    ordered.sort_unstable();
    WishlistItem::new(weapon_hash, ordered.into_iter().map(|(_, _, h)| h))
}

/// Turn a stored entry back into a selection of column entries.
///
/// Hashes are mapped to the hash each column currently displays for that
/// perk; hashes outside every column are kept as they are.
pub fn load_wishlist_item_as_selection(item: &WishlistItem, columns: &[PerkColumn]) -> Selection {
    item.perk_hashes
        .iter()
        .map(|&hash| {
            columns
                .iter()
                .find_map(|c| c.entry_for(hash))
                .map_or(hash, |perk| perk.hash)
        })
        .collect()
}

/// `(column index, position within the column)` of the entry covering `hash`
fn locate(columns: &[PerkColumn], hash: ItemHash) -> Option<(usize, usize)> {
    columns.iter().find_map(|c| {
        c.perks()
            .position(|p| p.matches(hash))
            .map(|position| (c.column_index, position))
    })
}

// ============================================================================
// Constraints
// ============================================================================

/// Accepted hashes for one constrained column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnConstraint {
    pub column_index: usize,
    pub role: ColumnRole,
    pub socket_index: usize,
    /// Variants whose layout puts this column elsewhere
    pub variant_sockets: BTreeMap<ItemHash, Option<usize>>,
    /// Selected perks with every variant hash, any of which satisfies the column
    pub accepted: BTreeSet<ItemHash>,
}

impl ColumnConstraint {
    /// A masterwork is satisfied only by the committed plug; other columns
    /// by anything the copy has rolled
    pub fn matches(&self, instance: &WeaponInstance) -> bool {
        socket_on(&self.variant_sockets, self.socket_index, instance.weapon_hash)
            .and_then(|index| instance.socket(index))
            .is_some_and(|socket| {
                held_plugs(self.role, socket)
                    .iter()
                    .any(|h| self.accepted.contains(h))
            })
    }
}

/// A selection resolved against one weapon's columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionConstraints {
    pub columns: Vec<ColumnConstraint>,
    /// Selected hashes that fit no column; satisfied by a roll in any socket
    pub unclassified: BTreeSet<ItemHash>,
}

impl SelectionConstraints {
    /// Resolve `selection`, also expanding unclassified hashes through the
    /// catalog's enhanced-perk links
    pub fn new(selection: &Selection, columns: &[PerkColumn], catalog: &Catalog) -> Self {
        let mut constraints = Self::from_columns(selection, columns);
        constraints.unclassified = constraints
            .unclassified
            .iter()
            .flat_map(|&h| catalog.perk_variants(h))
            .collect();
        constraints
    }

    pub fn from_columns(selection: &Selection, columns: &[PerkColumn]) -> Self {
        let mut by_column: BTreeMap<usize, ColumnConstraint> = BTreeMap::new();
        let mut unclassified = BTreeSet::new();

        for &hash in selection {
            let hit = columns
                .iter()
                .find_map(|c| c.entry_for(hash).map(|perk| (c, perk)));
            match hit {
                Some((column, perk)) => {
                    by_column
                        .entry(column.column_index)
                        .or_insert_with(|| ColumnConstraint {
                            column_index: column.column_index,
                            role: column.role,
                            socket_index: column.socket_index,
                            variant_sockets: column.variant_sockets.clone(),
                            accepted: BTreeSet::new(),
                        })
                        .accepted
                        .extend(perk.variant_hashes.iter().copied());
                }
                None => {
                    unclassified.insert(hash);
                }
            }
        }

        Self {
            columns: by_column.into_values().collect(),
            unclassified,
        }
    }

    /// An empty selection constrains nothing
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.unclassified.is_empty()
    }

    pub fn matches(&self, instance: &WeaponInstance) -> bool {
        let columns_ok = self.columns.iter().all(|constraint| constraint.matches(instance));
        columns_ok
            && (self.unclassified.is_empty()
                || self
                    .unclassified
                    .iter()
                    .any(|&h| instance.has_rolled_anywhere(h)))
    }

    pub fn matching_instances(&self, weapon: &DedupedWeapon) -> Vec<InstanceId> {
        weapon
            .instances
            .iter()
            .filter(|i| self.matches(i))
            .map(|i| i.instance_id)
            .collect()
    }
}

/// Memoized match results for one selection.
///
/// Results are keyed by instance id; call [`MatchCache::invalidate`] when
/// the instance set changes and [`MatchCache::set_selection`] when the
/// selection does.
#[derive(Debug, Clone, Default)]
pub struct MatchCache {
    constraints: SelectionConstraints,
    results: HashMap<InstanceId, bool>,
}

impl MatchCache {
    pub fn new(constraints: SelectionConstraints) -> Self {
        Self {
            constraints,
            results: HashMap::new(),
        }
    }

    pub fn matches(&mut self, instance: &WeaponInstance) -> bool {
        let constraints = &self.constraints;
        *self
            .results
            .entry(instance.instance_id)
            .or_insert_with(|| constraints.matches(instance))
    }

    pub fn invalidate(&mut self) {
        self.results.clear();
    }

    pub fn set_selection(&mut self, constraints: SelectionConstraints) {
        if constraints != self.constraints {
            self.constraints = constraints;
            self.results.clear();
        }
    }

    pub fn constraints(&self) -> &SelectionConstraints {
        &self.constraints
    }

    /// Number of memoized results
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

// ============================================================================
// Stored entries
// ============================================================================

/// Coverage of one wishlist entry by a consolidated weapon's copies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryCoverage {
    pub item: WishlistItem,
    pub matching_instances: Vec<InstanceId>,
}

/// Wishlist entries in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist {
    items: Vec<WishlistItem>,
}

impl Wishlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add an entry unless the same roll is already stored for this exact
    /// weapon hash
    pub fn push(&mut self, item: WishlistItem) -> bool {
        let duplicate = self
            .items
            .iter()
            .any(|i| i.weapon_hash == item.weapon_hash && i.identity() == item.identity());
        if !duplicate {
            self.items.push(item);
        }
        !duplicate
    }

    /// Add an entry unless the same roll is already stored under any
    /// cosmetic variant of its weapon
    pub fn insert_collapsed(&mut self, item: WishlistItem, catalog: &Catalog) -> bool {
        let siblings = catalog.variant_hashes(item.weapon_hash);
        let duplicate = self
            .entries_for_variants(&siblings)
            .iter()
            .any(|i| i.identity() == item.identity());
        if !duplicate {
            self.items.push(item);
        }
        !duplicate
    }

    pub fn remove(&mut self, index: usize) -> Option<WishlistItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Entries applying to `weapon_hash` or any of its cosmetic variants
    pub fn entries_for(&self, catalog: &Catalog, weapon_hash: ItemHash) -> Vec<&WishlistItem> {
        self.entries_for_variants(&catalog.variant_hashes(weapon_hash))
    }

    /// Entries stored under any of `hashes`, one per distinct roll
    pub fn entries_for_variants(&self, hashes: &[ItemHash]) -> Vec<&WishlistItem> {
        let mut seen = Vec::new();
        let mut entries = Vec::new();
        for item in self.items.iter().filter(|i| hashes.contains(&i.weapon_hash)) {
            let identity = item.identity();
            if !seen.contains(&identity) {
                seen.push(identity);
                entries.push(item);
            }
        }
        entries
    }

    /// Which copies of `weapon` satisfy each entry that applies to it
    pub fn coverage(&self, catalog: &Catalog, weapon: &DedupedWeapon) -> Vec<EntryCoverage> {
        self.entries_for_variants(&weapon.variant_hash_list())
            .into_iter()
            .map(|item| {
                let constraints =
                    SelectionConstraints::new(&item.selection(), &weapon.perk_matrix, catalog);
                EntryCoverage {
                    item: item.clone(),
                    matching_instances: constraints.matching_instances(weapon),
                }
            })
            .collect()
    }
}

impl FromIterator<WishlistItem> for Wishlist {
    fn from_iter<I: IntoIterator<Item = WishlistItem>>(iter: I) -> Self {
        let mut wishlist = Wishlist::new();
        for item in iter {
            wishlist.push(item);
        }
        wishlist
    }
}

/// Expand an entry holding alternatives into one entry per combination,
/// picking a single perk per column. Hashes outside every column are kept on
/// every combination.
pub fn expand_alternatives(item: &WishlistItem, columns: &[PerkColumn]) -> Vec<WishlistItem> {
    let mut per_column: BTreeMap<usize, Vec<ItemHash>> = BTreeMap::new();
    let mut fixed = Vec::new();
    for &hash in &item.perk_hashes {
        match locate(columns, hash) {
            Some((column, _)) => per_column.entry(column).or_default().push(hash),
            None => fixed.push(hash),
        }
    }

    let mut combinations: Vec<Vec<ItemHash>> = vec![Vec::new()];
    for options in per_column.values() {
        combinations = combinations
            .iter()
            .flat_map(|prefix| {
                options.iter().map(move |&hash| {
                    let mut next = prefix.clone();
                    next.push(hash);
                    next
                })
            })
            .collect();
    }

    combinations
        .into_iter()
        .map(|mut perks| {
            perks.extend(fixed.iter().copied());
            WishlistItem {
                weapon_hash: item.weapon_hash,
                perk_hashes: perks,
                notes: item.notes.clone(),
                tags: item.tags.clone(),
            }
        })
        .collect()
}
