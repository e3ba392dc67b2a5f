//! Weapon consolidation
//!
//! Collapses every owned copy of a logical weapon (across its cosmetic
//! variants) into one [`DedupedWeapon`]: a perk matrix with one column per
//! classified socket, showing every perk the catalog can roll there and
//! which of them the player has ever rolled on any copy.
//!
//! Output is deterministic: columns follow [`ColumnRole`] order, perks follow
//! catalog pool order, weapons are sorted by name then primary hash, and
//! instances by instance id.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::columns::{ColumnLayout, ColumnRole};
use crate::config::EngineConfig;
use crate::enhanced::{self, is_enhanced, PerkFamily};
use crate::hash::ItemHash;
use crate::inventory::{InstanceId, InstancePolicy, SocketState, WeaponInstance};
use crate::manifest::{Catalog, ItemDefinition, SocketEntry};

// ============================================================================
// Output model
// ============================================================================

/// One logical perk as shown in a column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Perk {
    /// Hash to display: the enhanced copy if one is owned, else the base
    pub hash: ItemHash,
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
    pub is_owned: bool,
    /// Every hash of this logical perk, ascending
    pub variant_hashes: Vec<ItemHash>,
    pub base_hash: ItemHash,
    pub enhanced_hash: Option<ItemHash>,
    pub cannot_currently_roll: bool,
    pub has_enhanced_variant: bool,
}

impl Perk {
    pub fn matches(&self, hash: ItemHash) -> bool {
        self.variant_hashes.binary_search(&hash).is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerkColumn {
    /// Position in the perk matrix
    pub column_index: usize,
    pub role: ColumnRole,
    pub column_name: &'static str,
    /// Socket this column reads from on the primary definition
    pub socket_index: usize,
    /// Variants whose own layout puts this column elsewhere (`None`: absent)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variant_sockets: BTreeMap<ItemHash, Option<usize>>,
    /// Perks that can currently roll, in pool order
    pub available_perks: Vec<Perk>,
    /// Perks that can no longer roll but may sit on owned copies
    pub retired_perks: Vec<Perk>,
    /// Every hash rolled here by any owned copy
    pub owned_perks: BTreeSet<ItemHash>,
}

impl PerkColumn {
    /// Displayed or retired entry covering `hash`
    pub fn entry_for(&self, hash: ItemHash) -> Option<&Perk> {
        self.perks().find(|p| p.matches(hash))
    }

    pub fn contains(&self, hash: ItemHash) -> bool {
        self.entry_for(hash).is_some()
    }

    /// Available perks followed by retired ones
    pub fn perks(&self) -> impl Iterator<Item = &Perk> {
        self.available_perks.iter().chain(&self.retired_perks)
    }

    pub fn owned_count(&self) -> usize {
        self.available_perks.iter().filter(|p| p.is_owned).count()
    }

    /// Socket this column occupies on a copy of `weapon_hash`
    pub fn socket_index_for(&self, weapon_hash: ItemHash) -> Option<usize> {
        socket_on(&self.variant_sockets, self.socket_index, weapon_hash)
    }

    /// This column's socket on one owned copy
    pub fn socket_of<'i>(&self, instance: &'i WeaponInstance) -> Option<&'i SocketState> {
        instance.socket(self.socket_index_for(instance.weapon_hash)?)
    }
}

/// Socket index of a column on `weapon_hash`, given the primary index and the
/// variants that differ from it
pub(crate) fn socket_on(
    variant_sockets: &BTreeMap<ItemHash, Option<usize>>,
    socket_index: usize,
    weapon_hash: ItemHash,
) -> Option<usize> {
    match variant_sockets.get(&weapon_hash) {
        Some(index) => *index,
        None => Some(socket_index),
    }
}

/// Plugs a copy counts as owning in a socket. The masterwork is a single
/// committed choice; its reusable list is what's on offer, not history.
pub(crate) fn held_plugs(role: ColumnRole, socket: &SocketState) -> Vec<ItemHash> {
    if role == ColumnRole::Masterwork {
        socket.active_plug_hash.into_iter().collect()
    } else {
        socket.rolled().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VariantHash {
    pub hash: ItemHash,
    pub is_holofoil: bool,
}

/// Every owned copy of one logical weapon, consolidated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DedupedWeapon {
    pub primary_hash: ItemHash,
    pub name: String,
    /// Non-holofoil first, then ascending hash
    pub variant_hashes: Vec<VariantHash>,
    pub perk_matrix: Vec<PerkColumn>,
    pub intrinsic_perks: Vec<Perk>,
    /// Masterwork choices, placeholders removed
    pub masterwork_perks: Vec<Perk>,
    pub instances: Vec<WeaponInstance>,
    pub total_perks_owned: usize,
    pub total_perks_possible: usize,
    pub completion_percentage: f64,
    /// Masterwork socket on the primary definition's layout
    pub masterwork_socket_index: Option<usize>,
    pub has_holofoil: bool,
}

impl DedupedWeapon {
    pub fn column(&self, role: ColumnRole) -> Option<&PerkColumn> {
        self.perk_matrix.iter().find(|c| c.role == role)
    }

    /// Column reading `socket_index` of the primary definition
    pub fn column_for_socket(&self, socket_index: usize) -> Option<&PerkColumn> {
        self.perk_matrix
            .iter()
            .find(|c| c.socket_index == socket_index)
    }

    pub fn instance(&self, id: InstanceId) -> Option<&WeaponInstance> {
        self.instances
            .binary_search_by_key(&id, |i| i.instance_id)
            .ok()
            .map(|i| &self.instances[i])
    }

    pub fn variant_hash_list(&self) -> Vec<ItemHash> {
        self.variant_hashes.iter().map(|v| v.hash).collect()
    }

    /// The masterwork committed on one copy; placeholders count as none
    pub fn masterwork_of(&self, id: InstanceId) -> Option<&Perk> {
        let column = self.column(ColumnRole::Masterwork)?;
        let plug = column.socket_of(self.instance(id)?)?.active_plug_hash?;
        self.masterwork_perks.iter().find(|p| p.matches(plug))
    }
}

// ============================================================================
// Builder
// ============================================================================

pub struct PerkMatrixBuilder<'a> {
    catalog: &'a Catalog,
    config: EngineConfig,
}

impl<'a> PerkMatrixBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self::with_config(catalog, EngineConfig::default())
    }

    pub fn with_config(catalog: &'a Catalog, config: EngineConfig) -> Self {
        Self { catalog, config }
    }

    /// Consolidate owned copies. Copies whose weapon the catalog doesn't know
    /// are left out.
    pub fn build(&self, instances: &[WeaponInstance]) -> Vec<DedupedWeapon> {
        let mut groups: BTreeMap<ItemHash, Vec<WeaponInstance>> = BTreeMap::new();
        for instance in instances {
            groups
                .entry(self.group_key(instance.weapon_hash))
                .or_default()
                .push(instance.clone());
        }

        let mut weapons = Vec::with_capacity(groups.len());
        for (primary_hash, mut members) in groups {
            members.sort_by_key(|i| i.instance_id);
            members.dedup_by_key(|i| i.instance_id);
            match self.build_weapon(primary_hash, members) {
                Some(weapon) => weapons.push(weapon),
                None => tracing::warn!(primary_hash, "weapon missing from catalog, skipped"),
            }
        }
        sort_weapons(&mut weapons);

        tracing::debug!(
            instances = instances.len(),
            weapons = weapons.len(),
            "weapons consolidated"
        );
        weapons
    }

    /// Catalog-only view of one weapon, as if no copies were owned
    pub fn build_for_definition(&self, hash: ItemHash) -> Option<DedupedWeapon> {
        let def = self.catalog.item(hash)?;
        if !def.is_weapon() {
            return None;
        }
        self.build_weapon(self.group_key(hash), Vec::new())
    }

    /// Catalog-only views of every weapon group whose primary definition
    /// passes `policy`
    pub fn build_catalog_view<P: InstancePolicy>(&self, policy: &P) -> Vec<DedupedWeapon> {
        let mut weapons: Vec<DedupedWeapon> = self
            .catalog
            .variant_index()
            .groups()
            .iter()
            .map(|g| g.primary_hash())
            .filter(|h| self.catalog.item(*h).is_some_and(|d| policy.accepts(d)))
            .filter_map(|h| self.build_weapon(h, Vec::new()))
            .collect();
        sort_weapons(&mut weapons);
        weapons
    }

    fn group_key(&self, weapon_hash: ItemHash) -> ItemHash {
        self.catalog
            .variant_group(weapon_hash)
            .map(|g| g.primary_hash())
            .unwrap_or(weapon_hash)
    }

    fn build_weapon(
        &self,
        primary_hash: ItemHash,
        instances: Vec<WeaponInstance>,
    ) -> Option<DedupedWeapon> {
        let def = self.catalog.item(primary_hash)?;
        let variant_hashes = self.variant_hashes(primary_hash, &instances);
        let layout = ColumnLayout::classify(def, self.catalog);
        let variant_layouts: Vec<(ItemHash, ColumnLayout)> = variant_hashes
            .iter()
            .filter(|v| v.hash != primary_hash)
            .filter_map(|v| {
                let variant = self.catalog.item(v.hash)?;
                Some((v.hash, ColumnLayout::classify(variant, self.catalog)))
            })
            .filter(|(_, variant_layout)| *variant_layout != layout)
            .collect();

        let perk_matrix: Vec<PerkColumn> = layout
            .slots
            .iter()
            .enumerate()
            .filter_map(|(column_index, slot)| {
                let socket = def.socket_entries().get(slot.socket_index)?;
                let variant_sockets = variant_layouts
                    .iter()
                    .map(|(hash, l)| (*hash, l.socket_for(slot.role)))
                    .filter(|(_, index)| *index != Some(slot.socket_index))
                    .collect();
                let column = ColumnDraft {
                    column_index,
                    role: slot.role,
                    socket_index: slot.socket_index,
                    variant_sockets,
                };
                Some(self.build_column(column, socket, &instances))
            })
            .collect();

        let intrinsic_perks = perk_matrix
            .iter()
            .filter(|c| c.role == ColumnRole::Intrinsic)
            .flat_map(|c| c.available_perks.iter().cloned())
            .collect();
        let masterwork_perks = perk_matrix
            .iter()
            .filter(|c| c.role == ColumnRole::Masterwork)
            .flat_map(|c| c.perks().cloned())
            .filter(|p| !self.config.is_denied_masterwork(&p.name))
            .collect();

        let (total_perks_owned, total_perks_possible) = perk_matrix
            .iter()
            .filter(|c| c.role.counts_toward_completion())
            .fold((0, 0), |(owned, possible), c| {
                (owned + c.owned_count(), possible + c.available_perks.len())
            });
        let completion_percentage = if total_perks_possible == 0 {
            0.0
        } else {
            total_perks_owned as f64 / total_perks_possible as f64 * 100.0
        };

        let has_holofoil = variant_hashes.iter().any(|v| v.is_holofoil);
        Some(DedupedWeapon {
            primary_hash,
            name: def.name().to_string(),
            variant_hashes,
            perk_matrix,
            intrinsic_perks,
            masterwork_perks,
            instances,
            total_perks_owned,
            total_perks_possible,
            completion_percentage,
            masterwork_socket_index: layout.masterwork_socket_index(),
            has_holofoil,
        })
    }

    /// The variant class together with every hash an owned copy carries
    fn variant_hashes(
        &self,
        primary_hash: ItemHash,
        instances: &[WeaponInstance],
    ) -> Vec<VariantHash> {
        let mut hashes: BTreeSet<(bool, ItemHash)> = BTreeSet::new();
        match self.catalog.variant_group(primary_hash) {
            Some(group) => {
                hashes.extend(group.members.iter().map(|m| m.order_key()));
            }
            None => {
                hashes.insert((self.is_holofoil(primary_hash), primary_hash));
            }
        }
        for instance in instances {
            hashes.insert((instance.is_holofoil, instance.weapon_hash));
        }
        hashes
            .into_iter()
            .map(|(is_holofoil, hash)| VariantHash { hash, is_holofoil })
            .collect()
    }

    fn is_holofoil(&self, hash: ItemHash) -> bool {
        self.catalog.item(hash).is_some_and(|d| d.is_holofoil)
    }

    fn build_column(
        &self,
        column: ColumnDraft,
        socket: &SocketEntry,
        instances: &[WeaponInstance],
    ) -> PerkColumn {
        let ColumnDraft {
            column_index,
            role,
            socket_index,
            variant_sockets,
        } = column;
        let owned_perks: BTreeSet<ItemHash> = instances
            .iter()
            .filter_map(|i| {
                let index = socket_on(&variant_sockets, socket_index, i.weapon_hash)?;
                i.socket(index)
            })
            .flat_map(|s| held_plugs(role, s))
            .collect();

        // Pool order first, then anything only seen on owned copies
        let mut pool = socket_pool(socket, self.catalog);
        for &hash in &owned_perks {
            if !pool.iter().any(|(h, _)| *h == hash) {
                tracing::trace!(socket_index, hash, "perk only seen on owned copies");
                pool.push((hash, false));
            }
        }

        let mut available_perks = Vec::new();
        let mut retired_perks = Vec::new();
        for draft in self.merge_families(&pool) {
            let perk = self.perk(&draft, &owned_perks);
            if perk.cannot_currently_roll {
                retired_perks.push(perk);
            } else {
                available_perks.push(perk);
            }
        }

        PerkColumn {
            column_index,
            role,
            column_name: role.name(),
            socket_index,
            variant_sockets,
            available_perks,
            retired_perks,
            owned_perks,
        }
    }

    /// Group a column's pool into logical perks, linking enhanced copies
    /// both within this pool and across the catalog
    fn merge_families(&self, pool: &[(ItemHash, bool)]) -> Vec<PerkDraft> {
        let lookup = |h: ItemHash| self.catalog.item(h);
        let hashes: Vec<ItemHash> = pool.iter().map(|(h, _)| *h).collect();

        let mut drafts: Vec<PerkDraft> = Vec::new();
        for family in enhanced::group_by_name(&hashes, &lookup) {
            let mut variants: BTreeSet<ItemHash> = family.members.iter().copied().collect();
            for &member in &family.members {
                variants.extend(self.catalog.perk_variants(member));
            }
            let rollable = pool
                .iter()
                .any(|(h, roll)| *roll && family.contains(*h));

            match drafts
                .iter_mut()
                .find(|d| !d.variants.is_disjoint(&variants))
            {
                Some(existing) => {
                    existing.variants.extend(variants);
                    existing.local.extend(family.members.iter().copied());
                    existing.rollable |= rollable;
                }
                None => drafts.push(PerkDraft {
                    local: family.members,
                    variants,
                    rollable,
                }),
            }
        }
        drafts
    }

    fn perk(&self, draft: &PerkDraft, owned: &BTreeSet<ItemHash>) -> Perk {
        let lookup = |h: ItemHash| self.catalog.item(h);
        let local = PerkFamily::from_members(draft.local.clone(), &lookup);
        let family = PerkFamily::from_members(draft.variants.iter().copied().collect(), &lookup);

        let owned_enhanced = draft
            .variants
            .iter()
            .copied()
            .filter(|h| owned.contains(h))
            .find(|h| lookup(*h).is_some_and(is_enhanced));
        let hash = owned_enhanced.unwrap_or(local.base_hash);
        let def: Option<&ItemDefinition> = lookup(hash);

        Perk {
            hash,
            name: def.map(|d| d.name().to_string()).unwrap_or_default(),
            description: def
                .map(|d| d.display_properties.description.clone())
                .unwrap_or_default(),
            icon: def.and_then(|d| d.display_properties.icon.clone()),
            is_owned: draft.variants.iter().any(|h| owned.contains(h)),
            variant_hashes: family.members.clone(),
            base_hash: family.base_hash,
            enhanced_hash: family.enhanced_hash,
            cannot_currently_roll: !draft.rollable,
            has_enhanced_variant: family.has_enhanced_variant(),
        }
    }
}

struct ColumnDraft {
    column_index: usize,
    role: ColumnRole,
    socket_index: usize,
    variant_sockets: BTreeMap<ItemHash, Option<usize>>,
}

struct PerkDraft {
    /// Hashes seen in this column
    local: Vec<ItemHash>,
    /// Local hashes plus catalog-wide siblings
    variants: BTreeSet<ItemHash>,
    rollable: bool,
}

/// Plugs a socket can hold with whether each can still roll. A plug counts
/// as rollable if any of the pools it appears in still offers it.
fn socket_pool(socket: &SocketEntry, catalog: &Catalog) -> Vec<(ItemHash, bool)> {
    let mut pool: Vec<(ItemHash, bool)> = Vec::new();
    let mut add = |hash: ItemHash, roll: bool| match pool.iter_mut().find(|(h, _)| *h == hash) {
        Some(entry) => entry.1 |= roll,
        None => pool.push((hash, roll)),
    };

    for set_hash in [socket.randomized_plug_set_hash, socket.reusable_plug_set_hash]
        .into_iter()
        .flatten()
    {
        if let Some(set) = catalog.get_plug_set(i64::from(set_hash)) {
            for entry in &set.reusable_plug_items {
                add(entry.plug_item_hash, entry.currently_can_roll);
            }
        }
    }
    if let Some(hash) = socket.single_initial_item_hash {
        add(hash, true);
    }
    for entry in &socket.reusable_plug_items {
        add(entry.plug_item_hash, entry.currently_can_roll);
    }
    pool
}

fn sort_weapons(weapons: &mut [DedupedWeapon]) {
    weapons.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.primary_hash.cmp(&b.primary_hash))
    });
}
