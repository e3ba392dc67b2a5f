//! Catalog (manifest) tables for weapons, plugs, and socket types
//!
//! The catalog is fetched and versioned by an outside collaborator. This
//! module only models the tables it hands over and answers lookups against
//! them. Tables are keyed as they were delivered: keys may be signed or
//! unsigned, so every lookup goes through [`crate::hash::resolve`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::enhanced::{EnhancedIndex, PerkFamily};
use crate::hash::{self, deserialize_hash, deserialize_opt_hash, ItemHash};
use crate::reference::{self, ITEM_TYPE_WEAPON, MASTERWORK_PLUG_CATEGORY};
use crate::variants::{VariantGroup, VariantIndex};

/// Errors raised while loading catalog tables
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog table not available: {0}")]
    MissingTable(String),

    #[error("Failed to parse catalog table {table}: {source}")]
    Json {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Catalog table {table} contained no usable definitions")]
    EmptyTable { table: String },

    #[error("Catalog provider failed to load {table}: {message}")]
    Provider { table: String, message: String },
}

// ============================================================================
// Tables
// ============================================================================

/// Catalog tables consumed by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    InventoryItem,
    PlugSet,
    SocketType,
}

impl Table {
    /// Table name as published by the catalog provider
    pub fn name(&self) -> &'static str {
        match self {
            Table::InventoryItem => "DestinyInventoryItemDefinition",
            Table::PlugSet => "DestinyPlugSetDefinition",
            Table::SocketType => "DestinySocketTypeDefinition",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Source of raw catalog tables (network cache, files on disk, test fixtures)
pub trait CatalogProvider {
    /// Return the raw JSON text of a table, keyed by definition hash.
    ///
    /// Returns [`CatalogError::MissingTable`] if the provider doesn't have it.
    fn load_table(&self, name: &str) -> Result<String, CatalogError>;
}

// ============================================================================
// Definitions
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayProperties {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryBlock {
    #[serde(default)]
    pub tier_type: u8,
    #[serde(default, deserialize_with = "deserialize_opt_hash")]
    pub bucket_type_hash: Option<ItemHash>,
}

/// One member of a plug set or inline plug pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlugSetEntry {
    #[serde(deserialize_with = "deserialize_hash")]
    pub plug_item_hash: ItemHash,
    /// `false` for perks retired from the pool that existing copies may still carry
    #[serde(default = "default_true")]
    pub currently_can_roll: bool,
}

fn default_true() -> bool {
    true
}

/// One socket in a definition's layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketEntry {
    #[serde(default, deserialize_with = "deserialize_opt_hash")]
    pub socket_type_hash: Option<ItemHash>,
    #[serde(default, deserialize_with = "deserialize_opt_hash")]
    pub single_initial_item_hash: Option<ItemHash>,
    #[serde(default, deserialize_with = "deserialize_opt_hash")]
    pub randomized_plug_set_hash: Option<ItemHash>,
    #[serde(default, deserialize_with = "deserialize_opt_hash")]
    pub reusable_plug_set_hash: Option<ItemHash>,
    #[serde(default)]
    pub reusable_plug_items: Vec<PlugSetEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketsBlock {
    #[serde(default)]
    pub socket_entries: Vec<SocketEntry>,
}

/// Present on plug (perk, mod, masterwork) definitions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlugBlock {
    #[serde(default)]
    pub plug_category_identifier: String,
    #[serde(default, deserialize_with = "deserialize_opt_hash")]
    pub plug_category_hash: Option<ItemHash>,
}

/// Inventory item definition (weapons and plugs share the table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDefinition {
    #[serde(deserialize_with = "deserialize_hash")]
    pub hash: ItemHash,
    #[serde(default)]
    pub display_properties: DisplayProperties,
    #[serde(default)]
    pub item_type: i32,
    #[serde(default)]
    pub item_type_display_name: String,
    #[serde(default)]
    pub inventory: InventoryBlock,
    #[serde(default)]
    pub sockets: Option<SocketsBlock>,
    #[serde(default)]
    pub plug: Option<PlugBlock>,
    #[serde(default, deserialize_with = "deserialize_opt_hash")]
    pub season_hash: Option<ItemHash>,
    #[serde(default)]
    pub icon_watermark: Option<String>,
    #[serde(default)]
    pub is_holofoil: bool,
}

impl ItemDefinition {
    pub fn name(&self) -> &str {
        &self.display_properties.name
    }

    pub fn is_weapon(&self) -> bool {
        self.item_type == ITEM_TYPE_WEAPON
            || self
                .inventory
                .bucket_type_hash
                .is_some_and(reference::is_weapon_bucket)
    }

    pub fn rarity_tier(&self) -> u8 {
        self.inventory.tier_type
    }

    pub fn socket_entries(&self) -> &[SocketEntry] {
        self.sockets
            .as_ref()
            .map(|s| s.socket_entries.as_slice())
            .unwrap_or(&[])
    }

    /// Season identifier, if the definition carries one
    pub fn season(&self) -> Option<ItemHash> {
        self.season_hash
    }

    /// Cosmetic watermark, ignoring empty strings
    pub fn watermark(&self) -> Option<&str> {
        self.icon_watermark
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
    }

    pub fn plug_category(&self) -> Option<&str> {
        self.plug
            .as_ref()
            .map(|p| p.plug_category_identifier.as_str())
            .filter(|c| !c.is_empty())
    }

    /// Masterwork plugs are identified by their plug category
    pub fn is_masterwork_plug(&self) -> bool {
        self.plug_category()
            .is_some_and(|c| c.contains(MASTERWORK_PLUG_CATEGORY))
    }
}

/// Plug set definition: an ordered pool of plugs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlugSet {
    #[serde(deserialize_with = "deserialize_hash")]
    pub hash: ItemHash,
    #[serde(default)]
    pub reusable_plug_items: Vec<PlugSetEntry>,
}

impl PlugSet {
    pub fn plug_hashes(&self) -> impl Iterator<Item = ItemHash> + '_ {
        self.reusable_plug_items.iter().map(|p| p.plug_item_hash)
    }

    pub fn contains(&self, plug: ItemHash) -> bool {
        self.plug_hashes().any(|h| h == plug)
    }

    /// Whether `plug` can still drop from this set
    pub fn can_roll(&self, plug: ItemHash) -> bool {
        self.reusable_plug_items
            .iter()
            .any(|p| p.plug_item_hash == plug && p.currently_can_roll)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlugWhitelistEntry {
    #[serde(default, deserialize_with = "deserialize_opt_hash")]
    pub category_hash: Option<ItemHash>,
    #[serde(default)]
    pub category_identifier: String,
}

/// Socket type definition: what a socket structurally accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketTypeDefinition {
    #[serde(deserialize_with = "deserialize_hash")]
    pub hash: ItemHash,
    #[serde(default)]
    pub plug_whitelist: Vec<PlugWhitelistEntry>,
}

impl SocketTypeDefinition {
    pub fn is_masterwork(&self) -> bool {
        self.plug_whitelist
            .iter()
            .any(|w| w.category_identifier.contains(MASTERWORK_PLUG_CATEGORY))
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Read-only in-memory catalog with its precomputed indexes
#[derive(Debug, Clone)]
pub struct Catalog {
    items: HashMap<i64, ItemDefinition>,
    plug_sets: HashMap<i64, PlugSet>,
    socket_types: HashMap<i64, SocketTypeDefinition>,
    variants: VariantIndex,
    enhanced: EnhancedIndex,
    version: String,
}

impl Catalog {
    /// Load every table the engine needs from a provider.
    ///
    /// The socket type table is optional; masterwork detection falls back to
    /// plug categories without it.
    pub fn load(provider: &dyn CatalogProvider) -> Result<Self, CatalogError> {
        let items = provider.load_table(Table::InventoryItem.name())?;
        let plug_sets = provider.load_table(Table::PlugSet.name())?;
        let socket_types = match provider.load_table(Table::SocketType.name()) {
            Ok(text) => Some(text),
            Err(CatalogError::MissingTable(_)) => None,
            Err(e) => return Err(e),
        };
        Self::from_json_tables(&items, &plug_sets, socket_types.as_deref())
    }

    /// Build a catalog from raw table JSON (objects keyed by hash).
    ///
    /// Individual definitions that fail to parse are skipped; a table that
    /// yields nothing at all is an error.
    pub fn from_json_tables(
        items: &str,
        plug_sets: &str,
        socket_types: Option<&str>,
    ) -> Result<Self, CatalogError> {
        let mut hasher = Sha256::new();
        hasher.update(items.as_bytes());
        hasher.update(plug_sets.as_bytes());
        if let Some(text) = socket_types {
            hasher.update(text.as_bytes());
        }
        let version = hex::encode(hasher.finalize());

        let items: HashMap<i64, ItemDefinition> =
            parse_table(Table::InventoryItem, items, |d: &ItemDefinition| d.hash)?;
        if items.is_empty() {
            return Err(CatalogError::EmptyTable {
                table: Table::InventoryItem.name().to_string(),
            });
        }
        let plug_sets = parse_table(Table::PlugSet, plug_sets, |p: &PlugSet| p.hash)?;
        let socket_types = match socket_types {
            Some(text) => parse_table(Table::SocketType, text, |s: &SocketTypeDefinition| s.hash)?,
            None => HashMap::new(),
        };

        Ok(Self::assemble(items, plug_sets, socket_types, version))
    }

    /// Build a catalog from already-parsed definitions, keyed by their own hash
    pub fn from_definitions(
        items: Vec<ItemDefinition>,
        plug_sets: Vec<PlugSet>,
        socket_types: Vec<SocketTypeDefinition>,
    ) -> Self {
        let mut hasher = Sha256::new();
        let mut keyed_items: Vec<_> = items.iter().collect();
        keyed_items.sort_by_key(|d| d.hash);
        for d in &keyed_items {
            hasher.update(serde_json::to_vec(d).unwrap_or_default());
        }
        let mut keyed_sets: Vec<_> = plug_sets.iter().collect();
        keyed_sets.sort_by_key(|p| p.hash);
        for p in &keyed_sets {
            hasher.update(serde_json::to_vec(p).unwrap_or_default());
        }
        let mut keyed_types: Vec<_> = socket_types.iter().collect();
        keyed_types.sort_by_key(|s| s.hash);
        for s in &keyed_types {
            hasher.update(serde_json::to_vec(s).unwrap_or_default());
        }
        let version = hex::encode(hasher.finalize());

        Self::assemble(
            items.into_iter().map(|d| (i64::from(d.hash), d)).collect(),
            plug_sets.into_iter().map(|p| (i64::from(p.hash), p)).collect(),
            socket_types
                .into_iter()
                .map(|s| (i64::from(s.hash), s))
                .collect(),
            version,
        )
    }

    fn assemble(
        items: HashMap<i64, ItemDefinition>,
        plug_sets: HashMap<i64, PlugSet>,
        socket_types: HashMap<i64, SocketTypeDefinition>,
        version: String,
    ) -> Self {
        let variants = VariantIndex::build(items.values());
        let enhanced = EnhancedIndex::build(plug_sets.values(), |h| {
            hash::resolve(&items, i64::from(h))
        });

        tracing::debug!(
            items = items.len(),
            plug_sets = plug_sets.len(),
            socket_types = socket_types.len(),
            variant_groups = variants.len(),
            perk_families = enhanced.len(),
            "catalog indexed"
        );

        Self {
            items,
            plug_sets,
            socket_types,
            variants,
            enhanced,
            version,
        }
    }

    /// SHA-256 fingerprint of the tables this catalog was built from
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item definition by hash in either representation
    pub fn get_definition(&self, hash: i64) -> Option<&ItemDefinition> {
        hash::resolve(&self.items, hash)
    }

    pub fn get_plug_set(&self, hash: i64) -> Option<&PlugSet> {
        hash::resolve(&self.plug_sets, hash)
    }

    pub fn get_socket_type(&self, hash: i64) -> Option<&SocketTypeDefinition> {
        hash::resolve(&self.socket_types, hash)
    }

    /// Convenience lookup for canonical hashes
    pub fn item(&self, hash: ItemHash) -> Option<&ItemDefinition> {
        self.get_definition(i64::from(hash))
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ItemDefinition> {
        self.items.values()
    }

    /// All hashes cosmetically equivalent to `hash`, always including `hash`
    pub fn variant_hashes(&self, hash: ItemHash) -> Vec<ItemHash> {
        self.variants.variant_hashes(hash)
    }

    pub fn variant_group(&self, hash: ItemHash) -> Option<&VariantGroup> {
        self.variants.group_of(hash)
    }

    pub fn variant_index(&self) -> &VariantIndex {
        &self.variants
    }

    /// Base/enhanced family a plug belongs to, if it has any siblings
    pub fn perk_family(&self, plug: ItemHash) -> Option<&PerkFamily> {
        self.enhanced.family(plug)
    }

    /// Every hash treated as the same logical perk as `plug`
    pub fn perk_variants(&self, plug: ItemHash) -> Vec<ItemHash> {
        self.enhanced.variant_hashes(plug)
    }
}

fn parse_table<T, F>(table: Table, text: &str, own_hash: F) -> Result<HashMap<i64, T>, CatalogError>
where
    T: serde::de::DeserializeOwned,
    F: Fn(&T) -> ItemHash,
{
    let raw: HashMap<String, serde_json::Value> =
        serde_json::from_str(text).map_err(|source| CatalogError::Json {
            table: table.name().to_string(),
            source,
        })?;

    let mut parsed = HashMap::with_capacity(raw.len());
    let mut skipped = 0usize;
    for (key, value) in raw {
        let def: T = match serde_json::from_value(value) {
            Ok(def) => def,
            Err(e) => {
                tracing::trace!(%table, %key, error = %e, "skipping unparsable definition");
                skipped += 1;
                continue;
            }
        };
        let key = hash::parse_key(&key).unwrap_or_else(|| i64::from(own_hash(&def)));
        parsed.insert(key, def);
    }

    if skipped > 0 {
        tracing::warn!(%table, skipped, "some catalog definitions could not be parsed");
    }
    Ok(parsed)
}
