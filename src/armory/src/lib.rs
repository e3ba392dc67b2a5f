//! # armory
//!
//! Weapon consolidation and perk-coverage engine.
//!
//! This library provides functionality to:
//! - Look up catalog definitions by hash in either 32-bit representation
//! - Group cosmetically-distinct weapon hashes into variant classes
//! - Parse raw inventory records into owned weapon instances
//! - Consolidate owned copies into perk matrices with ownership and coverage
//! - Match owned copies against wishlist selections and DIM wishlist lines
//!
//! The library performs no I/O: catalog tables and inventory records are
//! handed over by the caller.
//!
//! ## Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let items = std::fs::read_to_string("DestinyInventoryItemDefinition.json")?;
//! let plug_sets = std::fs::read_to_string("DestinyPlugSetDefinition.json")?;
//! let catalog = armory::Catalog::from_json_tables(&items, &plug_sets, None)?;
//!
//! let records: Vec<armory::RawItemRecord> =
//!     serde_json::from_str(&std::fs::read_to_string("inventory.json")?)?;
//! let (instances, _report) = armory::InstanceParser::new(&catalog).parse_all(&records);
//!
//! for weapon in armory::PerkMatrixBuilder::new(&catalog).build(&instances) {
//!     println!("{}: {:.0}% of perks owned", weapon.name, weapon.completion_percentage);
//! }
//! # Ok(())
//! # }
//! ```

pub mod columns;
pub mod config;
pub mod dedupe;
pub mod enhanced;
pub mod hash;
pub mod inventory;
pub mod manifest;
pub mod reference;
pub mod store;
pub mod variants;
pub mod wishlist;

#[cfg(test)]
mod fixtures;

#[doc(inline)]
pub use columns::{ColumnLayout, ColumnRole, ColumnSlot, SocketKind, SOCKET_SYNONYMS};
#[doc(inline)]
pub use config::EngineConfig;
#[doc(inline)]
pub use dedupe::{DedupedWeapon, Perk, PerkColumn, PerkMatrixBuilder, VariantHash};
#[doc(inline)]
pub use enhanced::{EnhancedIndex, PerkFamily};
#[doc(inline)]
pub use hash::ItemHash;
#[doc(inline)]
pub use inventory::{
    InstanceId, InstanceParser, InstancePolicy, ParseReport, RawItemRecord, SocketState,
    WeaponInstance, WeaponPolicy,
};
#[doc(inline)]
pub use manifest::{Catalog, CatalogError, CatalogProvider, ItemDefinition, PlugSet, Table};
#[doc(inline)]
pub use store::CatalogStore;
#[doc(inline)]
pub use variants::{VariantGroup, VariantIndex, VariantKey};
#[doc(inline)]
pub use wishlist::dim::{ExportMode, WishlistFile, WishlistParseError};
#[doc(inline)]
pub use wishlist::{
    load_wishlist_item_as_selection, selection_to_wishlist_item, EntryCoverage, MatchCache,
    Selection, SelectionConstraints, Wishlist, WishlistItem,
};

// Reference data (rarities, buckets, masterwork placeholders)
#[doc(inline)]
pub use reference::{rarity_by_name, rarity_by_tier, RarityTier, RARITY_TIERS};
