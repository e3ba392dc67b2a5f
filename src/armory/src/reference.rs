//! Reference data for weapon catalogs
//!
//! Hardcoded reference data for game concepts like rarity tiers, inventory
//! buckets, and masterwork plug categories. These are stable across content
//! updates, unlike the catalog itself.

use crate::hash::ItemHash;

// ============================================================================
// Rarity
// ============================================================================

/// Rarity tier information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RarityTier {
    pub tier: u8,
    pub name: &'static str,
    pub color: &'static str,
}

/// All rarity tiers in order, keyed by the catalog's `tierType`
pub const RARITY_TIERS: &[RarityTier] = &[
    RarityTier {
        tier: 0,
        name: "Unknown",
        color: "#808080",
    },
    RarityTier {
        tier: 1,
        name: "Currency",
        color: "#808080",
    },
    RarityTier {
        tier: 2,
        name: "Basic",
        color: "#C3BCB4",
    },
    RarityTier {
        tier: 3,
        name: "Common",
        color: "#366F42",
    },
    RarityTier {
        tier: 4,
        name: "Rare",
        color: "#5076A3",
    },
    RarityTier {
        tier: 5,
        name: "Legendary",
        color: "#522F65",
    },
    RarityTier {
        tier: 6,
        name: "Exotic",
        color: "#CEAE33",
    },
];

pub const TIER_LEGENDARY: u8 = 5;
pub const TIER_EXOTIC: u8 = 6;

/// Get rarity tier by tier number
pub fn rarity_by_tier(tier: u8) -> Option<&'static RarityTier> {
    RARITY_TIERS.iter().find(|r| r.tier == tier)
}

/// Get rarity tier by display name
pub fn rarity_by_name(name: &str) -> Option<&'static RarityTier> {
    RARITY_TIERS.iter().find(|r| r.name.eq_ignore_ascii_case(name))
}

// ============================================================================
// Item types and buckets
// ============================================================================

/// Catalog `itemType` for weapons
pub const ITEM_TYPE_WEAPON: i32 = 3;

/// Catalog `itemType` for mods and perks (plugs)
pub const ITEM_TYPE_MOD: i32 = 19;

/// Weapon inventory buckets (kinetic, energy, power)
pub const WEAPON_BUCKETS: &[ItemHash] = &[1_498_876_634, 2_465_295_065, 953_998_645];

/// Whether a bucket hash is one of the weapon slots
pub fn is_weapon_bucket(bucket: ItemHash) -> bool {
    WEAPON_BUCKETS.contains(&bucket)
}

// ============================================================================
// Masterworks
// ============================================================================

/// Plug category marker shared by every weapon masterwork plug and
/// whitelisted by every masterwork socket type
pub const MASTERWORK_PLUG_CATEGORY: &str = ".masterworks.";

/// Masterwork plug names that are placeholders rather than choices
pub static MASTERWORK_DENYLIST: phf::Set<&'static str> = phf::phf_set! {
    "Random Masterwork",
    "Empty Mod Socket",
    "Masterwork",
    "Empty Masterwork Socket",
};

/// Whether a masterwork plug name is a non-actionable placeholder.
///
/// Covers the fixed denylist plus the tier-tracker plugs
/// (`"Tier 3 Weapon"`, `"Tier 10 Weapon"`, ...).
pub fn is_placeholder_masterwork(name: &str) -> bool {
    let name = name.trim();
    if name.is_empty() || MASTERWORK_DENYLIST.contains(name) {
        return true;
    }
    name.strip_prefix("Tier ")
        .and_then(|rest| rest.split_once(' '))
        .is_some_and(|(tier, rest)| {
            !tier.is_empty()
                && tier.chars().all(|c| c.is_ascii_digit())
                && rest.ends_with("Weapon")
        })
}

// ============================================================================
// Enhanced perks
// ============================================================================

/// Display-name prefix carried by enhanced perks
pub const ENHANCED_PREFIX: &str = "Enhanced ";
