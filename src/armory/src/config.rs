//! Engine tuning knobs
//!
//! Everything here has a sensible default; front-ends deserialize it from
//! their own config files and hand it to the builders.

use serde::{Deserialize, Serialize};

use crate::inventory::WeaponPolicy;
use crate::reference::{self, TIER_LEGENDARY};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lowest rarity tier tracked as a weapon
    pub min_tier: u8,
    pub include_exotics: bool,
    /// Additional masterwork plug names to leave out of summaries
    pub extra_masterwork_denylist: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_tier: TIER_LEGENDARY,
            include_exotics: true,
            extra_masterwork_denylist: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn weapon_policy(&self) -> WeaponPolicy {
        WeaponPolicy {
            min_tier: self.min_tier,
            include_exotics: self.include_exotics,
        }
    }

    /// Whether a masterwork plug name is a placeholder to hide
    pub fn is_denied_masterwork(&self, name: &str) -> bool {
        reference::is_placeholder_masterwork(name)
            || self
                .extra_masterwork_denylist
                .iter()
                .any(|d| d.trim().eq_ignore_ascii_case(name.trim()))
    }
}
