//! Perk column classification
//!
//! Each weapon socket is classified into one of a fixed set of column roles
//! from the display name of the plugs it holds ("Barrel", "Scope",
//! "Battery", "Trait", ...). The masterwork socket is recognized from its
//! socket type instead. Sockets that match nothing (mods, shaders, trackers,
//! mementos) are not columns.

use serde::{Deserialize, Serialize};

use crate::hash::ItemHash;
use crate::manifest::{Catalog, ItemDefinition, SocketEntry};

/// Column roles, in display order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Intrinsic,
    Barrel,
    Magazine,
    LeftTrait,
    RightTrait,
    OriginTrait,
    Masterwork,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 7] = [
        ColumnRole::Intrinsic,
        ColumnRole::Barrel,
        ColumnRole::Magazine,
        ColumnRole::LeftTrait,
        ColumnRole::RightTrait,
        ColumnRole::OriginTrait,
        ColumnRole::Masterwork,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ColumnRole::Intrinsic => "Intrinsic",
            ColumnRole::Barrel => "Barrel",
            ColumnRole::Magazine => "Magazine",
            ColumnRole::LeftTrait => "Left Trait",
            ColumnRole::RightTrait => "Right Trait",
            ColumnRole::OriginTrait => "Origin Trait",
            ColumnRole::Masterwork => "Masterwork",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Intrinsic and masterwork columns aren't rolled perks
    pub fn counts_toward_completion(&self) -> bool {
        !matches!(self, ColumnRole::Intrinsic | ColumnRole::Masterwork)
    }
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// What a socket's plug names say it is, before trait sides are assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SocketKind {
    // Declared in match priority order
    Origin,
    Intrinsic,
    Barrel,
    Magazine,
    Trait,
}

/// Socket name synonyms. Add new game vocabulary here.
pub static SOCKET_SYNONYMS: phf::Map<&'static str, SocketKind> = phf::phf_map! {
    "origin trait" => SocketKind::Origin,
    "origin" => SocketKind::Origin,
    "intrinsic" => SocketKind::Intrinsic,
    "frame" => SocketKind::Intrinsic,
    "barrel" => SocketKind::Barrel,
    "barrels" => SocketKind::Barrel,
    "rail" => SocketKind::Barrel,
    "scope" => SocketKind::Barrel,
    "sight" => SocketKind::Barrel,
    "sights" => SocketKind::Barrel,
    "bowstring" => SocketKind::Barrel,
    "blade" => SocketKind::Barrel,
    "haft" => SocketKind::Barrel,
    "launcher barrel" => SocketKind::Barrel,
    "magazine" => SocketKind::Magazine,
    "magazines" => SocketKind::Magazine,
    "battery" => SocketKind::Magazine,
    "bolt" => SocketKind::Magazine,
    "ammunition" => SocketKind::Magazine,
    "arrow" => SocketKind::Magazine,
    "guard" => SocketKind::Magazine,
    "trait" => SocketKind::Trait,
    "traits" => SocketKind::Trait,
};

/// Classify a socket from a plug's display name.
///
/// The whole name is tried first ("Origin Trait"), then each word, keeping
/// the highest-priority hit ("Enhanced Trait" → trait).
pub fn classify_name(name: &str) -> Option<SocketKind> {
    let lower = name.trim().to_ascii_lowercase();
    if lower.is_empty() {
        return None;
    }
    if let Some(kind) = SOCKET_SYNONYMS.get(lower.as_str()) {
        return Some(*kind);
    }
    lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter_map(|word| SOCKET_SYNONYMS.get(word).copied())
        .min()
}

/// A classified socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnSlot {
    pub role: ColumnRole,
    pub socket_index: usize,
}

/// Column roles of one weapon definition's socket layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnLayout {
    /// Sorted by role, one slot per role at most
    pub slots: Vec<ColumnSlot>,
}

impl ColumnLayout {
    pub fn classify(def: &ItemDefinition, catalog: &Catalog) -> Self {
        let mut slots: Vec<ColumnSlot> = Vec::new();
        let mut traits_seen = 0usize;

        for (socket_index, socket) in def.socket_entries().iter().enumerate() {
            let role = if is_masterwork_socket(socket, catalog) {
                Some(ColumnRole::Masterwork)
            } else {
                match socket_name(socket, catalog).and_then(classify_name) {
                    Some(SocketKind::Trait) => {
                        traits_seen += 1;
                        match traits_seen {
                            1 => Some(ColumnRole::LeftTrait),
                            2 => Some(ColumnRole::RightTrait),
                            _ => None,
                        }
                    }
                    Some(SocketKind::Origin) => Some(ColumnRole::OriginTrait),
                    Some(SocketKind::Intrinsic) => Some(ColumnRole::Intrinsic),
                    Some(SocketKind::Barrel) => Some(ColumnRole::Barrel),
                    Some(SocketKind::Magazine) => Some(ColumnRole::Magazine),
                    None => None,
                }
            };

            let Some(role) = role else {
                tracing::trace!(weapon = def.hash, socket_index, "socket is not a perk column");
                continue;
            };
            if slots.iter().any(|s| s.role == role) {
                tracing::trace!(weapon = def.hash, socket_index, %role, "duplicate column role ignored");
                continue;
            }
            slots.push(ColumnSlot { role, socket_index });
        }

        slots.sort_by_key(|s| s.role);
        Self { slots }
    }

    pub fn socket_for(&self, role: ColumnRole) -> Option<usize> {
        self.slots
            .iter()
            .find(|s| s.role == role)
            .map(|s| s.socket_index)
    }

    pub fn role_for_socket(&self, socket_index: usize) -> Option<ColumnRole> {
        self.slots
            .iter()
            .find(|s| s.socket_index == socket_index)
            .map(|s| s.role)
    }

    pub fn masterwork_socket_index(&self) -> Option<usize> {
        self.socket_for(ColumnRole::Masterwork)
    }
}

/// Masterwork sockets are recognized structurally: by a socket type that
/// whitelists masterwork plugs, or by the plug category of what they hold.
pub fn is_masterwork_socket(socket: &SocketEntry, catalog: &Catalog) -> bool {
    if let Some(socket_type) = socket
        .socket_type_hash
        .and_then(|h| catalog.get_socket_type(i64::from(h)))
    {
        return socket_type.is_masterwork();
    }
    candidate_plugs(socket, catalog)
        .into_iter()
        .filter_map(|h| catalog.item(h))
        .any(ItemDefinition::is_masterwork_plug)
}

/// The display name that describes a socket: the type name of the first
/// plug that has one.
fn socket_name<'c>(socket: &SocketEntry, catalog: &'c Catalog) -> Option<&'c str> {
    candidate_plugs(socket, catalog)
        .into_iter()
        .filter_map(|h| catalog.item(h))
        .map(|d| d.item_type_display_name.trim())
        .find(|n| !n.is_empty())
}

/// Plugs a socket can hold, in catalog order: randomized pool, reusable
/// pool, the fixed plug, then any inline pool.
pub fn candidate_plugs(socket: &SocketEntry, catalog: &Catalog) -> Vec<ItemHash> {
    let mut plugs = Vec::new();
    for set_hash in [socket.randomized_plug_set_hash, socket.reusable_plug_set_hash]
        .into_iter()
        .flatten()
    {
        if let Some(set) = catalog.get_plug_set(i64::from(set_hash)) {
            plugs.extend(set.plug_hashes());
        }
    }
    plugs.extend(socket.single_initial_item_hash);
    plugs.extend(socket.reusable_plug_items.iter().map(|p| p.plug_item_hash));
    plugs
}
