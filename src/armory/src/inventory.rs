//! Owned weapon instances
//!
//! Turns raw per-item ownership records from the inventory provider into
//! [`WeaponInstance`]s aligned to the catalog's socket layout. Bad data is
//! dropped at the smallest granularity possible: a bad plug hash drops that
//! plug, an unusable socket drops that socket, and only an unresolvable
//! weapon drops the whole record.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::config::EngineConfig;
use crate::hash::ItemHash;
use crate::manifest::{Catalog, ItemDefinition};
use crate::reference::{TIER_EXOTIC, TIER_LEGENDARY};

// ============================================================================
// Instance ids
// ============================================================================

/// Item instance id. Ordered numerically; serialized as a string since the
/// values exceed what JSON consumers can hold as numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InstanceId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(InstanceId)
    }
}

impl Serialize for InstanceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InstanceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Number(u64),
            Text(String),
        }
        match Wire::deserialize(deserializer)? {
            Wire::Number(n) => Ok(InstanceId(n)),
            Wire::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

// ============================================================================
// Parsed model
// ============================================================================

/// What one socket of one owned copy holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocketState {
    pub socket_index: usize,
    pub active_plug_hash: Option<ItemHash>,
    /// Everything this copy has rolled in this socket
    pub reusable_plug_hashes: Vec<ItemHash>,
}

impl SocketState {
    /// Active plug followed by the rolled options, without repeats
    pub fn rolled(&self) -> impl Iterator<Item = ItemHash> + '_ {
        let active = self.active_plug_hash;
        active.into_iter().chain(
            self.reusable_plug_hashes
                .iter()
                .copied()
                .filter(move |h| Some(*h) != active),
        )
    }

    pub fn has_rolled(&self, plug: ItemHash) -> bool {
        self.active_plug_hash == Some(plug) || self.reusable_plug_hashes.contains(&plug)
    }
}

/// One owned copy of a weapon
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeaponInstance {
    pub instance_id: InstanceId,
    pub weapon_hash: ItemHash,
    /// Ordered by socket index; unusable sockets are absent
    pub sockets: Vec<SocketState>,
    /// 1-5 under the current quality system, `None` when the copy predates it
    pub gear_tier: Option<u8>,
    pub is_holofoil: bool,
}

impl WeaponInstance {
    pub fn socket(&self, socket_index: usize) -> Option<&SocketState> {
        self.sockets
            .binary_search_by_key(&socket_index, |s| s.socket_index)
            .ok()
            .map(|i| &self.sockets[i])
    }

    pub fn active_plug(&self, socket_index: usize) -> Option<ItemHash> {
        self.socket(socket_index).and_then(|s| s.active_plug_hash)
    }

    /// Whether any socket has ever rolled `plug`
    pub fn has_rolled_anywhere(&self, plug: ItemHash) -> bool {
        self.sockets.iter().any(|s| s.has_rolled(plug))
    }
}

// ============================================================================
// Raw records
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSocket {
    #[serde(default)]
    pub plug_hash: Option<i64>,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReusablePlug {
    pub plug_item_hash: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuality {
    #[serde(default)]
    pub gear_tier: Option<i64>,
}

/// Ownership record as delivered by the inventory provider
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItemRecord {
    /// `None` when missing or unparsable; such records are rejected
    #[serde(default, deserialize_with = "deserialize_lenient_id")]
    pub item_instance_id: Option<InstanceId>,
    pub item_hash: i64,
    #[serde(default)]
    pub sockets: Vec<RawSocket>,
    /// Socket index (as a string key) → every plug rolled there
    #[serde(default)]
    pub reusable_plugs: BTreeMap<String, Vec<RawReusablePlug>>,
    #[serde(default)]
    pub quality: Option<RawQuality>,
}

fn default_true() -> bool {
    true
}

/// Accept any JSON for the instance id, keeping it only if it parses
fn deserialize_lenient_id<'de, D>(deserializer: D) -> Result<Option<InstanceId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Id(InstanceId),
        Other(serde::de::IgnoredAny),
    }
    Ok(match Option::<Lenient>::deserialize(deserializer)? {
        Some(Lenient::Id(id)) => Some(id),
        Some(Lenient::Other(_)) | None => None,
    })
}

// ============================================================================
// Parsing
// ============================================================================

/// Which catalog definitions count as weapons worth tracking
pub trait InstancePolicy {
    fn accepts(&self, def: &ItemDefinition) -> bool;
}

impl<F> InstancePolicy for F
where
    F: Fn(&ItemDefinition) -> bool,
{
    fn accepts(&self, def: &ItemDefinition) -> bool {
        self(def)
    }
}

/// Default policy: weapons at or above a rarity tier, exotics optional
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponPolicy {
    pub min_tier: u8,
    pub include_exotics: bool,
}

impl Default for WeaponPolicy {
    fn default() -> Self {
        Self {
            min_tier: TIER_LEGENDARY,
            include_exotics: true,
        }
    }
}

impl InstancePolicy for WeaponPolicy {
    fn accepts(&self, def: &ItemDefinition) -> bool {
        let tier = def.rarity_tier();
        def.is_weapon()
            && tier >= self.min_tier
            && (tier != TIER_EXOTIC || self.include_exotics)
    }
}

/// Counts of what happened to each record during a parse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseReport {
    pub parsed: usize,
    pub filtered: usize,
    pub unknown_weapon: usize,
    pub bad_instance_id: usize,
    pub skipped_sockets: usize,
    pub dropped_plugs: usize,
}

/// Why a record produced no instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Filtered,
    UnknownWeapon,
    BadInstanceId,
}

pub struct InstanceParser<'a, P = WeaponPolicy> {
    catalog: &'a Catalog,
    policy: P,
}

impl<'a> InstanceParser<'a, WeaponPolicy> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            policy: WeaponPolicy::default(),
        }
    }

    pub fn from_config(catalog: &'a Catalog, config: &EngineConfig) -> Self {
        Self {
            catalog,
            policy: config.weapon_policy(),
        }
    }
}

impl<'a, P: InstancePolicy> InstanceParser<'a, P> {
    pub fn with_policy(catalog: &'a Catalog, policy: P) -> Self {
        Self { catalog, policy }
    }

    /// Parse one record, or `None` if it isn't a tracked weapon
    pub fn parse(&self, record: &RawItemRecord) -> Option<WeaponInstance> {
        self.parse_counted(record, &mut ParseReport::default()).ok()
    }

    /// Parse every record, keeping what can be kept
    pub fn parse_all(&self, records: &[RawItemRecord]) -> (Vec<WeaponInstance>, ParseReport) {
        let mut report = ParseReport::default();
        let mut instances = Vec::new();
        for record in records {
            match self.parse_counted(record, &mut report) {
                Ok(instance) => {
                    report.parsed += 1;
                    instances.push(instance);
                }
                Err(Rejection::Filtered) => report.filtered += 1,
                Err(Rejection::UnknownWeapon) => report.unknown_weapon += 1,
                Err(Rejection::BadInstanceId) => report.bad_instance_id += 1,
            }
        }
        instances.sort_by_key(|i| i.instance_id);

        if report.unknown_weapon > 0 || report.bad_instance_id > 0 {
            tracing::warn!(
                unknown_weapon = report.unknown_weapon,
                bad_instance_id = report.bad_instance_id,
                "some inventory records were dropped"
            );
        }
        tracing::debug!(?report, "inventory parsed");
        (instances, report)
    }

    fn parse_counted(
        &self,
        record: &RawItemRecord,
        report: &mut ParseReport,
    ) -> Result<WeaponInstance, Rejection> {
        let def = self
            .catalog
            .get_definition(record.item_hash)
            .ok_or(Rejection::UnknownWeapon)?;
        if !self.policy.accepts(def) {
            return Err(Rejection::Filtered);
        }
        let instance_id = record.item_instance_id.ok_or(Rejection::BadInstanceId)?;

        let layout_len = def.socket_entries().len();
        let mut sockets = Vec::new();
        for socket_index in 0..layout_len {
            match self.socket_state(record, socket_index, report) {
                Some(state) => sockets.push(state),
                None => {
                    tracing::trace!(%instance_id, socket_index, "socket has no resolvable plugs");
                }
            }
        }

        let out_of_layout = record.sockets.len().saturating_sub(layout_len)
            + record
                .reusable_plugs
                .keys()
                .filter(|k| k.parse::<usize>().map_or(true, |i| i >= layout_len))
                .count();
        report.skipped_sockets += out_of_layout;

        let gear_tier = record
            .quality
            .as_ref()
            .and_then(|q| q.gear_tier)
            .filter(|t| (1..=5).contains(t))
            .map(|t| t as u8);

        Ok(WeaponInstance {
            instance_id,
            weapon_hash: def.hash,
            sockets,
            gear_tier,
            is_holofoil: def.is_holofoil,
        })
    }

    fn socket_state(
        &self,
        record: &RawItemRecord,
        socket_index: usize,
        report: &mut ParseReport,
    ) -> Option<SocketState> {
        let active_plug_hash = record
            .sockets
            .get(socket_index)
            .filter(|s| s.is_enabled)
            .and_then(|s| s.plug_hash)
            .filter(|h| *h != 0)
            .and_then(|h| self.resolve_plug(h, report));

        let mut reusable_plug_hashes: Vec<ItemHash> = Vec::new();
        if let Some(plugs) = record.reusable_plugs.get(&socket_index.to_string()) {
            for plug in plugs {
                if let Some(hash) = self.resolve_plug(plug.plug_item_hash, report) {
                    if !reusable_plug_hashes.contains(&hash) {
                        reusable_plug_hashes.push(hash);
                    }
                }
            }
        }

        if active_plug_hash.is_none() && reusable_plug_hashes.is_empty() {
            report.skipped_sockets += 1;
            return None;
        }
        Some(SocketState {
            socket_index,
            active_plug_hash,
            reusable_plug_hashes,
        })
    }

    fn resolve_plug(&self, raw: i64, report: &mut ParseReport) -> Option<ItemHash> {
        let hash = self.catalog.get_definition(raw).map(|d| d.hash);
        if hash.is_none() {
            report.dropped_plugs += 1;
        }
        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Catalog {
        let items = json!({
            "1000": {
                "hash": 1000,
                "displayProperties": { "name": "Fatebringer" },
                "itemType": 3,
                "inventory": { "tierType": 5 },
                "sockets": { "socketEntries": [ {}, {}, {} ] }
            },
            "1001": {
                "hash": 1001,
                "displayProperties": { "name": "Fatebringer" },
                "itemType": 3,
                "isHolofoil": true,
                "inventory": { "tierType": 5 },
                "sockets": { "socketEntries": [ {}, {}, {} ] }
            },
            "2000": {
                "hash": 2000,
                "displayProperties": { "name": "Jade Rabbit" },
                "itemType": 3,
                "inventory": { "tierType": 6 }
            },
            "3000": {
                "hash": 3000,
                "displayProperties": { "name": "Blue Rifle" },
                "itemType": 3,
                "inventory": { "tierType": 4 }
            },
            "3260753130": { "hash": 3260753130u32, "displayProperties": { "name": "Arrowhead Brake" } },
            "102": { "hash": 102, "displayProperties": { "name": "Smallbore" } },
            "201": { "hash": 201, "displayProperties": { "name": "Tactical Mag" } }
        });
        Catalog::from_json_tables(&items.to_string(), "{}", None).unwrap()
    }

    fn record(value: serde_json::Value) -> RawItemRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_instance_id_numeric_order() {
        let small: InstanceId = "9".parse().unwrap();
        let large: InstanceId = "6917529123456789012".parse().unwrap();
        assert!(small < large);
        assert!("10".parse::<InstanceId>().unwrap() > small);
        assert_eq!(serde_json::to_string(&large).unwrap(), "\"6917529123456789012\"");
        let parsed: InstanceId = serde_json::from_str("6917529123456789012").unwrap();
        assert_eq!(parsed, large);
    }

    #[test]
    fn test_parse_aligns_sockets_and_normalizes_hashes() {
        let catalog = catalog();
        let parser = InstanceParser::new(&catalog);
        let instance = parser
            .parse(&record(json!({
                "itemInstanceId": "6917529000000000001",
                "itemHash": 1000,
                "sockets": [ { "plugHash": -1034214166 }, { "plugHash": 201 }, { "plugHash": 0 } ],
                "reusablePlugs": { "0": [ { "plugItemHash": 3260753130u32 }, { "plugItemHash": 102 } ] },
                "quality": { "gearTier": 4 }
            })))
            .unwrap();

        assert_eq!(instance.instance_id, InstanceId(6_917_529_000_000_000_001));
        assert_eq!(instance.sockets.len(), 2);
        let barrel = instance.socket(0).unwrap();
        assert_eq!(barrel.active_plug_hash, Some(3_260_753_130));
        assert_eq!(barrel.reusable_plug_hashes, vec![3_260_753_130, 102]);
        assert_eq!(barrel.rolled().collect::<Vec<_>>(), vec![3_260_753_130, 102]);
        assert_eq!(instance.active_plug(1), Some(201));
        assert!(instance.socket(2).is_none());
        assert_eq!(instance.gear_tier, Some(4));
        assert!(!instance.is_holofoil);
    }

    #[test]
    fn test_missing_quality_is_none_not_zero() {
        let catalog = catalog();
        let parser = InstanceParser::new(&catalog);
        let a = parser
            .parse(&record(json!({ "itemInstanceId": "1", "itemHash": 1001 })))
            .unwrap();
        assert_eq!(a.gear_tier, None);
        assert!(a.is_holofoil);
        assert!(a.sockets.is_empty());

        let b = parser
            .parse(&record(json!({ "itemInstanceId": 2, "itemHash": 1000, "quality": { "gearTier": 0 } })))
            .unwrap();
        assert_eq!(b.gear_tier, None);
    }

    #[test]
    fn test_bad_sockets_do_not_drop_instance() {
        let catalog = catalog();
        let parser = InstanceParser::new(&catalog);
        let (instances, report) = parser.parse_all(&[record(json!({
            "itemInstanceId": "5",
            "itemHash": 1000,
            "sockets": [ { "plugHash": 424242 }, { "plugHash": 201, "isEnabled": false }, {}, { "plugHash": 102 } ],
            "reusablePlugs": { "1": [ { "plugItemHash": 201 } ], "9": [ { "plugItemHash": 102 } ], "x": [] }
        }))]);

        assert_eq!(instances.len(), 1);
        let instance = &instances[0];
        assert_eq!(instance.sockets.len(), 1);
        let mag = instance.socket(1).unwrap();
        assert_eq!(mag.active_plug_hash, None);
        assert_eq!(mag.reusable_plug_hashes, vec![201]);
        assert_eq!(report.dropped_plugs, 1);
        // sockets 0 and 2 empty, raw socket 3 and keys "9"/"x" outside the layout
        assert_eq!(report.skipped_sockets, 5);
    }

    #[test]
    fn test_policy_and_rejections() {
        let catalog = catalog();
        let records = vec![
            record(json!({ "itemInstanceId": "3", "itemHash": 2000 })),
            record(json!({ "itemInstanceId": "4", "itemHash": 3000 })),
            record(json!({ "itemInstanceId": "5", "itemHash": 99999 })),
            record(json!({ "itemHash": 1000 })),
            record(json!({ "itemInstanceId": "2", "itemHash": 1000 })),
        ];

        let (instances, report) = InstanceParser::new(&catalog).parse_all(&records);
        assert_eq!(
            instances.iter().map(|i| i.instance_id.0).collect::<Vec<_>>(),
            vec![2, 3]
        );
        assert_eq!(report.filtered, 1);
        assert_eq!(report.unknown_weapon, 1);
        assert_eq!(report.bad_instance_id, 1);

        let no_exotics = WeaponPolicy {
            include_exotics: false,
            ..WeaponPolicy::default()
        };
        let (instances, _) = InstanceParser::with_policy(&catalog, no_exotics).parse_all(&records);
        assert_eq!(instances.len(), 1);

        let anything = |_: &ItemDefinition| true;
        let (instances, _) = InstanceParser::with_policy(&catalog, anything).parse_all(&records);
        assert_eq!(instances.len(), 3);
    }

    #[test]
    fn test_unusable_instance_ids_reject_only_their_record() {
        let catalog = catalog();
        let records = vec![
            record(json!({ "itemInstanceId": "abc", "itemHash": 1000 })),
            record(json!({ "itemInstanceId": -7, "itemHash": 1000 })),
            record(json!({ "itemInstanceId": { "id": 1 }, "itemHash": 1000 })),
            record(json!({ "itemInstanceId": null, "itemHash": 1000 })),
            record(json!({ "itemInstanceId": " 8 ", "itemHash": 1000 })),
        ];
        assert_eq!(records[4].item_instance_id, Some(InstanceId(8)));

        let (instances, report) = InstanceParser::new(&catalog).parse_all(&records);
        assert_eq!(
            instances.iter().map(|i| i.instance_id).collect::<Vec<_>>(),
            vec![InstanceId(8)]
        );
        assert_eq!(report.bad_instance_id, 4);
    }
}
