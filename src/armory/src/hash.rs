//! Catalog hash normalization
//!
//! Catalog hashes are unsigned 32-bit values, but some sources (SQLite
//! manifest exports, older inventory dumps) carry the same bits as a signed
//! 32-bit integer. Lookups try the value as given first and then its
//! alternate representation.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Canonical (unsigned) catalog hash
pub type ItemHash = u32;

const TWO_POW_32: i64 = 1 << 32;

/// The other 32-bit representation of `hash`, if it has one.
///
/// `-1` ↔ `4294967295`. Values inside `0..=i32::MAX` read the same either way
/// and values outside the 32-bit range have no alternate.
pub fn alternate(hash: i64) -> Option<i64> {
    if (i64::from(i32::MIN)..0).contains(&hash) {
        Some(hash + TWO_POW_32)
    } else if hash > i64::from(i32::MAX) && hash <= i64::from(u32::MAX) {
        Some(hash - TWO_POW_32)
    } else {
        None
    }
}

/// Normalize either representation to the canonical unsigned hash
pub fn to_unsigned(hash: i64) -> Option<ItemHash> {
    if (0..=i64::from(u32::MAX)).contains(&hash) {
        Some(hash as u32)
    } else if (i64::from(i32::MIN)..0).contains(&hash) {
        Some(hash as i32 as u32)
    } else {
        None
    }
}

/// Look up `hash` in `table`, retrying once with the alternate representation.
pub fn resolve<V>(table: &HashMap<i64, V>, hash: i64) -> Option<&V> {
    table
        .get(&hash)
        .or_else(|| alternate(hash).and_then(|alt| table.get(&alt)))
}

/// Parse a table key (`"3260753130"` or `"-1034214166"`)
pub fn parse_key(key: &str) -> Option<i64> {
    key.trim().parse::<i64>().ok()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireHash {
    Number(i64),
    Text(String),
}

impl WireHash {
    fn normalize(self) -> Option<ItemHash> {
        match self {
            WireHash::Number(n) => to_unsigned(n),
            WireHash::Text(s) => parse_key(&s).and_then(to_unsigned),
        }
    }
}

/// Serde helper: accept a hash as a number or numeric string, in either
/// signed or unsigned form.
pub fn deserialize_hash<'de, D>(deserializer: D) -> Result<ItemHash, D::Error>
where
    D: Deserializer<'de>,
{
    WireHash::deserialize(deserializer)?
        .normalize()
        .ok_or_else(|| serde::de::Error::custom("hash outside the 32-bit range"))
}

/// Serde helper for optional hashes. Zero is treated as absent.
pub fn deserialize_opt_hash<'de, D>(deserializer: D) -> Result<Option<ItemHash>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<WireHash> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(WireHash::normalize).filter(|h| *h != 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternate_representations() {
        assert_eq!(alternate(-1), Some(4_294_967_295));
        assert_eq!(alternate(4_294_967_295), Some(-1));
        assert_eq!(alternate(-1_034_214_166), Some(3_260_753_130));
        assert_eq!(alternate(3_260_753_130), Some(-1_034_214_166));
        // Same bits either way
        assert_eq!(alternate(1234), None);
        assert_eq!(alternate(0), None);
        // Not a 32-bit value
        assert_eq!(alternate(1 << 40), None);
    }

    #[test]
    fn test_to_unsigned() {
        assert_eq!(to_unsigned(-1_034_214_166), Some(3_260_753_130));
        assert_eq!(to_unsigned(3_260_753_130), Some(3_260_753_130));
        assert_eq!(to_unsigned(i64::from(i32::MIN) - 1), None);
    }

    #[test]
    fn test_resolve_retries_once() {
        let mut table = HashMap::new();
        table.insert(3_260_753_130_i64, "unsigned");
        table.insert(-5_i64, "signed");

        assert_eq!(resolve(&table, 3_260_753_130), Some(&"unsigned"));
        assert_eq!(resolve(&table, -1_034_214_166), Some(&"unsigned"));
        assert_eq!(resolve(&table, 4_294_967_291), Some(&"signed"));
        assert_eq!(resolve(&table, 77), None);
    }

    #[test]
    fn test_deserialize_hash_forms() {
        #[derive(Deserialize)]
        struct Probe {
            #[serde(deserialize_with = "deserialize_hash")]
            hash: ItemHash,
            #[serde(default, deserialize_with = "deserialize_opt_hash")]
            other: Option<ItemHash>,
        }

        let p: Probe = serde_json::from_str(r#"{"hash": -1034214166, "other": "12"}"#).unwrap();
        assert_eq!(p.hash, 3_260_753_130);
        assert_eq!(p.other, Some(12));

        let p: Probe = serde_json::from_str(r#"{"hash": "3260753130", "other": 0}"#).unwrap();
        assert_eq!(p.hash, 3_260_753_130);
        assert_eq!(p.other, None);

        assert!(serde_json::from_str::<Probe>(r#"{"hash": 99999999999}"#).is_err());
    }
}
