//! Catalog and inventory fixtures shared by unit tests

use serde_json::{json, Value};

use crate::inventory::{InstanceId, InstanceParser, RawItemRecord, WeaponInstance};
use crate::manifest::{Catalog, ItemDefinition, PlugSet, SocketTypeDefinition};

pub const FATEBRINGER: u32 = 1000;
pub const FATEBRINGER_HOLO: u32 = 1001;
pub const PALINDROME: u32 = 2000;
/// Fatebringer variant with a memento socket ahead of its perk sockets
pub const FATEBRINGER_MEMENTO: u32 = 1002;

pub const SOCKET_INTRINSIC: usize = 0;
pub const SOCKET_BARREL: usize = 1;
pub const SOCKET_MAGAZINE: usize = 2;
pub const SOCKET_LEFT: usize = 3;
pub const SOCKET_RIGHT: usize = 4;
pub const SOCKET_SHADER: usize = 5;
pub const SOCKET_MASTERWORK: usize = 6;

pub fn def(value: Value) -> ItemDefinition {
    serde_json::from_value(value).unwrap()
}

fn plug(hash: u32, name: &str, type_name: &str) -> ItemDefinition {
    def(json!({
        "hash": hash,
        "displayProperties": { "name": name, "description": format!("{name} description") },
        "itemType": 19,
        "itemTypeDisplayName": type_name,
    }))
}

fn masterwork(hash: u32, name: &str) -> ItemDefinition {
    def(json!({
        "hash": hash,
        "displayProperties": { "name": name },
        "itemType": 19,
        "itemTypeDisplayName": "Masterwork",
        "plug": { "plugCategoryIdentifier": "v400.plugs.weapons.masterworks.stat.range" },
    }))
}

fn set(hash: u32, plugs: &[(u32, bool)]) -> PlugSet {
    serde_json::from_value(json!({
        "hash": hash,
        "reusablePlugItems": plugs
            .iter()
            .map(|(p, roll)| json!({ "plugItemHash": p, "currentlyCanRoll": roll }))
            .collect::<Vec<_>>(),
    }))
    .unwrap()
}

fn weapon(hash: u32, name: &str, holofoil: bool) -> ItemDefinition {
    weapon_with_sockets(hash, name, holofoil, perk_sockets())
}

fn perk_sockets() -> Vec<Value> {
    vec![
        json!({ "singleInitialItemHash": 50 }),
        json!({ "randomizedPlugSetHash": 900 }),
        json!({ "randomizedPlugSetHash": 901 }),
        json!({ "randomizedPlugSetHash": 902 }),
        json!({ "randomizedPlugSetHash": 903 }),
        json!({ "singleInitialItemHash": 600 }),
        json!({ "socketTypeHash": 700, "reusablePlugSetHash": 904 }),
    ]
}

fn weapon_with_sockets(hash: u32, name: &str, holofoil: bool, sockets: Vec<Value>) -> ItemDefinition {
    def(json!({
        "hash": hash,
        "displayProperties": { "name": name },
        "itemType": 3,
        "itemTypeDisplayName": "Hand Cannon",
        "inventory": { "tierType": 5, "bucketTypeHash": 1498876634u32 },
        "seasonHash": 7,
        "isHolofoil": holofoil,
        "sockets": { "socketEntries": sockets },
    }))
}

/// Fatebringer (normal + holofoil) and Palindrome, sharing one perk layout:
///
/// - intrinsic 50
/// - barrels 101-104
/// - magazines 201-202 (205 only ever seen on owned copies)
/// - left trait Outlaw 301 / Enhanced Outlaw 302, Rampage 303 (retired)
/// - right trait Kill Clip 401, Firefly 402
/// - shader 600
/// - masterworks 801, plus placeholders 802 and 803
pub fn catalog() -> Catalog {
    catalog_with(Vec::new())
}

/// [`catalog`] plus [`FATEBRINGER_MEMENTO`], whose perk sockets sit one
/// index later than the other Fatebringers'
pub fn catalog_with_memento_variant() -> Catalog {
    let mut sockets = perk_sockets();
    sockets.insert(0, json!({ "singleInitialItemHash": 600 }));
    catalog_with(vec![weapon_with_sockets(
        FATEBRINGER_MEMENTO,
        "Fatebringer",
        false,
        sockets,
    )])
}

fn catalog_with(extra: Vec<ItemDefinition>) -> Catalog {
    let mut items = vec![
        weapon(FATEBRINGER, "Fatebringer", false),
        weapon(FATEBRINGER_HOLO, "Fatebringer", true),
        weapon(PALINDROME, "Palindrome", false),
        plug(50, "Adaptive Frame", "Intrinsic"),
        plug(101, "Arrowhead Brake", "Barrel"),
        plug(102, "Smallbore", "Barrel"),
        plug(103, "Hammer-Forged Rifling", "Barrel"),
        plug(104, "Corkscrew Rifling", "Barrel"),
        plug(201, "Tactical Mag", "Magazine"),
        plug(202, "Accurized Rounds", "Magazine"),
        plug(205, "Steady Rounds", "Magazine"),
        plug(301, "Outlaw", "Trait"),
        plug(302, "Enhanced Outlaw", "Enhanced Trait"),
        plug(303, "Rampage", "Trait"),
        plug(401, "Kill Clip", "Trait"),
        plug(402, "Firefly", "Trait"),
        plug(600, "Default Shader", "Shader"),
        masterwork(801, "Masterworked: Range"),
        masterwork(802, "Tier 1 Weapon"),
        masterwork(803, "Random Masterwork"),
    ];
    items.extend(extra);
    let plug_sets = vec![
        set(900, &[(101, true), (102, true), (103, true), (104, true)]),
        set(901, &[(201, true), (202, true)]),
        set(902, &[(301, true), (302, true), (303, false)]),
        set(903, &[(401, true), (402, true)]),
        set(904, &[(801, true), (802, true), (803, true)]),
    ];
    let socket_types: Vec<SocketTypeDefinition> = vec![serde_json::from_value(json!({
        "hash": 700,
        "plugWhitelist": [ { "categoryIdentifier": "v400.plugs.weapons.masterworks.stat" } ],
    }))
    .unwrap()];
    Catalog::from_definitions(items, plug_sets, socket_types)
}

/// One owned copy: `sockets` is `(socket index, active plug, rolled plugs)`
pub fn instance(
    catalog: &Catalog,
    id: u64,
    weapon_hash: u32,
    sockets: &[(usize, Option<u32>, &[u32])],
) -> WeaponInstance {
    let layout_len = catalog.item(weapon_hash).unwrap().socket_entries().len();
    let mut raw_sockets = vec![json!({}); layout_len];
    let mut reusable = serde_json::Map::new();
    for (index, active, rolled) in sockets {
        raw_sockets[*index] = json!({ "plugHash": active });
        reusable.insert(
            index.to_string(),
            Value::Array(rolled.iter().map(|p| json!({ "plugItemHash": p })).collect()),
        );
    }
    let record: RawItemRecord = serde_json::from_value(json!({
        "itemInstanceId": id.to_string(),
        "itemHash": weapon_hash,
        "sockets": raw_sockets,
        "reusablePlugs": reusable,
    }))
    .unwrap();
    let parsed = InstanceParser::new(catalog).parse(&record).unwrap();
    assert_eq!(parsed.instance_id, InstanceId(id));
    parsed
}

/// Copy A: barrel 101 (also rolled 102), Enhanced Outlaw, no masterwork.
/// Copy B (holofoil): barrel 103, retired magazine 205, range masterwork.
pub fn owned(catalog: &Catalog) -> Vec<WeaponInstance> {
    vec![
        instance(
            catalog,
            1,
            FATEBRINGER,
            &[
                (SOCKET_BARREL, Some(101), &[101, 102]),
                (SOCKET_LEFT, Some(302), &[302]),
                (SOCKET_RIGHT, Some(401), &[]),
            ],
        ),
        instance(
            catalog,
            2,
            FATEBRINGER_HOLO,
            &[
                (SOCKET_BARREL, Some(103), &[103]),
                (SOCKET_MAGAZINE, Some(205), &[]),
                (SOCKET_LEFT, Some(301), &[]),
                (SOCKET_MASTERWORK, Some(801), &[]),
            ],
        ),
    ]
}
