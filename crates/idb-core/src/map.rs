//! Generic node to typed record mapping.
//!
//! Keys are matched case-insensitively through a static lookup table;
//! there is no reflection and no schema registry. Coercion never fails
//! a record: a field that doesn't parse is simply left at its default,
//! and unknown keys are reported as diagnostics and skipped. This is
//! deliberate forward-compatibility with schema additions.

use idb_common::{Diagnostic, Item, JobFlags, LocationFlags, TradeFlags};
use serde_yaml::{Mapping, Value};
use tracing::debug;

/// Convert one generic mapping node into an [`Item`].
///
/// Pure and total. Callers are expected to drop the result when
/// [`Item::is_valid`] does not hold.
pub fn map_record(node: &Value, diags: &mut Vec<Diagnostic>) -> Item {
    let mut item = Item::default();
    let Value::Mapping(map) = node else {
        return item;
    };

    for (key, value) in map {
        let Some(key) = scalar_text(key) else {
            continue;
        };
        apply_field(&mut item, &key.to_ascii_lowercase(), value, diags);
    }

    item
}

/// The field-name-to-setter table.
fn apply_field(item: &mut Item, key: &str, value: &Value, diags: &mut Vec<Diagnostic>) {
    match key {
        "id" => {
            if let Some(id) = parse_int(value) {
                item.id = id;
            }
        }
        "aegisname" => item.aegis_name = scalar_text(value).unwrap_or_default(),
        "name" => item.name = scalar_text(value).unwrap_or_default(),
        "type" => item.kind = scalar_text(value).unwrap_or_default(),
        "subtype" => item.sub_type = scalar_text(value).unwrap_or_default(),

        "buy" => item.buy = parse_int(value),
        "sell" => item.sell = parse_int(value),
        "weight" => item.weight = parse_int(value),
        "attack" => item.attack = parse_int(value),
        "magicattack" => item.magic_attack = parse_int(value),
        "range" => item.range = parse_int(value),
        "slots" => item.slots = parse_int(value),
        "weaponlevel" => item.weapon_level = parse_int(value),
        "equiplevelmin" => item.equip_level_min = parse_int(value),
        "refineable" => item.refineable = parse_bool(value),

        "jobs" => {
            if let Value::Mapping(map) = value {
                item.jobs = map_job_flags(map);
            }
        }
        "locations" => {
            if let Value::Mapping(map) = value {
                item.locations = map_location_flags(map);
            }
        }
        "trade" => {
            if let Value::Mapping(map) = value {
                item.trade = map_trade_flags(map);
            }
        }

        "script" => item.script = scalar_text(value).unwrap_or_default(),
        "equipscript" => item.equip_script = scalar_text(value).unwrap_or_default(),
        "unequipscript" => item.unequip_script = scalar_text(value).unwrap_or_default(),

        _ => {
            debug!(key, "unknown record key ignored");
            diags.push(Diagnostic::info(format!("unknown record key `{key}`")));
        }
    }
}

fn map_job_flags(map: &Mapping) -> JobFlags {
    let mut jobs = JobFlags::default();
    for (key, value) in map {
        let (Some(key), Some(flag)) = (scalar_text(key), parse_bool(value)) else {
            continue;
        };
        match key.to_ascii_lowercase().as_str() {
            "alchemist" => jobs.alchemist = flag,
            "archer" => jobs.archer = flag,
            "assassin" => jobs.assassin = flag,
            "swordman" => jobs.swordman = flag,
            "mage" => jobs.mage = flag,
            "merchant" => jobs.merchant = flag,
            "acolyte" => jobs.acolyte = flag,
            "thief" => jobs.thief = flag,
            _ => {}
        }
    }
    jobs
}

fn map_location_flags(map: &Mapping) -> LocationFlags {
    let mut locations = LocationFlags::default();
    for (key, value) in map {
        let (Some(key), Some(flag)) = (scalar_text(key), parse_bool(value)) else {
            continue;
        };
        match key.to_ascii_lowercase().as_str() {
            "right_hand" => locations.right_hand = flag,
            "both_hand" => locations.both_hand = flag,
            "head" => locations.head = flag,
            "body" => locations.body = flag,
            "garment" => locations.garment = flag,
            "shoes" => locations.shoes = flag,
            "accessory" => locations.accessory = flag,
            _ => {}
        }
    }
    locations
}

fn map_trade_flags(map: &Mapping) -> TradeFlags {
    let mut trade = TradeFlags::default();
    for (key, value) in map {
        let (Some(key), Some(flag)) = (scalar_text(key), parse_bool(value)) else {
            continue;
        };
        match key.to_ascii_lowercase().as_str() {
            "nodrop" => trade.no_drop = flag,
            "notrade" => trade.no_trade = flag,
            "nosell" => trade.no_sell = flag,
            "nostorage" => trade.no_storage = flag,
            "novend" => trade.no_vend = flag,
            "notraderoom" => trade.no_trade_room = flag,
            "nocart" => trade.no_cart = flag,
            "noguildstorage" => trade.no_guild_storage = flag,
            "nomail" => trade.no_mail = flag,
            "noauction" => trade.no_auction = flag,
            _ => {}
        }
    }
    trade
}

/// Scalar node text, if the node is a scalar.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Strict integer parse: native integer or integral text only.
fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Boolean coercion: native bool, or the text forms "true"/"1" and
/// "false"/"0" (case-insensitive).
fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    }
}
