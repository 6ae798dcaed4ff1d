//! The item record model.
//!
//! Field names serialize to the PascalCase keys of the database schema
//! (`AegisName`, `SubType`, `Right_Hand`, ...). Unset optional fields,
//! empty strings, and all-false flag groups are omitted on save, so a
//! written file carries only what the record actually sets.

use serde::Serialize;

/// One item definition from a database body.
///
/// A record is only considered loaded if [`Item::is_valid`] holds;
/// the loader drops anything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    pub id: i64,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub aegis_name: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Item type ("Weapon", "Armor", "Etc", ...).
    #[serde(rename = "Type", skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub sub_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub magic_attack: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slots: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub weapon_level: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub equip_level_min: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refineable: Option<bool>,

    /// Job classes allowed to use the item.
    #[serde(skip_serializing_if = "JobFlags::is_empty")]
    pub jobs: JobFlags,

    /// Equip slots the item occupies.
    #[serde(skip_serializing_if = "LocationFlags::is_empty")]
    pub locations: LocationFlags,

    /// Trade channel restrictions.
    #[serde(skip_serializing_if = "TradeFlags::is_empty")]
    pub trade: TradeFlags,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub script: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub equip_script: String,

    #[serde(rename = "UnEquipScript", skip_serializing_if = "String::is_empty")]
    pub unequip_script: String,
}

impl Item {
    /// A record is valid iff its identifier is a positive integer.
    pub fn is_valid(&self) -> bool {
        self.id > 0
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Named job eligibility flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobFlags {
    #[serde(skip_serializing_if = "is_false")]
    pub alchemist: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub archer: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub assassin: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub swordman: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub mage: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub merchant: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub acolyte: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub thief: bool,
}

impl JobFlags {
    pub fn is_empty(&self) -> bool {
        *self == JobFlags::default()
    }
}

/// Named equip-slot flags.
///
/// The schema keeps the underscore spelling for compound slots
/// (`Right_Hand`, `Both_Hand`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocationFlags {
    #[serde(rename = "Right_Hand", skip_serializing_if = "is_false")]
    pub right_hand: bool,
    #[serde(rename = "Both_Hand", skip_serializing_if = "is_false")]
    pub both_hand: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub head: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub body: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub garment: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub shoes: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub accessory: bool,
}

impl LocationFlags {
    pub fn is_empty(&self) -> bool {
        *self == LocationFlags::default()
    }
}

/// Named trade restrictions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TradeFlags {
    #[serde(skip_serializing_if = "is_false")]
    pub no_drop: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub no_trade: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub no_sell: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub no_storage: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub no_vend: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub no_trade_room: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub no_cart: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub no_guild_storage: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub no_mail: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub no_auction: bool,
}

impl TradeFlags {
    pub fn is_empty(&self) -> bool {
        *self == TradeFlags::default()
    }
}
