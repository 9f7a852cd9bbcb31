use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::Error;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ShipmentManifest {
    #[serde(deserialize_with = "lenient_party")]
    pub sender: PartyInfo,
    #[serde(deserialize_with = "lenient_party")]
    pub receiver: PartyInfo,
    #[serde(deserialize_with = "lenient_items")]
    pub shipping_item_list: Vec<LineItem>,
}

impl ShipmentManifest {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PartyInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(deserialize_with = "lenient_string")]
    pub tel: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LineItem {
    #[serde(deserialize_with = "lenient_string")]
    pub item: String,
    /// Each entry may span several wrapped lines and may contain `\n`.
    #[serde(deserialize_with = "lenient_string_list")]
    pub prod_description: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub qty: String,
    #[serde(deserialize_with = "lenient_string")]
    pub weight: String,
}

/// Text form of a scalar JSON value; `null`, arrays and objects become empty.
fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_text(Value::deserialize(deserializer)?))
}

fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(values) => values.into_iter().map(value_text).collect(),
        Value::Null => Vec::new(),
        scalar => vec![value_text(scalar)],
    })
}

fn lenient_party<'de, D>(deserializer: D) -> Result<PartyInfo, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        party @ Value::Object(_) => PartyInfo::deserialize(party).map_err(serde::de::Error::custom),
        _ => Ok(PartyInfo::default()),
    }
}

fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<LineItem>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(values) => values
            .into_iter()
            .map(|v| match v {
                // A null entry is still a row, just an empty one.
                Value::Null => Ok(LineItem::default()),
                other => LineItem::deserialize(other).map_err(serde::de::Error::custom),
            })
            .collect(),
        _ => Ok(Vec::new()),
    }
}
