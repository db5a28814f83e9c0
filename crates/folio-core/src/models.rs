//! Typed views over stored records.
//!
//! Documents are persisted as raw JSON values; these structs are read-side
//! projections used where the server itself reasons about record fields.
//! Loosely typed fields deserialize leniently so a hand-edited data file never
//! breaks a read.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A geotagged photo from `images.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub trip_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image_full: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub sort_index: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Photo {
    /// Non-blank country name.
    pub fn country_name(&self) -> Option<&str> {
        non_blank(self.country.as_deref())
    }

    /// Non-blank trip id.
    pub fn trip(&self) -> Option<&str> {
        non_blank(self.trip_id.as_deref())
    }

    /// Identifier used by the photo reorder endpoint: `imageFull`, else `thumbnail`.
    pub fn slug(&self) -> Option<&str> {
        non_blank(self.image_full.as_deref()).or_else(|| non_blank(self.thumbnail.as_deref()))
    }
}

/// A trip from `trips.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    #[serde(deserialize_with = "lenient_required_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Trip {
    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        non_blank(self.name.as_deref()).unwrap_or(&self.id)
    }
}

/// One `{slug, idx}` entry of a photo reorder request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoOrder {
    pub slug: String,
    pub idx: i64,
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

/// Strings pass through, numbers and booleans are stringified, anything else is `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_required_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_string(deserializer)?.ok_or_else(|| serde::de::Error::custom("expected a string id"))
}

/// Numbers and numeric strings.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Integers, integral floats and integer strings.
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
