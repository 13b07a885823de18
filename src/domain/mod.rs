//! Row shapes for every layer of the pipeline.
//!
//! Field order is column order: the CSV codec writes columns in the order the
//! fields are declared here.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Fixed column set of a table, in field declaration order.
///
/// Written as the header even when the table has no rows.
pub trait TableColumns {
    const COLUMNS: &'static [&'static str];
}

/// A host as exported by the upstream system (bronze)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHost {
    pub id: i64,
    pub name: Option<String>,
    pub is_superhost: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl TableColumns for RawHost {
    const COLUMNS: &'static [&'static str] = &["id", "name", "is_superhost", "created_at", "updated_at"];
}

/// A cleansed host (silver)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub host_id: i64,
    pub host_name: String,
    pub is_superhost: String,
    #[serde(with = "timestamp_format")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(with = "timestamp_format")]
    pub updated_at: Option<NaiveDateTime>,
}

impl TableColumns for Host {
    const COLUMNS: &'static [&'static str] = &["host_id", "host_name", "is_superhost", "created_at", "updated_at"];
}

/// A listing as exported by the upstream system (bronze)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub id: i64,
    pub name: Option<String>,
    pub room_type: String,
    pub minimum_nights: i64,
    pub host_id: Option<i64>,
    pub price: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl TableColumns for RawListing {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "room_type",
        "minimum_nights",
        "host_id",
        "price",
        "created_at",
        "updated_at",
    ];
}

/// A cleansed listing with its hourly partition key (silver)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub listing_id: i64,
    pub listing_name: Option<String>,
    pub room_type: String,
    pub minimum_nights: i64,
    pub host_id: Option<i64>,
    pub price: Option<f64>,
    #[serde(with = "timestamp_format")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(with = "timestamp_format")]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(with = "timestamp_format")]
    pub hour_partition: Option<NaiveDateTime>,
}

impl TableColumns for Listing {
    const COLUMNS: &'static [&'static str] = &[
        "listing_id",
        "listing_name",
        "room_type",
        "minimum_nights",
        "host_id",
        "price",
        "created_at",
        "updated_at",
        "hour_partition",
    ];
}

/// A listing denormalized with its host (gold)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingWithHost {
    pub listing_id: i64,
    pub listing_name: Option<String>,
    pub room_type: String,
    pub minimum_nights: i64,
    pub price: Option<f64>,
    pub host_id: Option<i64>,
    pub host_name: Option<String>,
    pub is_superhost: Option<String>,
    #[serde(with = "timestamp_format")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(with = "timestamp_format")]
    pub updated_at: Option<NaiveDateTime>,
}

impl TableColumns for ListingWithHost {
    const COLUMNS: &'static [&'static str] = &[
        "listing_id",
        "listing_name",
        "room_type",
        "minimum_nights",
        "price",
        "host_id",
        "host_name",
        "is_superhost",
        "created_at",
        "updated_at",
    ];
}

/// Serde adapter for nullable naive timestamps in materialized tables.
///
/// Writes `%Y-%m-%d %H:%M:%S`, plus a fraction when the value has one. Reads
/// anything the flexible parser accepts, so a value carrying a UTC offset
/// comes back as its wall-clock time with the offset dropped.
pub mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::constants::OUTPUT_TIMESTAMP_FORMAT;
    use crate::pipeline::processing::normalize::parsing::parse_flexible_timestamp;

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format(OUTPUT_TIMESTAMP_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse_flexible_timestamp(text).map(Some).map_err(de::Error::custom),
        }
    }
}
