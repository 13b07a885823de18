use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::parsing::{non_blank, parse_flexible_timestamp, parse_price, truncate_to_hour};
use super::{parse_error, Normalizer};
use crate::constants::LISTINGS_BRONZE;
use crate::domain::{Listing, RawListing};
use crate::error::Result;
use crate::observability::metrics;

/// How raw `minimum_nights` values below one are corrected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinimumNightsPolicy {
    /// Only an exact `0` becomes `1`; negative values pass through untouched
    #[default]
    ExactZero,
    /// Every value below `1` becomes `1`
    ClampBelowOne,
}

impl MinimumNightsPolicy {
    pub fn apply(self, nights: i64) -> i64 {
        match self {
            MinimumNightsPolicy::ExactZero if nights == 0 => 1,
            MinimumNightsPolicy::ClampBelowOne if nights < 1 => 1,
            _ => nights,
        }
    }
}

/// Cleanses raw listings into the silver listings table and derives the
/// hourly partition key
pub struct ListingsNormalizer {
    source_table: String,
    policy: MinimumNightsPolicy,
}

impl ListingsNormalizer {
    pub fn new(source_table: impl Into<String>, policy: MinimumNightsPolicy) -> Self {
        Self {
            source_table: source_table.into(),
            policy,
        }
    }

    fn parse_timestamp(&self, index: usize, field: &str, value: Option<&str>) -> Result<Option<NaiveDateTime>> {
        match non_blank(value) {
            None => Ok(None),
            Some(text) => parse_flexible_timestamp(text)
                .map(Some)
                .map_err(|reason| parse_error(&self.source_table, index, field, text, reason)),
        }
    }

    fn parse_price(&self, index: usize, value: Option<&str>) -> Result<Option<f64>> {
        match non_blank(value) {
            None => Ok(None),
            Some(text) => parse_price(text)
                .map(Some)
                .map_err(|reason| parse_error(&self.source_table, index, "price", text, reason)),
        }
    }
}

impl Default for ListingsNormalizer {
    fn default() -> Self {
        Self::new(LISTINGS_BRONZE, MinimumNightsPolicy::default())
    }
}

impl Normalizer for ListingsNormalizer {
    type Raw = RawListing;
    type Output = Listing;

    fn source_table(&self) -> &str {
        &self.source_table
    }

    fn normalize(&self, rows: Vec<RawListing>) -> Result<Vec<Listing>> {
        let mut listings = Vec::with_capacity(rows.len());
        let mut coerced = 0usize;

        for (index, raw) in rows.into_iter().enumerate() {
            let minimum_nights = self.policy.apply(raw.minimum_nights);
            if minimum_nights != raw.minimum_nights {
                coerced += 1;
                debug!(
                    listing_id = raw.id,
                    from = raw.minimum_nights,
                    to = minimum_nights,
                    "Coerced minimum_nights"
                );
            }

            let price = self.parse_price(index, raw.price.as_deref())?;
            let created_at = self.parse_timestamp(index, "created_at", raw.created_at.as_deref())?;
            let updated_at = self.parse_timestamp(index, "updated_at", raw.updated_at.as_deref())?;

            listings.push(Listing {
                listing_id: raw.id,
                listing_name: raw.name,
                room_type: raw.room_type,
                minimum_nights,
                host_id: raw.host_id,
                price,
                created_at,
                updated_at,
                hour_partition: created_at.map(truncate_to_hour),
            });
        }

        metrics::normalize::minimum_nights_coerced(coerced);
        metrics::normalize::rows_normalized(&self.source_table, listings.len());
        Ok(listings)
    }
}
