pub mod hosts;
pub mod listings;
pub mod parsing;

pub use hosts::HostsNormalizer;
pub use listings::{ListingsNormalizer, MinimumNightsPolicy};

use crate::domain::{Host, Listing, RawHost, RawListing};
use crate::error::{PipelineError, Result};

/// Trait for turning a bronze table into its silver counterpart.
///
/// A normalizer is all-or-nothing: the first malformed row aborts the whole
/// table and no partial output is returned.
pub trait Normalizer {
    type Raw;
    type Output;

    /// Name of the table being read, used in error context
    fn source_table(&self) -> &str;

    fn normalize(&self, rows: Vec<Self::Raw>) -> Result<Vec<Self::Output>>;
}

/// Build a parse error for a data row (1-based, header excluded)
pub(crate) fn parse_error(table: &str, index: usize, field: &str, value: &str, reason: String) -> PipelineError {
    PipelineError::Parse {
        table: table.to_string(),
        row: index + 1,
        field: field.to_string(),
        value: value.to_string(),
        reason,
    }
}

/// Cleanse raw hosts read from the default bronze table
pub fn normalize_hosts(rows: Vec<RawHost>) -> Result<Vec<Host>> {
    HostsNormalizer::default().normalize(rows)
}

/// Cleanse raw listings read from the default bronze table
pub fn normalize_listings(rows: Vec<RawListing>, policy: MinimumNightsPolicy) -> Result<Vec<Listing>> {
    ListingsNormalizer::new(crate::constants::LISTINGS_BRONZE, policy).normalize(rows)
}
