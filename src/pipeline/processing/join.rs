//! Listing-host join producing the gold table.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use tracing::{debug, error};

use crate::domain::{Host, Listing, ListingWithHost};
use crate::error::{PipelineError, Result};
use crate::observability::metrics;

/// Fail if any `host_id` occurs more than once.
///
/// A duplicated key would multiply every listing that references it, so this
/// runs before the join. The first duplicate in table order is reported.
pub fn assert_unique_host_ids(hosts: &[Host]) -> Result<()> {
    let mut occurrences: HashMap<i64, usize> = HashMap::with_capacity(hosts.len());
    for host in hosts {
        *occurrences.entry(host.host_id).or_default() += 1;
    }

    if let Some(host) = hosts.iter().find(|h| occurrences[&h.host_id] > 1) {
        let count = occurrences[&host.host_id];
        error!(host_id = host.host_id, occurrences = count, "Duplicate host_id before join");
        metrics::join::fan_out_detected();
        return Err(PipelineError::FanOut {
            host_id: host.host_id,
            occurrences: count,
        });
    }
    Ok(())
}

/// Null-safe maximum of two timestamps
pub fn latest_timestamp(left: Option<NaiveDateTime>, right: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
    match (left, right) {
        (Some(l), Some(r)) => Some(l.max(r)),
        (l, r) => l.or(r),
    }
}

/// Left-join listings onto hosts by `host_id`.
///
/// Output order follows `listings`. Listings without a matching host keep
/// their row with null host fields.
pub fn join_listings_with_hosts(listings: &[Listing], hosts: &[Host]) -> Result<Vec<ListingWithHost>> {
    assert_unique_host_ids(hosts)?;

    let by_id: HashMap<i64, &Host> = hosts.iter().map(|h| (h.host_id, h)).collect();
    let mut unmatched = 0usize;

    let gold: Vec<ListingWithHost> = listings
        .iter()
        .map(|listing| {
            let host = listing.host_id.and_then(|id| by_id.get(&id).copied());
            if host.is_none() {
                unmatched += 1;
                debug!(listing_id = listing.listing_id, host_id = ?listing.host_id, "No matching host");
            }

            ListingWithHost {
                listing_id: listing.listing_id,
                listing_name: listing.listing_name.clone(),
                room_type: listing.room_type.clone(),
                minimum_nights: listing.minimum_nights,
                price: listing.price,
                host_id: listing.host_id,
                host_name: host.map(|h| h.host_name.clone()),
                is_superhost: host.map(|h| h.is_superhost.clone()),
                created_at: listing.created_at,
                updated_at: latest_timestamp(listing.updated_at, host.and_then(|h| h.updated_at)),
            }
        })
        .collect();

    metrics::join::unmatched_listings(unmatched);
    Ok(gold)
}
