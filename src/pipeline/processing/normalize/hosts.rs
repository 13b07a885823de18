use chrono::NaiveDateTime;
use tracing::debug;

use super::parsing::{non_blank, parse_host_timestamp};
use super::{parse_error, Normalizer};
use crate::constants::{ANONYMOUS_HOST_NAME, HOSTS_BRONZE};
use crate::domain::{Host, RawHost};
use crate::error::Result;
use crate::observability::metrics;

/// Cleanses raw hosts into the silver hosts table
pub struct HostsNormalizer {
    source_table: String,
}

impl HostsNormalizer {
    pub fn new(source_table: impl Into<String>) -> Self {
        Self {
            source_table: source_table.into(),
        }
    }

    fn parse_timestamp(&self, index: usize, field: &str, value: Option<&str>) -> Result<Option<NaiveDateTime>> {
        match non_blank(value) {
            None => Ok(None),
            Some(text) => parse_host_timestamp(text)
                .map(Some)
                .map_err(|reason| parse_error(&self.source_table, index, field, text, reason)),
        }
    }
}

impl Default for HostsNormalizer {
    fn default() -> Self {
        Self::new(HOSTS_BRONZE)
    }
}

impl Normalizer for HostsNormalizer {
    type Raw = RawHost;
    type Output = Host;

    fn source_table(&self) -> &str {
        &self.source_table
    }

    fn normalize(&self, rows: Vec<RawHost>) -> Result<Vec<Host>> {
        let mut hosts = Vec::with_capacity(rows.len());
        let mut anonymous = 0usize;

        for (index, raw) in rows.into_iter().enumerate() {
            let created_at = self.parse_timestamp(index, "created_at", raw.created_at.as_deref())?;
            let updated_at = self.parse_timestamp(index, "updated_at", raw.updated_at.as_deref())?;

            let host_name = match raw.name {
                Some(name) => name,
                None => {
                    anonymous += 1;
                    debug!(host_id = raw.id, "Host has no name, using {}", ANONYMOUS_HOST_NAME);
                    ANONYMOUS_HOST_NAME.to_string()
                }
            };

            hosts.push(Host {
                host_id: raw.id,
                host_name,
                is_superhost: raw.is_superhost,
                created_at,
                updated_at,
            });
        }

        metrics::normalize::anonymous_hosts(anonymous);
        metrics::normalize::rows_normalized(&self.source_table, hosts.len());
        Ok(hosts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use chrono::NaiveDate;

    fn raw_host(id: i64, name: Option<&str>) -> RawHost {
        RawHost {
            id,
            name: name.map(str::to_string),
            is_superhost: "t".to_string(),
            created_at: Some("03-11-21 14:05".to_string()),
            updated_at: Some("15-01-22 09:30".to_string()),
        }
    }

    #[test]
    fn test_null_name_becomes_anonymous() {
        let hosts = HostsNormalizer::default()
            .normalize(vec![raw_host(1, None), raw_host(2, Some("Ana"))])
            .unwrap();

        assert_eq!(hosts[0].host_name, "Anonymous");
        assert_eq!(hosts[1].host_name, "Ana");
    }

    #[test]
    fn test_renames_id_and_parses_timestamps() {
        let hosts = HostsNormalizer::default().normalize(vec![raw_host(77, Some("Bo"))]).unwrap();
        let host = &hosts[0];

        assert_eq!(host.host_id, 77);
        assert_eq!(host.is_superhost, "t");
        assert_eq!(
            host.created_at,
            NaiveDate::from_ymd_opt(2021, 11, 3).unwrap().and_hms_opt(14, 5, 0)
        );
        assert_eq!(
            host.updated_at,
            NaiveDate::from_ymd_opt(2022, 1, 15).unwrap().and_hms_opt(9, 30, 0)
        );
    }

    #[test]
    fn test_missing_timestamp_is_null_not_an_error() {
        let mut raw = raw_host(5, Some("Cy"));
        raw.updated_at = None;
        let hosts = HostsNormalizer::default().normalize(vec![raw]).unwrap();
        assert_eq!(hosts[0].updated_at, None);
    }

    #[test]
    fn test_malformed_timestamp_fails_whole_table() {
        let mut bad = raw_host(2, Some("Di"));
        bad.created_at = Some("2021-11-03 14:05".to_string());

        let err = HostsNormalizer::new("hosts_bronze")
            .normalize(vec![raw_host(1, Some("Al")), bad])
            .unwrap_err();

        match err {
            PipelineError::Parse { table, row, field, .. } => {
                assert_eq!(table, "hosts_bronze");
                assert_eq!(row, 2);
                assert_eq!(field, "created_at");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_host_ids_are_not_rejected_here() {
        let hosts = HostsNormalizer::default()
            .normalize(vec![raw_host(9, Some("A")), raw_host(9, Some("B"))])
            .unwrap();
        assert_eq!(hosts.len(), 2);
    }
}
