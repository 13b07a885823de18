//! Metrics for the listings pipeline
//!
//! Thin wrappers over the `metrics` facade using Prometheus naming
//! conventions. Nothing is exported unless the embedding process installs a
//! recorder; without one every call is a no-op.

use std::fmt;

use crate::pipeline::processing::quality_gate::QualitySeverity;

/// Enum representing all metric names used in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Stage metrics
    StageSuccess,
    StageError,
    StageDuration,

    // Normalize metrics
    NormalizeRowsProcessed,
    NormalizeAnonymousHosts,
    NormalizeMinimumNightsCoerced,

    // Join metrics
    JoinUnmatchedListings,
    JoinFanOutDetected,

    // Quality Gate metrics
    QualityGateIssuesDetected,

    // Storage metrics
    StorageRowsRead,
    StorageRowsWritten,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::StageSuccess => "lp_stage_success_total",
            MetricName::StageError => "lp_stage_error_total",
            MetricName::StageDuration => "lp_stage_duration_seconds",

            MetricName::NormalizeRowsProcessed => "lp_normalize_rows_processed_total",
            MetricName::NormalizeAnonymousHosts => "lp_normalize_anonymous_hosts_total",
            MetricName::NormalizeMinimumNightsCoerced => "lp_normalize_minimum_nights_coerced_total",

            MetricName::JoinUnmatchedListings => "lp_join_unmatched_listings_total",
            MetricName::JoinFanOutDetected => "lp_join_fan_out_detected_total",

            MetricName::QualityGateIssuesDetected => "lp_quality_gate_issues_detected_total",

            MetricName::StorageRowsRead => "lp_storage_rows_read_total",
            MetricName::StorageRowsWritten => "lp_storage_rows_written_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Stage Metrics
// ============================================================================

pub mod stage {
    use super::MetricName;

    pub fn success(stage: &str) {
        ::metrics::counter!(MetricName::StageSuccess.as_str(), "stage" => stage.to_string()).increment(1);
    }

    pub fn error(stage: &str) {
        ::metrics::counter!(MetricName::StageError.as_str(), "stage" => stage.to_string()).increment(1);
    }

    pub fn duration(stage: &str, secs: f64) {
        ::metrics::histogram!(MetricName::StageDuration.as_str(), "stage" => stage.to_string()).record(secs);
    }
}

// ============================================================================
// Normalize Metrics
// ============================================================================

pub mod normalize {
    use super::MetricName;

    pub fn rows_normalized(table: &str, count: usize) {
        ::metrics::counter!(MetricName::NormalizeRowsProcessed.as_str(), "table" => table.to_string())
            .increment(count as u64);
    }

    pub fn anonymous_hosts(count: usize) {
        ::metrics::counter!(MetricName::NormalizeAnonymousHosts.as_str()).increment(count as u64);
    }

    pub fn minimum_nights_coerced(count: usize) {
        ::metrics::counter!(MetricName::NormalizeMinimumNightsCoerced.as_str()).increment(count as u64);
    }
}

// ============================================================================
// Join Metrics
// ============================================================================

pub mod join {
    use super::MetricName;

    pub fn unmatched_listings(count: usize) {
        ::metrics::counter!(MetricName::JoinUnmatchedListings.as_str()).increment(count as u64);
    }

    pub fn fan_out_detected() {
        ::metrics::counter!(MetricName::JoinFanOutDetected.as_str()).increment(1);
    }
}

// ============================================================================
// Quality Gate Metrics
// ============================================================================

pub mod quality_gate {
    use super::{MetricName, QualitySeverity};

    pub fn issue_detected(table: &str, severity: QualitySeverity) {
        ::metrics::counter!(
            MetricName::QualityGateIssuesDetected.as_str(),
            "table" => table.to_string(),
            "severity" => format!("{:?}", severity)
        )
        .increment(1);
    }
}

// ============================================================================
// Storage Metrics
// ============================================================================

pub mod storage {
    use super::MetricName;

    pub fn rows_read(table: &str, count: usize) {
        ::metrics::counter!(MetricName::StorageRowsRead.as_str(), "table" => table.to_string()).increment(count as u64);
    }

    pub fn rows_written(table: &str, count: usize) {
        ::metrics::counter!(MetricName::StorageRowsWritten.as_str(), "table" => table.to_string())
            .increment(count as u64);
    }
}
