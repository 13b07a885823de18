use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::{is_accepted_room_type, is_accepted_superhost_flag, DEFAULT_PRICE_CEILING};
use crate::domain::{Host, Listing, ListingWithHost};
use crate::error::{PipelineError, Result};
use crate::observability::metrics;

/// Result of checking one table against its data-quality contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    /// Logical name of the assessed table
    pub table: String,
    /// Number of rows assessed
    pub row_count: usize,
    /// Specific issues found
    pub issues: Vec<QualityIssue>,
}

/// Quality Gate decision for a table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QualityDecision {
    /// Table meets its contract
    Accept,
    /// Table meets its contract but has flagged values
    AcceptWithWarnings,
    /// Table violates its contract
    Reject,
}

/// Individual quality issue found during assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityIssue {
    /// The type of quality issue
    pub issue_type: QualityIssueType,
    /// Severity level of the issue
    pub severity: QualitySeverity,
    /// Human-readable description of the issue
    pub description: String,
    /// Column that triggered this issue
    pub field: Option<String>,
    /// Key of the offending row (listing_id or host_id)
    pub row: Option<i64>,
}

/// Types of quality issues that can be detected
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QualityIssueType {
    /// Missing required data
    MissingData,
    /// Value outside the accepted set
    InvalidValue,
    /// Data outside expected ranges
    OutOfRange,
    /// Key occurs more than once
    Duplicate,
    /// Foreign key without a matching row
    ReferentialGap,
    /// Row count differs from the upstream table
    RowCountMismatch,
}

/// Severity levels for quality issues
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum QualitySeverity {
    /// Expected condition, recorded for visibility
    Info,
    /// Notable issue worth flagging
    Warning,
    /// Contract violation
    Error,
    /// Structural violation of the table
    Critical,
}

/// Whether contract violations stop the stage or are only reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    #[default]
    Enforce,
    Report,
}

/// Configuration for Quality Gate assessment rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub mode: ValidationMode,
    /// Prices above this are flagged as out of range
    pub price_ceiling: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            mode: ValidationMode::Enforce,
            price_ceiling: DEFAULT_PRICE_CEILING,
        }
    }
}

impl QualityIssue {
    fn new(issue_type: QualityIssueType, severity: QualitySeverity, field: &str, row: Option<i64>, description: String) -> Self {
        Self {
            issue_type,
            severity,
            description,
            field: Some(field.to_string()),
            row,
        }
    }
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.severity, self.description)
    }
}

impl QualityReport {
    pub fn new(table: impl Into<String>, row_count: usize) -> Self {
        Self {
            table: table.into(),
            row_count,
            issues: Vec::new(),
        }
    }

    /// Issues at `Error` severity or above
    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.severity >= QualitySeverity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues.iter().filter(|i| i.severity == QualitySeverity::Warning).count()
    }

    pub fn decision(&self) -> QualityDecision {
        if self.error_count() > 0 {
            QualityDecision::Reject
        } else if self.warning_count() > 0 {
            QualityDecision::AcceptWithWarnings
        } else {
            QualityDecision::Accept
        }
    }

    /// Log every issue and record metrics for the report
    pub fn log(&self) {
        for issue in &self.issues {
            metrics::quality_gate::issue_detected(&self.table, issue.severity);
            if issue.severity >= QualitySeverity::Warning {
                warn!(table = %self.table, field = ?issue.field, row = ?issue.row, "{}", issue);
            }
        }
        info!(
            table = %self.table,
            rows = self.row_count,
            errors = self.error_count(),
            warnings = self.warning_count(),
            decision = ?self.decision(),
            "Quality gate assessed table"
        );
    }

    /// Turn a rejected report into a `DataQuality` error when enforcing
    pub fn enforce(&self, mode: ValidationMode) -> Result<()> {
        if mode == ValidationMode::Report || self.decision() != QualityDecision::Reject {
            return Ok(());
        }
        let first = self
            .issues
            .iter()
            .find(|i| i.severity >= QualitySeverity::Error)
            .map(|i| i.to_string())
            .unwrap_or_default();
        Err(PipelineError::DataQuality {
            table: self.table.clone(),
            violations: self.error_count(),
            first,
        })
    }
}

/// Checks each table against its data-quality contract
pub struct QualityGate {
    pub config: ValidationConfig,
}

impl QualityGate {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Host silver contract.
    ///
    /// Duplicate `host_id` is only a warning here; the join refuses to run on
    /// duplicated keys.
    pub fn assess_hosts(&self, table: &str, hosts: &[Host]) -> QualityReport {
        let mut report = QualityReport::new(table, hosts.len());

        for host_id in duplicated_keys(hosts.iter().map(|h| h.host_id)) {
            report.issues.push(QualityIssue::new(
                QualityIssueType::Duplicate,
                QualitySeverity::Warning,
                "host_id",
                Some(host_id),
                format!("host_id {} is not unique", host_id),
            ));
        }

        for host in hosts {
            if host.host_name.is_empty() {
                report.issues.push(QualityIssue::new(
                    QualityIssueType::MissingData,
                    QualitySeverity::Error,
                    "host_name",
                    Some(host.host_id),
                    format!("host {} has an empty host_name", host.host_id),
                ));
            }
            if !is_accepted_superhost_flag(&host.is_superhost) {
                report.issues.push(QualityIssue::new(
                    QualityIssueType::InvalidValue,
                    QualitySeverity::Error,
                    "is_superhost",
                    Some(host.host_id),
                    format!("host {} has is_superhost {:?}, expected t or f", host.host_id, host.is_superhost),
                ));
            }
        }

        report
    }

    /// Listing silver contract
    pub fn assess_listings(&self, table: &str, listings: &[Listing]) -> QualityReport {
        let mut report = QualityReport::new(table, listings.len());

        for listing_id in duplicated_keys(listings.iter().map(|l| l.listing_id)) {
            report.issues.push(QualityIssue::new(
                QualityIssueType::Duplicate,
                QualitySeverity::Error,
                "listing_id",
                Some(listing_id),
                format!("listing_id {} is not unique", listing_id),
            ));
        }

        for listing in listings {
            let row = Some(listing.listing_id);
            if listing.host_id.is_none() {
                report.issues.push(QualityIssue::new(
                    QualityIssueType::MissingData,
                    QualitySeverity::Error,
                    "host_id",
                    row,
                    format!("listing {} has no host_id", listing.listing_id),
                ));
            }
            if !is_accepted_room_type(&listing.room_type) {
                report.issues.push(QualityIssue::new(
                    QualityIssueType::InvalidValue,
                    QualitySeverity::Error,
                    "room_type",
                    row,
                    format!("listing {} has unknown room_type {:?}", listing.listing_id, listing.room_type),
                ));
            }
            if listing.minimum_nights < 1 {
                report.issues.push(QualityIssue::new(
                    QualityIssueType::OutOfRange,
                    QualitySeverity::Error,
                    "minimum_nights",
                    row,
                    format!(
                        "listing {} has minimum_nights {} (must be at least 1)",
                        listing.listing_id, listing.minimum_nights
                    ),
                ));
            }
            if let Some(price) = listing.price.filter(|p| !p.is_finite() || *p < 0.0) {
                report.issues.push(QualityIssue::new(
                    QualityIssueType::OutOfRange,
                    QualitySeverity::Error,
                    "price",
                    row,
                    format!("listing {} has invalid price {}", listing.listing_id, price),
                ));
            }
        }

        report
    }

    /// Gold contract, checked against the silver tables it was built from
    pub fn assess_gold(&self, table: &str, gold: &[ListingWithHost], listings: &[Listing], hosts: &[Host]) -> QualityReport {
        let mut report = QualityReport::new(table, gold.len());

        if gold.len() != listings.len() {
            report.issues.push(QualityIssue {
                issue_type: QualityIssueType::RowCountMismatch,
                severity: QualitySeverity::Critical,
                description: format!("gold has {} rows but listings has {}", gold.len(), listings.len()),
                field: None,
                row: None,
            });
        }

        let known_hosts: HashSet<i64> = hosts.iter().map(|h| h.host_id).collect();

        for row in gold {
            let key = Some(row.listing_id);

            if let Some(host_id) = row.host_id {
                if !known_hosts.contains(&host_id) {
                    report.issues.push(QualityIssue::new(
                        QualityIssueType::ReferentialGap,
                        QualitySeverity::Info,
                        "host_id",
                        key,
                        format!("listing {} references unknown host {}", row.listing_id, host_id),
                    ));
                } else if row.host_name.is_none() {
                    report.issues.push(QualityIssue::new(
                        QualityIssueType::MissingData,
                        QualitySeverity::Error,
                        "host_name",
                        key,
                        format!("listing {} lost the name of known host {}", row.listing_id, host_id),
                    ));
                }
            }

            match row.price {
                None => report.issues.push(QualityIssue::new(
                    QualityIssueType::MissingData,
                    QualitySeverity::Warning,
                    "price",
                    key,
                    format!("listing {} has no price", row.listing_id),
                )),
                Some(price) if !price.is_finite() || price < 0.0 => report.issues.push(QualityIssue::new(
                    QualityIssueType::OutOfRange,
                    QualitySeverity::Error,
                    "price",
                    key,
                    format!("listing {} has invalid price {}", row.listing_id, price),
                )),
                Some(price) if price > self.config.price_ceiling => report.issues.push(QualityIssue::new(
                    QualityIssueType::OutOfRange,
                    QualitySeverity::Warning,
                    "price",
                    key,
                    format!(
                        "listing {} price {} exceeds ceiling {}",
                        row.listing_id, price, self.config.price_ceiling
                    ),
                )),
                Some(_) => {}
            }
        }

        report
    }
}

impl Default for QualityGate {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

/// Keys that occur more than once, in order of first appearance
fn duplicated_keys(keys: impl Iterator<Item = i64>) -> Vec<i64> {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    let mut order = Vec::new();
    for key in keys {
        let count = counts.entry(key).or_default();
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }
    order.into_iter().filter(|k| counts[k] > 1).collect()
}
