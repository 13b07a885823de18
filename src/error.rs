use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Parse error in {table} row {row}, field '{field}' value {value:?}: {reason}")]
    Parse {
        table: String,
        row: usize,
        field: String,
        value: String,
        reason: String,
    },

    #[error("Fan-out integrity error: host_id {host_id} appears {occurrences} times in the hosts table")]
    FanOut { host_id: i64, occurrences: usize },

    #[error("Data quality check failed for {table}: {violations} violation(s), first: {first}")]
    DataQuality {
        table: String,
        violations: usize,
        first: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Pipeline graph error: {0}")]
    Dag(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_out_message_names_the_key() {
        let err = PipelineError::FanOut {
            host_id: 42,
            occurrences: 3,
        };
        let message = err.to_string();
        assert!(message.contains("42"));
        assert!(message.contains("3 times"));
    }

    #[test]
    fn test_parse_error_message_carries_context() {
        let err = PipelineError::Parse {
            table: "listings_bronze".to_string(),
            row: 7,
            field: "price".to_string(),
            value: "$abc".to_string(),
            reason: "invalid float literal".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("listings_bronze"));
        assert!(message.contains("row 7"));
        assert!(message.contains("\"$abc\""));
    }
}
