use std::fmt;

/// Fatal reconciliation failures. Any of these aborts the run; no partial
/// report is produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconError {
    /// Configuration is structurally invalid (empty column name, etc.).
    ConfigValidation(String),
    /// A configured column is absent from one source.
    MissingColumn { source: String, column: String },
    /// A metric cell is present but not a number.
    MetricParse {
        source: String,
        key: String,
        column: String,
        value: String,
    },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { source, column } => {
                write!(f, "source '{source}': missing column '{column}'")
            }
            Self::MetricParse {
                source,
                key,
                column,
                value,
            } => write!(
                f,
                "source '{source}', order '{key}': cannot parse {column} value '{value}'"
            ),
        }
    }
}

impl std::error::Error for ReconError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ReconError::MissingColumn {
            source: "storefront".into(),
            column: "state".into(),
        };
        assert_eq!(err.to_string(), "source 'storefront': missing column 'state'");

        let err = ReconError::MetricParse {
            source: "ledger".into(),
            key: "1001".into(),
            column: "tax".into(),
            value: "n/a".into(),
        };
        assert_eq!(
            err.to_string(),
            "source 'ledger', order '1001': cannot parse tax value 'n/a'"
        );
    }
}
