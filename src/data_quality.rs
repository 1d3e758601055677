// ✅ Data Quality - validation outcome, batch summary and error statistics
// The Validator fills a ValidationOutcome; everything here only reads it

use crate::record::TransactionRecord;
use crate::schema::ErrorKind;
use serde::{Deserialize, Serialize};

/// Longest error prefix used for grouping when the message has no colon
const ERROR_PREFIX_CHARS: usize = 50;

/// How many rejected rows the batch log lists individually
const LOGGED_ERRORS: usize = 5;

// ============================================================================
// OUTCOME
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidRecord {
    pub row_index: usize,
    pub record: TransactionRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidRecord {
    pub row_index: usize,
    #[serde(rename = "transactionId")]
    pub transaction_id: Option<String>,
    pub kind: ErrorKind,
    pub error: String,
}

/// Complete partition of a validated batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub valid: Vec<ValidRecord>,
    pub invalid: Vec<InvalidRecord>,
}

impl ValidationOutcome {
    pub fn total(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    pub fn records(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.valid.iter().map(|v| &v.record)
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_outcome(self)
    }

    pub fn stats(&self) -> Vec<ErrorStat> {
        validation_stats(&self.invalid)
    }

    /// Log the batch summary and the first few rejections
    pub fn log_summary(&self) {
        let summary = self.summary();
        tracing::info!(
            total = summary.total_records,
            valid = summary.valid_count,
            invalid = summary.invalid_count,
            "{}",
            summary.summary()
        );

        for item in self.invalid.iter().take(LOGGED_ERRORS) {
            tracing::warn!(
                row = item.row_index,
                transaction_id = item.transaction_id.as_deref().unwrap_or("Unknown"),
                "{}",
                item.error
            );
        }
        if self.invalid.len() > LOGGED_ERRORS {
            tracing::warn!("... and {} more errors", self.invalid.len() - LOGGED_ERRORS);
        }
    }
}

// ============================================================================
// BATCH SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_records: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    /// 0.0 - 100.0; 0.0 for an empty batch
    pub valid_percentage: f64,
    pub invalid_percentage: f64,
}

impl BatchSummary {
    pub fn from_outcome(outcome: &ValidationOutcome) -> Self {
        let total = outcome.total();
        let pct = |count: usize| {
            if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            }
        };

        BatchSummary {
            total_records: total,
            valid_count: outcome.valid.len(),
            invalid_count: outcome.invalid.len(),
            valid_percentage: pct(outcome.valid.len()),
            invalid_percentage: pct(outcome.invalid.len()),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} records: {} valid ({:.1}%), {} invalid ({:.1}%)",
            self.total_records,
            self.valid_count,
            self.valid_percentage,
            self.invalid_count,
            self.invalid_percentage
        )
    }
}

// ============================================================================
// ERROR STATISTICS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorStat {
    pub error_type: String,
    pub count: usize,
}

/// Text before the first colon, or the first 50 characters when there is none
pub fn error_prefix(message: &str) -> String {
    match message.split_once(':') {
        Some((prefix, _)) => prefix.to_string(),
        None => message.chars().take(ERROR_PREFIX_CHARS).collect(),
    }
}

/// Count rejected rows per error prefix, most frequent first.
///
/// Ties keep the order in which the prefix was first seen.
pub fn validation_stats(invalid: &[InvalidRecord]) -> Vec<ErrorStat> {
    let mut stats: Vec<ErrorStat> = Vec::new();

    for record in invalid {
        let prefix = error_prefix(&record.error);
        match stats.iter_mut().find(|s| s.error_type == prefix) {
            Some(stat) => stat.count += 1,
            None => stats.push(ErrorStat {
                error_type: prefix,
                count: 1,
            }),
        }
    }

    // Stable sort keeps first-seen order among equal counts
    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats
}

// ============================================================================
// TESTS
// ============================================================================
