// Transaction Integrity - Core Library
// Row validation, pre-screening and cross-source reconciliation, shared by the CLI and tests

pub mod table;          // CSV-derived rows held in memory
pub mod attributes;     // Field registry and canonical column names
pub mod record;         // TransactionRecord and enumerated codes
pub mod schema;         // Row validator
pub mod rules;          // Cross-field record rules
pub mod data_quality;   // Validation outcome and error statistics
pub mod screening;      // Pre-screen exclusion filters
pub mod deduplication;  // Order-level view
pub mod reconciliation; // Two-source reconciliation
pub mod error;
pub mod config;
pub mod report;

// Re-export commonly used types
pub use table::{cell, load_csv, order_level_defaults, Cell, ColumnDefault, Row, Table};
pub use attributes::{FieldDefinition, FieldRegistry};
pub use record::{Currency, Entity, Enumerated, Marketplace, Purpose, TaxFlag, TransactionRecord};
pub use schema::{ErrorKind, ValidationError, Validator, DEFAULT_TOLERANCE};
pub use rules::{RecordRule, RuleSet};
pub use data_quality::{
    validation_stats, BatchSummary, ErrorStat, InvalidRecord, ValidRecord, ValidationOutcome,
};
pub use screening::{screen_table, ScreenOutcome, ScreenReason, ScreenedRow};
pub use deduplication::{collapse_orders, CollapseMode, OrderLevel, OrderRow};
pub use reconciliation::{
    ColumnFilter, FileDetails, GroupDifference, MetricPair, ReconConfig, ReconciliationSummary,
    Reconciler, SegmentBreakdown, SegmentSpec, SourceSpec,
};
pub use error::ReconError;
pub use config::{Settings, ValidationSettings};
pub use report::{InputFingerprint, RunEnvelope};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
