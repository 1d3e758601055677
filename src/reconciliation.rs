// ⚖️ Reconciliation Engine - compare order-level aggregates between two sources
//
// For each pair of extracts (e.g. internal ledger vs. storefront):
//   1. raw and order-level row counts
//   2. key matching (intersection and both set differences)
//   3. metric totals per source
//   4. metric totals restricted to matching keys
//   5. per-group totals, absolute and percentage differences
//
// Money is rounded to cents in the report, percentages to one decimal.

use crate::deduplication::{collapse_orders, CollapseMode, OrderLevel, OrderRow};
use crate::error::ReconError;
use crate::table::{cell, Row, Table};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Column names for one side of the comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Label used in reports and errors (e.g. "ledger", "storefront")
    pub name: String,
    pub key_column: String,
    pub metric_column: String,
    pub group_column: String,
}

/// Additional metric reported as totals only (no matching or breakdown)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPair {
    pub label: String,
    pub left_column: String,
    pub right_column: String,
}

/// Case-insensitive equality filter on one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub column: String,
    pub equals: String,
}

impl ColumnFilter {
    pub fn matches(&self, row: &Row) -> bool {
        cell(row, &self.column)
            .text()
            .map(|value| value.to_lowercase() == self.equals.trim().to_lowercase())
            .unwrap_or(false)
    }
}

/// Subset of both sources with its own per-group breakdown.
/// A side without a filter contributes all of its orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub name: String,
    #[serde(default)]
    pub left: Option<ColumnFilter>,
    #[serde(default)]
    pub right: Option<ColumnFilter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconConfig {
    pub left: SourceSpec,
    pub right: SourceSpec,
    #[serde(default)]
    pub extra_metrics: Vec<MetricPair>,
    #[serde(default)]
    pub segments: Vec<SegmentSpec>,
    #[serde(default)]
    pub collapse: CollapseMode,
}

impl ReconConfig {
    /// Reject empty column names and labels before any data is touched
    pub fn validate(&self) -> Result<(), ReconError> {
        let mut names: Vec<(&str, &str)> = Vec::new();
        for spec in [&self.left, &self.right] {
            names.push(("source name", spec.name.as_str()));
            names.push(("key_column", spec.key_column.as_str()));
            names.push(("metric_column", spec.metric_column.as_str()));
            names.push(("group_column", spec.group_column.as_str()));
        }
        for metric in &self.extra_metrics {
            names.push(("extra metric label", metric.label.as_str()));
            names.push(("extra metric left_column", metric.left_column.as_str()));
            names.push(("extra metric right_column", metric.right_column.as_str()));
        }
        for segment in &self.segments {
            names.push(("segment name", segment.name.as_str()));
            for filter in [&segment.left, &segment.right].into_iter().flatten() {
                names.push(("segment filter column", filter.column.as_str()));
            }
        }

        if let Some((what, _)) = names.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ReconError::ConfigValidation(format!("{what} must not be empty")));
        }

        if self.left.name == self.right.name {
            return Err(ReconError::ConfigValidation(format!(
                "left and right sources share the name '{}'",
                self.left.name
            )));
        }

        Ok(())
    }

    /// Every column one side must have, in the order they are checked
    fn required_columns(&self, left_side: bool) -> Vec<&str> {
        let spec = if left_side { &self.left } else { &self.right };
        let mut columns = vec![
            spec.key_column.as_str(),
            spec.metric_column.as_str(),
            spec.group_column.as_str(),
        ];
        for metric in &self.extra_metrics {
            columns.push(if left_side { metric.left_column.as_str() } else { metric.right_column.as_str() });
        }
        for segment in &self.segments {
            let filter = if left_side { &segment.left } else { &segment.right };
            if let Some(filter) = filter {
                columns.push(&filter.column);
            }
        }
        columns
    }
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub label: String,
    pub left_total: f64,
    pub right_total: f64,
    pub difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDetails {
    pub left_rows: usize,
    pub right_rows: usize,
    pub left_order_level_rows: usize,
    pub right_order_level_rows: usize,

    pub left_metric_total: f64,
    pub right_metric_total: f64,
    pub metric_difference: f64,
    pub extra_totals: Vec<MetricComparison>,

    pub matching_orders: usize,
    pub missing_from_right: usize,
    pub missing_from_left: usize,
    pub missing_from_right_keys: Vec<String>,
    pub missing_from_left_keys: Vec<String>,

    pub matching_left_metric: f64,
    pub matching_right_metric: f64,
    pub matching_metric_difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDifference {
    pub group: String,
    pub left_value: f64,
    pub right_value: f64,
    pub absolute_difference: f64,
    /// `None` (serialized as null) when both sides are zero
    pub percentage_difference: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentBreakdown {
    pub name: String,
    pub left_orders: usize,
    pub right_orders: usize,
    pub group_differences: Vec<GroupDifference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub left_source: String,
    pub right_source: String,
    pub metric: String,
    pub group_by: String,
    pub file_details: FileDetails,
    pub group_differences: Vec<GroupDifference>,
    pub segments: Vec<SegmentBreakdown>,
}

impl ReconciliationSummary {
    pub fn is_balanced(&self) -> bool {
        let details = &self.file_details;
        details.metric_difference == 0.0
            && details.missing_from_left == 0
            && details.missing_from_right == 0
    }

    pub fn summary(&self) -> String {
        let d = &self.file_details;
        format!(
            "{} vs {}: {} matching orders, {} only in {}, {} only in {}; {} {:.2} vs {:.2} (difference {:.2}, matched-only {:.2})",
            self.left_source,
            self.right_source,
            d.matching_orders,
            d.missing_from_right,
            self.left_source,
            d.missing_from_left,
            self.right_source,
            self.metric,
            d.left_metric_total,
            d.right_metric_total,
            d.metric_difference,
            d.matching_metric_difference
        )
    }

    /// Groups with the largest absolute difference first
    pub fn top_groups(&self, n: usize) -> &[GroupDifference] {
        &self.group_differences[..n.min(self.group_differences.len())]
    }
}

// ============================================================================
// COMPUTATION HELPERS
// ============================================================================

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let rounded = (value * factor).round() / factor;
    // Avoid reporting -0.0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

pub fn round_money(value: f64) -> f64 {
    round_to(value, 2)
}

/// |a - b| from unrounded sums, rounded to cents
pub fn money_difference(left: f64, right: f64) -> f64 {
    round_money((left - right).abs())
}

/// |a - b| / max(|a|, |b|) * 100, undefined when both are zero
pub fn percentage_difference(left: f64, right: f64) -> Option<f64> {
    let denominator = left.abs().max(right.abs());
    if denominator == 0.0 {
        None
    } else {
        Some(round_to((left - right).abs() / denominator * 100.0, 1))
    }
}

/// Result of comparing two key sets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMatch {
    pub matching: BTreeSet<String>,
    pub missing_from_right: BTreeSet<String>,
    pub missing_from_left: BTreeSet<String>,
}

pub fn match_keys(left: &BTreeSet<String>, right: &BTreeSet<String>) -> KeyMatch {
    KeyMatch {
        matching: left.intersection(right).cloned().collect(),
        missing_from_right: left.difference(right).cloned().collect(),
        missing_from_left: right.difference(left).cloned().collect(),
    }
}

fn group_totals<'a>(orders: impl Iterator<Item = &'a OrderRow>) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for order in orders {
        *totals.entry(order.group.clone()).or_insert(0.0) += order.metrics[0];
    }
    totals
}

/// Outer join of per-group totals; a group missing on one side counts as 0
pub fn group_differences<'a>(
    left: impl Iterator<Item = &'a OrderRow>,
    right: impl Iterator<Item = &'a OrderRow>,
) -> Vec<GroupDifference> {
    let left_totals = group_totals(left);
    let right_totals = group_totals(right);

    let groups: BTreeSet<&String> = left_totals.keys().chain(right_totals.keys()).collect();

    let mut differences: Vec<GroupDifference> = groups
        .into_iter()
        .map(|group| {
            let left_value = left_totals.get(group).copied().unwrap_or(0.0);
            let right_value = right_totals.get(group).copied().unwrap_or(0.0);
            GroupDifference {
                group: group.clone(),
                left_value: round_money(left_value),
                right_value: round_money(right_value),
                absolute_difference: money_difference(left_value, right_value),
                percentage_difference: percentage_difference(left_value, right_value),
            }
        })
        .collect();

    // BTreeSet order already sorts by group; the stable sort keeps it for ties
    differences.sort_by(|a, b| b.absolute_difference.total_cmp(&a.absolute_difference));
    differences
}

fn key_set(level: &OrderLevel) -> BTreeSet<String> {
    level.orders.iter().map(|o| o.key.clone()).collect()
}

// ============================================================================
// RECONCILER
// ============================================================================

pub struct Reconciler {
    config: ReconConfig,
}

impl Reconciler {
    /// Build a reconciler, validating the configuration up front
    pub fn new(config: ReconConfig) -> Result<Self, ReconError> {
        config.validate()?;
        Ok(Reconciler { config })
    }

    pub fn config(&self) -> &ReconConfig {
        &self.config
    }

    fn check_columns(&self, table: &Table, left_side: bool) -> Result<(), ReconError> {
        let source = if left_side { &self.config.left.name } else { &self.config.right.name };
        for column in self.config.required_columns(left_side) {
            if !table.has_column(column) {
                return Err(ReconError::MissingColumn {
                    source: source.clone(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    fn order_level(&self, table: &Table, left_side: bool) -> Result<OrderLevel, ReconError> {
        let spec = if left_side { &self.config.left } else { &self.config.right };

        let mut metric_columns = vec![spec.metric_column.as_str()];
        for metric in &self.config.extra_metrics {
            metric_columns.push(if left_side { metric.left_column.as_str() } else { metric.right_column.as_str() });
        }

        collapse_orders(
            &spec.name,
            table,
            &spec.key_column,
            &spec.group_column,
            &metric_columns,
            self.config.collapse,
        )
    }

    /// Compare two sources. Either the full report is returned or an error;
    /// no partial report.
    pub fn reconcile(&self, left: &Table, right: &Table) -> Result<ReconciliationSummary, ReconError> {
        // Configuration problems surface before any row is read
        self.check_columns(left, true)?;
        self.check_columns(right, false)?;

        // Step 1: order-level views
        let left_level = self.order_level(left, true)?;
        let right_level = self.order_level(right, false)?;

        // Step 2: key matching
        let keys = match_keys(&key_set(&left_level), &key_set(&right_level));

        // Step 3: totals over all order-level rows
        // Sums stay unrounded until they are reported
        let left_total = OrderLevel::metric_sum(left_level.orders.iter(), 0);
        let right_total = OrderLevel::metric_sum(right_level.orders.iter(), 0);

        let extra_totals = self
            .config
            .extra_metrics
            .iter()
            .enumerate()
            .map(|(i, metric)| {
                let left_total = OrderLevel::metric_sum(left_level.orders.iter(), i + 1);
                let right_total = OrderLevel::metric_sum(right_level.orders.iter(), i + 1);
                MetricComparison {
                    label: metric.label.clone(),
                    left_total: round_money(left_total),
                    right_total: round_money(right_total),
                    difference: money_difference(left_total, right_total),
                }
            })
            .collect();

        // Step 4: totals over matching keys only
        let matching_left = OrderLevel::metric_sum(
            left_level.orders.iter().filter(|o| keys.matching.contains(&o.key)),
            0,
        );
        let matching_right = OrderLevel::metric_sum(
            right_level.orders.iter().filter(|o| keys.matching.contains(&o.key)),
            0,
        );

        // Step 5: per-group breakdown
        let groups = group_differences(left_level.orders.iter(), right_level.orders.iter());

        let segments = self
            .config
            .segments
            .iter()
            .map(|segment| {
                let keep = |filter: &Option<ColumnFilter>, order: &OrderRow| {
                    filter.as_ref().map(|f| f.matches(&order.first_row)).unwrap_or(true)
                };
                let left_orders: Vec<&OrderRow> =
                    left_level.orders.iter().filter(|o| keep(&segment.left, *o)).collect();
                let right_orders: Vec<&OrderRow> =
                    right_level.orders.iter().filter(|o| keep(&segment.right, *o)).collect();

                SegmentBreakdown {
                    name: segment.name.clone(),
                    left_orders: left_orders.len(),
                    right_orders: right_orders.len(),
                    group_differences: group_differences(
                        left_orders.iter().copied(),
                        right_orders.iter().copied(),
                    ),
                }
            })
            .collect();

        let file_details = FileDetails {
            left_rows: left_level.raw_rows,
            right_rows: right_level.raw_rows,
            left_order_level_rows: left_level.len(),
            right_order_level_rows: right_level.len(),
            left_metric_total: round_money(left_total),
            right_metric_total: round_money(right_total),
            metric_difference: money_difference(left_total, right_total),
            extra_totals,
            matching_orders: keys.matching.len(),
            missing_from_right: keys.missing_from_right.len(),
            missing_from_left: keys.missing_from_left.len(),
            missing_from_right_keys: keys.missing_from_right.into_iter().collect(),
            missing_from_left_keys: keys.missing_from_left.into_iter().collect(),
            matching_left_metric: round_money(matching_left),
            matching_right_metric: round_money(matching_right),
            matching_metric_difference: money_difference(matching_left, matching_right),
        };

        let report = ReconciliationSummary {
            left_source: self.config.left.name.clone(),
            right_source: self.config.right.name.clone(),
            metric: self.config.left.metric_column.clone(),
            group_by: self.config.left.group_column.clone(),
            file_details,
            group_differences: groups,
            segments,
        };

        tracing::info!("{}", report.summary());
        Ok(report)
    }
}

// ============================================================================
// TESTS
// ============================================================================
