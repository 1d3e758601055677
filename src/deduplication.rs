// 🔍 Order-Level View - collapse line-item rows into one row per order key
// Two strategies: keep the first line, or sum metric columns across lines

use crate::error::ReconError;
use crate::table::{cell, Cell, Row, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Group label used for rows whose grouping column is blank
pub const BLANK_GROUP: &str = "(blank)";

// ============================================================================
// COLLAPSE MODE
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollapseMode {
    /// Keep the first row seen for each key.
    /// Fits order-level values repeated on every line item.
    #[default]
    First,

    /// Sum metric columns over all rows of a key; group and other columns
    /// come from the first row.
    Sum,
}

// ============================================================================
// ORDER ROW
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
    pub key: String,

    /// Grouping value, `BLANK_GROUP` when empty
    pub group: String,

    /// One value per requested metric column, in request order
    pub metrics: Vec<f64>,

    /// How many input rows were collapsed into this one
    pub line_count: usize,

    /// First input row for this key, kept for segment filters
    pub first_row: Row,
}

/// One source reduced to order level
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLevel {
    pub source: String,
    pub raw_rows: usize,
    /// Rows skipped because their key was blank
    pub blank_keys: usize,
    /// Orders in first-seen order
    pub orders: Vec<OrderRow>,
}

impl OrderLevel {
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Sum of the metric at `index` over the given orders
    pub fn metric_sum<'a>(orders: impl Iterator<Item = &'a OrderRow>, index: usize) -> f64 {
        orders.map(|o| o.metrics[index]).sum()
    }
}

// ============================================================================
// COLLAPSE
// ============================================================================

/// Blank metric cells count as 0; anything else must parse as a finite number
fn parse_metric(source: &str, key: &str, column: &str, raw: &Cell) -> Result<f64, ReconError> {
    let parsed = match raw {
        Cell::Empty => return Ok(0.0),
        Cell::Number(n) if n.is_nan() => return Ok(0.0),
        Cell::Number(n) => Some(*n),
        Cell::Text(s) if s.trim().is_empty() => return Ok(0.0),
        Cell::Text(s) => s.trim().parse::<f64>().ok(),
    };

    match parsed {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(ReconError::MetricParse {
            source: source.to_string(),
            key: key.to_string(),
            column: column.to_string(),
            value: raw.display(),
        }),
    }
}

/// Reduce a line-item table to one row per order key.
///
/// Rows with a blank key count towards `raw_rows` but cannot be matched, so
/// they are left out of the order-level view.
pub fn collapse_orders(
    source: &str,
    table: &Table,
    key_column: &str,
    group_column: &str,
    metric_columns: &[&str],
    mode: CollapseMode,
) -> Result<OrderLevel, ReconError> {
    let mut orders: Vec<OrderRow> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();
    let mut blank_keys = 0;

    for row in &table.rows {
        let key = match cell(row, key_column).text() {
            Some(k) => k,
            None => {
                blank_keys += 1;
                continue;
            }
        };

        let metrics = metric_columns
            .iter()
            .map(|column| parse_metric(source, &key, column, cell(row, column)))
            .collect::<Result<Vec<f64>, ReconError>>()?;

        let existing = index_by_key.get(&key).copied();
        match existing {
            Some(idx) => {
                let order = &mut orders[idx];
                order.line_count += 1;
                if mode == CollapseMode::Sum {
                    for (total, value) in order.metrics.iter_mut().zip(metrics) {
                        *total += value;
                    }
                }
            }
            None => {
                let group = cell(row, group_column)
                    .text()
                    .unwrap_or_else(|| BLANK_GROUP.to_string());
                index_by_key.insert(key.clone(), orders.len());
                orders.push(OrderRow {
                    key,
                    group,
                    metrics,
                    line_count: 1,
                    first_row: row.clone(),
                });
            }
        }
    }

    if blank_keys > 0 {
        tracing::warn!(source, blank_keys, "rows without an order key left out of order-level view");
    }

    Ok(OrderLevel {
        source: source.to_string(),
        raw_rows: table.len(),
        blank_keys,
        orders,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> Table {
        Table::from_csv_reader(csv.as_bytes()).unwrap()
    }

    const LINES: &str = "order,state,tax,total\n\
                         1,CA,5.00,50\n\
                         1,CA,5.00,50\n\
                         2,NY,2.50,20\n\
                         ,NY,1.00,10\n\
                         3,,0,5\n";

    #[test]
    fn test_collapse_first() {
        let level = collapse_orders("ledger", &table(LINES), "order", "state", &["tax", "total"], CollapseMode::First).unwrap();

        assert_eq!(level.raw_rows, 5);
        assert_eq!(level.blank_keys, 1);
        assert_eq!(level.len(), 3);

        let first = &level.orders[0];
        assert_eq!(first.key, "1");
        assert_eq!(first.metrics, vec![5.0, 50.0]);
        assert_eq!(first.line_count, 2);
        assert_eq!(level.orders[2].group, BLANK_GROUP);

        assert_eq!(OrderLevel::metric_sum(level.orders.iter(), 0), 7.5);
    }

    #[test]
    fn test_collapse_sum() {
        let level = collapse_orders("ledger", &table(LINES), "order", "state", &["tax"], CollapseMode::Sum).unwrap();

        assert_eq!(level.orders[0].metrics, vec![10.0]);
        assert_eq!(level.orders[1].metrics, vec![2.5]);
    }

    #[test]
    fn test_blank_metric_is_zero() {
        let level = collapse_orders("storefront", &table("order,state,tax\n9,TX,\n"), "order", "state", &["tax"], CollapseMode::First).unwrap();
        assert_eq!(level.orders[0].metrics, vec![0.0]);
    }

    #[test]
    fn test_bad_metric_is_fatal() {
        let err = collapse_orders("storefront", &table("order,state,tax\n9,TX,n/a\n"), "order", "state", &["tax"], CollapseMode::First).unwrap_err();

        assert_eq!(
            err,
            ReconError::MetricParse {
                source: "storefront".into(),
                key: "9".into(),
                column: "tax".into(),
                value: "n/a".into(),
            }
        );
    }

    #[test]
    fn test_collapse_mode_serde() {
        let mode: CollapseMode = serde_json::from_str("\"sum\"").unwrap();
        assert_eq!(mode, CollapseMode::Sum);
        assert_eq!(CollapseMode::default(), CollapseMode::First);
    }
}
