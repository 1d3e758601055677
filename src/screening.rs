// 🧹 Pre-Screen - order-level exclusion filters applied before validation
//
// A transaction is excluded when any of its rows has:
//   - no ship-to ZIP
//   - zero total, tax and subtotal (zero-dollar order)
//   - a total that does not add up within tolerance
//   - tax charged on a zero total or zero subtotal
//
// Exclusion is by transaction id: one flagged line removes the whole order.

use crate::attributes as col;
use crate::rules::{exceeds_tolerance, expected_total, is_tax_only};
use crate::table::{cell, Cell, Row, Table};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenReason {
    MissingZip,
    ZeroDollar,
    TotalDiscrepancy,
    TaxOnly,
}

impl ScreenReason {
    pub fn label(&self) -> &str {
        match self {
            ScreenReason::MissingZip => "missing ship-to ZIP",
            ScreenReason::ZeroDollar => "zero-dollar order",
            ScreenReason::TotalDiscrepancy => "total discrepancy",
            ScreenReason::TaxOnly => "tax-only order",
        }
    }
}

/// A row removed by the pre-screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenedRow {
    pub row_index: usize,
    #[serde(rename = "transactionId")]
    pub transaction_id: Option<String>,
    /// Reasons raised by this row itself; empty when the row was removed
    /// only because another row of the same transaction was flagged
    pub reasons: Vec<ScreenReason>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenOutcome {
    pub kept: Table,
    pub excluded: Vec<ScreenedRow>,
}

impl ScreenOutcome {
    /// Excluded row count per reason, in `ScreenReason` order
    pub fn reason_counts(&self) -> Vec<(ScreenReason, usize)> {
        let mut counts: Vec<(ScreenReason, usize)> = Vec::new();
        for reason in self.excluded.iter().flat_map(|row| row.reasons.iter()) {
            match counts.iter_mut().find(|(r, _)| r == reason) {
                Some((_, count)) => *count += 1,
                None => counts.push((*reason, 1)),
            }
        }
        counts.sort_by_key(|(reason, _)| *reason);
        counts
    }
}

/// Lenient number read; unparseable values are left to the validator
fn amount(row: &Row, field: &str) -> Option<f64> {
    match cell(row, field) {
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Every reason a single row trips, in declaration order
pub fn screen_row(row: &Row, tolerance: f64) -> Vec<ScreenReason> {
    let mut reasons = Vec::new();

    let has_zip = !cell(row, col::SHIP_TO_ZIP).is_blank();
    if !has_zip {
        reasons.push(ScreenReason::MissingZip);
    }

    let total = amount(row, col::TRANSACTION_TOTAL);
    let subtotal = amount(row, col::TRANSACTION_SUBTOTAL);
    let tax = amount(row, col::TRANSACTION_TAX);

    if let (Some(total), Some(subtotal), Some(tax)) = (total, subtotal, tax) {
        if has_zip && total == 0.0 && tax == 0.0 && subtotal == 0.0 {
            reasons.push(ScreenReason::ZeroDollar);
        }

        let shipping = amount(row, col::TRANSACTION_SHIPPING_HANDLING);
        let discount = amount(row, col::TRANSACTION_DISCOUNT);
        if let (Some(shipping), Some(discount)) = (shipping, discount) {
            let expected = expected_total(subtotal, shipping, tax, discount);
            if exceeds_tolerance((total - expected).abs(), tolerance) {
                reasons.push(ScreenReason::TotalDiscrepancy);
            }
        }

        if is_tax_only(total, subtotal, tax) {
            reasons.push(ScreenReason::TaxOnly);
        }
    }

    reasons
}

/// Split a table into rows that pass the pre-screen and rows excluded by it.
///
/// Rows with a blank transaction id can only be excluded on their own
/// account, since there is no id to share.
pub fn screen_table(table: &Table, tolerance: f64) -> ScreenOutcome {
    let row_reasons: Vec<Vec<ScreenReason>> =
        table.rows.iter().map(|row| screen_row(row, tolerance)).collect();

    let flagged_ids: BTreeSet<String> = table
        .rows
        .iter()
        .zip(&row_reasons)
        .filter(|(_, reasons)| !reasons.is_empty())
        .filter_map(|(row, _)| cell(row, col::TRANSACTION_ID).text())
        .collect();

    let mut keep = HashSet::new();
    let mut excluded = Vec::new();

    for (row_index, (row, reasons)) in table.rows.iter().zip(row_reasons).enumerate() {
        let transaction_id = cell(row, col::TRANSACTION_ID).text();
        let flagged_by_id = transaction_id
            .as_ref()
            .map(|id| flagged_ids.contains(id))
            .unwrap_or(false);

        if reasons.is_empty() && !flagged_by_id {
            keep.insert(row_index);
        } else {
            excluded.push(ScreenedRow {
                row_index,
                transaction_id,
                reasons,
            });
        }
    }

    let outcome = ScreenOutcome {
        kept: table.select(&keep),
        excluded,
    };

    tracing::info!(
        kept = outcome.kept.len(),
        excluded = outcome.excluded.len(),
        transactions = flagged_ids.len(),
        "pre-screen complete"
    );
    for (reason, count) in outcome.reason_counts() {
        tracing::debug!(reason = reason.label(), rows = count, "pre-screen reason");
    }

    outcome
}

// ============================================================================
// TESTS
// ============================================================================
