// 🏷️ Record Rules - cross-field invariants as an ordered list of rule objects
// Rules run in list order and the first failure wins

use crate::record::TransactionRecord;
use crate::schema::{ErrorKind, ValidationError};

/// Absorbs binary rounding so that a difference of exactly the tolerance passes
const EPSILON: f64 = 1e-9;

/// Tax at or above this amount on a zero-value order marks it tax-only
pub const TAX_ONLY_THRESHOLD: f64 = 1.0;

// ============================================================================
// SHARED ARITHMETIC
// ============================================================================

/// True when `difference` is strictly above `tolerance`
pub fn exceeds_tolerance(difference: f64, tolerance: f64) -> bool {
    difference - tolerance > EPSILON
}

/// subtotal + shipping + tax - discount
pub fn expected_total(subtotal: f64, shipping: f64, tax: f64, discount: f64) -> f64 {
    subtotal + shipping + tax - discount
}

/// Tax charged while the total or the subtotal is zero
pub fn is_tax_only(total: f64, subtotal: f64, tax: f64) -> bool {
    tax >= TAX_ONLY_THRESHOLD && (total == 0.0 || subtotal == 0.0)
}

// ============================================================================
// RULE DEFINITION
// ============================================================================

pub trait RecordRule: Send + Sync {
    /// Stable identifier, used when listing rule order
    fn name(&self) -> &str;

    fn check(&self, record: &TransactionRecord) -> Result<(), ValidationError>;
}

/// transactionTotal must equal subtotal + shipping + tax - discount
pub struct TotalCalculation {
    pub tolerance: f64,
}

impl RecordRule for TotalCalculation {
    fn name(&self) -> &str {
        "total_calculation"
    }

    fn check(&self, record: &TransactionRecord) -> Result<(), ValidationError> {
        let calculated = record.computed_total();
        if exceeds_tolerance((record.transaction_total - calculated).abs(), self.tolerance) {
            return Err(ValidationError::new(
                ErrorKind::TotalMismatch,
                Some(crate::attributes::TRANSACTION_TOTAL),
                format!(
                    "Transaction total mismatch: {} != {:.2} (subtotal {} + shipping {} + tax {} - discount {})",
                    record.transaction_total,
                    calculated,
                    record.transaction_subtotal,
                    record.transaction_shipping_handling,
                    record.transaction_tax,
                    record.transaction_discount
                ),
            ));
        }
        Ok(())
    }
}

/// Rejects orders that charge tax on a zero total or subtotal
pub struct TaxOnly;

impl RecordRule for TaxOnly {
    fn name(&self) -> &str {
        "tax_only"
    }

    fn check(&self, record: &TransactionRecord) -> Result<(), ValidationError> {
        if is_tax_only(
            record.transaction_total,
            record.transaction_subtotal,
            record.transaction_tax,
        ) {
            return Err(ValidationError::new(
                ErrorKind::TaxOnlyTransaction,
                Some(crate::attributes::TRANSACTION_TAX),
                format!(
                    "Tax-only transaction: tax {} charged but total {} or subtotal {} is 0",
                    record.transaction_tax, record.transaction_total, record.transaction_subtotal
                ),
            ));
        }
        Ok(())
    }
}

/// lineItemAmount must be in 0..=|subtotal| + tolerance
pub struct LineItemWithinSubtotal {
    pub tolerance: f64,
}

impl RecordRule for LineItemWithinSubtotal {
    fn name(&self) -> &str {
        "line_item_within_subtotal"
    }

    fn check(&self, record: &TransactionRecord) -> Result<(), ValidationError> {
        let amount = record.line_item_amount;

        if amount < 0.0 {
            return Err(ValidationError::new(
                ErrorKind::NegativeLineItemAmount,
                Some(crate::attributes::LINE_ITEM_AMOUNT),
                format!("Negative line item amount: {}", amount),
            ));
        }

        let bound = record.transaction_subtotal.abs();
        if exceeds_tolerance(amount.abs() - bound, self.tolerance) {
            return Err(ValidationError::new(
                ErrorKind::LineItemExceedsSubtotal,
                Some(crate::attributes::LINE_ITEM_AMOUNT),
                format!(
                    "Line item amount exceeds subtotal: {} > {}",
                    amount, record.transaction_subtotal
                ),
            ));
        }
        Ok(())
    }
}

pub struct PositiveQuantity;

impl RecordRule for PositiveQuantity {
    fn name(&self) -> &str {
        "positive_quantity"
    }

    fn check(&self, record: &TransactionRecord) -> Result<(), ValidationError> {
        if record.line_item_quantity < 1 {
            return Err(ValidationError::new(
                ErrorKind::InvalidQuantity,
                Some(crate::attributes::LINE_ITEM_QUANTITY),
                format!(
                    "Invalid quantity: {} (must be at least 1)",
                    record.line_item_quantity
                ),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// RULE SET
// ============================================================================

pub struct RuleSet {
    rules: Vec<Box<dyn RecordRule>>,
}

impl RuleSet {
    /// Create an empty rule set
    pub fn new() -> Self {
        RuleSet { rules: Vec::new() }
    }

    /// The standard cross-field checks, in evaluation order:
    /// total calculation, tax-only, line-item bound, quantity.
    pub fn standard(tolerance: f64) -> Self {
        let mut set = RuleSet::new();
        set.push(TotalCalculation { tolerance });
        set.push(TaxOnly);
        set.push(LineItemWithinSubtotal { tolerance });
        set.push(PositiveQuantity);
        set
    }

    /// Append a rule; it runs after every rule already present
    pub fn push<R: RecordRule + 'static>(&mut self, rule: R) {
        self.rules.push(Box::new(rule));
    }

    /// Run rules in order, stopping at the first failure
    pub fn check(&self, record: &TransactionRecord) -> Result<(), ValidationError> {
        for rule in &self.rules {
            rule.check(record)?;
        }
        Ok(())
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard(crate::schema::DEFAULT_TOLERANCE)
    }
}

// ============================================================================
// TESTS
// ============================================================================
