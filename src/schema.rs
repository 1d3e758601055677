// 📐 Shape Layer - Transaction Validation
// Turns one raw row into a TransactionRecord or a single reason for rejecting it

use crate::attributes::{self as col, FieldRegistry};
use crate::data_quality::{InvalidRecord, ValidRecord, ValidationOutcome};
use crate::record::{Currency, Entity, Enumerated, Marketplace, Purpose, TaxFlag, TransactionRecord};
use crate::rules::RuleSet;
use crate::table::{cell, Cell, Row, Table};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Absolute tolerance for monetary comparisons
pub const DEFAULT_TOLERANCE: f64 = 0.01;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

// ============================================================================
// VALIDATION ERROR
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    MissingRequiredField,
    InvalidFormat,
    InvalidEnumValue,
    TotalMismatch,
    TaxOnlyTransaction,
    NegativeLineItemAmount,
    LineItemExceedsSubtotal,
    InvalidQuantity,
}

impl ErrorKind {
    pub fn name(&self) -> &str {
        match self {
            ErrorKind::MissingRequiredField => "MissingRequiredField",
            ErrorKind::InvalidFormat => "InvalidFormat",
            ErrorKind::InvalidEnumValue => "InvalidEnumValue",
            ErrorKind::TotalMismatch => "TotalMismatch",
            ErrorKind::TaxOnlyTransaction => "TaxOnlyTransaction",
            ErrorKind::NegativeLineItemAmount => "NegativeLineItemAmount",
            ErrorKind::LineItemExceedsSubtotal => "LineItemExceedsSubtotal",
            ErrorKind::InvalidQuantity => "InvalidQuantity",
        }
    }
}

/// Why a row was rejected.
///
/// `message` always starts with a short category followed by a colon
/// (e.g. `Missing required field: currency`); error statistics group on
/// that prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub kind: ErrorKind,
    pub field: Option<String>,
    pub message: String,
}

impl ValidationError {
    pub fn new(kind: ErrorKind, field: Option<&str>, message: impl Into<String>) -> Self {
        ValidationError {
            kind,
            field: field.map(|f| f.to_string()),
            message: message.into(),
        }
    }

    pub fn missing(field: &str) -> Self {
        Self::new(
            ErrorKind::MissingRequiredField,
            Some(field),
            format!("Missing required field: {}", field),
        )
    }

    pub fn invalid_format(field: &str, expected: &str, raw: &Cell) -> Self {
        Self::new(
            ErrorKind::InvalidFormat,
            Some(field),
            format!("Invalid {} for {}: '{}'", expected, field, raw.display()),
        )
    }

    pub fn invalid_enum<E: Enumerated>(raw: &str) -> Self {
        Self::new(
            ErrorKind::InvalidEnumValue,
            Some(E::FIELD),
            format!(
                "Invalid {}: '{}' (allowed: {})",
                E::FIELD,
                raw,
                E::allowed().join(", ")
            ),
        )
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// FIELD COERCION
// ============================================================================

fn parse_decimal(row: &Row, field: &str) -> Result<f64, ValidationError> {
    let raw = cell(row, field);
    let value = match raw {
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => s.trim().parse::<f64>().ok(),
        Cell::Empty => None,
    };

    match value {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(ValidationError::invalid_format(field, "number", raw)),
    }
}

/// i64::MAX as f64 rounds up to 2^63, which is already out of range
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

/// Whole numbers only; `2.0` is accepted, `1.5` is not, nor anything outside i64
fn parse_integer(row: &Row, field: &str) -> Result<i64, ValidationError> {
    let raw = cell(row, field);
    let value = match raw {
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => {
            let trimmed = s.trim();
            match trimmed.parse::<i64>() {
                Ok(i) => return Ok(i),
                Err(_) => trimmed.parse::<f64>().ok(),
            }
        }
        Cell::Empty => None,
    };

    match value {
        Some(n) if n.is_finite() && n.fract() == 0.0 && n >= -I64_UPPER && n < I64_UPPER => {
            Ok(n as i64)
        }
        _ => Err(ValidationError::invalid_format(field, "integer", raw)),
    }
}

fn parse_date(row: &Row, field: &str) -> Result<NaiveDate, ValidationError> {
    let raw = cell(row, field);
    let text = match raw {
        Cell::Text(s) => s.trim(),
        _ => return Err(ValidationError::invalid_format(field, "date", raw)),
    };

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(datetime.date());
        }
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Ok(datetime.date_naive());
    }

    Err(ValidationError::invalid_format(field, "date", raw))
}

fn optional_text(row: &Row, field: &str) -> Option<String> {
    cell(row, field).text()
}

/// Required text; presence was checked before coercion
fn required_text(row: &Row, field: &str) -> Result<String, ValidationError> {
    optional_text(row, field).ok_or_else(|| ValidationError::missing(field))
}

// ============================================================================
// NORMALIZATION
// ============================================================================

fn normalize_country(field: &str, value: &str) -> Result<String, ValidationError> {
    let upper = value.trim().to_uppercase();
    if upper.chars().count() != 2 {
        return Err(ValidationError::new(
            ErrorKind::InvalidFormat,
            Some(field),
            format!(
                "Invalid country code for {}: '{}' (must be 2 characters, e.g. US, CA)",
                field, value
            ),
        ));
    }
    Ok(upper)
}

fn normalize_state(field: &str, value: Option<String>) -> Result<Option<String>, ValidationError> {
    match value {
        None => Ok(None),
        Some(v) => {
            let upper = v.trim().to_uppercase();
            if upper.chars().count() > 3 {
                return Err(ValidationError::new(
                    ErrorKind::InvalidFormat,
                    Some(field),
                    format!("Invalid state code for {}: '{}' (must be 2-3 characters)", field, v),
                ));
            }
            Ok(Some(upper))
        }
    }
}

fn required_code<E: Enumerated>(row: &Row) -> Result<E, ValidationError> {
    let text = required_text(row, E::FIELD)?;
    E::parse(&text).ok_or_else(|| ValidationError::invalid_enum::<E>(&text))
}

/// Blank is allowed and reads as `None`
fn optional_code<E: Enumerated>(row: &Row) -> Result<Option<E>, ValidationError> {
    match optional_text(row, E::FIELD) {
        None => Ok(None),
        Some(text) => E::parse(&text)
            .map(Some)
            .ok_or_else(|| ValidationError::invalid_enum::<E>(&text)),
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

/// Row validator.
///
/// Each row goes through the same fixed stages and stops at the first
/// failure:
///
/// 1. required-field presence (registry order)
/// 2. type coercion: amounts, quantity, date
/// 3. normalization: trimming, country and state codes
/// 4. enumerated values: currency, marketplace, entity, purpose, tax flag
/// 5. cross-field rules from the [`RuleSet`], in list order
pub struct Validator {
    registry: FieldRegistry,
    rules: RuleSet,
}

impl Validator {
    pub fn new() -> Self {
        Self::with_tolerance(DEFAULT_TOLERANCE)
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Validator {
            registry: FieldRegistry::new(),
            rules: RuleSet::standard(tolerance),
        }
    }

    pub fn with_rules(registry: FieldRegistry, rules: RuleSet) -> Self {
        Validator { registry, rules }
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Validate one row into a normalized record
    pub fn validate_row(&self, row: &Row) -> Result<TransactionRecord, ValidationError> {
        // Stage 1: presence
        for field in self.registry.required_fields() {
            if cell(row, &field.name).is_blank() {
                return Err(ValidationError::missing(&field.name));
            }
        }

        // Stage 2: coercion
        let transaction_total = parse_decimal(row, col::TRANSACTION_TOTAL)?;
        let transaction_subtotal = parse_decimal(row, col::TRANSACTION_SUBTOTAL)?;
        let transaction_tax = parse_decimal(row, col::TRANSACTION_TAX)?;
        let transaction_shipping_handling = parse_decimal(row, col::TRANSACTION_SHIPPING_HANDLING)?;
        let transaction_discount = parse_decimal(row, col::TRANSACTION_DISCOUNT)?;
        let line_item_amount = parse_decimal(row, col::LINE_ITEM_AMOUNT)?;
        let line_item_quantity = parse_integer(row, col::LINE_ITEM_QUANTITY)?;
        let line_item_discount = parse_decimal(row, col::LINE_ITEM_DISCOUNT)?;
        let line_item_shipping_handling = parse_decimal(row, col::LINE_ITEM_SHIPPING_HANDLING)?;
        let transaction_date = parse_date(row, col::TRANSACTION_DATE)?;

        // Stage 3: normalization
        let transaction_id = required_text(row, col::TRANSACTION_ID)?;
        let line_item_id = required_text(row, col::LINE_ITEM_ID)?;
        let ship_to_country =
            normalize_country(col::SHIP_TO_COUNTRY, &required_text(row, col::SHIP_TO_COUNTRY)?)?;
        let ship_from_country = match optional_text(row, col::SHIP_FROM_COUNTRY) {
            Some(v) => Some(normalize_country(col::SHIP_FROM_COUNTRY, &v)?),
            None => None,
        };
        let ship_to_state = normalize_state(col::SHIP_TO_STATE, optional_text(row, col::SHIP_TO_STATE))?;
        let ship_from_state =
            normalize_state(col::SHIP_FROM_STATE, optional_text(row, col::SHIP_FROM_STATE))?;

        // Stage 4: enumerations
        let currency = required_code::<Currency>(row)?;
        let transaction_marketplace = optional_code::<Marketplace>(row)?;
        let transaction_entity = optional_code::<Entity>(row)?;
        let transaction_purpose = optional_code::<Purpose>(row)?;
        let transaction_recalculate_tax = optional_code::<TaxFlag>(row)?;

        let record = TransactionRecord {
            transaction_id,
            transaction_parent_id: optional_text(row, col::TRANSACTION_PARENT_ID),
            transaction_date,
            transaction_total,
            transaction_subtotal,
            transaction_tax,
            transaction_shipping_handling,
            transaction_discount,
            currency,
            transaction_marketplace,
            transaction_entity,
            transaction_purpose,
            transaction_recalculate_tax,
            ship_to_address1: optional_text(row, col::SHIP_TO_ADDRESS1),
            ship_to_address2: optional_text(row, col::SHIP_TO_ADDRESS2),
            ship_to_city: optional_text(row, col::SHIP_TO_CITY),
            ship_to_state,
            ship_to_zip: optional_text(row, col::SHIP_TO_ZIP),
            ship_to_country,
            ship_from_address1: optional_text(row, col::SHIP_FROM_ADDRESS1),
            ship_from_address2: optional_text(row, col::SHIP_FROM_ADDRESS2),
            ship_from_city: optional_text(row, col::SHIP_FROM_CITY),
            ship_from_state,
            ship_from_zip: optional_text(row, col::SHIP_FROM_ZIP),
            ship_from_country,
            line_item_id,
            line_item_amount,
            line_item_quantity,
            line_item_discount,
            line_item_shipping_handling,
            line_item_product_name: optional_text(row, col::LINE_ITEM_PRODUCT_NAME),
            line_item_product_tax_code: optional_text(row, col::LINE_ITEM_PRODUCT_TAX_CODE),
        };

        // Stage 5: cross-field rules
        self.rules.check(&record)?;

        Ok(record)
    }

    /// Partition rows into valid and invalid, keeping each row's index.
    ///
    /// Every input row lands in exactly one of the two collections.
    pub fn validate_rows(&self, rows: &[Row]) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::default();

        for (row_index, row) in rows.iter().enumerate() {
            match self.validate_row(row) {
                Ok(record) => outcome.valid.push(ValidRecord { row_index, record }),
                Err(error) => {
                    let transaction_id = cell(row, col::TRANSACTION_ID).text();
                    tracing::debug!(
                        row = row_index,
                        transaction_id = transaction_id.as_deref().unwrap_or("Unknown"),
                        kind = error.kind.name(),
                        "row rejected: {}",
                        error.message
                    );
                    outcome.invalid.push(InvalidRecord {
                        row_index,
                        transaction_id,
                        kind: error.kind,
                        error: error.message,
                    });
                }
            }
        }

        outcome
    }

    pub fn validate_table(&self, table: &Table) -> ValidationOutcome {
        let unknown = self.registry.unknown_columns(&table.columns);
        if !unknown.is_empty() {
            tracing::debug!(columns = ?unknown, "ignoring unknown columns");
        }

        let outcome = self.validate_rows(&table.rows);
        outcome.log_summary();
        outcome
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_row() -> Row {
        let mut row = Row::new();
        let fields = [
            (col::TRANSACTION_ID, "1001"),
            (col::TRANSACTION_DATE, "2025-01-15"),
            (col::TRANSACTION_TOTAL, "118.00"),
            (col::TRANSACTION_SUBTOTAL, "100.00"),
            (col::TRANSACTION_TAX, "8.00"),
            (col::TRANSACTION_SHIPPING_HANDLING, "15.00"),
            (col::TRANSACTION_DISCOUNT, "5.00"),
            (col::CURRENCY, "USD"),
            (col::SHIP_TO_COUNTRY, "US"),
            (col::SHIP_TO_STATE, "CA"),
            (col::SHIP_TO_ZIP, "94105"),
            (col::LINE_ITEM_ID, "1001-1"),
            (col::LINE_ITEM_AMOUNT, "100.00"),
            (col::LINE_ITEM_QUANTITY, "1"),
            (col::LINE_ITEM_DISCOUNT, "0"),
            (col::LINE_ITEM_SHIPPING_HANDLING, "0"),
        ];
        for (name, value) in fields {
            row.insert(name.to_string(), Cell::from(value));
        }
        row
    }

    fn set(row: &mut Row, field: &str, value: &str) {
        row.insert(field.to_string(), Cell::from(value));
    }

    fn kind_of(row: &Row) -> ErrorKind {
        Validator::new().validate_row(row).unwrap_err().kind
    }

    #[test]
    fn test_valid_row() {
        let record = Validator::new().validate_row(&valid_row()).unwrap();

        assert_eq!(record.transaction_id, "1001");
        assert_eq!(record.currency, Currency::Usd);
        assert_eq!(record.transaction_date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(record.ship_to_state, Some("CA".to_string()));
        assert_eq!(record.transaction_marketplace, None);
        assert_eq!(record.line_item_quantity, 1);
    }

    #[test]
    fn test_missing_required_field() {
        let mut row = valid_row();
        row.remove(col::CURRENCY);

        let err = Validator::new().validate_row(&row).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingRequiredField);
        assert_eq!(err.field.as_deref(), Some(col::CURRENCY));
        assert_eq!(err.message, "Missing required field: currency");
    }

    #[test]
    fn test_blank_id_is_missing() {
        let mut row = valid_row();
        set(&mut row, col::TRANSACTION_ID, "   ");
        assert_eq!(kind_of(&row), ErrorKind::MissingRequiredField);
    }

    #[test]
    fn test_first_missing_field_follows_registry_order() {
        let mut row = valid_row();
        row.remove(col::LINE_ITEM_ID);
        row.remove(col::TRANSACTION_TAX);

        let err = Validator::new().validate_row(&row).unwrap_err();
        assert_eq!(err.field.as_deref(), Some(col::TRANSACTION_TAX));
    }

    #[test]
    fn test_invalid_number_and_date() {
        let mut row = valid_row();
        set(&mut row, col::TRANSACTION_TAX, "eight");
        let err = Validator::new().validate_row(&row).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFormat);
        assert!(err.message.starts_with("Invalid number for transactionTax"));

        let mut row = valid_row();
        set(&mut row, col::TRANSACTION_DATE, "not-a-date");
        assert_eq!(kind_of(&row), ErrorKind::InvalidFormat);

        let mut row = valid_row();
        set(&mut row, col::TRANSACTION_TOTAL, "NaN");
        assert_eq!(kind_of(&row), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_date_formats() {
        let validator = Validator::new();
        for raw in ["2025-01-15", "01/15/2025", "2025-01-15 10:30:00", "2025-01-15T10:30:00Z"] {
            let mut row = valid_row();
            set(&mut row, col::TRANSACTION_DATE, raw);
            let record = validator.validate_row(&row).unwrap();
            assert_eq!(record.transaction_date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        }
    }

    #[test]
    fn test_quantity_coercion() {
        let mut row = valid_row();
        set(&mut row, col::LINE_ITEM_QUANTITY, "2.0");
        assert_eq!(Validator::new().validate_row(&row).unwrap().line_item_quantity, 2);

        set(&mut row, col::LINE_ITEM_QUANTITY, "1.5");
        assert_eq!(kind_of(&row), ErrorKind::InvalidFormat);

        set(&mut row, col::LINE_ITEM_QUANTITY, "0");
        assert_eq!(kind_of(&row), ErrorKind::InvalidQuantity);
    }

    #[test]
    fn test_quantity_out_of_range_rejected() {
        let mut row = valid_row();
        set(&mut row, col::LINE_ITEM_QUANTITY, "1e20");
        assert_eq!(kind_of(&row), ErrorKind::InvalidFormat);

        row.insert(col::LINE_ITEM_QUANTITY.to_string(), Cell::Number(-1e19));
        assert_eq!(kind_of(&row), ErrorKind::InvalidFormat);

        set(&mut row, col::LINE_ITEM_QUANTITY, "3e2");
        assert_eq!(Validator::new().validate_row(&row).unwrap().line_item_quantity, 300);
    }

    #[test]
    fn test_numeric_cells_accepted() {
        let mut row = valid_row();
        row.insert(col::TRANSACTION_TOTAL.to_string(), Cell::Number(118.0));
        row.insert(col::LINE_ITEM_QUANTITY.to_string(), Cell::Number(3.0));

        let record = Validator::new().validate_row(&row).unwrap();
        assert_eq!(record.transaction_total, 118.0);
        assert_eq!(record.line_item_quantity, 3);
    }

    #[test]
    fn test_currency_normalized() {
        let mut row = valid_row();
        set(&mut row, col::CURRENCY, "usd");
        assert_eq!(Validator::new().validate_row(&row).unwrap().currency, Currency::Usd);

        set(&mut row, col::CURRENCY, "JPY");
        let err = Validator::new().validate_row(&row).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidEnumValue);
        assert!(err.message.starts_with("Invalid currency: 'JPY'"));
    }

    #[test]
    fn test_optional_enums() {
        let mut row = valid_row();
        set(&mut row, col::TRANSACTION_MARKETPLACE, " amazon ");
        set(&mut row, col::TRANSACTION_PURPOSE, "resale");
        set(&mut row, col::TRANSACTION_ENTITY, "");
        set(&mut row, col::TRANSACTION_RECALCULATE_TAX, "false");

        let record = Validator::new().validate_row(&row).unwrap();
        assert_eq!(record.transaction_marketplace, Some(Marketplace::Amazon));
        assert_eq!(record.transaction_purpose, Some(Purpose::Resale));
        assert_eq!(record.transaction_entity, None);
        assert_eq!(record.transaction_recalculate_tax, Some(TaxFlag::False));

        set(&mut row, col::TRANSACTION_ENTITY, "CHURCH");
        assert_eq!(kind_of(&row), ErrorKind::InvalidEnumValue);

        let mut row = valid_row();
        set(&mut row, col::TRANSACTION_RECALCULATE_TAX, "maybe");
        assert_eq!(kind_of(&row), ErrorKind::InvalidEnumValue);
    }

    #[test]
    fn test_country_and_state_normalization() {
        let mut row = valid_row();
        set(&mut row, col::SHIP_TO_COUNTRY, "us");
        set(&mut row, col::SHIP_TO_STATE, " ny ");
        set(&mut row, col::SHIP_FROM_COUNTRY, "ca");

        let record = Validator::new().validate_row(&row).unwrap();
        assert_eq!(record.ship_to_country, "US");
        assert_eq!(record.ship_to_state, Some("NY".to_string()));
        assert_eq!(record.ship_from_country, Some("CA".to_string()));

        set(&mut row, col::SHIP_TO_COUNTRY, "USA");
        assert_eq!(kind_of(&row), ErrorKind::InvalidFormat);

        let mut row = valid_row();
        set(&mut row, col::SHIP_TO_STATE, "CALI");
        assert_eq!(kind_of(&row), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_total_tolerance_boundary() {
        // Expected total is 118.00
        let mut row = valid_row();
        set(&mut row, col::TRANSACTION_TOTAL, "118.01");
        assert!(Validator::new().validate_row(&row).is_ok());

        set(&mut row, col::TRANSACTION_TOTAL, "117.99");
        assert!(Validator::new().validate_row(&row).is_ok());

        set(&mut row, col::TRANSACTION_TOTAL, "118.02");
        assert_eq!(kind_of(&row), ErrorKind::TotalMismatch);
    }

    #[test]
    fn test_tax_only_rejected() {
        let mut row = valid_row();
        set(&mut row, col::TRANSACTION_TAX, "5");
        set(&mut row, col::TRANSACTION_TOTAL, "0");
        set(&mut row, col::TRANSACTION_SUBTOTAL, "0");
        set(&mut row, col::TRANSACTION_SHIPPING_HANDLING, "0");
        set(&mut row, col::TRANSACTION_DISCOUNT, "5");
        set(&mut row, col::LINE_ITEM_AMOUNT, "0");

        assert_eq!(kind_of(&row), ErrorKind::TaxOnlyTransaction);
    }

    #[test]
    fn test_line_item_bound() {
        let mut row = valid_row();
        set(&mut row, col::LINE_ITEM_AMOUNT, "100.01");
        assert!(Validator::new().validate_row(&row).is_ok());

        set(&mut row, col::LINE_ITEM_AMOUNT, "100.02");
        assert_eq!(kind_of(&row), ErrorKind::LineItemExceedsSubtotal);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let validator = Validator::new();
        let mut row = valid_row();
        set(&mut row, col::TRANSACTION_TOTAL, "1.00");

        let first = validator.validate_row(&row).unwrap_err();
        let second = validator.validate_row(&row).unwrap_err();
        assert_eq!(first, second);
    }

    #[test]
    fn test_validate_rows_partitions_everything() {
        let mut bad = valid_row();
        set(&mut bad, col::CURRENCY, "JPY");
        let mut no_id = valid_row();
        no_id.remove(col::TRANSACTION_ID);

        let rows = vec![valid_row(), bad, valid_row(), no_id];
        let outcome = Validator::new().validate_rows(&rows);

        assert_eq!(outcome.valid.len() + outcome.invalid.len(), rows.len());
        assert_eq!(outcome.valid.iter().map(|v| v.row_index).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(outcome.invalid[0].row_index, 1);
        assert_eq!(outcome.invalid[0].transaction_id.as_deref(), Some("1001"));
        assert_eq!(outcome.invalid[1].transaction_id, None);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let mut row = valid_row();
        set(&mut row, "internalNote", "rush order");
        assert!(Validator::new().validate_row(&row).is_ok());
    }
}
