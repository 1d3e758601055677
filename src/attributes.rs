// 🏛️ Field Registry - the transaction column catalog
// One definition per input column and whether it is required

use serde::{Deserialize, Serialize};

// ============================================================================
// COLUMN NAMES
// ============================================================================

pub const TRANSACTION_ID: &str = "transactionId";
pub const TRANSACTION_PARENT_ID: &str = "transactionParentId";
pub const TRANSACTION_DATE: &str = "transactionDate";
pub const TRANSACTION_TOTAL: &str = "transactionTotal";
pub const TRANSACTION_SUBTOTAL: &str = "transactionSubtotal";
pub const TRANSACTION_TAX: &str = "transactionTax";
pub const TRANSACTION_SHIPPING_HANDLING: &str = "transactionShippingHandling";
pub const TRANSACTION_DISCOUNT: &str = "transactionDiscount";
pub const CURRENCY: &str = "currency";
pub const TRANSACTION_MARKETPLACE: &str = "transactionMarketplace";
pub const TRANSACTION_ENTITY: &str = "transactionEntity";
pub const TRANSACTION_PURPOSE: &str = "transactionPurpose";
pub const TRANSACTION_RECALCULATE_TAX: &str = "transactionRecalculateTax";

pub const SHIP_TO_ADDRESS1: &str = "shipToAddress1";
pub const SHIP_TO_ADDRESS2: &str = "shipToAddress2";
pub const SHIP_TO_CITY: &str = "shipToCity";
pub const SHIP_TO_STATE: &str = "shipToState";
pub const SHIP_TO_ZIP: &str = "shipToZip";
pub const SHIP_TO_COUNTRY: &str = "shipToCountry";

pub const SHIP_FROM_ADDRESS1: &str = "shipFromAddress1";
pub const SHIP_FROM_ADDRESS2: &str = "shipFromAddress2";
pub const SHIP_FROM_CITY: &str = "shipFromCity";
pub const SHIP_FROM_STATE: &str = "shipFromState";
pub const SHIP_FROM_ZIP: &str = "shipFromZip";
pub const SHIP_FROM_COUNTRY: &str = "shipFromCountry";

pub const LINE_ITEM_ID: &str = "lineItemId";
pub const LINE_ITEM_AMOUNT: &str = "lineItemAmount";
pub const LINE_ITEM_QUANTITY: &str = "lineItemQuantity";
pub const LINE_ITEM_DISCOUNT: &str = "lineItemDiscount";
pub const LINE_ITEM_SHIPPING_HANDLING: &str = "lineItemShippingHandling";
pub const LINE_ITEM_PRODUCT_NAME: &str = "lineItemProductName";
pub const LINE_ITEM_PRODUCT_TAX_CODE: &str = "lineItemProductTaxCode";

// ============================================================================
// FIELD DEFINITION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Column name as it appears in the input header
    pub name: String,

    /// A blank or absent value rejects the row
    pub required: bool,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        FieldDefinition {
            name: name.into(),
            required: false,
        }
    }

    /// Builder: mark as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

// ============================================================================
// FIELD REGISTRY
// ============================================================================

/// Ordered catalog of transaction columns.
///
/// Registration order is the order required-field checks run in, so the
/// first missing column reported for a row is deterministic.
pub struct FieldRegistry {
    fields: Vec<FieldDefinition>,
}

impl FieldRegistry {
    /// Registry with every transaction column
    pub fn new() -> Self {
        let mut registry = FieldRegistry { fields: Vec::new() };
        registry.register_transaction_fields();
        registry
    }

    fn register_transaction_fields(&mut self) {
        // Required, in check order
        for name in [
            TRANSACTION_ID,
            TRANSACTION_DATE,
            TRANSACTION_TOTAL,
            TRANSACTION_SUBTOTAL,
            TRANSACTION_TAX,
            TRANSACTION_SHIPPING_HANDLING,
            TRANSACTION_DISCOUNT,
            CURRENCY,
            SHIP_TO_COUNTRY,
            LINE_ITEM_ID,
            LINE_ITEM_AMOUNT,
            LINE_ITEM_QUANTITY,
            LINE_ITEM_DISCOUNT,
            LINE_ITEM_SHIPPING_HANDLING,
        ] {
            self.register(FieldDefinition::new(name).required());
        }

        for name in [
            TRANSACTION_PARENT_ID,
            TRANSACTION_MARKETPLACE,
            TRANSACTION_ENTITY,
            TRANSACTION_PURPOSE,
            TRANSACTION_RECALCULATE_TAX,
            SHIP_TO_ADDRESS1,
            SHIP_TO_ADDRESS2,
            SHIP_TO_CITY,
            SHIP_TO_STATE,
            SHIP_TO_ZIP,
            SHIP_FROM_ADDRESS1,
            SHIP_FROM_ADDRESS2,
            SHIP_FROM_CITY,
            SHIP_FROM_STATE,
            SHIP_FROM_ZIP,
            SHIP_FROM_COUNTRY,
            LINE_ITEM_PRODUCT_NAME,
            LINE_ITEM_PRODUCT_TAX_CODE,
        ] {
            self.register(FieldDefinition::new(name));
        }
    }

    /// Register a field; a second registration under the same name replaces the first
    pub fn register(&mut self, field: FieldDefinition) {
        if let Some(existing) = self.fields.iter_mut().find(|f| f.name == field.name) {
            *existing = field;
        } else {
            self.fields.push(field);
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Required fields in registration order
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Columns of an input header that no field claims
    pub fn unknown_columns<'a>(&self, columns: &'a [String]) -> Vec<&'a str> {
        columns
            .iter()
            .filter(|c| self.get(c).is_none())
            .map(|c| c.as_str())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.fields.len()
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
