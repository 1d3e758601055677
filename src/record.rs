// 🧾 Transaction Record - one purchase line item tied to a parent order
// Built once from a validated row and never mutated afterwards

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// ENUMERATED VALUES
// ============================================================================

/// Closed set of codes accepted for one column.
///
/// Parsing trims and uppercases the raw value before matching `code()`.
pub trait Enumerated: Sized + Copy + 'static {
    /// Column this enumeration belongs to
    const FIELD: &'static str;

    /// Every accepted value, in display order
    const ALL: &'static [Self];

    fn code(&self) -> &'static str;

    fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_uppercase();
        Self::ALL.iter().copied().find(|v| v.code() == normalized)
    }

    fn allowed() -> Vec<&'static str> {
        Self::ALL.iter().map(|v| v.code()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Currency {
    Usd,
    Cad,
    Eur,
    Gbp,
    Aud,
    Mxn,
}

impl Enumerated for Currency {
    const FIELD: &'static str = "currency";
    const ALL: &'static [Self] = &[
        Currency::Usd,
        Currency::Cad,
        Currency::Eur,
        Currency::Gbp,
        Currency::Aud,
        Currency::Mxn,
    ];

    fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Cad => "CAD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Aud => "AUD",
            Currency::Mxn => "MXN",
        }
    }
}

/// Sales channel the order came through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Marketplace {
    Amazon,
    Meta,
    Tiktok,
    Walmart,
    TargetPlus,
    Etsy,
    Ebay,
    Mirakl,
    Macys,
    Alibaba,
    Shop,
}

impl Enumerated for Marketplace {
    const FIELD: &'static str = "transactionMarketplace";
    const ALL: &'static [Self] = &[
        Marketplace::Amazon,
        Marketplace::Meta,
        Marketplace::Tiktok,
        Marketplace::Walmart,
        Marketplace::TargetPlus,
        Marketplace::Etsy,
        Marketplace::Ebay,
        Marketplace::Mirakl,
        Marketplace::Macys,
        Marketplace::Alibaba,
        Marketplace::Shop,
    ];

    fn code(&self) -> &'static str {
        match self {
            Marketplace::Amazon => "AMAZON",
            Marketplace::Meta => "META",
            Marketplace::Tiktok => "TIKTOK",
            Marketplace::Walmart => "WALMART",
            Marketplace::TargetPlus => "TARGET_PLUS",
            Marketplace::Etsy => "ETSY",
            Marketplace::Ebay => "EBAY",
            Marketplace::Mirakl => "MIRAKL",
            Marketplace::Macys => "MACYS",
            Marketplace::Alibaba => "ALIBABA",
            Marketplace::Shop => "SHOP",
        }
    }
}

/// Exempt buyer category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Entity {
    FederalGov,
    StateGov,
    EduPublic,
    NonProfit,
}

impl Enumerated for Entity {
    const FIELD: &'static str = "transactionEntity";
    const ALL: &'static [Self] = &[
        Entity::FederalGov,
        Entity::StateGov,
        Entity::EduPublic,
        Entity::NonProfit,
    ];

    fn code(&self) -> &'static str {
        match self {
            Entity::FederalGov => "FEDERAL_GOV",
            Entity::StateGov => "STATE_GOV",
            Entity::EduPublic => "EDU_PUBLIC",
            Entity::NonProfit => "NON_PROFIT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Purpose {
    Resale,
    BusinessUse,
    PersonalUse,
    RentalUse,
}

impl Enumerated for Purpose {
    const FIELD: &'static str = "transactionPurpose";
    const ALL: &'static [Self] = &[
        Purpose::Resale,
        Purpose::BusinessUse,
        Purpose::PersonalUse,
        Purpose::RentalUse,
    ];

    fn code(&self) -> &'static str {
        match self {
            Purpose::Resale => "RESALE",
            Purpose::BusinessUse => "BUSINESS_USE",
            Purpose::PersonalUse => "PERSONAL_USE",
            Purpose::RentalUse => "RENTAL_USE",
        }
    }
}

/// `transactionRecalculateTax`, written as `TRUE` / `FALSE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxFlag {
    True,
    False,
}

impl TaxFlag {
    pub fn as_bool(&self) -> bool {
        matches!(self, TaxFlag::True)
    }
}

impl Enumerated for TaxFlag {
    const FIELD: &'static str = "transactionRecalculateTax";
    const ALL: &'static [Self] = &[TaxFlag::True, TaxFlag::False];

    fn code(&self) -> &'static str {
        match self {
            TaxFlag::True => "TRUE",
            TaxFlag::False => "FALSE",
        }
    }
}

// ============================================================================
// TRANSACTION RECORD
// ============================================================================

/// A validated, normalized transaction line item.
///
/// Field names serialize in the same camelCase as the input columns so a
/// valid record can be written back out in the shape it came in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    // ========================================================================
    // IDENTITY
    // ========================================================================
    pub transaction_id: String,
    pub transaction_parent_id: Option<String>,
    pub transaction_date: NaiveDate,

    // ========================================================================
    // MONETARY
    // ========================================================================
    pub transaction_total: f64,
    pub transaction_subtotal: f64,
    pub transaction_tax: f64,
    pub transaction_shipping_handling: f64,
    pub transaction_discount: f64,
    pub currency: Currency,

    // ========================================================================
    // CLASSIFICATION
    // ========================================================================
    pub transaction_marketplace: Option<Marketplace>,
    pub transaction_entity: Option<Entity>,
    pub transaction_purpose: Option<Purpose>,
    pub transaction_recalculate_tax: Option<TaxFlag>,

    // ========================================================================
    // SHIPPING
    // ========================================================================
    pub ship_to_address1: Option<String>,
    pub ship_to_address2: Option<String>,
    pub ship_to_city: Option<String>,
    pub ship_to_state: Option<String>,
    pub ship_to_zip: Option<String>,
    pub ship_to_country: String,

    pub ship_from_address1: Option<String>,
    pub ship_from_address2: Option<String>,
    pub ship_from_city: Option<String>,
    pub ship_from_state: Option<String>,
    pub ship_from_zip: Option<String>,
    pub ship_from_country: Option<String>,

    // ========================================================================
    // LINE ITEM
    // ========================================================================
    pub line_item_id: String,
    pub line_item_amount: f64,
    pub line_item_quantity: i64,
    pub line_item_discount: f64,
    pub line_item_shipping_handling: f64,
    pub line_item_product_name: Option<String>,
    pub line_item_product_tax_code: Option<String>,
}

impl TransactionRecord {
    /// subtotal + shipping + tax - discount
    pub fn computed_total(&self) -> f64 {
        self.transaction_subtotal + self.transaction_shipping_handling + self.transaction_tax
            - self.transaction_discount
    }
}

// ============================================================================
// TESTS
// ============================================================================
