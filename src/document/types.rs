//! Struct types for the unified document model.
//!
//! All types derive `Serialize + Deserialize` so the same types work for
//! both Rust API construction and JSON deserialization. Every field has a
//! serde default, so a form can submit only what the user touched.
//!
//! Dates are `NaiveDate` (the form's date inputs carry no timezone) and
//! money is `f64`: full precision is kept internally, rounding happens only
//! in [`super::totals::format_amount`].

use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::totals;

/// Currencies offered by the invoice editor, with display names.
pub const CURRENCIES: &[(&str, &str)] = &[
    ("OMR", "Omani Rial"),
    ("USD", "US Dollar"),
    ("EUR", "Euro"),
    ("GBP", "Pound"),
    ("AED", "Dirham"),
    ("SAR", "Saudi Riyal"),
];

/// Payment terms offered by the invoice editor.
pub const PAYMENT_TERMS: &[&str] = &[
    "Cash",
    "Credit Card",
    "Bank Transfer",
    "Cheque",
    "Net 30",
];

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn in_thirty_days() -> NaiveDate {
    today() + Duration::days(30)
}

fn default_true() -> bool {
    true
}

fn default_quantity() -> f64 {
    1.0
}

fn default_currency() -> String {
    "OMR".to_string()
}

fn default_payment_terms() -> String {
    "Credit Card".to_string()
}

fn new_id() -> Uuid {
    Uuid::new_v4()
}

// ============================================================================
// PARTIES
// ============================================================================

/// A counterparty block (bill-to, ship-to, supplier, deliver-to).
///
/// Unused fields stay empty; the preview only prints what is filled in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Party {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

impl Party {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.address.is_empty()
            && self.city.is_empty()
            && self.phone.is_empty()
            && self.email.is_empty()
    }
}

// ============================================================================
// LINE ITEMS
// ============================================================================

/// Invoice line item with per-line tax.
///
/// `line_total` is derived and recomputed on every quantity/price/tax edit
/// through [`InvoiceItem::recompute`]; it is serialized so persisted
/// snapshots match what the user saw, but it is never trusted as an input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItem {
    #[serde(default = "new_id")]
    pub id: Uuid,
    #[serde(default)]
    pub item_no: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default)]
    pub unit_price: f64,
    /// Tax rate in percent, 0–100.
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default)]
    pub line_total: f64,
}

impl InvoiceItem {
    /// New empty item at the given zero-based position.
    ///
    /// Item numbers step by ten (`000010`, `000020`, ...), leaving room to
    /// renumber inserted rows by hand.
    pub fn new(position: usize) -> Self {
        Self {
            id: new_id(),
            item_no: format!("{:06}", (position + 1) * 10),
            description: String::new(),
            quantity: 1.0,
            unit_price: 0.0,
            tax_rate: 0.0,
            line_total: 0.0,
        }
    }

    /// Recompute the derived line total from the current fields.
    pub fn recompute(&mut self) {
        self.line_total = totals::line_total(self.quantity, self.unit_price, self.tax_rate);
    }
}

/// Purchase order line item. Tax is document-level (`vat_percent`), so the
/// item itself carries no rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default = "new_id")]
    pub id: Uuid,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default)]
    pub unit_price: f64,
}

impl OrderItem {
    pub fn new() -> Self {
        Self {
            id: new_id(),
            description: String::new(),
            quantity: 1.0,
            unit_price: 0.0,
        }
    }
}

impl Default for OrderItem {
    fn default() -> Self {
        Self::new()
    }
}

/// Delivery order line item. No monetary fields at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryItem {
    #[serde(default = "new_id")]
    pub id: Uuid,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    /// Unit of measure, free text ("pcs", "box").
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub remarks: String,
}

impl DeliveryItem {
    pub fn new() -> Self {
        Self {
            id: new_id(),
            description: String::new(),
            quantity: 1.0,
            unit: String::new(),
            remarks: String::new(),
        }
    }
}

impl Default for DeliveryItem {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// DOCUMENT VARIANTS
// ============================================================================

/// An invoice: per-line tax, bill-to/ship-to parties, flat discount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(default)]
    pub number: String,
    /// When true, the number is provisional until a save reserves one.
    #[serde(default = "default_true")]
    pub auto_number: bool,
    /// Set once a save has obtained a reserved number from the
    /// numbering collaborator.
    #[serde(default)]
    pub number_reserved: bool,
    #[serde(default = "today")]
    pub invoice_date: NaiveDate,
    #[serde(default = "in_thirty_days")]
    pub due_date: NaiveDate,
    #[serde(default)]
    pub customer_number: String,
    /// Customer's purchase order reference, if any.
    #[serde(default)]
    pub order_reference: String,
    #[serde(default)]
    pub bill_to: Party,
    #[serde(default)]
    pub ship_to: Party,
    #[serde(default = "default_invoice_items")]
    pub items: Vec<InvoiceItem>,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Flat document-level discount in currency units. Not validated
    /// against the total; a discount larger than subtotal + tax yields a
    /// negative grand total.
    #[serde(default)]
    pub discount: f64,
    #[serde(default = "default_payment_terms")]
    pub payment_terms: String,
    #[serde(default)]
    pub notes: String,
}

fn default_invoice_items() -> Vec<InvoiceItem> {
    vec![InvoiceItem::new(0)]
}

impl Default for Invoice {
    fn default() -> Self {
        Self {
            number: String::new(),
            auto_number: true,
            number_reserved: false,
            invoice_date: today(),
            due_date: in_thirty_days(),
            customer_number: String::new(),
            order_reference: String::new(),
            bill_to: Party::default(),
            ship_to: Party::default(),
            items: default_invoice_items(),
            currency: default_currency(),
            discount: 0.0,
            payment_terms: default_payment_terms(),
            notes: String::new(),
        }
    }
}

/// A purchase order: document-level VAT, supplier party, terms block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    #[serde(default)]
    pub number: String,
    #[serde(default = "default_true")]
    pub auto_number: bool,
    #[serde(default = "today")]
    pub date: NaiveDate,
    #[serde(default)]
    pub supplier: Party,
    #[serde(default)]
    pub delivery_location: String,
    #[serde(default = "default_order_items")]
    pub items: Vec<OrderItem>,
    /// Document-level tax in percent, applied once to the subtotal.
    #[serde(default)]
    pub vat_percent: f64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub terms: String,
}

fn default_order_items() -> Vec<OrderItem> {
    vec![OrderItem::new()]
}

impl Default for PurchaseOrder {
    fn default() -> Self {
        Self {
            number: String::new(),
            auto_number: true,
            date: today(),
            supplier: Party::default(),
            delivery_location: String::new(),
            items: default_order_items(),
            vat_percent: 0.0,
            notes: String::new(),
            terms: String::new(),
        }
    }
}

/// A delivery order: goods movement only, no monetary columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryOrder {
    #[serde(default)]
    pub number: String,
    #[serde(default = "default_true")]
    pub auto_number: bool,
    #[serde(default = "today")]
    pub date: NaiveDate,
    #[serde(default)]
    pub deliver_to: Party,
    /// Invoice this delivery fulfils, if any.
    #[serde(default)]
    pub reference_invoice: String,
    #[serde(default = "default_delivery_items")]
    pub items: Vec<DeliveryItem>,
    #[serde(default)]
    pub notes: String,
}

fn default_delivery_items() -> Vec<DeliveryItem> {
    vec![DeliveryItem::new()]
}

impl Default for DeliveryOrder {
    fn default() -> Self {
        Self {
            number: String::new(),
            auto_number: true,
            date: today(),
            deliver_to: Party::default(),
            reference_invoice: String::new(),
            items: default_delivery_items(),
            notes: String::new(),
        }
    }
}
