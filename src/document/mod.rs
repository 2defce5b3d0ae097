//! # Unified Document Model
//!
//! A single type hierarchy that is both the Rust API and the JSON API.
//! [`Document`] is constructible in Rust and deserializable from JSON, so
//! the CLI, the HTTP server and tests all work with the same types.
//!
//! ```
//! use folio::document::{Document, Invoice};
//!
//! // Rust construction
//! let doc = Document::Invoice(Invoice::default());
//!
//! // JSON deserialization
//! let doc: Document = serde_json::from_str(
//!     r#"{"kind":"invoice","bill_to":{"name":"Acme LLC"}}"#,
//! ).unwrap();
//!
//! assert_eq!(doc.item_count(), 1);
//! ```
//!
//! Totals are never stored on the document (line totals excepted, which are
//! recomputed on every edit); they are derived fresh by [`totals`] wherever
//! they are consumed.

pub mod draft;
pub mod number;
pub mod totals;
pub mod types;

pub use draft::DraftStore;
pub use number::{NumberingService, provisional_number};
pub use totals::Totals;
pub use types::*;

use serde::{Deserialize, Serialize};

/// The three document variants folio can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Invoice,
    PurchaseOrder,
    DeliveryOrder,
}

impl DocumentKind {
    /// Human-readable label, as shown in page titles.
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "Invoice",
            DocumentKind::PurchaseOrder => "Purchase Order",
            DocumentKind::DeliveryOrder => "Delivery Order",
        }
    }

    /// Prefix used in generated document numbers (`INV-2026-08-042`).
    pub fn number_prefix(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "INV",
            DocumentKind::PurchaseOrder => "PO",
            DocumentKind::DeliveryOrder => "DO",
        }
    }

    /// Prefix used in exported file names (`PO-<number>.pdf`).
    pub fn file_prefix(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "Invoice",
            DocumentKind::PurchaseOrder => "PO",
            DocumentKind::DeliveryOrder => "DO",
        }
    }

    /// Draft storage key, for the kinds that support local drafts.
    ///
    /// Invoices are not drafted: they persist to the document store
    /// instead.
    pub fn draft_key(self) -> Option<&'static str> {
        match self {
            DocumentKind::Invoice => None,
            DocumentKind::PurchaseOrder => Some("po:draft"),
            DocumentKind::DeliveryOrder => Some("do:draft"),
        }
    }
}

/// A document being edited: one of the three variants.
///
/// The `kind` tag makes the JSON self-describing:
/// `{"kind":"purchase_order", ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Document {
    Invoice(Invoice),
    PurchaseOrder(PurchaseOrder),
    DeliveryOrder(DeliveryOrder),
}

impl Document {
    /// Create an empty document of the given kind with editor defaults.
    pub fn new(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Invoice => Document::Invoice(Invoice::default()),
            DocumentKind::PurchaseOrder => Document::PurchaseOrder(PurchaseOrder::default()),
            DocumentKind::DeliveryOrder => Document::DeliveryOrder(DeliveryOrder::default()),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Invoice(_) => DocumentKind::Invoice,
            Document::PurchaseOrder(_) => DocumentKind::PurchaseOrder,
            Document::DeliveryOrder(_) => DocumentKind::DeliveryOrder,
        }
    }

    /// The document number as currently entered (may be empty).
    pub fn number(&self) -> &str {
        match self {
            Document::Invoice(inv) => &inv.number,
            Document::PurchaseOrder(po) => &po.number,
            Document::DeliveryOrder(d) => &d.number,
        }
    }

    pub fn set_number(&mut self, number: impl Into<String>) {
        let number = number.into();
        match self {
            Document::Invoice(inv) => inv.number = number,
            Document::PurchaseOrder(po) => po.number = number,
            Document::DeliveryOrder(d) => d.number = number,
        }
    }

    pub fn auto_number(&self) -> bool {
        match self {
            Document::Invoice(inv) => inv.auto_number,
            Document::PurchaseOrder(po) => po.auto_number,
            Document::DeliveryOrder(d) => d.auto_number,
        }
    }

    /// Number of line items. Always at least 1 for documents built
    /// through the editor session.
    pub fn item_count(&self) -> usize {
        match self {
            Document::Invoice(inv) => inv.items.len(),
            Document::PurchaseOrder(po) => po.items.len(),
            Document::DeliveryOrder(d) => d.items.len(),
        }
    }

    /// Document-level totals, derived fresh from the current items.
    ///
    /// Delivery orders carry no monetary columns and return `None`.
    pub fn totals(&self) -> Option<Totals> {
        match self {
            Document::Invoice(inv) => Some(totals::invoice_totals(&inv.items, inv.discount)),
            Document::PurchaseOrder(po) => Some(totals::order_totals(&po.items, po.vat_percent)),
            Document::DeliveryOrder(_) => None,
        }
    }

    /// Title used for PDF metadata and page headings.
    pub fn title(&self) -> String {
        let number = self.number();
        if number.is_empty() {
            self.kind().label().to_string()
        } else {
            format!("{} {}", self.kind().label(), number)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tagged_json_round_trip() {
        let doc = Document::new(DocumentKind::PurchaseOrder);
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains(r#""kind":"purchase_order""#));
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind(), DocumentKind::PurchaseOrder);
    }

    #[test]
    fn test_new_document_has_one_item() {
        for kind in [
            DocumentKind::Invoice,
            DocumentKind::PurchaseOrder,
            DocumentKind::DeliveryOrder,
        ] {
            assert_eq!(Document::new(kind).item_count(), 1);
        }
    }

    #[test]
    fn test_draft_keys() {
        assert_eq!(DocumentKind::Invoice.draft_key(), None);
        assert_eq!(DocumentKind::PurchaseOrder.draft_key(), Some("po:draft"));
        assert_eq!(DocumentKind::DeliveryOrder.draft_key(), Some("do:draft"));
    }

    #[test]
    fn test_delivery_order_has_no_totals() {
        assert!(Document::new(DocumentKind::DeliveryOrder).totals().is_none());
    }
}
