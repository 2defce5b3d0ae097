//! # Editor Session
//!
//! Owned state for one document-editing session. The session is the single
//! source of truth for both the editor and the live preview: every
//! mutation funnels through [`EditorSession::update`], which recomputes
//! derived line totals and rebuilds the preview tree synchronously. There
//! is no observer system — the preview is the only downstream consumer.
//!
//! The session also enforces at-most-one-in-flight semantics for save and
//! export: a busy marker refuses duplicate triggering while an operation
//! runs, the same way the editor disables its buttons.

use uuid::Uuid;

use crate::document::{
    totals, DeliveryItem, Document, DocumentKind, InvoiceItem, OrderItem, provisional_number,
};
use crate::error::FolioError;
use crate::preview::{self, PreviewTree};

/// Owned editing state: the document, its live preview, and the busy
/// marker for in-flight operations.
pub struct EditorSession {
    document: Document,
    preview: Option<PreviewTree>,
    busy: Option<String>,
}

impl EditorSession {
    /// Start a fresh session for a document kind.
    ///
    /// Invoices get a provisional number immediately (reserved numbers are
    /// only requested at save time); purchase and delivery orders start
    /// with an empty number. The preview is attached from the start.
    pub fn new(kind: DocumentKind) -> Self {
        let mut document = Document::new(kind);
        if kind == DocumentKind::Invoice {
            document.set_number(provisional_number(kind));
        }
        let preview = Some(preview::build(&document));
        Self {
            document,
            preview,
            busy: None,
        }
    }

    /// Resume a session from an existing document (a loaded draft or a
    /// stored record being re-opened).
    pub fn with_document(document: Document) -> Self {
        let preview = Some(preview::build(&document));
        Self {
            document,
            preview,
            busy: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn kind(&self) -> DocumentKind {
        self.document.kind()
    }

    // ------------------------------------------------------------------
    // The single mutation entry point
    // ------------------------------------------------------------------

    /// Apply a mutation to the document.
    ///
    /// After the closure runs, derived line totals are recomputed and the
    /// preview (when attached) is rebuilt — synchronously, on every edit,
    /// with no memoization. The preview can never show stale values.
    pub fn update(&mut self, mutation: impl FnOnce(&mut Document)) {
        mutation(&mut self.document);
        self.recompute();
        self.refresh_preview();
    }

    fn recompute(&mut self) {
        if let Document::Invoice(inv) = &mut self.document {
            for item in &mut inv.items {
                item.recompute();
            }
        }
    }

    fn refresh_preview(&mut self) {
        if self.preview.is_some() {
            self.preview = Some(preview::build(&self.document));
        }
    }

    // ------------------------------------------------------------------
    // Line item edits (numeric fields go through input coercion)
    // ------------------------------------------------------------------

    /// Set an item's quantity from raw form input.
    pub fn set_item_quantity(&mut self, id: Uuid, raw: &str) {
        let value = totals::coerce_number(raw);
        self.update(|doc| match doc {
            Document::Invoice(inv) => {
                if let Some(item) = inv.items.iter_mut().find(|i| i.id == id) {
                    item.quantity = value;
                }
            }
            Document::PurchaseOrder(po) => {
                if let Some(item) = po.items.iter_mut().find(|i| i.id == id) {
                    item.quantity = value;
                }
            }
            Document::DeliveryOrder(d) => {
                if let Some(item) = d.items.iter_mut().find(|i| i.id == id) {
                    item.quantity = value;
                }
            }
        });
    }

    /// Set an item's unit price from raw form input. No-op for delivery
    /// orders, which have no monetary columns.
    pub fn set_item_unit_price(&mut self, id: Uuid, raw: &str) {
        let value = totals::coerce_number(raw);
        self.update(|doc| match doc {
            Document::Invoice(inv) => {
                if let Some(item) = inv.items.iter_mut().find(|i| i.id == id) {
                    item.unit_price = value;
                }
            }
            Document::PurchaseOrder(po) => {
                if let Some(item) = po.items.iter_mut().find(|i| i.id == id) {
                    item.unit_price = value;
                }
            }
            Document::DeliveryOrder(_) => {}
        });
    }

    /// Set an invoice item's tax rate from raw form input. No-op for the
    /// document-taxed and untaxed variants.
    pub fn set_item_tax_rate(&mut self, id: Uuid, raw: &str) {
        let value = totals::coerce_number(raw);
        self.update(|doc| {
            if let Document::Invoice(inv) = doc {
                if let Some(item) = inv.items.iter_mut().find(|i| i.id == id) {
                    item.tax_rate = value;
                }
            }
        });
    }

    /// Set the invoice's flat discount from raw form input.
    pub fn set_discount(&mut self, raw: &str) {
        let value = totals::coerce_number(raw);
        self.update(|doc| {
            if let Document::Invoice(inv) = doc {
                inv.discount = value;
            }
        });
    }

    /// Set the purchase order's document-level VAT from raw form input.
    pub fn set_vat_percent(&mut self, raw: &str) {
        let value = totals::coerce_number(raw);
        self.update(|doc| {
            if let Document::PurchaseOrder(po) = doc {
                po.vat_percent = value;
            }
        });
    }

    /// Append a new empty item.
    pub fn add_item(&mut self) {
        self.update(|doc| match doc {
            Document::Invoice(inv) => {
                let position = inv.items.len();
                inv.items.push(InvoiceItem::new(position));
            }
            Document::PurchaseOrder(po) => po.items.push(OrderItem::new()),
            Document::DeliveryOrder(d) => d.items.push(DeliveryItem::new()),
        });
    }

    /// Remove an item by id. Removing the last remaining item is a no-op:
    /// a document always has at least one line.
    pub fn remove_item(&mut self, id: Uuid) {
        self.update(|doc| match doc {
            Document::Invoice(inv) => {
                if inv.items.len() > 1 {
                    inv.items.retain(|i| i.id != id);
                }
            }
            Document::PurchaseOrder(po) => {
                if po.items.len() > 1 {
                    po.items.retain(|i| i.id != id);
                }
            }
            Document::DeliveryOrder(d) => {
                if d.items.len() > 1 {
                    d.items.retain(|i| i.id != id);
                }
            }
        });
    }

    // ------------------------------------------------------------------
    // Numbering edits
    // ------------------------------------------------------------------

    /// Manually enter a document number. Typing a number switches the
    /// session to manual numbering and drops any reservation claim.
    pub fn set_number(&mut self, number: &str) {
        let number = number.to_string();
        self.update(|doc| {
            doc.set_number(number);
            if let Document::Invoice(inv) = doc {
                inv.auto_number = false;
                inv.number_reserved = false;
            }
        });
    }

    /// Toggle automatic numbering. Enabling it issues a fresh provisional
    /// number; disabling keeps the current number for manual editing.
    pub fn set_auto_number(&mut self, enabled: bool) {
        let provisional = provisional_number(self.document.kind());
        self.update(|doc| {
            match doc {
                Document::Invoice(inv) => {
                    inv.auto_number = enabled;
                    inv.number_reserved = false;
                    if enabled {
                        inv.number = provisional;
                    }
                }
                Document::PurchaseOrder(po) => po.auto_number = enabled,
                Document::DeliveryOrder(d) => d.auto_number = enabled,
            };
        });
    }

    /// Discard all edits and start over with editor defaults (and a fresh
    /// provisional number for invoices).
    pub fn reset(&mut self) {
        let kind = self.document.kind();
        let mut document = Document::new(kind);
        if kind == DocumentKind::Invoice {
            document.set_number(provisional_number(kind));
        }
        self.document = document;
        self.recompute();
        self.refresh_preview();
    }

    // ------------------------------------------------------------------
    // Preview handle
    // ------------------------------------------------------------------

    /// The live preview tree, if one is attached.
    pub fn preview(&self) -> Option<&PreviewTree> {
        self.preview.as_ref()
    }

    /// Attach (or re-attach) the live preview.
    pub fn attach_preview(&mut self) {
        self.preview = Some(preview::build(&self.document));
    }

    /// Detach the preview, e.g. while the preview pane is hidden. Export
    /// fails with [`FolioError::PreviewNotFound`] until re-attached.
    pub fn detach_preview(&mut self) {
        self.preview = None;
    }

    // ------------------------------------------------------------------
    // In-flight operation marker
    // ------------------------------------------------------------------

    /// Mark an operation (save, export, print) as in flight.
    ///
    /// Refuses if another operation is already running — the same
    /// at-most-one-in-flight guarantee the editor gets by disabling its
    /// buttons, without a lock.
    pub fn try_begin(&mut self, operation: &str) -> Result<(), FolioError> {
        if let Some(current) = &self.busy {
            return Err(FolioError::Busy(current.clone()));
        }
        self.busy = Some(operation.to_string());
        Ok(())
    }

    /// Mark the in-flight operation as finished (whether it succeeded or
    /// failed).
    pub fn finish(&mut self) {
        self.busy = None;
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Invoice;
    use pretty_assertions::assert_eq;

    fn invoice_session() -> EditorSession {
        EditorSession::new(DocumentKind::Invoice)
    }

    fn first_item_id(session: &EditorSession) -> Uuid {
        match session.document() {
            Document::Invoice(inv) => inv.items[0].id,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_new_invoice_session_has_provisional_number() {
        let session = invoice_session();
        assert!(session.document().number().starts_with("INV-"));
        assert!(session.document().auto_number());
    }

    #[test]
    fn test_edit_recomputes_line_total() {
        let mut session = invoice_session();
        let id = first_item_id(&session);
        session.set_item_quantity(id, "2");
        session.set_item_unit_price(id, "10");
        session.set_item_tax_rate(id, "5");
        match session.document() {
            Document::Invoice(inv) => assert_eq!(inv.items[0].line_total, 21.0),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_invalid_input_coerces_to_zero() {
        let mut session = invoice_session();
        let id = first_item_id(&session);
        session.set_item_unit_price(id, "10");
        session.set_item_quantity(id, "not a number");
        match session.document() {
            Document::Invoice(inv) => {
                assert_eq!(inv.items[0].quantity, 0.0);
                assert_eq!(inv.items[0].line_total, 0.0);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_remove_last_item_is_noop() {
        let mut session = invoice_session();
        let id = first_item_id(&session);
        session.remove_item(id);
        assert_eq!(session.document().item_count(), 1);

        session.add_item();
        assert_eq!(session.document().item_count(), 2);
        session.remove_item(id);
        assert_eq!(session.document().item_count(), 1);
        // And once we're back down to one, removal is refused again.
        let remaining = first_item_id(&session);
        session.remove_item(remaining);
        assert_eq!(session.document().item_count(), 1);
    }

    #[test]
    fn test_preview_refreshes_on_edit() {
        let mut session = invoice_session();
        let id = first_item_id(&session);
        session.set_item_unit_price(id, "50");
        let preview = session.preview().expect("preview attached");
        assert!(preview.contains_text("50.000"));
    }

    #[test]
    fn test_typing_a_number_switches_to_manual() {
        let mut session = invoice_session();
        session.set_number("INV-CUSTOM-1");
        assert!(!session.document().auto_number());
        assert_eq!(session.document().number(), "INV-CUSTOM-1");

        session.set_auto_number(true);
        assert!(session.document().auto_number());
        assert!(session.document().number().starts_with("INV-"));
        assert_ne!(session.document().number(), "INV-CUSTOM-1");
    }

    #[test]
    fn test_busy_guard_refuses_duplicates() {
        let mut session = invoice_session();
        session.try_begin("export").unwrap();
        let err = session.try_begin("export").unwrap_err();
        assert!(matches!(err, FolioError::Busy(_)));
        session.finish();
        session.try_begin("save").unwrap();
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut session = EditorSession::with_document(Document::Invoice(Invoice {
            discount: 40.0,
            ..Invoice::default()
        }));
        session.add_item();
        session.reset();
        assert_eq!(session.document().item_count(), 1);
        match session.document() {
            Document::Invoice(inv) => assert_eq!(inv.discount, 0.0),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_vat_edit_applies_to_purchase_order_only() {
        let mut session = invoice_session();
        session.set_vat_percent("5");
        match session.document() {
            Document::Invoice(inv) => assert_eq!(inv.discount, 0.0),
            _ => unreachable!(),
        }

        let mut session = EditorSession::new(DocumentKind::PurchaseOrder);
        session.set_vat_percent("5");
        match session.document() {
            Document::PurchaseOrder(po) => assert_eq!(po.vat_percent, 5.0),
            _ => unreachable!(),
        }
    }
}
