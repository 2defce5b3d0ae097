//! # Preview Tree
//!
//! The document's on-screen representation, as data. [`build`] maps a
//! [`Document`](crate::document::Document) to an ordered sequence of
//! blocks — letterhead band, meta panel, party panels, item table, totals,
//! notes, footer — mirroring exactly what the printed page shows.
//!
//! ## Architecture
//!
//! ```text
//! Document → build() → PreviewTree → style::resolve() → ResolvedPreview
//!                                                            ↓
//!                                                  render::Rasterizer
//! ```
//!
//! Blocks carry *content only*. Colors live in the
//! [`style`](crate::preview::style) module: the rasterizer never sees a
//! theme, only a style-inlined [`ResolvedPreview`](style::ResolvedPreview).
//!
//! Monetary cells are formatted here (and nowhere later), so the preview,
//! the export raster and a persisted snapshot all show identical strings.

pub mod style;

pub use style::{ResolvedBlock, ResolvedPreview, Theme};

use crate::document::{totals, Document};

/// Horizontal alignment of a table cell or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Visual weight of a party-panel line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Bold primary ink (names, phone numbers).
    Primary,
    /// Secondary ink (addresses, emails).
    Muted,
    /// Placeholder ink ("No billing information provided").
    Placeholder,
}

/// One labeled cell in the meta panel ("Invoice Number:" / value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaCell {
    pub label: String,
    pub value: String,
}

impl MetaCell {
    fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

/// A counterparty block: heading plus toned lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyBlock {
    pub heading: String,
    pub lines: Vec<(Tone, String)>,
}

/// An item-table column definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub title: String,
    pub align: Align,
    /// Fraction of the table width, all columns summing to 1.0.
    pub width: f32,
}

impl Column {
    fn new(title: &str, align: Align, width: f32) -> Self {
        Self {
            title: title.to_string(),
            align,
            width,
        }
    }
}

/// One item-table cell. Alignment follows the column; `emphasis` renders
/// bold (the derived total column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellText {
    pub text: String,
    pub emphasis: bool,
}

impl CellText {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: false,
        }
    }

    fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: true,
        }
    }
}

/// Kind of a totals-panel line, which selects its paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsLineKind {
    /// Plain entry row (subtotal, tax).
    Entry,
    /// Discount row, rendered in the danger ink.
    Discount,
    /// Grand total row, rendered as the highlighted band.
    Grand,
}

/// A label/value line in the totals panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalsLine {
    pub label: String,
    pub value: String,
    pub kind: TotalsLineKind,
}

impl TotalsLine {
    fn new(kind: TotalsLineKind, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            kind,
        }
    }
}

/// One block of the preview, in paint order.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Letterhead band at the top of the page: the letterhead image
    /// asset, or the document-type title when no asset is configured.
    Letterhead { title: String },
    /// Highlighted panel of labeled header fields, up to three per row.
    MetaPanel { rows: Vec<Vec<MetaCell>> },
    /// Bordered panel of counterparty blocks, two columns wide.
    PartyPanel { parties: Vec<PartyBlock> },
    /// The line-item table.
    ItemTable {
        columns: Vec<Column>,
        rows: Vec<Vec<CellText>>,
    },
    /// Right-aligned totals box.
    TotalsPanel { lines: Vec<TotalsLine> },
    /// Bordered free-text panel (notes, terms). Body preserves newlines.
    NotePanel { title: String, body: String },
    /// Centered footer lines above nothing but the page edge.
    Footer { lines: Vec<String> },
    /// Signature boxes with ruled lines.
    SignatureRow { labels: Vec<String> },
}

/// The complete preview: blocks in paint order.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewTree {
    pub blocks: Vec<Block>,
}

impl PreviewTree {
    /// Whether any text in the tree contains `needle`. Test helper and
    /// cheap sanity check; not used for layout.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.blocks.iter().any(|block| match block {
            Block::Letterhead { title } => title.contains(needle),
            Block::MetaPanel { rows } => rows
                .iter()
                .flatten()
                .any(|c| c.label.contains(needle) || c.value.contains(needle)),
            Block::PartyPanel { parties } => parties.iter().any(|p| {
                p.heading.contains(needle) || p.lines.iter().any(|(_, l)| l.contains(needle))
            }),
            Block::ItemTable { columns, rows } => {
                columns.iter().any(|c| c.title.contains(needle))
                    || rows.iter().flatten().any(|c| c.text.contains(needle))
            }
            Block::TotalsPanel { lines } => lines
                .iter()
                .any(|l| l.label.contains(needle) || l.value.contains(needle)),
            Block::NotePanel { title, body } => title.contains(needle) || body.contains(needle),
            Block::Footer { lines } => lines.iter().any(|l| l.contains(needle)),
            Block::SignatureRow { labels } => labels.iter().any(|l| l.contains(needle)),
        })
    }
}

/// Build the preview tree for a document. Totals are derived fresh from
/// the current items — never read from a cache.
pub fn build(document: &Document) -> PreviewTree {
    match document {
        Document::Invoice(inv) => build_invoice(inv),
        Document::PurchaseOrder(po) => build_purchase_order(po),
        Document::DeliveryOrder(d) => build_delivery_order(d),
    }
}

fn build_invoice(inv: &crate::document::Invoice) -> PreviewTree {
    let mut blocks = vec![Block::Letterhead {
        title: "Invoice".to_string(),
    }];

    // Header fields
    let mut rows = vec![vec![
        MetaCell::new("Invoice Number:", &inv.number),
        MetaCell::new("Invoice Date:", inv.invoice_date.to_string()),
        MetaCell::new("Due Date:", inv.due_date.to_string()),
    ]];
    if !inv.customer_number.is_empty()
        || !inv.order_reference.is_empty()
        || !inv.payment_terms.is_empty()
    {
        let mut second = Vec::new();
        if !inv.customer_number.is_empty() {
            second.push(MetaCell::new("Customer No:", &inv.customer_number));
        }
        if !inv.order_reference.is_empty() {
            second.push(MetaCell::new("PO Number:", &inv.order_reference));
        }
        second.push(MetaCell::new("Payment Terms:", &inv.payment_terms));
        rows.push(second);
    }
    blocks.push(Block::MetaPanel { rows });

    // Counterparties
    let mut bill_to = PartyBlock {
        heading: "Bill To".to_string(),
        lines: Vec::new(),
    };
    if inv.bill_to.name.is_empty() {
        bill_to
            .lines
            .push((Tone::Placeholder, "No billing information provided".into()));
    } else {
        bill_to.lines.push((Tone::Primary, inv.bill_to.name.clone()));
        if !inv.bill_to.address.is_empty() {
            bill_to.lines.push((Tone::Muted, inv.bill_to.address.clone()));
        }
        if !inv.bill_to.city.is_empty() {
            bill_to.lines.push((Tone::Muted, inv.bill_to.city.clone()));
        }
        if !inv.bill_to.phone.is_empty() {
            bill_to
                .lines
                .push((Tone::Primary, format!("Tel: {}", inv.bill_to.phone)));
        }
        if !inv.bill_to.email.is_empty() {
            bill_to.lines.push((Tone::Muted, inv.bill_to.email.clone()));
        }
    }
    let mut parties = vec![bill_to];
    if !inv.ship_to.name.is_empty() || !inv.ship_to.address.is_empty() || !inv.ship_to.city.is_empty()
    {
        let mut ship_to = PartyBlock {
            heading: "Ship To".to_string(),
            lines: Vec::new(),
        };
        if !inv.ship_to.name.is_empty() {
            ship_to.lines.push((Tone::Primary, inv.ship_to.name.clone()));
        }
        if !inv.ship_to.address.is_empty() {
            ship_to.lines.push((Tone::Muted, inv.ship_to.address.clone()));
        }
        if !inv.ship_to.city.is_empty() {
            ship_to.lines.push((Tone::Muted, inv.ship_to.city.clone()));
        }
        parties.push(ship_to);
    }
    blocks.push(Block::PartyPanel { parties });

    // Items
    let columns = vec![
        Column::new("Item No", Align::Left, 0.14),
        Column::new("Description", Align::Left, 0.34),
        Column::new("Qty", Align::Right, 0.10),
        Column::new("Unit Price", Align::Right, 0.16),
        Column::new("Tax %", Align::Right, 0.10),
        Column::new("Total", Align::Right, 0.16),
    ];
    let rows = inv
        .items
        .iter()
        .map(|item| {
            vec![
                CellText::plain(&item.item_no),
                CellText::plain(&item.description),
                CellText::plain(item.quantity.to_string()),
                CellText::plain(totals::format_amount(item.unit_price)),
                CellText::plain(format!("{}%", totals::format_rate(item.tax_rate))),
                CellText::bold(totals::format_amount(item.line_total)),
            ]
        })
        .collect();
    blocks.push(Block::ItemTable { columns, rows });

    // Totals, derived fresh
    let t = totals::invoice_totals(&inv.items, inv.discount);
    let mut lines = vec![
        TotalsLine::new(
            TotalsLineKind::Entry,
            "Subtotal:",
            format!("{} {}", inv.currency, totals::format_amount(t.subtotal)),
        ),
        TotalsLine::new(
            TotalsLineKind::Entry,
            "VAT/Tax Amount:",
            format!("{} {}", inv.currency, totals::format_amount(t.total_tax)),
        ),
    ];
    if inv.discount > 0.0 {
        lines.push(TotalsLine::new(
            TotalsLineKind::Discount,
            "Discount:",
            format!("-{} {}", inv.currency, totals::format_amount(inv.discount)),
        ));
    }
    lines.push(TotalsLine::new(
        TotalsLineKind::Grand,
        "Grand Total:",
        format!("{} {}", inv.currency, totals::format_amount(t.grand_total)),
    ));
    blocks.push(Block::TotalsPanel { lines });

    if !inv.notes.is_empty() {
        blocks.push(Block::NotePanel {
            title: "Notes / Terms & Conditions:".to_string(),
            body: inv.notes.clone(),
        });
    }

    blocks.push(Block::Footer {
        lines: vec![
            "Thank you for your business!".to_string(),
            "If you have any questions regarding this invoice, please contact us.".to_string(),
        ],
    });

    PreviewTree { blocks }
}

fn build_purchase_order(po: &crate::document::PurchaseOrder) -> PreviewTree {
    let mut blocks = vec![Block::Letterhead {
        title: "Purchase Order".to_string(),
    }];

    blocks.push(Block::MetaPanel {
        rows: vec![vec![
            MetaCell::new("PO Number:", &po.number),
            MetaCell::new("PO Date:", po.date.to_string()),
            MetaCell::new("Delivery Location:", &po.delivery_location),
        ]],
    });

    let mut supplier = PartyBlock {
        heading: "Supplier".to_string(),
        lines: vec![(Tone::Primary, po.supplier.name.clone())],
    };
    if !po.supplier.address.is_empty() {
        supplier.lines.push((Tone::Muted, po.supplier.address.clone()));
    }
    blocks.push(Block::PartyPanel {
        parties: vec![supplier],
    });

    let columns = vec![
        Column::new("Description", Align::Left, 0.46),
        Column::new("Qty", Align::Right, 0.12),
        Column::new("Unit Price", Align::Right, 0.20),
        Column::new("Total", Align::Right, 0.22),
    ];
    let rows = po
        .items
        .iter()
        .map(|item| {
            vec![
                CellText::plain(&item.description),
                CellText::plain(item.quantity.to_string()),
                CellText::plain(totals::format_amount(item.unit_price)),
                CellText::bold(totals::format_amount(item.quantity * item.unit_price)),
            ]
        })
        .collect();
    blocks.push(Block::ItemTable { columns, rows });

    let t = totals::order_totals(&po.items, po.vat_percent);
    blocks.push(Block::TotalsPanel {
        lines: vec![
            TotalsLine::new(
                TotalsLineKind::Entry,
                "Subtotal:",
                totals::format_amount(t.subtotal),
            ),
            TotalsLine::new(
                TotalsLineKind::Entry,
                format!("VAT/Tax ({}%):", po.vat_percent),
                totals::format_amount(t.total_tax),
            ),
            TotalsLine::new(
                TotalsLineKind::Grand,
                "Grand Total:",
                totals::format_amount(t.grand_total),
            ),
        ],
    });

    if !po.terms.is_empty() {
        blocks.push(Block::NotePanel {
            title: "Terms & Conditions:".to_string(),
            body: po.terms.clone(),
        });
    }

    blocks.push(Block::SignatureRow {
        labels: vec!["Prepared By".to_string(), "Authorized Signature".to_string()],
    });

    PreviewTree { blocks }
}

fn build_delivery_order(d: &crate::document::DeliveryOrder) -> PreviewTree {
    let mut blocks = vec![Block::Letterhead {
        title: "Delivery Order".to_string(),
    }];

    blocks.push(Block::MetaPanel {
        rows: vec![vec![
            MetaCell::new("DO Number:", &d.number),
            MetaCell::new("DO Date:", d.date.to_string()),
            MetaCell::new("Reference:", &d.reference_invoice),
        ]],
    });

    let mut deliver_to = PartyBlock {
        heading: "Deliver To".to_string(),
        lines: vec![(Tone::Primary, d.deliver_to.name.clone())],
    };
    if !d.deliver_to.address.is_empty() {
        deliver_to
            .lines
            .push((Tone::Muted, d.deliver_to.address.clone()));
    }
    blocks.push(Block::PartyPanel {
        parties: vec![deliver_to],
    });

    let columns = vec![
        Column::new("Description", Align::Left, 0.40),
        Column::new("Qty", Align::Right, 0.12),
        Column::new("Unit", Align::Left, 0.16),
        Column::new("Notes", Align::Left, 0.32),
    ];
    let rows = d
        .items
        .iter()
        .map(|item| {
            vec![
                CellText::plain(&item.description),
                CellText::plain(item.quantity.to_string()),
                CellText::plain(&item.unit),
                CellText::plain(&item.remarks),
            ]
        })
        .collect();
    blocks.push(Block::ItemTable { columns, rows });

    if !d.notes.is_empty() {
        blocks.push(Block::NotePanel {
            title: "Notes / Remarks:".to_string(),
            body: d.notes.clone(),
        });
    }

    blocks.push(Block::SignatureRow {
        labels: vec!["Prepared By".to_string(), "Authorized Signature".to_string()],
    });

    PreviewTree { blocks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentKind, Invoice, PurchaseOrder};

    #[test]
    fn test_invoice_preview_shows_derived_totals() {
        let mut inv = Invoice::default();
        inv.items[0].quantity = 2.0;
        inv.items[0].unit_price = 10.0;
        inv.items[0].tax_rate = 5.0;
        inv.items[0].recompute();
        inv.discount = 2.0;
        let tree = build(&Document::Invoice(inv));
        assert!(tree.contains_text("20.000")); // subtotal
        assert!(tree.contains_text("1.000")); // tax
        assert!(tree.contains_text("19.000")); // grand total after discount
    }

    #[test]
    fn test_discount_row_only_when_positive() {
        let tree = build(&Document::new(DocumentKind::Invoice));
        assert!(!tree.contains_text("Discount:"));

        let mut inv = Invoice::default();
        inv.discount = 5.0;
        let tree = build(&Document::Invoice(inv));
        assert!(tree.contains_text("Discount:"));
        assert!(tree.contains_text("-OMR 5.000"));
    }

    #[test]
    fn test_missing_bill_to_shows_placeholder() {
        let tree = build(&Document::new(DocumentKind::Invoice));
        assert!(tree.contains_text("No billing information provided"));
    }

    #[test]
    fn test_purchase_order_vat_label_includes_rate() {
        let mut po = PurchaseOrder::default();
        po.vat_percent = 5.0;
        po.items[0].quantity = 4.0;
        po.items[0].unit_price = 50.0;
        let tree = build(&Document::PurchaseOrder(po));
        assert!(tree.contains_text("VAT/Tax (5%):"));
        assert!(tree.contains_text("210.000"));
    }

    #[test]
    fn test_delivery_order_has_no_totals_panel() {
        let tree = build(&Document::new(DocumentKind::DeliveryOrder));
        assert!(!tree
            .blocks
            .iter()
            .any(|b| matches!(b, Block::TotalsPanel { .. })));
        assert!(tree
            .blocks
            .iter()
            .any(|b| matches!(b, Block::SignatureRow { .. })));
    }

    #[test]
    fn test_row_order_follows_item_order() {
        let mut inv = Invoice::default();
        inv.items[0].description = "first".into();
        let mut second = crate::document::InvoiceItem::new(1);
        second.description = "second".into();
        inv.items.push(second);
        let tree = build(&Document::Invoice(inv));
        let rows = tree
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::ItemTable { rows, .. } => Some(rows),
                _ => None,
            })
            .unwrap();
        assert_eq!(rows[0][1].text, "first");
        assert_eq!(rows[1][1].text, "second");
    }
}
