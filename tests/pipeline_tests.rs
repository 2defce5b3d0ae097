//! # Pipeline Tests
//!
//! End-to-end tests over the full chain: document → totals → preview →
//! style resolution → raster → page fit → PDF. These pin the documented
//! arithmetic scenarios and the geometry guarantees of the export
//! pipeline.

use folio::document::{
    totals, DeliveryOrder, Document, DocumentKind, DraftStore, Invoice, InvoiceItem, PurchaseOrder,
};
use folio::export::{self, pagefit};
use folio::notify::RecordingNotifier;
use folio::preview::{self, style};
use folio::render;
use folio::session::EditorSession;
use folio::{actions, FolioError};
use pretty_assertions::assert_eq;

/// Invoice from the documented scenario: items (2,10,5), (1,100,0),
/// (5,3,10), discount 2.
fn scenario_invoice() -> Invoice {
    let mut invoice = Invoice::default();
    invoice.bill_to.name = "Gulf Trading Est.".to_string();
    invoice.items.clear();
    for (i, (q, p, t)) in [(2.0, 10.0, 5.0), (1.0, 100.0, 0.0), (5.0, 3.0, 10.0)]
        .into_iter()
        .enumerate()
    {
        let mut item = InvoiceItem::new(i);
        item.description = format!("Item {}", i + 1);
        item.quantity = q;
        item.unit_price = p;
        item.tax_rate = t;
        item.recompute();
        invoice.items.push(item);
    }
    invoice.discount = 2.0;
    invoice
}

#[test]
fn scenario_totals_flow_through_the_preview() {
    let invoice = scenario_invoice();
    let t = totals::invoice_totals(&invoice.items, invoice.discount);
    assert_eq!(t.subtotal, 135.0);
    assert_eq!(t.total_tax, 2.5);
    assert_eq!(t.grand_total, 135.5);

    let tree = preview::build(&Document::Invoice(invoice));
    assert!(tree.contains_text("135.000"));
    assert!(tree.contains_text("2.500"));
    assert!(tree.contains_text("135.500"));
}

#[test]
fn scenario_invoice_exports_to_a_fitting_pdf() {
    let document = Document::Invoice(scenario_invoice());
    let tree = preview::build(&document);
    let resolved = style::resolve(&tree, &style::Theme::default());
    let artifact = export::export_resolved(&document, &resolved, None).unwrap();

    assert!(artifact.bytes.starts_with(b"%PDF"));
    assert!(artifact.placement.width_mm <= pagefit::PAGE_WIDTH_MM);
    assert!(artifact.placement.height_mm <= pagefit::PAGE_HEIGHT_MM);
    assert_eq!(artifact.placement.y_mm, 0.0);
}

#[test]
fn scenario_purchase_order_document_level_tax() {
    let mut po = PurchaseOrder::default();
    po.supplier.name = "Al Noor Supplies".to_string();
    po.items[0].description = "Steel pipe".to_string();
    po.items[0].quantity = 8.0;
    po.items[0].unit_price = 25.0;
    po.vat_percent = 5.0;

    let t = totals::order_totals(&po.items, po.vat_percent);
    assert_eq!(t.subtotal, 200.0);
    assert_eq!(t.total_tax, 10.0);
    assert_eq!(t.grand_total, 210.0);

    let document = Document::PurchaseOrder(po);
    let tree = preview::build(&document);
    assert!(tree.contains_text("210.000"));

    let resolved = style::resolve(&tree, &style::Theme::default());
    let artifact = export::export_resolved(&document, &resolved, None).unwrap();
    assert_eq!(artifact.file_name, "PO-draft.pdf");
}

#[test]
fn export_with_detached_preview_fails_cleanly() {
    let mut session = EditorSession::with_document(Document::Invoice(scenario_invoice()));
    session.detach_preview();
    let mut notifier = RecordingNotifier::new();

    let err = actions::download_pdf(&mut session, &style::Theme::default(), None, &mut notifier)
        .unwrap_err();
    assert!(matches!(err, FolioError::PreviewNotFound));
    // No file is produced and the user is notified exactly once.
    assert_eq!(notifier.notifications.len(), 1);
    assert_eq!(notifier.errors().len(), 1);

    // Re-attaching makes export work again.
    session.attach_preview();
    let mut notifier = RecordingNotifier::new();
    let artifact =
        actions::download_pdf(&mut session, &style::Theme::default(), None, &mut notifier).unwrap();
    assert!(artifact.bytes.starts_with(b"%PDF"));
}

#[test]
fn edits_keep_totals_and_preview_in_sync() {
    let mut session = EditorSession::new(DocumentKind::Invoice);
    let id = match session.document() {
        Document::Invoice(inv) => inv.items[0].id,
        _ => unreachable!(),
    };
    session.set_item_quantity(id, "3");
    session.set_item_unit_price(id, "11.5");
    session.set_discount(id.to_string().as_str()); // invalid → coerced to 0

    let preview = session.preview().unwrap();
    assert!(preview.contains_text("34.500"));

    match session.document() {
        Document::Invoice(inv) => assert_eq!(inv.discount, 0.0),
        _ => unreachable!(),
    }
}

#[test]
fn letterhead_band_makes_the_raster_differ() {
    let document = Document::Invoice(scenario_invoice());
    let tree = preview::build(&document);
    let resolved = style::resolve(&tree, &style::Theme::default());

    let plain = render::render_preview(&resolved, None);
    let banner = image::RgbImage::from_pixel(800, 200, image::Rgb([40, 60, 160]));
    let with_letterhead = render::render_preview(&resolved, Some(&banner));

    assert_eq!(plain.width(), with_letterhead.width());
    assert_ne!(plain.as_raw(), with_letterhead.as_raw());
}

#[test]
fn draft_snapshot_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let drafts = DraftStore::new(dir.path());

    let mut d = DeliveryOrder::default();
    d.deliver_to.name = "Seeb Warehouse".to_string();
    d.items[0].description = "Pallets".to_string();
    d.items[0].quantity = 12.0;
    d.items[0].unit = "pcs".to_string();
    drafts.save(&Document::DeliveryOrder(d)).unwrap();

    let restored = drafts.load(DocumentKind::DeliveryOrder).unwrap().unwrap();
    let session = EditorSession::with_document(restored);
    assert!(session.preview().unwrap().contains_text("Seeb Warehouse"));
    assert!(session.preview().unwrap().contains_text("Pallets"));
}

#[test]
fn negative_grand_total_survives_the_whole_pipeline() {
    let mut invoice = scenario_invoice();
    invoice.discount = 500.0;

    let t = totals::invoice_totals(&invoice.items, invoice.discount);
    assert_eq!(t.grand_total, -362.5);

    // The preview prints the negative figure as-is; no clamping anywhere.
    let tree = preview::build(&Document::Invoice(invoice));
    assert!(tree.contains_text("-362.500"));
}

#[test]
fn print_and_download_share_identical_geometry() {
    let document = Document::Invoice(scenario_invoice());
    let tree = preview::build(&document);
    let resolved = style::resolve(&tree, &style::Theme::default());
    let raster = render::render_preview(&resolved, None);

    let download = pagefit::fit_to_page(raster.width(), raster.height());
    let print = pagefit::fit_to_page(raster.width(), raster.height());
    assert_eq!(download, print);

    // The on-screen print transform mirrors the same zoom constant.
    let layout = pagefit::print_layout();
    assert_eq!(layout.scale, pagefit::ZOOM_FACTOR);
    assert!((layout.container_width_mm * layout.scale - pagefit::PAGE_WIDTH_MM).abs() < 1e-3);
}
