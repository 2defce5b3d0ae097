//! # User Actions
//!
//! The flows behind the editor's buttons: download PDF, print, and save.
//! Each one runs the busy guard (at-most-one-in-flight per session),
//! performs the operation, and pushes exactly one notification describing
//! the outcome. Failures leave the in-memory document untouched and
//! editable, so the user can simply retry.

use image::RgbImage;

use crate::document::{provisional_number, Document, DocumentKind};
use crate::error::FolioError;
use crate::export::{self, ExportArtifact, PrintSpool};
use crate::notify::{Notification, Notifier};
use crate::preview::style::{self, Theme};
use crate::session::EditorSession;
use crate::storage::{DocumentStore, InvoiceRecord};

/// Build the export artifact for the session's current preview.
///
/// Fails with [`FolioError::PreviewNotFound`] before doing any work when
/// no preview is attached. On failure no artifact exists — there is no
/// partial output to clean up.
fn build_artifact(
    session: &EditorSession,
    theme: &Theme,
    letterhead: Option<&RgbImage>,
) -> Result<ExportArtifact, FolioError> {
    let preview = session.preview().ok_or(FolioError::PreviewNotFound)?;
    let resolved = style::resolve(preview, theme);
    export::export_resolved(session.document(), &resolved, letterhead)
}

/// Download-PDF flow: rasterize the preview and return the artifact.
pub fn download_pdf(
    session: &mut EditorSession,
    theme: &Theme,
    letterhead: Option<&RgbImage>,
    notifier: &mut dyn Notifier,
) -> Result<ExportArtifact, FolioError> {
    session.try_begin("export")?;
    let outcome = build_artifact(session, theme, letterhead);
    session.finish();

    match &outcome {
        Ok(artifact) => notifier.notify(Notification::info(
            "PDF Downloaded",
            format!("{} has been generated successfully.", artifact.file_name),
        )),
        Err(e) => notifier.notify(Notification::error(
            "Export failed",
            format!("Failed to generate PDF: {e}. Please try again."),
        )),
    }
    outcome
}

/// Print flow: the same artifact as the download, submitted to the spool.
pub fn print_document(
    session: &mut EditorSession,
    theme: &Theme,
    letterhead: Option<&RgbImage>,
    spool: &PrintSpool,
    notifier: &mut dyn Notifier,
) -> Result<(), FolioError> {
    session.try_begin("print")?;
    let outcome = build_artifact(session, theme, letterhead)
        .and_then(|artifact| spool.submit(&artifact).map(|_| ()));
    session.finish();

    match &outcome {
        Ok(()) => notifier.notify(Notification::info(
            "Sent to printer",
            "The document was submitted to the print spool.",
        )),
        Err(e) => notifier.notify(Notification::error(
            "Print failed",
            format!("Failed to print: {e}. Please try again."),
        )),
    }
    outcome
}

/// Save flow for invoices: reserve a number (falling back to a
/// provisional one), flatten the document with its computed totals,
/// insert it, and reset the editor for the next invoice.
///
/// A reservation failure is logged and recovered locally — the save still
/// proceeds. A storage failure leaves the in-memory invoice unchanged so
/// the user can retry without re-entering anything.
pub async fn save_invoice(
    session: &mut EditorSession,
    store: &dyn DocumentStore,
    numbering: &dyn crate::document::NumberingService,
    notifier: &mut (dyn Notifier + Send),
) -> Result<String, FolioError> {
    session.try_begin("save")?;
    let outcome = save_invoice_inner(session, store, numbering).await;
    session.finish();

    match &outcome {
        Ok(number) => {
            notifier.notify(Notification::info(
                "Invoice Saved",
                format!("Invoice {number} has been saved successfully."),
            ));
            session.reset();
        }
        Err(e) => notifier.notify(Notification::error(
            "Save failed",
            format!("Failed to save invoice: {e}. Please try again."),
        )),
    }
    outcome
}

async fn save_invoice_inner(
    session: &mut EditorSession,
    store: &dyn DocumentStore,
    numbering: &dyn crate::document::NumberingService,
) -> Result<String, FolioError> {
    let Document::Invoice(invoice) = session.document() else {
        return Err(FolioError::InvalidInput(
            "only invoices are persisted to the store; use drafts for other kinds".to_string(),
        ));
    };
    if invoice.bill_to.name.is_empty() {
        return Err(FolioError::InvalidInput(
            "customer name is required to save the invoice".to_string(),
        ));
    }
    if !invoice.auto_number && invoice.number.is_empty() {
        return Err(FolioError::InvalidInput(
            "an invoice number is required when manual numbering is enabled".to_string(),
        ));
    }

    // Reserve a number if auto-numbering is on and none is reserved yet.
    if invoice.auto_number && !invoice.number_reserved {
        let (number, reserved) = match numbering.reserve(DocumentKind::Invoice).await {
            Ok(number) => (number, true),
            Err(e) => {
                log::warn!("number reservation failed, using provisional number: {e}");
                (provisional_number(DocumentKind::Invoice), false)
            }
        };
        session.update(move |doc| {
            if let Document::Invoice(inv) = doc {
                inv.number = number;
                inv.number_reserved = reserved;
            }
        });
    }

    let Document::Invoice(invoice) = session.document() else {
        unreachable!("document kind cannot change mid-save");
    };
    let record = InvoiceRecord::from_invoice(invoice);
    store.insert(&record).await?;
    Ok(record.invoice_number)
}
