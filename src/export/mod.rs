//! # Page-Fit Export Pipeline
//!
//! Converts a live preview into a fixed-page artifact: a single A4 page
//! holding a rasterized snapshot of the document, used both for file
//! downloads and for print jobs.
//!
//! ## Pipeline
//!
//! ```text
//! PreviewTree ─► style::resolve ─► Rasterizer (2x, 210mm × ≥297mm, 12mm pad)
//!                                      │
//!                                      ▼
//!                               pagefit::fit_to_page
//!                                      │
//!                     ┌────────────────┴──────────────┐
//!                     ▼                               ▼
//!               pdf::write_pdf                 print::PrintSpool
//!            (download artifact)              (same bytes, spooled)
//! ```
//!
//! Export is a single linear operation with two terminal outcomes: an
//! artifact, or an error with no partial output. There is no intermediate
//! persisted state and no cancellation.

pub mod pagefit;
pub mod pdf;
pub mod print;

pub use pagefit::{fit_to_page, print_layout, Placement, PrintLayout};
pub use print::PrintSpool;

use image::RgbImage;

use crate::document::{Document, DocumentKind};
use crate::error::FolioError;
use crate::preview::style::ResolvedPreview;
use crate::render;

/// A finished export: PDF bytes plus the suggested file name and the
/// placement that produced it. Created fresh per request, never cached.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    /// `<Prefix>-<number>.pdf`, or `<Prefix>-draft.pdf` for unnumbered
    /// documents.
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub placement: Placement,
}

/// Suggested artifact file name for a document kind and number.
pub fn artifact_name(kind: DocumentKind, number: &str) -> String {
    let number = if number.is_empty() { "draft" } else { number };
    format!("{}-{}.pdf", kind.file_prefix(), number)
}

/// Run the synchronous tail of the pipeline: rasterize a resolved
/// preview, fit it to the page, and emit the PDF.
///
/// Callers have already resolved styles and loaded the letterhead; this
/// function is deterministic given its inputs.
pub fn export_resolved(
    document: &Document,
    resolved: &ResolvedPreview,
    letterhead: Option<&RgbImage>,
) -> Result<ExportArtifact, FolioError> {
    let raster = render::render_preview(resolved, letterhead);
    let placement = pagefit::fit_to_page(raster.width(), raster.height());
    let bytes = pdf::write_pdf(&raster, &placement, &document.title())?;
    Ok(ExportArtifact {
        file_name: artifact_name(document.kind(), document.number()),
        bytes,
        placement,
    })
}
