//! # Folio - Document Builder Library
//!
//! Folio builds business documents — invoices, purchase orders and
//! delivery orders — with a live preview, persistence to a hosted store,
//! and a layout-faithful single-page A4 PDF/print export. It provides:
//!
//! - **Totals engine**: deterministic per-line and document aggregates
//! - **Preview tree**: the document's on-screen representation, as data
//! - **Style resolution**: a pure (tree, theme) → style-inlined snapshot
//! - **Rasterizer**: Spleen-font painting at 2x oversampling
//! - **Page-fit export**: A4 placement math, PDF emission, print spooling
//!
//! ## Quick Start
//!
//! ```
//! use folio::document::{Document, DocumentKind};
//! use folio::preview::{self, style};
//! use folio::export;
//!
//! // Build a document (normally edited through an EditorSession)
//! let doc = Document::new(DocumentKind::PurchaseOrder);
//!
//! // Preview → resolved styles → raster → single-page A4 PDF
//! let tree = preview::build(&doc);
//! let resolved = style::resolve(&tree, &style::Theme::default());
//! let artifact = export::export_resolved(&doc, &resolved, None)?;
//!
//! assert!(artifact.bytes.starts_with(b"%PDF"));
//! assert_eq!(artifact.file_name, "PO-draft.pdf");
//! # Ok::<(), folio::FolioError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`document`] | Document model, totals engine, numbering, drafts |
//! | [`session`] | Owned editing state with synchronous recompute |
//! | [`preview`] | Preview tree and style resolution |
//! | [`render`] | Rasterizer and letterhead loading |
//! | [`export`] | Page-fit math, PDF emission, print spooling |
//! | [`storage`] | Persistence collaborator (REST + in-memory) |
//! | [`actions`] | Save / export / print flows with notifications |
//! | [`server`] | axum JSON API |
//! | [`error`] | Error types |

pub mod actions;
pub mod document;
pub mod error;
pub mod export;
pub mod notify;
pub mod preview;
pub mod render;
pub mod server;
pub mod session;
pub mod storage;

// Re-exports for convenience
pub use error::FolioError;
pub use session::EditorSession;
