//! # HTTP Server
//!
//! Exposes the document pipeline as a small JSON API plus an embedded
//! landing page.
//!
//! ## Usage
//!
//! ```bash
//! folio serve --listen 0.0.0.0:8080
//! ```
//!
//! ## Endpoints
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /` | Embedded landing page |
//! | `POST /api/preview` | Document JSON → PNG preview |
//! | `POST /api/export` | Document JSON → single-page A4 PDF |
//! | `POST /api/print` | Document JSON → print spool |
//! | `POST /api/documents` | Save an invoice (reserves a number) |
//! | `GET /api/documents` | Saved invoices, newest first |
//! | `GET /api/documents/:id` | One saved invoice |
//! | `GET /api/documents/:id/pdf` | Re-export a saved invoice |
//! | `DELETE /api/documents/:id` | Delete a saved invoice |
//! | `GET /api/drafts/:kind` | Load the `po`/`do` draft |
//! | `PUT /api/drafts/:kind` | Overwrite the `po`/`do` draft |
//!
//! Handlers are stateless per request: a request body carries the whole
//! document, blocking raster/PDF work runs on a blocking thread, and the
//! busy-guard semantics of the interactive editor do not apply here.

mod handlers;
mod static_files;

use axum::{
    routing::{get, post},
    Router,
};
use image::RgbImage;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::document::{DraftStore, NumberingService};
use crate::error::FolioError;
use crate::export::PrintSpool;
use crate::preview::Theme;
use crate::render::letterhead;
use crate::storage::DocumentStore;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g. "0.0.0.0:8080")
    pub listen_addr: String,
    /// Letterhead image source (path or URL), if any
    pub letterhead: Option<String>,
}

/// Shared state for all handlers.
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub numbering: Arc<dyn NumberingService>,
    pub theme: Theme,
    pub drafts: DraftStore,
    pub spool: PrintSpool,
    letterhead_source: Option<String>,
    letterhead_cache: RwLock<Option<RgbImage>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        numbering: Arc<dyn NumberingService>,
        drafts: DraftStore,
        spool: PrintSpool,
        letterhead_source: Option<String>,
    ) -> Self {
        Self {
            store,
            numbering,
            theme: Theme::default(),
            drafts,
            spool,
            letterhead_source,
            letterhead_cache: RwLock::new(None),
        }
    }

    /// The letterhead raster, fetched once and cached for the server's
    /// lifetime. `None` when no letterhead is configured; an error when
    /// one is configured but cannot be loaded.
    pub async fn letterhead(&self) -> Result<Option<RgbImage>, FolioError> {
        let Some(source) = &self.letterhead_source else {
            return Ok(None);
        };
        if let Some(cached) = self.letterhead_cache.read().await.as_ref() {
            return Ok(Some(cached.clone()));
        }
        let image = letterhead::load(source).await?;
        *self.letterhead_cache.write().await = Some(image.clone());
        Ok(Some(image))
    }
}

/// Start the HTTP server.
pub async fn serve(config: ServerConfig, state: AppState) -> Result<(), FolioError> {
    let app = router(Arc::new(state));

    log::info!("folio server listening on {}", config.listen_addr);
    println!("Open http://{}/ in your browser", config.listen_addr);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router. Split out so tests can drive handlers without a
/// socket.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Frontend
        .route("/", get(static_files::index_handler))
        .route("/assets/*path", get(static_files::asset_handler))
        // Pipeline
        .route("/api/preview", post(handlers::preview))
        .route("/api/export", post(handlers::export))
        .route("/api/print", post(handlers::print))
        // Persistence
        .route(
            "/api/documents",
            post(handlers::save_document).get(handlers::list_documents),
        )
        .route(
            "/api/documents/:id",
            get(handlers::fetch_document).delete(handlers::delete_document),
        )
        .route("/api/documents/:id/pdf", get(handlers::export_document))
        // Drafts
        .route(
            "/api/drafts/:kind",
            get(handlers::load_draft).put(handlers::save_draft),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
