//! Request handlers for the JSON API.
//!
//! Every pipeline handler takes a full document in the request body and
//! runs the same code paths as the CLI: build → resolve → rasterize →
//! fit → emit. CPU-heavy work runs under `spawn_blocking`.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::AppState;
use crate::actions;
use crate::document::{Document, DocumentKind};
use crate::error::FolioError;
use crate::export::ExportArtifact;
use crate::notify::LogNotifier;
use crate::preview::{self, style};
use crate::render;
use crate::session::EditorSession;

fn error_response(error: &FolioError) -> Response {
    let status = match error {
        FolioError::InvalidInput(_) | FolioError::Draft(_) => StatusCode::BAD_REQUEST,
        FolioError::PreviewNotFound => StatusCode::UNPROCESSABLE_ENTITY,
        FolioError::Busy(_) => StatusCode::CONFLICT,
        FolioError::Storage(_) | FolioError::Numbering(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

fn pdf_response(artifact: ExportArtifact) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", artifact.file_name),
            ),
        ],
        artifact.bytes,
    )
        .into_response()
}

/// Build the export artifact for a document on a blocking thread.
async fn build_artifact(
    state: &AppState,
    document: Document,
) -> Result<ExportArtifact, FolioError> {
    let letterhead = state.letterhead().await?;
    let theme = state.theme.clone();
    tokio::task::spawn_blocking(move || {
        let mut session = EditorSession::with_document(document);
        actions::download_pdf(&mut session, &theme, letterhead.as_ref(), &mut LogNotifier)
    })
    .await
    .map_err(|e| FolioError::Render(format!("export task failed: {e}")))?
}

/// `POST /api/preview` — document JSON to PNG.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Json(document): Json<Document>,
) -> Response {
    let letterhead = match state.letterhead().await {
        Ok(image) => image,
        Err(e) => return error_response(&e),
    };
    let theme = state.theme.clone();
    let result = tokio::task::spawn_blocking(move || {
        let tree = preview::build(&document);
        let resolved = style::resolve(&tree, &theme);
        render::to_png(&render::render_preview(&resolved, letterhead.as_ref()))
    })
    .await
    .map_err(|e| FolioError::Render(format!("preview task failed: {e}")))
    .and_then(|r| r);

    match result {
        Ok(png) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        Err(e) => error_response(&e),
    }
}

/// `POST /api/export` — document JSON to a single-page A4 PDF download.
pub async fn export(
    State(state): State<Arc<AppState>>,
    Json(document): Json<Document>,
) -> Response {
    match build_artifact(&state, document).await {
        Ok(artifact) => pdf_response(artifact),
        Err(e) => error_response(&e),
    }
}

/// `POST /api/print` — document JSON to the print spool.
pub async fn print(
    State(state): State<Arc<AppState>>,
    Json(document): Json<Document>,
) -> Response {
    let outcome = match build_artifact(&state, document).await {
        Ok(artifact) => state.spool.submit(&artifact).map(|path| (artifact, path)),
        Err(e) => Err(e),
    };
    match outcome {
        Ok((artifact, _path)) => Json(json!({ "spooled": artifact.file_name })).into_response(),
        Err(e) => error_response(&e),
    }
}

/// `POST /api/documents` — save an invoice, reserving a number.
pub async fn save_document(
    State(state): State<Arc<AppState>>,
    Json(document): Json<Document>,
) -> Response {
    let mut session = EditorSession::with_document(document);
    match actions::save_invoice(
        &mut session,
        &*state.store,
        &*state.numbering,
        &mut LogNotifier,
    )
    .await
    {
        Ok(number) => (
            StatusCode::CREATED,
            Json(json!({ "invoice_number": number })),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// `GET /api/documents` — saved invoices, newest first.
pub async fn list_documents(State(state): State<Arc<AppState>>) -> Response {
    match state.store.list().await {
        Ok(summaries) => Json(summaries).into_response(),
        Err(e) => error_response(&e),
    }
}

/// `GET /api/documents/:id` — one saved invoice.
pub async fn fetch_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.store.fetch(id).await {
        Ok(record) => Json(record).into_response(),
        Err(e) => error_response(&e),
    }
}

/// `GET /api/documents/:id/pdf` — re-export a saved invoice through the
/// same pipeline the live editor uses.
pub async fn export_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Response {
    let record = match state.store.fetch(id).await {
        Ok(record) => record,
        Err(e) => return error_response(&e),
    };
    let document = Document::Invoice(record.to_invoice());
    match build_artifact(&state, document).await {
        Ok(artifact) => pdf_response(artifact),
        Err(e) => error_response(&e),
    }
}

/// `DELETE /api/documents/:id`
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.store.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

fn draft_kind(kind: &str) -> Result<DocumentKind, FolioError> {
    match kind {
        "po" => Ok(DocumentKind::PurchaseOrder),
        "do" => Ok(DocumentKind::DeliveryOrder),
        other => Err(FolioError::Draft(format!("unknown draft kind: {other}"))),
    }
}

/// `GET /api/drafts/:kind`
pub async fn load_draft(State(state): State<Arc<AppState>>, Path(kind): Path<String>) -> Response {
    let result = draft_kind(&kind).and_then(|k| state.drafts.load(k));
    match result {
        Ok(Some(document)) => Json(document).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no draft saved" })),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// `PUT /api/drafts/:kind` — overwrite the draft snapshot.
pub async fn save_draft(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Json(document): Json<Document>,
) -> Response {
    let result = draft_kind(&kind).and_then(|k| {
        if document.kind() != k {
            return Err(FolioError::Draft(format!(
                "document kind does not match draft key {kind}"
            )));
        }
        state.drafts.save(&document)
    });
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}
