//! Embedded web assets.
//!
//! The `static/` directory is embedded at compile time so the binary is
//! self-contained; `build.rs` makes cargo re-run when its contents change.

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use include_dir::{include_dir, Dir};

static STATIC_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

/// Handle GET / — the landing page.
pub async fn index_handler() -> Response {
    match STATIC_DIR.get_file("index.html").and_then(|f| f.contents_utf8()) {
        Some(html) => Html(html).into_response(),
        None => (StatusCode::NOT_FOUND, "index.html missing from build").into_response(),
    }
}

/// Handle GET /assets/*path — other embedded files.
pub async fn asset_handler(Path(path): Path<String>) -> Response {
    match STATIC_DIR.get_file(&path) {
        Some(file) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                file.contents().to_vec(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}
