//! Upload boundary: one multipart endpoint that accepts an image, runs
//! the classifier, and returns the record. The upload only ever exists
//! as a named temporary file scoped to the request, so it is removed on
//! every exit path, including errors.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::report;

const UPLOAD_FIELD: &str = "image";

pub struct AppState {
    pub upload_dir: PathBuf,
}

type ApiError = (StatusCode, Json<Value>);

fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn internal_error(message: String) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
}

pub fn app(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/extract", post(extract_image))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn extract_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(bad_request("Empty filename"));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| bad_request(&e.to_string()))?;

        debug!(filename, bytes = data.len(), "received upload");

        // Classification is CPU-bound; keep it off the async workers.
        let upload_dir = state.upload_dir.clone();
        let record = tokio::task::spawn_blocking(move || {
            let mut temp = NamedTempFile::new_in(&upload_dir)?;
            temp.write_all(&data)?;
            temp.flush()?;
            Ok::<_, std::io::Error>(report::classify_file(temp.path(), &filename))
        })
        .await
        .map_err(|e| internal_error(format!("worker task failed: {e}")))?
        .map_err(|e| internal_error(e.to_string()))?;

        return Ok(Json(record));
    }

    Err(bad_request("No image provided"))
}
