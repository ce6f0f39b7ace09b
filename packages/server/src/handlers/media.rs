use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use common::media::MediaKey;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/media/{key}",
    tag = "Media",
    operation_id = "getMedia",
    summary = "Fetch a stored recipe image",
    params(("key" = String, Path, description = "Media key, `<sha256>.<ext>`")),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*"),
        (status = 404, description = "No such image (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn serve_media(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let key = MediaKey::parse(&key)?;
    let content = state.media.get(&key).await?;

    let mime = mime_guess::from_ext(key.format().extension()).first_or_octet_stream();

    // Keys are content hashes, so a given URL never changes.
    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
        .body(Body::from(content))
        .map_err(|e| AppError::Internal(e.to_string()))
}
