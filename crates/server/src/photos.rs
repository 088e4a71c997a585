//! Photo uploads. The raw request body is stored under the media root in a
//! per-day directory; the returned reference goes into a `photo` field.
//! A name already taken that day gets a numeric suffix, stored files are
//! never replaced.

use std::{io::ErrorKind, path::Path};

use api_types::photo::{PhotoUploadQuery, PhotoUploaded};
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::Utc;
use tokio::io::AsyncWriteExt;

use crate::{ServerError, server::ServerState};

const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Writes `body` to the first free alternative of `photo` and returns the
/// reference actually used.
async fn store_new(media_root: &Path, photo: &str, body: &[u8]) -> Result<String, ServerError> {
    for n in 0..MAX_NAME_ATTEMPTS {
        let candidate = engine::numbered_photo_path(photo, n);
        let target = media_root.join(&candidate);
        let opened = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await;
        let mut file = match opened {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(ServerError::Internal(format!("{}: {err}", target.display())));
            }
        };
        file.write_all(body)
            .await
            .map_err(|err| ServerError::Internal(format!("{}: {err}", target.display())))?;
        file.flush()
            .await
            .map_err(|err| ServerError::Internal(format!("{}: {err}", target.display())))?;
        return Ok(candidate);
    }
    Err(ServerError::Internal(format!("no free name left for {photo}")))
}

pub async fn upload(
    State(state): State<ServerState>,
    Query(query): Query<PhotoUploadQuery>,
    body: Bytes,
) -> Result<(StatusCode, Json<PhotoUploaded>), ServerError> {
    if body.is_empty() {
        return Err(ServerError::Generic("uploaded photo is empty".to_string()));
    }

    let photo = engine::photo_path(Utc::now(), &query.filename)?;
    let target = state.media_root.join(&photo);
    if let Some(dir) = target.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|err| ServerError::Internal(format!("{}: {err}", dir.display())))?;
    }
    let photo = store_new(&state.media_root, &photo, &body).await?;

    tracing::info!(photo = %photo, bytes = body.len(), "photo stored");
    Ok((StatusCode::CREATED, Json(PhotoUploaded { photo })))
}
