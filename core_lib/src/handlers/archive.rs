//! Handlers for archive inspection and creation.

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

use crate::{
    archive::{build_archive, inspect_archive, ArchiveInfo, BuilderError, InspectError, UploadPart},
    error::{AppError, Result},
    AppState,
};

/// POST /api/archive/information
///
/// Reads the multipart field `file`, verifies the ZIP signature and returns a
/// JSON listing of the archive's entries.
pub async fn handle_archive_information(
    mut multipart: Multipart,
) -> Result<Json<ArchiveInfo>> {
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let filename = field
                .file_name()
                .map(str::to_string)
                .unwrap_or_else(|| "upload.zip".to_string());
            let data = field.bytes().await?;
            upload = Some((filename, data));
            break;
        }
    }

    let (filename, data) =
        upload.ok_or_else(|| AppError::BadRequest("Failed to read file: no file field".into()))?;

    info!(filename = %filename, size = data.len(), "inspecting uploaded archive");

    let info = inspect_archive(&filename, &data).map_err(|err| match err {
        InspectError::NotAnArchive => {
            warn!(filename = %filename, "uploaded file is not a valid archive");
            AppError::BadRequest("File is not a valid archive".to_string())
        }
        InspectError::Malformed(err) => {
            warn!(filename = %filename, error = %err, "failed to open zip container");
            AppError::BadRequest("Uploaded file is not a valid ZIP archive".to_string())
        }
        InspectError::Io(err) => AppError::IoError(err),
    })?;

    Ok(Json(info))
}

/// POST /api/archive/files (and the legacy /api/archive/createArhive)
///
/// Bundles every allowed `files[]` part into a fresh ZIP and streams it back
/// as an attachment. Disallowed files are skipped; a batch with no accepted
/// file is rejected outright.
pub async fn handle_create_archive(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut parts: Vec<UploadPart> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("files[]") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| "unnamed".to_string());
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await?;

        parts.push(UploadPart {
            filename,
            content_type,
            data,
        });
    }

    if parts.is_empty() {
        return Err(AppError::BadRequest(
            "No files provided or invalid key used".to_string(),
        ));
    }

    let outcome = build_archive(&parts, &state.mime_policy).map_err(|err| match err {
        BuilderError::Io(err) => AppError::IoError(err),
        BuilderError::Zip(err) => AppError::Other(anyhow::anyhow!("zip writer failed: {}", err)),
    })?;

    if outcome.accepted == 0 {
        return Err(AppError::BadRequest(
            "All files were rejected by the content-type allow-list".to_string(),
        ));
    }

    info!(
        accepted = outcome.accepted,
        rejected = outcome.rejected.len(),
        size = outcome.archive.len(),
        "archive created"
    );

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, "application/zip".parse().unwrap());
    headers.insert(
        header::CONTENT_DISPOSITION,
        "attachment; filename=archive.zip".parse().unwrap(),
    );

    Ok((StatusCode::OK, headers, outcome.archive).into_response())
}
