//! Bundles uploaded files into a new ZIP container.

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use axum::body::Bytes;
use tempfile::NamedTempFile;
use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::mime_policy::MimePolicy;

/// One uploaded file part, as read from the multipart form.
#[derive(Debug, Clone)]
pub struct UploadPart {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Result of building an archive from a batch of uploads.
#[derive(Debug)]
pub struct BuildOutcome {
    pub archive: Vec<u8>,
    pub accepted: usize,
    /// Filenames skipped because their declared content type is not allowed.
    pub rejected: Vec<String>,
}

#[derive(Error, Debug)]
pub enum BuilderError {
    #[error("Failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to create temp archive: {0}")]
    Io(#[from] std::io::Error),
}

/// Sanitize an upload's filename to its base name so no entry can carry path
/// components into the archive.
fn entry_name(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or("unnamed")
        .to_string()
}

/// Stream every allowed upload into a ZIP container backed by a request-scoped
/// temp file, then read the finalized container back.
///
/// Disallowed parts are recorded and skipped; the batch is never aborted by a
/// single bad file. The temp file is removed on drop, on every exit path.
pub fn build_archive(
    parts: &[UploadPart],
    policy: &MimePolicy,
) -> Result<BuildOutcome, BuilderError> {
    let temp_file = NamedTempFile::new()?;
    let mut writer = ZipWriter::new(temp_file.reopen()?);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut accepted = 0;
    let mut rejected = Vec::new();

    for part in parts {
        if !policy.allows_archive_input(&part.content_type) {
            tracing::warn!(
                filename = %part.filename,
                content_type = %part.content_type,
                "skipping file with disallowed content type"
            );
            rejected.push(part.filename.clone());
            continue;
        }

        writer.start_file(entry_name(&part.filename), options)?;
        writer.write_all(&part.data)?;
        accepted += 1;
    }

    let mut file = writer.finish()?;
    file.seek(SeekFrom::Start(0))?;

    let mut archive = Vec::new();
    file.read_to_end(&mut archive)?;

    Ok(BuildOutcome {
        archive,
        accepted,
        rejected,
    })
}
