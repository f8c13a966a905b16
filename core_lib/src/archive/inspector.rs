//! Opens an uploaded ZIP and produces a structured listing of its entries.

use std::io::Write;

use tempfile::NamedTempFile;
use thiserror::Error;
use zip::ZipArchive;

use crate::archive::models::{ArchiveEntry, ArchiveInfo};
use crate::mime_policy;

/// ZIP local-file-header signature.
const ZIP_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

#[derive(Error, Debug)]
pub enum InspectError {
    #[error("File is not a valid archive")]
    NotAnArchive,

    #[error("Uploaded file is not a valid ZIP archive: {0}")]
    Malformed(#[from] zip::result::ZipError),

    #[error("Failed to store uploaded archive: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether a byte stream starts with the ZIP local-file-header signature.
pub fn has_zip_signature(data: &[u8]) -> bool {
    data.len() >= ZIP_SIGNATURE.len() && data[..ZIP_SIGNATURE.len()] == ZIP_SIGNATURE
}

/// Inspect an uploaded archive: verify the signature, persist the bytes to a
/// request-scoped temp file, open it as a ZIP and enumerate every entry.
///
/// Entry mime types are detected by extension only. The temp file is removed
/// on drop, on every exit path.
pub fn inspect_archive(filename: &str, data: &[u8]) -> Result<ArchiveInfo, InspectError> {
    if !has_zip_signature(data) {
        return Err(InspectError::NotAnArchive);
    }

    let mut temp_file = NamedTempFile::new()?;
    temp_file.write_all(data)?;
    temp_file.flush()?;

    let file = temp_file.reopen()?;
    let mut archive = ZipArchive::new(file)?;

    let mut files = Vec::with_capacity(archive.len());
    let mut total_size: u64 = 0;

    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        let file_path = entry.name().to_string();
        let size = entry.size();

        files.push(ArchiveEntry {
            mimetype: mime_policy::detect_by_extension(&file_path),
            file_path,
            size,
        });
        total_size += size;
    }

    Ok(ArchiveInfo {
        filename: filename.to_string(),
        archive_size: data.len() as u64,
        total_size,
        total_files: files.len(),
        files,
    })
}
