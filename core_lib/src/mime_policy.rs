//! MIME allow-lists and content-type detection for uploads.

use std::collections::HashSet;
use std::path::Path;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Number of leading bytes inspected when sniffing an upload's content type.
pub const SNIFF_LEN: usize = 512;

/// Immutable allow-lists, constructed once at startup and shared read-only
/// across requests.
#[derive(Debug, Clone)]
pub struct MimePolicy {
    archive_input_types: HashSet<String>,
    attachment_types: HashSet<String>,
}

impl Default for MimePolicy {
    fn default() -> Self {
        let mut archive_input_types = HashSet::new();
        archive_input_types.insert(DOCX_MIME.to_string());
        archive_input_types.insert("application/xml".to_string());
        archive_input_types.insert("image/jpeg".to_string());
        archive_input_types.insert("image/png".to_string());

        let mut attachment_types = HashSet::new();
        attachment_types.insert(DOCX_MIME.to_string());
        attachment_types.insert("application/pdf".to_string());

        Self {
            archive_input_types,
            attachment_types,
        }
    }
}

impl MimePolicy {
    /// Whether a declared content type may be bundled into a built archive.
    pub fn allows_archive_input(&self, content_type: &str) -> bool {
        self.archive_input_types.contains(content_type)
    }

    /// Whether a sniffed content type may be sent as an email attachment.
    pub fn allows_attachment(&self, content_type: &str) -> bool {
        self.attachment_types.contains(content_type)
    }
}

/// Detect a mime type from a file path's extension. Archive entries are
/// classified this way, without looking at their compressed content.
pub fn detect_by_extension(path: &str) -> String {
    mime_guess::from_path(Path::new(path))
        .first_raw()
        .unwrap_or(mime::APPLICATION_OCTET_STREAM.as_ref())
        .to_string()
}

/// Sniff a content type from a byte prefix. Only the first [`SNIFF_LEN`]
/// bytes are considered.
pub fn sniff_content(data: &[u8]) -> Option<&'static str> {
    let prefix = &data[..data.len().min(SNIFF_LEN)];
    infer::get(prefix).map(|kind| kind.mime_type())
}
