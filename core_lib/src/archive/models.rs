//! Derived archive metadata returned by the inspection endpoint.

use serde::{Deserialize, Serialize};

/// One entry of an opened archive, in container order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub file_path: String,
    pub size: u64,
    pub mimetype: String,
}

/// Summary of an uploaded archive. Built once per inspection request,
/// serialized and discarded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchiveInfo {
    pub filename: String,
    pub archive_size: u64,
    pub total_size: u64,
    pub total_files: usize,
    pub files: Vec<ArchiveEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_info_serialization() {
        let info = ArchiveInfo {
            filename: "bundle.zip".to_string(),
            archive_size: 128,
            total_size: 20,
            total_files: 1,
            files: vec![ArchiveEntry {
                file_path: "a.txt".to_string(),
                size: 20,
                mimetype: "text/plain".to_string(),
            }],
        };

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["filename"], "bundle.zip");
        assert_eq!(json["archive_size"], 128);
        assert_eq!(json["total_size"], 20);
        assert_eq!(json["total_files"], 1);
        assert_eq!(json["files"][0]["file_path"], "a.txt");
        assert_eq!(json["files"][0]["mimetype"], "text/plain");
    }
}
