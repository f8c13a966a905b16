pub mod builder;
pub mod inspector;
pub mod models;

pub use builder::{build_archive, BuildOutcome, BuilderError, UploadPart};
pub use inspector::{inspect_archive, InspectError};
pub use models::{ArchiveEntry, ArchiveInfo};
