pub mod settings;

pub use settings::{AppConfig, LoggingConfig, ServerConfig, UploadConfig};
