//! Core library containing business logic and route handlers for the
//! archive/mail HTTP server.

pub mod archive;
pub mod config;
pub mod error;
pub mod handlers;
pub mod mail;
pub mod middleware;
pub mod mime_policy;

pub use archive::{ArchiveEntry, ArchiveInfo};
pub use config::AppConfig;
pub use error::{AppError, ErrorResponse, Result};
pub use handlers::routes::create_routes;
pub use mail::MailDispatcher;
pub use mime_policy::MimePolicy;

use axum::{extract::DefaultBodyLimit, Router};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::signal;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub mime_policy: Arc<MimePolicy>,
    pub mailer: Option<Arc<MailDispatcher>>,
    pub templates_dir: PathBuf,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            app_name: "Archive Mail Server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            mime_policy: Arc::new(MimePolicy::default()),
            mailer: None,
            templates_dir: config.server.templates_dir.clone(),
        }
    }

    pub fn with_mailer(mut self, mailer: MailDispatcher) -> Self {
        self.mailer = Some(Arc::new(mailer));
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

pub fn create_app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .merge(create_routes())
        .layer(DefaultBodyLimit::max(config.max_upload_size_bytes()))
        .layer(middleware::logging::logging_layer())
        .with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
