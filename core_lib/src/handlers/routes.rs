//! Explicit routing table mapping method+path to handlers.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{archive, hello, mail};
use crate::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/hello", get(hello::handle_hello))
        .route(
            "/api/archive/information",
            post(archive::handle_archive_information),
        )
        .route("/api/archive/files", post(archive::handle_create_archive))
        // Kept for compatibility with existing clients of the original API.
        .route(
            "/api/archive/createArhive",
            post(archive::handle_create_archive),
        )
        .route("/api/mail/file", post(mail::handle_file_and_emails))
}
