//! Static HTML greeting page.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use crate::AppState;

/// GET /hello
pub async fn handle_hello(State(state): State<AppState>) -> Response {
    let path = state.templates_dir.join("hello.html");

    match tokio::fs::read_to_string(&path).await {
        Ok(body) => Html(body).into_response(),
        Err(err) => {
            error!(path = %path.display(), error = %err, "failed to load template");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load template",
            )
                .into_response()
        }
    }
}
