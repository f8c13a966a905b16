//! Handler for emailing an uploaded file to a list of recipients.
//!
//! Unlike the archive endpoints this one answers with plain-text bodies on
//! both success and failure.

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use crate::{
    mail::{parse_recipients, EmailJob, MailError},
    mime_policy,
    AppState,
};

type PlainError = (StatusCode, String);

/// POST /api/mail/file
pub async fn handle_file_and_emails(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Response {
    match send_uploaded_file(state, multipart).await {
        Ok(confirmation) => (StatusCode::OK, confirmation).into_response(),
        Err((status, message)) => {
            if status.is_server_error() {
                tracing::error!(status = status.as_u16(), "{}", message);
            } else {
                warn!(status = status.as_u16(), "{}", message);
            }
            (status, message).into_response()
        }
    }
}

async fn send_uploaded_file(
    state: AppState,
    mut multipart: Multipart,
) -> std::result::Result<&'static str, PlainError> {
    let mut upload: Option<(String, Bytes)> = None;
    let mut emails_field: Option<String> = None;

    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|err| bad_request(format!("Failed to parse form: {}", err)))?;
        let Some(field) = field else { break };

        match field.name() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "attachment".to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|err| bad_request(format!("Failed to read file: {}", err)))?;
                upload = Some((filename, data));
            }
            Some("emails") => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| bad_request(format!("Failed to read emails field: {}", err)))?;
                emails_field = Some(value);
            }
            _ => {}
        }
    }

    let (filename, data) = upload.ok_or_else(|| bad_request("No file provided".to_string()))?;

    // Classify by sniffing the content prefix, never by extension.
    let mime_type = mime_policy::sniff_content(&data)
        .ok_or_else(|| bad_request("Could not determine file type".to_string()))?;
    if !state.mime_policy.allows_attachment(mime_type) {
        return Err(bad_request(format!("Invalid file type: {}", mime_type)));
    }

    let recipients =
        parse_recipients(emails_field.as_deref().unwrap_or("")).map_err(|err| match err {
            MailError::EmptyRecipients | MailError::InvalidRecipient(_) => {
                bad_request(err.to_string())
            }
            other => server_error(other.to_string()),
        })?;

    let mailer = state
        .mailer
        .as_ref()
        .ok_or_else(|| server_error("Mail transport is not configured".to_string()))?;

    info!(
        filename = %filename,
        mime_type = %mime_type,
        recipients = recipients.len(),
        "sending uploaded file by email"
    );

    let job = EmailJob {
        recipients,
        attachment: data.to_vec(),
        filename,
        mime_type: mime_type.to_string(),
    };

    mailer
        .send(job)
        .await
        .map_err(|err| server_error(format!("Failed to send email: {}", err)))?;

    Ok("File sent successfully")
}

fn bad_request(message: String) -> PlainError {
    (StatusCode::BAD_REQUEST, message)
}

fn server_error(message: String) -> PlainError {
    (StatusCode::INTERNAL_SERVER_ERROR, message)
}
