use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use core_lib::archive::inspect_archive;
use core_lib::{create_app, AppConfig, AppState};
use std::io::Write;
use tower::ServiceExt;

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

/// (field name, filename, content type, data)
type Part<'a> = (&'a str, Option<&'a str>, Option<&'a str>, &'a [u8]);

fn multipart_body(parts: &[Part]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, filename, content_type, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", name);
        if let Some(filename) = filename {
            disposition.push_str(&format!("; filename=\"{}\"", filename));
        }
        disposition.push_str("\r\n");
        body.extend_from_slice(disposition.as_bytes());
        if let Some(content_type) = content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (
        format!("multipart/form-data; boundary={}", BOUNDARY),
        body,
    )
}

fn test_app() -> Router {
    let config = AppConfig::default();
    create_app(AppState::new(&config), &config)
}

fn post(uri: &str, content_type: String, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap()
}

fn sample_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(&mut buffer));
        for (name, content) in entries {
            writer
                .start_file(*name, zip::write::FileOptions::default())
                .unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
    }
    buffer
}

const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];

#[tokio::test]
async fn test_archive_information_lists_entries() {
    let zip_data = sample_zip(&[("report.png", b"png!" as &[u8]), ("data.xml", b"<data/>")]);
    let (content_type, body) = multipart_body(&[(
        "file",
        Some("bundle.zip"),
        Some("application/zip"),
        &zip_data,
    )]);

    let response = test_app()
        .oneshot(post("/api/archive/information", content_type, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let info: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(info["filename"], "bundle.zip");
    assert_eq!(info["archive_size"], zip_data.len() as u64);
    assert_eq!(info["total_files"], 2);
    assert_eq!(info["total_size"], 4 + 7);
    assert_eq!(info["files"][0]["file_path"], "report.png");
    assert_eq!(info["files"][0]["mimetype"], "image/png");
    assert_eq!(info["files"][1]["file_path"], "data.xml");
}

#[tokio::test]
async fn test_archive_information_is_idempotent() {
    let zip_data = sample_zip(&[("a.txt", b"hello" as &[u8])]);
    let app = test_app();

    let mut bodies = Vec::new();
    for _ in 0..2 {
        let (content_type, body) =
            multipart_body(&[("file", Some("same.zip"), Some("application/zip"), &zip_data)]);
        let response = app
            .clone()
            .oneshot(post("/api/archive/information", content_type, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        bodies.push(to_bytes(response.into_body(), usize::MAX).await.unwrap());
    }
    assert_eq!(bodies[0], bodies[1]);
}

#[tokio::test]
async fn test_archive_information_rejects_bad_signature() {
    let (content_type, body) = multipart_body(&[(
        "file",
        Some("note.txt"),
        Some("text/plain"),
        b"definitely not a zip",
    )]);

    let response = test_app()
        .oneshot(post("/api/archive/information", content_type, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let error: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error["code"], 400);
    assert_eq!(error["message"], "File is not a valid archive");
}

#[tokio::test]
async fn test_archive_information_requires_file_field() {
    let (content_type, body) = multipart_body(&[("other", None, None, b"x")]);

    let response = test_app()
        .oneshot(post("/api/archive/information", content_type, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_archive_skips_disallowed_files() {
    let (content_type, body) = multipart_body(&[
        ("files[]", Some("report.png"), Some("image/png"), b"png data"),
        ("files[]", Some("bad.txt"), Some("text/plain"), b"skip me"),
    ]);

    let response = test_app()
        .oneshot(post("/api/archive/files", content_type, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/zip"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=archive.zip"
    );

    let archive = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let info = inspect_archive("archive.zip", &archive).unwrap();
    assert_eq!(info.total_files, 1);
    assert_eq!(info.files[0].file_path, "report.png");
}

#[tokio::test]
async fn test_create_archive_round_trip() {
    let (content_type, body) = multipart_body(&[
        ("files[]", Some("a.png"), Some("image/png"), b"aaaa"),
        ("files[]", Some("b.xml"), Some("application/xml"), b"<b/>"),
    ]);

    let app = test_app();
    let response = app
        .clone()
        .oneshot(post("/api/archive/createArhive", content_type, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let archive = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    let (content_type, body) = multipart_body(&[(
        "file",
        Some("archive.zip"),
        Some("application/zip"),
        &archive,
    )]);
    let response = app
        .oneshot(post("/api/archive/information", content_type, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let info: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(info["total_files"], 2);
    assert_eq!(info["files"][0]["file_path"], "a.png");
    assert_eq!(info["files"][1]["file_path"], "b.xml");
}

#[tokio::test]
async fn test_create_archive_requires_files() {
    let (content_type, body) = multipart_body(&[("unrelated", None, None, b"x")]);

    let response = test_app()
        .oneshot(post("/api/archive/files", content_type, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_archive_rejects_all_disallowed_batch() {
    let (content_type, body) = multipart_body(&[
        ("files[]", Some("a.txt"), Some("text/plain"), b"x"),
        ("files[]", Some("b.txt"), Some("text/plain"), b"y"),
    ]);

    let response = test_app()
        .oneshot(post("/api/archive/files", content_type, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mail_rejects_empty_recipient_list() {
    let (content_type, body) = multipart_body(&[
        ("file", Some("doc.pdf"), Some("application/pdf"), b"%PDF-1.4 body"),
        ("emails", None, None, b""),
    ]);

    let response = test_app()
        .oneshot(post("/api/mail/file", content_type, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(
        std::str::from_utf8(&bytes).unwrap(),
        "Recipient list is empty"
    );
}

#[tokio::test]
async fn test_mail_rejects_disallowed_sniffed_type() {
    // Content sniffs as PNG, which is not an allowed attachment type.
    let (content_type, body) = multipart_body(&[
        ("file", Some("image.pdf"), Some("application/pdf"), PNG_MAGIC),
        ("emails", None, None, b"a@example.com"),
    ]);

    let response = test_app()
        .oneshot(post("/api/mail/file", content_type, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mail_rejects_unidentifiable_content() {
    let (content_type, body) = multipart_body(&[
        ("file", Some("doc.pdf"), Some("application/pdf"), b"plain words"),
        ("emails", None, None, b"a@example.com"),
    ]);

    let response = test_app()
        .oneshot(post("/api/mail/file", content_type, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mail_without_transport_is_server_error() {
    // Valid PDF and recipients, but the test state carries no dispatcher.
    let (content_type, body) = multipart_body(&[
        ("file", Some("doc.pdf"), Some("application/pdf"), b"%PDF-1.4 body"),
        ("emails", None, None, b"a@example.com,b@example.com"),
    ]);

    let response = test_app()
        .oneshot(post("/api/mail/file", content_type, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_hello_renders_template() {
    let templates = tempfile::tempdir().unwrap();
    std::fs::write(
        templates.path().join("hello.html"),
        "<html><body>Hello!</body></html>",
    )
    .unwrap();

    let config = AppConfig::default();
    let mut state = AppState::new(&config);
    state.templates_dir = templates.path().to_path_buf();
    let app = create_app(state, &config);

    let response = app
        .oneshot(Request::builder().uri("/hello").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(std::str::from_utf8(&bytes).unwrap().contains("Hello!"));
}

#[tokio::test]
async fn test_hello_missing_template_is_server_error() {
    let templates = tempfile::tempdir().unwrap();

    let config = AppConfig::default();
    let mut state = AppState::new(&config);
    state.templates_dir = templates.path().to_path_buf();
    let app = create_app(state, &config);

    let response = app
        .oneshot(Request::builder().uri("/hello").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
