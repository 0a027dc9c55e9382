//! Integration tests for file operations.

mod helpers;

use axum::http::{StatusCode, header};
use percent_encoding::percent_decode_str;
use serde_json::json;

use helpers::Part;

fn uploader() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[tokio::test]
async fn test_upload_to_root_and_download() {
    let app = helpers::TestApp::new().await;
    let user = uploader();

    let uploaded = app
        .upload(
            &[("uploader_user_id", user.as_str())],
            "notes.txt",
            b"hello world",
        )
        .await;
    assert_eq!(uploaded.status, StatusCode::CREATED, "{}", uploaded.body);

    let id = uploaded.str("id");
    let virtual_path = uploaded.str("virtual_path");
    assert_eq!(uploaded.str("name"), "notes.txt");
    assert_eq!(virtual_path, format!("/{id}.txt"));
    assert_eq!(uploaded.data()["size_bytes"], 11);
    assert_eq!(uploaded.str("mime_type"), "text/plain");
    assert!(uploaded.data().get("storage_path").is_none());
    assert_eq!(
        std::fs::read(app.on_disk(&virtual_path)).unwrap(),
        b"hello world"
    );

    let by_id = app
        .request("GET", &format!("/api/files/{id}/download"), None)
        .await;
    assert_eq!(by_id.status, StatusCode::OK);
    assert_eq!(by_id.raw, b"hello world");
    assert_eq!(by_id.headers[header::CONTENT_TYPE], "text/plain");
    assert_eq!(
        by_id.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"notes.txt\"; filename*=UTF-8''notes%2Etxt"
    );

    let by_path = app
        .request(
            "GET",
            &format!("/api/files/download?path={virtual_path}"),
            None,
        )
        .await;
    assert_eq!(by_path.raw, b"hello world");
}

#[tokio::test]
async fn test_download_disposition_carries_unicode_name() {
    let app = helpers::TestApp::new().await;
    let user = uploader();

    let uploaded = app
        .upload(
            &[("uploader_user_id", user.as_str()), ("name", "отчёт.pdf")],
            "upload.bin",
            b"%PDF-1.4",
        )
        .await;
    assert_eq!(uploaded.status, StatusCode::CREATED, "{}", uploaded.body);
    assert_eq!(uploaded.str("name"), "отчёт.pdf");

    let download = app
        .request(
            "GET",
            &format!("/api/files/{}/download", uploaded.str("id")),
            None,
        )
        .await;
    assert_eq!(download.status, StatusCode::OK);

    let disposition = download.headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap();
    assert!(disposition.starts_with("attachment; filename=\"_____.pdf\""));
    let encoded = disposition
        .split("filename*=UTF-8''")
        .nth(1)
        .expect("missing filename* parameter");
    let decoded = percent_decode_str(encoded).decode_utf8().unwrap();
    assert_eq!(decoded, "отчёт.pdf");
}

#[tokio::test]
async fn test_upload_streams_multi_chunk_body() {
    let app = helpers::TestApp::new().await;
    let user = uploader();
    let data: Vec<u8> = (0..256 * 1024).map(|i| (i % 251) as u8).collect();

    let body = helpers::multipart_body(&[
        Part::Text("uploader_user_id", &user),
        Part::Text("name", "blob.bin"),
        Part::File("blob.bin", &data),
    ]);
    let uploaded = app.send_multipart(body, Some(4096)).await;
    assert_eq!(uploaded.status, StatusCode::CREATED, "{}", uploaded.body);
    assert_eq!(uploaded.data()["size_bytes"], data.len());

    let virtual_path = uploaded.str("virtual_path");
    assert_eq!(std::fs::read(app.on_disk(&virtual_path)).unwrap(), data);

    let download = app
        .request(
            "GET",
            &format!("/api/files/{}/download", uploaded.str("id")),
            None,
        )
        .await;
    assert_eq!(download.raw, data);
}

#[tokio::test]
async fn test_upload_rejects_fields_after_file_part() {
    let app = helpers::TestApp::new().await;
    let user = uploader();

    let body = helpers::multipart_body(&[
        Part::Text("uploader_user_id", &user),
        Part::File("notes.txt", b"hello"),
        Part::Text("name", "late.txt"),
    ]);
    let response = app.send_multipart(body, None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(std::fs::read_dir(&app.root).unwrap().count(), 0);

    let listed = app.request("GET", "/api/files", None).await;
    assert_eq!(listed.data().as_array().unwrap().len(), 0);

    let file_first = helpers::multipart_body(&[
        Part::File("notes.txt", b"hello"),
        Part::Text("uploader_user_id", &user),
    ]);
    let response = app.send_multipart(file_first, None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(std::fs::read_dir(&app.root).unwrap().count(), 0);
}

#[tokio::test]
async fn test_upload_into_folder_by_id_and_path() {
    let app = helpers::TestApp::new().await;
    let docs = app.create_folder("docs", None).await;
    let user = uploader();

    let by_id = app
        .upload(
            &[
                ("uploader_user_id", user.as_str()),
                ("folder_id", docs["id"].as_str().unwrap()),
                ("name", "Quarterly report.pdf"),
            ],
            "upload.bin",
            b"%PDF-1.4",
        )
        .await;
    assert_eq!(by_id.status, StatusCode::CREATED, "{}", by_id.body);
    assert_eq!(by_id.str("name"), "Quarterly report.pdf");
    assert_eq!(by_id.str("mime_type"), "application/pdf");
    assert_eq!(by_id.data()["folder_id"], docs["id"]);
    assert!(by_id.str("virtual_path").starts_with("/docs/"));
    assert!(app.on_disk(&by_id.str("virtual_path")).is_file());

    let by_path = app
        .upload(
            &[("uploader_user_id", user.as_str()), ("folder_path", "/docs")],
            "data.csv",
            b"a,b\n1,2\n",
        )
        .await;
    assert_eq!(by_path.status, StatusCode::CREATED);
    assert_eq!(by_path.data()["folder_id"], docs["id"]);

    let listed = app
        .request("GET", "/api/files?folder_path=/docs/", None)
        .await;
    assert_eq!(listed.data().as_array().unwrap().len(), 2);

    let root = app.request("GET", "/api/files", None).await;
    assert_eq!(root.data().as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_upload_rejections() {
    let app = helpers::TestApp::with_config(|config| {
        config.storage.allowed_extensions = Some(vec!["pdf".to_string(), ".TXT".to_string()]);
    })
    .await;
    let user = uploader();

    let disallowed = app
        .upload(
            &[("uploader_user_id", user.as_str())],
            "script.exe",
            b"MZ",
        )
        .await;
    assert_eq!(disallowed.status, StatusCode::BAD_REQUEST);

    let upper = app
        .upload(
            &[("uploader_user_id", user.as_str())],
            "README.Txt",
            b"hi",
        )
        .await;
    assert_eq!(upper.status, StatusCode::CREATED);

    let missing_file = app
        .multipart(&[("uploader_user_id", user.as_str())], None)
        .await;
    assert_eq!(missing_file.status, StatusCode::BAD_REQUEST);

    let missing_user = app.upload(&[], "a.txt", b"hi").await;
    assert_eq!(missing_user.status, StatusCode::BAD_REQUEST);

    let stray_id = uuid::Uuid::new_v4().to_string();
    let both_targets = app
        .upload(
            &[
                ("uploader_user_id", user.as_str()),
                ("folder_id", stray_id.as_str()),
                ("folder_path", "/docs/"),
            ],
            "a.txt",
            b"hi",
        )
        .await;
    assert_eq!(both_targets.status, StatusCode::BAD_REQUEST);

    let unknown_folder = app
        .upload(
            &[("uploader_user_id", user.as_str()), ("folder_path", "/nope/")],
            "a.txt",
            b"hi",
        )
        .await;
    assert_eq!(unknown_folder.status, StatusCode::NOT_FOUND);

    let stored: Vec<_> = std::fs::read_dir(&app.root).unwrap().collect();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn test_upload_over_limit_is_refused() {
    let app = helpers::TestApp::with_config(|config| {
        config.storage.max_upload_size_bytes = 1024;
    })
    .await;
    let user = uploader();
    let big = vec![b'x'; 4096];

    let response = app
        .upload(
            &[("uploader_user_id", user.as_str())],
            "big.txt",
            &big,
        )
        .await;
    assert!(response.status.is_client_error());
    assert_eq!(std::fs::read_dir(&app.root).unwrap().count(), 0);
}

#[tokio::test]
async fn test_rename_keeps_body_and_move_relocates() {
    let app = helpers::TestApp::new().await;
    let docs = app.create_folder("docs", None).await;
    let user = uploader();

    let uploaded = app
        .upload(
            &[("uploader_user_id", user.as_str())],
            "notes.txt",
            b"hello",
        )
        .await;
    let id = uploaded.str("id");
    let original_path = uploaded.str("virtual_path");

    let renamed = app
        .request(
            "PATCH",
            &format!("/api/files/{id}"),
            Some(json!({ "name": "meeting notes.txt" })),
        )
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.str("name"), "meeting notes.txt");
    assert_eq!(renamed.str("virtual_path"), original_path);

    let moved = app
        .request(
            "PATCH",
            &format!("/api/files/{id}"),
            Some(json!({ "folder_id": docs["id"] })),
        )
        .await;
    assert_eq!(moved.status, StatusCode::OK, "{}", moved.body);
    assert_eq!(moved.str("virtual_path"), format!("/docs/{id}.txt"));
    assert!(!app.on_disk(&original_path).exists());
    assert_eq!(
        std::fs::read(app.on_disk(&moved.str("virtual_path"))).unwrap(),
        b"hello"
    );

    let back = app
        .request(
            "PATCH",
            &format!("/api/files/{id}"),
            Some(json!({ "folder_id": null })),
        )
        .await;
    assert_eq!(back.str("virtual_path"), original_path);
    assert!(back.data()["folder_id"].is_null());

    let short = app
        .request(
            "PATCH",
            &format!("/api/files/{id}"),
            Some(json!({ "name": "ab" })),
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_folder_rename_rewrites_file_paths() {
    let app = helpers::TestApp::new().await;
    let docs = app.create_folder("docs", None).await;
    let user = uploader();

    let uploaded = app
        .upload(
            &[
                ("uploader_user_id", user.as_str()),
                ("folder_id", docs["id"].as_str().unwrap()),
            ],
            "notes.txt",
            b"hello",
        )
        .await;
    let id = uploaded.str("id");

    app.request(
        "PATCH",
        &format!("/api/folders/{}", docs["id"].as_str().unwrap()),
        Some(json!({ "name": "papers" })),
    )
    .await;

    let file = app.request("GET", &format!("/api/files/{id}"), None).await;
    assert_eq!(file.str("virtual_path"), format!("/papers/{id}.txt"));

    let download = app
        .request(
            "GET",
            &format!("/api/files/download?path=/papers/{id}.txt"),
            None,
        )
        .await;
    assert_eq!(download.raw, b"hello");
}

#[tokio::test]
async fn test_get_and_delete_by_path() {
    let app = helpers::TestApp::new().await;
    let user = uploader();

    let uploaded = app
        .upload(
            &[("uploader_user_id", user.as_str())],
            "notes.txt",
            b"hello",
        )
        .await;
    let virtual_path = uploaded.str("virtual_path");

    let found = app
        .request("GET", &format!("/api/files/by-path?path={virtual_path}"), None)
        .await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.str("id"), uploaded.str("id"));

    let deleted = app
        .request(
            "DELETE",
            &format!("/api/files/by-path?path={virtual_path}"),
            None,
        )
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert!(!app.on_disk(&virtual_path).exists());

    let gone = app
        .request("GET", &format!("/api/files/{}", uploaded.str("id")), None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    let missing_download = app
        .request(
            "GET",
            &format!("/api/files/{}/download", uploaded.str("id")),
            None,
        )
        .await;
    assert_eq!(missing_download.status, StatusCode::NOT_FOUND);
}
