//! Integration tests for folder operations.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_health_reports_memory_catalog() {
    let app = helpers::TestApp::new().await;

    for path in ["/api/health", "/v1/healthcheck"] {
        let response = app.request("GET", path, None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.str("status"), "ok");
        assert_eq!(response.str("catalog"), "memory");
        assert_eq!(response.data()["storage_healthy"], true);
    }
}

#[tokio::test]
async fn test_create_folder_mirrors_disk() {
    let app = helpers::TestApp::new().await;

    let docs = app.create_folder("docs", None).await;
    assert_eq!(docs["virtual_path"], "/docs/");
    assert_eq!(docs["is_published"], true);
    assert!(docs.get("storage_path").is_none());
    assert!(app.on_disk("/docs/").is_dir());

    let reports = app.create_folder("reports", docs["id"].as_str()).await;
    assert_eq!(reports["virtual_path"], "/docs/reports/");
    assert_eq!(reports["parent_id"], docs["id"]);
    assert!(app.on_disk("/docs/reports/").is_dir());
}

#[tokio::test]
async fn test_create_folder_conflict_and_validation() {
    let app = helpers::TestApp::new().await;
    app.create_folder("docs", None).await;

    let duplicate = app
        .request(
            "POST",
            "/api/folders",
            Some(json!({ "name": "docs", "creator_user_id": uuid::Uuid::new_v4() })),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.body["error"], "CONFLICT");

    let bad_name = app
        .request(
            "POST",
            "/api/folders",
            Some(json!({ "name": "a/b", "creator_user_id": uuid::Uuid::new_v4() })),
        )
        .await;
    assert_eq!(bad_name.status, StatusCode::BAD_REQUEST);
    assert!(!app.root.join("a").exists());

    let missing_parent = app
        .request(
            "POST",
            "/api/folders",
            Some(json!({
                "name": "orphan",
                "parent_id": uuid::Uuid::new_v4(),
                "creator_user_id": uuid::Uuid::new_v4(),
            })),
        )
        .await;
    assert_eq!(missing_parent.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_get_and_contents() {
    let app = helpers::TestApp::new().await;
    let docs = app.create_folder("docs", None).await;
    app.create_folder("beta", None).await;
    let docs_id = docs["id"].as_str().unwrap();
    app.create_folder("inner", Some(docs_id)).await;

    let roots = app.request("GET", "/api/folders", None).await;
    assert_eq!(roots.status, StatusCode::OK);
    let names: Vec<&str> = roots
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["beta", "docs"]);

    let children = app
        .request("GET", &format!("/api/folders?parent_id={docs_id}"), None)
        .await;
    assert_eq!(children.data().as_array().unwrap().len(), 1);

    let by_path = app
        .request("GET", "/api/folders/by-path?path=/docs", None)
        .await;
    assert_eq!(by_path.status, StatusCode::OK);
    assert_eq!(by_path.data()["id"], docs["id"]);

    let got = app.request("GET", &format!("/api/folders/{docs_id}"), None).await;
    assert_eq!(got.str("name"), "docs");

    let contents = app
        .request("GET", &format!("/api/folders/{docs_id}/contents"), None)
        .await;
    assert_eq!(contents.data()["folder"]["id"], docs["id"]);
    assert_eq!(contents.data()["folders"][0]["name"], "inner");
    assert_eq!(contents.data()["files"].as_array().unwrap().len(), 0);

    let missing = app
        .request("GET", &format!("/api/folders/{}", uuid::Uuid::new_v4()), None)
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rename_moves_subtree() {
    let app = helpers::TestApp::new().await;
    let docs = app.create_folder("docs", None).await;
    let docs_id = docs["id"].as_str().unwrap();
    let inner = app.create_folder("inner", Some(docs_id)).await;

    let renamed = app
        .request(
            "PATCH",
            &format!("/api/folders/{docs_id}"),
            Some(json!({ "name": "papers" })),
        )
        .await;
    assert_eq!(renamed.status, StatusCode::OK, "{}", renamed.body);
    assert_eq!(renamed.str("virtual_path"), "/papers/");
    assert!(app.on_disk("/papers/inner/").is_dir());
    assert!(!app.on_disk("/docs/").exists());

    let inner = app
        .request("GET", &format!("/api/folders/{}", inner["id"].as_str().unwrap()), None)
        .await;
    assert_eq!(inner.str("virtual_path"), "/papers/inner/");
}

#[tokio::test]
async fn test_move_to_root_and_into_descendant() {
    let app = helpers::TestApp::new().await;
    let docs = app.create_folder("docs", None).await;
    let docs_id = docs["id"].as_str().unwrap();
    let inner = app.create_folder("inner", Some(docs_id)).await;
    let inner_id = inner["id"].as_str().unwrap();

    let cycle = app
        .request(
            "PATCH",
            &format!("/api/folders/{docs_id}"),
            Some(json!({ "parent_id": inner_id })),
        )
        .await;
    assert_eq!(cycle.status, StatusCode::BAD_REQUEST);
    assert!(app.on_disk("/docs/inner/").is_dir());

    let to_root = app
        .request(
            "PATCH",
            &format!("/api/folders/{inner_id}"),
            Some(json!({ "parent_id": null })),
        )
        .await;
    assert_eq!(to_root.status, StatusCode::OK);
    assert_eq!(to_root.str("virtual_path"), "/inner/");
    assert!(to_root.data()["parent_id"].is_null());
    assert!(app.on_disk("/inner/").is_dir());
}

#[tokio::test]
async fn test_rename_onto_existing_folder_conflicts() {
    let app = helpers::TestApp::new().await;
    let docs = app.create_folder("docs", None).await;
    app.create_folder("papers", None).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/folders/{}", docs["id"].as_str().unwrap()),
            Some(json!({ "name": "papers" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert!(app.on_disk("/docs/").is_dir());
}

#[tokio::test]
async fn test_delete_folder_removes_subtree() {
    let app = helpers::TestApp::new().await;
    let docs = app.create_folder("docs", None).await;
    let docs_id = docs["id"].as_str().unwrap();
    let inner = app.create_folder("inner", Some(docs_id)).await;

    let uploader = uuid::Uuid::new_v4().to_string();
    let uploaded = app
        .upload(
            &[
                ("uploader_user_id", uploader.as_str()),
                ("folder_id", inner["id"].as_str().unwrap()),
            ],
            "notes.txt",
            b"hello",
        )
        .await;
    assert_eq!(uploaded.status, StatusCode::CREATED);

    let deleted = app
        .request("DELETE", &format!("/api/folders/{docs_id}"), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert!(!app.on_disk("/docs/").exists());

    for path in [
        format!("/api/folders/{docs_id}"),
        format!("/api/folders/{}", inner["id"].as_str().unwrap()),
        format!("/api/files/{}", uploaded.str("id")),
    ] {
        assert_eq!(
            app.request("GET", &path, None).await.status,
            StatusCode::NOT_FOUND
        );
    }

    let again = app
        .request("DELETE", &format!("/api/folders/{docs_id}"), None)
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_archive_records() {
    let app = helpers::TestApp::new().await;
    let docs = app.create_folder("docs", None).await;
    let docs_id = docs["id"].as_str().unwrap();

    let recorded = app
        .request(
            "POST",
            &format!("/api/folders/{docs_id}/archives"),
            Some(json!({ "archive_path": "/archives/docs.zip", "size": 1024, "file_count": 2 })),
        )
        .await;
    assert_eq!(recorded.status, StatusCode::CREATED);
    assert_eq!(recorded.data()["folder_id"], docs["id"]);

    let negative = app
        .request(
            "POST",
            &format!("/api/folders/{docs_id}/archives"),
            Some(json!({ "archive_path": "/archives/x.zip", "size": -1, "file_count": 0 })),
        )
        .await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);

    let listed = app
        .request("GET", &format!("/api/folders/{docs_id}/archives"), None)
        .await;
    assert_eq!(listed.data().as_array().unwrap().len(), 1);

    let deleted = app
        .request("DELETE", &format!("/api/archives/{}", recorded.str("id")), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
}
