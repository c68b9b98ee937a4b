//! End-to-end tests of the session routes against stub collaborators.

mod common;

use axum::http::StatusCode;
use common::*;
use semparse_core::EXPORT_FILE_NAME;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(
        test_config(dir.path()),
        StubEngine::returning(sample_response()),
        Arc::new(RecordingExporter::default()),
    );

    let (status, body) = send_json(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_full_pipeline_writes_grid() {
    let dir = tempfile::tempdir().unwrap();
    let engine = StubEngine::returning(sample_response());
    let (app, state) = test_app(
        test_config(dir.path()),
        engine.clone(),
        Arc::new(semparse_core::CsvGridExporter::new(dir.path())),
    );

    let (status, body) = send_json(&app, "GET", "/api/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "empty");
    assert_eq!(body["session_id"], state.session.id().to_string());

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/session/paste",
        Some(json!({ "text": sample_lines().join("\n") })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "collected");
    assert_eq!(body["line_count"], 5);
    assert_eq!(body["meets_recommended_size"], true);

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/session/submit",
        Some(json!({ "min_cluster_size": 2, "min_samples": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "clustered");
    assert_eq!(body["params"]["min_cluster_size"], 2);
    let clusters = body["clusters"].as_array().unwrap();
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0]["label"], "Cluster 1");
    assert_eq!(clusters[0]["lines"], json!(["apples", "pears"]));
    assert_eq!(clusters[1]["label"], "Cluster 2");
    assert_eq!(engine.call_count(), 1);

    let (status, body) = send_json(&app, "POST", "/api/session/export", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "clustered");

    let written = std::fs::read_to_string(dir.path().join(EXPORT_FILE_NAME)).unwrap();
    assert_eq!(
        written,
        "Cluster 1,Cluster 2\napples,cars\npears,trucks\n,bikes\n"
    );

    let (status, body) = send_json(&app, "POST", "/api/session/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "empty");
    assert_eq!(body["line_count"], 0);
    assert!(body.get("clusters").is_none());
}

#[tokio::test]
async fn test_export_to_requested_dir() {
    let dir = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    let exporter = Arc::new(RecordingExporter::default());
    let mut config = test_config(dir.path());
    config.word_clouds = true;
    let (app, _) = test_app(config, StubEngine::returning(sample_response()), exporter.clone());

    send_json(&app, "POST", "/api/session/lines", Some(json!({ "lines": sample_lines() }))).await;
    send_json(
        &app,
        "POST",
        "/api/session/submit",
        Some(json!({ "min_cluster_size": 5, "min_samples": 3 })),
    )
    .await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/session/export",
        Some(json!({ "dir": target.path() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(target.path().join(EXPORT_FILE_NAME).exists());
    assert!(target.path().join("cluster_1.png").exists());
    assert!(target.path().join("cluster_2.png").exists());
    assert!(exporter.exported().is_empty());
}

#[tokio::test]
async fn test_invalid_params_rejected_without_engine_call() {
    let dir = tempfile::tempdir().unwrap();
    let engine = StubEngine::returning(sample_response());
    let (app, _) = test_app(
        test_config(dir.path()),
        engine.clone(),
        Arc::new(RecordingExporter::default()),
    );

    send_json(&app, "POST", "/api/session/lines", Some(json!({ "lines": sample_lines() }))).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/session/submit",
        Some(json!({ "min_cluster_size": 0, "min_samples": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/session/submit",
        Some(json!({ "min_cluster_size": "five", "min_samples": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");

    let (status, body) = send_json(&app, "POST", "/api/session/submit", Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");

    assert_eq!(engine.call_count(), 0);

    let (_, body) = send_json(&app, "GET", "/api/session", None).await;
    assert_eq!(body["stage"], "collected");
    assert_eq!(body["last_failure"]["kind"], "validation");
}

#[tokio::test]
async fn test_engine_failure_keeps_lines() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(
        test_config(dir.path()),
        StubEngine::failing("model not loaded"),
        Arc::new(RecordingExporter::default()),
    );

    send_json(&app, "POST", "/api/session/lines", Some(json!({ "lines": sample_lines() }))).await;
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/session/submit",
        Some(json!({ "min_cluster_size": 5, "min_samples": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "clustering_engine");
    assert!(body["message"].as_str().unwrap().contains("model not loaded"));

    let (_, body) = send_json(&app, "GET", "/api/session", None).await;
    assert_eq!(body["stage"], "collected");
    assert_eq!(body["line_count"], 5);
}

#[tokio::test]
async fn test_stage_errors() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = Arc::new(RecordingExporter::default());
    let (app, _) = test_app(
        test_config(dir.path()),
        StubEngine::returning(sample_response()),
        exporter.clone(),
    );

    let (status, body) = send_json(&app, "POST", "/api/session/export", Some(json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "invalid_stage");
    assert!(exporter.exported().is_empty());

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/session/submit",
        Some(json!({ "min_cluster_size": 5, "min_samples": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "invalid_stage");
}

#[tokio::test]
async fn test_acquisition_errors() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(
        test_config(dir.path()),
        StubEngine::returning(sample_response()),
        Arc::new(RecordingExporter::default()),
    );

    let (status, body) = send_json(&app, "POST", "/api/session/paste", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "clipboard_unavailable");

    let (status, body) =
        send_json(&app, "POST", "/api/session/csv", Some(json!({ "path": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "file_not_selected");

    let missing = dir.path().join("missing.csv");
    let (status, body) =
        send_json(&app, "POST", "/api/session/csv", Some(json!({ "path": missing }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "file_unreadable");

    let (_, body) = send_json(&app, "GET", "/api/session", None).await;
    assert_eq!(body["stage"], "empty");
}

#[tokio::test]
async fn test_csv_upload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.csv");
    std::fs::write(&path, "text,score\nfirst line,1\n\nsecond line,2\n").unwrap();

    let (app, _) = test_app(
        test_config(dir.path()),
        StubEngine::returning(sample_response()),
        Arc::new(RecordingExporter::default()),
    );

    let (status, body) =
        send_json(&app, "POST", "/api/session/csv", Some(json!({ "path": path }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "collected");
    assert_eq!(body["lines"], json!(["first line", "second line"]));
    assert_eq!(body["meets_recommended_size"], false);
}

#[tokio::test]
async fn test_abandon_always_clears() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(
        test_config(dir.path()),
        StubEngine::returning(sample_response()),
        Arc::new(RecordingExporter::default()),
    );

    send_json(&app, "POST", "/api/session/lines", Some(json!({ "lines": sample_lines() }))).await;
    let (status, body) = send_json(&app, "POST", "/api/session/abandon", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "empty");
    assert!(body.get("busy").is_none());
}
