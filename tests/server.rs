//! HTTP surface tests against a server bound to an ephemeral port.

#![cfg(feature = "server")]

mod common;

use common::{page_widths, unzip_single, zip_of, StubRenderer};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use std::sync::Arc;
use zpl2pdf::server::{self, ServerConfig};
use zpl2pdf::{ConversionConfig, ConversionContext};

/// Start a server with the stub renderer; returns its base URL.
async fn spawn_server() -> String {
    let config = ConversionConfig::default();
    let ctx = ConversionContext::new(&config)
        .unwrap()
        .with_renderer(Arc::new(StubRenderer::default()));
    let server_config = ServerConfig::default();
    let app = server::router(config, ctx, &server_config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        server::serve(listener, app).await.unwrap();
    });

    format!("http://{}{}", addr, server_config.base_path)
}

fn upload_form(archive: Vec<u8>, id: &str, speed: &str) -> Form {
    Form::new()
        .text("id", id.to_string())
        .text("speed", speed.to_string())
        .part("file", Part::bytes(archive).file_name("labels.zip"))
}

#[tokio::test]
async fn upload_returns_zipped_combined_pdf() {
    let base = spawn_server().await;
    let archive = zip_of(&[("a.zpl", "~DGR:3\n^XA"), ("b.zpl", "~DGR:4\n^XA~DGR:5\n^XA")]);

    let resp = reqwest::Client::new()
        .post(format!("{base}/upload"))
        .multipart(upload_form(archive, "job-1", "1"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "application/zip");
    assert_eq!(
        resp.headers()["content-disposition"],
        "attachment; filename=converted.zip"
    );

    let body = resp.bytes().await.unwrap();
    let (name, pdf) = unzip_single(&body);
    assert_eq!(name, "combined.pdf");
    assert_eq!(page_widths(&pdf), vec![3, 4, 5]);
}

#[tokio::test]
async fn status_is_read_once() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();
    let archive = zip_of(&[("a.zpl", "~DGR:1\nx~DGR:2\ny")]);

    let resp = client
        .post(format!("{base}/upload"))
        .multipart(upload_form(archive, "poll-me", "1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let first: serde_json::Value = client
        .get(format!("{base}/status/poll-me"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["labels"], 2);
    assert_eq!(first["time"].as_f64(), Some(0.002));

    let second: serde_json::Value = client
        .get(format!("{base}/status/poll-me"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["labels"], 0);
    assert_eq!(second["time"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn missing_file_is_a_400() {
    let base = spawn_server().await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/upload"))
        .multipart(Form::new().text("id", "nofile"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.text().await.unwrap(), "No file uploaded.");
}

#[tokio::test]
async fn malformed_archive_is_a_400() {
    let base = spawn_server().await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/upload"))
        .multipart(upload_form(b"definitely not a zip".to_vec(), "bad", "1"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(resp.text().await.unwrap().starts_with("Invalid archive"));
}

#[tokio::test]
async fn failed_label_turns_into_a_400() {
    let base = spawn_server().await;
    let archive = zip_of(&[("a.zpl", "~DGR:1\nx~DGR:FAIL\ny~DGR:3\nz")]);

    let resp = reqwest::Client::new()
        .post(format!("{base}/upload"))
        .multipart(upload_form(archive, "broken", "1"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let text = resp.text().await.unwrap();
    assert!(text.contains("a_part2.pdf"), "got: {text}");
}
