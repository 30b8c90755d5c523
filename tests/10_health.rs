mod common;

use anyhow::Result;
use axum::http::StatusCode;
use reqwest::StatusCode as HttpStatus;

#[tokio::test]
async fn spawned_server_reports_healthy() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", server.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatus::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["database"], "ok");

    let res = client.get(format!("{}/api/nowhere", server.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatus::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn spawned_server_stops_with_its_handle() -> Result<()> {
    let mut server = common::start_server().await?;
    assert!(server.is_running());
    let base_url = server.base_url.clone();
    drop(server);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(2))
        .build()?;
    assert!(client.get(format!("{}/health", base_url)).send().await.is_err());
    Ok(())
}

#[tokio::test]
async fn welcome_and_fallback() -> Result<()> {
    let app = common::TestApp::seeded().await?;

    let res = app.get("/", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body["message"].as_str().unwrap_or_default().starts_with("Welcome"));

    let res = app.get("/api/unknown", None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Route Not Found");
    Ok(())
}
