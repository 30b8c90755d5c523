#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use school_api::app::{app, AppState};
use school_api::auth::{Credentials, Passwords};
use school_api::config::AppConfig;
use school_api::database::models::{NewProgram, NewUser};
use school_api::database::{MemoryStore, Store};

pub const PASSWORD: &str = "password123";

/// Seeded accounts, by id:
/// 1 admin, 2 coach, 3 athlete, 4 plain user, 5 no roles, 6 second coach.
pub const ADMIN: &str = "admin@example.com";
pub const COACH: &str = "coach@example.com";
pub const ATHLETE: &str = "athlete@example.com";
pub const USER: &str = "user@example.com";
pub const NOBODY: &str = "nobody@example.com";
pub const OTHER_COACH: &str = "coach2@example.com";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
}

fn fast_passwords() -> Passwords {
    Passwords::new(8, 1, 1).expect("valid argon2 params")
}

fn new_user(email: &str, password_hash: &str) -> NewUser {
    NewUser {
        first_name: "Test".into(),
        last_name: email.split('@').next().unwrap_or_default().to_string(),
        email_address: email.into(),
        password_hash: password_hash.into(),
        date_of_birth: None,
        biological_sex: None,
        phone: None,
        city: None,
        biography: None,
        avatar_url: None,
    }
}

impl TestApp {
    /// Router over a fresh in-memory store with one user per role and two
    /// programs by the first coach: id 1 public, id 2 private.
    pub async fn seeded() -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let passwords = fast_passwords();
        let hash = passwords.hash(PASSWORD)?;

        for (email, roles) in [
            (ADMIN, "admin"),
            (COACH, "athlete coach"),
            (ATHLETE, "athlete"),
            (USER, "user"),
            (NOBODY, ""),
            (OTHER_COACH, "coach"),
        ] {
            store.insert_user_with_roles(new_user(email, &hash), roles).await?;
        }

        store
            .create_program(
                2,
                NewProgram {
                    title: "Open mobility".into(),
                    is_private: false,
                    description: "Shared with every athlete".into(),
                },
            )
            .await?;
        store
            .create_program(
                2,
                NewProgram {
                    title: "Coach notes".into(),
                    is_private: true,
                    description: "Only for the author".into(),
                },
            )
            .await?;

        let config = AppConfig::development();
        let state = AppState::new(store.clone(), passwords, config.school.clone());
        Ok(Self {
            router: app(state, &config),
            store,
        })
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        auth: Option<(&str, &str)>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((email, password)) = auth {
            builder = builder.header(
                header::AUTHORIZATION,
                Credentials::new(email, password).to_basic_header(),
            );
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };
        Ok(TestResponse { status, location, body })
    }

    /// Sends `body` verbatim as a JSON request body.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        auth: Option<&str>,
        body: &str,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(email) = auth {
            builder = builder.header(
                header::AUTHORIZATION,
                Credentials::new(email, PASSWORD).to_basic_header(),
            );
        }
        let request = builder.body(Body::from(body.to_string()))?;
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = serde_json::from_slice(&bytes).context("response body is not JSON")?;
        Ok(TestResponse {
            status,
            location: None,
            body,
        })
    }

    pub async fn get(&self, uri: &str, auth: Option<&str>) -> Result<TestResponse> {
        self.request(Method::GET, uri, auth.map(|e| (e, PASSWORD)), None).await
    }

    pub async fn post(&self, uri: &str, auth: Option<&str>, body: Value) -> Result<TestResponse> {
        self.request(Method::POST, uri, auth.map(|e| (e, PASSWORD)), Some(body)).await
    }

    pub async fn put(&self, uri: &str, auth: Option<&str>, body: Value) -> Result<TestResponse> {
        self.request(Method::PUT, uri, auth.map(|e| (e, PASSWORD)), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, auth: Option<&str>) -> Result<TestResponse> {
        self.request(Method::DELETE, uri, auth.map(|e| (e, PASSWORD)), None).await
    }
}

/// The compiled `school-api` binary running against the in-memory store.
/// Owned by one test and killed when dropped.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_school-api"));
        cmd.env("SCHOOL_API_PORT", port.to_string())
            .env("STORE_BACKEND", "memory")
            .env("SECURITY_ARGON2_M", "8")
            .env("SECURITY_ARGON2_T", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    /// True while the child process has not exited.
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub async fn start_server() -> Result<TestServer> {
    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}
