#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, HeaderName, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use salesdesk_api::auth::{generate_jwt, hash_password};
use salesdesk_api::config::AppConfig;
use salesdesk_api::models::User;
use salesdesk_api::platform::Table;
use salesdesk_api::state::AppState;
use salesdesk_api::testing::MemoryPlatform;

pub const ADMIN_TOKEN: &str = "test-admin-token";

// ---------------------------------------------------------------------------
// Spawned server (smoke tests)
// ---------------------------------------------------------------------------

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // The platform URL points at a closed port: the server must still
        // start, answer public routes and report itself degraded.
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_salesdesk-api"));
        cmd.env("SALESDESK_API_PORT", port.to_string())
            .env("HOST", "127.0.0.1")
            .env("APP_ENV", "development")
            .env("SUPABASE_URL", "http://127.0.0.1:9")
            .env("SUPABASE_SERVICE_ROLE_KEY", "smoke-service-key")
            .env("JWT_SECRET", "smoke-jwt-secret-with-enough-length")
            .env("ADMIN_PROVISIONING_TOKEN", ADMIN_TOKEN)
            .env("PLATFORM_TIMEOUT_SECS", "2")
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(format!("{}/", self.base_url)).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

// ---------------------------------------------------------------------------
// In-process router over MemoryPlatform
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub platform: Arc<MemoryPlatform>,
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::for_testing())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let platform = Arc::new(MemoryPlatform::new());
        let state = AppState::new(config, platform.clone());
        let router = salesdesk_api::app(state.clone());
        Self {
            platform,
            state,
            router,
        }
    }

    /// Store a `users` row with a bcrypt-hashed password and return it
    pub async fn seed_user(&self, id: &str, email: &str, password: &str) -> User {
        let row = json!({
            "id": id,
            "email": email,
            "password": hash_password(password, 4).expect("hash"),
            "name": format!("User {}", id),
            "role": "sales"
        });
        self.platform.seed(Table::Users, row.clone()).await;
        User::from_row(row).expect("user row")
    }

    pub fn token_for(&self, user: &User) -> String {
        generate_jwt(user, &self.state.config).expect("token")
    }

    /// Seed a user and return its bearer token
    pub async fn login_as(&self, id: &str, email: &str) -> String {
        let user = self.seed_user(id, email, "password").await;
        self.token_for(&user)
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let headers: Vec<(HeaderName, String)> = token
            .map(|t| vec![(header::AUTHORIZATION, format!("Bearer {}", t))])
            .unwrap_or_default();
        self.request_with_headers(method, path, &headers, body).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        path: &str,
        headers: &[(HeaderName, String)],
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let body = match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        };
        self.send_raw(method, path, headers, body).await
    }

    /// Send an arbitrary body with a JSON content type
    pub async fn send_raw(
        &self,
        method: Method,
        path: &str,
        headers: &[(HeaderName, String)],
        body: Body,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        let request = builder.body(body).expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }
}
