//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers, making HTTP requests and
//! opening channel event sockets.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use collab_api::{create_app, create_app_state};
use collab_common::{
    AppConfig, AppSettings, CollabSettings, CorsConfig, FileConfig, JwtConfig, JwtService,
    RateLimitConfig, ServerConfig, SnowflakeConfig, StorageBackend,
};
use collab_core::{Principal, Snowflake};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::fixtures::roster;

const TEST_SECRET: &str = "integration-test-secret-with-enough-length";

pub type EventSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    jwt: JwtService,
    work_dir: PathBuf,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server backed by in-memory storage and the fixture roster
    pub async fn start() -> Result<Self> {
        let work_dir = std::env::temp_dir().join(format!("collab-it-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&work_dir).await?;

        let roster_path = work_dir.join("roster.json");
        tokio::fs::write(&roster_path, serde_json::to_vec(&roster())?).await?;

        let config = test_config(&work_dir, &roster_path);
        Self::start_with_config(config, work_dir).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig, work_dir: PathBuf) -> Result<Self> {
        let jwt = JwtService::from_config(&config.jwt);
        let state = create_app_state(config).await?;
        let app = create_app(state);

        // Port 0: the OS picks a free one
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            jwt,
            work_dir,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Bearer token for a roster user
    pub fn token(&self, user_id: Snowflake) -> Result<String> {
        Ok(self.jwt.issue(&Principal::new(user_id))?)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// Make a GET request with auth token
    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Make a POST request with auth token
    pub async fn post_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a PATCH request with auth token
    pub async fn patch_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .patch(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a PUT request with auth token
    pub async fn put_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a DELETE request with auth token
    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Upload raw bytes as a file
    pub async fn upload(
        &self,
        token: &str,
        name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/api/v1/files"))
            .query(&[("name", name)])
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, mime)
            .body(bytes)
            .send()
            .await?)
    }

    /// Open the event socket of a channel
    pub async fn connect_events(&self, channel_id: Snowflake, token: &str) -> Result<EventSocket> {
        let url = format!("ws://{}/api/v1/channels/{channel_id}/events", self.addr);
        let mut request = url.into_client_request()?;
        request
            .headers_mut()
            .insert("Authorization", HeaderValue::from_str(&format!("Bearer {token}"))?);
        let (socket, _) = connect_async(request).await?;
        Ok(socket)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.work_dir);
    }
}

/// In-memory configuration rooted at `work_dir`
pub fn test_config(work_dir: &std::path::Path, roster_path: &std::path::Path) -> AppConfig {
    AppConfig {
        app: AppSettings::default(),
        server: ServerConfig::default(),
        storage: StorageBackend::Memory,
        database: None,
        redis: None,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expiry: 900,
            issuer: None,
        },
        rate_limit: RateLimitConfig {
            enabled: false,
            ..Default::default()
        },
        cors: CorsConfig::default(),
        files: FileConfig {
            upload_dir: work_dir.join("uploads").to_string_lossy().into_owned(),
            ..Default::default()
        },
        snowflake: SnowflakeConfig::default(),
        collab: CollabSettings {
            directory_seed_file: Some(roster_path.to_string_lossy().into_owned()),
            ..Default::default()
        },
    }
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}

/// Assert an error response and return its code
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<String> {
    let body: serde_json::Value = assert_json(response, expected_status).await?;
    Ok(body["error"]["code"].as_str().unwrap_or_default().to_string())
}
