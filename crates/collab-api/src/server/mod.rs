//! Server setup and initialization
//!
//! Wires the storage backend chosen in the configuration into a
//! [`ServiceContext`], builds the router and runs it.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use collab_cache::{LocalEventBus, RedisEventBus, RedisPool, RedisPresenceStore};
use collab_common::{AppConfig, AppError, JwtService, StorageBackend};
use collab_core::{Employee, SnowflakeGenerator};
use collab_db::{
    create_pool, run_migrations, InMemoryStore, PgCategoryRepository, PgChannelRepository,
    PgDirectoryService, PgMemberRepository, PgMessageRepository, PgPollRepository,
    PgQuickReplyRepository, PgReactionRepository, PgReadStateRepository, PgSavedItemRepository,
    StaticDirectory,
};
use collab_service::{
    CachedDirectory, LoggingNotifier, ServiceContext, ServiceContextBuilder, ServiceSettings,
};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::middleware::apply_middleware;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;
use crate::storage::LocalFileStore;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let config = state.config();
    let router = apply_middleware(create_router(config), config);

    // Health probes bypass rate limiting
    let mut router = router.merge(health_routes());

    let base = config.files.public_base_url.trim_end_matches('/');
    if base.starts_with('/') && base.len() > 1 {
        router = router.nest_service(base, ServeDir::new(&config.files.upload_dir));
    }

    router.with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let builder = match config.storage {
        StorageBackend::Memory => memory_backend(&config).await?,
        StorageBackend::Postgres => postgres_backend(&config).await?,
    };

    let file_store = LocalFileStore::new(
        config.files.upload_dir.clone(),
        config.files.public_base_url.clone(),
    );

    let service_context = builder
        .file_store(Arc::new(file_store))
        .notifier(Arc::new(LoggingNotifier))
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .settings(ServiceSettings::from(&config))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let identity = Arc::new(JwtService::from_config(&config.jwt));
    Ok(AppState::new(service_context, identity, config))
}

async fn memory_backend(config: &AppConfig) -> Result<ServiceContextBuilder, AppError> {
    let employees = load_roster(config.collab.directory_seed_file.as_deref()).await?;
    info!(employees = employees.len(), "Using in-memory storage");

    Ok(ServiceContext::builder()
        .memory_store(Arc::new(InMemoryStore::new()))
        .directory(Arc::new(StaticDirectory::new(employees)))
        .events(Arc::new(LocalEventBus::default())))
}

/// Employee roster for the in-memory directory, a JSON array of `{id, name}`
async fn load_roster(path: Option<&str>) -> Result<Vec<Employee>, AppError> {
    let Some(path) = path else {
        warn!("DIRECTORY_SEED_FILE not set, the employee directory is empty");
        return Ok(Vec::new());
    };

    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::Config(format!("Failed to read {path}: {e}")))?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::Config(format!("Invalid employee roster in {path}: {e}")))
}

async fn postgres_backend(config: &AppConfig) -> Result<ServiceContextBuilder, AppError> {
    let db_config = config
        .database
        .as_ref()
        .ok_or_else(|| AppError::Config("DATABASE_URL is required for postgres storage".into()))?;
    let redis_config = config
        .redis
        .as_ref()
        .ok_or_else(|| AppError::Config("REDIS_URL is required for postgres storage".into()))?;

    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&collab_db::DatabaseConfig::from(db_config))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    if db_config.run_migrations {
        run_migrations(&pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        info!("Database migrations applied");
    }

    info!("Connecting to Redis...");
    let redis_pool =
        RedisPool::from_config(redis_config).map_err(|e| AppError::Cache(e.to_string()))?;
    info!("Redis pool created");

    let directory = CachedDirectory::new(
        Arc::new(PgDirectoryService::new(pool.clone())),
        Duration::from_secs(config.collab.directory_cache_ttl_secs),
    );
    let presence = RedisPresenceStore::new(redis_pool.clone(), config.collab.presence_ttl_secs);

    Ok(ServiceContext::builder()
        .pool(pool.clone())
        .redis_pool(redis_pool.clone())
        .channel_repo(Arc::new(PgChannelRepository::new(pool.clone())))
        .category_repo(Arc::new(PgCategoryRepository::new(pool.clone())))
        .member_repo(Arc::new(PgMemberRepository::new(pool.clone())))
        .message_repo(Arc::new(PgMessageRepository::new(pool.clone())))
        .reaction_repo(Arc::new(PgReactionRepository::new(pool.clone())))
        .poll_repo(Arc::new(PgPollRepository::new(pool.clone())))
        .read_state_repo(Arc::new(PgReadStateRepository::new(pool.clone())))
        .saved_item_repo(Arc::new(PgSavedItemRepository::new(pool.clone())))
        .quick_reply_repo(Arc::new(PgQuickReplyRepository::new(pool)))
        .presence_repo(Arc::new(presence))
        .directory(Arc::new(directory))
        .events(Arc::new(RedisEventBus::connect(redis_pool))))
}

/// Run the HTTP server until Ctrl-C
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .server
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid server address: {e}")))?;

    let state = create_app_state(config).await?;
    run_server(create_app(state), addr).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use collab_common::{
        AppSettings, CollabSettings, CorsConfig, FileConfig, JwtConfig, RateLimitConfig,
        ServerConfig, SnowflakeConfig,
    };
    use collab_core::{Principal, Snowflake};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const SECRET: &str = "router-test-secret-that-is-long-enough";

    fn memory_config() -> AppConfig {
        AppConfig {
            app: AppSettings::default(),
            server: ServerConfig::default(),
            storage: StorageBackend::Memory,
            database: None,
            redis: None,
            jwt: JwtConfig {
                secret: SECRET.to_string(),
                access_token_expiry: 900,
                issuer: None,
            },
            rate_limit: RateLimitConfig {
                enabled: false,
                ..Default::default()
            },
            cors: CorsConfig::default(),
            files: FileConfig {
                upload_dir: std::env::temp_dir()
                    .join("collab-api-router-tests")
                    .to_string_lossy()
                    .into_owned(),
                ..Default::default()
            },
            snowflake: SnowflakeConfig::default(),
            collab: CollabSettings::default(),
        }
    }

    fn bearer(user_id: i64) -> String {
        let token = JwtService::new(SECRET, 900)
            .issue(&Principal::new(Snowflake::new(user_id)))
            .unwrap();
        format!("Bearer {token}")
    }

    async fn app() -> Router {
        create_app(create_app_state(memory_config()).await.unwrap())
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    fn json_request(method: &str, uri: &str, user_id: i64, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, bearer(user_id))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str, user_id: i64) -> Request<Body> {
        Request::get(uri)
            .header(header::AUTHORIZATION, bearer(user_id))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_routes() {
        let app = app().await;

        let (status, _) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) =
            send(&app, Request::get("/health/ready").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert!(body["checks"]["database"].is_null());
    }

    #[tokio::test]
    async fn test_requests_without_token_are_rejected() {
        let app = app().await;

        let request = Request::get("/api/v1/channels").body(Body::empty()).unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "MISSING_AUTHORIZATION");

        let request = Request::get("/api/v1/channels")
            .header(header::AUTHORIZATION, "Bearer not-a-token")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn test_malformed_ids_are_bad_requests() {
        let app = app().await;
        let (status, body) = send(&app, get("/api/v1/channels/abc", 1)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_PATH_PARAMETER");
    }

    #[tokio::test]
    async fn test_channel_and_message_flow() {
        let app = app().await;

        let (status, channel) = send(
            &app,
            json_request("POST", "/api/v1/channels", 1, &json!({"name": "general"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let channel_id = channel["id"].as_str().unwrap().to_string();

        let uri = format!("/api/v1/channels/{channel_id}/messages");
        let (status, message) =
            send(&app, json_request("POST", &uri, 1, &json!({"content": "hello"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(message["content"], "hello");

        let (status, messages) = send(&app, get(&uri, 1)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(messages.as_array().unwrap().len(), 1);

        // Not a member yet
        let (status, _) =
            send(&app, json_request("POST", &uri, 2, &json!({"content": "hi"}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_invalid_body_is_reported() {
        let app = app().await;
        let (status, body) = send(
            &app,
            json_request("POST", "/api/v1/channels", 1, &json!({"name": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
