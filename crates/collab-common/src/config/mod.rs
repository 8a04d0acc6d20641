//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, CollabSettings, ConfigError, CorsConfig, DatabaseConfig,
    Environment, FileConfig, JwtConfig, RateLimitConfig, RedisConfig, ServerConfig,
    SnowflakeConfig, StorageBackend,
};
