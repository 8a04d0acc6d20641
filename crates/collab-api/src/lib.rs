//! # collab-api
//!
//! REST API server built with Axum, plus a WebSocket relay of channel events.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;
pub mod storage;

pub use server::{create_app, create_app_state, run, run_server};
pub use state::AppState;
