//! Sheetwrap API Server module
//!
//! Provides the HTTP JSON API. Run with `sheetwrap-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server, ApiConfig, AppState};
