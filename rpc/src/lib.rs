//! HTTP API for Dareboard.
//!
//! Provides endpoints for:
//! - Claim submission and record lookup
//! - Subject registration
//! - Admin review and its audit trail
//! - The leaderboard
//! - Health and Prometheus metrics

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod server;

pub use error::RpcError;
pub use metrics::ApiMetrics;
pub use server::{router, AppState, RpcServer};
