//! Data gateway: the boundary between the dashboard store and its backend.
//!
//! The store talks to a `dyn DataGateway` so the backend can be the simulated
//! mock, the SQLite-backed implementation, or a scripted double in tests.

mod chance;
mod mock;
pub mod seed;
mod sqlite;

#[cfg(test)]
pub mod scripted;

pub use chance::*;
pub use mock::*;
pub use sqlite::*;

use async_trait::async_trait;

use crate::models::{ClaimRecord, DashboardSnapshot};

/// Backend operations the dashboard store depends on.
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Fetch the full dashboard snapshot.
    async fn fetch_snapshot(&self) -> Result<DashboardSnapshot, GatewayError>;

    /// Ask the backend to claim a benefit. `Ok(false)` is a normal rejection.
    async fn claim_benefit(&self, benefit_id: &str) -> Result<bool, GatewayError>;

    /// Recorded claims for a benefit, oldest first. `None` when this backend
    /// keeps no history.
    async fn claim_history(
        &self,
        _benefit_id: &str,
    ) -> Result<Option<Vec<ClaimRecord>>, GatewayError> {
        Ok(None)
    }
}

/// Failure of a gateway call itself, as opposed to a rejected claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The backend could not be reached or dropped the call
    Transport(String),
    /// The backing store failed
    Storage(String),
    /// Stored data could not be turned into a snapshot
    Decode(String),
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::Transport(msg) => write!(f, "transport error: {}", msg),
            GatewayError::Storage(msg) => write!(f, "storage error: {}", msg),
            GatewayError::Decode(msg) => write!(f, "decode error: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<sqlx::Error> for GatewayError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Gateway storage error: {:?}", err);
        GatewayError::Storage(err.to_string())
    }
}
