//! Data models for the rewards dashboard.
//!
//! Field names serialize in camelCase to match what the dashboard view consumes.

mod benefit;
mod claim;
mod dashboard;
mod rewards;
mod user;

pub use benefit::*;
pub use claim::*;
pub use dashboard::*;
pub use rewards::*;
pub use user::*;
