//! User profile model shown on the profile card.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The signed-in member. Replaced wholesale on every reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub level: u32,
    #[serde(rename = "currentXP")]
    pub current_xp: u64,
    #[serde(rename = "targetXP")]
    pub target_xp: u64,
    pub title: String,
    pub member_since: NaiveDate,
}

impl User {
    /// Progress towards the next level, 0..=100.
    pub fn xp_progress_percent(&self) -> f64 {
        if self.target_xp == 0 {
            return 100.0;
        }
        (self.current_xp as f64 / self.target_xp as f64 * 100.0).min(100.0)
    }
}
