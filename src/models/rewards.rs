//! Reward points model for the analytics panel.

use serde::{Deserialize, Serialize};

/// Direction of monthly earnings, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "up" => Some(Trend::Up),
            "down" => Some(Trend::Down),
            "stable" => Some(Trend::Stable),
            _ => None,
        }
    }
}

/// Points snapshot. The store never recomputes `trend`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardPoints {
    pub current: u64,
    pub lifetime: u64,
    pub this_month: u64,
    pub last_month: u64,
    pub trend: Trend,
    pub next_milestone: u64,
}

impl RewardPoints {
    /// Balance as a share of the next milestone, capped at 100.
    pub fn milestone_progress_percent(&self) -> f64 {
        if self.next_milestone == 0 {
            return 100.0;
        }
        (self.current as f64 / self.next_milestone as f64 * 100.0).min(100.0)
    }

    pub fn remaining_to_milestone(&self) -> u64 {
        self.next_milestone.saturating_sub(self.current)
    }

    /// Month-over-month change. `None` when nothing was earned last month.
    pub fn monthly_change_percent(&self) -> Option<f64> {
        if self.last_month == 0 {
            return None;
        }
        let delta = self.this_month as f64 - self.last_month as f64;
        Some(delta / self.last_month as f64 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(current: u64, next_milestone: u64, this_month: u64, last_month: u64) -> RewardPoints {
        RewardPoints {
            current,
            lifetime: 100_000,
            this_month,
            last_month,
            trend: Trend::Stable,
            next_milestone,
        }
    }

    #[test]
    fn test_milestone_progress() {
        let p = points(7_500, 10_000, 0, 0);
        assert_eq!(p.milestone_progress_percent(), 75.0);
        assert_eq!(p.remaining_to_milestone(), 2_500);

        let passed = points(12_000, 10_000, 0, 0);
        assert_eq!(passed.milestone_progress_percent(), 100.0);
        assert_eq!(passed.remaining_to_milestone(), 0);
    }

    #[test]
    fn test_monthly_change_percent() {
        assert_eq!(points(0, 1, 150, 100).monthly_change_percent(), Some(50.0));
        assert_eq!(points(0, 1, 50, 100).monthly_change_percent(), Some(-50.0));
        assert_eq!(points(0, 1, 50, 0).monthly_change_percent(), None);
    }

    #[test]
    fn test_trend_parse() {
        assert_eq!(Trend::parse("down"), Some(Trend::Down));
        assert_eq!(Trend::parse(Trend::Stable.as_str()), Some(Trend::Stable));
        assert_eq!(Trend::parse("sideways"), None);
    }
}
