//! Dashboard snapshot and store state models.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{Benefit, BenefitCategory, RewardPoints, User};

/// A complete set of dashboard data as returned by a gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub user: User,
    pub benefits: Vec<Benefit>,
    pub reward_points: RewardPoints,
    pub is_loading: bool,
}

impl DashboardSnapshot {
    /// Describes every field combination that looks inconsistent.
    ///
    /// An empty list means the snapshot is internally consistent.
    pub fn consistency_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.user.target_xp == 0 {
            issues.push("user targetXP is zero".to_string());
        } else if self.user.current_xp > self.user.target_xp {
            issues.push(format!(
                "user currentXP {} exceeds targetXP {}",
                self.user.current_xp, self.user.target_xp
            ));
        }

        let points = &self.reward_points;
        if points.current > points.lifetime {
            issues.push(format!(
                "current points {} exceed lifetime total {}",
                points.current, points.lifetime
            ));
        }
        if points.this_month > points.lifetime {
            issues.push(format!(
                "points earned this month {} exceed lifetime total {}",
                points.this_month, points.lifetime
            ));
        }

        let mut seen = HashSet::new();
        for benefit in &self.benefits {
            if !seen.insert(benefit.id.as_str()) {
                issues.push(format!("duplicate benefit id {}", benefit.id));
            }
        }

        issues
    }
}

/// State held by the dashboard store.
///
/// `user` and `reward_points` stay absent until the first successful load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub user: Option<User>,
    pub benefits: Vec<Benefit>,
    pub reward_points: Option<RewardPoints>,
    pub is_loading: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            user: None,
            benefits: Vec::new(),
            reward_points: None,
            is_loading: true,
        }
    }
}

impl DashboardState {
    /// Derived display values. `None` before the first successful load.
    pub fn summary(&self) -> Option<DashboardSummary> {
        let user = self.user.as_ref()?;
        let points = self.reward_points.as_ref()?;

        let benefits_claimed = self.benefits.iter().filter(|b| b.claimed).count();
        let mut by_category: BTreeMap<String, usize> = BenefitCategory::ALL
            .iter()
            .map(|c| (c.as_str().to_string(), 0))
            .collect();
        for benefit in &self.benefits {
            *by_category
                .entry(benefit.category.as_str().to_string())
                .or_insert(0) += 1;
        }

        Some(DashboardSummary {
            level: user.level,
            xp_progress_percent: user.xp_progress_percent(),
            milestone_progress_percent: points.milestone_progress_percent(),
            points_to_milestone: points.remaining_to_milestone(),
            monthly_change_percent: points.monthly_change_percent(),
            benefits_total: self.benefits.len(),
            benefits_claimed,
            benefits_available: self.benefits.len() - benefits_claimed,
            benefits_by_category: by_category,
        })
    }
}

/// Values the dashboard view derives from the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub level: u32,
    pub xp_progress_percent: f64,
    pub milestone_progress_percent: f64,
    pub points_to_milestone: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_change_percent: Option<f64>,
    pub benefits_total: usize,
    pub benefits_claimed: usize,
    pub benefits_available: usize,
    pub benefits_by_category: BTreeMap<String, usize>,
}
