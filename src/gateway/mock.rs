//! Simulated gateway with fixed latency and a claim success rate.

use std::time::Duration;

use async_trait::async_trait;

use super::{seed, ClaimChance, DataGateway, GatewayError, UuidChance};
use crate::models::DashboardSnapshot;

pub const DEFAULT_FETCH_DELAY: Duration = Duration::from_millis(1500);
pub const DEFAULT_CLAIM_DELAY: Duration = Duration::from_millis(800);
pub const DEFAULT_CLAIM_SUCCESS_RATE: f64 = 0.9;

/// Timing and probability knobs for [`MockGateway`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockSettings {
    pub fetch_delay: Duration,
    pub claim_delay: Duration,
    pub claim_success_rate: f64,
}

impl Default for MockSettings {
    fn default() -> Self {
        Self {
            fetch_delay: DEFAULT_FETCH_DELAY,
            claim_delay: DEFAULT_CLAIM_DELAY,
            claim_success_rate: DEFAULT_CLAIM_SUCCESS_RATE,
        }
    }
}

/// Serves the seed snapshot and approves claims at random.
///
/// Holds no mutable state: every call is independent, and claims are not
/// validated against the benefit collection.
pub struct MockGateway {
    settings: MockSettings,
    chance: Box<dyn ClaimChance>,
}

impl MockGateway {
    pub fn new(settings: MockSettings) -> Self {
        Self::with_chance(settings, UuidChance)
    }

    pub fn with_chance(settings: MockSettings, chance: impl ClaimChance + 'static) -> Self {
        Self {
            settings,
            chance: Box::new(chance),
        }
    }

    pub fn settings(&self) -> &MockSettings {
        &self.settings
    }
}

#[async_trait]
impl DataGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_snapshot(&self) -> Result<DashboardSnapshot, GatewayError> {
        tokio::time::sleep(self.settings.fetch_delay).await;
        Ok(seed::dashboard_snapshot())
    }

    async fn claim_benefit(&self, benefit_id: &str) -> Result<bool, GatewayError> {
        tokio::time::sleep(self.settings.claim_delay).await;
        let approved = self.chance.roll() < self.settings.claim_success_rate;
        tracing::debug!(benefit_id, approved, "Mock claim resolved");
        Ok(approved)
    }
}
