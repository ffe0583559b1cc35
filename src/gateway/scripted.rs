//! Deterministic gateway double for store and API tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{seed, DataGateway, GatewayError};
use crate::models::{ClaimRecord, DashboardSnapshot};

/// Replays queued outcomes; falls back to the seed snapshot and approval.
#[derive(Default)]
pub struct ScriptedGateway {
    snapshots: Mutex<VecDeque<Result<DashboardSnapshot, GatewayError>>>,
    claims: Mutex<VecDeque<Result<bool, GatewayError>>>,
    histories: Mutex<VecDeque<Result<Option<Vec<ClaimRecord>>, GatewayError>>>,
    claim_gate: Option<Arc<Notify>>,
    fetch_calls: AtomicUsize,
    claim_calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims wait for `gate.notify_one()` before resolving.
    pub fn with_claim_gate(gate: Arc<Notify>) -> Self {
        Self {
            claim_gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn push_snapshot(&self, outcome: Result<DashboardSnapshot, GatewayError>) {
        self.snapshots.lock().unwrap().push_back(outcome);
    }

    pub fn push_claim(&self, outcome: Result<bool, GatewayError>) {
        self.claims.lock().unwrap().push_back(outcome);
    }

    pub fn push_history(&self, outcome: Result<Option<Vec<ClaimRecord>>, GatewayError>) {
        self.histories.lock().unwrap().push_back(outcome);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn claim_count(&self) -> usize {
        self.claim_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataGateway for ScriptedGateway {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch_snapshot(&self) -> Result<DashboardSnapshot, GatewayError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.snapshots.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(seed::dashboard_snapshot()))
    }

    async fn claim_benefit(&self, _benefit_id: &str) -> Result<bool, GatewayError> {
        self.claim_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.claim_gate {
            gate.notified().await;
        }
        let next = self.claims.lock().unwrap().pop_front();
        next.unwrap_or(Ok(true))
    }

    async fn claim_history(
        &self,
        _benefit_id: &str,
    ) -> Result<Option<Vec<ClaimRecord>>, GatewayError> {
        let next = self.histories.lock().unwrap().pop_front();
        next.unwrap_or(Ok(None))
    }
}
