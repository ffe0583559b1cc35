//! Dashboard store: the single in-process holder of dashboard state.
//!
//! The store is created explicitly and shared through `Arc`. Gateway calls
//! never run while the state lock is held, and every write is applied to the
//! state current at resolution time.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::RwLock;

use crate::gateway::{DataGateway, GatewayError};
use crate::models::{with_benefit_claimed, Benefit, ClaimRecord, DashboardState};

/// Result of [`DashboardStore::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { benefits: usize },
    Failed { reason: String },
    Disposed,
}

impl LoadOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }
}

/// Result of [`DashboardStore::claim`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The gateway confirmed the claim
    Claimed,
    /// Already claimed; the gateway was not called
    AlreadyClaimed,
    /// The gateway declined the claim
    Rejected,
    /// No benefit with that id in the current collection
    UnknownBenefit,
    /// Another claim for the same benefit is awaiting the gateway
    InFlight,
    /// The gateway call itself failed
    Failed(String),
    /// The store has been disposed
    Disposed,
}

impl ClaimOutcome {
    /// Whether the benefit ends up claimed.
    pub fn succeeded(&self) -> bool {
        matches!(self, ClaimOutcome::Claimed | ClaimOutcome::AlreadyClaimed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimOutcome::Claimed => "claimed",
            ClaimOutcome::AlreadyClaimed => "alreadyClaimed",
            ClaimOutcome::Rejected => "rejected",
            ClaimOutcome::UnknownBenefit => "unknownBenefit",
            ClaimOutcome::InFlight => "inFlight",
            ClaimOutcome::Failed(_) => "failed",
            ClaimOutcome::Disposed => "disposed",
        }
    }
}

/// Holds the dashboard state and orchestrates gateway calls.
pub struct DashboardStore {
    gateway: Arc<dyn DataGateway>,
    state: RwLock<DashboardState>,
    claims_in_flight: Mutex<HashSet<String>>,
    disposed: AtomicBool,
}

/// Marks a benefit id as awaiting the gateway until dropped.
struct InFlightClaim<'a> {
    claims: &'a Mutex<HashSet<String>>,
    benefit_id: String,
}

impl Drop for InFlightClaim<'_> {
    fn drop(&mut self) {
        self.claims
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.benefit_id);
    }
}

impl DashboardStore {
    /// Create a store in its initial loading state.
    pub fn create(gateway: Arc<dyn DataGateway>) -> Arc<Self> {
        tracing::debug!(gateway = gateway.name(), "Dashboard store created");
        Arc::new(Self {
            gateway,
            state: RwLock::new(DashboardState::default()),
            claims_in_flight: Mutex::new(HashSet::new()),
            disposed: AtomicBool::new(false),
        })
    }

    /// End the store's lifecycle. Later loads and claims are refused and
    /// in-flight ones no longer write state.
    pub fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::SeqCst) {
            tracing::info!("Dashboard store disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    pub fn gateway_name(&self) -> &'static str {
        self.gateway.name()
    }

    /// A copy of the full current state.
    pub async fn state(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading
    }

    pub async fn benefits(&self) -> Vec<Benefit> {
        self.state.read().await.benefits.clone()
    }

    /// Override the loading flag.
    pub async fn set_loading(&self, is_loading: bool) {
        self.state.write().await.is_loading = is_loading;
    }

    /// Fetch a fresh snapshot and replace the current data with it.
    ///
    /// Always leaves `is_loading` false. A failed load keeps prior data.
    pub async fn load(&self) -> LoadOutcome {
        if self.is_disposed() {
            return LoadOutcome::Disposed;
        }

        self.set_loading(true).await;
        tracing::info!(gateway = self.gateway.name(), "Loading dashboard snapshot");

        let fetched = self.gateway.fetch_snapshot().await;

        let mut state = self.state.write().await;
        state.is_loading = false;

        if self.is_disposed() {
            return LoadOutcome::Disposed;
        }

        match fetched {
            Ok(snapshot) => {
                for issue in snapshot.consistency_issues() {
                    tracing::warn!("Inconsistent dashboard snapshot: {}", issue);
                }
                let benefits = snapshot.benefits.len();
                state.user = Some(snapshot.user);
                state.benefits = snapshot.benefits;
                state.reward_points = Some(snapshot.reward_points);
                tracing::info!(benefits, "Dashboard snapshot loaded");
                LoadOutcome::Loaded { benefits }
            }
            Err(e) => {
                tracing::error!("Failed to load dashboard snapshot: {}", e);
                LoadOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Claim a benefit once the gateway confirms it.
    pub async fn claim(&self, benefit_id: &str) -> ClaimOutcome {
        if self.is_disposed() {
            return ClaimOutcome::Disposed;
        }

        // Held until the result is applied, so a duplicate sees either the
        // pending claim or the claimed flag.
        let _in_flight = {
            let state = self.state.read().await;
            match state.benefits.iter().find(|b| b.id == benefit_id) {
                None => {
                    tracing::warn!(benefit_id, "Claim for unknown benefit refused");
                    return ClaimOutcome::UnknownBenefit;
                }
                Some(benefit) if benefit.claimed => {
                    tracing::debug!(benefit_id, "Benefit already claimed");
                    return ClaimOutcome::AlreadyClaimed;
                }
                Some(_) => {}
            }
            match self.begin_claim(benefit_id) {
                Some(guard) => guard,
                None => {
                    tracing::debug!(benefit_id, "Claim already in flight");
                    return ClaimOutcome::InFlight;
                }
            }
        };

        let confirmed = match self.gateway.claim_benefit(benefit_id).await {
            Ok(confirmed) => confirmed,
            Err(e) => {
                tracing::error!(benefit_id, "Claim failed: {}", e);
                return ClaimOutcome::Failed(e.to_string());
            }
        };

        if !confirmed {
            tracing::info!(benefit_id, "Claim rejected by gateway");
            return ClaimOutcome::Rejected;
        }

        let mut state = self.state.write().await;
        if self.is_disposed() {
            return ClaimOutcome::Disposed;
        }
        match with_benefit_claimed(&state.benefits, benefit_id) {
            Some(benefits) => state.benefits = benefits,
            None => tracing::warn!(
                benefit_id,
                "Confirmed claim no longer matches a loaded benefit"
            ),
        }
        tracing::info!(benefit_id, "Benefit claimed");
        ClaimOutcome::Claimed
    }

    /// Recorded claims for a benefit, when the gateway keeps them.
    pub async fn claim_history(
        &self,
        benefit_id: &str,
    ) -> Result<Option<Vec<ClaimRecord>>, GatewayError> {
        self.gateway.claim_history(benefit_id).await
    }

    fn begin_claim(&self, benefit_id: &str) -> Option<InFlightClaim<'_>> {
        let mut claims = self
            .claims_in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !claims.insert(benefit_id.to_string()) {
            return None;
        }
        Some(InFlightClaim {
            claims: &self.claims_in_flight,
            benefit_id: benefit_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::scripted::ScriptedGateway;
    use crate::gateway::{seed, GatewayError};
    use tokio::sync::Notify;

    async fn loaded_store() -> (Arc<DashboardStore>, Arc<ScriptedGateway>) {
        let gateway = Arc::new(ScriptedGateway::new());
        let store = DashboardStore::create(gateway.clone());
        assert!(store.load().await.succeeded());
        (store, gateway)
    }

    #[tokio::test]
    async fn test_initial_state_then_load() {
        let gateway = Arc::new(ScriptedGateway::new());
        let store = DashboardStore::create(gateway.clone());

        let initial = store.state().await;
        assert!(initial.is_loading);
        assert!(initial.benefits.is_empty());
        assert!(initial.user.is_none());

        assert_eq!(store.load().await, LoadOutcome::Loaded { benefits: 6 });

        let state = store.state().await;
        assert!(!state.is_loading);
        assert_eq!(state.benefits.len(), 6);
        assert!(state.benefits.iter().find(|b| b.id == "3").unwrap().claimed);
        assert_eq!(state.user, Some(seed::user()));
    }

    #[tokio::test]
    async fn test_failed_first_load_leaves_fields_empty() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_snapshot(Err(GatewayError::Transport("offline".to_string())));
        let store = DashboardStore::create(gateway.clone());

        let outcome = store.load().await;
        assert!(matches!(outcome, LoadOutcome::Failed { .. }));

        let state = store.state().await;
        assert!(!state.is_loading);
        assert!(state.user.is_none());
        assert!(state.reward_points.is_none());
        assert!(state.benefits.is_empty());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_data() {
        let (store, gateway) = loaded_store().await;
        let before = store.state().await;

        gateway.push_snapshot(Err(GatewayError::Transport("timeout".to_string())));
        store.set_loading(true).await;
        assert!(!store.load().await.succeeded());

        let after = store.state().await;
        assert!(!after.is_loading);
        assert_eq!(after, before);
        assert_eq!(gateway.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_inconsistent_snapshot_is_still_accepted() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut snapshot = seed::dashboard_snapshot();
        snapshot.user.current_xp = snapshot.user.target_xp * 2;
        gateway.push_snapshot(Ok(snapshot.clone()));
        let store = DashboardStore::create(gateway);

        assert!(store.load().await.succeeded());
        assert_eq!(store.state().await.user, Some(snapshot.user));
    }

    #[tokio::test]
    async fn test_confirmed_claim_flips_only_target() {
        let (store, gateway) = loaded_store().await;
        let before = store.benefits().await;

        assert_eq!(store.claim("1").await, ClaimOutcome::Claimed);

        let after = store.benefits().await;
        assert_eq!(after.len(), before.len());
        for (old, new) in before.iter().zip(&after) {
            if old.id == "1" {
                assert!(!old.claimed);
                assert!(new.claimed);
                assert_eq!(
                    &Benefit {
                        claimed: false,
                        ..new.clone()
                    },
                    old
                );
            } else {
                assert_eq!(old, new);
            }
        }
        assert_eq!(gateway.claim_count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_claim_leaves_state_unchanged() {
        let (store, gateway) = loaded_store().await;
        let before = store.state().await;

        gateway.push_claim(Ok(false));
        let outcome = store.claim("2").await;

        assert_eq!(outcome, ClaimOutcome::Rejected);
        assert!(!outcome.succeeded());
        assert_eq!(store.state().await, before);
    }

    #[tokio::test]
    async fn test_gateway_error_on_claim_is_contained() {
        let (store, gateway) = loaded_store().await;
        let before = store.state().await;

        gateway.push_claim(Err(GatewayError::Transport("connection reset".to_string())));
        let outcome = store.claim("2").await;

        assert!(matches!(outcome, ClaimOutcome::Failed(_)));
        assert!(!outcome.succeeded());
        assert_eq!(store.state().await, before);
    }

    #[tokio::test]
    async fn test_unknown_benefit_never_reaches_gateway() {
        let (store, gateway) = loaded_store().await;
        let before = store.benefits().await;

        assert_eq!(store.claim("42").await, ClaimOutcome::UnknownBenefit);
        assert_eq!(store.benefits().await, before);
        assert_eq!(gateway.claim_count(), 0);
    }

    #[tokio::test]
    async fn test_claim_before_load_is_unknown() {
        let gateway = Arc::new(ScriptedGateway::new());
        let store = DashboardStore::create(gateway.clone());

        assert_eq!(store.claim("1").await, ClaimOutcome::UnknownBenefit);
        assert!(store.benefits().await.is_empty());
    }

    #[tokio::test]
    async fn test_repeat_claim_is_idempotent() {
        let (store, gateway) = loaded_store().await;

        assert_eq!(store.claim("1").await, ClaimOutcome::Claimed);
        let outcome = store.claim("1").await;
        assert_eq!(outcome, ClaimOutcome::AlreadyClaimed);
        assert!(outcome.succeeded());

        let benefits = store.benefits().await;
        assert_eq!(benefits.len(), 6);
        assert_eq!(benefits.iter().filter(|b| b.id == "1").count(), 1);
        assert!(benefits.iter().find(|b| b.id == "1").unwrap().claimed);
        assert_eq!(gateway.claim_count(), 1);
    }

    #[tokio::test]
    async fn test_claim_resolving_after_reload_applies_to_new_collection() {
        let gate = Arc::new(Notify::new());
        let gateway = Arc::new(ScriptedGateway::with_claim_gate(gate.clone()));
        let store = DashboardStore::create(gateway.clone());
        assert!(store.load().await.succeeded());

        let mut reloaded = seed::dashboard_snapshot();
        for benefit in &mut reloaded.benefits {
            benefit.title = format!("{} (refreshed)", benefit.title);
        }
        gateway.push_snapshot(Ok(reloaded.clone()));

        let claiming = tokio::spawn({
            let store = store.clone();
            async move { store.claim("2").await }
        });
        while gateway.claim_count() == 0 {
            tokio::task::yield_now().await;
        }

        assert!(store.load().await.succeeded());
        gate.notify_one();
        assert_eq!(claiming.await.unwrap(), ClaimOutcome::Claimed);

        let benefits = store.benefits().await;
        assert_eq!(benefits.len(), reloaded.benefits.len());
        for benefit in &benefits {
            assert!(benefit.title.ends_with("(refreshed)"));
        }
        assert!(benefits.iter().find(|b| b.id == "2").unwrap().claimed);
    }

    #[tokio::test]
    async fn test_confirmed_claim_for_vanished_benefit_changes_nothing() {
        let gate = Arc::new(Notify::new());
        let gateway = Arc::new(ScriptedGateway::with_claim_gate(gate.clone()));
        let store = DashboardStore::create(gateway.clone());
        assert!(store.load().await.succeeded());

        let mut reloaded = seed::dashboard_snapshot();
        reloaded.benefits.retain(|b| b.id != "2");
        gateway.push_snapshot(Ok(reloaded.clone()));

        let claiming = tokio::spawn({
            let store = store.clone();
            async move { store.claim("2").await }
        });
        while gateway.claim_count() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(store.load().await.succeeded());
        gate.notify_one();

        assert_eq!(claiming.await.unwrap(), ClaimOutcome::Claimed);
        assert_eq!(store.benefits().await, reloaded.benefits);
    }

    #[tokio::test]
    async fn test_set_loading_override() {
        let (store, _gateway) = loaded_store().await;
        assert!(!store.is_loading().await);
        store.set_loading(true).await;
        assert!(store.is_loading().await);
        store.set_loading(false).await;
        assert!(!store.is_loading().await);
    }

    #[tokio::test]
    async fn test_disposed_store_refuses_work() {
        let (store, gateway) = loaded_store().await;
        let before = store.state().await;

        store.dispose();
        assert!(store.is_disposed());
        assert_eq!(store.load().await, LoadOutcome::Disposed);
        assert_eq!(store.claim("1").await, ClaimOutcome::Disposed);

        assert_eq!(store.state().await, before);
        assert_eq!(gateway.fetch_count(), 1);
        assert_eq!(gateway.claim_count(), 0);
    }

    #[tokio::test]
    async fn test_claim_in_flight_at_dispose_does_not_write() {
        let gate = Arc::new(Notify::new());
        let gateway = Arc::new(ScriptedGateway::with_claim_gate(gate.clone()));
        let store = DashboardStore::create(gateway.clone());
        assert!(store.load().await.succeeded());
        let before = store.benefits().await;

        let claiming = tokio::spawn({
            let store = store.clone();
            async move { store.claim("1").await }
        });
        while gateway.claim_count() == 0 {
            tokio::task::yield_now().await;
        }
        store.dispose();
        gate.notify_one();

        assert_eq!(claiming.await.unwrap(), ClaimOutcome::Disposed);
        assert_eq!(store.benefits().await, before);
    }

    #[tokio::test]
    async fn test_duplicate_claim_while_pending_reports_in_flight() {
        let gate = Arc::new(Notify::new());
        let gateway = Arc::new(ScriptedGateway::with_claim_gate(gate.clone()));
        let store = DashboardStore::create(gateway.clone());
        assert!(store.load().await.succeeded());

        let claiming = tokio::spawn({
            let store = store.clone();
            async move { store.claim("1").await }
        });
        while gateway.claim_count() == 0 {
            tokio::task::yield_now().await;
        }

        let duplicate = store.claim("1").await;
        assert_eq!(duplicate, ClaimOutcome::InFlight);
        assert!(!duplicate.succeeded());
        assert_eq!(gateway.claim_count(), 1);

        gate.notify_one();
        assert_eq!(claiming.await.unwrap(), ClaimOutcome::Claimed);
        assert_eq!(store.claim("1").await, ClaimOutcome::AlreadyClaimed);
        assert_eq!(gateway.claim_count(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_claim_releases_benefit() {
        let gate = Arc::new(Notify::new());
        let gateway = Arc::new(ScriptedGateway::with_claim_gate(gate.clone()));
        let store = DashboardStore::create(gateway.clone());
        assert!(store.load().await.succeeded());

        let claiming = tokio::spawn({
            let store = store.clone();
            async move { store.claim("2").await }
        });
        while gateway.claim_count() == 0 {
            tokio::task::yield_now().await;
        }
        claiming.abort();
        assert!(claiming.await.unwrap_err().is_cancelled());

        gate.notify_one();
        assert_eq!(store.claim("2").await, ClaimOutcome::Claimed);
        assert_eq!(gateway.claim_count(), 2);
    }

    #[tokio::test]
    async fn test_rejected_claim_can_be_retried() {
        let (store, gateway) = loaded_store().await;

        gateway.push_claim(Ok(false));
        assert_eq!(store.claim("2").await, ClaimOutcome::Rejected);
        assert_eq!(store.claim("2").await, ClaimOutcome::Claimed);
        assert_eq!(gateway.claim_count(), 2);
    }

    #[tokio::test]
    async fn test_claim_history_passes_through_gateway() {
        let (store, gateway) = loaded_store().await;
        assert_eq!(store.claim_history("1").await, Ok(None));

        gateway.push_history(Err(GatewayError::Storage("locked".to_string())));
        assert_eq!(
            store.claim_history("1").await,
            Err(GatewayError::Storage("locked".to_string()))
        );
    }
}
