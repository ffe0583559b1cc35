//! Gateway backed by the SQLite repository.

use async_trait::async_trait;

use super::{seed, DataGateway, GatewayError};
use crate::db::Repository;
use crate::models::{ClaimRecord, DashboardSnapshot};

/// Persistent gateway: claims survive restarts.
pub struct SqliteGateway {
    repo: Repository,
}

impl SqliteGateway {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Wrap the repository, seeding it with the fixture data on first start.
    pub async fn open_seeded(repo: Repository) -> Result<Self, GatewayError> {
        if repo.seed_if_empty(&seed::dashboard_snapshot()).await? {
            tracing::info!("Seeded dashboard database with fixture data");
        }
        Ok(Self::new(repo))
    }
}

#[async_trait]
impl DataGateway for SqliteGateway {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn fetch_snapshot(&self) -> Result<DashboardSnapshot, GatewayError> {
        self.repo.load_snapshot().await
    }

    async fn claim_benefit(&self, benefit_id: &str) -> Result<bool, GatewayError> {
        self.repo.mark_claimed(benefit_id).await
    }

    async fn claim_history(
        &self,
        benefit_id: &str,
    ) -> Result<Option<Vec<ClaimRecord>>, GatewayError> {
        self.repo.claim_history(benefit_id).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_claims_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("dashboard.sqlite");

        {
            let pool = init_database(&db_path).await.unwrap();
            let gateway = SqliteGateway::open_seeded(Repository::new(pool))
                .await
                .unwrap();
            assert!(gateway.claim_benefit("4").await.unwrap());
            assert!(!gateway.claim_benefit("nope").await.unwrap());
        }

        let pool = init_database(&db_path).await.unwrap();
        let repo = Repository::new(pool);
        let gateway = SqliteGateway::open_seeded(repo.clone()).await.unwrap();
        let snapshot = gateway.fetch_snapshot().await.unwrap();

        let claimed: Vec<_> = snapshot
            .benefits
            .iter()
            .filter(|b| b.claimed)
            .map(|b| b.id.as_str())
            .collect();
        assert_eq!(claimed, vec!["3", "4"]);
        assert_eq!(repo.claim_history("4").await.unwrap().len(), 1);

        let history = gateway.claim_history("4").await.unwrap().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].benefit_id, "4");
        assert_eq!(gateway.claim_history("3").await.unwrap(), Some(vec![]));
    }
}
