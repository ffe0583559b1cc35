//! Database repository for dashboard reads and claim writes.
//!
//! Claims run in a transaction so a benefit is never marked without its claim record.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::gateway::GatewayError;
use crate::models::{
    Benefit, BenefitCategory, ClaimRecord, DashboardSnapshot, RewardPoints, Trend, User,
};

/// Database repository for all dashboard data.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Whether the profile row exists.
    pub async fn is_seeded(&self) -> Result<bool, GatewayError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM profile")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("count")?;
        Ok(count > 0)
    }

    /// Write a snapshot into empty tables. Returns false when data already exists.
    pub async fn seed_if_empty(&self, snapshot: &DashboardSnapshot) -> Result<bool, GatewayError> {
        if self.is_seeded().await? {
            return Ok(false);
        }

        let mut tx = self.pool.begin().await?;
        let user = &snapshot.user;
        let points = &snapshot.reward_points;

        sqlx::query(
            "INSERT INTO profile (id, user_id, name, email, avatar, level, current_xp, target_xp, title, member_since) VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.avatar)
        .bind(i64::from(user.level))
        .bind(to_db(user.current_xp, "currentXP")?)
        .bind(to_db(user.target_xp, "targetXP")?)
        .bind(&user.title)
        .bind(user.member_since)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO reward_points (id, current, lifetime, this_month, last_month, trend, next_milestone) VALUES (1, ?, ?, ?, ?, ?, ?)"
        )
        .bind(to_db(points.current, "current")?)
        .bind(to_db(points.lifetime, "lifetime")?)
        .bind(to_db(points.this_month, "thisMonth")?)
        .bind(to_db(points.last_month, "lastMonth")?)
        .bind(points.trend.as_str())
        .bind(to_db(points.next_milestone, "nextMilestone")?)
        .execute(&mut *tx)
        .await?;

        for (position, benefit) in snapshot.benefits.iter().enumerate() {
            sqlx::query(
                "INSERT INTO benefits (id, position, title, description, icon, value, category, claimed, expiry_date, terms) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
            )
            .bind(&benefit.id)
            .bind(position as i64)
            .bind(&benefit.title)
            .bind(&benefit.description)
            .bind(&benefit.icon)
            .bind(&benefit.value)
            .bind(benefit.category.as_str())
            .bind(benefit.claimed as i32)
            .bind(benefit.expiry_date)
            .bind(&benefit.terms)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Read the full dashboard snapshot.
    pub async fn load_snapshot(&self) -> Result<DashboardSnapshot, GatewayError> {
        let profile = sqlx::query(
            "SELECT user_id, name, email, avatar, level, current_xp, target_xp, title, member_since FROM profile WHERE id = 1"
        )
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| GatewayError::Decode("profile has not been seeded".to_string()))?;

        let points = sqlx::query(
            "SELECT current, lifetime, this_month, last_month, trend, next_milestone FROM reward_points WHERE id = 1"
        )
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| GatewayError::Decode("reward points have not been seeded".to_string()))?;

        let benefits = self.list_benefits().await?;

        Ok(DashboardSnapshot {
            user: user_from_row(&profile)?,
            benefits,
            reward_points: points_from_row(&points)?,
            is_loading: false,
        })
    }

    /// List benefits in their display order.
    pub async fn list_benefits(&self) -> Result<Vec<Benefit>, GatewayError> {
        let rows = sqlx::query(
            "SELECT id, title, description, icon, value, category, claimed, expiry_date, terms FROM benefits ORDER BY position"
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(benefit_from_row).collect()
    }

    /// Mark a benefit claimed and record the claim.
    ///
    /// Returns false when no benefit has that id. Claiming twice keeps the row
    /// claimed and adds a second record.
    pub async fn mark_claimed(&self, benefit_id: &str) -> Result<bool, GatewayError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE benefits SET claimed = 1 WHERE id = ?")
            .bind(benefit_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        let record_id = Uuid::new_v4();
        sqlx::query("INSERT INTO claims (id, benefit_id, claimed_at) VALUES (?, ?, ?)")
            .bind(record_id.to_string())
            .bind(benefit_id)
            .bind(Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(benefit_id, %record_id, "Claim recorded");
        Ok(true)
    }

    /// Claim records for one benefit, oldest first.
    pub async fn claim_history(&self, benefit_id: &str) -> Result<Vec<ClaimRecord>, GatewayError> {
        let rows = sqlx::query(
            "SELECT id, benefit_id, claimed_at FROM claims WHERE benefit_id = ? ORDER BY claimed_at, rowid",
        )
        .bind(benefit_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(claim_from_row).collect()
    }
}

// ==================== ROW MAPPING ====================

fn to_db(value: u64, field: &str) -> Result<i64, GatewayError> {
    i64::try_from(value)
        .map_err(|_| GatewayError::Decode(format!("{} {} does not fit in SQLite", field, value)))
}

fn from_db(row: &SqliteRow, column: &str) -> Result<u64, GatewayError> {
    let value: i64 = row.try_get(column)?;
    u64::try_from(value)
        .map_err(|_| GatewayError::Decode(format!("{} is negative: {}", column, value)))
}

fn user_from_row(row: &SqliteRow) -> Result<User, GatewayError> {
    let level: i64 = row.try_get("level")?;
    Ok(User {
        id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        avatar: row.try_get("avatar")?,
        level: u32::try_from(level)
            .map_err(|_| GatewayError::Decode(format!("level out of range: {}", level)))?,
        current_xp: from_db(row, "current_xp")?,
        target_xp: from_db(row, "target_xp")?,
        title: row.try_get("title")?,
        member_since: row.try_get::<NaiveDate, _>("member_since")?,
    })
}

fn points_from_row(row: &SqliteRow) -> Result<RewardPoints, GatewayError> {
    let trend: String = row.try_get("trend")?;
    Ok(RewardPoints {
        current: from_db(row, "current")?,
        lifetime: from_db(row, "lifetime")?,
        this_month: from_db(row, "this_month")?,
        last_month: from_db(row, "last_month")?,
        trend: Trend::parse(&trend)
            .ok_or_else(|| GatewayError::Decode(format!("unknown trend {}", trend)))?,
        next_milestone: from_db(row, "next_milestone")?,
    })
}

fn benefit_from_row(row: &SqliteRow) -> Result<Benefit, GatewayError> {
    let category: String = row.try_get("category")?;
    let claimed: i32 = row.try_get("claimed")?;
    Ok(Benefit {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        icon: row.try_get("icon")?,
        value: row.try_get("value")?,
        category: BenefitCategory::parse(&category)
            .ok_or_else(|| GatewayError::Decode(format!("unknown category {}", category)))?,
        claimed: claimed != 0,
        expiry_date: row.try_get::<NaiveDate, _>("expiry_date")?,
        terms: row.try_get("terms")?,
    })
}

fn claim_from_row(row: &SqliteRow) -> Result<ClaimRecord, GatewayError> {
    let id: String = row.try_get("id")?;
    let claimed_at: String = row.try_get("claimed_at")?;
    Ok(ClaimRecord {
        id: Uuid::parse_str(&id).map_err(|e| GatewayError::Decode(e.to_string()))?,
        benefit_id: row.try_get("benefit_id")?,
        claimed_at: DateTime::parse_from_rfc3339(&claimed_at)
            .map_err(|e| GatewayError::Decode(e.to_string()))?
            .with_timezone(&Utc),
    })
}
