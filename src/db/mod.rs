use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use uuid::Uuid;

use crate::{
    config::Config,
    error::{AppError, Result},
    models::*,
};

#[cfg(test)]
pub mod memory;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Storage collaborator for users, wallets and goals.
///
/// Implementations report constraint conflicts with the same business errors
/// the services raise from their pre-checks: [`AppError::DuplicateWallet`]
/// for a second `(user, address, chain)` and [`AppError::GoalHasSubgoals`]
/// when a referenced parent is deleted.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<()>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;
    async fn user_exists(&self, id: Uuid) -> Result<bool>;

    async fn insert_wallet(&self, wallet: &Wallet) -> Result<()>;
    async fn get_wallet(&self, id: Uuid) -> Result<Option<Wallet>>;
    async fn find_wallet(&self, user_id: Uuid, address: &str, chain: &str)
        -> Result<Option<Wallet>>;
    async fn list_wallets(&self, user_id: Uuid) -> Result<Vec<Wallet>>;
    async fn update_wallet(&self, wallet: &Wallet) -> Result<bool>;
    async fn delete_wallet(&self, id: Uuid) -> Result<bool>;

    async fn insert_goal(&self, goal: &Goal) -> Result<()>;
    async fn get_goal(&self, id: Uuid) -> Result<Option<Goal>>;
    async fn list_goals(&self, user_id: Uuid) -> Result<Vec<Goal>>;
    async fn list_subgoals(&self, parent_id: Uuid) -> Result<Vec<Goal>>;
    async fn count_subgoals(&self, parent_id: Uuid) -> Result<i64>;
    async fn update_goal(&self, goal: &Goal) -> Result<bool>;
    async fn update_goal_amount(
        &self,
        id: Uuid,
        current_amount: f64,
        updated_at: DateTime<Utc>,
    ) -> Result<bool>;
    async fn delete_goal(&self, id: Uuid) -> Result<bool>;
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Builds the pool without connecting; the first query opens a connection
    /// and dropped connections are re-established on demand.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(config.database_acquire_timeout_secs))
            .connect_lazy(&config.database_url)?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn constraint_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|code| code.into_owned()),
        _ => None,
    }
}

fn map_wallet_conflict(err: sqlx::Error) -> AppError {
    if constraint_code(&err).as_deref() == Some(UNIQUE_VIOLATION) {
        return AppError::DuplicateWallet;
    }
    AppError::Database(err)
}

fn map_user_conflict(err: sqlx::Error) -> AppError {
    if constraint_code(&err).as_deref() == Some(UNIQUE_VIOLATION) {
        return AppError::BadRequest("Username or email already in use".to_string());
    }
    AppError::Database(err)
}

fn map_goal_delete_conflict(err: sqlx::Error) -> AppError {
    if constraint_code(&err).as_deref() == Some(FOREIGN_KEY_VIOLATION) {
        return AppError::GoalHasSubgoals;
    }
    AppError::Database(err)
}

// ==================== USER QUERIES ====================
#[async_trait]
impl RecordStore for Database {
    async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, tier, preferences, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.tier)
        .bind(&user.preferences)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_user_conflict)?;
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn user_exists(&self, id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    // ==================== WALLET QUERIES ====================
    async fn insert_wallet(&self, wallet: &Wallet) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO wallets (id, user_id, address, label, chain, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(wallet.id)
        .bind(wallet.user_id)
        .bind(&wallet.address)
        .bind(&wallet.label)
        .bind(&wallet.chain)
        .bind(wallet.created_at)
        .bind(wallet.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_wallet_conflict)?;
        Ok(())
    }

    async fn get_wallet(&self, id: Uuid) -> Result<Option<Wallet>> {
        let wallet = sqlx::query_as::<_, Wallet>("SELECT * FROM wallets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(wallet)
    }

    async fn find_wallet(
        &self,
        user_id: Uuid,
        address: &str,
        chain: &str,
    ) -> Result<Option<Wallet>> {
        let wallet = sqlx::query_as::<_, Wallet>(
            "SELECT * FROM wallets WHERE user_id = $1 AND address = $2 AND chain = $3",
        )
        .bind(user_id)
        .bind(address)
        .bind(chain)
        .fetch_optional(&self.pool)
        .await?;
        Ok(wallet)
    }

    async fn list_wallets(&self, user_id: Uuid) -> Result<Vec<Wallet>> {
        let wallets = sqlx::query_as::<_, Wallet>(
            "SELECT * FROM wallets WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(wallets)
    }

    async fn update_wallet(&self, wallet: &Wallet) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE wallets
            SET label = $2, address = $3, chain = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(wallet.id)
        .bind(&wallet.label)
        .bind(&wallet.address)
        .bind(&wallet.chain)
        .bind(wallet.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_wallet_conflict)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_wallet(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM wallets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== GOAL QUERIES ====================
    async fn insert_goal(&self, goal: &Goal) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO goals
                (id, user_id, name, description, status, progress, coin, coin_symbol,
                 current_amount, target_amount, target_date, wallet_id, wallet_address,
                 wallet_chain, goal_type, parent_goal_id, is_aggregate, milestones, notes,
                 created_at, updated_at)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19,$20,$21)
            "#,
        )
        .bind(goal.id)
        .bind(goal.user_id)
        .bind(&goal.name)
        .bind(&goal.description)
        .bind(&goal.status)
        .bind(goal.progress)
        .bind(&goal.coin)
        .bind(&goal.coin_symbol)
        .bind(goal.current_amount)
        .bind(goal.target_amount)
        .bind(goal.target_date)
        .bind(goal.wallet_id)
        .bind(&goal.wallet_address)
        .bind(&goal.wallet_chain)
        .bind(&goal.goal_type)
        .bind(goal.parent_goal_id)
        .bind(goal.is_aggregate)
        .bind(&goal.milestones)
        .bind(&goal.notes)
        .bind(goal.created_at)
        .bind(goal.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_goal(&self, id: Uuid) -> Result<Option<Goal>> {
        let goal = sqlx::query_as::<_, Goal>("SELECT * FROM goals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(goal)
    }

    async fn list_goals(&self, user_id: Uuid) -> Result<Vec<Goal>> {
        let goals = sqlx::query_as::<_, Goal>(
            "SELECT * FROM goals WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(goals)
    }

    async fn list_subgoals(&self, parent_id: Uuid) -> Result<Vec<Goal>> {
        let goals = sqlx::query_as::<_, Goal>(
            "SELECT * FROM goals WHERE parent_goal_id = $1 ORDER BY created_at ASC",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(goals)
    }

    async fn count_subgoals(&self, parent_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM goals WHERE parent_goal_id = $1")
            .bind(parent_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn update_goal(&self, goal: &Goal) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE goals
            SET name = $2, description = $3, status = $4, progress = $5, coin = $6,
                coin_symbol = $7, current_amount = $8, target_amount = $9, target_date = $10,
                wallet_id = $11, wallet_address = $12, wallet_chain = $13, goal_type = $14,
                parent_goal_id = $15, is_aggregate = $16, milestones = $17, notes = $18,
                updated_at = $19
            WHERE id = $1
            "#,
        )
        .bind(goal.id)
        .bind(&goal.name)
        .bind(&goal.description)
        .bind(&goal.status)
        .bind(goal.progress)
        .bind(&goal.coin)
        .bind(&goal.coin_symbol)
        .bind(goal.current_amount)
        .bind(goal.target_amount)
        .bind(goal.target_date)
        .bind(goal.wallet_id)
        .bind(&goal.wallet_address)
        .bind(&goal.wallet_chain)
        .bind(&goal.goal_type)
        .bind(goal.parent_goal_id)
        .bind(goal.is_aggregate)
        .bind(&goal.milestones)
        .bind(&goal.notes)
        .bind(goal.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_goal_amount(
        &self,
        id: Uuid,
        current_amount: f64,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE goals SET current_amount = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(current_amount)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_goal(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM goals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_goal_delete_conflict)?;
        Ok(result.rows_affected() > 0)
    }
}
