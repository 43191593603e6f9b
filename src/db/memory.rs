// In-process RecordStore used by service tests. Mirrors the Postgres
// constraints: unique (user_id, address, chain) and restricted parent delete.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{Goal, User, Wallet},
};

use super::RecordStore;

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    wallets: RwLock<HashMap<Uuid, Wallet>>,
    goals: RwLock<HashMap<Uuid, Goal>>,
}

fn sorted_by_creation<T, F>(mut items: Vec<T>, created_at: F) -> Vec<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    items.sort_by_key(|item| created_at(item));
    items
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        let taken = users.values().any(|existing| {
            existing.username == user.username || existing.email == user.email
        });
        if taken {
            return Err(AppError::BadRequest(
                "Username or email already in use".to_string(),
            ));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn user_exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.users.read().await.contains_key(&id))
    }

    async fn insert_wallet(&self, wallet: &Wallet) -> Result<()> {
        let mut wallets = self.wallets.write().await;
        let clash = wallets.values().any(|existing| {
            existing.user_id == wallet.user_id
                && existing.address == wallet.address
                && existing.chain == wallet.chain
        });
        if clash {
            return Err(AppError::DuplicateWallet);
        }
        wallets.insert(wallet.id, wallet.clone());
        Ok(())
    }

    async fn get_wallet(&self, id: Uuid) -> Result<Option<Wallet>> {
        Ok(self.wallets.read().await.get(&id).cloned())
    }

    async fn find_wallet(
        &self,
        user_id: Uuid,
        address: &str,
        chain: &str,
    ) -> Result<Option<Wallet>> {
        Ok(self
            .wallets
            .read()
            .await
            .values()
            .find(|w| w.user_id == user_id && w.address == address && w.chain == chain)
            .cloned())
    }

    async fn list_wallets(&self, user_id: Uuid) -> Result<Vec<Wallet>> {
        let wallets: Vec<Wallet> = self
            .wallets
            .read()
            .await
            .values()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        Ok(sorted_by_creation(wallets, |w| w.created_at))
    }

    async fn update_wallet(&self, wallet: &Wallet) -> Result<bool> {
        let mut wallets = self.wallets.write().await;
        let clash = wallets.values().any(|existing| {
            existing.id != wallet.id
                && existing.user_id == wallet.user_id
                && existing.address == wallet.address
                && existing.chain == wallet.chain
        });
        if clash {
            return Err(AppError::DuplicateWallet);
        }
        match wallets.get_mut(&wallet.id) {
            Some(slot) => {
                *slot = wallet.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_wallet(&self, id: Uuid) -> Result<bool> {
        Ok(self.wallets.write().await.remove(&id).is_some())
    }

    async fn insert_goal(&self, goal: &Goal) -> Result<()> {
        self.goals.write().await.insert(goal.id, goal.clone());
        Ok(())
    }

    async fn get_goal(&self, id: Uuid) -> Result<Option<Goal>> {
        Ok(self.goals.read().await.get(&id).cloned())
    }

    async fn list_goals(&self, user_id: Uuid) -> Result<Vec<Goal>> {
        let goals: Vec<Goal> = self
            .goals
            .read()
            .await
            .values()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect();
        Ok(sorted_by_creation(goals, |g| g.created_at))
    }

    async fn list_subgoals(&self, parent_id: Uuid) -> Result<Vec<Goal>> {
        let goals: Vec<Goal> = self
            .goals
            .read()
            .await
            .values()
            .filter(|g| g.parent_goal_id == Some(parent_id))
            .cloned()
            .collect();
        Ok(sorted_by_creation(goals, |g| g.created_at))
    }

    async fn count_subgoals(&self, parent_id: Uuid) -> Result<i64> {
        Ok(self.list_subgoals(parent_id).await?.len() as i64)
    }

    async fn update_goal(&self, goal: &Goal) -> Result<bool> {
        match self.goals.write().await.get_mut(&goal.id) {
            Some(slot) => {
                *slot = goal.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_goal_amount(
        &self,
        id: Uuid,
        current_amount: f64,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        match self.goals.write().await.get_mut(&id) {
            Some(slot) => {
                slot.current_amount = current_amount;
                slot.updated_at = updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_goal(&self, id: Uuid) -> Result<bool> {
        let mut goals = self.goals.write().await;
        if goals.values().any(|g| g.parent_goal_id == Some(id)) {
            return Err(AppError::GoalHasSubgoals);
        }
        Ok(goals.remove(&id).is_some())
    }
}
