use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::RecordStore,
    error::{AppError, Result},
    models::{CreateGoalRequest, Goal, GoalResponse, UpdateGoalRequest, UpdateProgressRequest},
    utils::parse_id,
    validation::{
        goal::{apply_goal_patch, validate_new_goal, validate_progress_amount},
        ValidationErrors,
    },
};

/// Goal Service - goal lifecycle and parent/child integrity
///
/// Every goal leaves this service as a [`GoalResponse`], so the derived
/// percentage is recomputed from the stored amounts on each call.
pub struct GoalService {
    store: Arc<dyn RecordStore>,
}

impl GoalService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    async fn require_goal(&self, id: Uuid) -> Result<Goal> {
        self.store
            .get_goal(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Goal not found".to_string()))
    }

    async fn require_parent(&self, parent_id: Uuid) -> Result<()> {
        if self.store.get_goal(parent_id).await?.is_none() {
            return Err(AppError::ReferenceNotFound(
                "Parent goal not found".to_string(),
            ));
        }
        Ok(())
    }

    /// Walks up from the proposed parent; reaching `id` means the move would
    /// close a loop. The walk stops at a root or at an already visited goal.
    async fn require_acyclic_parent(&self, id: Uuid, parent_id: Uuid) -> Result<()> {
        self.require_parent(parent_id).await?;

        let mut seen = HashSet::new();
        let mut cursor = Some(parent_id);
        while let Some(current) = cursor {
            if current == id {
                let mut errors = ValidationErrors::default();
                errors.push("parent_goal_id", "Parent goal would create a cycle");
                return Err(errors.into());
            }
            if !seen.insert(current) {
                break;
            }
            cursor = self
                .store
                .get_goal(current)
                .await?
                .and_then(|goal| goal.parent_goal_id);
        }
        Ok(())
    }

    pub async fn create_goal(&self, req: &CreateGoalRequest) -> Result<GoalResponse> {
        let fields = validate_new_goal(req)?;
        let user_id = parse_id("user", req.user_id.as_deref().unwrap_or_default())?;

        if !self.store.user_exists(user_id).await? {
            return Err(AppError::ReferenceNotFound("User not found".to_string()));
        }
        if let Some(parent_id) = fields.parent_goal_id {
            self.require_parent(parent_id).await?;
        }

        let now = Utc::now();
        let goal = Goal {
            id: Uuid::new_v4(),
            user_id,
            name: fields.name,
            description: fields.description,
            status: fields.status,
            progress: fields.progress,
            coin: fields.coin,
            coin_symbol: fields.coin_symbol,
            current_amount: fields.current_amount,
            target_amount: fields.target_amount,
            target_date: fields.target_date,
            wallet_id: fields.wallet_id,
            wallet_address: fields.wallet_address,
            wallet_chain: fields.wallet_chain,
            goal_type: fields.goal_type.as_str().to_string(),
            parent_goal_id: fields.parent_goal_id,
            is_aggregate: fields.is_aggregate,
            milestones: fields.milestones,
            notes: fields.notes,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_goal(&goal).await?;

        tracing::info!(
            "goal_created id={} user={} type={} parent={:?}",
            goal.id,
            goal.user_id,
            goal.goal_type,
            goal.parent_goal_id
        );
        Ok(goal.into())
    }

    pub async fn get_goal(&self, id: &str) -> Result<GoalResponse> {
        let id = parse_id("goal", id)?;
        Ok(self.require_goal(id).await?.into())
    }

    pub async fn list_goals(&self, user_id: Uuid) -> Result<Vec<GoalResponse>> {
        let goals = self.store.list_goals(user_id).await?;
        Ok(goals.into_iter().map(GoalResponse::from).collect())
    }

    pub async fn list_subgoals(&self, id: &str) -> Result<Vec<GoalResponse>> {
        let id = parse_id("goal", id)?;
        self.require_goal(id).await?;
        let goals = self.store.list_subgoals(id).await?;
        Ok(goals.into_iter().map(GoalResponse::from).collect())
    }

    /// Partial update; validated on the merged view of stored and patched values.
    pub async fn update_goal(&self, id: &str, patch: &UpdateGoalRequest) -> Result<GoalResponse> {
        let id = parse_id("goal", id)?;
        let existing = self.require_goal(id).await?;
        let mut goal = apply_goal_patch(&existing, patch)?;

        if goal.parent_goal_id != existing.parent_goal_id {
            if let Some(parent_id) = goal.parent_goal_id {
                self.require_acyclic_parent(id, parent_id).await?;
            }
        }

        goal.updated_at = Utc::now();
        if !self.store.update_goal(&goal).await? {
            return Err(AppError::NotFound("Goal not found".to_string()));
        }

        tracing::info!("goal_updated id={}", goal.id);
        Ok(goal.into())
    }

    /// Moves `current_amount` only; every other field is left untouched.
    pub async fn update_progress(
        &self,
        id: &str,
        req: &UpdateProgressRequest,
    ) -> Result<GoalResponse> {
        let id = parse_id("goal", id)?;
        let mut goal = self.require_goal(id).await?;
        let current_amount = validate_progress_amount(&goal, req.current_amount)?;

        let now = Utc::now();
        if !self.store.update_goal_amount(id, current_amount, now).await? {
            return Err(AppError::NotFound("Goal not found".to_string()));
        }
        goal.current_amount = current_amount;
        goal.updated_at = now;

        tracing::info!(
            "goal_progress_updated id={} current={} target={}",
            goal.id,
            goal.current_amount,
            goal.target_amount
        );
        Ok(goal.into())
    }

    /// Refuses while any goal still names this one as its parent.
    pub async fn delete_goal(&self, id: &str) -> Result<()> {
        let id = parse_id("goal", id)?;
        self.require_goal(id).await?;

        let children = self.store.count_subgoals(id).await?;
        if children > 0 {
            tracing::debug!("goal_delete_blocked id={} subgoals={}", id, children);
            return Err(AppError::GoalHasSubgoals);
        }
        if !self.store.delete_goal(id).await? {
            return Err(AppError::NotFound("Goal not found".to_string()));
        }

        tracing::info!("goal_deleted id={}", id);
        Ok(())
    }
}
