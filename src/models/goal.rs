use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ==================== GOAL ====================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    Regular,
    Parent,
    Subgoal,
}

impl GoalType {
    pub const ALL: [GoalType; 3] = [GoalType::Regular, GoalType::Parent, GoalType::Subgoal];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "regular" => Some(GoalType::Regular),
            "parent" => Some(GoalType::Parent),
            "subgoal" => Some(GoalType::Subgoal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Regular => "regular",
            GoalType::Parent => "parent",
            GoalType::Subgoal => "subgoal",
        }
    }
}

/// Stored goal. `progress` is the caller-supplied display value and is never
/// reconciled with the amounts; see [`Goal::progress_percentage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub status: String,
    pub progress: f64,
    pub coin: String,
    pub coin_symbol: String,
    pub current_amount: f64,
    pub target_amount: f64,
    pub target_date: Option<DateTime<Utc>>,
    pub wallet_id: Option<Uuid>,
    pub wallet_address: Option<String>,
    pub wallet_chain: Option<String>,
    pub goal_type: String,
    pub parent_goal_id: Option<Uuid>,
    pub is_aggregate: bool,
    pub milestones: serde_json::Value,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// `round(100 * current / target)`, derived from the amounts on every call.
    pub fn progress_percentage(&self) -> i64 {
        progress_percentage(self.current_amount, self.target_amount)
    }
}

pub fn progress_percentage(current_amount: f64, target_amount: f64) -> i64 {
    if target_amount <= 0.0 {
        return 0;
    }
    (current_amount / target_amount * 100.0).round() as i64
}

/// Goal as returned to callers, with the derived percentage attached.
#[derive(Debug, Clone, Serialize)]
pub struct GoalResponse {
    #[serde(flatten)]
    pub goal: Goal,
    pub progress_percentage: i64,
}

impl From<Goal> for GoalResponse {
    fn from(goal: Goal) -> Self {
        let progress_percentage = goal.progress_percentage();
        Self {
            goal,
            progress_percentage,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateGoalRequest {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub progress: Option<f64>,
    pub coin: Option<String>,
    pub coin_symbol: Option<String>,
    pub current_amount: Option<f64>,
    pub target_amount: Option<f64>,
    pub target_date: Option<DateTime<Utc>>,
    pub wallet_id: Option<String>,
    pub wallet_address: Option<String>,
    pub wallet_chain: Option<String>,
    pub goal_type: Option<String>,
    pub parent_goal_id: Option<String>,
    pub is_aggregate: Option<bool>,
    pub milestones: Option<serde_json::Value>,
    pub notes: Option<String>,
}

/// Partial patch; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGoalRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub progress: Option<f64>,
    pub coin: Option<String>,
    pub coin_symbol: Option<String>,
    pub current_amount: Option<f64>,
    pub target_amount: Option<f64>,
    pub target_date: Option<DateTime<Utc>>,
    pub wallet_id: Option<String>,
    pub wallet_address: Option<String>,
    pub wallet_chain: Option<String>,
    pub goal_type: Option<String>,
    pub parent_goal_id: Option<String>,
    pub is_aggregate: Option<bool>,
    pub milestones: Option<serde_json::Value>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProgressRequest {
    pub current_amount: Option<f64>,
}
