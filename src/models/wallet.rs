use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ==================== WALLET ====================
/// A user's claim to an address on one chain.
///
/// `address` and `chain` are stored lower-cased and trimmed; `label` keeps
/// its case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: String,
    pub label: String,
    pub chain: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateWalletRequest {
    pub user_id: Option<String>,
    pub label: Option<String>,
    pub address: Option<String>,
    pub chain: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateWalletRequest {
    pub label: Option<String>,
    pub address: Option<String>,
    pub chain: Option<String>,
}

impl UpdateWalletRequest {
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.address.is_none() && self.chain.is_none()
    }
}
