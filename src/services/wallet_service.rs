use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::RecordStore,
    error::{AppError, Result},
    models::{CreateWalletRequest, UpdateWalletRequest, Wallet},
    utils::parse_id,
    validation::wallet::{validate_new_wallet, validate_wallet_patch},
};

/// Wallet Service - validates and persists wallet records
pub struct WalletService {
    store: Arc<dyn RecordStore>,
}

impl WalletService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Create wallet
    ///
    /// Field errors are reported together before any lookup. The user check
    /// and the duplicate check then run in order, each with its own error.
    pub async fn create_wallet(&self, req: &CreateWalletRequest) -> Result<Wallet> {
        let fields = validate_new_wallet(req)?;
        let user_id = parse_id("user", req.user_id.as_deref().unwrap_or_default())?;

        if !self.store.user_exists(user_id).await? {
            return Err(AppError::ReferenceNotFound("User not found".to_string()));
        }
        if self
            .store
            .find_wallet(user_id, &fields.address, &fields.chain)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateWallet);
        }

        let now = Utc::now();
        let wallet = Wallet {
            id: Uuid::new_v4(),
            user_id,
            address: fields.address,
            label: fields.label,
            chain: fields.chain,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_wallet(&wallet).await?;

        tracing::info!(
            "wallet_created id={} user={} chain={}",
            wallet.id,
            wallet.user_id,
            wallet.chain
        );
        Ok(wallet)
    }

    pub async fn get_wallet(&self, id: &str) -> Result<Wallet> {
        let id = parse_id("wallet", id)?;
        self.store
            .get_wallet(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Wallet not found".to_string()))
    }

    pub async fn list_wallets(&self, user_id: Uuid) -> Result<Vec<Wallet>> {
        self.store.list_wallets(user_id).await
    }

    /// Update wallet
    ///
    /// All-or-nothing: nothing is written unless every patched field passes
    /// and the resulting `(user, address, chain)` is still unique.
    pub async fn update_wallet(&self, id: &str, patch: &UpdateWalletRequest) -> Result<Wallet> {
        if patch.is_empty() {
            return Err(AppError::BadRequest(
                "At least one field (label, address, chain) is required".to_string(),
            ));
        }
        let existing = self.get_wallet(id).await?;
        let fields = validate_wallet_patch(&existing, patch)?;

        if let Some(other) = self
            .store
            .find_wallet(existing.user_id, &fields.address, &fields.chain)
            .await?
        {
            if other.id != existing.id {
                return Err(AppError::DuplicateWallet);
            }
        }

        let updated = Wallet {
            label: fields.label,
            address: fields.address,
            chain: fields.chain,
            updated_at: Utc::now(),
            ..existing
        };
        if !self.store.update_wallet(&updated).await? {
            return Err(AppError::NotFound("Wallet not found".to_string()));
        }

        tracing::info!("wallet_updated id={} chain={}", updated.id, updated.chain);
        Ok(updated)
    }

    pub async fn delete_wallet(&self, id: &str) -> Result<()> {
        let id = parse_id("wallet", id)?;
        if !self.store.delete_wallet(id).await? {
            return Err(AppError::NotFound("Wallet not found".to_string()));
        }
        tracing::info!("wallet_deleted id={}", id);
        Ok(())
    }
}
