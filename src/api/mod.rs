// src/api/mod.rs

pub mod cache;
pub mod chain;
pub mod goal;
pub mod health;
pub mod user;
pub mod wallet;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use std::sync::Arc;

use crate::config::Config;
use crate::db::{Database, RecordStore};
use crate::error::Result;
use crate::services::{CacheGateway, CacheStore, GoalService, UserService, WalletService};

// AppState definition
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub users: Arc<UserService>,
    pub wallets: Arc<WalletService>,
    pub goals: Arc<GoalService>,
    pub cache: CacheGateway,
    pub config: Config,
}

impl AppState {
    /// Production wiring: Postgres for records, the given backend for the cache.
    pub fn new(db: Database, cache_store: Arc<dyn CacheStore>, config: Config) -> Self {
        let store: Arc<dyn RecordStore> = Arc::new(db.clone());
        Self::with_stores(db, store, cache_store, config)
    }

    pub fn with_stores(
        db: Database,
        store: Arc<dyn RecordStore>,
        cache_store: Arc<dyn CacheStore>,
        config: Config,
    ) -> Self {
        Self {
            db,
            users: Arc::new(UserService::new(store.clone())),
            wallets: Arc::new(WalletService::new(store.clone())),
            goals: Arc::new(GoalService::new(store)),
            cache: CacheGateway::new(cache_store),
            config,
        }
    }
}

/// Unwraps a JSON body, turning framework rejections into the failure envelope.
pub fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    let Json(body) = payload?;
    Ok(body)
}
