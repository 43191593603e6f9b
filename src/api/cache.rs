use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    error::Result,
    models::{ApiResponse, CacheEntry, CacheStats},
};

use super::{json_body, AppState};

#[derive(Debug, Deserialize)]
pub struct CacheWriteRequest {
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct BatchMetadataRequest {
    pub entries: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CacheWriteResponse {
    pub stored: usize,
}

#[derive(Debug, Serialize)]
pub struct CacheInvalidateResponse {
    pub removed: u64,
}

/// GET /api/v1/cache/wallets/{wallet_id}/{data_type}
///
/// A miss (or an unreachable cache) is `data: null`, not an error.
pub async fn get_wallet_data(
    State(state): State<AppState>,
    Path((wallet_id, data_type)): Path<(String, String)>,
) -> Json<ApiResponse<Option<CacheEntry>>> {
    let entry = state.cache.get_wallet_data(&wallet_id, &data_type).await;
    Json(ApiResponse::success(entry))
}

/// PUT /api/v1/cache/wallets/{wallet_id}/{data_type}
pub async fn set_wallet_data(
    State(state): State<AppState>,
    Path((wallet_id, data_type)): Path<(String, String)>,
    payload: std::result::Result<Json<CacheWriteRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<CacheWriteResponse>>> {
    let req = json_body(payload)?;
    let stored = state
        .cache
        .set_wallet_data(&wallet_id, &data_type, req.data)
        .await;
    Ok(Json(ApiResponse::success(CacheWriteResponse {
        stored: usize::from(stored),
    })))
}

/// DELETE /api/v1/cache/wallets/{wallet_id}/{data_type}
pub async fn invalidate_wallet_data(
    State(state): State<AppState>,
    Path((wallet_id, data_type)): Path<(String, String)>,
) -> Json<ApiResponse<CacheInvalidateResponse>> {
    let removed = state
        .cache
        .invalidate_wallet_data(&wallet_id, Some(&data_type))
        .await;
    Json(ApiResponse::success(CacheInvalidateResponse { removed }))
}

/// DELETE /api/v1/cache/wallets/{wallet_id}
pub async fn invalidate_wallet(
    State(state): State<AppState>,
    Path(wallet_id): Path<String>,
) -> Json<ApiResponse<CacheInvalidateResponse>> {
    let removed = state.cache.invalidate_wallet_data(&wallet_id, None).await;
    Json(ApiResponse::success(CacheInvalidateResponse { removed }))
}

/// GET /api/v1/cache/metadata/{coin_type}
pub async fn get_metadata(
    State(state): State<AppState>,
    Path(coin_type): Path<String>,
) -> Json<ApiResponse<Option<CacheEntry>>> {
    Json(ApiResponse::success(state.cache.get_metadata(&coin_type).await))
}

/// PUT /api/v1/cache/metadata/{coin_type}
pub async fn set_metadata(
    State(state): State<AppState>,
    Path(coin_type): Path<String>,
    payload: std::result::Result<Json<CacheWriteRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<CacheWriteResponse>>> {
    let req = json_body(payload)?;
    let stored = state.cache.set_metadata(&coin_type, req.data).await;
    Ok(Json(ApiResponse::success(CacheWriteResponse {
        stored: usize::from(stored),
    })))
}

/// POST /api/v1/cache/metadata/batch
pub async fn set_batch_metadata(
    State(state): State<AppState>,
    payload: std::result::Result<Json<BatchMetadataRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<CacheWriteResponse>>> {
    let req = json_body(payload)?;
    let stored = state.cache.set_batch_metadata(req.entries).await;
    Ok(Json(ApiResponse::success(CacheWriteResponse { stored })))
}

/// GET /api/v1/cache/stats
pub async fn get_stats(State(state): State<AppState>) -> Json<ApiResponse<CacheStats>> {
    Json(ApiResponse::success(state.cache.stats().await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support;
    use serde_json::json;

    fn wallet_path() -> Path<(String, String)> {
        Path(("wallet-1".to_string(), "balance".to_string()))
    }

    #[tokio::test]
    async fn set_get_invalidate_round() {
        let state = test_support::state();

        let Json(miss) = get_wallet_data(State(state.clone()), wallet_path()).await;
        assert!(miss.data.is_none());

        let Json(written) = set_wallet_data(
            State(state.clone()),
            wallet_path(),
            Ok(Json(CacheWriteRequest {
                data: json!({"balance": "12.5"}),
            })),
        )
        .await
        .unwrap();
        assert_eq!(written.data.stored, 1);

        let Json(hit) = get_wallet_data(State(state.clone()), wallet_path()).await;
        assert_eq!(hit.data.unwrap().data["balance"], "12.5");

        let Json(cleared) = invalidate_wallet_data(State(state.clone()), wallet_path()).await;
        assert_eq!(cleared.data.removed, 1);
        let Json(after) = get_wallet_data(State(state), wallet_path()).await;
        assert!(after.data.is_none());
    }

    #[tokio::test]
    async fn batch_metadata_counts_toward_stats() {
        let state = test_support::state();
        let req = BatchMetadataRequest {
            entries: HashMap::from([
                ("sui".to_string(), json!({"decimals": 9})),
                ("apt".to_string(), json!({"decimals": 8})),
            ]),
        };
        let Json(written) = set_batch_metadata(State(state.clone()), Ok(Json(req)))
            .await
            .unwrap();
        assert_eq!(written.data.stored, 2);

        let Json(stats) = get_stats(State(state)).await;
        assert_eq!(stats.data.total_entries, 2);
    }
}
