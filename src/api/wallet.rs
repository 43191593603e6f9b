use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::Result,
    models::{ApiResponse, CreateWalletRequest, UpdateWalletRequest, Wallet},
};

use super::{json_body, AppState};

/// POST /api/v1/wallets
pub async fn create_wallet(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateWalletRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Wallet>>)> {
    let req = json_body(payload)?;
    let wallet = state.wallets.create_wallet(&req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(wallet, "Wallet created")),
    ))
}

/// GET /api/v1/wallets/{id}
pub async fn get_wallet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Wallet>>> {
    let wallet = state.wallets.get_wallet(&id).await?;
    Ok(Json(ApiResponse::success(wallet)))
}

/// PUT /api/v1/wallets/{id}
pub async fn update_wallet(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateWalletRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Wallet>>> {
    let patch = json_body(payload)?;
    let wallet = state.wallets.update_wallet(&id, &patch).await?;
    Ok(Json(ApiResponse::with_message(wallet, "Wallet updated")))
}

/// DELETE /api/v1/wallets/{id}
pub async fn delete_wallet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    state.wallets.delete_wallet(&id).await?;
    Ok(Json(ApiResponse::with_message((), "Wallet deleted")))
}
