use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::Result,
    models::{ApiResponse, CreateUserRequest, GoalResponse, User, Wallet},
};

use super::{json_body, AppState};

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<User>>)> {
    let req = json_body(payload)?;
    let user = state.users.create_user(&req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(user, "User created")),
    ))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<User>>> {
    let user = state.users.get_user(&id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// GET /api/v1/users/{id}/wallets
pub async fn list_user_wallets(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Wallet>>>> {
    let user_id = state.users.require_existing(&id).await?;
    let wallets = state.wallets.list_wallets(user_id).await?;
    Ok(Json(ApiResponse::success(wallets)))
}

/// GET /api/v1/users/{id}/goals
pub async fn list_user_goals(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<GoalResponse>>>> {
    let user_id = state.users.require_existing(&id).await?;
    let goals = state.goals.list_goals(user_id).await?;
    Ok(Json(ApiResponse::success(goals)))
}
