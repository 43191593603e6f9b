use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::Result,
    models::{
        ApiResponse, CreateGoalRequest, GoalResponse, UpdateGoalRequest, UpdateProgressRequest,
    },
};

use super::{json_body, AppState};

/// POST /api/v1/goals
pub async fn create_goal(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateGoalRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<GoalResponse>>)> {
    let req = json_body(payload)?;
    let goal = state.goals.create_goal(&req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(goal, "Goal created")),
    ))
}

/// GET /api/v1/goals/{id}
pub async fn get_goal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<GoalResponse>>> {
    let goal = state.goals.get_goal(&id).await?;
    Ok(Json(ApiResponse::success(goal)))
}

/// PUT /api/v1/goals/{id}
pub async fn update_goal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateGoalRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<GoalResponse>>> {
    let patch = json_body(payload)?;
    let goal = state.goals.update_goal(&id, &patch).await?;
    Ok(Json(ApiResponse::with_message(goal, "Goal updated")))
}

/// PATCH /api/v1/goals/{id}/progress
pub async fn update_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateProgressRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<GoalResponse>>> {
    let req = json_body(payload)?;
    let goal = state.goals.update_progress(&id, &req).await?;
    Ok(Json(ApiResponse::with_message(goal, "Progress updated")))
}

/// GET /api/v1/goals/{id}/subgoals
pub async fn list_subgoals(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<GoalResponse>>>> {
    let goals = state.goals.list_subgoals(&id).await?;
    Ok(Json(ApiResponse::success(goals)))
}

/// DELETE /api/v1/goals/{id}
pub async fn delete_goal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    state.goals.delete_goal(&id).await?;
    Ok(Json(ApiResponse::with_message((), "Goal deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::test_support, models::CreateUserRequest};
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn goal_routes_report_derived_percentage() {
        let state = test_support::state();
        let user = state
            .users
            .create_user(&CreateUserRequest {
                username: Some("goalie".to_string()),
                email: Some("goalie@example.com".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let req = CreateGoalRequest {
            user_id: Some(user.id.to_string()),
            name: Some("Stack sats".to_string()),
            coin: Some("Bitcoin".to_string()),
            coin_symbol: Some("BTC".to_string()),
            current_amount: Some(250.0),
            target_amount: Some(1000.0),
            ..Default::default()
        };
        let (status, Json(created)) = create_goal(State(state.clone()), Ok(Json(req)))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.data.progress_percentage, 25);

        let id = created.data.goal.id.to_string();
        let rejected = update_progress(
            State(state.clone()),
            Path(id.clone()),
            Ok(Json(UpdateProgressRequest {
                current_amount: Some(1500.0),
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(rejected.into_response().status(), StatusCode::BAD_REQUEST);

        let Json(done) = update_progress(
            State(state),
            Path(id),
            Ok(Json(UpdateProgressRequest {
                current_amount: Some(1000.0),
            })),
        )
        .await
        .unwrap();
        assert_eq!(done.data.progress_percentage, 100);
    }

    #[tokio::test]
    async fn serialized_goal_is_flat_with_percentage() {
        let state = test_support::state();
        let user = state
            .users
            .create_user(&CreateUserRequest {
                username: Some("flat".to_string()),
                email: Some("flat@example.com".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let goal = state
            .goals
            .create_goal(&CreateGoalRequest {
                user_id: Some(user.id.to_string()),
                name: Some("Half".to_string()),
                coin: Some("Sui".to_string()),
                coin_symbol: Some("SUI".to_string()),
                current_amount: Some(5.0),
                target_amount: Some(10.0),
                ..Default::default()
            })
            .await
            .unwrap();

        let body = serde_json::to_value(ApiResponse::success(goal)).unwrap();
        assert_eq!(body["data"]["name"], "Half");
        assert_eq!(body["data"]["progress_percentage"], 50);
        assert_eq!(body["data"]["goal_type"], "regular");
    }
}
