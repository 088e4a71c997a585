//! Rubric management.

use api_types::rubric::{RubricCountView, RubricListResponse, RubricView, RubricWrite};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Rubric, RubricCount, User};

use crate::{ServerError, server::ServerState};

pub(crate) fn map_rubric(rubric: Rubric) -> RubricView {
    RubricView {
        id: rubric.id,
        name: rubric.name,
        photo: rubric.photo,
    }
}

pub(crate) fn map_rubric_count(rubric: RubricCount) -> RubricCountView {
    RubricCountView {
        id: rubric.id,
        name: rubric.name,
        photo: rubric.photo,
        count: rubric.count,
    }
}

async fn popularity_list(state: &ServerState) -> Result<RubricListResponse, ServerError> {
    let rubrics = state
        .engine
        .rubrics_by_popularity()
        .await?
        .into_iter()
        .map(map_rubric_count)
        .collect();
    Ok(RubricListResponse { rubrics })
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<RubricListResponse>, ServerError> {
    Ok(Json(popularity_list(&state).await?))
}

/// The creation form shows the existing rubrics next to it.
pub async fn add_form(
    State(state): State<ServerState>,
) -> Result<Json<RubricListResponse>, ServerError> {
    Ok(Json(popularity_list(&state).await?))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<RubricWrite>,
) -> Result<(StatusCode, Json<RubricView>), ServerError> {
    let rubric = state
        .engine
        .new_rubric(&payload.name, payload.photo.as_deref())
        .await?;
    tracing::info!(rubric_id = rubric.id, username = %user.username, "rubric added");
    Ok((StatusCode::CREATED, Json(map_rubric(rubric))))
}

pub async fn edit_form(
    State(state): State<ServerState>,
    Path(rubric_id): Path<i32>,
) -> Result<Json<RubricView>, ServerError> {
    Ok(Json(map_rubric(state.engine.rubric(rubric_id).await?)))
}

pub async fn edit(
    State(state): State<ServerState>,
    Path(rubric_id): Path<i32>,
    Json(payload): Json<RubricWrite>,
) -> Result<Json<RubricView>, ServerError> {
    let rubric = state
        .engine
        .update_rubric(rubric_id, &payload.name, payload.photo.as_deref())
        .await?;
    Ok(Json(map_rubric(rubric)))
}

pub async fn delete_confirm(
    State(state): State<ServerState>,
    Path(rubric_id): Path<i32>,
) -> Result<Json<RubricView>, ServerError> {
    Ok(Json(map_rubric(state.engine.rubric(rubric_id).await?)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(rubric_id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_rubric(rubric_id).await?;
    tracing::info!(rubric_id, username = %user.username, "rubric removed");
    Ok(StatusCode::NO_CONTENT)
}
