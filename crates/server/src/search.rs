use api_types::search::{SearchFormContext, SearchRequest, SearchResponse};
use axum::{Json, extract::State};

use crate::{ServerError, bbs::map_bb, rubrics::map_rubric, server::ServerState};

pub async fn form(State(state): State<ServerState>) -> Result<Json<SearchFormContext>, ServerError> {
    let rubrics = state
        .engine
        .rubrics()
        .await?
        .into_iter()
        .map(map_rubric)
        .collect();
    Ok(Json(SearchFormContext { rubrics }))
}

/// Listings of one rubric whose title matches the keyword. No match is an
/// empty result, not an error.
pub async fn search(
    State(state): State<ServerState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ServerError> {
    let bbs = state
        .engine
        .search_bbs(&payload.keyword, payload.rubric_id)
        .await?;
    Ok(Json(SearchResponse {
        keyword: payload.keyword,
        rubric_id: payload.rubric_id,
        bbs: bbs.into_iter().map(map_bb).collect(),
    }))
}
