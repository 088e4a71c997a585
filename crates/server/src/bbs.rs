//! Listing pages: index, rubric view, detail and the listing forms.

use api_types::{
    ListingKind,
    bb::{
        BbFormContext, BbSubmit, BbView, ByRubricQuery, ByRubricResponse, DetailResponse,
        IndexQuery, IndexResponse, KindOption, PageInfo, RubricOrder,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Redirect,
};
use engine::{Bb, BbKind, BbOrder, BbSubmission, PAGE_SIZE, Price, User};

use crate::{
    ServerError,
    rubrics::{map_rubric, map_rubric_count},
    server::ServerState,
};

pub(crate) fn map_kind(kind: BbKind) -> ListingKind {
    match kind {
        BbKind::Buy => ListingKind::Buy,
        BbKind::Sell => ListingKind::Sell,
        BbKind::Exchange => ListingKind::Exchange,
    }
}

fn unmap_kind(kind: ListingKind) -> BbKind {
    match kind {
        ListingKind::Buy => BbKind::Buy,
        ListingKind::Sell => BbKind::Sell,
        ListingKind::Exchange => BbKind::Exchange,
    }
}

pub(crate) fn map_bb(bb: Bb) -> BbView {
    let title_and_price = bb.title_and_price();
    BbView {
        id: bb.id,
        kind: map_kind(bb.kind),
        rubric_id: bb.rubric_id,
        title: bb.title,
        content: bb.content,
        price: bb.price.map(|price| price.to_string()),
        published: bb.published,
        updated_at: bb.updated_at,
        photo: bb.photo,
        title_and_price,
    }
}

fn unmap_order(order: RubricOrder) -> BbOrder {
    match order {
        RubricOrder::Price => BbOrder::Price,
        RubricOrder::Recency => BbOrder::Recency,
    }
}

fn submission(payload: BbSubmit) -> BbSubmission {
    BbSubmission {
        kind: payload.kind.map(unmap_kind),
        rubric_id: payload.rubric_id,
        title: payload.title,
        content: payload.content,
        price: payload.price,
        photo: payload.photo,
    }
}

pub async fn index(
    State(state): State<ServerState>,
    Query(query): Query<IndexQuery>,
) -> Result<Json<IndexResponse>, ServerError> {
    let page = state
        .engine
        .bbs_page(query.page.as_deref(), PAGE_SIZE)
        .await?;
    let rubrics = state.engine.rubrics_by_popularity().await?;

    let info = PageInfo {
        number: page.number,
        num_pages: page.num_pages,
        total: page.total,
        has_next: page.has_next(),
        has_previous: page.has_previous(),
    };
    Ok(Json(IndexResponse {
        bbs: page.items.into_iter().map(map_bb).collect(),
        rubrics: rubrics.into_iter().map(map_rubric_count).collect(),
        page: info,
    }))
}

pub async fn by_rubric(
    State(state): State<ServerState>,
    Path(rubric_id): Path<i32>,
    Query(query): Query<ByRubricQuery>,
) -> Result<Json<ByRubricResponse>, ServerError> {
    let bbs = state
        .engine
        .bbs_by_rubric(rubric_id, unmap_order(query.order))
        .await?;
    let current = state.engine.rubric(rubric_id).await?;
    let rubrics = state.engine.rubrics_with_bbs().await?;

    Ok(Json(ByRubricResponse {
        bbs: bbs.into_iter().map(map_bb).collect(),
        rubrics: rubrics.into_iter().map(map_rubric_count).collect(),
        current_rubric: map_rubric(current),
    }))
}

async fn detail_response(state: &ServerState, bb_id: i32) -> Result<DetailResponse, ServerError> {
    let bb = state.engine.bb(bb_id).await?;
    let rubrics = state.engine.rubrics_with_bbs().await?;
    Ok(DetailResponse {
        bb: map_bb(bb),
        rubrics: rubrics.into_iter().map(map_rubric_count).collect(),
    })
}

pub async fn detail(
    State(state): State<ServerState>,
    Path(bb_id): Path<i32>,
) -> Result<Json<DetailResponse>, ServerError> {
    Ok(Json(detail_response(&state, bb_id).await?))
}

/// Old date-based detail address. The date parts are ignored.
pub async fn legacy_detail(
    Path((_year, _month, _day, bb_id)): Path<(u32, u32, u32, i32)>,
) -> Redirect {
    Redirect::permanent(&format!("/detail/{bb_id}/"))
}

pub async fn add_form(
    State(state): State<ServerState>,
) -> Result<Json<BbFormContext>, ServerError> {
    let kinds = BbKind::ALL
        .into_iter()
        .map(|kind| KindOption {
            value: map_kind(kind),
            label: kind.label().to_string(),
        })
        .collect();
    let rubrics = state
        .engine
        .rubrics()
        .await?
        .into_iter()
        .map(map_rubric)
        .collect();

    Ok(Json(BbFormContext {
        kinds,
        rubrics,
        initial_price: Price::ZERO.to_string(),
    }))
}

pub async fn add(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<BbSubmit>,
) -> Result<(StatusCode, Json<BbView>), ServerError> {
    let bb = state.engine.submit_bb(submission(payload)).await?;
    tracing::info!(bb_id = bb.id, username = %user.username, "listing submitted");
    Ok((StatusCode::CREATED, Json(map_bb(bb))))
}

pub async fn edit_form(
    State(state): State<ServerState>,
    Path(bb_id): Path<i32>,
) -> Result<Json<BbView>, ServerError> {
    let bb = state.engine.bb(bb_id).await?;
    Ok(Json(map_bb(bb)))
}

pub async fn edit(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(bb_id): Path<i32>,
    Json(payload): Json<BbSubmit>,
) -> Result<Json<BbView>, ServerError> {
    let bb = state
        .engine
        .submit_bb_update(bb_id, submission(payload))
        .await?;
    tracing::info!(bb_id, username = %user.username, "listing edited");
    Ok(Json(map_bb(bb)))
}

pub async fn delete_confirm(
    State(state): State<ServerState>,
    Path(bb_id): Path<i32>,
) -> Result<Json<DetailResponse>, ServerError> {
    Ok(Json(detail_response(&state, bb_id).await?))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(bb_id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_bb(bb_id).await?;
    tracing::info!(bb_id, username = %user.username, "listing removed");
    Ok(StatusCode::NO_CONTENT)
}
