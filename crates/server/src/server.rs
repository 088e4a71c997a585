use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use tower_http::trace::TraceLayer;

use std::{path::PathBuf, sync::Arc};

use crate::{LOGIN_URL, accounts, bbs, photos, rubrics, search, sms};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    /// Directory uploaded photos are written under.
    pub media_root: PathBuf,
}

fn login_redirect(request: &Request) -> Response {
    let next = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    Redirect::to(&format!("{LOGIN_URL}?{query}")).into_response()
}

/// Lets a request through only with valid Basic credentials; the account is
/// made available to handlers as an `Extension<engine::User>`.
async fn auth(
    State(state): State<ServerState>,
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(TypedHeader(credentials)) = auth_header else {
        return login_redirect(&request);
    };

    let user = match state
        .engine
        .authenticate(credentials.username(), credentials.password())
        .await
    {
        Ok(user) => user,
        Err(EngineError::Unauthenticated) => {
            tracing::debug!(username = credentials.username(), "rejected credentials");
            return login_redirect(&request);
        }
        Err(err) => return crate::ServerError::from(err).into_response(),
    };

    request.extensions_mut().insert(user);
    next.run(request).await
}

fn public_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(bbs::index))
        .route("/{rubric_id}/", get(bbs::by_rubric))
        .route("/detail/{bb_id}/", get(bbs::detail))
        .route(
            "/detail/{year}/{month}/{day}/{bb_id}/",
            get(bbs::legacy_detail),
        )
        .route("/search/", get(search::form).post(search::search))
        .route("/accounts/register/", post(accounts::register))
        .route("/accounts/login/", post(accounts::login))
        .route("/accounts/logout/", post(accounts::logout))
        .route("/testapp/sms/", get(sms::list))
}

fn protected_routes(state: ServerState) -> Router<ServerState> {
    Router::new()
        .route("/add/", get(bbs::add_form).post(bbs::add))
        .route("/update/{bb_id}/", get(bbs::edit_form).post(bbs::edit))
        .route(
            "/delete/{bb_id}/",
            get(bbs::delete_confirm).post(bbs::delete),
        )
        .route("/addrub/", get(rubrics::add_form).post(rubrics::create))
        .route("/rubrics/", get(rubrics::list))
        .route(
            "/rubrics/{rubric_id}/edit/",
            get(rubrics::edit_form).post(rubrics::edit),
        )
        .route(
            "/rubrics/{rubric_id}/delete/",
            get(rubrics::delete_confirm).post(rubrics::delete),
        )
        .route("/photos/", post(photos::upload))
        .route("/accounts/password_change/", post(accounts::password_change))
        .route(
            "/accounts/profile/",
            get(accounts::profile).post(accounts::profile_edit),
        )
        .route_layer(middleware::from_fn_with_state(state, auth))
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    media_root: PathBuf,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        media_root,
    };

    axum::serve(listener, router(state)).await
}
