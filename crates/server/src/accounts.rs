//! Account endpoints. Sessions are not kept server side: every protected
//! request carries Basic credentials, so login only checks them and logout
//! has nothing to forget.

use api_types::account::{LoginUser, PasswordChange, Profile, ProfileEdit, RegisterUser};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{EngineError, ProfileUpdate, Registration, User};

use crate::{ServerError, server::ServerState};

fn map_user(user: User) -> Profile {
    Profile {
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
    }
}

pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterUser>,
) -> Result<(StatusCode, Json<Profile>), ServerError> {
    let user = state
        .engine
        .register(Registration {
            username: payload.username,
            email: payload.email,
            first_name: payload.first_name,
            last_name: payload.last_name,
            password1: payload.password1,
            password2: payload.password2,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(map_user(user))))
}

pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginUser>,
) -> Result<Json<Profile>, ServerError> {
    match state
        .engine
        .authenticate(&payload.username, &payload.password)
        .await
    {
        Ok(user) => Ok(Json(map_user(user))),
        Err(EngineError::Unauthenticated) => Err(ServerError::InvalidCredentials),
        Err(err) => Err(err.into()),
    }
}

pub async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn password_change(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<PasswordChange>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .change_password(
            &user.username,
            &payload.old_password,
            &payload.new_password1,
            &payload.new_password2,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn profile(Extension(user): Extension<User>) -> Json<Profile> {
    Json(map_user(user))
}

pub async fn profile_edit(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileEdit>,
) -> Result<Json<Profile>, ServerError> {
    let user = state
        .engine
        .update_profile(
            &user.username,
            ProfileUpdate {
                email: payload.email,
                first_name: payload.first_name,
                last_name: payload.last_name,
            },
        )
        .await?;
    Ok(Json(map_user(user)))
}
