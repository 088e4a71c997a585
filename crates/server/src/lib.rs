use api_types::error::{ErrorResponse, FieldErrorView, ValidationErrorResponse};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use engine::{EngineError, ValidationErrors};

pub use server::{ServerState, router, run_with_listener};

mod accounts;
mod bbs;
mod photos;
mod rubrics;
mod search;
mod server;
mod sms;

/// Where unauthenticated requests to protected routes are sent.
pub const LOGIN_URL: &str = "/accounts/login/";

pub enum ServerError {
    Engine(EngineError),
    InvalidCredentials,
    Internal(String),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) | EngineError::InvalidKind(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EngineError::ReferentialIntegrity(_) => StatusCode::CONFLICT,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Unauthenticated => StatusCode::UNAUTHORIZED,
        EngineError::Hashing(_) | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Hashing(hash_err) => {
            tracing::error!("password hashing error: {hash_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

fn validation_body(errors: ValidationErrors) -> ValidationErrorResponse {
    ValidationErrorResponse {
        errors: errors
            .into_iter()
            .map(|e| FieldErrorView {
                field: e.field.to_string(),
                kind: e.kind.as_str().to_string(),
                message: e.message,
            })
            .collect(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(EngineError::Validation(errors)) => {
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(validation_body(errors)))
                    .into_response();
            }
            ServerError::Engine(EngineError::Unauthenticated) => {
                return Redirect::to(LOGIN_URL).into_response();
            }
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid username or password".to_string(),
            ),
            ServerError::Internal(err) => {
                tracing::error!("internal error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<ValidationErrors> for ServerError {
    fn from(value: ValidationErrors) -> Self {
        Self::Engine(EngineError::Validation(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::header::LOCATION;
    use engine::ValidationKind;

    use super::*;

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(ValidationErrors::single(
            "title",
            ValidationKind::InvalidTitle,
            "too short",
        ))
        .into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn engine_referential_integrity_maps_to_409() {
        let res = ServerError::from(EngineError::ReferentialIntegrity("Transport".to_string()))
            .into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unauthenticated_redirects_to_login() {
        let res = ServerError::from(EngineError::Unauthenticated).into_response();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[LOCATION], LOGIN_URL);
    }

    #[test]
    fn invalid_credentials_maps_to_401() {
        let res = ServerError::InvalidCredentials.into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn database_error_maps_to_500() {
        let res = ServerError::from(EngineError::Database(sea_orm::DbErr::Custom(
            "boom".to_string(),
        )))
        .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
