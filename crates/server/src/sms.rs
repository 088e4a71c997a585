use api_types::sms::{SmsListResponse, SmsView};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

pub async fn list(State(state): State<ServerState>) -> Result<Json<SmsListResponse>, ServerError> {
    let sms = state
        .engine
        .sms_list()
        .await?
        .into_iter()
        .map(|sms| SmsView {
            id: sms.id,
            text: sms.text,
            created_at: sms.created_at,
        })
        .collect();
    Ok(Json(SmsListResponse { sms }))
}
