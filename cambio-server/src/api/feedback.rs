use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use cambio_sdk::objects::{FeedbackDeepLink, FeedbackPromptResponse};
use std::collections::HashMap;

use super::ApiError;
use crate::state::AppState;

/// `GET /feedback?order_id=…&action=confirm`: enter the post-submission
/// feedback flow for an existing order.
///
/// Independent of the checkout: no session is read or written.
pub(super) async fn open_feedback(
    state: State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let link = FeedbackDeepLink::from_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .map_err(ApiError::DeepLink)?;
    tracing::info!(order_id = %link.order_id, "Feedback deep link opened");

    Ok(Json(FeedbackPromptResponse {
        order_id: link.order_id,
        action: link.action,
        confirm_uri: state.handoff.confirmation(link.order_id),
    }))
}
