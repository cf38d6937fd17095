use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use cambio_core::checkout::{Checkout, CheckoutView, FinalizeOutcome};
use cambio_core::entities::proof::ProofFile;
use cambio_core::entities::session::{CheckoutSession, Step, TradeRequest};
use cambio_core::handoff::HandoffLink;
use cambio_core::store::Recovery;
use cambio_sdk::objects::{
    CheckoutStateResponse, FormPatch, GoToStepRequest, HandoffResponse, HandoffStatus,
    OpenCheckoutRequest, ProofUploadResponse, RecoveryResponse,
};
use std::sync::Arc;

use super::ApiError;
use crate::state::AppState;

/// Convert a [`CheckoutView`] (core model) into a [`CheckoutStateResponse`] (API model).
fn to_response(view: CheckoutView) -> CheckoutStateResponse {
    let session = view.session;
    CheckoutStateResponse {
        step: session.step.number(),
        direction: session.trade.direction,
        currency: session.trade.currency,
        amount: session.trade.amount,
        seconds_remaining: session.seconds_remaining,
        expired: session.expired,
        show_errors: view.show_errors,
        field_errors: view
            .field_errors
            .iter()
            .map(|e| e.field().to_string())
            .collect(),
        warn_before_unload: view.warn_before_unload,
        proof_reference: session.form.proof_reference,
        rate_alert: view.rate_alert.map(|a| a.to_string()),
        closed: view.closed,
        reward_pending: view.reward_pending,
    }
}

fn released(link: HandoffLink, submission_failed: bool) -> HandoffResponse {
    HandoffResponse {
        status: HandoffStatus::Released,
        order_id: link.reference.order_id(),
        reference: link.reference.to_string(),
        uri: Some(link.uri),
        priority: link.priority,
        submission_failed,
    }
}

fn recovery_response(session: &CheckoutSession, available: bool, auto_resumed: bool) -> RecoveryResponse {
    RecoveryResponse {
        available,
        step: Some(session.step.number()),
        created_at: Some(session.created_at.unix_timestamp()),
        auto_resumed,
    }
}

async fn current(state: &AppState) -> Result<Arc<Checkout>, ApiError> {
    state.checkout().await.ok_or(ApiError::NoCheckout)
}

/// `GET /checkout/recovery`: report a stored session.
///
/// A session stored at the payment step is reopened by this call.
pub(super) async fn get_recovery(
    state: State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(checkout) = state.checkout().await {
        let view = checkout.view();
        if !view.closed {
            return Ok(Json(recovery_response(
                &view.session,
                false,
                state.auto_resumed(),
            )));
        }
    }

    let response = match state.inspect_recovery().await? {
        Recovery::Nothing => RecoveryResponse {
            available: false,
            step: None,
            created_at: None,
            auto_resumed: false,
        },
        Recovery::Offer(session) => recovery_response(&session, true, false),
        Recovery::AutoResume(session) => recovery_response(&session, false, true),
    };
    Ok(Json(response))
}

/// `POST /checkout/recovery/resume`: continue the stored session.
pub(super) async fn resume_recovery(
    state: State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let checkout = state
        .resume_stored()
        .await?
        .ok_or(ApiError::NothingToRecover)?;
    Ok(Json(to_response(checkout.view())))
}

/// `POST /checkout/recovery/dismiss`: discard the stored session.
pub(super) async fn dismiss_recovery(
    state: State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    Recovery::dismiss(state.deps.store.as_ref())?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /checkout`: open a checkout from the rate calculator.
///
/// Any checkout still open is closed first.
pub(super) async fn open_checkout(
    state: State<AppState>,
    Json(payload): Json<OpenCheckoutRequest>,
) -> impl IntoResponse {
    let checkout = state
        .open(TradeRequest {
            direction: payload.direction,
            currency: payload.currency,
            amount: payload.amount,
            displayed_total: payload.displayed_total,
        })
        .await;
    (StatusCode::CREATED, Json(to_response(checkout.view())))
}

/// `GET /checkout`: current checkout state.
pub(super) async fn get_checkout(state: State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let checkout = current(&state).await?;
    Ok(Json(to_response(checkout.view())))
}

/// `PATCH /checkout/form`: merge form fields.
pub(super) async fn update_form(
    state: State<AppState>,
    Json(patch): Json<FormPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let checkout = current(&state).await?;
    checkout.update_form(patch)?;
    Ok(Json(to_response(checkout.view())))
}

/// `POST /checkout/advance`: move to the next step.
pub(super) async fn advance(state: State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let checkout = current(&state).await?;
    checkout.advance()?;
    Ok(Json(to_response(checkout.view())))
}

/// `POST /checkout/retreat`: back one step; closes from step 1.
pub(super) async fn retreat(state: State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let checkout = current(&state).await?;
    checkout.retreat()?;
    Ok(Json(to_response(checkout.view())))
}

/// `POST /checkout/goto`: jump back to a completed step.
pub(super) async fn go_to(
    state: State<AppState>,
    Json(payload): Json<GoToStepRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let step = Step::from_number(payload.step)
        .ok_or_else(|| ApiError::BadRequest(format!("no step {}", payload.step)))?;
    let checkout = current(&state).await?;
    checkout.go_to(step)?;
    Ok(Json(to_response(checkout.view())))
}

/// `POST /checkout/close`: close without finalizing.
pub(super) async fn close(state: State<AppState>) -> Result<impl IntoResponse, ApiError> {
    current(&state).await?.close();
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /checkout/proof`: upload the proof of payment from the `file`
/// multipart field.
pub(super) async fn upload_proof(
    state: State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let checkout = current(&state).await?;

    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(ApiError::Multipart)? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("proof").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.map_err(ApiError::Multipart)?;
        file = Some(ProofFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }
    let file = file.ok_or_else(|| ApiError::BadRequest("missing multipart field `file`".into()))?;

    let url = checkout.upload_proof(file).await?;
    Ok(Json(ProofUploadResponse { url }))
}

/// `POST /checkout/finalize`: register the order and run the reward gate.
pub(super) async fn finalize(state: State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let checkout = current(&state).await?;
    let response = match checkout.finalize().await? {
        FinalizeOutcome::Released { link, .. } => released(link, false),
        FinalizeOutcome::Deferred { order_id } => HandoffResponse {
            status: HandoffStatus::Deferred,
            uri: None,
            order_id: Some(order_id),
            reference: order_id.to_string(),
            priority: false,
            submission_failed: false,
        },
        FinalizeOutcome::ManualFallback { link, .. } => released(link, true),
    };
    Ok(Json(response))
}

/// `POST /checkout/reward/complete`: reward earned; release with priority.
///
/// Conflicts without recording the reward when no hand-off is waiting.
pub(super) async fn complete_reward(
    state: State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let checkout = current(&state).await?;
    let link = checkout.complete_reward_and_release()?;
    Ok(Json(released(link, false)))
}

/// `POST /checkout/reward/skip`: reward dismissed; release without priority.
pub(super) async fn skip_reward(state: State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let checkout = current(&state).await?;
    let link = checkout.skip_reward()?;
    Ok(Json(released(link, false)))
}
