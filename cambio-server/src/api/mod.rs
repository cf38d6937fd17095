//! Host API consumed by the checkout frontend.
//!
//! # Endpoints
//!
//! - `GET  /rates`                      – current quotes
//! - `GET  /checkout/recovery`          – stored session available for recovery
//! - `POST /checkout/recovery/resume`   – resume the stored session
//! - `POST /checkout/recovery/dismiss`  – discard the stored session
//! - `POST /checkout`                   – open a checkout
//! - `GET  /checkout`                   – current checkout state
//! - `PATCH /checkout/form`             – update form fields
//! - `POST /checkout/advance`           – next step
//! - `POST /checkout/retreat`           – previous step, or close from step 1
//! - `POST /checkout/goto`              – jump back to a completed step
//! - `POST /checkout/close`             – close without finalizing
//! - `POST /checkout/proof`             – upload the proof of payment
//! - `POST /checkout/finalize`          – register the order
//! - `POST /checkout/reward/complete`   – reward earned, release with priority
//! - `POST /checkout/reward/skip`       – reward dismissed, release without
//! - `GET  /feedback`                   – feedback deep link entry

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use cambio_core::checkout::CheckoutError;
use cambio_core::config::MAX_PROOF_BYTES;
use cambio_core::entities::proof::UploadError;
use cambio_core::processors::{FinalizeError, RewardGateError};
use cambio_core::state_machine::TransitionError;
use cambio_core::store::SessionStoreError;
use cambio_sdk::objects::DeepLinkError;
use serde::Serialize;

use crate::state::AppState;

mod checkout;
mod feedback;
mod rates;

/// Multipart framing allowance on top of the largest accepted proof file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the host API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rates", get(rates::get_rates))
        .route("/checkout/recovery", get(checkout::get_recovery))
        .route("/checkout/recovery/resume", post(checkout::resume_recovery))
        .route("/checkout/recovery/dismiss", post(checkout::dismiss_recovery))
        .route(
            "/checkout",
            post(checkout::open_checkout).get(checkout::get_checkout),
        )
        .route("/checkout/form", patch(checkout::update_form))
        .route("/checkout/advance", post(checkout::advance))
        .route("/checkout/retreat", post(checkout::retreat))
        .route("/checkout/goto", post(checkout::go_to))
        .route("/checkout/close", post(checkout::close))
        .route(
            "/checkout/proof",
            post(checkout::upload_proof)
                .layer(DefaultBodyLimit::max(MAX_PROOF_BYTES + MULTIPART_OVERHEAD)),
        )
        .route("/checkout/finalize", post(checkout::finalize))
        .route("/checkout/reward/complete", post(checkout::complete_reward))
        .route("/checkout/reward/skip", post(checkout::skip_reward))
        .route("/feedback", get(feedback::open_feedback))
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in host API handlers.
#[derive(Debug)]
enum ApiError {
    /// No checkout has been opened.
    NoCheckout,
    /// No fresh session is stored.
    NothingToRecover,
    /// The request body is malformed.
    BadRequest(String),
    /// The multipart body could not be read, or exceeded the body limit.
    Multipart(MultipartError),
    Checkout(CheckoutError),
    Store(SessionStoreError),
    DeepLink(DeepLinkError),
}

impl From<CheckoutError> for ApiError {
    fn from(e: CheckoutError) -> Self {
        ApiError::Checkout(e)
    }
}

impl From<SessionStoreError> for ApiError {
    fn from(e: SessionStoreError) -> Self {
        ApiError::Store(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    /// Step-1 fields to flag inline.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<&'static str>,
}

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    let body = ErrorBody {
        error: error.to_string(),
        fields: Vec::new(),
    };
    (status, Json(body)).into_response()
}

fn checkout_status(e: &CheckoutError) -> StatusCode {
    match e {
        CheckoutError::Transition(e) => match e {
            TransitionError::Validation(_) | TransitionError::TermsNotAccepted => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            TransitionError::RateUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            TransitionError::Closed
            | TransitionError::NoForwardStep
            | TransitionError::NotBackward { .. }
            | TransitionError::WrongStep { .. } => StatusCode::CONFLICT,
        },
        CheckoutError::Upload(e) => match e {
            UploadError::Empty => StatusCode::BAD_REQUEST,
            UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            UploadError::UploadFailed(_) => StatusCode::BAD_GATEWAY,
        },
        CheckoutError::Finalize(e) => match e {
            FinalizeError::AlreadyInFlight => StatusCode::CONFLICT,
            FinalizeError::InvalidAmount(_)
            | FinalizeError::TotalOutOfRange(_)
            | FinalizeError::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            FinalizeError::RateUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            FinalizeError::SubmissionFailed { .. } => StatusCode::BAD_GATEWAY,
        },
        CheckoutError::Reward(e) => match e {
            RewardGateError::AlreadyEarned | RewardGateError::NothingPending => {
                StatusCode::CONFLICT
            }
        },
    }
}

fn invalid_fields(e: &CheckoutError) -> Vec<&'static str> {
    let errors = match e {
        CheckoutError::Transition(TransitionError::Validation(errors))
        | CheckoutError::Finalize(FinalizeError::Validation(errors)) => errors,
        _ => return Vec::new(),
    };
    errors.iter().map(|e| e.field()).collect()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NoCheckout => error_response(StatusCode::NOT_FOUND, "no checkout is open"),
            ApiError::NothingToRecover => {
                error_response(StatusCode::NOT_FOUND, "no session to recover")
            }
            ApiError::BadRequest(message) => error_response(StatusCode::BAD_REQUEST, message),
            ApiError::Multipart(e) => error_response(e.status(), e.body_text()),
            ApiError::Checkout(e) => {
                let status = checkout_status(&e);
                if status.is_server_error() {
                    tracing::warn!(error = %e, "Checkout request failed");
                }
                let body = ErrorBody {
                    error: e.to_string(),
                    fields: invalid_fields(&e),
                };
                (status, Json(body)).into_response()
            }
            ApiError::Store(e) => {
                tracing::error!(error = %e, "Session store error");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
            ApiError::DeepLink(e) => error_response(StatusCode::BAD_REQUEST, e),
        }
    }
}
