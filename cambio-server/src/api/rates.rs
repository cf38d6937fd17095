use axum::{Json, extract::State, response::IntoResponse};
use cambio_sdk::objects::RatesResponse;

use crate::state::AppState;

/// `GET /rates`: quotes from the latest refresh.
pub(super) async fn get_rates(state: State<AppState>) -> impl IntoResponse {
    let snapshot = state.deps.rates.current();
    Json(RatesResponse {
        quotes: snapshot.quotes().to_vec(),
    })
}
