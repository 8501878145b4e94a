//! HTTP API.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{Deserialize, Serialize};
use serde_json::json;
use skyarchive_common::{epoch_millis, now, ArchiveError, Currency, GeoInfo};
use skyarchive_fx::{suggest_for_geo, RateSnapshot};
use tokio::task::JoinError;
use tower_http::trace::TraceLayer;
use tracing::{error, instrument};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/api/exchange-rate", get(exchange_rate))
        .route("/api/suggested-amounts", get(suggested_amounts))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state.metrics.to_prometheus(&state.fetcher.stats());
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

/// Error body `{ code, message }`.
#[derive(Debug)]
pub struct ApiError(ArchiveError);

impl From<ArchiveError> for ApiError {
    fn from(err: ArchiveError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = json!({
            "code": self.0.error_code(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct ExchangeRateQuery {
    target: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExchangeRateResponse {
    #[serde(flatten)]
    snapshot: RateSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<Currency>,
    /// Present whenever `target` is; `null` when the table has no rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    rate: Option<Option<f64>>,
}

impl ExchangeRateResponse {
    fn new(snapshot: RateSnapshot, target: Option<Currency>) -> Self {
        let rate = target.as_ref().map(|t| snapshot.rate_for(t));
        Self {
            snapshot,
            target,
            rate,
        }
    }
}

/// Run the fetch on its own task so a panic surfaces as a `JoinError`.
async fn fetch_snapshot(state: &AppState) -> Result<RateSnapshot, JoinError> {
    let fetcher = state.fetcher.clone();
    tokio::spawn(async move { fetcher.fetch().await }).await
}

fn failure_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "rate fetch panicked".to_string()
    }
}

fn parse_target(raw: Option<&str>) -> Result<Option<Currency>, ArchiveError> {
    match raw.map(str::trim).filter(|code| !code.is_empty()) {
        Some(code) => Currency::parse(code).map(Some),
        None => Ok(None),
    }
}

#[instrument(skip(state))]
async fn exchange_rate(
    State(state): State<AppState>,
    Query(query): Query<ExchangeRateQuery>,
) -> Result<Response, ApiError> {
    state.metrics.exchange_rate_request();

    let target = parse_target(query.target.as_deref()).map_err(|e| {
        state.metrics.bad_request();
        ApiError::from(e)
    })?;

    match fetch_snapshot(&state).await {
        Ok(snapshot) => Ok((
            [(header::CACHE_CONTROL, state.cache_control.clone())],
            Json(ExchangeRateResponse::new(snapshot, target)),
        )
            .into_response()),
        Err(e) => {
            let message = failure_message(e);
            error!(error = %message, "Exchange rate fetch failed unexpectedly");
            state.metrics.internal_error();

            let snapshot = RateSnapshot::unavailable(message, epoch_millis(now()));
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ExchangeRateResponse::new(snapshot, target)),
            )
                .into_response())
        }
    }
}

#[derive(Debug, Deserialize)]
struct SuggestedAmountsQuery {
    country: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestedAmountsResponse {
    country: String,
    currency: Currency,
    symbol: String,
    amounts: Vec<f64>,
    converted: bool,
    provider: String,
    /// Hand-picked amounts in the country's own currency.
    local_suggested: Vec<f64>,
}

fn to_numbers(amounts: &[Decimal]) -> Vec<f64> {
    amounts.iter().filter_map(|a| a.to_f64()).collect()
}

#[instrument(skip(state))]
async fn suggested_amounts(
    State(state): State<AppState>,
    Query(query): Query<SuggestedAmountsQuery>,
) -> Result<Json<SuggestedAmountsResponse>, ApiError> {
    state.metrics.suggested_amount_request();

    let geo = GeoInfo::for_country(query.country.as_deref()).map_err(|e| {
        state.metrics.bad_request();
        ApiError::from(e)
    })?;

    let snapshot = match fetch_snapshot(&state).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            let message = failure_message(e);
            error!(error = %message, "Rate fetch failed, suggesting USD amounts");
            state.metrics.internal_error();
            RateSnapshot::unavailable(message, epoch_millis(now()))
        }
    };

    let suggested = suggest_for_geo(&geo, &snapshot);
    Ok(Json(SuggestedAmountsResponse {
        country: suggested.country,
        currency: suggested.currency,
        symbol: suggested.symbol,
        amounts: to_numbers(&suggested.amounts),
        converted: suggested.converted,
        provider: suggested.provider,
        local_suggested: to_numbers(&geo.suggested),
    }))
}
