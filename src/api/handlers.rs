//! Read-only API handlers — spec.md §6.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::store::{PredictionStore, StateStore, SubmitError};
use crate::verify::scorecard;

use super::envelope::{ApiResponse, ResponseMeta};
use super::state::ApiState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CurrentValues {
    kp: f64,
    bz: f64,
    wind_speed: f64,
    wind_density: f64,
}

/// `GET /api/v1/alerts`
pub async fn get_alerts(State(state): State<ApiState>) -> Response {
    let store = StateStore::new(&state.data_dir);
    let checker_state = store.load();

    let mut alerts: Vec<_> = checker_state.alerts_sent.iter().rev().take(50).cloned().collect();
    alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    ApiResponse::ok(json!({
        "alerts": alerts,
        "health": checker_state.data_health,
        "lastRun": checker_state.last_run_at,
        "checkerActive": checker_state.last_run_at.is_some(),
        "currentValues": CurrentValues {
            kp: checker_state.last_kp,
            bz: checker_state.last_bz,
            wind_speed: checker_state.last_wind_speed,
            wind_density: checker_state.last_wind_density,
        },
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictionConfigSubset {
    verification_window_hours: u32,
    cooldown_hours: u32,
    max_predictions: usize,
}

/// `GET /api/v1/predictions`
pub async fn get_predictions(State(state): State<ApiState>) -> Response {
    let store = PredictionStore::new(&state.data_dir);
    let prediction_state = store.load();

    let mut predictions = prediction_state.predictions.clone();
    predictions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let card = scorecard::compute(
        &prediction_state.predictions,
        prediction_state.config.base_rate,
        chrono::Utc::now(),
    );

    ApiResponse::ok(json!({
        "predictions": predictions,
        "scorecard": card,
        "config": PredictionConfigSubset {
            verification_window_hours: prediction_state.config.verification_window_hours,
            cooldown_hours: prediction_state.config.cooldown_hours,
            max_predictions: prediction_state.config.max_predictions,
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct SubmitPredictionBody {
    pub note: Option<String>,
}

/// `POST /api/v1/predictions`
pub async fn submit_prediction(
    State(state): State<ApiState>,
    Json(body): Json<SubmitPredictionBody>,
) -> Response {
    let store = PredictionStore::new(&state.data_dir);
    let mut prediction_state = store.load();

    match PredictionStore::submit(&mut prediction_state, body.note, chrono::Utc::now()) {
        Ok(prediction) => {
            store.save(&prediction_state);
            ApiResponse::ok(prediction)
        }
        Err(SubmitError::Cooldown { cooldown_ends }) => (
            axum::http::StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": {"code": "COOLDOWN", "message": "a prediction is already pending verification", "cooldownEnds": cooldown_ends},
                "meta": ResponseMeta::default(),
            })),
        )
            .into_response(),
    }
}

/// `GET /api/v1/health`
pub async fn get_health(State(state): State<ApiState>) -> Response {
    let store = StateStore::new(&state.data_dir);
    let checker_state = store.load();
    let ok = checker_state.data_health.values().all(|h| h.ok);

    ApiResponse::ok(json!({
        "ok": ok,
        "lastRun": checker_state.last_run_at,
        "dataHealth": checker_state.data_health,
    }))
}

/// `GET /api/v1/metrics` — a minimal Prometheus-style text exposition.
pub async fn get_metrics(State(state): State<ApiState>) -> Response {
    let store = StateStore::new(&state.data_dir);
    let checker_state = store.load();
    let prediction_store = PredictionStore::new(&state.data_dir);
    let prediction_state = prediction_store.load();

    let sources_healthy = checker_state.data_health.values().filter(|h| h.ok).count();
    let sources_total = checker_state.data_health.len();

    let body = format!(
        "# HELP space_weather_last_kp Most recently observed planetary Kp index.\n\
         # TYPE space_weather_last_kp gauge\n\
         space_weather_last_kp {}\n\
         # HELP space_weather_alerts_sent_total Alerts retained in history.\n\
         # TYPE space_weather_alerts_sent_total gauge\n\
         space_weather_alerts_sent_total {}\n\
         # HELP space_weather_sources_healthy Upstream sources currently healthy.\n\
         # TYPE space_weather_sources_healthy gauge\n\
         space_weather_sources_healthy {}\n\
         # HELP space_weather_sources_total Upstream sources configured.\n\
         # TYPE space_weather_sources_total gauge\n\
         space_weather_sources_total {}\n\
         # HELP space_weather_predictions_pending Predictions awaiting verification.\n\
         # TYPE space_weather_predictions_pending gauge\n\
         space_weather_predictions_pending {}\n",
        checker_state.last_kp,
        checker_state.alerts_sent.len(),
        sources_healthy,
        sources_total,
        prediction_state
            .predictions
            .iter()
            .filter(|p| p.status == crate::types::PredictionStatus::Pending)
            .count(),
    );

    (
        [("content-type", "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}
