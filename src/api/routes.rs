//! API route definitions.
//!
//! - `GET  /api/v1/alerts` — recent alert history, data health, current values
//! - `GET  /api/v1/predictions` — prognostic scorecard and history
//! - `POST /api/v1/predictions` — submit a new prediction
//! - `GET  /api/v1/health` — per-source fetch health
//! - `GET  /api/v1/metrics` — Prometheus text exposition

use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use super::state::ApiState;

pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/alerts", get(handlers::get_alerts))
        .route("/predictions", get(handlers::get_predictions))
        .route("/predictions", post(handlers::submit_prediction))
        .route("/health", get(handlers::get_health))
        .route("/metrics", get(handlers::get_metrics))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tempfile::tempdir;
    use tower::ServiceExt;

    fn test_state() -> ApiState {
        let dir = tempdir().unwrap();
        ApiState {
            data_dir: dir.into_path(),
        }
    }

    #[tokio::test]
    async fn alerts_route_returns_ok() {
        let app = api_routes(test_state());
        let response = app
            .oneshot(Request::builder().uri("/alerts").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn predictions_route_returns_ok() {
        let app = api_routes(test_state());
        let response = app
            .oneshot(Request::builder().uri("/predictions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_route_returns_ok() {
        let app = api_routes(test_state());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_route_returns_ok() {
        let app = api_routes(test_state());
        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
