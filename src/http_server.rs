//! HTTP Server for anomaly-rs
//!
//! This module provides an HTTP server that accepts outlier scoring
//! requests and forwards them to the scoring pipeline.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::analytics::ScoringPipeline;
use crate::api::{
    self, BatchRequest, CheckRequest, CheckResponse, PredictRequest, PredictResponse,
};
use crate::config::AnomalyConfig;
use crate::error::Error;

/// 共有アプリケーション状態
///
/// パイプラインは設定のみ持つ。リクエスト間で共有される可変状態はない。
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<ScoringPipeline>,
}

pub struct AnomalyHttpServer {
    state: AppState,
}

impl AnomalyHttpServer {
    pub fn new(config: &AnomalyConfig) -> Self {
        Self {
            state: AppState {
                pipeline: Arc::new(config.detector.pipeline()),
            },
        }
    }

    /// ルーターを構築（テストからも利用）
    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    pub async fn serve(&self, addr: &str) -> crate::Result<()> {
        let app = self.router();

        info!("Starting anomaly scoring server on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// スコアリング API ルーターを作成
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/anomaly", post(predict))
        .route("/anomaly/check", post(check))
        .route("/anomaly/batch", post(batch_predict))
        .route("/anomaly/batch/check", post(batch_check))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// HTTP 境界でのエラー表現
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("Error processing scoring request: {}", self.0);
        }

        let body = json!({ "error": self.0.response_message() });
        (status, Json(body)).into_response()
    }
}

/// 予測エンドポイント
///
/// POST /anomaly
async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let data = request.data.ok_or(Error::MissingField("data"))?;
    info!("Received prediction request: {} tokens", data.len());

    let anomaly_data = state.pipeline.predict(&data)?;
    Ok((StatusCode::OK, Json(PredictResponse { anomaly_data })))
}

/// 候補値チェックエンドポイント
///
/// POST /anomaly/check
async fn check(
    State(state): State<AppState>,
    Json(request): Json<CheckRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(data), Some(current)) = (request.data, request.current_value) else {
        return Err(Error::CheckFieldsMissing.into());
    };
    info!("Received check request: {} tokens", data.len());

    let candidate = current.as_f64()?;
    let is_anomaly = state.pipeline.check(&data, candidate)?;
    Ok((StatusCode::OK, Json(CheckResponse { is_anomaly })))
}

/// バッチ予測エンドポイント
///
/// POST /anomaly/batch
async fn batch_predict(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let items = request.data_set.ok_or(Error::MissingField("dataSet"))?;
    info!("Received batch prediction request: {} items", items.len());

    let results = api::process_predict_batch(&state.pipeline, &items);
    Ok((StatusCode::OK, Json(results)))
}

/// バッチチェックエンドポイント
///
/// POST /anomaly/batch/check
async fn batch_check(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let items = request.data_set.ok_or(Error::MissingField("dataSet"))?;
    info!("Received batch check request: {} items", items.len());

    let results = api::process_check_batch(&state.pipeline, &items);
    Ok((StatusCode::OK, Json(results)))
}

/// 死活監視
///
/// GET /health
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::NumericValue;

    fn state() -> AppState {
        let config = AnomalyConfig::default();
        AppState {
            pipeline: Arc::new(config.detector.pipeline()),
        }
    }

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn expect_error<T: IntoResponse>(result: Result<T, ApiError>) -> Response {
        match result {
            Ok(_) => panic!("expected an error response"),
            Err(err) => err.into_response(),
        }
    }

    #[tokio::test]
    async fn test_predict_missing_data_is_400() {
        let response = predict(State(state()), Json(PredictRequest { data: None })).await;
        let response = expect_error(response);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_predict_success() {
        let request = PredictRequest {
            data: Some(tokens(&["\"1\"", "\"2\"", "\"3\"", "\"100\""])),
        };
        let response = predict(State(state()), Json(request)).await;
        let response = response.unwrap().into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_predict_parse_failure_is_500() {
        let request = PredictRequest {
            data: Some(tokens(&["\"1\"", "\"x\"", "\"3\""])),
        };
        let response = predict(State(state()), Json(request)).await;
        let response = expect_error(response);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_check_missing_fields_is_400() {
        let request = CheckRequest {
            data: Some(tokens(&["\"1\"", "\"2\"", "\"3\""])),
            current_value: None,
        };
        let response = check(State(state()), Json(request)).await;
        let response = expect_error(response);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_check_candidate_not_present_is_400() {
        let request = CheckRequest {
            data: Some(tokens(&["\"1\"", "\"2\"", "\"3\""])),
            current_value: Some(NumericValue::Number(9.0)),
        };
        let response = check(State(state()), Json(request)).await;
        let response = expect_error(response);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_batch_missing_data_set_is_400() {
        let request = BatchRequest { data_set: None };
        let response = batch_check(State(state()), Json(request)).await;
        let response = expect_error(response);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_batch_with_malformed_item_is_200() {
        let request = BatchRequest {
            data_set: Some(vec![crate::api::BatchItem {
                data: None,
                current_value: None,
                dp_code: Some("A".to_string()),
            }]),
        };
        let response = batch_check(State(state()), Json(request)).await;
        let response = response.unwrap().into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_router_builds() {
        let server = AnomalyHttpServer::new(&AnomalyConfig::default());
        let _router = server.router();
    }
}
