use crate::core::origin::{admit, cors_headers, Admission};
use crate::core::params::build_params;
use crate::core::shaper::shape_result;
use crate::core::{ConfigProvider, SubsidyApi};
use crate::domain::model::{QuestionnaireAnswers, RelayFailure, RelayResult};
use crate::utils::error::{RelayError, Result};
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::ORIGIN;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use std::sync::Arc;

/// 啟動時建立一次，之後唯讀
#[derive(Clone)]
pub struct RelayState {
    pub config: Arc<dyn ConfigProvider>,
    pub api: Arc<dyn SubsidyApi>,
}

impl RelayState {
    pub fn new(config: Arc<dyn ConfigProvider>, api: Arc<dyn SubsidyApi>) -> Self {
        Self { config, api }
    }
}

/// 問卷答案的請求本文上限
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// 所有路徑都交給同一個 handler
pub fn router(state: RelayState) -> Router {
    Router::new().fallback(handle_request).with_state(state)
}

/// 先只看 method 與 Origin 標頭，通過後才讀取本文
pub async fn handle_request(State(state): State<RelayState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let method = parts.method;
    let origin_header = parts
        .headers
        .get(ORIGIN)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(""));
    let origin = origin_header.to_str().unwrap_or_default();

    match admit(&method, origin, state.config.allowed_origins()) {
        Admission::Preflight => {
            tracing::debug!("Preflight accepted for origin {}", origin);
            (StatusCode::NO_CONTENT, cors_headers(origin_header)).into_response()
        }
        Admission::Rejected(status) => {
            tracing::debug!("Rejected {} from origin {:?} with {}", method, origin, status);
            let message = if status == StatusCode::METHOD_NOT_ALLOWED {
                "Method not allowed"
            } else {
                "Forbidden"
            };
            (status, message).into_response()
        }
        Admission::Relay => match read_and_relay(state.api.as_ref(), body).await {
            Ok(result) => {
                tracing::info!(
                    "✅ Relayed {} services (totalCount {}) to {}",
                    result.services.len(),
                    result.total_count,
                    origin
                );
                (cors_headers(origin_header), Json(result)).into_response()
            }
            Err(e) => {
                tracing::error!("❌ Relay failed: {} (Category: {:?})", e, e.category());
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    cors_headers(origin_header),
                    Json(RelayFailure::default()),
                )
                    .into_response()
            }
        },
    }
}

async fn read_and_relay(api: &dyn SubsidyApi, body: Body) -> Result<RelayResult> {
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| RelayError::InvalidRequest {
            message: format!("failed to read body: {}", e),
        })?;
    relay(api, &bytes).await
}

/// 解析問卷、呼叫上游、整理結果。任何一步失敗都由呼叫端轉成通用 500。
pub async fn relay(api: &dyn SubsidyApi, body: &[u8]) -> Result<RelayResult> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    if value.is_null() {
        return Err(RelayError::InvalidRequest {
            message: "answers body is null".to_string(),
        });
    }

    let answers = QuestionnaireAnswers::from_json(&value);
    let params = build_params(&answers);
    if params.is_empty() {
        tracing::debug!("No questionnaire filters, querying the unfiltered service list");
    } else {
        tracing::debug!("Built upstream parameters: {:?}", params);
    }

    let upstream = api.fetch_services(&params).await?;
    Ok(shape_result(&upstream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::UpstreamParams;
    use std::sync::Mutex;

    struct StubApi {
        response: serde_json::Value,
        seen: Mutex<Vec<UpstreamParams>>,
    }

    #[async_trait::async_trait]
    impl SubsidyApi for StubApi {
        async fn fetch_services(&self, params: &UpstreamParams) -> Result<serde_json::Value> {
            self.seen.lock().unwrap().push(params.clone());
            Ok(self.response.clone())
        }
    }

    struct FailingApi;

    #[async_trait::async_trait]
    impl SubsidyApi for FailingApi {
        async fn fetch_services(&self, _params: &UpstreamParams) -> Result<serde_json::Value> {
            Err(RelayError::UpstreamStatus { status: 503 })
        }
    }

    #[tokio::test]
    async fn test_relay_builds_params_and_shapes_result() {
        let api = StubApi {
            response: serde_json::json!({"data": [{"id": 1}], "totalCount": 7}),
            seen: Mutex::new(Vec::new()),
        };

        let result = relay(&api, r#"{"intro":"corp","corpRegion":{"sido":"세종특별자치시"}}"#.as_bytes())
            .await
            .unwrap();

        assert_eq!(result.services.len(), 1);
        assert_eq!(result.total_count, 7);
        let seen = api.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].life_array.as_deref(), Some("세종특별자치시"));
    }

    #[tokio::test]
    async fn test_relay_rejects_invalid_bodies() {
        let api = StubApi {
            response: serde_json::json!({}),
            seen: Mutex::new(Vec::new()),
        };

        assert!(matches!(
            relay(&api, b"not json").await,
            Err(RelayError::SerializationError(_))
        ));
        assert!(matches!(
            relay(&api, b"null").await,
            Err(RelayError::InvalidRequest { .. })
        ));
        assert!(api.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected_before_upstream() {
        let api = StubApi {
            response: serde_json::json!({}),
            seen: Mutex::new(Vec::new()),
        };
        let body = Body::from(vec![b' '; MAX_BODY_BYTES + 1]);

        let err = read_and_relay(&api, body).await.unwrap_err();

        assert!(matches!(err, RelayError::InvalidRequest { .. }));
        assert!(api.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_relay_propagates_upstream_failure() {
        let err = relay(&FailingApi, b"{}").await.unwrap_err();
        assert!(matches!(err, RelayError::UpstreamStatus { status: 503 }));
    }
}
