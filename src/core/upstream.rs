use crate::core::{ConfigProvider, SubsidyApi, UpstreamParams};
use crate::utils::error::{RelayError, Result};
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::sync::Arc;
use url::Url;

pub const GOV24_SERVICE_LIST_URL: &str = "https://api.odcloud.kr/api/gov24/v3/serviceList";
pub const PAGE: &str = "1";
pub const PER_PAGE: &str = "20";

/// 보조금24 서비스 목록 API 用戶端
pub struct Gov24Client<C: ConfigProvider> {
    config: Arc<C>,
    client: Client,
}

impl<C: ConfigProvider> Gov24Client<C> {
    pub fn new(config: Arc<C>) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: Arc<C>, client: Client) -> Self {
        Self { config, client }
    }

    /// 組出完整的請求網址（含金鑰，不可寫入日誌）
    pub fn request_url(&self, params: &UpstreamParams) -> Result<Url> {
        let service_key =
            self.config
                .service_key()
                .ok_or_else(|| RelayError::MissingConfigError {
                    field: "SUBSIDY_API_KEY".to_string(),
                })?;

        let mut url = Url::parse(self.config.upstream_endpoint())?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("serviceKey", service_key)
                .append_pair("page", PAGE)
                .append_pair("perPage", PER_PAGE);
            for (key, value) in params.query_pairs() {
                query.append_pair(key, &value);
            }
        }

        Ok(url)
    }
}

#[async_trait::async_trait]
impl<C: ConfigProvider> SubsidyApi for Gov24Client<C> {
    async fn fetch_services(&self, params: &UpstreamParams) -> Result<serde_json::Value> {
        let url = self.request_url(params)?;

        tracing::debug!(
            "Making API request to: {} ({} parameters)",
            self.config.upstream_endpoint(),
            params.query_pairs().len()
        );
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| RelayError::ApiError(e.without_url()))?;

        tracing::debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(RelayError::UpstreamStatus {
                status: response.status().as_u16(),
            });
        }

        // reqwest 錯誤訊息會帶完整網址（含 serviceKey），一律去掉
        let json_data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RelayError::ApiError(e.without_url()))?;
        Ok(json_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Age;
    use httpmock::prelude::*;

    struct MockConfig {
        upstream_endpoint: String,
        allowed_origins: Vec<String>,
        service_key: Option<String>,
    }

    impl MockConfig {
        fn new(upstream_endpoint: String, service_key: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                upstream_endpoint,
                allowed_origins: vec!["http://localhost:3000".to_string()],
                service_key: service_key.map(str::to_string),
            })
        }
    }

    impl ConfigProvider for MockConfig {
        fn upstream_endpoint(&self) -> &str {
            &self.upstream_endpoint
        }

        fn allowed_origins(&self) -> &[String] {
            &self.allowed_origins
        }

        fn service_key(&self) -> Option<&str> {
            self.service_key.as_deref()
        }
    }

    #[test]
    fn test_request_url_layout() {
        let client = Gov24Client::new(MockConfig::new(
            GOV24_SERVICE_LIST_URL.to_string(),
            Some("secret key"),
        ));
        let params = UpstreamParams {
            life_array: Some("서울특별시".to_string()),
            age: Some(Age::Years(30)),
            target_individuals: None,
        };

        let url = client.request_url(&params).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.path(), "/api/gov24/v3/serviceList");
        assert_eq!(
            pairs,
            vec![
                ("serviceKey".to_string(), "secret key".to_string()),
                ("page".to_string(), "1".to_string()),
                ("perPage".to_string(), "20".to_string()),
                ("lifeArray".to_string(), "서울특별시".to_string()),
                ("age".to_string(), "30".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_service_key() {
        let client = Gov24Client::new(MockConfig::new(GOV24_SERVICE_LIST_URL.to_string(), None));
        let err = client.request_url(&UpstreamParams::default()).unwrap_err();
        assert!(matches!(err, RelayError::MissingConfigError { .. }));
    }

    #[tokio::test]
    async fn test_fetch_sends_key_and_accept_header() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/serviceList")
                .query_param("serviceKey", "test-key")
                .query_param("page", "1")
                .query_param("perPage", "20")
                .query_param("trgterIndvdlArray", "A1,B1")
                .header("Accept", "application/json");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"data": [], "totalCount": 0}));
        });

        let client = Gov24Client::new(MockConfig::new(server.url("/serviceList"), Some("test-key")));
        let params = UpstreamParams {
            target_individuals: Some("A1,B1".to_string()),
            ..Default::default()
        };

        let body = client.fetch_services(&params).await.unwrap();

        api_mock.assert();
        assert_eq!(body["totalCount"], 0);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/serviceList");
            then.status(401).body("SERVICE_KEY_IS_NOT_REGISTERED_ERROR");
        });

        let client = Gov24Client::new(MockConfig::new(server.url("/serviceList"), Some("bad")));
        let err = client
            .fetch_services(&UpstreamParams::default())
            .await
            .unwrap_err();

        api_mock.assert();
        assert!(matches!(err, RelayError::UpstreamStatus { status: 401 }));
    }

    #[tokio::test]
    async fn test_fetch_malformed_json() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/serviceList");
            then.status(200).body("<xml>not json</xml>");
        });

        let client = Gov24Client::new(MockConfig::new(server.url("/serviceList"), Some("key")));
        let err = client
            .fetch_services(&UpstreamParams::default())
            .await
            .unwrap_err();

        api_mock.assert();
        assert!(matches!(err, RelayError::ApiError(_)));
    }
}
