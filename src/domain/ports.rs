use crate::domain::model::UpstreamParams;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait ConfigProvider: Send + Sync {
    fn upstream_endpoint(&self) -> &str;
    fn allowed_origins(&self) -> &[String];
    /// 上游 API 金鑰；未設定時所有轉發請求都會失敗
    fn service_key(&self) -> Option<&str>;
}

/// 補助金查詢上游。單次呼叫，不重試。
#[async_trait]
pub trait SubsidyApi: Send + Sync {
    async fn fetch_services(&self, params: &UpstreamParams) -> Result<serde_json::Value>;
}
