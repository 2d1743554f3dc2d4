use crate::domain::model::RelayResult;
use serde_json::Value;

pub const MAX_SERVICES: usize = 20;

pub fn shape_result(upstream: &Value) -> RelayResult {
    let services = upstream
        .get("data")
        .and_then(Value::as_array)
        .map(|items| items.iter().take(MAX_SERVICES).cloned().collect())
        .unwrap_or_default();

    let total_count = upstream
        .get("totalCount")
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .unwrap_or(0);

    RelayResult {
        services,
        total_count,
    }
}
