use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE,
};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};

pub const ALLOWED_METHODS: &str = "POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";
pub const PREFLIGHT_MAX_AGE_SECS: &str = "86400";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// OPTIONS 且來源在允許清單內
    Preflight,
    /// POST 且來源在允許清單內，可以轉發
    Relay,
    Rejected(StatusCode),
}

/// 來源逐字比對，不做大小寫或結尾斜線的正規化
pub fn is_allowed(origin: &str, allowed_origins: &[String]) -> bool {
    allowed_origins.iter().any(|allowed| allowed == origin)
}

pub fn admit(method: &Method, origin: &str, allowed_origins: &[String]) -> Admission {
    if method == Method::OPTIONS {
        return if is_allowed(origin, allowed_origins) {
            Admission::Preflight
        } else {
            Admission::Rejected(StatusCode::FORBIDDEN)
        };
    }

    if method != Method::POST {
        return Admission::Rejected(StatusCode::METHOD_NOT_ALLOWED);
    }

    if !is_allowed(origin, allowed_origins) {
        return Admission::Rejected(StatusCode::FORBIDDEN);
    }

    Admission::Relay
}

/// 回應給特定來源的 CORS 標頭（不用萬用字元）
pub fn cors_headers(origin: HeaderValue) -> [(HeaderName, HeaderValue); 4] {
    [
        (ACCESS_CONTROL_ALLOW_ORIGIN, origin),
        (
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ),
        (
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ),
        (
            ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(PREFLIGHT_MAX_AGE_SECS),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec![
            "https://your-domain.com".to_string(),
            "http://localhost:3000".to_string(),
        ]
    }

    #[test]
    fn test_preflight_admission() {
        assert_eq!(
            admit(&Method::OPTIONS, "http://localhost:3000", &allowed()),
            Admission::Preflight
        );
        assert_eq!(
            admit(&Method::OPTIONS, "https://evil.example", &allowed()),
            Admission::Rejected(StatusCode::FORBIDDEN)
        );
    }

    #[test]
    fn test_method_checked_before_origin() {
        assert_eq!(
            admit(&Method::GET, "https://evil.example", &allowed()),
            Admission::Rejected(StatusCode::METHOD_NOT_ALLOWED)
        );
        assert_eq!(
            admit(&Method::PUT, "http://localhost:3000", &allowed()),
            Admission::Rejected(StatusCode::METHOD_NOT_ALLOWED)
        );
    }

    #[test]
    fn test_post_admission() {
        assert_eq!(
            admit(&Method::POST, "https://your-domain.com", &allowed()),
            Admission::Relay
        );
        assert_eq!(
            admit(&Method::POST, "", &allowed()),
            Admission::Rejected(StatusCode::FORBIDDEN)
        );
    }

    #[test]
    fn test_origin_match_is_verbatim() {
        assert!(!is_allowed("https://your-domain.com/", &allowed()));
        assert!(!is_allowed("HTTPS://YOUR-DOMAIN.COM", &allowed()));
        assert!(is_allowed("https://your-domain.com", &allowed()));
    }

    #[test]
    fn test_cors_headers_echo_origin() {
        let headers = cors_headers(HeaderValue::from_static("http://localhost:3000"));
        assert_eq!(headers[0].0, ACCESS_CONTROL_ALLOW_ORIGIN);
        assert_eq!(headers[0].1, "http://localhost:3000");
        assert_eq!(headers[1].1, "POST, OPTIONS");
        assert_eq!(headers[2].1, "Content-Type");
        assert_eq!(headers[3].1, "86400");
    }
}
