use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error body returned by the analysis backend on non-2xx responses.
/// `detail` is usually a string, but validation failures carry a list of
/// error objects instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(Value::String(detail.into())),
        }
    }

    /// Parses a raw response body, tolerating empty or non-JSON payloads.
    pub fn parse(raw: &[u8]) -> Self {
        serde_json::from_slice(raw).unwrap_or_default()
    }

    /// Non-blank detail text, if the backend supplied one. Structured
    /// details are rendered as compact JSON.
    pub fn detail(&self) -> Option<String> {
        let text = match self.detail.as_ref()? {
            Value::Null => return None,
            Value::String(text) => text.trim().to_string(),
            other => other.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Error)]
#[error("backend rejected request with status {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
pub struct ApiException {
    pub status: u16,
    pub detail: Option<String>,
}

impl ApiException {
    pub fn new(status: u16, body: ErrorBody) -> Self {
        let detail = body.detail();
        Self { status, detail }
    }
}

impl From<ApiException> for ErrorBody {
    fn from(value: ApiException) -> Self {
        Self {
            detail: value.detail.map(Value::String),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_detail_from_json_body() {
        let body = ErrorBody::parse(br#"{"detail":"unsupported format"}"#);
        assert_eq!(body.detail().as_deref(), Some("unsupported format"));
    }

    #[test]
    fn validation_detail_list_is_kept_as_json_text() {
        let raw = br#"{"detail":[{"loc":["body","query"],"msg":"field required","type":"value_error.missing"}]}"#;
        let body = ErrorBody::parse(raw);
        let detail = body.detail().expect("detail");
        assert!(detail.starts_with('['), "{detail}");
        assert!(detail.contains("field required"), "{detail}");

        let err = ApiException::new(422, body);
        assert_eq!(err.status, 422);
        assert_eq!(err.detail.as_deref(), Some(detail.as_str()));
    }

    #[test]
    fn null_detail_reads_as_absent() {
        assert_eq!(ErrorBody::parse(br#"{"detail":null}"#).detail(), None);
        assert_eq!(
            ErrorBody::parse(br#"{"detail":{"reason":"quota"}}"#).detail().as_deref(),
            Some(r#"{"reason":"quota"}"#)
        );
    }

    #[test]
    fn tolerates_empty_and_garbage_bodies() {
        assert_eq!(ErrorBody::parse(b"").detail(), None);
        assert_eq!(ErrorBody::parse(b"<html>502</html>").detail(), None);
        assert_eq!(ErrorBody::parse(br#"{"detail":"   "}"#).detail(), None);
    }

    #[test]
    fn exception_display_includes_status_and_detail() {
        let err = ApiException::new(500, ErrorBody::new("boom"));
        assert_eq!(
            err.to_string(),
            "backend rejected request with status 500: boom"
        );
        let err = ApiException::new(502, ErrorBody::default());
        assert_eq!(
            err.to_string(),
            "backend rejected request with status 502: no detail"
        );
    }
}
