use serde::{Deserialize, Serialize};
use tower_api_client::{Error as ApiError, StatusCode};

#[derive(Debug)]
pub enum TubeApiError {
    /// The provider reported no matching item. Recoverable: the caller may
    /// retry with a different ID.
    NotFound,
    /// Malformed request body or metadata. Not retryable without caller
    /// correction.
    Validation(ErrorDetail),
    /// Quota or upload-limit rejection.
    Quota(ErrorDetail),
    /// Any other provider-reported failure.
    Api(StatusCode, ErrorDetail),
    Internal(ApiError),
}

impl From<ApiError> for TubeApiError {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::ClientError(status, detail) | ApiError::ServerError(status, detail) => {
                let detail = match serde_json::from_str::<ErrorResponse>(&detail) {
                    Ok(response) => response.error,
                    Err(_) => ErrorDetail::opaque(status, detail),
                };
                TubeApiError::from_status(status, detail)
            }
            e => TubeApiError::Internal(e),
        }
    }
}

impl TubeApiError {
    pub(crate) fn from_status(status: StatusCode, detail: ErrorDetail) -> Self {
        match status.as_u16() {
            404 => TubeApiError::NotFound,
            400 | 422 => TubeApiError::Validation(detail),
            403 if detail.has_quota_reason() => TubeApiError::Quota(detail),
            _ => TubeApiError::Api(status, detail),
        }
    }
}

impl std::fmt::Display for TubeApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TubeApiError::NotFound => write!(f, "Resource not found"),
            TubeApiError::Validation(detail) => write!(f, "Invalid request: {}", detail.message),
            TubeApiError::Quota(detail) => write!(f, "Quota exceeded: {}", detail.message),
            TubeApiError::Api(status, detail) => {
                write!(f, "({}) {}", status, detail.message)
            }
            TubeApiError::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl std::error::Error for TubeApiError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error payload shape shared by all of the provider's endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorItem {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub message: String,
}

impl ErrorDetail {
    fn opaque(status: StatusCode, body: String) -> Self {
        Self {
            code: status.as_u16(),
            message: body,
            errors: Vec::new(),
        }
    }

    fn has_quota_reason(&self) -> bool {
        self.errors.iter().any(|e| {
            matches!(
                e.reason.as_str(),
                "quotaExceeded" | "dailyLimitExceeded" | "uploadLimitExceeded" | "rateLimitExceeded"
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_error(code: u16, reason: &str) -> String {
        format!(
            r#"{{"error": {{"code": {code}, "message": "boom", "errors": [{{"reason": "{reason}", "domain": "youtube"}}]}}}}"#
        )
    }

    #[test]
    fn maps_404_to_not_found() {
        let err = TubeApiError::from(ApiError::ClientError(
            StatusCode::NOT_FOUND,
            provider_error(404, "videoNotFound"),
        ));
        assert!(matches!(err, TubeApiError::NotFound));
    }

    #[test]
    fn maps_400_to_validation() {
        let err = TubeApiError::from(ApiError::ClientError(
            StatusCode::BAD_REQUEST,
            provider_error(400, "invalidMetadata"),
        ));
        assert!(matches!(err, TubeApiError::Validation(_)));
    }

    #[test]
    fn maps_quota_reason_to_quota() {
        let err = TubeApiError::from(ApiError::ClientError(
            StatusCode::FORBIDDEN,
            provider_error(403, "quotaExceeded"),
        ));
        assert!(matches!(err, TubeApiError::Quota(_)));
    }

    #[test]
    fn forbidden_without_quota_reason_is_generic() {
        let err = TubeApiError::from(ApiError::ClientError(
            StatusCode::FORBIDDEN,
            provider_error(403, "forbidden"),
        ));
        assert!(matches!(err, TubeApiError::Api(_, _)));
    }

    #[test]
    fn unparsable_body_is_preserved() {
        let err = TubeApiError::from(ApiError::ServerError(
            StatusCode::BAD_GATEWAY,
            "<html>bad gateway</html>".to_string(),
        ));
        match err {
            TubeApiError::Api(status, detail) => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(detail.message, "<html>bad gateway</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
