use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::config::Service;

/// Error document returned by the Admin API for non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// HTTP status code.
    #[serde(default)]
    pub error: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<serde_json::Value>,
}

impl ApiError {
    /// Decode an error body, keeping the raw text when it is not an error document.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ApiError>(body) {
            Ok(mut error) => {
                if error.error == 0 {
                    error.error = status;
                }
                error
            }
            Err(_) => Self {
                error: status,
                detail: (!body.trim().is_empty()).then(|| body.trim().to_string()),
                ..Default::default()
            },
        }
    }

    #[cfg(test)]
    pub fn new(status: u16, error_code: impl Into<String>) -> Self {
        Self {
            error: status,
            error_code: Some(error_code.into()),
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}", self.error)?;
        if let Some(code) = &self.error_code {
            write!(f, " (Error code: \"{code}\")")?;
        }
        if let Some(detail) = &self.detail {
            write!(f, " Detail: {detail}")?;
        }
        if let Some(reason) = &self.reason {
            write!(f, " Reason: {reason}.")?;
        }
        if !self.parameters.is_empty() {
            let params: Vec<String> = self.parameters.iter().map(|p| p.to_string()).collect();
            write!(f, " Params: [{}]", params.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    #[error("{0}")]
    Api(ApiError),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unsupported service: {0}")]
    UnsupportedService(Service),
    #[error(
        "this action requires authentication, run 'atlas config init' or set MONGODB_ATLAS_PUBLIC_API_KEY and MONGODB_ATLAS_PRIVATE_API_KEY"
    )]
    MissingCredentials,
    #[error("failed to obtain an access token: {0}")]
    Token(String),
}

impl AtlasError {
    /// Provider error code of an API error.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Api(error) => error.error_code.as_deref(),
            _ => None,
        }
    }

    pub fn has_error_code(&self, code: &str) -> bool {
        self.error_code() == Some(code)
    }
}

impl From<ApiError> for AtlasError {
    fn from(error: ApiError) -> Self {
        Self::Api(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_decodes_error_document() {
        let body = r#"{"detail":"No cluster named c0 exists in group 5e2211c17a3e5a48f5497de3.","error":404,"errorCode":"CLUSTER_NOT_FOUND","parameters":["c0","5e2211c17a3e5a48f5497de3"],"reason":"Not Found"}"#;
        let error = ApiError::from_response(404, body);

        assert_eq!(error.error, 404);
        assert_eq!(error.error_code.as_deref(), Some("CLUSTER_NOT_FOUND"));
        assert_eq!(error.parameters.len(), 2);
        assert_eq!(
            error.to_string(),
            "HTTP 404 (Error code: \"CLUSTER_NOT_FOUND\") Detail: No cluster named c0 exists in group 5e2211c17a3e5a48f5497de3. Reason: Not Found. Params: [\"c0\", \"5e2211c17a3e5a48f5497de3\"]"
        );
    }

    #[test]
    fn test_from_response_keeps_raw_body() {
        let error = ApiError::from_response(502, "<html>Bad Gateway</html>");
        assert_eq!(error.error, 502);
        assert_eq!(error.error_code, None);
        assert_eq!(error.detail.as_deref(), Some("<html>Bad Gateway</html>"));
    }

    #[test]
    fn test_error_code_accessors() {
        let error = AtlasError::from(ApiError::new(400, "CANNOT_USE_FLEX_CLUSTER_IN_CLUSTER_API"));
        assert!(error.has_error_code("CANNOT_USE_FLEX_CLUSTER_IN_CLUSTER_API"));
        assert!(matches!(error, AtlasError::Api(ApiError { error: 400, .. })));
        assert_eq!(AtlasError::MissingCredentials.error_code(), None);
    }
}
