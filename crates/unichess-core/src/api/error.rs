use reqwest::StatusCode;
use thiserror::Error;

use crate::models::ErrorBody;

/// Shown when the request never completed
pub const NETWORK_ERROR_MESSAGE: &str = "Network error, please try again later";

/// Shown when a successful response carries no usable token
pub const MALFORMED_RESPONSE_MESSAGE: &str = "Unexpected response from server";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request rejected ({status}): {detail}")]
    Rejected { status: StatusCode, detail: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    MalformedResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Build a rejection from a non-2xx response.
    ///
    /// Uses the `detail` field when the body carries one, otherwise the
    /// HTTP status phrase.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail)
            .and_then(|d| d.message())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
            });

        ApiError::Rejected {
            status,
            detail: Self::truncate_body(&detail),
        }
    }

    /// Message suitable for a user-facing notification
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected { detail, .. } => detail.clone(),
            ApiError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            ApiError::MalformedResponse(_) => MALFORMED_RESPONSE_MESSAGE.to_string(),
        }
    }
}
