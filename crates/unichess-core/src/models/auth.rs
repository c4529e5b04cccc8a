use serde::{Deserialize, Serialize};

/// Body of a successful login. Only `access_token` is consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct LoginResponse {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
}

/// Failure payload, e.g. `{"detail": "Incorrect credentials"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ErrorBody {
    pub detail: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    /// Request validation failures, one entry per offending field
    Validation(Vec<ValidationError>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ValidationError {
    pub msg: String,
}

impl ErrorDetail {
    /// Human-readable message, `None` when there is nothing to show
    pub fn message(&self) -> Option<String> {
        let message = match self {
            ErrorDetail::Message(msg) => msg.trim().to_string(),
            ErrorDetail::Validation(errors) => errors
                .iter()
                .map(|e| e.msg.trim())
                .filter(|m| !m.is_empty())
                .collect::<Vec<_>>()
                .join("; "),
        };
        if message.is_empty() {
            None
        } else {
            Some(message)
        }
    }
}
