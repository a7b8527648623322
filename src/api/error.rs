//! Transport and HTTP error taxonomy for backend calls.

use thiserror::Error;

/// Failure of a single backend request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// No response was received.
    #[error("Network error: {detail}")]
    Network { detail: String },

    /// 4xx, with the server's message field when it sent one.
    #[error("Request failed with status {status}{}", message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
    Client { status: u16, message: Option<String> },

    /// 5xx.
    #[error("Server error {status}{}", message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
    Server { status: u16, message: Option<String> },

    /// A 2xx response whose body did not have the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Text shown in the notification for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network { .. } => {
                "Network error. Please check your internet connection.".to_string()
            }
            ApiError::Client { status, message } => match message {
                Some(m) => m.clone(),
                None => format!("Request failed with status {}", status),
            },
            ApiError::Server { message, .. } => match message {
                Some(m) => format!("An unexpected error occurred: {}", m),
                None => "An unexpected error occurred".to_string(),
            },
            ApiError::Decode(_) => "An unexpected error occurred".to_string(),
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Network { .. } => "Network",
            ApiError::Client { .. } => "Client",
            ApiError::Server { .. } => "Server",
            ApiError::Decode(_) => "Decode",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Client { status, .. } | ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether repeating the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network { .. } | ApiError::Server { .. } => true,
            ApiError::Client { status, .. } => *status == 429,
            ApiError::Decode(_) => false,
        }
    }

    /// Classify an error response from its status and raw body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_message(body);
        if status >= 500 {
            ApiError::Server { status, message }
        } else {
            ApiError::Client { status, message }
        }
    }
}

/// Pull the human-readable message out of an error body.
///
/// Looks at `message`, `detail` and `error` (string or `{message}`), then at
/// the first entry of a field-error map such as `{"name": ["required"]}`.
pub fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        if trimmed.starts_with('<') {
            return None;
        }
        return Some(trimmed.to_string());
    };

    for key in ["message", "detail", "error"] {
        match value.get(key) {
            Some(serde_json::Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(serde_json::Value::Object(inner)) => {
                if let Some(serde_json::Value::String(s)) = inner.get("message") {
                    return Some(s.clone());
                }
            }
            _ => {}
        }
    }

    if let serde_json::Value::Object(map) = &value {
        for (field, errors) in map {
            if let Some(first) = errors.as_array().and_then(|a| a.first()).and_then(|v| v.as_str()) {
                return Some(format!("{}: {}", field, first));
            }
        }
    }

    None
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return ApiError::Decode(e.to_string());
        }
        if let Some(status) = e.status() {
            return ApiError::from_status(status.as_u16(), "");
        }
        ApiError::Network {
            detail: e.to_string(),
        }
    }
}
