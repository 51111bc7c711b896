use std::fmt;

#[derive(Debug, Clone)]
pub enum AssistantError {
    ValidationError(String),
    ApiError(String),
    ParseError(String),
    ConfigError(String),
    NetworkError(String),
    NotFound(String),
    IoError(String),
}

impl fmt::Display for AssistantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssistantError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AssistantError::ApiError(msg) => write!(f, "API error: {}", msg),
            AssistantError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AssistantError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            AssistantError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            AssistantError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AssistantError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for AssistantError {}

impl From<String> for AssistantError {
    fn from(msg: String) -> Self {
        AssistantError::ValidationError(msg)
    }
}

impl From<&str> for AssistantError {
    fn from(msg: &str) -> Self {
        AssistantError::ValidationError(msg.to_string())
    }
}

impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            AssistantError::NetworkError(err.to_string())
        } else if err.is_decode() {
            AssistantError::ParseError(err.to_string())
        } else {
            AssistantError::ApiError(err.to_string())
        }
    }
}

impl From<reqwest::header::ToStrError> for AssistantError {
    fn from(err: reqwest::header::ToStrError) -> Self {
        AssistantError::ParseError(err.to_string())
    }
}

impl From<serde_json::Error> for AssistantError {
    fn from(err: serde_json::Error) -> Self {
        AssistantError::ParseError(err.to_string())
    }
}

impl From<roxmltree::Error> for AssistantError {
    fn from(err: roxmltree::Error) -> Self {
        AssistantError::ParseError(err.to_string())
    }
}

impl From<csv::Error> for AssistantError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            AssistantError::IoError(err.to_string())
        } else {
            AssistantError::ParseError(err.to_string())
        }
    }
}

impl From<std::io::Error> for AssistantError {
    fn from(err: std::io::Error) -> Self {
        AssistantError::IoError(err.to_string())
    }
}

impl From<actix_web::mime::FromStrError> for AssistantError {
    fn from(err: actix_web::mime::FromStrError) -> Self {
        AssistantError::ParseError(err.to_string())
    }
}

impl AssistantError {
    pub fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            AssistantError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AssistantError::ApiError(_) => StatusCode::BAD_GATEWAY,
            AssistantError::ParseError(_) => StatusCode::BAD_GATEWAY,
            AssistantError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AssistantError::NetworkError(_) => StatusCode::BAD_GATEWAY,
            AssistantError::NotFound(_) => StatusCode::NOT_FOUND,
            AssistantError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
