//! Error types for the land-register print services.

use thiserror::Error;

/// Result type alias using LandregError.
pub type LandregResult<T> = Result<T, LandregError>;

/// Primary error type for print gateway operations.
#[derive(Debug, Error)]
pub enum LandregError {
    // === Request Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    MalformedParameter { param: String, message: String },

    // === Upstream Errors ===
    #[error("Upstream engine error: {0}")]
    Upstream(String),

    #[error("Upstream engine timed out")]
    UpstreamTimeout,

    // === Infrastructure Errors ===
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl LandregError {
    /// Get the service exception code for this error.
    pub fn exception_code(&self) -> &'static str {
        match self {
            LandregError::MissingParameter(_) => "MissingParameterValue",
            LandregError::MalformedParameter { .. } => "InvalidParameterValue",
            LandregError::Upstream(_) => "UpstreamError",
            LandregError::UpstreamTimeout => "UpstreamTimeout",
            _ => "NoApplicableCode",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            LandregError::MissingParameter(_) | LandregError::MalformedParameter { .. } => 400,
            LandregError::Upstream(_) => 502,
            LandregError::UpstreamTimeout => 504,
            _ => 500,
        }
    }
}

impl From<serde_json::Error> for LandregError {
    fn from(err: serde_json::Error) -> Self {
        LandregError::InternalError(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            LandregError::MissingParameter("SCALE".into()).http_status_code(),
            400
        );
        assert_eq!(
            LandregError::MalformedParameter {
                param: "EXTENT".into(),
                message: "expected 4 floats".into()
            }
            .http_status_code(),
            400
        );
        assert_eq!(LandregError::Upstream("refused".into()).http_status_code(), 502);
        assert_eq!(LandregError::UpstreamTimeout.http_status_code(), 504);
        assert_eq!(
            LandregError::DatabaseError("pool closed".into()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_exception_codes() {
        assert_eq!(
            LandregError::MissingParameter("EXTENT".into()).exception_code(),
            "MissingParameterValue"
        );
        assert_eq!(
            LandregError::DatabaseError("x".into()).exception_code(),
            "NoApplicableCode"
        );
    }
}
