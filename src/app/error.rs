use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TributaryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("(http {status}) on loading url {url:?}")]
    HttpStatus { status: StatusCode, url: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Response processing failed for {url:?}: {reason}")]
    ResponseProcessing { url: String, reason: String },

    #[error("Content parsing error: {0}")]
    Parse(String),

    #[error("Invalid metadata JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("not fetched")]
    NotFetched,

    #[error("{0}")]
    Other(String),
}

impl TributaryError {
    /// Status code a failed load reports to the page assembly.
    ///
    /// Only a received non-success response carries its own status,
    /// everything else is reported as `502 Bad Gateway`.
    pub fn status_code(&self) -> StatusCode {
        match self {
            TributaryError::HttpStatus { status, .. } => *status,
            TributaryError::Http(e) => e.status().unwrap_or(StatusCode::BAD_GATEWAY),
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

pub type Result<T> = std::result::Result<T, TributaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_of_http_status_error() {
        let err = TributaryError::HttpStatus {
            status: StatusCode::NOT_FOUND,
            url: "http://example.com/missing".into(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            err.to_string(),
            "(http 404 Not Found) on loading url \"http://example.com/missing\""
        );
    }

    #[test]
    fn test_status_code_defaults_to_bad_gateway() {
        assert_eq!(
            TributaryError::Parse("broken".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(TributaryError::NotFetched.status_code(), StatusCode::BAD_GATEWAY);
    }
}
