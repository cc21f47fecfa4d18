use chrono::{DateTime, Utc};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid date format: {0} (expected YYYY-MM-DD)")]
    InvalidDateFormat(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("week out of range: {0}")]
    WeekOutOfRange(String),

    #[error("no dataset published at {path}")]
    DatasetNotFound { path: String },

    #[error("GitHub API rate limit exhausted, resets at {}", .reset_at.to_rfc3339())]
    RateLimited { reset_at: DateTime<Utc> },

    /// Non-success response, or no response at all (`status: None`) when the
    /// upstream could not be reached.
    #[error("upstream {}: {body}", upstream_status(.status))]
    UpstreamError { status: Option<u16>, body: String },

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("file not found in listing: {0}")]
    FileNotFound(String),

    #[error("download of {name} failed: {reason}")]
    DownloadFailed { name: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::UpstreamError {
            status: err.status().map(|s| s.as_u16()),
            body: err.to_string(),
        }
    }
}

fn upstream_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("returned HTTP {code}"),
        None => "unreachable".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_names_status_or_unreachable() {
        let failed = Error::UpstreamError {
            status: Some(502),
            body: "bad gateway".into(),
        };
        assert_eq!(failed.to_string(), "upstream returned HTTP 502: bad gateway");

        let unreachable = Error::UpstreamError {
            status: None,
            body: "connection refused".into(),
        };
        assert_eq!(unreachable.to_string(), "upstream unreachable: connection refused");
    }
}
