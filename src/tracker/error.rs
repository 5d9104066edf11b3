use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while talking to the Tracker API
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("The HTTP request failed with error {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Pivotal Tracker API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("Failed to parse {what} response: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl TrackerError {
    /// Build an API error from a non-success response body.
    ///
    /// Tracker replies with `{"code": ..., "kind": "error", "error": ..., "general_problem": ...}`;
    /// fall back to the bare status when the body is not in that shape.
    pub fn from_response_body(status: StatusCode, body: &str) -> Self {
        let json = serde_json::from_str::<serde_json::Value>(body).ok();
        let field = |name: &str| {
            json.as_ref()
                .and_then(|j| j.get(name))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };

        let message = match (field("error"), field("general_problem")) {
            (Some(error), Some(problem)) => format!("{} {}", error, problem),
            (Some(error), None) => error,
            (None, Some(problem)) => problem,
            (None, None) => status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string(),
        };

        TrackerError::Api { status, message }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
