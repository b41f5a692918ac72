use thiserror::Error;

/// Errors returned by the library side of answerhub-ban
#[derive(Debug, Error)]
pub enum Error {
    /// Credentials are unreadable or incomplete, nothing was sent
    #[error("configuration error: {0}")]
    Config(String),

    /// Network failure, timeout or an unusable response to a read request
    #[error("transport error: {0}")]
    Transport(String),

    /// The page envelope is not valid JSON for the expected shape
    #[error("failed to decode {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    /// A delete/update/deactivate call returned a non-success status
    #[error("{operation} {target} failed with status {status}")]
    Mutation {
        operation: String,
        target: String,
        status: u16,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}
