use thiserror::Error;

/// Every failure a Plugtify operation can surface to its caller.
#[derive(Debug, Error)]
pub enum Error {
    /// No authenticated user when one is required.
    #[error("user not found")]
    UserNotFound,

    /// An auth grant came back without a usable body.
    #[error("upstream auth error: {0}")]
    UpstreamAuth(String),

    /// A catalog call failed, timed out or answered with a non-success status.
    /// `status` is `None` when no response was received at all.
    #[error("upstream error ({}): {message}", status_label(.status))]
    Upstream { status: Option<u16>, message: String },

    #[error("recently played history is empty")]
    EmptyHistory,

    #[error("there are no recently played tracks for this user")]
    NoHistory,

    #[error("user has no recently played track ids")]
    NoIds,

    #[error("internal error: {0}")]
    Internal(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("user store error: {0}")]
    Store(String),
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "no response".to_string(),
    }
}

impl Error {
    /// Upstream status code attached to the error, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Error::Upstream { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out: {err}")
        } else {
            err.to_string()
        };

        Error::Upstream {
            status: err.status().map(|s| s.as_u16()),
            message,
        }
    }
}
