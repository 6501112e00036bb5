use thiserror::Error;

/// Why a publish attempt failed.
///
/// Transport failures and API rejections share this one type so callers
/// never have to tell them apart; the `Display` text is the cause written to
/// the audit log.
#[derive(Debug, Error)]
pub enum PublishError {
    /// A required input was missing; no request was sent.
    #[error("{platform} requires an image")]
    MissingImage { platform: &'static str },

    /// Neither the row nor the config supplies a credential.
    #[error("{platform}: no {what} configured")]
    MissingCredential {
        platform: &'static str,
        what: &'static str,
    },

    /// The request did not complete within its time budget.
    #[error("timeout after {secs}s calling {endpoint}")]
    Timeout { endpoint: String, secs: u64 },

    /// The API host could not be reached.
    #[error("cannot connect to {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },

    /// The API answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// A success status without the expected `id` field.
    #[error("unexpected response from {endpoint}: {body}")]
    UnexpectedResponse { endpoint: String, body: String },

    /// Any other transport error.
    #[error("request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    /// One step of a multi-step publish failed.
    #[error("{step} failed: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: Box<PublishError>,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

impl PublishError {
    /// Attach the name of the step that failed.
    pub fn in_step(self, step: &'static str) -> Self {
        PublishError::Step {
            step,
            source: Box::new(self),
        }
    }
}
