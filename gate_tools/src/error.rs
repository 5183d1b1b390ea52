use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("The gate rejected the session credential (HTTP {0})")]
    AuthExpired(u16),
    #[error("The marketplace rejected the token ({0})")]
    TokenRejected(String),
    #[error("Unexpected response status {status}. {message}")]
    UnexpectedStatus { status: u16, message: String },
    #[error("Could not reach the gate: {0}")]
    Transport(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Unexpected response from the gate: {0}")]
    MalformedResponse(String),
}

impl GateApiError {
    /// True when the upstream told us the credential is no longer accepted. Every other error is transient.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::AuthExpired(_) | Self::TokenRejected(_))
    }
}
