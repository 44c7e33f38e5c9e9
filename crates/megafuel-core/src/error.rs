/// Transport and protocol failures for a single JSON-RPC exchange.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid JSON-RPC response: {0}")]
    InvalidResponse(String),

    /// The remote service answered with a JSON-RPC error object.
    #[error("JSON-RPC server error {code}: {message}")]
    ServerError {
        code: i64,
        message: String,
        data: Option<serde_json::Value>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to dial endpoint `{target}`: {reason}")]
    DialFailure { target: String, reason: String },

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("invalid {method} result: {reason}")]
    InvalidResult {
        method: &'static str,
        reason: String,
    },

    #[error("malformed number: {0}")]
    MalformedNumber(String),

    #[error("sponsor endpoint is not configured")]
    NoSponsorEndpoint,

    #[error("endpoint `{0}` is closed")]
    EndpointClosed(String),

    #[error("call cancelled")]
    Cancelled,

    #[error("call deadline exceeded")]
    DeadlineExceeded,
}

impl ClientError {
    /// Returns the JSON-RPC error code when the remote service rejected the call.
    pub fn remote_code(&self) -> Option<i64> {
        match self {
            Self::Rpc(RpcError::ServerError { code, .. }) => Some(*code),
            _ => None,
        }
    }
}
