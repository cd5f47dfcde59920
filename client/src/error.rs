use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("wallet API error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("contract error in {action}: {message}")]
    Contract { action: String, message: String },

    #[error("missing `{field}` in {action} response")]
    MissingField { action: String, field: String },

    #[error("invalid {action} response: {reason}")]
    Decode { action: String, reason: String },

    #[error("{0}")]
    Other(String),
}
