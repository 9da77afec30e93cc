use thiserror::Error;

/// Failures while assembling deployment configuration from the environment.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {reason}")]
    InvalidVar { var: &'static str, reason: String },
}

/// Failures from the identity provider while establishing the anonymous
/// session.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("identity endpoint rejected the sign-in: {0}")]
    Rejected(String),

    #[error("identity request failed: {0}")]
    Transport(String),

    #[error("malformed identity response: {0}")]
    Decode(String),
}

/// Failures from the realtime document store, both one-shot reads and the
/// snapshot subscription.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document store request failed: {0}")]
    Transport(String),

    #[error("document store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed document store response: {0}")]
    Decode(String),

    #[error("snapshot listener stopped: {0}")]
    ListenerStopped(String),
}

/// Failures from the hosted search provider.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Transport(String),

    #[error("search index returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed search response: {0}")]
    Decode(String),
}
