//! Error taxonomy of the minting pipeline.
//!
//! Each stage has its own error type. [`MintError`] is the closed sum of all
//! of them and is what a failed [`Outcome`](crate::Outcome) carries.

use idmint_config::ConfigError;
use idmint_model::SaveError;
use thiserror::Error;

/// Result type for minting operations.
pub type MintResult<T> = Result<T, MintError>;

/// A degenerate payload. Informational unless strict profiles are enabled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("data profile {profile} produced an empty payload")]
    Empty { profile: String },

    #[error("data profile {profile} maps fields missing from the entity: {}", .fields.join(", "))]
    MissingSourceFields { profile: String, fields: Vec<String> },
}

/// Failure to get a successful response from the identifier service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The service could not be reached.
    #[error("connection error: {0}")]
    ConnectionError(String),

    /// The service answered with a non-2xx status.
    #[error("bad response from service: HTTP {status}: {body}")]
    BadResponse { status: u16, body: String },

    /// The transport timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// The request could not be built (e.g. an invalid base URL).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_builder() {
            TransportError::InvalidRequest(e.to_string())
        } else {
            TransportError::ConnectionError(e.to_string())
        }
    }
}

/// The service response did not contain an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed service response: {0}")]
    Malformed(String),
}

/// Failure to record the minted identifier on the entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    #[error("identifier is empty")]
    EmptyIdentifier,

    #[error("target field name is empty")]
    EmptyField,

    /// The target field does not exist. The identifier was minted but is
    /// not recorded anywhere.
    #[error("entity has no field {field}; identifier {identifier} was not recorded")]
    NoSuchField { field: String, identifier: String },

    /// The entity store refused the write. The identifier was minted but is
    /// not recorded anywhere.
    #[error("failed to persist identifier {identifier} to {field}: {source}")]
    PersistFailed {
        field: String,
        identifier: String,
        #[source]
        source: SaveError,
    },
}

/// The entity cannot take part in minting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    #[error("invalid minting target: {0}")]
    InvalidTarget(String),
}

/// Any failure of a minting transaction.
#[derive(Debug, Error)]
pub enum MintError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Entity(#[from] EntityError),
}

impl MintError {
    /// Stable label for logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            MintError::Config(ConfigError::Missing { .. }) => "config_missing",
            MintError::Config(ConfigError::Invalid { .. }) => "config_invalid",
            MintError::Config(_) => "config_store",
            MintError::Payload(_) => "payload",
            MintError::Transport(TransportError::ConnectionError(_)) => "connection_error",
            MintError::Transport(TransportError::BadResponse { .. }) => "bad_response",
            MintError::Transport(TransportError::Timeout) => "timeout",
            MintError::Transport(TransportError::InvalidRequest(_)) => "invalid_request",
            MintError::Parse(_) => "malformed_response",
            MintError::Write(WriteError::NoSuchField { .. }) => "no_such_field",
            MintError::Write(WriteError::PersistFailed { .. }) => "persist_failed",
            MintError::Write(_) => "write_precondition",
            MintError::Entity(_) => "invalid_target",
        }
    }

    /// The identifier that was minted but not recorded, if this failure
    /// left one behind at the registry.
    pub fn orphaned_identifier(&self) -> Option<&str> {
        match self {
            MintError::Write(
                WriteError::PersistFailed { identifier, .. }
                | WriteError::NoSuchField { identifier, .. },
            ) => Some(identifier),
            _ => None,
        }
    }
}
