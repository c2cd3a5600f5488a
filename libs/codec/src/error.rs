//! Definition-load errors
//!
//! Raised while turning the declarative message definitions into a
//! [`MessageRegistry`](crate::registry::MessageRegistry). Each variant names the
//! offending message so the definition file can be fixed without guessing.
//! Runtime failures during conversion use
//! [`MessagingError`](mpi_types::MessagingError) instead.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DefinitionError {
    /// Definition source is not valid TOML or does not match the schema
    #[error("Invalid definition source: {reason}")]
    Parse { reason: String },

    /// `implementation` names no registered message factory
    #[error("Unknown implementation '{implementation}' for message {message} (registered: {available})")]
    UnknownImplementation {
        message: String,
        implementation: String,
        available: String,
    },

    /// Transformer entry names no registered transformer
    #[error("Unknown transformer '{transformer}' for {message} -> {destination}")]
    UnknownTransformer {
        message: String,
        destination: String,
        transformer: String,
    },

    /// Same message name declared twice
    #[error("Duplicate definition for message {message}")]
    DuplicateMessage { message: String },

    /// `family` is neither 3DSecure nor MPI_Interface
    #[error("Unknown protocol family '{family}' for message {message}")]
    UnknownFamily { message: String, family: String },

    /// `versions` declared no version
    #[error("Message {message} declares no supported versions")]
    EmptyVersions { message: String },

    /// Definition file could not be read
    #[error("Cannot read definitions from {path}: {reason}")]
    Io { path: String, reason: String },
}

impl From<toml::de::Error> for DefinitionError {
    fn from(error: toml::de::Error) -> Self {
        DefinitionError::Parse {
            reason: error.to_string(),
        }
    }
}

pub type DefinitionResult<T> = std::result::Result<T, DefinitionError>;
