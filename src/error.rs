//! Error types used by this crate.

use std::io;

use thiserror::Error;

/// Error returned when a registry-style platform path cannot be resolved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathResolveError {
    /// The path starts with `[` but does not follow the `[ROOT\SUB\KEY]TRAIL` grammar
    #[error("Malformed platform path: {0}")]
    Malformed(String),

    /// The path names a registry root other than `HKEY_LOCAL_MACHINE` / `HKEY_CURRENT_USER`
    #[error("Unknown registry root entry: {0}")]
    UnknownRoot(String),
}

/// Error returned when a single on-disk file could not be parsed.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Error originating from [`io::Error`]
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Error originating from [`nom::Err`]
    #[error(transparent)]
    Nom(#[from] nom::Err<nom::error::Error<String>>),

    /// Error originating from [`serde_json::Error`]
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Error originating from [`quick_xml::DeError`]
    #[error(transparent)]
    Xml(#[from] quick_xml::DeError),
}

impl From<nom::Err<nom::error::Error<&str>>> for ParseError {
    fn from(err: nom::Err<nom::error::Error<&str>>) -> Self {
        Self::Nom(err.map_input(Into::into))
    }
}

/// Error returned by a remote catalog call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteServiceError {
    /// The service reported that the requested item does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The account could not be accessed with the given credentials
    #[error("Access error: {0}")]
    Access(String),

    /// Any other transport or service failure
    #[error("Remote service error: {0}")]
    Transport(String),
}

/// Precondition failure of the one-shot importers, meant to be shown to the user.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No valid account is configured")]
    InvalidAccount,

    #[error("The game database is not open")]
    StoreUnavailable,
}

/// Phase of [`crate::reconcile::get_games`] that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    Installed,
    Library,
}

/// Aggregate error recorded when a whole import phase fails.
#[derive(Error, Debug)]
#[error("Failed to import {phase:?} games: {source}")]
pub struct ImportError {
    pub phase: ImportPhase,
    #[source]
    pub source: LibraryError,
}

/// Crate-level error returned by the library scanners.
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Path(#[from] PathResolveError),

    #[error(transparent)]
    Remote(#[from] RemoteServiceError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Error originating from any other source
    #[error("{0}")]
    Other(String),
}
