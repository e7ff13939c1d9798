//! Error types for gitdag.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The path does not resolve to a Git repository whose HEAD reaches a
    /// commit. Fatal for whatever operation was being set up.
    #[error("invalid repository: {0}")]
    InvalidRepository(String),

    /// A commit looked up by hash or revspec does not exist in the object
    /// store. Fails the lookup, not the session.
    #[error("object not found: {0}")]
    ObjectNotFound(String),

    /// Diff statistics for a single commit could not be computed.
    #[error("diff failed for {hash}: {source}")]
    Diff {
        hash: String,
        #[source]
        source: git2::Error,
    },

    #[error("git error: {0}")]
    Git(#[from] git2::Error),
}
