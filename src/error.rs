//! CLI Error Types

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("{_0}: no such file or directory")]
    NotFound(#[error(not(source))] String),
    #[display("{_0}: not a directory")]
    NotADirectory(#[error(not(source))] String),
    #[display("{_0}: is a directory")]
    IsADirectory(#[error(not(source))] String),
    #[display("failed to load configuration")]
    Config,
    #[display("failed to set up the remote catalog client")]
    Remote,
    /// A resolution, listing or content request failed.
    #[display("namespace request failed")]
    Namespace,
    #[display("failed to write output")]
    Io,
}
