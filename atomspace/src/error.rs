//! Error-handling module for the crate

use std::path::PathBuf;

use thiserror::Error;

use crate::{io::parser::LocatedParseError, types::Type};

/// Error-Collection for all the possible Errors occurring in this crate
#[allow(variant_size_differences)]
#[derive(Error, Debug)]
pub enum Error {
    /// A type name that is not part of the hierarchy
    #[error("Unknown type \"{name}\"")]
    UnknownType {
        /// The name that could not be resolved
        name: String,
    },
    /// A type was used where a descendant of another type is required
    #[error("Expected a {expected}, got {found}")]
    InvalidType {
        /// The type that is required
        expected: Type,
        /// The type that was given
        found: Type,
    },
    /// Asked a link for its name
    #[error("Not a node: {0}")]
    NotANode(String),
    /// Asked a node for its outgoing set
    #[error("Not a link: {0}")]
    NotALink(String),
    /// Tried to modify a read-only atomspace
    #[error("The atomspace \"{0}\" is read-only")]
    ReadOnly(String),
    /// A float vector index that cannot be extended to
    #[error("Index {0} is out of range")]
    IndexOutOfRange(usize),
    /// Parse errors
    #[error(transparent)]
    Parse(#[from] LocatedParseError),
    /// IO Error
    #[error(transparent)]
    IO(#[from] std::io::Error),
    /// Errors on reading a file
    #[error("Failed to read \"{}\": {error}", .filename.display())]
    IOReading {
        /// Contains the wrapped error
        error: std::io::Error,
        /// Filename which caused the error
        filename: PathBuf,
    },
    /// Error during a Write operation
    #[error("Failed to write \"{}\": {error}", .filename.display())]
    IOWriting {
        /// Underlying IO error
        error: std::io::Error,
        /// Name of the file that could not be written
        filename: PathBuf,
    },
}
