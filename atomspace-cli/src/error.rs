//! This module defines all the errors that can occur while executing atomspace-cli.

use std::path::PathBuf;

use thiserror::Error;

/// Error that occur during execution of the CLI app
#[derive(Error, Debug)]
pub enum CliError {
    /// The dump file exists and may not be replaced
    #[error("{} already exists, use --overwrite to replace it", .filename.display())]
    OutputExists {
        /// Name of the dump file
        filename: PathBuf,
    },
    /// Error while serializing the report
    #[error("Error while serializing the report: {0}")]
    SerializationError(#[from] serde_json::Error),
    /// Error resulting from io operations
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    /// Error originating from the atomspace
    #[error(transparent)]
    AtomSpaceError(#[from] atomspace::Error),
}
