//! Errors surfaced by a combine run.

use std::io;
use std::path::PathBuf;

use common::{FileExtensionError, SerdeFormatError};
use thiserror::Error;

use crate::control;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No input control networks given; set a base, a from or a list network")]
    NoInputs,

    #[error("Control network list '{path}' contains no networks")]
    EmptyNetworkList { path: PathBuf },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: SerdeFormatError,
    },

    #[error("Failed to serialize '{path}': {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: SerdeFormatError,
    },

    #[error(transparent)]
    Format(#[from] FileExtensionError),

    #[error("Failed to write CSV '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Control network contract violated: {0}")]
    Control(#[from] control::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
