//! Contract violations in the control model.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Control point '{point_id}' already has a measure on cube '{serial}'")]
    DuplicateSerial { point_id: String, serial: String },

    #[error("Reference measure on cube '{serial}' is not a measure of control point '{point_id}'")]
    ReferenceNotOwned { point_id: String, serial: String },
}

pub type Result<T> = std::result::Result<T, Error>;
