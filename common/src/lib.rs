pub mod file_format;
pub mod log_setup;

pub use file_format::{FileExtensionError, SerdeFormat, SerdeFormatError};
pub use log_setup::{LogSetupError, setup_logging};
