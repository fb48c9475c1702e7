use color_eyre::eyre::eyre;
use thiserror::Error;

/// Catch-all wrapper carrying an eyre report through typed error enums.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct OtherError(pub color_eyre::eyre::Report);

impl From<color_eyre::eyre::Report> for OtherError {
    fn from(report: color_eyre::eyre::Report) -> Self {
        Self(report)
    }
}

impl From<String> for OtherError {
    fn from(message: String) -> Self {
        Self(eyre!(message))
    }
}
