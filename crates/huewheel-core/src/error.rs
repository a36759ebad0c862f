//! Engine errors.

use thiserror::Error;

use crate::color::ColorParseError;
use crate::marker::MarkerId;

/// Errors surfaced by the harmony engine.
///
/// Every failing operation leaves the engine's prior state unchanged.
#[derive(Debug, Clone, Error)]
pub enum HarmonyError {
    /// A mode name failed validation at the string boundary.
    #[error("Invalid mode specified: {0}")]
    InvalidMode(String),
    /// An operation referenced a marker not present in the bound set.
    #[error("Unknown marker: {0}")]
    UnknownMarker(MarkerId),
    /// A bind input could not be parsed as a color.
    #[error(transparent)]
    InvalidColor(#[from] ColorParseError),
}
