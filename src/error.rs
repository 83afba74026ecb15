//! Error taxonomy for input normalization.
//!
//! Every normalization failure is raised before a command is emitted, so a caller
//! never receives a partial payload.

use thiserror::Error;

/// Errors produced while turning caller inputs into commands.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MinichartsError {
    /// An option value is outside its allowed set (unknown chart type, bad
    /// `maxValues` length, empty palette, invalid time format...).
    #[error("validation error: {0}")]
    Validation(String),

    /// The data does not have the shape the reshaper needs (unbalanced time keys,
    /// rows not divisible into anchors, ragged rows...).
    #[error("data shape error: {0}")]
    DataShape(String),

    /// A command referenced a chart id the renderer does not know.
    #[error("no minichart with layer id {0:?}")]
    NotFound(String),
}

impl MinichartsError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn data_shape(msg: impl Into<String>) -> Self {
        Self::DataShape(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, MinichartsError>;
