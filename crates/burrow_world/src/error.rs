//! # World Error Types
//!
//! Configuration and decoding failures. Gameplay rejections (digging solid
//! stone, clicking outside the grid) are not errors and never show up here.

use thiserror::Error;

/// Errors that can occur while building or decoding world state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// Invalid world configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A special area is malformed or does not fit inside the grid.
    #[error("invalid special area at ({x}, {y}): {reason}")]
    InvalidSpecialArea {
        /// Left column of the area.
        x: u32,
        /// Top row of the area.
        y: u32,
        /// What is wrong with it.
        reason: String,
    },

    /// A change-log tag that maps to no action.
    #[error("unknown change tag: {0}")]
    UnknownChangeTag(u8),

    /// A change-log index that does not address a cell of this grid.
    #[error("change index {index} outside {width}x{height} grid")]
    IndexOutOfGrid {
        /// The offending linear index.
        index: u64,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },
}

/// Result type for world operations.
pub type WorldResult<T> = Result<T, WorldError>;
