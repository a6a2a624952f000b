//! Line formatters.
//!
//! # Data Flow
//! ```text
//! LogMsg
//!     → json.rs  (one JSON object per line, for machines)
//!     → lite.rs  (summary line plus indented fields, for humans)
//!     → debug.rs (every field on its own line)
//!     → bytes handed to the sink
//! ```
//!
//! # Design Decisions
//! - One trait, one method; the logger holds whichever was chosen at startup
//! - Formatters never modify the message they are given

pub mod debug;
pub mod json;
pub mod lite;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::log::msg::LogMsg;

pub use debug::DebugFormatter;
pub use json::JsonFormatter;
pub use lite::LiteFormatter;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid value for field {key:?}")]
    InvalidValue {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to marshal log message")]
    Marshal(#[source] serde_json::Error),
}

/// Renders a [`LogMsg`] to output bytes.
pub trait Formatter: Send + Sync + std::fmt::Debug {
    fn format(&self, msg: &LogMsg<'_>) -> Result<Vec<u8>, FormatError>;
}

/// Formatter selection, as it appears in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Lite,
    Debug,
}

impl Format {
    pub fn formatter(self) -> Box<dyn Formatter> {
        match self {
            Format::Json => Box::new(JsonFormatter),
            Format::Lite => Box::new(LiteFormatter),
            Format::Debug => Box::new(DebugFormatter),
        }
    }
}
