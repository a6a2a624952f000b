//! A single log event.

use chrono::{DateTime, Utc};

use crate::log::fields::Fields;
use crate::log::level::Level;

/// One log event, built fresh for every call and handed to a formatter.
#[derive(Debug, Clone)]
pub struct LogMsg<'a> {
    pub ts: DateTime<Utc>,
    pub level: Level,
    pub msg: &'a str,
    /// Fields accumulated on the context.
    pub ctx_fields: &'a Fields,
    /// Fields from the call site.
    pub fields: Fields,
}
