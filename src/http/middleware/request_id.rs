//! Request id generators.

use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Produces one id per logged request.
pub type RequestIdFn = Arc<dyn Fn() -> String + Send + Sync>;

const SHORT_ID_LEN: usize = 7;

/// Seven random alphanumeric characters.
pub fn short_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SHORT_ID_LEN)
        .map(char::from)
        .collect()
}

/// A random UUID v4.
pub fn uuid_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
