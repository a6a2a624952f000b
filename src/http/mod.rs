//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, peer address capture)
//!     → middleware/ (base context, request log, response log)
//!     → buffered.rs (hold handler output until logged)
//!     → handler
//! ```

pub mod buffered;
pub mod headers;
pub mod middleware;
pub mod server;

pub use buffered::{Buffered, BufferedError};
pub use middleware::{log_request, log_response, replace_ctx, with_logging, RequestLogState};
pub use server::HttpServer;
