//! Application-wide error types.
//!
//! Request-path errors (routing, handlers, providers) live next to the code
//! that raises them; this enum covers process-level failures only.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("comms error: {0}")]
    Comms(String),

    #[error("startup error: {0}")]
    Startup(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
