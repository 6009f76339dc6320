//! Bootstrap layer — modules that run before any channel starts.
//!
//! - **logger** — tracing-subscriber initialisation.

pub mod logger;
