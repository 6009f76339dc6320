// Library root: exposes the router, service and channels for the binary and
// for integration tests. The binary entry point is src/main.rs.

pub mod bootstrap;
pub mod core;
pub mod llm;
pub mod router;
pub mod subsystems;

pub use bootstrap::logger;
pub use self::core::{config, error};
