//! Subsystems layered over the router.
//!
//! - **chat** — validation, session history, and the routed query pipeline.
//! - **comms** — console and HTTP channels under a shared cancellation token.

pub mod chat;
pub mod comms;
