//! PTY (console) comms channel: reads lines from stdin, routes them through
//! the chat service, prints the reply to stdout.
//!
//! The console is one session; prior exchanges are threaded into each new
//! query. Runs until `exit` is typed, stdin closes, or the `shutdown` token
//! is cancelled (Ctrl-C).

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::channel::{Channel, ChannelFuture};
use super::state::CommsState;
use crate::error::AppError;
use crate::subsystems::chat::{ChatError, ChatRequest, QueryOptions};

// ── PtyChannel ───────────────────────────────────────────────────────────────

pub struct PtyChannel {
    channel_id: String,
    state: Arc<CommsState>,
    options: QueryOptions,
}

impl PtyChannel {
    /// `options` apply to every query typed into this console.
    pub fn new(channel_id: impl Into<String>, state: Arc<CommsState>, options: QueryOptions) -> Self {
        Self { channel_id: channel_id.into(), state, options }
    }
}

impl Channel for PtyChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ChannelFuture {
        Box::pin(run_pty(self.channel_id, self.state, self.options, shutdown))
    }
}

const APOLOGY: &str = "Sorry, something went wrong while handling your request. Please try again.";

/// Line shown to the console user for a failed query. Only validation
/// errors carry detail; routing failures get a fixed apology.
fn failure_line(err: &ChatError) -> String {
    if err.is_validation() {
        format!("Invalid request: {err}")
    } else {
        APOLOGY.to_string()
    }
}

/// `exit`, case-insensitive and ignoring surrounding whitespace.
fn is_exit(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("exit")
}

// ── run_pty ──────────────────────────────────────────────────────────────────

async fn run_pty(
    channel_id: String,
    state: Arc<CommsState>,
    options: QueryOptions,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let session_id = Uuid::new_v4().to_string();
    let user_id = format!("console_{}", &session_id[..8]);
    info!(%channel_id, %session_id, "pty channel started");

    println!("=== routebot ===");
    println!("Ask about the weather, request a translation, or anything else.");
    println!("Type 'exit' to quit.");

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    let mut query_count: usize = 0;

    loop {
        print!("\n> ");
        use std::io::Write as _;
        let _ = std::io::stdout().flush();

        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                println!("\nInterrupted, ending the session.");
                info!("pty channel shutting down");
                break;
            }

            line = lines.next_line() => {
                match line {
                    Err(e) => {
                        warn!("pty read error: {e}");
                        break;
                    }
                    Ok(None) => {
                        info!("pty stdin closed");
                        break;
                    }
                    Ok(Some(input)) if is_exit(&input) => {
                        info!("user ended the session");
                        println!("Goodbye.");
                        break;
                    }
                    Ok(Some(input)) => {
                        let input = input.trim().to_string();
                        if input.is_empty() { continue; }

                        query_count += 1;
                        debug!(query = query_count, input = %input, "pty received line");

                        let request = ChatRequest {
                            message: input,
                            options: options.clone(),
                            session_id: Some(session_id.clone()),
                            user_id: Some(user_id.clone()),
                        };
                        match state.send_message(&channel_id, request).await {
                            Ok(reply) => println!("{}", reply.outcome.reply.content()),
                            Err(e) => {
                                warn!(error = %e, "query failed");
                                println!("{}", failure_line(&e));
                            }
                        }
                    }
                }
            }
        }
    }

    info!(%channel_id, queries = query_count, "pty session ended");
    // The console ending ends the process.
    shutdown.cancel();
    Ok(())
}
