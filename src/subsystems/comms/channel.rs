//! Channel lifecycle: every running channel is a task in one [`ChannelSet`]
//! sharing a [`CancellationToken`].

use std::future::Future;
use std::pin::Pin;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::AppError;

/// Run loop returned by [`Channel::run`].
pub type ChannelFuture = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send + 'static>>;

/// A user-facing I/O surface (console, HTTP API).
pub trait Channel: Send + 'static {
    /// Identifier used in log fields, e.g. `pty0`.
    fn id(&self) -> &str;

    /// Consume the channel and serve until `shutdown` is cancelled or the
    /// channel's own input ends.
    fn run(self: Box<Self>, shutdown: CancellationToken) -> ChannelFuture;
}

/// The running channels. A channel error cancels the others.
pub struct ChannelSet {
    tasks: JoinSet<(String, Result<(), AppError>)>,
    shutdown: CancellationToken,
}

impl ChannelSet {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self { tasks: JoinSet::new(), shutdown }
    }

    /// Start `channel` on its own task.
    pub fn spawn(&mut self, channel: Box<dyn Channel>) {
        let id = channel.id().to_string();
        info!(channel_id = %id, "starting channel");
        let run = channel.run(self.shutdown.clone());
        self.tasks.spawn(async move { (id, run.await) });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every channel to stop and return the first failure. With no
    /// channels this waits for `shutdown` instead.
    pub async fn join(mut self) -> Result<(), AppError> {
        if self.tasks.is_empty() {
            warn!("no comms channels running, waiting for shutdown");
            self.shutdown.cancelled().await;
            return Ok(());
        }

        let mut first_err: Option<AppError> = None;
        while let Some(joined) = self.tasks.join_next().await {
            let err = match joined {
                Ok((id, Ok(()))) => {
                    debug!(channel_id = %id, "channel stopped");
                    continue;
                }
                Ok((id, Err(e))) => {
                    error!(channel_id = %id, error = %e, "channel failed");
                    e
                }
                Err(e) => {
                    error!("channel task panicked: {e}");
                    AppError::Comms(format!("channel task panicked: {e}"))
                }
            };
            self.shutdown.cancel();
            first_err.get_or_insert(err);
        }

        first_err.map_or(Ok(()), Err)
    }
}
