//! Comms subsystem: the console and HTTP channels.
//!
//! Each channel implements [`Channel`] and runs as its own task inside the
//! [`ChannelSet`] returned by [`start`]. Channels capture their shared
//! [`Arc<CommsState>`] at construction time.

pub mod channel;
mod state;
#[cfg(feature = "channel-axum")]
pub mod axum_channel;
#[cfg(feature = "channel-pty")]
pub mod pty;

pub use channel::{Channel, ChannelFuture, ChannelSet};
pub use state::CommsState;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::subsystems::chat::{ChatService, QueryOptions};

/// Shared channel state over `chat`.
pub fn state(chat: Arc<ChatService>) -> Arc<CommsState> {
    Arc::new(CommsState::new(chat))
}

/// Start all configured channels.
///
/// `console_options` apply to every console query (e.g. `--model`). When no
/// other channel is enabled the console is loaded anyway.
pub fn start(
    config: &Config,
    chat: Arc<ChatService>,
    console_options: QueryOptions,
    shutdown: CancellationToken,
) -> ChannelSet {
    let state = state(chat);
    let mut channels = ChannelSet::new(shutdown);

    #[cfg(feature = "channel-axum")]
    {
        if config.comms_http_should_load() {
            info!(bind = %config.comms.http.bind, "loading http channel");
            channels.spawn(Box::new(axum_channel::AxumChannel::new(
                "http0",
                config.comms.http.bind.clone(),
                state.clone(),
            )));
        }
    }
    #[cfg(not(feature = "channel-axum"))]
    {
        if config.comms_http_should_load() {
            tracing::warn!("http channel enabled but the channel-axum feature is not compiled in");
        }
    }

    #[cfg(feature = "channel-pty")]
    {
        if config.comms_pty_should_load() || channels.is_empty() {
            info!("loading pty channel");
            channels.spawn(Box::new(pty::PtyChannel::new("pty0", state, console_options)));
        }
    }
    #[cfg(not(feature = "channel-pty"))]
    let _ = (state, console_options);

    channels
}
