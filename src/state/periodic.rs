use std::sync::Arc;

use futures_util::future::poll_fn;
use tokio::select;
use tracing::{debug, trace, warn};

use super::{Fired, State, TimerKind};

/// Periodically poll for expired timers and apply them to their sessions.
///
/// This is the only task that delivers ticks and expiries. It sleeps while no timers are armed.
pub(crate) async fn poll_for_expired_timers(state: Arc<State>) {
    loop {
        let item = select! {
            item = poll_fn(|cx| state.poll_expired(cx)) => item,
            // Timers were armed while waiting: poll again so new deadlines are picked up.
            _ = state.armed() => continue,
        };

        match item {
            Some(Ok(Fired { timer, changed })) => match timer.kind {
                TimerKind::Tick => trace!(chat = %timer.chat_id, changed, "tick"),
                TimerKind::Expiry => debug!(chat = %timer.chat_id, changed, "breathing session expired"),
            },
            Some(Err(err)) => {
                warn!(error = %err, "timer queue failed");
            }
            None => state.armed().await,
        }
    }
}
