use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::ws::manager::WsManager;

/// Ping subscribers every `interval` until `cancel` fires.
///
/// Each round also forgets connections whose socket task has gone away, so
/// queue notifications stop being queued for them.
pub async fn run(ws_manager: Arc<WsManager>, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("WebSocket heartbeat stopping");
                break;
            }
            _ = ticker.tick() => {
                let dropped = ws_manager.ping_all().await;
                if dropped > 0 {
                    tracing::debug!(dropped, "Dropped closed WebSocket connections");
                }
            }
        }
    }
}
