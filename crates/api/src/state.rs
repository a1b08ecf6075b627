use std::sync::Arc;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub pool: queuedesk_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// WebSocket connections of customers and staff, keyed by topic.
    pub ws_manager: Arc<WsManager>,
    /// Handlers publish a [`QueueEvent`](queuedesk_events::QueueEvent) after every change.
    pub event_bus: Arc<queuedesk_events::EventBus>,
}
