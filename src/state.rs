//! Shared application state handed to every handler.

use crate::{config::Config, db::DbPool, realtime::EventHub};
use axum::extract::FromRef;
use std::sync::Arc;

/// Router state. Handlers extract only the parts they need
/// (`State<DbPool>`, `State<EventHub>`, `State<Arc<Config>>`).
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub events: EventHub,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        let events = EventHub::new(config.realtime_capacity);
        Self {
            pool,
            events,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for EventHub {
    fn from_ref(state: &AppState) -> Self {
        state.events.clone()
    }
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
