use std::sync::Arc;

use vidcat_core::types::Timestamp;
use vidcat_core::visibility::{Audience, Clock};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: vidcat_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Source of "now" for the publication gate. Tests pin it.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// The audience for unauthenticated public reads, as of now.
    pub fn public(&self) -> Audience {
        Audience::public(self.now())
    }
}
