use actix::Addr;

use crate::config::TimingConfig;
use crate::services::coordinator::Coordinator;

/// Application state shared by the HTTP layer.
#[derive(Clone)]
pub struct AppState {
    /// Address of the coordinator actor; sessions bind to it on open.
    pub coordinator: Addr<Coordinator>,
    pub timing: TimingConfig,
}

impl AppState {
    pub fn new(coordinator: Addr<Coordinator>, timing: TimingConfig) -> Self {
        Self {
            coordinator,
            timing,
        }
    }
}
