//! Timer and countdown settings.
//!
//! Environment variables must be set by the runtime environment; every
//! knob carries a production default.

use std::time::Duration;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct TimingConfig {
    /// Inactivity during trick play before the seat is bot-substituted.
    pub turn_timeout: Duration,
    /// Inactivity during bidding before the seat is bot-substituted.
    pub bid_timeout: Duration,
    /// Pause after a coinche, reserved for the client-side animation.
    pub surcoinche_delay: Duration,
    /// Length of the surcoinche acceptance countdown, in whole seconds.
    pub surcoinche_window_secs: u8,
    /// Matchmaking countdown once four players are queued, in seconds.
    pub matchmaking_countdown_secs: u8,
    /// Granularity of countdown broadcasts (1s in production; tests
    /// shrink it).
    pub tick_interval: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            turn_timeout: Duration::from_millis(15_000),
            bid_timeout: Duration::from_millis(20_000),
            surcoinche_delay: Duration::from_millis(7_500),
            surcoinche_window_secs: 10,
            matchmaking_countdown_secs: 3,
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl TimingConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();
        Ok(Self {
            turn_timeout: env_ms("BACKEND_TURN_TIMEOUT_MS", defaults.turn_timeout)?,
            bid_timeout: env_ms("BACKEND_BID_TIMEOUT_MS", defaults.bid_timeout)?,
            surcoinche_delay: env_ms("BACKEND_SURCOINCHE_DELAY_MS", defaults.surcoinche_delay)?,
            surcoinche_window_secs: env_u8(
                "BACKEND_SURCOINCHE_WINDOW_SECS",
                defaults.surcoinche_window_secs,
            )?,
            matchmaking_countdown_secs: env_u8(
                "BACKEND_MATCHMAKING_COUNTDOWN_SECS",
                defaults.matchmaking_countdown_secs,
            )?,
            tick_interval: defaults.tick_interval,
        })
    }

    /// Sub-100ms timings so tests can exercise timeouts without waiting.
    pub fn short_for_tests() -> Self {
        Self {
            turn_timeout: Duration::from_millis(60),
            bid_timeout: Duration::from_millis(60),
            surcoinche_delay: Duration::from_millis(20),
            surcoinche_window_secs: 1,
            matchmaking_countdown_secs: 1,
            tick_interval: Duration::from_millis(20),
        }
    }
}

fn env_ms(key: &str, default: Duration) -> Result<Duration, AppError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| AppError::Config {
                detail: format!("{key} must be a duration in milliseconds, got {raw:?}"),
            }),
        Err(_) => Ok(default),
    }
}

fn env_u8(key: &str, default: u8) -> Result<u8, AppError> {
    match std::env::var(key) {
        Ok(raw) => raw.parse::<u8>().map_err(|_| AppError::Config {
            detail: format!("{key} must be a small integer, got {raw:?}"),
        }),
        Err(_) => Ok(default),
    }
}
