//! Client tuning knobs

use embassy_time::Duration;
use pixylink_protocol::DEFAULT_SYNC_ATTEMPTS;

/// Timing and resync settings for [`Pixy2`](crate::Pixy2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClientConfig {
    /// Bytes scanned for a frame sync before a receive times out
    pub sync_attempts: u16,
    /// How long [`wait_for_startup`](crate::Pixy2::wait_for_startup) keeps polling
    pub startup_timeout: Duration,
    /// Pause between startup polls
    pub retry_delay: Duration,
}

impl ClientConfig {
    pub const DEFAULT: Self = Self {
        sync_attempts: DEFAULT_SYNC_ATTEMPTS,
        startup_timeout: Duration::from_secs(5),
        retry_delay: Duration::from_millis(1),
    };

    pub const fn with_sync_attempts(mut self, attempts: u16) -> Self {
        self.sync_attempts = attempts;
        self
    }

    pub const fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
