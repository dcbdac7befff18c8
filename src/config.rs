// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

/// Minimum inter-command cooldown, floor enforced by [`PjlinkConfig::cooldown_interval`].
const MIN_COOLDOWN_MS: u64 = 200;

/// Maximum transport retries per exchange (spec §4.3d).
pub const TRANSPORT_RETRIES: u32 = 10;

/// Maximum scroll attempts when hunting for a matching response tag (spec §4.5).
pub const SCROLL_ATTEMPTS: u32 = 10;

/// Pause between scroll attempts (spec §4.5).
pub const SCROLL_PAUSE_MS: u64 = 200;

/// Control cooldown window: a poll within this long of the last control call
/// returns the cached snapshot unchanged (spec §4.7 step 1).
pub const CONTROL_COOLDOWN: Duration = Duration::from_secs(5);

/// How long a successful poll keeps the session out of Paused state (spec §4.9).
pub const VALID_STATS_WINDOW: Duration = Duration::from_secs(180);

/// Configuration for one PJLink device connection.
#[derive(Debug, Clone, clap::Parser)]
pub struct PjlinkConfig {
    /// Device host or IP address.
    #[arg(long, env = "PJLINK_HOST")]
    pub host: String,

    /// Device TCP port.
    #[arg(long, default_value_t = 4352, env = "PJLINK_PORT")]
    pub port: u16,

    /// Authentication password. Absent if the device never sends a
    /// `PJLINK 1` banner.
    #[arg(long, env = "PJLINK_PASSWORD")]
    pub password: Option<String>,

    /// Idle-refresh period for the Keep-Alive Supervisor. `<= 0` disables it.
    #[arg(long, default_value_t = 25_000, env = "PJLINK_KEEP_ALIVE_MS")]
    pub connection_keep_alive_ms: i64,

    /// Minimum inter-command gap, floor 200ms.
    #[arg(long, default_value_t = 200, env = "PJLINK_COMMANDS_COOLDOWN_MS")]
    pub commands_cooldown_ms: u64,

    /// Input Catalog refresh period.
    #[arg(long, default_value_t = 1_800_000, env = "PJLINK_INPUT_OPTIONS_RETRIEVAL_MS")]
    pub input_options_retrieval_ms: u64,
}

impl PjlinkConfig {
    pub fn cooldown_interval(&self) -> Duration {
        Duration::from_millis(self.commands_cooldown_ms.max(MIN_COOLDOWN_MS))
    }

    /// `None` when the supervisor is disabled (`connection_keep_alive_ms <= 0`).
    pub fn keep_alive_interval(&self) -> Option<Duration> {
        if self.connection_keep_alive_ms <= 0 {
            None
        } else {
            Some(Duration::from_millis(self.connection_keep_alive_ms as u64))
        }
    }

    pub fn input_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.input_options_retrieval_ms)
    }
}
