// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keep-Alive/Pause Supervisor (spec §4.9): a 1s-cadence background task that
//! contends for the same mutex as polling and control.

use std::sync::Arc;
use std::time::Instant;

use crate::catalog::CLSS_QUERY;
use crate::client::{ClientInner, PjlinkClient};
use crate::config::PjlinkConfig;
use crate::session::SessionState;
use crate::transport::Transport;

const TICK: std::time::Duration = std::time::Duration::from_secs(1);

pub(crate) fn spawn<T: Transport + 'static>(client: Arc<PjlinkClient<T>>) -> tokio::task::JoinHandle<()> {
    let shutdown = client.shutdown_token();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = interval.tick() => client.supervisor_tick().await,
            }
        }
    })
}

/// One supervisor pass: pause on a stale snapshot, otherwise refresh the
/// connection with `CLSS?` once the idle keep-alive window has elapsed.
/// Keep-alive failures are logged, never escalated (spec §4.9).
///
/// `connection_keep_alive_ms <= 0` disables the supervisor entirely: neither
/// the pause check nor the keep-alive dispatch runs.
pub(crate) async fn tick<T: Transport>(inner: &mut ClientInner<T>, config: &PjlinkConfig) {
    let Some(keep_alive_interval) = config.keep_alive_interval() else {
        return;
    };

    if let Some(deadline) = inner.valid_stats_deadline {
        if Instant::now() >= deadline && inner.session.state() != SessionState::Paused {
            tracing::debug!("snapshot went stale, pausing session");
            inner.session.pause().await;
            return;
        }
    }

    if inner.session.state() == SessionState::Paused {
        return;
    }
    // A session that has never been polled hasn't been established by the
    // host yet; the supervisor refreshes an already-active session, it
    // doesn't open one on its own.
    let due = inner.session.last_command_at().is_some_and(|t| t.elapsed() >= keep_alive_interval);
    if !due {
        return;
    }

    let cooldown = config.cooldown_interval();
    if let Err(e) = inner.session.dispatch(CLSS_QUERY.bytes, CLSS_QUERY.tag, cooldown).await {
        tracing::warn!(err = %e, "keep-alive refresh failed");
    }
}

#[cfg(test)]
#[path = "keepalive_tests.rs"]
mod tests;
