// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The public facade: one mutex guarding everything a poll or control call
//! touches together (spec §5 — Poll Engine, Control Dispatcher, and
//! Keep-Alive Supervisor all contend for the same lock, whole-cycle atomic).

use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::capability::Capability;
use crate::config::PjlinkConfig;
use crate::error::PjlinkError;
use crate::keepalive;
use crate::metadata::MetadataProvider;
use crate::poll;
use crate::session::Session;
use crate::snapshot::Snapshot;
use crate::transport::{TcpTransport, Transport};
use crate::control;

/// Everything a poll/control cycle reads or writes, behind one lock.
pub(crate) struct ClientInner<T: Transport> {
    pub(crate) session: Session<T>,
    pub(crate) capability: Capability,
    pub(crate) snapshot: Option<Snapshot>,
    pub(crate) input_catalog: IndexMap<String, String>,
    pub(crate) last_control_at: Option<Instant>,
    pub(crate) input_catalog_refreshed_at: Option<Instant>,
    /// Deadline after which the Keep-Alive Supervisor moves the session to
    /// `Paused` absent a fresh successful poll (spec §4.9).
    pub(crate) valid_stats_deadline: Option<Instant>,
}

impl<T: Transport> ClientInner<T> {
    pub(crate) fn new(transport: T, password: Option<String>) -> Self {
        Self {
            session: Session::new(transport, password),
            capability: Capability::new(),
            snapshot: None,
            input_catalog: IndexMap::new(),
            last_control_at: None,
            input_catalog_refreshed_at: None,
            valid_stats_deadline: None,
        }
    }
}

/// A single PJLink device connection: polling, control, and the background
/// keep-alive/pause supervisor (spec §3).
pub struct PjlinkClient<T: Transport = TcpTransport> {
    inner: Mutex<ClientInner<T>>,
    config: PjlinkConfig,
    metadata: Arc<dyn MetadataProvider>,
    adapter_started_at: Instant,
    shutdown: CancellationToken,
}

impl PjlinkClient<TcpTransport> {
    /// Build a client that connects over real TCP, per `config.host`/`config.port`.
    pub fn new(config: PjlinkConfig, metadata: Arc<dyn MetadataProvider>) -> Self {
        let transport = TcpTransport::new(config.host.clone(), config.port);
        Self::with_transport(config, metadata, transport)
    }
}

impl<T: Transport> PjlinkClient<T> {
    /// Build a client over an arbitrary [`Transport`] — the seam tests use to
    /// substitute a scripted device.
    pub fn with_transport(config: PjlinkConfig, metadata: Arc<dyn MetadataProvider>, transport: T) -> Self {
        let password = config.password.clone();
        Self {
            inner: Mutex::new(ClientInner::new(transport, password)),
            config,
            metadata,
            adapter_started_at: Instant::now(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Run one poll cycle (spec §4.7) and return the resulting snapshot.
    pub async fn poll(&self) -> Result<Snapshot, PjlinkError> {
        let mut inner = self.inner.lock().await;
        poll::run(&mut inner, &self.config, self.metadata.as_ref(), self.adapter_started_at).await
    }

    /// Dispatch one control write (spec §4.8).
    pub async fn control(&self, property: &str, value: &str) -> Result<(), PjlinkError> {
        let mut inner = self.inner.lock().await;
        control::run(&mut inner, &self.config, property, value).await
    }

    /// The most recently published snapshot, if a poll has ever succeeded.
    pub async fn last_snapshot(&self) -> Option<Snapshot> {
        self.inner.lock().await.snapshot.clone()
    }

    pub(crate) async fn supervisor_tick(&self) {
        let mut inner = self.inner.lock().await;
        keepalive::tick(&mut inner, &self.config).await;
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

impl<T: Transport + 'static> PjlinkClient<T> {
    /// Spawn the Keep-Alive/Pause Supervisor (spec §4.9) as a background task.
    /// Cancel it via [`PjlinkClient::shutdown_token`].
    pub fn spawn_supervisor(self: Arc<Self>) -> JoinHandle<()> {
        keepalive::spawn(self)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
