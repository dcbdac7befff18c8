// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session/Auth Engine (spec §4.4) and Retry/Scroll Loop (spec §4.5), layered
//! directly on top of the Transport Gate (spec §4.3).

use std::time::{Duration, Instant};

use md5::{Digest, Md5};

use crate::catalog::BLANK;
use crate::config::{SCROLL_ATTEMPTS, SCROLL_PAUSE_MS, TRANSPORT_RETRIES};
use crate::error::PjlinkError;
use crate::parser::{parse, DeviceErrorCode, ParsedResponse};
use crate::transport::{Transport, TransportState};

/// The session's connection/auth lifecycle (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    BannerPending,
    Authenticating,
    Ready,
    Paused,
}

/// Owns one transport and the auth/retry state layered on top of it.
pub struct Session<T: Transport> {
    transport: T,
    state: SessionState,
    password: Option<String>,
    last_command_at: Option<Instant>,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, password: Option<String>) -> Self {
        Self { transport, state: SessionState::Disconnected, password, last_command_at: None }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// When the last command was sent on this session, for the Keep-Alive
    /// Supervisor's idle check (spec §4.9).
    pub(crate) fn last_command_at(&self) -> Option<Instant> {
        self.last_command_at
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Close the socket and drop back to `Disconnected` (Pause Supervisor,
    /// auth failure, or a mid-session protocol error).
    pub async fn disconnect(&mut self) {
        let _ = self.transport.close().await;
        self.state = SessionState::Disconnected;
    }

    /// Move to `Paused` without forgetting *why* — a subsequent call re-enters
    /// the handshake exactly like a fresh `Disconnected` (spec §4.9).
    pub async fn pause(&mut self) {
        let _ = self.transport.close().await;
        self.state = SessionState::Paused;
    }

    /// Send `command`, expecting a reply whose tag matches `expected_tag`.
    /// Performs the handshake first if the session isn't `Ready`, and scrolls
    /// past stale replies on a tag mismatch (spec §4.4/§4.5).
    pub async fn dispatch(
        &mut self,
        command: &[u8],
        expected_tag: &str,
        cooldown: Duration,
    ) -> Result<ParsedResponse, PjlinkError> {
        let prefix = self.ensure_ready(cooldown).await?;
        let mut to_send = prefix;
        to_send.extend_from_slice(command);

        let raw = self.exchange(&to_send, cooldown).await?;
        let parsed = parse(&raw);

        if self.state == SessionState::Authenticating {
            if matches!(parsed, ParsedResponse::Err(DeviceErrorCode::AuthFailed)) {
                self.disconnect().await;
                return Err(PjlinkError::AuthFailed);
            }
            self.state = SessionState::Ready;
        }

        if let ParsedResponse::Banner { .. } = parsed {
            return self.reject_mid_session_banner().await;
        }
        if parsed.is_device_error() || parsed.matches_tag(expected_tag) {
            return Ok(parsed);
        }

        for attempt in 0..SCROLL_ATTEMPTS {
            tokio::time::sleep(Duration::from_millis(SCROLL_PAUSE_MS)).await;
            let raw = self.exchange(BLANK, cooldown).await?;
            let parsed = parse(&raw);
            tracing::debug!(attempt, expected_tag, "scrolled past stale reply");
            if let ParsedResponse::Banner { .. } = parsed {
                return self.reject_mid_session_banner().await;
            }
            if parsed.is_device_error() || parsed.matches_tag(expected_tag) {
                return Ok(parsed);
            }
        }
        Ok(ParsedResponse::Na)
    }

    /// A `PJLINK`-prefixed reply while `Ready` is a protocol error, not a
    /// second handshake (spec §9 Open Question, resolved in DESIGN.md).
    async fn reject_mid_session_banner(&mut self) -> Result<ParsedResponse, PjlinkError> {
        self.disconnect().await;
        Err(PjlinkError::Transport("unexpected banner mid-session".to_owned()))
    }

    /// Bring the session to `Ready`, returning the digest bytes (possibly
    /// empty) that must prefix the next command.
    async fn ensure_ready(&mut self, cooldown: Duration) -> Result<Vec<u8>, PjlinkError> {
        if self.state == SessionState::Ready {
            return Ok(Vec::new());
        }
        if matches!(self.transport.state(), TransportState::Disconnected) {
            self.transport.open().await.map_err(|e| PjlinkError::Transport(e.to_string()))?;
        }
        self.state = SessionState::BannerPending;

        let raw = self.exchange(BLANK, cooldown).await?;
        match parse(&raw) {
            ParsedResponse::Banner { requires_auth: false, .. } => {
                self.state = SessionState::Ready;
                Ok(Vec::new())
            }
            // A missing/empty greeting (spec §8 scenario 1) behaves like a
            // no-auth banner: some devices drop straight into the command
            // stream instead of sending `PJLINK 0`.
            ParsedResponse::Value(v) if v.is_empty() => {
                self.state = SessionState::Ready;
                Ok(Vec::new())
            }
            ParsedResponse::Banner { requires_auth: true, nonce } => {
                self.state = SessionState::Authenticating;
                let nonce = nonce.unwrap_or_default();
                let password = self.password.as_deref().unwrap_or("");
                Ok(digest(&nonce, password).into_bytes())
            }
            ParsedResponse::Err(DeviceErrorCode::AuthFailed) => {
                self.disconnect().await;
                Err(PjlinkError::AuthFailed)
            }
            _ => {
                self.disconnect().await;
                Err(PjlinkError::Transport("expected PJLink banner on connect".to_owned()))
            }
        }
    }

    /// Transport Gate (spec §4.3): cooldown, write+read, retry on transport
    /// failure up to `TRANSPORT_RETRIES` times.
    async fn exchange(&mut self, bytes: &[u8], cooldown: Duration) -> Result<Vec<u8>, PjlinkError> {
        if let Some(last) = self.last_command_at {
            let elapsed = last.elapsed();
            if elapsed < cooldown {
                tokio::time::sleep(cooldown - elapsed).await;
            }
        }
        self.last_command_at = Some(Instant::now());

        let mut attempt = 0;
        loop {
            match self.exchange_once(bytes).await {
                Ok(reply) => return Ok(reply),
                Err(e) => {
                    attempt += 1;
                    tracing::debug!(attempt, err = %e, "transport exchange failed");
                    if attempt >= TRANSPORT_RETRIES {
                        return Err(PjlinkError::Transport(e.to_string()));
                    }
                }
            }
        }
    }

    async fn exchange_once(&mut self, bytes: &[u8]) -> std::io::Result<Vec<u8>> {
        self.transport.write(bytes).await?;
        self.transport.read_until_cr().await
    }
}

/// `lowercase_hex(MD5(nonce || password))` (spec §4.4).
fn digest(nonce: &str, password: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(nonce.as_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
