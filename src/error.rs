// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caller-visible error kinds for the PJLink protocol engine.

use std::fmt;

/// Errors surfaced across the public API (spec §7).
///
/// `AuthFailed` always terminates the current operation. `Transport` and
/// `DeviceFailure` terminate the operation but never invalidate the cached
/// snapshot. `Unsupported` is surfaced on control attempts but silently
/// absorbed during polling — see `poll.rs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PjlinkError {
    /// Device rejected the authentication digest (`PJLINK ERRA`).
    AuthFailed,
    /// Device returned `ERR1` for `command`; recorded and skipped thereafter.
    Unsupported { command: String },
    /// Device returned `ERR2`: parameter out of range.
    BadParameter,
    /// Device returned `ERR3`: device cannot act in its current state.
    DeviceBusy,
    /// Device returned `ERR4`: general device failure.
    DeviceFailure,
    /// Socket-level failure after the transport gate exhausted its retries.
    Transport(String),
}

impl PjlinkError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthFailed => "AUTH_FAILED",
            Self::Unsupported { .. } => "UNSUPPORTED",
            Self::BadParameter => "BAD_PARAMETER",
            Self::DeviceBusy => "DEVICE_BUSY",
            Self::DeviceFailure => "DEVICE_FAILURE",
            Self::Transport(_) => "TRANSPORT",
        }
    }
}

impl fmt::Display for PjlinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported { command } => write!(f, "{}: {command}", self.as_str()),
            Self::Transport(detail) => write!(f, "{}: {detail}", self.as_str()),
            _ => f.write_str(self.as_str()),
        }
    }
}

impl std::error::Error for PjlinkError {}
