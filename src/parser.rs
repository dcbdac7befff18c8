// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns a raw PJLink reply into a [`ParsedResponse`] (spec §4.2).

use crate::error::PjlinkError;

/// The device-side classification of a PJLink error reply (`ERR1`..`ERR4`, `ERRA`).
///
/// Distinct from [`PjlinkError`]: this is the bare wire classification, before
/// a caller attaches command/property context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceErrorCode {
    Unsupported,
    OutOfParameter,
    Unavailable,
    DeviceFailure,
    AuthFailed,
}

impl DeviceErrorCode {
    fn from_value(value: &str) -> Option<Self> {
        match value {
            "ERR1" => Some(Self::Unsupported),
            "ERR2" => Some(Self::OutOfParameter),
            "ERR3" => Some(Self::Unavailable),
            "ERR4" => Some(Self::DeviceFailure),
            _ => None,
        }
    }
}

/// A parsed PJLink reply (spec §3 "Parsed Response").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedResponse {
    /// The value substring between `=` and the terminator.
    Value(String),
    /// The `"-"` not-applicable sentinel.
    Na,
    /// A device error reply.
    Err(DeviceErrorCode),
    /// The greeting line sent on TCP connect.
    Banner { requires_auth: bool, nonce: Option<String> },
}

impl ParsedResponse {
    /// Does this response carry `tag` in its value body (spec §4.5)?
    pub fn matches_tag(&self, tag: &str) -> bool {
        match self {
            Self::Value(v) => v.contains(tag),
            _ => false,
        }
    }

    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::Err(_))
    }

    /// The substring after `=`, i.e. the actual value once the tag used for
    /// matching (`matches_tag`) has served its purpose.
    pub fn value_str(&self) -> Option<&str> {
        match self {
            Self::Value(v) => v.split_once('=').map(|(_, value)| value),
            _ => None,
        }
    }
}

/// Parse one `\r`-terminated (or already-stripped) PJLink reply.
pub fn parse(raw: &[u8]) -> ParsedResponse {
    let trimmed = raw.strip_suffix(b"\r").unwrap_or(raw);
    let text = String::from_utf8_lossy(trimmed);

    if let Some(rest) = text.strip_prefix("PJLINK ") {
        return parse_banner(rest);
    }

    match text.find('=') {
        Some(idx) => {
            let value = &text[idx + 1..];
            if let Some(code) = DeviceErrorCode::from_value(value) {
                ParsedResponse::Err(code)
            } else if value == "-" {
                ParsedResponse::Na
            } else {
                ParsedResponse::Value(text.into_owned())
            }
        }
        None => ParsedResponse::Value(String::new()),
    }
}

fn parse_banner(rest: &str) -> ParsedResponse {
    if rest == "ERRA" {
        return ParsedResponse::Err(DeviceErrorCode::AuthFailed);
    }
    if let Some(nonce) = rest.strip_prefix("1 ") {
        return ParsedResponse::Banner { requires_auth: true, nonce: Some(nonce.to_owned()) };
    }
    if rest.starts_with('0') {
        return ParsedResponse::Banner { requires_auth: false, nonce: None };
    }
    ParsedResponse::Value(String::new())
}

impl From<DeviceErrorCode> for PjlinkError {
    fn from(code: DeviceErrorCode) -> Self {
        match code {
            DeviceErrorCode::Unsupported => {
                PjlinkError::Unsupported { command: String::new() }
            }
            DeviceErrorCode::OutOfParameter => PjlinkError::BadParameter,
            DeviceErrorCode::Unavailable => PjlinkError::DeviceBusy,
            DeviceErrorCode::DeviceFailure => PjlinkError::DeviceFailure,
            DeviceErrorCode::AuthFailed => PjlinkError::AuthFailed,
        }
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
