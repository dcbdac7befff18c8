// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control Dispatcher (spec §4.8): property writes, one command at a time.

use std::time::Instant;

use crate::catalog::{Command, AVMT_SET, FREZ_SET, INPT_SET, MVOL_CMD, POWR_SET, SVOL_CMD};
use crate::client::ClientInner;
use crate::config::PjlinkConfig;
use crate::error::PjlinkError;
use crate::parser::{DeviceErrorCode, ParsedResponse};
use crate::snapshot::Snapshot;
use crate::transport::Transport;

pub(crate) async fn run<T: Transport>(
    inner: &mut ClientInner<T>,
    config: &PjlinkConfig,
    property: &str,
    value: &str,
) -> Result<(), PjlinkError> {
    let (command, params, tag) = match resolve(inner, property, value) {
        Some(resolved) => resolved,
        None => {
            tracing::warn!(property, "unknown control property, ignoring");
            return Ok(());
        }
    };

    if inner.capability.is_unsupported(tag) {
        return Err(PjlinkError::Unsupported { command: property.to_owned() });
    }

    let bytes = command.patched(&params);
    let cooldown = config.cooldown_interval();
    let reply = inner.session.dispatch(&bytes, tag, cooldown).await?;

    let result = match reply {
        ParsedResponse::Err(DeviceErrorCode::Unsupported) => {
            inner.capability.mark_unsupported(tag);
            Err(PjlinkError::Unsupported { command: property.to_owned() })
        }
        ParsedResponse::Err(DeviceErrorCode::OutOfParameter) => Err(PjlinkError::BadParameter),
        ParsedResponse::Err(DeviceErrorCode::Unavailable) => Err(PjlinkError::DeviceBusy),
        ParsedResponse::Err(DeviceErrorCode::DeviceFailure) => Err(PjlinkError::DeviceFailure),
        ParsedResponse::Err(DeviceErrorCode::AuthFailed) => Err(PjlinkError::AuthFailed),
        ParsedResponse::Na | ParsedResponse::Value(_) => {
            apply_success(inner, property, value);
            Ok(())
        }
        ParsedResponse::Banner { .. } => unreachable!("Session rejects mid-session banners"),
    };

    inner.last_control_at = Some(Instant::now());
    result
}

/// Map a property/value pair to its command template, patched parameter
/// bytes, and the tag the device will echo back (spec §4.8's table).
fn resolve<T: Transport>(
    inner: &ClientInner<T>,
    property: &str,
    value: &str,
) -> Option<(Command, Vec<u8>, &'static str)> {
    match property {
        "Power" => Some((POWR_SET, vec![on_off_byte(value)], "POWR")),
        "Freeze" => Some((FREZ_SET, vec![on_off_byte(value)], "FREZ")),
        "VideoMute" => Some((AVMT_SET, vec![b'1', on_off_byte(value)], "AVMT")),
        "AudioMute" => Some((AVMT_SET, vec![b'2', on_off_byte(value)], "AVMT")),
        "Input" => {
            let code = inner.input_catalog.get(value)?;
            if code.len() != 2 {
                return None;
            }
            Some((INPT_SET, code.as_bytes().to_vec(), "INPT"))
        }
        "SpeakerVolumeUp" => Some((SVOL_CMD, vec![b'1'], "SVOL")),
        "SpeakerVolumeDown" => Some((SVOL_CMD, vec![b'0'], "SVOL")),
        "MicrophoneVolumeUp" => Some((MVOL_CMD, vec![b'1'], "MVOL")),
        "MicrophoneVolumeDown" => Some((MVOL_CMD, vec![b'0'], "MVOL")),
        _ => None,
    }
}

fn on_off_byte(value: &str) -> u8 {
    if value == "1" {
        b'1'
    } else {
        b'0'
    }
}

/// Update the cached snapshot so the next poll's control-cooldown window
/// (spec §4.7 step 1) serves a value consistent with what was just written.
fn apply_success<T: Transport>(inner: &mut ClientInner<T>, property: &str, value: &str) {
    let key = match property {
        "Power" => "System#Power",
        "Freeze" => "System#Freeze",
        "VideoMute" => "System#VideoMute",
        "AudioMute" => "Audio#AudioMute",
        "Input" => "System#Input",
        // Volume buttons have no readable state to cache.
        _ => return,
    };

    let snapshot = inner.snapshot.get_or_insert_with(Snapshot::default);
    snapshot.set(key, value);

    if property == "Power" && value == "0" {
        for control_property in ["AudioMute", "VideoMute", "Freeze", "Input"] {
            snapshot.remove_control(control_property);
        }
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
