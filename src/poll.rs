// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Poll Engine (spec §4.7): one snapshot per successful cycle.

use std::time::{Duration, Instant};

use indexmap::IndexMap;

use crate::capability::DeviceClass;
use crate::catalog::{Command, CLASS1_POLL_SEQUENCE, CLASS2_POLL_SEQUENCE, CLSS_QUERY, MVOL_CMD, SVOL_CMD};
use crate::client::ClientInner;
use crate::config::{PjlinkConfig, CONTROL_COOLDOWN, VALID_STATS_WINDOW};
use crate::error::PjlinkError;
use crate::input_catalog;
use crate::metadata::MetadataProvider;
use crate::parser::{DeviceErrorCode, ParsedResponse};
use crate::snapshot::{ControlDescriptor, Snapshot};
use crate::transport::Transport;

pub(crate) async fn run<T: Transport>(
    inner: &mut ClientInner<T>,
    config: &PjlinkConfig,
    metadata: &dyn MetadataProvider,
    adapter_started_at: Instant,
) -> Result<Snapshot, PjlinkError> {
    // Step 1: control cooldown.
    if let (Some(last_control), Some(cached)) = (inner.last_control_at, inner.snapshot.as_ref()) {
        if last_control.elapsed() < CONTROL_COOLDOWN {
            return Ok(cached.clone());
        }
    }

    let cooldown = config.cooldown_interval();

    // Step 2: capability probe. CLSS? always leads the cycle.
    let class_reply = inner.session.dispatch(CLSS_QUERY.bytes, CLSS_QUERY.tag, cooldown).await?;
    if let Some(class) = class_reply.value_str().and_then(DeviceClass::from_value) {
        inner.capability.class = Some(class);
    }

    if !inner.capability.volume_probed {
        inner.capability.volume_probed = true;
        probe_volume(inner, cooldown).await?;
    }

    let mut raw_values: Vec<(&'static str, String)> = Vec::new();

    // Step 3: Class 1 sequence.
    for command in CLASS1_POLL_SEQUENCE {
        collect_one(inner, command, &mut raw_values, cooldown).await?;
    }

    // Step 4: Class 2 additions, then input-catalog refresh (order matters:
    // INPT?'s code is resolved to a display name using the catalog as it
    // stands *after* this cycle's refresh, not before).
    if inner.capability.class == Some(DeviceClass::Class2) {
        for command in CLASS2_POLL_SEQUENCE {
            collect_one(inner, command, &mut raw_values, cooldown).await?;
        }
        if input_catalog::is_due(
            inner.input_catalog.is_empty(),
            inner.input_catalog_refreshed_at,
            config.input_refresh_interval(),
        ) {
            match input_catalog::refresh(&mut inner.session, cooldown).await {
                Ok(catalog) => {
                    inner.input_catalog = catalog;
                    inner.input_catalog_refreshed_at = Some(Instant::now());
                }
                Err(e) => tracing::warn!(err = %e, "input catalog refresh failed"),
            }
        }
    }

    // Step 5: decode.
    let mut snapshot = Snapshot::default();
    if let Some(class) = inner.capability.class {
        snapshot.set("PJLinkClass", class.as_str());
    }
    for (tag, value) in &raw_values {
        decode_into(tag, value, &mut snapshot, &inner.input_catalog);
    }

    // Step 6: control descriptors.
    build_controls(inner, &mut snapshot);

    // Step 7: adapter metadata.
    if let Some(v) = metadata.get("adapter.version") {
        snapshot.set("AdapterMetadata#AdapterVersion", v);
    }
    if let Some(v) = metadata.get("adapter.build.date") {
        snapshot.set("AdapterMetadata#AdapterBuildDate", v);
    }
    snapshot.set(
        "AdapterMetadata#AdapterUptime",
        adapter_started_at.elapsed().as_secs().to_string(),
    );

    // Step 8: publish atomically.
    inner.snapshot = Some(snapshot.clone());
    inner.valid_stats_deadline = Some(Instant::now() + VALID_STATS_WINDOW);
    Ok(snapshot)
}

/// Dispatch one poll command, recording its value for later decoding and
/// absorbing `ERR1`/other device errors silently (spec §7: polling absorbs
/// `Unsupported`; other device errors simply omit the property).
async fn collect_one<T: Transport>(
    inner: &mut ClientInner<T>,
    command: &Command,
    raw_values: &mut Vec<(&'static str, String)>,
    cooldown: Duration,
) -> Result<(), PjlinkError> {
    if inner.capability.is_unsupported(command.tag) {
        return Ok(());
    }
    let reply = inner.session.dispatch(command.bytes, command.tag, cooldown).await?;
    match reply {
        ParsedResponse::Err(DeviceErrorCode::Unsupported) => {
            inner.capability.mark_unsupported(command.tag);
        }
        ParsedResponse::Err(_) | ParsedResponse::Na => {}
        ParsedResponse::Value(_) => {
            if let Some(value) = reply.value_str() {
                raw_values.push((command.tag, value.to_owned()));
            }
        }
        ParsedResponse::Banner { .. } => {
            unreachable!("Session rejects mid-session banners before returning to callers")
        }
    }
    Ok(())
}

/// One-shot speculative volume probe (spec §4.6): up then down, to detect
/// `ERR1` without leaving a lasting volume change.
async fn probe_volume<T: Transport>(
    inner: &mut ClientInner<T>,
    cooldown: Duration,
) -> Result<(), PjlinkError> {
    probe_volume_pair(inner, SVOL_CMD, cooldown).await?;
    probe_volume_pair(inner, MVOL_CMD, cooldown).await?;
    Ok(())
}

async fn probe_volume_pair<T: Transport>(
    inner: &mut ClientInner<T>,
    command: Command,
    cooldown: Duration,
) -> Result<(), PjlinkError> {
    if inner.capability.is_unsupported(command.tag) {
        return Ok(());
    }
    let up = command.patched(b"1");
    let up_reply = inner.session.dispatch(&up, command.tag, cooldown).await?;
    if matches!(up_reply, ParsedResponse::Err(DeviceErrorCode::Unsupported)) {
        inner.capability.mark_unsupported(command.tag);
        return Ok(());
    }
    let down = command.patched(b"0");
    let down_reply = inner.session.dispatch(&down, command.tag, cooldown).await?;
    if matches!(down_reply, ParsedResponse::Err(DeviceErrorCode::Unsupported)) {
        inner.capability.mark_unsupported(command.tag);
    }
    Ok(())
}

fn decode_into(tag: &str, value: &str, snapshot: &mut Snapshot, input_catalog: &IndexMap<String, String>) {
    match tag {
        "POWR" => snapshot.set("System#Power", value),
        "FREZ" => snapshot.set("System#Freeze", value),
        "NAME" => snapshot.set("DeviceName", value),
        "INF1" => snapshot.set("ManufacturerDetails", value),
        "INF2" => snapshot.set("ProductDetails", value),
        "INFO" => snapshot.set("DeviceDetails", value),
        "SNUM" => snapshot.set("SerialNumber", value),
        "SVER" => snapshot.set("SoftwareVersion", value),
        "FILT" => snapshot.set("System#FilterUsageTime(hours)", value),
        "RFIL" => snapshot.set("System#FilterReplacementModelNumber", value),
        "RLMP" => snapshot.set("Lamp#LampReplacementModelNumber", value),
        "RRES" => snapshot.set("System#RecommendedResolution", value),
        "IRES" => snapshot.set("System#InputResolution", value),
        "AVMT" => decode_avmt(value, snapshot),
        "ERST" => decode_erst(value, snapshot),
        "LAMP" => decode_lamp(value, snapshot),
        "INPT" => decode_inpt(value, snapshot, input_catalog),
        _ => {}
    }
}

/// Spec §4.7.1.
fn decode_avmt(value: &str, snapshot: &mut Snapshot) {
    let (audio, video) = match value {
        "30" => ("0", "0"),
        "31" => ("1", "1"),
        "21" => ("1", "0"),
        "11" => ("0", "1"),
        other => {
            tracing::debug!(value = other, "unrecognized AVMT value, leaving mute properties absent");
            return;
        }
    };
    snapshot.set("Audio#AudioMute", audio);
    snapshot.set("System#VideoMute", video);
}

/// Spec §4.7.2.
fn decode_erst(value: &str, snapshot: &mut Snapshot) {
    const NAMES: [&str; 6] = ["Fan", "Lamp", "Temperature", "CoverOpen", "Filter", "Other"];
    let digits: Vec<char> = value.chars().collect();
    if digits.len() < NAMES.len() {
        return;
    }
    for (name, digit) in NAMES.iter().zip(&digits) {
        let status = match digit {
            '0' => "OK",
            '1' => "WARNING",
            '2' => "ERROR",
            _ => "N/A",
        };
        snapshot.set(&format!("ErrorStatus#{name}"), status);
    }
}

/// Spec §4.7.3.
fn decode_lamp(value: &str, snapshot: &mut Snapshot) {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    for (i, pair) in tokens.chunks(2).enumerate() {
        if pair.len() != 2 {
            break;
        }
        let lamp_no = i + 1;
        snapshot.set(&format!("Lamp#Lamp{lamp_no}UsageTime"), pair[0]);
        let status = if pair[1] == "1" { "ON" } else { "OFF" };
        snapshot.set(&format!("Lamp#Lamp{lamp_no}Status"), status);
    }
}

/// Resolve the current input code to its catalog display name, falling back
/// to the raw code if the catalog doesn't (yet) know it.
fn decode_inpt(value: &str, snapshot: &mut Snapshot, input_catalog: &IndexMap<String, String>) {
    let name = input_catalog.iter().find(|(_, code)| code.as_str() == value).map(|(n, _)| n.clone());
    snapshot.set("System#Input", name.unwrap_or_else(|| value.to_owned()));
}

fn build_controls<T: Transport>(inner: &ClientInner<T>, snapshot: &mut Snapshot) {
    let mut controls = vec![ControlDescriptor::Switch { property: "Power".to_owned() }];
    let power_on = snapshot.get("System#Power") == Some("1");

    if power_on {
        controls.push(ControlDescriptor::Switch { property: "AudioMute".to_owned() });
        controls.push(ControlDescriptor::Switch { property: "VideoMute".to_owned() });
        controls.push(ControlDescriptor::Switch { property: "Freeze".to_owned() });
        let options: Vec<String> = inner.input_catalog.keys().cloned().collect();
        controls.push(ControlDescriptor::Dropdown { property: "Input".to_owned(), options });
    }

    if !inner.capability.is_unsupported("SVOL") {
        controls.push(ControlDescriptor::Button { property: "SpeakerVolumeUp".to_owned() });
        controls.push(ControlDescriptor::Button { property: "SpeakerVolumeDown".to_owned() });
    }
    if !inner.capability.is_unsupported("MVOL") {
        controls.push(ControlDescriptor::Button { property: "MicrophoneVolumeUp".to_owned() });
        controls.push(ControlDescriptor::Button { property: "MicrophoneVolumeDown".to_owned() });
    }

    snapshot.controls = controls;
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;
