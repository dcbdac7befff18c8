// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Context;
use super::*;
use crate::client::ClientInner;
use crate::mock_transport::MockTransport;
use crate::snapshot::ControlDescriptor;

fn config() -> PjlinkConfig {
    PjlinkConfig {
        host: "127.0.0.1".to_owned(),
        port: 4352,
        password: None,
        connection_keep_alive_ms: 25_000,
        commands_cooldown_ms: 1,
        input_options_retrieval_ms: 1_800_000,
    }
}

#[tokio::test(start_paused = true)]
async fn power_on_dispatches_and_caches_the_new_value() -> anyhow::Result<()> {
    let transport = MockTransport::new(vec!["PJLINK 0", "%1POWR=OK"]);
    let mut inner = ClientInner::new(transport, None);

    run(&mut inner, &config(), "Power", "1").await.context("control")?;

    assert_eq!(inner.session.transport().writes[1], b"%1POWR 1\r");
    assert_eq!(inner.snapshot.as_ref().and_then(|s| s.get("System#Power")), Some("1"));
    assert!(inner.last_control_at.is_some());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn audio_mute_patches_the_avmt_target_byte() -> anyhow::Result<()> {
    let transport = MockTransport::new(vec!["PJLINK 0", "%1AVMT=OK"]);
    let mut inner = ClientInner::new(transport, None);

    run(&mut inner, &config(), "AudioMute", "1").await.context("control")?;

    assert_eq!(inner.session.transport().writes[1], b"%1AVMT 21\r");
    assert_eq!(inner.snapshot.as_ref().and_then(|s| s.get("Audio#AudioMute")), Some("1"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn power_off_clears_the_dependent_controls() -> anyhow::Result<()> {
    let transport = MockTransport::new(vec!["PJLINK 0", "%1POWR=OK"]);
    let mut inner = ClientInner::new(transport, None);
    let snapshot = Snapshot {
        controls: vec![
            ControlDescriptor::Switch { property: "Power".to_owned() },
            ControlDescriptor::Switch { property: "AudioMute".to_owned() },
            ControlDescriptor::Switch { property: "VideoMute".to_owned() },
            ControlDescriptor::Switch { property: "Freeze".to_owned() },
            ControlDescriptor::Dropdown { property: "Input".to_owned(), options: vec![] },
        ],
        ..Default::default()
    };
    inner.snapshot = Some(snapshot);

    run(&mut inner, &config(), "Power", "0").await.context("control")?;

    let properties: Vec<&str> =
        inner.snapshot.as_ref().context("snapshot")?.controls.iter().map(|c| c.property()).collect();
    assert_eq!(properties, vec!["Power"]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn input_resolves_the_catalog_code() -> anyhow::Result<()> {
    let transport = MockTransport::new(vec!["PJLINK 0", "%2INPT=OK"]);
    let mut inner = ClientInner::new(transport, None);
    inner.input_catalog.insert("HDMI1".to_owned(), "31".to_owned());

    run(&mut inner, &config(), "Input", "HDMI1").await.context("control")?;

    assert_eq!(inner.session.transport().writes[1], b"%2INPT 31\r");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn unknown_input_name_is_a_silent_no_op() -> anyhow::Result<()> {
    let transport = MockTransport::new(vec![]);
    let mut inner = ClientInner::new(transport, None);

    run(&mut inner, &config(), "Input", "NOT_IN_CATALOG").await.context("control")?;

    assert!(inner.session.transport().writes.is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn err1_marks_the_command_unsupported_and_surfaces_an_error() {
    let transport = MockTransport::new(vec!["PJLINK 0", "%1POWR=ERR1"]);
    let mut inner = ClientInner::new(transport, None);

    let result = run(&mut inner, &config(), "Power", "1").await;

    assert!(matches!(result, Err(PjlinkError::Unsupported { .. })));
    assert!(inner.capability.is_unsupported("POWR"));
}

#[tokio::test(start_paused = true)]
async fn already_unsupported_command_is_rejected_without_a_round_trip() {
    let transport = MockTransport::new(vec![]);
    let mut inner = ClientInner::new(transport, None);
    inner.capability.mark_unsupported("FREZ");

    let result = run(&mut inner, &config(), "Freeze", "1").await;

    assert!(matches!(result, Err(PjlinkError::Unsupported { .. })));
    assert!(inner.session.transport().writes.is_empty());
}

#[tokio::test(start_paused = true)]
async fn device_error_codes_map_to_distinct_errors() {
    let transport = MockTransport::new(vec!["PJLINK 0", "%1POWR=ERR2"]);
    let mut inner = ClientInner::new(transport, None);
    assert_eq!(run(&mut inner, &config(), "Power", "1").await, Err(PjlinkError::BadParameter));
}

#[test]
fn unknown_property_does_not_panic_the_resolver() {
    let transport = MockTransport::new(vec![]);
    let inner = ClientInner::new(transport, None);
    assert!(resolve(&inner, "NotAProperty", "1").is_none());
}
