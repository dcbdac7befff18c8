// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use anyhow::Context;
use super::*;
use crate::mock_transport::MockTransport;

const COOLDOWN: Duration = Duration::from_millis(1);

#[tokio::test(start_paused = true)]
async fn no_auth_banner_then_plain_command() -> anyhow::Result<()> {
    let transport = MockTransport::new(vec!["PJLINK 0", "%1CLSS=1"]);
    let mut session = Session::new(transport, None);

    let reply = session.dispatch(b"%1CLSS ?\r", "CLSS", COOLDOWN).await.context("dispatch")?;
    assert_eq!(reply, ParsedResponse::Value("%1CLSS=1".to_owned()));
    assert_eq!(session.state(), SessionState::Ready);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn empty_connect_greeting_resolves_to_ready() -> anyhow::Result<()> {
    let transport = MockTransport::new(vec!["", "%1CLSS=1"]);
    let mut session = Session::new(transport, None);

    let reply = session.dispatch(b"%1CLSS ?\r", "CLSS", COOLDOWN).await.context("dispatch")?;
    assert_eq!(reply, ParsedResponse::Value("%1CLSS=1".to_owned()));
    assert_eq!(session.state(), SessionState::Ready);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn auth_required_prefixes_digest_exactly_once() -> anyhow::Result<()> {
    let transport = MockTransport::new(vec!["PJLINK 1 6b1aa0ba", "%1CLSS=1", "%1POWR=1"]);
    let mut session = Session::new(transport, Some("secret".to_owned()));

    session.dispatch(b"%1CLSS ?\r", "CLSS", COOLDOWN).await.context("authenticated dispatch")?;
    assert_eq!(session.state(), SessionState::Ready);

    // Second command in the same session carries no digest prefix.
    session.dispatch(b"%1POWR ?\r", "POWR", COOLDOWN).await.context("second dispatch")?;

    let expected_digest = format!("{:x}", md5::Md5::digest(b"6b1aa0basecret"));
    let mut expected_first = expected_digest.into_bytes();
    expected_first.extend_from_slice(b"%1CLSS ?\r");

    // writes[0] is the blank banner probe; writes[1] carries the digest prefix.
    assert_eq!(session.transport.writes[1], expected_first);
    assert_eq!(session.transport.writes[2], b"%1POWR ?\r");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn auth_failure_surfaces_and_resets_session() {
    let transport = MockTransport::new(vec!["PJLINK 1 6b1aa0ba", "PJLINK ERRA"]);
    let mut session = Session::new(transport, Some("wrong".to_owned()));

    let result = session.dispatch(b"%1CLSS ?\r", "CLSS", COOLDOWN).await;
    assert!(matches!(result, Err(PjlinkError::AuthFailed)));
    assert_eq!(session.state(), SessionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn direct_erra_banner_is_auth_failed() {
    let transport = MockTransport::new(vec!["PJLINK ERRA"]);
    let mut session = Session::new(transport, None);

    let result = session.dispatch(b"%1CLSS ?\r", "CLSS", COOLDOWN).await;
    assert!(matches!(result, Err(PjlinkError::AuthFailed)));
}

#[tokio::test(start_paused = true)]
async fn device_error_reply_is_returned_without_scrolling() -> anyhow::Result<()> {
    let transport = MockTransport::new(vec!["PJLINK 0", "%1LAMP=ERR1"]);
    let mut session = Session::new(transport, None);

    let reply = session.dispatch(b"%1LAMP ?\r", "LAMP", COOLDOWN).await.context("dispatch")?;
    assert_eq!(reply, ParsedResponse::Err(DeviceErrorCode::Unsupported));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn scroll_skips_stale_reply_then_matches() -> anyhow::Result<()> {
    let transport =
        MockTransport::new(vec!["PJLINK 0", "%1INF2=stale junk", "%1POWR=1"]);
    let mut session = Session::new(transport, None);

    let reply = session.dispatch(b"%1POWR ?\r", "POWR", COOLDOWN).await.context("dispatch")?;
    assert_eq!(reply, ParsedResponse::Value("%1POWR=1".to_owned()));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn scroll_exhausts_after_ten_attempts_and_returns_na() -> anyhow::Result<()> {
    let mut replies = vec!["PJLINK 0".to_owned()];
    for _ in 0..11 {
        replies.push("%1INF2=stale".to_owned());
    }
    let transport = MockTransport::new(replies.iter().map(String::as_str).collect());
    let mut session = Session::new(transport, None);

    let reply = session.dispatch(b"%1POWR ?\r", "POWR", COOLDOWN).await.context("dispatch")?;
    assert_eq!(reply, ParsedResponse::Na);
    // banner + initial command + exactly 10 scroll attempts
    assert_eq!(session.transport.writes.len(), 12);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn mid_session_banner_is_a_protocol_error() -> anyhow::Result<()> {
    let transport = MockTransport::new(vec!["PJLINK 0", "%1CLSS=1", "PJLINK 0"]);
    let mut session = Session::new(transport, None);

    session.dispatch(b"%1CLSS ?\r", "CLSS", COOLDOWN).await.context("first dispatch")?;
    let result = session.dispatch(b"%1POWR ?\r", "POWR", COOLDOWN).await;
    assert!(matches!(result, Err(PjlinkError::Transport(_))));
    assert_eq!(session.state(), SessionState::Disconnected);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn transport_retries_then_succeeds() -> anyhow::Result<()> {
    let mut transport = MockTransport::new(vec!["PJLINK 0", "%1CLSS=1"]);
    transport.fail_next_writes = 2;
    let mut session = Session::new(transport, None);

    let reply = session.dispatch(b"%1CLSS ?\r", "CLSS", COOLDOWN).await.context("dispatch")?;
    assert_eq!(reply, ParsedResponse::Value("%1CLSS=1".to_owned()));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn replies_pushed_after_construction_are_served_in_order() -> anyhow::Result<()> {
    let mut transport = MockTransport::new(vec!["PJLINK 0", "%1CLSS=1"]);
    transport.push_reply("%1POWR=1");
    let mut session = Session::new(transport, None);

    session.dispatch(b"%1CLSS ?\r", "CLSS", COOLDOWN).await.context("first dispatch")?;
    let reply =
        session.dispatch(b"%1POWR ?\r", "POWR", COOLDOWN).await.context("second dispatch")?;
    assert_eq!(reply, ParsedResponse::Value("%1POWR=1".to_owned()));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn transport_exhausts_retries_and_surfaces_error() {
    let mut transport = MockTransport::new(vec!["PJLINK 0"]);
    transport.fail_next_writes = 100;
    let mut session = Session::new(transport, None);

    let result = session.dispatch(b"%1CLSS ?\r", "CLSS", COOLDOWN).await;
    assert!(matches!(result, Err(PjlinkError::Transport(_))));
}
