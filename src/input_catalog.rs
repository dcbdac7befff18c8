// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Input Catalog (spec §4.10): name <-> two-char input code, refreshed lazily.

use std::time::Duration;

use indexmap::IndexMap;

use crate::catalog::{INNM_QUERY, INST_QUERY};
use crate::error::PjlinkError;
use crate::parser::ParsedResponse;
use crate::session::Session;
use crate::transport::Transport;

/// Issue `INST?` then `INNM?` per code, and return the fully rebuilt catalog.
/// The caller only replaces its previous catalog once this returns `Ok` — a
/// partial rebuild is never published (spec §3).
pub async fn refresh<T: Transport>(
    session: &mut Session<T>,
    cooldown: Duration,
) -> Result<IndexMap<String, String>, PjlinkError> {
    let reply = session.dispatch(INST_QUERY.bytes, INST_QUERY.tag, cooldown).await?;
    let codes: Vec<String> = match reply.value_str() {
        Some(value) => value.split_whitespace().map(str::to_owned).collect(),
        None => return Ok(IndexMap::new()),
    };

    let mut catalog = IndexMap::new();
    for code in codes {
        if code.len() != 2 {
            continue;
        }
        let params = code.as_bytes();
        let bytes = INNM_QUERY.patched(params);
        let reply = session.dispatch(&bytes, INNM_QUERY.tag, cooldown).await?;
        if let ParsedResponse::Value(_) = &reply {
            if let Some(name) = reply.value_str() {
                catalog.insert(name.to_owned(), code);
            }
        }
    }
    Ok(catalog)
}

/// Whether a refresh is due: empty catalog, or the configured interval elapsed.
pub fn is_due(
    catalog_is_empty: bool,
    refreshed_at: Option<std::time::Instant>,
    interval: Duration,
) -> bool {
    catalog_is_empty || refreshed_at.is_none_or(|t| t.elapsed() >= interval)
}

#[cfg(test)]
#[path = "input_catalog_tests.rs"]
mod tests;
