// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The flat property map and control descriptor list a poll produces (spec §3/§6).

use indexmap::IndexMap;
use serde::Serialize;

/// A single control surface the host can render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlDescriptor {
    Switch { property: String },
    Button { property: String },
    Dropdown { property: String, options: Vec<String> },
}

impl ControlDescriptor {
    pub fn property(&self) -> &str {
        match self {
            Self::Switch { property } | Self::Button { property } | Self::Dropdown { property, .. } => {
                property
            }
        }
    }
}

/// One immutable collection of everything observable at a single poll instant
/// (spec §3 "Snapshot").
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub properties: IndexMap<String, String>,
    pub controls: Vec<ControlDescriptor>,
}

impl Snapshot {
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.properties.insert(key.to_owned(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Drop a control whose property no longer applies (spec §4.8
    /// post-processing: power transitioning to "0" removes Input/AudioMute/
    /// VideoMute/Freeze controls).
    pub fn remove_control(&mut self, property: &str) {
        self.controls.retain(|c| c.property() != property);
    }

    /// Invariant check used by tests (spec §8): no empty or duplicate keys.
    #[cfg(test)]
    pub fn has_well_formed_keys(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.properties.keys().all(|k| !k.is_empty() && seen.insert(k))
    }
}
