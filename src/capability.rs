// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capability Probe (spec §4.6): device class plus the sticky Unsupported Set.

use std::collections::HashSet;

/// PJLink class, determined once per session by `CLSS?` (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Class1,
    Class2,
}

impl DeviceClass {
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "1" => Some(Self::Class1),
            "2" => Some(Self::Class2),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class1 => "1",
            Self::Class2 => "2",
        }
    }
}

/// Device class plus commands/properties the device has rejected with
/// `ERR1`. Additive for the life of the instance (spec §3/§4.6).
#[derive(Debug, Default)]
pub struct Capability {
    pub class: Option<DeviceClass>,
    unsupported: HashSet<String>,
    /// The one-shot speaker/microphone volume probe (spec §4.6 second
    /// paragraph) only runs on the very first poll.
    pub volume_probed: bool,
}

impl Capability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unsupported(&self, tag: &str) -> bool {
        self.unsupported.contains(tag)
    }

    pub fn mark_unsupported(&mut self, tag: &str) {
        if self.unsupported.insert(tag.to_owned()) {
            tracing::debug!(tag, "command marked unsupported, will be skipped henceforth");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_set_is_sticky_and_additive() {
        let mut cap = Capability::new();
        assert!(!cap.is_unsupported("FREZ"));
        cap.mark_unsupported("FREZ");
        cap.mark_unsupported("FILT");
        assert!(cap.is_unsupported("FREZ"));
        assert!(cap.is_unsupported("FILT"));
        // Re-marking the same tag doesn't clear anything else.
        cap.mark_unsupported("FREZ");
        assert!(cap.is_unsupported("FILT"));
    }

    #[test]
    fn device_class_round_trips_through_wire_value() {
        assert_eq!(DeviceClass::from_value("1"), Some(DeviceClass::Class1));
        assert_eq!(DeviceClass::from_value("2"), Some(DeviceClass::Class2));
        assert_eq!(DeviceClass::from_value("3"), None);
        assert_eq!(DeviceClass::Class1.as_str(), "1");
    }
}
