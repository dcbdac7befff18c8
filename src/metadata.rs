// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Metadata Provider external collaborator (spec §6).

use std::collections::HashMap;

/// Supplies the three adapter-metadata values a poll writes into the
/// snapshot. Hosts implement this over whatever version/build-info source
/// they already maintain; the core only ever reads three keys.
pub trait MetadataProvider: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// A fixed-value provider, useful for tests and the demo binary.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataProvider {
    values: HashMap<String, String>,
}

impl StaticMetadataProvider {
    pub fn new(version: impl Into<String>, build_date: impl Into<String>) -> Self {
        let mut values = HashMap::new();
        values.insert("adapter.version".to_owned(), version.into());
        values.insert("adapter.build.date".to_owned(), build_date.into());
        Self { values }
    }
}

impl MetadataProvider for StaticMetadataProvider {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
