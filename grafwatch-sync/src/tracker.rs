//! Change tracker: fingerprint-based dedup of catalog entries.
//!
//! ## `find_changed` protocol
//!
//! 1. Extract the entries carrying the tracker's marker annotation.
//! 2. Fingerprint each entry's value.
//! 3. Compare with the stored fingerprint for the entry's identity.
//! 4. Missing or different → report as changed and store the new fingerprint.
//!
//! The store is updated before anything is dispatched, so a failed push is
//! not retried until the content changes again. Identities that disappear
//! from the cluster are never evicted: an entry deleted and recreated with
//! identical content is not reported again.

use std::collections::HashMap;

use grafwatch_core::types::{AnnotatedResource, Entry, EntryId, EntryKind};

use crate::catalog;
use crate::fingerprint::fingerprint;

/// In-memory fingerprint store: maps entry identities to the fingerprint of
/// their last observed value. Lives as long as the process.
pub type FingerprintStore = HashMap<EntryId, String>;

/// Tracks one kind of entry under one marker annotation.
#[derive(Debug)]
pub struct ChangeTracker {
    kind: EntryKind,
    marker: String,
    store: FingerprintStore,
}

impl ChangeTracker {
    pub fn new(kind: EntryKind, marker: impl Into<String>) -> Self {
        Self {
            kind,
            marker: marker.into(),
            store: FingerprintStore::new(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Number of identities seen so far.
    pub fn tracked(&self) -> usize {
        self.store.len()
    }

    /// Entries from `resources` that are new or whose value changed since
    /// the last call, in catalog order. Records their fingerprints.
    pub fn find_changed(&mut self, resources: &[AnnotatedResource]) -> Vec<Entry> {
        let entries = catalog::extract(resources, &self.marker);
        let total = entries.len();

        let changed: Vec<Entry> = entries
            .into_iter()
            .filter(|entry| {
                let digest = fingerprint(&entry.value);
                let id = entry.id();
                if self.store.get(&id) == Some(&digest) {
                    tracing::debug!("unchanged {}: {}", self.kind, id);
                    return false;
                }
                self.store.insert(id, digest);
                true
            })
            .collect();

        tracing::debug!(
            "{} scan: {} entries, {} changed",
            self.kind,
            total,
            changed.len()
        );
        changed
    }
}
