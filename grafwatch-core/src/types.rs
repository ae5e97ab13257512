//! Domain types shared by the watcher, tracker and dispatcher.
//!
//! Resources are modelled independently of the cluster client so the
//! change-detection code can be exercised without a cluster.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Namespace a resource lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Namespace(pub String);

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Namespace {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Namespace {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Name of a resource within its namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceName(pub String);

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ResourceName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ResourceName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Flattened identity of an [`Entry`], used as the fingerprint store key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub String);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which catalog an entry belongs to. Each kind has its own marker
/// annotation, tracker and API endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Datasource,
    Dashboard,
}

impl EntryKind {
    /// Order in which a pass processes the kinds. Datasources go first so
    /// dashboards referencing them find them in place.
    pub const PASS_ORDER: [EntryKind; 2] = [EntryKind::Datasource, EntryKind::Dashboard];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Datasource => "datasource",
            EntryKind::Dashboard => "dashboard",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A namespaced, named object carrying annotations and string data, as
/// returned by the cluster listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedResource {
    pub namespace: Namespace,
    pub name: ResourceName,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl AnnotatedResource {
    pub fn new(namespace: impl Into<Namespace>, name: impl Into<ResourceName>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            annotations: BTreeMap::new(),
            data: BTreeMap::new(),
        }
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Presence check only; the annotation value is ignored.
    pub fn has_annotation(&self, key: &str) -> bool {
        self.annotations.contains_key(key)
    }
}

/// One syncable data key of an annotated resource.
///
/// Rebuilt from the cluster state on every scan and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub namespace: Namespace,
    pub owner_name: ResourceName,
    pub key: String,
    pub value: String,
}

impl Entry {
    /// Identity of this entry: `<namespace>-<owner>-<key>`.
    pub fn id(&self) -> EntryId {
        EntryId(format!("{}-{}-{}", self.namespace, self.owner_name, self.key))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(Namespace::from("monitoring").to_string(), "monitoring");
        assert_eq!(ResourceName::from("cm-a").to_string(), "cm-a");
    }

    #[test]
    fn entry_id_joins_namespace_owner_and_key() {
        let entry = Entry {
            namespace: Namespace::from("ns1"),
            owner_name: ResourceName::from("cm-a"),
            key: "json".to_string(),
            value: "{}".to_string(),
        };
        assert_eq!(entry.id(), EntryId("ns1-cm-a-json".to_string()));
    }

    #[test]
    fn annotation_presence_ignores_value() {
        let res = AnnotatedResource::new("ns1", "cm-a").with_annotation("grafana/dashboard", "");
        assert!(res.has_annotation("grafana/dashboard"));
        assert!(!res.has_annotation("grafana/datasource"));
    }

    #[test]
    fn kind_display_and_pass_order() {
        assert_eq!(EntryKind::Dashboard.to_string(), "dashboard");
        assert_eq!(EntryKind::Datasource.to_string(), "datasource");
        assert_eq!(
            EntryKind::PASS_ORDER,
            [EntryKind::Datasource, EntryKind::Dashboard]
        );
    }
}
