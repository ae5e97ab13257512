//! Flattens annotated resources into syncable entries.

use grafwatch_core::types::{AnnotatedResource, Entry};

/// Every data entry of every resource carrying `marker` as an annotation key.
///
/// The annotation value is ignored. Resources without the marker, or with
/// no data, contribute nothing. Callers must not rely on the order.
pub fn extract(resources: &[AnnotatedResource], marker: &str) -> Vec<Entry> {
    resources
        .iter()
        .filter(|res| res.has_annotation(marker))
        .flat_map(|res| {
            res.data.iter().map(move |(key, value)| Entry {
                namespace: res.namespace.clone(),
                owner_name: res.name.clone(),
                key: key.clone(),
                value: value.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "grafana.net/dashboard";

    #[test]
    fn marked_resource_yields_one_entry_per_data_key() {
        let res = AnnotatedResource::new("ns1", "cm-a")
            .with_annotation(MARKER, "true")
            .with_data("a.json", "{}")
            .with_data("b.json", "[]");

        let mut keys: Vec<_> = extract(&[res], MARKER)
            .into_iter()
            .map(|e| (e.namespace.0, e.owner_name.0, e.key))
            .collect();
        keys.sort();

        assert_eq!(
            keys,
            vec![
                ("ns1".into(), "cm-a".into(), "a.json".into()),
                ("ns1".into(), "cm-a".into(), "b.json".into()),
            ]
        );
    }

    #[test]
    fn unmarked_and_empty_resources_contribute_nothing() {
        let unmarked = AnnotatedResource::new("ns1", "plain").with_data("x", "1");
        let other_marker = AnnotatedResource::new("ns1", "ds")
            .with_annotation("grafana.net/datasource", "")
            .with_data("x", "1");
        let empty = AnnotatedResource::new("ns1", "empty").with_annotation(MARKER, "");

        assert!(extract(&[unmarked, other_marker, empty], MARKER).is_empty());
    }

    #[test]
    fn marker_value_is_irrelevant() {
        let res = AnnotatedResource::new("ns1", "cm-a")
            .with_annotation(MARKER, "")
            .with_data("json", "{}");
        assert_eq!(extract(&[res], MARKER).len(), 1);
    }
}
