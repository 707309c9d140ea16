//! Computation of a node's observed path set.
//!
//! Patterns come from `enhance_map` as parsed dotted paths. At enrichment
//! time each pattern's wildcard is expanded over the keys present in the
//! node's fields, and a concrete path becomes observed when its parent
//! chain resolves to a container. The leaf itself does not have to exist
//! yet; a write may introduce it later. `enhance_all` replaces the
//! pattern list entirely: every top-level field present at enrichment is
//! observed and `enhance_map` is ignored.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use treedom_path::{expand_in, resolve_in, Path};

pub(crate) fn observed_paths(
    patterns: &[Path],
    enhance_all: bool,
    fields: &Map<String, Value>,
) -> BTreeSet<String> {
    let mut observed = BTreeSet::new();
    if enhance_all {
        observed.extend(fields.keys().cloned());
        return observed;
    }
    for pattern in patterns {
        for concrete in expand_in(fields, pattern) {
            if parent_chain_resolves(fields, &concrete) {
                observed.insert(concrete.to_string());
            }
        }
    }
    observed
}

fn parent_chain_resolves(fields: &Map<String, Value>, path: &Path) -> bool {
    let parent = match path.parent() {
        Some(parent) if !parent.is_empty() => parent,
        _ => return true,
    };
    matches!(
        resolve_in(fields, &parent),
        Some(Value::Object(_)) | Some(Value::Array(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields() -> Map<String, Value> {
        json!({
            "id": 1,
            "clicks": 0,
            "foo": {"a": "x", "b": "y"},
            "preferences": {
                "baz": {"value": "baz"},
                "qux": {"value": "qux"},
                "bare": {}
            },
            "uaua": {
                "one": {"value": {"val": 1}},
                "two": {}
            }
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    fn patterns(inputs: &[&str]) -> Vec<Path> {
        inputs.iter().map(|p| Path::parse(p).unwrap()).collect()
    }

    fn observed(inputs: &[&str]) -> Vec<String> {
        observed_paths(&patterns(inputs), false, &fields())
            .into_iter()
            .collect()
    }

    #[test]
    fn flat_patterns_observe_their_field() {
        assert_eq!(observed(&["clicks"]), ["clicks"]);
    }

    #[test]
    fn flat_patterns_need_no_existing_leaf() {
        assert_eq!(observed(&["missing"]), ["missing"]);
    }

    #[test]
    fn leaf_wildcards_fan_out_over_present_keys() {
        assert_eq!(observed(&["foo.*"]), ["foo.a", "foo.b"]);
    }

    #[test]
    fn middle_wildcards_require_the_parent_chain() {
        assert_eq!(
            observed(&["preferences.*.value"]),
            [
                "preferences.bare.value",
                "preferences.baz.value",
                "preferences.qux.value"
            ]
        );
        // uaua.two has no "value" container, so "uaua.two.value.val" drops out
        assert_eq!(observed(&["uaua.*.value.val"]), ["uaua.one.value.val"]);
    }

    #[test]
    fn unmatched_wildcards_observe_nothing() {
        assert!(observed(&["nothing.*"]).is_empty());
        assert!(observed(&["clicks.*"]).is_empty());
    }

    #[test]
    fn enhance_all_observes_top_level_fields_and_ignores_patterns() {
        let observed = observed_paths(&patterns(&["preferences.*.value"]), true, &fields());
        assert!(observed.contains("id"));
        assert!(observed.contains("clicks"));
        assert!(observed.contains("preferences"));
        assert!(!observed.contains("preferences.baz.value"));
    }
}
