use serde_json::{Map, Value};

pub const DEFAULT_SEPARATOR: &str = ".";

/// Flattens a nested mapping into a single level, joining keys with `.`.
pub fn flatten(tree: &Map<String, Value>) -> Map<String, Value> {
    flatten_with(tree, DEFAULT_SEPARATOR)
}

/// Flattens a nested mapping into a single level.
///
/// Every scalar leaf becomes one entry keyed by the path from the root to the
/// leaf, joined with `sep`. Empty nested mappings produce no entries. Keys
/// that already contain `sep` are not escaped, so their paths are ambiguous.
///
/// # Arguments
/// * `tree` - The mapping to flatten.
/// * `sep` - The separator placed between path segments.
///
/// # Returns
/// A new single level mapping, in the order the leaves appear in `tree`.
pub fn flatten_with(tree: &Map<String, Value>, sep: &str) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into(&mut out, tree, "", sep);
    out
}

fn flatten_into(out: &mut Map<String, Value>, tree: &Map<String, Value>, prefix: &str, sep: &str) {
    for (key, value) in tree {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}{sep}{key}")
        };

        match value {
            Value::Object(nested) => flatten_into(out, nested, &path, sep),
            leaf => {
                out.insert(path, leaf.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not a mapping: {other}"),
        }
    }

    /// Rebuilds a nested mapping by splitting every key on `sep`.
    fn regroup(flat: &Map<String, Value>, sep: &str) -> Map<String, Value> {
        let mut root = Map::new();
        for (key, value) in flat {
            let segments: Vec<&str> = key.split(sep).collect();
            let (last, parents) = segments.split_last().unwrap();

            let mut node = &mut root;
            for segment in parents {
                node = node
                    .entry(*segment)
                    .or_insert_with(|| Value::Object(Map::new()))
                    .as_object_mut()
                    .unwrap();
            }
            node.insert(last.to_string(), value.clone());
        }
        root
    }

    #[test]
    fn test_flatten_nested_model() {
        let tree = map(json!({
            "model": {"layers": 3, "hidden_units": 10},
            "seed": 42,
        }));

        let flat = flatten(&tree);
        assert_eq!(
            Value::Object(flat),
            json!({"model.layers": 3, "model.hidden_units": 10, "seed": 42})
        );
    }

    #[test]
    fn test_flatten_keeps_leaf_order() {
        let tree = map(json!({
            "seed": 1,
            "model": {"b": 1, "a": {"z": 2, "y": 3}},
            "data_pcnt": 0.5,
        }));

        let keys: Vec<String> = flatten(&tree).keys().cloned().collect();
        assert_eq!(keys, ["seed", "model.b", "model.a.z", "model.a.y", "data_pcnt"]);
    }

    #[test]
    fn test_flatten_empty() {
        assert!(flatten(&Map::new()).is_empty());
    }

    #[test]
    fn test_flatten_drops_empty_subtrees() {
        let tree = map(json!({"dataset": {}, "seed": 1}));
        assert_eq!(Value::Object(flatten(&tree)), json!({"seed": 1}));
    }

    #[test]
    fn test_flatten_flat_input_is_unchanged() {
        let tree = map(json!({"seed": 42, "use_wandb": false, "dir": null, "tags": [1, 2]}));
        assert_eq!(flatten(&tree), tree);
    }

    #[test]
    fn test_flatten_custom_separator() {
        let tree = map(json!({"model": {"kernel": "RBF", "C": 2.5}}));
        let flat = flatten_with(&tree, "/");
        assert_eq!(Value::Object(flat), json!({"model/kernel": "RBF", "model/C": 2.5}));
    }

    #[test]
    fn test_regroup_restores_tree() {
        let tree = map(json!({
            "model": {"kernel": "Poly", "C": 0.1},
            "dataset": {"dir": "/data", "opts": {"padding": 2, "color_background": true}},
            "seed": 7,
        }));

        for sep in [".", "__"] {
            assert_eq!(regroup(&flatten_with(&tree, sep), sep), tree);
        }
    }

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-z0-9 ]{0,6}".prop_map(Value::from),
        ]
    }

    /// Nested mappings whose keys never contain `.` and whose subtrees are never empty.
    fn nested_tree() -> impl Strategy<Value = Map<String, Value>> {
        let node = leaf().prop_recursive(4, 32, 4, |inner| {
            prop::collection::btree_map("[a-z_]{1,5}", inner, 1..4)
                .prop_map(|m| Value::Object(m.into_iter().collect()))
        });
        prop::collection::btree_map("[a-z_]{1,5}", node, 0..5)
            .prop_map(|m| m.into_iter().collect::<Map<String, Value>>())
    }

    fn count_leaves(tree: &Map<String, Value>) -> usize {
        tree.values()
            .map(|value| match value {
                Value::Object(nested) => count_leaves(nested),
                _ => 1,
            })
            .sum()
    }

    proptest! {
        #[test]
        fn test_regroup_restores_any_tree(tree in nested_tree()) {
            let flat = flatten(&tree);
            prop_assert_eq!(flat.len(), count_leaves(&tree));
            prop_assert!(flat.values().all(|v| !v.is_object()));
            prop_assert_eq!(regroup(&flat, "."), tree);
        }
    }

    #[test]
    fn test_separator_in_key_is_ambiguous() {
        let tree = map(json!({"a.b": 1, "a": {"b": 2}}));
        let flat = flatten(&tree);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat["a.b"], json!(2));
    }

    #[test]
    fn test_flatten_is_stateless() {
        let tree = map(json!({"model": {"layers": 3}}));
        assert_eq!(flatten(&tree), flatten(&tree));
    }
}
