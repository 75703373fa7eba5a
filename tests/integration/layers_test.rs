//! Integration tests for layered configuration resolution.

use serde_json::json;

use hatch::{ConfigLayer, ErrorKind, FoldDirection, HatchResult, LayeredConfig, Value};

fn concat(
    prev: Option<Vec<Value>>,
    anchor: Option<&Value>,
    _origin: &str,
) -> HatchResult<Option<Vec<Value>>> {
    let Some(items) = anchor.and_then(Value::as_list) else {
        return Ok(prev);
    };
    let mut acc = prev.unwrap_or_default();
    acc.extend(items.iter().cloned());
    Ok(Some(acc))
}

fn from_json(layers: Vec<(&str, serde_json::Value)>) -> LayeredConfig {
    LayeredConfig::new(
        layers
            .into_iter()
            .map(|(origin, json)| ConfigLayer::from_json(origin, json).unwrap())
            .collect(),
    )
}

#[test]
fn test_fold_concat_ignores_absent_layers() {
    let with_gap = from_json(vec![
        ("base", json!({ "tags": ["a", "b"] })),
        ("gap", json!({ "other": 1 })),
        ("app", json!({ "tags": ["c"] })),
    ]);
    let without_gap = from_json(vec![
        ("base", json!({ "tags": ["a", "b"] })),
        ("app", json!({ "tags": ["c"] })),
    ]);

    let expected = vec![Value::from("a"), Value::from("b"), Value::from("c")];
    for config in [with_gap, without_gap] {
        let tags = config
            .compose("tags", FoldDirection::BottomUp, Vec::new(), concat)
            .unwrap();
        assert_eq!(tags, expected);
    }
}

#[test]
fn test_bail_directions_mirror() {
    let layers = vec![
        ("base", json!({ "port": 3000, "host": "0.0.0.0" })),
        ("env", json!({ "port": null })),
        ("app", json!({ "port": 8080 })),
    ];
    let forward = from_json(layers.clone());
    let reversed = from_json(layers.into_iter().rev().collect());

    for key in ["port", "host", "missing"] {
        assert_eq!(
            forward.bail_top(key, Value::from("default")).unwrap(),
            reversed.bail_bottom(key, Value::from("default")).unwrap(),
            "key {key}"
        );
    }
    assert_eq!(forward.bail_top("port", Value::Null).unwrap(), Value::from(8080_i64));
    assert_eq!(forward.bail_bottom("port", Value::Null).unwrap(), Value::from(3000_i64));
}

#[test]
fn test_explicit_falsy_values_are_not_absent() {
    let config = from_json(vec![
        ("base", json!({ "flag": true, "count": 5, "name": "base" })),
        ("app", json!({ "flag": false, "count": 0, "name": "" })),
    ]);

    assert_eq!(config.bail_top("flag", Value::from(true)).unwrap(), Value::from(false));
    assert_eq!(config.bail_top("count", Value::from(9_i64)).unwrap(), Value::from(0_i64));
    assert_eq!(config.bail_top("name", Value::from("x")).unwrap(), Value::from(""));
}

#[test]
fn test_every_resolution_needs_a_layer() {
    let empty = LayeredConfig::new(Vec::new());

    let errors = [
        empty.bail_top("k", Value::Null).unwrap_err(),
        empty.bail_bottom("k", Value::Null).unwrap_err(),
        empty
            .compose("k", FoldDirection::TopDown, Vec::new(), concat)
            .unwrap_err(),
    ];
    for err in errors {
        assert_eq!(err.kind, ErrorKind::NotLoaded);
    }
}

#[test]
fn test_namespaced_view_shares_layers() {
    let config = from_json(vec![
        ("base", json!({ "hatch": { "server": { "port": 3000 } } })),
        ("app", json!({ "hatch": { "server": { "port": 8080 } } })),
    ]);

    let server = config.namespace("hatch").namespace("server");
    assert_eq!(server.bail_bottom("port", Value::Null).unwrap(), Value::from(3000_i64));
    assert_eq!(server.origins(), vec!["base", "app"]);
}

#[test]
fn test_non_object_layer_is_rejected() {
    let err = ConfigLayer::from_json("list.json", json!([1, 2])).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidLayer);
    assert!(err.message.contains("list.json"));
}
