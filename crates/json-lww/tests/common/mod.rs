#![allow(dead_code)]

use json_lww::{ManualClock, Recorder};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Small JSON documents; keys include path delimiters and the empty key.
pub fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z.\\[\\]\"]{0,3}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

/// A second replica of `recorder` as another device would load it.
pub fn fork(recorder: &Recorder<ManualClock>) -> Recorder<ManualClock> {
    Recorder::deserialize_with_clock(&recorder.serialize(), recorder.clock().clone())
        .expect("serialized recorder must load")
}
