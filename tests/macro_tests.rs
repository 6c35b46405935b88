use btoon::{btoon, decode, encode, BtoonMap, Value};

#[test]
fn test_macro_primitives() {
    assert_eq!(btoon!(nil), Value::Nil);
    assert_eq!(btoon!(true), Value::Bool(true));
    assert_eq!(btoon!(false), Value::Bool(false));
    assert_eq!(btoon!(42), Value::Uint(42));
    assert_eq!(btoon!(-42), Value::Int(-42));
    assert_eq!(btoon!(3.5), Value::Float(3.5));
    assert_eq!(btoon!("hello"), Value::String("hello".to_string()));
}

#[test]
fn test_macro_expressions() {
    let name = "Alice".to_string();
    assert_eq!(btoon!(name), Value::String("Alice".to_string()));

    let count = 7u64;
    assert_eq!(btoon!(count), Value::Uint(7));
}

#[test]
fn test_macro_arrays() {
    assert_eq!(btoon!([]), Value::Array(vec![]));

    let arr = btoon!([1, "two", nil, true]);
    let items = arr.as_array().unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(items[0], Value::Uint(1));
    assert_eq!(items[1], Value::String("two".to_string()));
    assert_eq!(items[2], Value::Nil);
    assert_eq!(items[3], Value::Bool(true));
}

#[test]
fn test_macro_maps_sort_keys() {
    assert_eq!(btoon!({}), Value::Map(BtoonMap::new()));

    let obj = btoon!({
        "zeta": 1,
        "alpha": 2,
        "mid": 3
    });
    let keys: Vec<_> = obj.as_map().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
}

#[test]
fn test_macro_nested_structures() {
    let doc = btoon!({
        "matrix": [[1, 2], [3, 4]],
        "meta": {"empty": {}, "list": []},
        "records": [
            {"id": 1, "ok": true},
            {"id": 2, "ok": false}
        ]
    });

    let map = doc.as_map().unwrap();
    assert!(map.get("matrix").unwrap().is_array());
    assert!(map.get("meta").unwrap().is_map());

    // Macro output feeds straight into the codec.
    let bytes = encode(&doc).unwrap();
    assert_eq!(decode(&bytes).unwrap(), doc);
}

#[test]
fn test_macro_trailing_commas() {
    let arr = btoon!([1, 2, 3,]);
    assert_eq!(arr.as_array().unwrap().len(), 3);

    let obj = btoon!({"a": 1, "b": 2,});
    assert_eq!(obj.as_map().unwrap().len(), 2);
}
