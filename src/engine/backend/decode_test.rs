use super::decode::decode_cell;
use super::native_type::map_native_type;
use crate::engine::types::Cell;
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};

fn decode(native_type: &str, value: Value) -> Result<Cell, String> {
    decode_cell(&value, map_native_type(native_type).unwrap())
}

#[test]
fn null_decodes_to_null_for_every_type() {
    for native_type in ["bigint", "varchar", "blob", "list<int>", "timestamp", "uuid"] {
        assert_eq!(decode(native_type, Value::Null).unwrap(), Cell::Null);
    }
}

#[test]
fn integers_respect_width() {
    assert_eq!(decode("int", json!(-2147483648i64)).unwrap(), Cell::Integer(i32::MIN));
    assert!(decode("int", json!(2147483648i64)).is_err());
    assert_eq!(decode("bigint", json!(i64::MAX)).unwrap(), Cell::Long(i64::MAX));
    assert_eq!(
        decode("bigint", json!("-9223372036854775808")).unwrap(),
        Cell::Long(i64::MIN)
    );
}

#[test]
fn decimals_and_non_finite_doubles() {
    assert_eq!(decode("decimal", json!(0)).unwrap(), Cell::Double(0.0));
    assert_eq!(decode("double", json!("Infinity")).unwrap(), Cell::Double(f64::INFINITY));
    match decode("double", json!("NaN")).unwrap() {
        Cell::Double(d) => assert!(d.is_nan()),
        other => panic!("expected double, got {:?}", other),
    }
    assert_eq!(decode("real", json!(1.5)).unwrap(), Cell::Float(1.5));
}

#[test]
fn blobs_are_base64() {
    assert_eq!(decode("blob", json!("AA==")).unwrap(), Cell::Binary(vec![0]));
    assert_eq!(
        decode("blob", json!("MDEyMzQ=")).unwrap(),
        Cell::Binary(b"01234".to_vec())
    );
    assert!(decode("blob", json!("not base64!")).is_err());
}

#[test]
fn timestamps_compare_as_instants() {
    let cell = decode("timestamp", json!("1970-01-01 00:00:00.0")).unwrap();
    assert_eq!(cell, Cell::from(Utc.timestamp_opt(0, 0).single().unwrap()));
    let offset = decode("timestamp", json!("1970-01-01T01:00:00+01:00")).unwrap();
    assert_eq!(cell, offset);
}

#[test]
fn stringified_scalars_keep_their_text() {
    assert_eq!(
        decode("varint", json!(-9223372036854775808i64)).unwrap(),
        Cell::from("-9223372036854775808")
    );
    assert_eq!(decode("inet", json!("0.0.0.0")).unwrap(), Cell::from("0.0.0.0"));
}

#[test]
fn collections_decode_to_canonical_text() {
    assert_eq!(
        decode("map<text, int>", json!({"b": 2, "a": 1})).unwrap(),
        Cell::from(r#"{"a":1,"b":2}"#)
    );
    assert_eq!(decode("set<int>", json!([0])).unwrap(), Cell::from("[0]"));
}

#[test]
fn type_mismatch_is_an_error() {
    assert!(decode("varchar", json!(3)).is_err());
    assert!(decode("boolean", json!("true")).is_err());
}
