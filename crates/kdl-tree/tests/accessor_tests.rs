use kdl_tree::accessor::*;
use kdl_tree::{KdlError, Node, Value, ValueKind};
use num_bigint::BigInt;

fn host() -> Node {
    let mut host = Node::new("host")
        .with_argument("example1")
        .with_argument(8080)
        .with_property("enabled", true)
        .with_property("port", 22)
        .with_property("ratio", 0.5);
    host.push_kv("user", "root").push_child(Node::new("bare"));
    host
}

// ============================================================================
// get
// ============================================================================

#[test]
fn get_by_index_and_by_key() {
    let host = host();
    assert_eq!(get(&host, 0, as_str).unwrap(), "example1");
    assert_eq!(get(&host, 1usize, as_i64).unwrap(), 8080);
    assert_eq!(get(&host, "port", as_int).unwrap(), 22);
    assert_eq!(get(&host, String::from("ratio"), as_f64).unwrap(), 0.5);
    assert!(get(&host, "enabled", as_bool).unwrap());
}

#[test]
fn missing_entries_are_not_found() {
    let host = host();
    let err = get(&host, "missing", as_string).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "property missing: no such key");

    assert!(get(&host, 7, as_string).unwrap_err().is_not_found());
}

#[test]
fn wrong_kind_is_a_mismatch_not_a_missing_key() {
    let host = host();
    let err = get(&host, "port", as_string).unwrap_err();
    assert!(!err.is_not_found());
    assert!(matches!(
        err,
        KdlError::KindMismatch {
            expected: "a string",
            found: "integer"
        }
    ));
}

#[test]
fn negative_index_is_invalid() {
    let mut host = host();
    assert!(matches!(get(&host, -1, as_str), Err(KdlError::InvalidIndex(-1))));
    assert!(matches!(set(&mut host, -2i64, 1), Err(KdlError::InvalidIndex(-2))));
    assert_eq!(host.arguments.len(), 2);
}

#[test]
fn unallocatable_index_is_invalid() {
    let mut host = host();
    assert!(matches!(set(&mut host, i64::MAX, 1), Err(KdlError::InvalidIndex(i64::MAX))));
    assert!(matches!(set(&mut host, usize::MAX, 1), Err(KdlError::InvalidIndex(_))));
    assert_eq!(host.arguments.len(), 2);
}

// ============================================================================
// set
// ============================================================================

#[test]
fn set_past_the_end_pads_with_nulls() {
    let mut node = Node::new("n").with_argument("first");
    set(&mut node, 3, "fourth").unwrap();
    assert_eq!(
        node.arguments,
        [
            Value::string("first"),
            Value::null(),
            Value::null(),
            Value::string("fourth"),
        ]
    );
}

#[test]
fn set_overwrites_in_place() {
    let mut node = Node::new("n").with_argument(1).with_property("a", 1).with_property("b", 2);
    set(&mut node, 0, 10).unwrap();
    set(&mut node, "a", "changed").unwrap();
    set(&mut node, "c", ()).unwrap();

    assert_eq!(node.arguments, [Value::integer(10)]);
    assert_eq!(node.property("a"), Some(&Value::string("changed")));
    assert_eq!(node.property_order().collect::<Vec<_>>(), ["a", "b", "c"]);
}

// ============================================================================
// Child values
// ============================================================================

#[test]
fn child_value_reads_first_argument() {
    let host = host();
    assert_eq!(get_child_value(&host, "user", as_str).unwrap(), "root");
}

#[test]
fn child_value_missing_child_or_argument_is_not_found() {
    let host = host();
    assert!(get_child_value(&host, "nope", as_str).unwrap_err().is_not_found());
    assert!(get_child_value(&host, "bare", as_str).unwrap_err().is_not_found());
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn oversized_integer_falls_back_to_bigint() {
    let v = Value::from_number_literal("170141183460469231731687303715884105727").unwrap();
    assert!(matches!(v.kind(), ValueKind::BigInteger(_)));

    let err = as_i64(&v).unwrap_err();
    assert!(matches!(err, KdlError::Range { target: "i64", .. }));
    assert_eq!(as_big_int(&v).unwrap(), BigInt::from(i128::MAX));
}

#[test]
fn narrowing_reports_range_errors() {
    assert!(matches!(as_i32(&Value::integer(i64::MAX)), Err(KdlError::Range { target: "i32", .. })));
    assert!(matches!(as_u64(&Value::integer(-1)), Err(KdlError::Range { target: "u64", .. })));
    assert_eq!(as_u64(&Value::from(u64::MAX)).unwrap(), u64::MAX);
}

#[test]
fn imprecise_big_float_still_offers_a_value() {
    let v = Value::from_number_literal("0.1000000000000000000000001").unwrap();
    let err = as_f64(&v).unwrap_err();
    assert!(matches!(err, KdlError::PrecisionLoss { .. }));
    let approx = err.best_effort_f64().unwrap();
    assert!((approx - 0.1).abs() < 1e-12);
}

// ============================================================================
// Combinators
// ============================================================================

#[test]
fn cast_all_converts_every_argument() {
    let node = Node::new("ports").with_argument(22).with_argument(80).with_argument(443);
    assert_eq!(cast_all(&node.arguments, as_i64).unwrap(), [22, 80, 443]);
}

#[test]
fn cast_all_stops_at_the_first_failure() {
    let node = Node::new("ports").with_argument(22).with_argument("http");
    let err = cast_all(&node.arguments, as_i64).unwrap_err();
    assert!(matches!(err.root_cause(), KdlError::KindMismatch { .. }));
    assert!(err.to_string().starts_with("casting value string(\"http\")"));
}

#[test]
fn optional_extractor_reads_null_as_none() {
    let node = Node::new("n").with_argument(()).with_argument(5);
    let opt_int = as_option(as_i64);
    assert_eq!(get(&node, 0, &opt_int).unwrap(), None);
    assert_eq!(get(&node, 1, &opt_int).unwrap(), Some(5));
}
