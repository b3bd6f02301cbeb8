use pretty_assertions::assert_eq;
use testimony::{represent, Value};

/// Rendering shapes and totality of `represent` / `Value::py_repr`.

#[test]
fn scalars() {
    assert_eq!(represent(&Value::None), "None");
    assert_eq!(represent(&Value::Bool(true)), "True");
    assert_eq!(represent(&Value::Bool(false)), "False");
    assert_eq!(represent(&Value::Int(123)), "123");
    assert_eq!(represent(&Value::Float(1.0)), "1.0");
}

#[test]
fn text_is_quoted_and_distinct_from_numbers() {
    assert_eq!(represent(&Value::from("hello")), "'hello'");
    assert_eq!(represent(&Value::from("123")), "'123'");
    assert_ne!(represent(&Value::from("123")), represent(&Value::Int(123)));
}

#[test]
fn unicode_text_passes_through() {
    assert_eq!(represent(&Value::from("привет")), "'привет'");
}

#[test]
fn binary_never_leaks_bytes() {
    let rendered = represent(&Value::Bytes(vec![0xd0, 0xbf]));
    assert_eq!(rendered, "<class 'bytes'>");
    let rendered = represent(&Value::ByteArray(vec![0xd0, 0xbf]));
    assert_eq!(rendered, "<class 'bytearray'>");
}

#[test]
fn containers() {
    assert_eq!(
        represent(&Value::list(vec![Value::Int(1), Value::from("a")])),
        "[1, 'a']"
    );
    assert_eq!(
        represent(&Value::dict(vec![(Value::from("k"), Value::Int(1))])),
        "{'k': 1}"
    );
    assert_eq!(represent(&Value::Set(vec![])), "set()");
    assert_eq!(
        represent(&Value::tuple(vec![Value::Int(2), Value::Int(3)])),
        "(2, 3)"
    );
}

#[test]
fn nested_bytes_use_bytes_repr() {
    // The type-descriptor rule applies at the top level only; nested
    // binary data renders as its container repr element
    assert_eq!(
        represent(&Value::list(vec![Value::Bytes(vec![b'h', b'i', 0x01])])),
        "[b'hi\\x01']"
    );
}

#[test]
fn self_referential_list_renders_with_placeholder() {
    let inner = Value::list(vec![Value::Int(1)]);
    if let Value::List(items) = &inner {
        items.borrow_mut().push(inner.clone());
    }
    assert_eq!(represent(&inner), "[1, [...]]");
}

#[test]
fn self_referential_dict_renders_with_placeholder() {
    let d = Value::dict(vec![(Value::from("k"), Value::None)]);
    if let Value::Dict(pairs) = &d {
        let cycle = d.clone();
        pairs.borrow_mut()[0].1 = cycle;
    }
    assert_eq!(represent(&d), "{'k': {...}}");
}

#[test]
fn shared_but_acyclic_containers_render_fully() {
    // The same list twice in one parent is sharing, not a cycle
    let shared = Value::list(vec![Value::Int(1)]);
    let parent = Value::list(vec![shared.clone(), shared]);
    assert_eq!(represent(&parent), "[[1], [1]]");
}

#[test]
fn opaque_instances_use_their_repr() {
    let obj = Value::Repr("<Unconstructable object at 0x7f>".to_owned());
    assert_eq!(represent(&obj), "<Unconstructable object at 0x7f>");
}

#[test]
fn types_functions_and_exceptions() {
    assert_eq!(represent(&Value::Type("bytearray".to_owned())), "<class 'bytearray'>");
    assert_eq!(represent(&Value::Function("login".to_owned())), "<function login>");
    assert_eq!(
        represent(&Value::Exception {
            exc_type: "AssertionError".to_owned(),
            message: Some("boom".to_owned()),
        }),
        "AssertionError('boom')"
    );
    assert_eq!(
        represent(&Value::Exception {
            exc_type: "StopIteration".to_owned(),
            message: None,
        }),
        "StopIteration()"
    );
}

#[test]
fn represent_is_deterministic() {
    let value = Value::dict(vec![
        (Value::from("b"), Value::Int(2)),
        (Value::from("a"), Value::Int(1)),
    ]);
    assert_eq!(represent(&value), represent(&value));
    // Insertion order is preserved, not sorted
    assert_eq!(represent(&value), "{'b': 2, 'a': 1}");
}
