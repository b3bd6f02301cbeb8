//! Canonical value rendering for report output.

use crate::value::Value;

/// Renders a value into its canonical display string.
///
/// Total function: it never fails, for any input, because report
/// generation must never abort the test it is reporting. Three rules,
/// first match wins:
///
/// - textual data is wrapped in single quotes with the contents verbatim;
///   embedded control characters are left as-is;
/// - binary data renders as its type descriptor only (`<class 'bytes'>`),
///   never the raw bytes, so non-text payloads cannot corrupt a report;
/// - everything else falls back to its default repr rendering.
///
/// The quoting distinguishes text from everything else: `represent` of the
/// string `"123"` is `'123'` while the integer `123` renders bare.
#[must_use]
pub fn represent(value: &Value) -> String {
    match value {
        Value::Str(s) => format!("'{s}'"),
        Value::Bytes(_) | Value::ByteArray(_) => format!("<class '{}'>", value.type_name()),
        other => other.py_repr(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_quoted_verbatim() {
        assert_eq!(represent(&Value::from("hello")), "'hello'");
        // Control characters pass through unescaped at the top level
        assert_eq!(represent(&Value::from("a\nb")), "'a\nb'");
        assert_eq!(represent(&Value::from("привет")), "'привет'");
    }

    #[test]
    fn binary_shows_only_the_type() {
        assert_eq!(represent(&Value::Bytes(vec![0xd0, 0xbf])), "<class 'bytes'>");
        assert_eq!(
            represent(&Value::ByteArray(vec![0xd0, 0xbf])),
            "<class 'bytearray'>"
        );
    }

    #[test]
    fn fallback_uses_repr() {
        assert_eq!(represent(&Value::None), "None");
        assert_eq!(represent(&Value::Int(123)), "123");
        assert_eq!(represent(&Value::Type("int".to_owned())), "<class 'int'>");
        assert_eq!(
            represent(&Value::Function("represent".to_owned())),
            "<function represent>"
        );
        assert_eq!(
            represent(&Value::list(vec![Value::Function("f".to_owned())])),
            "[<function f>]"
        );
    }

    #[test]
    fn strings_nested_in_containers_are_escaped() {
        // Only the top-level text rule is verbatim; nested strings use repr
        assert_eq!(
            represent(&Value::list(vec![Value::from("a\nb")])),
            "['a\\nb']"
        );
    }
}
