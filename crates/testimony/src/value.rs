//! Runtime value model for report rendering.
//!
//! `Value` stands in for "an arbitrary runtime value seen at a call site".
//! It owns all its data; lists and dicts use shared interior mutability so
//! self-referential containers are expressible, and the repr machinery
//! detects those cycles instead of recursing forever.

use std::{
    cell::RefCell,
    fmt::{self, Write},
    rc::Rc,
};

use ahash::AHashSet;

/// A runtime value captured from an instrumented call.
///
/// Modeled on Python's value universe because that is what test reports end
/// up describing: scalars, text, binary payloads, containers, and a `Repr`
/// escape hatch for anything that only has an opaque rendering.
///
/// # Cycles
///
/// `List` and `Dict` are shared mutable containers, so a value can contain
/// itself. All rendering goes through cycle detection and prints `[...]` /
/// `{...}` placeholders on revisit, keeping every rendering path total.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    /// The `None` singleton.
    None,
    /// Boolean, rendered `True` / `False`.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit IEEE 754 float.
    Float(f64),
    /// Textual data (UTF-8).
    Str(String),
    /// Opaque binary payload.
    Bytes(Vec<u8>),
    /// Mutable binary payload.
    ByteArray(Vec<u8>),
    /// Mutable sequence. Shared so self-reference is possible.
    List(Rc<RefCell<Vec<Value>>>),
    /// Immutable sequence.
    Tuple(Vec<Value>),
    /// Insertion-ordered mapping. Shared so self-reference is possible.
    Dict(Rc<RefCell<Vec<(Value, Value)>>>),
    /// Unordered collection of unique elements.
    Set(Vec<Value>),
    /// A type object, rendered `<class 'name'>`.
    Type(String),
    /// A named callable, rendered `<function name>`.
    Function(String),
    /// An exception value with its type name and optional message.
    Exception {
        /// Exception type name, e.g. `AssertionError`.
        exc_type: String,
        /// Optional message argument.
        message: Option<String>,
    },
    /// Fallback for values that only have an opaque rendering, such as
    /// instances that cannot be reconstructed. Contains the rendering.
    Repr(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Type(t) => write!(f, "<class '{t}'>"),
            _ => {
                let mut visited = AHashSet::new();
                self.repr_fmt(f, &mut visited)
            }
        }
    }
}

impl Value {
    /// Creates a `List` value from a vector of elements.
    pub fn list(items: Vec<Self>) -> Self {
        Self::List(Rc::new(RefCell::new(items)))
    }

    /// Creates a `Tuple` value from a vector of elements.
    pub fn tuple(items: Vec<Self>) -> Self {
        Self::Tuple(items)
    }

    /// Creates a `Dict` value from key/value pairs, preserving order.
    pub fn dict(pairs: Vec<(Self, Self)>) -> Self {
        Self::Dict(Rc::new(RefCell::new(pairs)))
    }

    /// Returns the repr string for this value.
    ///
    /// Never fails: writing to a `String` is infallible and cycles are cut
    /// with placeholders.
    #[must_use]
    pub fn py_repr(&self) -> String {
        let mut s = String::new();
        let mut visited = AHashSet::new();
        self.repr_fmt(&mut s, &mut visited)
            .expect("writing repr to a String never fails");
        s
    }

    /// Returns the type name for this value (e.g. `"int"`, `"bytes"`).
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::ByteArray(_) => "bytearray",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
            Self::Dict(_) => "dict",
            Self::Set(_) => "set",
            Self::Type(_) => "type",
            Self::Function(_) => "function",
            Self::Exception { .. } => "Exception",
            Self::Repr(_) => "repr",
        }
    }

    /// Parses a simple literal as it appears in a parameter declaration.
    ///
    /// Understands `None`, `True`, `False`, integers, floats, quoted
    /// strings with basic backslash escapes, and the empty containers
    /// `[]`, `()` and `{}`. Returns `None` for anything more exotic.
    #[must_use]
    pub fn from_literal(text: &str) -> Option<Self> {
        let t = text.trim();
        match t {
            "None" => return Some(Self::None),
            "True" => return Some(Self::Bool(true)),
            "False" => return Some(Self::Bool(false)),
            "[]" => return Some(Self::list(Vec::new())),
            "()" => return Some(Self::Tuple(Vec::new())),
            "{}" => return Some(Self::dict(Vec::new())),
            _ => {}
        }
        if let Some(s) = parse_quoted(t) {
            return Some(Self::Str(s));
        }
        if let Ok(i) = t.parse::<i64>() {
            return Some(Self::Int(i));
        }
        // Reject named floats like "inf"/"nan": a numeric literal starts
        // with a digit, a sign, or a dot.
        let numeric_start = t
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-' || c == '.');
        if numeric_start {
            if let Ok(f) = t.parse::<f64>() {
                return Some(Self::Float(f));
            }
        }
        None
    }

    fn repr_fmt(&self, f: &mut impl Write, visited: &mut AHashSet<usize>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => float_repr_fmt(*v, f),
            Self::Str(s) => string_repr_fmt(s, f),
            Self::Bytes(b) => bytes_repr_fmt(b, f),
            Self::ByteArray(b) => {
                f.write_str("bytearray(")?;
                bytes_repr_fmt(b, f)?;
                f.write_char(')')
            }
            Self::List(items) => {
                let addr = Rc::as_ptr(items) as usize;
                if !visited.insert(addr) {
                    return f.write_str("[...]");
                }
                f.write_char('[')?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.repr_fmt(f, visited)?;
                }
                f.write_char(']')?;
                visited.remove(&addr);
                Ok(())
            }
            Self::Tuple(items) => {
                f.write_char('(')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.repr_fmt(f, visited)?;
                }
                // Single-element tuples keep the disambiguating comma
                if items.len() == 1 {
                    f.write_char(',')?;
                }
                f.write_char(')')
            }
            Self::Dict(pairs) => {
                let addr = Rc::as_ptr(pairs) as usize;
                if !visited.insert(addr) {
                    return f.write_str("{...}");
                }
                f.write_char('{')?;
                for (i, (k, v)) in pairs.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    k.repr_fmt(f, visited)?;
                    f.write_str(": ")?;
                    v.repr_fmt(f, visited)?;
                }
                f.write_char('}')?;
                visited.remove(&addr);
                Ok(())
            }
            Self::Set(items) => {
                if items.is_empty() {
                    return f.write_str("set()");
                }
                f.write_char('{')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.repr_fmt(f, visited)?;
                }
                f.write_char('}')
            }
            Self::Type(t) => write!(f, "<class '{t}'>"),
            Self::Function(name) => write!(f, "<function {name}>"),
            Self::Exception { exc_type, message } => {
                write!(f, "{exc_type}(")?;
                if let Some(message) = message {
                    string_repr_fmt(message, f)?;
                }
                f.write_char(')')
            }
            Self::Repr(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

/// Formats a float the way Python's repr does: integral values keep a
/// trailing `.0`, non-finite values render as `inf` / `-inf` / `nan`.
fn float_repr_fmt(v: f64, f: &mut impl Write) -> fmt::Result {
    if v.is_nan() {
        return f.write_str("nan");
    }
    if v.is_infinite() {
        return f.write_str(if v > 0.0 { "inf" } else { "-inf" });
    }
    let s = v.to_string();
    f.write_str(&s)?;
    if !s.contains('.') && !s.contains('e') {
        f.write_str(".0")?;
    }
    Ok(())
}

/// Writes a Python-style quoted repr of a string.
///
/// Prefers single quotes, switching to double quotes when the text contains
/// a single quote but no double quote. Control characters are escaped as
/// `\xNN`; printable text, including non-ASCII, passes through unchanged.
pub(crate) fn string_repr_fmt(s: &str, f: &mut impl Write) -> fmt::Result {
    let has_single = s.contains('\'');
    let has_double = s.contains('"');
    let quote = if has_single && !has_double { '"' } else { '\'' };

    f.write_char(quote)?;
    for ch in s.chars() {
        match ch {
            '\\' => f.write_str("\\\\")?,
            '\t' => f.write_str("\\t")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            c if c == quote => {
                f.write_char('\\')?;
                f.write_char(c)?;
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => write!(f, "\\x{:02x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char(quote)
}

/// Writes a Python-style `b'...'` repr of a byte sequence.
pub(crate) fn bytes_repr_fmt(bytes: &[u8], f: &mut impl Write) -> fmt::Result {
    let has_single = bytes.contains(&b'\'');
    let has_double = bytes.contains(&b'"');
    let quote = if has_single && !has_double { '"' } else { '\'' };

    f.write_char('b')?;
    f.write_char(quote)?;
    for &byte in bytes {
        match byte {
            b'\\' => f.write_str("\\\\")?,
            b'\t' => f.write_str("\\t")?,
            b'\n' => f.write_str("\\n")?,
            b'\r' => f.write_str("\\r")?,
            b'\'' if quote == '\'' => f.write_str("\\'")?,
            b'"' if quote == '"' => f.write_str("\\\"")?,
            // Printable ASCII
            0x20..=0x7e => f.write_char(byte as char)?,
            _ => write!(f, "\\x{byte:02x}")?,
        }
    }
    f.write_char(quote)
}

/// Parses a single- or double-quoted literal, handling the escapes that
/// appear in realistic default declarations. Returns `None` when the text
/// is not a complete quoted literal.
fn parse_quoted(t: &str) -> Option<String> {
    let mut chars = t.chars();
    let quote = chars.next()?;
    if quote != '\'' && quote != '"' {
        return None;
    }
    let mut out = String::with_capacity(t.len());
    loop {
        match chars.next()? {
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                '0' => out.push('\0'),
                other => out.push(other),
            },
            c if c == quote => {
                // The closing quote must end the literal
                return chars.next().is_none().then_some(out);
            }
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_repr_keeps_trailing_zero() {
        assert_eq!(Value::Float(1.0).py_repr(), "1.0");
        assert_eq!(Value::Float(2.5).py_repr(), "2.5");
    }

    #[test]
    fn float_repr_non_finite() {
        assert_eq!(Value::Float(f64::NAN).py_repr(), "nan");
        assert_eq!(Value::Float(f64::INFINITY).py_repr(), "inf");
        assert_eq!(Value::Float(f64::NEG_INFINITY).py_repr(), "-inf");
    }

    #[test]
    fn string_repr_prefers_single_quotes() {
        assert_eq!(Value::from("hi").py_repr(), "'hi'");
        assert_eq!(Value::from("it's").py_repr(), "\"it's\"");
        assert_eq!(Value::from("a\nb").py_repr(), "'a\\nb'");
    }

    #[test]
    fn tuple_repr_single_element_keeps_comma() {
        assert_eq!(Value::tuple(vec![Value::Int(2)]).py_repr(), "(2,)");
        assert_eq!(
            Value::tuple(vec![Value::Int(2), Value::Int(3)]).py_repr(),
            "(2, 3)"
        );
    }

    #[test]
    fn from_literal_scalars() {
        assert_eq!(Value::from_literal("None"), Some(Value::None));
        assert_eq!(Value::from_literal("True"), Some(Value::Bool(true)));
        assert_eq!(Value::from_literal("-3"), Some(Value::Int(-3)));
        assert_eq!(Value::from_literal("2.5"), Some(Value::Float(2.5)));
        assert_eq!(Value::from_literal("'hi'"), Some(Value::from("hi")));
        assert_eq!(Value::from_literal("\"a'b\""), Some(Value::from("a'b")));
        assert_eq!(Value::from_literal("object()"), None);
        assert_eq!(Value::from_literal("inf"), None);
    }

    #[test]
    fn from_literal_rejects_unterminated_string() {
        assert_eq!(Value::from_literal("'open"), None);
        assert_eq!(Value::from_literal("'a' + 'b'"), None);
    }
}
