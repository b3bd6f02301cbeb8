//! Function signature representation and argument binding.
//!
//! A [`Signature`] is the static description of a step function's
//! parameter list: declared names in order, trailing default values, the
//! optional `*args` / `**kwargs` collection slots, and whether the first
//! parameter is an implicit receiver. [`Signature::bind`] replays the
//! calling convention against one call's concrete arguments, producing the
//! mapping a report describes. Binding is best-effort and infallible
//! because a report must never abort the test it observes.

use std::{error::Error, fmt};

use indexmap::IndexMap;

use crate::{args::CallArgs, value::Value};

/// Mapping from parameter name to its effective bound value, in
/// first-declared-then-extra order. Produced fresh per call.
pub type BoundArgs = IndexMap<String, Value>;

/// A step function's parameter list.
///
/// Defaults are tracked for the trailing `defaults.len()` names of
/// `positional`; storing them as an aligned tail keeps the "defaults are a
/// contiguous trailing run" invariant true by construction.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Signature {
    /// Declared parameter names, in declaration order.
    positional: Vec<String>,
    /// Default values for the trailing `defaults.len()` entries of
    /// `positional`.
    defaults: Vec<Value>,
    /// Name collecting surplus positional arguments (`*args`), if any.
    var_args: Option<String>,
    /// Name collecting undeclared keyword arguments (`**kwargs`), if any.
    var_kwargs: Option<String>,
    /// True when the first declared name is conventionally a `self`/`cls`
    /// receiver. This is a naming-convention heuristic, not a semantic
    /// guarantee: an unconventionally named receiver will not be detected,
    /// and a free function whose first parameter happens to be called
    /// `self` will be misclassified. Receivers are excluded from reports.
    implicit_receiver: bool,
}

impl Signature {
    /// Creates a signature from its parts.
    ///
    /// `defaults` belong to the trailing `defaults.len()` names of
    /// `positional`. The receiver flag is derived from the first name.
    ///
    /// # Errors
    /// Fails when `defaults` outnumber `positional`, or when a variadic
    /// slot name collides with a declared name or with the other slot.
    pub fn new(
        positional: Vec<String>,
        defaults: Vec<Value>,
        var_args: Option<String>,
        var_kwargs: Option<String>,
    ) -> Result<Self, SignatureUnavailable> {
        if defaults.len() > positional.len() {
            return Err(SignatureUnavailable::invalid(
                "more defaults than declared parameters",
            ));
        }
        for slot in [&var_args, &var_kwargs] {
            if let Some(name) = slot {
                if positional.iter().any(|p| p == name) {
                    return Err(SignatureUnavailable::invalid(format!(
                        "variadic slot '{name}' collides with a declared parameter"
                    )));
                }
            }
        }
        if let (Some(a), Some(k)) = (&var_args, &var_kwargs) {
            if a == k {
                return Err(SignatureUnavailable::invalid(format!(
                    "variadic slots share the name '{a}'"
                )));
            }
        }
        let implicit_receiver = positional
            .first()
            .is_some_and(|name| name == "self" || name == "cls");
        Ok(Self {
            positional,
            defaults,
            var_args,
            var_kwargs,
            implicit_receiver,
        })
    }

    /// Parses a Python-style parameter declaration such as
    /// `"a, b=2, *rest, **extra"`.
    ///
    /// Accepted pieces: plain names, `name=literal` defaults, `name: ty`
    /// annotations (ignored), a `/` positional-only marker (ignored, since
    /// those names still bind by position), `*name` and `**name`.
    /// Surrounding parentheses are tolerated. Default expressions that are
    /// not simple literals are preserved as their source text so
    /// extraction stays total.
    ///
    /// # Errors
    /// Keyword-only parameters (names after a bare `*` or after `*name`)
    /// are rejected: they cannot be represented without breaking the
    /// trailing-defaults invariant. Duplicate names, invalid identifiers,
    /// parameters after `**name`, and a non-defaulted name following a
    /// defaulted one are rejected too.
    pub fn parse(decl: &str) -> Result<Self, SignatureUnavailable> {
        let mut decl = decl.trim();
        if let Some(inner) = decl.strip_prefix('(').and_then(|d| d.strip_suffix(')')) {
            decl = inner.trim();
        }

        let mut positional: Vec<String> = Vec::new();
        let mut defaults: Vec<Value> = Vec::new();
        let mut var_args: Option<String> = None;
        let mut var_kwargs: Option<String> = None;
        let mut past_star = false;

        for piece in split_parameters(decl) {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            if var_kwargs.is_some() {
                return Err(SignatureUnavailable::invalid(format!(
                    "parameter '{piece}' follows the keyword-collection slot"
                )));
            }
            if piece == "/" {
                // Positional-only marker: the names before it already bind
                // by position, so nothing changes for reporting.
                continue;
            }
            if piece == "*" {
                past_star = true;
                continue;
            }
            if let Some(rest) = piece.strip_prefix("**") {
                let name = identifier(rest)?;
                var_kwargs = Some(name);
                continue;
            }
            if let Some(rest) = piece.strip_prefix('*') {
                if var_args.is_some() || past_star {
                    return Err(SignatureUnavailable::invalid(
                        "multiple positional-collection slots",
                    ));
                }
                let name = identifier(rest)?;
                var_args = Some(name);
                past_star = true;
                continue;
            }
            if past_star {
                return Err(SignatureUnavailable::invalid(format!(
                    "keyword-only parameter '{}' is not supported",
                    piece.split([':', '=']).next().unwrap_or(piece).trim()
                )));
            }

            let (name_part, default_part) = match split_once_top_level(piece, '=') {
                Some((n, d)) => (n, Some(d)),
                None => (piece, None),
            };
            // Strip an annotation; the report only needs the name
            let bare = name_part.split(':').next().unwrap_or(name_part);
            let name = identifier(bare)?;
            if positional.iter().any(|p| p == &name) {
                return Err(SignatureUnavailable::invalid(format!(
                    "duplicate parameter '{name}'"
                )));
            }
            match default_part {
                Some(text) => {
                    let text = text.trim();
                    let value = Value::from_literal(text)
                        .unwrap_or_else(|| Value::Repr(text.to_owned()));
                    defaults.push(value);
                }
                None => {
                    if !defaults.is_empty() {
                        return Err(SignatureUnavailable::invalid(format!(
                            "non-default parameter '{name}' follows a default"
                        )));
                    }
                }
            }
            positional.push(name);
        }

        Self::new(positional, defaults, var_args, var_kwargs)
    }

    /// Binds one call's arguments to this signature's parameter names.
    ///
    /// The algorithm, in order:
    /// 1. pair declared names with positional values by position;
    /// 2. fill unpaired trailing names from their defaults;
    /// 3. collect surplus positional values under the `*args` name, only
    ///    when the surplus is non-empty;
    /// 4. drop the implicit receiver entirely, whichever way it was bound;
    /// 5. merge keyword values, which take precedence over positional and
    ///    default bindings for the same name; undeclared keywords are
    ///    flattened at the end in caller order.
    ///
    /// Pure and infallible: a required parameter the caller never supplied
    /// is simply absent, and surplus positionals with no `*args` slot are
    /// ignored. This reconstructs what a report should show, it does not
    /// validate the call.
    #[must_use]
    pub fn bind(&self, args: CallArgs) -> BoundArgs {
        let (mut pos_iter, kwargs) = args.into_parts();
        let mut keywords: IndexMap<String, Value> = kwargs.into_pairs().into_iter().collect();

        let mut bound = BoundArgs::with_capacity(self.positional.len() + keywords.len() + 1);
        let first_default = self.positional.len() - self.defaults.len();

        for (i, name) in self.positional.iter().enumerate() {
            let positional_value = pos_iter.next();
            let keyword_value = keywords.shift_remove(name.as_str());
            if i == 0 && self.implicit_receiver {
                // Never reported, regardless of binding path
                continue;
            }
            if let Some(value) = keyword_value {
                bound.insert(name.clone(), value);
            } else if let Some(value) = positional_value {
                bound.insert(name.clone(), value);
            } else if i >= first_default {
                bound.insert(name.clone(), self.defaults[i - first_default].clone());
            }
        }

        let surplus: Vec<Value> = pos_iter.collect();
        if !surplus.is_empty() {
            if let Some(var_args) = &self.var_args {
                bound.insert(var_args.clone(), Value::Tuple(surplus));
            }
        }

        for (name, value) in keywords {
            bound.insert(name, value);
        }

        bound
    }

    /// Declared parameter names, in declaration order.
    #[must_use]
    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// Returns the default value declared for `name`, if any.
    #[must_use]
    pub fn default_of(&self, name: &str) -> Option<&Value> {
        let first_default = self.positional.len() - self.defaults.len();
        let idx = self.positional.iter().position(|p| p == name)?;
        idx.checked_sub(first_default).map(|i| &self.defaults[i])
    }

    /// Name of the surplus-positional collection slot, if declared.
    #[must_use]
    pub fn var_args(&self) -> Option<&str> {
        self.var_args.as_deref()
    }

    /// Name of the keyword collection slot, if declared.
    #[must_use]
    pub fn var_kwargs(&self) -> Option<&str> {
        self.var_kwargs.as_deref()
    }

    /// Whether the first declared name denotes a conventional receiver.
    #[must_use]
    pub fn has_implicit_receiver(&self) -> bool {
        self.implicit_receiver
    }
}

/// Validates and owns a parameter identifier.
fn identifier(raw: &str) -> Result<String, SignatureUnavailable> {
    let name = raw.trim();
    let valid = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    if valid {
        Ok(name.to_owned())
    } else {
        Err(SignatureUnavailable::invalid(format!(
            "invalid parameter name '{name}'"
        )))
    }
}

/// Splits a declaration on top-level commas, leaving commas inside
/// brackets or string literals alone (they belong to default values).
fn split_parameters(decl: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    let mut start = 0;
    for (i, c) in decl.char_indices() {
        match in_string {
            Some(quote) => {
                if c == quote {
                    in_string = None;
                }
            }
            None => match c {
                '\'' | '"' => in_string = Some(c),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    pieces.push(&decl[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    if start < decl.len() {
        pieces.push(&decl[start..]);
    }
    pieces
}

/// Splits on the first occurrence of `sep` outside brackets and strings.
fn split_once_top_level(piece: &str, sep: char) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    for (i, c) in piece.char_indices() {
        match in_string {
            Some(quote) => {
                if c == quote {
                    in_string = None;
                }
            }
            None => match c {
                '\'' | '"' => in_string = Some(c),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth = depth.saturating_sub(1),
                c if c == sep && depth == 0 => {
                    return Some((&piece[..i], &piece[i + c.len_utf8()..]));
                }
                _ => {}
            },
        }
    }
    None
}

/// Error raised when a callable's signature cannot be introspected.
///
/// This is the single terminal error of the snapshot pipeline. It is
/// propagated unmodified to the caller, which decides whether to skip
/// reporting for that function. Everything downstream of extraction is
/// total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureUnavailable {
    callable: Option<String>,
    reason: String,
}

impl SignatureUnavailable {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self {
            callable: None,
            reason: reason.into(),
        }
    }

    pub(crate) fn with_callable(mut self, name: &str) -> Self {
        self.callable = Some(name.to_owned());
        self
    }

    /// Name of the callable whose signature was requested, when known.
    #[must_use]
    pub fn callable(&self) -> Option<&str> {
        self.callable.as_deref()
    }

    /// Human-readable reason introspection failed.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for SignatureUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.callable {
            Some(name) => write!(f, "cannot introspect signature of '{name}': {}", self.reason),
            None => write!(f, "cannot introspect signature: {}", self.reason),
        }
    }
}

impl Error for SignatureUnavailable {}
