//! Call-site argument packaging.
//!
//! `CallArgs` captures the literal positional/keyword arguments of one
//! instrumented call. It exists only for the duration of one binding
//! operation. Specific variants cover the 0/1/2-argument shapes so the
//! vast majority of step calls never allocate a `Vec`.

use std::vec::IntoIter;

use crate::value::Value;

/// The positional and keyword arguments of one call.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum CallArgs {
    /// No arguments.
    Empty,
    /// One positional argument.
    One(Value),
    /// Two positional arguments.
    Two(Value, Value),
    /// Keyword arguments only.
    Kwargs(Kwargs),
    /// The general shape: any positional arguments plus any keywords.
    ArgsKwargs {
        /// Positional arguments, in call order.
        args: Vec<Value>,
        /// Keyword arguments.
        kwargs: Kwargs,
    },
}

impl CallArgs {
    /// Packages positional and keyword arguments, picking the smallest
    /// variant that fits.
    pub fn new(args: Vec<Value>, keywords: Vec<(String, Value)>) -> Self {
        if !keywords.is_empty() {
            let kwargs = Kwargs::Pairs(keywords);
            if args.is_empty() {
                return Self::Kwargs(kwargs);
            }
            return Self::ArgsKwargs { args, kwargs };
        }
        let mut iter = args.into_iter();
        match (iter.next(), iter.next()) {
            (None, _) => Self::Empty,
            (Some(first), None) => Self::One(first),
            (Some(first), Some(second)) => {
                let mut rest: Vec<Value> = vec![first, second];
                rest.extend(iter);
                if rest.len() == 2 {
                    let mut two = rest.into_iter();
                    // Length checked just above
                    let a = two.next().expect("two positional arguments");
                    let b = two.next().expect("two positional arguments");
                    Self::Two(a, b)
                } else {
                    Self::ArgsKwargs {
                        args: rest,
                        kwargs: Kwargs::Empty,
                    }
                }
            }
        }
    }

    /// Packages positional arguments only.
    pub fn positional(args: Vec<Value>) -> Self {
        Self::new(args, Vec::new())
    }

    /// Splits into a positional iterator and the keyword values, without
    /// allocating for the common `One`/`Two` shapes.
    pub fn into_parts(self) -> (PosIter, Kwargs) {
        match self {
            Self::Empty => (PosIter::Empty, Kwargs::Empty),
            Self::One(v) => (PosIter::One(Some(v)), Kwargs::Empty),
            Self::Two(v1, v2) => (PosIter::Two(Some(v1), Some(v2)), Kwargs::Empty),
            Self::Kwargs(kwargs) => (PosIter::Empty, kwargs),
            Self::ArgsKwargs { args, kwargs } => (PosIter::Vec(args.into_iter()), kwargs),
        }
    }

    /// Returns the number of positional arguments.
    #[must_use]
    pub fn positional_len(&self) -> usize {
        match self {
            Self::Empty | Self::Kwargs(_) => 0,
            Self::One(_) => 1,
            Self::Two(_, _) => 2,
            Self::ArgsKwargs { args, .. } => args.len(),
        }
    }
}

impl From<Vec<Value>> for CallArgs {
    fn from(args: Vec<Value>) -> Self {
        Self::positional(args)
    }
}

/// Iterator over positional arguments without allocation for the small
/// shapes. Yields values by ownership transfer.
#[derive(Debug)]
pub enum PosIter {
    /// No positional arguments remain.
    Empty,
    /// At most one argument.
    One(Option<Value>),
    /// At most two arguments.
    Two(Option<Value>, Option<Value>),
    /// Arbitrary argument list.
    Vec(IntoIter<Value>),
}

impl Iterator for PosIter {
    type Item = Value;

    #[inline]
    fn next(&mut self) -> Option<Value> {
        match self {
            Self::Empty => None,
            Self::One(v) => v.take(),
            Self::Two(v1, v2) => v1.take().or_else(|| v2.take()),
            Self::Vec(iter) => iter.next(),
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Empty => (0, Some(0)),
            Self::One(v) => {
                let n = usize::from(v.is_some());
                (n, Some(n))
            }
            Self::Two(v1, v2) => {
                let n = usize::from(v1.is_some()) + usize::from(v2.is_some());
                (n, Some(n))
            }
            Self::Vec(iter) => iter.size_hint(),
        }
    }
}

impl ExactSizeIterator for PosIter {}

/// Keyword arguments of one call. Keys are unique; the order is the
/// caller's and is preserved into the report for undeclared extras.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Kwargs {
    /// No keyword arguments.
    Empty,
    /// Name/value pairs in caller order.
    Pairs(Vec<(String, Value)>),
}

impl Kwargs {
    /// Returns the number of keyword arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Pairs(pairs) => pairs.len(),
        }
    }

    /// Returns true if there are no keyword arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the keywords into their name/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, Value)> {
        match self {
            Self::Empty => Vec::new(),
            Self::Pairs(pairs) => pairs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_picks_the_smallest_shape() {
        assert_eq!(CallArgs::new(vec![], vec![]), CallArgs::Empty);
        assert_eq!(
            CallArgs::new(vec![Value::Int(1)], vec![]),
            CallArgs::One(Value::Int(1))
        );
        assert_eq!(
            CallArgs::new(vec![Value::Int(1), Value::Int(2)], vec![]),
            CallArgs::Two(Value::Int(1), Value::Int(2))
        );
        assert!(matches!(
            CallArgs::new(vec![], vec![("a".to_owned(), Value::Int(1))]),
            CallArgs::Kwargs(_)
        ));
    }

    #[test]
    fn into_parts_yields_positionals_in_order() {
        let (pos, kwargs) = CallArgs::new(
            vec![Value::Int(1), Value::Int(2), Value::Int(3)],
            vec![("k".to_owned(), Value::Int(4))],
        )
        .into_parts();
        assert_eq!(pos.collect::<Vec<_>>(), vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(kwargs.len(), 1);
    }
}
