//! The parameter snapshot facade: extract, bind, represent.

use std::{
    hash::{Hash, Hasher},
    sync::{Arc, RwLock},
};

use ahash::{AHashMap, AHasher};
use indexmap::IndexMap;

use crate::{
    args::CallArgs,
    represent::represent,
    signature::{Signature, SignatureUnavailable},
};

/// The final artifact handed to a reporting sink: parameter name to
/// canonical display string, in first-declared-then-extra order. Callers
/// must not depend on the order for correctness.
pub type ParameterSnapshot = IndexMap<String, String>;

/// A callable instrumented as a test step or fixture.
///
/// The snapshot pipeline never executes the callable; it only needs a name
/// for diagnostics and the parameter declaration to reconstruct bindings
/// from.
pub trait StepCallable {
    /// Name used in reports and error messages.
    fn name(&self) -> &str;

    /// The Python-style parameter declaration, e.g. `"a, b=2, *rest"`.
    ///
    /// Returns `None` for callables whose parameters genuinely cannot be
    /// introspected (native functions, opaque wrappers); extraction then
    /// fails with [`SignatureUnavailable`].
    fn parameters(&self) -> Option<&str>;

    /// Identity of this callable for signature caching.
    ///
    /// Two callables with the same identity must have the same signature.
    /// The default derives it from the name and declaration text, which is
    /// stable and cheap; recomputing a signature on a collision-free miss
    /// is idempotent anyway.
    fn identity(&self) -> u64 {
        let mut hasher = AHasher::default();
        self.name().hash(&mut hasher);
        self.parameters().hash(&mut hasher);
        hasher.finish()
    }
}

/// A plain step declaration: a name plus an optional parameter list.
///
/// This is the bookkeeping record a test framework keeps per decorated
/// function; frameworks with richer metadata can implement
/// [`StepCallable`] on their own types instead.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FuncDecl {
    name: String,
    parameters: Option<String>,
}

impl FuncDecl {
    /// Creates a declaration with a known parameter list.
    pub fn new(name: impl Into<String>, parameters: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Some(parameters.into()),
        }
    }

    /// Creates a declaration for a callable that cannot be introspected.
    pub fn opaque(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: None,
        }
    }
}

impl StepCallable for FuncDecl {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Option<&str> {
        self.parameters.as_deref()
    }
}

/// Derives the [`Signature`] of a callable without executing it.
///
/// # Errors
/// Returns [`SignatureUnavailable`] when the callable exposes no parameter
/// declaration or the declaration does not fit the signature model. The
/// error is propagated unmodified; the caller decides whether to skip
/// reporting for that function.
pub fn extract(callable: &dyn StepCallable) -> Result<Signature, SignatureUnavailable> {
    match callable.parameters() {
        Some(decl) => Signature::parse(decl).map_err(|e| e.with_callable(callable.name())),
        None => Err(
            SignatureUnavailable::invalid("callable exposes no parameter declaration")
                .with_callable(callable.name()),
        ),
    }
}

/// Reconstructs and renders the effective arguments of one call.
///
/// The sole entry point of the pipeline: extract the signature, bind the
/// call's arguments, and render every bound value canonically. Two calls
/// with identical inputs yield identical snapshots.
///
/// # Errors
/// Only extraction can fail; binding and rendering are total.
pub fn snapshot(
    callable: &dyn StepCallable,
    args: CallArgs,
) -> Result<ParameterSnapshot, SignatureUnavailable> {
    let signature = extract(callable)?;
    Ok(render(&signature, args))
}

fn render(signature: &Signature, args: CallArgs) -> ParameterSnapshot {
    signature
        .bind(args)
        .into_iter()
        .map(|(name, value)| (name, represent(&value)))
        .collect()
}

/// Read-through cache from callable identity to its parsed [`Signature`].
///
/// Signatures are derived once per distinct callable; recomputation is
/// idempotent and cheap, so concurrent misses may race and the last insert
/// wins; no coordination beyond the map lock is needed.
#[derive(Debug, Default)]
pub struct SignatureCache {
    inner: RwLock<AHashMap<u64, Arc<Signature>>>,
}

impl SignatureCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Like [`extract`], memoized on the callable's identity.
    pub fn extract(&self, callable: &dyn StepCallable) -> Result<Arc<Signature>, SignatureUnavailable> {
        let key = callable.identity();
        if let Some(signature) = self
            .inner
            .read()
            .expect("signature cache lock poisoned")
            .get(&key)
        {
            return Ok(Arc::clone(signature));
        }
        let signature = Arc::new(extract(callable)?);
        self.inner
            .write()
            .expect("signature cache lock poisoned")
            .insert(key, Arc::clone(&signature));
        Ok(signature)
    }

    /// Like [`snapshot`], using the cache for extraction.
    pub fn snapshot(
        &self,
        callable: &dyn StepCallable,
        args: CallArgs,
    ) -> Result<ParameterSnapshot, SignatureUnavailable> {
        let signature = self.extract(callable)?;
        Ok(render(&signature, args))
    }

    /// Number of cached signatures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().expect("signature cache lock poisoned").len()
    }

    /// Returns true if nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn extract_fails_for_opaque_callables() {
        let err = extract(&FuncDecl::opaque("time.sleep")).unwrap_err();
        assert_eq!(err.callable(), Some("time.sleep"));
    }

    #[test]
    fn cache_hits_do_not_reparse() {
        let cache = SignatureCache::new();
        let step = FuncDecl::new("step", "a, b=2");
        let first = cache.extract(&step).unwrap();
        let second = cache.extract(&step).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_failures_are_not_cached() {
        let cache = SignatureCache::new();
        assert!(cache.extract(&FuncDecl::opaque("native")).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn cached_and_uncached_snapshots_agree() {
        let cache = SignatureCache::new();
        let step = FuncDecl::new("step", "a, b=2");
        let args = || CallArgs::positional(vec![Value::Int(1)]);
        assert_eq!(
            cache.snapshot(&step, args()).unwrap(),
            snapshot(&step, args()).unwrap()
        );
    }
}
