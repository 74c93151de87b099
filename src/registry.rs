//! Signing method registry
//!
//! An immutable name → method table. Build one with [`RegistryBuilder`], share
//! it through `Arc`, and hand it to a [`Parser`](crate::Parser). Lookups are
//! plain `HashMap` reads with no locking.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::trace;

use crate::algorithm::{self, SigningMethod};

/// Immutable table of signing methods keyed by their `alg` name
#[derive(Clone, Default)]
pub struct Registry {
    methods: HashMap<&'static str, Arc<dyn SigningMethod>>,
}

impl Registry {
    /// Registry containing every compiled-in method
    pub fn with_defaults() -> Self {
        RegistryBuilder::new().with_defaults().build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Process-wide default registry, built on first use
    pub fn global() -> &'static Arc<Registry> {
        static GLOBAL: OnceLock<Arc<Registry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(Registry::with_defaults()))
    }

    /// Find a method by name
    pub fn lookup(&self, name: &str) -> Option<&Arc<dyn SigningMethod>> {
        let method = self.methods.get(name);
        trace!(name, found = method.is_some(), "signing method lookup");
        method
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.methods.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("methods", &self.names())
            .finish()
    }
}

/// Builder for [`Registry`]
///
/// Registering a name twice replaces the earlier method.
///
/// ```
/// use jwtcore::algorithm::hmac::HS256;
/// use jwtcore::Registry;
///
/// let registry = Registry::builder().register(HS256).build();
/// assert_eq!(registry.names(), vec!["HS256"]);
/// ```
#[derive(Default)]
pub struct RegistryBuilder {
    methods: HashMap<&'static str, Arc<dyn SigningMethod>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every compiled-in method
    pub fn with_defaults(mut self) -> Self {
        for method in algorithm::default_methods() {
            self = self.register_arc(method);
        }
        self
    }

    pub fn register(self, method: impl SigningMethod + 'static) -> Self {
        self.register_arc(Arc::new(method))
    }

    pub fn register_arc(mut self, method: Arc<dyn SigningMethod>) -> Self {
        let name = method.name();
        if self.methods.insert(name, method).is_some() {
            trace!(name, "replaced signing method");
        }
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            methods: self.methods,
        }
    }
}
