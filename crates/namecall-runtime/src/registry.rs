//! Callable registry
//!
//! Registration and use are two phases with two types. A [`RegistryBuilder`]
//! collects callables; [`RegistryBuilder::build`] freezes them into a
//! [`Registry`] that only supports lookup, listing, and dispatch. A registry
//! can be installed once as the process-wide instance with [`install`];
//! [`global`] refuses to hand it out before then.
//!
//! # Examples
//!
//! ```
//! use namecall_runtime::{CallError, RegistryBuilder};
//!
//! let registry = RegistryBuilder::new()
//!     .register_fn("greet", "name:string", |name: String| format!("Hello, {name}!"))
//!     .build();
//!
//! assert_eq!(registry.call("greet", &["Ada"]).unwrap().as_str(), "Hello, Ada!");
//! assert!(matches!(
//!     registry.call("frobnicate", &["x"]),
//!     Err(CallError::NotFound { .. })
//! ));
//! ```

use crate::adapter::IntoCallable;
use crate::builtins;
use crate::callable::{Callable, Invocation};
use crate::error::{CallError, RegistryError};
use crate::handle::HandleTable;
use crate::signature::Signature;
use crate::value::Dynamic;
use std::collections::{btree_map, BTreeMap};
use std::fmt::{self, Write as _};
use std::sync::OnceLock;

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Header line of the help listing
pub const HELP_HEADER: &str = "List of supported functions:";

/// Registration phase
///
/// Registering a name twice keeps the later callable.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    callables: BTreeMap<String, Callable>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a raw adapter under `name`
    pub fn register<F>(self, name: impl Into<String>, descriptor: impl Into<String>, function: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<Dynamic, CallError> + Send + Sync + 'static,
    {
        self.register_callable(Callable::new(Signature::new(name, descriptor), function))
    }

    /// Register an ordinary typed function under `name`
    pub fn register_fn<F, Marker>(
        self,
        name: impl Into<String>,
        descriptor: impl Into<String>,
        function: F,
    ) -> Self
    where
        F: IntoCallable<Marker>,
    {
        self.register_callable(Callable::from_fn(Signature::new(name, descriptor), function))
    }

    /// Register a prebuilt callable under its signature's name
    pub fn register_callable(mut self, callable: Callable) -> Self {
        self.insert(callable);
        self
    }

    /// Register in place, returning the replaced callable if any
    pub fn insert(&mut self, callable: Callable) -> Option<Callable> {
        let name = callable.name().to_string();
        tracing::debug!(name = %name, descriptor = callable.descriptor(), "registering callable");

        let previous = self.callables.insert(name, callable);
        if let Some(previous) = &previous {
            tracing::warn!(name = previous.name(), "callable re-registered, previous entry replaced");
        }
        previous
    }

    /// Add the built-in callables (`help`, `release`)
    pub fn with_builtins(self) -> Self {
        builtins::install(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.callables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.callables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callables.is_empty()
    }

    /// Finish registration
    pub fn build(self) -> Registry {
        tracing::debug!(callables = self.callables.len(), "registration complete");
        Registry {
            callables: self.callables,
            handles: HandleTable::new(),
        }
    }
}

/// Ready phase: a frozen name → callable map plus the handle table
#[derive(Default)]
pub struct Registry {
    callables: BTreeMap<String, Callable>,
    handles: HandleTable,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Resolve a name
    pub fn lookup(&self, name: &str) -> Result<&Callable, CallError> {
        self.callables.get(name).ok_or_else(|| CallError::NotFound {
            name: name.to_string(),
        })
    }

    /// `(name, descriptor)` pairs in name order
    ///
    /// The iterator is lazy and can be cloned to restart from the same point.
    pub fn list(&self) -> Listing<'_> {
        Listing {
            inner: self.callables.iter(),
        }
    }

    /// Look up `name` and invoke it with `tokens`
    pub fn call<S: AsRef<str>>(&self, name: &str, tokens: &[S]) -> Result<Dynamic, CallError> {
        let callable = self.lookup(name)?;
        callable.invoke(self, tokens)
    }

    /// Render the listing as `help` shows it
    pub fn render_help(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", HELP_HEADER);
        for (name, descriptor) in self.list() {
            let _ = writeln!(out, "  {}({})", name, descriptor);
        }
        out
    }

    pub fn handles(&self) -> &HandleTable {
        &self.handles
    }

    pub fn contains(&self, name: &str) -> bool {
        self.callables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.callables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callables.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("callables", &self.callables.keys().collect::<Vec<_>>())
            .field("handles", &self.handles)
            .finish()
    }
}

/// Lazy listing of `(name, descriptor)` pairs
#[derive(Clone)]
pub struct Listing<'a> {
    inner: btree_map::Iter<'a, String, Callable>,
}

impl<'a> Iterator for Listing<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(name, callable)| (name.as_str(), callable.descriptor()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Listing<'_> {}

impl fmt::Debug for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Make `registry` the process-wide instance
///
/// Every registration is finished by the time this returns, so any later
/// [`global`] call sees the complete set.
pub fn install(registry: Registry) -> Result<&'static Registry, RegistryError> {
    let mut installed = false;
    let registry = GLOBAL.get_or_init(|| {
        installed = true;
        registry
    });
    if !installed {
        return Err(RegistryError::AlreadyInstalled);
    }
    tracing::info!(callables = registry.len(), "registry installed");
    Ok(registry)
}

/// The process-wide instance, once installed
pub fn global() -> Result<&'static Registry, RegistryError> {
    GLOBAL.get().ok_or(RegistryError::NotReady)
}
