//! Registered callables
//!
//! A [`Callable`] pairs a [`Signature`] with a type-erased adapter. Invoking
//! it checks the token count against the signature, wraps every token in a
//! [`Dynamic`], and hands the adapter an [`Invocation`] whose [`Args`] read as
//! the sentinel past the last supplied token.

use crate::adapter::IntoCallable;
use crate::error::CallError;
use crate::handle::HandleTable;
use crate::registry::Registry;
use crate::signature::Signature;
use crate::value::{Dynamic, FromDynamic};
use std::fmt;
use std::sync::Arc;

/// Token appended when a single integer parameter is omitted
pub const DEFAULT_INTEGER_TOKEN: &str = "0";

/// Type-erased adapter behind every registered callable
pub type CallableFn = Arc<dyn Fn(&Invocation<'_>) -> Result<Dynamic, CallError> + Send + Sync>;

static SENTINEL: Dynamic = Dynamic::NONE;

/// Positional arguments of one invocation
///
/// Variable length: any slot at or past [`Args::len`] reads as
/// [`Dynamic::NONE`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    values: Vec<Dynamic>,
    supplied: usize,
}

impl Args {
    /// Wrap caller tokens verbatim
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        let values: Vec<Dynamic> = tokens
            .iter()
            .map(|token| Dynamic::from_text(token.as_ref()))
            .collect();
        Self {
            supplied: values.len(),
            values,
        }
    }

    /// Append a default-filled value; it does not count as supplied
    fn push_default(&mut self, value: Dynamic) {
        self.values.push(value);
    }

    /// Slot `index`, or the sentinel when nothing is there
    pub fn get(&self, index: usize) -> &Dynamic {
        self.values.get(index).unwrap_or(&SENTINEL)
    }

    /// Number of filled slots, including default-filled ones
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of tokens the caller actually supplied
    pub fn supplied(&self) -> usize {
        self.supplied
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dynamic> {
        self.values.iter()
    }

    pub fn as_slice(&self) -> &[Dynamic] {
        &self.values
    }
}

/// Everything an adapter can see while it runs
pub struct Invocation<'a> {
    signature: &'a Signature,
    args: Args,
    registry: &'a Registry,
}

impl<'a> Invocation<'a> {
    pub fn name(&self) -> &str {
        self.signature.name()
    }

    pub fn signature(&self) -> &Signature {
        self.signature
    }

    pub fn args(&self) -> &Args {
        &self.args
    }

    /// Shorthand for `args().get(index)`
    pub fn arg(&self, index: usize) -> &Dynamic {
        self.args.get(index)
    }

    /// Convert slot `index`, reporting failures against this callable
    pub fn get<T: FromDynamic>(&self, index: usize) -> Result<T, CallError> {
        self.arg(index)
            .get::<T>()
            .map_err(|source| CallError::Conversion {
                name: self.name().to_string(),
                position: index,
                source,
            })
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn handles(&self) -> &'a HandleTable {
        self.registry.handles()
    }
}

impl fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("name", &self.name())
            .field("args", &self.args)
            .finish()
    }
}

/// A function registered under a name
#[derive(Clone)]
pub struct Callable {
    signature: Signature,
    function: CallableFn,
}

impl Callable {
    /// Wrap a raw adapter
    pub fn new<F>(signature: Signature, function: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<Dynamic, CallError> + Send + Sync + 'static,
    {
        Self {
            signature,
            function: Arc::new(function),
        }
    }

    /// Wrap an ordinary typed function (see [`IntoCallable`])
    pub fn from_fn<F, Marker>(signature: Signature, function: F) -> Self
    where
        F: IntoCallable<Marker>,
    {
        Self {
            signature,
            function: function.into_callable(),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn name(&self) -> &str {
        self.signature.name()
    }

    pub fn descriptor(&self) -> &str {
        self.signature.descriptor()
    }

    pub fn arity(&self) -> usize {
        self.signature.arity()
    }

    /// Apply the argument-count policy and wrap the tokens
    ///
    /// Enough tokens pass through. A callable whose only parameter is an
    /// integer gets an implicit `"0"`. Anything else short is an
    /// `ArgumentCount` error.
    pub fn prepare<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Args, CallError> {
        let mut args = Args::from_tokens(tokens);
        let expected = self.signature.arity();

        if args.supplied() >= expected {
            return Ok(args);
        }

        if self.signature.takes_single_integer() {
            tracing::debug!(
                name = self.name(),
                "integer argument omitted, defaulting to {}",
                DEFAULT_INTEGER_TOKEN
            );
            args.push_default(Dynamic::from_text(DEFAULT_INTEGER_TOKEN));
            return Ok(args);
        }

        Err(CallError::ArgumentCount {
            name: self.name().to_string(),
            descriptor: self.descriptor().to_string(),
            expected,
            got: args.supplied(),
        })
    }

    /// Invoke with caller tokens
    pub fn invoke<S: AsRef<str>>(
        &self,
        registry: &Registry,
        tokens: &[S],
    ) -> Result<Dynamic, CallError> {
        let args = self.prepare(tokens)?;
        tracing::trace!(name = self.name(), args = ?args.as_slice(), "invoking");

        let invocation = Invocation {
            signature: &self.signature,
            args,
            registry,
        };
        (self.function)(&invocation)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn echo_count(descriptor: &str) -> Callable {
        Callable::new(Signature::new("echo", descriptor), |inv| {
            Ok(Dynamic::from_value(inv.args().len()))
        })
    }

    #[test]
    fn test_enough_tokens_pass_through() {
        let registry = Registry::default();
        let result = echo_count("a, b").invoke(&registry, &["1", "2", "3"]).unwrap();
        assert_eq!(result.as_str(), "3");
    }

    #[test]
    fn test_missing_single_integer_defaults_to_zero() {
        let callable = echo_count("int n");
        let args = callable.prepare::<&str>(&[]).unwrap();
        assert_eq!(args.len(), 1);
        assert_eq!(args.supplied(), 0);
        assert_eq!(args.get(0).as_str(), DEFAULT_INTEGER_TOKEN);
    }

    #[test]
    fn test_missing_argument_is_rejected() {
        let err = echo_count("x: int, y: int").prepare(&["3"]).unwrap_err();
        assert_eq!(
            err,
            CallError::ArgumentCount {
                name: "echo".to_string(),
                descriptor: "x: int, y: int".to_string(),
                expected: 2,
                got: 1,
            }
        );
    }

    #[test]
    fn test_slots_past_supplied_are_sentinel() {
        let args = Args::from_tokens(&["a", "b"]);
        assert_eq!(args.get(0).as_str(), "a");
        assert_eq!(args.get(1).as_str(), "b");
        for i in 2..20 {
            assert_eq!(args.get(i), &Dynamic::NONE);
        }
    }

    #[test]
    fn test_rejected_call_never_runs() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let callable = Callable::new(Signature::new("f", "s: string"), |_| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            Ok(Dynamic::NONE)
        });
        let registry = Registry::default();
        assert!(callable.invoke::<&str>(&registry, &[]).is_err());
        assert_eq!(CALLS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invocation_exposes_name() {
        let callable = Callable::new(Signature::new("whoami", ""), |inv| {
            Ok(Dynamic::from_text(inv.name()))
        });
        let registry = Registry::default();
        let result = callable.invoke::<&str>(&registry, &[]).unwrap();
        assert_eq!(result.as_str(), "whoami");
    }
}
