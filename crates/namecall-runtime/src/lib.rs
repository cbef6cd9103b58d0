//! namecall runtime - call ordinary Rust functions by name with text arguments
//!
//! This library provides:
//! - `Dynamic`, a value kept as canonical text and parsed on demand
//! - `Signature` and `Callable`, a named function with arity checking
//! - typed adapters turning `Fn(A1, .., An) -> R` into callables
//! - `RegistryBuilder` / `Registry`, the name-keyed store and dispatcher
//! - a handle table standing in for raw pointers
//!
//! # Examples
//!
//! ```
//! use namecall_runtime::{CallError, RegistryBuilder};
//!
//! let registry = RegistryBuilder::new()
//!     .with_builtins()
//!     .register_fn("sum", "x: int, y: int", |x: i64, y: i64| {
//!         format!("The result is {}", x + y)
//!     })
//!     .build();
//!
//! let result = registry.call("sum", &["3", "5"]).unwrap();
//! assert_eq!(result.as_str(), "The result is 8");
//!
//! let err = registry.call("sum", &["3"]).unwrap_err();
//! assert!(matches!(err, CallError::ArgumentCount { expected: 2, got: 1, .. }));
//! ```

/// namecall runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod adapter;
pub mod builtins;
pub mod callable;
pub mod error;
pub mod handle;
pub mod registry;
pub mod signature;
pub mod value;

// Re-export commonly used types
pub use adapter::{FromArg, IntoCallable, IntoReturn, New, MAX_PARAMS};
pub use callable::{Args, Callable, CallableFn, Invocation};
pub use error::{CallError, HandleError, RegistryError};
pub use handle::{Handle, HandleTable, Object};
pub use registry::{Listing, Registry, RegistryBuilder};
pub use signature::Signature;
pub use value::{ConversionError, Dynamic, FromDynamic, ToDynamic};
