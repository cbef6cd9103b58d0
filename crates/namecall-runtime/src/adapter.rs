//! Typed adapters
//!
//! Turns an ordinary Rust function into a registered callable's adapter.
//! Parameter `i` is converted from argument slot `i`, so a slot the caller did
//! not supply is converted from the sentinel.
//!
//! Supported shapes:
//! - up to [`MAX_PARAMS`] parameters, each implementing [`FromArg`]
//!   (every [`FromDynamic`] type, plus [`Object<T>`] for handle arguments)
//! - a return type implementing [`IntoReturn`] (every [`ToDynamic`] type,
//!   `()`, `Result<T, E>` with `E: Into<CallError>`, and [`New<T>`] to store a
//!   fresh object and return its handle)
//!
//! A function with more than [`MAX_PARAMS`] parameters does not implement
//! [`IntoCallable`] and is rejected at compile time.
//!
//! # Examples
//!
//! ```
//! use namecall_runtime::RegistryBuilder;
//!
//! let registry = RegistryBuilder::new()
//!     .register_fn("sum", "x: int, y: int", |x: i64, y: i64| x + y)
//!     .build();
//!
//! let result = registry.call("sum", &["3", "5"]).unwrap();
//! assert_eq!(result.get::<i64>().unwrap(), 8);
//! ```

use crate::callable::{CallableFn, Invocation};
use crate::error::CallError;
use crate::handle::{Handle, Object};
use crate::value::{Dynamic, FromDynamic, ToDynamic};
use std::sync::Arc;

/// Most parameters a typed adapter accepts
pub const MAX_PARAMS: usize = 20;

/// A parameter type a typed adapter can fill from an argument slot
pub trait FromArg: Sized {
    /// Build the parameter at `position`
    ///
    /// # Errors
    ///
    /// Returns `CallError` if the slot cannot be converted.
    fn from_arg(invocation: &Invocation<'_>, position: usize) -> Result<Self, CallError>;
}

impl<T: FromDynamic> FromArg for T {
    fn from_arg(invocation: &Invocation<'_>, position: usize) -> Result<Self, CallError> {
        invocation.get(position)
    }
}

impl<T: Send + 'static> FromArg for Object<T> {
    fn from_arg(invocation: &Invocation<'_>, position: usize) -> Result<Self, CallError> {
        let handle: Handle<T> = invocation.get(position)?;
        Ok(invocation.handles().get(handle)?)
    }
}

/// A return type a typed adapter can turn into the call result
pub trait IntoReturn {
    fn into_return(self, invocation: &Invocation<'_>) -> Result<Dynamic, CallError>;
}

impl<T: ToDynamic> IntoReturn for T {
    fn into_return(self, _invocation: &Invocation<'_>) -> Result<Dynamic, CallError> {
        Ok(self.to_dynamic())
    }
}

impl<T, E> IntoReturn for Result<T, E>
where
    T: IntoReturn,
    E: Into<CallError>,
{
    fn into_return(self, invocation: &Invocation<'_>) -> Result<Dynamic, CallError> {
        match self {
            Ok(value) => value.into_return(invocation),
            Err(err) => Err(err.into()),
        }
    }
}

/// Return wrapper storing a freshly built object in the handle table
///
/// The call result is the new object's handle.
#[derive(Debug, Clone, PartialEq)]
pub struct New<T>(pub T);

impl<T: Send + 'static> IntoReturn for New<T> {
    fn into_return(self, invocation: &Invocation<'_>) -> Result<Dynamic, CallError> {
        let handle = invocation.handles().insert(self.0);
        Ok(handle.to_dynamic())
    }
}

/// Conversion of a function into a registered callable's adapter
///
/// `Marker` only distinguishes the per-arity implementations.
pub trait IntoCallable<Marker>: Send + Sync + 'static {
    fn into_callable(self) -> CallableFn;
}

macro_rules! impl_into_callable {
    ($($param:ident),*) => {
        impl<Func, Ret, $($param,)*> IntoCallable<fn($($param,)*) -> Ret> for Func
        where
            Func: Fn($($param),*) -> Ret + Send + Sync + 'static,
            Ret: IntoReturn,
            $($param: FromArg,)*
        {
            #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
            fn into_callable(self) -> CallableFn {
                Arc::new(move |invocation: &Invocation<'_>| {
                    let mut position = 0usize;
                    $(
                        let $param = <$param as FromArg>::from_arg(invocation, position)?;
                        position += 1;
                    )*
                    (self)($($param),*).into_return(invocation)
                })
            }
        }
    };
}

macro_rules! impl_into_callable_up_to {
    () => {
        impl_into_callable!();
    };
    ($head:ident $(, $tail:ident)*) => {
        impl_into_callable!($head $(, $tail)*);
        impl_into_callable_up_to!($($tail),*);
    };
}

impl_into_callable_up_to!(
    A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11, A12, A13, A14, A15, A16, A17, A18, A19, A20
);
