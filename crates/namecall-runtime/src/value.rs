//! String-backed dynamic values
//!
//! A [`Dynamic`] keeps exactly one thing: the canonical text of a value. Any
//! concrete type is recovered on demand by parsing that text back:
//! - `ToDynamic` - encode a Rust value as its canonical text
//! - `FromDynamic` - parse the canonical text into a Rust value
//!
//! # Examples
//!
//! ```
//! use namecall_runtime::value::Dynamic;
//!
//! // Rust to Dynamic
//! let number = Dynamic::from_value(42_i64);
//! let text = Dynamic::from_text("hello");
//!
//! // Dynamic to Rust
//! assert_eq!(number.get::<i64>().unwrap(), 42);
//! assert_eq!(text.get::<String>().unwrap(), "hello");
//!
//! // Malformed text is an error, never a silent zero
//! assert!(text.get::<i64>().is_err());
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Prefix marking a base-16 encoding.
pub const HEX_PREFIX: &str = "0x";

/// Error type for value conversion failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The text is not a valid encoding of the requested type
    #[error("cannot convert '{text}' to {expected}")]
    Malformed { text: String, expected: &'static str },

    /// The text is a valid number that does not fit the requested type
    #[error("'{text}' is out of range for {expected}")]
    OutOfRange { text: String, expected: &'static str },

    /// A structured value could not be encoded or decoded
    #[error("cannot encode value: {reason}")]
    Encoding { reason: String },
}

impl ConversionError {
    fn malformed(text: &str, expected: &'static str) -> Self {
        ConversionError::Malformed {
            text: text.to_string(),
            expected,
        }
    }

    fn out_of_range(text: &str, expected: &'static str) -> Self {
        ConversionError::OutOfRange {
            text: text.to_string(),
            expected,
        }
    }
}

/// A type-erased value backed by its textual representation
///
/// The default value (and the [`Dynamic::NONE`] sentinel) is the integer zero.
/// The sentinel cannot be told apart from a supplied `"0"` by value; callables
/// that need to know whether an argument was omitted must ask
/// [`Args::supplied`](crate::callable::Args::supplied).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Dynamic {
    repr: Cow<'static, str>,
}

impl Dynamic {
    /// Sentinel filling every parameter slot that was not supplied
    pub const NONE: Dynamic = Dynamic {
        repr: Cow::Borrowed("0"),
    };

    /// Returns the sentinel
    pub const fn none() -> Self {
        Self::NONE
    }

    /// Wrap a literal text token verbatim
    pub fn from_text(token: impl Into<String>) -> Self {
        Self {
            repr: Cow::Owned(token.into()),
        }
    }

    /// Encode a concrete value
    pub fn from_value<T: ToDynamic>(value: T) -> Self {
        value.to_dynamic()
    }

    /// Parse the stored text into `T`
    ///
    /// # Errors
    ///
    /// Returns `ConversionError` if the text is not a valid encoding of `T`.
    pub fn get<T: FromDynamic>(&self) -> Result<T, ConversionError> {
        T::from_dynamic(self)
    }

    /// Encode an arbitrary serializable value as `0x` followed by the hex of
    /// its JSON form.
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Self, ConversionError> {
        let bytes = serde_json::to_vec(value).map_err(|e| ConversionError::Encoding {
            reason: e.to_string(),
        })?;
        Ok(Self::from_text(format!("{}{}", HEX_PREFIX, hex::encode(bytes))))
    }

    /// Decode a value previously produced by [`Dynamic::encode`]
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ConversionError> {
        let digits = self
            .repr
            .strip_prefix(HEX_PREFIX)
            .ok_or_else(|| ConversionError::malformed(&self.repr, "encoded value"))?;
        let bytes =
            hex::decode(digits).map_err(|_| ConversionError::malformed(&self.repr, "encoded value"))?;
        serde_json::from_slice(&bytes).map_err(|e| ConversionError::Encoding {
            reason: e.to_string(),
        })
    }

    /// Replace the stored value
    pub fn set<T: ToDynamic>(&mut self, value: T) {
        *self = value.to_dynamic();
    }

    /// The canonical text
    pub fn as_str(&self) -> &str {
        &self.repr
    }

    /// Take the canonical text
    pub fn into_string(self) -> String {
        self.repr.into_owned()
    }
}

impl Default for Dynamic {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr)
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dynamic({:?})", self.repr)
    }
}

impl AsRef<str> for Dynamic {
    fn as_ref(&self) -> &str {
        &self.repr
    }
}

impl From<&str> for Dynamic {
    fn from(token: &str) -> Self {
        Self::from_text(token)
    }
}

impl From<String> for Dynamic {
    fn from(token: String) -> Self {
        Self::from_text(token)
    }
}

/// Trait for converting a Dynamic value to Rust types
pub trait FromDynamic: Sized {
    /// Parse from the canonical text
    ///
    /// # Errors
    ///
    /// Returns `ConversionError` if the value cannot be converted to the target type.
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError>;
}

/// Trait for converting Rust types to a Dynamic value
pub trait ToDynamic {
    /// Encode as canonical text
    fn to_dynamic(self) -> Dynamic;
}

/// Sign and magnitude of an optionally signed decimal or `0x`-prefixed integer.
fn parse_magnitude(text: &str, expected: &'static str) -> Result<(bool, u128), ConversionError> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if unsigned.starts_with(['+', '-']) {
        return Err(ConversionError::malformed(text, expected));
    }

    let magnitude = match unsigned
        .strip_prefix(HEX_PREFIX)
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(digits) if digits.starts_with('+') => {
            return Err(ConversionError::malformed(text, expected))
        }
        Some(digits) => u128::from_str_radix(digits, 16),
        None => unsigned.parse::<u128>(),
    }
    .map_err(|e| match e.kind() {
        std::num::IntErrorKind::PosOverflow => ConversionError::out_of_range(text, expected),
        _ => ConversionError::malformed(text, expected),
    })?;

    Ok((negative, magnitude))
}

/// Parse an optionally signed decimal or `0x`-prefixed integer.
pub(crate) fn parse_integer(text: &str, expected: &'static str) -> Result<i128, ConversionError> {
    let (negative, magnitude) = parse_magnitude(text, expected)?;
    if negative && magnitude == i128::MIN.unsigned_abs() {
        return Ok(i128::MIN);
    }
    let magnitude =
        i128::try_from(magnitude).map_err(|_| ConversionError::out_of_range(text, expected))?;
    Ok(if negative { -magnitude } else { magnitude })
}

macro_rules! integer_conversions {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromDynamic for $ty {
                fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
                    let text = value.as_str();
                    let wide = parse_integer(text, stringify!($ty))?;
                    <$ty>::try_from(wide)
                        .map_err(|_| ConversionError::out_of_range(text, stringify!($ty)))
                }
            }

            impl ToDynamic for $ty {
                fn to_dynamic(self) -> Dynamic {
                    Dynamic::from_text(self.to_string())
                }
            }

            impl From<$ty> for Dynamic {
                fn from(value: $ty) -> Self {
                    value.to_dynamic()
                }
            }
        )*
    };
}

integer_conversions!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

// u128 reaches past i128::MAX, so it reads the magnitude directly

impl FromDynamic for u128 {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        let text = value.as_str();
        match parse_magnitude(text, "u128")? {
            (true, magnitude) if magnitude != 0 => {
                Err(ConversionError::out_of_range(text, "u128"))
            }
            (_, magnitude) => Ok(magnitude),
        }
    }
}

impl ToDynamic for u128 {
    fn to_dynamic(self) -> Dynamic {
        Dynamic::from_text(self.to_string())
    }
}

impl From<u128> for Dynamic {
    fn from(value: u128) -> Self {
        value.to_dynamic()
    }
}

macro_rules! float_conversions {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromDynamic for $ty {
                fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
                    let text = value.as_str();
                    if let Ok(parsed) = text.parse::<$ty>() {
                        return Ok(parsed);
                    }
                    // Integers written in hex are still numbers
                    parse_integer(text, stringify!($ty)).map(|wide| wide as $ty)
                }
            }

            impl ToDynamic for $ty {
                fn to_dynamic(self) -> Dynamic {
                    Dynamic::from_text(self.to_string())
                }
            }

            impl From<$ty> for Dynamic {
                fn from(value: $ty) -> Self {
                    value.to_dynamic()
                }
            }
        )*
    };
}

float_conversions!(f32, f64);

// Text

impl FromDynamic for String {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        Ok(value.as_str().to_string())
    }
}

impl ToDynamic for String {
    fn to_dynamic(self) -> Dynamic {
        Dynamic::from_text(self)
    }
}

impl ToDynamic for &str {
    fn to_dynamic(self) -> Dynamic {
        Dynamic::from_text(self)
    }
}

impl ToDynamic for &String {
    fn to_dynamic(self) -> Dynamic {
        Dynamic::from_text(self.clone())
    }
}

impl FromDynamic for char {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        let mut chars = value.as_str().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ConversionError::malformed(value.as_str(), "char")),
        }
    }
}

impl ToDynamic for char {
    fn to_dynamic(self) -> Dynamic {
        Dynamic::from_text(self.to_string())
    }
}

// bool

impl FromDynamic for bool {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        match value.as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(ConversionError::malformed(other, "bool")),
        }
    }
}

impl ToDynamic for bool {
    fn to_dynamic(self) -> Dynamic {
        Dynamic::from_text(if self { "true" } else { "false" })
    }
}

impl From<bool> for Dynamic {
    fn from(value: bool) -> Self {
        value.to_dynamic()
    }
}

// Dynamic itself and ()

impl FromDynamic for Dynamic {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

impl ToDynamic for Dynamic {
    fn to_dynamic(self) -> Dynamic {
        self
    }
}

impl ToDynamic for () {
    fn to_dynamic(self) -> Dynamic {
        Dynamic::NONE
    }
}
