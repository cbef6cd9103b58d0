//! Callable signatures and arity inference

/// Parameter separator inside a descriptor
pub const SEPARATOR: char = ',';

/// Canonical integer type keyword
pub const INTEGER_KEYWORD: &str = "int";

/// Type names that count as "integer" for the single-parameter default rule
const INTEGER_TYPES: &[&str] = &[
    INTEGER_KEYWORD,
    "long",
    "short",
    "i8",
    "i16",
    "i32",
    "i64",
    "i128",
    "isize",
    "u8",
    "u16",
    "u32",
    "u64",
    "u128",
    "usize",
];

/// Declared name, parameter descriptor, and minimum arity of a callable
///
/// The descriptor is free-form text such as `x: int, y: int` or
/// `int x, int y`. It is used for display and for inferring arity only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    name: String,
    descriptor: String,
    arity: usize,
}

impl Signature {
    /// Create a signature, inferring arity from the descriptor
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        let descriptor = descriptor.into();
        let arity = Self::parse_arity(&descriptor);
        Self {
            name: name.into(),
            descriptor,
            arity,
        }
    }

    /// Create a signature with an explicit minimum arity
    ///
    /// Use this when the descriptor contains separators inside a compound
    /// type name, where inference over-counts.
    pub fn with_arity(
        name: impl Into<String>,
        descriptor: impl Into<String>,
        arity: usize,
    ) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            arity,
        }
    }

    /// Number of separators plus one; an empty descriptor has arity zero.
    ///
    /// Every separator counts, so `map<int, int> m` is read as two
    /// parameters. That over-count is a known limitation.
    pub fn parse_arity(descriptor: &str) -> usize {
        if descriptor.trim().is_empty() {
            return 0;
        }
        descriptor.matches(SEPARATOR).count() + 1
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Minimum number of tokens before any default-filling applies
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Trimmed per-parameter descriptors
    pub fn params(&self) -> impl Iterator<Item = &str> + '_ {
        self.descriptor
            .split(SEPARATOR)
            .map(str::trim)
            .filter(|param| !param.is_empty())
    }

    /// Type part of a single parameter descriptor
    ///
    /// `x: int` and `x:int` yield `int`; `int x` yields `int`. Pointer and
    /// reference marks on the type word are dropped, so `int* p` yields `int`.
    pub fn param_type(param: &str) -> &str {
        let ty = match param.split_once(':') {
            Some((_, ty)) => ty.trim(),
            None => param.split_whitespace().next().unwrap_or(""),
        };
        ty.trim_end_matches(['*', '&'])
    }

    /// True when the callable declares exactly one integer parameter
    pub fn takes_single_integer(&self) -> bool {
        if self.arity != 1 {
            return false;
        }
        let mut params = self.params();
        match (params.next(), params.next()) {
            (Some(param), None) => INTEGER_TYPES.contains(&Self::param_type(param)),
            _ => false,
        }
    }
}
