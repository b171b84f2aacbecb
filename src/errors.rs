//! Error types for the `polyregex` crate.

use thiserror::Error;

/// The result type used throughout the crate.
pub type Result<T> = std::result::Result<T, PolyRegexError>;

/// The error type returned by [`crate::Matcher::add`] and friends.
///
/// Every variant corresponds to one of the three error kinds spec.md §7 names: a malformed
/// regex (`ParseError`), a feature outside the accepted subset (`UnsupportedConstruct`), and a
/// misuse of the API (`InvalidArgument`).
#[derive(Error, Debug)]
pub struct PolyRegexError {
    /// The specific kind of error.
    pub kind: Box<ErrorKind>,
}

impl PolyRegexError {
    /// Create a new error from a kind.
    pub fn new(kind: ErrorKind) -> Self {
        PolyRegexError {
            kind: Box::new(kind),
        }
    }

    /// The kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl std::fmt::Display for PolyRegexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// The error kind enumeration. Names are semantic, not internal type names, matching spec.md
/// §7's instruction that error kinds be identified by meaning.
#[derive(Error, Debug)]
pub enum ErrorKind {
    /// A malformed regex was passed to `add`. Carries the offending position when the
    /// underlying parser reports one.
    #[error("parse error in pattern '{pattern}' at position {position:?}: {message}")]
    ParseError {
        /// The pattern string that failed to parse.
        pattern: String,
        /// A human-readable description of the problem.
        message: String,
        /// The byte offset within `pattern` where the problem was detected, if known.
        position: Option<usize>,
    },

    /// The parser recognized a construct outside the accepted subset: anchors (`^`, `$`),
    /// backreferences, lookaround, or capturing groups used for capture extraction.
    #[error("unsupported regex construct in pattern '{pattern}': {description}")]
    UnsupportedConstruct {
        /// The pattern string containing the construct.
        pattern: String,
        /// What was unsupported, e.g. "anchor `^`" or "lookaround assertion".
        description: String,
    },

    /// A null/empty regex or action was passed to `add`/`remove`, or `add`/`remove` was called
    /// while a scan holds the matcher's exclusive lock.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An internal invariant was violated. Per spec.md §7 these are bugs, not recoverable
    /// conditions; they are raised only where a `debug_assert!` cannot be used because the
    /// violation must also be observable in release builds (e.g. in tests that deliberately
    /// trigger one).
    #[error("internal invariant violated: {0}")]
    Internal(String),
}
