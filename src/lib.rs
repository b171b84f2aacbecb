//! `polyregex`: a single-pass multi-pattern regex match engine.
//!
//! Patterns are compiled into fragments of one shared Thompson NFA; scanning an input lazily
//! builds a DFA over that NFA via subset construction, so the per-character cost of a scan stays
//! independent of how many patterns are registered. When several patterns could match the same
//! text at overlapping offsets, a domination rule keeps only the longest match per pattern
//! (see [`Span::dominates`]).
//!
//! ```
//! use polyregex::{AddOptions, Matcher, MatcherConfig, StrInput};
//!
//! let matcher: Matcher<StrInput> = Matcher::new(MatcherConfig::default());
//! matcher
//!     .add("ab+c", AddOptions::default(), |_buf: &StrInput, span| {
//!         println!("matched at {}..{}", span.start, span.end);
//!     })
//!     .unwrap();
//!
//! let mut input = StrInput::new("xx abbbc xx");
//! matcher.do_match(&mut input).unwrap();
//! ```

mod action;
mod errors;
mod input;
pub(crate) mod internal;
mod matcher;
mod metrics;
mod span;

pub use action::Action;
pub use errors::{ErrorKind, PolyRegexError, Result};
pub use input::{InputBuffer, StrInput};
pub use internal::ids::ActionId;
pub use matcher::{AddOptions, Matcher, MatcherConfig};
pub use metrics::MetricsSink;
pub use span::Span;
