//! The [`Action`] collaborator (spec.md §6) supplied by the caller and invoked once per
//! committed, undominated match.

use crate::{InputBuffer, Span};

/// A user-supplied callback invoked for every committed match of the pattern it was registered
/// with, in the order registered (spec.md §4.4 "Action dispatch").
///
/// `perform` receives the full buffer rather than just the matched slice so an action can
/// inspect surrounding context; `span` gives the matched range, with [`Span::end_inclusive`]
/// available for callers that want spec.md §9's `(start, endInclusive)` reporting convention.
pub trait Action<B: InputBuffer>: Send + Sync {
    /// Invoked for each committed match. Any panic propagates out of
    /// [`crate::Matcher::do_match`], at which point the remaining runnable matches for that scan
    /// are discarded but the matcher instance remains usable (spec.md §7).
    fn perform(&self, buffer: &B, span: Span);
}

impl<B: InputBuffer, F> Action<B> for F
where
    F: Fn(&B, Span) + Send + Sync,
{
    fn perform(&self, buffer: &B, span: Span) {
        self(buffer, span)
    }
}
