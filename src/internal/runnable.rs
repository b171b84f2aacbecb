//! Dispatches a scan's committed matches to their registered actions, in order (spec.md §4.4
//! "Step D: dispatch in ascending (start, pattern) order; within one pattern, actions run in
//! registration order").

use crate::internal::ids::PatternId;
use crate::internal::registry::PatternRegistry;
use crate::{InputBuffer, Span};

/// Run every action registered against each committed `(pattern, span)` pair, in the order the
/// caller supplies them (expected to already be sorted by [`crate::internal::scheduler::Scheduler::take_committed`]).
pub(crate) fn dispatch<B: InputBuffer>(
    registry: &PatternRegistry<B>,
    buffer: &B,
    committed: Vec<(PatternId, Span)>,
) {
    for (pattern, span) in committed {
        let Some(regexp) = registry.pattern(pattern) else {
            // The pattern was removed mid-scan is impossible (add/remove hold the exclusive
            // lock, spec.md §5), but a defensively-written dispatcher skips rather than panics.
            continue;
        };
        for (_, action) in &regexp.actions {
            action.perform(buffer, span);
        }
    }
}
