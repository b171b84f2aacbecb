//! The optional metrics collaborator (spec.md SPEC_FULL "Ambient stack / Configuration").

/// Receives counters from a running [`crate::Matcher`]. Implementations must be cheap and
/// non-blocking; they are invoked from inside [`crate::Matcher::do_match`] and
/// [`crate::Matcher::add`]/[`crate::Matcher::remove`].
pub trait MetricsSink: Send + Sync {
    /// One scan completed, having stepped `chars_scanned` input characters and committed
    /// `matches_found` matches.
    fn scan_completed(&self, chars_scanned: usize, matches_found: usize) {
        let _ = (chars_scanned, matches_found);
    }

    /// A new DFA state was interned (a cache miss in `DfaCache::transition`/`DfaCache::new`).
    fn dfa_state_interned(&self, total_states: usize) {
        let _ = total_states;
    }

    /// `add` or `remove` completed, changing the number of live patterns to `pattern_count`.
    fn registry_changed(&self, pattern_count: usize) {
        let _ = pattern_count;
    }
}
