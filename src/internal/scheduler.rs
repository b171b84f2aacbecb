//! The match scheduler (spec.md §4.4): advances a set of in-progress scan threads across the
//! input through the lazily-built DFA, applies the domination rule to keep only maximal
//! same-pattern matches, and hands committed matches back in dispatch order.

use rustc_hash::FxHashMap;

use crate::internal::dfa::DfaCache;
use crate::internal::ids::{DfaStateId, PatternId};
use crate::internal::node::NfaArena;
use crate::Span;

/// One in-progress attempt: started scanning at `start`, currently sitting in DFA state `state`.
struct Thread {
    start: usize,
    state: DfaStateId,
}

/// Per-scan scheduler state. Not shared between scans (spec.md §5: each scan gets its own live
/// match candidates; only the NFA arena and DFA cache are shared).
///
/// `candidates` holds, per pattern, every surviving undominated span seen so far this scan — not
/// just a single "best" one. Two matches of the same pattern at disjoint offsets (e.g. two
/// separate runs of `a+` in `"baaaabaa"`) are incomparable under domination and must both survive
/// to be committed; a single-slot "best candidate" would silently drop the earlier one the moment
/// a later, non-overlapping match appeared (spec.md §3's domination relation is defined only
/// between matches that actually overlap).
pub(crate) struct Scheduler {
    threads: Vec<Thread>,
    candidates: FxHashMap<PatternId, Vec<Span>>,
    committed: Vec<(PatternId, Span)>,
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        Scheduler {
            threads: Vec::new(),
            candidates: FxHashMap::default(),
            committed: Vec::new(),
        }
    }

    /// Seed a fresh attempt starting at `pos` and immediately check it for a zero-length match
    /// (an empty pattern, or one made entirely of `?`/`*` pieces, matches before consuming
    /// anything).
    fn seed_at(&mut self, arena: &NfaArena, dfa: &DfaCache, pos: usize) {
        let state = dfa.start_state();
        self.record_terminals(arena, dfa, state, pos, pos);
        self.threads.push(Thread { start: pos, state });
    }

    /// Advance every live thread across `ch`, whose next offset is `next_pos`, optionally seeding
    /// a fresh thread at `pos` first. A pattern may start matching at any offset, so `seed` is
    /// `true` at every position unless the literal prefilter (spec.md §8 property 6) has ruled
    /// this position out as a possible start for every still-unmatched pattern.
    pub(crate) fn step(
        &mut self,
        arena: &NfaArena,
        dfa: &DfaCache,
        pos: usize,
        ch: char,
        next_pos: usize,
        seed: bool,
    ) {
        if seed {
            self.seed_at(arena, dfa, pos);
        }

        let mut next_threads = Vec::with_capacity(self.threads.len());
        for thread in self.threads.drain(..) {
            let next_state = dfa.transition(arena, thread.state, ch);
            if dfa.core(next_state).is_empty() {
                continue;
            }
            self.record_terminals(arena, dfa, next_state, thread.start, next_pos);
            next_threads.push(Thread {
                start: thread.start,
                state: next_state,
            });
        }
        self.threads = next_threads;
    }

    fn record_terminals(
        &mut self,
        arena: &NfaArena,
        dfa: &DfaCache,
        state: DfaStateId,
        start: usize,
        end: usize,
    ) {
        for id in dfa.core(state) {
            let node = arena.node(id);
            if !node.is_terminal() {
                continue;
            }
            self.offer(node.pattern, Span::new(start, end));
        }
    }

    /// Offer a newly-discovered terminal span for `pattern`. Keeps the set of per-pattern
    /// candidates minimal under domination (spec.md §3/§4.4 "domination rule"): `span` is
    /// discarded if any surviving candidate already dominates (or equals) it; otherwise it is
    /// inserted and anything it dominates is retracted. Candidates that neither dominate nor are
    /// dominated (including ones entirely disjoint from `span`) are left untouched — both survive
    /// to be committed independently.
    fn offer(&mut self, pattern: PatternId, span: Span) {
        let list = self.candidates.entry(pattern).or_default();
        if list
            .iter()
            .any(|existing| *existing == span || existing.dominates(&span))
        {
            return;
        }
        let mut i = 0;
        while i < list.len() {
            if span.dominates(&list[i]) {
                list.remove(i);
            } else if overlaps(&span, &list[i]) {
                // Overlapping but incomparable (neither contains the other): leftmost-match
                // convention keeps the earlier-starting span (spec.md §3 tie-break note).
                if span.start < list[i].start {
                    list.remove(i);
                } else {
                    return;
                }
            } else {
                i += 1;
            }
        }
        list.push(span);
    }

    /// Drain this scan's surviving candidates into committed matches, clearing live state. Called
    /// once input is exhausted (spec.md §4.4 "Step C: at end of input, every pattern's surviving
    /// candidates are committed").
    pub(crate) fn finish(&mut self) {
        for (pattern, spans) in self.candidates.drain() {
            for span in spans {
                self.committed.push((pattern, span));
            }
        }
        self.threads.clear();
    }

    /// Committed matches in ascending `(start, pattern)` dispatch order (spec.md §4.4 "Step D").
    pub(crate) fn take_committed(&mut self) -> Vec<(PatternId, Span)> {
        let mut out = std::mem::take(&mut self.committed);
        out.sort_unstable_by_key(|(pattern, span)| (span.start, pattern.as_usize()));
        out
    }
}

/// `true` iff `a` and `b` share at least one offset, including two zero-length spans at the same
/// point (treated as overlapping so they aren't both kept as "disjoint" when one should win a
/// tie-break).
fn overlaps(a: &Span, b: &Span) -> bool {
    if a.is_empty() && b.is_empty() {
        return a.start == b.start;
    }
    a.start < b.end && b.start < a.end
}

/// Scans every character yielded by `chars` (triples of `(offset, char, next_offset)`) through
/// `arena`/`dfa`, seeding a new thread at every offset, and returns committed matches in dispatch
/// order. Kept free of any `Matcher` knowledge so it is exercised directly in tests without
/// constructing a whole matcher.
pub(crate) fn scan(
    arena: &NfaArena,
    dfa: &DfaCache,
    chars: impl Iterator<Item = (usize, char, usize)>,
) -> Vec<(PatternId, Span)> {
    scan_with_seeds(arena, dfa, chars, |_| true)
}

/// As [`scan`], but only seeds a fresh thread at offsets for which `should_seed` returns `true`.
/// Used when the literal prefilter is enabled: positions the prefilter has ruled out as a
/// possible start for every pattern are skipped (spec.md §8 property 6).
pub(crate) fn scan_with_seeds(
    arena: &NfaArena,
    dfa: &DfaCache,
    chars: impl Iterator<Item = (usize, char, usize)>,
    should_seed: impl Fn(usize) -> bool,
) -> Vec<(PatternId, Span)> {
    let mut scheduler = Scheduler::new();
    let mut had_chars = false;
    for (pos, ch, next_pos) in chars {
        had_chars = true;
        scheduler.step(arena, dfa, pos, ch, next_pos, should_seed(pos));
    }
    if !had_chars && should_seed(0) {
        // Empty input: still seed once so zero-length matches at offset 0 are found.
        scheduler.seed_at(arena, dfa, 0);
    }
    scheduler.finish();
    scheduler.take_committed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::builder::RegexBuilder;
    use crate::internal::ids::PatternId;

    fn chars_of(s: &str) -> Vec<(usize, char, usize)> {
        let mut out = Vec::new();
        for (i, c) in s.char_indices() {
            out.push((i, c, i + c.len_utf8()));
        }
        out
    }

    #[test]
    fn literal_match_is_committed() {
        let mut arena = NfaArena::new();
        {
            let mut b = crate::internal::builder::ThompsonBuilder::new(&mut arena, PatternId::new(0));
            b.add_literal_string("ab");
            b.finish();
        }
        let dfa = DfaCache::new(&arena, None);
        let matches = scan(&arena, &dfa, chars_of("xxabxx").into_iter());
        assert!(matches.iter().any(|(_, span)| span.start == 2 && span.end == 4));
    }

    /// Two disjoint matches of the same pattern (separate, non-overlapping runs) must both
    /// survive domination — neither one's offset relationship makes it "dominate" the other, so
    /// collapsing per-pattern tracking to a single best-so-far candidate would silently drop
    /// whichever run was discovered first (regression coverage for the `a+` case in spec.md §8
    /// scenario S2, exercised end-to-end in `tests/match_test.rs`).
    #[test]
    fn disjoint_runs_of_the_same_pattern_are_both_committed() {
        let mut arena = NfaArena::new();
        {
            let mut b = crate::internal::builder::ThompsonBuilder::new(&mut arena, PatternId::new(0));
            b.add_literal_string("a");
            b.add_optional_one_or_more();
            b.finish();
        }
        let dfa = DfaCache::new(&arena, None);
        let matches = scan(&arena, &dfa, chars_of("baaaabaa").into_iter());
        let mut spans: Vec<(usize, usize)> = matches.iter().map(|(_, s)| (s.start, s.end)).collect();
        spans.sort_unstable();
        assert_eq!(spans, vec![(1, 5), (6, 8)]);
    }
}
