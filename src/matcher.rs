//! The public matcher facade (spec.md §4.1, §5, §7).

use std::sync::{Arc, RwLock};

use log::{debug, trace, warn};

use crate::errors::{ErrorKind, PolyRegexError};
use crate::internal::dfa::DfaCache;
use crate::internal::ids::ActionId;
use crate::internal::prefilter::{self, Prefilter};
use crate::internal::registry::PatternRegistry;
use crate::internal::runnable;
use crate::internal::scheduler;
use crate::metrics::MetricsSink;
use crate::{Action, InputBuffer, Result};

/// Per-pattern options for [`Matcher::add`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AddOptions {
    /// Fold ASCII letter case when matching this pattern (spec.md §9, open question 1).
    pub case_insensitive: bool,
}

/// Matcher-wide configuration, set once at construction.
#[derive(Clone)]
pub struct MatcherConfig {
    /// Whether the Aho-Corasick literal prefilter narrows which offsets a scan seeds a fresh
    /// thread at. Disabling it only affects speed, never which matches are found (spec.md §8
    /// property 6).
    pub prefilter_enabled: bool,
    /// An optional sink for scan/registry counters.
    pub metrics: Option<Arc<dyn MetricsSink>>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig {
            prefilter_enabled: true,
            metrics: None,
        }
    }
}

impl std::fmt::Debug for MatcherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatcherConfig")
            .field("prefilter_enabled", &self.prefilter_enabled)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

struct Inner<B: InputBuffer> {
    registry: PatternRegistry<B>,
    dfa: DfaCache,
    prefilter: Option<Prefilter>,
}

impl<B: InputBuffer> Inner<B> {
    /// Rebuild the prefilter from every registered pattern's literal prefix hint. Only enabled
    /// when *every* pattern has one: a pattern with no guaranteed literal prefix could match
    /// starting anywhere, so narrowing seed offsets in that case would lose matches (spec.md §8
    /// property 6).
    fn rebuild_prefilter(&mut self) {
        let mut hints = Vec::new();
        let mut any_case_insensitive = false;
        let mut all_have_hint = true;
        for r in self.registry.patterns() {
            match prefilter::extract_hint(&r.source) {
                Some(hint) => {
                    any_case_insensitive |= r.case_insensitive;
                    hints.push(hint);
                }
                None => {
                    all_have_hint = false;
                    break;
                }
            }
        }
        self.prefilter = if all_have_hint && !hints.is_empty() {
            Prefilter::build(&hints, any_case_insensitive)
        } else {
            None
        };
    }
}

/// A registry of regexes and their actions, ready to scan one or more input buffers.
///
/// `add`/`remove` take the matcher's internal lock exclusively and fail fast with
/// [`ErrorKind::InvalidArgument`] rather than block if a scan currently holds it; concurrent scans
/// via [`Matcher::do_match`] share a read lock and never block each other (spec.md §5).
pub struct Matcher<B: InputBuffer> {
    inner: RwLock<Inner<B>>,
    config: MatcherConfig,
}

impl<B: InputBuffer> Matcher<B> {
    /// Create an empty matcher with `config`.
    pub fn new(config: MatcherConfig) -> Self {
        let registry = PatternRegistry::new();
        let dfa = DfaCache::new(&registry.arena, config.metrics.clone());
        Matcher {
            inner: RwLock::new(Inner {
                registry,
                dfa,
                prefilter: None,
            }),
            config,
        }
    }

    /// Register `pattern` with `action`, returning a handle that [`Matcher::remove`] accepts.
    ///
    /// Returns [`ErrorKind::InvalidArgument`] if `pattern` is empty, or if a scan is currently in
    /// progress on this matcher.
    pub fn add(
        &self,
        pattern: &str,
        options: AddOptions,
        action: impl Action<B> + 'static,
    ) -> Result<ActionId> {
        if pattern.is_empty() {
            return Err(PolyRegexError::new(ErrorKind::InvalidArgument(
                "pattern must not be empty".to_string(),
            )));
        }
        let mut inner = self.try_lock_exclusive()?;
        let action_id = inner
            .registry
            .add(pattern, Arc::new(action), options.case_insensitive)?;
        inner.dfa.refresh_start(&inner.registry.arena);
        inner.rebuild_prefilter();
        debug!("registered pattern '{}'", pattern);
        if prefilter::extract_hint(pattern).is_none() {
            warn!(
                "pattern '{}' has no guaranteed literal prefix; the prefilter (if enabled) falls \
                 back to scanning every offset for it",
                pattern
            );
        }
        if let Some(sink) = &self.config.metrics {
            sink.registry_changed(inner.registry.patterns().count());
        }
        Ok(action_id)
    }

    /// Unregister the `(pattern, action)` pair named by `action_id`.
    ///
    /// Returns [`ErrorKind::InvalidArgument`] if a scan is currently in progress on this matcher.
    /// Unregistering a handle that has already been removed, or was never issued by this matcher,
    /// is a no-op.
    pub fn remove(&self, action_id: ActionId) -> Result<()> {
        let mut inner = self.try_lock_exclusive()?;
        inner.registry.remove(action_id)?;
        inner.dfa.refresh_start(&inner.registry.arena);
        inner.rebuild_prefilter();
        if let Some(sink) = &self.config.metrics {
            sink.registry_changed(inner.registry.patterns().count());
        }
        Ok(())
    }

    /// Remove every registered pattern, returning the matcher to its just-constructed state.
    pub fn shutdown(&self) -> Result<()> {
        let mut inner = self.try_lock_exclusive()?;
        inner.registry = PatternRegistry::new();
        inner.dfa = DfaCache::new(&inner.registry.arena, self.config.metrics.clone());
        inner.prefilter = None;
        Ok(())
    }

    /// Scan `buffer` from its current position to the end, dispatching every committed match to
    /// its registered action(s) in ascending `(start, pattern)` order (spec.md §4.4).
    pub fn do_match(&self, buffer: &mut B) -> Result<usize> {
        let inner = self
            .inner
            .read()
            .map_err(|_| PolyRegexError::new(ErrorKind::Internal("lock poisoned".to_string())))?;

        if inner.registry.is_empty() {
            return Ok(0);
        }

        let mut chars = Vec::new();
        while buffer.has_next() {
            let pos = buffer.position();
            let ch = buffer.next();
            let next_pos = buffer.position();
            chars.push((pos, ch, next_pos));
        }
        let chars_scanned = chars.len();

        let committed = match (&inner.prefilter, self.config.prefilter_enabled) {
            (Some(prefilter), true) => {
                // `chars`' positions are the buffer's own byte offsets (not necessarily 0-based,
                // e.g. a buffer mid-scan); the prefilter runs over a freshly collected haystack
                // starting at index 0, so candidate offsets are shifted back by `base` to land on
                // the same offsets `chars` uses.
                let base = chars.first().map(|(pos, _, _)| *pos).unwrap_or(0);
                let haystack: String = chars.iter().map(|(_, c, _)| *c).collect();
                let candidates: std::collections::HashSet<usize> = prefilter
                    .candidate_starts(&haystack)
                    .into_iter()
                    .map(|offset| base + offset)
                    .collect();
                trace!("prefilter narrowed scan to {} candidate offsets", candidates.len());
                scheduler::scan_with_seeds(
                    &inner.registry.arena,
                    &inner.dfa,
                    chars.into_iter(),
                    move |pos| candidates.contains(&pos),
                )
            }
            _ => scheduler::scan(&inner.registry.arena, &inner.dfa, chars.into_iter()),
        };

        let matches_found = committed.len();
        runnable::dispatch(&inner.registry, buffer, committed);

        if let Some(sink) = &self.config.metrics {
            sink.scan_completed(chars_scanned, matches_found);
        }
        Ok(matches_found)
    }

    fn try_lock_exclusive(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner<B>>> {
        self.inner.try_write().map_err(|_| {
            PolyRegexError::new(ErrorKind::InvalidArgument(
                "matcher is busy: a scan is currently in progress".to_string(),
            ))
        })
    }
}

#[cfg(test)]
impl<B: InputBuffer> Matcher<B> {
    /// Scan `buffer` and return every committed `(pattern, span)` pair directly, bypassing action
    /// dispatch. Test-only: in the style of the teacher's `FindMatches` iterator, but not exposed
    /// publicly, since spec.md's `match(buffer) -> void` is callback-driven and the `Action` trait
    /// already gives full access to the same information.
    pub(crate) fn try_match_collecting(
        &self,
        buffer: &mut B,
    ) -> Result<Vec<(crate::internal::ids::PatternId, crate::Span)>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| PolyRegexError::new(ErrorKind::Internal("lock poisoned".to_string())))?;
        if inner.registry.is_empty() {
            return Ok(Vec::new());
        }
        let mut chars = Vec::new();
        while buffer.has_next() {
            let pos = buffer.position();
            let ch = buffer.next();
            let next_pos = buffer.position();
            chars.push((pos, ch, next_pos));
        }
        Ok(scheduler::scan(&inner.registry.arena, &inner.dfa, chars.into_iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::StrInput;
    use crate::Span;

    #[test]
    fn try_match_collecting_returns_spans_without_dispatching_actions() {
        let m: Matcher<StrInput> = Matcher::new(MatcherConfig::default());
        m.add("ab", AddOptions::default(), |_: &StrInput, _| {
            panic!("action should not fire via try_match_collecting");
        })
        .unwrap();

        let mut input = StrInput::new("xxabxx");
        let matches = m.try_match_collecting(&mut input).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].1, Span::new(2, 4));
    }
}
