//! The pattern/action registry (spec.md §4.1 "add"/"remove", §5).
//!
//! A `Matcher` owns one `PatternRegistry`. Adding a pattern compiles it into the shared
//! [`NfaArena`] and records one `Regexp` entry with one or more `(ActionId, action)` pairs; the
//! same compiled pattern can be registered more than once with different actions (spec.md §4.4
//! "several `add` calls may name the same regex text; each still dispatches its own action").

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::internal::ids::{ActionId, NodeId, PatternId};
use crate::internal::node::NfaArena;
use crate::internal::parser;
use crate::{Action, InputBuffer};
use crate::Result;

/// One registered pattern: its compiled entry node and the actions to dispatch on match.
pub(crate) struct Regexp<B: InputBuffer> {
    pub(crate) id: PatternId,
    pub(crate) source: String,
    pub(crate) case_insensitive: bool,
    pub(crate) entry: NodeId,
    pub(crate) actions: Vec<(ActionId, Arc<dyn Action<B>>)>,
}

/// All currently-registered patterns plus the shared arena they compile into.
pub(crate) struct PatternRegistry<B: InputBuffer> {
    pub(crate) arena: NfaArena,
    patterns: FxHashMap<PatternId, Regexp<B>>,
    next_pattern_id: u32,
    next_action_id: u64,
}

impl<B: InputBuffer> PatternRegistry<B> {
    pub(crate) fn new() -> Self {
        PatternRegistry {
            arena: NfaArena::new(),
            patterns: FxHashMap::default(),
            next_pattern_id: 0,
            next_action_id: 0,
        }
    }

    /// Compile `source` and register `action` to run on its matches, returning a handle usable
    /// with [`PatternRegistry::remove`].
    pub(crate) fn add(
        &mut self,
        source: &str,
        action: Arc<dyn Action<B>>,
        case_insensitive: bool,
    ) -> Result<ActionId> {
        // Reuse an already-compiled identical pattern rather than growing the arena again; two
        // `add` calls for the same text and case-sensitivity differ only in which action(s) fire
        // (spec.md §4.4). A different `case_insensitive` setting compiles to a different NFA
        // fragment, so it is not a candidate for reuse even when the source text matches.
        if let Some(existing) = self
            .patterns
            .values_mut()
            .find(|r| r.source == source && r.case_insensitive == case_insensitive)
        {
            let action_id = ActionId::new(self.next_action_id);
            self.next_action_id += 1;
            existing.actions.push((action_id, action));
            return Ok(action_id);
        }

        let pattern_id = PatternId::new(self.next_pattern_id);
        self.next_pattern_id += 1;
        parser::compile_pattern(source, &mut self.arena, pattern_id, case_insensitive)?;
        let entry = *self
            .arena
            .root_targets
            .last()
            .expect("compile_pattern links the new fragment's entry into the root");

        let action_id = ActionId::new(self.next_action_id);
        self.next_action_id += 1;
        self.patterns.insert(
            pattern_id,
            Regexp {
                id: pattern_id,
                source: source.to_string(),
                case_insensitive,
                entry,
                actions: vec![(action_id, action)],
            },
        );
        Ok(action_id)
    }

    /// Remove the `(pattern, action)` registration named by `action_id`. If it was the last
    /// action on its pattern, the pattern's fragment is unlinked from the arena's root (spec.md
    /// §4.1 "remove"); its nodes remain allocated but unreachable.
    pub(crate) fn remove(&mut self, action_id: ActionId) -> Result<()> {
        let mut emptied: Option<PatternId> = None;
        for regexp in self.patterns.values_mut() {
            let before = regexp.actions.len();
            regexp.actions.retain(|(id, _)| *id != action_id);
            if regexp.actions.len() != before && regexp.actions.is_empty() {
                emptied = Some(regexp.id);
            }
            if regexp.actions.len() != before {
                break;
            }
        }
        if let Some(pattern_id) = emptied {
            if let Some(regexp) = self.patterns.remove(&pattern_id) {
                self.arena.unlink_root(regexp.entry);
            }
        }
        Ok(())
    }

    pub(crate) fn patterns(&self) -> impl Iterator<Item = &Regexp<B>> {
        self.patterns.values()
    }

    pub(crate) fn pattern(&self, id: PatternId) -> Option<&Regexp<B>> {
        self.patterns.get(&id)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
