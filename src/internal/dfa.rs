//! Lazy subset construction over the shared NFA (spec.md §3, §4.3.1).
//!
//! A [`DfaState`] is identified by its *core*: the sorted, epsilon-closed set of NFA node ids it
//! represents. Two states with equal cores are the same state, so the cache interns states by
//! core rather than building them eagerly; a state's per-character transitions are filled in on
//! first use and cached from then on.

use std::sync::{Arc, RwLock};

use log::debug;
use rustc_hash::FxHashMap;

use crate::internal::ids::{DfaStateId, NodeId};
use crate::internal::node::NfaArena;
use crate::metrics::MetricsSink;

#[derive(Debug)]
pub(crate) struct DfaState {
    pub(crate) core: Vec<NodeId>,
    transitions: RwLock<FxHashMap<char, DfaStateId>>,
}

/// The shared, growable table of interned DFA states plus the arena they were built over.
///
/// Reads (`transition`) take only a read lock on the relevant state's own transition map, so
/// concurrent scans never block each other; only interning a genuinely new state (or recomputing
/// the start state after `add`/`remove`) needs the table's write lock, and that's naturally rare
/// relative to the volume of character steps a scan performs.
pub(crate) struct DfaCache {
    states: RwLock<Vec<DfaState>>,
    by_core: RwLock<FxHashMap<Vec<NodeId>, DfaStateId>>,
    pub(crate) start: RwLock<DfaStateId>,
    metrics: Option<Arc<dyn MetricsSink>>,
}

impl DfaCache {
    pub(crate) fn new(arena: &NfaArena, metrics: Option<Arc<dyn MetricsSink>>) -> Self {
        let cache = DfaCache {
            states: RwLock::new(Vec::new()),
            by_core: RwLock::new(FxHashMap::default()),
            start: RwLock::new(DfaStateId::new(0)),
            metrics,
        };
        let start_core = arena.start_core();
        let start_id = cache.intern(start_core);
        *cache.start.write().unwrap() = start_id;
        cache
    }

    /// Recompute and re-intern the start state from the arena's current root edges. Called after
    /// `add`/`remove` changes which patterns are live (spec.md §5 "the DFA's start state is
    /// recomputed, not rebuilt from scratch, when the registry changes").
    pub(crate) fn refresh_start(&self, arena: &NfaArena) {
        let start_core = arena.start_core();
        let start_id = self.intern(start_core);
        *self.start.write().unwrap() = start_id;
    }

    fn intern(&self, core: Vec<NodeId>) -> DfaStateId {
        if let Some(&id) = self.by_core.read().unwrap().get(&core) {
            return id;
        }
        let mut by_core = self.by_core.write().unwrap();
        if let Some(&id) = by_core.get(&core) {
            return id;
        }
        let mut states = self.states.write().unwrap();
        let id = DfaStateId::new(states.len() as u32);
        states.push(DfaState {
            core: core.clone(),
            transitions: RwLock::new(FxHashMap::default()),
        });
        by_core.insert(core, id);
        debug!("interned new dfa state {} (total {})", id, states.len());
        if let Some(sink) = &self.metrics {
            sink.dfa_state_interned(states.len());
        }
        id
    }

    pub(crate) fn core(&self, id: DfaStateId) -> Vec<NodeId> {
        self.states.read().unwrap()[id.as_usize()].core.clone()
    }

    pub(crate) fn start_state(&self) -> DfaStateId {
        *self.start.read().unwrap()
    }

    /// The state reached from `from` on `ch`, computing and interning it on first use.
    pub(crate) fn transition(&self, arena: &NfaArena, from: DfaStateId, ch: char) -> DfaStateId {
        {
            let states = self.states.read().unwrap();
            if let Some(&cached) = states[from.as_usize()].transitions.read().unwrap().get(&ch) {
                return cached;
            }
        }
        let core = {
            let states = self.states.read().unwrap();
            states[from.as_usize()].core.clone()
        };
        let frontier = arena.next_frontier(&core, ch);
        let next_core = arena.epsilon_closure(&frontier);
        let next_id = self.intern(next_core);
        let states = self.states.read().unwrap();
        states[from.as_usize()]
            .transitions
            .write()
            .unwrap()
            .insert(ch, next_id);
        next_id
    }
}
