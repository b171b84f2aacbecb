//! The shared Thompson-NFA arena (spec.md §3, §4.2).
//!
//! Every pattern added to a matcher contributes a fragment of nodes to one combined arena; a
//! virtual root (id 0) holds one epsilon edge per currently-registered pattern, so the scheduler
//! always starts a scan from a single core set (spec.md §4.3 "Multi-pattern NFA: patterns share
//! one arena behind a virtual start node; DFA state 0 is the ε-closure of the root's out-edges").

use rustc_hash::FxHashMap;
use std::sync::RwLock;

use crate::internal::char_set::CharSet;
use crate::internal::ids::{NodeId, PatternId};

/// What a node does when the scanner is sitting on it.
#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    /// Consume exactly this character, continue at `target`.
    Char(char, NodeId),
    /// Consume a character matching `set`, continue at `target`.
    CharSet(Box<CharSet>, NodeId),
    /// Consume any character, continue at `target`.
    AnyChar(NodeId),
    /// Consume nothing; continue at every node in `targets` (alternation / `?` / `*` / `+`
    /// branch points and joins).
    Split(Vec<NodeId>),
    /// A sink: pattern `pattern` has matched once control reaches here.
    Terminal(PatternId),
}

/// One node in the shared NFA arena.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) id: NodeId,
    pub(crate) pattern: PatternId,
    pub(crate) kind: NodeKind,
}

impl Node {
    #[inline]
    pub(crate) fn is_terminal(&self) -> bool {
        matches!(self.kind, NodeKind::Terminal(_))
    }

    /// The node reached by consuming `ch` from this node, if any.
    fn step(&self, ch: char) -> Option<NodeId> {
        match &self.kind {
            NodeKind::Char(c, target) if *c == ch => Some(*target),
            NodeKind::CharSet(set, target) if set.matches(ch) => Some(*target),
            NodeKind::AnyChar(target) => Some(*target),
            _ => None,
        }
    }

    fn epsilon_targets(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Split(targets) => targets,
            _ => &[],
        }
    }
}

/// The combined multi-pattern NFA arena plus per-node transition caches.
///
/// Caches are behind `RwLock` rather than a single matcher-wide lock: every scan only reads them,
/// `add`/`remove` only append or (on remove) leave orphaned entries in place, so contention is
/// limited to the rare case of two scans racing to populate the same cache slot, which both sides
/// tolerate (last write wins, the recomputed value is equal).
#[derive(Debug, Default)]
pub(crate) struct NfaArena {
    nodes: Vec<Node>,
    /// Epsilon edges out of the virtual root, one per registered pattern's entry node.
    pub(crate) root_targets: Vec<NodeId>,
    next_cache: RwLock<FxHashMap<(NodeId, char), Option<NodeId>>>,
}

pub(crate) const ROOT: NodeId = NodeId::new(0);

impl NfaArena {
    pub(crate) fn new() -> Self {
        let mut arena = NfaArena {
            nodes: Vec::new(),
            root_targets: Vec::new(),
            next_cache: RwLock::new(FxHashMap::default()),
        };
        let root_id = arena.push(PatternId::new(u32::MAX), NodeKind::Split(Vec::new()));
        debug_assert_eq!(root_id, ROOT);
        arena
    }

    pub(crate) fn push(&mut self, pattern: PatternId, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(Node { id, pattern, kind });
        id
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.as_usize()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.as_usize()]
    }

    /// Add an epsilon edge from the virtual root to `entry`, registering a pattern's fragment for
    /// scanning. Invalidates the per-node transition cache for the root, since its outgoing set
    /// changed.
    pub(crate) fn link_root(&mut self, entry: NodeId) {
        self.root_targets.push(entry);
        if let NodeKind::Split(targets) = &mut self.nodes[ROOT.as_usize()].kind {
            targets.push(entry);
        }
        self.next_cache.write().unwrap().clear();
    }

    /// Remove an epsilon edge from the virtual root. Does not free the orphaned fragment's nodes;
    /// they remain in the arena, unreachable from the root, and are never visited again (spec.md
    /// §5 "remove only needs to make the pattern's nodes unreachable from the shared start").
    pub(crate) fn unlink_root(&mut self, entry: NodeId) {
        self.root_targets.retain(|&t| t != entry);
        if let NodeKind::Split(targets) = &mut self.nodes[ROOT.as_usize()].kind {
            targets.retain(|&t| t != entry);
        }
        self.next_cache.write().unwrap().clear();
    }

    /// Epsilon-close a frontier: expand every `Split` node reachable via epsilon edges alone,
    /// collecting the full set of node ids (including non-split nodes, whose presence signals
    /// that character/terminal/failure tests should be run against them). Deterministic order:
    /// ascending `NodeId`, which is what makes two states with the same closure compare equal as
    /// sorted core sets (spec.md §3).
    pub(crate) fn epsilon_closure(&self, frontier: &[NodeId]) -> Vec<NodeId> {
        let mut seen = rustc_hash::FxHashSet::default();
        let mut stack: Vec<NodeId> = frontier.to_vec();
        let mut out = Vec::new();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            out.push(id);
            for &t in self.node(id).epsilon_targets() {
                if !seen.contains(&t) {
                    stack.push(t);
                }
            }
        }
        out.sort_unstable();
        out
    }

    /// The epsilon-closed start core: the root's out-edges, closed.
    pub(crate) fn start_core(&self) -> Vec<NodeId> {
        self.epsilon_closure(&self.root_targets)
    }

    /// For every node in `core` that consumes `ch`, the node reached; epsilon-closed. This is the
    /// DFA subset-construction step (spec.md §4.3.1): `core` is a DFA state's core (already
    /// closed), the result is the *unclosed* frontier of the next state; the caller
    /// (`internal::dfa`) closes and interns it.
    pub(crate) fn next_frontier(&self, core: &[NodeId], ch: char) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(core.len());
        for &id in core {
            if let Some(target) = self.cached_step(id, ch) {
                out.push(target);
            }
        }
        out
    }

    fn cached_step(&self, id: NodeId, ch: char) -> Option<NodeId> {
        let key = (id, ch);
        if let Some(hit) = self.next_cache.read().unwrap().get(&key) {
            return *hit;
        }
        let computed = self.node(id).step(ch);
        self.next_cache.write().unwrap().insert(key, computed);
        computed
    }
}
