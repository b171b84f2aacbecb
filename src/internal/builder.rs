//! The abstract builder protocol (spec.md §4.1) and its Thompson-construction implementation.
//!
//! `regex-syntax` owns tokenizing and precedence (see [`crate::internal::parser`]); this module
//! only ever sees the already-parsed `Ast` and drives it through a small set of builder calls,
//! each of which appends one piece of NFA structure. Keeping the two separate means swapping the
//! surface grammar (spec.md's accepted subset is narrower than full `regex-syntax`) never touches
//! the construction logic.

use crate::errors::{ErrorKind, PolyRegexError};
use crate::internal::char_set::CharSet;
use crate::internal::ids::{NodeId, PatternId};
use crate::internal::node::{NfaArena, NodeKind};
use crate::Result;

/// A piece of NFA under construction: `entry` is where control enters, `exit` is a `Split` node
/// with no out-edges yet (a dangling join point later patched by whatever comes next).
#[derive(Debug, Clone, Copy)]
struct Fragment {
    entry: NodeId,
    exit: NodeId,
}

/// One nested grouping level: `(...)`, an alternation arm set, or the whole pattern.
#[derive(Debug, Default)]
struct Frame {
    /// Atoms concatenated so far at this nesting level, not yet joined into one fragment.
    pieces: Vec<Fragment>,
    /// Alternation arms completed so far (populated by [`separate_alternatives`]).
    alts: Vec<Fragment>,
}

/// The builder protocol a parser drives to construct one pattern's NFA fragment. Method names
/// mirror spec.md §4.1 directly; quantifiers and character-set assembly always act on the most
/// recently added atom / the set currently open, matching how a recursive-descent parser would
/// naturally call them while walking the surface syntax left to right.
pub(crate) trait RegexBuilder {
    fn add_literal_string(&mut self, s: &str);
    fn add_any_char(&mut self);
    fn start_char_set(&mut self);
    fn add_chars_to_set(&mut self, chars: &[char]);
    fn add_range_to_set(&mut self, lo: char, hi: char);
    fn invert_char_set(&mut self);
    fn end_char_set(&mut self) -> Result<()>;
    fn open_group(&mut self);
    fn close_group(&mut self);
    fn separate_alternatives(&mut self);
    fn add_optional_singular(&mut self);
    fn add_optional_zero_or_more(&mut self);
    fn add_optional_one_or_more(&mut self);
}

/// Drives [`RegexBuilder`] calls to grow one pattern's fragment of a shared [`NfaArena`].
pub(crate) struct ThompsonBuilder<'a> {
    arena: &'a mut NfaArena,
    pattern: PatternId,
    frames: Vec<Frame>,
    open_set: Option<(CharSet, bool)>,
}

impl<'a> ThompsonBuilder<'a> {
    pub(crate) fn new(arena: &'a mut NfaArena, pattern: PatternId) -> Self {
        ThompsonBuilder {
            arena,
            pattern,
            frames: vec![Frame::default()],
            open_set: None,
        }
    }

    fn frame(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("at least one frame")
    }

    fn new_join(&mut self) -> NodeId {
        self.arena.push(self.pattern, NodeKind::Split(Vec::new()))
    }

    fn set_targets(&mut self, join: NodeId, targets: Vec<NodeId>) {
        if let NodeKind::Split(existing) = &mut self.arena.node_mut(join).kind {
            *existing = targets;
        } else {
            debug_assert!(false, "set_targets called on a non-join node");
        }
    }

    fn push_atom(&mut self, fragment: Fragment) {
        self.frame().pieces.push(fragment);
    }

    /// Concatenate a frame's pieces left to right into one fragment.
    fn join_concat(&mut self, pieces: Vec<Fragment>) -> Fragment {
        let mut iter = pieces.into_iter();
        let Some(mut acc) = iter.next() else {
            let node = self.new_join();
            return Fragment {
                entry: node,
                exit: node,
            };
        };
        for next in iter {
            self.set_targets(acc.exit, vec![next.entry]);
            acc = Fragment {
                entry: acc.entry,
                exit: next.exit,
            };
        }
        acc
    }

    /// Join a frame's completed alternatives into one fragment.
    fn join_alts(&mut self, alts: Vec<Fragment>) -> Fragment {
        debug_assert!(!alts.is_empty());
        if alts.len() == 1 {
            return alts.into_iter().next().unwrap();
        }
        let exit = self.new_join();
        let entries: Vec<NodeId> = alts.iter().map(|f| f.entry).collect();
        for f in &alts {
            self.set_targets(f.exit, vec![exit]);
        }
        let entry = self.new_join();
        self.set_targets(entry, entries);
        Fragment { entry, exit }
    }

    /// Collapse a frame (its pending pieces plus any completed alternatives) into one fragment.
    fn finish_frame(&mut self, mut frame: Frame) -> Fragment {
        let tail = self.join_concat(std::mem::take(&mut frame.pieces));
        if frame.alts.is_empty() {
            tail
        } else {
            frame.alts.push(tail);
            self.join_alts(frame.alts)
        }
    }

    /// Finalize the pattern: collapse the outermost frame, attach a `Terminal` sink at its exit,
    /// and splice the whole fragment into the shared arena's root.
    pub(crate) fn finish(mut self) -> NodeId {
        debug_assert_eq!(self.frames.len(), 1, "unbalanced open_group/close_group");
        let frame = self.frames.pop().unwrap();
        let fragment = self.finish_frame(frame);
        let terminal = self.arena.push(self.pattern, NodeKind::Terminal(self.pattern));
        self.set_targets(fragment.exit, vec![terminal]);
        self.arena.link_root(fragment.entry);
        fragment.entry
    }
}

impl<'a> RegexBuilder for ThompsonBuilder<'a> {
    fn add_literal_string(&mut self, s: &str) {
        let chars: Vec<char> = s.chars().collect();
        if chars.is_empty() {
            return;
        }
        let mut nodes = Vec::with_capacity(chars.len() + 1);
        for _ in 0..=chars.len() {
            nodes.push(self.new_join());
        }
        for (i, &c) in chars.iter().enumerate() {
            let node = self.arena.push(self.pattern, NodeKind::Char(c, nodes[i + 1]));
            self.set_targets_single_pred(nodes[i], node);
        }
        self.push_atom(Fragment {
            entry: nodes[0],
            exit: *nodes.last().unwrap(),
        });
    }

    fn add_any_char(&mut self) {
        let exit = self.new_join();
        let entry = self.arena.push(self.pattern, NodeKind::AnyChar(exit));
        self.push_atom(Fragment { entry, exit });
    }

    fn start_char_set(&mut self) {
        self.open_set = Some((CharSet::new(), false));
    }

    fn add_chars_to_set(&mut self, chars: &[char]) {
        if let Some((set, _)) = &mut self.open_set {
            for &c in chars {
                set.add_char(c);
            }
        }
    }

    fn add_range_to_set(&mut self, lo: char, hi: char) {
        if let Some((set, _)) = &mut self.open_set {
            set.add_range(lo, hi);
        }
    }

    fn invert_char_set(&mut self) {
        if let Some((_, inverted)) = &mut self.open_set {
            *inverted = !*inverted;
        }
    }

    fn end_char_set(&mut self) -> Result<()> {
        let Some((mut set, inverted)) = self.open_set.take() else {
            return Err(PolyRegexError::new(ErrorKind::Internal(
                "end_char_set without a matching start_char_set".to_string(),
            )));
        };
        if inverted {
            set.invert();
        }
        let set = set.normalize();
        let exit = self.new_join();
        let entry = self
            .arena
            .push(self.pattern, NodeKind::CharSet(Box::new(set), exit));
        self.push_atom(Fragment { entry, exit });
        Ok(())
    }

    fn open_group(&mut self) {
        self.frames.push(Frame::default());
    }

    fn close_group(&mut self) {
        let frame = self.frames.pop().expect("close_group without open_group");
        let fragment = self.finish_frame(frame);
        self.push_atom(fragment);
    }

    fn separate_alternatives(&mut self) {
        let pieces = std::mem::take(&mut self.frame().pieces);
        let arm = self.join_concat(pieces);
        self.frame().alts.push(arm);
    }

    fn add_optional_singular(&mut self) {
        let Some(f) = self.frame().pieces.pop() else {
            return;
        };
        let exit = self.new_join();
        let entry = self.new_join();
        self.set_targets(entry, vec![f.entry, exit]);
        self.set_targets(f.exit, vec![exit]);
        self.push_atom(Fragment { entry, exit });
    }

    fn add_optional_zero_or_more(&mut self) {
        let Some(f) = self.frame().pieces.pop() else {
            return;
        };
        let exit = self.new_join();
        let entry = self.new_join();
        self.set_targets(entry, vec![f.entry, exit]);
        self.set_targets(f.exit, vec![entry]);
        self.push_atom(Fragment { entry, exit });
    }

    fn add_optional_one_or_more(&mut self) {
        let Some(f) = self.frame().pieces.pop() else {
            return;
        };
        let exit = self.new_join();
        self.set_targets(f.exit, vec![f.entry, exit]);
        self.push_atom(Fragment {
            entry: f.entry,
            exit,
        });
    }
}

impl<'a> ThompsonBuilder<'a> {
    /// `add_literal_string` builds a chain of single-predecessor join nodes ahead of time so it
    /// can wire `Char` nodes in forward order; this sets each join's single target after the
    /// fact, which is the one place a join's redirect isn't via `set_targets` with a full list.
    fn set_targets_single_pred(&mut self, join: NodeId, target: NodeId) {
        self.set_targets(join, vec![target]);
    }
}
