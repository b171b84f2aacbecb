//! Small newtype id types used throughout the engine. Every cross-reference between arenas
//! (NFA nodes, DFA states, patterns) goes through one of these rather than a raw pointer, so
//! graphs with back-edges never need unsafe aliasing tricks.

macro_rules! impl_id {
    ($name:ident, $tp:ty) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub(crate) struct $name($tp);

        impl $name {
            #[inline]
            pub(crate) const fn new(index: $tp) -> Self {
                $name(index)
            }

            #[inline]
            pub(crate) fn as_usize(&self) -> usize {
                self.0 as usize
            }
        }

        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;

            #[inline]
            fn index(&self, index: $name) -> &Self::Output {
                &self[index.0 as usize]
            }
        }

        impl<T> std::ops::IndexMut<$name> for [T] {
            #[inline]
            fn index_mut(&mut self, index: $name) -> &mut T {
                &mut self[index.0 as usize]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;

            #[inline]
            fn index(&self, index: $name) -> &Self::Output {
                &self[index.0 as usize]
            }
        }

        impl<T> std::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, index: $name) -> &mut T {
                &mut self[index.0 as usize]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$tp> for $name {
            fn from(index: $tp) -> Self {
                $name::new(index)
            }
        }
    };
}

/// Id of an NFA node within a pattern's node arena. Monotonically assigned at build time and
/// used as the primary ordering key for DFA-state core sets (spec §3: "Two DFA states are equal
/// iff their cores are equal as sorted id-sets").
pub(crate) type NodeIdBase = u32;
impl_id!(NodeId, NodeIdBase);

/// Id of a DFA state within the shared DFA cache.
pub(crate) type DfaStateIdBase = u32;
impl_id!(DfaStateId, DfaStateIdBase);

/// Id of a registered pattern (the `Regexp` the user's `add` call produced).
pub(crate) type PatternIdBase = u32;
impl_id!(PatternId, PatternIdBase);

/// Id of a registered `(pattern, action)` pair, handed back by [`crate::Matcher::add`] so
/// [`crate::Matcher::remove`] can identify the registration without requiring the action to be
/// re-supplied or compared by identity (spec.md §4.1 "remove" takes a handle, not a value, since
/// Rust trait objects have no stable identity to compare against).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionId(u64);

impl ActionId {
    pub(crate) const fn new(index: u64) -> Self {
        ActionId(index)
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
