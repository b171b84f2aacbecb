//! Character-class predicates: a sorted, non-overlapping set of inclusive `char` ranges plus an
//! inversion flag (spec.md §4.2 "Char class is a composite node whose `nextOn(ch)` tests a
//! predicate over a code-unit range table (sorted, non-overlapping intervals). Inversion flips
//! the predicate.").

use regex_syntax::ast::{ClassBracketed, ClassPerl, ClassPerlKind, ClassSet, ClassSetItem};

use crate::errors::ErrorKind;
use crate::Result;

/// An inclusive character range, `lo..=hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct CharRange {
    pub(crate) lo: char,
    pub(crate) hi: char,
}

/// A character-class predicate: match iff `ch` falls in one of `ranges`, optionally inverted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CharSet {
    ranges: Vec<CharRange>,
    inverted: bool,
}

impl CharSet {
    /// An empty, non-inverted set (matches nothing).
    pub(crate) fn new() -> Self {
        CharSet {
            ranges: Vec::new(),
            inverted: false,
        }
    }

    pub(crate) fn add_range(&mut self, lo: char, hi: char) {
        self.ranges.push(CharRange { lo, hi });
    }

    pub(crate) fn add_char(&mut self, c: char) {
        self.add_range(c, c);
    }

    pub(crate) fn invert(&mut self) {
        self.inverted = !self.inverted;
    }

    /// Sort and merge overlapping/adjacent ranges so the set has a canonical, minimal form. Two
    /// `CharSet`s built from equivalent regex classes compare equal after normalizing, which
    /// matters for the DFA cache (character classes are interned via `CharacterClassRegistry`-
    /// style equality, see [`crate::internal::nfa_build`]).
    pub(crate) fn normalize(mut self) -> Self {
        self.ranges.sort_unstable();
        let mut merged: Vec<CharRange> = Vec::with_capacity(self.ranges.len());
        for r in self.ranges {
            if let Some(last) = merged.last_mut() {
                let last_hi_next = char::from_u32(last.hi as u32 + 1);
                if r.lo <= last.hi || Some(r.lo) == last_hi_next {
                    if r.hi > last.hi {
                        last.hi = r.hi;
                    }
                    continue;
                }
            }
            merged.push(r);
        }
        self.ranges = merged;
        self
    }

    #[inline]
    pub(crate) fn matches(&self, ch: char) -> bool {
        let in_ranges = self
            .ranges
            .binary_search_by(|r| {
                if ch < r.lo {
                    std::cmp::Ordering::Greater
                } else if ch > r.hi {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok();
        in_ranges != self.inverted
    }

    pub(crate) fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub(crate) fn ranges(&self) -> &[CharRange] {
        &self.ranges
    }
}

/// Build a [`CharSet`] from a parsed `[...]`/`[^...]` character class. Only literal characters,
/// ranges, and unions of those are in the accepted subset (spec.md §4.1); Unicode property
/// classes (`\p{...}`) and Perl shorthand classes (`\d`, `\s`, `\w`) nested inside a bracketed
/// class are rejected as `unsupported-construct`, matching spec.md's explicit grammar which
/// lists only literal chars and ranges inside `[...]`.
pub(crate) fn from_class_bracketed(bracketed: &ClassBracketed, pattern: &str) -> Result<CharSet> {
    let mut set = CharSet::new();
    collect_class_set(&bracketed.kind, pattern, &mut set)?;
    if bracketed.negated {
        set.invert();
    }
    Ok(set.normalize())
}

/// A top-level `\d`, `\s`, `\w` (or negated) Perl class used outside brackets, e.g. the whole
/// pattern `\d+`. Not in spec.md's accepted subset (only a single escaped metacharacter is
/// permitted); always rejected.
pub(crate) fn reject_top_level_perl_class(perl: &ClassPerl, pattern: &str) -> Result<CharSet> {
    let _ = perl;
    Err(crate::errors::PolyRegexError::new(ErrorKind::UnsupportedConstruct {
        pattern: pattern.to_string(),
        description: "Perl character class shorthand (\\d, \\s, \\w); only literal characters, \
                       ranges and [...] classes are supported"
            .to_string(),
    }))
}

fn collect_class_set(class_set: &ClassSet, pattern: &str, out: &mut CharSet) -> Result<()> {
    match class_set {
        ClassSet::Item(item) => collect_class_set_item(item, pattern, out),
        ClassSet::BinaryOp(_) => Err(unsupported(
            pattern,
            "character class set operations (&&, --, ~~)",
        )),
    }
}

fn collect_class_set_item(item: &ClassSetItem, pattern: &str, out: &mut CharSet) -> Result<()> {
    match item {
        ClassSetItem::Empty(_) => Ok(()),
        ClassSetItem::Literal(l) => {
            out.add_char(l.c);
            Ok(())
        }
        ClassSetItem::Range(r) => {
            out.add_range(r.start.c, r.end.c);
            Ok(())
        }
        ClassSetItem::Union(u) => {
            for item in &u.items {
                collect_class_set_item(item, pattern, out)?;
            }
            Ok(())
        }
        ClassSetItem::Ascii(_) => Err(unsupported(pattern, "POSIX ASCII class ([:alpha:], ...)")),
        ClassSetItem::Unicode(_) => Err(unsupported(pattern, "Unicode property class (\\p{...})")),
        ClassSetItem::Perl(ClassPerl { kind, .. }) => {
            Err(unsupported(pattern, &format!("Perl class shorthand ({:?})", kind)))
        }
        ClassSetItem::Bracketed(nested) => {
            // A nested `[...]` inside a class, e.g. `[[a-z]0-9]`, is not in the accepted
            // grammar; reject rather than silently flattening.
            let _ = nested;
            Err(unsupported(pattern, "nested bracketed class"))
        }
        _ => Err(unsupported(pattern, "unrecognized character class item")),
    }
}

fn unsupported(pattern: &str, description: &str) -> crate::errors::PolyRegexError {
    crate::errors::PolyRegexError::new(ErrorKind::UnsupportedConstruct {
        pattern: pattern.to_string(),
        description: description.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_simple_range() {
        let mut set = CharSet::new();
        set.add_range('a', 'z');
        let set = set.normalize();
        assert!(set.matches('m'));
        assert!(!set.matches('A'));
    }

    #[test]
    fn inverted_set_flips_membership() {
        let mut set = CharSet::new();
        set.add_range('a', 'b');
        set.invert();
        let set = set.normalize();
        assert!(set.matches('c'));
        assert!(!set.matches('a'));
    }

    #[test]
    fn normalize_merges_overlapping_ranges() {
        let mut set = CharSet::new();
        set.add_range('d', 'f');
        set.add_range('a', 'c');
        set.add_range('c', 'e');
        let set = set.normalize();
        assert_eq!(set.ranges().len(), 1);
        assert!(set.matches('a'));
        assert!(set.matches('f'));
    }
}
