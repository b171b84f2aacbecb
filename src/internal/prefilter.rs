//! An optional Aho–Corasick literal prefilter (spec.md §8 property 6, "the engine must remain
//! correct with the prefilter disabled, and faster with it enabled on literal-heavy pattern
//! sets"). Not load-bearing for correctness: it only narrows which offsets the scheduler bothers
//! seeding a fresh thread at, never which offsets it's allowed to.
//!
//! The hint extracted per pattern must be a *guaranteed literal prefix*: every match of the
//! pattern starts with this exact text. That is the only kind of hint where "seed a thread only
//! where the hint occurs" is sound — a hint taken from the middle or end of a pattern (e.g. `bar`
//! out of `foo[0-9]+bar`) would miss the match's true start. If any registered pattern has no such
//! prefix, the whole prefilter is left disabled for that scan (see `Matcher`'s `rebuild_prefilter`)
//! rather than risk narrowing incorrectly.

use aho_corasick::AhoCorasick;

/// A literal prefix extracted from a pattern, used to pre-screen candidate start offsets.
#[derive(Debug, Clone)]
pub(crate) struct LiteralHint {
    pub(crate) text: String,
}

/// Extract the longest *guaranteed* literal prefix of a pattern's source: the run of literal
/// characters from the start that isn't itself optional or repeated. A character immediately
/// followed by `?`/`*`/`+`/`{` is not guaranteed to appear, so the run stops one character before
/// it. Patterns with no usable prefix (e.g. `.*`, `[a-z]+`, `a?bc`) return `None`.
///
/// An unescaped top-level `|` anywhere in the pattern forces `None` outright, rather than simply
/// ending the literal run there: a match of `ab|cd` need not start with `ab` at all (it may start
/// with `cd`), so whatever literal run was accumulated before the `|` is not a guaranteed prefix
/// of *every* match, only of matches taken by the first alternative. A nested alternation (e.g.
/// `ab(c|d)ef`) never reaches this check, since `(` already ends the run first.
pub(crate) fn extract_hint(source: &str) -> Option<LiteralHint> {
    const MIN_LEN: usize = 2;
    let mut text = String::new();
    let mut chars = source.chars().peekable();
    loop {
        let c = match chars.peek().copied() {
            Some(c) => c,
            None => break,
        };
        let literal = match c {
            '|' => return None,
            '.' | '(' | ')' | '[' | ']' | '^' | '$' | '*' | '+' | '?' | '{' => break,
            '\\' => {
                chars.next();
                match chars.next() {
                    Some(next) => next,
                    None => break,
                }
            }
            _ => {
                chars.next();
                c
            }
        };
        if matches!(chars.peek(), Some('*') | Some('+') | Some('?') | Some('{')) {
            break;
        }
        text.push(literal);
    }
    if text.chars().count() >= MIN_LEN {
        Some(LiteralHint { text })
    } else {
        None
    }
}

/// A compiled prefilter over every pattern's literal prefix hint, reported as the sorted set of
/// offsets in the haystack any hint starts at.
pub(crate) struct Prefilter {
    automaton: AhoCorasick,
}

impl Prefilter {
    /// `case_insensitive` should be set if any contributing pattern folds ASCII case; it widens
    /// matching for every hint, which only ever adds candidate offsets, never removes one a
    /// case-insensitive pattern would need.
    pub(crate) fn build(hints: &[LiteralHint], case_insensitive: bool) -> Option<Self> {
        if hints.is_empty() {
            return None;
        }
        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(case_insensitive)
            .build(hints.iter().map(|h| h.text.as_str()))
            .ok()?;
        Some(Prefilter { automaton })
    }

    /// Candidate start offsets within `haystack`: every position a hint starts at, deduplicated
    /// and sorted. Since every hint is a guaranteed prefix of its pattern, a match can only start
    /// exactly where its hint starts.
    pub(crate) fn candidate_starts(&self, haystack: &str) -> Vec<usize> {
        let mut starts: Vec<usize> = self
            .automaton
            .find_iter(haystack)
            .map(|m| m.start())
            .collect();
        starts.sort_unstable();
        starts.dedup();
        starts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_guaranteed_literal_prefix() {
        let hint = extract_hint(r"foo[0-9]+bar").unwrap();
        assert_eq!(hint.text, "foo");
    }

    #[test]
    fn no_hint_for_pure_class_pattern() {
        assert!(extract_hint(r"[a-z]+").is_none());
    }

    #[test]
    fn stops_before_an_optional_character() {
        let hint = extract_hint("colou?r").unwrap();
        assert_eq!(hint.text, "colo");
    }

    #[test]
    fn no_hint_when_prefix_too_short() {
        assert!(extract_hint("a?bc").is_none());
    }

    /// A top-level alternation has no guaranteed prefix at all: a match of `ab|cd` may begin with
    /// `cd`, so the leading run `ab` must not be reported as one (spec.md §8 property 6).
    #[test]
    fn no_hint_for_top_level_alternation() {
        assert!(extract_hint("ab|cd").is_none());
    }

    #[test]
    fn escaped_pipe_is_a_literal_character_not_alternation() {
        let hint = extract_hint(r"a\|bc").unwrap();
        assert_eq!(hint.text, "a|bc");
    }

    #[test]
    fn candidate_starts_finds_literal_occurrences() {
        let hints = vec![LiteralHint {
            text: "cat".to_string(),
        }];
        let prefilter = Prefilter::build(&hints, false).unwrap();
        let starts = prefilter.candidate_starts("a cat sat on a catapult");
        assert_eq!(starts, vec![2, 15]);
    }
}
