//! Parses one pattern's surface syntax with `regex-syntax` and drives the result through
//! [`RegexBuilder`], rejecting anything outside spec.md §4.1's accepted grammar (literals, `.`,
//! `[...]`/`[^...]` with ranges, grouping, alternation, `?`/`*`/`+`).

use regex_syntax::ast::{self, Ast, GroupKind, RepetitionKind};

use crate::errors::{ErrorKind, PolyRegexError};
use crate::internal::builder::{RegexBuilder, ThompsonBuilder};
use crate::internal::char_set;
use crate::internal::ids::PatternId;
use crate::internal::node::NfaArena;
use crate::Result;

/// Parse `pattern` and append its NFA fragment to `arena` under id `pattern_id`, returning the
/// fragment's entry node (already linked into the arena's root by [`ThompsonBuilder::finish`]).
pub(crate) fn compile_pattern(
    pattern: &str,
    arena: &mut NfaArena,
    pattern_id: PatternId,
    case_insensitive: bool,
) -> Result<()> {
    let ast = ast::parse::Parser::new().parse(pattern).map_err(|e| {
        PolyRegexError::new(ErrorKind::ParseError {
            pattern: pattern.to_string(),
            message: e.to_string(),
            position: Some(e.span().start.offset),
        })
    })?;

    let mut builder = ThompsonBuilder::new(arena, pattern_id);
    drive_ast(&ast, pattern, case_insensitive, &mut builder)?;
    builder.finish();
    Ok(())
}

fn drive_ast(
    ast: &Ast,
    pattern: &str,
    ci: bool,
    b: &mut ThompsonBuilder<'_>,
) -> Result<()> {
    match ast {
        Ast::Empty(_) => Ok(()),

        Ast::Literal(lit) => {
            add_literal_char(lit.c, ci, b);
            Ok(())
        }

        Ast::Dot(_) => {
            b.add_any_char();
            Ok(())
        }

        Ast::Assertion(a) => Err(unsupported(
            pattern,
            &format!("anchor/assertion ({:?})", a.kind),
        )),

        Ast::ClassPerl(perl) => {
            char_set::reject_top_level_perl_class(perl, pattern)?;
            unreachable!("reject_top_level_perl_class always errors")
        }

        Ast::ClassUnicode(_) => Err(unsupported(pattern, "Unicode property class (\\p{...})")),

        Ast::ClassBracketed(bracketed) => {
            let set = char_set::from_class_bracketed(bracketed, pattern)?;
            b.start_char_set();
            for r in set.ranges() {
                if ci {
                    push_case_variants_range(r.lo, r.hi, b);
                } else {
                    b.add_range_to_set(r.lo, r.hi);
                }
            }
            if set.is_inverted() {
                b.invert_char_set();
            }
            b.end_char_set()
        }

        Ast::Repetition(rep) => {
            match &rep.op.kind {
                RepetitionKind::ZeroOrOne => {}
                RepetitionKind::ZeroOrMore => {}
                RepetitionKind::OneOrMore => {}
                RepetitionKind::Range(_) => {
                    return Err(unsupported(pattern, "bounded repetition ({n,m})"))
                }
            }
            if !rep.greedy {
                return Err(unsupported(pattern, "non-greedy (lazy) repetition"));
            }
            drive_ast(&rep.ast, pattern, ci, b)?;
            match rep.op.kind {
                RepetitionKind::ZeroOrOne => b.add_optional_singular(),
                RepetitionKind::ZeroOrMore => b.add_optional_zero_or_more(),
                RepetitionKind::OneOrMore => b.add_optional_one_or_more(),
                RepetitionKind::Range(_) => unreachable!("rejected above"),
            }
            Ok(())
        }

        Ast::Group(group) => {
            match &group.kind {
                GroupKind::CaptureIndex(_) => {}
                GroupKind::CaptureName { .. } => {}
                GroupKind::NonCapturing(flags) => {
                    if !flags.items.is_empty() {
                        return Err(unsupported(
                            pattern,
                            "inline flag group ((?i:...), (?m:...), ...)",
                        ));
                    }
                }
            }
            b.open_group();
            drive_ast(&group.ast, pattern, ci, b)?;
            b.close_group();
            Ok(())
        }

        Ast::Alternation(alt) => {
            let n = alt.asts.len();
            for (i, arm) in alt.asts.iter().enumerate() {
                drive_ast(arm, pattern, ci, b)?;
                if i + 1 < n {
                    b.separate_alternatives();
                }
            }
            Ok(())
        }

        Ast::Concat(concat) => {
            for part in &concat.asts {
                drive_ast(part, pattern, ci, b)?;
            }
            Ok(())
        }

        Ast::Flags(_) => Err(unsupported(pattern, "standalone inline flag setting ((?i))")),
    }
}

fn add_literal_char(c: char, ci: bool, b: &mut ThompsonBuilder<'_>) {
    if ci {
        let lower = c.to_lowercase().collect::<Vec<_>>();
        let upper = c.to_uppercase().collect::<Vec<_>>();
        if lower.len() == 1 && upper.len() == 1 && lower[0] != upper[0] {
            b.start_char_set();
            b.add_chars_to_set(&[lower[0], upper[0]]);
            // infallible: the set just built is non-empty and not otherwise rejected.
            let _ = b.end_char_set();
            return;
        }
    }
    let mut buf = [0u8; 4];
    b.add_literal_string(c.encode_utf8(&mut buf));
}

fn push_case_variants_range(lo: char, hi: char, b: &mut ThompsonBuilder<'_>) {
    b.add_range_to_set(lo, hi);
    // Covers the common ASCII case-folding need (spec.md's AddOptions.case_insensitive); a
    // full Unicode case-fold over an arbitrary range is out of scope (spec.md Non-goals).
    if let (Some(lo_ascii), Some(hi_ascii)) = (ascii(lo), ascii(hi)) {
        let lo_swapped = swap_ascii_case(lo_ascii);
        let hi_swapped = swap_ascii_case(hi_ascii);
        if lo_swapped <= hi_swapped {
            b.add_range_to_set(lo_swapped as char, hi_swapped as char);
        }
    }
}

fn ascii(c: char) -> Option<u8> {
    if c.is_ascii() {
        Some(c as u8)
    } else {
        None
    }
}

fn swap_ascii_case(b: u8) -> u8 {
    if b.is_ascii_lowercase() {
        b.to_ascii_uppercase()
    } else if b.is_ascii_uppercase() {
        b.to_ascii_lowercase()
    } else {
        b
    }
}

fn unsupported(pattern: &str, description: &str) -> PolyRegexError {
    PolyRegexError::new(ErrorKind::UnsupportedConstruct {
        pattern: pattern.to_string(),
        description: description.to_string(),
    })
}
