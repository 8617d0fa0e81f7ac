//! Lookaround: `check` and `not` (spec.md section 4.7).

use std::cell::OnceCell;
use std::rc::Rc;

use crate::match_::{schedule, Match, MatchItem, MatchResult};
use crate::parser::{Grammar, LazyParser, Parser};
use crate::value::Value;

/// Schedules `p` at `index`; on `Success`, forwards its value but consumes
/// zero width (`span = (index, index)`). Propagates `Failure` unchanged.
///
/// `check(p)` succeeds exactly when `p` does, never advancing the position
/// (spec.md section 8's invariant).
pub fn check<'arena, In: Copy + 'arena>(
    grammar: &Grammar<'arena, In>,
    p: impl Into<LazyParser<'arena, In>>,
) -> &'arena Parser<'arena, In> {
    let p = p.into();
    let matcher_p = p.clone();

    grammar.node(Parser::new(
        "check",
        vec![p],
        true,
        |children| format!("{} (without consuming it)", children[0]),
        Rc::new(move |_input: In, index: usize| -> MatchResult<'arena, In> {
            schedule(
                matcher_p.resolve(),
                index,
                Rc::new(move |m: Match| -> MatchResult<'arena, In> {
                    match m {
                        Match::Success { value, .. } => {
                            vec![MatchItem::Terminal(Match::success(index, index, value))]
                        }
                        failure => vec![MatchItem::Terminal(failure)],
                    }
                }),
            )
        }),
    ))
}

/// Schedules `p` at `index`; on `Success`, fails at `index` naming `not`
/// itself. On `Failure`, succeeds at `(index, index)` with the unit value.
///
/// Exactly one of `not(p)` and `p` succeeds at any position (spec.md
/// section 8's invariant).
pub fn not<'arena, In: Copy + 'arena>(
    grammar: &Grammar<'arena, In>,
    p: impl Into<LazyParser<'arena, In>>,
) -> &'arena Parser<'arena, In> {
    let p = p.into();
    let matcher_p = p.clone();

    let self_cell: Rc<OnceCell<&'arena Parser<'arena, In>>> = Rc::new(OnceCell::new());
    let matcher_self_cell = self_cell.clone();

    let parser = grammar.node(Parser::new(
        "not",
        vec![p],
        true,
        |children| format!("not {}", children[0]),
        Rc::new(move |_input: In, index: usize| -> MatchResult<'arena, In> {
            let self_cell = matcher_self_cell.clone();
            schedule(
                matcher_p.resolve(),
                index,
                Rc::new(move |m: Match| -> MatchResult<'arena, In> {
                    match m {
                        Match::Success { .. } => {
                            let not_parser = *self_cell
                                .get()
                                .expect("not's parser cell is set before it can be activated");
                            vec![MatchItem::Terminal(Match::fail_expected(index, not_parser))]
                        }
                        Match::Failure { .. } => vec![MatchItem::Terminal(Match::success(
                            index,
                            index,
                            Value::unit(),
                        ))],
                    }
                }),
            )
        }),
    ));

    self_cell
        .set(parser)
        .unwrap_or_else(|_| unreachable!("not's self-reference cell is only ever set here, once"));

    parser
}
