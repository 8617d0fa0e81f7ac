//! Alternation: `alt` (spec.md section 4.5).

use std::cell::{Cell, OnceCell, RefCell};
use std::rc::Rc;

use crate::match_::{better_failure, Match, MatchItem, MatchResult, Pending};
use crate::parser::{Grammar, LazyParser, Parser};

/// Tries every alternative at the same position.
///
/// All children are scheduled up front; every `Success` among them reaches
/// the engine's root tracker, which keeps the longest one and, among
/// equal-length successes, the first-listed alternative (spec.md section
/// 4.5, section 8 scenario 6). If every alternative fails, synthesizes one
/// `Failure` via the best-failure rule (spec.md section 4.3.2), falling back
/// to a generic failure naming `alt` itself when the winning child failure
/// carries no more information than that.
///
/// Panics if `children` is empty: an `alt` with no alternatives can never
/// succeed or meaningfully fail, and is always a grammar-construction bug.
pub fn alt<'arena, In: Copy + 'arena>(
    grammar: &Grammar<'arena, In>,
    children: Vec<LazyParser<'arena, In>>,
) -> &'arena Parser<'arena, In> {
    assert!(!children.is_empty(), "alt requires at least one alternative");

    let matcher_children = children.clone();
    let self_cell: Rc<OnceCell<&'arena Parser<'arena, In>>> = Rc::new(OnceCell::new());
    let matcher_self_cell = self_cell.clone();

    let parser = grammar.node(Parser::new(
        "alt",
        children,
        true,
        |descs| format!("({})", descs.join(" or ")),
        Rc::new(move |_input: In, index: usize| -> MatchResult<'arena, In> {
            let remaining = Rc::new(Cell::new(matcher_children.len()));
            let failures: Rc<RefCell<Vec<Match>>> = Rc::new(RefCell::new(Vec::new()));
            let self_cell = matcher_self_cell.clone();

            matcher_children
                .iter()
                .map(|child| {
                    let remaining = remaining.clone();
                    let failures = failures.clone();
                    let self_cell = self_cell.clone();
                    MatchItem::Pending(Pending {
                        parser: child.resolve(),
                        index,
                        handler: Rc::new(move |m: Match| -> MatchResult<'arena, In> {
                            match m {
                                Match::Success { .. } => vec![MatchItem::Terminal(m)],
                                Match::Failure { .. } => {
                                    failures.borrow_mut().push(m);
                                    let left = remaining.get() - 1;
                                    remaining.set(left);
                                    if left == 0 {
                                        let alt_parser = *self_cell
                                            .get()
                                            .expect("alt's parser cell is set before it can be activated");
                                        let collected = failures.borrow_mut().split_off(0);
                                        vec![MatchItem::Terminal(synthesize_failure(
                                            alt_parser, index, collected,
                                        ))]
                                    } else {
                                        Vec::new()
                                    }
                                }
                            }
                        }),
                    })
                })
                .collect()
        }),
    ));

    self_cell
        .set(parser)
        .unwrap_or_else(|_| unreachable!("alt's self-reference cell is only ever set here, once"));

    parser
}

/// Picks the best of `failures` per spec.md section 4.3.2, replacing it
/// with a generic `"Expected " + alt.description` failure if it carries no
/// more information than that (starts exactly where `alt` itself did, and
/// was never tagged with a non-default priority).
fn synthesize_failure<'arena, In>(
    alt_parser: &'arena Parser<'arena, In>,
    index: usize,
    failures: Vec<Match>,
) -> Match {
    let mut best: Option<Match> = None;
    for f in failures {
        if better_failure(&f, &best) {
            best = Some(f);
        }
    }

    match best {
        Some(Match::Failure { span, priority, .. }) if span.start == index && priority == 0 => {
            Match::fail_expected(index, alt_parser)
        }
        Some(f) => f,
        None => Match::fail_expected(index, alt_parser),
    }
}
