//! Repetition: `repeat` (spec.md section 4.8).

use std::cell::OnceCell;
use std::rc::Rc;

use crate::errors::GrammarDefect;
use crate::match_::{Match, MatchItem, MatchResult, Pending};
use crate::parser::{Grammar, LazyParser, Parser};
use crate::span::Span;
use crate::value::Value;

/// Matches `p` between `min` and `max` times (inclusive), accumulating its
/// values into a `Vec<Value>`. `max = None` means unbounded.
///
/// At every atom count `>= min`, a candidate `Success` is live alongside
/// the attempt to extend further: a caller collecting all results sees one
/// `Success` per count in `[min, k]` where `k` is however many times `p`
/// actually matched (spec.md section 8).
///
/// A child match of zero width is a grammar defect, not a parse failure:
/// repeating it could run forever without ever advancing, so it raises
/// [`GrammarDefect::NoProgress`] rather than producing a `Failure`.
pub fn repeat<'arena, In: Copy + 'arena>(
    grammar: &Grammar<'arena, In>,
    p: impl Into<LazyParser<'arena, In>>,
    min: usize,
    max: Option<usize>,
) -> &'arena Parser<'arena, In> {
    let p = p.into();
    let matcher_p = p.clone();
    let max = max.unwrap_or(usize::MAX);

    let self_cell: Rc<OnceCell<&'arena Parser<'arena, In>>> = Rc::new(OnceCell::new());
    let matcher_self_cell = self_cell.clone();

    let parser = grammar.node(Parser::new(
        "repeat",
        vec![p],
        true,
        |children| format!("{} repeated", children[0]),
        Rc::new(move |_input: In, start_index: usize| -> MatchResult<'arena, In> {
            step(
                matcher_p.clone(),
                matcher_self_cell.clone(),
                min,
                max,
                start_index,
                0,
                Rc::new(Vec::new()),
                start_index,
            )
        }),
    ));

    self_cell
        .set(parser)
        .unwrap_or_else(|_| unreachable!("repeat's self-reference cell is only ever set here, once"));

    parser
}

/// One state of the repetition accumulator: `count` atoms consumed so far,
/// `acc` their values in order, currently positioned at `pos`. Each call
/// returns immediately (possibly with a `Pending` for the next atom); the
/// next state is only computed once that `Pending`'s handler eventually
/// fires, so repetition never recurses on the host stack.
fn step<'arena, In: Copy + 'arena>(
    p: LazyParser<'arena, In>,
    self_cell: Rc<OnceCell<&'arena Parser<'arena, In>>>,
    min: usize,
    max: usize,
    start_index: usize,
    count: usize,
    acc: Rc<Vec<Value>>,
    pos: usize,
) -> MatchResult<'arena, In> {
    let mut items: MatchResult<'arena, In> = Vec::new();

    if count >= min {
        items.push(MatchItem::Terminal(Match::success(
            start_index,
            pos,
            Value::new((*acc).clone()),
        )));
    }

    if count < max {
        let next_p = p.clone();
        let next_self_cell = self_cell.clone();
        let next_acc = acc.clone();

        items.push(MatchItem::Pending(Pending {
            parser: p.resolve(),
            index: pos,
            handler: Rc::new(move |m: Match| -> MatchResult<'arena, In> {
                match m {
                    Match::Success { span, value } => {
                        if span.is_empty() {
                            let repeat_parser = *next_self_cell
                                .get()
                                .expect("repeat's parser cell is set before it can be activated");
                            GrammarDefect::NoProgress {
                                position: span.start,
                                description: repeat_parser.description().to_owned(),
                            }
                            .raise();
                        }

                        let mut extended = (*next_acc).clone();
                        extended.push(value);
                        step(
                            next_p.clone(),
                            next_self_cell.clone(),
                            min,
                            max,
                            start_index,
                            count + 1,
                            Rc::new(extended),
                            span.end,
                        )
                    }
                    Match::Failure { span, .. } => {
                        if count < min {
                            let repeat_parser = *next_self_cell
                                .get()
                                .expect("repeat's parser cell is set before it can be activated");
                            vec![MatchItem::Terminal(Match::Failure {
                                span: Span::new(start_index, span.start),
                                message: format!("Expected {}", repeat_parser.description()).into(),
                                priority: repeat_parser.priority(),
                            })]
                        } else {
                            Vec::new()
                        }
                    }
                }
            }),
        }));
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use typed_arena::Arena;

    use crate::test_support::one_of;

    #[test]
    fn min_zero_succeeds_on_empty_input() {
        let arena = Arena::new();
        let grammar = Grammar::new(&arena);
        let b = one_of(&grammar, "b");
        let parser = repeat(&grammar, b, 0, Some(1));

        match crate::execute(parser, "") {
            Match::Success { span, value } => {
                assert_eq!((span.start, span.end), (0, 0));
                assert!(value.downcast_ref::<Vec<Value>>().unwrap().is_empty());
            }
            Match::Failure { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn unmet_minimum_fails() {
        let arena = Arena::new();
        let grammar = Grammar::new(&arena);
        let b = one_of(&grammar, "b");
        let parser = repeat(&grammar, b, 1, Some(1));

        assert!(!crate::execute(parser, "").is_success());
    }

    #[test]
    fn bounded_repeat_stops_at_max() {
        let arena = Arena::new();
        let grammar = Grammar::new(&arena);
        let b = one_of(&grammar, "b");
        let parser = repeat(&grammar, b, 1, Some(1));

        match crate::execute(parser, "bb") {
            Match::Success { span, value } => {
                assert_eq!((span.start, span.end), (0, 1));
                assert_eq!(value.downcast_ref::<Vec<Value>>().unwrap().len(), 1);
            }
            Match::Failure { .. } => panic!("expected success"),
        }
    }

    #[test]
    #[should_panic(expected = "isn't making progress")]
    fn zero_width_child_match_is_a_grammar_defect() {
        let arena = Arena::new();
        let grammar = Grammar::new(&arena);

        let always_empty = grammar.node(Parser::new(
            "always_empty",
            vec![],
            true,
            |_| "nothing".to_owned(),
            Rc::new(|_input: &str, index: usize| {
                vec![MatchItem::Terminal(Match::success(
                    index,
                    index,
                    Value::unit(),
                ))]
            }),
        ));
        let parser = repeat(&grammar, always_empty, 0, None);

        let _ = crate::execute(parser, "anything");
    }
}
