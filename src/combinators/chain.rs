//! Sequencing: `chain` and `seq` (spec.md section 4.4).

use std::rc::Rc;

use crate::match_::{schedule, Match, MatchItem, MatchResult};
use crate::parser::{Grammar, LazyParser, Parser};
use crate::value::Value;

/// Runs `p1`, then `p2` starting where `p1` left off, combining their
/// values with `combiner`.
///
/// A failure on `p2` is reported at `p2`'s own failure position, not at
/// the chain's start; the combined span covers both children even if
/// either matched zero-width (spec.md section 4.4).
pub fn chain<'arena, In: Copy + 'arena>(
    grammar: &Grammar<'arena, In>,
    p1: impl Into<LazyParser<'arena, In>>,
    p2: impl Into<LazyParser<'arena, In>>,
    combiner: impl Fn(Value, Value) -> Value + 'static,
) -> &'arena Parser<'arena, In> {
    let p1 = p1.into();
    let p2 = p2.into();
    let combiner = Rc::new(combiner);

    let matcher_p1 = p1.clone();
    let matcher_p2 = p2.clone();

    grammar.node(Parser::new(
        "chain",
        vec![p1, p2],
        true,
        |children| format!("({} then {})", children[0], children[1]),
        Rc::new(move |_input: In, index: usize| -> MatchResult<'arena, In> {
            let p2 = matcher_p2.clone();
            let combiner = combiner.clone();

            schedule(
                matcher_p1.resolve(),
                index,
                Rc::new(move |m1: Match| -> MatchResult<'arena, In> {
                    match m1 {
                        Match::Failure { .. } => vec![MatchItem::Terminal(m1)],
                        Match::Success {
                            span: span1,
                            value: v1,
                        } => {
                            let combiner = combiner.clone();
                            schedule(
                                p2.resolve(),
                                span1.end,
                                Rc::new(move |m2: Match| -> MatchResult<'arena, In> {
                                    match m2 {
                                        Match::Failure { .. } => vec![MatchItem::Terminal(m2)],
                                        Match::Success {
                                            span: span2,
                                            value: v2,
                                        } => {
                                            let merged = span1.merge(span2);
                                            let value = combiner(v1.clone(), v2);
                                            vec![MatchItem::Terminal(Match::success(
                                                merged.start,
                                                merged.end,
                                                value,
                                            ))]
                                        }
                                    }
                                }),
                            )
                        }
                    }
                }),
            )
        }),
    ))
}

/// A left-folded `chain` over an ordered sequence of parsers, producing a
/// `Vec<Value>` of the children's values in order (spec.md section 4.4).
///
/// The empty sequence (`seq(&[])`) succeeds at its start index with a
/// zero-width span and an empty `Vec` (spec.md section 8, boundary
/// behaviors).
pub fn seq<'arena, In: Copy + 'arena>(
    grammar: &Grammar<'arena, In>,
    parsers: Vec<LazyParser<'arena, In>>,
) -> &'arena Parser<'arena, In> {
    let mut iter = parsers.into_iter();
    let first = match iter.next() {
        Some(p) => p,
        None => return empty_seq(grammar),
    };

    let mut acc: &'arena Parser<'arena, In> = grammar.node(Parser::new(
        "seq_start",
        vec![first.clone()],
        true,
        |children| children[0].clone(),
        {
            let first = first.clone();
            Rc::new(move |_input: In, index: usize| {
                schedule(
                    first.resolve(),
                    index,
                    Rc::new(|m: Match| match m {
                        Match::Success { span, value } => vec![MatchItem::Terminal(Match::success(
                            span.start,
                            span.end,
                            Value::new(vec![value]),
                        ))],
                        failure => vec![MatchItem::Terminal(failure)],
                    }),
                )
            })
        },
    ));

    for next in iter {
        acc = chain(grammar, acc, next, |acc_val, next_val| {
            let mut acc_vec = acc_val
                .downcast_ref::<Vec<Value>>()
                .expect("seq accumulator is always a Vec<Value>")
                .clone();
            acc_vec.push(next_val);
            Value::new(acc_vec)
        });
    }

    acc
}

fn empty_seq<'arena, In: Copy + 'arena>(grammar: &Grammar<'arena, In>) -> &'arena Parser<'arena, In> {
    grammar.node(Parser::new(
        "seq_empty",
        vec![],
        true,
        |_| "an empty sequence".to_owned(),
        Rc::new(move |_input: In, index: usize| {
            vec![MatchItem::Terminal(Match::success(
                index,
                index,
                Value::new(Vec::<Value>::new()),
            ))]
        }),
    ))
}

macro_rules! seq_n {
    ($name:ident, $($idx:tt => $t:ident),+; $count:expr) => {
        #[doc = concat!("Chains exactly ", stringify!($count), " parsers, returning a `Vec<Value>` of their values in order.")]
        pub fn $name<'arena, In: Copy + 'arena>(
            grammar: &Grammar<'arena, In>,
            $($t: impl Into<LazyParser<'arena, In>>),+
        ) -> &'arena Parser<'arena, In> {
            seq(grammar, vec![$($t.into()),+])
        }
    };
}

seq_n!(seq2, 0 => p1, 1 => p2; 2);
seq_n!(seq3, 0 => p1, 1 => p2, 2 => p3; 3);
seq_n!(seq4, 0 => p1, 1 => p2, 2 => p3, 3 => p4; 4);
seq_n!(seq5, 0 => p1, 1 => p2, 2 => p3, 3 => p4, 4 => p5; 5);
