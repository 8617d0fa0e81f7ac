//! `optional` and `optional_or` (spec.md section 4.6).

use std::rc::Rc;

use crate::match_::{schedule, Match, MatchItem, MatchResult};
use crate::parser::{Grammar, LazyParser, Parser};
use crate::value::Value;

/// Schedules `p` at `index`, and also immediately succeeds at `(index,
/// index)` with `default`; both branches stay live, so a downstream
/// combinator sees two alternatives and may consume either (spec.md
/// section 4.6, section 8's "two live branches" invariant). Run standalone,
/// the engine's longest-match rule means `p`'s `Success` wins whenever `p`
/// actually matches something non-empty; the default only surfaces when `p`
/// fails or matches zero atoms itself.
///
/// Cacheable only when `default` is a primitive value: a non-primitive
/// default may be a user object whose identity matters across calls, so
/// memoizing it would be unsound (spec.md section 4.6, section 9's open
/// question).
pub fn optional_or<'arena, In: Copy + 'arena>(
    grammar: &Grammar<'arena, In>,
    p: impl Into<LazyParser<'arena, In>>,
    default: Value,
) -> &'arena Parser<'arena, In> {
    let p = p.into();
    let cacheable = default.is_primitive();
    let matcher_p = p.clone();

    grammar.node(Parser::new(
        "optional",
        vec![p],
        cacheable,
        |children| format!("optionally {}", children[0]),
        Rc::new(move |_input: In, index: usize| -> MatchResult<'arena, In> {
            let mut items: MatchResult<'arena, In> = Vec::with_capacity(2);
            items.push(MatchItem::Terminal(Match::success(
                index,
                index,
                default.clone(),
            )));
            items.extend(schedule(
                matcher_p.resolve(),
                index,
                Rc::new(|m: Match| vec![MatchItem::Terminal(m)]),
            ));
            items
        }),
    ))
}

/// `optional(p)`: shorthand for [`optional_or`] with the empty/unit value as
/// the default (spec.md section 4.6). Always cacheable, since `()` is a
/// primitive.
pub fn optional<'arena, In: Copy + 'arena>(
    grammar: &Grammar<'arena, In>,
    p: impl Into<LazyParser<'arena, In>>,
) -> &'arena Parser<'arena, In> {
    optional_or(grammar, p, Value::unit())
}
