//! `named` and `map`: thin sugar a grammar author reaches for to tag a
//! parser's failure message/priority, or to post-process its value, built
//! entirely from the core's public contract (spec.md section 6, "Contract
//! with the naming/mapping wrappers").
//!
//! Neither adds trampoline machinery: `named` just calls
//! [`Parser::set_description`]/[`Parser::set_priority`] on a freshly built
//! parser before it can have been activated, and `map` wraps a parser in one
//! more node whose matcher defers to the child and maps its `Success`.

use std::rc::Rc;

use crate::match_::{schedule, Match, MatchResult};
use crate::parser::{Grammar, LazyParser, Parser};
use crate::value::Value;

/// Overrides `parser`'s description and failure priority, then returns it.
///
/// Intended for tagging a grammar rule right after it's built, before it is
/// ever activated (e.g. a keyword alternative inside an `alt`, so its
/// failure outranks its neighbors' generic ones). Panics (via
/// [`Parser::set_description`]) if called on a parser whose description has
/// already been computed.
pub fn named<'arena, In>(
    parser: &'arena Parser<'arena, In>,
    name: impl Into<String>,
    priority: u32,
) -> &'arena Parser<'arena, In> {
    parser.set_description(name.into());
    parser.set_priority(priority);
    parser
}

/// Wraps `p`, applying `f` to every `Success` value it produces; `Failure`
/// passes through unchanged (spec.md section 4.2, `mapMatch`).
pub fn map<'arena, In: Copy + 'arena>(
    grammar: &Grammar<'arena, In>,
    p: impl Into<LazyParser<'arena, In>>,
    f: impl Fn(Value) -> Value + 'static,
) -> &'arena Parser<'arena, In> {
    let p = p.into();
    let matcher_p = p.clone();
    let f = Rc::new(f);

    grammar.node(Parser::new(
        "map",
        vec![p],
        true,
        |children| children[0].clone(),
        Rc::new(move |_input: In, index: usize| -> MatchResult<'arena, In> {
            let f = f.clone();
            schedule(
                matcher_p.resolve(),
                index,
                Rc::new(move |m: Match| -> MatchResult<'arena, In> {
                    vec![crate::match_::MatchItem::Terminal(m.map(|_span, value| f(value)))]
                }),
            )
        }),
    ))
}
