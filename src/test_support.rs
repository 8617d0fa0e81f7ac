//! Leaf matchers used only by this crate's own tests.
//!
//! Concrete leaf matchers (strings, regexes, end-of-input) are an external
//! collaborator in the real surface API; this module exists solely so the
//! combinator algebra can be exercised end-to-end in tests without pulling
//! in a regex dependency.

use std::cell::OnceCell;
use std::rc::Rc;

use crate::match_::{Match, MatchItem, MatchResult};
use crate::parser::{Grammar, Parser};
use crate::value::Value;

/// A leaf that matches the literal string `lit` at the current position,
/// producing it (as an owned `String`) as its value. Failures go through
/// [`Match::fail_expected`], so `set_priority`/`set_description` overrides
/// on the returned parser affect the message exactly like a real leaf
/// would.
pub(crate) fn literal<'arena>(
    grammar: &Grammar<'arena, &'arena str>,
    lit: &'static str,
) -> &'arena Parser<'arena, &'arena str> {
    let self_cell: Rc<OnceCell<&'arena Parser<'arena, &'arena str>>> = Rc::new(OnceCell::new());
    let matcher_self_cell = self_cell.clone();

    let parser = grammar.node(Parser::new(
        "literal",
        vec![],
        true,
        move |_children| format!("\"{}\"", lit),
        Rc::new(move |input: &'arena str, index: usize| -> MatchResult<'arena, &'arena str> {
            if index <= input.len() && input[index..].starts_with(lit) {
                vec![MatchItem::Terminal(Match::success(
                    index,
                    index + lit.len(),
                    Value::new(lit.to_string()),
                ))]
            } else {
                let self_parser = *matcher_self_cell
                    .get()
                    .expect("literal's parser cell is set before it can be activated");
                vec![MatchItem::Terminal(Match::fail_expected(index, self_parser))]
            }
        }),
    ));

    self_cell
        .set(parser)
        .unwrap_or_else(|_| unreachable!("literal's self-reference cell is only ever set here, once"));

    parser
}

/// A leaf that matches one atom from `chars` (a set of single-byte
/// characters), producing it as a one-character `String`.
pub(crate) fn one_of<'arena>(
    grammar: &Grammar<'arena, &'arena str>,
    chars: &'static str,
) -> &'arena Parser<'arena, &'arena str> {
    let self_cell: Rc<OnceCell<&'arena Parser<'arena, &'arena str>>> = Rc::new(OnceCell::new());
    let matcher_self_cell = self_cell.clone();

    let parser = grammar.node(Parser::new(
        "one_of",
        vec![],
        true,
        move |_children| format!("one of \"{}\"", chars),
        Rc::new(move |input: &'arena str, index: usize| -> MatchResult<'arena, &'arena str> {
            match input[index..].chars().next() {
                Some(c) if chars.contains(c) => vec![MatchItem::Terminal(Match::success(
                    index,
                    index + c.len_utf8(),
                    Value::new(c.to_string()),
                ))],
                _ => {
                    let self_parser = *matcher_self_cell
                        .get()
                        .expect("one_of's parser cell is set before it can be activated");
                    vec![MatchItem::Terminal(Match::fail_expected(index, self_parser))]
                }
            }
        }),
    ));

    self_cell
        .set(parser)
        .unwrap_or_else(|_| unreachable!("one_of's self-reference cell is only ever set here, once"));

    parser
}
