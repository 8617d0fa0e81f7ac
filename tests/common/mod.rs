//! Leaf matchers shared by the integration test suites. Not part of the
//! public API: concrete leaf matchers are an external collaborator of the
//! core (spec.md section 1's "out of scope" list), so the integration
//! tests build the smallest ones needed to exercise the combinator algebra,
//! using only the leaf-matcher contract (spec.md section 4.1) `trample`
//! exposes.

use std::cell::OnceCell;
use std::rc::Rc;

use trample::{fail_expected, success, Grammar, Parser, Value};

/// Matches the literal string `lit`, producing it as an owned `String`.
pub fn literal<'arena>(
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
        Rc::new(move |input: &'arena str, index: usize| {
            if index <= input.len() && input[index..].starts_with(lit) {
                success(index, index + lit.len(), Value::new(lit.to_string()))
            } else {
                let self_parser = *matcher_self_cell
                    .get()
                    .expect("literal's parser cell is set before it can be activated");
                fail_expected(index, self_parser)
            }
        }),
    ));

    self_cell
        .set(parser)
        .unwrap_or_else(|_| unreachable!("literal's self-reference cell is only ever set here, once"));

    parser
}

/// Matches a run of one or more atoms from `chars`, producing the matched
/// substring as a `String`. Grounded on spec.md section 8 scenario 3's
/// `matchRegex(/[b]+/)`.
pub fn chars_plus<'arena>(
    grammar: &Grammar<'arena, &'arena str>,
    chars: &'static str,
) -> &'arena Parser<'arena, &'arena str> {
    let self_cell: Rc<OnceCell<&'arena Parser<'arena, &'arena str>>> = Rc::new(OnceCell::new());
    let matcher_self_cell = self_cell.clone();

    let parser = grammar.node(Parser::new(
        "chars_plus",
        vec![],
        true,
        move |_children| format!("one or more of \"{}\"", chars),
        Rc::new(move |input: &'arena str, index: usize| {
            let run_len: usize = input[index..]
                .chars()
                .take_while(|c| chars.contains(*c))
                .map(char::len_utf8)
                .sum();
            if run_len > 0 {
                success(
                    index,
                    index + run_len,
                    Value::new(input[index..index + run_len].to_string()),
                )
            } else {
                let self_parser = *matcher_self_cell
                    .get()
                    .expect("chars_plus's parser cell is set before it can be activated");
                fail_expected(index, self_parser)
            }
        }),
    ));

    self_cell
        .set(parser)
        .unwrap_or_else(|_| unreachable!("chars_plus's self-reference cell is only ever set here, once"));

    parser
}

/// Matches exactly one atom from `chars`, producing it as a one-character
/// `String`.
pub fn one_of<'arena>(
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
        Rc::new(move |input: &'arena str, index: usize| {
            match input[index..].chars().next() {
                Some(c) if chars.contains(c) => success(
                    index,
                    index + c.len_utf8(),
                    Value::new(c.to_string()),
                ),
                _ => {
                    let self_parser = *matcher_self_cell
                        .get()
                        .expect("one_of's parser cell is set before it can be activated");
                    fail_expected(index, self_parser)
                }
            }
        }),
    ));

    self_cell
        .set(parser)
        .unwrap_or_else(|_| unreachable!("one_of's self-reference cell is only ever set here, once"));

    parser
}
