//! A JSON-ish value grammar: `value = array | number`, `array = '['
//! (value (',' value)*)? ']'`.
//!
//! `value` and `array` refer to each other, and the empty-vs-nonempty array
//! body is built from `optional`'s "two live branches" — only one of which
//! can ever be followed by a closing `]`. Demonstrates mutual (not just
//! left-) recursion and the ambiguity the engine resolves by letting
//! downstream parsers pick the live branch that actually fits.

use std::cell::OnceCell;
use std::rc::Rc;

use typed_arena::Arena;

use trample::combinators::{alt, chain, map, optional_or, repeat};
use trample::{execute, fail_expected, success, Grammar, LazyParser, Match, Parser, Value};

fn literal<'arena>(grammar: &Grammar<'arena, &'arena str>, lit: &'static str) -> &'arena Parser<'arena, &'arena str> {
    let self_cell: Rc<OnceCell<&'arena Parser<'arena, &'arena str>>> = Rc::new(OnceCell::new());
    let matcher_self_cell = self_cell.clone();

    let parser = grammar.node(Parser::new(
        "literal",
        vec![],
        true,
        move |_| format!("'{}'", lit),
        Rc::new(move |input: &'arena str, index: usize| {
            if input[index..].starts_with(lit) {
                success(index, index + lit.len(), Value::unit())
            } else {
                let self_parser = *matcher_self_cell.get().expect("set below");
                fail_expected(index, self_parser)
            }
        }),
    ));

    self_cell.set(parser).unwrap_or_else(|_| unreachable!());
    parser
}

fn number<'arena>(grammar: &Grammar<'arena, &'arena str>) -> &'arena Parser<'arena, &'arena str> {
    let self_cell: Rc<OnceCell<&'arena Parser<'arena, &'arena str>>> = Rc::new(OnceCell::new());
    let matcher_self_cell = self_cell.clone();

    let parser = grammar.node(Parser::new(
        "number",
        vec![],
        true,
        |_| "a number".to_owned(),
        Rc::new(move |input: &'arena str, index: usize| {
            let run_len: usize = input[index..].chars().take_while(|c| c.is_ascii_digit()).count();
            if run_len > 0 {
                let text = &input[index..index + run_len];
                success(index, index + run_len, Value::new(text.parse::<i64>().unwrap()))
            } else {
                let self_parser = *matcher_self_cell.get().expect("set below");
                fail_expected(index, self_parser)
            }
        }),
    ));

    self_cell.set(parser).unwrap_or_else(|_| unreachable!());
    parser
}

/// The value a parsed array evaluates to: a list of numbers or nested lists.
#[derive(Debug, Clone, PartialEq)]
enum Json {
    Number(i64),
    Array(Vec<Json>),
}

fn array<'arena>(
    grammar: &Grammar<'arena, &'arena str>,
    value_cell: Rc<OnceCell<&'arena Parser<'arena, &'arena str>>>,
) -> &'arena Parser<'arena, &'arena str> {
    let value_cell_for_thunk = value_cell.clone();
    let value_lazy = LazyParser::thunk(move || *value_cell_for_thunk.get().expect("value resolved before set"));

    let open = literal(grammar, "[");
    let close = literal(grammar, "]");
    let comma = literal(grammar, ",");

    let tail_item = chain(grammar, comma, value_lazy.clone(), |_comma, v| v);
    let rest = repeat(grammar, tail_item, 0, None);

    let nonempty = chain(grammar, value_lazy, rest, |first, rest| {
        let mut items = vec![first];
        items.extend(rest.downcast_ref::<Vec<Value>>().unwrap().iter().cloned());
        Value::new(items)
    });
    let body = optional_or(grammar, nonempty, Value::new(Vec::<Value>::new()));

    let bracketed = chain(grammar, open, chain(grammar, body, close, |v, _close| v), |_open, v| v);

    map(grammar, bracketed, |v| {
        let items: Vec<Json> = v
            .downcast_ref::<Vec<Value>>()
            .unwrap()
            .iter()
            .map(|item| {
                item.downcast_ref::<Json>()
                    .cloned()
                    .expect("array elements are always already-reduced Json values")
            })
            .collect();
        Value::new(Json::Array(items))
    })
}

fn value<'arena>(grammar: &Grammar<'arena, &'arena str>) -> &'arena Parser<'arena, &'arena str> {
    let value_cell: Rc<OnceCell<&'arena Parser<'arena, &'arena str>>> = Rc::new(OnceCell::new());

    let as_number = map(grammar, number(grammar), |v| {
        Value::new(Json::Number(*v.downcast_ref::<i64>().unwrap()))
    });
    let as_array = array(grammar, value_cell.clone());

    let value = alt(grammar, vec![as_array.into(), as_number.into()]);
    value_cell.set(value).unwrap_or_else(|_| unreachable!());
    value
}

fn main() {
    let input = std::env::args().nth(1).unwrap_or_else(|| "[1,[2,3],4]".to_owned());

    let arena = Arena::new();
    let grammar = Grammar::new(&arena);
    let parser = value(&grammar);

    match execute(parser, input.as_str()) {
        Match::Success { span, value } => {
            println!("{} => {:?} (consumed {}..{})", input, value.downcast_ref::<Json>().unwrap(), span.start, span.end);
        }
        Match::Failure { span, message, .. } => {
            eprintln!("parse failed at {}: {}", span.start, message);
            std::process::exit(1);
        }
    }
}
