//! A left-recursive arithmetic grammar: `E = E '+' N | N`.
//!
//! Demonstrates that a rule may refer to itself through [`LazyParser`]
//! without blowing the host stack, and that the engine resolves the
//! recursion to the fully left-associative parse rather than stopping at
//! the first (shortest) alternative that happens to succeed.

use std::cell::OnceCell;
use std::rc::Rc;

use typed_arena::Arena;

use trample::combinators::{alt, chain};
use trample::{execute, fail_expected, success, Grammar, LazyParser, Match, Parser, Value};

fn digits<'arena>(grammar: &Grammar<'arena, &'arena str>) -> &'arena Parser<'arena, &'arena str> {
    let self_cell: Rc<OnceCell<&'arena Parser<'arena, &'arena str>>> = Rc::new(OnceCell::new());
    let matcher_self_cell = self_cell.clone();

    let parser = grammar.node(Parser::new(
        "digits",
        vec![],
        true,
        |_| "a number".to_owned(),
        Rc::new(move |input: &'arena str, index: usize| {
            let run_len: usize = input[index..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .map(char::len_utf8)
                .sum();
            if run_len > 0 {
                success(index, index + run_len, Value::new(input[index..index + run_len].to_owned()))
            } else {
                let self_parser = *matcher_self_cell.get().expect("set below");
                fail_expected(index, self_parser)
            }
        }),
    ));

    self_cell.set(parser).unwrap_or_else(|_| unreachable!());
    parser
}

fn plus<'arena>(grammar: &Grammar<'arena, &'arena str>) -> &'arena Parser<'arena, &'arena str> {
    let self_cell: Rc<OnceCell<&'arena Parser<'arena, &'arena str>>> = Rc::new(OnceCell::new());
    let matcher_self_cell = self_cell.clone();

    let parser = grammar.node(Parser::new(
        "plus",
        vec![],
        true,
        |_| "'+'".to_owned(),
        Rc::new(move |input: &'arena str, index: usize| {
            if input[index..].starts_with('+') {
                success(index, index + 1, Value::unit())
            } else {
                let self_parser = *matcher_self_cell.get().expect("set below");
                fail_expected(index, self_parser)
            }
        }),
    ));

    self_cell.set(parser).unwrap_or_else(|_| unreachable!());
    parser
}

fn expr<'arena>(grammar: &Grammar<'arena, &'arena str>) -> &'arena Parser<'arena, &'arena str> {
    let number = digits(grammar);
    let plus_sign = plus(grammar);

    let expr_cell: Rc<OnceCell<&'arena Parser<'arena, &'arena str>>> = Rc::new(OnceCell::new());
    let expr_cell_for_thunk = expr_cell.clone();
    let expr_lazy = LazyParser::thunk(move || *expr_cell_for_thunk.get().expect("expr resolved before set"));

    // E '+' N, left-folding into a running sum.
    let tail = chain(grammar, plus_sign, number, |_plus, n| n);
    let recurse = chain(grammar, expr_lazy, tail, |acc, n| {
        let acc: i64 = *acc.downcast_ref::<i64>().expect("E always produces an i64");
        let n: i64 = n.downcast_ref::<String>().unwrap().parse().unwrap();
        Value::new(acc + n)
    });

    let base = trample::combinators::map(grammar, number, |v| {
        Value::new(v.downcast_ref::<String>().unwrap().parse::<i64>().unwrap())
    });

    let expr = alt(grammar, vec![recurse.into(), base.into()]);
    expr_cell.set(expr).unwrap_or_else(|_| unreachable!());
    expr
}

fn main() {
    let input = std::env::args().nth(1).unwrap_or_else(|| "1+2+3+4".to_owned());

    let arena = Arena::new();
    let grammar = Grammar::new(&arena);
    let parser = expr(&grammar);

    match execute(parser, input.as_str()) {
        Match::Success { span, value } => {
            println!(
                "{} = {} (consumed {}..{})",
                input,
                value.downcast_ref::<i64>().unwrap(),
                span.start,
                span.end
            );
        }
        Match::Failure { span, message, .. } => {
            eprintln!("parse failed at {}: {}", span.start, message);
            std::process::exit(1);
        }
    }
}
