//! Concrete-scenario integration tests (spec.md section 8).
//!
//! Each of these exercises a combinator the way a caller outside the crate
//! would: building a small grammar out of leaf matchers, running it through
//! [`trample::execute`], and checking the span/value it produces.

mod common;

use std::cell::OnceCell;
use std::rc::Rc;

use typed_arena::Arena;

use common::{chars_plus, literal};
use trample::combinators::{alt, chain, check, not, optional, optional_or, seq2, seq3};
use trample::{execute, Grammar, LazyParser, Match, Parser, Value};

#[test]
fn chain_combines_two_matches_into_one_value() {
    let arena = Arena::new();
    let grammar = Grammar::new(&arena);
    let greeting = literal(&grammar, "hello");
    let name = literal(&grammar, "world");
    let combined = chain(&grammar, greeting, name, |g, n| {
        let g = g.downcast_ref::<String>().unwrap();
        let n = n.downcast_ref::<String>().unwrap();
        Value::new(format!("{} {}", g, n))
    });

    match execute(combined, "helloworld") {
        Match::Success { span, value } => {
            assert_eq!((span.start, span.end), (0, 10));
            assert_eq!(value.downcast_ref::<String>().unwrap(), "hello world");
        }
        Match::Failure { .. } => panic!("expected success"),
    }
}

#[test]
fn alt_takes_whichever_alternative_matches() {
    let arena = Arena::new();
    let grammar = Grammar::new(&arena);
    let hello = literal(&grammar, "hello");
    let goodbye = literal(&grammar, "goodbye");
    let greeting = alt(&grammar, vec![hello.into(), goodbye.into()]);

    match execute(greeting, "goodbye") {
        Match::Success { value, .. } => {
            assert_eq!(value.downcast_ref::<String>().unwrap(), "goodbye");
        }
        Match::Failure { .. } => panic!("expected success"),
    }
}

#[test]
fn alt_fails_naming_itself_when_nothing_matches() {
    let arena = Arena::new();
    let grammar = Grammar::new(&arena);
    let hello = literal(&grammar, "hello");
    let goodbye = literal(&grammar, "goodbye");
    let greeting = alt(&grammar, vec![hello.into(), goodbye.into()]);

    match execute(greeting, "yo") {
        Match::Failure { span, .. } => assert_eq!((span.start, span.end), (0, 0)),
        Match::Success { .. } => panic!("expected failure"),
    }
}

/// `seq(chars_plus("b"), optional(literal("c")), chars_plus("d"))` on
/// `"bbbd"`: `optional`'s "consume" branch can't be followed by a `d`, so
/// only its "skip" branch lets the rest of the sequence succeed. Exercises
/// the two-live-branches invariant from the outside, since only a
/// downstream failure can force the choice between them.
#[test]
fn optional_skip_branch_survives_when_the_consume_branch_is_a_dead_end() {
    let arena = Arena::new();
    let grammar = Grammar::new(&arena);
    let bs = chars_plus(&grammar, "b");
    let maybe_c = optional(&grammar, literal(&grammar, "c"));
    let ds = chars_plus(&grammar, "d");
    let sequence = seq3(&grammar, bs, maybe_c, ds);

    match execute(sequence, "bbbd") {
        Match::Success { span, value } => {
            assert_eq!((span.start, span.end), (0, 4));
            let values = value.downcast_ref::<Vec<Value>>().unwrap();
            assert_eq!(values[0].downcast_ref::<String>().unwrap(), "bbb");
            assert_eq!(values[2].downcast_ref::<String>().unwrap(), "d");
        }
        Match::Failure { .. } => panic!("expected success"),
    }
}

/// Standalone, `optional`'s consume branch is longer than its skip branch,
/// so the engine's longest-match rule at the root picks it.
#[test]
fn optional_prefers_the_consuming_branch_when_run_standalone() {
    let arena = Arena::new();
    let grammar = Grammar::new(&arena);
    let maybe_c = optional(&grammar, literal(&grammar, "c"));

    match execute(maybe_c, "c") {
        Match::Success { span, value } => {
            assert_eq!((span.start, span.end), (0, 1));
            assert_eq!(value.downcast_ref::<String>().unwrap(), "c");
        }
        Match::Failure { .. } => panic!("expected success"),
    }
}

#[test]
fn optional_or_falls_back_to_the_given_default() {
    let arena = Arena::new();
    let grammar = Grammar::new(&arena);
    let maybe_c = optional_or(&grammar, literal(&grammar, "c"), Value::new("none".to_owned()));

    match execute(maybe_c, "z") {
        Match::Success { span, value } => {
            assert_eq!((span.start, span.end), (0, 0));
            assert_eq!(value.downcast_ref::<String>().unwrap(), "none");
        }
        Match::Failure { .. } => panic!("expected success"),
    }
}

#[test]
fn not_blocks_a_reserved_word_before_a_general_identifier_rule() {
    let arena = Arena::new();
    let grammar = Grammar::new(&arena);
    let reserved = literal(&grammar, "if");
    let identifier_chars = chars_plus(&grammar, "ifelsxyz");
    let identifier = chain(&grammar, not(&grammar, reserved), identifier_chars, |_, ident| ident);

    assert!(!execute(identifier, "if").is_success());

    match execute(identifier, "else") {
        Match::Success { value, .. } => {
            assert_eq!(value.downcast_ref::<String>().unwrap(), "else");
        }
        Match::Failure { .. } => panic!("expected success"),
    }
}

#[test]
fn check_peeks_a_terminator_without_consuming_it() {
    let arena = Arena::new();
    let grammar = Grammar::new(&arena);
    let word = chars_plus(&grammar, "ab");
    let semi = literal(&grammar, ";");
    let statement = seq2(&grammar, word, check(&grammar, semi));

    match execute(statement, "ab;") {
        Match::Success { span, .. } => assert_eq!((span.start, span.end), (0, 2)),
        Match::Failure { .. } => panic!("expected success"),
    }
}

/// A custom priority/description on one alternative wins the failure
/// message even though it isn't first-listed, as long as it's the
/// highest-priority failure (spec.md section 4.3.2, section 8 scenario 6).
#[test]
fn a_higher_priority_alternative_names_the_failure() {
    let arena = Arena::new();
    let grammar = Grammar::new(&arena);
    let x = literal(&grammar, "x");
    let y = literal(&grammar, "y");
    let keyword = literal(&grammar, "z");
    keyword.set_priority(1);
    keyword.set_description("a keyword".to_owned());
    let parser = alt(&grammar, vec![x.into(), y.into(), keyword.into()]);

    match execute(parser, "q") {
        Match::Failure { message, .. } => assert_eq!(&*message, "Expected a keyword"),
        Match::Success { .. } => panic!("expected failure"),
    }
}

/// `E = E '+' N | N` parses `"1+2+3"` as a left-associative fold without
/// overflowing the host stack; the engine's longest-match rule at the root
/// picks the fully grown parse over any of the shorter intermediate ones
/// the fixed point necessarily produces along the way (spec.md section 4.3,
/// section 8's left-recursion boundary behavior).
#[test]
fn left_recursive_rule_folds_left_associatively() {
    let arena = Arena::new();
    let grammar = Grammar::new(&arena);

    let digits = chars_plus(&grammar, "0123456789");
    let plus = literal(&grammar, "+");

    let expr_cell: Rc<OnceCell<&Parser<'_, &str>>> = Rc::new(OnceCell::new());
    let expr_cell_for_thunk = expr_cell.clone();
    let expr_lazy = LazyParser::thunk(move || *expr_cell_for_thunk.get().expect("expr resolved before being set"));

    let tail = chain(&grammar, plus, digits, |_plus, n| n);
    let recurse = chain(&grammar, expr_lazy, tail, |acc, n| {
        let acc = acc.downcast_ref::<String>().unwrap();
        let n = n.downcast_ref::<String>().unwrap();
        Value::new(format!("{}+{}", acc, n))
    });

    let expr = alt(&grammar, vec![recurse.into(), digits.into()]);
    expr_cell
        .set(expr)
        .unwrap_or_else(|_| unreachable!("expr's self-reference cell is only ever set here, once"));

    match execute(expr, "1+2+3") {
        Match::Success { span, value } => {
            assert_eq!((span.start, span.end), (0, 5));
            assert_eq!(value.downcast_ref::<String>().unwrap(), "1+2+3");
        }
        Match::Failure { .. } => panic!("expected success"),
    }
}
