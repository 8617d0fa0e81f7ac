//! The driver: `execute`, `run`, `consume` (spec.md section 4.9).

use std::cell::OnceCell;
use std::rc::Rc;

use crate::engine::Engine;
use crate::input::Input;
use crate::match_::{schedule, Match, MatchItem, MatchResult};
use crate::parser::{Grammar, LazyParser, Parser};

/// Runs `root` over the whole of `input`, returning the single longest
/// `Success` ending at or before `input`'s length if any, else the best
/// tracked `Failure`.
pub fn execute<'arena, In: Input + 'arena>(root: &'arena Parser<'arena, In>, input: In) -> Match {
    Engine::run(root, input, 0, input.len())
}

/// As [`execute`], but panics on `Failure` with the rendered message,
/// returning the produced value on `Success` (spec.md section 4.9).
pub fn run<'arena, In: Input + 'arena>(root: &'arena Parser<'arena, In>, input: In) -> crate::value::Value {
    match execute(root, input) {
        Match::Success { value, .. } => value,
        Match::Failure { message, .. } => panic!("{}", message),
    }
}

/// Wraps `parser` so it only succeeds if it consumes the entire input;
/// otherwise emits a `Failure` at the point it stopped short.
pub fn consume<'arena, In: Input + 'arena>(
    grammar: &Grammar<'arena, In>,
    parser: impl Into<LazyParser<'arena, In>>,
) -> &'arena Parser<'arena, In> {
    let parser = parser.into();
    let matcher_p = parser.clone();

    let self_cell: Rc<OnceCell<&'arena Parser<'arena, In>>> = Rc::new(OnceCell::new());
    let matcher_self_cell = self_cell.clone();

    let consuming = grammar.node(Parser::new(
        "consume",
        vec![parser],
        true,
        |children| format!("{} to the end of the input", children[0]),
        Rc::new(move |input: In, index: usize| -> MatchResult<'arena, In> {
            let total_len = input.len();
            let self_cell = matcher_self_cell.clone();
            schedule(
                matcher_p.resolve(),
                index,
                Rc::new(move |m: Match| -> MatchResult<'arena, In> {
                    match m {
                        Match::Success { span, .. } if span.end != total_len => {
                            let self_parser = *self_cell
                                .get()
                                .expect("consume's parser cell is set before it can be activated");
                            vec![MatchItem::Terminal(Match::fail_expected(span.end, self_parser))]
                        }
                        other => vec![MatchItem::Terminal(other)],
                    }
                }),
            )
        }),
    ));

    self_cell
        .set(consuming)
        .unwrap_or_else(|_| unreachable!("consume's self-reference cell is only ever set here, once"));

    consuming
}

#[cfg(test)]
mod tests {
    use super::*;
    use typed_arena::Arena;

    use crate::test_support::literal;

    #[test]
    fn run_returns_the_value_on_success() {
        let arena = Arena::new();
        let grammar = Grammar::new(&arena);
        let hello = literal(&grammar, "hello");

        let value = run(hello, "hello");
        assert_eq!(value.downcast_ref::<String>().unwrap(), "hello");
    }

    #[test]
    #[should_panic(expected = "Expected")]
    fn run_panics_with_the_rendered_message_on_failure() {
        let arena = Arena::new();
        let grammar = Grammar::new(&arena);
        let hello = literal(&grammar, "hello");

        let _ = run(hello, "cat");
    }

    #[test]
    fn consume_fails_on_leftover_input() {
        let arena = Arena::new();
        let grammar = Grammar::new(&arena);
        let hello = literal(&grammar, "hello");
        let consuming = consume(&grammar, hello);

        assert!(!execute(consuming, "hello!").is_success());
        assert!(execute(consuming, "hello").is_success());
    }
}
