#![warn(clippy::missing_inline_in_public_items)]
#![deny(rust_2018_idioms)]
#![warn(missing_docs)]

//! A trampolined parser-combinator core.
//!
//! Grammars built from this crate's primitives support arbitrary
//! context-free rules — including left-recursive and ambiguous ones —
//! because parser activations are interleaved on an explicit work queue
//! (the [`engine`]'s trampoline) rather than recursed into on the host call
//! stack, and each `(parser, position)` subproblem is solved exactly once
//! via memoization.
//!
//! The pieces:
//! - [`Span`] / [`Value`]: positions into the input and the type-erased
//!   values a grammar produces.
//! - [`Match`]: the sum type every parser activation resolves to.
//! - [`Parser`] / [`Grammar`] / [`LazyParser`]: grammar node identity,
//!   allocation, and self-reference for cyclic (left-recursive) rules.
//! - [`combinators`]: `chain`, `seq`, `alt`, `optional`, `check`, `not`,
//!   `repeat` — the algebra grammars are built from.
//! - [`execute`], [`run`], [`consume`]: the driver entry points.

pub mod combinators;
mod driver;
mod engine;
mod errors;
mod input;
mod match_;
mod parser;
mod span;
#[cfg(test)]
mod test_support;
mod value;

pub use self::driver::{consume, execute, run};
pub use self::errors::GrammarDefect;
pub use self::input::Input;
pub use self::match_::{
    defer, fail, fail_expected, schedule, success, Handler, Match, MatchItem, MatchResult, Pending,
};
pub use self::parser::{Grammar, LazyParser, Parser, ParserId};
pub use self::span::Span;
pub use self::value::Value;
