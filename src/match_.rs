//! The Match model: the sum type produced by a parser activation, plus the
//! helpers combinators use to build it (spec.md section 4.2).

use std::rc::Rc;

use crate::parser::Parser;
use crate::span::Span;
use crate::value::Value;

/// The outcome of activating a parser at a position.
#[derive(Debug, Clone)]
pub enum Match {
    /// The parser consumed `input[span.start..span.end]`, producing `value`.
    Success {
        /// The consumed span.
        span: Span,
        /// The value produced.
        value: Value,
    },
    /// The parser rejected the input at `span.start == span.end`.
    Failure {
        /// The position of the failure (`start == end`).
        span: Span,
        /// A human-readable description of what was expected.
        message: Rc<str>,
        /// Used by `alt` and the engine to pick the most informative
        /// failure to report (spec.md section 4.3.2). Higher wins; 0 is
        /// the default given to every failure unless a `named(..,
        /// priority)` wrapper tagged it otherwise.
        priority: u32,
    },
}

impl Match {
    /// Builds a `Success` at `[start, end)` with `value`.
    #[inline]
    pub fn success(start: usize, end: usize, value: Value) -> Match {
        Match::Success {
            span: Span::new(start, end),
            value,
        }
    }

    /// Builds a zero-width `Failure` at `index` with a plain message.
    #[inline]
    pub fn fail(index: usize, message: impl Into<Rc<str>>) -> Match {
        Match::Failure {
            span: Span::empty(index),
            message: message.into(),
            priority: 0,
        }
    }

    /// Builds a zero-width `Failure` at `index` naming a parser: the message
    /// becomes `"Expected " + parser.description()`.
    #[inline]
    pub fn fail_expected<'arena, In>(index: usize, parser: &Parser<'arena, In>) -> Match {
        Match::Failure {
            span: Span::empty(index),
            message: format!("Expected {}", parser.description()).into(),
            priority: parser.priority(),
        }
    }

    /// The span of this match, regardless of variant.
    #[inline]
    pub fn span(&self) -> Span {
        match self {
            Match::Success { span, .. } => *span,
            Match::Failure { span, .. } => *span,
        }
    }

    /// `true` if this is a `Success`.
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Match::Success { .. })
    }

    /// Maps a `Success`'s span and value to a new match; passes `Failure`
    /// through unchanged (spec.md section 4.2, `mapMatch`).
    #[inline]
    pub fn map(self, f: impl FnOnce(Span, Value) -> Value) -> Match {
        match self {
            Match::Success { span, value } => Match::Success {
                span,
                value: f(span, value),
            },
            failure => failure,
        }
    }
}

/// Ranks two failures per spec.md section 4.3.2: highest priority first,
/// then latest `span.start`. `true` if `candidate` should replace `current`.
///
/// Shared by the engine's root best-failure tracker and `alt`'s
/// all-children-failed synthesis, since both implement the same rule.
pub(crate) fn better_failure(candidate: &Match, current: &Option<Match>) -> bool {
    let (cand_prio, cand_start) = match candidate {
        Match::Failure { span, priority, .. } => (*priority, span.start),
        Match::Success { .. } => return false,
    };
    match current {
        None => true,
        Some(Match::Failure { span, priority, .. }) => (cand_prio, cand_start) > (*priority, span.start),
        Some(Match::Success { .. }) => true,
    }
}

/// A handler is a parser activation's continuation: given the eventual
/// [`Match`] of a scheduled sub-parser, it produces the next batch of
/// matches and/or further schedules.
///
/// Stored as a reference-counted closure because a single cache entry may
/// replay a match to many waiters (spec.md's "Waiter" concept), so the
/// handler needs to be callable more than once.
pub type Handler<'arena, In> = Rc<dyn Fn(Match) -> MatchResult<'arena, In> + 'arena>;

/// A deferred activation: "evaluate `parser` at `index`, then feed its
/// `Match` into `handler`" (spec.md section 3, "Match").
pub struct Pending<'arena, In> {
    pub(crate) parser: &'arena Parser<'arena, In>,
    pub(crate) index: usize,
    pub(crate) handler: Handler<'arena, In>,
}

/// One item of a [`MatchResult`]: either a terminal match, or a pending
/// sub-activation that must itself be scheduled on the trampoline.
pub enum MatchItem<'arena, In> {
    /// A finished `Success` or `Failure`.
    Terminal(Match),
    /// A `Schedule`: run `parser` at `index`, route its result through `handler`.
    Pending(Pending<'arena, In>),
}

/// The return type of every parser matcher and every handler: a list,
/// because one activation may yield zero, one, or several items (spec.md
/// section 3, "A `MatchResult` is a list").
pub type MatchResult<'arena, In> = Vec<MatchItem<'arena, In>>;

/// `[Success]`.
#[inline]
pub fn success<'arena, In>(start: usize, end: usize, value: Value) -> MatchResult<'arena, In> {
    vec![MatchItem::Terminal(Match::success(start, end, value))]
}

/// `[Failure]`.
#[inline]
pub fn fail<'arena, In>(index: usize, message: impl Into<Rc<str>>) -> MatchResult<'arena, In> {
    vec![MatchItem::Terminal(Match::fail(index, message))]
}

/// `[Failure]`, naming a parser as the expectation.
#[inline]
pub fn fail_expected<'arena, In>(
    index: usize,
    parser: &'arena Parser<'arena, In>,
) -> MatchResult<'arena, In> {
    vec![MatchItem::Terminal(Match::fail_expected(index, parser))]
}

/// `[Schedule(parser, index, handler)]`.
#[inline]
pub fn schedule<'arena, In>(
    parser: &'arena Parser<'arena, In>,
    index: usize,
    handler: Handler<'arena, In>,
) -> MatchResult<'arena, In> {
    vec![MatchItem::Pending(Pending {
        parser,
        index,
        handler,
    })]
}

/// Runs `parser` at `index` and passes its `Match` through unchanged: a
/// schedule whose handler is the identity continuation.
#[inline]
pub fn defer<'arena, In>(
    parser: &'arena Parser<'arena, In>,
    index: usize,
) -> MatchResult<'arena, In> {
    schedule(parser, index, Rc::new(|m: Match| vec![MatchItem::Terminal(m)]))
}
