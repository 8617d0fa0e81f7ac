//! Grammar defects: programmer errors that abort a parse synchronously
//! rather than being reported as an ordinary [`Failure`](crate::Match::Failure).
//!
//! See spec.md section 7.2. These are raised (by panicking with the rendered
//! message) rather than returned, since they indicate the grammar itself is
//! malformed, not that the input didn't match it.

use snafu::Snafu;

/// A programmer error in how a grammar was built, discovered while running it.
#[derive(Debug, Snafu)]
#[snafu(visibility = "pub(crate)")]
pub enum GrammarDefect {
    /// A `repeat` child matched zero atoms; repeating it could loop forever.
    #[snafu(display(
        "Repeating parser isn't making progress at position {}: {}",
        position,
        description
    ))]
    NoProgress {
        /// The position at which the non-progressing match occurred.
        position: usize,
        /// The description of the repeated parser.
        description: String,
    },

    /// A `Schedule`'s handler produced something other than terminal
    /// matches or further schedules (the "impossible case" of spec.md
    /// section 7.2). Only reachable if a combinator is implemented
    /// incorrectly.
    #[snafu(display("internal error: handler produced a non-match result"))]
    MalformedHandlerOutput,

    /// A lazily-resolved parser thunk was polled again after having
    /// already produced its parser once.
    #[snafu(display("lazy parser thunk was resolved more than once"))]
    LazyResolvedTwice,
}

impl GrammarDefect {
    /// Aborts the current parse with this defect, matching spec.md's
    /// "raised synchronously, aborting the parse".
    #[inline]
    pub(crate) fn raise(self) -> ! {
        panic!("{}", self);
    }
}
