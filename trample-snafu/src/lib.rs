//! Helpers for using trample together with snafu

#![deny(rust_2018_idioms)]
#![warn(missing_docs)]
#![warn(clippy::missing_inline_in_public_items)]

use snafu::Snafu;
use trample::{Match, Span, Value};

/// A parse [`Failure`](trample::Match::Failure), lifted into a
/// `std::error::Error` so it can be used as a snafu error source.
#[derive(Debug, Snafu)]
#[snafu(display("{}", message))]
pub struct ParseFailure {
    /// The position the failure was reported at.
    pub span: Span,
    /// The rendered failure message (`"Expected " + description`, or a
    /// combinator-supplied message).
    pub message: String,
}

/// Extension trait for trample's [`Match`](trample::Match), for integration
/// with snafu-derived error enums.
pub trait MatchSnafuExt {
    /// Converts a `Match` into a plain `Result`, with `Failure` lifted into
    /// a [`ParseFailure`].
    fn into_result(self) -> Result<Value, ParseFailure>;

    /// Maps a `Failure` to a snafu error, with the [`ParseFailure`] as its source.
    ///
    /// `context_fn` has to be a function that returns the context selector of that error.
    fn snafu<C, F, E2>(self, context_fn: F) -> Result<Value, E2>
    where
        C: snafu::IntoError<E2, Source = ParseFailure>,
        F: FnOnce(&ParseFailure) -> C,
        E2: std::error::Error + snafu::ErrorCompat;

    /// Maps a `Failure` to a snafu leaf error, discarding the
    /// [`ParseFailure`] as a source (only its message/span are visible to
    /// `context_fn`).
    ///
    /// `context_fn` has to be a function that returns the context selector of that leaf error.
    fn snafu_leaf<C, F, E2>(self, context_fn: F) -> Result<Value, E2>
    where
        C: snafu::IntoError<E2, Source = snafu::NoneError>,
        F: FnOnce(&ParseFailure) -> C,
        E2: std::error::Error + snafu::ErrorCompat;
}

impl MatchSnafuExt for Match {
    #[inline]
    fn into_result(self) -> Result<Value, ParseFailure> {
        match self {
            Match::Success { value, .. } => Ok(value),
            Match::Failure { span, message, .. } => Err(ParseFailure {
                span,
                message: message.to_string(),
            }),
        }
    }

    #[inline]
    fn snafu<C, F, E2>(self, context_fn: F) -> Result<Value, E2>
    where
        C: snafu::IntoError<E2, Source = ParseFailure>,
        F: FnOnce(&ParseFailure) -> C,
        E2: std::error::Error + snafu::ErrorCompat,
    {
        match self.into_result() {
            Ok(v) => Ok(v),
            Err(failure) => {
                let selector = context_fn(&failure);
                Err(selector.into_error(failure))
            }
        }
    }

    #[inline]
    fn snafu_leaf<C, F, E2>(self, context_fn: F) -> Result<Value, E2>
    where
        C: snafu::IntoError<E2, Source = snafu::NoneError>,
        F: FnOnce(&ParseFailure) -> C,
        E2: std::error::Error + snafu::ErrorCompat,
    {
        match self.into_result() {
            Ok(v) => Ok(v),
            Err(failure) => {
                let selector = context_fn(&failure);
                Err(selector.into_error(snafu::NoneError))
            }
        }
    }
}
