//! The combinator algebra: the fundamental parsers and composition
//! operators built on top of [`crate::engine`] and [`crate::parser`]
//! (spec.md section 4.4 onward).

mod alt;
mod chain;
mod label;
mod lookaround;
mod optional;
mod repeat;

pub use alt::alt;
pub use chain::{chain, seq, seq2, seq3, seq4, seq5};
pub use label::{map, named};
pub use lookaround::{check, not};
pub use optional::{optional, optional_or};
pub use repeat::repeat;
