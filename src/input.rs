//! The indexable atom sequence a grammar parses over (spec.md section 3,
//! "Atom & Sequence").
//!
//! The core never owns or copies the input; it only needs to know how long
//! it is (for `execute`'s default `endIndex` and for `consume`). Leaf
//! matchers are the only code that actually indexes into it, and they are
//! out of core scope.

/// A cheaply-`Copy`-able view of the input sequence.
///
/// Implemented for `&str` and `&[T]`, the two atom sequences the example
/// grammars in this crate use; a host embedding a different atom type can
/// implement it for its own slice-like view.
pub trait Input: Copy {
    /// The number of atoms in the sequence.
    fn len(&self) -> usize;

    /// `true` iff the sequence has no atoms.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Input for &str {
    #[inline]
    fn len(&self) -> usize {
        str::len(self)
    }
}

impl<'a, T> Input for &'a [T] {
    #[inline]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }
}
