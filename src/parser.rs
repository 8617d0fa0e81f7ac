//! Parser identity: the immutable node every combinator builds (spec.md
//! section 3, "Parser").

use std::cell::{Cell, OnceCell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use typed_arena::Arena;

use crate::errors::GrammarDefect;
use crate::match_::MatchResult;

/// A process-unique parser id, assigned on construction.
///
/// Two parsers built from identical definitions are still distinct cache
/// keys: identity is the id, never structural equality (spec.md section 3
/// and section 9, "Parser identity").
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParserId(u64);

impl ParserId {
    fn next() -> ParserId {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        ParserId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// The compiled matcher closure a parser was built from: `(input, index) ->
/// MatchResult` (spec.md section 4.1's Matcher contract, generalized to
/// every parser, not just leaves).
pub type Matcher<'arena, In> = Rc<dyn Fn(In, usize) -> MatchResult<'arena, In> + 'arena>;

/// An immutable grammar node.
///
/// Constructed once (by a combinator or a leaf matcher) and shared for the
/// lifetime of the grammar; a single invocation of [`execute`](crate::execute)
/// may activate the same `Parser` at many positions, each tracked
/// independently by the engine's cache.
pub struct Parser<'arena, In> {
    id: ParserId,
    name: &'static str,
    children: Vec<LazyParser<'arena, In>>,
    cacheable: bool,
    priority: Cell<u32>,
    describe: Box<dyn Fn(&[String]) -> String>,
    description: OnceCell<String>,
    matcher: Matcher<'arena, In>,
}

impl<'arena, In> Parser<'arena, In> {
    /// Builds a new parser node. Not normally called directly outside of
    /// the combinator algebra and leaf matchers; see
    /// [`Grammar::node`](Grammar::node).
    pub fn new(
        name: &'static str,
        children: Vec<LazyParser<'arena, In>>,
        cacheable: bool,
        describe: impl Fn(&[String]) -> String + 'static,
        matcher: Matcher<'arena, In>,
    ) -> Self {
        Parser {
            id: ParserId::next(),
            name,
            children,
            cacheable,
            priority: Cell::new(0),
            describe: Box::new(describe),
            description: OnceCell::new(),
            matcher,
        }
    }

    /// This parser's process-unique id; the engine's cache key is `(id, position)`.
    #[inline]
    pub fn id(&self) -> ParserId {
        self.id
    }

    /// The short tag this parser was constructed with (e.g. `"chain"`, `"alt"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// This parser's children, in construction order.
    #[inline]
    pub fn children(&self) -> &[LazyParser<'arena, In>] {
        &self.children
    }

    /// `true` iff this parser's result at a position is a pure function of
    /// `(parser, position, input)` and may therefore be memoized.
    #[inline]
    pub fn cacheable(&self) -> bool {
        self.cacheable
    }

    /// The priority tagged onto this parser's failures (default 0), set via
    /// the external `named(name, priority)` wrapper (spec.md section 6).
    #[inline]
    pub fn priority(&self) -> u32 {
        self.priority.get()
    }

    /// Overrides the priority used when this parser's failures are ranked
    /// by [`crate::engine`]'s best-failure selection.
    #[inline]
    pub fn set_priority(&self, priority: u32) {
        self.priority.set(priority);
    }

    /// This parser's human description, memoized from `describe` applied
    /// to the children's descriptions.
    pub fn description(&self) -> &str {
        self.description.get_or_init(|| {
            let child_descriptions: Vec<String> = self
                .children
                .iter()
                .map(|c| c.resolve().description().to_owned())
                .collect();
            (self.describe)(&child_descriptions)
        })
    }

    /// Overrides this parser's description (used by the external `named`
    /// wrapper). Only valid before the description has been computed/cached.
    pub fn set_description(&self, description: String) {
        // `named()` always wraps a freshly-built parser before it is ever
        // activated, so the memoized slot is still empty.
        if self.description.set(description).is_err() {
            GrammarDefect::MalformedHandlerOutput.raise();
        }
    }

    /// Runs this parser's compiled matcher at `index`.
    #[inline]
    pub fn activate(&self, input: In, index: usize) -> MatchResult<'arena, In> {
        (self.matcher)(input, index)
    }
}

/// A parser reference that may be resolved lazily, for grammars that are
/// cyclic (a rule mentions itself, possibly through other rules).
///
/// Either an already-built parser, or a thunk that is resolved exactly
/// once at first use and memoized from then on (spec.md section 9, "Lazy
/// parser references"). Cheap to clone (an `Rc` around the resolution
/// state): the same lazy reference is shared between a parser's
/// `children` list (used for descriptions) and the matcher closure that
/// resolves it at match time, without resolving the thunk prematurely at
/// construction time.
#[derive(Clone)]
pub struct LazyParser<'arena, In>(Rc<LazyInner<'arena, In>>);

enum LazyInner<'arena, In> {
    /// A parser already built and allocated in the grammar arena.
    Eager(&'arena Parser<'arena, In>),
    /// A not-yet-resolved self-reference.
    Thunk {
        resolved: OnceCell<&'arena Parser<'arena, In>>,
        thunk: RefCell<Option<Box<dyn FnOnce() -> &'arena Parser<'arena, In> + 'arena>>>,
    },
}

impl<'arena, In> LazyParser<'arena, In> {
    /// Wraps an already-built parser.
    #[inline]
    pub fn eager(parser: &'arena Parser<'arena, In>) -> Self {
        LazyParser(Rc::new(LazyInner::Eager(parser)))
    }

    /// Wraps a thunk that builds (or looks up) the parser on first use.
    ///
    /// Typical use: a rule that refers to itself passes a closure that
    /// looks up a `&'arena Parser` cell filled in after the rule is fully
    /// wired up.
    #[inline]
    pub fn thunk(f: impl FnOnce() -> &'arena Parser<'arena, In> + 'arena) -> Self {
        LazyParser(Rc::new(LazyInner::Thunk {
            resolved: OnceCell::new(),
            thunk: RefCell::new(Some(Box::new(f))),
        }))
    }

    /// Resolves this reference to the underlying parser, running (and
    /// memoizing) the thunk on first use.
    pub fn resolve(&self) -> &'arena Parser<'arena, In> {
        match &*self.0 {
            LazyInner::Eager(p) => p,
            LazyInner::Thunk { resolved, thunk } => *resolved.get_or_init(|| {
                let f = thunk
                    .borrow_mut()
                    .take()
                    .unwrap_or_else(|| GrammarDefect::LazyResolvedTwice.raise());
                f()
            }),
        }
    }
}

impl<'arena, In> From<&'arena Parser<'arena, In>> for LazyParser<'arena, In> {
    #[inline]
    fn from(parser: &'arena Parser<'arena, In>) -> Self {
        LazyParser::eager(parser)
    }
}

/// Owns the arena a grammar's parser nodes are allocated in.
///
/// Parsers form a DAG with potential cycles (through [`LazyParser`]
/// thunks); arena allocation sidesteps `Rc`/`Weak` cycle bookkeeping
/// entirely; the grammar and all its nodes are freed together when the
/// arena drops (grounded on `typed_arena::Arena`'s use in
/// `metamath-knife` for the same cyclic-ownership problem).
pub struct Grammar<'arena, In> {
    arena: &'arena Arena<Parser<'arena, In>>,
}

impl<'arena, In> Grammar<'arena, In> {
    /// Creates a grammar backed by the given arena.
    #[inline]
    pub fn new(arena: &'arena Arena<Parser<'arena, In>>) -> Self {
        Grammar { arena }
    }

    /// Allocates a parser node in this grammar's arena, returning a stable
    /// reference usable as a cache key and as a child of other nodes.
    #[inline]
    pub fn node(&self, parser: Parser<'arena, In>) -> &'arena Parser<'arena, In> {
        self.arena.alloc(parser)
    }
}
