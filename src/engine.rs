//! The trampoline: the work queue, memoization cache, and best-failure
//! tracker that drive a parse to completion without recursing on the host
//! call stack (spec.md section 4.3).

use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::match_::{better_failure, Handler, Match, MatchItem, MatchResult};
use crate::parser::{Parser, ParserId};

#[cfg(feature = "tracing")]
use tracing::trace;

/// Where the eventual terminal output of a scheduled activation should be
/// delivered.
///
/// This is what lets a combinator's internal continuation chain (e.g.
/// `chain`'s second step) still feed back into the *original* cacheable
/// parser's cache entry, even though many trampoline turns separate the
/// cache miss from the eventual `Success`/`Failure` - and what lets an
/// uncacheable parser's internal schedules still end up routed through the
/// single handler that was attached to the original, uncached `Schedule`.
#[derive(Clone)]
enum Sink<'arena, In> {
    /// Feed into the cache entry for `(parser id, position)`.
    Cache(ParserId, usize),
    /// Feed into the root-level result collection of one `execute()` call.
    Root(Rc<RefCell<RootState>>),
    /// Apply `handler` to the eventual match, then route its output
    /// through the nested sink.
    Continue(Handler<'arena, In>, Rc<Sink<'arena, In>>),
}

/// One entry of the work queue.
enum QueueEntry<'arena, In> {
    /// Activate `parser` at `index`; once it produces a `Match`, run
    /// `handler` on it and route the result through `sink`.
    Schedule {
        parser: &'arena Parser<'arena, In>,
        index: usize,
        handler: Handler<'arena, In>,
        sink: Sink<'arena, In>,
    },
    /// A `Match` is already known (e.g. replayed from the cache to a
    /// waiter); run `handler` on it and route the result through `sink`.
    Deliver {
        result: Match,
        handler: Handler<'arena, In>,
        sink: Sink<'arena, In>,
    },
}

/// A registered continuation waiting on a cache entry's eventual results.
struct Waiter<'arena, In> {
    handler: Handler<'arena, In>,
    sink: Sink<'arena, In>,
}

/// The memoization cache entry for one `(parser, position)` pair (spec.md
/// section 3, "Cache Entry").
struct CacheEntry<'arena, In> {
    /// Deduplicated by `(span.end, value)`.
    results: Vec<Match>,
    waiters: Vec<Waiter<'arena, In>>,
    /// Sticky: set only while `results` is empty, replayed to every waiter
    /// once the queue fully drains (spec.md section 4.3.1).
    failure: Option<Match>,
}

impl<'arena, In> CacheEntry<'arena, In> {
    fn new() -> Self {
        CacheEntry {
            results: Vec::new(),
            waiters: Vec::new(),
            failure: None,
        }
    }

    /// Adds `m` (a `Success`) if its `(end, value)` isn't already present.
    /// Returns `true` if it was newly added.
    fn insert_success(&mut self, m: &Match) -> bool {
        let (end, value) = match m {
            Match::Success { span, value } => (span.end, value),
            Match::Failure { .. } => return false,
        };
        let duplicate = self.results.iter().any(|existing| match existing {
            Match::Success { span: s, value: v } => s.end == end && v == value,
            Match::Failure { .. } => false,
        });
        if duplicate {
            false
        } else {
            self.results.push(m.clone());
            true
        }
    }
}

struct RootState {
    end_index: usize,
    /// The longest `Success` seen so far; ties keep whichever arrived first,
    /// which is what makes a left-recursive rule's fully grown parse win
    /// over its own base case, and an `alt` tie resolve to the earlier-listed
    /// alternative (spec.md section 4.5, section 8 scenarios 3 and 6).
    best_success: Option<Match>,
    best_failure: Option<Match>,
}

/// The per-`execute()` trampoline: work queue, cache, and best-failure
/// tracker (spec.md section 3, "Trampoline state").
pub struct Engine<'arena, In> {
    queue: VecDeque<QueueEntry<'arena, In>>,
    cache: HashMap<(ParserId, usize), CacheEntry<'arena, In>>,
}

impl<'arena, In: Copy> Engine<'arena, In> {
    fn new() -> Self {
        Engine {
            queue: VecDeque::new(),
            cache: HashMap::new(),
        }
    }

    /// Runs `root` at `start_index`, returning the longest root `Success`
    /// ending at or before `end_index` if any (ties keep whichever arrived
    /// first), else the tracked best `Failure` (spec.md section 4.3,
    /// `execute`).
    pub fn run(
        root: &'arena Parser<'arena, In>,
        input: In,
        start_index: usize,
        end_index: usize,
    ) -> Match {
        let mut engine = Engine::new();

        let root_state = Rc::new(RefCell::new(RootState {
            end_index,
            best_success: None,
            best_failure: None,
        }));

        let sink = Sink::Root(root_state.clone());
        let identity: Handler<'arena, In> = Rc::new(|m: Match| vec![MatchItem::Terminal(m)]);
        engine.queue.push_back(QueueEntry::Schedule {
            parser: root,
            index: start_index,
            handler: identity,
            sink,
        });

        engine.drain_to_fixpoint(input);

        drop(engine);

        let root_state = Rc::try_unwrap(root_state)
            .unwrap_or_else(|_| unreachable!("no other owners remain once the engine drains"))
            .into_inner();

        root_state.best_success.unwrap_or_else(|| {
            root_state
                .best_failure
                .unwrap_or_else(|| Match::fail(start_index, "Expected input"))
        })
    }

    /// Drains the work queue, then sweeps every cache entry that's settled
    /// on a sticky failure (no successes, still-unserved waiters),
    /// delivering that failure and redraining, until nothing new happens
    /// (spec.md section 4.3.1).
    fn drain_to_fixpoint(&mut self, input: In) {
        loop {
            self.drain_queue(input);

            let pending_failures: Vec<((ParserId, usize), Match)> = self
                .cache
                .iter()
                .filter_map(|(key, entry)| {
                    if entry.results.is_empty() && !entry.waiters.is_empty() {
                        entry.failure.clone().map(|f| (*key, f))
                    } else {
                        None
                    }
                })
                .collect();

            if pending_failures.is_empty() {
                break;
            }

            for (key, failure) in pending_failures {
                let entry = self.cache.get_mut(&key).expect("entry still present");
                let waiters = std::mem::take(&mut entry.waiters);
                for waiter in waiters {
                    self.queue.push_back(QueueEntry::Deliver {
                        result: failure.clone(),
                        handler: waiter.handler,
                        sink: waiter.sink,
                    });
                }
            }
        }
    }

    fn drain_queue(&mut self, input: In) {
        while let Some(entry) = self.queue.pop_front() {
            match entry {
                QueueEntry::Schedule {
                    parser,
                    index,
                    handler,
                    sink,
                } => self.process_schedule(parser, index, handler, sink, input),
                QueueEntry::Deliver {
                    result,
                    handler,
                    sink,
                } => {
                    let items = handler(result);
                    self.process_items(items, sink);
                }
            }
        }
    }

    fn process_schedule(
        &mut self,
        parser: &'arena Parser<'arena, In>,
        index: usize,
        handler: Handler<'arena, In>,
        sink: Sink<'arena, In>,
        input: In,
    ) {
        if !parser.cacheable() {
            #[cfg(feature = "tracing")]
            trace!(parser = parser.name(), index, "activating uncached parser");
            let items = parser.activate(input, index);
            // `parser`'s own activation is the source of its result; once a
            // terminal match emerges (possibly after further trampoline
            // turns for any `Pending` items below), apply `handler` to it
            // and route onward through `sink`.
            self.process_items(items, Sink::Continue(handler, Rc::new(sink)));
            return;
        }

        let key = (parser.id(), index);
        if let Some(existing) = self.cache.get_mut(&key) {
            #[cfg(feature = "tracing")]
            trace!(parser = parser.name(), index, "cache hit");
            let replay: Vec<Match> = existing.results.clone();
            existing.waiters.push(Waiter {
                handler: handler.clone(),
                sink: sink.clone(),
            });
            for m in replay {
                let items = handler(m);
                self.process_items(items, sink.clone());
            }
        } else {
            #[cfg(feature = "tracing")]
            trace!(parser = parser.name(), index, "cache miss, activating");
            self.cache.insert(key, CacheEntry::new());
            self.cache
                .get_mut(&key)
                .unwrap()
                .waiters
                .push(Waiter { handler, sink });

            let items = parser.activate(input, index);
            self.process_items(items, Sink::Cache(parser.id(), index));
        }
    }

    /// Interprets a `MatchResult`: terminal items are delivered to `sink`
    /// (updating the cache and fanning out to waiters, recording a root
    /// result/failure, or continuing a handler chain); `Schedule` items
    /// are enqueued, carrying the same `sink` forward, since their
    /// eventual terminal output still belongs to whatever this batch of
    /// items was produced for.
    fn process_items(&mut self, items: MatchResult<'arena, In>, sink: Sink<'arena, In>) {
        for item in items {
            match item {
                MatchItem::Terminal(m) => self.deliver(sink.clone(), m),
                MatchItem::Pending(p) => {
                    self.queue.push_back(QueueEntry::Schedule {
                        parser: p.parser,
                        index: p.index,
                        handler: p.handler,
                        sink: sink.clone(),
                    });
                }
            }
        }
    }

    fn deliver(&mut self, sink: Sink<'arena, In>, m: Match) {
        match sink {
            Sink::Cache(id, index) => self.deliver_to_cache(id, index, m),
            Sink::Root(root) => Self::deliver_to_root(&root, m),
            Sink::Continue(handler, inner) => {
                let items = handler(m);
                self.process_items(items, (*inner).clone());
            }
        }
    }

    fn deliver_to_cache(&mut self, id: ParserId, index: usize, m: Match) {
        let key = (id, index);
        match &m {
            Match::Success { .. } => {
                let (is_new, waiters_snapshot) = {
                    let entry = self.cache.get_mut(&key).expect("cache entry must exist");
                    let is_new = entry.insert_success(&m);
                    let waiters_snapshot = if is_new {
                        entry
                            .waiters
                            .iter()
                            .map(|w| (w.handler.clone(), w.sink.clone()))
                            .collect::<Vec<_>>()
                    } else {
                        Vec::new()
                    };
                    (is_new, waiters_snapshot)
                };
                if is_new {
                    #[cfg(feature = "tracing")]
                    trace!(index, "new success recorded in cache");
                    for (handler, waiter_sink) in waiters_snapshot {
                        self.queue.push_back(QueueEntry::Deliver {
                            result: m.clone(),
                            handler,
                            sink: waiter_sink,
                        });
                    }
                }
            }
            Match::Failure { .. } => {
                let entry = self.cache.get_mut(&key).expect("cache entry must exist");
                if entry.results.is_empty() && entry.failure.is_none() {
                    entry.failure = Some(m);
                }
            }
        }
    }

    fn deliver_to_root(root: &Rc<RefCell<RootState>>, m: Match) {
        let mut root = root.borrow_mut();
        match m {
            Match::Success { span, .. } if span.end <= root.end_index => {
                let replace = match &root.best_success {
                    None => true,
                    Some(Match::Success { span: cur, .. }) => span.end > cur.end,
                    Some(Match::Failure { .. }) => unreachable!("best_success only ever holds a Success"),
                };
                if replace {
                    root.best_success = Some(m);
                }
            }
            // A root match that doesn't cover the requested bound isn't a
            // candidate result; the engine simply drops it.
            Match::Success { .. } => {}
            Match::Failure { .. } => {
                if better_failure(&m, &root.best_failure) {
                    root.best_failure = Some(m);
                }
            }
        }
    }
}
