//! Worker-pool solver with a tunable trade-off between speed and optimality.
//!
//! Workers pull nodes from one shared frontier and record costs in one shared
//! visited map; those two structures are the only state they share, each
//! behind its own mutex.
//!
//! The [`ExplorationBias`] decides two things:
//!
//! - **Order.** Nodes are ranked by `bias * (g + h) - (1 - bias)² * depth`,
//!   lowest first. At 1.0 this is plain best-first order. With unit move
//!   costs a step that worsens the estimate still lowers the rank below
//!   about 0.27, so [`ExplorationBias::DEPTH`] dives straight down while
//!   [`ExplorationBias::OPTIMUM`] only dives along steps that look useful.
//! - **When to stop.** The first goal found becomes the incumbent and nodes
//!   that cannot beat it are dropped. After `E` completed expansions have
//!   produced that first goal, the pool may spend `floor(E * bias / (1 - bias))`
//!   further expansions looking for something cheaper. At 1.0 there is no
//!   limit: the search ends only once the frontier is exhausted, so the
//!   returned path is a cheapest one.
//!
//! Two workers can race on the same position and both expand it. That wastes
//! work but never changes the answer, because the visited map keeps the
//! cheapest cost seen.
//!
//! ```text
//!            ┌─────────────────────────────┐
//!   root ──▶ │ frontier (rank, seq) + pool │ ◀── children
//!            └─────────────────────────────┘
//!               │        │        │
//!               ▼        ▼        ▼
//!           worker 0  worker 1  worker n ──▶ visited map (position -> g)
//! ```

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace, warn};

use crate::error::SearchError;
use crate::node::SearchNode;
use crate::puzzle::Puzzle;
use crate::solver::{notify_expand, report_finished, Interrupt, Outcome, PuzzleSolver, SearchStats};

/// How long an idle worker sleeps before re-checking the interrupt flag
const IDLE_POLL: Duration = Duration::from_millis(10);

/// Worker count when the platform cannot report its parallelism
const FALLBACK_WORKERS: usize = 4;

/// Position of the concurrent search on the depth (fast) to breadth
/// (optimal) spectrum. Always in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplorationBias(f64);

impl ExplorationBias {
    /// Exhaustive; finds the shortest solution but takes longest
    pub const BREADTH: Self = Self(1.0);
    /// Races towards the first solution found
    pub const DEPTH: Self = Self(0.12);
    /// Balance between the two
    pub const OPTIMUM: Self = Self(0.3);

    pub fn new(value: f64) -> Result<Self, SearchError> {
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(SearchError::InvalidBias(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    fn rank(self, bound: u64, depth: usize) -> f64 {
        let pull = 1.0 - self.0;
        self.0 * bound as f64 - pull * pull * depth as f64
    }

    /// Expansions allowed after the first goal; `None` means until the
    /// frontier runs dry
    fn refinement_budget(self, expansions: u64) -> Option<u64> {
        if self.0 >= 1.0 {
            None
        } else {
            Some((expansions as f64 * self.0 / (1.0 - self.0)).floor() as u64)
        }
    }
}

impl Default for ExplorationBias {
    fn default() -> Self {
        Self::OPTIMUM
    }
}

/// A frontier entry
struct Pending<P, M> {
    rank: f64,
    seq: u64,
    cost: u64,
    /// Cost so far plus estimate
    bound: u64,
    node: Arc<SearchNode<P, M>>,
}

impl<P, M> PartialEq for Pending<P, M> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<P, M> Eq for Pending<P, M> {}

impl<P, M> Ord for Pending<P, M> {
    // Lowest rank first, then oldest
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .rank
            .total_cmp(&self.rank)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<P, M> PartialOrd for Pending<P, M> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A freshly generated node on its way back to the pool
struct Child<P, M> {
    node: Arc<SearchNode<P, M>>,
    cost: u64,
    bound: u64,
    is_goal: bool,
}

/// Cheapest goal found so far
struct Incumbent<P, M> {
    cost: u64,
    node: Arc<SearchNode<P, M>>,
}

/// Everything guarded by the pool mutex
struct Pool<P, M> {
    frontier: BinaryHeap<Pending<P, M>>,
    seq: u64,
    /// Workers currently expanding a node
    active: usize,
    expansions: u64,
    incumbent: Option<Incumbent<P, M>>,
    refinement_left: Option<u64>,
    finished: bool,
    interrupted: bool,
}

impl<P, M> Pool<P, M> {
    fn new() -> Self {
        Self {
            frontier: BinaryHeap::new(),
            seq: 0,
            active: 0,
            expansions: 0,
            incumbent: None,
            refinement_left: None,
            finished: false,
            interrupted: false,
        }
    }

    /// Whether something bounded below by `bound` could beat the incumbent
    fn improves(&self, bound: u64) -> bool {
        self.incumbent.as_ref().map_or(true, |goal| bound < goal.cost)
    }

    fn push(&mut self, bias: ExplorationBias, child: Child<P, M>) {
        self.seq += 1;
        self.frontier.push(Pending {
            rank: bias.rank(child.bound, child.node.depth()),
            seq: self.seq,
            cost: child.cost,
            bound: child.bound,
            node: child.node,
        });
    }
}

struct Shared<P: Puzzle> {
    pool: Mutex<Pool<P::Position, P::Move>>,
    wake: Condvar,
    /// Cheapest known cost per canonical position
    seen: Mutex<HashMap<P::Position, u64>>,
    tries: AtomicU64,
}

impl<P: Puzzle> Shared<P> {
    fn new() -> Self {
        Self {
            pool: Mutex::new(Pool::new()),
            wake: Condvar::new(),
            seen: Mutex::new(HashMap::new()),
            tries: AtomicU64::new(0),
        }
    }

    // A panicking worker must not wedge the others, so poisoning is ignored;
    // the panic itself is reported when the worker is joined.
    fn lock_pool(&self) -> MutexGuard<'_, Pool<P::Position, P::Move>> {
        self.pool.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_seen(&self) -> MutexGuard<'_, HashMap<P::Position, u64>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stop every worker at its next pull
    fn abort(&self) {
        self.lock_pool().finished = true;
        self.wake.notify_all();
    }
}

/// Shuts the pool down if the owning worker unwinds
struct AbortOnPanic<'s, P: Puzzle> {
    shared: &'s Shared<P>,
}

impl<'s, P: Puzzle> Drop for AbortOnPanic<'s, P> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.shared.abort();
        }
    }
}

pub struct ConcurrentSolver<'a, P: Puzzle> {
    puzzle: &'a P,
    bias: ExplorationBias,
    workers: usize,
    interrupt: Interrupt,
    stats: SearchStats,
}

impl<'a, P> ConcurrentSolver<'a, P>
where
    P: Puzzle + Sync,
    P::Position: Send + Sync,
    P::Move: Send + Sync,
{
    /// Create a solver using one worker per available hardware thread
    pub fn new(puzzle: &'a P, bias: ExplorationBias) -> Self {
        let workers = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(FALLBACK_WORKERS);
        Self {
            puzzle,
            bias,
            workers,
            interrupt: Interrupt::new(),
            stats: SearchStats::default(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn exploration_bias(&self) -> ExplorationBias {
        self.bias
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Block until there is a node to expand or the search is over
    fn next_node(&self, shared: &Shared<P>) -> Option<Pending<P::Position, P::Move>> {
        let mut pool = shared.lock_pool();
        loop {
            if pool.finished {
                return None;
            }
            if self.interrupt.is_interrupted() {
                pool.interrupted = true;
                pool.finished = true;
                shared.wake.notify_all();
                return None;
            }
            if let Some(pending) = pool.frontier.pop() {
                if !pool.improves(pending.bound) {
                    continue;
                }
                pool.active += 1;
                return Some(pending);
            }
            if pool.active == 0 {
                pool.finished = true;
                shared.wake.notify_all();
                return None;
            }
            pool = match shared.wake.wait_timeout(pool, IDLE_POLL) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }

    /// Generate the children of a node. Runs without the pool lock.
    fn expand(
        &self,
        shared: &Shared<P>,
        pending: &Pending<P::Position, P::Move>,
    ) -> Vec<Child<P::Position, P::Move>> {
        let puzzle = self.puzzle;
        let position = pending.node.position();

        let stale = shared
            .lock_seen()
            .get(&puzzle.canonical(position))
            .is_some_and(|&known| known < pending.cost);
        if stale {
            return Vec::new();
        }

        let moves = puzzle.legal_moves(position);
        let mut children = Vec::with_capacity(moves.len());
        for mv in moves {
            let child = puzzle.apply(position, &mv);
            let cost = pending.cost.saturating_add(puzzle.move_cost(&mv));
            let tries = shared.tries.fetch_add(1, AtomicOrdering::Relaxed);
            notify_expand(puzzle, &child, tries);

            let key = puzzle.canonical(&child);
            match shared.lock_seen().entry(key) {
                Entry::Occupied(known) if *known.get() <= cost => continue,
                Entry::Occupied(mut known) => {
                    known.insert(cost);
                }
                Entry::Vacant(slot) => {
                    slot.insert(cost);
                }
            }

            let is_goal = puzzle.is_goal(&child);
            let bound = if is_goal {
                cost
            } else {
                cost.saturating_add(puzzle.estimated_cost(&child))
            };
            children.push(Child {
                node: SearchNode::child(&pending.node, mv, child),
                cost,
                bound,
                is_goal,
            });
        }
        children
    }

    /// Return an expansion's children to the pool and decide whether to stop
    fn complete(&self, shared: &Shared<P>, children: Vec<Child<P::Position, P::Move>>) {
        let mut pool = shared.lock_pool();
        pool.active -= 1;
        pool.expansions += 1;
        if let Some(left) = pool.refinement_left.as_mut() {
            *left = left.saturating_sub(1);
        }

        for child in children {
            if child.is_goal {
                if !pool.improves(child.cost) {
                    continue;
                }
                trace!(
                    "incumbent cost {} at depth {} after {} expansions",
                    child.cost,
                    child.node.depth(),
                    pool.expansions
                );
                if pool.incumbent.is_none() {
                    pool.refinement_left = self.bias.refinement_budget(pool.expansions);
                }
                pool.incumbent = Some(Incumbent {
                    cost: child.cost,
                    node: child.node,
                });
            } else if pool.improves(child.bound) {
                pool.push(self.bias, child);
            }
        }

        let drained = pool.frontier.is_empty() && pool.active == 0;
        if drained || pool.refinement_left == Some(0) {
            pool.finished = true;
        }
        shared.wake.notify_all();
    }

    fn run_worker(&self, shared: &Shared<P>) {
        let _abort = AbortOnPanic { shared };
        while let Some(pending) = self.next_node(shared) {
            let children = self.expand(shared, &pending);
            self.complete(shared, children);
        }
    }

    /// Run the worker pool to completion. Returns once every worker has
    /// been joined.
    fn run_pool(&self, shared: &Shared<P>) -> Result<(), SearchError> {
        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.workers);
            let mut spawn_error = None;
            for worker in 0..self.workers {
                let spawned = thread::Builder::new()
                    .name(format!("puzzle-search-{}", worker))
                    .spawn_scoped(scope, move || self.run_worker(shared));
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(err) => {
                        spawn_error = Some(err);
                        shared.abort();
                        break;
                    }
                }
            }

            let mut panicked = None;
            for (worker, handle) in handles.into_iter().enumerate() {
                if handle.join().is_err() {
                    panicked.get_or_insert(worker);
                }
            }

            if let Some(err) = spawn_error {
                return Err(SearchError::Spawn(err));
            }
            match panicked {
                Some(worker) => Err(SearchError::WorkerPanicked { worker }),
                None => Ok(()),
            }
        })
    }
}

impl<'a, P> PuzzleSolver<P::Move> for ConcurrentSolver<'a, P>
where
    P: Puzzle + Sync,
    P::Position: Send + Sync,
    P::Move: Send + Sync,
{
    fn solve(&mut self) -> Result<Outcome<P::Move>, SearchError> {
        let start_time = Instant::now();
        let puzzle = self.puzzle;
        let shared = Shared::<P>::new();

        let initial = puzzle.initial_position();
        shared.lock_seen().insert(puzzle.canonical(&initial), 0);
        let root = SearchNode::root(initial);

        let mut run = Ok(());
        let mut solution = None;
        if self.interrupt.is_interrupted() {
            shared.lock_pool().interrupted = true;
        } else if puzzle.is_goal(root.position()) {
            solution = Some(root);
        } else {
            let bound = puzzle.estimated_cost(root.position());
            shared.lock_pool().push(
                self.bias,
                Child {
                    node: root,
                    cost: 0,
                    bound,
                    is_goal: false,
                },
            );
            debug!(
                "concurrent search starting: bias={} workers={}",
                self.bias.value(),
                self.workers
            );
            run = self.run_pool(&shared);
        }

        let interrupted = {
            let mut pool = shared.lock_pool();
            pool.frontier.clear();
            if let Some(goal) = pool.incumbent.take() {
                solution = Some(goal.node);
            }
            pool.interrupted
        };

        self.stats = SearchStats {
            tries: shared.tries.load(AtomicOrdering::Relaxed),
            visited: shared.lock_seen().len(),
            time_elapsed_ms: start_time.elapsed().as_millis() as u64,
        };

        if let Err(err) = run {
            warn!("concurrent search aborted: {}", err);
            puzzle.on_finished(None, None, self.stats.tries, self.stats.time_elapsed_ms);
            return Err(err);
        }

        let outcome = match &solution {
            _ if interrupted => Outcome::Interrupted,
            Some(node) => Outcome::Solved(node.path()),
            None => Outcome::Unsolvable,
        };
        debug!(
            "concurrent search finished: solved={} tries={} visited={} in {}ms",
            outcome.is_solved(),
            self.stats.tries,
            self.stats.visited,
            self.stats.time_elapsed_ms
        );

        let final_position = solution
            .as_ref()
            .filter(|_| outcome.is_solved())
            .map(|node| node.position());
        report_finished(puzzle, &outcome, final_position, &self.stats);
        Ok(outcome)
    }

    fn stats(&self) -> SearchStats {
        self.stats
    }

    fn interrupt_handle(&self) -> Interrupt {
        self.interrupt.clone()
    }
}
