use std::fmt::Debug;

/// Terminal value of a run. `Found` carries the reconstructed solution,
/// `Exhausted` means the frontier/trail emptied without reaching a goal,
/// and `Cancelled` means the caller stopped the run. The latter two are
/// deliberately distinct: a cancelled run says nothing about solvability.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<R> {
    Found(R),
    Exhausted,
    Cancelled,
}

impl<R> Outcome<R> {
    pub fn is_found(&self) -> bool {
        matches!(self, Outcome::Found(_))
    }
}

/// One call's worth of progress: either an intermediate observation or the
/// terminal outcome of the run.
#[derive(Debug, Clone, PartialEq)]
pub enum Tick<S, R> {
    Step(S),
    Done(Outcome<R>),
}

/// A suspended computation that performs one bounded unit of work per
/// `advance()` call and returns control to the caller in between. There is
/// no internal clock and no blocking: resumption cadence is entirely owned
/// by whoever holds the value (see `StepDriver`).
///
/// Once a `Done` has been returned, every later `advance()` must return an
/// equivalent `Done` again; implementations keep their terminal state.
pub trait Resumable {
    type Step;
    type Solution;

    fn advance(&mut self) -> Tick<Self::Step, Self::Solution>;
}

/// Wraps exactly one run of one search. The engine owns the search's
/// frontier/visited/trail state for the duration of that run; starting a
/// new run means constructing a new engine, so no state can leak between
/// runs and no stale step can be observed after a restart.
pub struct Engine<S: Resumable> {
    search: S,
    outcome: Option<Outcome<S::Solution>>,
    cancelled: bool,
    steps_taken: usize,
}

impl<S: Resumable> Engine<S>
where
    S::Solution: Clone,
{
    pub fn new(search: S) -> Self {
        Engine {
            search,
            outcome: None,
            cancelled: false,
            steps_taken: 0,
        }
    }

    /// Perform one unit of work. After the run has terminated (for any
    /// reason) this replays the recorded outcome instead of touching the
    /// underlying search again.
    pub fn advance(&mut self) -> Tick<S::Step, S::Solution> {
        if let Some(outcome) = &self.outcome {
            return Tick::Done(outcome.clone());
        }
        if self.cancelled {
            self.outcome = Some(Outcome::Cancelled);
            return Tick::Done(Outcome::Cancelled);
        }
        match self.search.advance() {
            Tick::Step(step) => {
                self.steps_taken += 1;
                Tick::Step(step)
            }
            Tick::Done(outcome) => {
                self.outcome = Some(outcome.clone());
                Tick::Done(outcome)
            }
        }
    }

    /// Mark the run dead. Idempotent, and safe at any point between two
    /// `advance()` calls. A run that already terminated keeps its original
    /// outcome; cancellation never rewrites a result.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_done(&self) -> bool {
        self.outcome.is_some() || self.cancelled
    }

    /// Number of intermediate steps produced so far (terminal ticks are
    /// not counted).
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    /// Read access to the wrapped search, e.g. for rendering the problem
    /// state between steps.
    pub fn search(&self) -> &S {
        &self.search
    }
}
