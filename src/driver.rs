use std::thread;
use std::time::Duration;

use crate::engine::{Engine, Outcome, Resumable, Tick};

/// What the observer wants the driver to do after a step. `Cancel` asks
/// the driver to cancel the engine before the next advance, which makes
/// the run terminate with `Outcome::Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverControl {
    Continue,
    Cancel,
}

/// Receives every step of a run as it happens, and the terminal outcome
/// exactly once. Steps are transient; implementations should render or
/// record what they need and let them drop.
pub trait StepObserver<S: Resumable> {
    fn on_step(&mut self, step: &S::Step) -> DriverControl;
    fn on_done(&mut self, outcome: &Outcome<S::Solution>);
}

/// The external clock that pulls a suspended search forward. Each call to
/// `Engine::advance` is a bounded synchronous unit of work; the driver is
/// the only source of forward progress, so pausing is simply not calling
/// `run` (or pacing it with a delay), and cancellation takes effect on the
/// boundary between two advances.
pub struct StepDriver {
    pace: Duration,
}

impl StepDriver {
    /// A driver that advances as fast as possible (batch runs, tests).
    pub fn immediate() -> Self {
        StepDriver { pace: Duration::ZERO }
    }

    /// A driver that sleeps between steps, for human-visible animation.
    pub fn with_pace(pace: Duration) -> Self {
        StepDriver { pace }
    }

    pub fn pace(&self) -> Duration {
        self.pace
    }

    /// Drive the engine until it reports a terminal outcome, forwarding
    /// every step to the observer. The terminal outcome is forwarded via
    /// `on_done` exactly once and also returned.
    pub fn run<S: Resumable>(
        &self,
        engine: &mut Engine<S>,
        observer: &mut dyn StepObserver<S>,
    ) -> Outcome<S::Solution>
    where
        S::Solution: Clone,
    {
        loop {
            match engine.advance() {
                Tick::Step(step) => {
                    if observer.on_step(&step) == DriverControl::Cancel {
                        engine.cancel();
                        continue;
                    }
                    if !self.pace.is_zero() {
                        thread::sleep(self.pace);
                    }
                }
                Tick::Done(outcome) => {
                    observer.on_done(&outcome);
                    return outcome;
                }
            }
        }
    }

    /// Drive the engine for at most `max_steps` intermediate steps. Returns
    /// the terminal outcome if one was reached within the budget; `on_done`
    /// is only invoked (and only once) in that case.
    pub fn run_budget<S: Resumable>(
        &self,
        engine: &mut Engine<S>,
        observer: &mut dyn StepObserver<S>,
        max_steps: usize,
    ) -> Option<Outcome<S::Solution>>
    where
        S::Solution: Clone,
    {
        let mut taken = 0;
        loop {
            if taken >= max_steps {
                return None;
            }
            match engine.advance() {
                Tick::Step(step) => {
                    taken += 1;
                    if observer.on_step(&step) == DriverControl::Cancel {
                        engine.cancel();
                        continue;
                    }
                    if !self.pace.is_zero() {
                        thread::sleep(self.pace);
                    }
                }
                Tick::Done(outcome) => {
                    observer.on_done(&outcome);
                    return Some(outcome);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Countdown {
        left: usize,
    }

    impl Resumable for Countdown {
        type Step = usize;
        type Solution = usize;

        fn advance(&mut self) -> Tick<usize, usize> {
            if self.left == 0 {
                Tick::Done(Outcome::Found(0))
            } else {
                self.left -= 1;
                Tick::Step(self.left)
            }
        }
    }

    struct Recorder {
        steps: Vec<usize>,
        done_calls: usize,
        cancel_after: Option<usize>,
    }

    impl Recorder {
        fn new() -> Self {
            Recorder { steps: Vec::new(), done_calls: 0, cancel_after: None }
        }
    }

    impl StepObserver<Countdown> for Recorder {
        fn on_step(&mut self, step: &usize) -> DriverControl {
            self.steps.push(*step);
            match self.cancel_after {
                Some(n) if self.steps.len() >= n => DriverControl::Cancel,
                _ => DriverControl::Continue,
            }
        }

        fn on_done(&mut self, _outcome: &Outcome<usize>) {
            self.done_calls += 1;
        }
    }

    #[test]
    fn test_driver_forwards_all_steps_and_done_once() {
        let mut engine = Engine::new(Countdown { left: 4 });
        let mut rec = Recorder::new();
        let outcome = StepDriver::immediate().run(&mut engine, &mut rec);
        assert_eq!(outcome, Outcome::Found(0));
        assert_eq!(rec.steps, vec![3, 2, 1, 0]);
        assert_eq!(rec.done_calls, 1);
    }

    #[test]
    fn test_driver_observer_cancel() {
        let mut engine = Engine::new(Countdown { left: 100 });
        let mut rec = Recorder::new();
        rec.cancel_after = Some(5);
        let outcome = StepDriver::immediate().run(&mut engine, &mut rec);
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(rec.steps.len(), 5);
        assert_eq!(rec.done_calls, 1);
    }

    #[test]
    fn test_driver_budget_stops_short() {
        let mut engine = Engine::new(Countdown { left: 100 });
        let mut rec = Recorder::new();
        let outcome = StepDriver::immediate().run_budget(&mut engine, &mut rec, 10);
        assert_eq!(outcome, None);
        assert_eq!(rec.steps.len(), 10);
        assert_eq!(rec.done_calls, 0);
        // The same engine can be resumed later from where it stopped.
        let outcome = StepDriver::immediate().run(&mut engine, &mut rec);
        assert_eq!(outcome, Outcome::Found(0));
        assert_eq!(rec.steps.len(), 100);
        assert_eq!(rec.done_calls, 1);
    }
}
