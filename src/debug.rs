use std::fmt::Debug;
use std::time::{Duration, SystemTime};

use rand::distr::{Bernoulli, Distribution};
use rand::rngs::ThreadRng;

use crate::driver::{DriverControl, StepObserver};
use crate::engine::{Outcome, Resumable};

enum SampleState {
    Never,
    AtEnd,
    EveryN(usize, usize),
    Probability(Bernoulli, ThreadRng),
    Time(Duration, SystemTime),
}

/// Decides which steps of a run are worth reporting. Long searches emit
/// far more steps than anyone wants to read; a sample keeps debug output
/// bounded without touching the run itself.
pub struct Sample {
    state: SampleState,
}

impl Sample {
    pub fn never() -> Self {
        Self { state: SampleState::Never }
    }

    pub fn at_end() -> Self {
        Self { state: SampleState::AtEnd }
    }

    pub fn every_n(n: usize) -> Self {
        Self { state: SampleState::EveryN(n, 0) }
    }

    pub fn probability(p: f64) -> Self {
        Self {
            state: SampleState::Probability(Bernoulli::new(p).unwrap(), rand::rng()),
        }
    }

    pub fn time(every: Duration) -> Self {
        Self { state: SampleState::Time(every, SystemTime::now()) }
    }

    pub fn sample(&mut self, at_end: bool) -> bool {
        match &mut self.state {
            SampleState::Never => false,
            SampleState::AtEnd => at_end,
            SampleState::EveryN(n, count) => {
                *count += 1;
                if count >= n || at_end {
                    *count = 0;
                    true
                } else {
                    false
                }
            }
            SampleState::Probability(d, rng) => d.sample(rng) || at_end,
            SampleState::Time(duration, last) => {
                let now = SystemTime::now();
                let elapsed = now.duration_since(*last).expect("Time went backwards!");
                if elapsed >= *duration || at_end {
                    *last = now;
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// Prints a sampled subset of steps and a one-line summary at the end.
pub struct DbgObserver {
    print: Sample,
    steps: usize,
}

impl DbgObserver {
    pub fn new() -> Self {
        Self { print: Sample::never(), steps: 0 }
    }

    pub fn print(mut self, sample: Sample) -> Self {
        self.print = sample;
        self
    }

    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl Default for DbgObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Resumable> StepObserver<S> for DbgObserver
where
    S::Step: Debug,
    S::Solution: Debug,
{
    fn on_step(&mut self, step: &S::Step) -> DriverControl {
        self.steps += 1;
        if self.print.sample(false) {
            println!("[{}] {:?}", self.steps, step);
        }
        DriverControl::Continue
    }

    fn on_done(&mut self, outcome: &Outcome<S::Solution>) {
        if self.print.sample(true) {
            match outcome {
                Outcome::Found(solution) => {
                    println!("Found after {} steps: {:?}", self.steps, solution)
                }
                Outcome::Exhausted => println!("Exhausted after {} steps", self.steps),
                Outcome::Cancelled => println!("Cancelled after {} steps", self.steps),
            }
        }
    }
}

/// Discards everything. The zero-cost way to drive a run to completion.
pub struct NullObserver;

impl<S: Resumable> StepObserver<S> for NullObserver {
    fn on_step(&mut self, _step: &S::Step) -> DriverControl {
        DriverControl::Continue
    }

    fn on_done(&mut self, _outcome: &Outcome<S::Solution>) {}
}

/// Requests cancellation once a step budget is spent. Handy for bounding
/// searches whose runtime is unknown up front.
pub struct CancelAfter {
    budget: usize,
    seen: usize,
}

impl CancelAfter {
    pub fn new(budget: usize) -> Self {
        Self { budget, seen: 0 }
    }
}

impl<S: Resumable> StepObserver<S> for CancelAfter {
    fn on_step(&mut self, _step: &S::Step) -> DriverControl {
        self.seen += 1;
        if self.seen >= self.budget {
            DriverControl::Cancel
        } else {
            DriverControl::Continue
        }
    }

    fn on_done(&mut self, _outcome: &Outcome<S::Solution>) {}
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine::{Engine, Tick};

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

    #[test]
    fn test_sample_every_n() {
        let mut sample = Sample::every_n(3);
        let picks: Vec<bool> = (0..9).map(|_| sample.sample(false)).collect();
        assert_eq!(picks, vec![false, false, true, false, false, true, false, false, true]);
    }

    #[test]
    fn test_sample_never_and_at_end() {
        let mut never = Sample::never();
        assert!(!never.sample(false));
        assert!(!never.sample(true));
        let mut at_end = Sample::at_end();
        assert!(!at_end.sample(false));
        assert!(at_end.sample(true));
    }

    #[test]
    fn test_cancel_after_budget() {
        use crate::driver::StepDriver;
        let mut engine = Engine::new(Countdown { left: 100 });
        let mut observer = CancelAfter::new(7);
        let outcome = StepDriver::immediate().run(&mut engine, &mut observer);
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(engine.steps_taken(), 7);
    }

    #[test]
    fn test_dbg_observer_counts_steps() {
        use crate::driver::StepDriver;
        let mut engine = Engine::new(Countdown { left: 5 });
        let mut observer = DbgObserver::new();
        let outcome = StepDriver::immediate().run(&mut engine, &mut observer);
        assert_eq!(outcome, Outcome::Found(0));
        assert_eq!(observer.steps(), 5);
    }
}
