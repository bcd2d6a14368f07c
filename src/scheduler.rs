//! Drift-corrected periodic scheduler.
//!
//! [`DriftScheduler`] keeps the ideal fire time of the next round and pulls
//! each delay back toward it, so late rounds shorten the following wait
//! instead of pushing the whole grid. It does not own a thread or a timer:
//! the driver asks for [`DriftScheduler::next_deadline`], waits, then calls
//! [`DriftScheduler::poll`].

use log::{debug, trace};
use std::time::{Duration, Instant};

pub type RoundCallback = Box<dyn FnMut()>;
pub type OverrunCallback = Box<dyn FnMut(Duration)>;

pub struct DriftScheduler {
    interval: Duration,
    immediate: bool,
    expected: Option<Instant>,
    next_fire: Option<Instant>,
    callback: RoundCallback,
    on_overrun: Option<OverrunCallback>,
}

impl DriftScheduler {
    pub fn new<F>(interval: Duration, callback: F) -> Self
    where
        F: FnMut() + 'static,
    {
        Self {
            interval,
            immediate: false,
            expected: None,
            next_fire: None,
            callback: Box::new(callback),
            on_overrun: None,
        }
    }

    /// Run the callback synchronously in [`start`](Self::start), before the
    /// first delayed round.
    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    /// Called with the measured drift when a round is more than one whole
    /// interval late.
    pub fn on_overrun<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Duration) + 'static,
    {
        self.on_overrun = Some(Box::new(callback));
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Takes effect when the pending round fires; that round keeps the delay
    /// it was scheduled with.
    pub fn set_interval(&mut self, interval: Duration) {
        trace!("Scheduler interval set to {:?}", interval);
        self.interval = interval;
    }

    pub fn is_active(&self) -> bool {
        self.next_fire.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_fire
    }

    pub fn start(&mut self, now: Instant) {
        debug!("Scheduler starting with interval {:?}", self.interval);
        self.expected = Some(now + self.interval);

        if self.immediate {
            (self.callback)();
        }

        self.next_fire = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        if self.next_fire.take().is_some() {
            debug!("Scheduler stopped");
        }
        self.expected = None;
    }

    /// Runs the pending round if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_fire {
            Some(deadline) if deadline <= now => self.fire(now).is_some(),
            _ => false,
        }
    }

    /// Runs one round at `now` and schedules the next one. Returns the delay
    /// until that next round, or `None` when the scheduler is stopped.
    pub fn fire(&mut self, now: Instant) -> Option<Duration> {
        let expected = self.expected?;
        self.next_fire?;

        let delay = match now.checked_duration_since(expected) {
            Some(drift) => {
                if drift > self.interval {
                    if let Some(on_overrun) = self.on_overrun.as_mut() {
                        on_overrun(drift);
                    }
                }
                trace!("Scheduler round late by {:?}", drift);
                self.interval.saturating_sub(drift)
            }
            None => {
                let early = expected - now;
                trace!("Scheduler round early by {:?}", early);
                self.interval + early
            }
        };

        (self.callback)();

        self.expected = Some(expected + self.interval);
        self.next_fire = Some(now + delay);
        Some(delay)
    }
}

impl std::fmt::Debug for DriftScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriftScheduler")
            .field("interval", &self.interval)
            .field("immediate", &self.immediate)
            .field("expected", &self.expected)
            .field("next_fire", &self.next_fire)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_poll_before_deadline_does_nothing() {
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let mut scheduler =
            DriftScheduler::new(Duration::from_millis(100), move || counter.set(counter.get() + 1));

        let t0 = Instant::now();
        scheduler.start(t0);
        assert!(!scheduler.poll(t0 + Duration::from_millis(99)));
        assert_eq!(count.get(), 0);
        assert!(scheduler.poll(t0 + Duration::from_millis(100)));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut scheduler = DriftScheduler::new(Duration::from_millis(10), || {});
        scheduler.stop();
        scheduler.start(Instant::now());
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_active());
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn test_fire_after_stop_is_ignored() {
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let mut scheduler =
            DriftScheduler::new(Duration::from_millis(10), move || counter.set(counter.get() + 1));

        let t0 = Instant::now();
        scheduler.start(t0);
        scheduler.stop();
        assert_eq!(scheduler.fire(t0 + Duration::from_millis(10)), None);
        assert!(!scheduler.poll(t0 + Duration::from_secs(1)));
        assert_eq!(count.get(), 0);
    }
}
