//! Host event-loop registration, modeled as scoped subscriptions.
//!
//! A driver holds one [`Subscription`] for the lifetime of a render job. The
//! subscription stands for the full set of host hooks a job needs (the four
//! engine lifecycle callbacks plus the periodic timer), and dropping it
//! unregisters everything. Drivers must reach a terminal state with the
//! subscription dropped on every exit path; [`Scheduler::active_subscriptions`]
//! lets hosts and tests verify nothing was leaked.

use crate::foundation::error::{SweepError, SweepResult};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

/// Default timer interval between driver ticks, seconds.
pub const DEFAULT_TIMER_INTERVAL_SECS: f64 = 0.5;

/// Handle to the host's timer/event loop.
///
/// Single-threaded by design: the pipeline is cooperative and every callback
/// runs on the host loop's thread.
#[derive(Debug, Default)]
pub struct Scheduler {
    registry: Rc<RefCell<BTreeSet<u64>>>,
    next_id: std::cell::Cell<u64>,
}

impl Scheduler {
    /// Create a scheduler with no active subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the lifecycle hooks and a periodic timer firing every
    /// `interval_secs`.
    pub fn subscribe(&self, interval_secs: f64) -> SweepResult<Subscription> {
        if !interval_secs.is_finite() || interval_secs <= 0.0 {
            return Err(SweepError::validation(
                "timer interval must be a positive number of seconds",
            ));
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.registry.borrow_mut().insert(id);
        Ok(Subscription {
            registry: Rc::downgrade(&self.registry),
            id,
            interval_secs,
        })
    }

    /// Number of currently registered subscriptions.
    pub fn active_subscriptions(&self) -> usize {
        self.registry.borrow().len()
    }
}

/// Scoped registration for one render job's hooks and timer.
///
/// Unregisters on drop. There is deliberately no manual `unsubscribe`; exit
/// paths unregister by letting the value fall out of scope.
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<RefCell<BTreeSet<u64>>>,
    id: u64,
    interval_secs: f64,
}

impl Subscription {
    /// The timer interval this subscription was registered with. Cancellation
    /// is only observed at tick granularity, so this bounds its latency.
    pub fn timer_interval_secs(&self) -> f64 {
        self.interval_secs
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_a_subscription_unregisters_it() {
        let scheduler = Scheduler::new();
        assert_eq!(scheduler.active_subscriptions(), 0);

        let sub = scheduler.subscribe(0.5).unwrap();
        assert_eq!(scheduler.active_subscriptions(), 1);
        assert_eq!(sub.timer_interval_secs(), 0.5);

        drop(sub);
        assert_eq!(scheduler.active_subscriptions(), 0);
    }

    #[test]
    fn subscriptions_are_independent() {
        let scheduler = Scheduler::new();
        let a = scheduler.subscribe(0.5).unwrap();
        let b = scheduler.subscribe(2.0).unwrap();
        assert_eq!(scheduler.active_subscriptions(), 2);
        drop(a);
        assert_eq!(scheduler.active_subscriptions(), 1);
        drop(b);
        assert_eq!(scheduler.active_subscriptions(), 0);
    }

    #[test]
    fn subscribe_rejects_bad_intervals() {
        let scheduler = Scheduler::new();
        assert!(scheduler.subscribe(0.0).is_err());
        assert!(scheduler.subscribe(-1.0).is_err());
        assert!(scheduler.subscribe(f64::NAN).is_err());
    }

    #[test]
    fn subscription_outliving_scheduler_is_harmless() {
        let sub = {
            let scheduler = Scheduler::new();
            scheduler.subscribe(1.0).unwrap()
        };
        drop(sub);
    }
}
