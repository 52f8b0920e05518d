//! Compute budgets and the clocks that measure them
//!
//! The per-game budget is a plain value handed into each decision and handed
//! back updated, charged with process CPU time. The per-turn deadline lives
//! only for one decision and runs on wall time.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cpu_time::ProcessTime;
use serde::{Deserialize, Serialize};

use crate::config::BudgetConfig;

// ============================================================================
// CLOCKS
// ============================================================================

/// Monotonic time source
pub trait Clock {
    /// Time since an arbitrary fixed origin
    fn now(&self) -> Duration;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Wall clock backed by `Instant`
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// CPU time consumed by this process since the clock was created
#[derive(Clone, Copy, Debug)]
pub struct ProcessClock {
    origin: ProcessTime,
}

impl ProcessClock {
    pub fn new() -> Self {
        Self {
            origin: ProcessTime::now(),
        }
    }
}

impl Default for ProcessClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ProcessClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually driven clock for tests.
///
/// Every read advances the clock by `tick`, so loops that poll it make
/// progress without real delays.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: Cell<Duration>,
    tick: Duration,
    reads: Cell<u64>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tick(tick: Duration) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Number of times the clock has been read
    pub fn reads(&self) -> u64 {
        self.reads.get()
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        let t = self.now.get();
        self.now.set(t + self.tick);
        self.reads.set(self.reads.get() + 1);
        t
    }
}

// ============================================================================
// GAME BUDGET
// ============================================================================

/// Compute consumed so far this game against its ceilings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameBudget {
    pub consumed: Duration,
    pub game_limit: Duration,
    pub turn_limit: Duration,
}

impl GameBudget {
    pub fn new(game_limit: Duration, turn_limit: Duration) -> Self {
        Self {
            consumed: Duration::ZERO,
            game_limit,
            turn_limit,
        }
    }

    pub fn from_config(config: &BudgetConfig) -> Self {
        Self::new(
            Duration::from_millis(config.game_limit_ms),
            Duration::from_millis(config.turn_limit_ms),
        )
    }

    /// True once consumption meets or exceeds the game ceiling
    pub fn is_exhausted(&self) -> bool {
        self.consumed >= self.game_limit
    }

    pub fn remaining(&self) -> Duration {
        self.game_limit.saturating_sub(self.consumed)
    }

    /// Budget after spending `elapsed`
    pub fn charge(self, elapsed: Duration) -> Self {
        Self {
            consumed: self.consumed.saturating_add(elapsed),
            ..self
        }
    }

    /// Same limits with consumption set to `consumed`
    pub fn with_consumed(self, consumed: Duration) -> Self {
        Self { consumed, ..self }
    }
}

impl Default for GameBudget {
    fn default() -> Self {
        Self::from_config(&BudgetConfig::default())
    }
}

// ============================================================================
// TURN DEADLINE
// ============================================================================

/// Wall-clock ceiling for one decision.
///
/// Once tripped it stays tripped, so loops that poll it unwind in order.
pub struct TurnDeadline<'a> {
    clock: &'a dyn Clock,
    start: Duration,
    limit: Duration,
    tripped: Cell<bool>,
}

impl<'a> TurnDeadline<'a> {
    /// Start measuring now
    pub fn start(clock: &'a dyn Clock, limit: Duration) -> Self {
        Self {
            start: clock.now(),
            clock,
            limit,
            tripped: Cell::new(false),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_sub(self.start)
    }

    /// True once the turn has run past its limit
    pub fn expired(&self) -> bool {
        if self.tripped.get() {
            return true;
        }
        if self.elapsed() > self.limit {
            self.tripped.set(true);
        }
        self.tripped.get()
    }

    /// Whether `expired` has ever returned true
    pub fn tripped(&self) -> bool {
        self.tripped.get()
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_clock_ticks() {
        let clock = VirtualClock::with_tick(Duration::from_millis(5));
        assert_eq!(clock.now(), Duration::ZERO);
        assert_eq!(clock.now(), Duration::from_millis(5));
        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.now(), Duration::from_millis(1010));
        assert_eq!(clock.reads(), 3);
    }

    #[test]
    fn test_shared_clock() {
        let clock = Rc::new(VirtualClock::new());
        let shared = Rc::clone(&clock);
        clock.advance(Duration::from_secs(2));
        assert_eq!(shared.now(), Duration::from_secs(2));
        assert_eq!(clock.reads(), 1);
    }

    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        assert!(clock.now() >= a);
    }

    #[test]
    fn test_process_clock_monotonic() {
        let clock = ProcessClock::new();
        let a = clock.now();
        let mut x = 0u64;
        for i in 0..200_000u64 {
            x = x.wrapping_mul(31).wrapping_add(i);
        }
        std::hint::black_box(x);
        assert!(clock.now() >= a);
    }

    #[test]
    fn test_budget_exhaustion() {
        let budget = GameBudget::new(Duration::from_secs(10), Duration::from_secs(3));
        assert!(!budget.is_exhausted());

        let spent = budget.charge(Duration::from_secs(4)).charge(Duration::from_secs(6));
        assert_eq!(spent.consumed, Duration::from_secs(10));
        assert!(spent.is_exhausted());
        assert_eq!(spent.remaining(), Duration::ZERO);
        // the original value is untouched
        assert_eq!(budget.consumed, Duration::ZERO);
    }

    #[test]
    fn test_budget_from_config() {
        let budget = GameBudget::default();
        assert_eq!(budget.game_limit, Duration::from_secs(180));
        assert_eq!(budget.turn_limit, Duration::from_secs(180));
    }

    #[test]
    fn test_deadline_trips_and_stays_tripped() {
        let clock = VirtualClock::new();
        let deadline = TurnDeadline::start(&clock, Duration::from_millis(100));
        assert!(!deadline.expired());

        clock.advance(Duration::from_millis(100));
        // exactly at the limit is still in time
        assert!(!deadline.expired());

        clock.advance(Duration::from_millis(1));
        assert!(deadline.expired());
        assert!(deadline.tripped());

        let reads = clock.reads();
        assert!(deadline.expired());
        assert_eq!(clock.reads(), reads);
    }
}
