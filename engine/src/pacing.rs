//! Cancellable delayed task driven by elapsed time instead of a sleep.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredState {
    Pending(Duration),
    Fired,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deferred {
    state: DeferredState,
}

impl Deferred {
    pub fn schedule(delay: Duration) -> Self {
        Self { state: DeferredState::Pending(delay) }
    }

    /// Advance by `elapsed`. Returns true exactly once, when the delay runs out.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        match self.state {
            DeferredState::Pending(remaining) => {
                let left = remaining.saturating_sub(elapsed);
                if left.is_zero() {
                    self.state = DeferredState::Fired;
                    true
                } else {
                    self.state = DeferredState::Pending(left);
                    false
                }
            }
            DeferredState::Fired | DeferredState::Cancelled => false,
        }
    }

    /// Fire now if still pending.
    pub fn fire_now(&mut self) -> bool {
        self.tick(Duration::MAX)
    }

    pub fn cancel(&mut self) {
        if matches!(self.state, DeferredState::Pending(_)) {
            self.state = DeferredState::Cancelled;
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DeferredState::Pending(_))
    }

    pub fn remaining(&self) -> Option<Duration> {
        match self.state {
            DeferredState::Pending(d) => Some(d),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_delay() {
        let mut d = Deferred::schedule(Duration::from_millis(600));
        assert!(!d.tick(Duration::from_millis(400)));
        assert_eq!(d.remaining(), Some(Duration::from_millis(200)));
        assert!(d.tick(Duration::from_millis(200)));
        assert!(!d.tick(Duration::from_millis(200)));
        assert!(!d.is_pending());
    }

    #[test]
    fn cancelled_never_fires() {
        let mut d = Deferred::schedule(Duration::from_millis(10));
        d.cancel();
        assert!(!d.tick(Duration::from_secs(1)));
        assert!(!d.fire_now());
    }

    #[test]
    fn zero_delay_fires_on_first_tick() {
        let mut d = Deferred::schedule(Duration::ZERO);
        assert!(d.tick(Duration::ZERO));
    }
}
