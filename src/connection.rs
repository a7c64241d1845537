//! # Connection Monitor
//!
//! Tracks ground-link liveness: every heartbeat resets a watchdog deadline,
//! and expiry without a reset flips the connection to disconnected.
//! Grounded in `IIPSComm::SlotTimeout`/`SlotReceiveData`'s
//! watchdog-reset-on-any-frame behavior; reimplemented as a plain deadline
//! comparison (`Instant` + `Duration`) rather than a `QTimer` callback, so
//! the reactor can wrap a single read with `tokio::time::timeout` instead
//! of selecting between two futures that would otherwise need overlapping
//! mutable access to the reactor.

use crate::observer::{IipsEvent, ObserverRegistry};
use std::time::{Duration, Instant};

/// Connection liveness state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Owns the watchdog deadline and the current [`ConnectionState`].
///
/// `reset()` has exactly one caller: the reactor's heartbeat (id 0) arm.
/// No other frame type rearms the watchdog.
pub struct ConnectionMonitor {
    state: ConnectionState,
    timeout: Duration,
    deadline: Option<Instant>,
}

impl ConnectionMonitor {
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            timeout,
            deadline: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Records fresh traffic, (re)arming the watchdog and notifying
    /// `observers` if this is a transition from disconnected.
    pub fn reset(&mut self, observers: &ObserverRegistry) {
        self.deadline = Some(Instant::now() + self.timeout);
        if self.state != ConnectionState::Connected {
            self.state = ConnectionState::Connected;
            observers.publish(IipsEvent::ConnectionChanged(true));
        }
    }

    /// Time remaining until the watchdog should expire, used to bound a
    /// single read with `tokio::time::timeout`. Returns the full timeout
    /// when no deadline is currently armed (nothing to expire yet).
    pub fn remaining_timeout(&self) -> Duration {
        match self.deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => self.timeout,
        }
    }

    /// Marks the connection disconnected after a watchdog expiry and
    /// notifies `observers` if this is a transition from connected.
    /// Clears the deadline so the reactor doesn't spin on an expired one.
    pub fn expire(&mut self, observers: &ObserverRegistry) {
        self.deadline = None;
        if self.state != ConnectionState::Disconnected {
            self.state = ConnectionState::Disconnected;
            observers.publish(IipsEvent::ConnectionChanged(false));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_transitions_to_connected_and_notifies() {
        let observers = ObserverRegistry::new();
        let mut monitor = ConnectionMonitor::new(Duration::from_secs(3));
        assert_eq!(monitor.state(), ConnectionState::Disconnected);
        monitor.reset(&observers);
        assert_eq!(monitor.state(), ConnectionState::Connected);
    }

    #[test]
    fn remaining_timeout_shrinks_toward_zero_after_reset() {
        let observers = ObserverRegistry::new();
        let mut monitor = ConnectionMonitor::new(Duration::from_millis(50));
        monitor.reset(&observers);
        std::thread::sleep(Duration::from_millis(10));
        let remaining = monitor.remaining_timeout();
        assert!(remaining < Duration::from_millis(50));
        assert!(remaining > Duration::ZERO);
    }

    #[test]
    fn expire_transitions_to_disconnected_and_clears_deadline() {
        let observers = ObserverRegistry::new();
        let mut monitor = ConnectionMonitor::new(Duration::from_millis(10));
        monitor.reset(&observers);
        std::thread::sleep(Duration::from_millis(15));
        assert_eq!(monitor.remaining_timeout(), Duration::ZERO);
        monitor.expire(&observers);
        assert_eq!(monitor.state(), ConnectionState::Disconnected);
        // No deadline armed: remaining_timeout falls back to the full
        // configured timeout rather than staying stuck at zero.
        assert_eq!(monitor.remaining_timeout(), Duration::from_millis(10));
    }

    #[test]
    fn repeated_reset_does_not_renotify() {
        let observers = ObserverRegistry::new();
        let mut monitor = ConnectionMonitor::new(Duration::from_secs(3));
        monitor.reset(&observers);
        monitor.reset(&observers);
        assert_eq!(monitor.state(), ConnectionState::Connected);
    }
}
