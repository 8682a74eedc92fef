//! Consecutive-failure circuit breaker shared by all bank calls.

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
}

#[derive(Debug)]
struct BreakerState {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Opens after a configured number of consecutive transient failures and
/// rejects calls for the cooldown window. Once the window has elapsed the
/// next call is let through as a probe; its outcome closes or re-opens the
/// circuit. State is process-wide: one open circuit blocks every caller.
#[derive(Debug)]
pub struct CircuitBreaker {
    threshold: u32,
    cooldown: Duration,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            threshold,
            cooldown,
            state: Mutex::new(BreakerState {
                consecutive_failures: 0,
                opened_at: None,
            }),
        }
    }

    pub fn state(&self) -> CircuitState {
        let state = self.state.lock().expect("circuit breaker lock poisoned");
        match state.opened_at {
            Some(opened_at) if opened_at.elapsed() < self.cooldown => CircuitState::Open,
            _ => CircuitState::Closed,
        }
    }

    /// Whether a call may proceed right now. After the cooldown this returns
    /// true while leaving the failure count intact, so a failed probe
    /// re-opens the circuit immediately.
    pub fn allow_request(&self) -> bool {
        let state = self.state.lock().expect("circuit breaker lock poisoned");
        match state.opened_at {
            Some(opened_at) => opened_at.elapsed() >= self.cooldown,
            None => true,
        }
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock().expect("circuit breaker lock poisoned");
        state.consecutive_failures = 0;
        state.opened_at = None;
    }

    pub fn record_failure(&self) {
        let mut state = self.state.lock().expect("circuit breaker lock poisoned");
        state.consecutive_failures += 1;
        if state.consecutive_failures >= self.threshold {
            state.opened_at = Some(Instant::now());
        }
    }
}
