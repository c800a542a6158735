// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reconnection state machine with exponential backoff.
//!
//! ```text
//!           connect(credential)          transport connected
//!   Idle ──────────────────────► Connecting ─────────────────► Connected
//!    ▲                              ▲   │ open failed              │
//!    │ server disconnect,           │   ▼                          │ dropped
//!    │ retries exhausted,      retry due                           │
//!    │ disconnect()/cleanup()  ┌────────────┐ ◄────────────────────┘
//!    └─────────────────────────│Disconnected│
//!                              └────────────┘
//! ```
//!
//! The controller does no I/O and owns no timers. A scheduled retry is a
//! `(attempt, deadline)` pair the client's event loop sleeps on; cancelling it
//! is clearing that field.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::transport::{Credential, DisconnectReason};

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session. Initial and terminal state.
    Idle,
    /// Opening a transport handle.
    Connecting,
    /// Connected to the server.
    Connected,
    /// Dropped; a retry is scheduled.
    Disconnected,
}

/// Exponential backoff schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    /// Delay before the first retry.
    pub base: Duration,
    /// Multiplier applied per retry.
    pub factor: u32,
    /// Retries allowed before giving up.
    pub max_attempts: u32,
    /// Ceiling for any single delay.
    pub max_delay: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff {
            base: Duration::from_millis(1000),
            factor: 2,
            max_attempts: 5,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl Backoff {
    /// Delay before retry number `retry` (zero-based): `base * factor^retry`, capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let multiplier = self.factor.checked_pow(retry).unwrap_or(u32::MAX);
        self.base
            .checked_mul(multiplier)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// A retry waiting for its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRetry {
    /// One-based attempt number.
    pub attempt: u32,
    pub deadline: Instant,
}

/// What the controller decided after a connection was lost or failed to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again after `delay`.
    Retry { attempt: u32, delay: Duration },
    /// The server ended the session. Do not retry.
    Terminated,
    /// `attempts` retries failed. Do not retry.
    Exhausted { attempts: u32 },
}

/// Owns connection state and decides whether and when to reconnect.
#[derive(Debug)]
pub struct ReconnectController {
    backoff: Backoff,
    state: ConnectionState,
    credential: Option<Credential>,
    retry_count: u32,
    pending: Option<PendingRetry>,
}

impl ReconnectController {
    pub fn new(backoff: Backoff) -> Self {
        ReconnectController {
            backoff,
            state: ConnectionState::Idle,
            credential: None,
            retry_count: 0,
            pending: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Consecutive failed connection attempts since the last success.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn pending(&self) -> Option<PendingRetry> {
        self.pending
    }

    /// Start a new session: any state to `Connecting`.
    pub fn begin(&mut self, credential: Credential) {
        self.state = ConnectionState::Connecting;
        self.credential = Some(credential);
        self.retry_count = 0;
        self.pending = None;
    }

    /// The transport opened. Returns false if no attempt was in progress.
    pub fn on_connected(&mut self) -> bool {
        if self.state != ConnectionState::Connecting {
            warn!(state = ?self.state, "ignoring connect outside of Connecting");
            return false;
        }
        if self.retry_count > 0 {
            info!(after = self.retry_count, "reconnected");
        }
        self.state = ConnectionState::Connected;
        self.retry_count = 0;
        self.pending = None;
        true
    }

    /// The connection ended. Returns `None` when no session was active.
    pub fn on_disconnected(
        &mut self,
        reason: &DisconnectReason,
        now: Instant,
    ) -> Option<RetryDecision> {
        match self.state {
            ConnectionState::Connected | ConnectionState::Connecting => {}
            ConnectionState::Idle | ConnectionState::Disconnected => return None,
        }
        if reason.is_deliberate() {
            info!("server ended the session, not reconnecting");
            self.state = ConnectionState::Idle;
            self.credential = None;
            self.pending = None;
            return Some(RetryDecision::Terminated);
        }
        debug!(%reason, "connection lost");
        Some(self.schedule(now))
    }

    /// An open attempt failed. Same backoff path as a mid-session drop.
    pub fn on_connect_failed(&mut self, now: Instant) -> Option<RetryDecision> {
        if self.state != ConnectionState::Connecting {
            return None;
        }
        Some(self.schedule(now))
    }

    fn schedule(&mut self, now: Instant) -> RetryDecision {
        self.pending = None;
        if self.retry_count >= self.backoff.max_attempts {
            warn!(
                attempts = self.retry_count,
                "max reconnection attempts reached"
            );
            self.state = ConnectionState::Idle;
            return RetryDecision::Exhausted {
                attempts: self.retry_count,
            };
        }
        let delay = self.backoff.delay_for(self.retry_count);
        self.retry_count += 1;
        self.state = ConnectionState::Disconnected;
        self.pending = Some(PendingRetry {
            attempt: self.retry_count,
            deadline: now + delay,
        });
        debug!(attempt = self.retry_count, ?delay, "reconnect scheduled");
        RetryDecision::Retry {
            attempt: self.retry_count,
            delay,
        }
    }

    /// Take the pending retry if it is due, moving to `Connecting`.
    pub fn start_retry(&mut self, now: Instant) -> Option<PendingRetry> {
        let pending = self.pending?;
        if self.state != ConnectionState::Disconnected || now < pending.deadline {
            return None;
        }
        self.pending = None;
        self.state = ConnectionState::Connecting;
        Some(pending)
    }

    /// Explicit teardown: back to `Idle`, cancelling any pending retry and
    /// forgetting the credential. Returns true if a retry was cancelled.
    pub fn reset(&mut self) -> bool {
        let cancelled = self.pending.take().is_some();
        if cancelled {
            debug!("pending reconnect cancelled");
        }
        self.state = ConnectionState::Idle;
        self.credential = None;
        self.retry_count = 0;
        cancelled
    }
}

#[cfg(test)]
#[path = "reconnect_tests.rs"]
mod tests;
