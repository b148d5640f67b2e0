//! Realtime connection lifecycle state machine.
//!
//! One live transport connection exists per active session. The machine uses
//! the action pattern: methods take time as input and return actions for the
//! driver to execute, keeping the state machine pure and testable.
//!
//! Unsolicited connection loss is retried with capped exponential backoff and
//! jitter. Intentional closes (logout, view unmount) never retry; nothing
//! here is fatal to the process, a connection that exhausts its retries just
//! leaves live updates unavailable.
//!
//! # State Machine
//!
//! ```text
//! ┌──────┐  open   ┌────────────┐  established  ┌───────────┐
//! │ Idle │────────>│ Connecting │──────────────>│ Connected │
//! └──────┘         └────────────┘               └───────────┘
//!                     │      ↑ poll_retry due        │
//!                lost │      │                       │ lost
//!                     ↓      │                       ↓
//!                  ┌───────────┐  retries exhausted ┌────────┐
//!                  │  Backoff  │───────────────────>│ Closed │
//!                  └───────────┘      (or close)    └────────┘
//! ```

use std::{
    ops::Sub,
    time::{Duration, Instant},
};

use crate::error::ConnectionError;

/// First retry delay after an unsolicited loss.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Ceiling for the exponential backoff delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Maximum random jitter added to each retry delay.
pub const DEFAULT_JITTER: Duration = Duration::from_millis(500);

/// Retry attempts before giving up on the connection.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Actions returned by the connection state machine.
///
/// The driver (sync client caller) executes these:
/// - `Connect`: open the transport, presenting the session token
/// - `Close`: tear the transport down
/// - `ScheduleRetry`: informational; a retry becomes due after `delay`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionAction {
    /// Open the transport connection.
    Connect,

    /// Close the transport connection.
    Close,

    /// A reconnect attempt was scheduled.
    ScheduleRetry {
        /// Delay until the retry becomes due.
        delay: Duration,
    },
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session; nothing to connect.
    Idle,
    /// Transport connect in flight.
    Connecting,
    /// Transport is live; inbound events flow.
    Connected,
    /// Waiting out a backoff delay before retrying.
    Backoff,
    /// Closed; no retry pending.
    Closed,
}

/// Reconnect policy: capped exponential backoff with jitter.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Delay before the first retry; doubles each attempt.
    pub base_delay: Duration,
    /// Delay ceiling.
    pub max_delay: Duration,
    /// Maximum random jitter added per attempt.
    pub jitter: Duration,
    /// Attempts before the connection stays closed.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            jitter: DEFAULT_JITTER,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl ReconnectPolicy {
    /// Backoff delay for the given 1-based attempt number.
    ///
    /// `entropy` supplies the jitter randomness; callers pass a fresh random
    /// value so tests stay deterministic.
    pub fn delay_for(&self, attempt: u32, entropy: u64) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let scaled = self
            .base_delay
            .checked_mul(1u32 << exponent)
            .map_or(self.max_delay, |d| d.min(self.max_delay));

        let jitter_window = self.jitter.as_millis() as u64;
        let jitter = if jitter_window == 0 { 0 } else { entropy % (jitter_window + 1) };

        scaled + Duration::from_millis(jitter)
    }
}

/// Connection lifecycle state machine.
///
/// Pure: no I/O, no clock reads. Time is passed in by the caller. Generic
/// over `Instant` to support virtual time in tests.
#[derive(Debug, Clone)]
pub struct Connection<I = Instant>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Current state.
    state: ConnectionState,
    /// Reconnect policy.
    policy: ReconnectPolicy,
    /// Retry attempts since the last successful connect.
    attempts: u32,
    /// Pending retry: when it was scheduled and how long to wait.
    retry: Option<(I, Duration)>,
}

impl<I> Connection<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create a new connection machine with the given policy.
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self { state: ConnectionState::Idle, policy, attempts: 0, retry: None }
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether inbound events should be applied.
    pub fn is_live(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Retry attempts since the last successful connect.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Begin connecting for a new session.
    ///
    /// Discards any previous connection first: there is never more than one
    /// open connection per session.
    pub fn open(&mut self) -> Vec<ConnectionAction> {
        let mut actions = Vec::new();
        if matches!(self.state, ConnectionState::Connecting | ConnectionState::Connected) {
            actions.push(ConnectionAction::Close);
        }
        self.state = ConnectionState::Connecting;
        self.attempts = 0;
        self.retry = None;
        actions.push(ConnectionAction::Connect);
        actions
    }

    /// The transport reported a successful connect.
    pub fn established(&mut self) -> Result<(), ConnectionError> {
        match self.state {
            ConnectionState::Connecting => {
                self.state = ConnectionState::Connected;
                self.attempts = 0;
                self.retry = None;
                Ok(())
            },
            state => Err(ConnectionError::InvalidState { state, operation: "established" }),
        }
    }

    /// The transport dropped without an intentional close.
    ///
    /// Schedules a backoff retry. Once the attempt cap is reached the
    /// connection stays closed and [`ConnectionError::RetriesExhausted`] is
    /// returned; no retry is pending after that. `entropy` feeds the jitter
    /// calculation.
    pub fn lost(&mut self, now: I, entropy: u64) -> Result<Vec<ConnectionAction>, ConnectionError> {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected => {
                self.attempts += 1;
                if self.attempts > self.policy.max_attempts {
                    self.state = ConnectionState::Closed;
                    self.retry = None;
                    return Err(ConnectionError::RetriesExhausted {
                        attempts: self.policy.max_attempts,
                    });
                }

                let delay = self.policy.delay_for(self.attempts, entropy);
                self.state = ConnectionState::Backoff;
                self.retry = Some((now, delay));
                Ok(vec![ConnectionAction::ScheduleRetry { delay }])
            },
            // Loss reported while idle, backing off, or already closed
            // carries no new information.
            _ => Ok(vec![]),
        }
    }

    /// Drive pending retries forward.
    ///
    /// Returns `Connect` once a scheduled retry becomes due.
    pub fn poll_retry(&mut self, now: I) -> Option<ConnectionAction> {
        if self.state != ConnectionState::Backoff {
            return None;
        }
        let (scheduled_at, delay) = self.retry?;
        if now - scheduled_at < delay {
            return None;
        }

        self.state = ConnectionState::Connecting;
        self.retry = None;
        Some(ConnectionAction::Connect)
    }

    /// Intentional close (logout or view unmount). Never retried.
    pub fn close(&mut self) -> Vec<ConnectionAction> {
        let was_open =
            matches!(self.state, ConnectionState::Connecting | ConnectionState::Connected);
        self.state = ConnectionState::Closed;
        self.attempts = 0;
        self.retry = None;
        if was_open { vec![ConnectionAction::Close] } else { vec![] }
    }
}

impl<I> Default for Connection<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    fn default() -> Self {
        Self::new(ReconnectPolicy::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn connected(now: Instant) -> Connection {
        let mut conn = Connection::default();
        let _ = conn.open();
        conn.established().unwrap();
        let _ = now; // connection stores no clock
        conn
    }

    #[test]
    fn open_then_established() {
        let mut conn: Connection = Connection::default();
        assert_eq!(conn.open(), vec![ConnectionAction::Connect]);
        assert_eq!(conn.state(), ConnectionState::Connecting);

        conn.established().unwrap();
        assert!(conn.is_live());
    }

    #[test]
    fn established_from_idle_is_invalid() {
        let mut conn: Connection = Connection::default();
        assert!(matches!(conn.established(), Err(ConnectionError::InvalidState { .. })));
    }

    #[test]
    fn reopen_discards_previous_connection() {
        let now = Instant::now();
        let mut conn = connected(now);

        let actions = conn.open();
        assert_eq!(actions, vec![ConnectionAction::Close, ConnectionAction::Connect]);
        assert_eq!(conn.state(), ConnectionState::Connecting);
    }

    #[test]
    fn loss_schedules_backoff_with_increasing_delay() {
        let now = Instant::now();
        let mut conn = connected(now);

        let first = conn.lost(now, 0).unwrap();
        let first_delay = match first.as_slice() {
            [ConnectionAction::ScheduleRetry { delay }] => *delay,
            other => panic!("expected ScheduleRetry, got {other:?}"),
        };

        // Retry, fail again; second delay doubles.
        let retry_at = now + first_delay;
        assert_eq!(conn.poll_retry(retry_at), Some(ConnectionAction::Connect));
        let second = conn.lost(retry_at, 0).unwrap();
        let second_delay = match second.as_slice() {
            [ConnectionAction::ScheduleRetry { delay }] => *delay,
            other => panic!("expected ScheduleRetry, got {other:?}"),
        };

        assert_eq!(second_delay, first_delay * 2);
    }

    #[test]
    fn retry_is_not_due_before_its_delay() {
        let now = Instant::now();
        let mut conn = connected(now);
        let _ = conn.lost(now, 0);

        assert_eq!(conn.poll_retry(now), None);
        assert_eq!(conn.poll_retry(now + Duration::from_millis(999)), None);
        assert_eq!(conn.poll_retry(now + Duration::from_secs(1)), Some(ConnectionAction::Connect));
    }

    #[test]
    fn retries_stop_after_attempt_cap() {
        let now = Instant::now();
        let policy = ReconnectPolicy {
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
            jitter: Duration::ZERO,
            max_attempts: 2,
        };
        let mut conn = Connection::new(policy);
        let _ = conn.open();
        conn.established().unwrap();

        let mut at = now;
        for _ in 0..2 {
            let actions = conn.lost(at, 0).unwrap();
            let delay = match actions.as_slice() {
                [ConnectionAction::ScheduleRetry { delay }] => *delay,
                other => panic!("expected ScheduleRetry, got {other:?}"),
            };
            at = at + delay;
            assert_eq!(conn.poll_retry(at), Some(ConnectionAction::Connect));
        }

        // Third loss exceeds the cap.
        let err = conn.lost(at, 0).unwrap_err();
        assert_eq!(err, ConnectionError::RetriesExhausted { attempts: 2 });
        assert!(err.is_transient(), "a later session may still connect");
        assert_eq!(conn.state(), ConnectionState::Closed);
        assert_eq!(conn.poll_retry(at + Duration::from_secs(60)), None);
    }

    #[test]
    fn intentional_close_cancels_pending_retry() {
        let now = Instant::now();
        let mut conn = connected(now);
        let _ = conn.lost(now, 0);

        assert_eq!(conn.close(), vec![]);
        assert_eq!(conn.state(), ConnectionState::Closed);
        assert_eq!(conn.poll_retry(now + Duration::from_secs(60)), None);
    }

    #[test]
    fn successful_reconnect_resets_attempts() {
        let now = Instant::now();
        let mut conn = connected(now);
        let _ = conn.lost(now, 0);
        let _ = conn.poll_retry(now + Duration::from_secs(2));
        conn.established().unwrap();
        assert_eq!(conn.attempts(), 0);
    }

    #[test]
    fn delay_is_capped_at_max() {
        let policy = ReconnectPolicy {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: Duration::ZERO,
            max_attempts: 50,
        };
        assert_eq!(policy.delay_for(1, 0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(5, 0), Duration::from_secs(16));
        assert_eq!(policy.delay_for(6, 0), Duration::from_secs(30));
        assert_eq!(policy.delay_for(40, 0), Duration::from_secs(30));
    }

    #[test]
    fn jitter_is_bounded_by_window() {
        let policy = ReconnectPolicy {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: Duration::from_millis(500),
            max_attempts: 5,
        };
        for entropy in [0u64, 1, 499, 500, 501, u64::MAX] {
            let delay = policy.delay_for(1, entropy);
            assert!(delay >= Duration::from_secs(1));
            assert!(delay <= Duration::from_millis(1500));
        }
    }
}
