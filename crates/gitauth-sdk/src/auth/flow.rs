//! Bookkeeping for a caller-driven device flow poll loop.
//!
//! `DeviceFlow` performs no I/O and never sleeps. It tells the caller when the next exchange
//! attempt is allowed and folds each attempt's outcome into a state:
//!
//! ```text
//! Requested -> Pending -> Pending* -> Exchanged | Expired | Denied | Failed
//!          \-> Cancelled (from any non-terminal state)
//! ```
//!
//! A typical loop:
//!
//! ```no_run
//! # use gitauth_sdk::{DeviceFlow, GitAuthClient};
//! # use gitauth_sdk::auth::flow::Attempt;
//! # use std::time::Instant;
//! # async fn run(client: GitAuthClient) -> gitauth_sdk::Result<()> {
//! let code = client.request_device_code("github").await?;
//! let mut flow = DeviceFlow::new(code);
//! loop {
//!     match flow.poll(Instant::now()) {
//!         Attempt::Wait(delay) => tokio::time::sleep(delay).await,
//!         Attempt::Ready(code) => {
//!             let outcome = client.exchange_device_code("github", code).await;
//!             flow.record(&outcome);
//!         }
//!         Attempt::Done(state) => {
//!             println!("finished: {:?}", state);
//!             break;
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::time::{Duration, Instant};

use crate::auth::device_code::ExchangeFailure;
use crate::error::Result;
use crate::types::{instant_after, DeviceCode};

/// Extra spacing added after every rate-limit response (RFC 8628 §3.5)
pub const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// Code issued, no attempt recorded yet
    Requested,
    /// Waiting on the user
    Pending,
    Exchanged,
    Expired,
    Denied,
    /// A non-retryable error ended the flow
    Failed,
    Cancelled,
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FlowState::Requested | FlowState::Pending)
    }
}

/// What the caller should do next
#[derive(Debug)]
pub enum Attempt<'a> {
    /// Sleep this long, then poll again
    Wait(Duration),
    /// Make exactly one exchange attempt with this code and record the outcome
    Ready(&'a DeviceCode),
    /// The flow is over
    Done(FlowState),
}

#[derive(Debug)]
pub struct DeviceFlow {
    code: DeviceCode,
    state: FlowState,
    interval: Duration,
    attempts: u32,
    last_attempt: Instant,
    last_failure: Option<ExchangeFailure>,
}

impl DeviceFlow {
    pub fn new(code: DeviceCode) -> Self {
        let interval = code.poll_interval();
        let issued_at = code.issued_at();
        Self {
            code,
            state: FlowState::Requested,
            interval,
            attempts: 0,
            last_attempt: issued_at,
            last_failure: None,
        }
    }

    /// Raise the poll interval to at least `floor`
    pub fn with_min_interval(mut self, floor: Duration) -> Self {
        self.interval = self.interval.max(floor);
        self
    }

    pub fn code(&self) -> &DeviceCode {
        &self.code
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn last_failure(&self) -> Option<ExchangeFailure> {
        self.last_failure
    }

    /// Instant after which the code must be discarded
    pub fn deadline(&self) -> Instant {
        self.code.expires_at()
    }

    /// Decide the next step at `now`
    pub fn poll(&mut self, now: Instant) -> Attempt<'_> {
        if self.state.is_terminal() {
            return Attempt::Done(self.state);
        }
        if self.code.is_expired_at(now) {
            log::debug!("device code expired after {} attempts", self.attempts);
            self.state = FlowState::Expired;
            return Attempt::Done(self.state);
        }

        let earliest = instant_after(self.last_attempt, self.interval);
        if now < earliest {
            let until_deadline = self.deadline().saturating_duration_since(now);
            return Attempt::Wait((earliest - now).min(until_deadline));
        }

        self.attempts += 1;
        self.last_attempt = now;
        Attempt::Ready(&self.code)
    }

    /// Fold the outcome of one exchange attempt into the flow
    pub fn record(&mut self, outcome: &Result<()>) -> FlowState {
        if self.state.is_terminal() {
            return self.state;
        }

        self.state = match outcome {
            Ok(()) => {
                self.last_failure = None;
                FlowState::Exchanged
            }
            Err(err) => {
                let failure = ExchangeFailure::classify(err);
                self.last_failure = failure;
                match failure {
                    Some(ExchangeFailure::Pending) => FlowState::Pending,
                    Some(ExchangeFailure::RateLimited) => {
                        self.interval = self.interval.saturating_add(SLOW_DOWN_STEP);
                        log::debug!("rate limited, poll interval now {:?}", self.interval);
                        FlowState::Pending
                    }
                    Some(ExchangeFailure::Expired) => FlowState::Expired,
                    Some(ExchangeFailure::Denied) => FlowState::Denied,
                    Some(ExchangeFailure::Other) | None => FlowState::Failed,
                }
            }
        };
        self.state
    }

    /// Abandon the flow. No further attempts will be offered.
    pub fn cancel(&mut self) -> FlowState {
        if !self.state.is_terminal() {
            self.state = FlowState::Cancelled;
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GitAuthError;
    use reqwest::StatusCode;

    fn code(expires_in: u64, interval: u64) -> DeviceCode {
        DeviceCode::new("abc", "WXYZ-1234", "https://github.com/login/device", expires_in, interval)
    }

    fn pending() -> Result<()> {
        Err(GitAuthError::provider(StatusCode::BAD_REQUEST, "authorization_pending", None))
    }

    #[test]
    fn test_first_attempt_waits_one_interval() {
        let mut flow = DeviceFlow::new(code(900, 5));
        let start = flow.code().issued_at();

        match flow.poll(start) {
            Attempt::Wait(d) => assert_eq!(d, Duration::from_secs(5)),
            other => panic!("expected wait, got {:?}", other),
        }
        assert!(matches!(flow.poll(start + Duration::from_secs(5)), Attempt::Ready(_)));
        assert_eq!(flow.attempts(), 1);
    }

    #[test]
    fn test_pending_keeps_polling_at_interval() {
        let mut flow = DeviceFlow::new(code(900, 5));
        let t1 = flow.code().issued_at() + Duration::from_secs(5);

        assert!(matches!(flow.poll(t1), Attempt::Ready(_)));
        assert_eq!(flow.record(&pending()), FlowState::Pending);
        assert_eq!(flow.last_failure(), Some(ExchangeFailure::Pending));

        match flow.poll(t1 + Duration::from_secs(1)) {
            Attempt::Wait(d) => assert_eq!(d, Duration::from_secs(4)),
            other => panic!("expected wait, got {:?}", other),
        }
        assert!(matches!(flow.poll(t1 + Duration::from_secs(5)), Attempt::Ready(_)));
        assert_eq!(flow.record(&Ok(())), FlowState::Exchanged);
        assert!(matches!(
            flow.poll(t1 + Duration::from_secs(60)),
            Attempt::Done(FlowState::Exchanged)
        ));
    }

    #[test]
    fn test_rate_limit_widens_interval() {
        let mut flow = DeviceFlow::new(code(900, 5));
        let t1 = flow.code().issued_at() + Duration::from_secs(5);
        assert!(matches!(flow.poll(t1), Attempt::Ready(_)));

        let slow_down = Err(GitAuthError::provider(StatusCode::TOO_MANY_REQUESTS, "slow_down", None));
        assert_eq!(flow.record(&slow_down), FlowState::Pending);
        assert_eq!(flow.interval(), Duration::from_secs(10));
        assert!(matches!(flow.poll(t1 + Duration::from_secs(5)), Attempt::Wait(_)));
    }

    #[test]
    fn test_huge_interval_waits_until_expiry() {
        let mut flow = DeviceFlow::new(code(900, u64::MAX));
        let start = flow.code().issued_at();

        match flow.poll(start) {
            Attempt::Wait(d) => assert_eq!(d, Duration::from_secs(900)),
            other => panic!("expected wait, got {:?}", other),
        }
        assert!(matches!(
            flow.poll(start + Duration::from_secs(900)),
            Attempt::Done(FlowState::Expired)
        ));
        assert_eq!(flow.attempts(), 0);
    }

    #[test]
    fn test_slow_down_saturates() {
        let mut flow = DeviceFlow::new(code(900, u64::MAX));
        let slow_down = Err(GitAuthError::provider(StatusCode::TOO_MANY_REQUESTS, "slow_down", None));
        assert_eq!(flow.record(&slow_down), FlowState::Pending);
        assert_eq!(flow.interval(), Duration::MAX);
    }

    #[test]
    fn test_min_interval_floor() {
        let flow = DeviceFlow::new(code(900, 1)).with_min_interval(Duration::from_secs(5));
        assert_eq!(flow.interval(), Duration::from_secs(5));

        let flow = DeviceFlow::new(code(900, 10)).with_min_interval(Duration::from_secs(5));
        assert_eq!(flow.interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_expiry_stops_the_flow() {
        let mut flow = DeviceFlow::new(code(8, 5));
        let start = flow.code().issued_at();
        assert!(matches!(flow.poll(start + Duration::from_secs(5)), Attempt::Ready(_)));
        flow.record(&pending());

        match flow.poll(start + Duration::from_secs(6)) {
            Attempt::Wait(d) => assert_eq!(d, Duration::from_secs(2)),
            other => panic!("expected wait, got {:?}", other),
        }
        assert!(matches!(
            flow.poll(start + Duration::from_secs(8)),
            Attempt::Done(FlowState::Expired)
        ));
        assert_eq!(flow.attempts(), 1);
    }

    #[test]
    fn test_terminal_failures() {
        let mut flow = DeviceFlow::new(code(900, 5));
        let denied = Err(GitAuthError::provider(StatusCode::BAD_REQUEST, "access_denied", None));
        assert_eq!(flow.record(&denied), FlowState::Denied);
        assert_eq!(flow.record(&Ok(())), FlowState::Denied);

        let mut flow = DeviceFlow::new(code(900, 5));
        let transport = Err(GitAuthError::Transport("connection reset".to_string()));
        assert_eq!(flow.record(&transport), FlowState::Failed);
        assert_eq!(flow.last_failure(), None);

        let mut flow = DeviceFlow::new(code(900, 5));
        let expired = Err(GitAuthError::provider(StatusCode::BAD_REQUEST, "expired_token", None));
        assert_eq!(flow.record(&expired), FlowState::Expired);
    }

    #[test]
    fn test_cancel() {
        let mut flow = DeviceFlow::new(code(900, 5));
        assert_eq!(flow.cancel(), FlowState::Cancelled);
        let later = flow.code().issued_at() + Duration::from_secs(30);
        assert!(matches!(flow.poll(later), Attempt::Done(FlowState::Cancelled)));

        let mut flow = DeviceFlow::new(code(900, 5));
        flow.record(&Ok(()));
        assert_eq!(flow.cancel(), FlowState::Exchanged);
    }
}
