// Reconnect state machine: bounded retries per disconnect episode

use std::time::Duration;

/// Delay between reconnect attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(3000);
/// Reconnect attempts per disconnect episode.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub retry_delay: Duration,
    pub max_retries: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            retry_delay: DEFAULT_RETRY_DELAY,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Tracks connection state and the retry counter.
///
/// The counter resets on every successful connect, so the budget applies to
/// one disconnect episode rather than to the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Reconnector {
    policy: ReconnectPolicy,
    state: ConnectionState,
    retries: u32,
}

impl Reconnector {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            state: ConnectionState::Disconnected,
            retries: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    pub fn is_exhausted(&self) -> bool {
        self.retries >= self.policy.max_retries
    }

    pub fn begin_connect(&mut self) {
        self.state = ConnectionState::Connecting;
    }

    pub fn on_connected(&mut self) {
        self.state = ConnectionState::Connected;
        self.retries = 0;
    }

    /// Transport closed (or failed to open). Returns the delay before the next
    /// attempt, or `None` once the retry budget is spent.
    pub fn on_closed(&mut self) -> Option<Duration> {
        if self.retries < self.policy.max_retries {
            self.retries += 1;
            self.state = ConnectionState::Reconnecting {
                attempt: self.retries,
            };
            Some(self.policy.retry_delay)
        } else {
            self.state = ConnectionState::Disconnected;
            None
        }
    }

    /// Stop without scheduling anything (shutdown).
    pub fn disconnect(&mut self) {
        self.state = ConnectionState::Disconnected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closes_schedule_until_budget_spent() {
        let mut r = Reconnector::new(ReconnectPolicy::default());
        r.begin_connect();
        for attempt in 1..=DEFAULT_MAX_RETRIES {
            assert_eq!(r.on_closed(), Some(DEFAULT_RETRY_DELAY));
            assert_eq!(r.state(), ConnectionState::Reconnecting { attempt });
            r.begin_connect();
        }
        assert!(r.is_exhausted());
        assert_eq!(r.on_closed(), None);
        assert_eq!(r.state(), ConnectionState::Disconnected);
        assert_eq!(r.on_closed(), None);
    }

    #[test]
    fn successful_connect_resets_counter() {
        let mut r = Reconnector::new(ReconnectPolicy::default());
        r.on_closed();
        r.on_closed();
        assert_eq!(r.retries(), 2);
        r.begin_connect();
        r.on_connected();
        assert_eq!(r.retries(), 0);
        assert_eq!(r.state(), ConnectionState::Connected);
        assert_eq!(r.on_closed(), Some(DEFAULT_RETRY_DELAY));
        assert_eq!(r.state(), ConnectionState::Reconnecting { attempt: 1 });
    }

    #[test]
    fn zero_retry_policy_never_schedules() {
        let mut r = Reconnector::new(ReconnectPolicy {
            retry_delay: Duration::from_millis(1),
            max_retries: 0,
        });
        assert_eq!(r.on_closed(), None);
    }
}
