//! Fixed-interval polling
//!
//! `poll_until` fetches a value, returns it once the terminal predicate
//! holds, and otherwise sleeps for the policy interval and fetches again.
//! The first fetch happens immediately. An optional maximum wait bounds the
//! whole loop; without one the loop runs until the remote side finishes.

use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::{DeviceFarmSettings, DEFAULT_POLL_INTERVAL_SECONDS};

/// Interval and bound for a polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_wait: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECONDS),
            max_wait: None,
        }
    }
}

impl PollPolicy {
    /// Unbounded policy with the given interval
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            max_wait: None,
        }
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    pub fn from_settings(settings: &DeviceFarmSettings) -> Self {
        Self {
            interval: settings.poll_interval,
            max_wait: settings.max_wait,
        }
    }
}

/// Polling failure
#[derive(Debug, thiserror::Error)]
pub enum PollError<E> {
    /// The fetch itself failed; polling stops on the first error.
    #[error("{0}")]
    Fetch(E),

    #[error("still not finished after {}s ({polls} polls)", .waited.as_secs())]
    Timeout { waited: Duration, polls: u32 },
}

/// Poll `fetch` until `is_done` accepts the value.
pub fn poll_until<T, E, F, P>(policy: &PollPolicy, mut fetch: F, is_done: P) -> Result<T, PollError<E>>
where
    F: FnMut() -> Result<T, E>,
    P: Fn(&T) -> bool,
{
    let start = Instant::now();
    let mut polls = 0u32;

    loop {
        let value = fetch().map_err(PollError::Fetch)?;
        polls += 1;

        if is_done(&value) {
            return Ok(value);
        }

        let mut pause = policy.interval;
        if let Some(max_wait) = policy.max_wait {
            let waited = start.elapsed();
            if waited >= max_wait {
                return Err(PollError::Timeout { waited, polls });
            }
            pause = pause.min(max_wait - waited);
        }

        debug!(polls, pause_ms = pause.as_millis() as u64, "not finished, sleeping");
        thread::sleep(pause);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_default_policy_is_ten_seconds_unbounded() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(10));
        assert!(policy.max_wait.is_none());
    }

    #[test]
    fn test_returns_first_terminal_value() {
        let calls = Cell::new(0);
        let policy = PollPolicy::every(Duration::ZERO);

        let value: Result<u32, PollError<String>> = poll_until(
            &policy,
            || {
                calls.set(calls.get() + 1);
                Ok(calls.get())
            },
            |v| *v == 3,
        );

        assert_eq!(value.unwrap(), 3);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_terminal_on_first_fetch_does_not_sleep() {
        let policy = PollPolicy::every(Duration::from_secs(3600));
        let start = Instant::now();
        let value: Result<&str, PollError<String>> =
            poll_until(&policy, || Ok("done"), |_| true);
        assert_eq!(value.unwrap(), "done");
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_fetch_error_stops_polling() {
        let calls = Cell::new(0);
        let policy = PollPolicy::every(Duration::ZERO);

        let result: Result<u32, PollError<String>> = poll_until(
            &policy,
            || {
                calls.set(calls.get() + 1);
                if calls.get() == 2 {
                    Err("boom".to_string())
                } else {
                    Ok(0)
                }
            },
            |_| false,
        );

        assert!(matches!(result, Err(PollError::Fetch(ref e)) if e == "boom"));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_max_wait_bounds_loop() {
        let policy = PollPolicy::every(Duration::from_secs(3600)).with_max_wait(Duration::ZERO);

        let result: Result<u32, PollError<String>> = poll_until(&policy, || Ok(0), |_| false);

        match result {
            Err(PollError::Timeout { polls, .. }) => assert_eq!(polls, 1),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_from_settings() {
        let settings = DeviceFarmSettings {
            poll_interval: Duration::from_secs(3),
            max_wait: Some(Duration::from_secs(60)),
            ..DeviceFarmSettings::default()
        };
        let policy = PollPolicy::from_settings(&settings);
        assert_eq!(policy.interval, Duration::from_secs(3));
        assert_eq!(policy.max_wait, Some(Duration::from_secs(60)));
    }
}
