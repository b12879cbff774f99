use std::time::Duration;

use tracing::debug;

const DEFAULT_INTERVAL: Duration = Duration::from_millis(50);
const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// Finite polling schedule for waiting on the vendor SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// `attempts` counts readiness checks, including the successful one.
    Ready { attempts: u32 },
    GaveUp { attempts: u32 },
}

/// Polls until `ready` holds or the policy is exhausted, sleeping
/// `policy.interval` between readiness checks.
pub fn wait_until_ready(
    policy: RetryPolicy,
    mut ready: impl FnMut() -> bool,
    mut sleep: impl FnMut(Duration),
) -> Readiness {
    let max_attempts = policy.max_attempts.max(1);
    for attempt in 1..=max_attempts {
        if ready() {
            return Readiness::Ready { attempts: attempt };
        }
        debug!(attempt, max_attempts, "tag SDK not ready yet");
        if attempt < max_attempts {
            sleep(policy.interval);
        }
    }
    Readiness::GaveUp {
        attempts: max_attempts,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::{Readiness, RetryPolicy, wait_until_ready};

    #[test]
    fn ready_on_first_check_never_sleeps() {
        let slept = Cell::new(0);
        let outcome = wait_until_ready(RetryPolicy::default(), || true, |_| slept.set(slept.get() + 1));

        assert_eq!(outcome, Readiness::Ready { attempts: 1 });
        assert_eq!(slept.get(), 0);
    }

    #[test]
    fn becomes_ready_after_a_few_intervals() {
        let checks = Cell::new(0);
        let total = Cell::new(Duration::ZERO);
        let outcome = wait_until_ready(
            RetryPolicy::default(),
            || {
                checks.set(checks.get() + 1);
                checks.get() == 4
            },
            |interval| total.set(total.get() + interval),
        );

        assert_eq!(outcome, Readiness::Ready { attempts: 4 });
        assert_eq!(total.get(), Duration::from_millis(150));
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let policy = RetryPolicy {
            interval: Duration::from_millis(5),
            max_attempts: 3,
        };
        let sleeps = Cell::new(0);
        let outcome = wait_until_ready(policy, || false, |_| sleeps.set(sleeps.get() + 1));

        assert_eq!(outcome, Readiness::GaveUp { attempts: 3 });
        assert_eq!(sleeps.get(), 2);
    }
}
