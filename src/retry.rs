use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;
use tracing::warn;

use crate::models::{Listing, SiteResult};
use crate::utils::error::{AppError, Result};

/// Bounded retry budget with a fixed inter-attempt delay. Fixed, not
/// exponential: the budget is small and site blocking is an external
/// concern this layer does not manage.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        // A zero budget would mean "never attempt"; config validation
        // rejects it, this clamp covers direct construction.
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }
}

/// Run one strategy invocation under the retry policy and fold the outcome
/// into a `SiteResult`.
///
/// Retries are reserved for errors (navigation failure, driver crash). A
/// normal return is never retried, even when it carries zero or only
/// diagnostic listings.
pub async fn with_retry<F, Fut>(policy: RetryPolicy, site: &str, mut attempt_fn: F) -> SiteResult
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<Listing>>>,
{
    let attempts = AtomicU32::new(0);
    let strategy =
        FixedInterval::new(policy.backoff).take((policy.max_attempts as usize).saturating_sub(1));

    let outcome = Retry::spawn(strategy, || {
        let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
        let fut = attempt_fn();
        async move {
            fut.await.inspect_err(|e| {
                warn!(site, attempt, error = %e, "extraction attempt failed");
            })
        }
    })
    .await;

    match outcome {
        Ok(listings) => SiteResult::Ok(listings),
        Err(e) => {
            let exhausted = AppError::SiteExhausted {
                site: site.to_string(),
                attempts: policy.max_attempts,
                reason: e.to_string(),
            };
            warn!("{}", exhausted);
            SiteResult::Failed {
                site: site.to_string(),
                reason: format!("failed after {} retries: {}", policy.max_attempts, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_exhausted_budget_becomes_failed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = Arc::clone(&calls);

        let result = with_retry(fast_policy(), "Myntra", move || {
            let calls = Arc::clone(&calls_in);
            async move {
                calls.fetch_add(1, Ordering::Relaxed);
                Err(AppError::Navigation("connection reset".to_string()))
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::Relaxed), 3);
        let SiteResult::Failed { site, reason } = result else {
            panic!("expected failure");
        };
        assert_eq!(site, "Myntra");
        assert!(reason.contains("failed after 3 retries"));
        assert!(reason.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_throw_once_then_succeed_stops_retrying() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = Arc::clone(&calls);

        let result = with_retry(fast_policy(), "Flipkart", move || {
            let calls = Arc::clone(&calls_in);
            async move {
                if calls.fetch_add(1, Ordering::Relaxed) == 0 {
                    Err(AppError::Navigation("timeout".to_string()))
                } else {
                    Ok(vec![Listing::new("Shoe", "₹1", None)])
                }
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::Relaxed), 2);
        assert!(matches!(result, SiteResult::Ok(listings) if listings.len() == 1));
    }

    #[tokio::test]
    async fn test_empty_success_is_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = Arc::clone(&calls);

        let result = with_retry(fast_policy(), "Ajio", move || {
            let calls = Arc::clone(&calls_in);
            async move {
                calls.fetch_add(1, Ordering::Relaxed);
                Ok(Vec::new())
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert!(matches!(result, SiteResult::Ok(listings) if listings.is_empty()));
    }

    #[tokio::test]
    async fn test_single_attempt_policy() {
        let result = with_retry(RetryPolicy::new(1, Duration::from_millis(1)), "Amazon", || async {
            Err(AppError::Navigation("boom".to_string()))
        })
        .await;

        let SiteResult::Failed { reason, .. } = result else {
            panic!("expected failure");
        };
        assert!(reason.contains("failed after 1 retries"));
    }
}
