//! Multi-window cooldown system for rate limiting command usage
//!
//! Each guarded command is throttled per user by an ordered list of sliding
//! windows (e.g. 1 use / 10s, 5 uses / 60s, 200 uses / 24h). A call is
//! admitted only when every window admits it; the outcome is a typed value,
//! not an error, so handlers can present the retry time directly.

use dashmap::DashMap;
use spoobot_config::CooldownsConfig;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Errors raised while building window lists from configuration. These are
/// construction-time failures; admission checks never fail.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CooldownConfigError {
    #[error("Cooldown limit must be greater than 0")]
    ZeroLimit,
    #[error("Cooldown period must be greater than 0")]
    ZeroPeriod,
}

/// One throttling rule: at most `limit` uses inside any trailing `period`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    limit: u32,
    period: Duration,
}

impl RateWindow {
    /// Create a window, rejecting degenerate limits and periods
    pub fn new(limit: u32, period: Duration) -> Result<Self, CooldownConfigError> {
        if limit == 0 {
            return Err(CooldownConfigError::ZeroLimit);
        }
        if period.is_zero() {
            return Err(CooldownConfigError::ZeroPeriod);
        }
        Ok(Self { limit, period })
    }

    /// Convenience constructor from whole seconds
    pub fn per_seconds(limit: u32, seconds: u64) -> Result<Self, CooldownConfigError> {
        Self::new(limit, Duration::from_secs(seconds))
    }

    /// Build the window list from validated application configuration
    pub fn from_config(config: &CooldownsConfig) -> Result<Vec<Self>, CooldownConfigError> {
        config
            .rules()
            .iter()
            .map(|rule| Self::per_seconds(rule.count, rule.seconds))
            .collect()
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownCheck {
    /// The call may proceed; its use has been recorded in every window
    Admitted,
    /// The call must not proceed. `retry_after` is the wait until every
    /// window admits again; nothing was recorded.
    Rejected { retry_after: Duration },
}

impl CooldownCheck {
    pub fn is_admitted(&self) -> bool {
        matches!(self, CooldownCheck::Admitted)
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            CooldownCheck::Admitted => None,
            CooldownCheck::Rejected { retry_after } => Some(*retry_after),
        }
    }
}

/// Counting scope: one per (command, user). Different users and different
/// commands never share state.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct RateLimitKey {
    command: String,
    user_id: u64,
}

/// Per-key mutable state: one sliding log of invocation instants per window
#[derive(Debug)]
struct KeyState {
    logs: Vec<VecDeque<Instant>>,
    last_seen: Instant,
}

impl KeyState {
    fn new(window_count: usize, now: Instant) -> Self {
        Self {
            logs: (0..window_count).map(|_| VecDeque::new()).collect(),
            last_seen: now,
        }
    }
}

/// Manager for multi-window command cooldowns
#[derive(Debug, Default)]
pub struct CooldownManager {
    /// Sliding-log state per (command, user) key, created lazily
    states: DashMap<RateLimitKey, KeyState>,
}

impl CooldownManager {
    /// Create a new cooldown manager
    pub fn new() -> Self {
        Self {
            states: DashMap::new(),
        }
    }

    /// Check whether a call is admitted and, if so, record it in every
    /// window as one unit. A rejected call records nothing.
    pub fn check_and_record(
        &self,
        command: &str,
        user_id: u64,
        windows: &[RateWindow],
    ) -> CooldownCheck {
        self.check_and_record_at(command, user_id, windows, Instant::now())
    }

    /// Admission check against an explicit clock. The map entry guard is the
    /// per-key critical section: pruning, the decision and recording all
    /// happen under it, so two near-simultaneous calls for the same key
    /// cannot both take the last slot.
    pub fn check_and_record_at(
        &self,
        command: &str,
        user_id: u64,
        windows: &[RateWindow],
        now: Instant,
    ) -> CooldownCheck {
        if windows.is_empty() {
            return CooldownCheck::Admitted;
        }

        let key = RateLimitKey {
            command: command.to_string(),
            user_id,
        };

        let mut state = self
            .states
            .entry(key)
            .or_insert_with(|| KeyState::new(windows.len(), now));
        state.last_seen = now;

        // The window list for a command is fixed for the process lifetime
        if state.logs.len() != windows.len() {
            state.logs = (0..windows.len()).map(|_| VecDeque::new()).collect();
        }

        // Evaluate every window so the reported wait clears all of them
        let mut retry_after: Option<Duration> = None;
        for (log, window) in state.logs.iter_mut().zip(windows) {
            while let Some(&oldest) = log.front() {
                if now.duration_since(oldest) >= window.period {
                    log.pop_front();
                } else {
                    break;
                }
            }

            if log.len() as u32 >= window.limit {
                // A full log is never empty since limit >= 1
                let oldest = match log.front() {
                    Some(&instant) => instant,
                    None => continue,
                };
                let wait = window.period - now.duration_since(oldest);
                retry_after = Some(retry_after.map_or(wait, |current| current.max(wait)));
            }
        }

        if let Some(retry_after) = retry_after {
            debug!(
                "Command '{}' rejected for user {} (retry in {:?})",
                command, user_id, retry_after
            );
            return CooldownCheck::Rejected { retry_after };
        }

        // Every window admitted: record as one unit
        for log in state.logs.iter_mut() {
            log.push_back(now);
        }
        CooldownCheck::Admitted
    }

    /// Number of keys currently holding state
    pub fn active_keys(&self) -> usize {
        self.states.len()
    }

    /// Drop keys idle longer than `max_idle` (should be called periodically;
    /// unbounded key growth is otherwise accepted)
    pub fn cleanup_idle(&self, max_idle: Duration) {
        let now = Instant::now();
        let before = self.states.len();
        self.states
            .retain(|_, state| now.duration_since(state.last_seen) <= max_idle);
        let removed = before - self.states.len();
        if removed > 0 {
            debug!("Cleaned up {} idle cooldown keys", removed);
        }
    }

    /// Clear all cooldown state for a specific user
    pub fn clear_user(&self, user_id: u64) {
        self.states.retain(|key, _| key.user_id != user_id);
        debug!("Cleared cooldowns for user {}", user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn default_windows() -> Vec<RateWindow> {
        vec![
            RateWindow::per_seconds(1, 10).unwrap(),
            RateWindow::per_seconds(5, 60).unwrap(),
            RateWindow::per_seconds(200, 86400).unwrap(),
        ]
    }

    #[test]
    fn test_invalid_windows_rejected_at_construction() {
        assert_eq!(
            RateWindow::per_seconds(0, 10),
            Err(CooldownConfigError::ZeroLimit)
        );
        assert_eq!(
            RateWindow::new(1, Duration::ZERO),
            Err(CooldownConfigError::ZeroPeriod)
        );
    }

    #[test]
    fn test_windows_from_config() {
        let windows = RateWindow::from_config(&CooldownsConfig::default()).unwrap();
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].limit(), 1);
        assert_eq!(windows[0].period(), secs(10));
        assert_eq!(windows[2].limit(), 200);
    }

    #[test]
    fn test_admit_reject_readmit_scenario() {
        // 1/10s + 5/60s + 200/24h: once at t=0, again at t=5 (rejected,
        // 5s left on the short window), again at t=11 (admitted)
        let manager = CooldownManager::new();
        let windows = default_windows();
        let base = Instant::now();

        let first = manager.check_and_record_at("shorten", 1, &windows, base);
        assert!(first.is_admitted());

        let second = manager.check_and_record_at("shorten", 1, &windows, base + secs(5));
        assert_eq!(second.retry_after(), Some(secs(5)));

        let third = manager.check_and_record_at("shorten", 1, &windows, base + secs(11));
        assert!(third.is_admitted());
    }

    #[test]
    fn test_nth_plus_one_call_at_same_instant_is_rejected() {
        let manager = CooldownManager::new();
        let windows = vec![RateWindow::per_seconds(3, 60).unwrap()];
        let base = Instant::now();

        for _ in 0..3 {
            assert!(manager
                .check_and_record_at("stats", 7, &windows, base)
                .is_admitted());
        }

        let rejected = manager.check_and_record_at("stats", 7, &windows, base);
        let retry_after = rejected.retry_after().expect("should be rejected");
        assert!(retry_after > Duration::ZERO);
        assert_eq!(retry_after, secs(60));
    }

    #[test]
    fn test_keys_are_isolated() {
        let manager = CooldownManager::new();
        let windows = vec![RateWindow::per_seconds(1, 10).unwrap()];
        let base = Instant::now();

        assert!(manager
            .check_and_record_at("shorten", 1, &windows, base)
            .is_admitted());

        // Same command, different user
        assert!(manager
            .check_and_record_at("shorten", 2, &windows, base)
            .is_admitted());

        // Same user, different command
        assert!(manager
            .check_and_record_at("emojify", 1, &windows, base)
            .is_admitted());

        // The original key is still on cooldown
        assert!(!manager
            .check_and_record_at("shorten", 1, &windows, base + secs(1))
            .is_admitted());
    }

    #[test]
    fn test_rejected_call_records_nothing() {
        // Window two would have admitted the rejected call; a partial record
        // there would wrongly reject the t=11 retry
        let manager = CooldownManager::new();
        let windows = vec![
            RateWindow::per_seconds(1, 10).unwrap(),
            RateWindow::per_seconds(2, 100).unwrap(),
        ];
        let base = Instant::now();

        assert!(manager
            .check_and_record_at("shorten", 1, &windows, base)
            .is_admitted());
        assert!(!manager
            .check_and_record_at("shorten", 1, &windows, base + secs(5))
            .is_admitted());

        // Admitted: the long window holds one entry, not two
        assert!(manager
            .check_and_record_at("shorten", 1, &windows, base + secs(11))
            .is_admitted());

        // Now the long window is full (entries at 0 and 11); the next call
        // at t=22 clears the short window but not the long one
        let rejected = manager.check_and_record_at("shorten", 1, &windows, base + secs(22));
        assert_eq!(rejected.retry_after(), Some(secs(78)));
    }

    #[test]
    fn test_largest_retry_after_wins() {
        let manager = CooldownManager::new();
        let windows = vec![
            RateWindow::per_seconds(1, 10).unwrap(),
            RateWindow::per_seconds(1, 60).unwrap(),
        ];
        let base = Instant::now();

        assert!(manager
            .check_and_record_at("shorten", 1, &windows, base)
            .is_admitted());

        // Both windows reject; the reported wait must clear the longer one
        let rejected = manager.check_and_record_at("shorten", 1, &windows, base + secs(5));
        assert_eq!(rejected.retry_after(), Some(secs(55)));
    }

    #[test]
    fn test_waiting_the_reported_time_admits() {
        let manager = CooldownManager::new();
        let windows = vec![
            RateWindow::per_seconds(1, 10).unwrap(),
            RateWindow::per_seconds(1, 60).unwrap(),
        ];
        let base = Instant::now();

        manager.check_and_record_at("shorten", 1, &windows, base);
        let rejected = manager.check_and_record_at("shorten", 1, &windows, base + secs(5));
        let wait = rejected.retry_after().unwrap();

        assert!(manager
            .check_and_record_at("shorten", 1, &windows, base + secs(5) + wait)
            .is_admitted());
    }

    #[test]
    fn test_empty_window_list_always_admits() {
        let manager = CooldownManager::new();
        let base = Instant::now();
        for _ in 0..100 {
            assert!(manager
                .check_and_record_at("help", 1, &[], base)
                .is_admitted());
        }
        assert_eq!(manager.active_keys(), 0);
    }

    #[test]
    fn test_medium_window_rejects_burst() {
        let manager = CooldownManager::new();
        let windows = default_windows();
        let base = Instant::now();

        // Five admitted calls spaced past the short window
        for i in 0..5u64 {
            assert!(manager
                .check_and_record_at("shorten", 1, &windows, base + secs(i * 11))
                .is_admitted());
        }

        // The sixth inside the minute hits the 5/60s window
        let rejected = manager.check_and_record_at("shorten", 1, &windows, base + secs(55));
        let retry_after = rejected.retry_after().unwrap();
        assert_eq!(retry_after, secs(5)); // oldest entry (t=0) ages out at t=60
    }

    #[test]
    fn test_cleanup_idle_drops_stale_keys() {
        let manager = CooldownManager::new();
        let windows = vec![RateWindow::per_seconds(1, 1).unwrap()];

        manager.check_and_record("shorten", 1, &windows);
        assert_eq!(manager.active_keys(), 1);

        manager.cleanup_idle(Duration::ZERO);
        assert_eq!(manager.active_keys(), 0);
    }

    #[test]
    fn test_clear_user() {
        let manager = CooldownManager::new();
        let windows = vec![RateWindow::per_seconds(1, 60).unwrap()];
        let base = Instant::now();

        manager.check_and_record_at("shorten", 1, &windows, base);
        manager.check_and_record_at("shorten", 2, &windows, base);
        assert_eq!(manager.active_keys(), 2);

        manager.clear_user(1);
        assert_eq!(manager.active_keys(), 1);
        assert!(manager
            .check_and_record_at("shorten", 1, &windows, base + secs(1))
            .is_admitted());
    }

    #[test]
    fn test_concurrent_admission_is_exclusive() {
        // Many tasks race for a single slot; exactly one may win
        use std::sync::Arc;
        use std::thread;

        let manager = Arc::new(CooldownManager::new());
        let windows = Arc::new(vec![RateWindow::per_seconds(1, 60).unwrap()]);
        let base = Instant::now();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let manager = manager.clone();
                let windows = windows.clone();
                thread::spawn(move || {
                    manager
                        .check_and_record_at("shorten", 1, &windows, base)
                        .is_admitted()
                })
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|&admitted| admitted)
            .count();
        assert_eq!(admitted, 1);
    }
}
