use chrono::{DateTime, Local, NaiveTime};

use anchor_core::db::{Database, UsageDecision};

pub const FREE_DAILY_LIMIT: i64 = 10;
pub const PRO_DAILY_LIMIT: i64 = 100;

/// Subscription tier. Chosen by a caller-supplied flag and not verified
/// against a subscription record; `from_flag` is the single place to swap in
/// a real lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Free,
    Pro,
}

impl Tier {
    pub fn from_flag(is_pro: bool) -> Self {
        if is_pro {
            Self::Pro
        } else {
            Self::Free
        }
    }

    pub fn daily_limit(&self) -> i64 {
        match self {
            Self::Free => FREE_DAILY_LIMIT,
            Self::Pro => PRO_DAILY_LIMIT,
        }
    }
}

/// Tagged outcome so callers can tell a real pass from a degraded one.
#[derive(Debug, Clone, PartialEq)]
pub enum RateLimitDecision {
    Allowed {
        current_usage: i64,
        daily_limit: i64,
        remaining: i64,
    },
    Exceeded {
        current_usage: i64,
        daily_limit: i64,
        reset_time: DateTime<Local>,
    },
    /// The counter store failed; the request proceeds uncounted.
    FailedOpen,
}

/// Fixed-window daily quota for the AI endpoints. The counter is
/// incremented before the action runs; on any store error the limiter fails
/// open rather than blocking the user.
#[derive(Clone)]
pub struct UsageLimiter {
    db: Database,
}

impl UsageLimiter {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn check_and_count(&self, user_id: &str, tier: Tier) -> RateLimitDecision {
        let today = Local::now().date_naive();
        let limit = tier.daily_limit();

        match self.db.check_and_increment_ai_usage(user_id, today, limit) {
            Ok(UsageDecision::Allowed { count }) => RateLimitDecision::Allowed {
                current_usage: count,
                daily_limit: limit,
                remaining: limit - count,
            },
            Ok(UsageDecision::Exceeded { count }) => RateLimitDecision::Exceeded {
                current_usage: count,
                daily_limit: limit,
                reset_time: next_local_midnight(),
            },
            Err(err) => {
                tracing::warn!(error = %err, user_id, "usage counter unavailable, failing open");
                RateLimitDecision::FailedOpen
            }
        }
    }
}

/// The window resets entirely at the next local midnight.
fn next_local_midnight() -> DateTime<Local> {
    let tomorrow = Local::now()
        .date_naive()
        .succ_opt()
        .expect("date overflow")
        .and_time(NaiveTime::MIN);
    tomorrow
        .and_local_timezone(Local)
        .single()
        .unwrap_or_else(Local::now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> UsageLimiter {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        UsageLimiter::new(db)
    }

    #[test]
    fn free_tier_rejects_the_eleventh_call() {
        let limiter = limiter();
        for i in 1..=FREE_DAILY_LIMIT {
            match limiter.check_and_count("user-1", Tier::Free) {
                RateLimitDecision::Allowed {
                    current_usage,
                    remaining,
                    ..
                } => {
                    assert_eq!(current_usage, i);
                    assert_eq!(remaining, FREE_DAILY_LIMIT - i);
                }
                other => panic!("call {i} unexpectedly limited: {other:?}"),
            }
        }

        match limiter.check_and_count("user-1", Tier::Free) {
            RateLimitDecision::Exceeded {
                current_usage,
                daily_limit,
                reset_time,
            } => {
                assert_eq!(current_usage, FREE_DAILY_LIMIT);
                assert_eq!(daily_limit, FREE_DAILY_LIMIT);
                assert!(reset_time > Local::now());
            }
            other => panic!("expected Exceeded, got {other:?}"),
        }
    }

    #[test]
    fn pro_tier_has_the_higher_ceiling() {
        let limiter = limiter();
        for _ in 0..FREE_DAILY_LIMIT {
            limiter.check_and_count("user-1", Tier::Pro);
        }
        assert!(matches!(
            limiter.check_and_count("user-1", Tier::Pro),
            RateLimitDecision::Allowed { .. }
        ));
    }

    #[test]
    fn users_are_counted_independently() {
        let limiter = limiter();
        for _ in 0..FREE_DAILY_LIMIT {
            limiter.check_and_count("user-1", Tier::Free);
        }
        assert!(matches!(
            limiter.check_and_count("user-2", Tier::Free),
            RateLimitDecision::Allowed { .. }
        ));
    }
}
