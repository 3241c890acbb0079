//! Monthly generation quota: the pure gate and the usage store seam.
//!
//! The gate answers "may this user generate now?" without side effects.
//! Mutation goes through [`UsageStore`], whose claim/release contract keeps
//! the permit check and the increment in one transaction so two concurrent
//! generations can never both pass a check that only one unit allows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Plan ceiling for one billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaLimit {
    Limited(u32),
    Unlimited,
}

/// Read-only quota snapshot supplied by the billing collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageQuota {
    pub used_this_period: u32,
    pub limit: QuotaLimit,
    pub period_end: DateTime<Utc>,
}

impl UsageQuota {
    /// Units left in the period, `None` on unlimited plans.
    pub fn remaining(&self) -> Option<u32> {
        match self.limit {
            QuotaLimit::Unlimited => None,
            QuotaLimit::Limited(limit) => Some(limit.saturating_sub(self.used_this_period)),
        }
    }
}

/// Pure admission check over a usage counter and a plan limit.
pub struct QuotaGate;

impl QuotaGate {
    /// Whether a generation may start given current usage. No side effects.
    pub fn permits(used: u32, limit: QuotaLimit) -> bool {
        match limit {
            QuotaLimit::Unlimited => true,
            QuotaLimit::Limited(limit) => used < limit,
        }
    }
}

/// Mutable usage counter scoped to the authenticated caller.
///
/// `try_claim_unit` atomically checks the limit and reserves one unit under
/// a single writer. A claim is released when the generation is served from
/// cache or fails; keeping the claim is the usage increment for a
/// successful non-cached generation.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Snapshot of the caller's quota.
    async fn quota(&self) -> UsageQuota;

    /// Atomically claims one unit if the limit allows it.
    async fn try_claim_unit(&self) -> bool;

    /// Returns a previously claimed unit.
    async fn release_unit(&self);
}

/// Reference in-memory implementation of [`UsageStore`].
pub struct InMemoryUsageStore {
    used: Mutex<u32>,
    limit: QuotaLimit,
    period_end: DateTime<Utc>,
}

impl InMemoryUsageStore {
    /// Creates a store with zero usage for the given limit.
    pub fn new(limit: QuotaLimit, period_end: DateTime<Utc>) -> Self {
        Self {
            used: Mutex::new(0),
            limit,
            period_end,
        }
    }

    /// Creates a store with a preexisting usage count, for resuming a period.
    pub fn with_used(limit: QuotaLimit, period_end: DateTime<Utc>, used: u32) -> Self {
        Self {
            used: Mutex::new(used),
            limit,
            period_end,
        }
    }
}

#[async_trait]
impl UsageStore for InMemoryUsageStore {
    async fn quota(&self) -> UsageQuota {
        let used = *self.used.lock().await;
        UsageQuota {
            used_this_period: used,
            limit: self.limit,
            period_end: self.period_end,
        }
    }

    async fn try_claim_unit(&self) -> bool {
        let mut used = self.used.lock().await;
        if QuotaGate::permits(*used, self.limit) {
            *used += 1;
            true
        } else {
            false
        }
    }

    async fn release_unit(&self) {
        let mut used = self.used.lock().await;
        *used = used.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn period_end() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_permits_is_pure_over_inputs() {
        assert!(QuotaGate::permits(0, QuotaLimit::Limited(5)));
        assert!(QuotaGate::permits(4, QuotaLimit::Limited(5)));
        assert!(!QuotaGate::permits(5, QuotaLimit::Limited(5)));
        assert!(!QuotaGate::permits(6, QuotaLimit::Limited(5)));
        assert!(QuotaGate::permits(u32::MAX, QuotaLimit::Unlimited));
    }

    #[test]
    fn test_remaining() {
        let quota = UsageQuota {
            used_this_period: 3,
            limit: QuotaLimit::Limited(5),
            period_end: period_end(),
        };
        assert_eq!(quota.remaining(), Some(2));

        let unlimited = UsageQuota {
            used_this_period: 3,
            limit: QuotaLimit::Unlimited,
            period_end: period_end(),
        };
        assert_eq!(unlimited.remaining(), None);
    }

    #[tokio::test]
    async fn test_claim_and_release_round_trip() {
        let store = InMemoryUsageStore::new(QuotaLimit::Limited(2), period_end());

        assert!(store.try_claim_unit().await);
        assert!(store.try_claim_unit().await);
        assert!(!store.try_claim_unit().await);

        store.release_unit().await;
        assert!(store.try_claim_unit().await);
        assert_eq!(store.quota().await.used_this_period, 2);
    }

    #[tokio::test]
    async fn test_release_never_underflows() {
        let store = InMemoryUsageStore::new(QuotaLimit::Limited(1), period_end());
        store.release_unit().await;
        assert_eq!(store.quota().await.used_this_period, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_never_overshoot() {
        let store = Arc::new(InMemoryUsageStore::new(QuotaLimit::Limited(3), period_end()));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.try_claim_unit().await }));
        }

        let mut granted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                granted += 1;
            }
        }

        assert_eq!(granted, 3);
        assert_eq!(store.quota().await.used_this_period, 3);
    }
}
