//! Session-lifetime cache for pickup hours and order constraints.

use moka::future::Cache;
use tracing::debug;

use crate::schedule::{OrderConstraints, WeeklyHours};

/// Cache key for schedule data.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ScheduleKey {
    Hours,
    Constraints,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum ScheduleValue {
    Hours(Box<WeeklyHours>),
    Constraints(Box<OrderConstraints>),
}

/// Holds successful fetches only. Entries live until invalidated.
#[derive(Clone)]
pub struct ScheduleCache {
    cache: Cache<ScheduleKey, ScheduleValue>,
}

impl ScheduleCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().max_capacity(16).build(),
        }
    }

    pub async fn hours(&self) -> Option<WeeklyHours> {
        match self.cache.get(&ScheduleKey::Hours).await {
            Some(ScheduleValue::Hours(hours)) => {
                debug!("Cache hit for pickup hours");
                Some(*hours)
            }
            _ => None,
        }
    }

    pub async fn constraints(&self) -> Option<OrderConstraints> {
        match self.cache.get(&ScheduleKey::Constraints).await {
            Some(ScheduleValue::Constraints(constraints)) => {
                debug!("Cache hit for order constraints");
                Some(*constraints)
            }
            _ => None,
        }
    }

    pub async fn insert_hours(&self, hours: WeeklyHours) {
        self.cache
            .insert(ScheduleKey::Hours, ScheduleValue::Hours(Box::new(hours)))
            .await;
    }

    pub async fn insert_constraints(&self, constraints: OrderConstraints) {
        self.cache
            .insert(
                ScheduleKey::Constraints,
                ScheduleValue::Constraints(Box::new(constraints)),
            )
            .await;
    }

    /// Drop everything so the next read refetches.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

impl Default for ScheduleCache {
    fn default() -> Self {
        Self::new()
    }
}
