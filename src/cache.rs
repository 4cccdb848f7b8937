use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::models::{Granularity, TransactionRecord};
use crate::services::bucketizer::{Aggregation, Bucketizer};

struct Slot<T> {
    inner: RwLock<Option<(u64, T)>>,
}

impl<T: Clone> Slot<T> {
    fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    fn get(&self, gen: u64) -> Option<T> {
        let guard = self.inner.read().ok()?;
        match guard.as_ref() {
            Some((stored_gen, val)) if *stored_gen == gen => Some(val.clone()),
            _ => None,
        }
    }

    fn set(&self, gen: u64, val: T) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some((gen, val));
        }
    }
}

/// Memoizes aggregations per granularity until the dataset changes.
///
/// The cache does not look at the records it is given; callers must call
/// [`AggregationCache::invalidate`] whenever their dataset changes.
pub struct AggregationCache {
    generation: AtomicU64,
    daily: Slot<Aggregation>,
    weekly: Slot<Aggregation>,
    monthly: Slot<Aggregation>,
}

impl Default for AggregationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregationCache {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            daily: Slot::new(),
            weekly: Slot::new(),
            monthly: Slot::new(),
        }
    }

    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn slot(&self, granularity: Granularity) -> &Slot<Aggregation> {
        match granularity {
            Granularity::Daily => &self.daily,
            Granularity::Weekly => &self.weekly,
            Granularity::Monthly => &self.monthly,
        }
    }

    pub fn get(&self, granularity: Granularity) -> Option<Aggregation> {
        self.slot(granularity).get(self.generation())
    }

    pub fn get_or_compute(
        &self,
        records: &[TransactionRecord],
        granularity: Granularity,
        bucketizer: &Bucketizer,
    ) -> Aggregation {
        let gen = self.generation();
        let slot = self.slot(granularity);
        if let Some(cached) = slot.get(gen) {
            tracing::trace!(granularity = %granularity, gen, "Aggregation cache hit");
            return cached;
        }

        let aggregation = bucketizer.aggregate(records, granularity);
        slot.set(gen, aggregation.clone());
        aggregation
    }
}
