//! In-process message counters

use crate::collaborators::Counter;
use dashmap::DashMap;
use mpi_types::Message;
use std::sync::atomic::{AtomicU64, Ordering};

/// Key for one counter cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CounterKey {
    pub message_type: String,
    pub merchant_id: Option<String>,
}

/// [`Counter`] tallying results per (message type, merchant)
///
/// One cell is kept per distinct pair ever seen, so memory grows with the
/// number of merchants. Long-running processes should call [`Self::drain`]
/// after each export.
#[derive(Debug, Default)]
pub struct MessageCounter {
    cells: DashMap<CounterKey, AtomicU64>,
    total: AtomicU64,
}

impl MessageCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, message_type: &str, merchant_id: Option<&str>) -> u64 {
        let key = CounterKey {
            message_type: message_type.to_string(),
            merchant_id: merchant_id.map(str::to_string),
        };
        self.cells
            .get(&key)
            .map(|cell| cell.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Sorted copy of every cell
    pub fn snapshot(&self) -> Vec<(CounterKey, u64)> {
        let mut cells: Vec<_> = self
            .cells
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect();
        cells.sort();
        cells
    }

    /// Remove every cell, returning the sorted counts it held
    ///
    /// Counts recorded while draining land in fresh cells and are kept for
    /// the next drain.
    pub fn drain(&self) -> Vec<(CounterKey, u64)> {
        let keys: Vec<CounterKey> = self.cells.iter().map(|entry| entry.key().clone()).collect();
        let mut drained: Vec<_> = keys
            .into_iter()
            .filter_map(|key| self.cells.remove(&key))
            .map(|(key, cell)| (key, cell.into_inner()))
            .collect();
        drained.sort();

        let removed: u64 = drained.iter().map(|(_, count)| count).sum();
        self.total.fetch_sub(removed, Ordering::Relaxed);
        drained
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Counter for MessageCounter {
    fn count(&self, message: &dyn Message, merchant_id: Option<&str>) {
        let key = CounterKey {
            message_type: message.message_type().to_string(),
            merchant_id: merchant_id.map(str::to_string),
        };
        self.cells
            .entry(key)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpi_types::{BindableMessage, PaymentAuthRes, VERes};

    #[test]
    fn test_counts_per_type_and_merchant() {
        let counter = MessageCounter::new();
        let veres = VERes::new_message("1.0.2");
        let auth = PaymentAuthRes::new_message("1.0");

        counter.count(&veres, Some("shop-1"));
        counter.count(&veres, Some("shop-1"));
        counter.count(&veres, None);
        counter.count(&auth, Some("shop-1"));

        assert_eq!(counter.get("VERes", Some("shop-1")), 2);
        assert_eq!(counter.get("VERes", None), 1);
        assert_eq!(counter.get("PaymentAuthRes", Some("shop-1")), 1);
        assert_eq!(counter.get("PaymentAuthRes", Some("shop-2")), 0);
        assert_eq!(counter.total(), 4);

        let snapshot = counter.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].0.message_type, "PaymentAuthRes");
    }

    #[test]
    fn test_drain_releases_cells() {
        let counter = MessageCounter::new();
        let veres = VERes::new_message("1.0.2");
        for merchant in ["shop-1", "shop-2", "shop-3"] {
            counter.count(&veres, Some(merchant));
        }
        counter.count(&veres, Some("shop-1"));
        assert_eq!(counter.len(), 3);

        let drained = counter.drain();
        assert_eq!(drained.len(), 3);
        assert_eq!(drained[0].0.merchant_id.as_deref(), Some("shop-1"));
        assert_eq!(drained[0].1, 2);
        assert!(counter.is_empty());
        assert_eq!(counter.total(), 0);
        assert_eq!(counter.get("VERes", Some("shop-1")), 0);

        counter.count(&veres, Some("shop-2"));
        assert_eq!(counter.get("VERes", Some("shop-2")), 1);
        assert_eq!(counter.total(), 1);
        assert_eq!(counter.len(), 1);
    }
}
