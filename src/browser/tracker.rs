//! Pairs response headers with their loading-finished signal.
//!
//! DevTools reports a response in two steps: headers first, then a
//! loading-finished event once the body is readable. The two arrive on
//! separate event streams, so a finish can be observed before its headers.

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;

/// Finishes kept while waiting for their headers.
const EARLY_FINISH_CAP: usize = 512;

/// A wanted response whose body is not readable yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingResponse {
    pub url: String,
    pub mime_type: String,
}

/// Request bookkeeping for one page.
#[derive(Debug)]
pub struct ExchangeTracker<K> {
    pending: HashMap<K, PendingResponse>,
    early: HashSet<K>,
    early_order: VecDeque<K>,
}

impl<K> Default for ExchangeTracker<K> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
            early: HashSet::new(),
            early_order: VecDeque::new(),
        }
    }
}

impl<K: Hash + Eq + Clone> ExchangeTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Headers arrived. `wanted` is `None` for traffic the observer ignores.
    /// Returns the response when its body is already readable.
    pub fn on_response(&mut self, id: K, wanted: Option<PendingResponse>) -> Option<PendingResponse> {
        if self.early.remove(&id) {
            return wanted;
        }
        if let Some(response) = wanted {
            self.pending.insert(id, response);
        }
        None
    }

    /// Loading finished. Returns the response if its headers were wanted.
    pub fn on_finished(&mut self, id: K) -> Option<PendingResponse> {
        if let Some(response) = self.pending.remove(&id) {
            return Some(response);
        }
        if self.early.insert(id.clone()) {
            self.early_order.push_back(id);
            while self.early_order.len() > EARLY_FINISH_CAP {
                if let Some(oldest) = self.early_order.pop_front() {
                    self.early.remove(&oldest);
                }
            }
        }
        None
    }

    /// Loading failed; the body will never be readable.
    pub fn on_failed(&mut self, id: &K) {
        self.pending.remove(id);
        self.early.remove(id);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wanted(url: &str) -> Option<PendingResponse> {
        Some(PendingResponse {
            url: url.to_string(),
            mime_type: "application/json".to_string(),
        })
    }

    #[test]
    fn test_headers_then_finish() {
        let mut tracker = ExchangeTracker::new();
        assert_eq!(tracker.on_response(1, wanted("a")), None);
        assert_eq!(tracker.pending_len(), 1);
        assert_eq!(tracker.on_finished(1).map(|r| r.url), Some("a".to_string()));
        assert_eq!(tracker.pending_len(), 0);
    }

    #[test]
    fn test_finish_before_headers_is_not_lost() {
        let mut tracker = ExchangeTracker::new();
        assert_eq!(tracker.on_finished(7), None);
        assert_eq!(tracker.on_response(7, wanted("b")).map(|r| r.url), Some("b".to_string()));
        assert_eq!(tracker.pending_len(), 0);
    }

    #[test]
    fn test_ignored_traffic_is_never_delivered() {
        let mut tracker = ExchangeTracker::new();
        assert_eq!(tracker.on_response(1, None), None);
        assert_eq!(tracker.on_finished(1), None);

        assert_eq!(tracker.on_finished(2), None);
        assert_eq!(tracker.on_response(2, None), None);
        assert_eq!(tracker.pending_len(), 0);
    }

    #[test]
    fn test_failed_loads_are_dropped() {
        let mut tracker = ExchangeTracker::new();
        tracker.on_response(3, wanted("c"));
        tracker.on_failed(&3);
        assert_eq!(tracker.pending_len(), 0);
        assert_eq!(tracker.on_finished(3), None);
    }

    #[test]
    fn test_every_interleaving_delivers_every_exchange() {
        let ids: Vec<u32> = (0..20).collect();
        // Finish events in a scrambled order, each stream kept in its own order.
        let finishes: Vec<u32> = ids.iter().map(|i| (i * 7) % 20).collect();

        for split in 0..=ids.len() {
            let mut tracker = ExchangeTracker::new();
            let mut delivered = Vec::new();

            for &id in &finishes[..split] {
                delivered.extend(tracker.on_finished(id));
            }
            for &id in &ids {
                delivered.extend(tracker.on_response(id, wanted(&format!("u{id}"))));
            }
            for &id in &finishes[split..] {
                delivered.extend(tracker.on_finished(id));
            }

            assert_eq!(delivered.len(), ids.len(), "split at {split}");
            assert_eq!(tracker.pending_len(), 0);
        }
    }

    #[test]
    fn test_early_finishes_are_bounded() {
        let mut tracker = ExchangeTracker::new();
        for id in 0..(EARLY_FINISH_CAP as u32 + 10) {
            tracker.on_finished(id);
        }
        assert_eq!(tracker.early.len(), EARLY_FINISH_CAP);
        assert_eq!(tracker.early_order.len(), EARLY_FINISH_CAP);
        // The oldest were evicted; a late header for one of them is simply held.
        assert_eq!(tracker.on_response(0, wanted("old")), None);
        assert_eq!(tracker.pending_len(), 1);
    }
}
