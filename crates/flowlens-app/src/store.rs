//! # Flow Store
//!
//! In-memory store for captured flows, keyed by flow identity.
//! Upserts preserve user-only metadata (`pinned`, `note`) across
//! refreshes of the same flow, and pruning evicts the oldest unpinned
//! flows first. Single-threaded by design: every mutation happens on
//! the event loop.

use flowlens_core::flow::{Flow, FlowId};
use tracing::debug;

/// In-memory flow store, insertion-ordered.
#[derive(Debug, Default)]
pub struct FlowStore {
    flows: Vec<Flow>,
}

impl FlowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a flow, keyed by identity.
    ///
    /// Updating an existing flow replaces the captured record but keeps
    /// the user's `pinned` flag and `note` — user state must survive a
    /// full refresh from the capture source.
    pub fn upsert(&mut self, flow: Flow) {
        let id = flow.identity();
        if id.is_empty() {
            debug!("dropping flow with empty identity");
            return;
        }
        if let Some(existing) = self.flows.iter_mut().find(|f| f.identity() == id) {
            let pinned = existing.pinned;
            let note = existing.note.take();
            *existing = flow;
            existing.pinned = pinned;
            existing.note = note;
        } else {
            self.flows.push(flow);
        }
    }

    /// Retrieve a flow by identity.
    pub fn get(&self, id: &str) -> Option<&Flow> {
        self.flows.iter().find(|f| f.identity() == id)
    }

    /// Mutable access by identity (pin toggles, note edits).
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Flow> {
        self.flows.iter_mut().find(|f| f.identity() == id)
    }

    /// All flows in insertion order.
    pub fn list(&self) -> &[Flow] {
        &self.flows
    }

    /// Mutable view for bulk operations (pin toggles during render loop).
    pub fn list_mut(&mut self) -> &mut [Flow] {
        &mut self.flows
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Remove flows by id, returning the ids actually removed.
    pub fn delete(&mut self, ids: &[FlowId]) -> Vec<FlowId> {
        let mut deleted = Vec::new();
        self.flows.retain(|f| {
            let id = f.identity();
            if ids.contains(&id) {
                deleted.push(id);
                false
            } else {
                true
            }
        });
        deleted
    }

    /// Remove every unpinned flow, returning their ids.
    pub fn delete_all_unpinned(&mut self) -> Vec<FlowId> {
        let mut deleted = Vec::new();
        self.flows.retain(|f| {
            if f.pinned {
                true
            } else {
                deleted.push(f.identity());
                false
            }
        });
        deleted
    }

    /// Evict the oldest unpinned flows until at most `max_size` remain.
    ///
    /// Age is the flow's start timestamp; flows without one count as
    /// oldest. Pinned flows are never evicted, so the store can exceed
    /// `max_size` when everything is pinned.
    pub fn prune(&mut self, max_size: usize) -> Vec<FlowId> {
        if self.flows.len() <= max_size {
            return Vec::new();
        }
        let excess = self.flows.len() - max_size;

        let mut candidates: Vec<(i64, FlowId)> = self
            .flows
            .iter()
            .filter(|f| !f.pinned)
            .map(|f| {
                let age = f
                    .record
                    .start_timestamp()
                    .map(|t| t.as_nanos())
                    .unwrap_or(0);
                (age, f.identity())
            })
            .collect();
        candidates.sort_by_key(|(age, _)| *age);

        let victims: Vec<FlowId> = candidates
            .into_iter()
            .take(excess)
            .map(|(_, id)| id)
            .collect();
        let deleted = self.delete(&victims);
        if !deleted.is_empty() {
            debug!(count = deleted.len(), "pruned unpinned flows");
        }
        deleted
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use flowlens_core::flow::{
        FlowRecord, HttpFlow, HttpMessage, HttpRequest, Timestamp,
    };

    fn make_flow(id: &str, start_seconds: i64) -> Flow {
        Flow::new(FlowRecord::Http(HttpFlow {
            id: id.to_string(),
            request: Some(HttpRequest {
                method: "GET".to_string(),
                url: format!("https://example.com/{id}"),
                display_url: None,
                message: HttpMessage {
                    timestamp_start: Some(Timestamp {
                        seconds: start_seconds,
                        nanos: 0,
                    }),
                    ..Default::default()
                },
            }),
            response: None,
            error: None,
        }))
    }

    #[test]
    fn test_upsert_appends_new() {
        let mut store = FlowStore::new();
        store.upsert(make_flow("a", 1));
        store.upsert(make_flow("b", 2));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_upsert_replaces_by_identity() {
        let mut store = FlowStore::new();
        store.upsert(make_flow("a", 1));
        store.upsert(make_flow("a", 5));
        assert_eq!(store.len(), 1);
        let start = store.get("a").unwrap().record.start_timestamp().unwrap();
        assert_eq!(start.seconds, 5);
    }

    #[test]
    fn test_upsert_preserves_pin_and_note() {
        let mut store = FlowStore::new();
        store.upsert(make_flow("a", 1));
        {
            let flow = store.get_mut("a").unwrap();
            flow.pinned = true;
            flow.note = Some("suspicious".to_string());
        }
        // Refresh from the capture source: user state survives.
        store.upsert(make_flow("a", 2));
        let flow = store.get("a").unwrap();
        assert!(flow.pinned);
        assert_eq!(flow.note.as_deref(), Some("suspicious"));
    }

    #[test]
    fn test_delete_returns_only_removed_ids() {
        let mut store = FlowStore::new();
        store.upsert(make_flow("a", 1));
        store.upsert(make_flow("b", 2));
        let deleted = store.delete(&["a".to_string(), "missing".to_string()]);
        assert_eq!(deleted, vec!["a".to_string()]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_all_unpinned_keeps_pinned() {
        let mut store = FlowStore::new();
        store.upsert(make_flow("a", 1));
        store.upsert(make_flow("b", 2));
        store.upsert(make_flow("c", 3));
        store.get_mut("b").unwrap().pinned = true;
        let deleted = store.delete_all_unpinned();
        assert_eq!(deleted.len(), 2);
        assert_eq!(store.len(), 1);
        assert!(store.get("b").is_some());
    }

    #[test]
    fn test_prune_evicts_oldest_unpinned_first() {
        let mut store = FlowStore::new();
        for (id, ts) in [("old", 1), ("mid", 2), ("new", 3)] {
            store.upsert(make_flow(id, ts));
        }
        let deleted = store.prune(2);
        assert_eq!(deleted, vec!["old".to_string()]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_prune_skips_pinned() {
        let mut store = FlowStore::new();
        for (id, ts) in [("old", 1), ("mid", 2), ("new", 3)] {
            store.upsert(make_flow(id, ts));
        }
        store.get_mut("old").unwrap().pinned = true;
        let deleted = store.prune(2);
        // The oldest is pinned; the next oldest goes instead.
        assert_eq!(deleted, vec!["mid".to_string()]);
        assert!(store.get("old").is_some());
    }

    #[test]
    fn test_prune_within_limit_is_noop() {
        let mut store = FlowStore::new();
        store.upsert(make_flow("a", 1));
        assert!(store.prune(10).is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_prune_all_pinned_exceeds_limit() {
        let mut store = FlowStore::new();
        for (id, ts) in [("a", 1), ("b", 2), ("c", 3)] {
            store.upsert(make_flow(id, ts));
            store.get_mut(id).unwrap().pinned = true;
        }
        assert!(store.prune(1).is_empty());
        assert_eq!(store.len(), 3);
    }
}
