//! History of the entities most recently fetched by id.
//!
//! A doubly linked list keyed by id: repeated access detaches the existing
//! node and appends a fresh snapshot at the tail, so each id appears at most
//! once and detach/append are O(1). Unbounded. Snapshots are value copies
//! taken at fetch time and never mutate afterwards.

use std::collections::HashMap;

use crate::model::{TaskId, TaskRecord};

#[derive(Debug)]
struct Node {
    snapshot: TaskRecord,
    prev: Option<TaskId>,
    next: Option<TaskId>,
}

#[derive(Debug, Default)]
pub struct HistoryTracker {
    nodes: HashMap<TaskId, Node>,
    head: Option<TaskId>,
    tail: Option<TaskId>,
}

impl HistoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fetch. A repeat id moves to the tail carrying the new
    /// snapshot instead of growing the list.
    pub fn record(&mut self, snapshot: TaskRecord) {
        let id = snapshot.id();
        self.detach(id);
        let node = Node {
            snapshot,
            prev: self.tail,
            next: None,
        };
        match self.tail {
            Some(tail) => {
                if let Some(tail_node) = self.nodes.get_mut(&tail) {
                    tail_node.next = Some(id);
                }
            }
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.nodes.insert(id, node);
    }

    /// Drop the entry for an id; no-op when absent. Called for every store
    /// deletion, including cascades.
    pub fn remove(&mut self, id: TaskId) {
        self.detach(id);
    }

    fn detach(&mut self, id: TaskId) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        match node.prev {
            Some(prev) => {
                if let Some(prev_node) = self.nodes.get_mut(&prev) {
                    prev_node.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => {
                if let Some(next_node) = self.nodes.get_mut(&next) {
                    next_node.prev = node.prev;
                }
            }
            None => self.tail = node.prev,
        }
    }

    /// Snapshots oldest-accessed first, most recent last.
    pub fn list(&self) -> Vec<TaskRecord> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let Some(node) = self.nodes.get(&id) else {
                break;
            };
            out.push(node.snapshot.clone());
            cursor = node.next;
        }
        out
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
