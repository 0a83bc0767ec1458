//! LRU (Least Recently Used) engine core
//!
//! Doubly-linked recency list stored in an arena of slots, plus a hash index
//! from key to slot. Add, get, remove and eviction are O(1). This type is
//! not synchronized; [`Cache`](crate::Cache) wraps it in a mutex.

use std::collections::HashMap;
use std::iter::FusedIterator;

use ahash::RandomState;

use crate::error::{Error, Result};
use crate::keyed::Keyed;

/// Upper bound on slots reserved up front, so a huge capacity does not
/// allocate before it is used.
const MAX_PREALLOC: usize = 1 << 16;

/// Node in the recency list
struct Node<T> {
    key: String,
    item: T,
    prev: Option<usize>,
    next: Option<usize>,
}

/// What [`LruCache::add`] did with the item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission<T> {
    /// New key, stored without displacing anything
    Inserted,
    /// Existing key overwritten in place; carries the previous item
    Replaced(T),
    /// New key, stored after evicting the least recently used item
    Evicted(T),
}

/// LRU cache with fixed capacity
///
/// Head is the most recently used entry, tail the least recently used.
pub struct LruCache<T> {
    map: HashMap<String, usize, RandomState>,
    nodes: Vec<Option<Node<T>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
    capacity: usize,
}

impl<T: Keyed> LruCache<T> {
    /// Create a new LRU cache with the given capacity
    ///
    /// # Returns
    /// * `Err(Error::InvalidCapacity)` - if `capacity` is 0
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }

        let reserve = capacity.min(MAX_PREALLOC);
        Ok(Self {
            map: HashMap::with_capacity_and_hasher(reserve, RandomState::new()),
            nodes: Vec::with_capacity(reserve),
            head: None,
            tail: None,
            free_list: Vec::new(),
            capacity,
        })
    }

    /// Insert or overwrite an item, making it the most recently used
    ///
    /// Overwriting an existing key never evicts. A new key evicts the tail
    /// first when the cache is full.
    pub fn add(&mut self, item: T) -> Admission<T> {
        if let Some(&idx) = self.map.get(item.key()) {
            if let Some(node) = &mut self.nodes[idx] {
                let previous = std::mem::replace(&mut node.item, item);
                self.move_to_front(idx);
                return Admission::Replaced(previous);
            }
        }

        let evicted = if self.map.len() >= self.capacity {
            self.evict()
        } else {
            None
        };

        let key = item.key().to_owned();
        let idx = self.alloc_node();
        self.nodes[idx] = Some(Node {
            key: key.clone(),
            item,
            prev: None,
            next: None,
        });
        self.push_front(idx);
        self.map.insert(key, idx);

        match evicted {
            Some(old) => Admission::Evicted(old),
            None => Admission::Inserted,
        }
    }

    /// Get an item and mark it most recently used
    pub fn get(&mut self, key: &str) -> Option<&T> {
        let idx = *self.map.get(key)?;
        self.move_to_front(idx);
        self.item_at(idx)
    }

    /// Get an item without touching its recency
    pub fn peek(&self, key: &str) -> Option<&T> {
        let idx = *self.map.get(key)?;
        self.item_at(idx)
    }

    /// Remove a key from the cache, returning its item
    pub fn remove(&mut self, key: &str) -> Option<T> {
        let idx = *self.map.get(key)?;
        self.detach(idx)
    }

    /// Most recently used item
    pub fn peek_head(&self) -> Option<&T> {
        self.head.and_then(|idx| self.item_at(idx))
    }

    /// Least recently used item (the next eviction victim)
    pub fn peek_tail(&self) -> Option<&T> {
        self.tail.and_then(|idx| self.item_at(idx))
    }

    /// Check whether a key is present without touching its recency
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Get the current size of the cache
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
    }

    /// Iterate from most to least recently used
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            cursor: self.head,
            remaining: self.map.len(),
        }
    }

    /// Verify that the index and the recency list describe the same entries
    ///
    /// Walks the list from head to tail, checking every back link, that each
    /// node is indexed under its own key, and that the walk covers the whole
    /// index and ends at tail.
    pub fn check_invariants(&self) -> Result<()> {
        if self.map.len() > self.capacity {
            return Err(invariant(format!(
                "size {} exceeds capacity {}",
                self.map.len(),
                self.capacity
            )));
        }

        let mut walked = 0usize;
        let mut prev = None;
        let mut cursor = self.head;

        while let Some(idx) = cursor {
            let node = self
                .nodes
                .get(idx)
                .and_then(Option::as_ref)
                .ok_or_else(|| invariant(format!("link to empty slot {}", idx)))?;

            if node.prev != prev {
                return Err(invariant(format!(
                    "slot {} has prev {:?}, expected {:?}",
                    idx, node.prev, prev
                )));
            }
            if self.map.get(node.key.as_str()) != Some(&idx) {
                return Err(invariant(format!(
                    "key {:?} at slot {} is not indexed there",
                    node.key, idx
                )));
            }

            walked += 1;
            if walked > self.map.len() {
                return Err(invariant(format!(
                    "list is longer than the index ({} entries)",
                    self.map.len()
                )));
            }

            prev = Some(idx);
            cursor = node.next;
        }

        if self.tail != prev {
            return Err(invariant(format!(
                "tail is {:?} but the list ends at {:?}",
                self.tail, prev
            )));
        }
        if walked != self.map.len() {
            return Err(invariant(format!(
                "list holds {} entries, index holds {}",
                walked,
                self.map.len()
            )));
        }

        Ok(())
    }

    fn item_at(&self, idx: usize) -> Option<&T> {
        self.nodes[idx].as_ref().map(|node| &node.item)
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return; // Already at front
        }

        self.unlink(idx);
        self.push_front(idx);
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = &mut self.nodes[idx] {
            node.prev = None;
            node.next = old_head;
        }

        match old_head {
            Some(head_idx) => {
                if let Some(head) = &mut self.nodes[head_idx] {
                    head.prev = Some(idx);
                }
            }
            None => {
                self.tail = Some(idx);
            }
        }

        self.head = Some(idx);
    }

    // Sole entry: head and tail both clear. Head or tail of a longer list:
    // the neighbour takes its place. Interior: neighbours are spliced.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match &mut self.nodes[idx] {
            Some(node) => (node.prev.take(), node.next.take()),
            None => return,
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = &mut self.nodes[prev_idx] {
                    prev_node.next = next;
                }
            }
            None => {
                self.head = next;
            }
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = &mut self.nodes[next_idx] {
                    next_node.prev = prev;
                }
            }
            None => {
                self.tail = prev;
            }
        }
    }

    /// Unlink a slot, drop it from the index and release it
    fn detach(&mut self, idx: usize) -> Option<T> {
        self.unlink(idx);
        let node = self.nodes[idx].take()?;
        self.map.remove(&node.key);
        self.free_list.push(idx);
        Some(node.item)
    }

    fn evict(&mut self) -> Option<T> {
        let tail_idx = self.tail?;
        self.detach(tail_idx)
    }

    fn alloc_node(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(None);
            idx
        }
    }
}

fn invariant(msg: String) -> Error {
    Error::Invariant(msg)
}

/// Borrowing iterator over a cache, most recently used first
pub struct Iter<'a, T> {
    nodes: &'a [Option<Node<T>>],
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let nodes = self.nodes;
        let node = nodes[self.cursor?].as_ref()?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<'a, T: Keyed> IntoIterator for &'a LruCache<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
