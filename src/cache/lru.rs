//! LRU List Module
//!
//! Key index plus an intrusive doubly-linked recency list. Nodes live in a
//! slab (`Vec`) and link to each other by slot index, so insert, promote,
//! remove and evict are all O(1).

use std::collections::HashMap;

#[derive(Debug)]
struct Node<V> {
    key: String,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU List ==
/// Recency-ordered map from string keys to values.
///
/// Ordering runs from `head` (least recently used) to `tail` (most recently
/// used). Every key in the index owns exactly one linked slot and vice versa.
#[derive(Debug)]
pub struct LruList<V> {
    index: HashMap<String, usize>,
    slots: Vec<Option<Node<V>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<V> Default for LruList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> LruList<V> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
        }
    }

    // == Push ==
    /// Inserts or replaces `key` and marks it most recently used.
    ///
    /// Returns the previous value when the key was already present.
    pub fn push(&mut self, key: String, value: V) -> Option<V> {
        if let Some(&idx) = self.index.get(&key) {
            let previous = self
                .node_mut(idx)
                .map(|node| std::mem::replace(&mut node.value, value));
            self.move_to_tail(idx);
            return previous;
        }

        let node = Node {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.index.insert(key, idx);
        self.link_tail(idx);
        None
    }

    // == Touch ==
    /// Marks a key as most recently used. Returns false if the key is absent.
    pub fn touch(&mut self, key: &str) -> bool {
        match self.index.get(key) {
            Some(&idx) => {
                self.move_to_tail(idx);
                true
            }
            None => false,
        }
    }

    // == Peek ==
    /// Returns the value for `key` without changing its recency.
    pub fn peek(&self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.node(idx).map(|node| &node.value)
    }

    // == Remove ==
    /// Removes a key, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let idx = self.index.remove(key)?;
        self.release(idx).map(|node| node.value)
    }

    // == Pop Oldest ==
    /// Removes and returns the least recently used entry.
    pub fn pop_oldest(&mut self) -> Option<(String, V)> {
        let idx = self.head?;
        let node = self.release(idx)?;
        self.index.remove(&node.key);
        Some((node.key, node.value))
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&str> {
        let idx = self.head?;
        self.node(idx).map(|node| node.key.as_str())
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
    }

    // == Length ==
    /// Returns the number of keys held.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Iterates entries from least to most recently used.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    // == Linking ==
    fn node(&self, idx: usize) -> Option<&Node<V>> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<V>> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    fn move_to_tail(&mut self, idx: usize) {
        if self.tail != Some(idx) {
            self.unlink(idx);
            self.link_tail(idx);
        }
    }

    /// Unlinks a slot and hands its node back, recycling the slot.
    fn release(&mut self, idx: usize) -> Option<Node<V>> {
        self.unlink(idx);
        let node = self.slots.get_mut(idx)?.take()?;
        self.free.push(idx);
        Some(node)
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match self.node(idx) {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev.and_then(|p| self.node_mut(p)) {
            Some(node) => node.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.node_mut(n)) {
            Some(node) => node.prev = prev,
            None => self.tail = prev,
        }

        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = None;
        }
    }

    fn link_tail(&mut self, idx: usize) {
        let old_tail = self.tail;
        if let Some(node) = self.node_mut(idx) {
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail.and_then(|t| self.node_mut(t)) {
            Some(node) => node.next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }
}

/// Iterator over an [`LruList`] from least to most recently used.
pub struct Iter<'a, V> {
    list: &'a LruList<V>,
    cursor: Option<usize>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.cursor?)?;
        self.cursor = node.next;
        Some((node.key.as_str(), &node.value))
    }
}
