//! Recency List Module
//!
//! Fixed-length, index-linked list of slots ordered by access recency.

use crate::cache::CacheEntry;

// == Slot ==
/// A fixed storage position in the recency list.
///
/// `entry` is `None` only for slots never used since construction. A slot
/// holding an expired or cleared entry still has `Some` here; whether it is
/// live is decided by the key index, not by the slot.
#[derive(Debug)]
struct Slot<K, V> {
    entry: Option<CacheEntry<K, V>>,
    prev: Option<usize>,
    next: Option<usize>,
}

// == Recency List ==
/// Arena of pre-allocated slots linked into a doubly-linked list.
///
/// - Front (head) = most recently used
/// - Back (tail) = least recently used, or an empty slot
///
/// The number of slots is fixed at construction. Only slot contents and link
/// order change afterwards, so slot indices are stable handles.
#[derive(Debug)]
pub struct RecencyList<K, V> {
    slots: Vec<Slot<K, V>>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<K, V> RecencyList<K, V> {
    // == Constructor ==
    /// Creates a list of `len` empty slots, linked in index order.
    pub fn with_slots(len: usize) -> Self {
        let slots = (0..len)
            .map(|i| Slot {
                entry: None,
                prev: i.checked_sub(1),
                next: (i + 1 < len).then_some(i + 1),
            })
            .collect();

        Self {
            slots,
            head: (len > 0).then_some(0),
            tail: len.checked_sub(1),
        }
    }

    // == Length ==
    /// Returns the number of slots, which never changes.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    // == Back ==
    /// Returns the index of the least recently used slot.
    pub fn back(&self) -> Option<usize> {
        self.tail
    }

    // == Front ==
    /// Returns the index of the most recently used slot.
    pub fn front(&self) -> Option<usize> {
        self.head
    }

    // == Entry ==
    /// Returns the entry physically held by slot `idx`, if any.
    pub fn entry(&self, idx: usize) -> Option<&CacheEntry<K, V>> {
        self.slots[idx].entry.as_ref()
    }

    // == Replace ==
    /// Stores `entry` in slot `idx`, returning whatever the slot held before.
    pub fn replace(&mut self, idx: usize, entry: CacheEntry<K, V>) -> Option<CacheEntry<K, V>> {
        self.slots[idx].entry.replace(entry)
    }

    // == Move To Front ==
    /// Relinks slot `idx` at the front of the list.
    pub fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }

    // == Iterate ==
    /// Walks slots from front to back, yielding each slot's entry.
    pub fn iter(&self) -> impl Iterator<Item = Option<&CacheEntry<K, V>>> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let idx = cursor?;
            let slot = &self.slots[idx];
            cursor = slot.next;
            Some(slot.entry.as_ref())
        })
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);

        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }

        self.slots[idx].prev = None;
        self.slots[idx].next = None;
    }

    fn link_front(&mut self, idx: usize) {
        self.slots[idx].next = self.head;
        self.slots[idx].prev = None;

        if let Some(h) = self.head {
            self.slots[h].prev = Some(idx);
        }
        self.head = Some(idx);

        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }
}
