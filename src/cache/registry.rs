//! Ordered Registry Module
//!
//! Doubly linked list over a slot arena, addressed by stable handles.
//!
//! Front = most recently used, back = least recently used. Every structural
//! operation (push, remove, move to front) is O(1) and never traverses.

use std::fmt;
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of registry ids, unique within the process.
static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(0);

// == Handle ==
/// Stable reference to one entry in an [`OrderedRegistry`].
///
/// A handle stays valid until its entry is removed or the registry is
/// cleared. Using it afterwards, or on a different registry, panics instead
/// of touching another entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    registry: u64,
    index: usize,
    generation: u64,
}

#[derive(Debug)]
struct Node<T> {
    value: T,
    generation: u64,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug)]
enum Slot<T> {
    Occupied(Node<T>),
    Vacant { next_free: Option<usize> },
}

// == Ordered Registry ==
/// Ordered sequence of entries with O(1) insertion at either end,
/// O(1) removal and O(1) move-to-front of any entry given its handle.
pub struct OrderedRegistry<T> {
    /// Id stamped into every handle this registry issues
    id: u64,
    /// Node storage, indexed by `Handle::index`
    slots: Vec<Slot<T>>,
    /// Head of the vacant slot chain
    free_head: Option<usize>,
    /// Front (most recently used) slot
    head: Option<usize>,
    /// Back (least recently used) slot
    tail: Option<usize>,
    /// Number of live entries
    len: usize,
    /// Generation handed to the next inserted entry
    next_generation: u64,
}

impl<T> OrderedRegistry<T> {
    // == Constructor ==
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            free_head: None,
            head: None,
            tail: None,
            len: 0,
            next_generation: 0,
        }
    }

    // == Length ==
    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Endpoints ==
    /// Returns the handle of the front (most recently used) entry.
    pub fn front(&self) -> Option<Handle> {
        self.head.map(|index| self.handle_at(index))
    }

    /// Returns the handle of the back (least recently used) entry.
    pub fn back(&self) -> Option<Handle> {
        self.tail.map(|index| self.handle_at(index))
    }

    // == Neighbours ==
    /// Returns the entry after `handle`, towards the back.
    pub fn next(&self, handle: Handle) -> Option<Handle> {
        self.node(handle).next.map(|index| self.handle_at(index))
    }

    /// Returns the entry before `handle`, towards the front.
    pub fn prev(&self, handle: Handle) -> Option<Handle> {
        self.node(handle).prev.map(|index| self.handle_at(index))
    }

    // == Access ==
    /// Returns true if `handle` refers to a live entry of this registry.
    pub fn contains(&self, handle: Handle) -> bool {
        handle.registry == self.id
            && matches!(
                self.slots.get(handle.index),
                Some(Slot::Occupied(node)) if node.generation == handle.generation
            )
    }

    /// Returns the value stored under `handle`.
    ///
    /// # Panics
    /// If `handle` does not refer to a live entry.
    pub fn get(&self, handle: Handle) -> &T {
        &self.node(handle).value
    }

    /// Returns the value stored under `handle` mutably.
    ///
    /// # Panics
    /// If `handle` does not refer to a live entry.
    pub fn get_mut(&mut self, handle: Handle) -> &mut T {
        &mut self.node_mut(handle).value
    }

    // == Push Front ==
    /// Inserts `value` as the new front entry.
    pub fn push_front(&mut self, value: T) -> Handle {
        let handle = self.allocate(value);
        self.link_front(handle.index);
        self.len += 1;
        handle
    }

    // == Push Back ==
    /// Inserts `value` as the new back entry.
    pub fn push_back(&mut self, value: T) -> Handle {
        let handle = self.allocate(value);
        self.link_back(handle.index);
        self.len += 1;
        handle
    }

    // == Remove ==
    /// Detaches the entry under `handle` and returns its value.
    ///
    /// Former neighbours are linked directly to each other; front and back
    /// move inward when an endpoint is removed.
    ///
    /// # Panics
    /// If `handle` does not refer to a live entry. A silent no-op here would
    /// let the cache's lookup table and this registry drift apart.
    pub fn remove(&mut self, handle: Handle) -> T {
        self.node(handle);
        self.unlink(handle.index);

        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };
        let node = match std::mem::replace(&mut self.slots[handle.index], vacant) {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("slot {} vacated twice", handle.index),
        };
        self.free_head = Some(handle.index);
        self.len -= 1;
        node.value
    }

    // == Pop Back ==
    /// Removes and returns the back (least recently used) entry.
    pub fn pop_back(&mut self) -> Option<T> {
        self.back().map(|handle| self.remove(handle))
    }

    // == Move To Front ==
    /// Relocates the entry under `handle` to the front.
    ///
    /// No-op if it already is the front. The relative order of all other
    /// entries is preserved.
    ///
    /// # Panics
    /// If `handle` does not refer to a live entry.
    pub fn move_to_front(&mut self, handle: Handle) {
        self.node(handle);
        if self.head == Some(handle.index) {
            return;
        }
        self.unlink(handle.index);
        self.link_front(handle.index);
    }

    // == Clear ==
    /// Drops every entry. Handles issued before the call become stale.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    // == Iteration ==
    /// Iterates values from front (most recent) to back (least recent).
    ///
    /// Use `.rev()` to walk back to front.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            registry: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    // == Internal: Slot Management ==
    fn allocate(&mut self, value: T) -> Handle {
        let generation = self.next_generation;
        self.next_generation += 1;

        let node = Slot::Occupied(Node {
            value,
            generation,
            prev: None,
            next: None,
        });

        let index = match self.free_head {
            Some(index) => {
                self.free_head = match self.slots[index] {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => unreachable!("free slot {} is occupied", index),
                };
                self.slots[index] = node;
                index
            }
            None => {
                self.slots.push(node);
                self.slots.len() - 1
            }
        };

        Handle {
            registry: self.id,
            index,
            generation,
        }
    }

    fn handle_at(&self, index: usize) -> Handle {
        Handle {
            registry: self.id,
            index,
            generation: self.linked(index).generation,
        }
    }

    /// Resolves a caller-supplied handle, panicking if it is stale.
    fn node(&self, handle: Handle) -> &Node<T> {
        if handle.registry != self.id {
            panic!("{:?} was issued by another registry", handle);
        }
        match self.slots.get(handle.index) {
            Some(Slot::Occupied(node)) if node.generation == handle.generation => node,
            _ => panic!("{:?} does not refer to a live registry entry", handle),
        }
    }

    fn node_mut(&mut self, handle: Handle) -> &mut Node<T> {
        if handle.registry != self.id {
            panic!("{:?} was issued by another registry", handle);
        }
        match self.slots.get_mut(handle.index) {
            Some(Slot::Occupied(node)) if node.generation == handle.generation => node,
            _ => panic!("{:?} does not refer to a live registry entry", handle),
        }
    }

    /// Resolves an index reached through the links themselves.
    fn linked(&self, index: usize) -> &Node<T> {
        match &self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("linked slot {} is vacant", index),
        }
    }

    fn linked_mut(&mut self, index: usize) -> &mut Node<T> {
        match &mut self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("linked slot {} is vacant", index),
        }
    }

    // == Internal: Linking ==
    fn link_front(&mut self, index: usize) {
        let old_head = self.head;
        {
            let node = self.linked_mut(index);
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => self.linked_mut(head).prev = Some(index),
            None => self.tail = Some(index),
        }
        self.head = Some(index);
    }

    fn link_back(&mut self, index: usize) {
        let old_tail = self.tail;
        {
            let node = self.linked_mut(index);
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail {
            Some(tail) => self.linked_mut(tail).next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
    }

    /// Splices `index` out of the chain; its neighbours end up pointing at
    /// each other.
    fn unlink(&mut self, index: usize) {
        let (prev, next) = {
            let node = self.linked_mut(index);
            let links = (node.prev, node.next);
            node.prev = None;
            node.next = None;
            links
        };

        match prev {
            Some(prev) => self.linked_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.linked_mut(next).prev = prev,
            None => self.tail = prev,
        }
    }

    // == Invariant Check ==
    /// Walks the chain in both directions and panics on any broken link.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let mut forward = Vec::new();
        let mut cursor = self.head;
        let mut prev = None;
        while let Some(index) = cursor {
            let node = self.linked(index);
            assert_eq!(node.prev, prev, "slot {} has a wrong prev link", index);
            forward.push(index);
            assert!(forward.len() <= self.len, "forward walk exceeds len");
            prev = cursor;
            cursor = node.next;
        }
        assert_eq!(prev, self.tail, "forward walk does not end at the back");
        assert_eq!(forward.len(), self.len, "forward walk length mismatch");

        let mut backward = Vec::new();
        let mut cursor = self.tail;
        while let Some(index) = cursor {
            backward.push(index);
            assert!(backward.len() <= self.len, "backward walk exceeds len");
            cursor = self.linked(index).prev;
        }
        backward.reverse();
        assert_eq!(forward, backward, "walks disagree");

        let occupied = self
            .slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Occupied(_)))
            .count();
        assert_eq!(occupied, self.len, "occupied slots do not match len");
    }
}

impl<T> Default for OrderedRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a OrderedRegistry<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// == Iterator ==
/// Front-to-back iterator over an [`OrderedRegistry`].
pub struct Iter<'a, T> {
    registry: &'a OrderedRegistry<T>,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.registry.linked(self.front?);
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.registry.linked(self.back?);
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.value)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn values<T: Copy>(registry: &OrderedRegistry<T>) -> Vec<T> {
        registry.iter().copied().collect()
    }

    #[test]
    fn test_registry_new() {
        let registry: OrderedRegistry<i32> = OrderedRegistry::new();
        assert_eq!(registry.len(), 0);
        assert!(registry.is_empty());
        assert!(registry.front().is_none());
        assert!(registry.back().is_none());
        registry.assert_invariants();
    }

    #[test]
    fn test_push_front_and_back() {
        let mut registry = OrderedRegistry::new();

        registry.push_front(10);
        registry.push_back(20);
        registry.push_back(30);
        registry.push_front(5);

        assert_eq!(registry.len(), 4);
        assert_eq!(values(&registry), vec![5, 10, 20, 30]);
        assert_eq!(*registry.get(registry.front().unwrap()), 5);
        assert_eq!(*registry.get(registry.back().unwrap()), 30);
        registry.assert_invariants();
    }

    #[test]
    fn test_single_entry_is_front_and_back() {
        let mut registry = OrderedRegistry::new();
        let handle = registry.push_back("only");

        assert_eq!(registry.front(), Some(handle));
        assert_eq!(registry.back(), Some(handle));
        assert!(registry.next(handle).is_none());
        assert!(registry.prev(handle).is_none());
    }

    #[test]
    fn test_remove_sole_entry() {
        let mut registry = OrderedRegistry::new();
        let handle = registry.push_front(1);

        assert_eq!(registry.remove(handle), 1);
        assert!(registry.is_empty());
        assert!(registry.front().is_none());
        assert!(registry.back().is_none());
        registry.assert_invariants();
    }

    #[test]
    fn test_remove_endpoints() {
        let mut registry = OrderedRegistry::new();
        let first = registry.push_back(1);
        registry.push_back(2);
        let last = registry.push_back(3);

        registry.remove(first);
        assert_eq!(values(&registry), vec![2, 3]);
        registry.assert_invariants();

        registry.remove(last);
        assert_eq!(values(&registry), vec![2]);
        assert_eq!(registry.front(), registry.back());
        registry.assert_invariants();
    }

    #[test]
    fn test_remove_middle_relinks_neighbours() {
        let mut registry = OrderedRegistry::new();
        let a = registry.push_back('a');
        let b = registry.push_back('b');
        let c = registry.push_back('c');

        registry.remove(b);

        assert_eq!(registry.next(a), Some(c));
        assert_eq!(registry.prev(c), Some(a));
        assert_eq!(registry.iter().rev().copied().collect::<Vec<_>>(), vec!['c', 'a']);
        registry.assert_invariants();
    }

    #[test]
    fn test_move_to_front_from_back_and_middle() {
        let mut registry = OrderedRegistry::new();
        registry.push_back(10);
        let mid = registry.push_back(20);
        let last = registry.push_back(30);
        registry.push_back(40);

        registry.move_to_front(mid);
        assert_eq!(values(&registry), vec![20, 10, 30, 40]);
        registry.assert_invariants();

        let back = registry.back().unwrap();
        registry.move_to_front(back);
        assert_eq!(values(&registry), vec![40, 20, 10, 30]);
        assert_eq!(registry.back(), Some(last));
        registry.assert_invariants();
    }

    #[test]
    fn test_move_front_to_front_is_noop() {
        let mut registry = OrderedRegistry::new();
        let front = registry.push_front(1);
        registry.push_back(2);

        registry.move_to_front(front);
        registry.move_to_front(front);

        assert_eq!(values(&registry), vec![1, 2]);
        assert_eq!(registry.front(), Some(front));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_mixed_sequence() {
        let mut registry = OrderedRegistry::new();

        registry.push_front(10); // [10]
        registry.push_back(20); // [10, 20]
        registry.push_back(30); // [10, 20, 30]
        assert_eq!(registry.len(), 3);

        let middle = registry.next(registry.front().unwrap()).unwrap();
        registry.remove(middle); // [10, 30]
        assert_eq!(registry.len(), 2);

        for (i, v) in [40, 50, 60, 70, 80].into_iter().enumerate() {
            if i % 2 == 0 {
                registry.push_front(v);
            } else {
                registry.push_back(v);
            }
        } // [80, 60, 40, 10, 30, 50, 70]

        assert_eq!(registry.len(), 7);
        assert_eq!(*registry.get(registry.front().unwrap()), 80);
        assert_eq!(*registry.get(registry.back().unwrap()), 70);

        registry.move_to_front(registry.front().unwrap());
        registry.move_to_front(registry.back().unwrap());

        assert_eq!(values(&registry), vec![70, 80, 60, 40, 10, 30, 50]);
        registry.assert_invariants();
    }

    #[test]
    fn test_slots_are_reused() {
        let mut registry = OrderedRegistry::new();
        let a = registry.push_back(1);
        registry.push_back(2);
        registry.remove(a);

        let c = registry.push_front(3);
        assert_eq!(c.index, a.index);
        assert_ne!(c, a);
        assert!(!registry.contains(a));
        assert!(registry.contains(c));
        assert_eq!(registry.slots.len(), 2);
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut registry = OrderedRegistry::new();
        let handle = registry.push_back(String::from("old"));

        registry.get_mut(handle).push_str("-new");

        assert_eq!(registry.get(handle), "old-new");
    }

    #[test]
    fn test_pop_back() {
        let mut registry = OrderedRegistry::new();
        registry.push_back(1);
        registry.push_back(2);

        assert_eq!(registry.pop_back(), Some(2));
        assert_eq!(registry.pop_back(), Some(1));
        assert_eq!(registry.pop_back(), None);
        registry.assert_invariants();
    }

    #[test]
    fn test_clear_invalidates_handles() {
        let mut registry = OrderedRegistry::new();
        let old = registry.push_back(1);
        registry.push_back(2);

        registry.clear();
        assert!(registry.is_empty());
        assert!(!registry.contains(old));

        let fresh = registry.push_back(3);
        assert_eq!(fresh.index, old.index);
        assert!(!registry.contains(old));
        assert_eq!(values(&registry), vec![3]);
        registry.assert_invariants();
    }

    #[test]
    fn test_iter_both_directions() {
        let mut registry = OrderedRegistry::new();
        for v in 1..=5 {
            registry.push_back(v);
        }

        let mut iter = registry.iter();
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&5));
        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.next_back(), Some(&4));
        assert_eq!(iter.next(), Some(&3));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    #[should_panic(expected = "does not refer to a live registry entry")]
    fn test_remove_stale_handle_panics() {
        let mut registry = OrderedRegistry::new();
        let handle = registry.push_back(1);
        registry.remove(handle);
        registry.remove(handle);
    }

    #[test]
    #[should_panic(expected = "does not refer to a live registry entry")]
    fn test_move_to_front_stale_handle_panics() {
        let mut registry = OrderedRegistry::new();
        let handle = registry.push_back(1);
        registry.clear();
        registry.move_to_front(handle);
    }

    #[test]
    #[should_panic(expected = "was issued by another registry")]
    fn test_remove_handle_from_other_registry_panics() {
        let mut first = OrderedRegistry::new();
        let mut second = OrderedRegistry::new();
        let from_first = first.push_back("first-entry");
        second.push_back("second-entry");

        second.remove(from_first);
    }

    #[test]
    #[should_panic(expected = "was issued by another registry")]
    fn test_move_to_front_handle_from_other_registry_panics() {
        let mut first = OrderedRegistry::new();
        let mut second = OrderedRegistry::new();
        let from_first = first.push_back(1);
        second.push_back(2);
        second.push_back(3);

        second.move_to_front(from_first);
    }

    #[test]
    fn test_contains_rejects_other_registry() {
        let mut first = OrderedRegistry::new();
        let mut second = OrderedRegistry::new();
        let from_first = first.push_back(1);
        let from_second = second.push_back(1);

        assert_ne!(from_first, from_second);
        assert!(first.contains(from_first));
        assert!(!second.contains(from_first));
    }

    #[test]
    #[should_panic(expected = "does not refer to a live registry entry")]
    fn test_get_reused_slot_with_old_handle_panics() {
        let mut registry = OrderedRegistry::new();
        let old = registry.push_back(1);
        registry.remove(old);
        registry.push_back(2);
        registry.get(old);
    }
}
