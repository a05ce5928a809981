//! Arena-backed doubly linked list used for recency ordering.
//!
//! Nodes live in a slot vector and link to each other by [`NodeId`], so the
//! eviction store can keep a `key -> NodeId` index and move or unlink an entry
//! in O(1) without raw pointers.
//!
//! ```text
//!   slots: Vec<Option<Node<T>>>          free: [3]
//!   ┌────┬───────────────────────────────────────────┐
//!   │ 0  │ { value: A, prev: None,    next: Some(2) }│
//!   │ 1  │ { value: C, prev: Some(2), next: None    }│
//!   │ 2  │ { value: B, prev: Some(0), next: Some(1) }│
//!   │ 3  │ (vacant)                                  │
//!   └────┴───────────────────────────────────────────┘
//!
//!   front ─► [0:A] ◄──► [2:B] ◄──► [1:C] ◄── back
//!            (MRU)                 (LRU)
//! ```
//!
//! Vacated slots are recycled through a free list, so a `NodeId` is only
//! meaningful while its node is linked.

/// Stable handle to a node in a [`RecencyList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// Doubly linked list ordered front (most recent) to back (least recent).
#[derive(Debug)]
pub struct RecencyList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    len: usize,
    front: Option<NodeId>,
    back: Option<NodeId>,
}

impl<T> RecencyList<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            front: None,
            back: None,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn front_id(&self) -> Option<NodeId> {
        self.front
    }

    pub fn back_id(&self) -> Option<NodeId> {
        self.back
    }

    /// Returns the least recently used value.
    pub fn back(&self) -> Option<&T> {
        self.back.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.node(id).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.node_mut(id).map(|node| &mut node.value)
    }

    /// Links `value` at the front and returns its handle.
    pub fn push_front(&mut self, value: T) -> NodeId {
        let node = Node {
            value,
            prev: None,
            next: self.front,
        };
        let id = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                NodeId(idx)
            },
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            },
        };
        self.len += 1;

        match self.front {
            Some(old_front) => {
                if let Some(node) = self.node_mut(old_front) {
                    node.prev = Some(id);
                }
            },
            None => self.back = Some(id),
        }
        self.front = Some(id);
        id
    }

    /// Unlinks and returns the back (least recently used) value.
    pub fn pop_back(&mut self) -> Option<T> {
        let id = self.back?;
        self.remove(id)
    }

    /// Unlinks `id` and returns its value.
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        self.unlink(id)?;
        let node = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(node.value)
    }

    /// Promotes `id` to the front. Returns `false` if `id` is not linked.
    pub fn move_to_front(&mut self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if self.front == Some(id) {
            return true;
        }
        self.unlink(id);

        let old_front = self.front;
        if let Some(node) = self.node_mut(id) {
            node.prev = None;
            node.next = old_front;
        }
        match old_front {
            Some(old) => {
                if let Some(node) = self.node_mut(old) {
                    node.prev = Some(id);
                }
            },
            None => self.back = Some(id),
        }
        self.front = Some(id);
        true
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
        self.front = None;
        self.back = None;
    }

    /// Iterates values from front (MRU) to back (LRU).
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            current: self.front,
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    fn unlink(&mut self, id: NodeId) -> Option<()> {
        let (prev, next) = {
            let node = self.node(id)?;
            (node.prev, node.next)
        };

        match prev {
            Some(prev_id) => {
                if let Some(node) = self.node_mut(prev_id) {
                    node.next = next;
                }
            },
            None => self.front = next,
        }
        match next {
            Some(next_id) => {
                if let Some(node) = self.node_mut(next_id) {
                    node.prev = prev;
                }
            },
            None => self.back = prev,
        }

        let node = self.node_mut(id)?;
        node.prev = None;
        node.next = None;
        Some(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if self.front.is_none() || self.back.is_none() {
            assert!(self.front.is_none());
            assert!(self.back.is_none());
            assert_eq!(self.len, 0);
            return;
        }

        let mut count = 0usize;
        let mut prev = None;
        let mut current = self.front;
        while let Some(id) = current {
            let node = self.node(id).expect("linked node missing");
            assert_eq!(node.prev, prev);
            if node.next.is_none() {
                assert_eq!(self.back, Some(id));
            }
            prev = Some(id);
            current = node.next;
            count += 1;
            assert!(count <= self.len, "cycle in recency list");
        }
        assert_eq!(count, self.len);
        assert_eq!(self.slots.len() - self.free.len(), self.len);
    }
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Iter<'a, T> {
    list: &'a RecencyList<T>,
    current: Option<NodeId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.current?)?;
        self.current = node.next;
        Some(&node.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order<T: Copy>(list: &RecencyList<T>) -> Vec<T> {
        list.iter().copied().collect()
    }

    #[test]
    fn push_front_orders_most_recent_first() {
        let mut list = RecencyList::new();
        list.push_front("a");
        list.push_front("b");
        list.push_front("c");
        assert_eq!(order(&list), vec!["c", "b", "a"]);
        assert_eq!(list.back(), Some(&"a"));
        list.debug_validate_invariants();
    }

    #[test]
    fn move_to_front_from_back_and_middle() {
        let mut list = RecencyList::new();
        let a = list.push_front("a");
        let b = list.push_front("b");
        list.push_front("c");

        assert!(list.move_to_front(a));
        assert_eq!(order(&list), vec!["a", "c", "b"]);
        assert!(list.move_to_front(list.front_id().unwrap()));
        assert!(list.move_to_front(b));
        assert_eq!(order(&list), vec!["b", "a", "c"]);
        list.debug_validate_invariants();
    }

    #[test]
    fn pop_back_drains_in_lru_order() {
        let mut list = RecencyList::new();
        list.push_front(1);
        list.push_front(2);
        list.push_front(3);
        assert_eq!(list.pop_back(), Some(1));
        assert_eq!(list.pop_back(), Some(2));
        assert_eq!(list.pop_back(), Some(3));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
        list.debug_validate_invariants();
    }

    #[test]
    fn removed_slot_is_recycled() {
        let mut list = RecencyList::new();
        let a = list.push_front("a");
        list.push_front("b");
        assert_eq!(list.remove(a), Some("a"));
        assert!(!list.contains(a));
        assert!(!list.move_to_front(a));

        let c = list.push_front("c");
        assert_eq!(c.index(), a.index());
        assert_eq!(order(&list), vec!["c", "b"]);
        list.debug_validate_invariants();
    }

    #[test]
    fn get_mut_replaces_value_in_place() {
        let mut list = RecencyList::new();
        let id = list.push_front(10);
        *list.get_mut(id).unwrap() = 20;
        assert_eq!(list.get(id), Some(&20));
    }

    #[test]
    fn clear_resets_links() {
        let mut list = RecencyList::new();
        list.push_front(1);
        list.push_front(2);
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.front_id(), None);
        assert_eq!(list.back_id(), None);
        list.debug_validate_invariants();
    }
}
