//! Balancing core shared by every container in the crate.
//!
//! A single AVL tree over `(key, value)` entries with parent back-references.
//! The ordered tree and the set instantiate it with `V = ()`, the priority
//! queue with `K = i64` and the carried value as payload, so rotation and
//! height bookkeeping exist exactly once.
//!
//! Equal keys are legal here and always descend to the right, forming a
//! right-leaning chain. Uniqueness is a layer above, not a core concern.

use std::cmp::{self, Ordering};
use std::ptr::NonNull;
use std::str::FromStr;

use crate::error::Error;

/// Visiting order for the iterative tree walks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Traversal {
    PreOrder,
    ReversePreOrder,
    #[default]
    InOrder,
    ReverseInOrder,
    PostOrder,
    ReversePostOrder,
}

impl FromStr for Traversal {
    type Err = Error;

    fn from_str(selector: &str) -> Result<Self, Error> {
        match selector {
            "pre_order" => Ok(Self::PreOrder),
            "reverse_pre_order" => Ok(Self::ReversePreOrder),
            "in_order" => Ok(Self::InOrder),
            "reverse_in_order" => Ok(Self::ReverseInOrder),
            "post_order" => Ok(Self::PostOrder),
            "reverse_post_order" => Ok(Self::ReversePostOrder),
            _ => Err(Error::InvalidArgument(format!(
                "unrecognized traversal order `{selector}`"
            ))),
        }
    }
}

pub(crate) type NodePtr<K, V> = NonNull<Node<K, V>>;
pub(crate) type Link<K, V> = Option<NodePtr<K, V>>;
type LinkPtr<K, V> = NonNull<Link<K, V>>;

pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    left: Link<K, V>,
    right: Link<K, V>,
    parent: Link<K, V>,
    height: u8,
}

impl<K, V> Node<K, V> {
    fn create(parent: Link<K, V>, key: K, value: V) -> NodePtr<K, V> {
        let boxed = Box::new(Node {
            key,
            value,
            parent,
            left: None,
            right: None,
            height: 1,
        });
        unsafe { NodePtr::new_unchecked(Box::into_raw(boxed)) }
    }

    unsafe fn destroy(node_ptr: NodePtr<K, V>) {
        drop(Box::from_raw(node_ptr.as_ptr()));
    }

    unsafe fn into_entry(node_ptr: NodePtr<K, V>) -> (K, V) {
        let boxed = Box::from_raw(node_ptr.as_ptr());
        (boxed.key, boxed.value)
    }
}

/// Steps to the in-order successor via parent links only.
///
/// # Safety
///
/// `node_ptr` must point into a live tree that is not mutated while the
/// returned link is in use.
pub(crate) unsafe fn successor<K, V>(node_ptr: NodePtr<K, V>) -> Link<K, V> {
    if let Some(right_ptr) = node_ptr.as_ref().right {
        let mut current = right_ptr;
        while let Some(left_ptr) = current.as_ref().left {
            current = left_ptr;
        }
        return Some(current);
    }
    let mut current = node_ptr;
    let mut parent = current.as_ref().parent;
    while let Some(parent_ptr) = parent {
        if parent_ptr.as_ref().left == Some(current) {
            return Some(parent_ptr);
        }
        current = parent_ptr;
        parent = parent_ptr.as_ref().parent;
    }
    None
}

/// Mirror of [`successor`]: steps to the in-order predecessor.
///
/// # Safety
///
/// Same contract as [`successor`].
pub(crate) unsafe fn predecessor<K, V>(node_ptr: NodePtr<K, V>) -> Link<K, V> {
    if let Some(left_ptr) = node_ptr.as_ref().left {
        let mut current = left_ptr;
        while let Some(right_ptr) = current.as_ref().right {
            current = right_ptr;
        }
        return Some(current);
    }
    let mut current = node_ptr;
    let mut parent = current.as_ref().parent;
    while let Some(parent_ptr) = parent {
        if parent_ptr.as_ref().right == Some(current) {
            return Some(parent_ptr);
        }
        current = parent_ptr;
        parent = parent_ptr.as_ref().parent;
    }
    None
}

pub(crate) struct Tree<K: Ord, V> {
    root: Link<K, V>,
    len: usize,
}

impl<K: Ord, V> Tree<K, V> {
    pub(crate) fn new() -> Self {
        Self { root: None, len: 0 }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Height of the tree: number of nodes on the longest root-to-leaf path.
    pub(crate) fn height(&self) -> usize {
        match self.root {
            None => 0,
            Some(root_ptr) => unsafe { root_ptr.as_ref().height as usize },
        }
    }

    /// Frees every reachable node, driving the walk with an explicit stack.
    pub(crate) fn clear(&mut self) {
        let mut stack = Vec::new();
        if let Some(root_ptr) = self.root.take() {
            stack.push(root_ptr);
        }
        while let Some(node_ptr) = stack.pop() {
            unsafe {
                if let Some(left_ptr) = node_ptr.as_ref().left {
                    stack.push(left_ptr);
                }
                if let Some(right_ptr) = node_ptr.as_ref().right {
                    stack.push(right_ptr);
                }
                Node::destroy(node_ptr);
            }
        }
        self.len = 0;
    }

    /// Inserts an entry, routing equal keys to the right. Always succeeds.
    pub(crate) fn insert(&mut self, key: K, value: V) {
        let (parent, mut link_ptr) = self.find_insert_slot(&key);
        unsafe {
            *link_ptr.as_mut() = Some(Node::create(parent, key, value));
        }
        self.len += 1;
        self.rebalance_once(parent);
    }

    /// Removes the first exact match encountered by descent.
    /// Absence leaves the tree untouched.
    pub(crate) fn remove(&mut self, key: &K) -> Option<(K, V)> {
        let node_ptr = self.find(key)?;
        debug_assert!(self.len >= 1);
        self.unlink_node(node_ptr);
        self.len -= 1;
        Some(unsafe { Node::into_entry(node_ptr) })
    }

    /// Unlinks and returns the maximum-key entry.
    pub(crate) fn pop_max(&mut self) -> Option<(K, V)> {
        let node_ptr = self.max_node()?;
        self.unlink_node(node_ptr);
        self.len -= 1;
        Some(unsafe { Node::into_entry(node_ptr) })
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    pub(crate) fn find(&self, key: &K) -> Link<K, V> {
        let mut current = self.root;
        while let Some(node_ptr) = current {
            current = unsafe {
                match key.cmp(&node_ptr.as_ref().key) {
                    Ordering::Equal => break,
                    Ordering::Less => node_ptr.as_ref().left,
                    Ordering::Greater => node_ptr.as_ref().right,
                }
            }
        }
        current
    }

    pub(crate) fn min_node(&self) -> Link<K, V> {
        let mut current = self.root?;
        unsafe {
            while let Some(left_ptr) = current.as_ref().left {
                current = left_ptr;
            }
        }
        Some(current)
    }

    pub(crate) fn max_node(&self) -> Link<K, V> {
        let mut current = self.root?;
        unsafe {
            while let Some(right_ptr) = current.as_ref().right {
                current = right_ptr;
            }
        }
        Some(current)
    }

    /// Read-only visit of every entry in the given order.
    /// Each walk drives an explicit stack; the call stack stays flat.
    pub(crate) fn for_each<F: FnMut(&K, &V)>(&self, order: Traversal, f: F) {
        match order {
            Traversal::PreOrder => self.for_each_pre_order(f),
            Traversal::ReversePreOrder => self.for_each_reverse_pre_order(f),
            Traversal::InOrder => self.for_each_in_order(f),
            Traversal::ReverseInOrder => self.for_each_reverse_in_order(f),
            Traversal::PostOrder => self.for_each_post_order(f),
            Traversal::ReversePostOrder => self.for_each_reverse_post_order(f),
        }
    }

    /// Pre-order visit of the subtree rooted at the first exact match.
    /// Does nothing if the key is absent.
    pub(crate) fn for_each_subtree<F: FnMut(&K, &V)>(&self, key: &K, mut f: F) {
        let Some(sub_root) = self.find(key) else {
            return;
        };
        let mut stack = vec![sub_root];
        while let Some(node_ptr) = stack.pop() {
            unsafe {
                f(&node_ptr.as_ref().key, &node_ptr.as_ref().value);
                if let Some(right_ptr) = node_ptr.as_ref().right {
                    stack.push(right_ptr);
                }
                if let Some(left_ptr) = node_ptr.as_ref().left {
                    stack.push(left_ptr);
                }
            }
        }
    }

    fn for_each_pre_order<F: FnMut(&K, &V)>(&self, mut f: F) {
        let mut stack = Vec::new();
        if let Some(root_ptr) = self.root {
            stack.push(root_ptr);
        }
        while let Some(node_ptr) = stack.pop() {
            unsafe {
                f(&node_ptr.as_ref().key, &node_ptr.as_ref().value);
                if let Some(right_ptr) = node_ptr.as_ref().right {
                    stack.push(right_ptr);
                }
                if let Some(left_ptr) = node_ptr.as_ref().left {
                    stack.push(left_ptr);
                }
            }
        }
    }

    fn for_each_reverse_pre_order<F: FnMut(&K, &V)>(&self, mut f: F) {
        let mut stack = Vec::new();
        if let Some(root_ptr) = self.root {
            stack.push(root_ptr);
        }
        while let Some(node_ptr) = stack.pop() {
            unsafe {
                f(&node_ptr.as_ref().key, &node_ptr.as_ref().value);
                if let Some(left_ptr) = node_ptr.as_ref().left {
                    stack.push(left_ptr);
                }
                if let Some(right_ptr) = node_ptr.as_ref().right {
                    stack.push(right_ptr);
                }
            }
        }
    }

    fn for_each_in_order<F: FnMut(&K, &V)>(&self, mut f: F) {
        let mut stack: Vec<NodePtr<K, V>> = Vec::new();
        let mut current = self.root;
        while current.is_some() || !stack.is_empty() {
            while let Some(node_ptr) = current {
                stack.push(node_ptr);
                current = unsafe { node_ptr.as_ref().left };
            }
            // Loop condition guarantees a non-empty stack here
            let node_ptr = stack.pop().unwrap();
            unsafe {
                f(&node_ptr.as_ref().key, &node_ptr.as_ref().value);
                current = node_ptr.as_ref().right;
            }
        }
    }

    fn for_each_reverse_in_order<F: FnMut(&K, &V)>(&self, mut f: F) {
        let mut stack: Vec<NodePtr<K, V>> = Vec::new();
        let mut current = self.root;
        while current.is_some() || !stack.is_empty() {
            while let Some(node_ptr) = current {
                stack.push(node_ptr);
                current = unsafe { node_ptr.as_ref().right };
            }
            let node_ptr = stack.pop().unwrap();
            unsafe {
                f(&node_ptr.as_ref().key, &node_ptr.as_ref().value);
                current = node_ptr.as_ref().left;
            }
        }
    }

    fn for_each_post_order<F: FnMut(&K, &V)>(&self, mut f: F) {
        let mut stack: Vec<NodePtr<K, V>> = Vec::new();
        let mut current = self.root;
        let mut last_visited: Link<K, V> = None;
        while current.is_some() || !stack.is_empty() {
            if let Some(node_ptr) = current {
                stack.push(node_ptr);
                current = unsafe { node_ptr.as_ref().left };
            } else {
                let peek = *stack.last().unwrap();
                let right = unsafe { peek.as_ref().right };
                if right.is_some() && last_visited != right {
                    current = right;
                } else {
                    unsafe { f(&peek.as_ref().key, &peek.as_ref().value) };
                    last_visited = Some(peek);
                    stack.pop();
                }
            }
        }
    }

    fn for_each_reverse_post_order<F: FnMut(&K, &V)>(&self, mut f: F) {
        let mut stack: Vec<NodePtr<K, V>> = Vec::new();
        let mut current = self.root;
        let mut last_visited: Link<K, V> = None;
        while current.is_some() || !stack.is_empty() {
            if let Some(node_ptr) = current {
                stack.push(node_ptr);
                current = unsafe { node_ptr.as_ref().right };
            } else {
                let peek = *stack.last().unwrap();
                let left = unsafe { peek.as_ref().left };
                if left.is_some() && last_visited != left {
                    current = left;
                } else {
                    unsafe { f(&peek.as_ref().key, &peek.as_ref().value) };
                    last_visited = Some(peek);
                    stack.pop();
                }
            }
        }
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub(crate) fn check_consistency(&self) {
        unsafe {
            // Check root link
            if let Some(root_ptr) = self.root {
                assert!(root_ptr.as_ref().parent.is_none());
            }

            let mut num_nodes = 0;
            let mut stack = Vec::new();
            if let Some(root_ptr) = self.root {
                stack.push(root_ptr);
            }
            while let Some(node_ptr) = stack.pop() {
                let mut height = 1;
                let mut left_height = 0;
                let mut right_height = 0;

                // Left child links back and holds a strictly smaller key
                if let Some(left_ptr) = node_ptr.as_ref().left {
                    assert!(left_ptr.as_ref().parent == Some(node_ptr));
                    assert!(left_ptr.as_ref().key < node_ptr.as_ref().key);
                    left_height = left_ptr.as_ref().height;
                    height = cmp::max(height, left_height + 1);
                    stack.push(left_ptr);
                }

                // Right child links back; equal keys chain right
                if let Some(right_ptr) = node_ptr.as_ref().right {
                    assert!(right_ptr.as_ref().parent == Some(node_ptr));
                    assert!(right_ptr.as_ref().key >= node_ptr.as_ref().key);
                    right_height = right_ptr.as_ref().height;
                    height = cmp::max(height, right_height + 1);
                    stack.push(right_ptr);
                }

                // Check height
                assert_eq!(node_ptr.as_ref().height, height);

                // Check AVL condition (near balance)
                assert!(left_height <= right_height + 1);
                assert!(right_height <= left_height + 1);

                num_nodes += 1;
            }

            // Check number of nodes
            assert_eq!(num_nodes, self.len);
        }
    }

    fn find_insert_slot(&mut self, key: &K) -> (Link<K, V>, LinkPtr<K, V>) {
        let mut parent: Link<K, V> = None;
        let mut link_ptr: LinkPtr<K, V> = unsafe { LinkPtr::new_unchecked(&mut self.root) };
        unsafe {
            while let Some(mut node_ptr) = *link_ptr.as_ref() {
                parent = *link_ptr.as_ref();
                if *key < node_ptr.as_ref().key {
                    link_ptr = LinkPtr::new_unchecked(&mut node_ptr.as_mut().left);
                } else {
                    link_ptr = LinkPtr::new_unchecked(&mut node_ptr.as_mut().right);
                }
            }
        }
        (parent, link_ptr)
    }

    fn unlink_node(&mut self, node_ptr: NodePtr<K, V>) {
        unsafe {
            if let Some(mut succ_ptr) = node_ptr.as_ref().right {
                // In-order successor: leftmost node of the right subtree
                let mut succ_parent_ptr = node_ptr;
                while let Some(left_ptr) = succ_ptr.as_ref().left {
                    succ_parent_ptr = succ_ptr;
                    succ_ptr = left_ptr;
                }

                // Successor has no left child, detach it from its parent
                debug_assert!(succ_ptr.as_ref().left.is_none());
                if succ_parent_ptr.as_ref().left == Some(succ_ptr) {
                    succ_parent_ptr.as_mut().left = succ_ptr.as_ref().right;
                } else {
                    succ_parent_ptr.as_mut().right = succ_ptr.as_ref().right;
                }
                if let Some(mut right_ptr) = succ_ptr.as_ref().right {
                    right_ptr.as_mut().parent = succ_ptr.as_ref().parent;
                }

                // Successor takes over both subtrees and the parent slot;
                // every relocated node gets its parent link repaired
                succ_ptr.as_mut().left = node_ptr.as_ref().left;
                if let Some(mut left_ptr) = node_ptr.as_ref().left {
                    left_ptr.as_mut().parent = Some(succ_ptr);
                }

                succ_ptr.as_mut().right = node_ptr.as_ref().right;
                if let Some(mut right_ptr) = node_ptr.as_ref().right {
                    right_ptr.as_mut().parent = Some(succ_ptr);
                }

                succ_ptr.as_mut().parent = node_ptr.as_ref().parent;
                match node_ptr.as_ref().parent {
                    None => self.root = Some(succ_ptr),
                    Some(mut parent_ptr) => {
                        if parent_ptr.as_ref().left == Some(node_ptr) {
                            parent_ptr.as_mut().left = Some(succ_ptr);
                        } else {
                            parent_ptr.as_mut().right = Some(succ_ptr);
                        }
                    }
                }

                // The successor's old parent may be out of balance now
                let mut rebalance_from = succ_parent_ptr;
                if rebalance_from == node_ptr {
                    // Old parent is the unlinked node itself; the successor took its place
                    rebalance_from = succ_ptr;
                }
                self.rebalance(Some(rebalance_from));
            } else {
                // No right subtree: the left child moves up
                debug_assert!(node_ptr.as_ref().right.is_none());
                if let Some(mut left_ptr) = node_ptr.as_ref().left {
                    left_ptr.as_mut().parent = node_ptr.as_ref().parent;
                }
                match node_ptr.as_ref().parent {
                    None => self.root = node_ptr.as_ref().left,
                    Some(mut parent_ptr) => {
                        if parent_ptr.as_ref().left == Some(node_ptr) {
                            parent_ptr.as_mut().left = node_ptr.as_ref().left;
                        } else {
                            parent_ptr.as_mut().right = node_ptr.as_ref().left;
                        }
                        // Parent node might be out of balance now
                        self.rebalance(Some(parent_ptr));
                    }
                }
            }
        }
    }

    fn left_height(node_ptr: NodePtr<K, V>) -> u8 {
        unsafe {
            match node_ptr.as_ref().left {
                None => 0,
                Some(left_ptr) => left_ptr.as_ref().height,
            }
        }
    }

    fn right_height(node_ptr: NodePtr<K, V>) -> u8 {
        unsafe {
            match node_ptr.as_ref().right {
                None => 0,
                Some(right_ptr) => right_ptr.as_ref().height,
            }
        }
    }

    fn adjust_height(mut node_ptr: NodePtr<K, V>) {
        unsafe {
            node_ptr.as_mut().height =
                1 + cmp::max(Self::left_height(node_ptr), Self::right_height(node_ptr));
        }
    }

    fn rotate_left(&mut self, mut node_ptr: NodePtr<K, V>) {
        unsafe {
            if let Some(mut right_ptr) = node_ptr.as_ref().right {
                node_ptr.as_mut().right = right_ptr.as_ref().left;
                if let Some(mut right_left_ptr) = right_ptr.as_mut().left {
                    right_left_ptr.as_mut().parent = Some(node_ptr);
                }

                right_ptr.as_mut().parent = node_ptr.as_ref().parent;
                match node_ptr.as_ref().parent {
                    None => self.root = Some(right_ptr),
                    Some(mut parent_ptr) => {
                        if parent_ptr.as_ref().left == Some(node_ptr) {
                            parent_ptr.as_mut().left = Some(right_ptr);
                        } else {
                            parent_ptr.as_mut().right = Some(right_ptr);
                        }
                    }
                }

                right_ptr.as_mut().left = Some(node_ptr);
                node_ptr.as_mut().parent = Some(right_ptr);

                Self::adjust_height(node_ptr);
                Self::adjust_height(right_ptr);
            }
        }
    }

    fn rotate_right(&mut self, mut node_ptr: NodePtr<K, V>) {
        unsafe {
            if let Some(mut left_ptr) = node_ptr.as_ref().left {
                node_ptr.as_mut().left = left_ptr.as_ref().right;
                if let Some(mut left_right_ptr) = left_ptr.as_ref().right {
                    left_right_ptr.as_mut().parent = Some(node_ptr);
                }

                left_ptr.as_mut().parent = node_ptr.as_ref().parent;
                match node_ptr.as_ref().parent {
                    None => self.root = Some(left_ptr),
                    Some(mut parent_ptr) => {
                        if parent_ptr.as_ref().left == Some(node_ptr) {
                            parent_ptr.as_mut().left = Some(left_ptr);
                        } else {
                            parent_ptr.as_mut().right = Some(left_ptr);
                        }
                    }
                }

                left_ptr.as_mut().right = Some(node_ptr);
                node_ptr.as_mut().parent = Some(left_ptr);

                Self::adjust_height(node_ptr);
                Self::adjust_height(left_ptr);
            }
        }
    }

    /// Rebalances nodes starting from given position up to the root node.
    fn rebalance(&mut self, start_from: Link<K, V>) {
        let mut current = start_from;
        while let Some(node_ptr) = current {
            let parent = unsafe { node_ptr.as_ref().parent };
            self.rebalance_node(node_ptr);
            current = parent;
        }
    }

    /// Rebalances nodes starting from given position up to the root node.
    /// Stops after the first rebalance operation, which is enough to restore
    /// balance after a single insert.
    fn rebalance_once(&mut self, start_from: Link<K, V>) {
        let mut current = start_from;
        while let Some(node_ptr) = current {
            let parent = unsafe { node_ptr.as_ref().parent };
            let did_rebalance = self.rebalance_node(node_ptr);
            if did_rebalance {
                break;
            }
            current = parent;
        }
    }

    /// Restores the AVL condition at the given node if necessary and adjusts
    /// its height. The initial imbalance never exceeds two levels, which
    /// always holds after a single update. Returns whether a rotation ran.
    fn rebalance_node(&mut self, node_ptr: NodePtr<K, V>) -> bool {
        let left_height = Self::left_height(node_ptr);
        let right_height = Self::right_height(node_ptr);
        debug_assert!(left_height <= right_height + 2);
        debug_assert!(right_height <= left_height + 2);
        if left_height > right_height + 1 {
            // Left-heavy: rotate right, with a pre-rotation for the zig-zag case
            let left_ptr = unsafe { node_ptr.as_ref().left.unwrap() };
            if Self::right_height(left_ptr) > Self::left_height(left_ptr) {
                self.rotate_left(left_ptr);
            }
            self.rotate_right(node_ptr);
            true
        } else if right_height > left_height + 1 {
            // Right-heavy: mirror case
            let right_ptr = unsafe { node_ptr.as_ref().right.unwrap() };
            if Self::left_height(right_ptr) > Self::right_height(right_ptr) {
                self.rotate_right(right_ptr);
            }
            self.rotate_left(node_ptr);
            true
        } else {
            Self::adjust_height(node_ptr);
            false
        }
    }
}

impl<K: Ord, V> Drop for Tree<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K: Ord, V> Default for Tree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
