//! A max-priority queue implemented with the same balancing core as the
//! ordered tree.
//!
//! Entries are `(value, key)` pairs balanced by the explicit `i64` key, so
//! carried values need no ordering of their own. Equal keys are legal and
//! chain to the right, exactly like duplicates in the raw tree.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::tree::{self, Link, Traversal, Tree};

/// A max-priority queue over `(value, i64 key)` pairs.
///
/// ```
/// use grove::PriorityQueue;
/// let mut queue = PriorityQueue::new();
/// queue.push("low", 1);
/// queue.push("high", 9);
/// assert_eq!(queue.peek(), Ok(&"high"));
/// assert_eq!(queue.pop(), Ok("high"));
/// assert_eq!(queue.pop(), Ok("low"));
/// assert!(queue.is_empty());
/// ```
pub struct PriorityQueue<T> {
    tree: Tree<i64, T>,
}

/// A forward iterator over the values of a queue in ascending key order.
pub struct Values<'a, T> {
    next: Link<i64, T>,
    _marker: PhantomData<&'a T>,
}

impl<T> PriorityQueue<T> {
    /// Creates an empty queue.
    /// No memory is allocated until the first push.
    pub fn new() -> Self {
        Self { tree: Tree::new() }
    }

    /// Returns true if the queue contains no elements.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the queue.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Clears the queue, deallocating all memory.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Inserts a value under the given priority key.
    /// Duplicate keys are legal and chain to the right.
    pub fn push(&mut self, value: T, key: i64) {
        self.tree.insert(key, value);
    }

    /// Removes and returns the value holding the maximum key.
    ///
    /// The rightmost node itself is unlinked, so the returned value is always
    /// the removed one, even when maximum keys collide.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyContainer`] if the queue is empty.
    pub fn pop(&mut self) -> Result<T> {
        match self.tree.pop_max() {
            Some((_, value)) => Ok(value),
            None => Err(Error::EmptyContainer),
        }
    }

    /// Returns the value holding the maximum key without removing it.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyContainer`] if the queue is empty.
    pub fn peek(&self) -> Result<&T> {
        match self.tree.max_node() {
            Some(node_ptr) => Ok(unsafe { &(*node_ptr.as_ptr()).value }),
            None => Err(Error::EmptyContainer),
        }
    }

    /// Visits every `(value, key)` pair in ascending key order.
    pub fn for_each<F: FnMut(&T, i64)>(&self, mut f: F) {
        self.tree.for_each(Traversal::InOrder, |key, value| f(value, *key));
    }

    /// Gets a forward iterator over the values in ascending key order.
    pub fn iter(&self) -> Values<'_, T> {
        Values {
            next: self.tree.min_node(),
            _marker: PhantomData,
        }
    }

    /// Extracts the elements ranked `[start, end)` in ascending key order
    /// into a new queue, keys preserved.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] if `start >= len`, `end > len` or
    /// `start > end`.
    pub fn subqueue(&self, start: usize, end: usize) -> Result<Self>
    where
        T: Clone,
    {
        let len = self.len();
        if start > end || start >= len {
            return Err(Error::IndexOutOfRange { index: start, len });
        }
        if end > len {
            return Err(Error::IndexOutOfRange { index: end, len });
        }
        let mut result = Self::new();
        let mut position = 0;
        self.for_each(|value, key| {
            if position >= start && position < end {
                result.push(value.clone(), key);
            }
            position += 1;
        });
        Ok(result)
    }

    /// Partitions the elements in ascending key order into two new queues by
    /// a predicate over the value. Every element keeps its original key.
    pub fn split<F>(&self, mut pred: F) -> (Self, Self)
    where
        T: Clone,
        F: FnMut(&T) -> bool,
    {
        let mut accepted = Self::new();
        let mut rejected = Self::new();
        self.for_each(|value, key| {
            if pred(value) {
                accepted.push(value.clone(), key);
            } else {
                rejected.push(value.clone(), key);
            }
        });
        (accepted, rejected)
    }

    /// Returns a new queue holding every element of `self` and `other`,
    /// keys preserved. Both operands are left unchanged.
    pub fn concat(&self, other: &Self) -> Self
    where
        T: Clone,
    {
        let mut result = self.clone();
        result.clutch(other);
        result
    }

    /// Merges every element of `other` into `self` in place, keys preserved.
    pub fn clutch(&mut self, other: &Self) -> &mut Self
    where
        T: Clone,
    {
        other.tree.for_each(Traversal::PreOrder, |key, value| {
            self.tree.insert(*key, value.clone());
        });
        self
    }

    /// Builds a new queue from the transformed values, keys preserved.
    pub fn map<U, F>(&self, mut f: F) -> PriorityQueue<U>
    where
        F: FnMut(&T) -> U,
    {
        let mut result = PriorityQueue::new();
        self.for_each(|value, key| result.push(f(value), key));
        result
    }

    /// Builds a new queue containing exactly the elements whose value
    /// satisfies `pred`, keys preserved.
    pub fn filter<F>(&self, mut pred: F) -> Self
    where
        T: Clone,
        F: FnMut(&T) -> bool,
    {
        let mut result = Self::new();
        self.for_each(|value, key| {
            if pred(value) {
                result.push(value.clone(), key);
            }
        });
        result
    }

    /// Binary fold with a seed over the values in ascending key order.
    pub fn fold<A, F>(&self, seed: A, f: F) -> A
    where
        F: FnMut(A, &T) -> A,
    {
        self.iter().fold(seed, f)
    }

    /// Parses `(value, key)` pairs separated by spaces or commas, with
    /// optional surrounding brackets, and pushes every parsed pair.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] on a malformed pair or separator.
    pub fn from_text(text: &str) -> Result<Self>
    where
        T: FromStr,
    {
        let trimmed = text.trim();
        let inner = match trimmed.strip_prefix('[') {
            Some(rest) => rest.strip_suffix(']').ok_or_else(|| {
                Error::InvalidArgument("unterminated `[` in serialized queue".to_string())
            })?,
            None => trimmed,
        };

        let mut result = Self::new();
        let mut rest = inner.trim_start();
        while !rest.is_empty() {
            if !rest.starts_with('(') {
                return Err(Error::InvalidArgument(format!(
                    "expected `(` at `{rest}`"
                )));
            }
            let close = rest.find(')').ok_or_else(|| {
                Error::InvalidArgument("unterminated `(` in serialized queue".to_string())
            })?;
            let pair = &rest[1..close];
            let (value_text, key_text) = pair.rsplit_once(',').ok_or_else(|| {
                Error::InvalidArgument(format!("missing `,` in pair `({pair})`"))
            })?;
            let value = value_text.trim().parse::<T>().map_err(|_| {
                Error::InvalidArgument(format!("malformed value `{}`", value_text.trim()))
            })?;
            let key = key_text.trim().parse::<i64>().map_err(|_| {
                Error::InvalidArgument(format!("malformed key `{}`", key_text.trim()))
            })?;
            result.push(value, key);

            rest = rest[close + 1..].trim_start();
            if let Some(after_comma) = rest.strip_prefix(',') {
                rest = after_comma.trim_start();
                if rest.is_empty() {
                    return Err(Error::InvalidArgument(
                        "trailing `,` in serialized queue".to_string(),
                    ));
                }
            }
        }
        Ok(result)
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        self.tree.check_consistency();
    }
}

impl<T> Default for PriorityQueue<T> {
    /// Creates an empty queue.
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for PriorityQueue<T> {
    /// Walks the source and re-pushes every pair, so the clone is
    /// independently rebalanced rather than a structural mirror.
    fn clone(&self) -> Self {
        let mut clone = Self::new();
        self.tree.for_each(Traversal::PreOrder, |key, value| {
            clone.push(value.clone(), *key);
        });
        clone
    }
}

impl<T: fmt::Display> fmt::Display for PriorityQueue<T> {
    /// Renders `[(v1, k1), (v2, k2), ...]` in ascending key order.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut text = String::from("[");
        let mut first = true;
        self.for_each(|value, key| {
            if !first {
                text.push_str(", ");
            }
            text.push_str(&format!("({value}, {key})"));
            first = false;
        });
        text.push(']');
        f.write_str(&text)
    }
}

impl<T: FromStr> FromStr for PriorityQueue<T> {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        Self::from_text(text)
    }
}

impl<T: fmt::Debug> fmt::Debug for PriorityQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut list = f.debug_list();
        self.tree.for_each(Traversal::InOrder, |key, value| {
            list.entry(&(value, *key));
        });
        list.finish()
    }
}

impl<'a, T> IntoIterator for &'a PriorityQueue<T> {
    type Item = &'a T;
    type IntoIter = Values<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Auto derived clone would demand T: Clone
impl<'a, T> Clone for Values<'a, T> {
    fn clone(&self) -> Self {
        Self {
            next: self.next,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for Values<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node_ptr = self.next?;
        self.next = unsafe { tree::successor(node_ptr) };
        Some(unsafe { &(*node_ptr.as_ptr()).value })
    }
}
