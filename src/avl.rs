//! An ordered tree implemented with a parent-linked AVL tree.
//!
//! Unlike the set layer, the raw tree accepts duplicates: equal values chain
//! to the right and are reported by traversals in insertion order.

use std::fmt;
use std::iter::FromIterator;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::tree::{self, Link, Traversal, Tree};

/// An ordered, duplicate-tolerant tree.
///
/// ```
/// use grove::AvlTree;
/// let mut tree = AvlTree::new();
/// tree.insert(1);
/// tree.insert(0);
/// tree.insert(2);
/// assert!(tree.contains(&1));
/// tree.remove(&1);
/// assert!(!tree.contains(&1));
/// ```
pub struct AvlTree<T: Ord> {
    tree: Tree<T, ()>,
}

/// A forward in-order iterator over the values of a tree.
///
/// Steps through parent links; holds no auxiliary stack and never allocates.
pub struct Iter<'a, T> {
    next: Link<T, ()>,
    _marker: PhantomData<&'a T>,
}

/// A bidirectional cursor over a tree, with a past-the-end sentinel.
///
/// The cursor borrows the tree, so the tree cannot be mutated while any
/// cursor over it is live.
pub struct Cursor<'a, T: Ord> {
    current: Link<T, ()>,
    tree: &'a AvlTree<T>,
}

impl<T: Ord> AvlTree<T> {
    /// Creates an empty tree.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self { tree: Tree::new() }
    }

    /// Returns true if the tree contains no values.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of values in the tree, duplicates included.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Clears the tree, deallocating all memory.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Inserts a value. Duplicates are accepted and chain to the right.
    pub fn insert(&mut self, value: T) {
        self.tree.insert(value, ());
    }

    /// Removes the first value comparing equal to `value` found by descent.
    /// Returns whether a value was removed; absence leaves the tree untouched.
    pub fn remove(&mut self, value: &T) -> bool {
        self.tree.remove(value).is_some()
    }

    /// Returns true if any value in the tree compares equal to `value`.
    pub fn contains(&self, value: &T) -> bool {
        self.tree.contains(value)
    }

    /// Returns the smallest value, or [`Error::EmptyContainer`] on an empty tree.
    pub fn min(&self) -> Result<&T> {
        match self.tree.min_node() {
            Some(node_ptr) => Ok(unsafe { &(*node_ptr.as_ptr()).key }),
            None => Err(Error::EmptyContainer),
        }
    }

    /// Returns the greatest value, or [`Error::EmptyContainer`] on an empty tree.
    pub fn max(&self) -> Result<&T> {
        match self.tree.max_node() {
            Some(node_ptr) => Ok(unsafe { &(*node_ptr.as_ptr()).key }),
            None => Err(Error::EmptyContainer),
        }
    }

    /// Visits every value in the given traversal order.
    /// The visitor is read-only; the walk uses an explicit stack.
    pub fn for_each<F: FnMut(&T)>(&self, order: Traversal, mut f: F) {
        self.tree.for_each(order, |value, _| f(value));
    }

    /// Extracts the subtree rooted at the first value comparing equal to
    /// `value` into a new, independently balanced tree.
    /// Returns an empty tree if the value is absent.
    pub fn subtree(&self, value: &T) -> Self
    where
        T: Clone,
    {
        let mut result = Self::new();
        self.tree
            .for_each_subtree(value, |value, _| result.insert(value.clone()));
        result
    }

    /// Returns a new tree holding every value of `self` and `other`.
    /// Duplicates are preserved; both operands are left unchanged.
    pub fn concat(&self, other: &Self) -> Self
    where
        T: Clone,
    {
        let mut result = self.clone();
        result.clutch(other);
        result
    }

    /// Merges every value of `other` into `self` in place.
    pub fn clutch(&mut self, other: &Self) -> &mut Self
    where
        T: Clone,
    {
        other
            .tree
            .for_each(Traversal::PreOrder, |value, _| self.tree.insert(value.clone(), ()));
        self
    }

    /// Builds a new tree from the transformed values.
    /// Post-transform duplicates collapse per the normal insertion rule.
    pub fn map<U, F>(&self, mut f: F) -> AvlTree<U>
    where
        U: Ord,
        F: FnMut(&T) -> U,
    {
        let mut result = AvlTree::new();
        self.tree
            .for_each(Traversal::PreOrder, |value, _| result.insert(f(value)));
        result
    }

    /// Builds a new tree containing exactly the values satisfying `pred`,
    /// duplicate chains included.
    pub fn filter<F>(&self, mut pred: F) -> Self
    where
        T: Clone,
        F: FnMut(&T) -> bool,
    {
        let mut result = Self::new();
        self.tree.for_each(Traversal::PreOrder, |value, _| {
            if pred(value) {
                result.insert(value.clone());
            }
        });
        result
    }

    /// In-order binary fold with a seed.
    pub fn fold<A, F>(&self, seed: A, f: F) -> A
    where
        F: FnMut(A, &T) -> A,
    {
        self.iter().fold(seed, f)
    }

    /// Renders the values in the given traversal order as `[v1, v2, ...]`.
    pub fn to_text(&self, order: Traversal) -> String
    where
        T: fmt::Display,
    {
        let mut out = String::from("[");
        let mut first = true;
        self.tree.for_each(order, |value, _| {
            if !first {
                out.push_str(", ");
            }
            out.push_str(&value.to_string());
            first = false;
        });
        out.push(']');
        out
    }

    /// Parses a comma-separated literal list, with optional surrounding
    /// brackets, and inserts every parsed value.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] on a malformed element or separator.
    pub fn from_text(text: &str) -> Result<Self>
    where
        T: FromStr,
    {
        let mut result = Self::new();
        for value in parse_values(text)? {
            result.insert(value);
        }
        Ok(result)
    }

    /// Gets a forward iterator over the values in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.tree.min_node(),
            _marker: PhantomData,
        }
    }

    /// Gets a cursor positioned at the smallest value, or at the sentinel if
    /// the tree is empty.
    pub fn cursor_front(&self) -> Cursor<'_, T> {
        Cursor {
            current: self.tree.min_node(),
            tree: self,
        }
    }

    /// Gets a cursor positioned at the past-the-end sentinel.
    pub fn cursor_end(&self) -> Cursor<'_, T> {
        Cursor {
            current: None,
            tree: self,
        }
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        self.tree.check_consistency();
    }
}

/// Parses a comma-separated literal list with optional surrounding brackets.
pub(crate) fn parse_values<T: FromStr>(text: &str) -> Result<Vec<T>> {
    let trimmed = text.trim();
    let inner = match trimmed.strip_prefix('[') {
        Some(rest) => rest.strip_suffix(']').ok_or_else(|| {
            Error::InvalidArgument("unterminated `[` in serialized list".to_string())
        })?,
        None => trimmed,
    };
    let inner = inner.trim();
    if inner.is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(',')
        .map(|token| {
            let token = token.trim();
            if token.is_empty() {
                return Err(Error::InvalidArgument(
                    "empty element in serialized list".to_string(),
                ));
            }
            token
                .parse::<T>()
                .map_err(|_| Error::InvalidArgument(format!("malformed element `{token}`")))
        })
        .collect()
}

impl<T: Ord> Default for AvlTree<T> {
    /// Creates an empty tree.
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + Clone> Clone for AvlTree<T> {
    /// Walks the source and re-inserts every value, so the clone is
    /// independently rebalanced rather than a structural mirror.
    fn clone(&self) -> Self {
        let mut clone = Self::new();
        self.tree
            .for_each(Traversal::PreOrder, |value, _| clone.insert(value.clone()));
        clone
    }
}

impl<T: Ord + fmt::Display> fmt::Display for AvlTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_text(Traversal::InOrder))
    }
}

impl<T: Ord + FromStr> FromStr for AvlTree<T> {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        Self::from_text(text)
    }
}

impl<T: Ord + fmt::Debug> fmt::Debug for AvlTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Ord> FromIterator<T> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        for value in iter {
            tree.insert(value);
        }
        tree
    }
}

impl<T: Ord> Extend<T> for AvlTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(|value| self.insert(value));
    }
}

impl<'a, T> IntoIterator for &'a AvlTree<T>
where
    T: Ord,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Auto derived clone would demand T: Clone
impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Self {
            next: self.next,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node_ptr = self.next?;
        self.next = unsafe { tree::successor(node_ptr) };
        Some(unsafe { &(*node_ptr.as_ptr()).key })
    }
}

impl<'a, T: Ord> Cursor<'a, T> {
    /// Returns the value under the cursor, or `None` at the sentinel.
    pub fn value(&self) -> Option<&'a T> {
        self.current
            .map(|node_ptr| unsafe { &(*node_ptr.as_ptr()).key })
    }

    /// Returns true if the cursor sits on the past-the-end sentinel.
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Steps to the in-order successor; stepping off the greatest value
    /// lands on the sentinel.
    ///
    /// # Panics
    ///
    /// Panics if the cursor already sits on the sentinel.
    pub fn move_next(&mut self) {
        let node_ptr = self.current.expect("cursor advanced past the end");
        self.current = unsafe { tree::successor(node_ptr) };
    }

    /// Steps to the in-order predecessor; stepping back from the sentinel
    /// lands on the greatest value, and stepping back off the smallest value
    /// lands on the sentinel.
    ///
    /// # Panics
    ///
    /// Panics if the cursor sits on the sentinel of an empty tree.
    pub fn move_prev(&mut self) {
        self.current = match self.current {
            Some(node_ptr) => unsafe { tree::predecessor(node_ptr) },
            None => Some(
                self.tree
                    .tree
                    .max_node()
                    .expect("cursor retreated in an empty tree"),
            ),
        };
    }
}
