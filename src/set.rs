//! An ordered set implemented as a thin wrapper over the AVL tree.
//!
//! The wrapper adds exactly one invariant the raw tree lacks: no two elements
//! compare equal. Everything structural is the tree's business.

use std::fmt;
use std::iter::FromIterator;
use std::str::FromStr;

use crate::avl::{AvlTree, Iter};
use crate::error::Result;
use crate::tree::Traversal;

/// An ordered set with unique elements.
///
/// ```
/// use grove::AvlTreeSet;
/// let mut set = AvlTreeSet::new();
/// set.insert(0);
/// set.insert(1);
/// set.insert(1);
/// assert_eq!(set.len(), 2);
/// set.remove(&1);
/// assert!(!set.contains(&1));
/// ```
pub struct AvlTreeSet<T: Ord> {
    tree: AvlTree<T>,
}

impl<T: Ord> AvlTreeSet<T> {
    /// Creates an empty set.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self {
            tree: AvlTree::new(),
        }
    }

    /// Returns true if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Clears the set, deallocating all memory.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Inserts a value into the set.
    /// Returns whether the value was absent, i.e. actually inserted.
    pub fn insert(&mut self, value: T) -> bool {
        // Membership probe first, then a second descent to insert
        if self.tree.contains(&value) {
            return false;
        }
        self.tree.insert(value);
        true
    }

    /// Removes a value from the set.
    /// Returns whether the value was previously in the set.
    pub fn remove(&mut self, value: &T) -> bool {
        self.tree.remove(value)
    }

    /// Returns true if the set contains a value equal to `value`.
    pub fn contains(&self, value: &T) -> bool {
        self.tree.contains(value)
    }

    /// Returns the smallest element, or [`crate::Error::EmptyContainer`] on
    /// an empty set.
    pub fn min(&self) -> Result<&T> {
        self.tree.min()
    }

    /// Returns the greatest element, or [`crate::Error::EmptyContainer`] on
    /// an empty set.
    pub fn max(&self) -> Result<&T> {
        self.tree.max()
    }

    /// Visits every element in the given traversal order.
    pub fn for_each<F: FnMut(&T)>(&self, order: Traversal, f: F) {
        self.tree.for_each(order, f);
    }

    /// Gets a forward iterator over the elements in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        self.tree.iter()
    }

    /// Folds every element of `other` into `self`.
    pub fn union_with(&mut self, other: &Self)
    where
        T: Clone,
    {
        other.for_each(Traversal::PreOrder, |value| {
            self.insert(value.clone());
        });
    }

    /// Returns the union of `self` and `other` as a new set.
    pub fn union(&self, other: &Self) -> Self
    where
        T: Clone,
    {
        let mut result = Self::new();
        self.for_each(Traversal::PreOrder, |value| {
            result.insert(value.clone());
        });
        other.for_each(Traversal::PreOrder, |value| {
            result.insert(value.clone());
        });
        result
    }

    /// Keeps only the elements also present in `other`.
    pub fn intersect_with(&mut self, other: &Self)
    where
        T: Clone,
    {
        let mut to_remove = Vec::new();
        self.for_each(Traversal::PreOrder, |value| {
            if !other.contains(value) {
                to_remove.push(value.clone());
            }
        });
        for value in &to_remove {
            self.remove(value);
        }
    }

    /// Returns the intersection of `self` and `other` as a new set.
    pub fn intersection(&self, other: &Self) -> Self
    where
        T: Clone,
    {
        let mut result = Self::new();
        self.for_each(Traversal::PreOrder, |value| {
            if other.contains(value) {
                result.insert(value.clone());
            }
        });
        result
    }

    /// Removes every element also present in `other`.
    pub fn difference_with(&mut self, other: &Self)
    where
        T: Clone,
    {
        let mut to_remove = Vec::new();
        self.for_each(Traversal::PreOrder, |value| {
            if other.contains(value) {
                to_remove.push(value.clone());
            }
        });
        for value in &to_remove {
            self.remove(value);
        }
    }

    /// Returns the difference `self − other` as a new set.
    pub fn difference(&self, other: &Self) -> Self
    where
        T: Clone,
    {
        let mut result = Self::new();
        self.for_each(Traversal::PreOrder, |value| {
            if !other.contains(value) {
                result.insert(value.clone());
            }
        });
        result
    }

    /// Builds a new set from the transformed elements.
    /// Post-transform collisions collapse under the uniqueness guard.
    pub fn map<U, F>(&self, mut f: F) -> AvlTreeSet<U>
    where
        U: Ord,
        F: FnMut(&T) -> U,
    {
        let mut result = AvlTreeSet::new();
        self.for_each(Traversal::PreOrder, |value| {
            result.insert(f(value));
        });
        result
    }

    /// Builds a new set containing exactly the elements satisfying `pred`.
    pub fn filter<F>(&self, mut pred: F) -> Self
    where
        T: Clone,
        F: FnMut(&T) -> bool,
    {
        let mut result = Self::new();
        self.for_each(Traversal::PreOrder, |value| {
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

    /// Renders the elements in the given traversal order as `[v1, v2, ...]`.
    pub fn to_text(&self, order: Traversal) -> String
    where
        T: fmt::Display,
    {
        self.tree.to_text(order)
    }

    /// Parses a comma-separated literal list, with optional surrounding
    /// brackets. Repeated values collapse under the uniqueness guard.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidArgument`] on a malformed element or separator.
    pub fn from_text(text: &str) -> Result<Self>
    where
        T: FromStr,
    {
        let mut result = Self::new();
        for value in crate::avl::parse_values(text)? {
            result.insert(value);
        }
        Ok(result)
    }

    /// Asserts that the internal tree structure is consistent and holds no
    /// duplicate elements.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        self.tree.check_consistency();
        let mut previous: Option<&T> = None;
        for value in self.iter() {
            if let Some(previous) = previous {
                assert!(previous < value);
            }
            previous = Some(value);
        }
    }
}

impl<T: Ord> Default for AvlTreeSet<T> {
    /// Creates an empty set.
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + Clone> Clone for AvlTreeSet<T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<T: Ord> PartialEq for AvlTreeSet<T> {
    /// Two sets are equal when they hold the same members.
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|value| other.contains(value))
    }
}

impl<T: Ord> Eq for AvlTreeSet<T> {}

impl<T: Ord + fmt::Display> fmt::Display for AvlTreeSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_text(Traversal::InOrder))
    }
}

impl<T: Ord + FromStr> FromStr for AvlTreeSet<T> {
    type Err = crate::Error;

    fn from_str(text: &str) -> Result<Self> {
        Self::from_text(text)
    }
}

impl<T: Ord + fmt::Debug> fmt::Debug for AvlTreeSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Ord> FromIterator<T> for AvlTreeSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<T: Ord> Extend<T> for AvlTreeSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(|value| {
            self.insert(value);
        });
    }
}

impl<'a, T> IntoIterator for &'a AvlTreeSet<T>
where
    T: Ord,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
