//! An ordered tree, an ordered set and a max-priority queue, all backed by
//! the same balancing machinery: an AVL tree whose nodes carry parent links.
//!
//! [`AvlTree`] keeps duplicates, [`AvlTreeSet`] rejects them, and
//! [`PriorityQueue`] orders arbitrary values by an integer key. Lookup,
//! insertion and removal are O(log n); iteration walks the parent links in
//! constant space.
//!
//! ```
//! use grove::{AvlTree, AvlTreeSet, PriorityQueue};
//!
//! let mut tree = AvlTree::new();
//! tree.insert(2);
//! tree.insert(2);
//! assert_eq!(tree.len(), 2);
//!
//! let mut set = AvlTreeSet::new();
//! set.insert(2);
//! set.insert(2);
//! assert_eq!(set.len(), 1);
//!
//! let mut queue = PriorityQueue::new();
//! queue.push("low", 1);
//! queue.push("high", 9);
//! assert_eq!(queue.pop(), Ok("high"));
//! ```

mod avl;
mod error;
mod queue;
mod set;
mod tree;

pub use avl::{AvlTree, Cursor, Iter};
pub use error::{Error, Result};
pub use queue::{PriorityQueue, Values};
pub use set::AvlTreeSet;
pub use tree::Traversal;
