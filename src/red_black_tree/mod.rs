//! Self-balancing binary search tree that uses a color bit to ensure that the tree remains
//! approximately balanced during insertions and deletions, extended with whole-tree
//! concatenation and splitting that maintain the red-black invariants.

mod node;
mod tree;

pub use self::node::{Key, NIL_KEY};
pub use self::tree::{
    ConcatError,
    RedBlackTree,
    RedBlackTreeIntoIter,
    RedBlackTreeIter,
    RedBlackTreeIterMut,
};

use std::error;
use std::fmt;
use std::result;

/// An enum representing the ways an operation on a red black tree can fail.
///
/// Every failure is detected before any structural mutation begins, so an operation that
/// returns an error leaves its tree exactly as it was.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The key is the reserved sentinel value and can never be stored in a tree.
    InvalidKey,
    /// No node with the requested key exists in the tree.
    NotFound,
    /// The boundary keys of the two trees violate the ordering required by `concat`.
    InvalidOrder,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidKey => write!(f, "key is the reserved sentinel value"),
            Error::NotFound => write!(f, "key not found in tree"),
            Error::InvalidOrder => write!(f, "tree boundary keys are out of order"),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;
