use crate::entry::Entry;
use std::mem::ManuallyDrop;
use std::ptr;

/// The key type stored by the tree.
pub type Key = u64;

/// The key value reserved for the sentinel. It can never be stored in a tree; `insert` and
/// `concat` reject it with [`Error::InvalidKey`](crate::red_black_tree::Error).
pub const NIL_KEY: Key = u64::MAX;

/// An enum representing the color of a node in a red black tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Color {
    Red,
    Black,
}

/// A struct representing an internal node of a red black tree.
///
/// The sentinel aliased by every missing child and by the root's parent is the null pointer.
/// It is Black by definition and no code path ever writes through it; the fixup routines
/// carry the extra state the sentinel would otherwise hold.
pub struct Node<U> {
    pub entry: Entry<U>,
    pub color: Color,
    pub left: *mut Node<U>,
    pub right: *mut Node<U>,
    pub parent: *mut Node<U>,
}

impl<U> Node<U> {
    /// Allocates a detached Red node holding `key` and `value`, with every link bound to the
    /// sentinel.
    pub fn new(key: Key, value: U) -> *mut Self {
        Box::into_raw(Box::new(Node {
            entry: Entry { key, value },
            color: Color::Red,
            left: ptr::null_mut(),
            right: ptr::null_mut(),
            parent: ptr::null_mut(),
        }))
    }

    /// Releases the node's memory without dropping its entry. The caller must have moved the
    /// entry out beforehand.
    pub unsafe fn deallocate(ptr: *mut Self) {
        drop(Box::from_raw(ptr as *mut ManuallyDrop<Node<U>>));
    }

    pub unsafe fn free(ptr: *mut Self) {
        ptr::drop_in_place(&mut (*ptr).entry);
        Self::deallocate(ptr);
    }
}

pub unsafe fn is_red<U>(node: *mut Node<U>) -> bool {
    !node.is_null() && (*node).color == Color::Red
}

pub unsafe fn is_black<U>(node: *mut Node<U>) -> bool {
    !is_red(node)
}
