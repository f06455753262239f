use crate::entry::Entry;
use crate::red_black_tree::node::{is_black, is_red, Color, Key, Node, NIL_KEY};
use crate::red_black_tree::{Error, Result};
use std::error;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Index, IndexMut};
use std::ptr;
use std::result;

/// An ordered map implemented by a red black tree that supports concatenation and splitting.
///
/// A red black tree is a self-balancing binary search tree that colors each node Red or Black
/// and maintains the invariants that no Red node has a Red child and that every root-to-leaf
/// path contains the same number of Black nodes. The count of Black nodes on such a path (the
/// black height) is kept up to date on every insertion and deletion so that two trees can be
/// concatenated in O(log n) time, and a tree can be split around a pivot in O(log^2 n) time,
/// without walking either tree.
///
/// Keys are `u64` values; `NIL_KEY` is reserved for the sentinel and is rejected on insertion.
///
/// # Examples
///
/// ```
/// use rb_concat_tree::red_black_tree::RedBlackTree;
///
/// let mut tree = RedBlackTree::new();
/// tree.insert(0, 1).unwrap();
/// tree.insert(3, 4).unwrap();
///
/// assert_eq!(tree.get(0), Some(&1));
/// assert_eq!(tree.get(1), None);
///
/// assert_eq!(tree.min(), Some(0));
/// assert_eq!(tree.max(), Some(3));
///
/// assert_eq!(tree.remove(0), Ok(1));
/// assert!(tree.remove(1).is_err());
/// ```
pub struct RedBlackTree<U> {
    root: *mut Node<U>,
    bh: usize,
}

impl<U> RedBlackTree<U> {
    /// Constructs a new, empty `RedBlackTree<U>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_concat_tree::red_black_tree::RedBlackTree;
    ///
    /// let tree: RedBlackTree<u32> = RedBlackTree::new();
    /// ```
    pub fn new() -> Self {
        RedBlackTree {
            root: ptr::null_mut(),
            bh: 0,
        }
    }

    /// Returns `true` if the tree is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_concat_tree::red_black_tree::RedBlackTree;
    ///
    /// let tree: RedBlackTree<u32> = RedBlackTree::new();
    /// assert!(tree.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.root.is_null()
    }

    /// Returns the black height of the tree: the number of Black nodes on any path from the
    /// root to a leaf. The value is maintained incrementally, so this is O(1).
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_concat_tree::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// for key in &[10, 20, 5, 7] {
    ///     tree.insert(*key, ()).unwrap();
    /// }
    /// assert_eq!(tree.black_height(), 2);
    /// ```
    pub fn black_height(&self) -> usize {
        self.bh
    }

    /// Returns an immutable reference to the value associated with a particular key. It will
    /// return `None` if the key does not exist in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_concat_tree::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(1, 1).unwrap();
    /// assert_eq!(tree.get(0), None);
    /// assert_eq!(tree.get(1), Some(&1));
    /// ```
    pub fn get(&self, key: Key) -> Option<&U> {
        unsafe { self.find_node(key).as_ref().map(|node| &node.entry.value) }
    }

    /// Returns a mutable reference to the value associated with a particular key. Returns
    /// `None` if such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_concat_tree::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(1, 1).unwrap();
    /// *tree.get_mut(1).unwrap() = 2;
    /// assert_eq!(tree.get(1), Some(&2));
    /// ```
    pub fn get_mut(&mut self, key: Key) -> Option<&mut U> {
        unsafe { self.find_node(key).as_mut().map(|node| &mut node.entry.value) }
    }

    /// Checks if a key exists in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_concat_tree::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(1, 1).unwrap();
    /// assert!(!tree.contains_key(0));
    /// assert!(tree.contains_key(1));
    /// ```
    pub fn contains_key(&self, key: Key) -> bool {
        unsafe { !self.find_node(key).is_null() }
    }

    /// Inserts a key-value pair into the tree. If the key already exists, the old value is
    /// replaced and returned without any structural change. Returns `Error::InvalidKey` if
    /// `key` is the reserved sentinel value; the tree is untouched in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_concat_tree::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// assert_eq!(tree.insert(1, 1), Ok(None));
    /// assert_eq!(tree.get(1), Some(&1));
    /// assert_eq!(tree.insert(1, 2), Ok(Some(1)));
    /// assert_eq!(tree.get(1), Some(&2));
    /// ```
    pub fn insert(&mut self, key: Key, value: U) -> Result<Option<U>> {
        if key == NIL_KEY {
            return Err(Error::InvalidKey);
        }
        unsafe {
            let mut parent = ptr::null_mut();
            let mut curr = self.root;
            while !curr.is_null() {
                if key == (*curr).entry.key {
                    return Ok(Some(mem::replace(&mut (*curr).entry.value, value)));
                }
                parent = curr;
                curr = if key < (*curr).entry.key {
                    (*curr).left
                } else {
                    (*curr).right
                };
            }

            let z = Node::new(key, value);
            (*z).parent = parent;
            if parent.is_null() {
                self.root = z;
            } else if key < (*parent).entry.key {
                (*parent).left = z;
            } else {
                (*parent).right = z;
            }
            self.insert_fixup(z);
            Ok(None)
        }
    }

    /// Removes a key-value pair from the tree and returns the value. Returns
    /// `Error::NotFound` if the key does not exist; the tree is untouched in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_concat_tree::red_black_tree::{Error, RedBlackTree};
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(1, 1).unwrap();
    /// assert_eq!(tree.remove(1), Ok(1));
    /// assert_eq!(tree.remove(1), Err(Error::NotFound));
    /// ```
    pub fn remove(&mut self, key: Key) -> Result<U> {
        unsafe {
            let z = self.find_node(key);
            if z.is_null() {
                return Err(Error::NotFound);
            }
            self.remove_node(z);
            let Entry { value, .. } = ptr::read(&(*z).entry);
            Node::deallocate(z);
            Ok(value)
        }
    }

    /// Returns the minimum key of the tree. Returns `None` if the tree is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_concat_tree::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// for key in &[10, 35, 5, 22] {
    ///     tree.insert(*key, ()).unwrap();
    /// }
    /// assert_eq!(tree.min(), Some(5));
    /// ```
    pub fn min(&self) -> Option<Key> {
        if self.root.is_null() {
            None
        } else {
            unsafe { Some((*Self::min_node(self.root)).entry.key) }
        }
    }

    /// Returns the maximum key of the tree. Returns `None` if the tree is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_concat_tree::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// for key in &[10, 35, 5, 22] {
    ///     tree.insert(*key, ()).unwrap();
    /// }
    /// assert_eq!(tree.max(), Some(35));
    /// ```
    pub fn max(&self) -> Option<Key> {
        if self.root.is_null() {
            None
        } else {
            unsafe { Some((*Self::max_node(self.root)).entry.key) }
        }
    }

    /// Returns the smallest key in the tree strictly greater than `key`. Returns `None` if
    /// `key` is the maximum, or if `key` is not in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_concat_tree::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// for key in &[10, 35, 5, 22] {
    ///     tree.insert(*key, ()).unwrap();
    /// }
    /// assert_eq!(tree.successor(10), Some(22));
    /// assert_eq!(tree.successor(35), None);
    /// ```
    pub fn successor(&self, key: Key) -> Option<Key> {
        unsafe {
            let node = self.find_node(key);
            if node.is_null() {
                return None;
            }
            let succ = Self::successor_node(node);
            if succ.is_null() {
                None
            } else {
                Some((*succ).entry.key)
            }
        }
    }

    /// Returns the largest key in the tree strictly less than `key`. Returns `None` if `key`
    /// is the minimum, or if `key` is not in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_concat_tree::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// for key in &[10, 35, 5, 22] {
    ///     tree.insert(*key, ()).unwrap();
    /// }
    /// assert_eq!(tree.predecessor(22), Some(10));
    /// assert_eq!(tree.predecessor(5), None);
    /// ```
    pub fn predecessor(&self, key: Key) -> Option<Key> {
        unsafe {
            let node = self.find_node(key);
            if node.is_null() {
                return None;
            }
            let pred = Self::predecessor_node(node);
            if pred.is_null() {
                None
            } else {
                Some((*pred).entry.key)
            }
        }
    }

    /// Returns the black height of the node holding `key`: the number of Black nodes on any
    /// path from that node down to a leaf, counting the node itself. Returns
    /// `Error::NotFound` if the key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_concat_tree::red_black_tree::{Error, RedBlackTree};
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(1, 1).unwrap();
    /// assert_eq!(tree.black_height_at(1), Ok(1));
    /// assert_eq!(tree.black_height_at(2), Err(Error::NotFound));
    /// ```
    pub fn black_height_at(&self, key: Key) -> Result<usize> {
        unsafe {
            let mut bh = self.bh;
            let mut node = self.root;
            while !node.is_null() {
                if key == (*node).entry.key {
                    return Ok(bh);
                }
                if (*node).color == Color::Black {
                    bh -= 1;
                }
                node = if key < (*node).entry.key {
                    (*node).left
                } else {
                    (*node).right
                };
            }
            Err(Error::NotFound)
        }
    }

    /// Concatenates two trees around a middle key-value pair, consuming both trees. Every key
    /// of `t1` must be less than or equal to `key`, and `key` must be less than or equal to
    /// every key of `t2`; a boundary key equal to `key` is collapsed into the middle pair,
    /// which keeps the supplied value. The middle node is spliced in at equal black height
    /// and repaired with the ordinary insertion fixup, so the whole operation is O(log n).
    ///
    /// On failure the error hands both trees and the value back unmodified.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_concat_tree::red_black_tree::RedBlackTree;
    ///
    /// let mut t1 = RedBlackTree::new();
    /// t1.insert(1, 10).unwrap();
    /// t1.insert(2, 20).unwrap();
    ///
    /// let mut t2 = RedBlackTree::new();
    /// t2.insert(7, 70).unwrap();
    /// t2.insert(8, 80).unwrap();
    ///
    /// let tree = RedBlackTree::concat(t1, t2, 5, 50).unwrap();
    /// let keys: Vec<u64> = tree.iter().map(|(key, _)| key).collect();
    /// assert_eq!(keys, vec![1, 2, 5, 7, 8]);
    /// assert_eq!(tree.get(5), Some(&50));
    /// ```
    pub fn concat(
        t1: Self,
        t2: Self,
        key: Key,
        value: U,
    ) -> result::Result<Self, ConcatError<U>> {
        if key == NIL_KEY {
            return Err(ConcatError::new(Error::InvalidKey, t1, t2, value));
        }
        if t1.max().map_or(false, |max| max > key) || t2.min().map_or(false, |min| min < key) {
            return Err(ConcatError::new(Error::InvalidOrder, t1, t2, value));
        }

        let mut t1 = t1;
        let mut t2 = t2;
        if t1.max() == Some(key) {
            let _ = t1.remove(key);
        }
        if t2.min() == Some(key) {
            let _ = t2.remove(key);
        }

        let x = Node::new(key, value);
        unsafe { Ok(Self::join(t1, t2, x)) }
    }

    /// Splits the tree around `pivot`, consuming it. The first returned tree holds every key
    /// less than or equal to the pivot, the second every key greater than the pivot. Every
    /// node of the input ends up in exactly one of the outputs; subtrees hanging off the
    /// search path are grafted wholesale, so the operation is O(log^2 n).
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_concat_tree::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// for key in 1..=4 {
    ///     tree.insert(key, key * 10).unwrap();
    /// }
    ///
    /// let (lower, upper) = tree.split(2);
    /// let lower_keys: Vec<u64> = lower.iter().map(|(key, _)| key).collect();
    /// let upper_keys: Vec<u64> = upper.iter().map(|(key, _)| key).collect();
    /// assert_eq!(lower_keys, vec![1, 2]);
    /// assert_eq!(upper_keys, vec![3, 4]);
    /// ```
    pub fn split(mut self, pivot: Key) -> (Self, Self) {
        unsafe {
            // Record the search path together with the count of Black nodes strictly below
            // each visited node, which is the standalone black height of its subtrees.
            let mut path = Vec::new();
            let mut bh = self.bh;
            let mut node = self.root;
            while !node.is_null() {
                if (*node).color == Color::Black {
                    bh -= 1;
                }
                path.push((node, bh));
                node = if pivot < (*node).entry.key {
                    (*node).left
                } else {
                    (*node).right
                };
            }
            self.root = ptr::null_mut();
            self.bh = 0;

            // Rebuild bottom-up: each path node becomes the middle element of a join between
            // the accumulated half and its off-path subtree.
            let mut lower = RedBlackTree::new();
            let mut upper = RedBlackTree::new();
            for (k, below) in path.into_iter().rev() {
                if pivot < (*k).entry.key {
                    let right = Self::from_subtree((*k).right, below);
                    Self::detach(k);
                    upper = Self::join(upper, right, k);
                } else {
                    let left = Self::from_subtree((*k).left, below);
                    Self::detach(k);
                    lower = Self::join(left, lower, k);
                }
            }
            (lower, upper)
        }
    }

    /// Clears the tree, removing all values.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_concat_tree::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(1, 1).unwrap();
    /// tree.insert(2, 2).unwrap();
    /// tree.clear();
    /// assert!(tree.is_empty());
    /// ```
    pub fn clear(&mut self) {
        unsafe {
            Self::free_subtree(self.root);
        }
        self.root = ptr::null_mut();
        self.bh = 0;
    }

    /// Returns an iterator over the tree. The iterator will yield key-value pairs in
    /// ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_concat_tree::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(1, 10).unwrap();
    /// tree.insert(2, 20).unwrap();
    ///
    /// let mut iterator = tree.iter();
    /// assert_eq!(iterator.next(), Some((1, &10)));
    /// assert_eq!(iterator.next(), Some((2, &20)));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> RedBlackTreeIter<'_, U> {
        RedBlackTreeIter {
            current: if self.root.is_null() {
                ptr::null_mut()
            } else {
                unsafe { Self::min_node(self.root) }
            },
            _marker: PhantomData,
        }
    }

    /// Returns a mutable iterator over the tree. The iterator will yield key-value pairs in
    /// ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_concat_tree::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(1, 10).unwrap();
    /// tree.insert(2, 20).unwrap();
    ///
    /// for (_, value) in tree.iter_mut() {
    ///     *value += 1;
    /// }
    ///
    /// assert_eq!(tree.get(1), Some(&11));
    /// assert_eq!(tree.get(2), Some(&21));
    /// ```
    pub fn iter_mut(&mut self) -> RedBlackTreeIterMut<'_, U> {
        RedBlackTreeIterMut {
            current: if self.root.is_null() {
                ptr::null_mut()
            } else {
                unsafe { Self::min_node(self.root) }
            },
            _marker: PhantomData,
        }
    }

    unsafe fn find_node(&self, key: Key) -> *mut Node<U> {
        let mut node = self.root;
        while !node.is_null() && key != (*node).entry.key {
            node = if key < (*node).entry.key {
                (*node).left
            } else {
                (*node).right
            };
        }
        node
    }

    // precondition: `node` is non-null
    unsafe fn min_node(mut node: *mut Node<U>) -> *mut Node<U> {
        while !(*node).left.is_null() {
            node = (*node).left;
        }
        node
    }

    // precondition: `node` is non-null
    unsafe fn max_node(mut node: *mut Node<U>) -> *mut Node<U> {
        while !(*node).right.is_null() {
            node = (*node).right;
        }
        node
    }

    unsafe fn successor_node(node: *mut Node<U>) -> *mut Node<U> {
        if !(*node).right.is_null() {
            return Self::min_node((*node).right);
        }
        let mut x = node;
        let mut y = (*x).parent;
        while !y.is_null() && x == (*y).right {
            x = y;
            y = (*y).parent;
        }
        y
    }

    unsafe fn predecessor_node(node: *mut Node<U>) -> *mut Node<U> {
        if !(*node).left.is_null() {
            return Self::max_node((*node).left);
        }
        let mut x = node;
        let mut y = (*x).parent;
        while !y.is_null() && x == (*y).left {
            x = y;
            y = (*y).parent;
        }
        y
    }

    unsafe fn left_rotate(&mut self, x: *mut Node<U>) {
        let y = (*x).right;
        (*x).right = (*y).left;
        if !(*y).left.is_null() {
            (*(*y).left).parent = x;
        }
        (*y).parent = (*x).parent;
        if (*x).parent.is_null() {
            self.root = y;
        } else if x == (*(*x).parent).left {
            (*(*x).parent).left = y;
        } else {
            (*(*x).parent).right = y;
        }
        (*y).left = x;
        (*x).parent = y;
    }

    unsafe fn right_rotate(&mut self, y: *mut Node<U>) {
        let x = (*y).left;
        (*y).left = (*x).right;
        if !(*x).right.is_null() {
            (*(*x).right).parent = y;
        }
        (*x).parent = (*y).parent;
        if (*y).parent.is_null() {
            self.root = x;
        } else if y == (*(*y).parent).right {
            (*(*y).parent).right = x;
        } else {
            (*(*y).parent).left = x;
        }
        (*x).right = y;
        (*y).parent = x;
    }

    // Replaces the subtree rooted at `u` with the subtree rooted at `v`. Unlike the textbook
    // version there is no sentinel to store the parent into when `v` is a leaf; removal
    // tracks the deficient position's parent explicitly instead.
    unsafe fn transplant(&mut self, u: *mut Node<U>, v: *mut Node<U>) {
        if (*u).parent.is_null() {
            self.root = v;
        } else if u == (*(*u).parent).left {
            (*(*u).parent).left = v;
        } else {
            (*(*u).parent).right = v;
        }
        if !v.is_null() {
            (*v).parent = (*u).parent;
        }
    }

    unsafe fn insert_fixup(&mut self, mut z: *mut Node<U>) {
        while is_red((*z).parent) {
            let parent = (*z).parent;
            let grandparent = (*parent).parent;
            if parent == (*grandparent).left {
                let uncle = (*grandparent).right;
                if is_red(uncle) {
                    (*parent).color = Color::Black;
                    (*uncle).color = Color::Black;
                    (*grandparent).color = Color::Red;
                    z = grandparent;
                } else {
                    if z == (*parent).right {
                        z = parent;
                        self.left_rotate(z);
                    }
                    (*(*z).parent).color = Color::Black;
                    (*grandparent).color = Color::Red;
                    self.right_rotate(grandparent);
                }
            } else {
                let uncle = (*grandparent).left;
                if is_red(uncle) {
                    (*parent).color = Color::Black;
                    (*uncle).color = Color::Black;
                    (*grandparent).color = Color::Red;
                    z = grandparent;
                } else {
                    if z == (*parent).left {
                        z = parent;
                        self.right_rotate(z);
                    }
                    (*(*z).parent).color = Color::Black;
                    (*grandparent).color = Color::Red;
                    self.left_rotate(grandparent);
                }
            }
        }

        // The tree gains a black level exactly when the root must be forced Black.
        if is_red(self.root) {
            self.bh += 1;
            (*self.root).color = Color::Black;
        }
    }

    // Splices a detached node in as a leaf at its ordered position and rebalances. The
    // node's key must not already be present.
    unsafe fn insert_node(&mut self, z: *mut Node<U>) {
        let key = (*z).entry.key;
        let mut parent = ptr::null_mut();
        let mut curr = self.root;
        while !curr.is_null() {
            parent = curr;
            curr = if key < (*curr).entry.key {
                (*curr).left
            } else {
                (*curr).right
            };
        }

        (*z).left = ptr::null_mut();
        (*z).right = ptr::null_mut();
        (*z).color = Color::Red;
        (*z).parent = parent;
        if parent.is_null() {
            self.root = z;
        } else if key < (*parent).entry.key {
            (*parent).left = z;
        } else {
            (*parent).right = z;
        }
        self.insert_fixup(z);
    }

    // Unlinks `z` from the tree and rebalances. `z` itself is left fully detached with its
    // entry intact; the caller decides whether to free or reuse it.
    unsafe fn remove_node(&mut self, z: *mut Node<U>) {
        let mut y = z;
        let mut y_color = (*y).color;
        let x;
        let x_parent;

        if (*z).left.is_null() {
            x = (*z).right;
            x_parent = (*z).parent;
            self.transplant(z, (*z).right);
        } else if (*z).right.is_null() {
            x = (*z).left;
            x_parent = (*z).parent;
            self.transplant(z, (*z).left);
        } else {
            y = Self::min_node((*z).right);
            y_color = (*y).color;
            x = (*y).right;
            if (*y).parent == z {
                x_parent = y;
            } else {
                x_parent = (*y).parent;
                self.transplant(y, (*y).right);
                (*y).right = (*z).right;
                (*(*y).right).parent = y;
            }
            self.transplant(z, y);
            (*y).left = (*z).left;
            (*(*y).left).parent = y;
            (*y).color = (*z).color;
        }

        if y_color == Color::Black {
            self.delete_fixup(x, x_parent);
        }
    }

    // Restores the red-black invariants after a Black node has been unlinked. `x` marks the
    // position carrying the black deficiency and may be a leaf, so its parent is tracked
    // separately.
    unsafe fn delete_fixup(&mut self, mut x: *mut Node<U>, mut parent: *mut Node<U>) {
        let mut resolved = false;
        while x != self.root && is_black(x) {
            if x == (*parent).left {
                let mut w = (*parent).right;
                if is_red(w) {
                    (*w).color = Color::Black;
                    (*parent).color = Color::Red;
                    self.left_rotate(parent);
                    w = (*parent).right;
                }
                if is_black((*w).left) && is_black((*w).right) {
                    (*w).color = Color::Red;
                    x = parent;
                    parent = (*x).parent;
                } else {
                    if is_black((*w).right) {
                        (*(*w).left).color = Color::Black;
                        (*w).color = Color::Red;
                        self.right_rotate(w);
                        w = (*parent).right;
                    }
                    (*w).color = (*parent).color;
                    (*parent).color = Color::Black;
                    (*(*w).right).color = Color::Black;
                    self.left_rotate(parent);
                    x = self.root;
                    resolved = true;
                }
            } else {
                let mut w = (*parent).left;
                if is_red(w) {
                    (*w).color = Color::Black;
                    (*parent).color = Color::Red;
                    self.right_rotate(parent);
                    w = (*parent).left;
                }
                if is_black((*w).right) && is_black((*w).left) {
                    (*w).color = Color::Red;
                    x = parent;
                    parent = (*x).parent;
                } else {
                    if is_black((*w).left) {
                        (*(*w).right).color = Color::Black;
                        (*w).color = Color::Red;
                        self.left_rotate(w);
                        w = (*parent).left;
                    }
                    (*w).color = (*parent).color;
                    (*parent).color = Color::Black;
                    (*(*w).left).color = Color::Black;
                    self.right_rotate(parent);
                    x = self.root;
                    resolved = true;
                }
            }
        }

        // Every root-to-leaf path loses a black node exactly when the deficiency propagates
        // all the way up unabsorbed: no rotation resolved it and the loop stopped at the
        // root while the deficient position was still Black. A Red position absorbs the
        // deficiency when it is blackened below, and the emptied tree ends here as well
        // since the leaf that became the root counts as Black.
        if !resolved && is_black(x) {
            self.bh -= 1;
        }
        if !x.is_null() {
            (*x).color = Color::Black;
        }
    }

    // Joins two trees around the detached node `x`, assuming every key of `t1` is less than
    // `x` and every key of `t2` is greater. Consumes both trees.
    unsafe fn join(mut t1: Self, mut t2: Self, x: *mut Node<U>) -> Self {
        if t1.root.is_null() {
            t2.insert_node(x);
            return t2;
        }
        if t2.root.is_null() {
            t1.insert_node(x);
            return t1;
        }

        if t1.bh >= t2.bh {
            // Walk the right spine of the taller tree until reaching a Black node whose
            // black height matches the shorter tree, then splice `x` in above it.
            let mut y = t1.root;
            let mut bh = t1.bh;
            while bh != t2.bh {
                y = if (*y).right.is_null() {
                    (*y).left
                } else {
                    (*y).right
                };
                if (*y).color == Color::Black {
                    bh -= 1;
                }
            }

            t1.transplant(y, x);
            (*x).left = y;
            (*y).parent = x;
            (*x).right = t2.root;
            (*t2.root).parent = x;
            (*x).color = Color::Red;
            t1.insert_fixup(x);

            t2.root = ptr::null_mut();
            t2.bh = 0;
            t1
        } else {
            let mut y = t2.root;
            let mut bh = t2.bh;
            while bh != t1.bh {
                y = if (*y).left.is_null() {
                    (*y).right
                } else {
                    (*y).left
                };
                if (*y).color == Color::Black {
                    bh -= 1;
                }
            }

            t2.transplant(y, x);
            (*x).right = y;
            (*y).parent = x;
            (*x).left = t1.root;
            (*t1.root).parent = x;
            (*x).color = Color::Red;
            t2.insert_fixup(x);

            t1.root = ptr::null_mut();
            t1.bh = 0;
            t2
        }
    }

    // Wraps a detached subtree as a standalone tree. `bh` is the count of Black nodes on any
    // path from `root` down to a leaf, counting `root` itself; blackening a Red subtree root
    // adds one level.
    unsafe fn from_subtree(root: *mut Node<U>, bh: usize) -> Self {
        if root.is_null() {
            return RedBlackTree::new();
        }
        (*root).parent = ptr::null_mut();
        let bh = if (*root).color == Color::Red {
            (*root).color = Color::Black;
            bh + 1
        } else {
            bh
        };
        RedBlackTree { root, bh }
    }

    unsafe fn detach(node: *mut Node<U>) {
        (*node).left = ptr::null_mut();
        (*node).right = ptr::null_mut();
        (*node).parent = ptr::null_mut();
    }

    unsafe fn free_subtree(node: *mut Node<U>) {
        if node.is_null() {
            return;
        }
        Self::free_subtree((*node).left);
        Self::free_subtree((*node).right);
        Node::free(node);
    }
}

impl<U> Drop for RedBlackTree<U> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<U> Default for RedBlackTree<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> fmt::Debug for RedBlackTree<U>
where
    U: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<U> Index<Key> for RedBlackTree<U> {
    type Output = U;

    fn index(&self, key: Key) -> &Self::Output {
        self.get(key).expect("Key does not exist.")
    }
}

impl<U> IndexMut<Key> for RedBlackTree<U> {
    fn index_mut(&mut self, key: Key) -> &mut Self::Output {
        self.get_mut(key).expect("Key does not exist.")
    }
}

impl<U> IntoIterator for RedBlackTree<U> {
    type IntoIter = RedBlackTreeIntoIter<U>;
    type Item = (Key, U);

    fn into_iter(mut self) -> Self::IntoIter {
        let root = self.root;
        self.root = ptr::null_mut();
        self.bh = 0;
        RedBlackTreeIntoIter { current: root }
    }
}

impl<'a, U> IntoIterator for &'a RedBlackTree<U> {
    type IntoIter = RedBlackTreeIter<'a, U>;
    type Item = (Key, &'a U);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, U> IntoIterator for &'a mut RedBlackTree<U> {
    type IntoIter = RedBlackTreeIterMut<'a, U>;
    type Item = (Key, &'a mut U);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// An owning iterator for `RedBlackTree<U>`.
///
/// This iterator traverses the elements of the tree in ascending key order and yields owned
/// entries. The tree is dismantled as the iterator advances; balance no longer matters, so
/// nodes with a left child are rotated instead of rebalanced.
pub struct RedBlackTreeIntoIter<U> {
    current: *mut Node<U>,
}

impl<U> Iterator for RedBlackTreeIntoIter<U> {
    type Item = (Key, U);

    fn next(&mut self) -> Option<Self::Item> {
        unsafe {
            while !self.current.is_null() {
                let node = self.current;
                if (*node).left.is_null() {
                    self.current = (*node).right;
                    let Entry { key, value } = ptr::read(&(*node).entry);
                    Node::deallocate(node);
                    return Some((key, value));
                }
                let left = (*node).left;
                (*node).left = (*left).right;
                (*left).right = node;
                self.current = left;
            }
            None
        }
    }
}

impl<U> Drop for RedBlackTreeIntoIter<U> {
    fn drop(&mut self) {
        while self.next().is_some() {}
    }
}

/// An iterator for `RedBlackTree<U>`.
///
/// This iterator traverses the elements of the tree in ascending key order and yields
/// immutable references.
pub struct RedBlackTreeIter<'a, U> {
    current: *mut Node<U>,
    _marker: PhantomData<&'a Entry<U>>,
}

impl<'a, U> Iterator for RedBlackTreeIter<'a, U> {
    type Item = (Key, &'a U);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_null() {
            None
        } else {
            unsafe {
                let node = self.current;
                self.current = RedBlackTree::successor_node(node);
                let entry = &(*node).entry;
                Some((entry.key, &entry.value))
            }
        }
    }
}

/// A mutable iterator for `RedBlackTree<U>`.
///
/// This iterator traverses the elements of the tree in ascending key order and yields
/// mutable references.
pub struct RedBlackTreeIterMut<'a, U> {
    current: *mut Node<U>,
    _marker: PhantomData<&'a mut Entry<U>>,
}

impl<'a, U> Iterator for RedBlackTreeIterMut<'a, U> {
    type Item = (Key, &'a mut U);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_null() {
            None
        } else {
            unsafe {
                let node = self.current;
                self.current = RedBlackTree::successor_node(node);
                let entry = &mut (*node).entry;
                Some((entry.key, &mut entry.value))
            }
        }
    }
}

/// An error returned by a failed [`RedBlackTree::concat`].
///
/// Concatenation consumes its inputs, so the error carries both trees and the middle value
/// back to the caller untouched.
pub struct ConcatError<U> {
    kind: Error,
    left: RedBlackTree<U>,
    right: RedBlackTree<U>,
    value: U,
}

impl<U> ConcatError<U> {
    fn new(kind: Error, left: RedBlackTree<U>, right: RedBlackTree<U>, value: U) -> Self {
        ConcatError {
            kind,
            left,
            right,
            value,
        }
    }

    /// Returns the kind of failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_concat_tree::red_black_tree::{Error, RedBlackTree};
    ///
    /// let mut t1 = RedBlackTree::new();
    /// t1.insert(1, 1).unwrap();
    /// t1.insert(5, 5).unwrap();
    ///
    /// let mut t2 = RedBlackTree::new();
    /// t2.insert(3, 3).unwrap();
    ///
    /// let err = RedBlackTree::concat(t1, t2, 2, 2).unwrap_err();
    /// assert_eq!(err.kind(), Error::InvalidOrder);
    ///
    /// let (t1, t2, _value) = err.into_inner();
    /// assert_eq!(t1.max(), Some(5));
    /// assert_eq!(t2.min(), Some(3));
    /// ```
    pub fn kind(&self) -> Error {
        self.kind
    }

    /// Consumes the error, returning the two input trees and the middle value.
    pub fn into_inner(self) -> (RedBlackTree<U>, RedBlackTree<U>, U) {
        (self.left, self.right, self.value)
    }
}

impl<U> fmt::Debug for ConcatError<U> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ConcatError")
            .field("kind", &self.kind)
            .finish()
    }
}

impl<U> fmt::Display for ConcatError<U> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl<U> error::Error for ConcatError<U> {}
