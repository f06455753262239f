use crate::red_black_tree::Key;

/// A struct representing a key-value pair held by a tree node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry<U> {
    pub key: Key,
    pub value: U,
}
