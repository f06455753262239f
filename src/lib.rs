//! A red-black tree over integer keys extended with whole-tree concatenation and splitting.
//!
//! The concatenation and split operations preserve every red-black invariant and run in
//! O(log n) and O(log^2 n) respectively, which makes the tree usable as the auxiliary
//! structure of self-adjusting trees that repeatedly cut and join preferred paths.

mod entry;
pub mod red_black_tree;
