//! Left-leaning red-black tree with an injected comparator.
//!
//! The tree orders its keys through a [`Comparator`] object owned by
//! the tree. The comparator may carry external state (such as the
//! current position of a sweep line) that is updated between
//! operations through [`RedBlackTree::comparator_mut`]. Callers must
//! only change that state in ways that keep the relative order of the
//! stored keys intact.
//!
//! Nodes live in a [`Slab`] arena and link to each other by index.
//! Besides key based lookups, every query has a `*_by` variant that
//! takes a probe `FnMut(&K) -> Ordering` returning the ordering of a
//! stored key relative to the (implicit) target, in the same manner as
//! [`slice::binary_search_by`].
use std::{cmp::Ordering, fmt::Debug, mem};

use itertools::Itertools;
use slab::Slab;

/// Total order on keys of type `K`.
pub trait Comparator<K> {
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Comparator that uses the `Ord` impl of the keys.
#[derive(Debug, Default, Clone, Copy)]
pub struct Natural;

impl<K: Ord> Comparator<K> for Natural {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

impl Color {
    #[inline]
    fn flip(self) -> Self {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }
}

type Link = Option<usize>;

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Link,
    right: Link,
    color: Color,
}

/// Node storage and the link manipulations of the LLRB algorithms.
///
/// None of these methods look at the comparator; ordering decisions
/// come in through probes.
struct Arena<K, V>(Slab<Node<K, V>>);

impl<K, V> Arena<K, V> {
    #[inline]
    fn is_red(&self, link: Link) -> bool {
        link.map_or(false, |h| self.0[h].color == Color::Red)
    }

    #[inline]
    fn left(&self, link: Link) -> Link {
        link.and_then(|h| self.0[h].left)
    }

    #[inline]
    fn entry(&self, h: usize) -> (&K, &V) {
        let node = &self.0[h];
        (&node.key, &node.value)
    }

    fn rotate_left(&mut self, h: usize) -> usize {
        let x = self.0[h]
            .right
            .expect("rotate_left on a node without right child");
        self.0[h].right = self.0[x].left;
        self.0[x].left = Some(h);
        self.0[x].color = self.0[h].color;
        self.0[h].color = Color::Red;
        x
    }

    fn rotate_right(&mut self, h: usize) -> usize {
        let x = self.0[h]
            .left
            .expect("rotate_right on a node without left child");
        self.0[h].left = self.0[x].right;
        self.0[x].right = Some(h);
        self.0[x].color = self.0[h].color;
        self.0[h].color = Color::Red;
        x
    }

    #[inline]
    fn flip(&mut self, link: Link) {
        if let Some(x) = link {
            let node = &mut self.0[x];
            node.color = node.color.flip();
        }
    }

    fn flip_colors(&mut self, h: usize) {
        self.flip(Some(h));
        self.flip(self.0[h].left);
        self.flip(self.0[h].right);
    }

    /// Assuming `h` is red and both `h.left` and `h.left.left` are
    /// black, make `h.left` or one of its children red.
    fn move_red_left(&mut self, mut h: usize) -> usize {
        self.flip_colors(h);
        let right = self.0[h].right;
        if self.is_red(self.left(right)) {
            let right = right.expect("red grandchild without parent");
            let rotated = self.rotate_right(right);
            self.0[h].right = Some(rotated);
            h = self.rotate_left(h);
            self.flip_colors(h);
        }
        h
    }

    /// Assuming `h` is red and both `h.right` and `h.right.left` are
    /// black, make `h.right` or one of its children red.
    fn move_red_right(&mut self, mut h: usize) -> usize {
        self.flip_colors(h);
        if self.is_red(self.left(self.0[h].left)) {
            h = self.rotate_right(h);
            self.flip_colors(h);
        }
        h
    }

    /// Restore the left-leaning invariants at `h`.
    fn balance(&mut self, mut h: usize) -> usize {
        if self.is_red(self.0[h].right) && !self.is_red(self.0[h].left) {
            h = self.rotate_left(h);
        }
        let left = self.0[h].left;
        if self.is_red(left) && self.is_red(self.left(left)) {
            h = self.rotate_right(h);
        }
        if self.is_red(self.0[h].left) && self.is_red(self.0[h].right) {
            self.flip_colors(h);
        }
        h
    }

    fn put<C: Comparator<K>>(
        &mut self,
        link: Link,
        key: K,
        value: V,
        cmp: &C,
        old: &mut Option<V>,
    ) -> usize {
        let h = match link {
            Some(h) => h,
            None => {
                return self.0.insert(Node {
                    key,
                    value,
                    left: None,
                    right: None,
                    color: Color::Red,
                })
            }
        };

        match cmp.compare(&key, &self.0[h].key) {
            Ordering::Less => {
                let left = self.0[h].left;
                let left = self.put(left, key, value, cmp, old);
                self.0[h].left = Some(left);
            }
            Ordering::Greater => {
                let right = self.0[h].right;
                let right = self.put(right, key, value, cmp, old);
                self.0[h].right = Some(right);
            }
            Ordering::Equal => {
                *old = Some(mem::replace(&mut self.0[h].value, value));
            }
        }
        self.balance(h)
    }

    fn delete_min(&mut self, mut h: usize) -> (Link, (K, V)) {
        if self.0[h].left.is_none() {
            let node = self.0.remove(h);
            return (node.right, (node.key, node.value));
        }
        let left = self.0[h].left;
        if !self.is_red(left) && !self.is_red(self.left(left)) {
            h = self.move_red_left(h);
        }
        let left = self.0[h].left.expect("left subtree vanished in delete_min");
        let (left, removed) = self.delete_min(left);
        self.0[h].left = left;
        (Some(self.balance(h)), removed)
    }

    fn delete_max(&mut self, mut h: usize) -> (Link, (K, V)) {
        if self.is_red(self.0[h].left) {
            h = self.rotate_right(h);
        }
        if self.0[h].right.is_none() {
            let node = self.0.remove(h);
            return (node.left, (node.key, node.value));
        }
        let right = self.0[h].right;
        if !self.is_red(right) && !self.is_red(self.left(right)) {
            h = self.move_red_right(h);
        }
        let right = self.0[h].right.expect("right subtree vanished in delete_max");
        let (right, removed) = self.delete_max(right);
        self.0[h].right = right;
        (Some(self.balance(h)), removed)
    }

    /// Delete a key matching `probe` from the subtree at `h`.
    ///
    /// A matching key must exist in the subtree.
    fn delete<F: FnMut(&K) -> Ordering>(
        &mut self,
        mut h: usize,
        probe: &mut F,
    ) -> (Link, Option<(K, V)>) {
        let removed;
        if probe(&self.0[h].key) == Ordering::Greater {
            let left = self.0[h].left;
            if !self.is_red(left) && !self.is_red(self.left(left)) {
                h = self.move_red_left(h);
            }
            removed = match self.0[h].left {
                Some(left) => {
                    let (left, removed) = self.delete(left, probe);
                    self.0[h].left = left;
                    removed
                }
                None => None,
            };
        } else {
            if self.is_red(self.0[h].left) {
                h = self.rotate_right(h);
            }
            if probe(&self.0[h].key) == Ordering::Equal && self.0[h].right.is_none() {
                let node = self.0.remove(h);
                return (node.left, Some((node.key, node.value)));
            }
            let right = self.0[h].right;
            if !self.is_red(right) && !self.is_red(self.left(right)) {
                h = self.move_red_right(h);
            }
            if probe(&self.0[h].key) == Ordering::Equal {
                // Replace with the in-order successor.
                let right = self.0[h].right.expect("internal node without successor");
                let (right, (key, value)) = self.delete_min(right);
                self.0[h].right = right;
                let node = &mut self.0[h];
                removed = Some((
                    mem::replace(&mut node.key, key),
                    mem::replace(&mut node.value, value),
                ));
            } else {
                removed = match self.0[h].right {
                    Some(right) => {
                        let (right, removed) = self.delete(right, probe);
                        self.0[h].right = right;
                        removed
                    }
                    None => None,
                };
            }
        }
        (Some(self.balance(h)), removed)
    }

    fn find<F: FnMut(&K) -> Ordering>(&self, mut link: Link, probe: &mut F) -> Link {
        while let Some(h) = link {
            link = match probe(&self.0[h].key) {
                Ordering::Less => self.0[h].right,
                Ordering::Greater => self.0[h].left,
                Ordering::Equal => return Some(h),
            };
        }
        None
    }

    /// Largest node whose key orders strictly below the target.
    fn lower<F: FnMut(&K) -> Ordering>(&self, mut link: Link, probe: &mut F) -> Link {
        let mut best = None;
        while let Some(h) = link {
            if probe(&self.0[h].key) == Ordering::Less {
                best = Some(h);
                link = self.0[h].right;
            } else {
                link = self.0[h].left;
            }
        }
        best
    }

    /// Smallest node whose key orders strictly above the target.
    fn higher<F: FnMut(&K) -> Ordering>(&self, mut link: Link, probe: &mut F) -> Link {
        let mut best = None;
        while let Some(h) = link {
            if probe(&self.0[h].key) == Ordering::Greater {
                best = Some(h);
                link = self.0[h].left;
            } else {
                link = self.0[h].right;
            }
        }
        best
    }

    fn floor<F: FnMut(&K) -> Ordering>(&self, mut link: Link, probe: &mut F) -> Link {
        let mut best = None;
        while let Some(h) = link {
            match probe(&self.0[h].key) {
                Ordering::Greater => link = self.0[h].left,
                Ordering::Equal => return Some(h),
                Ordering::Less => {
                    best = Some(h);
                    link = self.0[h].right;
                }
            }
        }
        best
    }

    fn ceiling<F: FnMut(&K) -> Ordering>(&self, mut link: Link, probe: &mut F) -> Link {
        let mut best = None;
        while let Some(h) = link {
            match probe(&self.0[h].key) {
                Ordering::Less => link = self.0[h].right,
                Ordering::Equal => return Some(h),
                Ordering::Greater => {
                    best = Some(h);
                    link = self.0[h].left;
                }
            }
        }
        best
    }

    fn is_23(&self, link: Link) -> bool {
        match link {
            None => true,
            Some(h) => {
                let node = &self.0[h];
                if self.is_red(node.right) {
                    return false;
                }
                if node.color == Color::Red && self.is_red(node.left) {
                    return false;
                }
                self.is_23(node.left) && self.is_23(node.right)
            }
        }
    }

    /// Number of black links on every path to a leaf, or `None` if the
    /// paths disagree.
    fn black_height(&self, link: Link) -> Option<usize> {
        match link {
            None => Some(0),
            Some(h) => {
                let node = &self.0[h];
                let left = self.black_height(node.left)?;
                let right = self.black_height(node.right)?;
                if left != right {
                    return None;
                }
                Some(left + (node.color == Color::Black) as usize)
            }
        }
    }
}

/// An ordered map implemented as a left-leaning red-black tree.
pub struct RedBlackTree<K, V, C = Natural> {
    nodes: Arena<K, V>,
    root: Link,
    cmp: C,
}

impl<K, V, C: Comparator<K> + Default> RedBlackTree<K, V, C> {
    pub fn new() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K, V, C: Comparator<K> + Default> Default for RedBlackTree<K, V, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: Comparator<K>> RedBlackTree<K, V, C> {
    pub fn with_comparator(cmp: C) -> Self {
        RedBlackTree {
            nodes: Arena(Slab::new()),
            root: None,
            cmp,
        }
    }

    #[inline]
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Mutable access to the comparator state.
    ///
    /// Changing the state must not change the relative order of the
    /// keys currently stored.
    #[inline]
    pub fn comparator_mut(&mut self) -> &mut C {
        &mut self.cmp
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Insert a key-value pair, returning the previous value if the key
    /// was already present. The stored key is kept in that case.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let mut old = None;
        let root = self.nodes.put(self.root, key, value, &self.cmp, &mut old);
        self.nodes.0[root].color = Color::Black;
        self.root = Some(root);
        self.assert_invariants();
        old
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_by(|k| self.cmp.compare(k, key))
    }

    pub fn get_by<F: FnMut(&K) -> Ordering>(&self, mut probe: F) -> Option<&V> {
        self.nodes
            .find(self.root, &mut probe)
            .map(|h| &self.nodes.0[h].value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let cmp = &self.cmp;
        let h = self.nodes.find(self.root, &mut |k: &K| cmp.compare(k, key))?;
        Some(&mut self.nodes.0[h].value)
    }

    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Remove `key` and return the stored entry. Absent keys leave the
    /// tree unchanged.
    pub fn delete(&mut self, key: &K) -> Option<(K, V)> {
        let cmp = &self.cmp;
        let removed = Self::delete_matching(&mut self.nodes, &mut self.root, |k: &K| {
            cmp.compare(k, key)
        });
        self.assert_invariants();
        removed
    }

    /// Remove one entry whose key matches `probe`.
    ///
    /// Keys matching the probe must form a contiguous range of the
    /// tree order.
    pub fn delete_by<F: FnMut(&K) -> Ordering>(&mut self, probe: F) -> Option<(K, V)> {
        let removed = Self::delete_matching(&mut self.nodes, &mut self.root, probe);
        self.assert_invariants();
        removed
    }

    fn delete_matching<F: FnMut(&K) -> Ordering>(
        nodes: &mut Arena<K, V>,
        root: &mut Link,
        mut probe: F,
    ) -> Option<(K, V)> {
        let h = (*root)?;
        nodes.find(Some(h), &mut probe)?;

        if !nodes.is_red(nodes.0[h].left) && !nodes.is_red(nodes.0[h].right) {
            nodes.0[h].color = Color::Red;
        }
        let (new_root, removed) = nodes.delete(h, &mut probe);
        *root = new_root;
        if let Some(r) = new_root {
            nodes.0[r].color = Color::Black;
        }
        removed
    }

    pub fn delete_min(&mut self) -> Option<(K, V)> {
        let h = self.root?;
        if !self.nodes.is_red(self.nodes.0[h].left) && !self.nodes.is_red(self.nodes.0[h].right) {
            self.nodes.0[h].color = Color::Red;
        }
        let (root, removed) = self.nodes.delete_min(h);
        self.set_root(root);
        Some(removed)
    }

    pub fn delete_max(&mut self) -> Option<(K, V)> {
        let h = self.root?;
        if !self.nodes.is_red(self.nodes.0[h].left) && !self.nodes.is_red(self.nodes.0[h].right) {
            self.nodes.0[h].color = Color::Red;
        }
        let (root, removed) = self.nodes.delete_max(h);
        self.set_root(root);
        Some(removed)
    }

    fn set_root(&mut self, root: Link) {
        self.root = root;
        if let Some(r) = root {
            self.nodes.0[r].color = Color::Black;
        }
        self.assert_invariants();
    }

    pub fn min(&self) -> Option<(&K, &V)> {
        let mut h = self.root?;
        while let Some(left) = self.nodes.0[h].left {
            h = left;
        }
        Some(self.nodes.entry(h))
    }

    pub fn max(&self) -> Option<(&K, &V)> {
        let mut h = self.root?;
        while let Some(right) = self.nodes.0[h].right {
            h = right;
        }
        Some(self.nodes.entry(h))
    }

    /// Greatest entry strictly less than `key`.
    pub fn lower(&self, key: &K) -> Option<(&K, &V)> {
        self.lower_by(|k| self.cmp.compare(k, key))
    }

    /// Smallest entry strictly greater than `key`.
    pub fn higher(&self, key: &K) -> Option<(&K, &V)> {
        self.higher_by(|k| self.cmp.compare(k, key))
    }

    /// Greatest entry less than or equal to `key`.
    pub fn floor(&self, key: &K) -> Option<(&K, &V)> {
        self.floor_by(|k| self.cmp.compare(k, key))
    }

    /// Smallest entry greater than or equal to `key`.
    pub fn ceiling(&self, key: &K) -> Option<(&K, &V)> {
        self.ceiling_by(|k| self.cmp.compare(k, key))
    }

    pub fn lower_by<F: FnMut(&K) -> Ordering>(&self, mut probe: F) -> Option<(&K, &V)> {
        self.nodes
            .lower(self.root, &mut probe)
            .map(|h| self.nodes.entry(h))
    }

    pub fn higher_by<F: FnMut(&K) -> Ordering>(&self, mut probe: F) -> Option<(&K, &V)> {
        self.nodes
            .higher(self.root, &mut probe)
            .map(|h| self.nodes.entry(h))
    }

    pub fn floor_by<F: FnMut(&K) -> Ordering>(&self, mut probe: F) -> Option<(&K, &V)> {
        self.nodes
            .floor(self.root, &mut probe)
            .map(|h| self.nodes.entry(h))
    }

    pub fn ceiling_by<F: FnMut(&K) -> Ordering>(&self, mut probe: F) -> Option<(&K, &V)> {
        self.nodes
            .ceiling(self.root, &mut probe)
            .map(|h| self.nodes.entry(h))
    }

    /// In-order iterator over the entries.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes.0,
            stack: Vec::new(),
            cursor: self.root,
        }
    }

    /// Check the tree order, the left-leaning shape and the black
    /// balance.
    pub fn check(&self) -> bool {
        self.check_structure()
            && self
                .iter()
                .tuple_windows()
                .all(|((a, _), (b, _))| self.cmp.compare(a, b) == Ordering::Less)
    }

    fn check_structure(&self) -> bool {
        !self.nodes.is_red(self.root)
            && self.nodes.is_23(self.root)
            && self.nodes.black_height(self.root).is_some()
    }

    #[inline]
    fn assert_invariants(&self) {
        #[cfg(feature = "slow-asserts")]
        assert!(self.check_structure(), "red-black tree invariants violated");
    }
}

impl<K: Debug, V: Debug, C: Comparator<K>> Debug for RedBlackTree<K, V, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// In-order iterator of a [`RedBlackTree`].
pub struct Iter<'a, K, V> {
    nodes: &'a Slab<Node<K, V>>,
    stack: Vec<usize>,
    cursor: Link,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        while let Some(h) = self.cursor {
            self.stack.push(h);
            self.cursor = nodes[h].left;
        }
        let h = self.stack.pop()?;
        self.cursor = nodes[h].right;
        let node = &nodes[h];
        Some((&node.key, &node.value))
    }
}

impl<'a, K, V, C: Comparator<K>> IntoIterator for &'a RedBlackTree<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
