//! Tree sequencers
//!
//! Traversals that know nothing about resolver nodes. Callers supply a key
//! function (used for the visited set) and a children function. Both
//! traversals are iterative and never visit a key twice, so malformed input
//! cannot make them loop.

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

/// Breadth-first iterator created by [`level_order`]
pub struct LevelOrder<T, K, FK, FC> {
    queue: VecDeque<T>,
    seen: HashSet<K>,
    key: FK,
    children: FC,
}

/// Yield `root` and its descendants in level order
///
/// Parents come before children; siblings keep the order returned by
/// `children`. A node whose key was already yielded is skipped along with
/// its subtree.
pub fn level_order<T, K, FK, FC, I>(root: T, key: FK, children: FC) -> LevelOrder<T, K, FK, FC>
where
    K: Eq + Hash,
    FK: FnMut(&T) -> K,
    FC: FnMut(&T) -> I,
    I: IntoIterator<Item = T>,
{
    LevelOrder {
        queue: VecDeque::from([root]),
        seen: HashSet::new(),
        key,
        children,
    }
}

impl<T, K, FK, FC, I> Iterator for LevelOrder<T, K, FK, FC>
where
    K: Eq + Hash,
    FK: FnMut(&T) -> K,
    FC: FnMut(&T) -> I,
    I: IntoIterator<Item = T>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            let item = self.queue.pop_front()?;
            if !self.seen.insert((self.key)(&item)) {
                continue;
            }
            self.queue.extend((self.children)(&item));
            return Some(item);
        }
    }
}

/// Depth and size of the subtree below an origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lineage {
    /// Depth of the deepest descendant; the origin is generation 0
    pub generations: usize,
    /// Nodes strictly below the origin
    pub descendants: usize,
}

/// Measure the subtree rooted at `origin`
pub fn generations_and_descendants<T, K, FK, FC, I>(
    origin: T,
    mut key: FK,
    mut children: FC,
) -> Lineage
where
    K: Eq + Hash,
    FK: FnMut(&T) -> K,
    FC: FnMut(&T) -> I,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    seen.insert(key(&origin));

    let mut lineage = Lineage::default();
    let mut stack = vec![(origin, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        lineage.generations = lineage.generations.max(depth);
        for child in children(&node) {
            if seen.insert(key(&child)) {
                lineage.descendants += 1;
                stack.push((child, depth + 1));
            }
        }
    }
    lineage
}
