use compact_str::CompactString;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use std::collections::HashMap;

struct TrieNode<T> {
    children: HashMap<CompactString, TrieNode<T>, FxBuildHasher>,
    value: Option<T>,
}

impl<T> TrieNode<T> {
    fn new() -> Self {
        Self {
            children: HashMap::with_hasher(FxBuildHasher),
            value: None,
        }
    }
}

/// Domain names keyed by reversed labels; lookups return the value bound to
/// the longest registered suffix of the queried name.
///
/// Labels compare ASCII case-insensitively. The empty name and `"."` both
/// address the root node.
pub struct NameTrie<T> {
    root: TrieNode<T>,
    len: usize,
}

impl<T> Default for NameTrie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NameTrie<T> {
    pub fn new() -> Self {
        Self {
            root: TrieNode::new(),
            len: 0,
        }
    }

    /// Bind `value` to `name`, returning the value it replaces.
    pub fn insert(&mut self, name: &str, value: T) -> Option<T> {
        let mut node = &mut self.root;
        for label in labels(name).into_iter().rev() {
            node = node
                .children
                .entry(label)
                .or_insert_with(TrieNode::new);
        }

        let previous = node.value.replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Value bound exactly to `name`.
    pub fn get(&self, name: &str) -> Option<&T> {
        let mut node = &self.root;
        for label in labels(name).iter().rev() {
            node = node.children.get(label)?;
        }
        node.value.as_ref()
    }

    /// Value of the deepest bound node on the path to `name`.
    pub fn longest_match(&self, name: &str) -> Option<&T> {
        let mut node = &self.root;
        let mut best = node.value.as_ref();

        for label in labels(name).iter().rev() {
            match node.children.get(label) {
                Some(child) => {
                    if child.value.is_some() {
                        best = child.value.as_ref();
                    }
                    node = child;
                }
                None => break,
            }
        }

        best
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn labels(name: &str) -> SmallVec<[CompactString; 8]> {
    name.trim_end_matches('.')
        .split('.')
        .filter(|label| !label.is_empty())
        .map(|label| CompactString::new(label.to_ascii_lowercase()))
        .collect()
}
