//! Ordered destination tree built from rule destinations
//!
//! Keys keep their first-insertion order. A slot holds either a leaf (the
//! coerced source path) or a nested subtree.

/// Content of one key in a [`Node`]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Slot {
    #[default]
    Unset,
    Leaf(String),
    Subtree(Node),
}

/// One level of the destination tree
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    entries: Vec<(String, Slot)>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.entries.iter().map(|(key, slot)| (key.as_str(), slot))
    }

    pub fn get(&self, key: &str) -> Option<&Slot> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, slot)| slot)
    }

    /// Slot for `key`, appended as `Unset` when absent
    fn entry(&mut self, key: &str) -> &mut Slot {
        let index = match self.entries.iter().position(|(k, _)| k == key) {
            Some(index) => index,
            None => {
                self.entries.push((key.to_string(), Slot::Unset));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    /// Subtree under `key`; an unset slot or a leaf becomes an empty subtree
    fn child_mut(&mut self, key: &str) -> &mut Node {
        let slot = self.entry(key);
        if !matches!(slot, Slot::Subtree(_)) {
            *slot = Slot::Subtree(Node::new());
        }
        match slot {
            Slot::Subtree(node) => node,
            _ => unreachable!("slot was just made a subtree"),
        }
    }

    /// Bind `source` at the path given by `keys`.
    ///
    /// The first leaf bound at a key wins and an existing subtree is never
    /// replaced by a leaf. Intermediate leaves are replaced by subtrees.
    pub fn insert(&mut self, keys: &[&str], source: &str) {
        let Some((last, parents)) = keys.split_last() else {
            return;
        };

        let mut node = self;
        for key in parents {
            node = node.child_mut(key);
        }

        let slot = node.entry(last);
        if matches!(slot, Slot::Unset) {
            *slot = Slot::Leaf(source.to_string());
        }
    }
}
