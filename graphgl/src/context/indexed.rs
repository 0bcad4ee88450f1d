//! Deduplicating storage with typed handles
use std::{collections::HashMap, hash::Hash};

/// Conversion between a typed handle and a position in storage
pub(crate) trait Index: Copy {
    fn new(i: usize) -> Self;
    fn get(&self) -> usize;
}

/// Insertion-ordered set, where each value is named by a typed handle
///
/// Inserting a value that is already present returns its existing handle.
/// Values are kept in a `Vec` for lookup by handle and mirrored in a
/// `HashMap` for lookup by value, so `V` must be `Clone`.
#[derive(Clone, Debug)]
pub(crate) struct IndexMap<V, I> {
    values: Vec<V>,
    handles: HashMap<V, I>,
}

impl<V, I> Default for IndexMap<V, I> {
    fn default() -> Self {
        Self {
            values: vec![],
            handles: HashMap::new(),
        }
    }
}

impl<V: Eq + Hash + Clone, I: Index> IndexMap<V, I> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get_by_index(&self, i: I) -> Option<&V> {
        self.values.get(i.get())
    }

    /// Returns the handle for `v`, storing it first if it is new
    pub fn insert(&mut self, v: V) -> I {
        if let Some(i) = self.handles.get(&v) {
            return *i;
        }
        let i = I::new(self.values.len());
        self.handles.insert(v.clone(), i);
        self.values.push(v);
        i
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.handles.clear();
    }
}

/// Declares a `usize` newtype that implements [`Index`]
macro_rules! define_index {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Copy, Clone, Default, Debug, Eq, PartialEq, Hash, Ord, PartialOrd,
        )]
        pub struct $name(usize);

        impl crate::context::indexed::Index for $name {
            fn new(i: usize) -> Self {
                Self(i)
            }
            fn get(&self) -> usize {
                self.0
            }
        }
    };
}
pub(crate) use define_index;
