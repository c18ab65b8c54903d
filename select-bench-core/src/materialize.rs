use crate::row::{FromRow, Row};
use crate::{Error, Result};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

/// A parent entity with the children that reference it.
#[derive(Debug, Clone, PartialEq)]
pub struct Nested<P, C> {
    pub parent: P,
    pub children: Vec<C>,
}

impl<P, C> Nested<P, C> {
    pub fn new(parent: P) -> Self {
        Nested { parent, children: Vec::new() }
    }
}

/// One row of a one-to-many join.
///
/// Each row carries the key and the attributes of the parent, and at most one child. The attributes of the parent are
/// repeated on every row of the same parent (fan-out), only the first row of a given key is used to build the parent.
pub trait JoinRow {
    type Key: Eq + Hash + Clone + Debug;
    type Parent;
    type Child;

    fn parent_key(&self) -> Self::Key;

    /// Build the parent from the row.
    ///
    /// Only called for the first row of each parent key.
    fn parent(&self) -> Self::Parent;

    /// Take the child out of the row along with the key of the parent it references.
    ///
    /// Returns `None` when the row has no child, which is the case of the left side of a `LEFT JOIN` without any
    /// match: the child id or its reference to the parent is null.
    fn into_child(self) -> Option<(Self::Key, Self::Child)>;
}

/// Groups children under their parents in a single forward pass.
///
/// Parents are kept in the order their key was first seen, children in the order they were attached. Rows don't need
/// to be grouped by parent key: the position of each parent is looked up by key.
pub struct Materializer<K, P, C> {
    index: HashMap<K, usize>,
    entries: Vec<Nested<P, C>>,
    max_parents: Option<usize>,
    children: usize,
    skipped: usize,
}

impl<K: Eq + Hash + Debug, P, C> Default for Materializer<K, P, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Debug, P, C> Materializer<K, P, C> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a materializer with room for the given number of parents.
    pub fn with_capacity(capacity: usize) -> Self {
        Materializer {
            index: HashMap::with_capacity(capacity),
            entries: Vec::with_capacity(capacity),
            max_parents: None,
            children: 0,
            skipped: 0,
        }
    }

    /// Create a materializer that keeps at most `max_parents` parents.
    ///
    /// Once the limit is reached, no new parent is added while the children of the parents already kept are still
    /// collected, including the ones found on a row of a parent that was not kept.
    pub fn bounded(max_parents: usize) -> Self {
        Materializer { max_parents: Some(max_parents), ..Self::with_capacity(max_parents) }
    }

    /// Add a parent if its key has not been seen yet.
    ///
    /// Returns `true` if the parent was added, `false` if the key was already known (the given parent is dropped) or
    /// if the materializer is bounded and already full.
    pub fn insert_parent(&mut self, key: K, parent: P) -> bool {
        match self.index.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                if self.max_parents.is_some_and(|max| self.entries.len() >= max) {
                    return false;
                }
                entry.insert(self.entries.len());
                self.entries.push(Nested::new(parent));
                true
            }
        }
    }

    /// Whether a parent with the given key has been added.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Append a child to the parent with the given key.
    ///
    /// Fails with {{Error::ConsistencyViolation}} if no parent with this key has been added.
    pub fn attach_child(&mut self, key: &K, child: C) -> Result<()> {
        match self.index.get(key) {
            Some(&position) => {
                self.entries[position].children.push(child);
                self.children += 1;
                Ok(())
            }
            None => Err(Error::ConsistencyViolation { parent_key: format!("{:?}", key) }),
        }
    }

    /// Process a row of a join.
    pub fn push<R>(&mut self, row: R) -> Result<()>
    where
        R: JoinRow<Key = K, Parent = P, Child = C>,
    {
        let key = row.parent_key();
        if !self.index.contains_key(&key) {
            let parent = row.parent();
            if !self.insert_parent(key, parent) {
                // The parent of the row is past the limit but its child may reference a parent already kept.
                match row.into_child() {
                    Some((parent_key, child)) if self.index.contains_key(&parent_key) => {
                        return self.attach_child(&parent_key, child);
                    }
                    _ => {
                        self.skipped += 1;
                        return Ok(());
                    }
                }
            }
        }
        match row.into_child() {
            Some((parent_key, child)) => self.attach_child(&parent_key, child),
            None => Ok(()),
        }
    }

    /// The number of parents added so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn finish(self) -> Vec<Nested<P, C>> {
        debug!(
            "Materialized {} parents with {} children ({} rows skipped)",
            self.entries.len(),
            self.children,
            self.skipped
        );
        self.entries
    }
}

/// Turn the rows of a one-to-many join into parents with their children.
///
/// The first error, either coming from the rows or raised while grouping them, aborts the whole materialization.
pub fn materialize<R, I>(rows: I) -> Result<Vec<Nested<R::Parent, R::Child>>>
where
    R: JoinRow,
    I: IntoIterator<Item = Result<R>>,
{
    let mut materializer = Materializer::new();
    for row in rows {
        materializer.push(row?)?;
    }
    Ok(materializer.finish())
}

/// Same as {{materialize}} but only keeps the first parent found.
///
/// All the rows are consumed so the children of the first parent are collected even if they are not contiguous.
pub fn materialize_one<R, I>(rows: I) -> Result<Option<Nested<R::Parent, R::Child>>>
where
    R: JoinRow,
    I: IntoIterator<Item = Result<R>>,
{
    let mut materializer = Materializer::bounded(1);
    for row in rows {
        materializer.push(row?)?;
    }
    Ok(materializer.finish().into_iter().next())
}

/// Materialize the rows returned by a query, each of them being decoded using {{FromRow}}.
pub fn materialize_rows<R, I>(rows: I) -> Result<Vec<Nested<R::Parent, R::Child>>>
where
    R: FromRow + JoinRow,
    I: IntoIterator<Item = Result<Row>>,
{
    materialize(rows.into_iter().map(|row| row.and_then(|row| R::from_row(&row))))
}

pub fn materialize_one_row<R, I>(rows: I) -> Result<Option<Nested<R::Parent, R::Child>>>
where
    R: FromRow + JoinRow,
    I: IntoIterator<Item = Result<Row>>,
{
    materialize_one(rows.into_iter().map(|row| row.and_then(|row| R::from_row(&row))))
}
