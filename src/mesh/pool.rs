//! Pooled element storage.
//!
//! A [`Pool`] hands out stable ids for elements of one kind. Deleting an
//! element leaves a tombstone in its slot: ids are never shifted or reused, so
//! every previously issued id stays meaningful (it either resolves to the same
//! element or reports [`MeshError::InvalidId`]).
//!
//! ```text
//! Pool<T, Id> {
//!     slots: [
//!         Live(T),      // id 0
//!         Tombstone,    // id 1, deleted
//!         Live(T),      // id 2
//!     ],
//!     live: 2,
//! }
//! ```

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use super::index::ElementId;
use crate::error::{MeshError, Result};

#[derive(Debug, Clone)]
enum Slot<T> {
    Live(T),
    Tombstone,
}

/// Fixed-slot arena of elements addressed by a typed id.
#[derive(Debug, Clone)]
pub struct Pool<T, Id: ElementId> {
    slots: Vec<Slot<T>>,
    live: usize,
    _marker: PhantomData<fn() -> Id>,
}

impl<T, Id: ElementId> Default for Pool<T, Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, Id: ElementId> Pool<T, Id> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
            _marker: PhantomData,
        }
    }

    /// Create a pool with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            live: 0,
            _marker: PhantomData,
        }
    }

    /// Reserve room for `additional` more elements.
    pub fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    /// Store `value` in the next free slot and return its id.
    ///
    /// May reallocate the backing storage; ids stay valid because they are
    /// slot indices.
    pub fn create(&mut self, value: T) -> Id {
        let id = Id::new(self.slots.len());
        self.slots.push(Slot::Live(value));
        self.live += 1;
        id
    }

    /// Get an element, failing with `InvalidId` for out-of-range or deleted ids.
    #[inline]
    pub fn get(&self, id: Id) -> Result<&T> {
        match self.slots.get(id.index()) {
            Some(Slot::Live(value)) if id.is_valid() => Ok(value),
            _ => Err(invalid(id)),
        }
    }

    /// Get a mutable element, failing with `InvalidId` for out-of-range or deleted ids.
    #[inline]
    pub fn get_mut(&mut self, id: Id) -> Result<&mut T> {
        match self.slots.get_mut(id.index()) {
            Some(Slot::Live(value)) if id.is_valid() => Ok(value),
            _ => Err(invalid(id)),
        }
    }

    /// Tombstone the slot of `id`. Other ids are unaffected.
    pub fn delete(&mut self, id: Id) -> Result<T> {
        if self.is_deleted(id) {
            return Err(invalid(id));
        }
        self.live -= 1;
        match std::mem::replace(&mut self.slots[id.index()], Slot::Tombstone) {
            Slot::Live(value) => Ok(value),
            Slot::Tombstone => unreachable!("slot checked live above"),
        }
    }

    /// Whether `id` does not refer to a live element.
    ///
    /// Out-of-range and invalid ids count as deleted.
    #[inline]
    pub fn is_deleted(&self, id: Id) -> bool {
        !matches!(self.slots.get(id.index()), Some(Slot::Live(_))) || !id.is_valid()
    }

    /// Whether `id` refers to a live element.
    #[inline]
    pub fn contains(&self, id: Id) -> bool {
        !self.is_deleted(id)
    }

    /// High-water mark: number of slots ever created, tombstones included.
    #[inline]
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the pool holds no live elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterate over live elements in creation order.
    pub fn iter(&self) -> Iter<'_, T, Id> {
        Iter {
            inner: self.slots.iter().enumerate(),
            _marker: PhantomData,
        }
    }

    /// Iterate mutably over live elements in creation order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Id, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                Slot::Live(value) => Some((Id::new(i), value)),
                Slot::Tombstone => None,
            })
    }

    /// Iterate over the ids of live elements in creation order.
    pub fn ids(&self) -> impl Iterator<Item = Id> + Clone + '_ {
        self.iter().map(|(id, _)| id)
    }

    /// Release excess capacity.
    pub fn shrink_to_fit(&mut self) {
        self.slots.shrink_to_fit();
    }
}

fn invalid<Id: ElementId>(id: Id) -> MeshError {
    MeshError::InvalidId {
        kind: Id::KIND,
        index: id.index(),
    }
}

impl<T, Id: ElementId> Index<Id> for Pool<T, Id> {
    type Output = T;

    /// # Panics
    /// Panics if `id` is out of range or deleted; a dangling reference inside
    /// the mesh is a broken invariant.
    #[inline]
    fn index(&self, id: Id) -> &T {
        match self.slots.get(id.index()) {
            Some(Slot::Live(value)) => value,
            _ => panic!("dangling {} reference {:?}", Id::KIND, id),
        }
    }
}

impl<T, Id: ElementId> IndexMut<Id> for Pool<T, Id> {
    #[inline]
    fn index_mut(&mut self, id: Id) -> &mut T {
        match self.slots.get_mut(id.index()) {
            Some(Slot::Live(value)) => value,
            _ => panic!("dangling {} reference {:?}", Id::KIND, id),
        }
    }
}

/// Iterator over the live elements of a [`Pool`].
pub struct Iter<'a, T, Id> {
    inner: std::iter::Enumerate<std::slice::Iter<'a, Slot<T>>>,
    _marker: PhantomData<fn() -> Id>,
}

// Only borrows `T`, so cloning must not require `T: Clone`.
impl<'a, T, Id> Clone for Iter<'a, T, Id> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<'a, T, Id: ElementId> Iterator for Iter<'a, T, Id> {
    type Item = (Id, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        for (i, slot) in self.inner.by_ref() {
            if let Slot::Live(value) = slot {
                return Some((Id::new(i), value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}

impl<'a, T, Id: ElementId> IntoIterator for &'a Pool<T, Id> {
    type Item = (Id, &'a T);
    type IntoIter = Iter<'a, T, Id>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::index::VertexId;

    fn pool_of(values: &[i32]) -> Pool<i32, VertexId> {
        let mut pool = Pool::new();
        for &v in values {
            pool.create(v);
        }
        pool
    }

    #[test]
    fn test_create_and_get() {
        let mut pool: Pool<i32, VertexId> = Pool::new();
        let a = pool.create(10);
        let b = pool.create(20);

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(*pool.get(a).unwrap(), 10);
        assert_eq!(pool[b], 20);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.size(), 2);
    }

    #[test]
    fn test_out_of_range_is_invalid_id() {
        let pool = pool_of(&[1]);
        let err = pool.get(VertexId::new(5)).unwrap_err();
        assert!(matches!(err, MeshError::InvalidId { kind: "vertex", index: 5 }));
        assert!(pool.get(VertexId::invalid()).is_err());
        assert!(pool.is_deleted(VertexId::new(5)));
    }

    #[test]
    fn test_delete_keeps_ids_stable() {
        let mut pool = pool_of(&[1, 2, 3]);
        let middle = VertexId::new(1);

        assert_eq!(pool.delete(middle).unwrap(), 2);
        assert!(pool.is_deleted(middle));
        assert!(pool.get(middle).is_err());
        assert!(pool.delete(middle).is_err());

        // Neighbours are untouched and the high-water mark does not shrink
        assert_eq!(pool[VertexId::new(0)], 1);
        assert_eq!(pool[VertexId::new(2)], 3);
        assert_eq!(pool.size(), 3);
        assert_eq!(pool.len(), 2);

        // Slots are never reused
        let d = pool.create(4);
        assert_eq!(d.index(), 3);
    }

    #[test]
    fn test_iteration_skips_tombstones() {
        let mut pool = pool_of(&[1, 2, 3, 4]);
        pool.delete(VertexId::new(0)).unwrap();
        pool.delete(VertexId::new(2)).unwrap();

        let items: Vec<_> = pool.iter().map(|(id, v)| (id.index(), *v)).collect();
        assert_eq!(items, vec![(1, 2), (3, 4)]);

        // A fresh iterator walks from the start again
        let ids: Vec<_> = pool.ids().collect();
        assert_eq!(ids, vec![VertexId::new(1), VertexId::new(3)]);
        assert_eq!(pool.ids().count(), 2);
    }

    #[test]
    fn test_iterators_clone_without_cloneable_elements() {
        struct Opaque(u8);

        let mut pool: Pool<Opaque, VertexId> = Pool::new();
        pool.create(Opaque(1));
        pool.create(Opaque(2));

        let mut iter = pool.iter();
        iter.next();
        let rest = iter.clone();
        assert_eq!(iter.map(|(_, o)| o.0).collect::<Vec<_>>(), vec![2]);
        assert_eq!(rest.count(), 1);

        let ids = pool.ids();
        assert_eq!(ids.clone().count(), ids.count());
    }

    #[test]
    fn test_ids_survive_reallocation() {
        let mut pool: Pool<usize, VertexId> = Pool::with_capacity(1);
        let ids: Vec<_> = (0..1000).map(|i| pool.create(i * 2)).collect();
        for (i, id) in ids.into_iter().enumerate() {
            assert_eq!(pool[id], i * 2);
        }
    }

    #[test]
    #[should_panic(expected = "dangling vertex reference")]
    fn test_index_deleted_panics() {
        let mut pool = pool_of(&[1]);
        pool.delete(VertexId::new(0)).unwrap();
        let _ = pool[VertexId::new(0)];
    }
}
