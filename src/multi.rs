// The multiple-object list
//
// Holds the objects matched by "all", "the ball and the box" and the like.
// The list is bounded; adds past the bound are dropped and remembered in
// `too_many` so the host can warn once the action has run.

use crate::world::{Attribute, ObjectId, WorldModel};
use log::debug;

/// `sub` was asked to remove an object that was not there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotInList;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiList {
    objects: Vec<ObjectId>,
    capacity: usize,
    too_many: bool,
}

impl Default for MultiList {
    fn default() -> Self {
        MultiList::new(63)
    }
}

impl MultiList {
    pub fn new(capacity: usize) -> Self {
        MultiList {
            objects: Vec::with_capacity(capacity),
            capacity,
            too_many: false,
        }
    }

    /// Add `obj` unless it is already present. A full list drops it and
    /// sets the too-many flag.
    pub fn add(&mut self, obj: ObjectId) {
        if self.objects.len() >= self.capacity {
            debug!("multiple-object list full, dropping {}", obj);
            self.too_many = true;
            return;
        }
        if !self.objects.contains(&obj) {
            self.objects.push(obj);
        }
    }

    /// Append without checking for duplicates. Used when a whole match list
    /// is taken at once. Returns false if the list was already full.
    pub fn push_raw(&mut self, obj: ObjectId) -> bool {
        if self.objects.len() >= self.capacity {
            return false;
        }
        self.objects.push(obj);
        true
    }

    /// Remove the first occurrence of `obj`.
    pub fn sub(&mut self, obj: ObjectId) -> Result<(), NotInList> {
        match self.objects.iter().position(|&o| o == obj) {
            Some(i) => {
                self.objects.remove(i);
                Ok(())
            }
            None => Err(NotInList),
        }
    }

    /// Drop every member that lacks `attr`.
    pub fn filter(&mut self, attr: Attribute, world: &dyn WorldModel) {
        self.objects.retain(|&o| world.has(o, attr));
    }

    pub fn retain<F: FnMut(ObjectId) -> bool>(&mut self, mut keep: F) {
        self.objects.retain(|&o| keep(o));
    }

    pub fn truncate(&mut self, len: usize) {
        self.objects.truncate(len);
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn reset_too_many(&mut self) {
        self.too_many = false;
    }

    pub fn too_many(&self) -> bool {
        self.too_many
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, i: usize) -> Option<ObjectId> {
        self.objects.get(i).copied()
    }

    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_tree::{ObjectKind, ObjectTree};

    #[test]
    fn test_add_skips_duplicates() {
        let mut m = MultiList::new(63);
        m.add(ObjectId(3));
        m.add(ObjectId(4));
        m.add(ObjectId(3));
        assert_eq!(m.objects(), &[ObjectId(3), ObjectId(4)]);
        assert!(!m.too_many());
    }

    #[test]
    fn test_capacity_sets_too_many_only_on_drop() {
        let mut m = MultiList::new(5);
        for i in 1..=5 {
            m.add(ObjectId(i));
            assert!(!m.too_many());
        }
        // the first add past capacity is dropped
        m.add(ObjectId(6));
        assert!(m.too_many());
        assert_eq!(m.len(), 5);

        for i in 7..100 {
            m.add(ObjectId(i));
            assert!(m.len() <= m.capacity());
        }
    }

    #[test]
    fn test_sub_reports_missing() {
        let mut m = MultiList::new(63);
        m.add(ObjectId(1));
        m.add(ObjectId(2));
        assert_eq!(m.sub(ObjectId(1)), Ok(()));
        assert_eq!(m.sub(ObjectId(1)), Err(NotInList));
        assert_eq!(m.objects(), &[ObjectId(2)]);
    }

    #[test]
    fn test_filter_by_attribute() {
        let mut tree = ObjectTree::new();
        let cake = tree.add("cake", &["cake"], ObjectKind::Item);
        let rock = tree.add("rock", &["rock"], ObjectKind::Item);
        let pie = tree.add("pie", &["pie"], ObjectKind::Item);
        tree.give(cake, Attribute::Edible);
        tree.give(pie, Attribute::Edible);

        let mut m = MultiList::new(63);
        for o in [cake, rock, pie] {
            m.add(o);
        }
        m.filter(Attribute::Edible, &tree);
        assert_eq!(m.objects(), &[cake, pie]);
    }

    #[test]
    fn test_push_raw_keeps_duplicates() {
        let mut m = MultiList::new(2);
        assert!(m.push_raw(ObjectId(1)));
        assert!(m.push_raw(ObjectId(1)));
        assert!(!m.push_raw(ObjectId(2)));
        assert_eq!(m.len(), 2);
    }
}
