//! Last-in-first-out free lists.
//!
//! [`FreeList`] is the storage shared by [`BuilderPool`](crate::BuilderPool)
//! and [`MeshPool`](crate::MeshPool). An empty list never fails a request; it
//! constructs a fresh instance instead.
//!
//! ```
//! use redlilium_geometry::pool::FreeList;
//!
//! let mut list = FreeList::new("scratch");
//! let buf: Vec<u8> = list.pop_or_create(Vec::new);
//! assert_eq!(list.created(), 1);
//!
//! list.push(buf);
//! let _again = list.pop_or_create(Vec::new);
//! assert_eq!(list.created(), 1); // reused
//! ```

/// A LIFO free list that counts how many instances it had to construct.
#[derive(Debug)]
pub struct FreeList<T> {
    free: Vec<T>,
    created: usize,
    label: &'static str,
}

impl<T> FreeList<T> {
    /// Create an empty free list. `label` names the pool in log output.
    pub fn new(label: &'static str) -> Self {
        Self {
            free: Vec::new(),
            created: 0,
            label,
        }
    }

    /// Pop the most recently pushed instance, or construct one.
    pub fn pop_or_create(&mut self, create: impl FnOnce() -> T) -> T {
        match self.free.pop() {
            Some(value) => value,
            None => {
                self.created += 1;
                log::debug!(
                    "{} pool empty, constructing instance #{}",
                    self.label,
                    self.created
                );
                create()
            }
        }
    }

    /// Push an instance back onto the list.
    pub fn push(&mut self, value: T) {
        self.free.push(value);
    }

    /// Construct instances until at least `count` are idle.
    pub fn prewarm(&mut self, count: usize, mut create: impl FnMut() -> T) {
        while self.free.len() < count {
            self.created += 1;
            self.free.push(create());
        }
    }

    /// Idle instances.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.free.iter()
    }

    /// Number of idle instances.
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// Check if no instance is idle.
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Total instances constructed by this list.
    pub fn created(&self) -> usize {
        self.created
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_creates() {
        let mut list = FreeList::<Vec<u32>>::new("test");
        let value = list.pop_or_create(|| vec![1, 2, 3]);
        assert_eq!(value, vec![1, 2, 3]);
        assert_eq!(list.created(), 1);
        assert!(list.is_empty());
    }

    #[test]
    fn test_lifo_order() {
        let mut list = FreeList::new("test");
        list.push(1);
        list.push(2);
        assert_eq!(list.pop_or_create(|| 0), 2);
        assert_eq!(list.pop_or_create(|| 0), 1);
        assert_eq!(list.pop_or_create(|| 0), 0);
        assert_eq!(list.created(), 1);
    }

    #[test]
    fn test_prewarm() {
        let mut list = FreeList::new("test");
        list.prewarm(3, || 7u8);
        assert_eq!(list.len(), 3);
        assert_eq!(list.created(), 3);

        list.prewarm(2, || 7u8);
        assert_eq!(list.len(), 3);
        assert_eq!(list.created(), 3);
    }
}
