//! Copy-on-write attribute channels.
//!
//! A [`Channel`] holds one attribute stream (positions, UVs, colors or
//! indices) for one geometry pass. It owns a backing store that only ever
//! grows, and exposes a *view* that is either that backing store or a
//! borrowed [`SharedBuffer`] handed out by one of the shared tables.
//!
//! # Lifecycle
//!
//! ```text
//!             set_up(n) / set_up_shared(buf)
//!  unprepared ─────────────────────────────────► prepared
//!      ▲                                            │  edit / resize / trim_end
//!      └──────────────── invalidate ◄───────────────┘
//! ```
//!
//! [`Channel::edit`] is the single place where a borrowed view turns into
//! an owned one. Shared data is never written.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};

use crate::mesh::{MeshSink, UploadFlags};
use crate::types::{Color32, Index, Position, Uv};

/// The mesh attribute stream a channel feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// Vertex positions.
    Position,
    /// Texture coordinates.
    Uv,
    /// Per-vertex colors.
    Color,
    /// Triangle indices.
    Index,
}

/// Element type stored in a [`Channel`].
///
/// Implemented for [`Position`], [`Uv`], [`Color32`] and [`Index`]. The
/// implementation routes a live slice to the matching [`MeshSink`] setter.
pub trait ChannelElement: Pod + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Stream this element type belongs to.
    const KIND: AttributeKind;

    /// Upload `data` into the matching stream of `sink`.
    fn upload<S: MeshSink + ?Sized>(sink: &mut S, data: &[Self], flags: UploadFlags);
}

impl ChannelElement for Position {
    const KIND: AttributeKind = AttributeKind::Position;

    fn upload<S: MeshSink + ?Sized>(sink: &mut S, data: &[Self], flags: UploadFlags) {
        sink.set_positions(data, flags);
    }
}

impl ChannelElement for Uv {
    const KIND: AttributeKind = AttributeKind::Uv;

    fn upload<S: MeshSink + ?Sized>(sink: &mut S, data: &[Self], flags: UploadFlags) {
        sink.set_uvs(data, flags);
    }
}

impl ChannelElement for Color32 {
    const KIND: AttributeKind = AttributeKind::Color;

    fn upload<S: MeshSink + ?Sized>(sink: &mut S, data: &[Self], flags: UploadFlags) {
        sink.set_colors(data, flags);
    }
}

impl ChannelElement for Index {
    const KIND: AttributeKind = AttributeKind::Index;

    fn upload<S: MeshSink + ?Sized>(sink: &mut S, data: &[Self], flags: UploadFlags) {
        sink.set_indices(data, flags);
    }
}

/// An immutable, reference-counted array with a logical length.
///
/// The logical length may be shorter than the allocation, which lets a
/// table hand out a prefix of its cached array without copying.
#[derive(Clone)]
pub struct SharedBuffer<T> {
    data: Arc<[T]>,
    len: usize,
}

impl<T> SharedBuffer<T> {
    /// Wrap a whole allocation.
    pub fn new(data: Arc<[T]>) -> Self {
        let len = data.len();
        Self { data, len }
    }

    /// Wrap the first `len` elements of an allocation.
    pub fn with_len(data: Arc<[T]>, len: usize) -> Self {
        debug_assert!(
            len <= data.len(),
            "shared buffer length {len} exceeds allocation of {}",
            data.len()
        );
        Self { data, len }
    }

    /// Logical length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the logical length is zero.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Length of the underlying allocation.
    pub fn allocation_len(&self) -> usize {
        self.data.len()
    }

    /// Live elements.
    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.len]
    }

    /// Check if both buffers view the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl<T> Deref for SharedBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> From<Vec<T>> for SharedBuffer<T> {
    fn from(data: Vec<T>) -> Self {
        Self::new(data.into())
    }
}

impl<T> From<Arc<[T]>> for SharedBuffer<T> {
    fn from(data: Arc<[T]>) -> Self {
        Self::new(data)
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("len", &self.len)
            .field("allocation_len", &self.data.len())
            .finish()
    }
}

/// Where the live region of a channel currently lives.
enum View<T> {
    /// No array bound; live region is empty.
    Detached,
    /// The live region is the head of the backing store.
    Owned,
    /// The live region is borrowed, read-only data.
    Shared(SharedBuffer<T>),
}

/// A growable copy-on-write buffer for one attribute stream.
///
/// `count` is `None` while the channel is unprepared, which corresponds to
/// the "invalid" state a pooled builder must be in.
pub struct Channel<T: ChannelElement> {
    storage: Vec<T>,
    view: View<T>,
    count: Option<usize>,
}

impl<T: ChannelElement> Channel<T> {
    /// Create an unprepared channel with `capacity` backing elements.
    pub fn new(capacity: usize) -> Self {
        Self {
            storage: vec![T::zeroed(); capacity],
            view: View::Detached,
            count: None,
        }
    }

    /// Bind the backing store for `count` elements and return it for writing.
    ///
    /// Grows the backing store when needed; never shrinks it. Element values
    /// are whatever the previous pass left behind until written.
    pub fn set_up(&mut self, count: usize) -> &mut [T] {
        debug_assert!(
            matches!(self.view, View::Detached),
            "{:?} channel set up twice without clear or invalidate",
            T::KIND
        );
        self.grow(count);
        self.view = View::Owned;
        self.count = Some(count);
        &mut self.storage[..count]
    }

    /// Bind a shared buffer as the view, covering its whole logical length.
    pub fn set_up_shared(&mut self, buffer: SharedBuffer<T>) {
        let count = buffer.len();
        self.set_up_shared_with_count(buffer, count);
    }

    /// Bind a shared buffer as the view, covering its first `count` elements.
    pub fn set_up_shared_with_count(&mut self, buffer: SharedBuffer<T>, count: usize) {
        debug_assert!(
            matches!(self.view, View::Detached),
            "{:?} channel set up twice without clear or invalidate",
            T::KIND
        );
        debug_assert!(
            count <= buffer.len(),
            "{:?} channel count {count} exceeds shared buffer length {}",
            T::KIND,
            buffer.len()
        );
        self.view = View::Shared(buffer);
        self.count = Some(count);
    }

    /// Return the live region for writing, copying borrowed data into the
    /// backing store first if needed.
    pub fn edit(&mut self) -> &mut [T] {
        debug_assert!(self.is_prepared(), "{:?} channel edited before set_up", T::KIND);
        let count = self.len();
        self.grow(count);
        self.promote(count);
        &mut self.storage[..count]
    }

    /// Change the live element count, keeping the existing prefix.
    ///
    /// Growth and copy-on-write promotion share a single reallocation.
    pub fn resize(&mut self, count: usize) -> &mut [T] {
        debug_assert!(self.is_prepared(), "{:?} channel resized before set_up", T::KIND);
        let keep = self.len().min(count);
        self.grow(count);
        self.promote(keep);
        self.count = Some(count);
        &mut self.storage[..count]
    }

    /// Shrink the live element count without touching any data.
    pub fn trim_end(&mut self, index: usize) {
        debug_assert!(
            index <= self.len(),
            "{:?} channel trimmed to {index} past its count {}",
            T::KIND,
            self.len()
        );
        if self.count.is_some() {
            self.count = Some(index.min(self.len()));
        }
    }

    /// Detach the view and leave the channel prepared with zero elements.
    pub fn clear(&mut self) {
        self.view = View::Detached;
        self.count = Some(0);
    }

    /// Detach the view and mark the channel unprepared.
    pub fn invalidate(&mut self) {
        self.view = View::Detached;
        self.count = None;
    }

    /// Fill the live region with `value`.
    pub fn fill(&mut self, value: T) {
        self.edit().fill(value);
    }

    /// Grow the backing store to at least `capacity` elements.
    pub fn reserve(&mut self, capacity: usize) {
        self.grow(capacity);
    }

    /// Live elements.
    pub fn as_slice(&self) -> &[T] {
        debug_assert!(self.is_prepared(), "{:?} channel read before set_up", T::KIND);
        let count = self.len();
        match &self.view {
            View::Detached => &[],
            View::Owned => &self.storage[..count],
            View::Shared(buffer) => &buffer[..count],
        }
    }

    /// Upload the live region into `sink`.
    pub fn fill_mesh<S: MeshSink + ?Sized>(&self, sink: &mut S, flags: UploadFlags) {
        T::upload(sink, self.as_slice(), flags);
    }

    /// Live element count, or `None` while unprepared.
    pub fn count(&self) -> Option<usize> {
        self.count
    }

    /// Live element count, zero while unprepared.
    pub fn len(&self) -> usize {
        self.count.unwrap_or(0)
    }

    /// Check if there are no live elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the channel holds a valid count.
    pub fn is_prepared(&self) -> bool {
        self.count.is_some()
    }

    /// Check if the view is the channel's own backing store.
    pub fn is_owned(&self) -> bool {
        matches!(self.view, View::Owned)
    }

    /// Check if the view borrows shared data.
    pub fn is_shared(&self) -> bool {
        matches!(self.view, View::Shared(_))
    }

    /// The borrowed buffer, if the view is shared.
    pub fn shared(&self) -> Option<&SharedBuffer<T>> {
        match &self.view {
            View::Shared(buffer) => Some(buffer),
            _ => None,
        }
    }

    /// Backing store length.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    fn grow(&mut self, capacity: usize) {
        if self.storage.len() < capacity {
            self.storage.resize(capacity, T::zeroed());
        }
    }

    /// Make the backing store the view, copying the first `keep` borrowed
    /// elements. The store must already hold `keep` elements.
    fn promote(&mut self, keep: usize) {
        if let View::Shared(buffer) = std::mem::replace(&mut self.view, View::Owned) {
            self.storage[..keep].copy_from_slice(&buffer[..keep]);
        }
    }
}

impl<T: ChannelElement> Default for Channel<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T: ChannelElement> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = match &self.view {
            View::Detached => "detached",
            View::Owned => "owned",
            View::Shared(_) => "shared",
        };
        f.debug_struct("Channel")
            .field("kind", &T::KIND)
            .field("count", &self.count)
            .field("capacity", &self.storage.len())
            .field("view", &view)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn shared_indices(values: &[u16]) -> SharedBuffer<u16> {
        SharedBuffer::from(values.to_vec())
    }

    #[test]
    fn test_new_is_unprepared() {
        let channel = Channel::<Uv>::new(8);
        assert!(!channel.is_prepared());
        assert_eq!(channel.count(), None);
        assert_eq!(channel.len(), 0);
        assert_eq!(channel.capacity(), 8);
        assert!(!channel.is_owned());
    }

    #[test]
    fn test_set_up_binds_backing_store() {
        let mut channel = Channel::<u16>::new(4);
        let view = channel.set_up(3);
        view.copy_from_slice(&[7, 8, 9]);

        assert!(channel.is_owned());
        assert_eq!(channel.count(), Some(3));
        assert_eq!(channel.as_slice(), &[7, 8, 9]);
    }

    #[test]
    fn test_set_up_grows_never_shrinks() {
        let mut channel = Channel::<u16>::new(4);
        channel.set_up(10);
        assert_eq!(channel.capacity(), 10);

        channel.invalidate();
        channel.set_up(2);
        assert_eq!(channel.capacity(), 10);
        assert_eq!(channel.len(), 2);
    }

    #[test]
    fn test_invalidate_then_set_up_matches_fresh() {
        let mut fresh = Channel::<Color32>::new(4);
        fresh.set_up(6);

        let mut reused = Channel::<Color32>::new(4);
        reused.set_up(2).fill(Color32::BLACK);
        reused.edit();
        reused.invalidate();
        reused.set_up(6);

        assert_eq!(reused.count(), fresh.count());
        assert_eq!(reused.is_prepared(), fresh.is_prepared());
        assert_eq!(reused.is_owned(), fresh.is_owned());
        assert_eq!(reused.is_shared(), fresh.is_shared());
        assert_eq!(reused.as_slice().len(), fresh.as_slice().len());
    }

    #[test]
    fn test_shared_view_has_no_copy() {
        let buffer = shared_indices(&[1, 2, 3, 4]);
        let mut channel = Channel::<u16>::new(0);
        channel.set_up_shared(buffer.clone());

        assert!(channel.is_shared());
        assert_eq!(channel.capacity(), 0);
        assert_eq!(channel.as_slice(), &[1, 2, 3, 4]);
        assert!(channel.shared().unwrap().ptr_eq(&buffer));
    }

    #[test]
    fn test_shared_view_with_count() {
        let mut channel = Channel::<u16>::new(0);
        channel.set_up_shared_with_count(shared_indices(&[1, 2, 3, 4]), 2);
        assert_eq!(channel.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_edit_copies_shared_data() {
        let buffer = shared_indices(&[1, 2, 3, 4]);
        let mut channel = Channel::<u16>::new(0);
        channel.set_up_shared(buffer.clone());

        let view = channel.edit();
        view[2] = 99;

        assert!(channel.is_owned());
        assert_eq!(channel.as_slice(), &[1, 2, 99, 4]);
        assert_eq!(buffer.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_edit_is_idempotent() {
        let mut channel = Channel::<u16>::new(0);
        channel.set_up_shared(shared_indices(&[5, 6]));
        channel.edit()[0] = 1;
        let second = channel.edit().to_vec();
        assert_eq!(second, vec![1, 6]);
        assert!(channel.is_owned());
    }

    #[rstest]
    #[case::same(4)]
    #[case::within_capacity(6)]
    #[case::beyond_capacity(64)]
    fn test_resize_preserves_prefix(#[case] new_count: usize) {
        let mut channel = Channel::<u16>::new(8);
        channel.set_up(4).copy_from_slice(&[10, 11, 12, 13]);

        let view = channel.resize(new_count);
        assert_eq!(view.len(), new_count);
        assert_eq!(&view[..4], &[10, 11, 12, 13]);
        assert_eq!(channel.count(), Some(new_count));
    }

    #[rstest]
    #[case::grow(9)]
    #[case::shrink(2)]
    fn test_resize_promotes_shared(#[case] new_count: usize) {
        let buffer = shared_indices(&[1, 2, 3, 4]);
        let mut channel = Channel::<u16>::new(0);
        channel.set_up_shared(buffer.clone());

        channel.resize(new_count);
        assert!(channel.is_owned());
        let keep = new_count.min(4);
        assert_eq!(&channel.as_slice()[..keep], &buffer[..keep]);
        assert_eq!(buffer.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_trim_end_keeps_view() {
        let mut channel = Channel::<u16>::new(0);
        channel.set_up_shared(shared_indices(&[1, 2, 3, 4, 5, 6]));
        channel.trim_end(3);
        assert!(channel.is_shared());
        assert_eq!(channel.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_clear_is_prepared_and_empty() {
        let mut channel = Channel::<Uv>::new(4);
        channel.set_up(4);
        channel.clear();

        assert!(channel.is_prepared());
        assert!(channel.is_empty());
        assert!(channel.as_slice().is_empty());

        // A cleared channel may be set up again.
        channel.set_up(1);
        assert_eq!(channel.len(), 1);
    }

    #[test]
    fn test_edit_after_clear_is_empty_and_owned() {
        let mut channel = Channel::<Uv>::new(4);
        channel.clear();
        assert!(channel.edit().is_empty());
        assert!(channel.is_owned());
    }

    #[test]
    fn test_fill() {
        let mut channel = Channel::<Color32>::new(0);
        channel.set_up(3);
        channel.fill(Color32::BLACK);
        assert!(channel.as_slice().iter().all(|c| *c == Color32::BLACK));
    }

    #[test]
    fn test_shared_buffer_prefix() {
        let buffer = SharedBuffer::with_len(Arc::from(vec![1u16, 2, 3, 4]), 2);
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.allocation_len(), 4);
        assert_eq!(&*buffer, &[1, 2]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "set up twice")]
    fn test_double_set_up_panics() {
        let mut channel = Channel::<u16>::new(4);
        channel.set_up(2);
        channel.set_up(2);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "read before set_up")]
    fn test_read_before_set_up_panics() {
        let channel = Channel::<u16>::new(4);
        let _ = channel.as_slice();
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "trimmed")]
    fn test_trim_past_count_panics() {
        let mut channel = Channel::<u16>::new(4);
        channel.set_up(2);
        channel.trim_end(3);
    }
}
