//! Borrowed record views into a response payload
//!
//! A [`View`] reinterprets a slice of payload bytes as records without
//! copying. It borrows the [`Response`](crate::Response) it was built from,
//! so the buffer cannot be reused for the next transaction while the view
//! is alive. Copy records out with `Clone` if they must outlive it.

use core::ops::Index;

use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

/// Bounds-checked sequence of records borrowed from a frame
///
/// Deliberately neither `Clone` nor `Copy`: a view is tied to one
/// transaction and is reset, not duplicated.
#[derive(Debug)]
pub struct View<'a, T> {
    items: &'a [T],
}

impl<'a, T> View<'a, T> {
    /// A view with no records
    pub const fn empty() -> Self {
        Self { items: &[] }
    }

    /// View an existing slice of records
    pub const fn from_slice(items: &'a [T]) -> Self {
        Self { items }
    }

    /// Forget the records this view points at
    pub fn reset(&mut self) {
        self.items = &[];
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Record at `index`, or `None` when out of range
    pub fn get(&self, index: usize) -> Option<&'a T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> core::slice::Iter<'a, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &'a [T] {
        self.items
    }
}

impl<'a, T> View<'a, T>
where
    T: FromBytes + KnownLayout + Immutable + Unaligned,
{
    /// View `bytes` as records
    ///
    /// The count is `bytes.len() / size_of::<T>()`; a trailing partial
    /// record is ignored.
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        let count = bytes
            .len()
            .checked_div(core::mem::size_of::<T>())
            .unwrap_or(0);
        match <[T]>::ref_from_prefix_with_elems(bytes, count) {
            Ok((items, _rest)) => Self { items },
            Err(_) => Self::empty(),
        }
    }
}

impl<T> Default for View<'_, T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Index<usize> for View<'_, T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics when `index >= len()`. Indexing past a view is a bug in the
    /// caller, not a wire error; use [`View::get`] for a checked lookup.
    fn index(&self, index: usize) -> &T {
        match self.items.get(index) {
            Some(item) => item,
            None => {
                error!(
                    "attempted to get idx {}, but only have {} items",
                    index,
                    self.items.len()
                );
                panic!(
                    "view index {} out of range for {} records",
                    index,
                    self.items.len()
                );
            }
        }
    }
}

impl<'a, T> IntoIterator for &View<'a, T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<'a, T> IntoIterator for View<'a, T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
