//! Raw, fallible element-array allocation for the podvec container.
//!
//! This crate provides [`RawArray`], a low-level owner of a contiguous block of
//! uninitialized element slots. It is the single primitive through which all
//! capacity changes funnel: the container above it decides *when* to grow, this
//! crate decides *how* a block of `capacity` slots is obtained, moved and
//! released.
//!
//! Allocation failure is reported as an explicit [`AllocError`] rather than an
//! abort, and a failed reallocation leaves the array exactly as it was.

use std::alloc::{Layout, alloc, dealloc, realloc};
use std::ptr::NonNull;

use thiserror::Error;

/// Error raised when an element-array allocation cannot be satisfied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocError {
    /// The requested capacity does not fit in a valid allocation layout
    /// (`capacity * elem_size` overflows `isize::MAX`).
    #[error("capacity overflow: {capacity} elements of {elem_size} bytes each")]
    CapacityOverflow { capacity: usize, elem_size: usize },

    /// The underlying allocator could not provide the requested block.
    #[error("allocation of {bytes} bytes failed")]
    Exhausted { bytes: usize },
}

/// An owned, contiguous block of `capacity` uninitialized slots of type `T`.
///
/// `RawArray` tracks only the pointer and the slot count. It never reads,
/// writes, relocates or drops individual elements (beyond the byte move
/// performed by `realloc` itself); which slots hold live values is entirely
/// the caller's concern. Dropping the array releases the block without
/// running any element destructors.
///
/// A zero-capacity array holds a dangling, well-aligned pointer and owns no
/// allocation. Zero-sized element types never allocate at all; for them the
/// capacity is pure bookkeeping.
pub struct RawArray<T> {
    /// Start of the allocated block, or dangling when nothing is allocated.
    ptr: NonNull<T>,
    /// Number of slots backed by the allocation.
    capacity: usize,
}

impl<T> RawArray<T> {
    /// Creates an empty array with no backing allocation.
    ///
    /// This cannot fail: no memory is requested until the first
    /// [`reallocate`](Self::reallocate) call.
    pub fn new() -> RawArray<T> {
        RawArray {
            ptr: NonNull::dangling(),
            capacity: 0,
        }
    }

    /// Returns the number of slots backed by the current allocation.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns a pointer to the first slot.
    ///
    /// The pointer is dangling (but well-aligned and non-null) when the
    /// capacity is zero or `T` is zero-sized. It is invalidated by the next
    /// successful [`reallocate`](Self::reallocate) and by dropping the array.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Returns a mutable pointer to the first slot.
    ///
    /// Same validity rules as [`as_ptr`](Self::as_ptr).
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Resizes the block to exactly `new_capacity` slots.
    ///
    /// Growing and shrinking both go through the allocator's `realloc`, which
    /// preserves the byte contents of the slots that survive. Resizing to
    /// zero releases the block and returns the array to its unallocated
    /// state.
    ///
    /// The block may move: any previously obtained pointer is stale after a
    /// successful call.
    ///
    /// # Errors
    ///
    /// Fails with [`AllocError::CapacityOverflow`] when `new_capacity` slots
    /// cannot be described by a valid layout, and with
    /// [`AllocError::Exhausted`] when the allocator returns null. In both
    /// cases the array (pointer, capacity, block contents) is left exactly as
    /// it was before the call.
    pub fn reallocate(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        if new_capacity == self.capacity {
            return Ok(());
        }
        if std::mem::size_of::<T>() == 0 {
            // Nothing to allocate; the capacity is bookkeeping only.
            self.capacity = new_capacity;
            return Ok(());
        }
        if new_capacity == 0 {
            self.release();
            return Ok(());
        }

        let new_layout =
            Layout::array::<T>(new_capacity).map_err(|_| AllocError::CapacityOverflow {
                capacity: new_capacity,
                elem_size: std::mem::size_of::<T>(),
            })?;

        let block = if self.capacity == 0 {
            unsafe { alloc(new_layout) }
        } else {
            let old_layout = Layout::array::<T>(self.capacity).expect("current layout");
            unsafe { realloc(self.ptr.as_ptr().cast::<u8>(), old_layout, new_layout.size()) }
        };

        match NonNull::new(block.cast::<T>()) {
            Some(ptr) => {
                self.ptr = ptr;
                self.capacity = new_capacity;
                Ok(())
            }
            // On failure realloc leaves the original block untouched.
            None => Err(AllocError::Exhausted {
                bytes: new_layout.size(),
            }),
        }
    }

    /// Releases the backing block, if any, and returns to the unallocated
    /// state.
    fn release(&mut self) {
        if self.capacity != 0 && std::mem::size_of::<T>() != 0 {
            let layout = Layout::array::<T>(self.capacity).expect("current layout");
            unsafe {
                dealloc(self.ptr.as_ptr().cast::<u8>(), layout);
            }
        }
        self.ptr = NonNull::dangling();
        self.capacity = 0;
    }
}

impl<T> Drop for RawArray<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> Default for RawArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: RawArray owns its block exclusively and holds no interior
// references; it can move between threads whenever the element type can.
unsafe impl<T: Send> Send for RawArray<T> {}

// SAFETY: shared access exposes only the pointer and the capacity; the
// uninitialized slots are never read through a shared reference.
unsafe impl<T: Sync> Sync for RawArray<T> {}

impl<T> std::fmt::Debug for RawArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawArray")
            .field("ptr", &self.ptr)
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_unallocated() {
        let arr = RawArray::<u64>::new();
        assert_eq!(arr.capacity(), 0);
        assert!(!arr.as_ptr().is_null());
        assert_eq!(arr.as_ptr() as usize % std::mem::align_of::<u64>(), 0);
    }

    #[test]
    fn test_reallocate_grow_and_shrink() {
        let mut arr = RawArray::<u32>::new();
        arr.reallocate(8).unwrap();
        assert_eq!(arr.capacity(), 8);

        // Fill the slots, then shrink and check the survivors.
        for i in 0..8 {
            unsafe { arr.as_mut_ptr().add(i).write(i as u32 * 10) };
        }
        arr.reallocate(4).unwrap();
        assert_eq!(arr.capacity(), 4);
        for i in 0..4 {
            assert_eq!(unsafe { arr.as_ptr().add(i).read() }, i as u32 * 10);
        }

        arr.reallocate(16).unwrap();
        assert_eq!(arr.capacity(), 16);
        for i in 0..4 {
            assert_eq!(unsafe { arr.as_ptr().add(i).read() }, i as u32 * 10);
        }
    }

    #[test]
    fn test_reallocate_to_zero_releases() {
        let mut arr = RawArray::<u32>::new();
        arr.reallocate(32).unwrap();
        arr.reallocate(0).unwrap();
        assert_eq!(arr.capacity(), 0);

        // Reusable after release.
        arr.reallocate(2).unwrap();
        assert_eq!(arr.capacity(), 2);
    }

    #[test]
    fn test_reallocate_same_capacity_is_noop() {
        let mut arr = RawArray::<u32>::new();
        arr.reallocate(4).unwrap();
        let ptr = arr.as_ptr();
        arr.reallocate(4).unwrap();
        assert_eq!(arr.as_ptr(), ptr);
        assert_eq!(arr.capacity(), 4);
    }

    #[test]
    fn test_capacity_overflow_leaves_state_unchanged() {
        let mut arr = RawArray::<u64>::new();
        arr.reallocate(4).unwrap();
        let ptr = arr.as_ptr();

        let err = arr.reallocate(usize::MAX).unwrap_err();
        assert!(matches!(err, AllocError::CapacityOverflow { .. }));
        assert_eq!(arr.capacity(), 4);
        assert_eq!(arr.as_ptr(), ptr);
    }

    #[test]
    fn test_zero_sized_elements_never_allocate() {
        let mut arr = RawArray::<()>::new();
        arr.reallocate(usize::MAX).unwrap();
        assert_eq!(arr.capacity(), usize::MAX);
        arr.reallocate(0).unwrap();
        assert_eq!(arr.capacity(), 0);
    }

    #[test]
    fn test_error_display() {
        let err = AllocError::Exhausted { bytes: 1024 };
        assert_eq!(err.to_string(), "allocation of 1024 bytes failed");
    }
}
