//! The [`PodVec`] container.

use podvec_alloc::{AllocError, RawArray};

/// A growable sequence of plain-old-data elements backed by a single
/// reallocatable block.
///
/// Live elements occupy positions `[0, len)` of the block in insertion order;
/// the slots between `len` and `capacity` hold unspecified bytes. Capacity
/// grows by doubling (`0 → 1 → 2 → 4 → ...`), which amortizes repeated
/// single-element insertion to O(1) per element.
///
/// The element type must be plain data (`bytemuck::NoUninit +
/// bytemuck::AnyBitPattern`, which implies `Copy`). This is what makes the
/// container's bulk-relocation strategy sound: elements can be moved with a
/// raw byte copy and discarded without running destructors.
///
/// # Failure model
///
/// Operations that may need a larger block (`push`, `push_front`, `insert`,
/// `reserve`, `grow`, `reallocate`, `extend_from_slice`) return
/// `Result<_, AllocError>` and are atomic on failure: length, capacity and
/// contents are exactly as they were before the call. Removal from an empty
/// vector yields `None`; an out-of-range index is a documented panic, never
/// undefined behavior. Callers that have already validated their indices can
/// use the unsafe [`get_unchecked`](Self::get_unchecked) /
/// [`set_unchecked`](Self::set_unchecked) fast paths.
pub struct PodVec<T> {
    /// Backing block of `capacity` slots; element liveness is tracked here.
    store: RawArray<T>,
    /// Number of live elements, `len <= store.capacity()`.
    len: usize,
}

impl<T> PodVec<T>
where
    T: bytemuck::NoUninit + bytemuck::AnyBitPattern,
{
    /// Creates a new empty vector without allocating.
    pub fn new() -> PodVec<T> {
        PodVec {
            store: RawArray::new(),
            len: 0,
        }
    }

    /// Creates a vector containing a copy of the provided slice.
    ///
    /// # Errors
    ///
    /// Fails if the backing block cannot be allocated; no memory is retained
    /// in that case.
    pub fn copy_from_slice(values: &[T]) -> Result<PodVec<T>, AllocError> {
        let mut vec = PodVec::new();
        vec.extend_from_slice(values)?;
        Ok(vec)
    }

    /// Returns the number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the vector contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the vector can hold without
    /// reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Returns a slice of the live elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.store.as_ptr(), self.len) }
    }

    /// Returns a mutable slice of the live elements.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.store.as_mut_ptr(), self.len) }
    }

    /// Returns the live elements viewed as raw bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.as_slice())
    }

    /// Returns an iterator over the live elements.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Ensures the vector can hold at least `capacity` elements without
    /// further reallocation.
    ///
    /// If the current capacity already suffices this is a no-op. Otherwise
    /// the capacity doubles from `max(current, 1)` until it reaches
    /// `capacity`, then the block is reallocated once. The resulting capacity
    /// is therefore always a power of two, never a linear bump to exactly
    /// `capacity`.
    ///
    /// # Errors
    ///
    /// Fails when the doubled capacity cannot be represented or allocated;
    /// the vector is left unchanged.
    pub fn reserve(&mut self, capacity: usize) -> Result<(), AllocError> {
        if capacity <= self.store.capacity() {
            return Ok(());
        }
        let mut target = self.store.capacity().max(1);
        while target < capacity {
            target = target
                .checked_mul(2)
                .ok_or(AllocError::CapacityOverflow {
                    capacity,
                    elem_size: std::mem::size_of::<T>(),
                })?;
        }
        self.store.reallocate(target)
    }

    /// Doubles the capacity (or sets it to 1 when currently 0) with a single
    /// reallocation.
    ///
    /// This is the step every full insertion takes; it is rarely useful to
    /// call directly other than to pre-pay the next reallocation.
    ///
    /// # Errors
    ///
    /// Fails when the doubled capacity cannot be represented or allocated;
    /// the vector is left unchanged.
    #[cold]
    pub fn grow(&mut self) -> Result<(), AllocError> {
        let capacity = self.store.capacity();
        let target = if capacity == 0 {
            1
        } else {
            capacity.checked_mul(2).ok_or(AllocError::CapacityOverflow {
                capacity,
                elem_size: std::mem::size_of::<T>(),
            })?
        };
        self.store.reallocate(target)
    }

    /// Sets the capacity to exactly `new_capacity`, reallocating the block.
    ///
    /// This bypasses the doubling policy and is the primitive the growth
    /// operations funnel through. If `new_capacity` is below the current
    /// length, the length is truncated to `new_capacity` and the elements
    /// beyond it are silently discarded.
    ///
    /// # Errors
    ///
    /// Fails when the block cannot be reallocated; length, capacity and
    /// contents are left unchanged.
    pub fn reallocate(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        self.store.reallocate(new_capacity)?;
        self.len = self.len.min(new_capacity);
        Ok(())
    }

    /// Appends an element at the end.
    ///
    /// # Errors
    ///
    /// Fails when the vector is full and growing fails; the vector is left
    /// unchanged.
    pub fn push(&mut self, value: T) -> Result<(), AllocError> {
        if self.len == self.store.capacity() {
            self.grow()?;
        }
        unsafe {
            self.store.as_mut_ptr().add(self.len).write(value);
        }
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the last element, or `None` if the vector is
    /// empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(unsafe { self.store.as_ptr().add(self.len).read() })
    }

    /// Prepends an element at position 0, shifting all elements right by one.
    ///
    /// # Errors
    ///
    /// Fails when the vector is full and growing fails; the vector is left
    /// unchanged.
    pub fn push_front(&mut self, value: T) -> Result<(), AllocError> {
        self.insert(0, value)
    }

    /// Removes and returns the element at position 0, shifting the remainder
    /// left by one, or `None` if the vector is empty.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        Some(self.remove(0))
    }

    /// Inserts an element at `index`, shifting the elements at
    /// `[index, len)` right by one with a single bulk copy.
    ///
    /// `index == len` appends, `index == 0` prepends.
    ///
    /// # Errors
    ///
    /// Fails when the vector is full and growing fails; the vector is left
    /// unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), AllocError> {
        assert!(
            index <= self.len,
            "insert index {index} out of bounds for length {}",
            self.len
        );
        if self.len == self.store.capacity() {
            self.grow()?;
        }
        unsafe {
            let p = self.store.as_mut_ptr().add(index);
            std::ptr::copy(p, p.add(1), self.len - index);
            p.write(value);
        }
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the element at `index`, shifting the elements at
    /// `(index, len)` left by one with a single bulk copy.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        assert!(
            index < self.len,
            "remove index {index} out of bounds for length {}",
            self.len
        );
        unsafe {
            let p = self.store.as_mut_ptr().add(index);
            let value = p.read();
            std::ptr::copy(p.add(1), p, self.len - index - 1);
            self.len -= 1;
            value
        }
    }

    /// Returns a copy of the element at `index`, or `None` if out of range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<T> {
        self.as_slice().get(index).copied()
    }

    /// Overwrites the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[inline]
    pub fn set(&mut self, index: usize, value: T) {
        assert!(
            index < self.len,
            "set index {index} out of bounds for length {}",
            self.len
        );
        unsafe {
            self.store.as_mut_ptr().add(index).write(value);
        }
    }

    /// Returns a copy of the element at `index` without a bounds check.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len).
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> T {
        debug_assert!(index < self.len);
        unsafe { self.store.as_ptr().add(index).read() }
    }

    /// Overwrites the element at `index` without a bounds check.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len).
    #[inline]
    pub unsafe fn set_unchecked(&mut self, index: usize, value: T) {
        debug_assert!(index < self.len);
        unsafe {
            self.store.as_mut_ptr().add(index).write(value);
        }
    }

    /// Appends all elements from a slice.
    ///
    /// # Errors
    ///
    /// Fails when the required capacity cannot be allocated; the vector is
    /// left unchanged.
    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<(), AllocError> {
        let required = self.len.checked_add(values.len()).expect("add");
        self.reserve(required)?;
        unsafe {
            std::ptr::copy_nonoverlapping(
                values.as_ptr(),
                self.store.as_mut_ptr().add(self.len),
                values.len(),
            );
        }
        self.len = required;
        Ok(())
    }

    /// Shortens the vector to `new_len` elements, discarding the rest.
    ///
    /// Has no effect when `new_len >= len`. The capacity does not change.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len < self.len {
            self.len = new_len;
        }
    }

    /// Removes all elements. The capacity does not change.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<T> Default for PodVec<T>
where
    T: bytemuck::NoUninit + bytemuck::AnyBitPattern,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::ops::Deref for PodVec<T>
where
    T: bytemuck::NoUninit + bytemuck::AnyBitPattern,
{
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T> std::ops::DerefMut for PodVec<T>
where
    T: bytemuck::NoUninit + bytemuck::AnyBitPattern,
{
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T> Clone for PodVec<T>
where
    T: bytemuck::NoUninit + bytemuck::AnyBitPattern,
{
    /// Clones the vector contents into a freshly sized block.
    ///
    /// # Panics
    ///
    /// Panics if the new block cannot be allocated; use
    /// [`PodVec::copy_from_slice`] for a fallible copy.
    fn clone(&self) -> PodVec<T> {
        PodVec::copy_from_slice(self.as_slice()).expect("clone allocation")
    }
}

impl<T> std::fmt::Debug for PodVec<T>
where
    T: bytemuck::NoUninit + bytemuck::AnyBitPattern + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PodVec")
            .field("values", &self.as_slice())
            .field("len", &self.len())
            .field("cap", &self.capacity())
            .finish()
    }
}

impl<T> PartialEq for PodVec<T>
where
    T: bytemuck::NoUninit + bytemuck::AnyBitPattern + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T> Eq for PodVec<T> where T: bytemuck::NoUninit + bytemuck::AnyBitPattern + Eq {}

impl<'a, T> IntoIterator for &'a PodVec<T>
where
    T: bytemuck::NoUninit + bytemuck::AnyBitPattern,
{
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty_and_unallocated() {
        let vec = PodVec::<i32>::new();
        assert_eq!(vec.len(), 0);
        assert_eq!(vec.capacity(), 0);
        assert!(vec.is_empty());
        assert_eq!(vec.as_slice(), &[]);
    }

    #[test]
    fn test_push_and_pop() {
        let mut vec = PodVec::new();
        vec.push(1).unwrap();
        vec.push(2).unwrap();
        vec.push(3).unwrap();
        assert_eq!(vec.as_slice(), &[1, 2, 3]);

        assert_eq!(vec.pop(), Some(3));
        assert_eq!(vec.pop(), Some(2));
        assert_eq!(vec.pop(), Some(1));
        assert_eq!(vec.pop(), None);
        assert!(vec.is_empty());
    }

    #[test]
    fn test_deref_and_indexing() {
        let mut vec = PodVec::copy_from_slice(&[10u8, 20, 30]).unwrap();
        assert_eq!(vec[1], 20);
        vec[1] = 25;
        assert_eq!(vec.as_slice(), &[10, 25, 30]);
        assert_eq!(vec.iter().copied().sum::<u8>(), 65);
    }

    #[test]
    fn test_as_bytes() {
        let vec = PodVec::copy_from_slice(&[0x0102_0304u32]).unwrap();
        assert_eq!(vec.as_bytes().len(), 4);
        assert_eq!(vec.as_bytes(), &0x0102_0304u32.to_ne_bytes());
    }

    #[test]
    fn test_eq_clone_debug() {
        let vec = PodVec::copy_from_slice(&[1i64, 2, 3]).unwrap();
        let clone = vec.clone();
        assert_eq!(vec, clone);

        let debug = format!("{vec:?}");
        assert!(debug.contains("values"));
        assert!(debug.contains("len"));
        assert!(debug.contains("cap"));
    }

    #[test]
    #[should_panic(expected = "insert index 3 out of bounds")]
    fn test_insert_out_of_bounds_panics() {
        let mut vec = PodVec::copy_from_slice(&[1, 2]).unwrap();
        let _ = vec.insert(3, 9);
    }

    #[test]
    #[should_panic(expected = "remove index 2 out of bounds")]
    fn test_remove_out_of_bounds_panics() {
        let mut vec = PodVec::copy_from_slice(&[1, 2]).unwrap();
        vec.remove(2);
    }

    #[test]
    #[should_panic(expected = "set index 0 out of bounds")]
    fn test_set_on_empty_panics() {
        let mut vec = PodVec::<u16>::new();
        vec.set(0, 7);
    }
}
