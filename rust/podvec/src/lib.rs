//! A growable, contiguous vector of plain-old-data elements with explicit,
//! fallible allocation.
//!
//! [`PodVec`] is conceptually similar to a `Vec<T>` restricted to bitwise-
//! copyable element types, with two deliberate differences:
//!
//! - Every capacity-increasing operation reports allocation failure as a
//!   [`Result`] instead of aborting, and leaves the vector untouched when it
//!   fails.
//! - The growth policy is observable and guaranteed: capacity doubles from 1,
//!   so it is always a power of two once the vector is non-empty, and the
//!   exact capacity can be pinned with [`PodVec::reallocate`].
//!
//! Elements may be edited at both ends ([`PodVec::push`]/[`PodVec::pop`],
//! [`PodVec::push_front`]/[`PodVec::pop_front`]) and at arbitrary positions
//! ([`PodVec::insert`]/[`PodVec::remove`]); interior edits relocate the
//! affected sub-range with a single bulk copy.

pub mod vec;

pub use podvec_alloc::AllocError;
pub use vec::PodVec;
