//! Index types for mesh elements.
//!
//! Every element kind gets its own id newtype so that a half-face id can never
//! be passed where a vertex id is expected. Ids are dense `u32` slot indices
//! into an element [`Pool`](super::Pool); `u32::MAX` is reserved as the
//! invalid sentinel.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Trait implemented by every element id type.
///
/// This is the capability the generic [`Pool`](super::Pool) needs: convert
/// between the id and its slot index, and name the element kind for errors.
pub trait ElementId: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// Human readable element kind, used in error messages.
    const KIND: &'static str;

    /// Create an id from a slot index.
    fn new(index: usize) -> Self;

    /// The invalid/null id.
    fn invalid() -> Self;

    /// The slot index.
    fn index(self) -> usize;

    /// Check if this is a valid (non-sentinel) id.
    fn is_valid(self) -> bool;
}

macro_rules! impl_index_type {
    ($(#[$meta:meta])* $name:ident, $display:literal, $kind:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create a new id from a raw slot index.
            ///
            /// # Panics
            /// Panics in debug builds if the index does not fit in 32 bits.
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index < u32::MAX as usize, "index {} too large for u32", index);
                Self(index as u32)
            }

            /// Create an invalid/null id.
            #[inline]
            pub const fn invalid() -> Self {
                Self(u32::MAX)
            }

            /// Get the raw slot index.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Check if this is a valid (non-null) id.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }

        impl ElementId for $name {
            const KIND: &'static str = $kind;

            #[inline]
            fn new(index: usize) -> Self {
                $name::new(index)
            }

            #[inline]
            fn invalid() -> Self {
                $name::invalid()
            }

            #[inline]
            fn index(self) -> usize {
                $name::index(self)
            }

            #[inline]
            fn is_valid(self) -> bool {
                $name::is_valid(self)
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(
    /// A surface mesh vertex id.
    VertexId, "V", "vertex"
);
impl_index_type!(
    /// A surface mesh half-edge id.
    HalfEdgeId, "HE", "half-edge"
);
impl_index_type!(
    /// A surface mesh face id.
    FaceId, "F", "face"
);
impl_index_type!(
    /// A surface mesh edge id (full edge, not half-edge).
    EdgeId, "E", "edge"
);
impl_index_type!(
    /// A tet mesh vertex id. Doubles as the column in the positions buffer.
    TetVertexId, "TV", "tet vertex"
);
impl_index_type!(
    /// A tet mesh half-edge id (one per tet per directed face side).
    TetHalfEdgeId, "THE", "tet half-edge"
);
impl_index_type!(
    /// A tet mesh edge id, shared by every tet around it.
    TetEdgeId, "TE", "tet edge"
);
impl_index_type!(
    /// A tet mesh half-face id (one oriented side of a triangle).
    HalfFaceId, "HF", "half-face"
);
impl_index_type!(
    /// A tet mesh face id, shared by the one or two half-faces on a triangle.
    TetFaceId, "TF", "tet face"
);
impl_index_type!(
    /// A tetrahedron id.
    TetId, "T", "tet"
);
