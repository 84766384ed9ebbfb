//! Typed arena identifiers.
//!
//! Every scaffold element gets an id when it is lowered. The frozen domain
//! model keeps the same ids, so an id taken from the scaffold indexes the
//! matching frozen element.

use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            /// Get the raw index.
            #[inline]
            pub const fn index(self) -> u32 {
                self.0
            }

            #[inline]
            pub const fn as_usize(self) -> usize {
                self.0 as usize
            }

            pub(crate) fn next(len: usize) -> Self {
                Self(len as u32)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl From<u32> for $name {
            #[inline]
            fn from(id: u32) -> Self {
                Self(id)
            }
        }
    };
}

arena_id!(
    /// Any declaration: the key of the declaration table.
    ///
    /// Assigned in declaration order, so the raw index is the declaration's
    /// ordinal.
    DeclId
);
arena_id!(
    /// A class or an interface.
    ClassifierId
);
arena_id!(EnumerationId);
arena_id!(
    /// A primitive or enumeration-typed property.
    PropertyId
);
arena_id!(
    /// An association end or an association end signature.
    ReferenceId
);
arena_id!(AssociationId);
arena_id!(ProjectionId);
arena_id!(
    /// A member of a projection body, at any depth.
    ProjectionNodeId
);
arena_id!(ServiceGroupId);
arena_id!(UrlId);
arena_id!(ServiceId);
arena_id!(
    /// A url path or query parameter.
    ParameterId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_order_by_allocation() {
        let a = ClassifierId::next(0);
        let b = ClassifierId::next(1);

        assert!(a < b);
        assert_eq!(b.index(), 1);
        assert_eq!(b.as_usize(), 1);
    }

    #[test]
    fn test_id_debug_names_the_arena() {
        assert_eq!(format!("{:?}", ReferenceId::new(3)), "ReferenceId(3)");
        assert_eq!(format!("{:?}", DeclId::from(7)), "DeclId(7)");
    }

    #[test]
    fn test_id_size() {
        assert_eq!(std::mem::size_of::<DeclId>(), 4);
    }
}
