//! Compilation unit identifiers.

use std::fmt;

/// Identifier of a compilation unit within one compilation.
///
/// Units are numbered in registration order, so the raw index doubles as the
/// unit's ordinal when diagnostics are sorted. Macro units synthesized during
/// inference get ids after every user-supplied unit.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FileId(pub u32);

impl FileId {
    /// Create a new FileId from a raw index.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Index usable for slice access.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

impl From<u32> for FileId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_id_orders_by_registration() {
        let first = FileId::new(0);
        let second = FileId::new(1);

        assert!(first < second);
        assert_eq!(second.as_usize(), 1);
    }

    #[test]
    fn test_file_id_display() {
        assert_eq!(FileId::new(3).to_string(), "unit#3");
        assert_eq!(format!("{:?}", FileId::new(3)), "FileId(3)");
    }
}
