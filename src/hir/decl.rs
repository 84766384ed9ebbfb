//! The declaration table and write-once scaffold fields.
//!
//! Every scaffold element, written or inferred, has a [`DeclHeader`]: the
//! data the diagnostics engine needs to point at it (unit, span,
//! surrounding declarations) and to follow it back through macro expansion.

use std::fmt;

use text_size::TextRange;

use crate::base::FileId;
use crate::error::CompileError;

use super::ids::DeclId;

// ============================================================================
// DECLARATION HEADERS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Classifier,
    ClassifierModifier,
    Enumeration,
    EnumerationLiteral,
    DataTypeProperty,
    ReferenceProperty,
    PropertyModifier,
    Validation,
    OrderByMember,
    Association,
    Projection,
    ProjectionMember,
    ServiceGroup,
    Url,
    UrlParameter,
    Service,
    ServiceCriteria,
}

/// What every declaration knows about itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclHeader {
    pub kind: DeclKind,
    pub unit: FileId,
    /// Span of the whole declaration.
    pub range: TextRange,
    /// The declaration whose expansion synthesized this one.
    pub macro_origin: Option<DeclId>,
    /// Declarations whose first line is shown with this one's errors.
    pub surrounding: Vec<DeclId>,
}

impl DeclHeader {
    /// True if synthesized rather than written by the user.
    #[inline]
    pub fn is_inferred(&self) -> bool {
        self.macro_origin.is_some()
    }
}

/// Arena of declaration headers; a [`DeclId`] is the declaration's ordinal.
#[derive(Clone, Debug, Default)]
pub struct DeclTable {
    headers: Vec<DeclHeader>,
}

impl DeclTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, header: DeclHeader) -> DeclId {
        let id = DeclId::next(self.headers.len());
        self.headers.push(header);
        id
    }

    #[inline]
    pub fn get(&self, id: DeclId) -> Option<&DeclHeader> {
        self.headers.get(id.as_usize())
    }

    pub fn is_inferred(&self, id: DeclId) -> bool {
        self.get(id).is_some_and(DeclHeader::is_inferred)
    }

    /// The macro origins of `id`, nearest first.
    pub fn macro_chain(&self, id: DeclId) -> impl Iterator<Item = DeclId> + '_ {
        let mut current = self.get(id).and_then(|h| h.macro_origin);
        std::iter::from_fn(move || {
            let next = current?;
            current = self.get(next).and_then(|h| h.macro_origin);
            Some(next)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &DeclHeader)> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| (DeclId::next(i), header))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

// ============================================================================
// WRITE-ONCE FIELDS
// ============================================================================

/// A scaffold field that is entered exactly once.
///
/// Entering a second value is a pipeline bug, reported as
/// [`CompileError::WriteOnceViolated`].
#[derive(Clone, PartialEq, Eq)]
pub struct WriteOnce<T> {
    field: &'static str,
    value: Option<T>,
}

impl<T> WriteOnce<T> {
    #[inline]
    pub const fn new(field: &'static str) -> Self {
        Self { field, value: None }
    }

    /// A field whose value is known when the element is lowered.
    pub fn entered(field: &'static str, value: T) -> Self {
        Self {
            field,
            value: Some(value),
        }
    }

    pub fn enter(&mut self, value: T) -> Result<(), CompileError> {
        if self.value.is_some() {
            tracing::error!(field = self.field, "write-once field entered twice");
            return Err(CompileError::WriteOnceViolated { field: self.field });
        }
        self.value = Some(value);
        Ok(())
    }

    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    #[inline]
    pub fn field(&self) -> &'static str {
        self.field
    }
}

impl<T: Clone> WriteOnce<T> {
    /// The value, or `UnresolvedAfterCheck` naming the field.
    pub fn require(&self) -> Result<T, CompileError> {
        self.value
            .clone()
            .ok_or_else(|| CompileError::unresolved(self.field))
    }
}

impl<T: fmt::Debug> fmt::Debug for WriteOnce<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={:?}", self.field, value),
            None => write!(f, "{}=<unset>", self.field),
        }
    }
}
