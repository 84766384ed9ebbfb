//! Fatal pipeline errors.
//!
//! Problems in user input are never `CompileError`s: they are recorded as
//! compiler annotations and analysis continues. A `CompileError` means the
//! pipeline itself broke an invariant, and the run is aborted.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    /// A write-once scaffold field was entered a second time.
    #[error("write-once field `{field}` was set twice")]
    WriteOnceViolated { field: &'static str },

    /// A criteria shape the criteria lowering does not implement.
    #[error("unsupported criteria shape `{shape}` at {location}")]
    UnsupportedCriteria { shape: &'static str, location: String },

    /// Freezing met a reference that should have been reported and blocked.
    #[error("unresolved {what} reached the freeze pipeline")]
    UnresolvedAfterCheck { what: String },

    /// A macro unit was registered under a name that does not say so.
    #[error("macro unit name `{name}` must contain \"macro\"")]
    InvalidMacroUnit { name: String },

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CompileError {
    pub(crate) fn unresolved(what: impl Into<String>) -> Self {
        CompileError::UnresolvedAfterCheck { what: what.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CompileError::WriteOnceViolated { field: "opposite" };
        assert_eq!(err.to_string(), "write-once field `opposite` was set twice");

        let err = CompileError::UnsupportedCriteria {
            shape: "bare value",
            location: "model.klass:4:17".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unsupported criteria shape `bare value` at model.klass:4:17"
        );
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;

        let err = CompileError::Io {
            path: PathBuf::from("missing.klass"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "failed to read missing.klass");
        assert!(err.source().is_some());
    }
}
