//! Compiler options.

/// Options for one compilation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Infer `valid*` / `system*` properties from temporal class modifiers.
    pub infer_temporal_properties: bool,
    /// Infer `version` / `conflict` criteria on versioned services.
    pub infer_service_criteria: bool,
    /// Lines of source captured around each offending line.
    pub context_lines: usize,
    /// Separator between package segments in qualified names.
    pub package_separator: char,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            infer_temporal_properties: true,
            infer_service_criteria: true,
            context_lines: 1,
            package_separator: '.',
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temporal_inference(mut self, enabled: bool) -> Self {
        self.infer_temporal_properties = enabled;
        self
    }

    pub fn with_service_criteria_inference(mut self, enabled: bool) -> Self {
        self.infer_service_criteria = enabled;
        self
    }

    pub fn with_context_lines(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }

    pub fn with_package_separator(mut self, separator: char) -> Self {
        self.package_separator = separator;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CompilerOptions::default();
        assert!(options.infer_temporal_properties);
        assert!(options.infer_service_criteria);
        assert_eq!(options.context_lines, 1);
        assert_eq!(options.package_separator, '.');
    }

    #[test]
    fn test_builder_methods() {
        let options = CompilerOptions::new()
            .with_temporal_inference(false)
            .with_context_lines(0)
            .with_package_separator('/');

        assert!(!options.infer_temporal_properties);
        assert!(options.infer_service_criteria);
        assert_eq!(options.context_lines, 0);
        assert_eq!(options.package_separator, '/');
    }
}
