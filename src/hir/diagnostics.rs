//! Diagnostics: compiler annotations and their rendering.
//!
//! Analysis phases record annotations on a [`Reporter`] by declaration and
//! offending span. [`Reporter::finish`] turns them into
//! [`CompilerAnnotation`]s: locations are resolved, context lines are
//! captured, each annotation on an inferred declaration gets a cause chain
//! back through its macro origins, and the list is sorted.
//!
//! Rendering never performs I/O. Styling is a caller-supplied
//! [`AnnotationStyle`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use text_size::TextRange;

use crate::base::FileId;
use crate::config::CompilerOptions;

use super::decl::DeclTable;
use super::ids::DeclId;
use super::input::SourceRoot;

// ============================================================================
// SEVERITY AND CODES
// ============================================================================

/// Severity of an annotation. Errors order before warnings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        }
    }

    /// Workflow command name for CI annotations.
    pub fn github_command(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// Stable annotation codes.
pub mod codes {
    pub const ERR_SYNTAX: &str = "ERR_SYNTAX";

    // Names and types
    pub const ERR_DUP_TOP: &str = "ERR_DUP_TOP";
    pub const ERR_DUP_MEM: &str = "ERR_DUP_MEM";
    pub const ERR_REF_TYP: &str = "ERR_REF_TYP";
    pub const ERR_SUP_TYP: &str = "ERR_SUP_TYP";
    pub const ERR_IMP_INT: &str = "ERR_IMP_INT";
    pub const ERR_DUP_INT: &str = "ERR_DUP_INT";
    pub const ERR_RED_INT: &str = "ERR_RED_INT";
    pub const ERR_INH_CYC: &str = "ERR_INH_CYC";
    pub const ERR_FWD_REF: &str = "ERR_FWD_REF";

    // Reference properties
    pub const ERR_ASO_MUL: &str = "ERR_ASO_MUL";
    pub const ERR_REF_ORD: &str = "ERR_REF_ORD";

    // Member paths and criteria
    pub const ERR_THS_MEM: &str = "ERR_THS_MEM";
    pub const ERR_MEM_TYP: &str = "ERR_MEM_TYP";
    pub const ERR_TYP_MEM: &str = "ERR_TYP_MEM";
    pub const ERR_VAR_REF: &str = "ERR_VAR_REF";
    pub const ERR_OPR_IN: &str = "ERR_OPR_IN";
    pub const ERR_LIT_RNG: &str = "ERR_LIT_RNG";

    // Keys and foreign keys
    pub const ERR_FOR_MUL: &str = "ERR_FOR_MUL";
    pub const ERR_FOR_FIN: &str = "ERR_FOR_FIN";
    pub const ERR_KEY_IDS: &str = "ERR_KEY_IDS";
    pub const ERR_TNS_IDP: &str = "ERR_TNS_IDP";
    pub const ERR_DUP_VAL: &str = "ERR_DUP_VAL";
    pub const ERR_USR_DTP: &str = "ERR_USR_DTP";
    pub const ERR_VER_DTP: &str = "ERR_VER_DTP";

    // Temporal properties
    pub const ERR_TMP_RNG: &str = "ERR_TMP_RNG";
    pub const ERR_TMP_SYS: &str = "ERR_TMP_SYS";
    pub const ERR_TMP_INS: &str = "ERR_TMP_INS";
    pub const ERR_TMP_FTO: &str = "ERR_TMP_FTO";

    // Audit properties
    pub const ERR_AUD_KEY: &str = "ERR_AUD_KEY";
    pub const ERR_AUD_DTP: &str = "ERR_AUD_DTP";
    pub const ERR_AUD_UID: &str = "ERR_AUD_UID";
    pub const ERR_AUD_PRI: &str = "ERR_AUD_PRI";
    pub const ERR_CON_FIN: &str = "ERR_CON_FIN";
    pub const WRN_CRT_NAM: &str = "WRN_CRT_NAM";
    pub const WRN_LUB_NAM: &str = "WRN_LUB_NAM";

    // Projections
    pub const ERR_DUP_PRJ: &str = "ERR_DUP_PRJ";
    pub const ERR_PRJ_DTP: &str = "ERR_PRJ_DTP";
    pub const ERR_PAE_NFD: &str = "ERR_PAE_NFD";
    pub const ERR_PAE_AMB: &str = "ERR_PAE_AMB";
    pub const ERR_PRR_KLS: &str = "ERR_PRR_KLS";
    pub const ERR_PRJ_TYP: &str = "ERR_PRJ_TYP";

    // Services
    pub const ERR_SRG_TYP: &str = "ERR_SRG_TYP";
    pub const ERR_DUP_SVC: &str = "ERR_DUP_SVC";
    pub const ERR_SER_EMP: &str = "ERR_SER_EMP";
    pub const ERR_DUP_URL: &str = "ERR_DUP_URL";
    pub const ERR_DUP_PAR: &str = "ERR_DUP_PAR";
    pub const ERR_DUP_CRI: &str = "ERR_DUP_CRI";
    pub const ERR_VRB_CRT: &str = "ERR_VRB_CRT";
    pub const ERR_SVC_PRJ: &str = "ERR_SVC_PRJ";
}

// ============================================================================
// REPORTER
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Anchor {
    Decl(DeclId),
    /// Syntax errors have a unit but no declaration.
    Unit(FileId),
}

#[derive(Clone, Debug)]
struct PendingAnnotation {
    severity: Severity,
    code: &'static str,
    message: String,
    anchor: Anchor,
    ranges: Vec<TextRange>,
}

/// Collects annotations during analysis.
#[derive(Clone, Debug, Default)]
pub struct Reporter {
    pending: Vec<PendingAnnotation>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an annotation on `decl`. With no `ranges` the whole
    /// declaration is the offending span.
    pub fn add(
        &mut self,
        severity: Severity,
        code: &'static str,
        message: impl Into<String>,
        decl: DeclId,
        ranges: Vec<TextRange>,
    ) {
        self.pending.push(PendingAnnotation {
            severity,
            code,
            message: message.into(),
            anchor: Anchor::Decl(decl),
            ranges,
        });
    }

    pub fn error(&mut self, code: &'static str, message: impl Into<String>, decl: DeclId, ranges: Vec<TextRange>) {
        self.add(Severity::Error, code, message, decl, ranges);
    }

    pub fn warning(&mut self, code: &'static str, message: impl Into<String>, decl: DeclId, ranges: Vec<TextRange>) {
        self.add(Severity::Warning, code, message, decl, ranges);
    }

    pub fn syntax_error(&mut self, unit: FileId, message: impl Into<String>, range: TextRange) {
        self.pending.push(PendingAnnotation {
            severity: Severity::Error,
            code: codes::ERR_SYNTAX,
            message: message.into(),
            anchor: Anchor::Unit(unit),
            ranges: vec![range],
        });
    }

    pub fn error_count(&self) -> usize {
        self.pending.iter().filter(|a| a.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.pending.iter().filter(|a| a.severity == Severity::Warning).count()
    }

    pub fn has_errors(&self) -> bool {
        self.pending.iter().any(|a| a.severity == Severity::Error)
    }

    /// Codes recorded so far, in recording order.
    pub fn codes(&self) -> Vec<&'static str> {
        self.pending.iter().map(|a| a.code).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Resolve every annotation against its sources and sort the result.
    pub fn finish(self, sources: &SourceRoot, decls: &DeclTable, options: &CompilerOptions) -> Vec<CompilerAnnotation> {
        let materializer = Materializer {
            sources,
            decls,
            options,
        };
        let mut annotations: Vec<_> = self
            .pending
            .into_iter()
            .map(|pending| materializer.annotation(pending))
            .collect();
        annotations.sort_by_key(CompilerAnnotation::sort_key);
        annotations
    }
}

struct Materializer<'a> {
    sources: &'a SourceRoot,
    decls: &'a DeclTable,
    options: &'a CompilerOptions,
}

impl Materializer<'_> {
    fn annotation(&self, pending: PendingAnnotation) -> CompilerAnnotation {
        let code: Arc<str> = Arc::from(pending.code);
        let message: Arc<str> = Arc::from(pending.message);
        match pending.anchor {
            Anchor::Decl(decl) => self.decl_annotation(pending.severity, code, message, decl, pending.ranges),
            Anchor::Unit(unit) => {
                let locations: Vec<_> = pending.ranges.iter().map(|r| self.locate(unit, *r)).collect();
                let context = self.context(unit, &pending.ranges, &[]);
                CompilerAnnotation {
                    severity: pending.severity,
                    code,
                    message,
                    decl: None,
                    location: locations.first().cloned().unwrap_or_else(|| self.locate(unit, TextRange::default())),
                    locations,
                    context,
                    cause: None,
                }
            }
        }
    }

    fn decl_annotation(
        &self,
        severity: Severity,
        code: Arc<str>,
        message: Arc<str>,
        decl: DeclId,
        ranges: Vec<TextRange>,
    ) -> CompilerAnnotation {
        let (unit, ranges, surrounding) = match self.decls.get(decl) {
            Some(header) => {
                let ranges = if ranges.is_empty() { vec![header.range] } else { ranges };
                (header.unit, ranges, header.surrounding.clone())
            }
            None => (FileId::new(0), ranges, Vec::new()),
        };
        let locations: Vec<_> = ranges.iter().map(|r| self.locate(unit, *r)).collect();
        let context = self.context(unit, &ranges, &surrounding);
        let cause = self
            .decls
            .get(decl)
            .and_then(|header| header.macro_origin)
            .map(|origin| Box::new(self.decl_annotation(severity, code.clone(), message.clone(), origin, Vec::new())));

        CompilerAnnotation {
            severity,
            code,
            message,
            decl: Some(decl),
            location: locations.first().cloned().unwrap_or_else(|| self.locate(unit, TextRange::default())),
            locations,
            context,
            cause,
        }
    }

    fn locate(&self, unit: FileId, range: TextRange) -> SourceLocation {
        let Some(source) = self.sources.get(unit) else {
            return SourceLocation {
                unit,
                source_name: Arc::from(unit.to_string()),
                full_path: Arc::from(unit.to_string()),
                line: 1,
                column: 0,
                end_line: 1,
                end_column: 0,
            };
        };
        let start = source.line_col(range.start());
        let end = source.line_col(range.end());
        SourceLocation {
            unit,
            source_name: source.source_name_arc(),
            full_path: Arc::from(self.sources.full_path(unit, self.decls)),
            line: start.line_one_indexed(),
            column: start.col,
            end_line: end.line_one_indexed(),
            end_column: end.col,
        }
    }

    /// Surrounding declarations' first lines, offending lines with carets,
    /// and `context_lines` neighbours of each offending span.
    fn context(&self, unit: FileId, ranges: &[TextRange], surrounding: &[DeclId]) -> Vec<ContextLine> {
        let Some(source) = self.sources.get(unit) else {
            return Vec::new();
        };
        let index = source.line_index();
        let last_line = index.len().saturating_sub(1) as u32;
        let mut lines: BTreeMap<u32, Vec<(u32, u32)>> = BTreeMap::new();

        for header in surrounding.iter().filter_map(|d| self.decls.get(*d)) {
            if header.unit == unit {
                lines.entry(source.line_col(header.range.start()).line).or_default();
            }
        }
        let context_lines = self.options.context_lines as u32;
        for range in ranges {
            let start = source.line_col(range.start());
            let end = source.line_col(range.end());
            for line in start.line..=end.line {
                let width = index.line_text(source.text(), line).map_or(0, |t| t.len() as u32);
                let from = if line == start.line { start.col } else { 0 };
                let to = if line == end.line { end.col } else { width };
                lines.entry(line).or_default().push((from, to.max(from + 1)));
            }
            for n in 1..=context_lines {
                if let Some(before) = start.line.checked_sub(n) {
                    lines.entry(before).or_default();
                }
                if end.line + n <= last_line {
                    lines.entry(end.line + n).or_default();
                }
            }
        }

        lines
            .into_iter()
            .map(|(line, carets)| ContextLine {
                line: line + 1,
                text: Arc::from(index.line_text(source.text(), line).unwrap_or_default()),
                carets,
            })
            .collect()
    }
}

// ============================================================================
// ANNOTATIONS
// ============================================================================

/// A position in a compilation unit. Lines are 1-based, columns 0-based.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub unit: FileId,
    pub source_name: Arc<str>,
    /// Display path; for macro units it leads back to the macro element.
    pub full_path: Arc<str>,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.full_path, self.line, self.column)
    }
}

/// One line of captured source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextLine {
    /// 1-based.
    pub line: u32,
    pub text: Arc<str>,
    /// Column spans to underline, `[from, to)`.
    pub carets: Vec<(u32, u32)>,
}

/// A reported error or warning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilerAnnotation {
    pub severity: Severity,
    pub code: Arc<str>,
    pub message: Arc<str>,
    /// The offending declaration; `None` for syntax errors.
    pub decl: Option<DeclId>,
    /// Start of the first offending span.
    pub location: SourceLocation,
    pub locations: Vec<SourceLocation>,
    pub context: Vec<ContextLine>,
    /// The same problem seen at the macro element that synthesized the
    /// offending declaration.
    pub cause: Option<Box<CompilerAnnotation>>,
}

impl CompilerAnnotation {
    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// `(severity, unit ordinal, line, column)`.
    pub fn sort_key(&self) -> (Severity, u32, u32, u32) {
        (self.severity, self.location.unit.index(), self.location.line, self.location.column)
    }

    /// The end of the cause chain: a location the user wrote.
    pub fn root_cause(&self) -> &CompilerAnnotation {
        let mut current = self;
        while let Some(cause) = current.cause.as_deref() {
            current = cause;
        }
        current
    }

    pub fn render(&self, style: &dyn AnnotationStyle) -> String {
        const WIDTH: usize = 80;
        let title = format!(" {} ", self.code);
        let side = WIDTH.saturating_sub(title.len()) / 2;
        let banner = format!("{}{}{}", "═".repeat(side), title, "═".repeat(side));

        let mut out = String::new();
        out.push_str(&style.banner(&banner));
        out.push('\n');
        let headline = format!("{}: {}", self.severity.label(), self.message);
        out.push_str(&style.message(self.severity, &headline));
        out.push('\n');
        out.push_str(&format!("At {}\n", style.location(&self.location.to_string())));
        render_context(&self.context, style, &mut out);

        let mut cause = self.cause.as_deref();
        while let Some(current) = cause {
            out.push_str(&format!(
                "Which was generated by macro at location {}\n",
                style.location(&current.location.to_string())
            ));
            render_context(&current.context, style, &mut out);
            cause = current.cause.as_deref();
        }
        out.push_str(&style.banner(&"═".repeat(WIDTH)));
        out.push('\n');
        out
    }

    /// One workflow command line, located at the root cause.
    pub fn to_github_annotation(&self) -> String {
        let location = &self.root_cause().location;
        format!(
            "::{} file={},line={},endLine={},col={},endColumn={},title={}::{}",
            self.severity.github_command(),
            location.source_name,
            location.line,
            location.end_line,
            location.column,
            location.end_column,
            self.code,
            self.message
        )
    }

    pub fn record(&self) -> AnnotationRecord {
        let location = &self.root_cause().location;
        AnnotationRecord {
            file: location.source_name.to_string(),
            path: self.location.full_path.to_string(),
            line: location.line,
            end_line: location.end_line,
            column: location.column,
            end_column: location.end_column,
            severity: self.severity,
            code: self.code.to_string(),
            message: self.message.to_string(),
        }
    }
}

impl fmt::Display for CompilerAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&PlainStyle))
    }
}

fn render_context(context: &[ContextLine], style: &dyn AnnotationStyle, out: &mut String) {
    for line in context {
        out.push_str(&style.line_number(&format!("{:>4}║", line.line)));
        out.push(' ');
        out.push_str(&style.source(&line.text));
        out.push('\n');
        if line.carets.is_empty() {
            continue;
        }
        let width = line.carets.iter().map(|(_, to)| *to).max().unwrap_or(0) as usize;
        let mut marks = vec![' '; width];
        for (from, to) in &line.carets {
            for mark in &mut marks[*from as usize..*to as usize] {
                *mark = '^';
            }
        }
        let marks: String = marks.into_iter().collect();
        out.push_str(&style.line_number("    ║"));
        out.push(' ');
        out.push_str(&style.caret(marks.trim_end()));
        out.push('\n');
    }
}

/// Machine-readable form of an annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AnnotationRecord {
    pub file: String,
    pub path: String,
    pub line: u32,
    pub end_line: u32,
    pub column: u32,
    pub end_column: u32,
    pub severity: Severity,
    pub code: String,
    pub message: String,
}

// ============================================================================
// STYLING
// ============================================================================

/// How rendered annotation parts are decorated. Every method defaults to
/// the identity.
pub trait AnnotationStyle {
    fn banner(&self, text: &str) -> String {
        text.to_owned()
    }

    fn message(&self, _severity: Severity, text: &str) -> String {
        text.to_owned()
    }

    fn location(&self, text: &str) -> String {
        text.to_owned()
    }

    fn line_number(&self, text: &str) -> String {
        text.to_owned()
    }

    fn source(&self, text: &str) -> String {
        text.to_owned()
    }

    fn caret(&self, text: &str) -> String {
        text.to_owned()
    }
}

/// No decoration.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainStyle;

impl AnnotationStyle for PlainStyle {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::decl::{DeclHeader, DeclKind};
    use crate::syntax::parse_members;
    use text_size::TextSize;

    const TEXT: &str = "package p\nclass Foo validTemporal {\n    bar: Bar;\n}";

    fn range_of(text: &str, needle: &str) -> TextRange {
        let start = text.find(needle).unwrap() as u32;
        TextRange::at(TextSize::from(start), TextSize::from(needle.len() as u32))
    }

    fn setup() -> (SourceRoot, DeclTable, DeclId, DeclId) {
        let mut sources = SourceRoot::new();
        let file = sources.add_source("src/model.klass", TEXT);
        let mut decls = DeclTable::new();
        let class = decls.alloc(DeclHeader {
            kind: DeclKind::Classifier,
            unit: file,
            range: range_of(TEXT, "class Foo validTemporal {\n    bar: Bar;\n}"),
            macro_origin: None,
            surrounding: Vec::new(),
        });
        let property = decls.alloc(DeclHeader {
            kind: DeclKind::DataTypeProperty,
            unit: file,
            range: range_of(TEXT, "bar: Bar;"),
            macro_origin: None,
            surrounding: vec![class],
        });
        (sources, decls, class, property)
    }

    #[test]
    fn test_errors_sort_before_warnings() {
        let (sources, decls, class, property) = setup();
        let mut reporter = Reporter::new();
        reporter.warning(codes::WRN_CRT_NAM, "warning", class, Vec::new());
        reporter.error(codes::ERR_REF_TYP, "late error", property, Vec::new());
        reporter.error(codes::ERR_DUP_TOP, "early error", class, Vec::new());

        let annotations = reporter.finish(&sources, &decls, &CompilerOptions::default());
        let codes: Vec<_> = annotations.iter().map(|a| a.code.as_ref()).collect();
        assert_eq!(codes, vec!["ERR_DUP_TOP", "ERR_REF_TYP", "WRN_CRT_NAM"]);
    }

    #[test]
    fn test_location_and_render() {
        let (sources, decls, _, property) = setup();
        let mut reporter = Reporter::new();
        reporter.error(
            codes::ERR_REF_TYP,
            "Cannot find class 'Bar'.",
            property,
            vec![range_of(TEXT, "Bar")],
        );
        let annotation = reporter
            .finish(&sources, &decls, &CompilerOptions::default().with_context_lines(0))
            .remove(0);

        assert_eq!(annotation.location.line, 3);
        assert_eq!(annotation.location.column, 9);
        assert_eq!(annotation.location.to_string(), "model.klass:3:9");

        let rendered = annotation.render(&PlainStyle);
        assert!(rendered.contains(" ERR_REF_TYP "));
        assert!(rendered.contains("Error: Cannot find class 'Bar'."));
        assert!(rendered.contains("At model.klass:3:9"));
        assert!(rendered.contains("   2║ class Foo validTemporal {"));
        assert!(rendered.contains("   3║     bar: Bar;\n    ║          ^^^\n"));
    }

    #[test]
    fn test_github_annotation_format() {
        let (sources, decls, _, property) = setup();
        let mut reporter = Reporter::new();
        reporter.error(codes::ERR_REF_TYP, "Cannot find class 'Bar'.", property, Vec::new());
        let annotation = reporter.finish(&sources, &decls, &CompilerOptions::default()).remove(0);

        assert_eq!(
            annotation.to_github_annotation(),
            "::error file=src/model.klass,line=3,endLine=3,col=4,endColumn=13,title=ERR_REF_TYP::Cannot find class 'Bar'."
        );
        assert_eq!(annotation.record().severity, Severity::Error);
    }

    #[test]
    fn test_macro_cause_chain() {
        let (mut sources, mut decls, class, _) = setup();
        let modifier = decls.alloc(DeclHeader {
            kind: DeclKind::ClassifierModifier,
            unit: FileId::new(0),
            range: range_of(TEXT, "validTemporal"),
            macro_origin: None,
            surrounding: vec![class],
        });
        let body = "valid: TemporalRange? valid private;";
        let unit = sources
            .add_macro_unit("Temporal modifier macro", body, parse_members(body), modifier)
            .unwrap();
        let inferred = decls.alloc(DeclHeader {
            kind: DeclKind::DataTypeProperty,
            unit,
            range: TextRange::at(TextSize::from(0), TextSize::of(body)),
            macro_origin: Some(modifier),
            surrounding: vec![class],
        });

        let mut reporter = Reporter::new();
        reporter.error(codes::ERR_DUP_MEM, "Duplicate member: 'valid'.", inferred, Vec::new());
        let annotation = reporter.finish(&sources, &decls, &CompilerOptions::default()).remove(0);

        assert_eq!(
            annotation.location.to_string(),
            "model.klass:2:10 --> Temporal modifier macro:1:0"
        );
        let cause = annotation.cause.as_deref().unwrap();
        assert_eq!(cause.location.to_string(), "model.klass:2:10");
        assert_eq!(annotation.root_cause().location.source_name.as_ref(), "src/model.klass");

        let rendered = annotation.to_string();
        assert!(rendered.contains("Which was generated by macro at location model.klass:2:10"));
        assert!(rendered.contains("   1║ valid: TemporalRange? valid private;"));
        assert!(annotation.to_github_annotation().contains("file=src/model.klass,line=2,"));
    }

    #[test]
    fn test_syntax_error_has_no_declaration() {
        let (sources, decls, _, _) = setup();
        let mut reporter = Reporter::new();
        reporter.syntax_error(FileId::new(0), "expected ';'", range_of(TEXT, "}"));
        assert!(reporter.has_errors());

        let annotation = reporter.finish(&sources, &decls, &CompilerOptions::default()).remove(0);
        assert_eq!(annotation.decl, None);
        assert_eq!(annotation.location.line, 4);
    }
}
