//! Compilation units: the inputs of one compilation.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::base::{FileId, LineCol, LineIndex, TextSize};
use crate::error::CompileError;
use crate::syntax::{Parse, SyntaxNode};

use super::decl::DeclTable;
use super::ids::DeclId;

/// One source text with its syntax tree.
///
/// Macro units carry the declaration whose expansion produced them.
#[derive(Clone, Debug)]
pub struct CompilationUnit {
    id: FileId,
    source_name: Arc<str>,
    text: Arc<str>,
    line_index: LineIndex,
    parse: Parse,
    macro_element: Option<DeclId>,
}

impl CompilationUnit {
    #[inline]
    pub fn id(&self) -> FileId {
        self.id
    }

    /// Registration order, used to sort diagnostics.
    #[inline]
    pub fn ordinal(&self) -> u32 {
        self.id.index()
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn source_name_arc(&self) -> Arc<str> {
        self.source_name.clone()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn text_arc(&self) -> Arc<str> {
        self.text.clone()
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn parse(&self) -> &Parse {
        &self.parse
    }

    pub fn syntax(&self) -> SyntaxNode {
        self.parse.syntax()
    }

    pub fn macro_element(&self) -> Option<DeclId> {
        self.macro_element
    }

    #[inline]
    pub fn is_macro(&self) -> bool {
        self.macro_element.is_some()
    }

    pub fn line_col(&self, offset: TextSize) -> LineCol {
        self.line_index.line_col(offset)
    }
}

/// All compilation units of one compilation, in registration order.
#[derive(Clone, Debug, Default)]
pub struct SourceRoot {
    units: IndexMap<FileId, CompilationUnit>,
}

impl SourceRoot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source text, parsing it with the reference reader.
    pub fn add_source(&mut self, source_name: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> FileId {
        let text = text.into();
        let parse = crate::syntax::parse(&text);
        self.insert(source_name.into(), text, parse, None)
    }

    /// Add a source text with a syntax tree produced elsewhere.
    pub fn add_parsed(
        &mut self,
        source_name: impl Into<Arc<str>>,
        text: impl Into<Arc<str>>,
        parse: Parse,
    ) -> FileId {
        self.insert(source_name.into(), text.into(), parse, None)
    }

    /// Add a unit synthesized while expanding `macro_element`.
    pub fn add_macro_unit(
        &mut self,
        name: &str,
        text: impl Into<Arc<str>>,
        parse: Parse,
        macro_element: DeclId,
    ) -> Result<FileId, CompileError> {
        if !name.contains("macro") {
            return Err(CompileError::InvalidMacroUnit {
                name: name.to_string(),
            });
        }
        Ok(self.insert(Arc::from(name), text.into(), parse, Some(macro_element)))
    }

    fn insert(
        &mut self,
        source_name: Arc<str>,
        text: Arc<str>,
        parse: Parse,
        macro_element: Option<DeclId>,
    ) -> FileId {
        let id = FileId::new(self.units.len() as u32);
        let unit = CompilationUnit {
            id,
            source_name,
            line_index: LineIndex::new(&text),
            text,
            parse,
            macro_element,
        };
        self.units.insert(id, unit);
        id
    }

    pub fn get(&self, file: FileId) -> Option<&CompilationUnit> {
        self.units.get(&file)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompilationUnit> + '_ {
        self.units.values()
    }

    /// Units supplied by the caller, macro units excluded.
    pub fn source_units(&self) -> impl Iterator<Item = &CompilationUnit> + '_ {
        self.units.values().filter(|unit| !unit.is_macro())
    }

    /// Display path of a unit.
    ///
    /// A source unit shows the last `/` segment of its name. A macro unit
    /// shows where its macro element sits, then its own name:
    /// `model.klass:3:12 --> Temporal modifier macro`.
    pub fn full_path(&self, file: FileId, decls: &DeclTable) -> String {
        let Some(unit) = self.get(file) else {
            return file.to_string();
        };
        let Some(element) = unit.macro_element() else {
            let name = unit.source_name();
            return name.rsplit('/').next().unwrap_or(name).to_string();
        };
        let Some(header) = decls.get(element) else {
            return unit.source_name().to_string();
        };
        let origin_path = self.full_path(header.unit, decls);
        let position = self
            .get(header.unit)
            .map(|u| u.line_col(header.range.start()))
            .unwrap_or_default();
        format!(
            "{origin_path}:{}:{} --> {}",
            position.line_one_indexed(),
            position.col,
            unit.source_name()
        )
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::decl::{DeclHeader, DeclKind};
    use crate::syntax::parse_members;
    use text_size::TextRange;

    #[test]
    fn test_units_are_numbered_in_order() {
        let mut root = SourceRoot::new();
        let a = root.add_source("models/a.klass", "package a");
        let b = root.add_source("models/b.klass", "package b");

        assert_eq!(root.len(), 2);
        assert!(a < b);
        assert_eq!(root.get(b).unwrap().ordinal(), 1);
        assert!(root.get(a).unwrap().parse().ok());
    }

    #[test]
    fn test_full_path_of_source_unit() {
        let mut root = SourceRoot::new();
        let file = root.add_source("src/main/klass/model.klass", "package a");

        assert_eq!(root.full_path(file, &DeclTable::new()), "model.klass");
    }

    #[test]
    fn test_full_path_of_macro_unit() {
        let text = "package a\nclass A validTemporal {}";
        let mut root = SourceRoot::new();
        let file = root.add_source("dir/model.klass", text);

        let mut decls = DeclTable::new();
        let offset = TextSize::from(text.find("validTemporal").unwrap() as u32);
        let modifier = decls.alloc(DeclHeader {
            kind: DeclKind::ClassifierModifier,
            unit: file,
            range: TextRange::at(offset, TextSize::from(13)),
            macro_origin: None,
            surrounding: Vec::new(),
        });

        let body = "valid: TemporalRange? valid private;";
        let macro_unit = root
            .add_macro_unit("Temporal modifier macro", body, parse_members(body), modifier)
            .unwrap();

        assert_eq!(
            root.full_path(macro_unit, &decls),
            "model.klass:2:8 --> Temporal modifier macro"
        );
        assert_eq!(root.source_units().count(), 1);
    }

    #[test]
    fn test_macro_unit_name_must_say_macro() {
        let mut root = SourceRoot::new();
        let result = root.add_macro_unit("inferred", "", parse_members(""), DeclId::new(0));

        assert!(matches!(result, Err(CompileError::InvalidMacroUnit { .. })));
    }
}
