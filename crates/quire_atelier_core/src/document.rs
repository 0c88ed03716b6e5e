//! Per-document compilation state.

use quire_carton::{Bump, String};
use quire_relief::{
    CompilerError, DocumentKind, IntermediateTree, SyntaxNode, TagHelperCatalog,
};

use crate::scanner::TagHelperSelection;

/// One document moving through the pipeline.
///
/// Everything here is private to the document's run. The catalog is shared
/// read-only, so documents can be processed on separate threads.
pub struct CodeDocument<'a> {
    allocator: &'a Bump,
    catalog: &'a TagHelperCatalog,
    pub file_path: String,
    pub kind: DocumentKind,
    /// Namespace computed by the host, used for component scoping.
    pub namespace: Option<String>,
    /// Import trees, visited before the document itself.
    pub imports: Vec<SyntaxNode<'a>>,
    pub syntax_tree: SyntaxNode<'a>,
    pub selection: Option<TagHelperSelection<'a>>,
    /// Set by the host's classification pass.
    pub intermediate: Option<IntermediateTree<'a>>,
    /// Diagnostics not attached to intermediate nodes.
    pub diagnostics: Vec<CompilerError>,
}

impl<'a> CodeDocument<'a> {
    pub fn new(
        allocator: &'a Bump,
        catalog: &'a TagHelperCatalog,
        file_path: impl Into<String>,
        kind: DocumentKind,
        syntax_tree: SyntaxNode<'a>,
    ) -> Self {
        Self {
            allocator,
            catalog,
            file_path: file_path.into(),
            kind,
            namespace: None,
            imports: Vec::new(),
            syntax_tree,
            selection: None,
            intermediate: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_imports(mut self, imports: impl IntoIterator<Item = SyntaxNode<'a>>) -> Self {
        self.imports.extend(imports);
        self
    }

    #[inline]
    pub fn allocator(&self) -> &'a Bump {
        self.allocator
    }

    #[inline]
    pub fn catalog(&self) -> &'a TagHelperCatalog {
        self.catalog
    }

    /// Document diagnostics followed by intermediate node diagnostics.
    pub fn all_diagnostics(&self) -> Vec<CompilerError> {
        let mut all = self.diagnostics.clone();
        if let Some(tree) = &self.intermediate {
            all.extend(tree.all_diagnostics());
        }
        all
    }
}
