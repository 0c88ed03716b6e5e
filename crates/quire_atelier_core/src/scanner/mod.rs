//! Directive scanning.
//!
//! Computes which descriptors of the catalog apply to one document. Classic
//! templates opt in with `@addTagHelper`/`@removeTagHelper`; component
//! documents see every component whose namespace is in scope or imported
//! with `@using`. Imports are visited before the document.

mod classic;
mod component;

pub use classic::ClassicDirectiveVisitor;
pub use component::ComponentDirectiveVisitor;

use quire_carton::String;
use quire_relief::{CompilerError, Directive, SyntaxNode, TagHelperDescriptor};

use crate::CodeDocument;

/// Descriptors applicable to one document.
#[derive(Debug, Clone, Default)]
pub struct TagHelperSelection<'a> {
    pub tag_helpers: Vec<&'a TagHelperDescriptor>,
    /// `@tagHelperPrefix` in effect. Always `None` for components.
    pub prefix: Option<String>,
    pub diagnostics: Vec<CompilerError>,
}

/// Visits every directive of a document and its imports.
pub trait DirectiveVisitor<'a> {
    fn visit_directive(&mut self, directive: &'a Directive<'a>, in_import: bool);

    fn finish(self) -> TagHelperSelection<'a>;
}

fn visit_tree<'a>(visitor: &mut impl DirectiveVisitor<'a>, tree: SyntaxNode<'a>, in_import: bool) {
    tree.walk(&mut |node| {
        if let SyntaxNode::Directive(directive) = node {
            visitor.visit_directive(directive, in_import);
        }
    });
}

fn run<'a>(mut visitor: impl DirectiveVisitor<'a>, document: &CodeDocument<'a>) -> TagHelperSelection<'a> {
    for import in &document.imports {
        visit_tree(&mut visitor, *import, true);
    }
    visit_tree(&mut visitor, document.syntax_tree, false);
    visitor.finish()
}

/// Select the tag helpers in scope for `document`.
pub fn select_tag_helpers<'a>(document: &CodeDocument<'a>) -> TagHelperSelection<'a> {
    let selection = if document.kind.is_component() {
        run(
            ComponentDirectiveVisitor::new(document.catalog(), document.namespace.as_deref()),
            document,
        )
    } else {
        run(ClassicDirectiveVisitor::new(document.catalog()), document)
    };
    tracing::debug!(
        file = %document.file_path,
        selected = selection.tag_helpers.len(),
        prefix = ?selection.prefix,
        diagnostics = selection.diagnostics.len(),
        "selected tag helpers"
    );
    selection
}
