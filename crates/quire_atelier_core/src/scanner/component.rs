//! Namespace and `@using` scoping for component documents.

use quire_carton::is_namespace_in_scope;
use quire_relief::{CompilerError, Directive, DirectiveKind, TagHelperCatalog, TagHelperDescriptor};

use super::{DirectiveVisitor, TagHelperSelection};

/// Namespace imported by a plain `@using` directive.
///
/// `@using static ...` and alias directives do not import components.
fn using_namespace(value: &str) -> Option<&str> {
    let value = value.trim().trim_end_matches(';').trim();
    if value.is_empty() || value.starts_with("static ") || value.contains('=') {
        return None;
    }
    Some(value)
}

pub struct ComponentDirectiveVisitor<'a> {
    selected: Vec<&'a TagHelperDescriptor>,
    /// Component descriptors not yet in scope.
    pending: Vec<&'a TagHelperDescriptor>,
    diagnostics: Vec<CompilerError>,
}

impl<'a> ComponentDirectiveVisitor<'a> {
    pub fn new(catalog: &'a TagHelperCatalog, current_namespace: Option<&str>) -> Self {
        let current_namespace = current_namespace.unwrap_or_default();
        let (selected, pending): (Vec<_>, Vec<_>) = catalog
            .iter()
            .filter(|descriptor| descriptor.kind.is_component_document_kind())
            .partition(|descriptor| {
                descriptor.is_fully_qualified_name_match()
                    || is_namespace_in_scope(descriptor.type_namespace(), current_namespace)
            });
        Self {
            selected,
            pending,
            diagnostics: Vec::new(),
        }
    }

    fn import_namespace(&mut self, namespace: &str) {
        let (imported, pending): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|descriptor| descriptor.type_namespace() == namespace);
        tracing::trace!(namespace, imported = imported.len(), "using directive");
        self.selected.extend(imported);
        self.pending = pending;
    }
}

impl<'a> DirectiveVisitor<'a> for ComponentDirectiveVisitor<'a> {
    fn visit_directive(&mut self, directive: &'a Directive<'a>, in_import: bool) {
        match directive.kind {
            DirectiveKind::Using => {
                if let Some(namespace) = using_namespace(directive.value_text()) {
                    self.import_namespace(namespace);
                }
            }
            kind if kind.is_tag_helper_directive() => {
                if !in_import {
                    self.diagnostics.push(CompilerError::unsupported_directive(
                        directive.span,
                        directive.keyword.text,
                    ));
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> TagHelperSelection<'a> {
        TagHelperSelection {
            tag_helpers: self.selected,
            prefix: None,
            diagnostics: self.diagnostics,
        }
    }
}
