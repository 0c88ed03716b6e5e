//! `@addTagHelper` / `@removeTagHelper` / `@tagHelperPrefix` resolution.

use quire_carton::{trim_quotes, String};
use quire_relief::{
    CompilerError, Directive, DirectiveKind, TagHelperCatalog, TagHelperDescriptor,
};

use super::{DirectiveVisitor, TagHelperSelection};

/// `"TypePattern, AssemblyName"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LookupInfo<'s> {
    pub type_pattern: &'s str,
    pub assembly_name: &'s str,
}

impl LookupInfo<'_> {
    /// `*` matches everything, `Name*` matches by prefix, anything else exactly.
    fn matches(&self, descriptor: &TagHelperDescriptor) -> bool {
        if descriptor.assembly_name != self.assembly_name {
            return false;
        }
        if self.type_pattern == "*" {
            return true;
        }
        match self.type_pattern.strip_suffix('*') {
            Some(prefix) => descriptor.name.starts_with(prefix),
            None => descriptor.name == self.type_pattern,
        }
    }
}

pub(crate) fn parse_lookup_text(text: &str) -> Option<LookupInfo<'_>> {
    let text = trim_quotes(text.trim());
    let mut parts = text.split(',');
    let type_pattern = parts.next()?.trim();
    let assembly_name = parts.next()?.trim();
    if parts.next().is_some() || type_pattern.is_empty() || assembly_name.is_empty() {
        return None;
    }
    Some(LookupInfo {
        type_pattern,
        assembly_name,
    })
}

pub struct ClassicDirectiveVisitor<'a> {
    /// Classic descriptors with their catalog index.
    candidates: Vec<(usize, &'a TagHelperDescriptor)>,
    /// Selected catalog indexes in the order they were added.
    selected: Vec<usize>,
    catalog: &'a TagHelperCatalog,
    prefix: Option<String>,
    diagnostics: Vec<CompilerError>,
}

impl<'a> ClassicDirectiveVisitor<'a> {
    pub fn new(catalog: &'a TagHelperCatalog) -> Self {
        let candidates = catalog
            .iter()
            .enumerate()
            .filter(|(_, descriptor)| !descriptor.kind.is_component_document_kind())
            .collect();
        Self {
            candidates,
            selected: Vec::new(),
            catalog,
            prefix: None,
            diagnostics: Vec::new(),
        }
    }

    fn lookup(&mut self, directive: &Directive<'a>) -> Option<LookupInfo<'a>> {
        let Some(lookup) = parse_lookup_text(directive.value_text()) else {
            self.diagnostics.push(CompilerError::invalid_lookup_text(
                directive.value.span,
                directive.value_text(),
            ));
            return None;
        };
        let known_assembly = self
            .candidates
            .iter()
            .any(|(_, descriptor)| descriptor.assembly_name == lookup.assembly_name);
        if !known_assembly {
            self.diagnostics.push(CompilerError::unresolved_assembly(
                directive.value.span,
                lookup.assembly_name,
            ));
            return None;
        }
        Some(lookup)
    }

    fn add(&mut self, lookup: LookupInfo<'_>) {
        for (index, descriptor) in &self.candidates {
            if lookup.matches(descriptor) && !self.selected.contains(index) {
                self.selected.push(*index);
            }
        }
    }

    fn remove(&mut self, lookup: LookupInfo<'_>) {
        let catalog = self.catalog.descriptors();
        self.selected
            .retain(|&index| !lookup.matches(&catalog[index]));
    }
}

impl<'a> DirectiveVisitor<'a> for ClassicDirectiveVisitor<'a> {
    fn visit_directive(&mut self, directive: &'a Directive<'a>, _in_import: bool) {
        match directive.kind {
            DirectiveKind::AddTagHelper => {
                if let Some(lookup) = self.lookup(directive) {
                    tracing::trace!(pattern = lookup.type_pattern, assembly = lookup.assembly_name, "add tag helpers");
                    self.add(lookup);
                }
            }
            DirectiveKind::RemoveTagHelper => {
                if let Some(lookup) = self.lookup(directive) {
                    tracing::trace!(pattern = lookup.type_pattern, assembly = lookup.assembly_name, "remove tag helpers");
                    self.remove(lookup);
                }
            }
            DirectiveKind::TagHelperPrefix => {
                let prefix = trim_quotes(directive.value_text()).trim();
                if !prefix.is_empty() {
                    self.prefix = Some(String::new(prefix));
                }
            }
            DirectiveKind::Using | DirectiveKind::Other => {}
        }
    }

    fn finish(self) -> TagHelperSelection<'a> {
        let catalog = self.catalog.descriptors();
        TagHelperSelection {
            tag_helpers: self.selected.iter().map(|&index| &catalog[index]).collect(),
            prefix: self.prefix,
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_carton::Bump;
    use quire_relief::{DocumentKind, SyntaxFactory, TagHelperKind, TagMatchingRule};

    use crate::{scanner::select_tag_helpers, CodeDocument};

    fn catalog() -> TagHelperCatalog {
        TagHelperCatalog::new(vec![
            TagHelperDescriptor::new(TagHelperKind::Default, "Mvc.AnchorTagHelper", "Mvc")
                .with_rule(TagMatchingRule::new("a")),
            TagHelperDescriptor::new(TagHelperKind::Default, "Mvc.FormTagHelper", "Mvc")
                .with_rule(TagMatchingRule::new("form")),
            TagHelperDescriptor::new(TagHelperKind::Default, "Other.AnchorTagHelper", "Other")
                .with_rule(TagMatchingRule::new("a")),
            TagHelperDescriptor::new(TagHelperKind::Component, "Counter", "Mvc")
                .with_rule(TagMatchingRule::new("Counter")),
        ])
    }

    fn names<'a>(selection: &'a TagHelperSelection<'a>) -> Vec<&'a str> {
        selection
            .tag_helpers
            .iter()
            .map(|descriptor| descriptor.name.as_str())
            .collect()
    }

    #[test]
    fn test_lookup_text() {
        assert_eq!(
            parse_lookup_text("\"*, Mvc\""),
            Some(LookupInfo {
                type_pattern: "*",
                assembly_name: "Mvc"
            })
        );
        assert_eq!(parse_lookup_text("Mvc"), None);
        assert_eq!(parse_lookup_text(" , Mvc"), None);
        assert_eq!(parse_lookup_text("a, b, c"), None);
    }

    #[test]
    fn test_add_all_then_remove_one() {
        let allocator = Bump::new();
        let catalog = catalog();
        let f = SyntaxFactory::new(&allocator);
        let tree = f.block(&[
            f.directive("addTagHelper", "*, Mvc"),
            f.directive("removeTagHelper", "\"Mvc.Form*, Mvc\""),
        ]);
        let document = CodeDocument::new(&allocator, &catalog, "Index.cshtml", DocumentKind::Legacy, tree);
        let selection = select_tag_helpers(&document);
        // Component kinds never apply to classic templates.
        assert_eq!(names(&selection), vec!["Mvc.AnchorTagHelper"]);
        assert!(selection.diagnostics.is_empty());
    }

    #[test]
    fn test_imports_first_and_prefix() {
        let allocator = Bump::new();
        let catalog = catalog();
        let f = SyntaxFactory::new(&allocator);
        let import = f.block(&[
            f.directive("addTagHelper", "Other.AnchorTagHelper, Other"),
            f.directive("tagHelperPrefix", "\"th:\""),
        ]);
        let tree = f.block(&[
            f.directive("removeTagHelper", "*, Other"),
            f.directive("addTagHelper", "Mvc.FormTagHelper, Mvc"),
        ]);
        let document = CodeDocument::new(&allocator, &catalog, "Index.cshtml", DocumentKind::Legacy, tree)
            .with_imports([import]);
        let selection = select_tag_helpers(&document);
        assert_eq!(names(&selection), vec!["Mvc.FormTagHelper"]);
        assert_eq!(selection.prefix.as_deref(), Some("th:"));
    }

    #[test]
    fn test_malformed_directive_is_skipped() {
        let allocator = Bump::new();
        let catalog = catalog();
        let f = SyntaxFactory::new(&allocator);
        let tree = f.block(&[
            f.directive("addTagHelper", "Mvc"),
            f.directive("addTagHelper", "*, Unknown"),
            f.directive("addTagHelper", "Mvc.AnchorTagHelper, Mvc"),
        ]);
        let document = CodeDocument::new(&allocator, &catalog, "Index.cshtml", DocumentKind::Legacy, tree);
        let selection = select_tag_helpers(&document);
        assert_eq!(names(&selection), vec!["Mvc.AnchorTagHelper"]);
        let codes: Vec<_> = selection.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![
                quire_relief::ErrorCode::InvalidTagHelperLookupText,
                quire_relief::ErrorCode::UnresolvedTagHelperAssembly,
            ]
        );
    }
}
