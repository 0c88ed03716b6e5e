//! Duplicate bind attribute resolution for one element.

use quire_carton::{FxHashMap, String};
use quire_relief::{CompilerError, IntermediateTree, NodeId, Span, TagHelperDescriptor};

/// A bind-flavored property child of the element.
struct Candidate<'a> {
    node: NodeId,
    name: String,
    tag_helper: &'a TagHelperDescriptor,
}

fn bind_candidates<'a>(tree: &IntermediateTree<'a>, parent: NodeId) -> Vec<Candidate<'a>> {
    tree.children(parent)
        .iter()
        .filter_map(|&node| {
            let property = tree.node(node).as_tag_helper_property()?;
            property.tag_helper().is_bind().then(|| Candidate {
                node,
                name: String::new(property.attribute_name()),
                tag_helper: property.tag_helper(),
            })
        })
        .collect()
}

/// Whether another candidate with the same name makes `candidate` redundant.
fn is_shadowed(candidate: &Candidate<'_>, candidates: &[Candidate<'_>]) -> bool {
    let tag_helper = candidate.tag_helper;
    candidates
        .iter()
        .filter(|other| other.node != candidate.node && other.name == candidate.name)
        .any(|other| {
            (tag_helper.is_fallback_bind() && !other.tag_helper.is_fallback_bind())
                || (tag_helper.is_input_element_fallback_bind()
                    && other.tag_helper.is_input_element_bind()
                    && !other.tag_helper.is_input_element_fallback_bind())
        })
}

/// Drop fallback bind nodes shadowed by more specific ones, then drop every
/// remaining same-name group with one diagnostic on `parent`.
pub fn resolve_duplicates(tree: &mut IntermediateTree<'_>, parent: NodeId) {
    let mut candidates = bind_candidates(tree, parent);

    for index in (0..candidates.len()).rev() {
        if is_shadowed(&candidates[index], &candidates) {
            let removed = candidates.remove(index);
            tree.detach_child(parent, removed.node);
            tracing::trace!(attribute = %removed.name, tag_helper = %removed.tag_helper.name, "removed fallback bind");
        }
    }

    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    let mut by_name: FxHashMap<&str, usize> = FxHashMap::default();
    for (index, candidate) in candidates.iter().enumerate() {
        let slot = *by_name.entry(candidate.name.as_str()).or_insert_with(|| {
            groups.push((candidate.name.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(index);
    }

    let span = tree.node(parent).span.unwrap_or(Span::STUB);
    for (name, members) in groups.into_iter().filter(|(_, members)| members.len() > 1) {
        let names: Vec<&str> = members
            .iter()
            .map(|&index| candidates[index].tag_helper.name.as_str())
            .collect();
        tree.add_diagnostic(
            parent,
            CompilerError::duplicate_bind_attribute(span, &name, &names.join(", ")),
        );
        for index in members {
            tree.detach_child(parent, candidates[index].node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_relief::{
        metadata, AttributeStructure, BoundAttributeDescriptor, ErrorCode, IntermediateNode,
        IntermediateNodeKind, MarkupElementNode, RequiredAttributeDescriptor, TagHelperKind,
        TagHelperPropertyNode, TagMatchingRule, ValueComparison,
    };

    fn bind(name: &str, rule: TagMatchingRule, attribute: &str, fallback: bool) -> TagHelperDescriptor {
        let descriptor = TagHelperDescriptor::new(TagHelperKind::Bind, name, "Components")
            .with_rule(rule)
            .with_bound_attribute(BoundAttributeDescriptor::new(attribute, "System.Object"));
        if fallback {
            descriptor.with_metadata(metadata::BIND_FALLBACK, "true")
        } else {
            descriptor
        }
    }

    fn element<'a>(tree: &mut IntermediateTree<'a>) -> NodeId {
        let root = tree.root();
        tree.add_child(
            root,
            IntermediateNodeKind::MarkupElement(MarkupElementNode { tag_name: "input".into() }),
        )
    }

    fn property<'a>(
        tree: &mut IntermediateTree<'a>,
        parent: NodeId,
        name: &str,
        tag_helper: &'a TagHelperDescriptor,
    ) -> NodeId {
        let property = TagHelperPropertyNode::new(name, AttributeStructure::DoubleQuotes, tag_helper)
            .expect("attribute resolves");
        tree.append(
            parent,
            IntermediateNode::new(IntermediateNodeKind::TagHelperProperty(property)),
        )
    }

    #[test]
    fn test_general_fallback_yields() {
        let fallback = bind("Bind", TagMatchingRule::new("*"), "bind-class", true);
        let specific = bind("BindClass", TagMatchingRule::new("div"), "bind-class", false);
        let mut tree = IntermediateTree::new();
        let parent = element(&mut tree);
        let a = property(&mut tree, parent, "bind-class", &fallback);
        let b = property(&mut tree, parent, "bind-class", &specific);

        resolve_duplicates(&mut tree, parent);
        assert_eq!(tree.children(parent), &[b]);
        assert_ne!(a, b);
        assert!(tree.all_diagnostics().is_empty());
    }

    #[test]
    fn test_removed_nodes_keep_their_diagnostics() {
        let fallback = bind("Bind", TagMatchingRule::new("*"), "bind-class", true);
        let specific = bind("BindClass", TagMatchingRule::new("div"), "bind-class", false);
        let mut tree = IntermediateTree::new();
        let parent = element(&mut tree);
        let shadowed = property(&mut tree, parent, "bind-class", &fallback);
        property(&mut tree, parent, "bind-class", &specific);
        tree.add_diagnostic(shadowed, CompilerError::empty_bind_expression(Span::STUB, "bind-class"));

        resolve_duplicates(&mut tree, parent);
        assert_eq!(tree.children(parent).len(), 1);
        let codes: Vec<_> = tree.all_diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![ErrorCode::EmptyBindExpression]);
        assert_eq!(tree.node(parent).diagnostics.len(), 1);
    }

    #[test]
    fn test_conflicting_nodes_keep_their_diagnostics() {
        let first = bind("BindA", TagMatchingRule::new("input"), "bind-value", false);
        let second = bind("BindB", TagMatchingRule::new("*"), "bind-value", false);
        let mut tree = IntermediateTree::new();
        let parent = element(&mut tree);
        let a = property(&mut tree, parent, "bind-value", &first);
        property(&mut tree, parent, "bind-value", &second);
        tree.add_diagnostic(a, CompilerError::empty_bind_expression(Span::STUB, "bind-value"));

        resolve_duplicates(&mut tree, parent);
        let codes: Vec<_> = tree.all_diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![ErrorCode::DuplicateBindAttribute, ErrorCode::EmptyBindExpression]
        );
    }

    #[test]
    fn test_input_fallback_yields_to_typed_input() {
        let generic = bind("BindInput", TagMatchingRule::new("input"), "bind", false);
        let text = bind(
            "BindInputText",
            TagMatchingRule::new("input")
                .with_attribute(RequiredAttributeDescriptor::new("type").with_value("text", ValueComparison::FullMatch)),
            "bind",
            false,
        );
        let mut tree = IntermediateTree::new();
        let parent = element(&mut tree);
        property(&mut tree, parent, "bind", &generic);
        let kept = property(&mut tree, parent, "bind", &text);

        resolve_duplicates(&mut tree, parent);
        assert_eq!(tree.children(parent), &[kept]);
    }

    #[test]
    fn test_conflict_drops_all() {
        let first = bind("BindA", TagMatchingRule::new("input"), "bind-value", false);
        let second = bind("BindB", TagMatchingRule::new("*"), "bind-value", false);
        let mut tree = IntermediateTree::new();
        let parent = element(&mut tree);
        property(&mut tree, parent, "bind-value", &first);
        property(&mut tree, parent, "bind-value", &second);

        resolve_duplicates(&mut tree, parent);
        assert!(tree.children(parent).is_empty());
        let diagnostics = tree.all_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, ErrorCode::DuplicateBindAttribute);
        assert!(diagnostics[0].message.ends_with("BindA, BindB"));
    }
}
