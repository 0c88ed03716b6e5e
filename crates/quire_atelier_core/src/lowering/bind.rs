//! Bind lowering.
//!
//! A `bind-Value="@Count"` property becomes a value/change pair, plus an
//! expression attribute for components that declare one:
//!
//! ```text
//! Value="BindMethods.GetValue(Count)"
//! ValueChanged="__value => Count = __value"
//! ValueExpression="() => Count"
//! ```
//!
//! `:event` and `:format` parameter nodes are folded into their base entry
//! and never survive lowering.

use quire_carton::{format_compact, to_string_literal, trim_quotes, FxHashMap, FxHashSet, String};
use quire_relief::{
    AttributeStructure, AttributeValueNode, BoundAttributeDescriptor, ComponentAttributeNode,
    CompilerError, HtmlAttributeNode, IntermediateNode, IntermediateNodeKind, IntermediateTree,
    NodeId, NodeReference, Span, TagHelperCatalog, TagHelperDescriptor, TagHelperKind, TokenKind,
};

use super::{
    duplicates::resolve_duplicates,
    runtime::{BindRuntimeHelper, RECEIVER, SETTER_PARAMETER},
};

/// A base bind node with the parameter nodes folded into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindEntry {
    pub reference: NodeReference,
    pub event: Option<NodeReference>,
    pub format: Option<NodeReference>,
}

impl BindEntry {
    pub fn new(reference: NodeReference) -> Self {
        Self {
            reference,
            event: None,
            format: None,
        }
    }
}

/// Segments of a base bind attribute name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindAttributeName<'n> {
    /// `Value` of `bind-Value`; absent for a bare `bind`.
    pub value: Option<&'n str>,
    /// `bind-Value-extra`: accepted, `extra` is discarded.
    pub has_extra_segment: bool,
}

pub fn parse_bind_attribute_name(name: &str) -> Option<BindAttributeName<'_>> {
    let mut segments = name.split('-');
    if segments.next() != Some("bind") {
        return None;
    }
    let value = segments.next();
    let extra = segments.next();
    if segments.next().is_some()
        || value.is_some_and(str::is_empty)
        || extra.is_some_and(str::is_empty)
    {
        return None;
    }
    Some(BindAttributeName {
        value,
        has_extra_segment: extra.is_some(),
    })
}

/// `BindMethods.GetValue(E)` or `BindMethods.GetValue(E, F)`.
pub fn value_expression(expression: &str, format: Option<&str>) -> String {
    let helper = BindRuntimeHelper::GetValue.name();
    match format {
        Some(format) => format_compact!("{helper}({expression}, {format})"),
        None => format_compact!("{helper}({expression})"),
    }
}

/// Setter lambda, wrapped in `helper` when one is given.
pub fn change_expression(
    helper: Option<BindRuntimeHelper>,
    expression: &str,
    format: Option<&str>,
) -> String {
    let setter = format_compact!("{SETTER_PARAMETER} => {expression} = {SETTER_PARAMETER}");
    let Some(helper) = helper else {
        return setter;
    };
    let mut out = String::new(helper.name());
    out.push('(');
    if helper.takes_receiver() {
        out.push_str(RECEIVER);
        out.push_str(", ");
    }
    out.push_str(&setter);
    out.push_str(", ");
    out.push_str(expression);
    if let Some(format) = format {
        out.push_str(", ");
        out.push_str(format);
    }
    out.push(')');
    out
}

/// `() => E`
pub fn expression_lambda(expression: &str) -> String {
    format_compact!("() => {expression}")
}

/// Target-language text of an attribute node's value.
///
/// Markup content becomes a string literal, code is taken verbatim.
pub fn attribute_content(tree: &IntermediateTree<'_>, node: NodeId) -> String {
    let mut out = String::default();
    collect_content(tree, node, &mut out);
    out
}

fn collect_content(tree: &IntermediateTree<'_>, node: NodeId, out: &mut String) {
    for &child in tree.children(node) {
        match tree.kind(child) {
            IntermediateNodeKind::HtmlContent | IntermediateNodeKind::HtmlAttributeValue(_) => {
                out.push_str(&to_string_literal(&tree.content(child)));
            }
            IntermediateNodeKind::Token(token) => match token.kind {
                TokenKind::Html => out.push_str(&to_string_literal(&token.content)),
                TokenKind::CSharp => out.push_str(&token.content),
            },
            _ => collect_content(tree, child, out),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum BindTarget<'a> {
    Element,
    Component(&'a TagHelperDescriptor),
}

/// Change helper for a markup event attribute, taken from the event handler
/// tag helpers of the catalog.
fn element_change_helper(catalog: &TagHelperCatalog, change_name: &str) -> BindRuntimeHelper {
    let attribute = catalog
        .iter()
        .filter(|descriptor| descriptor.kind == TagHelperKind::EventHandler)
        .find_map(|descriptor| descriptor.bound_attribute(change_name));
    match attribute {
        Some(attribute)
            if attribute.is_delegate_property() && !attribute.is_event_callback_property() =>
        {
            BindRuntimeHelper::SetValueHandler
        }
        _ => BindRuntimeHelper::CreateBinder,
    }
}

fn component_attribute<'a>(
    tree: &mut IntermediateTree<'a>,
    name: &str,
    structure: AttributeStructure,
    component: &'a TagHelperDescriptor,
    bound_attribute: Option<&'a BoundAttributeDescriptor>,
    content: &str,
    span: Span,
) -> NodeId {
    let id = tree.alloc(
        IntermediateNode::new(IntermediateNodeKind::ComponentAttribute(ComponentAttributeNode {
            attribute_name: String::new(name),
            attribute_structure: structure,
            bound_attribute,
            property_name: bound_attribute.and_then(|attribute| attribute.property_name.clone()),
            type_name: bound_attribute.map(|attribute| attribute.type_name.clone()),
            tag_helper: Some(component),
        }))
        .with_span(span),
    );
    let expression = tree.add_child(id, IntermediateNodeKind::CSharpExpression);
    tree.add_token(expression, TokenKind::CSharp, content);
    id
}

fn html_attribute(tree: &mut IntermediateTree<'_>, name: &str, content: &str, span: Span) -> NodeId {
    let id = tree.alloc(
        IntermediateNode::new(IntermediateNodeKind::HtmlAttribute(HtmlAttributeNode {
            attribute_name: String::new(name),
            prefix: format_compact!("{name}=\""),
            suffix: String::new("\""),
        }))
        .with_span(span),
    );
    let value = tree.add_child(
        id,
        IntermediateNodeKind::CSharpExpressionAttributeValue(AttributeValueNode::default()),
    );
    tree.add_token(value, TokenKind::CSharp, content);
    id
}

/// Build the replacement nodes of one entry, or the diagnostic explaining
/// why the original node stays.
fn lower_entry<'a>(
    tree: &mut IntermediateTree<'a>,
    catalog: &TagHelperCatalog,
    entry: &BindEntry,
) -> Result<Vec<NodeId>, CompilerError> {
    let node_id = entry.reference.node;
    let node = tree.node(node_id);
    let span = node.span.unwrap_or(Span::STUB);
    let Some(property) = node.as_tag_helper_property() else {
        return Ok(vec![node_id]);
    };
    let attribute_name = String::new(property.attribute_name());
    let structure = property.attribute_structure();
    let tag_helper = property.tag_helper();

    let parsed = parse_bind_attribute_name(&attribute_name)
        .ok_or_else(|| CompilerError::bind_invalid_syntax(span, &attribute_name))?;
    if parsed.has_extra_segment {
        tree.add_diagnostic(node_id, CompilerError::bind_unsupported_format(span, &attribute_name));
    }

    let expression = attribute_content(tree, node_id);
    if expression.trim().is_empty() {
        return Err(CompilerError::empty_bind_expression(span, &attribute_name));
    }
    let format = entry.format.map(|format| attribute_content(tree, format.node));
    let event = entry
        .event
        .map(|event| String::new(trim_quotes(&attribute_content(tree, event.node)).trim()))
        .filter(|event| !event.is_empty());

    let target = match tree.kind(entry.reference.parent) {
        IntermediateNodeKind::Component(component) => BindTarget::Component(component.component),
        _ => BindTarget::Element,
    };

    let value_name = tag_helper
        .bind_value_attribute()
        .or(parsed.value)
        .map(String::new)
        .ok_or_else(|| CompilerError::bind_invalid_syntax(span, &attribute_name))?;
    let change_name = event
        .or_else(|| tag_helper.bind_change_attribute().map(String::new))
        .or_else(|| match target {
            BindTarget::Component(_) => Some(format_compact!("{value_name}Changed")),
            BindTarget::Element => None,
        });
    let expression_name = tag_helper
        .bind_expression_attribute()
        .map(String::new)
        .or_else(|| match target {
            BindTarget::Component(_) => Some(format_compact!("{value_name}Expression")),
            BindTarget::Element => None,
        });

    let value_content = value_expression(&expression, format.as_deref());
    let mut replacements = Vec::with_capacity(3);
    match target {
        BindTarget::Component(component) => {
            // Always set for components.
            let change_name = change_name.unwrap_or_default();
            let change_attribute = component.bound_attribute(&change_name);
            let helper = change_attribute
                .is_some_and(BoundAttributeDescriptor::is_event_callback_property)
                .then_some(BindRuntimeHelper::CreateBinder);
            let change_content = change_expression(helper, &expression, format.as_deref());

            replacements.push(component_attribute(
                tree,
                &value_name,
                structure,
                component,
                component.bound_attribute(&value_name),
                &value_content,
                span,
            ));
            replacements.push(component_attribute(
                tree,
                &change_name,
                structure,
                component,
                change_attribute,
                &change_content,
                span,
            ));
            if let Some(expression_attribute) = expression_name
                .as_deref()
                .and_then(|name| component.bound_attribute(name))
            {
                replacements.push(component_attribute(
                    tree,
                    &expression_attribute.name,
                    structure,
                    component,
                    Some(expression_attribute),
                    &expression_lambda(&expression),
                    span,
                ));
            }
        }
        BindTarget::Element => {
            let change_name = change_name
                .ok_or_else(|| CompilerError::bind_invalid_syntax(span, &attribute_name))?;
            let helper = element_change_helper(catalog, &change_name);
            let change_content = change_expression(Some(helper), &expression, format.as_deref());

            replacements.push(html_attribute(tree, &value_name, &value_content, span));
            replacements.push(html_attribute(tree, &change_name, &change_content, span));
        }
    }

    let mut diagnostics = tree.take_diagnostics(node_id);
    tree.node_mut(replacements[0]).diagnostics.append(&mut diagnostics);
    Ok(replacements)
}

fn is_bind_property(node: &IntermediateNode<'_>) -> bool {
    node.as_tag_helper_property()
        .is_some_and(|property| property.tag_helper().is_bind())
}

/// Lower every bind property of a component document's intermediate tree.
pub fn lower_bind(tree: &mut IntermediateTree<'_>, catalog: &TagHelperCatalog) {
    let mut seen = FxHashSet::default();
    let parents: Vec<NodeId> = tree
        .find_descendant_references(is_bind_property)
        .into_iter()
        .map(|reference| reference.parent)
        .filter(|parent| seen.insert(*parent))
        .collect();
    for parent in parents {
        resolve_duplicates(tree, parent);
    }

    let mut entries: Vec<BindEntry> = Vec::new();
    let mut by_key: FxHashMap<(NodeId, String), usize> = FxHashMap::default();
    let mut parameters: Vec<NodeReference> = Vec::new();
    for reference in tree.find_descendant_references(is_bind_property) {
        let Some(property) = tree.node(reference.node).as_tag_helper_property() else {
            continue;
        };
        if property.is_parameter_match() {
            parameters.push(reference);
            continue;
        }
        let key = (reference.parent, String::new(property.attribute_name()));
        by_key.entry(key).or_insert_with(|| {
            entries.push(BindEntry::new(reference));
            entries.len() - 1
        });
    }

    for reference in parameters {
        let node = tree.node(reference.node);
        let Some(property) = node.as_tag_helper_property() else {
            continue;
        };
        let base_name = String::new(property.attribute_name_without_parameter());
        let parameter = property
            .bound_attribute_parameter()
            .map(|parameter| parameter.name.as_str());
        match by_key.get(&(reference.parent, base_name.clone())) {
            Some(&slot) => match parameter {
                Some("event") => entries[slot].event = Some(reference),
                Some("format") => entries[slot].format = Some(reference),
                _ => {}
            },
            None => {
                let diagnostic = CompilerError::bind_parameter_missing_bind(
                    node.span.unwrap_or(Span::STUB),
                    property.attribute_name(),
                    &base_name,
                );
                tree.add_diagnostic(reference.parent, diagnostic);
            }
        }
        tree.detach_child(reference.parent, reference.node);
    }

    for entry in &entries {
        match lower_entry(tree, catalog, entry) {
            Ok(replacements) => {
                tree.replace_child(entry.reference.parent, entry.reference.node, &replacements);
            }
            Err(diagnostic) => {
                tracing::debug!(code = %diagnostic.code.id(), "bind attribute left unlowered");
                tree.add_diagnostic(entry.reference.node, diagnostic);
            }
        }
    }
}
