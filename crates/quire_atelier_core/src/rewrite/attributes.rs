//! Start tag attribute rewriting for bound elements.

use quire_carton::Bump;
use quire_relief::{
    matching::classify_attribute, AttributeBindingKind, AttributeNode, AttributeStructure,
    CompilerError, CompilerOptions, Literal, MarkupAttribute, MinimizedAttribute,
    MinimizedTagHelperAttribute, SyntaxNode, TagHelperAttribute, TagHelperAttributeInfo,
    TagHelperBinding,
};

use super::value::AttributeValueRewriter;

/// Turn every attribute of a bound start tag into its tag helper form.
///
/// Diagnostics are appended to `diagnostics`. Code or stray markup between
/// attributes stops the rewrite; the remaining attributes are kept as written.
pub fn rewrite_attributes<'a>(
    allocator: &'a Bump,
    tag_name: &str,
    attributes: &'a [AttributeNode<'a>],
    binding: &TagHelperBinding<'a>,
    options: &CompilerOptions,
    diagnostics: &mut Vec<CompilerError>,
) -> &'a [AttributeNode<'a>] {
    let mut rewritten: Vec<AttributeNode<'a>> = Vec::with_capacity(attributes.len());

    for (index, attribute) in attributes.iter().enumerate() {
        match *attribute {
            AttributeNode::Markup(markup) => {
                rewritten.push(rewrite_markup(allocator, tag_name, markup, binding, diagnostics));
            }
            AttributeNode::Minimized(minimized) => {
                rewritten.push(rewrite_minimized(
                    allocator,
                    tag_name,
                    minimized,
                    binding,
                    options,
                    diagnostics,
                ));
            }
            AttributeNode::Misc(misc) => {
                if misc.children.iter().any(is_code) {
                    diagnostics.push(CompilerError::code_in_tag_declaration(misc.span, tag_name));
                } else if misc.children.iter().any(is_stray_markup) {
                    diagnostics.push(CompilerError::malformed_attribute_list(misc.span));
                } else {
                    rewritten.push(*attribute);
                    continue;
                }
                rewritten.extend_from_slice(&attributes[index..]);
                break;
            }
            AttributeNode::TagHelper(_) | AttributeNode::MinimizedTagHelper(_) => {
                rewritten.push(*attribute);
            }
        }
    }

    allocator.alloc_slice_copy(&rewritten)
}

fn is_code(node: &SyntaxNode<'_>) -> bool {
    matches!(
        node,
        SyntaxNode::Transition(_)
            | SyntaxNode::CodeLiteral(_)
            | SyntaxNode::ImplicitExpression(_)
            | SyntaxNode::ExplicitExpression(_)
            | SyntaxNode::Statement(_)
            | SyntaxNode::Directive(_)
    )
}

fn is_stray_markup(node: &SyntaxNode<'_>) -> bool {
    match node {
        SyntaxNode::MarkupText(literal) => !literal.text.trim().is_empty(),
        SyntaxNode::Block(block) => block.children.iter().any(is_stray_markup),
        SyntaxNode::Element(_) | SyntaxNode::TagHelperElement(_) => true,
        _ => false,
    }
}

fn has_code(value: &[SyntaxNode<'_>]) -> bool {
    value
        .iter()
        .any(|node| !matches!(node, SyntaxNode::MarkupText(_)))
}

fn is_blank(value: &[SyntaxNode<'_>]) -> bool {
    let mut source = String::new();
    for node in value {
        node.write_source(&mut source);
    }
    source.trim().is_empty()
}

fn structure_of(value_prefix: Option<Literal<'_>>, value: &[SyntaxNode<'_>]) -> AttributeStructure {
    match value_prefix.map(|prefix| prefix.text) {
        Some("'") => AttributeStructure::SingleQuotes,
        Some(_) => AttributeStructure::DoubleQuotes,
        None if has_code(value) => AttributeStructure::DoubleQuotes,
        None => AttributeStructure::NoQuotes,
    }
}

fn rewrite_markup<'a>(
    allocator: &'a Bump,
    tag_name: &str,
    markup: &'a MarkupAttribute<'a>,
    binding: &TagHelperBinding<'a>,
    diagnostics: &mut Vec<CompilerError>,
) -> AttributeNode<'a> {
    let name = markup.name.text;
    let matched = classify_attribute(name, binding.descriptors());
    let kind = matched.kind();
    let mut value = markup.value;

    if kind == AttributeBindingKind::MissingIndexerKey {
        diagnostics.push(CompilerError::indexer_missing_key(markup.name.span, name, tag_name));
    } else if matched.is_bound() && matched.is_bound_non_string {
        if is_blank(markup.value) {
            diagnostics.push(CompilerError::empty_bound_attribute(
                markup.name.span,
                name,
                tag_name,
                matched.type_name().unwrap_or_default(),
            ));
        }
        value = AttributeValueRewriter::new(allocator).rewrite(markup.value);
    }

    AttributeNode::TagHelper(allocator.alloc(TagHelperAttribute {
        name_prefix: markup.name_prefix,
        name: markup.name,
        equals: markup.equals,
        value_prefix: markup.value_prefix,
        value,
        value_suffix: markup.value_suffix,
        info: TagHelperAttributeInfo {
            structure: structure_of(markup.value_prefix, markup.value),
            binding: kind,
            is_directive_attribute: matched.is_directive_attribute,
        },
        span: markup.span,
    }))
}

fn rewrite_minimized<'a>(
    allocator: &'a Bump,
    tag_name: &str,
    minimized: &'a MinimizedAttribute<'a>,
    binding: &TagHelperBinding<'a>,
    options: &CompilerOptions,
    diagnostics: &mut Vec<CompilerError>,
) -> AttributeNode<'a> {
    let name = minimized.name.text;
    let matched = classify_attribute(name, binding.descriptors());
    let kind = matched.kind();

    if kind == AttributeBindingKind::MissingIndexerKey {
        diagnostics.push(CompilerError::indexer_missing_key(minimized.name.span, name, tag_name));
    } else if matched.is_bound()
        && !(matched.is_bound_boolean && options.allow_minimized_boolean_tag_helper_attributes)
    {
        diagnostics.push(CompilerError::empty_bound_attribute(
            minimized.name.span,
            name,
            tag_name,
            matched.type_name().unwrap_or_default(),
        ));
    }

    AttributeNode::MinimizedTagHelper(allocator.alloc(MinimizedTagHelperAttribute {
        name_prefix: minimized.name_prefix,
        name: minimized.name,
        info: TagHelperAttributeInfo {
            structure: AttributeStructure::Minimized,
            binding: kind,
            is_directive_attribute: matched.is_directive_attribute,
        },
        span: minimized.span,
    }))
}
