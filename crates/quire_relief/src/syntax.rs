//! Syntax tree.
//!
//! Nodes are allocated in a [`Bump`](quire_carton::Bump) arena and never
//! mutated. A rewrite builds new nodes and shares every untouched subtree with
//! the input tree, which stays valid for as long as the arena lives.

use std::fmt::Write as _;

use quire_carton::{phf_map, PhfMap};
use serde::{Deserialize, Serialize};

use crate::{
    binding::TagMode,
    matching::AttributeBindingKind,
    tag_helper::TagHelperDescriptor,
    Span,
};

/// A run of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal<'a> {
    pub text: &'a str,
    pub span: Span,
}

impl<'a> Literal<'a> {
    #[inline]
    pub const fn new(text: &'a str, span: Span) -> Self {
        Self { text, span }
    }
}

/// Any node in the document tree.
#[derive(Debug, Clone, Copy)]
pub enum SyntaxNode<'a> {
    Block(&'a Block<'a>),
    MarkupText(Literal<'a>),
    Element(&'a MarkupElement<'a>),
    TagHelperElement(&'a TagHelperElement<'a>),
    /// The `@` that switches from markup to code.
    Transition(Literal<'a>),
    /// Target-language code text.
    CodeLiteral(Literal<'a>),
    ImplicitExpression(&'a ImplicitExpression<'a>),
    ExplicitExpression(&'a ExplicitExpression<'a>),
    Statement(&'a Statement<'a>),
    Directive(&'a Directive<'a>),
}

#[derive(Debug)]
pub struct Block<'a> {
    pub children: &'a [SyntaxNode<'a>],
    pub span: Span,
}

/// `@name` or `@name.Member(arg)`. The transition is absent when the
/// expression was folded into a surrounding code span.
#[derive(Debug)]
pub struct ImplicitExpression<'a> {
    pub transition: Option<Literal<'a>>,
    pub body: &'a [SyntaxNode<'a>],
    pub span: Span,
}

/// `@( ... )`
#[derive(Debug)]
pub struct ExplicitExpression<'a> {
    pub transition: Literal<'a>,
    pub open_paren: Literal<'a>,
    pub body: &'a [SyntaxNode<'a>],
    pub close_paren: Literal<'a>,
    pub span: Span,
}

/// `@{ ... }`
#[derive(Debug)]
pub struct Statement<'a> {
    pub transition: Literal<'a>,
    pub open_brace: Literal<'a>,
    pub body: &'a [SyntaxNode<'a>],
    pub close_brace: Literal<'a>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    AddTagHelper,
    RemoveTagHelper,
    TagHelperPrefix,
    Using,
    Other,
}

static DIRECTIVE_KEYWORDS: PhfMap<&'static str, DirectiveKind> = phf_map! {
    "addTagHelper" => DirectiveKind::AddTagHelper,
    "removeTagHelper" => DirectiveKind::RemoveTagHelper,
    "tagHelperPrefix" => DirectiveKind::TagHelperPrefix,
    "using" => DirectiveKind::Using,
};

impl DirectiveKind {
    pub fn from_keyword(keyword: &str) -> Self {
        DIRECTIVE_KEYWORDS
            .get(keyword)
            .copied()
            .unwrap_or(DirectiveKind::Other)
    }

    /// Directives that only classic templates honor.
    #[inline]
    pub fn is_tag_helper_directive(self) -> bool {
        matches!(
            self,
            Self::AddTagHelper | Self::RemoveTagHelper | Self::TagHelperPrefix
        )
    }
}

/// `@keyword value`
#[derive(Debug)]
pub struct Directive<'a> {
    pub transition: Literal<'a>,
    pub keyword: Literal<'a>,
    pub kind: DirectiveKind,
    /// Raw text after the keyword, including leading whitespace.
    pub value: Literal<'a>,
    pub span: Span,
}

impl<'a> Directive<'a> {
    #[inline]
    pub fn value_text(&self) -> &'a str {
        self.value.text.trim()
    }
}

#[derive(Debug)]
pub struct StartTag<'a> {
    pub open: Literal<'a>,
    pub name: Literal<'a>,
    pub attributes: &'a [AttributeNode<'a>],
    /// `>` or `/>`, with any whitespace before it.
    pub close: Literal<'a>,
    pub span: Span,
}

impl StartTag<'_> {
    #[inline]
    pub fn is_self_closing(&self) -> bool {
        self.close.text.ends_with("/>")
    }
}

#[derive(Debug)]
pub struct EndTag<'a> {
    pub open: Literal<'a>,
    pub name: Literal<'a>,
    pub close: Literal<'a>,
    pub span: Span,
}

#[derive(Debug)]
pub struct MarkupElement<'a> {
    pub start_tag: &'a StartTag<'a>,
    pub children: &'a [SyntaxNode<'a>],
    pub end_tag: Option<&'a EndTag<'a>>,
    pub span: Span,
}

impl<'a> MarkupElement<'a> {
    #[inline]
    pub fn tag_name(&self) -> &'a str {
        self.start_tag.name.text
    }
}

/// What the rewriter learned about a bound element.
#[derive(Debug)]
pub struct TagHelperInfo<'a> {
    pub tag_name: &'a str,
    pub tag_mode: TagMode,
    pub tag_helpers: &'a [&'a TagHelperDescriptor],
}

#[derive(Debug)]
pub struct TagHelperStartTag<'a> {
    pub open: Literal<'a>,
    pub name: Literal<'a>,
    pub attributes: &'a [AttributeNode<'a>],
    pub close: Literal<'a>,
    pub span: Span,
}

/// An element bound to one or more tag helpers.
#[derive(Debug)]
pub struct TagHelperElement<'a> {
    pub start_tag: &'a TagHelperStartTag<'a>,
    pub children: &'a [SyntaxNode<'a>],
    pub end_tag: Option<&'a EndTag<'a>>,
    pub info: &'a TagHelperInfo<'a>,
    pub span: Span,
}

/// Quoting style of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttributeStructure {
    #[default]
    DoubleQuotes,
    SingleQuotes,
    NoQuotes,
    Minimized,
}

impl AttributeStructure {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DoubleQuotes => "DoubleQuotes",
            Self::SingleQuotes => "SingleQuotes",
            Self::NoQuotes => "NoQuotes",
            Self::Minimized => "Minimized",
        }
    }
}

/// Entries of a start tag's attribute list.
#[derive(Debug, Clone, Copy)]
pub enum AttributeNode<'a> {
    /// `name="value"`
    Markup(&'a MarkupAttribute<'a>),
    /// `name`
    Minimized(&'a MinimizedAttribute<'a>),
    /// Anything between attributes that is not an attribute.
    Misc(&'a MiscAttributeContent<'a>),
    TagHelper(&'a TagHelperAttribute<'a>),
    MinimizedTagHelper(&'a MinimizedTagHelperAttribute<'a>),
}

#[derive(Debug)]
pub struct MarkupAttribute<'a> {
    pub name_prefix: Option<Literal<'a>>,
    pub name: Literal<'a>,
    pub equals: Literal<'a>,
    pub value_prefix: Option<Literal<'a>>,
    pub value: &'a [SyntaxNode<'a>],
    pub value_suffix: Option<Literal<'a>>,
    pub span: Span,
}

#[derive(Debug)]
pub struct MinimizedAttribute<'a> {
    pub name_prefix: Option<Literal<'a>>,
    pub name: Literal<'a>,
    pub span: Span,
}

#[derive(Debug)]
pub struct MiscAttributeContent<'a> {
    pub children: &'a [SyntaxNode<'a>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHelperAttributeInfo {
    pub structure: AttributeStructure,
    pub binding: AttributeBindingKind,
    pub is_directive_attribute: bool,
}

impl TagHelperAttributeInfo {
    #[inline]
    pub fn is_bound(&self) -> bool {
        self.binding.is_bound()
    }
}

#[derive(Debug)]
pub struct TagHelperAttribute<'a> {
    pub name_prefix: Option<Literal<'a>>,
    pub name: Literal<'a>,
    pub equals: Literal<'a>,
    pub value_prefix: Option<Literal<'a>>,
    pub value: &'a [SyntaxNode<'a>],
    pub value_suffix: Option<Literal<'a>>,
    pub info: TagHelperAttributeInfo,
    pub span: Span,
}

#[derive(Debug)]
pub struct MinimizedTagHelperAttribute<'a> {
    pub name_prefix: Option<Literal<'a>>,
    pub name: Literal<'a>,
    pub info: TagHelperAttributeInfo,
    pub span: Span,
}

impl<'a> AttributeNode<'a> {
    pub fn span(&self) -> Span {
        match self {
            Self::Markup(node) => node.span,
            Self::Minimized(node) => node.span,
            Self::Misc(node) => node.span,
            Self::TagHelper(node) => node.span,
            Self::MinimizedTagHelper(node) => node.span,
        }
    }

    /// Attribute name, `None` for misc content.
    pub fn name(&self) -> Option<&'a str> {
        match self {
            Self::Markup(node) => Some(node.name.text),
            Self::Minimized(node) => Some(node.name.text),
            Self::Misc(_) => None,
            Self::TagHelper(node) => Some(node.name.text),
            Self::MinimizedTagHelper(node) => Some(node.name.text),
        }
    }

    /// Value nodes, empty for minimized attributes.
    pub fn value(&self) -> &'a [SyntaxNode<'a>] {
        match self {
            Self::Markup(node) => node.value,
            Self::TagHelper(node) => node.value,
            Self::Misc(node) => node.children,
            Self::Minimized(_) | Self::MinimizedTagHelper(_) => &[],
        }
    }

    pub fn write_source(&self, out: &mut String) {
        match self {
            Self::Markup(node) => write_attribute(
                out,
                node.name_prefix,
                node.name,
                Some(node.equals),
                node.value_prefix,
                node.value,
                node.value_suffix,
            ),
            Self::TagHelper(node) => write_attribute(
                out,
                node.name_prefix,
                node.name,
                Some(node.equals),
                node.value_prefix,
                node.value,
                node.value_suffix,
            ),
            Self::Minimized(node) => {
                write_attribute(out, node.name_prefix, node.name, None, None, &[], None)
            }
            Self::MinimizedTagHelper(node) => {
                write_attribute(out, node.name_prefix, node.name, None, None, &[], None)
            }
            Self::Misc(node) => write_nodes(out, node.children),
        }
    }
}

fn write_attribute(
    out: &mut String,
    name_prefix: Option<Literal<'_>>,
    name: Literal<'_>,
    equals: Option<Literal<'_>>,
    value_prefix: Option<Literal<'_>>,
    value: &[SyntaxNode<'_>],
    value_suffix: Option<Literal<'_>>,
) {
    for literal in [name_prefix, Some(name), equals, value_prefix]
        .into_iter()
        .flatten()
    {
        out.push_str(literal.text);
    }
    write_nodes(out, value);
    if let Some(suffix) = value_suffix {
        out.push_str(suffix.text);
    }
}

fn write_nodes(out: &mut String, nodes: &[SyntaxNode<'_>]) {
    for node in nodes {
        node.write_source(out);
    }
}

fn write_attributes(out: &mut String, attributes: &[AttributeNode<'_>]) {
    for attribute in attributes {
        attribute.write_source(out);
    }
}

impl<'a> SyntaxNode<'a> {
    pub fn span(&self) -> Span {
        match self {
            Self::Block(node) => node.span,
            Self::MarkupText(literal) | Self::Transition(literal) | Self::CodeLiteral(literal) => {
                literal.span
            }
            Self::Element(node) => node.span,
            Self::TagHelperElement(node) => node.span,
            Self::ImplicitExpression(node) => node.span,
            Self::ExplicitExpression(node) => node.span,
            Self::Statement(node) => node.span,
            Self::Directive(node) => node.span,
        }
    }

    /// Reconstruct the source text this node covers.
    pub fn write_source(&self, out: &mut String) {
        match self {
            Self::Block(node) => write_nodes(out, node.children),
            Self::MarkupText(literal) | Self::Transition(literal) | Self::CodeLiteral(literal) => {
                out.push_str(literal.text)
            }
            Self::Element(node) => {
                let start = node.start_tag;
                out.push_str(start.open.text);
                out.push_str(start.name.text);
                write_attributes(out, start.attributes);
                out.push_str(start.close.text);
                write_nodes(out, node.children);
                if let Some(end) = node.end_tag {
                    write_end_tag(out, end);
                }
            }
            Self::TagHelperElement(node) => {
                let start = node.start_tag;
                out.push_str(start.open.text);
                out.push_str(start.name.text);
                write_attributes(out, start.attributes);
                out.push_str(start.close.text);
                write_nodes(out, node.children);
                if let Some(end) = node.end_tag {
                    write_end_tag(out, end);
                }
            }
            Self::ImplicitExpression(node) => {
                if let Some(transition) = node.transition {
                    out.push_str(transition.text);
                }
                write_nodes(out, node.body);
            }
            Self::ExplicitExpression(node) => {
                out.push_str(node.transition.text);
                out.push_str(node.open_paren.text);
                write_nodes(out, node.body);
                out.push_str(node.close_paren.text);
            }
            Self::Statement(node) => {
                out.push_str(node.transition.text);
                out.push_str(node.open_brace.text);
                write_nodes(out, node.body);
                out.push_str(node.close_brace.text);
            }
            Self::Directive(node) => {
                out.push_str(node.transition.text);
                out.push_str(node.keyword.text);
                out.push_str(node.value.text);
            }
        }
    }

    pub fn to_source(&self) -> String {
        let mut out = String::new();
        self.write_source(&mut out);
        out
    }

    /// Pre-order traversal, descending into start tag attributes.
    pub fn walk(self, visitor: &mut dyn FnMut(SyntaxNode<'a>)) {
        visitor(self);
        match self {
            Self::Block(node) => walk_nodes(node.children, visitor),
            Self::Element(node) => {
                walk_attributes(node.start_tag.attributes, visitor);
                walk_nodes(node.children, visitor);
            }
            Self::TagHelperElement(node) => {
                walk_attributes(node.start_tag.attributes, visitor);
                walk_nodes(node.children, visitor);
            }
            Self::ImplicitExpression(node) => walk_nodes(node.body, visitor),
            Self::ExplicitExpression(node) => walk_nodes(node.body, visitor),
            Self::Statement(node) => walk_nodes(node.body, visitor),
            Self::MarkupText(_) | Self::Transition(_) | Self::CodeLiteral(_) | Self::Directive(_) => {
            }
        }
    }

    /// Indented outline of the tree, one node per line.
    pub fn debug_render(&self) -> String {
        let mut out = String::new();
        render_node(&mut out, *self, 0);
        while out.ends_with('\n') {
            out.pop();
        }
        out
    }
}

fn write_end_tag(out: &mut String, end: &EndTag<'_>) {
    out.push_str(end.open.text);
    out.push_str(end.name.text);
    out.push_str(end.close.text);
}

fn walk_nodes<'a>(nodes: &'a [SyntaxNode<'a>], visitor: &mut dyn FnMut(SyntaxNode<'a>)) {
    for node in nodes {
        node.walk(visitor);
    }
}

fn walk_attributes<'a>(
    attributes: &'a [AttributeNode<'a>],
    visitor: &mut dyn FnMut(SyntaxNode<'a>),
) {
    for attribute in attributes {
        walk_nodes(attribute.value(), visitor);
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn render_nodes(out: &mut String, nodes: &[SyntaxNode<'_>], depth: usize) {
    for node in nodes {
        render_node(out, *node, depth);
    }
}

fn render_node(out: &mut String, node: SyntaxNode<'_>, depth: usize) {
    indent(out, depth);
    match node {
        SyntaxNode::Block(block) => {
            out.push_str("Block\n");
            render_nodes(out, block.children, depth + 1);
        }
        SyntaxNode::MarkupText(literal) => {
            let _ = writeln!(out, "MarkupText {:?}", literal.text);
        }
        SyntaxNode::Transition(literal) => {
            let _ = writeln!(out, "Transition {:?}", literal.text);
        }
        SyntaxNode::CodeLiteral(literal) => {
            let _ = writeln!(out, "CodeLiteral {:?}", literal.text);
        }
        SyntaxNode::Element(element) => {
            let _ = writeln!(out, "Element <{}>", element.tag_name());
            render_attributes(out, element.start_tag.attributes, depth + 1);
            render_nodes(out, element.children, depth + 1);
        }
        SyntaxNode::TagHelperElement(element) => {
            let names: Vec<&str> = element
                .info
                .tag_helpers
                .iter()
                .map(|descriptor| descriptor.name.as_str())
                .collect();
            let _ = writeln!(
                out,
                "TagHelperElement <{}> {} [{}]",
                element.info.tag_name,
                element.info.tag_mode.as_str(),
                names.join(", ")
            );
            render_attributes(out, element.start_tag.attributes, depth + 1);
            render_nodes(out, element.children, depth + 1);
        }
        SyntaxNode::ImplicitExpression(expression) => {
            if expression.transition.is_some() {
                out.push_str("ImplicitExpression\n");
            } else {
                out.push_str("ImplicitExpression (no transition)\n");
            }
            render_nodes(out, expression.body, depth + 1);
        }
        SyntaxNode::ExplicitExpression(expression) => {
            out.push_str("ExplicitExpression\n");
            render_nodes(out, expression.body, depth + 1);
        }
        SyntaxNode::Statement(statement) => {
            out.push_str("Statement\n");
            render_nodes(out, statement.body, depth + 1);
        }
        SyntaxNode::Directive(directive) => {
            let _ = writeln!(
                out,
                "Directive {} {:?}",
                directive.keyword.text,
                directive.value_text()
            );
        }
    }
}

fn render_attributes(out: &mut String, attributes: &[AttributeNode<'_>], depth: usize) {
    for attribute in attributes {
        indent(out, depth);
        match attribute {
            AttributeNode::Markup(node) => {
                let _ = writeln!(out, "MarkupAttribute {}", node.name.text);
                render_nodes(out, node.value, depth + 1);
            }
            AttributeNode::Minimized(node) => {
                let _ = writeln!(out, "MinimizedAttribute {}", node.name.text);
            }
            AttributeNode::Misc(node) => {
                out.push_str("MiscAttributeContent\n");
                render_nodes(out, node.children, depth + 1);
            }
            AttributeNode::TagHelper(node) => {
                let _ = writeln!(
                    out,
                    "TagHelperAttribute {} {} {}",
                    node.name.text,
                    node.info.structure.as_str(),
                    node.info.binding.as_str()
                );
                render_nodes(out, node.value, depth + 1);
            }
            AttributeNode::MinimizedTagHelper(node) => {
                let _ = writeln!(
                    out,
                    "MinimizedTagHelperAttribute {} {}",
                    node.name.text,
                    node.info.binding.as_str()
                );
            }
        }
    }
}
