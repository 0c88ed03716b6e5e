//! Syntax tree construction.
//!
//! The parser lives outside this workspace; hosts and tests build input trees
//! through [`SyntaxFactory`]. Spans are assigned from a running cursor in the
//! order literals are created.

use std::cell::Cell;

use quire_carton::Bump;

use crate::{
    syntax::{
        AttributeNode, Block, Directive, DirectiveKind, EndTag, ExplicitExpression,
        ImplicitExpression, Literal, MarkupAttribute, MarkupElement, MinimizedAttribute,
        MiscAttributeContent, StartTag, Statement, SyntaxNode,
    },
    Span,
};

pub struct SyntaxFactory<'a> {
    allocator: &'a Bump,
    cursor: Cell<u32>,
}

impl<'a> SyntaxFactory<'a> {
    pub fn new(allocator: &'a Bump) -> Self {
        Self {
            allocator,
            cursor: Cell::new(0),
        }
    }

    #[inline]
    pub fn allocator(&self) -> &'a Bump {
        self.allocator
    }

    pub fn literal(&self, text: &str) -> Literal<'a> {
        let start = self.cursor.get();
        let end = start + text.len() as u32;
        self.cursor.set(end);
        Literal::new(self.allocator.alloc_str(text), Span::new(start, end))
    }

    pub fn nodes(&self, nodes: &[SyntaxNode<'a>]) -> &'a [SyntaxNode<'a>] {
        self.allocator.alloc_slice_copy(nodes)
    }

    pub fn text(&self, text: &str) -> SyntaxNode<'a> {
        SyntaxNode::MarkupText(self.literal(text))
    }

    pub fn code(&self, code: &str) -> SyntaxNode<'a> {
        SyntaxNode::CodeLiteral(self.literal(code))
    }

    pub fn transition(&self) -> SyntaxNode<'a> {
        SyntaxNode::Transition(self.literal("@"))
    }

    /// `@code`
    pub fn implicit(&self, code: &str) -> SyntaxNode<'a> {
        let transition = self.literal("@");
        let body = self.nodes(&[self.code(code)]);
        SyntaxNode::ImplicitExpression(self.allocator.alloc(ImplicitExpression {
            transition: Some(transition),
            body,
            span: spanning(transition.span, body),
        }))
    }

    /// `@(code)`
    pub fn explicit(&self, code: &str) -> SyntaxNode<'a> {
        let transition = self.literal("@");
        let open_paren = self.literal("(");
        let body = self.nodes(&[self.code(code)]);
        let close_paren = self.literal(")");
        SyntaxNode::ExplicitExpression(self.allocator.alloc(ExplicitExpression {
            transition,
            open_paren,
            body,
            close_paren,
            span: transition.span.merge(close_paren.span),
        }))
    }

    /// `@{code}`
    pub fn statement(&self, code: &str) -> SyntaxNode<'a> {
        let transition = self.literal("@");
        let open_brace = self.literal("{");
        let body = self.nodes(&[self.code(code)]);
        let close_brace = self.literal("}");
        SyntaxNode::Statement(self.allocator.alloc(Statement {
            transition,
            open_brace,
            body,
            close_brace,
            span: transition.span.merge(close_brace.span),
        }))
    }

    /// `@{ ... }` mixing code and markup.
    pub fn code_block(&self, body: &[SyntaxNode<'a>]) -> SyntaxNode<'a> {
        let transition = self.literal("@");
        let open_brace = self.literal("{");
        let body = self.nodes(body);
        let close_brace = self.literal("}");
        SyntaxNode::Statement(self.allocator.alloc(Statement {
            transition,
            open_brace,
            body,
            close_brace,
            span: transition.span.merge(close_brace.span),
        }))
    }

    /// `@keyword value`
    pub fn directive(&self, keyword: &str, value: &str) -> SyntaxNode<'a> {
        let transition = self.literal("@");
        let keyword_literal = self.literal(keyword);
        let mut raw = std::string::String::with_capacity(value.len() + 1);
        raw.push(' ');
        raw.push_str(value);
        let value = self.literal(&raw);
        SyntaxNode::Directive(self.allocator.alloc(Directive {
            transition,
            keyword: keyword_literal,
            kind: DirectiveKind::from_keyword(keyword),
            value,
            span: transition.span.merge(value.span),
        }))
    }

    pub fn block(&self, children: &[SyntaxNode<'a>]) -> SyntaxNode<'a> {
        let children = self.nodes(children);
        SyntaxNode::Block(self.allocator.alloc(Block {
            children,
            span: Span::cover(children.iter().map(SyntaxNode::span)),
        }))
    }

    /// ` name="value"`
    pub fn attribute(&self, name: &str, value: &[SyntaxNode<'a>]) -> AttributeNode<'a> {
        self.attribute_with_quote(name, Some('"'), value)
    }

    /// ` name=value`, quoted with `quote` when present.
    pub fn attribute_with_quote(
        &self,
        name: &str,
        quote: Option<char>,
        value: &[SyntaxNode<'a>],
    ) -> AttributeNode<'a> {
        let name_prefix = self.literal(" ");
        let name = self.literal(name);
        let equals = self.literal("=");
        let mut quote_buf = [0u8; 4];
        let value_prefix = quote.map(|q| self.literal(q.encode_utf8(&mut quote_buf)));
        let value = self.nodes(value);
        let value_suffix = quote.map(|q| self.literal(q.encode_utf8(&mut quote_buf)));
        let mut span = name_prefix.span.merge(equals.span);
        span = spanning(span, value);
        if let Some(suffix) = value_suffix {
            span = span.merge(suffix.span);
        }
        AttributeNode::Markup(self.allocator.alloc(MarkupAttribute {
            name_prefix: Some(name_prefix),
            name,
            equals,
            value_prefix,
            value,
            value_suffix,
            span,
        }))
    }

    /// ` name`
    pub fn minimized(&self, name: &str) -> AttributeNode<'a> {
        let name_prefix = self.literal(" ");
        let name = self.literal(name);
        AttributeNode::Minimized(self.allocator.alloc(MinimizedAttribute {
            name_prefix: Some(name_prefix),
            name,
            span: name_prefix.span.merge(name.span),
        }))
    }

    pub fn misc(&self, children: &[SyntaxNode<'a>]) -> AttributeNode<'a> {
        let children = self.nodes(children);
        AttributeNode::Misc(self.allocator.alloc(MiscAttributeContent {
            children,
            span: Span::cover(children.iter().map(SyntaxNode::span)),
        }))
    }

    pub fn start_tag(
        &self,
        name: &str,
        attributes: &[AttributeNode<'a>],
        self_closing: bool,
    ) -> &'a StartTag<'a> {
        let open = self.literal("<");
        let name = self.literal(name);
        let attributes = self.allocator.alloc_slice_copy(attributes);
        let close = self.literal(if self_closing { " />" } else { ">" });
        let span = attributes
            .iter()
            .map(AttributeNode::span)
            .fold(open.span.merge(close.span), Span::merge);
        self.allocator.alloc(StartTag {
            open,
            name,
            attributes,
            close,
            span,
        })
    }

    pub fn end_tag(&self, name: &str) -> &'a EndTag<'a> {
        let open = self.literal("</");
        let name = self.literal(name);
        let close = self.literal(">");
        self.allocator.alloc(EndTag {
            open,
            name,
            close,
            span: open.span.merge(close.span),
        })
    }

    pub fn element_from_parts(
        &self,
        start_tag: &'a StartTag<'a>,
        children: &[SyntaxNode<'a>],
        end_tag: Option<&'a EndTag<'a>>,
    ) -> SyntaxNode<'a> {
        let children = self.nodes(children);
        let mut span = spanning(start_tag.span, children);
        if let Some(end) = end_tag {
            span = span.merge(end.span);
        }
        SyntaxNode::Element(self.allocator.alloc(MarkupElement {
            start_tag,
            children,
            end_tag,
            span,
        }))
    }

    /// `<name attributes>children</name>`
    pub fn element(
        &self,
        name: &str,
        attributes: &[AttributeNode<'a>],
        children: &[SyntaxNode<'a>],
    ) -> SyntaxNode<'a> {
        let start = self.start_tag(name, attributes, false);
        let end = self.end_tag(name);
        self.element_from_parts(start, children, Some(end))
    }

    /// `<name attributes />`
    pub fn self_closing(&self, name: &str, attributes: &[AttributeNode<'a>]) -> SyntaxNode<'a> {
        let start = self.start_tag(name, attributes, true);
        self.element_from_parts(start, &[], None)
    }

    /// `<name attributes>` without an end tag.
    pub fn start_only(&self, name: &str, attributes: &[AttributeNode<'a>]) -> SyntaxNode<'a> {
        let start = self.start_tag(name, attributes, false);
        self.element_from_parts(start, &[], None)
    }
}

fn spanning(span: Span, nodes: &[SyntaxNode<'_>]) -> Span {
    nodes.iter().map(SyntaxNode::span).fold(span, Span::merge)
}
