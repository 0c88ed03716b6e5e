//! Document walk that turns bound elements into tag helper elements.

use quire_carton::{Bump, FxHashSet};
use quire_relief::{
    AttributeNode, CompilerError, CompilerOptions, ExplicitExpression, ImplicitExpression,
    MarkupElement, Statement, SyntaxNode, TagHelperDescriptor, TagHelperElement, TagHelperInfo,
    TagHelperStartTag, TagMode,
};

use super::{alloc_block, attributes::rewrite_attributes};
use crate::binder::TagHelperBinder;

/// Enclosing element while walking children.
struct Frame<'a> {
    tag_name: &'a str,
    is_tag_helper: bool,
    /// Present when a bound descriptor restricts its children.
    allowed_children: Option<Vec<&'a str>>,
}

pub struct TagHelperParseTreeRewriter<'a, 'b> {
    allocator: &'a Bump,
    binder: &'b TagHelperBinder<'a>,
    options: &'b CompilerOptions,
    stack: Vec<Frame<'a>>,
    reported: FxHashSet<*const TagHelperDescriptor>,
    diagnostics: Vec<CompilerError>,
}

impl<'a, 'b> TagHelperParseTreeRewriter<'a, 'b> {
    pub fn new(
        allocator: &'a Bump,
        binder: &'b TagHelperBinder<'a>,
        options: &'b CompilerOptions,
    ) -> Self {
        Self {
            allocator,
            binder,
            options,
            stack: Vec::new(),
            reported: FxHashSet::default(),
            diagnostics: Vec::new(),
        }
    }

    pub fn rewrite(mut self, root: SyntaxNode<'a>) -> (SyntaxNode<'a>, Vec<CompilerError>) {
        let root = self.visit(root);
        (root, self.diagnostics)
    }

    fn visit_all(&mut self, nodes: &'a [SyntaxNode<'a>]) -> &'a [SyntaxNode<'a>] {
        let mut rewritten = Vec::with_capacity(nodes.len());
        for node in nodes {
            rewritten.push(self.visit(*node));
        }
        self.allocator.alloc_slice_copy(&rewritten)
    }

    fn visit(&mut self, node: SyntaxNode<'a>) -> SyntaxNode<'a> {
        match node {
            SyntaxNode::Block(block) => {
                let children = self.visit_all(block.children);
                alloc_block(self.allocator, children, block.span)
            }
            SyntaxNode::Element(element) => self.visit_element(element),
            SyntaxNode::MarkupText(literal) => {
                if !literal.text.trim().is_empty() {
                    if let Some((parent, allowed)) = self.restricting_parent() {
                        self.diagnostics.push(CompilerError::cannot_have_non_tag_content(
                            literal.span,
                            parent,
                            &allowed,
                        ));
                    }
                }
                node
            }
            // Markup nested in code is bound like any other markup.
            SyntaxNode::Statement(statement) => {
                let body = self.visit_all(statement.body);
                SyntaxNode::Statement(self.allocator.alloc(Statement { body, ..*statement }))
            }
            SyntaxNode::ImplicitExpression(expression) => {
                let body = self.visit_all(expression.body);
                SyntaxNode::ImplicitExpression(
                    self.allocator.alloc(ImplicitExpression { body, ..*expression }),
                )
            }
            SyntaxNode::ExplicitExpression(expression) => {
                let body = self.visit_all(expression.body);
                SyntaxNode::ExplicitExpression(
                    self.allocator.alloc(ExplicitExpression { body, ..*expression }),
                )
            }
            SyntaxNode::TagHelperElement(_)
            | SyntaxNode::Transition(_)
            | SyntaxNode::CodeLiteral(_)
            | SyntaxNode::Directive(_) => node,
        }
    }

    /// Parent tag name and its joined allowed children, when validation applies.
    fn restricting_parent(&self) -> Option<(&'a str, String)> {
        if !self.options.validate_allowed_children {
            return None;
        }
        let frame = self.stack.last()?;
        let allowed = frame.allowed_children.as_ref()?;
        Some((frame.tag_name, allowed.join(", ")))
    }

    fn validate_child_tag(&mut self, element: &'a MarkupElement<'a>) {
        let Some((parent, allowed)) = self.restricting_parent() else {
            return;
        };
        let tag_name = element.tag_name();
        let name = self.binder.strip_prefix(tag_name).unwrap_or(tag_name);
        let is_allowed = self
            .stack
            .last()
            .and_then(|frame| frame.allowed_children.as_ref())
            .is_some_and(|tags| tags.iter().any(|tag| tag.eq_ignore_ascii_case(name)));
        if !is_allowed {
            self.diagnostics.push(CompilerError::invalid_nested_tag(
                element.start_tag.name.span,
                tag_name,
                parent,
                &allowed,
            ));
        }
    }

    fn visit_element(&mut self, element: &'a MarkupElement<'a>) -> SyntaxNode<'a> {
        self.validate_child_tag(element);

        let start_tag = element.start_tag;
        let tag_name = element.tag_name();
        let mut pairs: Vec<(&str, &str)> = Vec::with_capacity(start_tag.attributes.len());
        for attribute in start_tag.attributes {
            if let AttributeNode::Misc(_) = attribute {
                continue;
            }
            let Some(name) = attribute.name() else {
                continue;
            };
            let mut value = String::new();
            for node in attribute.value() {
                node.write_source(&mut value);
            }
            pairs.push((name, self.allocator.alloc_str(&value)));
        }

        let parent = self.stack.last();
        let binding = self.binder.get_binding(
            tag_name,
            &pairs,
            parent.map(|frame| frame.tag_name),
            parent.is_some_and(|frame| frame.is_tag_helper),
        );

        let Some(binding) = binding else {
            self.stack.push(Frame {
                tag_name,
                is_tag_helper: false,
                allowed_children: None,
            });
            let children = self.visit_all(element.children);
            self.stack.pop();
            return SyntaxNode::Element(self.allocator.alloc(MarkupElement {
                start_tag,
                children,
                end_tag: element.end_tag,
                span: element.span,
            }));
        };

        let tag_mode = binding.tag_mode(start_tag.is_self_closing());
        match (tag_mode, element.end_tag) {
            (TagMode::StartTagOnly, Some(end_tag)) => {
                self.diagnostics
                    .push(CompilerError::must_not_have_end_tag(end_tag.span, tag_name));
            }
            (TagMode::StartTagAndEndTag, None) => {
                self.diagnostics
                    .push(CompilerError::malformed_tag_helper(start_tag.span, tag_name));
            }
            _ => {}
        }

        for descriptor in binding.descriptors() {
            if descriptor.diagnostics.is_empty() || !self.reported.insert(descriptor as *const _) {
                continue;
            }
            for diagnostic in &descriptor.diagnostics {
                let mut diagnostic = diagnostic.clone();
                diagnostic.span = start_tag.name.span;
                self.diagnostics.push(diagnostic);
            }
        }

        let attributes = rewrite_attributes(
            self.allocator,
            tag_name,
            start_tag.attributes,
            &binding,
            self.options,
            &mut self.diagnostics,
        );
        let descriptors: Vec<&'a TagHelperDescriptor> = binding.descriptors().collect();
        let tag_helpers: &'a [&'a TagHelperDescriptor] =
            self.allocator.alloc_slice_copy(&descriptors);
        let info = self.allocator.alloc(TagHelperInfo {
            tag_name,
            tag_mode,
            tag_helpers,
        });
        tracing::trace!(
            tag = tag_name,
            mode = tag_mode.as_str(),
            tag_helpers = tag_helpers.len(),
            "rewrote tag helper element"
        );

        self.stack.push(Frame {
            tag_name,
            is_tag_helper: true,
            allowed_children: binding.allowed_child_tags(),
        });
        let children = self.visit_all(element.children);
        self.stack.pop();

        let start_tag = self.allocator.alloc(TagHelperStartTag {
            open: start_tag.open,
            name: start_tag.name,
            attributes,
            close: start_tag.close,
            span: start_tag.span,
        });
        SyntaxNode::TagHelperElement(self.allocator.alloc(TagHelperElement {
            start_tag,
            children,
            end_tag: element.end_tag,
            info,
            span: element.span,
        }))
    }
}
