//! Markup/code re-partitioning of bound non-string attribute values.
//!
//! `count="@Count"` and `count="1 + @Count"` are code, not markup with an
//! embedded expression. The first `@` is kept as the real transition; every
//! fragment after it becomes code text of the same span and later
//! transitions are dropped, so `1 + @Count` reads `1 + Count`. Statements,
//! directives and nested elements stay as they are.

use quire_carton::{Bump, SmallVec};
use quire_relief::{ImplicitExpression, Literal, SyntaxNode};

use super::alloc_block;

pub struct AttributeValueRewriter<'a> {
    allocator: &'a Bump,
    rewrite_as_code: bool,
}

impl<'a> AttributeValueRewriter<'a> {
    pub fn new(allocator: &'a Bump) -> Self {
        Self {
            allocator,
            rewrite_as_code: false,
        }
    }

    pub fn rewrite(mut self, value: &'a [SyntaxNode<'a>]) -> &'a [SyntaxNode<'a>] {
        self.visit_all(value)
    }

    fn visit_all(&mut self, nodes: &'a [SyntaxNode<'a>]) -> &'a [SyntaxNode<'a>] {
        let allocator = self.allocator;
        allocator.alloc_slice_fill_iter(nodes.iter().map(|node| self.visit(*node)))
    }

    fn visit(&mut self, node: SyntaxNode<'a>) -> SyntaxNode<'a> {
        match node {
            SyntaxNode::MarkupText(literal) => {
                self.rewrite_as_code = true;
                SyntaxNode::CodeLiteral(literal)
            }
            SyntaxNode::CodeLiteral(_) => {
                self.rewrite_as_code = true;
                node
            }
            SyntaxNode::Transition(literal) => {
                if self.rewrite_as_code {
                    SyntaxNode::CodeLiteral(Literal::new("", literal.span))
                } else {
                    self.rewrite_as_code = true;
                    node
                }
            }
            SyntaxNode::ImplicitExpression(expression) => {
                let transition = expression.transition.filter(|_| !self.rewrite_as_code);
                if expression.transition.is_some() {
                    self.rewrite_as_code = true;
                }
                let body = self.visit_all(expression.body);
                SyntaxNode::ImplicitExpression(self.allocator.alloc(ImplicitExpression {
                    transition,
                    body,
                    span: expression.span,
                }))
            }
            SyntaxNode::ExplicitExpression(expression) => {
                // `@(a + b)` keeps its parentheses as code.
                let leading = !self.rewrite_as_code;
                self.rewrite_as_code = true;
                let mut body: SmallVec<[SyntaxNode<'a>; 4]> = SmallVec::new();
                body.push(SyntaxNode::CodeLiteral(expression.open_paren));
                body.extend(expression.body.iter().map(|child| self.visit(*child)));
                body.push(SyntaxNode::CodeLiteral(expression.close_paren));
                let transition = leading.then_some(expression.transition);
                self.implicit(transition, &body, expression.span)
            }
            SyntaxNode::Block(block) => {
                let children = self.visit_all(block.children);
                alloc_block(self.allocator, children, block.span)
            }
            SyntaxNode::Statement(_)
            | SyntaxNode::Directive(_)
            | SyntaxNode::Element(_)
            | SyntaxNode::TagHelperElement(_) => node,
        }
    }

    fn implicit(
        &self,
        transition: Option<Literal<'a>>,
        body: &[SyntaxNode<'a>],
        span: quire_relief::Span,
    ) -> SyntaxNode<'a> {
        SyntaxNode::ImplicitExpression(self.allocator.alloc(ImplicitExpression {
            transition,
            body: self.allocator.alloc_slice_copy(body),
            span,
        }))
    }
}

/// Code text of a rewritten value, without the leading transition.
pub fn code_content(value: &[SyntaxNode<'_>]) -> String {
    let mut out = String::new();
    for node in value {
        match node {
            SyntaxNode::ImplicitExpression(expression) => {
                for child in expression.body {
                    child.write_source(&mut out);
                }
            }
            SyntaxNode::Transition(_) => {}
            other => other.write_source(&mut out),
        }
    }
    out
}
