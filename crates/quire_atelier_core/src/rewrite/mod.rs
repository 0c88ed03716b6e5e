//! Tag helper rewriting of the syntax tree.
//!
//! - [`parse_tree`]: binds elements and produces tag helper elements
//! - [`attributes`]: classifies and validates start tag attributes
//! - [`value`]: re-partitions bound non-string values into code

pub mod attributes;
pub mod parse_tree;
pub mod value;

pub use attributes::rewrite_attributes;
pub use parse_tree::TagHelperParseTreeRewriter;
pub use value::{code_content, AttributeValueRewriter};

use quire_carton::Bump;
use quire_relief::{Block, CompilerError, CompilerOptions, Span, SyntaxNode};

use crate::binder::TagHelperBinder;

pub(crate) fn alloc_block<'a>(
    allocator: &'a Bump,
    children: &'a [SyntaxNode<'a>],
    span: Span,
) -> SyntaxNode<'a> {
    SyntaxNode::Block(allocator.alloc(Block { children, span }))
}

/// Rewrite every element bound by `binder`. The input tree is left intact.
pub fn rewrite_tag_helpers<'a>(
    allocator: &'a Bump,
    tree: SyntaxNode<'a>,
    binder: &TagHelperBinder<'a>,
    options: &CompilerOptions,
) -> (SyntaxNode<'a>, Vec<CompilerError>) {
    TagHelperParseTreeRewriter::new(allocator, binder, options).rewrite(tree)
}
