//! Intermediate tree.
//!
//! Nodes live in one vector owned by [`IntermediateTree`] and are addressed by
//! [`NodeId`]. Parents own ordered child id lists; removing a node only drops
//! its id from the parent's list. Each node carries its own diagnostics, and
//! only attached nodes report them, so passes detach through
//! [`IntermediateTree::detach_child`].

use std::fmt::Write as _;

use quire_carton::String;

use crate::{
    matching::{find_bound_attribute, strip_parameter},
    syntax::AttributeStructure,
    tag_helper::{BoundAttributeDescriptor, BoundAttributeParameterDescriptor, TagHelperDescriptor},
    CompilerError, Span,
};

/// Index of a node in its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Html,
    CSharp,
}

/// Leaf carrying literal content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntermediateToken {
    pub kind: TokenKind,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct MarkupElementNode {
    pub tag_name: String,
}

#[derive(Debug, Clone)]
pub struct ComponentNode<'a> {
    pub tag_name: String,
    pub component: &'a TagHelperDescriptor,
}

/// One attribute usage bound to a tag helper property.
///
/// Only constructible through [`TagHelperPropertyNode::new`], which requires
/// the attribute name to resolve against the tag helper.
#[derive(Debug, Clone)]
pub struct TagHelperPropertyNode<'a> {
    attribute_name: String,
    attribute_structure: AttributeStructure,
    tag_helper: &'a TagHelperDescriptor,
    bound_attribute: &'a BoundAttributeDescriptor,
    bound_attribute_parameter: Option<&'a BoundAttributeParameterDescriptor>,
    is_indexer_name_match: bool,
}

impl<'a> TagHelperPropertyNode<'a> {
    /// `None` when `attribute_name` does not resolve to a bound attribute of `tag_helper`.
    pub fn new(
        attribute_name: &str,
        attribute_structure: AttributeStructure,
        tag_helper: &'a TagHelperDescriptor,
    ) -> Option<Self> {
        let matched = find_bound_attribute(attribute_name, tag_helper)?;
        Some(Self {
            attribute_name: String::new(attribute_name),
            attribute_structure,
            tag_helper,
            bound_attribute: matched.attribute,
            bound_attribute_parameter: matched.parameter,
            is_indexer_name_match: matched.is_indexer_match,
        })
    }

    #[inline]
    pub fn attribute_name(&self) -> &str {
        &self.attribute_name
    }

    /// `bind-value` for `bind-value:format`.
    #[inline]
    pub fn attribute_name_without_parameter(&self) -> &str {
        strip_parameter(&self.attribute_name)
    }

    #[inline]
    pub fn attribute_structure(&self) -> AttributeStructure {
        self.attribute_structure
    }

    #[inline]
    pub fn tag_helper(&self) -> &'a TagHelperDescriptor {
        self.tag_helper
    }

    #[inline]
    pub fn bound_attribute(&self) -> &'a BoundAttributeDescriptor {
        self.bound_attribute
    }

    #[inline]
    pub fn bound_attribute_parameter(&self) -> Option<&'a BoundAttributeParameterDescriptor> {
        self.bound_attribute_parameter
    }

    #[inline]
    pub fn is_parameter_match(&self) -> bool {
        self.bound_attribute_parameter.is_some()
    }

    #[inline]
    pub fn is_indexer_name_match(&self) -> bool {
        self.is_indexer_name_match
    }
}

/// Lowered attribute of a component.
#[derive(Debug, Clone)]
pub struct ComponentAttributeNode<'a> {
    pub attribute_name: String,
    pub attribute_structure: AttributeStructure,
    pub bound_attribute: Option<&'a BoundAttributeDescriptor>,
    pub property_name: Option<String>,
    pub type_name: Option<String>,
    pub tag_helper: Option<&'a TagHelperDescriptor>,
}

/// Lowered markup attribute, rendered as `prefix value suffix`.
#[derive(Debug, Clone)]
pub struct HtmlAttributeNode {
    pub attribute_name: String,
    pub prefix: String,
    pub suffix: String,
}

#[derive(Debug, Clone, Default)]
pub struct AttributeValueNode {
    pub prefix: String,
}

#[derive(Debug, Clone)]
pub enum IntermediateNodeKind<'a> {
    Document,
    MarkupElement(MarkupElementNode),
    Component(ComponentNode<'a>),
    TagHelperProperty(TagHelperPropertyNode<'a>),
    ComponentAttribute(ComponentAttributeNode<'a>),
    HtmlAttribute(HtmlAttributeNode),
    HtmlAttributeValue(AttributeValueNode),
    CSharpExpressionAttributeValue(AttributeValueNode),
    HtmlContent,
    CSharpExpression,
    Token(IntermediateToken),
}

#[derive(Debug, Clone)]
pub struct IntermediateNode<'a> {
    pub kind: IntermediateNodeKind<'a>,
    pub span: Option<Span>,
    pub children: Vec<NodeId>,
    pub diagnostics: Vec<CompilerError>,
}

impl<'a> IntermediateNode<'a> {
    pub fn new(kind: IntermediateNodeKind<'a>) -> Self {
        Self {
            kind,
            span: None,
            children: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn as_tag_helper_property(&self) -> Option<&TagHelperPropertyNode<'a>> {
        match &self.kind {
            IntermediateNodeKind::TagHelperProperty(property) => Some(property),
            _ => None,
        }
    }
}

/// A child reached from its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeReference {
    pub parent: NodeId,
    pub node: NodeId,
}

#[derive(Debug, Clone)]
pub struct IntermediateTree<'a> {
    nodes: Vec<IntermediateNode<'a>>,
    root: NodeId,
}

impl Default for IntermediateTree<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntermediateTree<'a> {
    /// Tree holding only a document node.
    pub fn new() -> Self {
        Self {
            nodes: vec![IntermediateNode::new(IntermediateNodeKind::Document)],
            root: NodeId(0),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &IntermediateNode<'a> {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut IntermediateNode<'a> {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &IntermediateNodeKind<'a> {
        &self.node(id).kind
    }

    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Allocate a node without attaching it.
    pub fn alloc(&mut self, node: IntermediateNode<'a>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn append(&mut self, parent: NodeId, node: IntermediateNode<'a>) -> NodeId {
        let id = self.alloc(node);
        self.node_mut(parent).children.push(id);
        id
    }

    pub fn add_child(&mut self, parent: NodeId, kind: IntermediateNodeKind<'a>) -> NodeId {
        self.append(parent, IntermediateNode::new(kind))
    }

    pub fn add_token(&mut self, parent: NodeId, kind: TokenKind, content: &str) -> NodeId {
        self.add_child(
            parent,
            IntermediateNodeKind::Token(IntermediateToken {
                kind,
                content: String::new(content),
            }),
        )
    }

    /// Detach `node` from `parent`. Returns its former position.
    pub fn remove_child(&mut self, parent: NodeId, node: NodeId) -> Option<usize> {
        let children = &mut self.node_mut(parent).children;
        let position = children.iter().position(|&child| child == node)?;
        children.remove(position);
        Some(position)
    }

    /// Detach `node` from `parent` and move the diagnostics of the removed
    /// subtree onto `parent`.
    pub fn detach_child(&mut self, parent: NodeId, node: NodeId) -> Option<usize> {
        let position = self.remove_child(parent, node)?;
        let mut diagnostics = self.take_diagnostics(node);
        self.node_mut(parent).diagnostics.append(&mut diagnostics);
        Some(position)
    }

    /// Drain the diagnostics of `id` and its descendants, in document order.
    pub fn take_diagnostics(&mut self, id: NodeId) -> Vec<CompilerError> {
        let mut taken = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node_mut(current);
            taken.append(&mut node.diagnostics);
            stack.extend(node.children.iter().rev());
        }
        taken
    }

    /// Put `replacements` where `node` was under `parent`.
    pub fn replace_child(&mut self, parent: NodeId, node: NodeId, replacements: &[NodeId]) -> bool {
        let children = &mut self.node_mut(parent).children;
        let Some(position) = children.iter().position(|&child| child == node) else {
            return false;
        };
        children.splice(position..=position, replacements.iter().copied());
        true
    }

    pub fn add_diagnostic(&mut self, id: NodeId, diagnostic: CompilerError) {
        self.node_mut(id).diagnostics.push(diagnostic);
    }

    /// Every attached node matching `predicate`, in document order.
    pub fn find_descendant_references(
        &self,
        predicate: impl Fn(&IntermediateNode<'a>) -> bool,
    ) -> Vec<NodeReference> {
        let mut references = Vec::new();
        let mut stack = vec![self.root];
        while let Some(parent) = stack.pop() {
            for &child in self.children(parent) {
                if predicate(self.node(child)) {
                    references.push(NodeReference { parent, node: child });
                }
            }
            stack.extend(self.children(parent).iter().rev());
        }
        // Parents are popped depth first, so restore document order.
        let order = self.preorder_positions();
        references.sort_by_key(|reference| order[reference.node.index()]);
        references
    }

    fn preorder_positions(&self) -> Vec<usize> {
        let mut positions = vec![usize::MAX; self.nodes.len()];
        let mut next = 0;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            positions[id.index()] = next;
            next += 1;
            stack.extend(self.children(id).iter().rev());
        }
        positions
    }

    /// Ids of attached nodes in pre-order.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        order
    }

    /// Diagnostics of every attached node, in document order.
    pub fn all_diagnostics(&self) -> Vec<CompilerError> {
        self.preorder()
            .into_iter()
            .flat_map(|id| self.node(id).diagnostics.iter().cloned())
            .collect()
    }

    /// Concatenated token content under `id`.
    pub fn content(&self, id: NodeId) -> std::string::String {
        let mut out = std::string::String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let IntermediateNodeKind::Token(token) = self.kind(current) {
                out.push_str(&token.content);
            }
            stack.extend(self.children(current).iter().rev());
        }
        out
    }

    /// Indented outline of the attached tree, one node per line.
    pub fn debug_render(&self) -> std::string::String {
        let mut out = std::string::String::new();
        self.render_node(&mut out, self.root, 0);
        while out.ends_with('\n') {
            out.pop();
        }
        out
    }

    fn render_node(&self, out: &mut std::string::String, id: NodeId, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        let node = self.node(id);
        match &node.kind {
            IntermediateNodeKind::Document => out.push_str("Document"),
            IntermediateNodeKind::MarkupElement(element) => {
                let _ = write!(out, "MarkupElement <{}>", element.tag_name);
            }
            IntermediateNodeKind::Component(component) => {
                let _ = write!(out, "Component <{}> {}", component.tag_name, component.component.name);
            }
            IntermediateNodeKind::TagHelperProperty(property) => {
                let _ = write!(
                    out,
                    "TagHelperProperty {} ({})",
                    property.attribute_name(),
                    property.tag_helper().name
                );
            }
            IntermediateNodeKind::ComponentAttribute(attribute) => {
                let _ = write!(out, "ComponentAttribute {}", attribute.attribute_name);
                if let Some(type_name) = &attribute.type_name {
                    let _ = write!(out, " : {type_name}");
                }
            }
            IntermediateNodeKind::HtmlAttribute(attribute) => {
                let _ = write!(
                    out,
                    "HtmlAttribute {} {:?} {:?}",
                    attribute.attribute_name, attribute.prefix, attribute.suffix
                );
            }
            IntermediateNodeKind::HtmlAttributeValue(_) => out.push_str("HtmlAttributeValue"),
            IntermediateNodeKind::CSharpExpressionAttributeValue(_) => {
                out.push_str("CSharpExpressionAttributeValue")
            }
            IntermediateNodeKind::HtmlContent => out.push_str("HtmlContent"),
            IntermediateNodeKind::CSharpExpression => out.push_str("CSharpExpression"),
            IntermediateNodeKind::Token(token) => {
                let kind = match token.kind {
                    TokenKind::Html => "Html",
                    TokenKind::CSharp => "CSharp",
                };
                let _ = write!(out, "{kind} {:?}", token.content.as_str());
            }
        }
        for diagnostic in &node.diagnostics {
            let _ = write!(out, " !{}", diagnostic.code.id());
        }
        out.push('\n');
        for &child in &node.children {
            self.render_node(out, child, depth + 1);
        }
    }
}
