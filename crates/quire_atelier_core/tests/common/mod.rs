//! Shared fixtures for pipeline tests.

#![allow(dead_code)]

use quire_atelier_core::{
    rewrite::code_content, CodeDocument, CompilerOptions, DocumentPass, Engine, PipelineError,
};
use quire_relief::{
    metadata, AttributeNode, BoundAttributeDescriptor, BoundAttributeParameterDescriptor,
    ComponentNode, HtmlAttributeNode, IntermediateNode, IntermediateNodeKind, IntermediateTree,
    MarkupElementNode, NodeId, RequiredAttributeDescriptor, SyntaxNode, TagHelperCatalog,
    TagHelperDescriptor, TagHelperKind, TagHelperPropertyNode, TagMatchingRule, TokenKind,
    ValueComparison,
};

/// Builds the intermediate tree from the rewritten syntax tree, standing in
/// for a host's classification pass.
pub struct ClassifyPass;

impl ClassifyPass {
    pub const ORDER: u32 = 1000;
}

impl DocumentPass for ClassifyPass {
    fn name(&self) -> &'static str {
        "classify"
    }

    fn order(&self) -> u32 {
        Self::ORDER
    }

    fn execute<'a>(
        &self,
        document: &mut CodeDocument<'a>,
        _options: &CompilerOptions,
    ) -> Result<(), PipelineError> {
        let mut tree = IntermediateTree::new();
        let root = tree.root();
        classify(&mut tree, root, document.syntax_tree);
        document.intermediate = Some(tree);
        Ok(())
    }
}

fn has_code(value: &[SyntaxNode<'_>]) -> bool {
    value
        .iter()
        .any(|node| !matches!(node, SyntaxNode::MarkupText(_)))
}

fn add_value<'a>(tree: &mut IntermediateTree<'a>, parent: NodeId, value: &[SyntaxNode<'_>]) {
    if has_code(value) {
        let expression = tree.add_child(parent, IntermediateNodeKind::CSharpExpression);
        tree.add_token(expression, TokenKind::CSharp, &code_content(value));
    } else {
        let html = tree.add_child(parent, IntermediateNodeKind::HtmlContent);
        let text: String = value.iter().map(|node| node.to_source()).collect();
        tree.add_token(html, TokenKind::Html, &text);
    }
}

fn add_html_attribute<'a>(
    tree: &mut IntermediateTree<'a>,
    parent: NodeId,
    name: &str,
    value: &[SyntaxNode<'_>],
) {
    let attribute = tree.add_child(
        parent,
        IntermediateNodeKind::HtmlAttribute(HtmlAttributeNode {
            attribute_name: name.into(),
            prefix: format!(" {name}=\"").into(),
            suffix: "\"".into(),
        }),
    );
    let text: String = value.iter().map(|node| node.to_source()).collect();
    tree.add_token(attribute, TokenKind::Html, &text);
}

fn classify<'a>(tree: &mut IntermediateTree<'a>, parent: NodeId, node: SyntaxNode<'a>) {
    match node {
        SyntaxNode::Block(block) => {
            for child in block.children {
                classify(tree, parent, *child);
            }
        }
        SyntaxNode::MarkupText(literal) => {
            if !literal.text.trim().is_empty() {
                let html = tree.add_child(parent, IntermediateNodeKind::HtmlContent);
                tree.add_token(html, TokenKind::Html, literal.text);
            }
        }
        SyntaxNode::Element(element) => {
            let id = tree.add_child(
                parent,
                IntermediateNodeKind::MarkupElement(MarkupElementNode {
                    tag_name: element.tag_name().into(),
                }),
            );
            for attribute in element.start_tag.attributes {
                if let Some(name) = attribute.name() {
                    add_html_attribute(tree, id, name, attribute.value());
                }
            }
            for child in element.children {
                classify(tree, id, *child);
            }
        }
        SyntaxNode::TagHelperElement(element) => {
            let tag_helpers = element.info.tag_helpers;
            let kind = match tag_helpers.iter().copied().find(|descriptor| descriptor.is_component()) {
                Some(component) => IntermediateNodeKind::Component(ComponentNode {
                    tag_name: element.info.tag_name.into(),
                    component,
                }),
                None => IntermediateNodeKind::MarkupElement(MarkupElementNode {
                    tag_name: element.info.tag_name.into(),
                }),
            };
            let id = tree.add_child(parent, kind);
            for attribute in element.start_tag.attributes {
                let (name, info, value, span) = match attribute {
                    AttributeNode::TagHelper(node) => (node.name.text, node.info, node.value, node.span),
                    AttributeNode::MinimizedTagHelper(node) => (node.name.text, node.info, &[][..], node.span),
                    _ => continue,
                };
                if !info.is_bound() {
                    add_html_attribute(tree, id, name, value);
                    continue;
                }
                for &descriptor in tag_helpers {
                    let Some(property) = TagHelperPropertyNode::new(name, info.structure, descriptor)
                    else {
                        continue;
                    };
                    let property = tree.append(
                        id,
                        IntermediateNode::new(IntermediateNodeKind::TagHelperProperty(property))
                            .with_span(span),
                    );
                    if !value.is_empty() {
                        add_value(tree, property, value);
                    }
                }
            }
            for child in element.children {
                classify(tree, id, *child);
            }
        }
        SyntaxNode::ImplicitExpression(_) | SyntaxNode::ExplicitExpression(_) => {
            let expression = tree.add_child(parent, IntermediateNodeKind::CSharpExpression);
            tree.add_token(expression, TokenKind::CSharp, &node.to_source());
        }
        SyntaxNode::Transition(_)
        | SyntaxNode::CodeLiteral(_)
        | SyntaxNode::Statement(_)
        | SyntaxNode::Directive(_) => {}
    }
}

/// Default passes plus [`ClassifyPass`].
pub fn engine() -> Engine {
    let mut engine = Engine::default();
    engine.register(Box::new(ClassifyPass));
    engine
}

fn format_parameter() -> BoundAttributeParameterDescriptor {
    BoundAttributeParameterDescriptor::new("format", "System.String")
}

fn event_parameter() -> BoundAttributeParameterDescriptor {
    BoundAttributeParameterDescriptor::new("event", "System.String")
}

/// `<MyInput>` with `Value`, a plain delegate `ValueChanged` and `ValueExpression`.
pub fn my_input() -> TagHelperDescriptor {
    TagHelperDescriptor::new(TagHelperKind::Component, "MyInput", "App")
        .with_type_name("App.Shared.MyInput")
        .with_rule(TagMatchingRule::new("MyInput"))
        .with_bound_attribute(BoundAttributeDescriptor::new("Value", "System.Int32"))
        .with_bound_attribute(
            BoundAttributeDescriptor::new("ValueChanged", "System.Action<System.Int32>")
                .with_metadata(metadata::DELEGATE_SIGNATURE, "True"),
        )
        .with_bound_attribute(BoundAttributeDescriptor::new(
            "ValueExpression",
            "System.Linq.Expressions.Expression<System.Func<System.Int32>>",
        ))
}

/// `<Stepper>` whose `StepChanged` is an event callback and has no expression attribute.
pub fn stepper() -> TagHelperDescriptor {
    TagHelperDescriptor::new(TagHelperKind::Component, "Stepper", "App")
        .with_type_name("App.Shared.Stepper")
        .with_rule(TagMatchingRule::new("Stepper"))
        .with_bound_attribute(BoundAttributeDescriptor::new("Step", "System.Int32"))
        .with_bound_attribute(
            BoundAttributeDescriptor::new("StepChanged", "EventCallback<System.Int32>")
                .with_metadata(metadata::EVENT_CALLBACK, "True"),
        )
}

/// Bind tag helper generated for a component's bindable property.
pub fn component_bind(component: &str, property: &str) -> TagHelperDescriptor {
    let attribute = format!("bind-{property}");
    TagHelperDescriptor::new(TagHelperKind::Bind, format!("Bind_{component}_{property}"), "App")
        .with_type_name(format!("App.Shared.{component}"))
        .with_rule(
            TagMatchingRule::new(component)
                .with_attribute(RequiredAttributeDescriptor::new(attribute.as_str())),
        )
        .with_bound_attribute(
            BoundAttributeDescriptor::new(attribute.as_str(), "System.Object")
                .with_parameter(format_parameter())
                .with_parameter(event_parameter()),
        )
}

/// Element bind tag helper for `<tag bind>` with the given value/change attributes.
pub fn element_bind(
    name: &str,
    rule: TagMatchingRule,
    value_attribute: &str,
    change_attribute: &str,
) -> TagHelperDescriptor {
    TagHelperDescriptor::new(TagHelperKind::Bind, name, "Quire.Web")
        .with_type_name("Quire.Web.BindAttributes")
        .with_rule(rule.with_attribute(RequiredAttributeDescriptor::new("bind")))
        .with_bound_attribute(
            BoundAttributeDescriptor::new("bind", "System.Object")
                .with_parameter(format_parameter())
                .with_parameter(event_parameter()),
        )
        .with_metadata(metadata::BIND_VALUE_ATTRIBUTE, value_attribute)
        .with_metadata(metadata::BIND_CHANGE_ATTRIBUTE, change_attribute)
}

/// Catch-all `bind-...` tag helper that yields to specific ones.
pub fn fallback_bind() -> TagHelperDescriptor {
    TagHelperDescriptor::new(TagHelperKind::Bind, "Bind", "Quire.Web")
        .with_type_name("Quire.Web.BindAttributes")
        .with_rule(TagMatchingRule::new("*").with_attribute(RequiredAttributeDescriptor::prefix("bind-")))
        .with_bound_attribute(
            BoundAttributeDescriptor::new("bind-...", "System.Collections.Generic.Dictionary<string, object>")
                .with_indexer("bind-", "System.Object")
                .with_parameter(format_parameter())
                .with_parameter(event_parameter()),
        )
        .with_metadata(metadata::BIND_FALLBACK, "True")
}

/// `onchange` takes an event callback, `oninput` a plain delegate.
pub fn event_handlers() -> TagHelperDescriptor {
    TagHelperDescriptor::new(TagHelperKind::EventHandler, "EventHandlers", "Quire.Web")
        .with_type_name("Quire.Web.EventHandlers")
        .with_rule(TagMatchingRule::new("*").with_attribute(RequiredAttributeDescriptor::prefix("on")))
        .with_bound_attribute(
            BoundAttributeDescriptor::new("onchange", "EventCallback<ChangeEventArgs>")
                .with_metadata(metadata::EVENT_CALLBACK, "True"),
        )
        .with_bound_attribute(
            BoundAttributeDescriptor::new("oninput", "System.Action<ChangeEventArgs>")
                .with_metadata(metadata::DELEGATE_SIGNATURE, "True"),
        )
}

pub fn input_bind() -> TagHelperDescriptor {
    element_bind("Bind_input", TagMatchingRule::new("input"), "value", "onchange")
}

pub fn input_text_bind() -> TagHelperDescriptor {
    element_bind(
        "Bind_input_text",
        TagMatchingRule::new("input").with_attribute(
            RequiredAttributeDescriptor::new("type").with_value("text", ValueComparison::FullMatch),
        ),
        "value",
        "oninput",
    )
}

/// `<div bind-class>`, more specific than [`fallback_bind`].
pub fn div_class_bind() -> TagHelperDescriptor {
    TagHelperDescriptor::new(TagHelperKind::Bind, "Bind_div_class", "Quire.Web")
        .with_type_name("Quire.Web.BindAttributes")
        .with_rule(
            TagMatchingRule::new("div")
                .with_attribute(RequiredAttributeDescriptor::new("bind-class")),
        )
        .with_bound_attribute(
            BoundAttributeDescriptor::new("bind-class", "System.Object")
                .with_parameter(format_parameter())
                .with_parameter(event_parameter()),
        )
        .with_metadata(metadata::BIND_VALUE_ATTRIBUTE, "class")
        .with_metadata(metadata::BIND_CHANGE_ATTRIBUTE, "onchange")
}

/// Components in `App.Shared`, web tag helpers in `Quire.Web`.
pub fn component_catalog() -> TagHelperCatalog {
    TagHelperCatalog::new(vec![
        my_input(),
        component_bind("MyInput", "Value"),
        stepper(),
        component_bind("Stepper", "Step"),
        input_bind(),
        input_text_bind(),
        fallback_bind(),
        div_class_bind(),
        event_handlers(),
    ])
}
