//! Tag helper descriptors and the descriptor catalog.
//!
//! Descriptors are produced by an external discovery step and are immutable
//! once built. A [`TagHelperCatalog`] owns them for a whole compilation
//! session and is shared by reference across every document run.

use quire_carton::{bitflags, split_namespace_and_type, str_eq, FxHashMap, String};
use serde::{Deserialize, Serialize};

use crate::CompilerError;

/// Well-known descriptor metadata keys.
pub mod metadata {
    /// Fully qualified name of the type backing the descriptor.
    pub const TYPE_NAME: &str = "Common.TypeName";
    /// Marks a descriptor as matched by its fully qualified tag name.
    pub const NAME_MATCH: &str = "Components.NameMatch";
    /// Value of [`NAME_MATCH`] for fully qualified matches.
    pub const FULLY_QUALIFIED_NAME_MATCH: &str = "Components.FullyQualifiedNameMatch";
    pub const BIND_VALUE_ATTRIBUTE: &str = "Components.Bind.ValueAttribute";
    pub const BIND_CHANGE_ATTRIBUTE: &str = "Components.Bind.ChangeAttribute";
    pub const BIND_EXPRESSION_ATTRIBUTE: &str = "Components.Bind.ExpressionAttribute";
    /// `"True"` when the bind tag helper yields to more specific ones.
    pub const BIND_FALLBACK: &str = "Components.Bind.Fallback";
    /// `"True"` when a bound attribute is a plain delegate.
    pub const DELEGATE_SIGNATURE: &str = "Components.DelegateSignature";
    /// `"True"` when a bound attribute is an awaitable event callback.
    pub const EVENT_CALLBACK: &str = "Components.EventCallback";
    /// `"True"` for directive attributes.
    pub const DIRECTIVE_ATTRIBUTE: &str = "Common.DirectiveAttribute";
}

/// The family a descriptor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TagHelperKind {
    /// Classic template tag helper.
    #[default]
    #[serde(rename = "ITagHelper")]
    Default,
    #[serde(rename = "Components.Component")]
    Component,
    #[serde(rename = "Components.ChildContent")]
    ChildContent,
    #[serde(rename = "Components.Bind")]
    Bind,
    #[serde(rename = "Components.EventHandler")]
    EventHandler,
    #[serde(rename = "Components.Key")]
    Key,
    #[serde(rename = "Components.Ref")]
    Ref,
    #[serde(rename = "Components.Splat")]
    Splat,
}

impl TagHelperKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "ITagHelper",
            Self::Component => "Components.Component",
            Self::ChildContent => "Components.ChildContent",
            Self::Bind => "Components.Bind",
            Self::EventHandler => "Components.EventHandler",
            Self::Key => "Components.Key",
            Self::Ref => "Components.Ref",
            Self::Splat => "Components.Splat",
        }
    }

    /// Kinds that only apply to component documents.
    #[inline]
    pub fn is_component_document_kind(self) -> bool {
        !matches!(self, Self::Default)
    }
}

/// Structure a matched tag is expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TagStructure {
    #[default]
    Unspecified,
    NormalOrSelfClosing,
    WithoutEndTag,
}

/// How a required attribute name is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NameComparison {
    #[default]
    FullMatch,
    PrefixMatch,
}

/// How a required attribute value is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ValueComparison {
    #[default]
    None,
    FullMatch,
    PrefixMatch,
    SuffixMatch,
}

/// An attribute that must be present for a rule to match.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredAttributeDescriptor {
    pub name: String,
    #[serde(default)]
    pub name_comparison: NameComparison,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub value_comparison: ValueComparison,
}

impl RequiredAttributeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Requires an attribute whose name starts with `prefix`.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            name: prefix.into(),
            name_comparison: NameComparison::PrefixMatch,
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>, comparison: ValueComparison) -> Self {
        self.value = Some(value.into());
        self.value_comparison = comparison;
        self
    }
}

/// One way a descriptor can match a start tag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagMatchingRule {
    /// Tag name, or `*` for any tag.
    pub tag_name: String,
    #[serde(default)]
    pub parent_tag: Option<String>,
    #[serde(default)]
    pub attributes: Vec<RequiredAttributeDescriptor>,
    #[serde(default)]
    pub tag_structure: TagStructure,
}

impl TagMatchingRule {
    pub const CATCH_ALL: &'static str = "*";

    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_tag = Some(parent.into());
        self
    }

    pub fn with_attribute(mut self, attribute: RequiredAttributeDescriptor) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_tag_structure(mut self, structure: TagStructure) -> Self {
        self.tag_structure = structure;
        self
    }

    #[inline]
    pub fn is_catch_all(&self) -> bool {
        self.tag_name == Self::CATCH_ALL
    }
}

bitflags! {
    /// Value expectations of a bound attribute or parameter.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct BoundAttributeFlags: u8 {
        const IS_ENUM = 1 << 0;
        const IS_STRING = 1 << 1;
        const IS_BOOLEAN = 1 << 2;
        const IS_INDEXER_STRING = 1 << 3;
        const IS_INDEXER_BOOLEAN = 1 << 4;
    }
}

fn value_flags(type_name: &str) -> BoundAttributeFlags {
    match type_name {
        "System.String" | "string" => BoundAttributeFlags::IS_STRING,
        "System.Boolean" | "bool" => BoundAttributeFlags::IS_BOOLEAN,
        _ => BoundAttributeFlags::empty(),
    }
}

/// A parameter suffix of a bound attribute, e.g. `:format` in `bind-value:format`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundAttributeParameterDescriptor {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub flags: BoundAttributeFlags,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default)]
    pub metadata: FxHashMap<String, String>,
}

impl BoundAttributeParameterDescriptor {
    /// Creates a parameter, inferring string/boolean flags from `type_name`.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            name: name.into(),
            flags: value_flags(&type_name),
            type_name,
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_string_property(&self) -> bool {
        self.flags.contains(BoundAttributeFlags::IS_STRING)
    }

    #[inline]
    pub fn is_boolean_property(&self) -> bool {
        self.flags.contains(BoundAttributeFlags::IS_BOOLEAN)
    }
}

/// A property of a tag helper exposed as a markup attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundAttributeDescriptor {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub property_name: Option<String>,
    /// Prefix of dictionary-style attributes, e.g. `asp-route-`.
    #[serde(default)]
    pub indexer_name_prefix: Option<String>,
    #[serde(default)]
    pub indexer_type_name: Option<String>,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default)]
    pub flags: BoundAttributeFlags,
    #[serde(default)]
    pub parameters: Vec<BoundAttributeParameterDescriptor>,
    #[serde(default)]
    pub metadata: FxHashMap<String, String>,
}

impl BoundAttributeDescriptor {
    /// Creates an attribute, inferring string/boolean flags from `type_name`.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let name = name.into();
        let type_name = type_name.into();
        Self {
            property_name: Some(name.clone()),
            flags: value_flags(&type_name),
            name,
            type_name,
            ..Default::default()
        }
    }

    pub fn with_property_name(mut self, property_name: impl Into<String>) -> Self {
        self.property_name = Some(property_name.into());
        self
    }

    /// Adds a dictionary-style indexer matched by `prefix`.
    pub fn with_indexer(mut self, prefix: impl Into<String>, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let value = value_flags(&type_name);
        if value.contains(BoundAttributeFlags::IS_STRING) {
            self.flags |= BoundAttributeFlags::IS_INDEXER_STRING;
        }
        if value.contains(BoundAttributeFlags::IS_BOOLEAN) {
            self.flags |= BoundAttributeFlags::IS_INDEXER_BOOLEAN;
        }
        self.indexer_name_prefix = Some(prefix.into());
        self.indexer_type_name = Some(type_name);
        self
    }

    pub fn with_parameter(mut self, parameter: BoundAttributeParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_flags(mut self, flags: BoundAttributeFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[inline]
    pub fn has_indexer(&self) -> bool {
        self.indexer_name_prefix.is_some()
    }

    #[inline]
    pub fn is_string_property(&self) -> bool {
        self.flags.contains(BoundAttributeFlags::IS_STRING)
    }

    #[inline]
    pub fn is_boolean_property(&self) -> bool {
        self.flags.contains(BoundAttributeFlags::IS_BOOLEAN)
    }

    #[inline]
    pub fn is_indexer_string_property(&self) -> bool {
        self.flags.contains(BoundAttributeFlags::IS_INDEXER_STRING)
    }

    #[inline]
    pub fn is_indexer_boolean_property(&self) -> bool {
        self.flags.contains(BoundAttributeFlags::IS_INDEXER_BOOLEAN)
    }

    #[inline]
    pub fn is_enum(&self) -> bool {
        self.flags.contains(BoundAttributeFlags::IS_ENUM)
    }

    pub fn is_delegate_property(&self) -> bool {
        self.metadata_flag(metadata::DELEGATE_SIGNATURE)
    }

    pub fn is_event_callback_property(&self) -> bool {
        self.metadata_flag(metadata::EVENT_CALLBACK)
    }

    pub fn is_directive_attribute(&self) -> bool {
        self.metadata_flag(metadata::DIRECTIVE_ATTRIBUTE)
    }

    fn metadata_flag(&self, key: &str) -> bool {
        self.metadata
            .get(key)
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }
}

/// A tag helper: which tags it targets and which attributes it binds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagHelperDescriptor {
    pub kind: TagHelperKind,
    pub name: String,
    pub assembly_name: String,
    /// Component tag helpers compare names ordinally; classic ones ignore case.
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub tag_matching_rules: Vec<TagMatchingRule>,
    #[serde(default)]
    pub bound_attributes: Vec<BoundAttributeDescriptor>,
    #[serde(default)]
    pub allowed_child_tags: Vec<String>,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default)]
    pub metadata: FxHashMap<String, String>,
    #[serde(default)]
    pub diagnostics: Vec<CompilerError>,
}

impl TagHelperDescriptor {
    pub fn new(kind: TagHelperKind, name: impl Into<String>, assembly_name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            assembly_name: assembly_name.into(),
            case_sensitive: kind.is_component_document_kind(),
            ..Default::default()
        }
    }

    pub fn with_rule(mut self, rule: TagMatchingRule) -> Self {
        self.tag_matching_rules.push(rule);
        self
    }

    pub fn with_bound_attribute(mut self, attribute: BoundAttributeDescriptor) -> Self {
        self.bound_attributes.push(attribute);
        self
    }

    pub fn with_allowed_child(mut self, tag_name: impl Into<String>) -> Self {
        self.allowed_child_tags.push(tag_name.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_type_name(self, type_name: impl Into<String>) -> Self {
        self.with_metadata(metadata::TYPE_NAME, type_name)
    }

    /// Fully qualified type name, falling back to the descriptor name.
    pub fn type_name(&self) -> &str {
        self.metadata
            .get(metadata::TYPE_NAME)
            .map(String::as_str)
            .unwrap_or(&self.name)
    }

    /// Namespace of the backing type. Empty for top-level types.
    ///
    /// Child content descriptors report their owning component's namespace.
    pub fn type_namespace(&self) -> &str {
        let (namespace, _) = split_namespace_and_type(self.type_name());
        if self.kind == TagHelperKind::ChildContent {
            return split_namespace_and_type(namespace).0;
        }
        namespace
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn is_fully_qualified_name_match(&self) -> bool {
        self.metadata(metadata::NAME_MATCH) == Some(metadata::FULLY_QUALIFIED_NAME_MATCH)
    }

    #[inline]
    pub fn is_component(&self) -> bool {
        self.kind == TagHelperKind::Component
    }

    #[inline]
    pub fn is_bind(&self) -> bool {
        self.kind == TagHelperKind::Bind
    }

    /// A bind tag helper that yields to more specific bind tag helpers.
    pub fn is_fallback_bind(&self) -> bool {
        self.is_bind()
            && self
                .metadata(metadata::BIND_FALLBACK)
                .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }

    /// A bind tag helper with a single rule targeting `<input>`.
    pub fn is_input_element_bind(&self) -> bool {
        self.input_element_rule().is_some()
    }

    /// The generic `<input>` bind tag helper that does not require a `type`.
    pub fn is_input_element_fallback_bind(&self) -> bool {
        self.input_element_rule().is_some_and(|rule| {
            !rule
                .attributes
                .iter()
                .any(|attribute| attribute.name.eq_ignore_ascii_case("type"))
        })
    }

    fn input_element_rule(&self) -> Option<&TagMatchingRule> {
        match self.tag_matching_rules.as_slice() {
            [rule] if self.is_bind() && rule.tag_name.eq_ignore_ascii_case("input") => Some(rule),
            _ => None,
        }
    }

    pub fn bind_value_attribute(&self) -> Option<&str> {
        self.metadata(metadata::BIND_VALUE_ATTRIBUTE)
    }

    pub fn bind_change_attribute(&self) -> Option<&str> {
        self.metadata(metadata::BIND_CHANGE_ATTRIBUTE)
    }

    pub fn bind_expression_attribute(&self) -> Option<&str> {
        self.metadata(metadata::BIND_EXPRESSION_ATTRIBUTE)
    }

    /// Bound attribute declared with exactly `name`, honoring case sensitivity.
    pub fn bound_attribute(&self, name: &str) -> Option<&BoundAttributeDescriptor> {
        self.bound_attributes
            .iter()
            .find(|attribute| str_eq(&attribute.name, name, self.case_sensitive))
    }
}

/// The full set of descriptors known to a compilation session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagHelperCatalog {
    descriptors: Vec<TagHelperDescriptor>,
}

/// Failure to load a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid tag helper catalog: {0}")]
    Json(#[from] serde_json::Error),
}

impl TagHelperCatalog {
    pub fn new(descriptors: Vec<TagHelperDescriptor>) -> Self {
        Self { descriptors }
    }

    /// Load a catalog serialized as a JSON array of descriptors.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<std::string::String, CatalogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[inline]
    pub fn descriptors(&self) -> &[TagHelperDescriptor] {
        &self.descriptors
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagHelperDescriptor> {
        self.descriptors.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl FromIterator<TagHelperDescriptor> for TagHelperCatalog {
    fn from_iter<T: IntoIterator<Item = TagHelperDescriptor>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_inferred_from_type() {
        let value = BoundAttributeDescriptor::new("Value", "System.String");
        assert!(value.is_string_property());
        let checked = BoundAttributeDescriptor::new("Checked", "System.Boolean");
        assert!(checked.is_boolean_property());
        let routes = BoundAttributeDescriptor::new("RouteValues", "Dictionary<string, string>")
            .with_indexer("asp-route-", "System.String");
        assert!(!routes.is_string_property());
        assert!(routes.is_indexer_string_property());
    }

    #[test]
    fn test_type_namespace() {
        let component = TagHelperDescriptor::new(TagHelperKind::Component, "Counter", "App")
            .with_type_name("App.Shared.Counter");
        assert_eq!(component.type_namespace(), "App.Shared");

        let child_content =
            TagHelperDescriptor::new(TagHelperKind::ChildContent, "Counter.ChildContent", "App")
                .with_type_name("App.Shared.Counter.ChildContent");
        assert_eq!(child_content.type_namespace(), "App.Shared");

        let top_level = TagHelperDescriptor::new(TagHelperKind::Component, "Root", "App")
            .with_type_name("Root");
        assert_eq!(top_level.type_namespace(), "");
    }

    #[test]
    fn test_input_bind_classification() {
        let fallback = TagHelperDescriptor::new(TagHelperKind::Bind, "Bind_input", "Web")
            .with_rule(TagMatchingRule::new("input").with_attribute(RequiredAttributeDescriptor::new("bind")));
        assert!(fallback.is_input_element_bind());
        assert!(fallback.is_input_element_fallback_bind());

        let checkbox = TagHelperDescriptor::new(TagHelperKind::Bind, "Bind_input_checkbox", "Web")
            .with_rule(
                TagMatchingRule::new("input")
                    .with_attribute(RequiredAttributeDescriptor::new("type").with_value(
                        "checkbox",
                        ValueComparison::FullMatch,
                    ))
                    .with_attribute(RequiredAttributeDescriptor::new("bind")),
            );
        assert!(checkbox.is_input_element_bind());
        assert!(!checkbox.is_input_element_fallback_bind());

        let no_rules = TagHelperDescriptor::new(TagHelperKind::Bind, "Bind_empty", "Web");
        assert!(!no_rules.is_input_element_bind());
        assert!(!no_rules.is_input_element_fallback_bind());

        let two_rules = TagHelperDescriptor::new(TagHelperKind::Bind, "Bind_input_select", "Web")
            .with_rule(TagMatchingRule::new("input"))
            .with_rule(TagMatchingRule::new("select"));
        assert!(!two_rules.is_input_element_bind());

        let not_bind = TagHelperDescriptor::new(TagHelperKind::Default, "InputTagHelper", "Mvc")
            .with_rule(TagMatchingRule::new("input"));
        assert!(!not_bind.is_input_element_fallback_bind());
    }

    #[test]
    fn test_catalog_json() {
        let json = r#"[
            {
                "kind": "Components.Bind",
                "name": "Bind",
                "assemblyName": "Web",
                "caseSensitive": true,
                "tagMatchingRules": [{ "tagName": "*" }],
                "boundAttributes": [
                    { "name": "bind-", "typeName": "System.Object", "indexerNamePrefix": "bind-" }
                ],
                "metadata": { "Components.Bind.Fallback": "True" }
            }
        ]"#;
        let catalog = TagHelperCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 1);
        let descriptor = &catalog.descriptors()[0];
        assert!(descriptor.is_fallback_bind());
        assert!(descriptor.tag_matching_rules[0].is_catch_all());
        assert!(descriptor.bound_attributes[0].has_indexer());

        assert!(TagHelperCatalog::from_json("{").is_err());
    }
}
