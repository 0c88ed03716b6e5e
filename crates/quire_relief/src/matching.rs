//! Tag helper matching conventions.
//!
//! Pure predicates over borrowed descriptors. Nothing here mutates a
//! descriptor, so the catalog can be shared across concurrent document runs.

use quire_carton::{str_ends_with, str_eq, str_starts_with, SmallVec};

use crate::tag_helper::{
    BoundAttributeDescriptor, BoundAttributeParameterDescriptor, NameComparison,
    RequiredAttributeDescriptor, TagHelperDescriptor, TagMatchingRule, ValueComparison,
};

/// Separator between a bound attribute name and its parameter.
pub const PARAMETER_SEPARATOR: char = ':';

/// Split `bind-value:format` into `("bind-value", "format")`.
#[inline]
pub fn split_parameter(name: &str) -> Option<(&str, &str)> {
    name.split_once(PARAMETER_SEPARATOR)
}

/// Name without its `:parameter` suffix.
#[inline]
pub fn strip_parameter(name: &str) -> &str {
    split_parameter(name).map_or(name, |(base, _)| base)
}

pub fn satisfies_bound_attribute_name(
    name: &str,
    attribute: &BoundAttributeDescriptor,
    case_sensitive: bool,
) -> bool {
    str_eq(name, &attribute.name, case_sensitive)
}

/// `name` starts with the attribute's indexer prefix and is not an exact name match.
///
/// A name equal to the prefix still satisfies the indexer; it is the
/// missing-key case reported by the rewriter. Indexers of attributes that
/// declare parameters never absorb a `:parameter` suffix.
pub fn satisfies_bound_attribute_indexer(
    name: &str,
    attribute: &BoundAttributeDescriptor,
    case_sensitive: bool,
) -> bool {
    let Some(prefix) = attribute.indexer_name_prefix.as_deref() else {
        return false;
    };
    if !attribute.parameters.is_empty() && name.contains(PARAMETER_SEPARATOR) {
        return false;
    }
    !satisfies_bound_attribute_name(name, attribute, case_sensitive)
        && str_starts_with(name, prefix, case_sensitive)
}

/// The parameter named by a `base:parameter` attribute name, if `attribute` declares it.
pub fn satisfies_bound_attribute_with_parameter<'a>(
    name: &str,
    attribute: &'a BoundAttributeDescriptor,
    case_sensitive: bool,
) -> Option<&'a BoundAttributeParameterDescriptor> {
    let (base, parameter) = split_parameter(name)?;
    if !satisfies_bound_attribute_name(base, attribute, case_sensitive)
        && !satisfies_bound_attribute_indexer(base, attribute, case_sensitive)
    {
        return None;
    }
    attribute
        .parameters
        .iter()
        .find(|candidate| str_eq(&candidate.name, parameter, case_sensitive))
}

pub fn can_satisfy_bound_attribute(
    name: &str,
    attribute: &BoundAttributeDescriptor,
    case_sensitive: bool,
) -> bool {
    satisfies_bound_attribute_name(name, attribute, case_sensitive)
        || satisfies_bound_attribute_indexer(name, attribute, case_sensitive)
        || satisfies_bound_attribute_with_parameter(name, attribute, case_sensitive).is_some()
}

/// How an attribute name resolved against one bound attribute.
#[derive(Debug, Clone, Copy)]
pub struct BoundAttributeMatch<'a> {
    pub attribute: &'a BoundAttributeDescriptor,
    pub parameter: Option<&'a BoundAttributeParameterDescriptor>,
    pub is_indexer_match: bool,
}

impl<'a> BoundAttributeMatch<'a> {
    #[inline]
    pub fn is_parameter_match(&self) -> bool {
        self.parameter.is_some()
    }

    pub fn expects_string_value(&self) -> bool {
        if let Some(parameter) = self.parameter {
            return parameter.is_string_property();
        }
        if self.is_indexer_match {
            self.attribute.is_indexer_string_property()
        } else {
            self.attribute.is_string_property()
        }
    }

    pub fn expects_boolean_value(&self) -> bool {
        if let Some(parameter) = self.parameter {
            return parameter.is_boolean_property();
        }
        if self.is_indexer_match {
            self.attribute.is_indexer_boolean_property()
        } else {
            self.attribute.is_boolean_property()
        }
    }

    /// Declared type of the value this attribute receives.
    pub fn type_name(&self) -> &'a str {
        if let Some(parameter) = self.parameter {
            return &parameter.type_name;
        }
        if self.is_indexer_match {
            if let Some(indexer_type) = self.attribute.indexer_type_name.as_deref() {
                return indexer_type;
            }
        }
        &self.attribute.type_name
    }
}

/// First bound attribute of `descriptor` that `name` resolves to.
pub fn find_bound_attribute<'a>(
    name: &str,
    descriptor: &'a TagHelperDescriptor,
) -> Option<BoundAttributeMatch<'a>> {
    let case_sensitive = descriptor.case_sensitive;
    descriptor.bound_attributes.iter().find_map(|attribute| {
        if satisfies_bound_attribute_name(name, attribute, case_sensitive) {
            return Some(BoundAttributeMatch {
                attribute,
                parameter: None,
                is_indexer_match: false,
            });
        }
        if satisfies_bound_attribute_indexer(name, attribute, case_sensitive) {
            return Some(BoundAttributeMatch {
                attribute,
                parameter: None,
                is_indexer_match: true,
            });
        }
        satisfies_bound_attribute_with_parameter(name, attribute, case_sensitive).map(
            |parameter| BoundAttributeMatch {
                attribute,
                parameter: Some(parameter),
                is_indexer_match: satisfies_bound_attribute_indexer(
                    strip_parameter(name),
                    attribute,
                    case_sensitive,
                ),
            },
        )
    })
}

pub fn satisfies_required_attribute(
    name: &str,
    value: &str,
    required: &RequiredAttributeDescriptor,
    case_sensitive: bool,
) -> bool {
    let name_matches = match required.name_comparison {
        NameComparison::FullMatch => str_eq(name, &required.name, case_sensitive),
        NameComparison::PrefixMatch => {
            name.len() > required.name.len() && str_starts_with(name, &required.name, case_sensitive)
        }
    };
    if !name_matches {
        return false;
    }
    let Some(expected) = required.value.as_deref() else {
        return true;
    };
    match required.value_comparison {
        ValueComparison::None => true,
        ValueComparison::FullMatch => value == expected,
        ValueComparison::PrefixMatch => str_starts_with(value, expected, true),
        ValueComparison::SuffixMatch => str_ends_with(value, expected, true),
    }
}

/// Whether a start tag satisfies `rule`.
///
/// `tag_name` has any tag helper prefix already removed.
pub fn satisfies_rule(
    tag_name: &str,
    parent_tag_name: Option<&str>,
    attributes: &[(&str, &str)],
    rule: &TagMatchingRule,
    case_sensitive: bool,
) -> bool {
    if !rule.is_catch_all() && !str_eq(tag_name, &rule.tag_name, case_sensitive) {
        return false;
    }
    if let Some(required_parent) = rule.parent_tag.as_deref() {
        match parent_tag_name {
            Some(parent) if str_eq(parent, required_parent, case_sensitive) => {}
            _ => return false,
        }
    }
    rule.attributes.iter().all(|required| {
        attributes
            .iter()
            .any(|(name, value)| satisfies_required_attribute(name, value, required, case_sensitive))
    })
}

/// Rules of `descriptor` satisfied by a start tag.
pub fn matching_rules<'a>(
    tag_name: &str,
    parent_tag_name: Option<&str>,
    attributes: &[(&str, &str)],
    descriptor: &'a TagHelperDescriptor,
) -> SmallVec<[&'a TagMatchingRule; 2]> {
    descriptor
        .tag_matching_rules
        .iter()
        .filter(|rule| {
            satisfies_rule(
                tag_name,
                parent_tag_name,
                attributes,
                rule,
                descriptor.case_sensitive,
            )
        })
        .collect()
}

/// Classification of one attribute on a bound start tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttributeBindingKind {
    #[default]
    Unbound,
    BoundString,
    BoundNonString,
    BoundBoolean,
    MissingIndexerKey,
}

impl AttributeBindingKind {
    #[inline]
    pub fn is_bound(self) -> bool {
        !matches!(self, Self::Unbound)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unbound => "Unbound",
            Self::BoundString => "BoundString",
            Self::BoundNonString => "BoundNonString",
            Self::BoundBoolean => "BoundBoolean",
            Self::MissingIndexerKey => "MissingIndexerKey",
        }
    }
}

/// Result of matching an attribute name against every bound descriptor.
#[derive(Debug, Clone, Default)]
pub struct AttributeMatch<'a> {
    /// One entry per descriptor that binds the attribute.
    pub matches: SmallVec<[(&'a TagHelperDescriptor, BoundAttributeMatch<'a>); 2]>,
    pub is_bound_non_string: bool,
    pub is_bound_boolean: bool,
    pub is_missing_indexer_key: bool,
    pub is_directive_attribute: bool,
}

impl<'a> AttributeMatch<'a> {
    #[inline]
    pub fn is_bound(&self) -> bool {
        !self.matches.is_empty()
    }

    pub fn kind(&self) -> AttributeBindingKind {
        if !self.is_bound() {
            AttributeBindingKind::Unbound
        } else if self.is_missing_indexer_key {
            AttributeBindingKind::MissingIndexerKey
        } else if self.is_bound_boolean {
            AttributeBindingKind::BoundBoolean
        } else if self.is_bound_non_string {
            AttributeBindingKind::BoundNonString
        } else {
            AttributeBindingKind::BoundString
        }
    }

    /// Type name of the first match, used in diagnostics.
    pub fn type_name(&self) -> Option<&'a str> {
        self.matches.first().map(|(_, matched)| matched.type_name())
    }
}

/// Classify `name` against the descriptors bound to its start tag.
pub fn classify_attribute<'a>(
    name: &str,
    descriptors: impl IntoIterator<Item = &'a TagHelperDescriptor>,
) -> AttributeMatch<'a> {
    let mut result = AttributeMatch::default();
    for descriptor in descriptors {
        let Some(matched) = find_bound_attribute(name, descriptor) else {
            continue;
        };
        result.is_bound_non_string |= !matched.expects_string_value();
        result.is_bound_boolean |= matched.expects_boolean_value();
        result.is_directive_attribute |= matched.attribute.is_directive_attribute();
        if matched.is_indexer_match && !matched.is_parameter_match() {
            let prefix_len = matched
                .attribute
                .indexer_name_prefix
                .as_deref()
                .map_or(0, str::len);
            result.is_missing_indexer_key |= name.len() == prefix_len;
        }
        result.matches.push((descriptor, matched));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag_helper::{TagHelperKind, TagStructure};

    fn anchor() -> TagHelperDescriptor {
        TagHelperDescriptor::new(TagHelperKind::Default, "AnchorTagHelper", "Mvc")
            .with_rule(TagMatchingRule::new("a").with_attribute(RequiredAttributeDescriptor::prefix("asp-")))
            .with_bound_attribute(BoundAttributeDescriptor::new("asp-action", "System.String"))
            .with_bound_attribute(
                BoundAttributeDescriptor::new("asp-all-route-data", "IDictionary<string, string>")
                    .with_indexer("asp-route-", "System.String"),
            )
            .with_bound_attribute(BoundAttributeDescriptor::new("asp-fragment-count", "System.Int32"))
    }

    #[test]
    fn test_rule_tag_name_and_attributes() {
        let descriptor = anchor();
        let rule = &descriptor.tag_matching_rules[0];
        assert!(satisfies_rule("A", None, &[("asp-action", "Index")], rule, false));
        assert!(!satisfies_rule("a", None, &[("href", "/")], rule, false));
        // Prefix comparison requires a longer name.
        assert!(!satisfies_rule("a", None, &[("asp-", "")], rule, false));
    }

    #[test]
    fn test_rule_parent_and_value() {
        let rule = TagMatchingRule::new("input")
            .with_parent("form")
            .with_attribute(RequiredAttributeDescriptor::new("type").with_value("check", ValueComparison::PrefixMatch))
            .with_tag_structure(TagStructure::WithoutEndTag);
        assert!(satisfies_rule("input", Some("form"), &[("type", "checkbox")], &rule, false));
        assert!(!satisfies_rule("input", None, &[("type", "checkbox")], &rule, false));
        assert!(!satisfies_rule("input", Some("form"), &[("type", "Checkbox")], &rule, false));
    }

    #[test]
    fn test_catch_all_rule() {
        let rule = TagMatchingRule::new("*");
        assert!(satisfies_rule("anything", None, &[], &rule, true));
    }

    #[test]
    fn test_indexer_and_missing_key() {
        let descriptor = anchor();
        let matched = find_bound_attribute("asp-route-id", &descriptor).unwrap();
        assert!(matched.is_indexer_match);
        assert!(matched.expects_string_value());

        let result = classify_attribute("asp-route-", [&descriptor]);
        assert_eq!(result.kind(), AttributeBindingKind::MissingIndexerKey);
    }

    #[test]
    fn test_classification_kinds() {
        let descriptor = anchor()
            .with_bound_attribute(BoundAttributeDescriptor::new("asp-hidden", "System.Boolean"));
        assert_eq!(
            classify_attribute("ASP-ACTION", [&descriptor]).kind(),
            AttributeBindingKind::BoundString
        );
        assert_eq!(
            classify_attribute("asp-fragment-count", [&descriptor]).kind(),
            AttributeBindingKind::BoundNonString
        );
        assert_eq!(
            classify_attribute("asp-hidden", [&descriptor]).kind(),
            AttributeBindingKind::BoundBoolean
        );
        assert_eq!(
            classify_attribute("href", [&descriptor]).kind(),
            AttributeBindingKind::Unbound
        );
    }

    #[test]
    fn test_parameter_match() {
        let bind = TagHelperDescriptor::new(TagHelperKind::Bind, "Bind", "Web")
            .with_bound_attribute(
                BoundAttributeDescriptor::new("bind-", "System.Collections.Generic.Dictionary<string, object>")
                    .with_indexer("bind-", "System.Object")
                    .with_parameter(BoundAttributeParameterDescriptor::new("format", "System.String"))
                    .with_parameter(BoundAttributeParameterDescriptor::new("event", "System.String")),
            );
        let matched = find_bound_attribute("bind-value:format", &bind).unwrap();
        assert!(matched.is_parameter_match());
        assert!(matched.is_indexer_match);
        assert_eq!(matched.parameter.unwrap().name, "format");
        assert!(matched.expects_string_value());

        assert!(find_bound_attribute("bind-value:culture", &bind).is_none());
        // Case sensitive component descriptors.
        assert!(find_bound_attribute("bind-value:Format", &bind).is_none());
    }
}
