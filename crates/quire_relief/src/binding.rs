//! Result of binding one start tag to tag helpers.

use quire_carton::{SmallVec, String};
use serde::{Deserialize, Serialize};

use crate::tag_helper::{TagHelperDescriptor, TagMatchingRule, TagStructure};

/// How a tag helper element is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TagMode {
    #[default]
    StartTagAndEndTag,
    /// Void element: no end tag.
    StartTagOnly,
    SelfClosing,
}

impl TagMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StartTagAndEndTag => "StartTagAndEndTag",
            Self::StartTagOnly => "StartTagOnly",
            Self::SelfClosing => "SelfClosing",
        }
    }
}

/// A descriptor together with the rules a tag satisfied.
#[derive(Debug, Clone)]
pub struct BoundTagHelper<'a> {
    pub descriptor: &'a TagHelperDescriptor,
    pub rules: SmallVec<[&'a TagMatchingRule; 2]>,
}

/// Descriptors matched by one start tag. Built once per tag, never mutated.
#[derive(Debug, Clone)]
pub struct TagHelperBinding<'a> {
    /// Tag name as written, including any prefix.
    pub tag_name: String,
    pub parent_tag_name: Option<String>,
    pub tag_helper_prefix: Option<String>,
    pub matches: Vec<BoundTagHelper<'a>>,
}

impl<'a> TagHelperBinding<'a> {
    pub fn descriptors(&self) -> impl Iterator<Item = &'a TagHelperDescriptor> + '_ {
        self.matches.iter().map(|bound| bound.descriptor)
    }

    /// Tag name with the tag helper prefix removed.
    pub fn tag_name_without_prefix(&self) -> &str {
        match self.tag_helper_prefix.as_deref() {
            Some(prefix) => self.tag_name.get(prefix.len()..).unwrap_or(""),
            None => &self.tag_name,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// `/>` always wins over descriptor hints.
    pub fn tag_mode(&self, is_self_closing: bool) -> TagMode {
        if is_self_closing {
            return TagMode::SelfClosing;
        }
        let without_end_tag = self
            .matches
            .iter()
            .flat_map(|bound| bound.rules.iter())
            .any(|rule| rule.tag_structure == TagStructure::WithoutEndTag);
        if without_end_tag {
            TagMode::StartTagOnly
        } else {
            TagMode::StartTagAndEndTag
        }
    }

    /// Union of allowed child tags, `None` when no descriptor restricts children.
    pub fn allowed_child_tags(&self) -> Option<Vec<&'a str>> {
        let mut allowed: Vec<&'a str> = Vec::new();
        let mut restricted = false;
        for descriptor in self.descriptors() {
            if descriptor.allowed_child_tags.is_empty() {
                continue;
            }
            restricted = true;
            for tag in &descriptor.allowed_child_tags {
                if !allowed.iter().any(|seen| seen.eq_ignore_ascii_case(tag)) {
                    allowed.push(tag.as_str());
                }
            }
        }
        restricted.then_some(allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag_helper::TagHelperKind;
    use quire_carton::smallvec;

    #[test]
    fn test_tag_mode() {
        let void = TagHelperDescriptor::new(TagHelperKind::Default, "InputTagHelper", "Mvc")
            .with_rule(TagMatchingRule::new("input").with_tag_structure(TagStructure::WithoutEndTag));
        let binding = TagHelperBinding {
            tag_name: "input".into(),
            parent_tag_name: None,
            tag_helper_prefix: None,
            matches: vec![BoundTagHelper {
                descriptor: &void,
                rules: smallvec![&void.tag_matching_rules[0]],
            }],
        };
        assert_eq!(binding.tag_mode(false), TagMode::StartTagOnly);
        assert_eq!(binding.tag_mode(true), TagMode::SelfClosing);
    }

    #[test]
    fn test_prefix_and_children() {
        let list = TagHelperDescriptor::new(TagHelperKind::Default, "ListTagHelper", "Mvc")
            .with_rule(TagMatchingRule::new("ul"))
            .with_allowed_child("li")
            .with_allowed_child("LI");
        let binding = TagHelperBinding {
            tag_name: "th:ul".into(),
            parent_tag_name: None,
            tag_helper_prefix: Some("th:".into()),
            matches: vec![BoundTagHelper {
                descriptor: &list,
                rules: smallvec![&list.tag_matching_rules[0]],
            }],
        };
        assert_eq!(binding.tag_name_without_prefix(), "ul");
        assert_eq!(binding.tag_mode(false), TagMode::StartTagAndEndTag);
        assert_eq!(binding.allowed_child_tags(), Some(vec!["li"]));
    }
}
