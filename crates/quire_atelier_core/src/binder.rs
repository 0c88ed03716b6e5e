//! Binding start tags to the tag helpers selected for a document.

use quire_carton::{str_starts_with, FxHashMap, String};
use quire_relief::{
    matching::matching_rules, BoundTagHelper, TagHelperBinding, TagHelperDescriptor,
};

/// Index of selected descriptors by the tag names their rules target.
#[derive(Debug, Default)]
pub struct TagHelperBinder<'a> {
    prefix: Option<String>,
    /// Keyed by ASCII-lowercased rule tag name.
    by_tag: FxHashMap<String, Vec<&'a TagHelperDescriptor>>,
    catch_all: Vec<&'a TagHelperDescriptor>,
}

fn lowercase(name: &str) -> String {
    name.chars().map(|c| c.to_ascii_lowercase()).collect()
}

fn push_unique<'a>(list: &mut Vec<&'a TagHelperDescriptor>, descriptor: &'a TagHelperDescriptor) {
    if !list.iter().any(|existing| std::ptr::eq(*existing, descriptor)) {
        list.push(descriptor);
    }
}

impl<'a> TagHelperBinder<'a> {
    pub fn new(prefix: Option<&str>, descriptors: &[&'a TagHelperDescriptor]) -> Self {
        let mut binder = Self {
            prefix: prefix.map(String::new),
            ..Default::default()
        };
        for &descriptor in descriptors {
            for rule in &descriptor.tag_matching_rules {
                if rule.is_catch_all() {
                    push_unique(&mut binder.catch_all, descriptor);
                } else {
                    push_unique(binder.by_tag.entry(lowercase(&rule.tag_name)).or_default(), descriptor);
                }
            }
        }
        binder
    }

    #[inline]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Tag name with the prefix removed, `None` if the tag cannot bind.
    pub fn strip_prefix<'t>(&self, tag_name: &'t str) -> Option<&'t str> {
        match self.prefix.as_deref() {
            None => Some(tag_name),
            Some(prefix) => {
                if tag_name.len() <= prefix.len() || !str_starts_with(tag_name, prefix, false) {
                    None
                } else {
                    Some(&tag_name[prefix.len()..])
                }
            }
        }
    }

    /// Descriptors bound to a start tag, `None` when nothing matches.
    ///
    /// `parent_tag_name` has its prefix removed when the parent is itself a
    /// tag helper.
    pub fn get_binding(
        &self,
        tag_name: &str,
        attributes: &[(&str, &str)],
        parent_tag_name: Option<&str>,
        parent_is_tag_helper: bool,
    ) -> Option<TagHelperBinding<'a>> {
        let name = self.strip_prefix(tag_name)?;
        let parent = match parent_tag_name {
            Some(parent) if parent_is_tag_helper => self.strip_prefix(parent).or(Some(parent)),
            other => other,
        };

        let mut candidates: Vec<&'a TagHelperDescriptor> = Vec::new();
        if let Some(descriptors) = self.by_tag.get(&lowercase(name)) {
            candidates.extend(descriptors.iter().copied());
        }
        for &descriptor in &self.catch_all {
            push_unique(&mut candidates, descriptor);
        }

        let matches: Vec<BoundTagHelper<'a>> = candidates
            .into_iter()
            .filter_map(|descriptor| {
                let rules = matching_rules(name, parent, attributes, descriptor);
                (!rules.is_empty()).then_some(BoundTagHelper { descriptor, rules })
            })
            .collect();
        if matches.is_empty() {
            return None;
        }

        tracing::trace!(tag = tag_name, matched = matches.len(), "bound start tag");
        Some(TagHelperBinding {
            tag_name: String::new(tag_name),
            parent_tag_name: parent.map(String::new),
            tag_helper_prefix: self.prefix.clone(),
            matches,
        })
    }
}
