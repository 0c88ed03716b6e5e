//! Compiler options.

use serde::{Deserialize, Serialize};

/// How a document is classified by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    /// Classic template using `@addTagHelper` directives.
    #[default]
    Legacy,
    /// Component document with namespace based scoping.
    Component,
    /// `_Imports` file of a component document.
    ComponentImport,
}

impl DocumentKind {
    #[inline]
    pub fn is_component(self) -> bool {
        matches!(self, Self::Component | Self::ComponentImport)
    }
}

/// Pipeline options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Allow `<input checked>` for boolean bound attributes
    pub allow_minimized_boolean_tag_helper_attributes: bool,
    /// Report children a tag helper does not allow
    pub validate_allowed_children: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            allow_minimized_boolean_tag_helper_attributes: true,
            validate_allowed_children: true,
        }
    }
}
