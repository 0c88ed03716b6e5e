//! Compiler diagnostics.
//!
//! Every problem found in document content is recorded as a [`CompilerError`]
//! and processing continues. Diagnostics always have error severity.

use quire_carton::{format_compact, String};
use serde::{Deserialize, Serialize};

use crate::Span;

/// Diagnostic families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Tag helper selection from directives and imports.
    Selection,
    /// Shape of start tags, attribute lists and tag helper elements.
    Structural,
    /// Tag helper attribute usages and bind attributes.
    Binding,
    /// Attribute and expression content.
    Content,
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum ErrorCode {
    // Selection
    InvalidTagHelperLookupText = 1000,
    UnresolvedTagHelperAssembly,
    UnsupportedTagHelperDirective,

    // Structural
    MalformedAttributeList = 2000,
    CodeInTagDeclaration,
    IndexerAttributeMissingKey,
    TagHelperMustNotHaveEndTag,
    MalformedTagHelper,
    InvalidNestedTag,
    CannotHaveNonTagContent,

    // Binding
    DuplicateBindAttribute = 3000,
    BindParameterMissingBind,
    BindAttributeUnsupportedFormat,
    BindAttributeInvalidSyntax,

    // Content
    EmptyBoundAttribute = 4000,
    EmptyBindExpression,
}

impl ErrorCode {
    /// Stable identifier, e.g. `QR3001`.
    pub fn id(self) -> String {
        format_compact!("QR{:04}", self as u16)
    }

    pub fn category(self) -> ErrorCategory {
        match self as u16 {
            1000..=1999 => ErrorCategory::Selection,
            2000..=2999 => ErrorCategory::Structural,
            3000..=3999 => ErrorCategory::Binding,
            _ => ErrorCategory::Content,
        }
    }
}

/// A diagnostic attached to a syntax span or an intermediate node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{}: {}", .code.id(), .message)]
pub struct CompilerError {
    pub code: ErrorCode,
    pub span: Span,
    pub message: String,
}

impl CompilerError {
    pub fn new(code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        Self {
            code,
            span,
            message: message.into(),
        }
    }

    pub fn invalid_lookup_text(span: Span, text: &str) -> Self {
        Self::new(
            ErrorCode::InvalidTagHelperLookupText,
            span,
            format_compact!(
                "Invalid tag helper directive look up text '{text}'. The correct look up text format is: \"name, assemblyName\"."
            ),
        )
    }

    pub fn unresolved_assembly(span: Span, assembly_name: &str) -> Self {
        Self::new(
            ErrorCode::UnresolvedTagHelperAssembly,
            span,
            format_compact!("No tag helpers are registered for assembly '{assembly_name}'."),
        )
    }

    pub fn unsupported_directive(span: Span, keyword: &str) -> Self {
        Self::new(
            ErrorCode::UnsupportedTagHelperDirective,
            span,
            format_compact!(
                "The '@{keyword}' directive is not valid in a component document. Use '@using <namespace>' instead."
            ),
        )
    }

    pub fn malformed_attribute_list(span: Span) -> Self {
        Self::new(
            ErrorCode::MalformedAttributeList,
            span,
            "Tag helper attributes must be well-formed.",
        )
    }

    pub fn code_in_tag_declaration(span: Span, tag_name: &str) -> Self {
        Self::new(
            ErrorCode::CodeInTagDeclaration,
            span,
            format_compact!(
                "The tag helper '{tag_name}' must not have code in the element's attribute declaration area."
            ),
        )
    }

    pub fn indexer_missing_key(span: Span, attribute_name: &str, tag_name: &str) -> Self {
        Self::new(
            ErrorCode::IndexerAttributeMissingKey,
            span,
            format_compact!(
                "The tag helper attribute '{attribute_name}' in element '{tag_name}' is missing a key. The syntax is '<{tag_name} {attribute_name}{{ key }}=\"value\">'."
            ),
        )
    }

    pub fn must_not_have_end_tag(span: Span, tag_name: &str) -> Self {
        Self::new(
            ErrorCode::TagHelperMustNotHaveEndTag,
            span,
            format_compact!(
                "Found an end tag (</{tag_name}>) for tag helper '{tag_name}' which must not have an end tag."
            ),
        )
    }

    pub fn malformed_tag_helper(span: Span, tag_name: &str) -> Self {
        Self::new(
            ErrorCode::MalformedTagHelper,
            span,
            format_compact!(
                "Found a malformed '{tag_name}' tag helper. Tag helpers must have a start and end tag or be self closing."
            ),
        )
    }

    pub fn invalid_nested_tag(span: Span, child: &str, parent: &str, allowed: &str) -> Self {
        Self::new(
            ErrorCode::InvalidNestedTag,
            span,
            format_compact!(
                "The <{child}> tag is not allowed by parent <{parent}> tag helper. Only child tags with name(s) '{allowed}' are allowed."
            ),
        )
    }

    pub fn cannot_have_non_tag_content(span: Span, parent: &str, allowed: &str) -> Self {
        Self::new(
            ErrorCode::CannotHaveNonTagContent,
            span,
            format_compact!(
                "The parent <{parent}> tag helper does not allow non-tag content. Only child tag helper(s) targeting tag name(s) '{allowed}' are allowed."
            ),
        )
    }

    pub fn duplicate_bind_attribute(span: Span, attribute_name: &str, tag_helpers: &str) -> Self {
        Self::new(
            ErrorCode::DuplicateBindAttribute,
            span,
            format_compact!(
                "The attribute '{attribute_name}' was matched by multiple bind attributes. Duplicates: {tag_helpers}"
            ),
        )
    }

    pub fn bind_parameter_missing_bind(span: Span, attribute_name: &str, base_name: &str) -> Self {
        Self::new(
            ErrorCode::BindParameterMissingBind,
            span,
            format_compact!(
                "The attribute '{attribute_name}' can only be used with a corresponding bind attribute '{base_name}'."
            ),
        )
    }

    pub fn bind_unsupported_format(span: Span, attribute_name: &str) -> Self {
        Self::new(
            ErrorCode::BindAttributeUnsupportedFormat,
            span,
            format_compact!(
                "The attribute '{attribute_name}' uses an unsupported format. Use 'bind-value' with a 'bind-value:format' attribute to specify the format."
            ),
        )
    }

    pub fn bind_invalid_syntax(span: Span, attribute_name: &str) -> Self {
        Self::new(
            ErrorCode::BindAttributeInvalidSyntax,
            span,
            format_compact!(
                "The attribute names could not be inferred from bind attribute '{attribute_name}'. Bind attributes should be of the form 'bind' or 'bind-value' along with their corresponding optional parameters like 'bind-value:event' and 'bind-value:format'."
            ),
        )
    }

    pub fn empty_bound_attribute(
        span: Span,
        attribute_name: &str,
        tag_name: &str,
        type_name: &str,
    ) -> Self {
        Self::new(
            ErrorCode::EmptyBoundAttribute,
            span,
            format_compact!(
                "Attribute '{attribute_name}' on tag helper element '{tag_name}' requires a value. Tag helper bound attributes of type '{type_name}' cannot be empty or contain only whitespace."
            ),
        )
    }

    pub fn empty_bind_expression(span: Span, attribute_name: &str) -> Self {
        Self::new(
            ErrorCode::EmptyBindExpression,
            span,
            format_compact!("The bind attribute '{attribute_name}' requires a non-empty expression."),
        )
    }
}
