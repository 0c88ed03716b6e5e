//! Atelier Core - The tag helper pipeline of Quire.
//!
//! This crate turns a parsed document plus a tag helper catalog into:
//! - the set of tag helpers in scope (directive scanning)
//! - a syntax tree whose bound elements are tag helper elements
//! - an intermediate tree whose bind attributes are expanded
//!
//! Each step is a [`DocumentPass`] driven by the [`Engine`].

pub mod binder;
pub mod document;
pub mod errors;
pub mod lowering;
pub mod pass;
pub mod rewrite;
pub mod scanner;

pub use binder::TagHelperBinder;
pub use document::CodeDocument;
pub use errors::PipelineError;
pub use pass::{BindLoweringPass, DirectiveScanPass, DocumentPass, Engine, TagHelperRewritePass};
pub use scanner::{select_tag_helpers, TagHelperSelection};

// Re-export the data model
pub use quire_relief::{
    CompilerError, CompilerOptions, DocumentKind, ErrorCode, IntermediateTree, SyntaxNode,
    TagHelperCatalog, TagHelperDescriptor,
};

/// Run the default passes over `document` with default options.
pub fn process_document(document: &mut CodeDocument<'_>) -> Result<(), PipelineError> {
    Engine::default().process(document)
}
