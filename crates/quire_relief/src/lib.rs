//! Relief - The data model of Quire.
//!
//! Tag helper descriptors and their matching conventions, the arena-allocated
//! syntax tree, the id-addressed intermediate tree, diagnostics and options.
//! Everything the pipeline in `quire_atelier_core` reads and produces.

pub mod binding;
pub mod errors;
pub mod factory;
pub mod intermediate;
pub mod matching;
pub mod options;
pub mod span;
pub mod syntax;
pub mod tag_helper;

pub use binding::*;
pub use errors::*;
pub use factory::SyntaxFactory;
pub use intermediate::*;
pub use matching::{AttributeBindingKind, AttributeMatch, BoundAttributeMatch};
pub use options::*;
pub use span::Span;
pub use syntax::*;
pub use tag_helper::*;
