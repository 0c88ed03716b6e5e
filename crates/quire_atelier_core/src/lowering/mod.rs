//! Intermediate tree lowering.
//!
//! - [`duplicates`]: fallback suppression and conflict reporting per element
//! - [`bind`]: value/change/expression expansion of bind attributes
//! - [`runtime`]: call targets referenced by the expansions

pub mod bind;
pub mod duplicates;
pub mod runtime;

pub use bind::{
    attribute_content, change_expression, expression_lambda, lower_bind,
    parse_bind_attribute_name, value_expression, BindAttributeName, BindEntry,
};
pub use duplicates::resolve_duplicates;
pub use runtime::BindRuntimeHelper;
