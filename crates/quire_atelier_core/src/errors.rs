//! Errors at the pipeline's API boundary.
//!
//! Problems in document content never surface here; they become
//! [`CompilerError`](quire_relief::CompilerError) diagnostics.

/// A pass was driven without an input it requires.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("pass '{pass}' requires tag helper selection to have run")]
    MissingSelection { pass: &'static str },

    #[error("pass '{pass}' requires an intermediate tree for component document '{file_path}'")]
    MissingIntermediateTree {
        pass: &'static str,
        file_path: String,
    },
}
