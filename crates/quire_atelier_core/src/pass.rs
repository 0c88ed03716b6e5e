//! Ordered document passes.
//!
//! The engine runs passes in ascending [`DocumentPass::order`]. Hosts slot
//! their own passes between the defaults, typically the classification pass
//! that builds the intermediate tree after rewriting and before lowering.

use quire_relief::CompilerOptions;

use crate::{
    binder::TagHelperBinder, lowering::lower_bind, rewrite::rewrite_tag_helpers,
    scanner::select_tag_helpers, CodeDocument, PipelineError,
};

/// One step of document processing.
pub trait DocumentPass: Send + Sync {
    fn name(&self) -> &'static str;

    /// Position in the pipeline. Lower runs first.
    fn order(&self) -> u32;

    fn execute<'a>(
        &self,
        document: &mut CodeDocument<'a>,
        options: &CompilerOptions,
    ) -> Result<(), PipelineError>;
}

/// Selects the tag helpers in scope.
pub struct DirectiveScanPass;

impl DirectiveScanPass {
    pub const ORDER: u32 = 100;
}

impl DocumentPass for DirectiveScanPass {
    fn name(&self) -> &'static str {
        "directive-scan"
    }

    fn order(&self) -> u32 {
        Self::ORDER
    }

    fn execute<'a>(
        &self,
        document: &mut CodeDocument<'a>,
        _options: &CompilerOptions,
    ) -> Result<(), PipelineError> {
        let mut selection = select_tag_helpers(document);
        document.diagnostics.append(&mut selection.diagnostics);
        document.selection = Some(selection);
        Ok(())
    }
}

/// Rewrites bound elements of the syntax tree into tag helper elements.
pub struct TagHelperRewritePass;

impl TagHelperRewritePass {
    pub const ORDER: u32 = 200;
}

impl DocumentPass for TagHelperRewritePass {
    fn name(&self) -> &'static str {
        "tag-helper-rewrite"
    }

    fn order(&self) -> u32 {
        Self::ORDER
    }

    fn execute<'a>(
        &self,
        document: &mut CodeDocument<'a>,
        options: &CompilerOptions,
    ) -> Result<(), PipelineError> {
        let selection = document
            .selection
            .as_ref()
            .ok_or(PipelineError::MissingSelection { pass: self.name() })?;
        if selection.tag_helpers.is_empty() {
            return Ok(());
        }
        let binder = TagHelperBinder::new(selection.prefix.as_deref(), &selection.tag_helpers);
        let (tree, mut diagnostics) =
            rewrite_tag_helpers(document.allocator(), document.syntax_tree, &binder, options);
        document.syntax_tree = tree;
        document.diagnostics.append(&mut diagnostics);
        Ok(())
    }
}

/// Expands bind attributes of component documents.
pub struct BindLoweringPass;

impl BindLoweringPass {
    pub const ORDER: u32 = 1100;
}

impl DocumentPass for BindLoweringPass {
    fn name(&self) -> &'static str {
        "bind-lowering"
    }

    fn order(&self) -> u32 {
        Self::ORDER
    }

    fn execute<'a>(
        &self,
        document: &mut CodeDocument<'a>,
        _options: &CompilerOptions,
    ) -> Result<(), PipelineError> {
        if !document.kind.is_component() {
            return Ok(());
        }
        let catalog = document.catalog();
        match document.intermediate.as_mut() {
            Some(tree) => {
                lower_bind(tree, catalog);
                Ok(())
            }
            None => Err(PipelineError::MissingIntermediateTree {
                pass: self.name(),
                file_path: document.file_path.to_string(),
            }),
        }
    }
}

/// Runs registered passes over documents.
pub struct Engine {
    passes: Vec<Box<dyn DocumentPass>>,
    options: CompilerOptions,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(CompilerOptions::default())
    }
}

impl Engine {
    /// Engine with the scanning, rewriting and lowering passes.
    pub fn new(options: CompilerOptions) -> Self {
        let mut engine = Self::empty(options);
        engine.register(Box::new(DirectiveScanPass));
        engine.register(Box::new(TagHelperRewritePass));
        engine.register(Box::new(BindLoweringPass));
        engine
    }

    pub fn empty(options: CompilerOptions) -> Self {
        Self {
            passes: Vec::new(),
            options,
        }
    }

    /// Add a pass. Passes with equal order keep registration order.
    pub fn register(&mut self, pass: Box<dyn DocumentPass>) {
        let position = self
            .passes
            .partition_point(|existing| existing.order() <= pass.order());
        self.passes.insert(position, pass);
    }

    pub fn passes(&self) -> &[Box<dyn DocumentPass>] {
        &self.passes
    }

    #[inline]
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn process(&self, document: &mut CodeDocument<'_>) -> Result<(), PipelineError> {
        for pass in &self.passes {
            tracing::debug!(pass = pass.name(), order = pass.order(), file = %document.file_path, "running pass");
            pass.execute(document, &self.options)?;
        }
        tracing::debug!(
            file = %document.file_path,
            diagnostics = document.diagnostics.len(),
            "document processed"
        );
        Ok(())
    }
}
