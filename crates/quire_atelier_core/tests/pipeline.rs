//! Engine behavior across document kinds.

mod common;

use std::sync::Once;

use insta::assert_snapshot;
use quire_atelier_core::{
    process_document, CodeDocument, CompilerOptions, DocumentKind, DocumentPass, Engine,
    ErrorCode, PipelineError, TagHelperCatalog, TagHelperRewritePass,
};
use quire_carton::Bump;
use quire_relief::SyntaxFactory;
use rayon::prelude::*;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .try_init();
    });
}

const CLASSIC_CATALOG: &str = r#"[
  {
    "kind": "ITagHelper",
    "name": "Mvc.CounterTagHelper",
    "assemblyName": "Mvc",
    "tagMatchingRules": [{ "tagName": "counter" }],
    "boundAttributes": [{ "name": "count", "typeName": "System.Int32" }]
  }
]"#;

/// Records its name so ordering can be observed.
struct NamedPass {
    name: &'static str,
    order: u32,
}

impl DocumentPass for NamedPass {
    fn name(&self) -> &'static str {
        self.name
    }

    fn order(&self) -> u32 {
        self.order
    }

    fn execute<'a>(
        &self,
        _document: &mut CodeDocument<'a>,
        _options: &CompilerOptions,
    ) -> Result<(), PipelineError> {
        Ok(())
    }
}

fn pass_names(engine: &Engine) -> Vec<&'static str> {
    engine.passes().iter().map(|pass| pass.name()).collect()
}

#[test]
fn test_passes_run_in_order() {
    let mut engine = common::engine();
    assert_eq!(
        pass_names(&engine),
        vec!["directive-scan", "tag-helper-rewrite", "classify", "bind-lowering"]
    );

    engine.register(Box::new(NamedPass { name: "late-classify", order: 1000 }));
    engine.register(Box::new(NamedPass { name: "first", order: 0 }));
    assert_eq!(
        pass_names(&engine),
        vec![
            "first",
            "directive-scan",
            "tag-helper-rewrite",
            "classify",
            "late-classify",
            "bind-lowering"
        ]
    );
}

#[test]
fn test_component_document_requires_intermediate_tree() {
    let allocator = Bump::new();
    let catalog = common::component_catalog();
    let f = SyntaxFactory::new(&allocator);
    let tree = f.block(&[f.text("<p></p>")]);
    let mut document =
        CodeDocument::new(&allocator, &catalog, "Pages/Index.razor", DocumentKind::Component, tree);

    assert_eq!(
        process_document(&mut document),
        Err(PipelineError::MissingIntermediateTree {
            pass: "bind-lowering",
            file_path: "Pages/Index.razor".to_string(),
        })
    );
}

#[test]
fn test_rewrite_requires_selection() {
    let allocator = Bump::new();
    let catalog = common::component_catalog();
    let f = SyntaxFactory::new(&allocator);
    let mut document = CodeDocument::new(
        &allocator,
        &catalog,
        "Index.cshtml",
        DocumentKind::Legacy,
        f.block(&[]),
    );
    let mut engine = Engine::empty(CompilerOptions::default());
    engine.register(Box::new(TagHelperRewritePass));

    let error = engine.process(&mut document).unwrap_err();
    assert_eq!(error, PipelineError::MissingSelection { pass: "tag-helper-rewrite" });
    assert_eq!(
        error.to_string(),
        "pass 'tag-helper-rewrite' requires tag helper selection to have run"
    );
}

#[test]
fn test_classic_document_from_json_catalog() {
    init_logging();
    let catalog = TagHelperCatalog::from_json(CLASSIC_CATALOG).unwrap();
    let allocator = Bump::new();
    let f = SyntaxFactory::new(&allocator);
    let tree = f.block(&[
        f.directive("addTagHelper", "\"*, Mvc\""),
        f.element(
            "counter",
            &[f.attribute("count", &[f.implicit("Total")])],
            &[f.text("hi")],
        ),
        f.element("p", &[], &[f.text("plain")]),
    ]);
    let mut document =
        CodeDocument::new(&allocator, &catalog, "Views/Index.cshtml", DocumentKind::Legacy, tree);

    common::engine().process(&mut document).unwrap();

    assert!(document.all_diagnostics().is_empty());
    let selection = document.selection.as_ref().unwrap();
    assert_eq!(selection.tag_helpers.len(), 1);
    // Bind lowering leaves classic documents alone.
    assert_snapshot!(document.intermediate.as_ref().unwrap().debug_render(), @r#"
    Document
      MarkupElement <counter>
        TagHelperProperty count (Mvc.CounterTagHelper)
          CSharpExpression
            CSharp "Total"
        HtmlContent
          Html "hi"
      MarkupElement <p>
        HtmlContent
          Html "plain"
    "#);
}

#[test]
fn test_unresolved_assembly_leaves_tree_untouched() {
    let catalog = TagHelperCatalog::from_json(CLASSIC_CATALOG).unwrap();
    let allocator = Bump::new();
    let f = SyntaxFactory::new(&allocator);
    let tree = f.block(&[
        f.directive("addTagHelper", "*, Missing"),
        f.element("counter", &[f.attribute("count", &[f.implicit("Total")])], &[]),
    ]);
    let mut document =
        CodeDocument::new(&allocator, &catalog, "Views/Index.cshtml", DocumentKind::Legacy, tree);
    let before = document.syntax_tree.to_source();

    process_document(&mut document).unwrap();

    let codes: Vec<ErrorCode> = document.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::UnresolvedTagHelperAssembly]);
    assert_eq!(document.syntax_tree.to_source(), before);
    assert!(document.intermediate.is_none());
}

fn render_component(engine: &Engine, catalog: &TagHelperCatalog, variable: &str) -> String {
    let allocator = Bump::new();
    let f = SyntaxFactory::new(&allocator);
    let imports = f.block(&[f.directive("using", "Quire.Web")]);
    let tree = f.block(&[
        f.directive("using", "App.Shared"),
        f.self_closing("MyInput", &[f.attribute("bind-Value", &[f.implicit(variable)])]),
        f.self_closing("input", &[f.attribute("bind", &[f.implicit(variable)])]),
    ]);
    let mut document = CodeDocument::new(
        &allocator,
        catalog,
        format!("Pages/{variable}.razor"),
        DocumentKind::Component,
        tree,
    )
    .with_namespace("App.Pages")
    .with_imports([imports]);
    engine.process(&mut document).unwrap();
    document.intermediate.as_ref().unwrap().debug_render()
}

#[test]
fn test_documents_share_a_catalog_across_threads() {
    init_logging();
    let catalog = common::component_catalog();
    let engine = common::engine();
    let variables: Vec<String> = (0..32).map(|index| format!("Field{index}")).collect();

    let sequential: Vec<String> = variables
        .iter()
        .map(|variable| render_component(&engine, &catalog, variable))
        .collect();
    let parallel: Vec<String> = variables
        .par_iter()
        .map(|variable| render_component(&engine, &catalog, variable))
        .collect();

    assert_eq!(parallel, sequential);
    assert!(sequential[3].contains("BindMethods.GetValue(Field3)"));
    assert!(sequential[3].contains("CreateBinder(this, __value => Field3 = __value, Field3)"));
}
