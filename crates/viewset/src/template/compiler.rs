//! Turning a view's source patterns into one compiled artifact.
//!
//! Compilation resolves the view's patterns in a fixed order:
//!
//! 1. the layout pattern, if any
//! 2. the includes pattern, if any
//! 3. the page itself
//!
//! Every resolved file is parsed into the same artifact under its base name.
//! Later files replace earlier ones with the same base name, which is why the
//! page comes last: its definitions are the ones that stick. At render time
//! the layout (or the page, without a layout) is the entry point.

use super::engine::{CompiledTemplate, Functions};
use super::registry::{base_name, ViewSources};
use crate::error::ViewError;
use crate::log::{Fields, LogSink};
use crate::source::FileSource;

/// Resolves each pattern against `source` and concatenates the matches.
///
/// Matches keep pattern order, then the source's match order within a
/// pattern. A pattern matching nothing fails with [`ViewError::NoMatch`] so a
/// mistyped pattern can never produce an empty template.
pub fn resolve_patterns<S>(source: &S, patterns: &[&str]) -> Result<Vec<String>, ViewError>
where
    S: FileSource + ?Sized,
{
    let mut filenames = Vec::new();

    for pattern in patterns {
        let matches = source.glob(pattern)?;
        if matches.is_empty() {
            return Err(ViewError::NoMatch {
                pattern: pattern.to_string(),
            });
        }
        filenames.extend(matches);
    }

    Ok(filenames)
}

/// Compiles the files behind `sources` into a new artifact.
///
/// The caller decides what to do with the result: registration inserts a new
/// view, reload swaps it into the existing view.
pub fn compile<S>(
    source: &S,
    functions: &Functions,
    sources: &ViewSources,
    log: &dyn LogSink,
) -> Result<CompiledTemplate, ViewError>
where
    S: FileSource + ?Sized,
{
    let template_name = sources.name();

    log.debug(
        "register template",
        &Fields::new()
            .with("templateName", template_name)
            .with("layoutName", sources.layout.as_deref().map(base_name).unwrap_or(""))
            .with("includes", sources.includes.as_deref().unwrap_or("")),
    );

    let patterns = sources.patterns();
    log.debug(
        "new template",
        &Fields::new().with("patterns", patterns.join(",")),
    );

    let filenames = resolve_patterns(source, &patterns)?;

    let mut artifact = CompiledTemplate::new(template_name, functions);
    for file in &filenames {
        let content = source.read(file)?;
        artifact
            .add_source(base_name(file), content)
            .map_err(|e| ViewError::Parse {
                view: sources.page.clone(),
                file: file.clone(),
                source: e,
            })?;
    }

    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::NoopLogSink;
    use crate::source::MemorySource;

    fn source() -> MemorySource {
        MemorySource::from_entries(&[
            ("layout.html", "[{% include page_template %}]"),
            ("includes/a.html", "A"),
            ("includes/b.html", "B"),
            ("pages/index.html", "index {% include 'a.html' %}{% include 'b.html' %}"),
            ("pages/about.html", "about"),
            ("broken/bad.html", "{% if %}"),
        ])
    }

    fn run(artifact: &CompiledTemplate, entry: &str) -> String {
        let mut out = Vec::new();
        artifact.execute(entry, &(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_resolve_preserves_pattern_order() {
        let names = resolve_patterns(&source(), &["pages/*.html", "includes/*.html"]).unwrap();
        assert_eq!(
            names,
            vec![
                "pages/about.html",
                "pages/index.html",
                "includes/a.html",
                "includes/b.html"
            ]
        );
    }

    #[test]
    fn test_resolve_fails_on_any_empty_pattern() {
        let err = resolve_patterns(&source(), &["pages/*.html", "nothing/*.html"]).unwrap_err();
        match err {
            ViewError::NoMatch { pattern } => assert_eq!(pattern, "nothing/*.html"),
            other => panic!("expected NoMatch, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_invalid_pattern() {
        let err = resolve_patterns(&source(), &["pages/[*.html"]).unwrap_err();
        assert!(matches!(err, ViewError::Pattern { .. }));
    }

    #[test]
    fn test_compile_page_only() {
        let sources = ViewSources::page("pages/about.html");
        let artifact = compile(&source(), &Functions::new(), &sources, &NoopLogSink).unwrap();
        assert_eq!(artifact.name(), "about.html");
        assert_eq!(artifact.templates(), &["about.html".to_string()]);
        assert_eq!(run(&artifact, sources.entry_point()), "about");
    }

    #[test]
    fn test_compile_with_layout_and_includes() {
        let sources = ViewSources::page("pages/index.html")
            .with_layout("layout.html")
            .with_includes("includes/*.html");
        let artifact = compile(&source(), &Functions::new(), &sources, &NoopLogSink).unwrap();

        assert_eq!(
            artifact.templates(),
            &[
                "layout.html".to_string(),
                "a.html".to_string(),
                "b.html".to_string(),
                "index.html".to_string()
            ]
        );
        assert_eq!(run(&artifact, sources.entry_point()), "[index AB]");
    }

    #[test]
    fn test_compile_missing_layout_is_no_match() {
        let sources = ViewSources::page("pages/index.html").with_layout("missing.html");
        let err = compile(&source(), &Functions::new(), &sources, &NoopLogSink).unwrap_err();
        assert!(err.is_no_match());
    }

    #[test]
    fn test_compile_parse_error_names_file() {
        let sources = ViewSources::page("broken/bad.html");
        let err = compile(&source(), &Functions::new(), &sources, &NoopLogSink).unwrap_err();
        match err {
            ViewError::Parse { view, file, .. } => {
                assert_eq!(view, "broken/bad.html");
                assert_eq!(file, "broken/bad.html");
            }
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_compile_page_overrides_include_with_same_name() {
        let source = MemorySource::from_entries(&[
            ("includes/index.html", "from include"),
            ("pages/index.html", "from page"),
        ]);
        let sources = ViewSources::page("pages/index.html").with_includes("includes/*.html");
        let artifact = compile(&source, &Functions::new(), &sources, &NoopLogSink).unwrap();
        assert_eq!(run(&artifact, "index.html"), "from page");
    }
}
