//! The view renderer: registration and rendering by name.
//!
//! # Registering Views
//!
//! Views are registered from file patterns. Each file a page pattern matches
//! becomes one view, named after the file's base name:
//!
//! ```rust
//! use viewset::{BufferedContext, MemorySource, ViewRenderer};
//!
//! let source = MemorySource::from_entries(&[
//!     ("layout.html", "<main>{% include page_template %}</main>"),
//!     ("pages/index.html", "Hello, {{ name }}!"),
//! ]);
//!
//! let mut renderer = ViewRenderer::builder().file_source(source).build();
//! renderer.add_with_layout("layout.html", &["pages/*.html"]).unwrap();
//!
//! let mut out = Vec::new();
//! let mut ctx = BufferedContext::new();
//! renderer
//!     .render(&mut out, "index.html", &serde_json::json!({"name": "World"}), &mut ctx)
//!     .unwrap();
//! assert_eq!(out, b"<main>Hello, World!</main>");
//! ```
//!
//! # Layouts and Includes
//!
//! With a layout, the layout is what actually runs; it pulls the page in with
//! `{% include page_template %}`. Include fragments are available to both by
//! base name (`{% include "header.html" %}`).
//!
//! # Auto-Reload
//!
//! With auto-reload enabled every render recompiles the view from the file
//! source first, so edits show up without a restart. A recompilation failure
//! fails the render; there is no fallback to the previous artifact. Leave it
//! off in production: views are then compiled once at registration.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use http::StatusCode;
use serde::Serialize;

use super::compiler::{compile, resolve_patterns};
use super::engine::{CompiledTemplate, Functions};
use super::registry::{Registry, View, ViewSources};
use crate::config::ViewConfig;
use crate::context::ViewContext;
use crate::error::ViewError;
use crate::log::{Fields, LogSink, NoopLogSink};
use crate::source::{DirSource, FileSource};

/// Registry of named views plus the configuration used to compile them.
pub struct ViewRenderer {
    source: Option<Arc<dyn FileSource>>,
    auto_reload: bool,
    functions: Functions,
    log: Arc<dyn LogSink>,
    registry: Registry,
}

impl ViewRenderer {
    /// Starts configuring a renderer.
    pub fn builder() -> ViewRendererBuilder {
        ViewRendererBuilder::default()
    }

    /// A renderer with default settings and no file source.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Whether views are recompiled on every render.
    pub fn auto_reload(&self) -> bool {
        self.auto_reload
    }

    /// Replaces the file source and the reload setting.
    ///
    /// Views already registered keep their artifacts; with auto-reload on they
    /// are recompiled from the new source on their next render.
    pub fn update_source<S>(&mut self, source: S, auto_reload: bool)
    where
        S: FileSource + 'static,
    {
        self.source = Some(Arc::new(source));
        self.auto_reload = auto_reload;
    }

    /// Registers one page-only view per file matched by `patterns`.
    pub fn add(&mut self, patterns: &[&str]) -> Result<(), ViewError> {
        self.register(patterns, ViewSources::page)
    }

    /// Registers one view per matched page, all sharing `layout`.
    pub fn add_with_layout(&mut self, layout: &str, patterns: &[&str]) -> Result<(), ViewError> {
        self.register(patterns, |page| ViewSources::page(page).with_layout(layout))
    }

    /// Registers one view per matched page, sharing `layout` and the fragments
    /// matched by `includes`.
    pub fn add_with_layout_and_includes(
        &mut self,
        layout: &str,
        includes: &str,
        patterns: &[&str],
    ) -> Result<(), ViewError> {
        self.register(patterns, |page| {
            ViewSources::page(page)
                .with_layout(layout)
                .with_includes(includes)
        })
    }

    fn register<F>(&mut self, patterns: &[&str], make: F) -> Result<(), ViewError>
    where
        F: Fn(String) -> ViewSources,
    {
        let filenames = resolve_patterns(self.source()?, patterns)?;

        for page in filenames {
            let sources = make(page);
            let artifact = self.compile(&sources)?;
            self.registry.insert(View::new(sources, artifact));
        }

        Ok(())
    }

    fn source(&self) -> Result<&dyn FileSource, ViewError> {
        self.source.as_deref().ok_or(ViewError::NoSource)
    }

    fn compile(&self, sources: &ViewSources) -> Result<CompiledTemplate, ViewError> {
        compile(self.source()?, &self.functions, sources, self.log.as_ref())
    }

    /// Renders the view called `name` into `out`.
    ///
    /// An unknown name writes a `500` no-content response through `ctx` and
    /// returns [`ViewError::NotFound`]. Execution errors are logged and
    /// returned; output written before the failure stays in `out`.
    pub fn render<W, T, C>(
        &self,
        out: &mut W,
        name: &str,
        data: &T,
        ctx: &mut C,
    ) -> Result<(), ViewError>
    where
        W: Write + ?Sized,
        T: Serialize + ?Sized,
        C: ViewContext + ?Sized,
    {
        self.log.debug_ctx(
            ctx.context(),
            "Render",
            &Fields::new()
                .with("name", name)
                .with("autoReload", self.auto_reload),
        );

        let start = Instant::now();

        let (view, artifact) = match self.lookup(name) {
            Ok(found) => found,
            Err(err) => {
                self.log.error_ctx(
                    ctx.context(),
                    "failed to load template",
                    &err,
                    &Fields::new().with("name", name),
                );
                if err.is_not_found() {
                    ctx.write_no_content(StatusCode::INTERNAL_SERVER_ERROR);
                }
                return Err(err);
            }
        };

        let layout = view.layout().unwrap_or("");

        if let Err(source) = artifact.execute(view.entry_point(), data, out) {
            let err = ViewError::Execute {
                name: view.sources().page.clone(),
                source,
            };
            self.log.error_ctx(
                ctx.context(),
                "render template failed",
                &err,
                &Fields::new()
                    .with("name", &view.sources().page)
                    .with("layout", layout),
            );
            return Err(err);
        }

        self.log.debug_ctx(
            ctx.context(),
            "execute template",
            &Fields::new()
                .with("name", &view.sources().page)
                .with("dur", format!("{:?}", start.elapsed()))
                .with("layout", layout),
        );

        Ok(())
    }

    /// Renders into a buffer and, only on success, writes it as the response
    /// body with `status`.
    pub fn render_to_response<T, C>(
        &self,
        ctx: &mut C,
        status: StatusCode,
        name: &str,
        data: &T,
    ) -> Result<(), ViewError>
    where
        T: Serialize + ?Sized,
        C: ViewContext + ?Sized,
    {
        let mut buf = Vec::new();
        self.render(&mut buf, name, data, ctx)?;
        ctx.write_body(status, buf);
        Ok(())
    }

    /// Finds a view, recompiling it first when auto-reload is on.
    fn lookup(&self, name: &str) -> Result<(&Arc<View>, Arc<CompiledTemplate>), ViewError> {
        let view = self.registry.get(name).ok_or_else(|| ViewError::NotFound {
            name: name.to_string(),
        })?;

        if !self.auto_reload {
            return Ok((view, view.artifact()));
        }

        let artifact = self.compile(view.sources())?;
        Ok((view, view.replace(artifact)))
    }

    /// Whether a view with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// The registered view called `name`.
    pub fn view(&self, name: &str) -> Option<&Arc<View>> {
        self.registry.get(name)
    }

    /// Registered view names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.registry.names()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

impl Default for ViewRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for a [`ViewRenderer`].
///
/// Unset options default to: no file source (registration then fails with
/// [`ViewError::NoSource`]), auto-reload off, no functions, and a log sink
/// that discards everything.
///
/// ```rust
/// use viewset::{DirSource, TracingLogSink, ViewRenderer};
///
/// let renderer = ViewRenderer::builder()
///     .file_source(DirSource::new("./views"))
///     .auto_reload(cfg!(debug_assertions))
///     .function("year", || 2024)
///     .log_sink(TracingLogSink)
///     .build();
/// assert!(renderer.is_empty());
/// ```
#[derive(Default)]
pub struct ViewRendererBuilder {
    source: Option<Arc<dyn FileSource>>,
    auto_reload: bool,
    functions: Functions,
    log: Option<Arc<dyn LogSink>>,
}

impl ViewRendererBuilder {
    /// Seeds the builder from a [`ViewConfig`].
    ///
    /// A configured `template_dir` becomes a [`DirSource`].
    #[must_use]
    pub fn from_config(config: &ViewConfig) -> Self {
        let mut builder = Self::default().auto_reload(config.auto_reload);
        if let Some(dir) = &config.template_dir {
            builder = builder.file_source(DirSource::new(dir));
        }
        builder
    }

    /// Sets the collection template files are read from.
    #[must_use]
    pub fn file_source<S>(mut self, source: S) -> Self
    where
        S: FileSource + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    /// Sets a file source that is shared with other owners.
    #[must_use]
    pub fn shared_source(mut self, source: Arc<dyn FileSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Recompile views on every render.
    #[must_use]
    pub fn auto_reload(mut self, enabled: bool) -> Self {
        self.auto_reload = enabled;
        self
    }

    /// Adds one function to the set bound into every view.
    #[must_use]
    pub fn function<F, Rv, Args>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: minijinja::functions::Function<Rv, Args>,
        Rv: minijinja::value::FunctionResult,
        Args: for<'a> minijinja::value::FunctionArgs<'a>,
    {
        self.functions.add(name, f);
        self
    }

    /// Merges a whole function set.
    #[must_use]
    pub fn functions(mut self, functions: Functions) -> Self {
        self.functions.extend(functions);
        self
    }

    /// Sets where log messages go.
    #[must_use]
    pub fn log_sink<L>(mut self, sink: L) -> Self
    where
        L: LogSink + 'static,
    {
        self.log = Some(Arc::new(sink));
        self
    }

    pub fn build(self) -> ViewRenderer {
        ViewRenderer {
            source: self.source,
            auto_reload: self.auto_reload,
            functions: self.functions,
            log: self.log.unwrap_or_else(|| Arc::new(NoopLogSink)),
            registry: Registry::new(),
        }
    }
}
