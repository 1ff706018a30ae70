//! # viewset - Named HTML Views on MiniJinja
//!
//! `viewset` registers HTML view templates by name, optionally composed with a
//! shared layout and a set of include fragments, and renders them into any
//! `std::io::Write` or straight into a web framework's response.
//!
//! ## Core Concepts
//!
//! - [`ViewRenderer`]: registers views from file patterns and renders them by name
//! - [`FileSource`]: where template files come from ([`DirSource`], [`MemorySource`])
//! - [`ViewContext`]: the request span and response sink a render writes to
//! - [`LogSink`]: structured logging ([`NoopLogSink`] by default, [`TracingLogSink`])
//! - [`Functions`]: callables available in every view
//!
//! ## Quick Start
//!
//! ```rust
//! use viewset::{BufferedContext, MemorySource, StatusCode, ViewRenderer};
//!
//! let source = MemorySource::from_entries(&[
//!     ("layout.html", "{% include 'header.html' %}<main>{% include page_template %}</main>"),
//!     ("includes/header.html", "<h1>{{ title() }}</h1>"),
//!     ("pages/index.html", "index"),
//! ]);
//!
//! let mut views = ViewRenderer::builder()
//!     .file_source(source)
//!     .function("title", || "Home")
//!     .build();
//! views
//!     .add_with_layout_and_includes("layout.html", "includes/*.html", &["pages/*.html"])
//!     .unwrap();
//!
//! let mut ctx = BufferedContext::new();
//! views.render_to_response(&mut ctx, StatusCode::OK, "index.html", &()).unwrap();
//! assert_eq!(ctx.body_string(), "<h1>Home</h1><main>index</main>");
//! ```
//!
//! ## View Names
//!
//! A view is named after its page file's base name: `pages/index.html` is
//! rendered as `"index.html"`. Registering two pages with the same base name
//! keeps the one registered last.

pub mod config;
pub mod context;
mod error;
pub mod log;
pub mod source;
pub mod template;

pub use config::ViewConfig;
pub use context::{BufferedContext, ViewContext};
pub use error::ViewError;
pub use log::{Fields, LogSink, NoopLogSink, TracingLogSink};
pub use source::{DirSource, FileSource, MemorySource};
pub use template::{
    compile, resolve_patterns, CompiledTemplate, Functions, Registry, View, ViewRenderer,
    ViewRendererBuilder, ViewSources, PAGE_TEMPLATE_GLOBAL,
};

pub use http::StatusCode;
