//! View templates: compilation, registry and rendering.
//!
//! ## Pipeline
//!
//! Registration turns file patterns into views; rendering looks a view up by
//! name and executes it:
//!
//! ```text
//! add_with_layout("layout.html", &["pages/*.html"])
//!   └─ resolve pages/*.html ──► pages/index.html, pages/about.html
//!        └─ per page: resolve [layout, includes?, page] ──► compile ──► View
//!
//! render(out, "index.html", data, ctx)
//!   └─ lookup ──► (auto-reload? recompile + swap) ──► execute entry point ──► out
//! ```
//!
//! ## Key Types
//!
//! - [`ViewRenderer`]: registration surface and render operations
//! - [`Registry`] and [`View`]: the name → view mapping and the per-view artifact slot
//! - [`CompiledTemplate`]: one view's executable artifact
//! - [`Functions`]: callables bound into every compiled view

pub mod compiler;
pub mod engine;
pub mod registry;
mod renderer;

pub use compiler::{compile, resolve_patterns};
pub use engine::{CompiledTemplate, Functions, PAGE_TEMPLATE_GLOBAL};
pub use registry::{Registry, View, ViewSources};
pub use renderer::{ViewRenderer, ViewRendererBuilder};
