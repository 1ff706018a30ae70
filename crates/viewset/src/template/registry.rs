//! Registered views and their compiled artifacts.
//!
//! A [`View`] ties a page file to its optional layout and includes patterns,
//! and owns the artifact compiled from them. The [`Registry`] maps each view's
//! name (the page file's base name, e.g. `index.html` for
//! `pages/index.html`) to the view.
//!
//! # Artifact Replacement
//!
//! The artifact lives behind an `Arc` in a per-view slot. Recompiling builds a
//! complete new artifact first and only then swaps the `Arc`, so concurrent
//! renders see either the old or the new artifact, never a half-built one.
//! Renders that already hold the old `Arc` finish with it.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::engine::CompiledTemplate;

/// The source files a view is compiled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSources {
    /// The page file, as matched by the registration pattern.
    pub page: String,
    /// Pattern naming the layout, if any.
    pub layout: Option<String>,
    /// Pattern naming the include fragments, if any.
    pub includes: Option<String>,
}

impl ViewSources {
    /// A page without layout or includes.
    pub fn page(page: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            layout: None,
            includes: None,
        }
    }

    /// Sets the layout pattern; an empty pattern means no layout.
    #[must_use]
    pub fn with_layout(mut self, layout: &str) -> Self {
        self.layout = non_empty(layout);
        self
    }

    /// Sets the includes pattern; an empty pattern means no includes.
    #[must_use]
    pub fn with_includes(mut self, includes: &str) -> Self {
        self.includes = non_empty(includes);
        self
    }

    /// Patterns in compile order: layout, includes, then the page itself.
    pub fn patterns(&self) -> Vec<&str> {
        self.layout
            .iter()
            .chain(self.includes.iter())
            .map(String::as_str)
            .chain(std::iter::once(self.page.as_str()))
            .collect()
    }

    /// The registry key: the page's base name.
    pub fn name(&self) -> &str {
        base_name(&self.page)
    }

    /// The template executed at render time: the layout's base name when a
    /// layout is set, the page's otherwise.
    pub fn entry_point(&self) -> &str {
        match &self.layout {
            Some(layout) => base_name(layout),
            None => self.name(),
        }
    }
}

fn non_empty(pattern: &str) -> Option<String> {
    (!pattern.is_empty()).then(|| pattern.to_string())
}

/// Last `/`-separated segment of a file name or pattern.
pub(crate) fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// A registered view.
#[derive(Debug)]
pub struct View {
    name: String,
    sources: ViewSources,
    artifact: RwLock<Arc<CompiledTemplate>>,
}

impl View {
    pub(crate) fn new(sources: ViewSources, artifact: CompiledTemplate) -> Self {
        Self {
            name: sources.name().to_string(),
            sources,
            artifact: RwLock::new(Arc::new(artifact)),
        }
    }

    /// The registry key.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sources(&self) -> &ViewSources {
        &self.sources
    }

    /// Layout pattern, if the view has one.
    pub fn layout(&self) -> Option<&str> {
        self.sources.layout.as_deref()
    }

    /// Includes pattern, if the view has one.
    pub fn includes(&self) -> Option<&str> {
        self.sources.includes.as_deref()
    }

    pub fn entry_point(&self) -> &str {
        self.sources.entry_point()
    }

    /// The current artifact.
    pub fn artifact(&self) -> Arc<CompiledTemplate> {
        Arc::clone(&self.artifact.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Installs a freshly compiled artifact, returning it.
    pub(crate) fn replace(&self, artifact: CompiledTemplate) -> Arc<CompiledTemplate> {
        let artifact = Arc::new(artifact);
        *self.artifact.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&artifact);
        artifact
    }
}

/// Name → view mapping.
#[derive(Debug, Default)]
pub struct Registry {
    views: HashMap<String, Arc<View>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a view under its name, returning the view it replaced.
    pub fn insert(&mut self, view: View) -> Option<Arc<View>> {
        self.views.insert(view.name().to_string(), Arc::new(view))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<View>> {
        self.views.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.views.contains_key(name)
    }

    /// Registered view names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.views.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
