//! MiniJinja glue: the compiled artifact and the shared function set.
//!
//! Each view compiles into its own [`CompiledTemplate`], a private minijinja
//! environment holding every source file the view is made of (layout,
//! includes, page) under their base names. Files are added in order, so when
//! two files share a base name the one added last wins.
//!
//! [`Functions`] are copied into the environment when the artifact is built.
//! Changing a `Functions` value afterwards never affects templates that were
//! already compiled.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use minijinja::functions::Function;
use minijinja::value::{FunctionArgs, FunctionResult};
use minijinja::{Environment, Value};
use serde::Serialize;

/// Name of the global that holds the page's template name.
///
/// A layout pulls the page in with `{% include page_template %}`.
pub const PAGE_TEMPLATE_GLOBAL: &str = "page_template";

/// Named callables made available to every compiled view.
///
/// # Example
///
/// ```rust
/// use viewset::Functions;
///
/// let functions = Functions::new()
///     .with("shout", |s: String| s.to_uppercase())
///     .with("answer", || 42);
/// assert_eq!(functions.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct Functions {
    items: BTreeMap<String, Value>,
}

impl Functions {
    /// Creates an empty function set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function, replacing any function with the same name.
    pub fn add<F, Rv, Args>(&mut self, name: impl Into<String>, f: F)
    where
        F: Function<Rv, Args>,
        Rv: FunctionResult,
        Args: for<'a> FunctionArgs<'a>,
    {
        self.items.insert(name.into(), Value::from_function(f));
    }

    /// Builder form of [`add`](Self::add).
    #[must_use]
    pub fn with<F, Rv, Args>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Function<Rv, Args>,
        Rv: FunctionResult,
        Args: for<'a> FunctionArgs<'a>,
    {
        self.add(name, f);
        self
    }

    /// Merges `other` into this set; functions in `other` win on name clashes.
    pub fn extend(&mut self, other: Functions) {
        self.items.extend(other.items);
    }

    /// Whether a function with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Registered function names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn bind(&self, env: &mut Environment<'static>) {
        for (name, value) in &self.items {
            env.add_global(name.clone(), value.clone());
        }
    }
}

impl fmt::Debug for Functions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.items.keys()).finish()
    }
}

/// The executable form of one view.
pub struct CompiledTemplate {
    env: Environment<'static>,
    name: String,
    files: Vec<String>,
}

impl CompiledTemplate {
    /// Starts an empty artifact for the page called `name`, bound to `functions`.
    pub(crate) fn new(name: &str, functions: &Functions) -> Self {
        let mut env = Environment::new();
        // Static text must come out byte for byte, final newline included.
        env.set_keep_trailing_newline(true);
        functions.bind(&mut env);
        env.add_global(PAGE_TEMPLATE_GLOBAL, Value::from(name));
        Self {
            env,
            name: name.to_string(),
            files: Vec::new(),
        }
    }

    /// Parses `source` and adds it under `template_name`, replacing any
    /// earlier template with that name.
    pub(crate) fn add_source(
        &mut self,
        template_name: &str,
        source: String,
    ) -> Result<(), minijinja::Error> {
        self.env
            .add_template_owned(template_name.to_string(), source)?;
        if !self.files.iter().any(|f| f == template_name) {
            self.files.push(template_name.to_string());
        }
        Ok(())
    }

    /// The page's base name this artifact was built for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Template names defined in this artifact, in first-definition order.
    pub fn templates(&self) -> &[String] {
        &self.files
    }

    /// Whether a template with this name is defined.
    pub fn has_template(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }

    /// Executes the template named `entry`, streaming output into `out`.
    ///
    /// Whatever was written before a failure stays in `out`.
    pub fn execute<S, W>(&self, entry: &str, data: &S, out: &mut W) -> Result<(), minijinja::Error>
    where
        S: Serialize + ?Sized,
        W: Write + ?Sized,
    {
        let tmpl = self.env.get_template(entry)?;
        tmpl.render_to_write(data, out)?;
        Ok(())
    }
}

impl fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("name", &self.name)
            .field("templates", &self.files)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(tmpl: &CompiledTemplate, entry: &str, data: &serde_json::Value) -> String {
        let mut out = Vec::new();
        tmpl.execute(entry, data, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_execute_single_template() {
        let mut tmpl = CompiledTemplate::new("hello.html", &Functions::new());
        tmpl.add_source("hello.html", "Hello, {{ name }}!".to_string())
            .unwrap();
        assert_eq!(
            render(&tmpl, "hello.html", &json!({"name": "World"})),
            "Hello, World!"
        );
    }

    #[test]
    fn test_functions_are_bound() {
        let functions = Functions::new().with("shout", |s: String| s.to_uppercase());
        let mut tmpl = CompiledTemplate::new("page.html", &functions);
        tmpl.add_source("page.html", "{{ shout('hi') }}".to_string())
            .unwrap();
        assert_eq!(render(&tmpl, "page.html", &json!(null)), "HI");
    }

    #[test]
    fn test_functions_bound_at_compile_time() {
        let mut functions = Functions::new().with("word", || "old");
        let mut tmpl = CompiledTemplate::new("page.html", &functions);
        tmpl.add_source("page.html", "{{ word() }}".to_string())
            .unwrap();

        functions.add("word", || "new");
        assert_eq!(render(&tmpl, "page.html", &json!(null)), "old");
    }

    #[test]
    fn test_layout_includes_page_template() {
        let mut tmpl = CompiledTemplate::new("index.html", &Functions::new());
        tmpl.add_source(
            "layout.html",
            "<main>{% include page_template %}</main>".to_string(),
        )
        .unwrap();
        tmpl.add_source("index.html", "index".to_string()).unwrap();
        assert_eq!(render(&tmpl, "layout.html", &json!(null)), "<main>index</main>");
    }

    #[test]
    fn test_trailing_newline_kept() {
        let mut tmpl = CompiledTemplate::new("index.html", &Functions::new());
        tmpl.add_source(
            "layout.html",
            "<main>\n{% include page_template %}</main>\n".to_string(),
        )
        .unwrap();
        tmpl.add_source("index.html", "index\n".to_string()).unwrap();
        assert_eq!(render(&tmpl, "index.html", &json!(null)), "index\n");
        assert_eq!(
            render(&tmpl, "layout.html", &json!(null)),
            "<main>\nindex\n</main>\n"
        );
    }

    #[test]
    fn test_last_definition_wins() {
        let mut tmpl = CompiledTemplate::new("index.html", &Functions::new());
        tmpl.add_source("index.html", "first".to_string()).unwrap();
        tmpl.add_source("index.html", "second".to_string()).unwrap();
        assert_eq!(render(&tmpl, "index.html", &json!(null)), "second");
        assert_eq!(tmpl.templates(), &["index.html".to_string()]);
    }

    #[test]
    fn test_syntax_error_on_add() {
        let mut tmpl = CompiledTemplate::new("bad.html", &Functions::new());
        assert!(tmpl
            .add_source("bad.html", "{{ unclosed".to_string())
            .is_err());
        assert!(!tmpl.has_template("bad.html"));
    }

    #[test]
    fn test_html_autoescape() {
        let mut tmpl = CompiledTemplate::new("page.html", &Functions::new());
        tmpl.add_source("page.html", "{{ v }}".to_string()).unwrap();
        assert_eq!(
            render(&tmpl, "page.html", &json!({"v": "<b>"})),
            "&lt;b&gt;"
        );
    }

    #[test]
    fn test_functions_debug_lists_names() {
        let functions = Functions::new().with("b", || 1).with("a", || 2);
        assert_eq!(format!("{:?}", functions), r#"{"a", "b"}"#);
        assert_eq!(functions.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(functions.contains("a"));
    }
}
