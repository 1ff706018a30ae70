//! axum integration for `viewset`.
//!
//! - [`AxumContext`]: a [`ViewContext`] that collects the response a render
//!   writes and turns into an axum [`Response`]. It can be extracted in
//!   handlers; the extracted context logs inside a per-request span.
//! - [`HtmlView`]: a responder that renders a named view from a shared
//!   [`ViewRenderer`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use axum::{extract::State, routing::get, Router};
//! use viewset::{DirSource, ViewRenderer};
//! use viewset_axum::HtmlView;
//!
//! async fn index(State(views): State<Arc<ViewRenderer>>) -> HtmlView<()> {
//!     HtmlView::new(views, "index.html", ())
//! }
//!
//! let mut views = ViewRenderer::builder()
//!     .file_source(DirSource::new("./views"))
//!     .build();
//! views.add_with_layout("layout.html", &["pages/*.html"])?;
//!
//! let app = Router::new()
//!     .route("/", get(index))
//!     .with_state(Arc::new(views));
//! ```

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;
use tracing::Span;
use viewset::{ViewContext, ViewRenderer};

/// Request context backed by axum.
///
/// Turning the context into a response yields whatever the render wrote, or
/// an empty `200 OK` if nothing was written.
#[derive(Debug)]
pub struct AxumContext {
    span: Span,
    response: Option<Response>,
}

impl AxumContext {
    /// A context logging in the current span.
    pub fn new() -> Self {
        Self::with_span(Span::current())
    }

    pub fn with_span(span: Span) -> Self {
        Self {
            span,
            response: None,
        }
    }

    /// Status of the response written so far.
    pub fn status(&self) -> Option<StatusCode> {
        self.response.as_ref().map(Response::status)
    }
}

impl Default for AxumContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewContext for AxumContext {
    fn context(&self) -> &Span {
        &self.span
    }

    fn write_no_content(&mut self, status: StatusCode) {
        self.response = Some(status.into_response());
    }

    fn write_body(&mut self, status: StatusCode, body: Vec<u8>) {
        self.response = Some((status, Html(body)).into_response());
    }
}

impl IntoResponse for AxumContext {
    fn into_response(self) -> Response {
        self.response
            .unwrap_or_else(|| StatusCode::OK.into_response())
    }
}

impl<S> FromRequestParts<S> for AxumContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let span = tracing::debug_span!("view", method = %parts.method, uri = %parts.uri);
        Ok(Self::with_span(span))
    }
}

/// Renders a named view as an HTML response.
///
/// Rendering failures become a `500 Internal Server Error` with an empty body.
/// They are logged once, by the renderer's [`LogSink`](viewset::LogSink).
pub struct HtmlView<T> {
    views: Arc<ViewRenderer>,
    name: String,
    data: T,
    status: StatusCode,
    ctx: Option<AxumContext>,
}

impl<T: Serialize> HtmlView<T> {
    /// Renders `name` with `data` and status `200 OK`.
    #[must_use]
    pub fn new(views: Arc<ViewRenderer>, name: impl Into<String>, data: T) -> Self {
        Self {
            views,
            name: name.into(),
            data,
            status: StatusCode::OK,
            ctx: None,
        }
    }

    /// Set the HTTP status code.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Render within an extracted request context (for its log span).
    #[must_use]
    pub fn with_context(mut self, ctx: AxumContext) -> Self {
        self.ctx = Some(ctx);
        self
    }
}

impl<T: Serialize> IntoResponse for HtmlView<T> {
    fn into_response(self) -> Response {
        let mut ctx = self.ctx.unwrap_or_default();

        match self
            .views
            .render_to_response(&mut ctx, self.status, &self.name, &self.data)
        {
            Ok(()) => ctx.into_response(),
            // Already reported through the renderer's log sink.
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}
