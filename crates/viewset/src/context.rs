//! The request-side capabilities a render needs from the host framework.
//!
//! Rendering only needs three things from the surrounding web framework:
//! a span to correlate log messages with, and two ways of writing a response.
//! [`ViewContext`] captures exactly that, so the core stays independent of any
//! particular framework. The `viewset-axum` crate implements it for axum;
//! [`BufferedContext`] is an in-memory implementation for tests and non-HTTP
//! callers.

use http::StatusCode;
use tracing::Span;

/// Request context and response sink for a single render.
pub trait ViewContext {
    /// The span log messages for this request are recorded in.
    fn context(&self) -> &Span;

    /// Writes a response with the given status and no body.
    fn write_no_content(&mut self, status: StatusCode);

    /// Writes a complete response body with the given status.
    fn write_body(&mut self, status: StatusCode, body: Vec<u8>);
}

/// A [`ViewContext`] that records the response in memory.
#[derive(Debug)]
pub struct BufferedContext {
    span: Span,
    status: Option<StatusCode>,
    body: Vec<u8>,
}

impl BufferedContext {
    /// Creates a context with no span.
    pub fn new() -> Self {
        Self::with_span(Span::none())
    }

    /// Creates a context whose log messages are recorded in `span`.
    pub fn with_span(span: Span) -> Self {
        Self {
            span,
            status: None,
            body: Vec::new(),
        }
    }

    /// The status written so far, if any.
    pub fn written_status(&self) -> Option<StatusCode> {
        self.status
    }

    /// The status a host framework would send: whatever was written, or `200 OK`.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// The body written so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body written so far, lossily decoded as UTF-8.
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl Default for BufferedContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewContext for BufferedContext {
    fn context(&self) -> &Span {
        &self.span
    }

    fn write_no_content(&mut self, status: StatusCode) {
        self.status = Some(status);
        self.body.clear();
    }

    fn write_body(&mut self, status: StatusCode, body: Vec<u8>) {
        self.status = Some(status);
        self.body = body;
    }
}
