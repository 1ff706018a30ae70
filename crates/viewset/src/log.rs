//! Structured log sinks.
//!
//! The renderer reports what it does through a [`LogSink`] rather than calling
//! a logging backend directly. The default sink discards everything; install
//! [`TracingLogSink`] to forward events to `tracing`, correlated with the
//! request span carried by the [`ViewContext`](crate::ViewContext).

use std::fmt;

use tracing::Span;

/// Ordered `key=value` fields attached to a log message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(&'static str, String)>);

impl Fields {
    /// Creates an empty field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field.
    #[must_use]
    pub fn with(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.0.push((key, value.to_string()));
        self
    }

    /// Looks up the first value recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over the fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

/// Destination for the renderer's leveled, structured log messages.
pub trait LogSink: Send + Sync {
    /// Logs a debug message outside of any request.
    fn debug(&self, msg: &str, fields: &Fields);

    /// Logs a debug message correlated with a request.
    fn debug_ctx(&self, ctx: &Span, msg: &str, fields: &Fields);

    /// Logs an error correlated with a request.
    fn error_ctx(&self, ctx: &Span, msg: &str, err: &dyn std::error::Error, fields: &Fields);
}

/// A sink that drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogSink;

impl LogSink for NoopLogSink {
    fn debug(&self, _msg: &str, _fields: &Fields) {}

    fn debug_ctx(&self, _ctx: &Span, _msg: &str, _fields: &Fields) {}

    fn error_ctx(&self, _ctx: &Span, _msg: &str, _err: &dyn std::error::Error, _fields: &Fields) {}
}

/// A sink that emits `tracing` events.
///
/// Request-scoped messages are emitted inside the request's span so
/// subscribers attach the span's fields (request id, route, ...) to them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn debug(&self, msg: &str, fields: &Fields) {
        tracing::debug!(target: "viewset", fields = %fields, "{}", msg);
    }

    fn debug_ctx(&self, ctx: &Span, msg: &str, fields: &Fields) {
        ctx.in_scope(|| {
            tracing::debug!(target: "viewset", fields = %fields, "{}", msg);
        });
    }

    fn error_ctx(&self, ctx: &Span, msg: &str, err: &dyn std::error::Error, fields: &Fields) {
        ctx.in_scope(|| {
            tracing::error!(target: "viewset", error = %err, fields = %fields, "{}", msg);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_display() {
        let fields = Fields::new().with("name", "index.html").with("autoReload", true);
        assert_eq!(fields.to_string(), "name=index.html autoReload=true");
    }

    #[test]
    fn test_fields_get() {
        let fields = Fields::new().with("layout", "layout.html");
        assert_eq!(fields.get("layout"), Some("layout.html"));
        assert_eq!(fields.get("name"), None);
        assert_eq!(fields.iter().count(), 1);
    }

    #[test]
    fn test_sinks_accept_messages() {
        let span = Span::none();
        let err = std::io::Error::other("boom");
        let fields = Fields::new().with("name", "x");

        for sink in [&NoopLogSink as &dyn LogSink, &TracingLogSink] {
            sink.debug("debug", &fields);
            sink.debug_ctx(&span, "debug ctx", &fields);
            sink.error_ctx(&span, "error ctx", &err, &fields);
        }
    }
}
