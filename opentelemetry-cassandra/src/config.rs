use opentelemetry::KeyValue;
use std::borrow::Cow;

/// Span name used unless configured otherwise.
pub const DEFAULT_SPAN_NAME: &str = "execute";

/// Naming policy and static attributes applied to every query span.
///
/// The configuration is fixed once the tracing hook is built.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Config {
    /// Attributes added to every span, after the query attributes.
    ///
    /// A static attribute whose key matches a query attribute (for example
    /// `db.statement`) replaces it.
    pub span_tags: Vec<KeyValue>,

    /// Prefix joined to the span name as `"{prefix}: {name}"`.
    pub prefix: Option<Cow<'static, str>>,

    /// Fixed span name, ignored when `use_query_as_span_name` is set.
    pub span_name: Cow<'static, str>,

    /// Name spans after the query text instead of `span_name`.
    pub use_query_as_span_name: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            span_tags: Vec::new(),
            prefix: None,
            span_name: Cow::Borrowed(DEFAULT_SPAN_NAME),
            use_query_as_span_name: false,
        }
    }
}

impl Config {
    /// The span name for a query with text `query`.
    pub fn span_name(&self, query: &str) -> String {
        let name = if self.use_query_as_span_name {
            query
        } else {
            &*self.span_name
        };

        match &self.prefix {
            Some(prefix) => format!("{prefix}: {name}"),
            None => name.to_string(),
        }
    }
}
