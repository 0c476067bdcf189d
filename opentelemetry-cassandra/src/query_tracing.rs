use crate::command::classify;
use crate::config::Config;
use crate::lifecycle::{ErrorCallback, RequestError, RequestLifecycle, SuccessCallback};
use crate::session::{ListenerId, RequestInitListener, Session};
use crate::tags;
use opentelemetry::global::{self, BoxedTracer};
use opentelemetry::trace::{Span, SpanKind, Status, Tracer};
use opentelemetry::{otel_debug, otel_warn, Context, InstrumentationScope, KeyValue};
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::SystemTime;

/// Traces every request executed on a Cassandra [`Session`].
///
/// Building a `QueryTracing` subscribes it to the session's request-init
/// listeners. From then on each request whose query text is known gets a
/// client span, nested under the span active when the request starts, which
/// is finished when the request succeeds or fails. Batches have no single
/// query text and are not traced.
///
/// The session is held weakly; the subscription lasts until
/// [`detach`](QueryTracing::detach) is called or the session goes away.
/// Dropping the `QueryTracing` does not unsubscribe.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use opentelemetry::KeyValue;
/// use opentelemetry_cassandra::{QueryTracing, Session};
///
/// fn instrument<S: Session>(session: &Arc<S>) -> QueryTracing<S> {
///     QueryTracing::builder(session)
///         .with_prefix("cassandra")
///         .with_span_tags([KeyValue::new("peer.service", "inventory")])
///         .build()
/// }
/// ```
pub struct QueryTracing<S, T = BoxedTracer> {
    inner: Arc<QueryTracer<T>>,
    session: Weak<S>,
    listener: Option<ListenerId>,
}

impl<S: Session> QueryTracing<S> {
    /// Trace `session` with the default configuration and the global tracer.
    pub fn new(session: &Arc<S>) -> Self {
        Self::builder(session).build()
    }

    /// Configure tracing for `session`.
    ///
    /// Unless [`with_tracer`](QueryTracingBuilder::with_tracer) is used, the
    /// tracer is taken from the global tracer provider now, not per request.
    pub fn builder(session: &Arc<S>) -> QueryTracingBuilder<S> {
        QueryTracingBuilder {
            session: Arc::clone(session),
            tracer: default_tracer(),
            config: Config::default(),
        }
    }
}

impl<S, T> QueryTracing<S, T>
where
    S: Session,
    T: Tracer + Send + Sync + 'static,
    T::Span: Send + 'static,
{
    fn attach(session: &Arc<S>, tracer: T, config: Config) -> Self {
        let inner = Arc::new(QueryTracer { tracer, config });
        let weak_session = Arc::downgrade(session);

        let listener: RequestInitListener = {
            let inner = Arc::clone(&inner);
            let session = weak_session.clone();
            Arc::new(move |request: &dyn RequestLifecycle| {
                inner.on_request(request, || {
                    session.upgrade().and_then(|session| session.keyspace())
                })
            })
        };
        let id = session.add_request_init_listener(listener);
        otel_debug!(name: "QueryTracing.Attached");

        QueryTracing {
            inner,
            session: weak_session,
            listener: Some(id),
        }
    }
}

impl<S: Session, T> QueryTracing<S, T> {
    /// The configuration spans are built with.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// The tracer spans are started on.
    pub fn tracer(&self) -> &T {
        &self.inner.tracer
    }

    /// Whether the hook is still subscribed to the session.
    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }

    /// Unsubscribe from the session. Requests already in flight still finish
    /// their spans.
    ///
    /// Returns `true` if the session held the subscription.
    pub fn detach(&mut self) -> bool {
        let Some(id) = self.listener.take() else {
            return false;
        };
        let removed = self
            .session
            .upgrade()
            .is_some_and(|session| session.remove_request_init_listener(id));
        otel_debug!(name: "QueryTracing.Detached", removed = removed);
        removed
    }
}

impl<S, T> fmt::Debug for QueryTracing<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryTracing")
            .field("config", &self.inner.config)
            .field("listener", &self.listener)
            .finish()
    }
}

/// Builder for [`QueryTracing`].
pub struct QueryTracingBuilder<S, T = BoxedTracer> {
    session: Arc<S>,
    tracer: T,
    config: Config,
}

impl<S: Session, T> QueryTracingBuilder<S, T> {
    /// Start spans on `tracer` instead of the global tracer.
    pub fn with_tracer<U: Tracer>(self, tracer: U) -> QueryTracingBuilder<S, U> {
        QueryTracingBuilder {
            session: self.session,
            tracer,
            config: self.config,
        }
    }

    /// Add attributes recorded on every span.
    pub fn with_span_tags<I>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = KeyValue>,
    {
        self.config.span_tags.extend(tags);
        self
    }

    /// Add one attribute recorded on every span.
    pub fn with_span_tag(mut self, tag: KeyValue) -> Self {
        self.config.span_tags.push(tag);
        self
    }

    /// Prefix span names as `"{prefix}: {name}"`.
    pub fn with_prefix(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.config.prefix = Some(prefix.into());
        self
    }

    /// Use `name` for spans instead of `"execute"`.
    pub fn with_span_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.config.span_name = name.into();
        self
    }

    /// Name spans after the query text. The prefix, if any, still applies.
    pub fn with_query_as_span_name(mut self, enabled: bool) -> Self {
        self.config.use_query_as_span_name = enabled;
        self
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }
}

impl<S, T> QueryTracingBuilder<S, T>
where
    S: Session,
    T: Tracer + Send + Sync + 'static,
    T::Span: Send + 'static,
{
    /// Subscribe to the session and return the running hook.
    pub fn build(self) -> QueryTracing<S, T> {
        QueryTracing::attach(&self.session, self.tracer, self.config)
    }
}

impl<S, T> fmt::Debug for QueryTracingBuilder<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryTracingBuilder")
            .field("config", &self.config)
            .finish()
    }
}

fn default_tracer() -> BoxedTracer {
    let scope = InstrumentationScope::builder(env!("CARGO_PKG_NAME"))
        .with_version(env!("CARGO_PKG_VERSION"))
        .build();
    global::tracer_with_scope(scope)
}

struct QueryTracer<T> {
    tracer: T,
    config: Config,
}

impl<T> QueryTracer<T>
where
    T: Tracer,
    T::Span: Send + 'static,
{
    fn on_request<K>(&self, request: &dyn RequestLifecycle, session_keyspace: K)
    where
        K: FnOnce() -> Option<String>,
    {
        let statement = request.query();
        let Some(query) = statement.query_string() else {
            otel_debug!(name: "QueryTracing.StatementSkipped", kind = statement.kind());
            return;
        };

        let mut attributes = vec![
            KeyValue::new(tags::DB_TYPE, tags::DB_TYPE_CASSANDRA),
            KeyValue::new(tags::COMPONENT, tags::COMPONENT_CASSANDRA_DRIVER),
        ];
        // attributes cannot be null, so an unknown keyspace is left out
        if let Some(keyspace) = statement
            .keyspace()
            .map(str::to_owned)
            .or_else(session_keyspace)
        {
            attributes.push(KeyValue::new(tags::DB_INSTANCE, keyspace));
        }
        attributes.push(KeyValue::new(tags::DB_STATEMENT, query.to_owned()));
        if let Some(command) = classify(query) {
            attributes.push(KeyValue::new(tags::COMMAND, command));
        }
        attributes.push(KeyValue::new(tags::PAGINATED, request.has_more_pages()));
        if let Some(consistency) = statement.consistency_level() {
            attributes.push(KeyValue::new(tags::CONSISTENCY_LEVEL, consistency.as_str()));
        }
        merge_span_tags(&mut attributes, &self.config.span_tags);

        let start_time = SystemTime::now();
        let builder = self
            .tracer
            .span_builder(self.config.span_name(query))
            .with_kind(SpanKind::Client)
            .with_start_time(start_time)
            .with_attributes(attributes);
        let span = Context::map_current(|cx| self.tracer.build_with_context(builder, cx));

        let in_flight = Arc::new(InFlightQuery {
            span: Mutex::new(Some(span)),
            start_time,
        });
        let on_success: SuccessCallback = {
            let in_flight = Arc::clone(&in_flight);
            Box::new(move || in_flight.succeed())
        };
        let on_error: ErrorCallback = Box::new(move |err: &RequestError| in_flight.fail(err));
        request.add_callbacks(on_success, on_error);
    }
}

/// Static tags replace query attributes with the same key.
fn merge_span_tags(attributes: &mut Vec<KeyValue>, span_tags: &[KeyValue]) {
    for tag in span_tags {
        match attributes.iter_mut().find(|kv| kv.key == tag.key) {
            Some(existing) => existing.value = tag.value.clone(),
            None => attributes.push(tag.clone()),
        }
    }
}

/// The span of one request, shared by its two completion callbacks. Whichever
/// callback takes the span first finishes it.
struct InFlightQuery<S> {
    span: Mutex<Option<S>>,
    start_time: SystemTime,
}

impl<S: Span> InFlightQuery<S> {
    fn take_span(&self) -> Option<S> {
        let span = self
            .span
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if span.is_none() {
            otel_warn!(
                name: "QueryTracing.DuplicateCompletion",
                message = "Request completed more than once; its span was already finished."
            );
        }
        span
    }

    fn succeed(&self) {
        if let Some(span) = self.take_span() {
            self.finish(span);
        }
    }

    fn fail(&self, err: &RequestError) {
        let Some(mut span) = self.take_span() else {
            return;
        };
        let message = err.to_string();
        span.set_attribute(KeyValue::new(tags::ERROR, true));
        span.add_event(
            tags::ERROR_EVENT_NAME,
            vec![
                KeyValue::new(tags::EVENT, tags::ERROR_EVENT_NAME),
                KeyValue::new(tags::ERROR_OBJECT, message.clone()),
            ],
        );
        span.set_status(Status::error(message));
        self.finish(span);
    }

    fn finish(&self, mut span: S) {
        let end_time = SystemTime::now();
        let duration = end_time
            .duration_since(self.start_time)
            .unwrap_or_default();
        span.set_attribute(KeyValue::new(
            tags::REPORTED_DURATION,
            duration.as_secs_f64(),
        ));
        span.end_with_timestamp(end_time);
    }
}
