#![allow(dead_code)]

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{Key, Value};
use opentelemetry_cassandra::{
    ListenerId, ListenerRegistry, QueryError, RequestInitListener, ResponseFuture, Session,
    Statement,
};
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracer, SdkTracerProvider, SpanData};
use std::sync::{Arc, Mutex};

/// In-process stand-in for a driver session: notifies listeners, then lets
/// the test decide how each request completes.
#[derive(Debug, Default)]
pub struct TestSession {
    keyspace: Mutex<Option<String>>,
    listeners: ListenerRegistry,
}

impl TestSession {
    pub fn connect(keyspace: Option<&str>) -> Arc<Self> {
        Arc::new(TestSession {
            keyspace: Mutex::new(keyspace.map(str::to_owned)),
            listeners: ListenerRegistry::new(),
        })
    }

    pub fn set_keyspace(&self, keyspace: &str) {
        *self.keyspace.lock().unwrap() = Some(keyspace.to_owned());
    }

    /// Starts a request without completing it.
    pub fn start(&self, statement: impl Into<Statement>) -> Arc<ResponseFuture> {
        self.start_paged(statement, false)
    }

    /// Starts a request that reports `has_more_pages` to listeners.
    pub fn start_paged(
        &self,
        statement: impl Into<Statement>,
        has_more_pages: bool,
    ) -> Arc<ResponseFuture> {
        let future = Arc::new(ResponseFuture::new(statement));
        future.set_has_more_pages(has_more_pages);
        self.listeners.notify(&*future);
        future
    }

    pub fn execute(&self, statement: impl Into<Statement>) {
        self.start(statement).set_result();
    }

    pub fn execute_err(&self, statement: impl Into<Statement>, err: QueryError) {
        self.start(statement).set_error(err);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Session for TestSession {
    fn keyspace(&self) -> Option<String> {
        self.keyspace.lock().unwrap().clone()
    }

    fn add_request_init_listener(&self, listener: RequestInitListener) -> ListenerId {
        self.listeners.register(listener)
    }

    fn remove_request_init_listener(&self, id: ListenerId) -> bool {
        self.listeners.unregister(id)
    }
}

pub fn test_tracer() -> (SdkTracerProvider, InMemorySpanExporter, SdkTracer) {
    let exporter = InMemorySpanExporter::default();
    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    let tracer = provider.tracer("opentelemetry-cassandra-test");
    (provider, exporter, tracer)
}

pub fn attribute<'a>(span: &'a SpanData, key: &str) -> Option<&'a Value> {
    let key = Key::from(key.to_owned());
    span.attributes
        .iter()
        .find(|kv| kv.key == key)
        .map(|kv| &kv.value)
}

pub fn assert_query_attributes(span: &SpanData, keyspace: &str, statement: &str, command: &str) {
    assert_eq!(attribute(span, "db.type"), Some(&Value::from("cassandra")));
    assert_eq!(
        attribute(span, "component"),
        Some(&Value::from("cassandra-driver"))
    );
    assert_eq!(
        attribute(span, "db.instance"),
        Some(&Value::from(keyspace.to_owned()))
    );
    assert_eq!(
        attribute(span, "db.statement"),
        Some(&Value::from(statement.to_owned()))
    );
    assert_eq!(attribute(span, "command"), Some(&Value::from(command.to_owned())));
    assert_eq!(attribute(span, "paginated"), Some(&Value::Bool(false)));
    match attribute(span, "reported_duration") {
        Some(Value::F64(duration)) => assert!(*duration >= 0.0),
        other => panic!("reported_duration should be a float, got {other:?}"),
    }
}
