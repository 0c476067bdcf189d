mod common;

use common::{assert_query_attributes, TestSession};
use opentelemetry::global;
use opentelemetry_cassandra::QueryTracing;
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider};

// Kept in its own test binary: it installs the process-wide provider.
#[test]
fn default_tracer_comes_from_global_provider() {
    let exporter = InMemorySpanExporter::default();
    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    global::set_tracer_provider(provider.clone());

    let session = TestSession::connect(Some("test"));
    let tracing = QueryTracing::new(&session);
    assert!(tracing.is_attached());
    assert_eq!(tracing.config().span_name("SELECT 1"), "execute");

    session.execute("SELECT * FROM luthier");

    let spans = exporter.get_finished_spans().unwrap();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].instrumentation_scope.name(), "opentelemetry-cassandra");
    assert_eq!(
        spans[0].instrumentation_scope.version(),
        Some(env!("CARGO_PKG_VERSION"))
    );
    assert_query_attributes(&spans[0], "test", "SELECT * FROM luthier", "SELECT");

    provider.shutdown().unwrap();
}
