//! Attribute keys and values recorded on query spans.
//!
//! The names follow the OpenTracing database conventions so that existing
//! dashboards keep working; they must not be renamed.
use opentelemetry::Key;

/// Database family. Always [`DB_TYPE_CASSANDRA`].
pub const DB_TYPE: Key = Key::from_static_str("db.type");

/// Instrumentation component. Always [`COMPONENT_CASSANDRA_DRIVER`].
pub const COMPONENT: Key = Key::from_static_str("component");

/// Keyspace the query ran against.
pub const DB_INSTANCE: Key = Key::from_static_str("db.instance");

/// The CQL text of the query.
pub const DB_STATEMENT: Key = Key::from_static_str("db.statement");

/// Leading CQL command keyword, see [`classify`](crate::classify).
pub const COMMAND: Key = Key::from_static_str("command");

/// Whether more result pages were pending when the request started.
pub const PAGINATED: Key = Key::from_static_str("paginated");

/// Consistency level requested by the statement.
pub const CONSISTENCY_LEVEL: Key = Key::from_static_str("consistency_level");

/// Seconds between span start and completion, as a float.
pub const REPORTED_DURATION: Key = Key::from_static_str("reported_duration");

/// Set to `true` when the query failed.
pub const ERROR: Key = Key::from_static_str("error");

/// Name of the span event recorded for a failed query.
pub const ERROR_EVENT_NAME: &str = "error";

/// Event attribute naming the event kind. Always `"error"`.
pub const EVENT: Key = Key::from_static_str("event");

/// Event attribute holding the rendered error.
pub const ERROR_OBJECT: Key = Key::from_static_str("error.object");

/// Value of [`DB_TYPE`].
pub const DB_TYPE_CASSANDRA: &str = "cassandra";

/// Value of [`COMPONENT`].
pub const COMPONENT_CASSANDRA_DRIVER: &str = "cassandra-driver";
