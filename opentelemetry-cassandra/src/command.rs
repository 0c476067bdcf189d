//! CQL command classification.
//!
//! Spans carry a coarse `command` attribute derived from the leading keywords
//! of the query text. This is a prefix match, not a CQL parser.

/// Number of leading characters of a query inspected by [`classify`].
const CLASSIFY_PREFIX_CHARS: usize = 30;

/// Command keywords recognised by [`classify`], in scan order.
pub const CQL_COMMANDS: &[&str] = &[
    "SELECT",
    "INSERT",
    "UPDATE",
    "DELETE",
    "CREATE KEYSPACE",
    "BATCH",
    "ALTER KEYSPACE",
    "ALTER MATERIALIZED VIEW",
    "ALTER ROLE",
    "ALTER TABLE",
    "ALTER TYPE",
    "ALTER USER",
    "CREATE AGGREGATE",
    "CREATE INDEX",
    "CREATE FUNCTION",
    "CREATE MATERIALIZED VIEW",
    "CREATE TABLE",
    "CREATE TRIGGER",
    "CREATE TYPE",
    "CREATE ROLE",
    "CREATE USER",
    "DROP AGGREGATE",
    "DROP FUNCTION",
    "DROP INDEX",
    "DROP KEYSPACE",
    "DROP MATERIALIZED VIEW",
    "DROP ROLE",
    "DROP TABLE",
    "DROP TRIGGER",
    "DROP TYPE",
    "DROP USER",
    "GRANT",
    "LIST PERMISSIONS",
    "LIST ROLES",
    "LIST USERS",
    "REVOKE",
    "TRUNCATE",
    "USE",
];

/// Returns the CQL command keyword a query starts with, if any.
///
/// Only the first 30 characters of `query` are considered, compared
/// case-insensitively against [`CQL_COMMANDS`] in declaration order. The first
/// keyword that prefixes the text wins.
///
/// # Examples
///
/// ```
/// use opentelemetry_cassandra::classify;
///
/// assert_eq!(classify("select * from luthier"), Some("SELECT"));
/// assert_eq!(classify("CREATE TABLE test.painter (name text PRIMARY KEY)"), Some("CREATE TABLE"));
/// assert_eq!(classify("PAGING OFF"), None);
/// ```
pub fn classify(query: &str) -> Option<&'static str> {
    let head: String = query
        .chars()
        .take(CLASSIFY_PREFIX_CHARS)
        .flat_map(char::to_uppercase)
        .collect();

    CQL_COMMANDS
        .iter()
        .copied()
        .find(|command| head.starts_with(command))
}
