//! # OpenTelemetry Cassandra
//!
//! Distributed tracing for Cassandra driver sessions.
//!
//! [`QueryTracing`] subscribes to a session's request-init listeners and
//! records one client span per request, nested under whatever span is active
//! when the request is issued. Each span carries the keyspace, the CQL text,
//! the leading CQL command, the requested consistency level and, once the
//! request completes, its duration and outcome.
//!
//! The driver side is described by two small contracts:
//!
//! * [`Session`] - lets listeners subscribe to requests and exposes the
//!   default keyspace. [`ListenerRegistry`] implements the bookkeeping.
//! * [`RequestLifecycle`] - one in-flight request, exposing its [`Statement`]
//!   and accepting completion callbacks. [`ResponseFuture`] implements it.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use opentelemetry_cassandra::{QueryTracing, Session};
//!
//! fn instrument<S: Session>(session: &Arc<S>) {
//!     let _tracing = QueryTracing::builder(session)
//!         .with_query_as_span_name(true)
//!         .build();
//!     // every statement executed on `session` is now traced
//! }
//! ```
//!
//! ## Span attributes
//!
//! | key                 | value                                            |
//! |---------------------|--------------------------------------------------|
//! | `db.type`           | `"cassandra"`                                    |
//! | `component`         | `"cassandra-driver"`                             |
//! | `db.instance`       | statement keyspace, else the session keyspace    |
//! | `db.statement`      | CQL text                                         |
//! | `command`           | leading CQL keyword, see [`classify`]            |
//! | `paginated`         | whether more pages were pending                  |
//! | `consistency_level` | requested consistency, when set                  |
//! | `reported_duration` | seconds from start to completion                 |
//! | `error`             | `true` when the request failed                   |
//!
//! Failed requests also get an `error` event carrying `event` and
//! `error.object` attributes, and an error status.
//!
//! ## Crate Feature Flags
//!
//! * `internal-logs` (enabled by default): emit internal diagnostics through
//!   `tracing`.
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![cfg_attr(docsrs, feature(doc_cfg), deny(rustdoc::broken_intra_doc_links))]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/open-telemetry/opentelemetry-rust/main/assets/logo.svg"
)]

mod command;
mod config;
mod error;
mod lifecycle;
mod query_tracing;
mod session;
mod statement;
pub mod tags;

pub use command::{classify, CQL_COMMANDS};
pub use config::{Config, DEFAULT_SPAN_NAME};
pub use error::{ErrorCode, QueryError};
pub use lifecycle::{
    ErrorCallback, RequestError, RequestLifecycle, ResponseFuture, SuccessCallback,
};
pub use query_tracing::{QueryTracing, QueryTracingBuilder};
pub use session::{ListenerId, ListenerRegistry, RequestInitListener, Session};
pub use statement::{
    BatchStatement, BatchType, BoundStatement, Consistency, PreparedStatement, SimpleStatement,
    Statement,
};
