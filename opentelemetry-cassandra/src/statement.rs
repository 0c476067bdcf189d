//! The statement shapes a Cassandra session can execute.
//!
//! Only what tracing needs is modelled here: the query text, the keyspace a
//! statement targets and the consistency level it requests. Bound values and
//! paging state stay with the driver.
use std::fmt;
use std::sync::Arc;

/// Consistency level requested for a statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Consistency {
    /// A write must be written to at least one node, hinted handoff included.
    Any,
    /// One replica must respond.
    One,
    /// Two replicas must respond.
    Two,
    /// Three replicas must respond.
    Three,
    /// A quorum of replicas across all datacenters must respond.
    Quorum,
    /// Every replica must respond.
    All,
    /// A quorum of replicas in the local datacenter must respond.
    LocalQuorum,
    /// A quorum of replicas in each datacenter must respond.
    EachQuorum,
    /// Linearizable consistency for lightweight transactions.
    Serial,
    /// Linearizable consistency confined to the local datacenter.
    LocalSerial,
    /// One replica in the local datacenter must respond.
    LocalOne,
}

impl Consistency {
    /// The protocol name of this level, e.g. `LOCAL_QUORUM`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Consistency::Any => "ANY",
            Consistency::One => "ONE",
            Consistency::Two => "TWO",
            Consistency::Three => "THREE",
            Consistency::Quorum => "QUORUM",
            Consistency::All => "ALL",
            Consistency::LocalQuorum => "LOCAL_QUORUM",
            Consistency::EachQuorum => "EACH_QUORUM",
            Consistency::Serial => "SERIAL",
            Consistency::LocalSerial => "LOCAL_SERIAL",
            Consistency::LocalOne => "LOCAL_ONE",
        }
    }
}

impl fmt::Display for Consistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A statement carrying its own literal query text.
#[derive(Clone, Debug, PartialEq)]
pub struct SimpleStatement {
    query_string: String,
    keyspace: Option<String>,
    consistency_level: Option<Consistency>,
}

impl SimpleStatement {
    /// Create a statement from CQL text.
    pub fn new(query_string: impl Into<String>) -> Self {
        SimpleStatement {
            query_string: query_string.into(),
            keyspace: None,
            consistency_level: None,
        }
    }

    /// Target `keyspace` instead of the session's default.
    pub fn with_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    /// Request `consistency` for this statement.
    pub fn with_consistency_level(mut self, consistency: Consistency) -> Self {
        self.consistency_level = Some(consistency);
        self
    }

    /// The CQL text.
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// The keyspace override, if any.
    pub fn keyspace(&self) -> Option<&str> {
        self.keyspace.as_deref()
    }

    /// The requested consistency level, if any.
    pub fn consistency_level(&self) -> Option<Consistency> {
        self.consistency_level
    }
}

/// A statement the cluster has already parsed and assigned an id to.
///
/// Prepared statements are long lived and shared, so they are handed around
/// as `Arc<PreparedStatement>`.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedStatement {
    id: Vec<u8>,
    query_string: String,
    keyspace: Option<String>,
    consistency_level: Option<Consistency>,
}

impl PreparedStatement {
    /// Create a prepared statement from the id the cluster returned and the
    /// text that was prepared.
    pub fn new(id: impl Into<Vec<u8>>, query_string: impl Into<String>) -> Self {
        PreparedStatement {
            id: id.into(),
            query_string: query_string.into(),
            keyspace: None,
            consistency_level: None,
        }
    }

    /// Record the keyspace the statement was prepared against.
    pub fn with_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    /// Default consistency level for executions of this statement.
    pub fn with_consistency_level(mut self, consistency: Consistency) -> Self {
        self.consistency_level = Some(consistency);
        self
    }

    /// The cluster-assigned statement id.
    pub fn id(&self) -> &[u8] {
        &self.id
    }

    /// The prepared CQL text.
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// The keyspace the statement was prepared against, if known.
    pub fn keyspace(&self) -> Option<&str> {
        self.keyspace.as_deref()
    }

    /// The default consistency level, if any.
    pub fn consistency_level(&self) -> Option<Consistency> {
        self.consistency_level
    }
}

/// One execution of a [`PreparedStatement`].
#[derive(Clone, Debug, PartialEq)]
pub struct BoundStatement {
    prepared: Arc<PreparedStatement>,
    keyspace: Option<String>,
    consistency_level: Option<Consistency>,
}

impl BoundStatement {
    /// Bind an execution of `prepared`.
    pub fn new(prepared: Arc<PreparedStatement>) -> Self {
        BoundStatement {
            prepared,
            keyspace: None,
            consistency_level: None,
        }
    }

    /// Override the keyspace of the prepared statement for this execution.
    pub fn with_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    /// Override the consistency level for this execution.
    pub fn with_consistency_level(mut self, consistency: Consistency) -> Self {
        self.consistency_level = Some(consistency);
        self
    }

    /// The statement this execution is bound to.
    pub fn prepared_statement(&self) -> &Arc<PreparedStatement> {
        &self.prepared
    }

    /// The text of the prepared statement.
    pub fn query_string(&self) -> &str {
        self.prepared.query_string()
    }

    /// The execution's keyspace, falling back to the prepared statement's.
    pub fn keyspace(&self) -> Option<&str> {
        self.keyspace.as_deref().or_else(|| self.prepared.keyspace())
    }

    /// The execution's consistency level, falling back to the prepared
    /// statement's.
    pub fn consistency_level(&self) -> Option<Consistency> {
        self.consistency_level
            .or_else(|| self.prepared.consistency_level())
    }
}

/// How the coordinator applies a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BatchType {
    /// Atomic through the batch log.
    #[default]
    Logged,
    /// No batch log; statements may be partially applied.
    Unlogged,
    /// Batch of counter updates.
    Counter,
}

/// Several statements sent as one request.
///
/// A batch has no single query text, so it is never traced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchStatement {
    batch_type: BatchType,
    statements: Vec<Statement>,
    keyspace: Option<String>,
    consistency_level: Option<Consistency>,
}

impl BatchStatement {
    /// Create an empty batch of the given type.
    pub fn new(batch_type: BatchType) -> Self {
        BatchStatement {
            batch_type,
            ..Default::default()
        }
    }

    /// Append a statement to the batch.
    pub fn add_statement(mut self, statement: impl Into<Statement>) -> Self {
        self.statements.push(statement.into());
        self
    }

    /// Target `keyspace` instead of the session's default.
    pub fn with_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    /// Request `consistency` for the whole batch.
    pub fn with_consistency_level(mut self, consistency: Consistency) -> Self {
        self.consistency_level = Some(consistency);
        self
    }

    /// The batch type.
    pub fn batch_type(&self) -> BatchType {
        self.batch_type
    }

    /// The statements in the batch, in execution order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// The keyspace override, if any.
    pub fn keyspace(&self) -> Option<&str> {
        self.keyspace.as_deref()
    }

    /// The requested consistency level, if any.
    pub fn consistency_level(&self) -> Option<Consistency> {
        self.consistency_level
    }
}

/// Anything a session can be asked to execute.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    /// Bare CQL text.
    Raw(String),
    /// CQL text with per-statement options.
    Simple(SimpleStatement),
    /// A prepared statement executed without bound values.
    Prepared(Arc<PreparedStatement>),
    /// A prepared statement executed with bound values.
    Bound(BoundStatement),
    /// A batch of statements.
    Batch(BatchStatement),
}

impl Statement {
    /// The CQL text of the statement.
    ///
    /// Returns `None` for batches, which have no single query text.
    pub fn query_string(&self) -> Option<&str> {
        match self {
            Statement::Raw(query) => Some(query),
            Statement::Simple(statement) => Some(statement.query_string()),
            Statement::Prepared(statement) => Some(statement.query_string()),
            Statement::Bound(statement) => Some(statement.query_string()),
            Statement::Batch(_) => None,
        }
    }

    /// The keyspace the statement targets, when it overrides the session's.
    pub fn keyspace(&self) -> Option<&str> {
        match self {
            Statement::Raw(_) => None,
            Statement::Simple(statement) => statement.keyspace(),
            Statement::Prepared(statement) => statement.keyspace(),
            Statement::Bound(statement) => statement.keyspace(),
            Statement::Batch(statement) => statement.keyspace(),
        }
    }

    /// The consistency level the statement requests, if any.
    pub fn consistency_level(&self) -> Option<Consistency> {
        match self {
            Statement::Raw(_) => None,
            Statement::Simple(statement) => statement.consistency_level(),
            Statement::Prepared(statement) => statement.consistency_level(),
            Statement::Bound(statement) => statement.consistency_level(),
            Statement::Batch(statement) => statement.consistency_level(),
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::Raw(_) => "raw",
            Statement::Simple(_) => "simple",
            Statement::Prepared(_) => "prepared",
            Statement::Bound(_) => "bound",
            Statement::Batch(_) => "batch",
        }
    }
}

impl From<&str> for Statement {
    fn from(query: &str) -> Self {
        Statement::Raw(query.to_owned())
    }
}

impl From<String> for Statement {
    fn from(query: String) -> Self {
        Statement::Raw(query)
    }
}

impl From<SimpleStatement> for Statement {
    fn from(statement: SimpleStatement) -> Self {
        Statement::Simple(statement)
    }
}

impl From<Arc<PreparedStatement>> for Statement {
    fn from(statement: Arc<PreparedStatement>) -> Self {
        Statement::Prepared(statement)
    }
}

impl From<BoundStatement> for Statement {
    fn from(statement: BoundStatement) -> Self {
        Statement::Bound(statement)
    }
}

impl From<BatchStatement> for Statement {
    fn from(statement: BatchStatement) -> Self {
        Statement::Batch(statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared() -> Arc<PreparedStatement> {
        Arc::new(
            PreparedStatement::new(vec![0xca_u8, 0xfe], "SELECT * FROM luthier WHERE name = ?")
                .with_keyspace("test")
                .with_consistency_level(Consistency::One),
        )
    }

    #[test]
    fn query_string_per_variant() {
        let raw = Statement::from("SELECT * FROM luthier");
        assert_eq!(raw.query_string(), Some("SELECT * FROM luthier"));

        let simple = Statement::from(SimpleStatement::new("TRUNCATE luthier"));
        assert_eq!(simple.query_string(), Some("TRUNCATE luthier"));

        let prepared_stmt = Statement::from(prepared());
        assert_eq!(
            prepared_stmt.query_string(),
            Some("SELECT * FROM luthier WHERE name = ?")
        );

        let bound = Statement::from(BoundStatement::new(prepared()));
        assert_eq!(
            bound.query_string(),
            Some("SELECT * FROM luthier WHERE name = ?")
        );
    }

    #[test]
    fn batch_has_no_query_string() {
        let batch = BatchStatement::new(BatchType::Unlogged)
            .add_statement("INSERT INTO luthier (name) VALUES ('Mina')")
            .add_statement("INSERT INTO luthier (name) VALUES ('Tema')")
            .with_keyspace("test");
        assert_eq!(batch.statements().len(), 2);

        let statement = Statement::from(batch);
        assert_eq!(statement.query_string(), None);
        assert_eq!(statement.keyspace(), Some("test"));
        assert_eq!(statement.kind(), "batch");
    }

    #[test]
    fn batch_keeps_statements_in_order() {
        let batch = BatchStatement::new(BatchType::Counter)
            .add_statement(SimpleStatement::new("UPDATE hits SET n = n + 1 WHERE id = 1"))
            .add_statement(BoundStatement::new(prepared()));
        assert_eq!(batch.batch_type(), BatchType::Counter);
        assert_eq!(
            batch
                .statements()
                .iter()
                .map(Statement::kind)
                .collect::<Vec<_>>(),
            vec!["simple", "bound"]
        );
    }

    #[test]
    fn bound_statement_falls_back_to_prepared() {
        let bound = BoundStatement::new(prepared());
        assert_eq!(bound.keyspace(), Some("test"));
        assert_eq!(bound.consistency_level(), Some(Consistency::One));

        let bound = bound
            .with_keyspace("other")
            .with_consistency_level(Consistency::LocalQuorum);
        assert_eq!(bound.keyspace(), Some("other"));
        assert_eq!(bound.consistency_level(), Some(Consistency::LocalQuorum));
    }

    #[test]
    fn raw_text_carries_no_options() {
        let raw = Statement::from(String::from("USE test"));
        assert_eq!(raw.keyspace(), None);
        assert_eq!(raw.consistency_level(), None);
    }

    #[test]
    fn consistency_protocol_names() {
        assert_eq!(Consistency::LocalQuorum.as_str(), "LOCAL_QUORUM");
        assert_eq!(Consistency::EachQuorum.to_string(), "EACH_QUORUM");
        assert_eq!(Consistency::Any.as_str(), "ANY");
    }
}
