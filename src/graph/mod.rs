// ABOUTME: Graph store boundary: the single query-execution capability the assistant needs.
// ABOUTME: Neo4j over HTTP is the production backend; tests plug in in-memory stores.

pub mod neo4j;
pub mod schema;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::GraphError;

pub use neo4j::Neo4jHttpStore;
pub use schema::{AUDIT_SCHEMA, GraphSchema};

/// One result row: returned column name to value.
pub type Row = Map<String, Value>;

/// Query parameters bound by name.
pub type Params = Map<String, Value>;

/// Executes graph queries. Implementations must tolerate concurrent calls
/// from independent runs.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn execute(&self, query: &str, params: &Params) -> Result<Vec<Row>, GraphError>;
}
