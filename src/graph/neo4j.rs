// ABOUTME: Neo4j client over the HTTP transactional endpoint.
// ABOUTME: One pooled reqwest client per store; each query is an auto-commit transaction.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::GraphConfig;
use crate::error::GraphError;
use crate::graph::{GraphStore, Params, Row};

/// Graph store backed by a Neo4j server's HTTP API.
#[derive(Debug, Clone)]
pub struct Neo4jHttpStore {
    http: reqwest::Client,
    commit_url: String,
    username: String,
    password: String,
}

#[derive(Serialize)]
struct CommitRequest<'a> {
    statements: [Statement<'a>; 1],
}

#[derive(Serialize)]
struct Statement<'a> {
    statement: &'a str,
    parameters: &'a Params,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<Neo4jError>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<RowData>,
}

#[derive(Debug, Deserialize)]
struct RowData {
    #[serde(default)]
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Neo4jError {
    code: String,
    message: String,
}

impl Neo4jHttpStore {
    /// Build a store from config. No connection is made until the first query.
    pub fn new(config: &GraphConfig) -> Result<Self, GraphError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;
        let commit_url = commit_url(&config.uri, &config.database);
        info!(url = %commit_url, "configured Neo4j HTTP store");
        Ok(Self {
            http,
            commit_url,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

fn commit_url(uri: &str, database: &str) -> String {
    format!("{}/db/{}/tx/commit", uri.trim_end_matches('/'), database)
}

/// Zip each row with the column names, mirroring a driver record's `data()`.
fn rows_from_response(response: CommitResponse) -> Result<Vec<Row>, GraphError> {
    if let Some(err) = response.errors.into_iter().next() {
        return Err(GraphError::Query {
            code: err.code,
            message: err.message,
        });
    }
    let Some(result) = response.results.into_iter().next() else {
        return Ok(Vec::new());
    };
    let rows = result
        .data
        .into_iter()
        .map(|data| {
            result
                .columns
                .iter()
                .cloned()
                .zip(data.row)
                .collect::<Row>()
        })
        .collect();
    Ok(rows)
}

#[async_trait]
impl GraphStore for Neo4jHttpStore {
    async fn execute(&self, query: &str, params: &Params) -> Result<Vec<Row>, GraphError> {
        debug!(query, "executing graph query");
        let body = CommitRequest {
            statements: [Statement {
                statement: query,
                parameters: params,
            }],
        };
        let response = self
            .http
            .post(&self.commit_url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "graph store rejected request");
            return Err(GraphError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CommitResponse = response.json().await?;
        let rows = rows_from_response(parsed)?;
        debug!(rows = rows.len(), "graph query returned");
        Ok(rows)
    }
}
