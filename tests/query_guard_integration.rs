// ABOUTME: Integration tests for read-only gating of graph queries.
// ABOUTME: Covers the full path: registry dispatch -> tool gate -> analysis -> store.

mod common;

use std::sync::Arc;
use std::time::Duration;

use auditgraph::agent::ToolArguments;
use auditgraph::app::App;
use auditgraph::approval::{GateOutcome, MUTATION_KEYWORDS, analyze_query};
use auditgraph::tools::query_graph::READ_ONLY_REFUSAL;

use common::FakeStore;

fn args(query: &str) -> ToolArguments {
    let mut map = ToolArguments::new();
    map.insert("query".into(), serde_json::json!(query));
    map
}

/// Registry dispatch of a read-only query reaches the store and returns rows as JSON.
#[tokio::test]
async fn read_only_query_dispatches_to_store() {
    let store = Arc::new(FakeStore::with_titles(&["Vendor lock-in"]));
    let registry = App::build_registry(store.clone());

    let result = registry
        .dispatch(
            "query_graph",
            args("MATCH (c:Control)-[:MITIGATES]->(r:Risk {id: 'R-001'}) RETURN c.label"),
            Duration::from_secs(1),
        )
        .await;

    assert!(!result.is_error);
    assert_eq!(result.content, r#"[{"r.title":"Vendor lock-in"}]"#);
    assert_eq!(store.queries().len(), 1);
}

/// Every keyword, in lower, upper, and mixed case, is refused at the gate.
#[tokio::test]
async fn every_mutation_keyword_is_refused_in_any_case() {
    let store = Arc::new(FakeStore::default());
    let registry = App::build_registry(store.clone());
    let tool = registry.get("query_graph").unwrap();

    for kw in MUTATION_KEYWORDS {
        let variants = [kw.to_lowercase(), kw.to_string(), mixed_case(kw)];
        for variant in variants {
            let query = format!("MATCH (n) {} n", variant);
            assert_eq!(
                tool.check(&args(&query)),
                GateOutcome::deny(READ_ONLY_REFUSAL),
                "{} should be refused",
                query
            );
            let result = registry
                .dispatch("query_graph", args(&query), Duration::from_secs(1))
                .await;
            assert_eq!(result.content, READ_ONLY_REFUSAL);
        }
    }
    assert!(store.queries().is_empty());
}

#[test]
fn analysis_reports_all_found_keywords() {
    let analysis = analyze_query("MATCH (a) DETACH DELETE a CREATE (b)");
    assert!(!analysis.read_only);
    assert_eq!(analysis.mutations, vec!["DELETE", "CREATE"]);
}

fn mixed_case(s: &str) -> String {
    s.chars()
        .enumerate()
        .map(|(i, c)| {
            if i % 2 == 0 {
                c.to_ascii_lowercase()
            } else {
                c.to_ascii_uppercase()
            }
        })
        .collect()
}
