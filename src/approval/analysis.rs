// ABOUTME: Graph query analysis: detects write clauses in free-text Cypher.
// ABOUTME: Matching is a case-insensitive substring scan, so any keyword occurrence counts.

/// Keywords whose presence anywhere in a query marks it as mutating.
pub const MUTATION_KEYWORDS: &[&str] = &["DELETE", "CREATE", "MERGE", "SET"];

/// The result of analyzing a query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryAnalysis {
    /// Mutation keywords found, in `MUTATION_KEYWORDS` order.
    pub mutations: Vec<&'static str>,
    /// True when no mutation keyword occurs.
    pub read_only: bool,
}

/// List every mutation keyword that occurs in `query`, ignoring case.
///
/// This deliberately over-matches: `OFFSET` or a property named `asset`
/// contain `SET` and are refused too.
pub fn find_mutations(query: &str) -> Vec<&'static str> {
    let upper = query.to_uppercase();
    MUTATION_KEYWORDS
        .iter()
        .copied()
        .filter(|kw| upper.contains(kw))
        .collect()
}

/// Analyze a query for mutation keywords.
pub fn analyze_query(query: &str) -> QueryAnalysis {
    let mutations = find_mutations(query);
    QueryAnalysis {
        read_only: mutations.is_empty(),
        mutations,
    }
}
