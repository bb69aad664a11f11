// ABOUTME: Typed description of the audit knowledge graph's labels and relationship types.
// ABOUTME: Rendered into the system prompt and the query_graph tool description.

/// A node label and the properties queries may rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeType {
    pub label: &'static str,
    pub gloss: &'static str,
    pub properties: &'static [&'static str],
}

/// A directed relationship type between two labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeType {
    pub from: &'static str,
    pub kind: &'static str,
    pub to: &'static str,
    pub gloss: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphSchema {
    pub nodes: &'static [NodeType],
    pub edges: &'static [EdgeType],
}

/// Risks, controls, evidence documents, and the standards that require them.
pub const AUDIT_SCHEMA: GraphSchema = GraphSchema {
    nodes: &[
        NodeType {
            label: "Risk",
            gloss: "风险",
            properties: &["id", "title", "severity", "status", "description"],
        },
        NodeType {
            label: "Control",
            gloss: "控制",
            properties: &["id", "label", "type"],
        },
        NodeType {
            label: "Document",
            gloss: "文档",
            properties: &["id", "label", "type"],
        },
        NodeType {
            label: "Standard",
            gloss: "标准",
            properties: &["id", "label"],
        },
    ],
    edges: &[
        EdgeType {
            from: "Control",
            kind: "MITIGATES",
            to: "Risk",
            gloss: "控制 缓解 风险",
        },
        EdgeType {
            from: "Standard",
            kind: "CONTAINS",
            to: "Control",
            gloss: "标准 包含 控制",
        },
        EdgeType {
            from: "Control",
            kind: "EVIDENCED_BY",
            to: "Document",
            gloss: "控制 由...证明",
        },
        EdgeType {
            from: "Control",
            kind: "REQUIRES",
            to: "Control",
            gloss: "控制 需要 控制",
        },
    ],
};

impl NodeType {
    fn describe(&self) -> String {
        format!("{} ({}): {}", self.label, self.gloss, self.properties.join(", "))
    }
}

impl EdgeType {
    /// Cypher pattern, e.g. `(:Control)-[:MITIGATES]->(:Risk)`.
    pub fn pattern(&self) -> String {
        format!("(:{})-[:{}]->(:{})", self.from, self.kind, self.to)
    }
}

impl GraphSchema {
    pub fn node(&self, label: &str) -> Option<&NodeType> {
        self.nodes.iter().find(|n| n.label == label)
    }

    /// Nested markdown list of labels, then relationship patterns.
    pub fn overview(&self) -> String {
        let mut lines = vec!["- 节点:".to_string()];
        lines.extend(self.nodes.iter().map(|n| format!("  - {}", n.describe())));
        lines.push("- 关系:".to_string());
        lines.extend(
            self.edges
                .iter()
                .map(|e| format!("  - {} ({})", e.pattern(), e.gloss)),
        );
        lines.join("\n")
    }
}
