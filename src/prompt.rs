// ABOUTME: System prompt for audit runs: assistant persona, graph schema section, local notes.
// ABOUTME: The schema section is rendered from the typed schema and the mutation keyword list.

use std::fs;
use std::path::Path;

use crate::approval::MUTATION_KEYWORDS;
use crate::config::Config;
use crate::graph::{AUDIT_SCHEMA, GraphSchema};

const DEFAULT_PERSONA: &str = include_str!("prompts/assistant.md");

/// The replaceable parts of the system prompt, in prompt order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptLayer {
    Persona,
    Schema,
    Local,
}

impl PromptLayer {
    pub fn file_name(self) -> &'static str {
        match self {
            PromptLayer::Persona => "assistant.md",
            PromptLayer::Schema => "schema.md",
            PromptLayer::Local => ".auditgraph.md",
        }
    }
}

/// Trimmed file contents; missing, unreadable, or blank files yield None.
fn read_layer(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let trimmed = content.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// The schema section: label and relationship overview plus the read-only rule.
pub fn schema_section(schema: &GraphSchema) -> String {
    format!(
        "# 知识图谱 Schema\n\n{}\n\n只允许只读查询 (MATCH ... RETURN ...)。包含 {} 的查询会被拒绝。",
        schema.overview(),
        MUTATION_KEYWORDS.join("、")
    )
}

#[derive(Debug, Clone)]
pub struct SystemPromptBuilder {
    persona: String,
    schema: String,
    local: Option<String>,
}

impl SystemPromptBuilder {
    pub fn new() -> Self {
        Self::for_schema(&AUDIT_SCHEMA)
    }

    pub fn for_schema(schema: &GraphSchema) -> Self {
        Self {
            persona: DEFAULT_PERSONA.trim().to_string(),
            schema: schema_section(schema),
            local: None,
        }
    }

    /// Replace one layer. Blank text clears it.
    pub fn set(&mut self, layer: PromptLayer, text: impl Into<String>) -> &mut Self {
        let text = text.into().trim().to_string();
        match layer {
            PromptLayer::Persona => self.persona = text,
            PromptLayer::Schema => self.schema = text,
            PromptLayer::Local => self.local = (!text.is_empty()).then_some(text),
        }
        self
    }

    /// Persona and schema overrides from `dir`, when present and non-blank.
    pub fn load_overrides_from(&mut self, dir: &Path) -> &mut Self {
        for layer in [PromptLayer::Persona, PromptLayer::Schema] {
            if let Some(text) = read_layer(&dir.join(layer.file_name())) {
                self.set(layer, text);
            }
        }
        self
    }

    pub fn load_overrides(&mut self) -> &mut Self {
        self.load_overrides_from(&Config::base_dir())
    }

    /// Project notes from `.auditgraph.md` in `dir`.
    pub fn load_local_from(&mut self, dir: &Path) -> &mut Self {
        self.local = read_layer(&dir.join(PromptLayer::Local.file_name()));
        self
    }

    pub fn load_local(&mut self) -> &mut Self {
        self.load_local_from(Path::new("."))
    }

    pub fn build(&self) -> String {
        [Some(&self.persona), Some(&self.schema), self.local.as_ref()]
            .into_iter()
            .flatten()
            .filter(|layer| !layer.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl Default for SystemPromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}
