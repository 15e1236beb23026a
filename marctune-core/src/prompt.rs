//! Chat prompt templates
//!
//! Templates are TOML documents with a `[prompt].user` text containing
//! `{placeholder}` markers. Built-in templates are embedded at compile time
//! and parsed once.

use crate::error::{CoreError, Result};
use crate::metadata::BookMetadata;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Opens a chat turn
pub const IM_START: &str = "<|im_start|>";
/// Closes a chat turn
pub const IM_END: &str = "<|im_end|>";

/// Built-in template for training examples built from records
pub const TRAINING_TEMPLATE: &str = "ufpr-training";
/// Built-in template for inference requests
pub const INFERENCE_TEMPLATE: &str = "inference";
/// Built-in template for reference document passages
pub const REFERENCE_TEMPLATE: &str = "reference-doc";

/// Placeholder names a template may use
pub const PLACEHOLDERS: &[&str] = &[
    "full_title",
    "author",
    "year",
    "edition",
    "imprint",
    "subjects",
    "document",
];

static BUILTIN_TEMPLATES: OnceLock<HashMap<String, PromptTemplate>> = OnceLock::new();

macro_rules! embed_template {
    ($name:expr, $path:expr) => {
        ($name, include_str!($path))
    };
}

fn load_builtin_templates() -> Result<HashMap<String, PromptTemplate>> {
    let embedded = [
        embed_template!(TRAINING_TEMPLATE, "../configs/templates/ufpr-training.toml"),
        embed_template!(INFERENCE_TEMPLATE, "../configs/templates/inference.toml"),
        embed_template!(REFERENCE_TEMPLATE, "../configs/templates/reference-doc.toml"),
    ];

    let mut templates = HashMap::new();
    for (name, content) in embedded {
        let template = PromptTemplate::from_toml_str(content)?;
        if template.metadata.name != name {
            return Err(CoreError::Template(format!(
                "embedded template name mismatch: expected {}, got {}",
                name, template.metadata.name
            )));
        }
        templates.insert(name.to_string(), template);
    }
    Ok(templates)
}

fn builtin_templates() -> &'static HashMap<String, PromptTemplate> {
    BUILTIN_TEMPLATES
        .get_or_init(|| load_builtin_templates().expect("Failed to load embedded prompt templates"))
}

/// Look up a built-in template by name
pub fn builtin(name: &str) -> Result<&'static PromptTemplate> {
    builtin_templates()
        .get(name)
        .ok_or_else(|| CoreError::UnknownTemplate {
            name: name.to_string(),
        })
}

/// Names of the built-in templates, sorted
pub fn builtin_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = builtin_templates().keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}

/// Template identification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    /// Template name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
}

/// Template text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSection {
    /// Text of the user turn
    pub user: String,
}

/// A chat prompt template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Identification
    pub metadata: TemplateMetadata,
    /// Template text
    pub prompt: PromptSection,
}

/// Values substituted into a template
#[derive(Debug, Clone, Default)]
pub struct TemplateVars<'a> {
    values: HashMap<&'a str, &'a str>,
}

impl<'a> TemplateVars<'a> {
    /// Empty set of values
    pub fn new() -> Self {
        Self::default()
    }

    /// Values taken from catalog metadata
    pub fn from_metadata(metadata: &'a BookMetadata) -> Self {
        let mut vars = Self::new();
        for (name, value) in metadata.placeholders() {
            vars.insert(name, value);
        }
        vars
    }

    /// Values for a reference document passage
    pub fn document(passage: &'a str) -> Self {
        let mut vars = Self::new();
        vars.insert("document", passage);
        vars
    }

    /// Set one value
    pub fn insert(&mut self, name: &'a str, value: &'a str) {
        self.values.insert(name, value);
    }

    /// Value for a placeholder, if set
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.values.get(name).copied()
    }
}

impl PromptTemplate {
    /// Parse and validate a template
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let template: PromptTemplate = toml::from_str(content)
            .map_err(|e| CoreError::Template(format!("failed to parse template: {e}")))?;
        template.validate()?;
        Ok(template)
    }

    /// Check the name and every placeholder
    pub fn validate(&self) -> Result<()> {
        if self.metadata.name.trim().is_empty() {
            return Err(CoreError::Template("template name must not be empty".to_string()));
        }
        if self.prompt.user.trim().is_empty() {
            return Err(CoreError::Template(format!(
                "template '{}' has an empty user prompt",
                self.metadata.name
            )));
        }
        for name in self.placeholders() {
            if !PLACEHOLDERS.contains(&name) {
                return Err(CoreError::Template(format!(
                    "template '{}' uses unknown placeholder {{{}}}",
                    self.metadata.name, name
                )));
            }
        }
        Ok(())
    }

    /// Placeholder names in order of appearance
    pub fn placeholders(&self) -> Vec<&str> {
        let text = self.prompt.user.as_str();
        placeholder_spans(text)
            .into_iter()
            .map(|(start, end)| &text[start + 1..end - 1])
            .collect()
    }

    /// User turn with placeholders substituted; unset values render empty
    pub fn render_user(&self, vars: &TemplateVars<'_>) -> String {
        let text = self.prompt.user.as_str();
        let mut out = String::with_capacity(text.len() + 256);
        let mut last = 0;
        for (start, end) in placeholder_spans(text) {
            out.push_str(&text[last..start]);
            out.push_str(vars.get(&text[start + 1..end - 1]).unwrap_or(""));
            last = end;
        }
        out.push_str(&text[last..]);
        out
    }

    /// Complete training text: user turn followed by the assistant answer
    pub fn render_example(&self, vars: &TemplateVars<'_>, answer: &str) -> String {
        format!(
            "{IM_START}user\n{}\n{IM_END}\n{IM_START}assistant\n{}\n{IM_END}",
            self.render_user(vars),
            answer.trim_end()
        )
    }

    /// Inference request: user turn followed by an open assistant turn
    pub fn render_request(&self, vars: &TemplateVars<'_>) -> String {
        format!(
            "{IM_START}user\n{}\n{IM_END}\n{IM_START}assistant\n",
            self.render_user(vars)
        )
    }
}

/// Byte spans of `{name}` markers, braces included
fn placeholder_spans(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('{') {
        let start = pos + offset;
        let name_len = bytes[start + 1..]
            .iter()
            .take_while(|b| b.is_ascii_lowercase() || **b == b'_')
            .count();
        let close = start + 1 + name_len;

        if name_len > 0 && bytes.get(close) == Some(&b'}') {
            spans.push((start, close + 1));
            pos = close + 1;
        } else {
            pos = start + 1;
        }
    }

    spans
}
