//! `{name}`-style prompt templates, sequential chains and a named registry.

use std::collections::HashMap;
use std::sync::LazyLock;

use indexmap::IndexMap;
use itertools::Itertools;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::core::error::{LabError, LabResult};

/// Single-brace placeholder
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("static placeholder regex compiles"));

/// Variable bindings for rendering
pub type Vars = HashMap<String, String>;

/// Names of the builtin templates
pub const BUILTIN_TEMPLATES: [&str; 4] = ["summarize", "extract", "analyze", "compare"];

/// A prompt template with `{variable}` placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate
{
    pub name: String,
    pub template: String,
}

impl PromptTemplate
{
    pub fn new(
        name: impl Into<String>,
        template: impl Into<String>,
    ) -> Self
    {
        Self { name: name.into(), template: template.into() }
    }

    /// Placeholder names, unique, in order of first appearance
    pub fn variables(&self) -> Vec<String>
    {
        PLACEHOLDER_RE
            .captures_iter(&self.template)
            .map(|c| c[1].to_string())
            .unique()
            .collect()
    }

    /// Substitute every placeholder; fails listing all unbound names.
    pub fn render(
        &self,
        vars: &Vars,
    ) -> LabResult<String>
    {
        let missing: Vec<String> = self
            .variables()
            .into_iter()
            .filter(|v| !vars.contains_key(v))
            .collect();
        if !missing.is_empty()
        {
            return Err(LabError::MissingVariables(missing));
        }

        let out = PLACEHOLDER_RE.replace_all(&self.template, |c: &Captures<'_>| {
            vars.get(&c[1])
                .cloned()
                .unwrap_or_default()
        });

        Ok(out.into_owned())
    }
}

/// Templates rendered in sequence, each seeing the previous outputs
#[derive(Debug, Clone, Default)]
pub struct PromptChain
{
    pub templates: Vec<PromptTemplate>,
}

impl PromptChain
{
    pub fn new(templates: Vec<PromptTemplate>) -> Self
    {
        Self { templates }
    }

    /// Render every step; later steps may use `previous_output` and `step_<i>_output`.
    pub fn run(
        &self,
        initial: &Vars,
    ) -> LabResult<Vec<String>>
    {
        let mut vars = initial.clone();
        let mut outputs = Vec::with_capacity(self.templates.len());

        for (i, template) in self
            .templates
            .iter()
            .enumerate()
        {
            let rendered = template.render(&vars)?;
            vars.insert("previous_output".to_string(), rendered.clone());
            vars.insert(format!("step_{i}_output"), rendered.clone());
            outputs.push(rendered);
        }

        Ok(outputs)
    }
}

/// Named template store seeded with builtins
#[derive(Debug, Clone)]
pub struct TemplateRegistry
{
    templates: IndexMap<String, PromptTemplate>,
}

impl Default for TemplateRegistry
{
    fn default() -> Self
    {
        Self::with_builtins()
    }
}

impl TemplateRegistry
{
    /// Registry holding no templates
    pub fn empty() -> Self
    {
        Self { templates: IndexMap::new() }
    }

    pub fn with_builtins() -> Self
    {
        let mut reg = Self::empty();

        for t in [
            PromptTemplate::new(
                "summarize",
                "Summarize the following text in {word_count} words or less:\n\n{text}",
            ),
            PromptTemplate::new("extract", "Extract {entity_type} from the following text:\n\n{text}"),
            PromptTemplate::new(
                "analyze",
                "Analyze the following {content_type} and provide insights on {aspect}:\n\n{content}",
            ),
            PromptTemplate::new("compare", "Compare {item_a} and {item_b} in terms of {criteria}."),
        ]
        {
            reg.register(t);
        }

        reg
    }

    /// Add or replace a template by name
    pub fn register(
        &mut self,
        template: PromptTemplate,
    )
    {
        self.templates
            .insert(template.name.clone(), template);
    }

    pub fn get(
        &self,
        name: &str,
    ) -> LabResult<&PromptTemplate>
    {
        self.templates
            .get(name)
            .ok_or_else(|| LabError::not_found("template", name, self.names()))
    }

    /// Builtin lookup; custom registrations under other names are rejected
    pub fn builtin(
        &self,
        name: &str,
    ) -> LabResult<&PromptTemplate>
    {
        if !BUILTIN_TEMPLATES.contains(&name)
        {
            return Err(LabError::not_found("builtin template", name, BUILTIN_TEMPLATES));
        }

        self.get(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String>
    {
        self.templates
            .keys()
            .sorted()
            .cloned()
            .collect()
    }
}

/// Parse `key=value` pairs into bindings
pub fn parse_vars<S: AsRef<str>>(pairs: &[S]) -> LabResult<Vars>
{
    pairs
        .iter()
        .map(|p| {
            let p = p.as_ref();
            p.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .ok_or_else(|| {
                    LabError::invalid(format!("invalid variable '{p}', expected key=value"))
                })
        })
        .collect()
}
