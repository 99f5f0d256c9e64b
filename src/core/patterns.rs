//! Reusable prompt patterns (`{{var}}` placeholders) and the builtin library.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{LabError, LabResult};
use crate::core::template::Vars;

/// A reusable prompt engineering pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPattern
{
    pub name: String,
    pub description: String,
    /// Template text with `{{variable}}` placeholders
    pub template: String,
    /// Variables that must be bound to render
    pub variables: Vec<String>,
    pub tags: Vec<String>,
    pub example_input: IndexMap<String, String>,
    pub example_output: String,
}

impl PromptPattern
{
    /// Substitute `{{key}}` for every binding; declared variables must all be bound.
    pub fn render(
        &self,
        vars: &Vars,
    ) -> LabResult<String>
    {
        let missing: Vec<String> = self
            .variables
            .iter()
            .filter(|v| !vars.contains_key(*v))
            .cloned()
            .collect();
        if !missing.is_empty()
        {
            return Err(LabError::MissingVariables(missing));
        }

        Ok(substitute(&self.template, vars.iter()))
    }

    /// Render with the built-in example input (raw template when none)
    pub fn render_example(&self) -> LabResult<String>
    {
        if self.example_input.is_empty()
        {
            return Ok(self.template.clone());
        }

        let vars: Vars = self
            .example_input
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self.render(&vars)
    }

    pub fn has_tag(
        &self,
        tag: &str,
    ) -> bool
    {
        self.tags.iter().any(|t| t == tag)
    }
}

fn substitute<'a>(
    template: &str,
    vars: impl Iterator<Item = (&'a String, &'a String)>,
) -> String
{
    let mut out = template.to_string();

    for (key, value) in vars
    {
        out = out.replace(&format!("{{{{{key}}}}}"), value);
    }

    out
}

/// Compact constructor for the builtin table
fn pattern(
    name: &str,
    description: &str,
    template: &str,
    tags: &[&str],
    example_input: &[(&str, &str)],
    example_output: &str,
) -> PromptPattern
{
    PromptPattern {
        name: name.to_string(),
        description: description.to_string(),
        template: template.to_string(),
        variables: example_input
            .iter()
            .map(|(k, _)| k.to_string())
            .collect(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        example_input: example_input
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        example_output: example_output.to_string(),
    }
}

fn builtin_patterns() -> Vec<PromptPattern>
{
    vec![
        pattern(
            "chain_of_thought",
            "Step-by-step reasoning for complex problems",
            "Think through this step by step.\n\nProblem: {{problem}}\n\nLet's work through this:\nStep 1:",
            &["reasoning", "analysis"],
            &[(
                "problem",
                "If a store has 3 shelves with 8 items each, and 5 items are sold, how many remain?",
            )],
            "Step 1: Calculate total items: 3 x 8 = 24\nStep 2: Subtract sold: 24 - 5 = 19\nAnswer: 19 items remain.",
        ),
        pattern(
            "few_shot",
            "Learning from examples before the actual task",
            "Here are some examples:\n\n{{examples}}\n\nNow do the same for:\n{{input}}",
            &["learning", "examples"],
            &[
                ("examples", "Input: happy -> Output: positive\nInput: angry -> Output: negative"),
                ("input", "excited"),
            ],
            "positive",
        ),
        pattern(
            "structured_output",
            "Request output in a specific format (JSON, table, etc.)",
            "{{task}}\n\nRespond in the following format:\n{{format}}\n\nInput: {{input}}",
            &["formatting", "structured"],
            &[
                ("task", "Extract contact information"),
                ("format", r#"{"name": "...", "email": "...", "phone": "..."}"#),
                ("input", "John Smith, jsmith@example.com, 555-0100"),
            ],
            r#"{"name": "John Smith", "email": "jsmith@example.com", "phone": "555-0100"}"#,
        ),
        pattern(
            "role_play",
            "Assign a specific role/persona to the LLM",
            "You are {{role}}. {{context}}\n\n{{task}}",
            &["persona", "role"],
            &[
                ("role", "a senior Python developer"),
                ("context", "You specialize in writing clean, testable code."),
                ("task", "Review this function for improvements."),
            ],
            "As a senior Python developer, I'd suggest...",
        ),
        pattern(
            "tool_use",
            "Instruct the LLM to use available tools/functions",
            "You have access to these tools:\n{{tools}}\n\nTo use a tool, write: TOOL: tool_name(args)\n\nTask: {{task}}",
            &["tools", "function_calling"],
            &[
                ("tools", "- search(query): Search the web\n- calculate(expr): Evaluate math"),
                ("task", "What is the population of France times 2?"),
            ],
            "TOOL: search(population of France)\nResult: 67.75 million\nTOOL: calculate(67750000 * 2)\nResult: 135,500,000",
        ),
        pattern(
            "self_consistency",
            "Generate multiple answers and select the most common",
            "Answer this question {{num_attempts}} different ways, then select the most consistent answer.\n\nQuestion: {{question}}\n\nAttempt 1:",
            &["reliability", "consistency"],
            &[("num_attempts", "3"), ("question", "Is a tomato a fruit or vegetable?")],
            "Attempt 1: Fruit (botanically)\nAttempt 2: Fruit\nAttempt 3: Fruit (berry)\nConsensus: Fruit",
        ),
        pattern(
            "rag",
            "Retrieval-Augmented Generation with context grounding",
            "Answer the question based ONLY on the provided context. If the context doesn't contain the answer, say so.\n\nContext:\n{{context}}\n\nQuestion: {{question}}\n\nAnswer:",
            &["retrieval", "grounding"],
            &[
                (
                    "context",
                    "The Eiffel Tower was built in 1889 for the World's Fair. It is 330 meters tall.",
                ),
                ("question", "When was the Eiffel Tower built?"),
            ],
            "The Eiffel Tower was built in 1889 for the World's Fair.",
        ),
        pattern(
            "decomposition",
            "Break complex tasks into subtasks",
            "Break this complex task into smaller subtasks, then solve each one.\n\nTask: {{task}}\n\nSubtasks:\n1.",
            &["decomposition", "planning"],
            &[("task", "Plan a company offsite for 50 people")],
            "1. Determine budget\n2. Choose dates\n3. Find venue\n4. Plan activities\n5. Arrange catering",
        ),
    ]
}

/// Pattern store seeded with the eight builtins
#[derive(Debug, Clone)]
pub struct PatternLibrary
{
    patterns: IndexMap<String, PromptPattern>,
}

impl Default for PatternLibrary
{
    fn default() -> Self
    {
        Self::with_builtins()
    }
}

impl PatternLibrary
{
    pub fn with_builtins() -> Self
    {
        let patterns = builtin_patterns()
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();

        Self { patterns }
    }

    pub fn get(
        &self,
        name: &str,
    ) -> LabResult<&PromptPattern>
    {
        self.patterns
            .get(name)
            .ok_or_else(|| LabError::not_found("pattern", name, self.patterns.keys()))
    }

    /// All patterns in registration order
    pub fn list(&self) -> Vec<&PromptPattern>
    {
        self.patterns.values().collect()
    }

    pub fn search(
        &self,
        tag: &str,
    ) -> Vec<&PromptPattern>
    {
        self.patterns
            .values()
            .filter(|p| p.has_tag(tag))
            .collect()
    }

    pub fn register(
        &mut self,
        pattern: PromptPattern,
    )
    {
        self.patterns
            .insert(pattern.name.clone(), pattern);
    }

    pub fn names(&self) -> Vec<&str>
    {
        self.patterns
            .keys()
            .map(String::as_str)
            .collect()
    }
}
