//! Prompt techniques that wrap an existing prompt.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// A transformation applied to a finished prompt
pub trait Technique
{
    /// Short identifier shown in reports
    fn name(&self) -> &'static str;

    fn apply(
        &self,
        prompt: &str,
    ) -> String;
}

/// Prefix the prompt with a reasoning cue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainOfThought
{
    pub prefix: String,
    pub suffix: String,
}

impl Default for ChainOfThought
{
    fn default() -> Self
    {
        Self { prefix: "Let's think step by step.".to_string(), suffix: String::new() }
    }
}

impl Technique for ChainOfThought
{
    fn name(&self) -> &'static str
    {
        "cot"
    }

    fn apply(
        &self,
        prompt: &str,
    ) -> String
    {
        let mut parts = vec![self.prefix.as_str(), prompt];
        if !self.suffix.is_empty()
        {
            parts.push(&self.suffix);
        }

        parts.join("\n\n")
    }
}

/// One input/output demonstration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example
{
    pub input: String,
    pub output: String,
}

/// Prepend worked examples to the prompt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FewShot
{
    pub examples: Vec<Example>,
}

impl FewShot
{
    pub fn new(examples: Vec<Example>) -> Self
    {
        Self { examples }
    }

    pub fn add_example(
        &mut self,
        input: impl Into<String>,
        output: impl Into<String>,
    )
    {
        self.examples.push(Example { input: input.into(), output: output.into() });
    }

    /// Up to `n` distinct examples; all of them when `n` covers the set
    pub fn select_random<R: Rng + ?Sized>(
        &self,
        n: usize,
        rng: &mut R,
    ) -> Vec<Example>
    {
        if n >= self.examples.len()
        {
            return self.examples.clone();
        }

        self.examples
            .choose_multiple(rng, n)
            .cloned()
            .collect()
    }

    /// Apply using a random subset of `n` examples
    pub fn apply_sampled<R: Rng + ?Sized>(
        &self,
        prompt: &str,
        n: usize,
        rng: &mut R,
    ) -> String
    {
        let chosen = self.select_random(n, rng);
        render_examples(&chosen, prompt)
    }
}

fn render_examples(
    examples: &[Example],
    prompt: &str,
) -> String
{
    if examples.is_empty()
    {
        return prompt.to_string();
    }

    let body = examples
        .iter()
        .enumerate()
        .map(|(i, ex)| format!("Example {}:\nInput: {}\nOutput: {}", i + 1, ex.input, ex.output))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{body}\n\nNow, {prompt}")
}

impl Technique for FewShot
{
    fn name(&self) -> &'static str
    {
        "few-shot"
    }

    fn apply(
        &self,
        prompt: &str,
    ) -> String
    {
        render_examples(&self.examples, prompt)
    }
}

/// Give the model a persona
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePlay
{
    pub role: String,
    pub expertise: String,
    pub tone: String,
}

impl RolePlay
{
    pub fn new(
        role: impl Into<String>,
        expertise: impl Into<String>,
    ) -> Self
    {
        Self { role: role.into(), expertise: expertise.into(), tone: "professional".to_string() }
    }
}

impl Technique for RolePlay
{
    fn name(&self) -> &'static str
    {
        "role"
    }

    fn apply(
        &self,
        prompt: &str,
    ) -> String
    {
        format!(
            "You are a {} with expertise in {}. Respond in a {} tone.\n\n{}",
            self.role, self.expertise, self.tone, prompt
        )
    }
}

/// Generate, critique, refine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfRefine
{
    pub critique_prompt: String,
    pub refine_prompt: String,
}

impl Default for SelfRefine
{
    fn default() -> Self
    {
        Self {
            critique_prompt: "Review the above response and identify areas for improvement."
                .to_string(),
            refine_prompt: "Improve the response based on the critique above.".to_string(),
        }
    }
}

impl SelfRefine
{
    /// The three prompts of the refinement loop, in order
    pub fn refinement_chain(
        &self,
        original: &str,
    ) -> Vec<String>
    {
        vec![original.to_string(), self.critique_prompt.clone(), self.refine_prompt.clone()]
    }
}

impl Technique for SelfRefine
{
    fn name(&self) -> &'static str
    {
        "self-refine"
    }

    fn apply(
        &self,
        prompt: &str,
    ) -> String
    {
        format!(
            "Step 1 - Generate:\n{prompt}\n\nStep 2 - Critique:\n{}\n\nStep 3 - Refine:\n{}",
            self.critique_prompt, self.refine_prompt
        )
    }
}

/// Ask the model to write a prompt for a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaPrompt
{
    pub target_task: String,
    pub constraints: Vec<String>,
}

impl Technique for MetaPrompt
{
    fn name(&self) -> &'static str
    {
        "meta"
    }

    fn apply(
        &self,
        requirements: &str,
    ) -> String
    {
        let mut out = format!(
            "Create a detailed prompt for the following task: {}\n\nRequirements:\n{}\n\n",
            self.target_task, requirements
        );

        if !self.constraints.is_empty()
        {
            out.push_str("Constraints:\n");
            for (i, c) in self
                .constraints
                .iter()
                .enumerate()
            {
                out.push_str(&format!("{}. {}\n", i + 1, c));
            }
        }

        out.push_str(
            "\nThe generated prompt should be clear, specific, and include examples where appropriate.",
        );
        out
    }
}
