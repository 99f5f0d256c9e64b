//! Business task categories with sample tasks for benchmarking.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{LabError, LabResult};

/// A sample task within a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskExample
{
    pub name: String,
    pub input_text: String,
    pub expected_output: String,
    pub expected_topics: Vec<String>,
    pub context: String,
}

impl TaskExample
{
    fn new(
        name: &str,
        input_text: &str,
        expected_output: &str,
        topics: &[&str],
        context: &str,
    ) -> Self
    {
        Self {
            name: name.to_string(),
            input_text: input_text.to_string(),
            expected_output: expected_output.to_string(),
            expected_topics: topics.iter().map(|t| t.to_string()).collect(),
            context: context.to_string(),
        }
    }
}

/// A business category with sample tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCategory
{
    pub name: String,
    pub description: String,
    pub examples: Vec<TaskExample>,
    pub recommended_patterns: Vec<String>,
}

impl TaskCategory
{
    fn new(
        name: &str,
        description: &str,
        recommended: &[&str],
        examples: Vec<TaskExample>,
    ) -> Self
    {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            examples,
            recommended_patterns: recommended.iter().map(|p| p.to_string()).collect(),
        }
    }
}

fn builtin_categories() -> Vec<TaskCategory>
{
    vec![
        TaskCategory::new(
            "classification",
            "Categorize text into predefined classes",
            &["few_shot", "chain_of_thought"],
            vec![
                TaskExample::new(
                    "sentiment_analysis",
                    "The product quality is amazing but shipping was slow.",
                    "mixed",
                    &["sentiment", "positive", "negative"],
                    "",
                ),
                TaskExample::new(
                    "ticket_routing",
                    "I can't log in to my account. Password reset isn't working.",
                    "authentication",
                    &["category", "authentication"],
                    "",
                ),
            ],
        ),
        TaskCategory::new(
            "extraction",
            "Extract structured data from unstructured text",
            &["structured_output", "few_shot"],
            vec![
                TaskExample::new(
                    "contact_extraction",
                    "Call John at 555-0123 or email john@example.com",
                    r#"{"name": "John", "phone": "555-0123", "email": "john@example.com"}"#,
                    &["name", "phone", "email"],
                    "",
                ),
                TaskExample::new(
                    "date_extraction",
                    "The meeting is scheduled for March 15, 2026 at 2pm EST.",
                    r#"{"date": "2026-03-15", "time": "14:00", "timezone": "EST"}"#,
                    &["date", "time"],
                    "",
                ),
            ],
        ),
        TaskCategory::new(
            "generation",
            "Generate creative or business content",
            &["role_play", "structured_output"],
            vec![TaskExample::new(
                "email_draft",
                "Write a follow-up email after a sales call about our SaaS product.",
                "Thank you for taking the time...",
                &["follow-up", "meeting", "next steps"],
                "",
            )],
        ),
        TaskCategory::new(
            "summarization",
            "Condense long text into key points",
            &["chain_of_thought", "decomposition"],
            vec![TaskExample::new(
                "article_summary",
                "A long article about renewable energy trends in 2026, covering solar, wind, and battery storage innovations.",
                "Key renewable energy trends include solar cost reduction, offshore wind expansion, and improved battery storage.",
                &["solar", "wind", "battery"],
                "Renewable energy article content here.",
            )],
        ),
        TaskCategory::new(
            "qa",
            "Answer questions from provided context",
            &["rag", "chain_of_thought"],
            vec![TaskExample::new(
                "policy_qa",
                "What is the return policy for electronics?",
                "Electronics can be returned within 30 days with original receipt.",
                &["return", "days", "receipt"],
                "Our return policy: Electronics 30 days with receipt. Clothing 60 days. No returns on sale items.",
            )],
        ),
        TaskCategory::new(
            "analysis",
            "Analyze data, trends, or complex scenarios",
            &["chain_of_thought", "decomposition"],
            vec![TaskExample::new(
                "market_analysis",
                "Analyze the competitive landscape for AI coding assistants.",
                "The AI coding assistant market features several established competitors and fast-moving trends...",
                &["competitors", "market", "trends"],
                "",
            )],
        ),
        TaskCategory::new(
            "transformation",
            "Transform data between formats or styles",
            &["structured_output", "few_shot"],
            vec![TaskExample::new(
                "csv_to_json",
                "name,age,city\nAlice,30,NYC\nBob,25,LA",
                r#"[{"name": "Alice", "age": 30, "city": "NYC"}, {"name": "Bob", "age": 25, "city": "LA"}]"#,
                &["name", "age", "city"],
                "",
            )],
        ),
    ]
}

/// Category store seeded with the seven builtins
#[derive(Debug, Clone)]
pub struct CategoryRegistry
{
    categories: IndexMap<String, TaskCategory>,
}

impl Default for CategoryRegistry
{
    fn default() -> Self
    {
        Self::with_builtins()
    }
}

impl CategoryRegistry
{
    pub fn with_builtins() -> Self
    {
        let categories = builtin_categories()
            .into_iter()
            .map(|c| (c.name.clone(), c))
            .collect();

        Self { categories }
    }

    pub fn get(
        &self,
        name: &str,
    ) -> LabResult<&TaskCategory>
    {
        self.categories
            .get(name)
            .ok_or_else(|| LabError::not_found("category", name, self.categories.keys()))
    }

    pub fn list(&self) -> Vec<&TaskCategory>
    {
        self.categories.values().collect()
    }

    pub fn names(&self) -> Vec<&str>
    {
        self.categories
            .keys()
            .map(String::as_str)
            .collect()
    }

    pub fn examples(
        &self,
        name: &str,
    ) -> LabResult<&[TaskExample]>
    {
        self.get(name)
            .map(|c| c.examples.as_slice())
    }

    pub fn register(
        &mut self,
        category: TaskCategory,
    )
    {
        self.categories
            .insert(category.name.clone(), category);
    }
}
