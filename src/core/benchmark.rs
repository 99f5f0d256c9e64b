//! Pattern benchmarks over mock outputs.
//!
//! Nothing here calls a model: every task carries the output to score, so runs
//! are reproducible apart from the measured render latency.

use std::time::Instant;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::core::categories::TaskExample;
use crate::core::error::LabResult;
use crate::core::evaluator::{Evaluator, QualityReport, QualityRequest, round4};
use crate::core::patterns::PromptPattern;
use crate::core::template::Vars;

/// One pattern scored on one task
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult
{
    pub pattern_name: String,
    pub task_name: String,
    pub rendered_prompt: String,
    pub mock_output: String,
    pub evaluation: QualityReport,
    pub latency_ms: f64,
}

/// Per-pattern averages
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatternSummary
{
    pub avg_faithfulness: f64,
    pub avg_relevance: f64,
    pub avg_completeness: f64,
    pub avg_overall: f64,
    pub avg_latency_ms: f64,
    pub num_tasks: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport
{
    pub results: Vec<BenchmarkResult>,
    /// Pattern with the highest positive average overall
    pub best_pattern: Option<String>,
    pub best_overall: f64,
    pub summary: IndexMap<String, PatternSummary>,
}

/// A benchmark task; per-pattern entries override the defaults
#[derive(Debug, Clone, Default)]
pub struct BenchmarkTask
{
    pub name: String,
    pub variables: IndexMap<String, Vars>,
    pub default_variables: Vars,
    pub mock_outputs: IndexMap<String, String>,
    pub default_output: String,
    pub context: String,
    pub query: String,
    pub expected_topics: Vec<String>,
}

impl BenchmarkTask
{
    /// Task from a catalog example, binding each pattern's variables.
    ///
    /// A variable named `context` takes the example context when present;
    /// every other variable takes the example input.
    pub fn from_example(
        example: &TaskExample,
        patterns: &[&PromptPattern],
    ) -> Self
    {
        let variables = patterns
            .iter()
            .map(|p| {
                let vars = p
                    .variables
                    .iter()
                    .map(|v| {
                        let value = if v == "context" && !example.context.is_empty()
                        {
                            &example.context
                        }
                        else
                        {
                            &example.input_text
                        };
                        (v.clone(), value.clone())
                    })
                    .collect();
                (p.name.clone(), vars)
            })
            .collect();

        Self {
            name: example.name.clone(),
            variables,
            default_output: example.expected_output.clone(),
            context: example.context.clone(),
            query: example.input_text.clone(),
            expected_topics: example.expected_topics.clone(),
            ..Self::default()
        }
    }

    fn variables_for(
        &self,
        pattern: &str,
    ) -> &Vars
    {
        self.variables
            .get(pattern)
            .unwrap_or(&self.default_variables)
    }

    fn output_for(
        &self,
        pattern: &str,
    ) -> &str
    {
        self.mock_outputs
            .get(pattern)
            .unwrap_or(&self.default_output)
    }
}

/// Runs patterns against tasks with a fixed evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct BenchmarkRunner
{
    evaluator: Evaluator,
}

impl BenchmarkRunner
{
    pub fn new(evaluator: Evaluator) -> Self
    {
        Self { evaluator }
    }

    /// Render one pattern and score the mock output.
    ///
    /// The rendered prompt stands in for the query when `query` is empty.
    #[allow(clippy::too_many_arguments)]
    pub fn run_single(
        &self,
        pattern: &PromptPattern,
        task_name: &str,
        vars: &Vars,
        mock_output: &str,
        context: &str,
        query: &str,
        expected_topics: &[String],
    ) -> LabResult<BenchmarkResult>
    {
        let start = Instant::now();
        let rendered = pattern.render(vars)?;
        let elapsed = start.elapsed().as_secs_f64() * 1000.0;

        let query = if query.is_empty() { rendered.as_str() } else { query };
        let evaluation = self.evaluator.evaluate_quality(
            &QualityRequest::new(mock_output)
                .query(query)
                .context(context)
                .topics(expected_topics),
        );

        Ok(BenchmarkResult {
            pattern_name: pattern.name.clone(),
            task_name: task_name.to_string(),
            rendered_prompt: rendered,
            mock_output: mock_output.to_string(),
            evaluation,
            latency_ms: round3(elapsed),
        })
    }

    /// Every pattern on every task, then per-pattern averages.
    ///
    /// Pairs with no bound variables or a failed render are skipped.
    #[instrument(level = "debug", skip_all, fields(patterns = patterns.len(), tasks = tasks.len()))]
    pub fn run_comparison(
        &self,
        patterns: &[&PromptPattern],
        tasks: &[BenchmarkTask],
    ) -> BenchmarkReport
    {
        let pairs: Vec<(&BenchmarkTask, &PromptPattern)> = tasks
            .iter()
            .flat_map(|t| patterns.iter().map(move |p| (t, *p)))
            .collect();

        let results: Vec<BenchmarkResult> = pairs
            .par_iter()
            .filter_map(|(task, pattern)| {
                let vars = task.variables_for(&pattern.name);
                if vars.is_empty()
                {
                    return None;
                }

                match self.run_single(
                    pattern,
                    &task.name,
                    vars,
                    task.output_for(&pattern.name),
                    &task.context,
                    &task.query,
                    &task.expected_topics,
                )
                {
                    Ok(r) => Some(r),
                    Err(e) =>
                    {
                        debug!(pattern = %pattern.name, task = %task.name, error = %e, "skipped");
                        None
                    }
                }
            })
            .collect();

        let summary = summarize(&results);

        let mut best_pattern = None;
        let mut best_overall = 0.0;
        for (name, s) in &summary
        {
            if s.avg_overall > best_overall
            {
                best_overall = s.avg_overall;
                best_pattern = Some(name.clone());
            }
        }

        BenchmarkReport { results, best_pattern, best_overall: round4(best_overall), summary }
    }
}

fn round3(x: f64) -> f64
{
    (x * 1000.0).round() / 1000.0
}

fn summarize(results: &[BenchmarkResult]) -> IndexMap<String, PatternSummary>
{
    let mut groups: IndexMap<&str, Vec<&BenchmarkResult>> = IndexMap::new();
    for r in results
    {
        groups
            .entry(r.pattern_name.as_str())
            .or_default()
            .push(r);
    }

    groups
        .into_iter()
        .map(|(name, group)| {
            let n = group.len() as f64;
            let avg = |f: fn(&BenchmarkResult) -> f64| group.iter().map(|r| f(r)).sum::<f64>() / n;

            let summary = PatternSummary {
                avg_faithfulness: round4(avg(|r| r.evaluation.faithfulness)),
                avg_relevance: round4(avg(|r| r.evaluation.relevance)),
                avg_completeness: round4(avg(|r| r.evaluation.completeness)),
                avg_overall: round4(avg(|r| r.evaluation.overall)),
                avg_latency_ms: round3(avg(|r| r.latency_ms)),
                num_tasks: group.len(),
            };
            (name.to_string(), summary)
        })
        .collect()
}
