//! Markdown renderers for evaluation, A/B, optimizer, benchmark and cost results.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::core::ab_test::SignificanceResult;
use crate::core::benchmark::BenchmarkReport;
use crate::core::cost::CostEstimate;
use crate::core::evaluator::{EvaluationReport, QualityReport};
use crate::core::optimizer::OptimizationTrace;

fn markdown<T: Tabled>(rows: impl IntoIterator<Item = T>) -> String
{
    Table::new(rows)
        .with(Style::markdown())
        .to_string()
}

fn f4(x: f64) -> String
{
    format!("{x:.4}")
}

#[derive(Tabled)]
struct OverlapRow
{
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Precision")]
    precision: String,
    #[tabled(rename = "Recall")]
    recall: String,
    #[tabled(rename = "F1")]
    f1: String,
}

pub fn evaluation_table(report: &EvaluationReport) -> String
{
    let rows = report.rouge.iter().map(|(name, s)| OverlapRow {
        metric: name.clone(),
        precision: f4(s.precision),
        recall: f4(s.recall),
        f1: f4(s.f1),
    });

    format!(
        "# Evaluation\n\n{}\n\n**Similarity**: {:.4}\n**Efficiency**: {:.4}\n**Overall**: {:.4}",
        markdown(rows),
        report.similarity,
        report.efficiency,
        report.overall
    )
}

#[derive(Tabled)]
struct ValueRow
{
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

pub fn quality_table(report: &QualityReport) -> String
{
    let rows = [
        ("faithfulness", report.faithfulness),
        ("relevance", report.relevance),
        ("completeness", report.completeness),
        ("overall", report.overall),
    ]
    .map(|(metric, v)| ValueRow { metric, value: f4(v) });

    markdown(rows)
}

#[derive(Tabled)]
struct VariantRow
{
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Variant A")]
    a: String,
    #[tabled(rename = "Variant B")]
    b: String,
}

pub fn ab_test_report(result: &SignificanceResult) -> String
{
    let (a, b) = (&result.variant_a, &result.variant_b);
    let rows = [
        VariantRow { metric: "Mean", a: f4(a.mean), b: f4(b.mean) },
        VariantRow { metric: "Std Dev", a: f4(a.std), b: f4(b.std) },
        VariantRow { metric: "N", a: a.n.to_string(), b: b.n.to_string() },
    ];

    let mut lines = vec![
        "# A/B Test Results".to_string(),
        String::new(),
        format!("**Variant A**: {} (n={})", a.name, a.n),
        format!("**Variant B**: {} (n={})", b.name, b.n),
        String::new(),
        markdown(rows),
        String::new(),
        format!("**Z-Score**: {:.4}", result.z_score),
        format!("**P-Value**: {:.6}", result.p_value),
        format!("**Significant**: {}", if result.is_significant { "Yes" } else { "No" }),
        format!("**Winner**: {}", result.winner),
        format!("**Effect Size**: {:.4}", result.effect_size),
    ];
    if result.lift > 0.0
    {
        lines.push(format!("**Lift**: {:.2}%", result.lift));
    }

    lines.join("\n")
}

#[derive(Tabled)]
struct TraceRow
{
    #[tabled(rename = "Iteration")]
    iteration: usize,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Candidate")]
    candidate: String,
}

pub fn optimization_report(trace: &OptimizationTrace) -> String
{
    let rows = trace.history.iter().map(|e| TraceRow {
        iteration: e.iteration,
        score: f4(e.score),
        candidate: e.candidate.replace('\n', " "),
    });

    format!(
        "# Optimization\n\n{}\n\n**Best Score**: {:.4}\n**Improvement**: {:.2}%\n**Best Candidate**: {}",
        markdown(rows),
        trace.best_score,
        trace.improvement_pct,
        trace.best_candidate
    )
}

#[derive(Tabled)]
struct BenchmarkRow
{
    #[tabled(rename = "Pattern")]
    pattern: String,
    #[tabled(rename = "Task")]
    task: String,
    #[tabled(rename = "Faithfulness")]
    faithfulness: String,
    #[tabled(rename = "Relevance")]
    relevance: String,
    #[tabled(rename = "Completeness")]
    completeness: String,
    #[tabled(rename = "Overall")]
    overall: String,
    #[tabled(rename = "Latency (ms)")]
    latency: String,
}

pub fn benchmark_table(report: &BenchmarkReport) -> String
{
    let rows = report.results.iter().map(|r| BenchmarkRow {
        pattern: r.pattern_name.clone(),
        task: r.task_name.clone(),
        faithfulness: f4(r.evaluation.faithfulness),
        relevance: f4(r.evaluation.relevance),
        completeness: f4(r.evaluation.completeness),
        overall: f4(r.evaluation.overall),
        latency: format!("{:.1}", r.latency_ms),
    });

    let best = match &report.best_pattern
    {
        Some(name) => format!("**Best Pattern**: {name} (overall: {:.4})", report.best_overall),
        None => "**Best Pattern**: none".to_string(),
    };

    format!("# Benchmark Results\n\n{}\n\n{best}", markdown(rows))
}

#[derive(Tabled)]
struct SummaryRow
{
    #[tabled(rename = "Pattern")]
    pattern: String,
    #[tabled(rename = "Avg Faith.")]
    faithfulness: String,
    #[tabled(rename = "Avg Relev.")]
    relevance: String,
    #[tabled(rename = "Avg Compl.")]
    completeness: String,
    #[tabled(rename = "Avg Overall")]
    overall: String,
    #[tabled(rename = "Tasks")]
    tasks: usize,
}

pub fn summary_table(report: &BenchmarkReport) -> String
{
    let rows = report.summary.iter().map(|(name, s)| SummaryRow {
        pattern: name.clone(),
        faithfulness: f4(s.avg_faithfulness),
        relevance: f4(s.avg_relevance),
        completeness: f4(s.avg_completeness),
        overall: f4(s.avg_overall),
        tasks: s.num_tasks,
    });

    format!("# Pattern Summary\n\n{}", markdown(rows))
}

#[derive(Tabled)]
struct CostRow
{
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Input ($)")]
    input: String,
    #[tabled(rename = "Output ($)")]
    output: String,
    #[tabled(rename = "Total ($)")]
    total: String,
}

pub fn cost_table(estimates: &[CostEstimate]) -> String
{
    markdown(estimates.iter().map(|e| CostRow {
        provider: e.provider.clone(),
        model: e.model.clone(),
        input: format!("{:.6}", e.input_cost),
        output: format!("{:.6}", e.output_cost),
        total: format!("{:.6}", e.total_cost),
    }))
}
