//! CLI handler for pattern benchmarks over a category's sample tasks.

use anyhow::Result;
use tracing::{info, instrument};

use crate::cli::{AppContext, BenchmarkArgs, OutputFormat};
use crate::core::benchmark::{BenchmarkRunner, BenchmarkTask};
use crate::core::categories::CategoryRegistry;
use crate::core::patterns::{PatternLibrary, PromptPattern};
use crate::core::report;
use crate::infra::io::print_json;
use crate::infra::utils::Paint;

#[instrument(skip_all, fields(category = %args.category))]
pub fn run(
    args: BenchmarkArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let categories = CategoryRegistry::with_builtins();
    let library = PatternLibrary::with_builtins();
    let category = categories.get(&args.category)?;

    let names: &[String] = if args.patterns.is_empty()
    {
        &category.recommended_patterns
    }
    else
    {
        &args.patterns
    };
    let patterns = names
        .iter()
        .map(|n| library.get(n))
        .collect::<Result<Vec<&PromptPattern>, _>>()?;

    let tasks: Vec<BenchmarkTask> = category
        .examples
        .iter()
        .map(|ex| BenchmarkTask::from_example(ex, &patterns))
        .collect();

    let report = BenchmarkRunner::new(ctx.config.evaluator()).run_comparison(&patterns, &tasks);
    info!(results = report.results.len(), best = ?report.best_pattern, "benchmark finished");

    match args.out.format
    {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table =>
        {
            if !args.summary
            {
                println!("{}", report::benchmark_table(&report));
                println!();
            }
            println!("{}", report::summary_table(&report));
        }
        OutputFormat::Text =>
        {
            if !args.summary
            {
                for r in &report.results
                {
                    println!(
                        "{:<18} {:<20} overall {}  ({:.3} ms)",
                        r.pattern_name,
                        r.task_name,
                        Paint::score(r.evaluation.overall, ctx.no_color),
                        r.latency_ms
                    );
                }
            }
            for (name, s) in &report.summary
            {
                println!(
                    "{:<18} avg overall {:.4} over {} task(s)",
                    Paint::label(name, ctx.no_color),
                    s.avg_overall,
                    s.num_tasks
                );
            }
            match &report.best_pattern
            {
                Some(best) => println!("best: {best} ({:.4})", report.best_overall),
                None => println!("best: none"),
            }
        }
    }

    Ok(())
}
