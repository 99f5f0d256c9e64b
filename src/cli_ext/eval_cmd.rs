//! CLI handlers for reference-based scoring and quality evaluation.

use anyhow::Result;
use tracing::{debug, instrument};

use crate::cli::{AppContext, EvaluateArgs, OutputFormat, ScoreArgs};
use crate::core::cost::TokenCounter;
use crate::core::evaluator::QualityRequest;
use crate::core::report;
use crate::infra::io::{print_json, read_text};
use crate::infra::utils::Paint;

#[instrument(skip_all)]
pub fn score_run(
    args: ScoreArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let candidate = read_text(&args.candidate)?;
    let reference = read_text(&args.reference)?;

    let tokens = match args.tokens
    {
        Some(t) => t,
        None =>
        {
            let provider = &ctx.config.tokens.provider;
            let t = TokenCounter.count(&candidate, provider);
            debug!(tokens = t, provider = %provider, "estimated candidate tokens");
            t
        }
    };

    let report = ctx
        .config
        .evaluator()
        .evaluate(&candidate, &reference, tokens);

    match args.out.format
    {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => println!("{}", report::evaluation_table(&report)),
        OutputFormat::Text =>
        {
            for (name, s) in &report.rouge
            {
                println!(
                    "{:<10} P {:.4}  R {:.4}  F1 {}",
                    name,
                    s.precision,
                    s.recall,
                    Paint::score(s.f1, ctx.no_color)
                );
            }
            println!("{:<10} {}", "similarity", Paint::score(report.similarity, ctx.no_color));
            println!("{:<10} {:.4}", "efficiency", report.efficiency);
            println!("{:<10} {}", "overall", Paint::score(report.overall, ctx.no_color));
        }
    }

    Ok(())
}

#[instrument(skip_all)]
pub fn evaluate_run(
    args: EvaluateArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let output = read_text(&args.output)?;
    let query = args
        .query
        .as_deref()
        .map(read_text)
        .transpose()?;
    let context = args
        .context
        .as_deref()
        .map(read_text)
        .transpose()?;

    let mut req = QualityRequest::new(&output).topics(&args.topics);
    if let Some(q) = query.as_deref()
    {
        req = req.query(q);
    }
    if let Some(c) = context.as_deref()
    {
        req = req.context(c);
    }

    let report = ctx
        .config
        .evaluator()
        .evaluate_quality(&req);

    match args.out.format
    {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => println!("{}", report::quality_table(&report)),
        OutputFormat::Text =>
        {
            for (name, v) in [
                ("faithfulness", report.faithfulness),
                ("relevance", report.relevance),
                ("completeness", report.completeness),
                ("overall", report.overall),
            ]
            {
                println!("{name:<13} {}", Paint::score(v, ctx.no_color));
            }
        }
    }

    Ok(())
}
