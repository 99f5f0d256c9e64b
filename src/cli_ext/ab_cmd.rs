//! CLI handlers for significance testing.

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::cli::{AbEvalArgs, AppContext, CompareArgs, OutputFormat};
use crate::core::ab_test::SignificanceResult;
use crate::core::evaluator::Metric;
use crate::core::report;
use crate::infra::io::{print_json, read_list, read_scores};
use crate::infra::utils::Paint;

#[instrument(skip_all, fields(a = %args.a.display(), b = %args.b.display()))]
pub fn compare_run(
    args: CompareArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let scores_a = read_scores(&args.a)?;
    let scores_b = read_scores(&args.b)?;
    info!(n_a = scores_a.len(), n_b = scores_b.len(), "loaded score samples");

    let result = ctx
        .config
        .ab_tester(args.alpha)?
        .compare(scores_a, scores_b, &args.name_a, &args.name_b);

    print_result(&result, args.out.format, ctx)
}

#[instrument(skip_all)]
pub fn ab_eval_run(
    args: AbEvalArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let outputs_a = read_list(&args.outputs_a)?;
    let outputs_b = read_list(&args.outputs_b)?;
    let queries = read_list(&args.queries)?;
    let contexts = args
        .contexts
        .as_ref()
        .map(read_list)
        .transpose()?;

    let metric_name = args
        .metric
        .as_deref()
        .unwrap_or(&ctx.config.ab_test.metric);
    let metric: Metric = metric_name.parse()?;

    let result = ctx
        .config
        .ab_tester(args.alpha)?
        .evaluate_and_compare(
            &outputs_a,
            &outputs_b,
            &queries,
            contexts.as_deref(),
            (args.name_a.as_str(), args.name_b.as_str()),
            metric,
        )
        .context("A/B evaluation failed")?;

    print_result(&result, args.out.format, ctx)
}

fn print_result(
    result: &SignificanceResult,
    format: OutputFormat,
    ctx: &AppContext,
) -> Result<()>
{
    match format
    {
        OutputFormat::Json => print_json(result)?,
        OutputFormat::Table => println!("{}", report::ab_test_report(result)),
        OutputFormat::Text =>
        {
            let (a, b) = (&result.variant_a, &result.variant_b);
            println!("{}: mean {:.4}  std {:.4}  n {}", a.name, a.mean, a.std, a.n);
            println!("{}: mean {:.4}  std {:.4}  n {}", b.name, b.mean, b.std, b.n);
            println!("z {:.4}  p {:.6}  d {:.4}", result.z_score, result.p_value, result.effect_size);
            println!(
                "{} winner: {}{}",
                Paint::verdict(result.is_significant, "significant", "not significant", ctx.no_color),
                Paint::label(&result.winner, ctx.no_color),
                if result.lift > 0.0 { format!(" (+{:.2}%)", result.lift) } else { String::new() }
            );
        }
    }

    Ok(())
}
