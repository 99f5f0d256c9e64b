//! CLI handlers for token counts and cost estimates.

use anyhow::Result;
use serde_json::json;
use tracing::instrument;

use crate::cli::{AppContext, CostArgs, CountArgs, OutputFormat};
use crate::core::cost::{BpeCounter, CostCalculator, TokenCounter};
use crate::core::report;
use crate::infra::io::{print_json, read_text};

#[instrument(skip_all)]
pub fn count_run(
    args: CountArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let text = read_text(&args.text)?;
    let provider = args
        .provider
        .as_deref()
        .unwrap_or(&ctx.config.tokens.provider);

    let estimated = TokenCounter.count(&text, provider);
    let exact = match &args.encoding
    {
        Some(enc) => Some(BpeCounter::new(enc)?.count(&text)),
        None => None,
    };

    match args.out.format
    {
        OutputFormat::Json => print_json(&json!({
            "provider": provider,
            "chars": text.chars().count(),
            "estimated_tokens": estimated,
            "encoding": args.encoding,
            "exact_tokens": exact,
        }))?,
        OutputFormat::Table | OutputFormat::Text =>
        {
            println!("{provider}: ~{estimated} tokens");
            if let (Some(enc), Some(n)) = (&args.encoding, exact)
            {
                println!("{enc}: {n} tokens");
            }
        }
    }

    Ok(())
}

#[instrument(skip_all, fields(input = args.input, output = args.output))]
pub fn cost_run(
    args: CostArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let calc = CostCalculator::default();

    let estimates = if args.all
    {
        calc.compare_providers(args.input, args.output)
    }
    else
    {
        let provider = args
            .provider
            .as_deref()
            .unwrap_or(&ctx.config.cost.provider);
        let model = args
            .model
            .as_deref()
            .unwrap_or(&ctx.config.cost.model);
        vec![calc.estimate(args.input, args.output, provider, model)?]
    };

    match args.out.format
    {
        OutputFormat::Json =>
        {
            if args.all
            {
                print_json(&estimates)?;
            }
            else
            {
                print_json(&estimates[0])?;
            }
        }
        OutputFormat::Table => println!("{}", report::cost_table(&estimates)),
        OutputFormat::Text =>
        {
            for e in &estimates
            {
                println!(
                    "{:<8} {:<14} ${:.6} (in ${:.6}, out ${:.6})",
                    e.provider, e.model, e.total_cost, e.input_cost, e.output_cost
                );
            }
        }
    }

    Ok(())
}
