//! CLI handler for template search.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, instrument};

use crate::cli::{AppContext, OptimizeArgs, OutputFormat};
use crate::core::cost::TokenCounter;
use crate::core::optimizer::Optimizer;
use crate::core::report;
use crate::infra::io::{print_json, read_list, read_text};
use crate::infra::utils::{Paint, TextUtils};

#[instrument(skip_all)]
pub fn run(
    args: OptimizeArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let base = read_text(&args.base)?;
    let reference = read_text(&args.reference)?;
    // The base is the scored baseline of a pool search too
    let pool = args
        .pool
        .as_ref()
        .map(read_list)
        .transpose()?
        .map(|mut pool| {
            pool.retain(|c| *c != base);
            pool.insert(0, base.clone());
            pool
        });

    let defaults = &ctx.config.optimizer;
    let iterations = args.iterations.unwrap_or(if pool.is_some()
    {
        defaults.iterations
    }
    else
    {
        defaults.mutation_iterations
    });

    let mut optimizer = match args.seed.or(defaults.seed)
    {
        Some(seed) => Optimizer::seeded(seed),
        None => Optimizer::from_os_rng(),
    };

    // Hidden in --quiet mode
    let pb = if ctx.quiet
    {
        ProgressBar::hidden()
    }
    else
    {
        let pb = ProgressBar::new(iterations as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    };

    let evaluator = ctx.config.evaluator();
    let provider = ctx.config.tokens.provider.clone();
    let scorer = |candidate: &str| {
        let tokens = TokenCounter.count(candidate, &provider);
        let overall = evaluator
            .evaluate(candidate, &reference, tokens)
            .overall;
        pb.inc(1);
        overall
    };

    let trace = match &pool
    {
        Some(pool) => optimizer.random_search(pool, iterations, scorer)?,
        None => optimizer.optimize(&base, iterations, scorer)?,
    };
    pb.finish_and_clear();

    info!(
        best = trace.best_score,
        improvement = trace.improvement_pct,
        iterations = trace.iterations,
        "optimization finished"
    );

    match args.out.format
    {
        OutputFormat::Json => print_json(&trace)?,
        OutputFormat::Table => println!("{}", report::optimization_report(&trace)),
        OutputFormat::Text =>
        {
            for e in &trace.history
            {
                println!("{:>4}  {:.4}  {}", e.iteration, e.score, TextUtils::one_line(&e.candidate, 60));
            }
            println!(
                "best {} ({:+.2}%): {}",
                Paint::score(trace.best_score, ctx.no_color),
                trace.improvement_pct,
                trace.best_candidate
            );
        }
    }

    Ok(())
}
