use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use promptlab::cli::{AppContext, Cli, Commands};
use promptlab::cli_ext::{
    ab_cmd, benchmark_cmd, catalog_cmd, cost_cmd, eval_cmd, optimize_cmd, safety_cmd,
};
use promptlab::core::error::LabError;
use promptlab::infra::{config, logging};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        dry_run: cli.dry_run,
        config: config::load_config(cli.config.as_deref())?,
    };

    match cli.command {
        Commands::Score(args) => eval_cmd::score_run(args, &ctx),
        Commands::Evaluate(args) => eval_cmd::evaluate_run(args, &ctx),
        Commands::Compare(args) => ab_cmd::compare_run(args, &ctx),
        Commands::AbEval(args) => ab_cmd::ab_eval_run(args, &ctx),
        Commands::Optimize(args) => optimize_cmd::run(args, &ctx),
        Commands::Templates(args) => catalog_cmd::templates_run(args, &ctx),
        Commands::Render(args) => catalog_cmd::render_run(args, &ctx),
        Commands::Patterns(args) => catalog_cmd::patterns_run(args, &ctx),
        Commands::Pattern(args) => catalog_cmd::pattern_run(args, &ctx),
        Commands::Enhance(args) => catalog_cmd::enhance_run(args, &ctx),
        Commands::Categories(args) => catalog_cmd::categories_run(args, &ctx),
        Commands::Benchmark(args) => benchmark_cmd::run(args, &ctx),
        Commands::Count(args) => cost_cmd::count_run(args, &ctx),
        Commands::Cost(args) => cost_cmd::cost_run(args, &ctx),
        Commands::Safety(args) => safety_cmd::run(args, &ctx),
        Commands::Init(args) => config::init(args, &ctx),
        Commands::Completions(args) => promptlab::completion::run(args, &ctx),
    }
}

/// Library errors get a miette diagnostic (with help), everything else the anyhow chain
fn report(err: anyhow::Error) {
    match err.downcast::<LabError>() {
        Ok(lab) => eprintln!("{:?}", miette::Report::new(lab)),
        Err(err) => eprintln!("Error: {err:?}"),
    }
}
