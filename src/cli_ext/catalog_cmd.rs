//! CLI handlers for templates, patterns, techniques and categories.

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::instrument;

use crate::cli::{
    AppContext, CategoriesArgs, EnhanceArgs, FormatArgs, OutputFormat, PatternArgs, PatternsArgs,
    RenderArgs, TechniqueKind,
};
use crate::core::categories::CategoryRegistry;
use crate::core::error::LabError;
use crate::core::patterns::PatternLibrary;
use crate::core::techniques::{
    ChainOfThought, Example, FewShot, MetaPrompt, RolePlay, SelfRefine, Technique,
};
use crate::core::template::{TemplateRegistry, parse_vars};
use crate::infra::io::{print_json, read_text};
use crate::infra::utils::{Paint, TextUtils};

pub fn templates_run(
    args: FormatArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let registry = TemplateRegistry::with_builtins();
    let rows: Vec<_> = registry
        .names()
        .into_iter()
        .filter_map(|n| registry.get(&n).ok())
        .collect();

    match args.format
    {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Table =>
        {
            #[derive(Tabled)]
            struct Row
            {
                name: String,
                variables: String,
            }

            let table = Table::new(rows.iter().map(|t| Row {
                name: t.name.clone(),
                variables: t.variables().join(", "),
            }))
            .with(Style::modern())
            .to_string();
            println!("{table}");
        }
        OutputFormat::Text =>
        {
            for t in rows
            {
                println!("{:<10} {}", Paint::label(&t.name, ctx.no_color), t.variables().join(", "));
            }
        }
    }

    Ok(())
}

#[instrument(skip_all, fields(name = %args.name))]
pub fn render_run(
    args: RenderArgs,
    _ctx: &AppContext,
) -> Result<()>
{
    let registry = TemplateRegistry::with_builtins();
    let vars = parse_vars(&args.vars)?;
    let rendered = registry
        .get(&args.name)?
        .render(&vars)?;

    println!("{rendered}");
    Ok(())
}

pub fn patterns_run(
    args: PatternsArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let library = PatternLibrary::with_builtins();
    let patterns = match &args.tag
    {
        Some(tag) => library.search(tag),
        None => library.list(),
    };

    match args.out.format
    {
        OutputFormat::Json => print_json(&patterns)?,
        OutputFormat::Table =>
        {
            #[derive(Tabled)]
            struct Row
            {
                name: String,
                tags: String,
                description: String,
            }

            let table = Table::new(patterns.iter().map(|p| Row {
                name: p.name.clone(),
                tags: p.tags.join(", "),
                description: p.description.clone(),
            }))
            .with(Style::modern())
            .to_string();
            println!("{table}");
        }
        OutputFormat::Text =>
        {
            for p in patterns
            {
                println!(
                    "{:<18} [{}] {}",
                    Paint::label(&p.name, ctx.no_color),
                    p.tags.join(", "),
                    p.description
                );
            }
        }
    }

    Ok(())
}

#[instrument(skip_all, fields(name = %args.name))]
pub fn pattern_run(
    args: PatternArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let library = PatternLibrary::with_builtins();
    let pattern = library.get(&args.name)?;

    let rendered = if args.vars.is_empty()
    {
        pattern.render_example()?
    }
    else
    {
        pattern.render(&parse_vars(&args.vars)?)?
    };

    match args.out.format
    {
        OutputFormat::Json => print_json(&json!({
            "pattern": pattern,
            "rendered": rendered,
        }))?,
        OutputFormat::Table | OutputFormat::Text =>
        {
            println!("{} - {}", Paint::label(&pattern.name, ctx.no_color), pattern.description);
            println!("variables: {}", pattern.variables.join(", "));
            println!();
            println!("{rendered}");
        }
    }

    Ok(())
}

/// Parse `INPUT=>OUTPUT`
fn parse_example(raw: &str) -> Result<Example>
{
    let (input, output) = raw
        .split_once("=>")
        .ok_or_else(|| LabError::invalid(format!("invalid example '{raw}', expected INPUT=>OUTPUT")))?;

    Ok(Example { input: input.trim().to_string(), output: output.trim().to_string() })
}

#[instrument(skip_all, fields(technique = ?args.technique))]
pub fn enhance_run(
    args: EnhanceArgs,
    _ctx: &AppContext,
) -> Result<()>
{
    let prompt = read_text(&args.prompt)?;

    let enhanced = match args.technique
    {
        TechniqueKind::Cot => ChainOfThought::default().apply(&prompt),
        TechniqueKind::Role => RolePlay {
            role: args.role,
            expertise: args.expertise,
            tone: args.tone,
        }
        .apply(&prompt),
        TechniqueKind::SelfRefine => SelfRefine::default().apply(&prompt),
        TechniqueKind::Meta => MetaPrompt { target_task: args.task, constraints: args.constraints }
            .apply(&prompt),
        TechniqueKind::FewShot =>
        {
            let examples = args
                .examples
                .iter()
                .map(|e| parse_example(e))
                .collect::<Result<Vec<_>>>()
                .context("parse --example")?;
            let few_shot = FewShot::new(examples);

            match args.shots
            {
                Some(n) =>
                {
                    let mut rng = match args.seed
                    {
                        Some(s) => StdRng::seed_from_u64(s),
                        None => StdRng::from_os_rng(),
                    };
                    few_shot.apply_sampled(&prompt, n, &mut rng)
                }
                None => few_shot.apply(&prompt),
            }
        }
    };

    println!("{enhanced}");
    Ok(())
}

pub fn categories_run(
    args: CategoriesArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let registry = CategoryRegistry::with_builtins();

    let Some(name) = args.name
    else
    {
        let all = registry.list();
        match args.out.format
        {
            OutputFormat::Json => print_json(&all)?,
            OutputFormat::Table =>
            {
                #[derive(Tabled)]
                struct Row
                {
                    name: String,
                    description: String,
                    patterns: String,
                    tasks: usize,
                }

                let table = Table::new(all.iter().map(|c| Row {
                    name: c.name.clone(),
                    description: c.description.clone(),
                    patterns: c.recommended_patterns.join(", "),
                    tasks: c.examples.len(),
                }))
                .with(Style::modern())
                .to_string();
                println!("{table}");
            }
            OutputFormat::Text =>
            {
                for c in all
                {
                    println!("{:<15} {}", Paint::label(&c.name, ctx.no_color), c.description);
                }
            }
        }
        return Ok(());
    };

    let category = registry.get(&name)?;
    match args.out.format
    {
        OutputFormat::Json => print_json(category)?,
        OutputFormat::Table | OutputFormat::Text =>
        {
            println!("{} - {}", Paint::label(&category.name, ctx.no_color), category.description);
            println!("recommended: {}", category.recommended_patterns.join(", "));
            for ex in &category.examples
            {
                println!();
                println!("  {}", ex.name);
                println!("    input:    {}", TextUtils::one_line(&ex.input_text, 70));
                println!("    expected: {}", TextUtils::one_line(&ex.expected_output, 70));
                println!("    topics:   {}", ex.expected_topics.join(", "));
            }
        }
    }

    Ok(())
}
