//! CLI handler for prompt safety checks.

use anyhow::Result;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::instrument;

use crate::cli::{AppContext, OutputFormat, SafetyArgs};
use crate::core::safety::SafetyChecker;
use crate::infra::io::{print_json, read_text};
use crate::infra::utils::Paint;

#[instrument(skip_all)]
pub fn run(
    args: SafetyArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let text = read_text(&args.text)?;
    let checker = SafetyChecker::with_patterns(&args.patterns)?;
    let result = checker.check(&text);

    match args.out.format
    {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table =>
        {
            #[derive(Tabled)]
            struct Row
            {
                safe: bool,
                risk: String,
                violations: String,
            }

            let table = Table::new([Row {
                safe: result.safe,
                risk: format!("{:.2}", result.risk_score),
                violations: result.violations.join(", "),
            }])
            .with(Style::modern())
            .to_string();
            println!("{table}");
        }
        OutputFormat::Text =>
        {
            println!(
                "{} (risk {:.2})",
                Paint::verdict(result.safe, "safe", "unsafe", ctx.no_color),
                result.risk_score
            );
            for v in &result.violations
            {
                println!("  - {v}");
            }
            if result.sanitized != text.trim()
            {
                println!("sanitized: {}", result.sanitized);
            }
        }
    }

    Ok(())
}
