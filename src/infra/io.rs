use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Resolve a text argument: `@path` reads a file, `@-` reads stdin, anything else is literal.
pub fn read_text(arg: &str) -> Result<String> {
    match arg.strip_prefix('@') {
        Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
        Some(path) => read_file(path),
        None => Ok(arg.to_string()),
    }
}

pub fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file {}", path.display()))
}

/// Scores from a JSON array or whitespace/comma separated numbers.
/// NaN and infinities are rejected.
pub fn parse_scores(content: &str) -> Result<Vec<f64>> {
    let trimmed = content.trim();
    let scores: Vec<f64> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).context("Failed to parse JSON score array")?
    } else {
        trimmed
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<f64>()
                    .with_context(|| format!("Invalid score '{s}'"))
            })
            .collect::<Result<_>>()?
    };

    if let Some((i, s)) = scores.iter().enumerate().find(|(_, s)| !s.is_finite()) {
        anyhow::bail!("Score #{} is not a finite number: {s}", i + 1);
    }

    Ok(scores)
}

pub fn read_scores<P: AsRef<Path>>(path: P) -> Result<Vec<f64>> {
    let path = path.as_ref();
    parse_scores(&read_file(path)?).with_context(|| format!("in {}", path.display()))
}

/// Items from a JSON string array, or one item per non-empty line.
pub fn parse_list(content: &str) -> Result<Vec<String>> {
    let trimmed = content.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("Failed to parse JSON string array");
    }

    Ok(trimmed
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect())
}

pub fn read_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    parse_list(&read_file(path)?).with_context(|| format!("in {}", path.display()))
}

/// Pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}
