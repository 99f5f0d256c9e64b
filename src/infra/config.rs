use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};
use crate::core::ab_test::AbTester;
use crate::core::error::LabResult;
use crate::core::evaluator::{Evaluator, Metric, QualityWeights, ReferenceWeights};

/// Config files looked up in the working directory, first match wins
pub const CONFIG_FILES: [&str; 4] =
    ["promptlab.toml", "promptlab.yaml", "promptlab.json", ".promptlab.toml"];

pub const ENV_PREFIX: &str = "PLAB";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// Composite evaluator weights
    pub evaluation: EvaluationConfig,

    /// Significance testing defaults
    pub ab_test: AbTestConfig,

    /// Search defaults
    pub optimizer: OptimizerConfig,

    /// Token heuristic provider
    pub tokens: TokensConfig,

    /// Default pricing lookup
    pub cost: CostConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig
{
    pub faithfulness_weight: f64,
    pub relevance_weight: f64,
    pub completeness_weight: f64,
    pub rouge1_weight: f64,
    pub similarity_weight: f64,
    pub efficiency_weight: f64,
    pub efficiency_scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbTestConfig
{
    pub significance_level: f64,
    pub metric: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig
{
    pub iterations: usize,
    pub mutation_iterations: usize,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokensConfig
{
    pub provider: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig
{
    pub provider: String,
    pub model: String,
}

impl Default for EvaluationConfig
{
    fn default() -> Self
    {
        let q = QualityWeights::default();
        let r = ReferenceWeights::default();

        Self {
            faithfulness_weight: q.faithfulness,
            relevance_weight: q.relevance,
            completeness_weight: q.completeness,
            rouge1_weight: r.rouge1,
            similarity_weight: r.similarity,
            efficiency_weight: r.efficiency,
            efficiency_scale: r.efficiency_scale,
        }
    }
}

impl Default for AbTestConfig
{
    fn default() -> Self
    {
        Self {
            significance_level: crate::core::ab_test::DEFAULT_SIGNIFICANCE,
            metric: Metric::Overall.to_string(),
        }
    }
}

impl Default for OptimizerConfig
{
    fn default() -> Self
    {
        Self { iterations: 10, mutation_iterations: 20, seed: None }
    }
}

impl Default for TokensConfig
{
    fn default() -> Self
    {
        Self { provider: "claude".to_string() }
    }
}

impl Default for CostConfig
{
    fn default() -> Self
    {
        Self { provider: "claude".to_string(), model: "sonnet".to_string() }
    }
}

impl Config
{
    pub fn evaluator(&self) -> Evaluator
    {
        let e = &self.evaluation;

        Evaluator::with_weights(
            ReferenceWeights {
                rouge1: e.rouge1_weight,
                similarity: e.similarity_weight,
                efficiency: e.efficiency_weight,
                efficiency_scale: e.efficiency_scale,
            },
            QualityWeights {
                faithfulness: e.faithfulness_weight,
                relevance: e.relevance_weight,
                completeness: e.completeness_weight,
            },
        )
    }

    /// Tester at `alpha`, or the configured level when none is given
    pub fn ab_tester(
        &self,
        alpha: Option<f64>,
    ) -> LabResult<AbTester>
    {
        let tester = AbTester::checked(alpha.unwrap_or(self.ab_test.significance_level))?;
        Ok(tester.with_evaluator(self.evaluator()))
    }
}

/// Load from the working directory (or `explicit`), then `PLAB_` variables
pub fn load_config(explicit: Option<&Path>) -> Result<Config>
{
    load_config_in(Path::new("."), explicit)
}

pub fn load_config_in(
    dir: &Path,
    explicit: Option<&Path>,
) -> Result<Config>
{
    let mut builder = config::Config::builder();

    match explicit
    {
        Some(path) =>
        {
            if !path.exists()
            {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            builder = builder.add_source(config::File::from(path.to_path_buf()));
        }
        None =>
        {
            if let Some(found) = CONFIG_FILES
                .iter()
                .map(|name| dir.join(name))
                .find(|p| p.exists())
            {
                builder = builder.add_source(config::File::from(found));
            }
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path: PathBuf = args
        .path
        .join(CONFIG_FILES[0]);

    let toml_string =
        toml::to_string_pretty(&Config::default()).context("Failed to serialize default config")?;

    if ctx.dry_run
    {
        print!("{toml_string}");
        return Ok(());
    }

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_toml()
    {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults()
    {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("promptlab.toml"),
            "[ab_test]\nsignificance_level = 0.01\n",
        )
        .unwrap();

        let cfg = load_config_in(dir.path(), None).unwrap();
        assert_eq!(cfg.ab_test.significance_level, 0.01);
        assert_eq!(cfg.ab_test.metric, "overall");
        assert_eq!(cfg.optimizer.iterations, 10);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error()
    {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config_in(dir.path(), Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_ab_tester_rejects_out_of_range_level()
    {
        let mut cfg = Config::default();
        assert!(cfg.ab_tester(None).is_ok());
        assert_eq!(cfg.ab_tester(Some(0.01)).unwrap().significance_level, 0.01);

        for bad in [0.0, 1.0, 1.5, -0.1, f64::NAN]
        {
            assert!(cfg.ab_tester(Some(bad)).is_err(), "{bad}");
        }

        cfg.ab_test.significance_level = 2.0;
        assert!(cfg.ab_tester(None).is_err());
    }
}
