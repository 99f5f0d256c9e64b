//! Two-sample z-test for deciding whether one prompt variant beats another.
//!
//! The two-tailed p-value uses the Abramowitz–Stegun rational approximation of
//! the standard normal tail (26.2.17), saturating to 0 for |z| > 8.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::core::error::{LabError, LabResult};
use crate::core::evaluator::{Evaluator, Metric, QualityRequest, round4};

/// Winner label used when the difference is not significant
pub const TIE: &str = "tie";

/// Default significance threshold for the p-value
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

/// |z| above which the tail probability is reported as 0
const Z_SATURATION: f64 = 8.0;

/// 1 / sqrt(2π)
const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Abramowitz–Stegun 26.2.17 constants
const AS_P: f64 = 0.231_641_9;
const AS_B: [f64; 5] = [0.319_381_5, -0.356_563_8, 1.781_478, -1.821_256_0, 1.330_274_4];

fn round_to(
    x: f64,
    places: i32,
) -> f64
{
    let f = 10f64.powi(places);
    (x * f).round() / f
}

/// Summary statistics of one variant's scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSample
{
    pub name: String,
    pub scores: Vec<f64>,
    /// Sample mean, rounded to 4 dp
    pub mean: f64,
    /// Population standard deviation, rounded to 4 dp; 0 when n < 2
    pub std: f64,
    pub n: usize,
}

impl VariantSample
{
    /// Compute mean and population std; an empty list yields all zeros.
    pub fn from_scores(
        name: impl Into<String>,
        scores: Vec<f64>,
    ) -> Self
    {
        let name = name.into();
        let n = scores.len();

        if n == 0
        {
            return Self { name, scores, mean: 0.0, std: 0.0, n: 0 };
        }

        let mean = scores.iter().sum::<f64>() / n as f64;
        let std = if n > 1
        {
            let variance = scores
                .iter()
                .map(|s| (s - mean).powi(2))
                .sum::<f64>()
                / n as f64;
            variance.sqrt()
        }
        else
        {
            0.0
        };

        Self { name, scores, mean: round4(mean), std: round4(std), n }
    }
}

/// Outcome of comparing two variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificanceResult
{
    pub variant_a: VariantSample,
    pub variant_b: VariantSample,
    pub z_score: f64,
    pub p_value: f64,
    pub is_significant: bool,
    /// A variant name when significant, otherwise exactly `"tie"`
    pub winner: String,
    /// Percentage improvement of winner over loser; 0 when tied
    pub lift: f64,
    /// Cohen's d over the pooled deviation
    pub effect_size: f64,
}

impl SignificanceResult
{
    pub fn is_tie(&self) -> bool
    {
        self.winner == TIE
    }
}

/// Z-statistic `(mean_a − mean_b) / se`; 0 when either side is empty or se is 0
pub fn z_statistic(
    a: &VariantSample,
    b: &VariantSample,
) -> f64
{
    if a.n == 0 || b.n == 0
    {
        return 0.0;
    }

    let se = (a.std.powi(2) / a.n as f64 + b.std.powi(2) / b.n as f64).sqrt();
    if se == 0.0
    {
        return 0.0;
    }

    (a.mean - b.mean) / se
}

/// Upper-tail probability P(Z > |z|) of the standard normal
pub fn normal_tail(z: f64) -> f64
{
    let x = z.abs();
    if x > Z_SATURATION
    {
        return 0.0;
    }

    let t = 1.0 / (1.0 + AS_P * x);

    // Horner evaluation of b1·t + b2·t² + … + b5·t⁵
    let poly = AS_B
        .iter()
        .rev()
        .fold(0.0, |acc, &b| acc * t + b)
        * t;

    INV_SQRT_2PI * (-x * x / 2.0).exp() * poly
}

/// Two-tailed p-value, rounded to 6 dp
pub fn two_tailed_p_value(z: f64) -> f64
{
    round_to(2.0 * normal_tail(z), 6)
}

/// Cohen's d with the pooled deviation `sqrt((sa² + sb²) / 2)`
pub fn effect_size(
    a: &VariantSample,
    b: &VariantSample,
) -> f64
{
    let pooled = ((a.std.powi(2) + b.std.powi(2)) / 2.0).sqrt();
    if pooled > 0.0 { (a.mean - b.mean).abs() / pooled } else { 0.0 }
}

/// Significance tester with a configurable threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbTester
{
    pub significance_level: f64,
    evaluator: Evaluator,
}

impl Default for AbTester
{
    fn default() -> Self
    {
        Self { significance_level: DEFAULT_SIGNIFICANCE, evaluator: Evaluator::default() }
    }
}

impl AbTester
{
    pub fn new(significance_level: f64) -> Self
    {
        Self { significance_level, ..Self::default() }
    }

    /// Like `new`, but the level must lie strictly inside (0, 1)
    pub fn checked(significance_level: f64) -> LabResult<Self>
    {
        if !(significance_level > 0.0 && significance_level < 1.0)
        {
            return Err(LabError::invalid(format!(
                "significance level must be between 0 and 1 (exclusive), got {significance_level}"
            )));
        }

        Ok(Self::new(significance_level))
    }

    /// Use a custom evaluator for `evaluate_and_compare`
    pub fn with_evaluator(
        mut self,
        evaluator: Evaluator,
    ) -> Self
    {
        self.evaluator = evaluator;
        self
    }

    /// Compare two score samples with a two-sample z-test
    #[instrument(level = "debug", skip(self, scores_a, scores_b))]
    pub fn compare(
        &self,
        scores_a: Vec<f64>,
        scores_b: Vec<f64>,
        name_a: &str,
        name_b: &str,
    ) -> SignificanceResult
    {
        let va = VariantSample::from_scores(name_a, scores_a);
        let vb = VariantSample::from_scores(name_b, scores_b);

        let z = z_statistic(&va, &vb);
        let p_value = two_tailed_p_value(z);
        let is_significant = p_value < self.significance_level;

        // Equal means never name a winner, whatever the threshold
        let (winner, lift) = if !is_significant || va.mean == vb.mean
        {
            (TIE.to_string(), 0.0)
        }
        else if va.mean > vb.mean
        {
            (va.name.clone(), lift_pct(va.mean, vb.mean))
        }
        else
        {
            (vb.name.clone(), lift_pct(vb.mean, va.mean))
        };

        let effect = effect_size(&va, &vb);

        info!(z, p_value, is_significant, winner = %winner, "a/b comparison");

        SignificanceResult {
            variant_a: va,
            variant_b: vb,
            z_score: round_to(z, 4),
            p_value,
            is_significant,
            winner,
            lift: round_to(lift, 2),
            effect_size: round_to(effect, 4),
        }
    }

    /// Evaluate paired outputs for both variants and compare one metric.
    ///
    /// `contexts` defaults to empty strings; list lengths must agree.
    pub fn evaluate_and_compare(
        &self,
        outputs_a: &[String],
        outputs_b: &[String],
        queries: &[String],
        contexts: Option<&[String]>,
        names: (&str, &str),
        metric: Metric,
    ) -> LabResult<SignificanceResult>
    {
        let n = queries.len();
        if outputs_a.len() != n || outputs_b.len() != n
        {
            return Err(LabError::invalid(format!(
                "expected {n} outputs per variant to match queries, got {} and {}",
                outputs_a.len(),
                outputs_b.len()
            )));
        }
        match contexts
        {
            Some(ctx) if ctx.len() != n =>
            {
                return Err(LabError::invalid(format!(
                    "expected {n} contexts to match queries, got {}",
                    ctx.len()
                )));
            }
            _ =>
            {}
        }

        let mut scores_a = Vec::with_capacity(n);
        let mut scores_b = Vec::with_capacity(n);

        for i in 0..n
        {
            let ctx = contexts.map_or("", |c| c[i].as_str());
            let query = queries[i].as_str();

            let eval_a = self
                .evaluator
                .evaluate_quality(&QualityRequest::new(&outputs_a[i]).query(query).context(ctx));
            let eval_b = self
                .evaluator
                .evaluate_quality(&QualityRequest::new(&outputs_b[i]).query(query).context(ctx));

            scores_a.push(metric.of(&eval_a));
            scores_b.push(metric.of(&eval_b));
        }

        debug!(metric = %metric, n, "evaluated paired outputs");

        Ok(self.compare(scores_a, scores_b, names.0, names.1))
    }

    /// Score two templates over every input with `scorer(template, input)` and compare.
    pub fn run_templates<F>(
        &self,
        template_a: &str,
        template_b: &str,
        inputs: &[String],
        mut scorer: F,
    ) -> LabResult<SignificanceResult>
    where
        F: FnMut(&str, &str) -> f64,
    {
        if inputs.is_empty()
        {
            return Err(LabError::invalid("inputs list cannot be empty"));
        }

        let scores_a = inputs
            .iter()
            .map(|i| scorer(template_a, i))
            .collect();
        let scores_b = inputs
            .iter()
            .map(|i| scorer(template_b, i))
            .collect();

        Ok(self.compare(scores_a, scores_b, "A", "B"))
    }
}

/// Lift of winner over loser in percent; 0 when the loser mean is not positive
fn lift_pct(
    winner_mean: f64,
    loser_mean: f64,
) -> f64
{
    if loser_mean > 0.0 { (winner_mean - loser_mean) / loser_mean * 100.0 } else { 0.0 }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_normal_tail_reference_points()
    {
        // P(Z > 0) = 0.5, P(Z > 1.96) ≈ 0.025
        assert!((normal_tail(0.0) - 0.5).abs() < 1e-6);
        assert!((normal_tail(1.96) - 0.025).abs() < 1e-4);
        assert_eq!(normal_tail(8.5), 0.0);
        assert_eq!(normal_tail(-1.0), normal_tail(1.0));
    }

    #[test]
    fn test_two_tailed_p_value_at_zero()
    {
        assert!((two_tailed_p_value(0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_lift_guards_non_positive_loser()
    {
        assert_eq!(lift_pct(0.5, 0.0), 0.0);
        assert!((lift_pct(0.9, 0.6) - 50.0).abs() < 1e-9);
    }
}
