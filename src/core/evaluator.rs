//! Composite evaluation of generated text.
//!
//! Two contracts:
//! - reference-based: ROUGE-1/2/L, lexical similarity and token efficiency
//!   folded into one `EvaluationReport`;
//! - context/query-based: faithfulness, relevance and completeness folded
//!   into one `QualityReport`.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::core::error::{LabError, LabResult};
use crate::core::rouge::{Score, rouge_l, rouge1, rouge2};
use crate::core::similarity::tfidf_cosine;
use crate::core::tokenize::keyword_tokens;

/// Tolerance under which two overall scores compare as a tie
pub const TIE_EPSILON: f64 = 1e-6;

/// Round to four decimal places, the precision of reported quality metrics
pub fn round4(x: f64) -> f64
{
    (x * 10_000.0).round() / 10_000.0
}

/// Weights for the reference-based overall score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceWeights
{
    pub rouge1: f64,
    pub similarity: f64,
    pub efficiency: f64,
    /// Multiplier applied to the efficiency ratio before `tanh`
    pub efficiency_scale: f64,
}

impl Default for ReferenceWeights
{
    fn default() -> Self
    {
        Self { rouge1: 0.4, similarity: 0.4, efficiency: 0.2, efficiency_scale: 100.0 }
    }
}

/// Weights for the context/query-based overall score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityWeights
{
    pub faithfulness: f64,
    pub relevance: f64,
    pub completeness: f64,
}

impl Default for QualityWeights
{
    fn default() -> Self
    {
        Self { faithfulness: 0.4, relevance: 0.4, completeness: 0.2 }
    }
}

/// Reference-based evaluation result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport
{
    /// Named overlap scores: "rouge1", "rouge2", "rougeL"
    pub rouge: IndexMap<String, Score>,
    pub similarity: f64,
    pub efficiency: f64,
    pub overall: f64,
}

impl EvaluationReport
{
    /// Look up one named overlap score
    pub fn score(
        &self,
        name: &str,
    ) -> Option<&Score>
    {
        self.rouge.get(name)
    }
}

/// Context/query-based evaluation result, every field rounded to 4 dp
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport
{
    pub faithfulness: f64,
    pub relevance: f64,
    pub completeness: f64,
    pub overall: f64,
}

/// Selectable field of a `QualityReport`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric
{
    Faithfulness,
    Relevance,
    Completeness,
    Overall,
}

impl Metric
{
    pub const ALL: [Metric; 4] =
        [Metric::Faithfulness, Metric::Relevance, Metric::Completeness, Metric::Overall];

    pub fn as_str(&self) -> &'static str
    {
        match self
        {
            Metric::Faithfulness => "faithfulness",
            Metric::Relevance => "relevance",
            Metric::Completeness => "completeness",
            Metric::Overall => "overall",
        }
    }

    /// Extract this metric from a report
    pub fn of(
        &self,
        report: &QualityReport,
    ) -> f64
    {
        match self
        {
            Metric::Faithfulness => report.faithfulness,
            Metric::Relevance => report.relevance,
            Metric::Completeness => report.completeness,
            Metric::Overall => report.overall,
        }
    }
}

impl fmt::Display for Metric
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric
{
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        let wanted = s.trim().to_ascii_lowercase();

        Metric::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| LabError::not_found("metric", s, Metric::ALL.map(|m| m.as_str())))
    }
}

/// Which of two reports scored higher overall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference
{
    A,
    B,
    Tie,
}

/// Inputs for one context/query-based evaluation
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityRequest<'a>
{
    pub output: &'a str,
    pub query: Option<&'a str>,
    pub context: Option<&'a str>,
    pub expected_topics: &'a [String],
}

impl<'a> QualityRequest<'a>
{
    pub fn new(output: &'a str) -> Self
    {
        Self { output, ..Self::default() }
    }

    pub fn query(
        mut self,
        query: &'a str,
    ) -> Self
    {
        self.query = Some(query);
        self
    }

    pub fn context(
        mut self,
        context: &'a str,
    ) -> Self
    {
        self.context = Some(context);
        self
    }

    pub fn topics(
        mut self,
        topics: &'a [String],
    ) -> Self
    {
        self.expected_topics = topics;
        self
    }
}

/// Fraction of the output's keywords that also appear in the context.
///
/// Set intersection over `keyword_tokens`; repeated words count once.
pub fn faithfulness(
    output: &str,
    context: &str,
) -> f64
{
    if output.trim().is_empty() || context.trim().is_empty()
    {
        return 0.0;
    }

    let out_words: HashSet<String> = keyword_tokens(output)
        .into_iter()
        .collect();
    if out_words.is_empty()
    {
        return 0.0;
    }

    let ctx_words: HashSet<String> = keyword_tokens(context)
        .into_iter()
        .collect();
    let overlap = out_words
        .intersection(&ctx_words)
        .count();

    overlap as f64 / out_words.len() as f64
}

/// Lexical similarity between output and query (0 when either is blank)
pub fn relevance(
    output: &str,
    query: &str,
) -> f64
{
    tfidf_cosine(output, query)
}

/// Fraction of expected topics found as case-insensitive substrings.
///
/// An empty topic list is vacuously complete.
pub fn completeness(
    output: &str,
    expected_topics: &[String],
) -> f64
{
    if expected_topics.is_empty()
    {
        return 1.0;
    }

    let haystack = output.to_lowercase();
    let found = expected_topics
        .iter()
        .filter(|t| haystack.contains(&t.to_lowercase()))
        .count();

    found as f64 / expected_topics.len() as f64
}

/// Quality per token; 0 when no tokens were spent
pub fn token_efficiency(
    quality: f64,
    token_count: usize,
) -> f64
{
    if token_count == 0
    {
        return 0.0;
    }

    quality / token_count as f64
}

/// Stateless evaluator carrying the weighting configuration
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Evaluator
{
    pub reference_weights: ReferenceWeights,
    pub quality_weights: QualityWeights,
}

impl Evaluator
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn with_weights(
        reference_weights: ReferenceWeights,
        quality_weights: QualityWeights,
    ) -> Self
    {
        Self { reference_weights, quality_weights }
    }

    /// Reference-based evaluation of one candidate
    #[instrument(level = "debug", skip(self, candidate, reference))]
    pub fn evaluate(
        &self,
        candidate: &str,
        reference: &str,
        token_count: usize,
    ) -> EvaluationReport
    {
        let w = &self.reference_weights;

        let mut rouge = IndexMap::with_capacity(3);
        rouge.insert("rouge1".to_string(), rouge1(candidate, reference));
        rouge.insert("rouge2".to_string(), rouge2(candidate, reference));
        rouge.insert("rougeL".to_string(), rouge_l(candidate, reference));

        let similarity = tfidf_cosine(candidate, reference);

        // ROUGE-1 F1 stands in for quality
        let quality = rouge["rouge1"].f1;
        let efficiency = token_efficiency(quality, token_count);

        // Weighted sum of ROUGE-1 F1, TF-IDF cosine and squashed efficiency.
        // tanh maps the unbounded ratio into [0, 1)
        let overall = w.rouge1 * quality
            + w.similarity * similarity
            + w.efficiency * (efficiency * w.efficiency_scale).tanh();

        debug!(quality, similarity, efficiency, overall, "reference evaluation");

        EvaluationReport { rouge, similarity, efficiency, overall }
    }

    /// Element-wise evaluation; all three lists must have equal length
    pub fn evaluate_batch(
        &self,
        candidates: &[String],
        references: &[String],
        token_counts: &[usize],
    ) -> LabResult<Vec<EvaluationReport>>
    {
        if candidates.len() != references.len() || candidates.len() != token_counts.len()
        {
            return Err(LabError::invalid(format!(
                "batch lists differ in length: {} candidates, {} references, {} token counts",
                candidates.len(),
                references.len(),
                token_counts.len()
            )));
        }

        // Order is preserved by the indexed collect
        Ok(candidates
            .par_iter()
            .zip(references.par_iter())
            .zip(token_counts.par_iter())
            .map(|((c, r), &t)| self.evaluate(c, r, t))
            .collect())
    }

    /// Compare two reports by overall score
    pub fn compare(
        &self,
        a: &EvaluationReport,
        b: &EvaluationReport,
    ) -> Preference
    {
        if (a.overall - b.overall).abs() < TIE_EPSILON
        {
            Preference::Tie
        }
        else if a.overall > b.overall
        {
            Preference::A
        }
        else
        {
            Preference::B
        }
    }

    /// Context/query-based evaluation
    #[instrument(level = "debug", skip_all)]
    pub fn evaluate_quality(
        &self,
        req: &QualityRequest<'_>,
    ) -> QualityReport
    {
        let w = &self.quality_weights;

        // Each sub-score lies in [0, 1]
        let faith = req
            .context
            .filter(|c| !c.is_empty())
            .map_or(0.0, |c| faithfulness(req.output, c));
        let rel = req
            .query
            .filter(|q| !q.is_empty())
            .map_or(0.0, |q| relevance(req.output, q));
        let comp = completeness(req.output, req.expected_topics);

        // Missing context or query contributes 0 to its weighted term
        let overall = w.faithfulness * faith + w.relevance * rel + w.completeness * comp;

        debug!(faith, rel, comp, overall, "quality evaluation");

        QualityReport {
            faithfulness: round4(faith),
            relevance: round4(rel),
            completeness: round4(comp),
            overall: round4(overall),
        }
    }
}
