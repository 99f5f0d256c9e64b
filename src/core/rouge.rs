//! ROUGE-family overlap scoring: n-gram overlap and LCS alignment.
//!
//! All scores operate on whitespace tokens (see `tokenize::whitespace_tokens`).
//! Repeated n-grams are credited at most `min(candidate, reference)` times.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::tokenize::whitespace_tokens;

/// Precision / recall / F1 triple for one overlap comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Score
{
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl Score
{
    /// Build a score, deriving F1 as the harmonic mean (0 when P+R is 0)
    pub fn new(
        precision: f64,
        recall: f64,
    ) -> Self
    {
        let sum = precision + recall;
        let f1 = if sum > 0.0 { 2.0 * precision * recall / sum } else { 0.0 };

        Self { precision, recall, f1 }
    }

    /// The all-zero score returned for degenerate inputs
    pub const fn zero() -> Self
    {
        Self { precision: 0.0, recall: 0.0, f1: 0.0 }
    }

    /// Score from an overlap count and the two denominators
    fn from_overlap(
        overlap: usize,
        candidate_total: usize,
        reference_total: usize,
    ) -> Self
    {
        if candidate_total == 0 || reference_total == 0
        {
            return Self::zero();
        }

        Self::new(
            overlap as f64 / candidate_total as f64,
            overlap as f64 / reference_total as f64,
        )
    }
}

/// Multiset of contiguous n-grams, keyed by token slices
fn ngram_counts<'a>(
    tokens: &'a [String],
    n: usize,
) -> HashMap<&'a [String], usize>
{
    let mut counts = HashMap::with_capacity(tokens.len().saturating_sub(n - 1));

    // Sliding window of width n, one count per occurrence
    for gram in tokens.windows(n)
    {
        *counts
            .entry(gram)
            .or_insert(0) += 1;
    }

    counts
}

/// N-gram overlap between two token sequences.
///
/// Returns the zero score when either side is empty, has fewer than `n`
/// tokens, or `n` is 0.
pub fn ngram_overlap(
    candidate: &[String],
    reference: &[String],
    n: usize,
) -> Score
{
    if n == 0 || candidate.len() < n || reference.len() < n
    {
        return Score::zero();
    }

    let cand = ngram_counts(candidate, n);
    let refs = ngram_counts(reference, n);

    // Clipped overlap: each distinct n-gram contributes min(cand, ref)
    let overlap: usize = cand
        .iter()
        .map(|(gram, &c)| c.min(refs.get(gram).copied().unwrap_or(0)))
        .sum();

    let cand_total = candidate.len() - n + 1;
    let ref_total = reference.len() - n + 1;

    Score::from_overlap(overlap, cand_total, ref_total)
}

/// Longest-common-subsequence length, O(m·n) time with two rolling rows.
pub fn lcs_length(
    a: &[String],
    b: &[String],
) -> usize
{
    if a.is_empty() || b.is_empty()
    {
        return 0;
    }

    // Row i holds LCS lengths of a[..i] against every prefix of b
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for tok_a in a
    {
        for (j, tok_b) in b
            .iter()
            .enumerate()
        {
            // Match extends the diagonal; otherwise carry the better of up/left
            curr[j + 1] = if tok_a == tok_b { prev[j] + 1 } else { prev[j + 1].max(curr[j]) };
        }

        // curr becomes the previous row; its stale cells are overwritten next pass
        std::mem::swap(&mut prev, &mut curr);
    }

    // After the final swap the last row lives in prev
    prev[b.len()]
}

/// LCS-based score: precision = LCS/|candidate|, recall = LCS/|reference|.
pub fn lcs_score(
    candidate: &[String],
    reference: &[String],
) -> Score
{
    if candidate.is_empty() || reference.is_empty()
    {
        return Score::zero();
    }

    let lcs = lcs_length(candidate, reference);
    Score::from_overlap(lcs, candidate.len(), reference.len())
}

/// ROUGE-N over raw text
pub fn rouge_n(
    candidate: &str,
    reference: &str,
    n: usize,
) -> Score
{
    ngram_overlap(&whitespace_tokens(candidate), &whitespace_tokens(reference), n)
}

/// ROUGE-1 (unigram overlap)
pub fn rouge1(
    candidate: &str,
    reference: &str,
) -> Score
{
    rouge_n(candidate, reference, 1)
}

/// ROUGE-2 (bigram overlap)
pub fn rouge2(
    candidate: &str,
    reference: &str,
) -> Score
{
    rouge_n(candidate, reference, 2)
}

/// ROUGE-L (LCS alignment)
pub fn rouge_l(
    candidate: &str,
    reference: &str,
) -> Score
{
    lcs_score(&whitespace_tokens(candidate), &whitespace_tokens(reference))
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn toks(s: &str) -> Vec<String>
    {
        whitespace_tokens(s)
    }

    #[test]
    fn test_lcs_length_classic()
    {
        assert_eq!(lcs_length(&toks("a b c d e"), &toks("a c e")), 3);
        assert_eq!(lcs_length(&toks("a b c"), &toks("c b a")), 1);
        assert_eq!(lcs_length(&toks(""), &toks("a")), 0);
    }

    #[test]
    fn test_ngram_counts_windows()
    {
        let t = toks("a b a b");
        let counts = ngram_counts(&t, 2);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[&t[0..2]], 2);
    }

    #[test]
    fn test_score_new_zero_denominator()
    {
        assert_eq!(Score::new(0.0, 0.0), Score::zero());
    }
}
