//! TF-IDF cosine similarity over the two-document corpus {candidate, reference}.
//!
//! Term frequency is `count / len(tokens)`; smoothed IDF for two documents is
//! `ln((1 + 2) / (1 + df)) + 1`. Vocabulary is iterated in sorted order so the
//! result is bitwise symmetric in its arguments.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::core::tokenize::whitespace_tokens;

/// Number of documents in the comparison corpus
const CORPUS_SIZE: f64 = 2.0;

/// Raw term counts plus the token total for one document
struct TermCounts
{
    counts: HashMap<String, usize>,
    total: usize,
}

impl TermCounts
{
    fn new(tokens: Vec<String>) -> Self
    {
        let total = tokens.len();
        let mut counts = HashMap::with_capacity(total);

        for t in tokens
        {
            *counts
                .entry(t)
                .or_insert(0) += 1;
        }

        Self { counts, total }
    }

    fn tf(
        &self,
        term: &str,
    ) -> f64
    {
        match self.counts.get(term)
        {
            Some(&c) if self.total > 0 => c as f64 / self.total as f64,
            _ => 0.0,
        }
    }

    fn contains(
        &self,
        term: &str,
    ) -> bool
    {
        self.counts.contains_key(term)
    }
}

/// Smoothed inverse document frequency for the two-document corpus
pub fn smoothed_idf(document_frequency: usize) -> f64
{
    ((1.0 + CORPUS_SIZE) / (1.0 + document_frequency as f64)).ln() + 1.0
}

/// TF-IDF weights for both documents over their shared sorted vocabulary.
///
/// Returned maps hold an entry for every vocabulary term (zeros included).
pub fn tfidf_vectors(
    candidate: &str,
    reference: &str,
) -> (BTreeMap<String, f64>, BTreeMap<String, f64>)
{
    let cand = TermCounts::new(whitespace_tokens(candidate));
    let refs = TermCounts::new(whitespace_tokens(reference));

    // Union of both documents' terms, sorted
    let vocab: BTreeSet<&String> = cand
        .counts
        .keys()
        .chain(refs.counts.keys())
        .collect();

    let mut cand_vec = BTreeMap::new();
    let mut ref_vec = BTreeMap::new();

    for term in vocab
    {
        // Document frequency is 1 or 2 here
        let df = usize::from(cand.contains(term)) + usize::from(refs.contains(term));
        let idf = smoothed_idf(df);

        // A term absent from one side gets tf 0, so weight 0
        cand_vec.insert(term.clone(), cand.tf(term) * idf);
        ref_vec.insert(term.clone(), refs.tf(term) * idf);
    }

    (cand_vec, ref_vec)
}

/// Cosine of two aligned weight vectors; 0 when either norm is 0
fn cosine(
    a: &BTreeMap<String, f64>,
    b: &BTreeMap<String, f64>,
) -> f64
{
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    // Single pass: dot product and both squared norms
    for (term, wa) in a
    {
        let wb = b.get(term).copied().unwrap_or(0.0);
        dot += wa * wb;
        norm_a += wa * wa;
        norm_b += wb * wb;
    }

    if norm_a == 0.0 || norm_b == 0.0
    {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Lexical similarity in [0, 1].
///
/// Whitespace-only input on either side short-circuits to 0.0.
pub fn tfidf_cosine(
    candidate: &str,
    reference: &str,
) -> f64
{
    if candidate.trim().is_empty() || reference.trim().is_empty()
    {
        return 0.0;
    }

    let (cand_vec, ref_vec) = tfidf_vectors(candidate, reference);

    cosine(&cand_vec, &ref_vec).clamp(0.0, 1.0)
}
