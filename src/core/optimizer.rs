//! Prompt search driven by a caller-supplied scoring function.
//!
//! Randomness comes from an injected `Rng` so runs are reproducible with a
//! seeded `StdRng`.

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::error::{LabError, LabResult};

/// Separator used when shuffling sentence order
const SENTENCE_SEP: &str = ". ";

/// One scored candidate in the search log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry
{
    pub iteration: usize,
    pub candidate: String,
    pub score: f64,
}

/// Result of a search run; `iterations == history.len()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationTrace
{
    pub best_candidate: String,
    pub best_score: f64,
    pub iterations: usize,
    /// Improvement of the best score over the first scored candidate, in percent
    pub improvement_pct: f64,
    pub history: Vec<TraceEntry>,
}

/// Mutation operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mutation
{
    /// Swap two adjacent words
    Swap,
    /// Bold or upper-case one non-placeholder word
    Emphasize,
    /// Shuffle sentence order
    Reorder,
}

impl Mutation
{
    pub const ALL: [Mutation; 3] = [Mutation::Swap, Mutation::Emphasize, Mutation::Reorder];
}

/// Append-only search log that tracks the running best
struct TraceBuilder
{
    history: Vec<TraceEntry>,
    best_candidate: String,
    best_score: f64,
    initial_score: f64,
}

impl TraceBuilder
{
    fn start(
        candidate: String,
        score: f64,
    ) -> Self
    {
        let history = vec![TraceEntry { iteration: 0, candidate: candidate.clone(), score }];

        Self { history, best_candidate: candidate, best_score: score, initial_score: score }
    }

    fn record(
        &mut self,
        candidate: String,
        score: f64,
    )
    {
        let iteration = self.history.len();
        trace!(iteration, score, "scored candidate");

        if score > self.best_score
        {
            debug!(iteration, score, previous = self.best_score, "new best candidate");
            self.best_score = score;
            self.best_candidate = candidate.clone();
        }

        self.history.push(TraceEntry { iteration, candidate, score });
    }

    fn finish(self) -> OptimizationTrace
    {
        let improvement_pct = if self.initial_score != 0.0
        {
            (self.best_score - self.initial_score) / self.initial_score * 100.0
        }
        else
        {
            0.0
        };

        OptimizationTrace {
            best_candidate: self.best_candidate,
            best_score: self.best_score,
            iterations: self.history.len(),
            improvement_pct,
            history: self.history,
        }
    }
}

/// Random search and mutation-based local search over prompt templates
#[derive(Debug, Clone)]
pub struct Optimizer<R: Rng>
{
    rng: R,
}

impl Optimizer<StdRng>
{
    /// Deterministic optimizer for reproducible runs
    pub fn seeded(seed: u64) -> Self
    {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Optimizer seeded from the operating system
    pub fn from_os_rng() -> Self
    {
        Self { rng: StdRng::from_os_rng() }
    }
}

impl<R: Rng> Optimizer<R>
{
    pub fn new(rng: R) -> Self
    {
        Self { rng }
    }

    /// Score the first pool member, then `iterations - 1` uniform random picks.
    pub fn random_search<F>(
        &mut self,
        pool: &[String],
        iterations: usize,
        mut scorer: F,
    ) -> LabResult<OptimizationTrace>
    where
        F: FnMut(&str) -> f64,
    {
        if pool.is_empty()
        {
            return Err(LabError::invalid("candidate pool cannot be empty"));
        }
        ensure_iterations(iterations)?;

        let first = pool[0].clone();
        let first_score = scorer(&first);
        let mut trace = TraceBuilder::start(first, first_score);

        for _ in 1..iterations
        {
            // Pool is non-empty, so choose always yields
            let Some(candidate) = pool.choose(&mut self.rng)
            else
            {
                break;
            };
            let score = scorer(candidate);
            trace.record(candidate.clone(), score);
        }

        Ok(trace.finish())
    }

    /// Hill-climb from `base`, mutating the current best each iteration.
    pub fn optimize<F>(
        &mut self,
        base: &str,
        iterations: usize,
        mut scorer: F,
    ) -> LabResult<OptimizationTrace>
    where
        F: FnMut(&str) -> f64,
    {
        ensure_iterations(iterations)?;

        let base_score = scorer(base);
        let mut trace = TraceBuilder::start(base.to_string(), base_score);

        for _ in 1..iterations
        {
            let candidate = self.mutate(&trace.best_candidate);
            let score = scorer(&candidate);
            trace.record(candidate, score);
        }

        Ok(trace.finish())
    }

    /// Apply one uniformly chosen mutation. Templates under two words are returned as-is.
    pub fn mutate(
        &mut self,
        template: &str,
    ) -> String
    {
        let mut words: Vec<String> = template
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if words.len() < 2
        {
            return template.to_string();
        }

        let op = Mutation::ALL[self.rng.random_range(0..Mutation::ALL.len())];
        trace!(?op, "mutating template");

        match op
        {
            Mutation::Swap =>
            {
                let i = self.rng.random_range(0..words.len() - 1);
                words.swap(i, i + 1);
            }
            Mutation::Emphasize =>
            {
                let eligible: Vec<usize> = words
                    .iter()
                    .enumerate()
                    .filter(|(_, w)| !w.contains('{') && !is_upper(w))
                    .map(|(i, _)| i)
                    .collect();

                if let Some(&i) = eligible.choose(&mut self.rng)
                {
                    words[i] = if self.rng.random_bool(0.5)
                    {
                        format!("**{}**", words[i])
                    }
                    else
                    {
                        words[i].to_uppercase()
                    };
                }
            }
            Mutation::Reorder =>
            {
                let mut sentences: Vec<&str> = template
                    .split(SENTENCE_SEP)
                    .collect();
                if sentences.len() > 1
                {
                    sentences.shuffle(&mut self.rng);
                    return sentences.join(SENTENCE_SEP);
                }
            }
        }

        words.join(" ")
    }
}

fn ensure_iterations(iterations: usize) -> LabResult<()>
{
    if iterations == 0
    {
        return Err(LabError::invalid("iterations must be at least 1"));
    }

    Ok(())
}

/// True when the word has cased letters and all of them are upper-case
fn is_upper(word: &str) -> bool
{
    let mut cased = word
        .chars()
        .filter(|c| c.is_lowercase() || c.is_uppercase())
        .peekable();

    cased.peek().is_some() && cased.all(char::is_uppercase)
}
