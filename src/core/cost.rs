//! Token estimates and per-provider API cost.

use indexmap::IndexMap;
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use tiktoken_rs::{CoreBPE, cl100k_base, get_bpe_from_model, o200k_base};
use xxhash_rust::xxh64::xxh64;

use crate::core::error::{LabError, LabResult};

/// Fixed overhead added per chat message
pub const MESSAGE_OVERHEAD_TOKENS: usize = 4;

/// Known providers for the character heuristic
const CHARS_PER_TOKEN: [(&str, f64); 3] = [("claude", 3.5), ("openai", 4.0), ("gemini", 4.0)];

const DEFAULT_CHARS_PER_TOKEN: f64 = 4.0;

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message
{
    #[serde(default)]
    pub role: String,
    pub content: String,
}

/// Character-based token heuristic
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCounter;

impl TokenCounter
{
    pub fn chars_per_token(provider: &str) -> f64
    {
        let provider = provider.to_ascii_lowercase();

        CHARS_PER_TOKEN
            .iter()
            .find(|(name, _)| *name == provider)
            .map_or(DEFAULT_CHARS_PER_TOKEN, |(_, c)| *c)
    }

    /// Truncated `chars / chars_per_token`; unknown providers use the default rate
    pub fn count(
        &self,
        text: &str,
        provider: &str,
    ) -> usize
    {
        if text.is_empty()
        {
            return 0;
        }

        (text.chars().count() as f64 / Self::chars_per_token(provider)) as usize
    }

    pub fn count_messages(
        &self,
        messages: &[Message],
        provider: &str,
    ) -> usize
    {
        messages
            .iter()
            .map(|m| self.count(&m.content, provider) + MESSAGE_OVERHEAD_TOKENS)
            .sum()
    }

    /// Cost in USD with rates per 1K tokens
    pub fn estimate_cost(
        &self,
        input_tokens: usize,
        output_tokens: usize,
        input_rate: f64,
        output_rate: f64,
    ) -> f64
    {
        per_thousand(input_tokens, input_rate) + per_thousand(output_tokens, output_rate)
    }
}

fn per_thousand(
    tokens: usize,
    rate: f64,
) -> f64
{
    tokens as f64 / 1000.0 * rate
}

/// Exact BPE token counts with a content-hash cache
pub struct BpeCounter
{
    bpe: CoreBPE,
    cache: Cache<u64, usize>,
}

impl std::fmt::Debug for BpeCounter
{
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result
    {
        f.debug_struct("BpeCounter")
            .field("cached", &self.cache.entry_count())
            .finish()
    }
}

impl BpeCounter
{
    /// Accepts an OpenAI model name or `cl100k_base` / `o200k_base`
    pub fn new(model_or_encoding: &str) -> LabResult<Self>
    {
        let lower = model_or_encoding.to_ascii_lowercase();

        let loaded = match get_bpe_from_model(&lower)
        {
            Ok(b) => Ok(b),
            Err(_) => match lower.as_str()
            {
                "o200k_base" => o200k_base(),
                "cl100k_base" => cl100k_base(),
                _ =>
                {
                    return Err(LabError::not_found(
                        "encoding",
                        model_or_encoding,
                        ["cl100k_base", "o200k_base"],
                    ));
                }
            },
        };

        let bpe = loaded.map_err(|e| LabError::invalid(format!("load {lower}: {e}")))?;

        Ok(Self { bpe, cache: Cache::new(10_000) })
    }

    pub fn count(
        &self,
        text: &str,
    ) -> usize
    {
        let key = xxh64(text.as_bytes(), 0);
        if let Some(n) = self.cache.get(&key)
        {
            return n;
        }

        let n = self.bpe.encode_ordinary(text).len();
        self.cache.insert(key, n);
        n
    }
}

/// USD per 1K tokens
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPrice
{
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

/// provider → model → price, lowercase keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable
{
    providers: IndexMap<String, IndexMap<String, ModelPrice>>,
}

impl Default for PriceTable
{
    fn default() -> Self
    {
        let mut table = Self::empty();

        for (provider, model, input, output) in [
            ("claude", "opus", 0.015, 0.075),
            ("claude", "sonnet", 0.003, 0.015),
            ("claude", "haiku", 0.00025, 0.00125),
            ("openai", "gpt-4", 0.03, 0.06),
            ("openai", "gpt-4-turbo", 0.01, 0.03),
            ("openai", "gpt-3.5-turbo", 0.0005, 0.0015),
            ("gemini", "pro", 0.00025, 0.0005),
            ("gemini", "ultra", 0.01, 0.02),
        ]
        {
            table.insert(provider, model, ModelPrice { input_per_1k: input, output_per_1k: output });
        }

        table
    }
}

impl PriceTable
{
    pub fn empty() -> Self
    {
        Self { providers: IndexMap::new() }
    }

    pub fn insert(
        &mut self,
        provider: &str,
        model: &str,
        price: ModelPrice,
    )
    {
        self.providers
            .entry(provider.to_ascii_lowercase())
            .or_default()
            .insert(model.to_ascii_lowercase(), price);
    }

    pub fn get(
        &self,
        provider: &str,
        model: &str,
    ) -> LabResult<ModelPrice>
    {
        let models = self
            .providers
            .get(&provider.to_ascii_lowercase())
            .ok_or_else(|| LabError::not_found("provider", provider, self.providers.keys()))?;

        models
            .get(&model.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| LabError::not_found("model", model, models.keys()))
    }

    /// (provider, model, price) in table order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, ModelPrice)>
    {
        self.providers
            .iter()
            .flat_map(|(p, models)| {
                models
                    .iter()
                    .map(move |(m, price)| (p.as_str(), m.as_str(), *price))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate
{
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
    pub provider: String,
    pub model: String,
}

#[derive(Debug, Clone, Default)]
pub struct CostCalculator
{
    prices: PriceTable,
}

impl CostCalculator
{
    pub fn new(prices: PriceTable) -> Self
    {
        Self { prices }
    }

    pub fn prices(&self) -> &PriceTable
    {
        &self.prices
    }

    pub fn estimate(
        &self,
        input_tokens: usize,
        output_tokens: usize,
        provider: &str,
        model: &str,
    ) -> LabResult<CostEstimate>
    {
        let price = self.prices.get(provider, model)?;
        Ok(build_estimate(input_tokens, output_tokens, provider, model, price))
    }

    /// Every priced model, cheapest first
    pub fn compare_providers(
        &self,
        input_tokens: usize,
        output_tokens: usize,
    ) -> Vec<CostEstimate>
    {
        let mut all: Vec<CostEstimate> = self
            .prices
            .iter()
            .map(|(p, m, price)| build_estimate(input_tokens, output_tokens, p, m, price))
            .collect();

        all.sort_by(|a, b| a.total_cost.total_cmp(&b.total_cost));
        all
    }
}

fn build_estimate(
    input_tokens: usize,
    output_tokens: usize,
    provider: &str,
    model: &str,
    price: ModelPrice,
) -> CostEstimate
{
    let input_cost = per_thousand(input_tokens, price.input_per_1k);
    let output_cost = per_thousand(output_tokens, price.output_per_1k);

    CostEstimate {
        input_cost,
        output_cost,
        total_cost: input_cost + output_cost,
        provider: provider.to_string(),
        model: model.to_string(),
    }
}
