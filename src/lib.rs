//! **promptlab** - Offline scoring, comparison and optimization of prompt templates
//!
//! Lexical overlap metrics (ROUGE-N, ROUGE-L), TF-IDF cosine similarity, composite
//! evaluation, two-sample significance testing and seeded template search, plus the
//! catalogs and estimators around them. No model is ever called.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Command handlers wiring the CLI to the core
pub mod cli_ext {
    pub mod ab_cmd;
    pub mod benchmark_cmd;
    pub mod catalog_cmd;
    pub mod cost_cmd;
    pub mod eval_cmd;
    pub mod optimize_cmd;
    pub mod safety_cmd;
}

/// Scoring core and domain collaborators (no clap, no I/O)
pub mod core {
    /// Error taxonomy with miette diagnostics
    pub mod error;
    pub use error::{LabError, LabResult};

    /// Whitespace and keyword tokenization
    pub mod tokenize;

    /// N-gram overlap and longest common subsequence
    pub mod rouge;
    pub use rouge::{Score, lcs_length, lcs_score, ngram_overlap, rouge_l, rouge_n, rouge1, rouge2};

    /// TF-IDF cosine similarity computed from the pair itself
    pub mod similarity;
    pub use similarity::tfidf_cosine;

    /// Weighted composite metrics
    pub mod evaluator;
    pub use evaluator::{EvaluationReport, Evaluator, Metric, QualityReport, QualityRequest};

    /// Two-sample z-test with normal-tail approximation
    pub mod ab_test;
    pub use ab_test::{AbTester, SignificanceResult, VariantSample};

    /// Random and mutation search over templates
    pub mod optimizer;
    pub use optimizer::{OptimizationTrace, Optimizer};

    /// In-memory version history
    pub mod versioning;
    pub use versioning::VersionManager;

    /// `{var}` templates, chains and the builtin registry
    pub mod template;
    pub use template::{PromptChain, PromptTemplate, TemplateRegistry};

    /// `{{var}}` patterns and the builtin library
    pub mod patterns;
    pub use patterns::{PatternLibrary, PromptPattern};

    pub mod techniques;

    /// Business task categories with sample tasks
    pub mod categories;
    pub use categories::CategoryRegistry;

    /// Pattern benchmarks over mock outputs
    pub mod benchmark;
    pub use benchmark::BenchmarkRunner;

    /// Token heuristics, BPE counts and pricing
    pub mod cost;
    pub use cost::{CostCalculator, TokenCounter};

    pub mod safety;
    pub use safety::SafetyChecker;

    /// Markdown report tables
    pub mod report;
}

/// Infrastructure - Configuration, logging, input and utilities
pub mod infra {
    /// Layered configuration (file + PLAB_* env) and `plab init`
    pub mod config;
    pub use config::{Config, load_config};

    /// tracing-subscriber setup
    pub mod logging;

    /// `@file` arguments, score and list files, JSON output
    pub mod io;

    pub mod utils;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use infra::{Config, load_config};

// Core types for external consumers
pub use crate::core::{Evaluator, LabError, LabResult};
