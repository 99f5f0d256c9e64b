//! Error taxonomy shared by the scoring core and its collaborators.
//!
//! Degenerate inputs (empty strings, zero token counts, empty topic lists)
//! never surface here; they resolve to numeric fallbacks at the call site.

use miette::Diagnostic;

/// Errors raised by library operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Diagnostic)]
pub enum LabError
{
    /// A required collection was empty or arguments were inconsistent
    #[error("invalid input: {0}")]
    #[diagnostic(code(promptlab::invalid_input))]
    InvalidInput(String),

    /// Lookup by id or name failed
    #[error("{kind} '{name}' not found")]
    #[diagnostic(code(promptlab::not_found), help("available: {available}"))]
    NotFound
    {
        kind: &'static str,
        name: String,
        available: String,
    },

    /// Rendering left placeholders without a value
    #[error("missing required variables: {}", .0.join(", "))]
    #[diagnostic(
        code(promptlab::missing_variables),
        help("pass a value for every placeholder, e.g. --var name=value")
    )]
    MissingVariables(Vec<String>),
}

impl LabError
{
    /// Build a `NotFound` error listing the names a caller could have used
    pub fn not_found<I, S>(
        kind: &'static str,
        name: &str,
        available: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let available = available
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        LabError::NotFound { kind, name: name.to_string(), available }
    }

    /// Shorthand for `InvalidInput`
    pub fn invalid(msg: impl Into<String>) -> Self
    {
        LabError::InvalidInput(msg.into())
    }
}

/// Result alias used across the core
pub type LabResult<T> = Result<T, LabError>;

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_not_found_lists_available_names()
    {
        let err = LabError::not_found("template", "missing", ["analyze", "compare"]);

        assert_eq!(err.to_string(), "template 'missing' not found");
        match err
        {
            LabError::NotFound { available, .. } => assert_eq!(available, "analyze, compare"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_variables_message_lists_all()
    {
        let err = LabError::MissingVariables(vec!["text".into(), "word_count".into()]);
        assert_eq!(err.to_string(), "missing required variables: text, word_count");
    }
}
