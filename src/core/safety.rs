//! Prompt screening: injection phrases, blocked terms and PII.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::debug;

use crate::core::error::{LabError, LabResult};

const INJECTION_PATTERNS: [&str; 10] = [
    r"ignore\s+(all\s+)?previous\s+instructions",
    r"disregard\s+(all\s+)?(previous|above|prior)",
    r"you\s+are\s+now",
    r"^system\s*:",
    r"act\s+as\s+(a\s+)?different",
    r"forget\s+(everything|all|your)\s+(you|instructions|rules)",
    r"new\s+instructions?\s*:",
    r"override\s+(your|the)\s+(instructions|rules|prompt)",
    r"pretend\s+(you\s+are|to\s+be)",
    r"switch\s+(to|into)\s+.*(mode|role)",
];

pub const BLOCKED_TERMS: [&str; 6] =
    ["hack", "exploit", "malware", "ransomware", "phishing", "keylogger"];

/// Score added per violation before capping at 1.0
const RISK_PER_VIOLATION: f64 = 0.3;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9_.+\-]+@[a-zA-Z0-9\-]+\.[a-zA-Z0-9\-.]+").expect("email regex compiles")
});
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}[\-.]?\d{3}[\-.]?\d{4}\b").expect("phone regex compiles"));
static SSN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("ssn regex compiles"));

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetyResult
{
    pub safe: bool,
    /// `injection_attempt`, `blocked_term:<term>`, `pii_detected`
    pub violations: Vec<String>,
    pub sanitized: String,
    pub risk_score: f64,
}

#[derive(Debug, Clone)]
pub struct SafetyChecker
{
    injection: Vec<Regex>,
}

impl SafetyChecker
{
    /// Builtin injection patterns only
    pub fn new() -> Self
    {
        Self { injection: INJECTION_PATTERNS.iter().filter_map(|p| compile(p).ok()).collect() }
    }

    /// Builtins plus caller patterns, matched case-insensitively
    pub fn with_patterns<S: AsRef<str>>(custom: &[S]) -> LabResult<Self>
    {
        let mut checker = Self::new();
        for p in custom
        {
            let re = compile(p.as_ref()).map_err(|e| {
                LabError::invalid(format!("invalid injection pattern '{}': {e}", p.as_ref()))
            })?;
            checker.injection.push(re);
        }

        Ok(checker)
    }

    pub fn detect_injection(
        &self,
        text: &str,
    ) -> bool
    {
        self.injection
            .iter()
            .any(|re| re.is_match(text))
    }

    /// `blocked_term:<term>` for every blocked term found as a substring
    pub fn check_content_policy(
        &self,
        text: &str,
    ) -> Vec<String>
    {
        let lower = text.to_lowercase();

        BLOCKED_TERMS
            .iter()
            .filter(|t| lower.contains(*t))
            .map(|t| format!("blocked_term:{t}"))
            .collect()
    }

    pub fn contains_pii(text: &str) -> bool
    {
        EMAIL_RE.is_match(text) || PHONE_RE.is_match(text) || SSN_RE.is_match(text)
    }

    /// Emails first, then SSNs, then phones
    pub fn mask_pii(text: &str) -> String
    {
        let masked = EMAIL_RE.replace_all(text, "[EMAIL]");
        let masked = SSN_RE.replace_all(&masked, "[SSN]");
        PHONE_RE
            .replace_all(&masked, "[PHONE]")
            .into_owned()
    }

    /// Strip injection phrases, mask PII, trim
    pub fn sanitize(
        &self,
        text: &str,
    ) -> String
    {
        let mut out = text.to_string();
        for re in &self.injection
        {
            out = re.replace_all(&out, "").into_owned();
        }

        Self::mask_pii(&out).trim().to_string()
    }

    pub fn check(
        &self,
        text: &str,
    ) -> SafetyResult
    {
        let mut violations = Vec::new();

        if self.detect_injection(text)
        {
            violations.push("injection_attempt".to_string());
        }
        violations.extend(self.check_content_policy(text));
        if Self::contains_pii(text)
        {
            violations.push("pii_detected".to_string());
        }

        let risk = (violations.len() as f64 * RISK_PER_VIOLATION).min(1.0);
        debug!(violations = violations.len(), risk, "safety check");

        SafetyResult {
            safe: violations.is_empty(),
            sanitized: self.sanitize(text),
            risk_score: (risk * 100.0).round() / 100.0,
            violations,
        }
    }
}

impl Default for SafetyChecker
{
    fn default() -> Self
    {
        Self::new()
    }
}

fn compile(pattern: &str) -> Result<Regex, regex::Error>
{
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_builtin_patterns_all_compile()
    {
        assert_eq!(SafetyChecker::new().injection.len(), INJECTION_PATTERNS.len());
    }

    #[test]
    fn test_system_prefix_only_at_start()
    {
        let c = SafetyChecker::new();
        assert!(c.detect_injection("SYSTEM: obey"));
        assert!(!c.detect_injection("the system: fine"));
    }

    #[test]
    fn test_ssn_masked_before_phone()
    {
        assert_eq!(SafetyChecker::mask_pii("id 123-45-6789"), "id [SSN]");
    }
}
