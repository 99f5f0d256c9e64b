//! In-memory prompt version history with an active pointer.
//!
//! Versions are append-only; rollback only moves the active pointer.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use similar::TextDiff;
use tracing::debug;

use crate::core::error::{LabError, LabResult};
use crate::core::evaluator::round4;
use crate::infra::utils::TextUtils;

/// Characters of template kept in changelog previews
const PREVIEW_CHARS: usize = 80;

/// Free-form metadata attached to a version
pub type Metadata = BTreeMap<String, Value>;

/// One recorded template version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptVersion
{
    pub id: String,
    pub template: String,
    pub created_at: DateTime<Utc>,
    pub metadata: Metadata,
    /// Metric name → last recorded value
    pub performance: BTreeMap<String, f64>,
}

/// Word-level and character-level difference between two versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionDiff
{
    pub version_a: String,
    pub version_b: String,
    /// Words in b but not a, sorted
    pub added_words: Vec<String>,
    /// Words in a but not b, sorted
    pub removed_words: Vec<String>,
    /// Character-level similarity ratio in [0, 1], 4 dp
    pub similarity: f64,
}

/// Changelog line for one version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangelogEntry
{
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub metadata: Metadata,
    pub template_preview: String,
}

/// Version store; not internally synchronized
#[derive(Debug, Default)]
pub struct VersionManager
{
    versions: IndexMap<String, PromptVersion>,
    active: Option<String>,
}

impl VersionManager
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Record a new version and make it active
    pub fn create(
        &mut self,
        template: impl Into<String>,
        metadata: Metadata,
    ) -> &PromptVersion
    {
        let id = self.fresh_id();
        let version = PromptVersion {
            id: id.clone(),
            template: template.into(),
            created_at: Utc::now(),
            metadata,
            performance: BTreeMap::new(),
        };

        debug!(id = %id, "created prompt version");

        self.active = Some(id.clone());
        self.versions
            .entry(id)
            .or_insert(version)
    }

    /// 8 hex characters, unique within this manager
    fn fresh_id(&self) -> String
    {
        let mut rng = rand::rng();

        loop
        {
            let id = format!("{:08x}", rng.random::<u32>());
            if !self.versions.contains_key(&id)
            {
                return id;
            }
        }
    }

    fn missing(
        &self,
        id: &str,
    ) -> LabError
    {
        LabError::not_found("version", id, self.versions.keys())
    }

    pub fn contains(
        &self,
        id: &str,
    ) -> bool
    {
        self.versions.contains_key(id)
    }

    pub fn get(
        &self,
        id: &str,
    ) -> LabResult<&PromptVersion>
    {
        self.versions
            .get(id)
            .ok_or_else(|| self.missing(id))
    }

    /// All versions in creation order
    pub fn list(&self) -> Vec<&PromptVersion>
    {
        self.versions.values().collect()
    }

    pub fn len(&self) -> usize
    {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.versions.is_empty()
    }

    pub fn active(&self) -> Option<&PromptVersion>
    {
        self.active
            .as_deref()
            .and_then(|id| self.versions.get(id))
    }

    /// Point the active marker at an existing version
    pub fn rollback(
        &mut self,
        id: &str,
    ) -> LabResult<&PromptVersion>
    {
        if !self.versions.contains_key(id)
        {
            return Err(self.missing(id));
        }

        debug!(id, "rolled back active version");
        self.active = Some(id.to_string());
        self.get(id)
    }

    /// Merge metrics into a version's performance record
    pub fn record_performance(
        &mut self,
        id: &str,
        metrics: impl IntoIterator<Item = (String, f64)>,
    ) -> LabResult<()>
    {
        match self.versions.get_mut(id)
        {
            Some(version) =>
            {
                version.performance.extend(metrics);
                Ok(())
            }
            None => Err(self.missing(id)),
        }
    }

    /// Version with the best recorded value for `metric`, if any recorded it
    pub fn best(
        &self,
        metric: &str,
        higher_is_better: bool,
    ) -> Option<&PromptVersion>
    {
        let scored = self
            .versions
            .values()
            .filter_map(|v| v.performance.get(metric).map(|&s| (v, s)));

        let pick = if higher_is_better
        {
            scored.max_by(|a, b| a.1.total_cmp(&b.1))
        }
        else
        {
            scored.min_by(|a, b| a.1.total_cmp(&b.1))
        };

        pick.map(|(v, _)| v)
    }

    pub fn diff(
        &self,
        id_a: &str,
        id_b: &str,
    ) -> LabResult<VersionDiff>
    {
        let a = self.get(id_a)?;
        let b = self.get(id_b)?;

        let words_a: BTreeSet<&str> = a.template.split_whitespace().collect();
        let words_b: BTreeSet<&str> = b.template.split_whitespace().collect();

        let added_words = words_b
            .difference(&words_a)
            .map(|w| w.to_string())
            .collect();
        let removed_words = words_a
            .difference(&words_b)
            .map(|w| w.to_string())
            .collect();

        let ratio = TextDiff::from_chars(a.template.as_str(), b.template.as_str()).ratio();

        Ok(VersionDiff {
            version_a: id_a.to_string(),
            version_b: id_b.to_string(),
            added_words,
            removed_words,
            similarity: round4(f64::from(ratio)),
        })
    }

    pub fn changelog(&self) -> Vec<ChangelogEntry>
    {
        self.versions
            .values()
            .map(|v| ChangelogEntry {
                id: v.id.clone(),
                created_at: v.created_at,
                metadata: v.metadata.clone(),
                template_preview: TextUtils::preview(&v.template, PREVIEW_CHARS).to_string(),
            })
            .collect()
    }
}
