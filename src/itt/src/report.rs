//! Non-fatal pipeline diagnostics
//!
//! Every recoverable condition the pipeline meets is recorded here in
//! encounter order and later written out as `report.json`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

/// Category of a recorded issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// An expected file or directory was absent or unreadable
    MissingInput,
    /// A record without a usable identity; it was skipped
    MalformedRecord,
    /// A cross-reference that could not be resolved
    UnresolvedReference,
    /// An entity that fell through every classifier tier
    ClassificationMiss,
    /// A later entity dropped in favour of an earlier one with the same key
    DuplicateDropped,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IssueKind::MissingInput => "missing_input",
            IssueKind::MalformedRecord => "malformed_record",
            IssueKind::UnresolvedReference => "unresolved_reference",
            IssueKind::ClassificationMiss => "classification_miss",
            IssueKind::DuplicateDropped => "duplicate_dropped",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    /// What the issue is about (file path, object id, slug)
    pub subject: String,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub issues: Vec<Issue>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: IssueKind, subject: impl Into<String>, detail: impl Into<String>) {
        self.issues.push(Issue {
            kind,
            subject: subject.into(),
            detail: detail.into(),
        });
    }

    pub fn missing_input(&mut self, path: &Path, detail: impl Into<String>) {
        let detail = detail.into();
        tracing::warn!(path = %path.display(), "{}", detail);
        self.push(IssueKind::MissingInput, path.display().to_string(), detail);
    }

    pub fn malformed(&mut self, subject: impl Into<String>, detail: impl Into<String>) {
        let subject = subject.into();
        let detail = detail.into();
        tracing::debug!(%subject, "skipping malformed record: {}", detail);
        self.push(IssueKind::MalformedRecord, subject, detail);
    }

    pub fn unresolved(&mut self, subject: impl Into<String>, detail: impl Into<String>) {
        let subject = subject.into();
        let detail = detail.into();
        tracing::debug!(%subject, "unresolved reference: {}", detail);
        self.push(IssueKind::UnresolvedReference, subject, detail);
    }

    /// Record a classifier miss once per (collection, slug)
    pub fn classification_miss(&mut self, collection: &str, slug: &str) {
        let seen = self
            .of_kind(IssueKind::ClassificationMiss)
            .any(|i| i.subject == slug && i.detail == collection);
        if !seen {
            self.push(IssueKind::ClassificationMiss, slug, collection);
        }
    }

    pub fn duplicate_dropped(&mut self, subject: impl Into<String>, detail: impl Into<String>) {
        let subject = subject.into();
        let detail = detail.into();
        tracing::warn!(%subject, "dropping duplicate: {}", detail);
        self.push(IssueKind::DuplicateDropped, subject, detail);
    }

    pub fn of_kind(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }

    pub fn count(&self, kind: IssueKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issue counts per kind
    pub fn summary(&self) -> BTreeMap<IssueKind, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Slugs that fell through to "unknown", for one collection
    pub fn missing_categories(&self, collection: &str) -> BTreeSet<&str> {
        self.of_kind(IssueKind::ClassificationMiss)
            .filter(|i| i.detail == collection)
            .map(|i| i.subject.as_str())
            .collect()
    }

    pub fn extend(&mut self, other: Report) {
        self.issues.extend(other.issues);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_miss_recorded_once() {
        let mut report = Report::new();
        report.classification_miss("abilities", "mystery-spell");
        report.classification_miss("abilities", "mystery-spell");
        report.classification_miss("items", "mystery-spell");

        assert_eq!(report.count(IssueKind::ClassificationMiss), 2);
        let missing = report.missing_categories("abilities");
        assert!(missing.contains("mystery-spell"));
        assert_eq!(missing.len(), 1);
    }

    #[test]
    fn test_summary_counts_by_kind() {
        let mut report = Report::new();
        report.malformed("I000", "no name");
        report.malformed("I001", "no name");
        report.unresolved("recipe:I002", "ingredient I003 unknown");

        let summary = report.summary();
        assert_eq!(summary.get(&IssueKind::MalformedRecord), Some(&2));
        assert_eq!(summary.get(&IssueKind::UnresolvedReference), Some(&1));
        assert_eq!(summary.get(&IssueKind::MissingInput), None);
    }

    #[test]
    fn test_issue_kind_serializes_snake_case() {
        let json = serde_json::to_string(&IssueKind::DuplicateDropped).unwrap();
        assert_eq!(json, "\"duplicate_dropped\"");
        assert_eq!(IssueKind::MissingInput.to_string(), "missing_input");
    }
}
