use crate::{
    api::MutationOutcome,
    banish::{Strategy, Target, Termination},
    error::Error,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;

/// Counters for one enumerated collection (actions or questions)
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub target: Target,
    pub termination: Termination,
    pub pages_fetched: u32,
    pub items_seen: usize,
    pub unique_nodes: usize,
    pub deleted: usize,
    pub scrubbed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl TargetReport {
    #[must_use]
    pub const fn new(target: Target, termination: Termination) -> Self {
        Self {
            target,
            termination,
            pages_fetched: 0,
            items_seen: 0,
            unique_nodes: 0,
            deleted: 0,
            scrubbed: 0,
            skipped: 0,
            failed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Deactivation {
    /// Not attempted yet (or the run aborted before it)
    Pending,
    Done,
    Failed,
    /// Dry run or account explicitly kept
    Skipped,
}

impl fmt::Display for Deactivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Pending => "account not deactivated",
            Self::Done => "account deactivated",
            Self::Failed => "account deactivation failed",
            Self::Skipped => "account left active",
        };
        write!(f, "{text}")
    }
}

/// Summary of a run, printed at the end as text or JSON
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub user_id: u64,
    pub strategy: Strategy,
    pub dry_run: bool,
    pub targets: Vec<TargetReport>,
    pub failures: Vec<MutationOutcome>,
    pub deactivation: Deactivation,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Why the run stopped early, if it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Report {
    #[must_use]
    pub fn new(user_id: u64, strategy: Strategy, dry_run: bool) -> Self {
        Self {
            user_id,
            strategy,
            dry_run,
            targets: Vec::new(),
            failures: Vec::new(),
            deactivation: Deactivation::Pending,
            started_at: Utc::now(),
            finished_at: None,
            error: None,
        }
    }

    #[must_use]
    pub fn deleted(&self) -> usize {
        self.targets.iter().map(|t| t.deleted).sum()
    }

    #[must_use]
    pub fn scrubbed(&self) -> usize {
        self.targets.iter().map(|t| t.scrubbed).sum()
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.targets.iter().map(|t| t.skipped).sum()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn abort(&mut self, err: &Error) {
        self.error = Some(err.to_string());
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "user {} ({}{}): {} deleted, {} scrubbed, {} skipped, {} failed, {}",
            self.user_id,
            self.strategy,
            if self.dry_run { ", dry run" } else { "" },
            self.deleted(),
            self.scrubbed(),
            self.skipped(),
            self.failed(),
            self.deactivation
        )?;

        for t in &self.targets {
            writeln!(
                f,
                "  {} [{}]: {} pages, {} items, {} nodes, {} deleted, {} scrubbed, {} skipped, {} failed",
                t.target,
                t.termination,
                t.pages_fetched,
                t.items_seen,
                t.unique_nodes,
                t.deleted,
                t.scrubbed,
                t.skipped,
                t.failed
            )?;
        }

        for failure in &self.failures {
            writeln!(
                f,
                "  failed: {} {} (status {})",
                failure.operation, failure.target, failure.status
            )?;
        }

        if let Some(error) = &self.error {
            writeln!(f, "  aborted: {error}")?;
        }

        write!(
            f,
            "  started {}",
            self.started_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
        if let Some(finished) = self.finished_at {
            write!(
                f,
                ", finished {}",
                finished.to_rfc3339_opts(SecondsFormat::Secs, true)
            )?;
        }

        Ok(())
    }
}
