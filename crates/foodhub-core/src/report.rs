use crate::Error;

use std::fmt;

/// Result of provisioning a single catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The index did not exist and was created.
    Created,

    /// An index with the same key sequence already exists, possibly under a
    /// different name.
    SkippedExisting,

    /// The entry could not be provisioned. Other entries are unaffected.
    SkippedError(SkipReason),
}

/// Why a catalog entry was skipped.
///
/// Each variant carries the human-readable detail of the underlying failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The requested name is taken by an index with different keys, or the
    /// database rejected the index as conflicting with an existing one.
    NameConflict(String),

    /// Existing documents violate the requested uniqueness constraint.
    DuplicateDataViolation(String),

    /// The database could not be reached.
    TransientConnectivityFailure(String),

    /// Any other failure reported by the database.
    UnclassifiedDatabaseError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub collection: String,

    /// Index name as requested (explicit or default)
    pub index: String,

    pub outcome: Outcome,
}

/// Ordered record of one provisioning pass, one entry per catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    entries: Vec<ReportEntry>,
    aborted: bool,
}

impl Outcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Outcome::Created)
    }

    pub fn is_skipped_existing(&self) -> bool {
        matches!(self, Outcome::SkippedExisting)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::SkippedError(_))
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            Outcome::SkippedError(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created => f.write_str("created"),
            Outcome::SkippedExisting => f.write_str("skipped-existing"),
            Outcome::SkippedError(reason) => write!(f, "skipped-error({reason})"),
        }
    }
}

impl SkipReason {
    /// Classifies a driver error. Connectivity wins over everything else
    /// since it says nothing about the index itself.
    pub fn classify(err: &Error) -> SkipReason {
        let detail = err.to_string();

        if err.is_connectivity() {
            SkipReason::TransientConnectivityFailure(detail)
        } else if err.is_duplicate_data() {
            SkipReason::DuplicateDataViolation(detail)
        } else if err.is_index_conflict() {
            SkipReason::NameConflict(detail)
        } else {
            SkipReason::UnclassifiedDatabaseError(detail)
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::NameConflict(_) => "name-conflict",
            SkipReason::DuplicateDataViolation(_) => "duplicate-data-violation",
            SkipReason::TransientConnectivityFailure(_) => "transient-connectivity-failure",
            SkipReason::UnclassifiedDatabaseError(_) => "unclassified-database-error",
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            SkipReason::NameConflict(detail)
            | SkipReason::DuplicateDataViolation(detail)
            | SkipReason::TransientConnectivityFailure(detail)
            | SkipReason::UnclassifiedDatabaseError(detail) => detail,
        }
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, SkipReason::TransientConnectivityFailure(_))
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label(), self.detail())
    }
}

impl ReportEntry {
    pub fn new(collection: impl Into<String>, index: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            collection: collection.into(),
            index: index.into(),
            outcome,
        }
    }
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.collection, self.index, self.outcome)
    }
}

impl ProvisionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    /// Marks the pass as stopped early because the database became
    /// unreachable.
    pub fn mark_aborted(&mut self) {
        self.aborted = true;
    }

    pub fn aborted(&self) -> bool {
        self.aborted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReportEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn get(&self, collection: &str, index: &str) -> Option<&ReportEntry> {
        self.entries
            .iter()
            .find(|e| e.collection == collection && e.index == index)
    }

    pub fn created(&self) -> usize {
        self.count(Outcome::is_created)
    }

    pub fn skipped_existing(&self) -> usize {
        self.count(Outcome::is_skipped_existing)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| e.outcome.is_error())
    }

    /// Returns `true` when every entry was created or already present.
    pub fn is_clean(&self) -> bool {
        self.errors().next().is_none()
    }

    fn count(&self, f: impl Fn(&Outcome) -> bool) -> usize {
        self.entries.iter().filter(|e| f(&e.outcome)).count()
    }
}

impl<'a> IntoIterator for &'a ProvisionReport {
    type Item = &'a ReportEntry;
    type IntoIter = std::slice::Iter<'a, ReportEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for ProvisionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} already present, {} failed",
            self.created(),
            self.skipped_existing(),
            self.errors().count()
        )?;
        if self.aborted {
            f.write_str(" (aborted: database unreachable)")?;
        }
        Ok(())
    }
}
