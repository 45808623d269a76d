use crate::{err, Driver, Error, ExistingIndex, IndexCatalog, IndexSpec, Outcome, ProvisionReport, ReportEntry, SkipReason};

/// What to do with one catalog entry given the indexes already present.
#[derive(Debug, PartialEq, Eq)]
enum Plan<'a> {
    /// An index with the same key sequence exists.
    Satisfied(&'a ExistingIndex),

    /// The requested explicit name is taken by an index with other keys.
    NameTaken(&'a ExistingIndex),

    Create,
}

fn plan<'a>(spec: &IndexSpec, existing: &'a [ExistingIndex]) -> Plan<'a> {
    if let Some(index) = existing.iter().find(|index| spec.is_satisfied_by(index)) {
        return Plan::Satisfied(index);
    }

    if let Some(name) = &spec.name {
        if let Some(index) = existing.iter().find(|index| &index.name == name) {
            return Plan::NameTaken(index);
        }
    }

    Plan::Create
}

/// Make sure every index in `catalog` exists, in catalog order.
///
/// Each entry is matched against the live indexes of its collection by key
/// sequence, ignoring names, and created only when nothing matches. Failures
/// are absorbed: they are logged, recorded in the returned report, and the
/// pass moves on to the next entry. The one exception is connectivity: once
/// the database is found unreachable, the remaining entries are reported as
/// skipped without contacting it again.
///
/// Nothing is retried. Running the pass again after fixing the underlying
/// problem (dirty data, a conflicting index) picks up where it left off.
#[tracing::instrument(name = "ensure_indexes", skip_all, fields(entries = catalog.len()))]
pub async fn ensure_indexes(driver: &dyn Driver, catalog: &IndexCatalog) -> ProvisionReport {
    let mut report = ProvisionReport::new();
    // First entry that found the database unreachable
    let mut unreachable: Option<String> = None;

    for spec in catalog {
        let outcome = match &unreachable {
            Some(first) => Outcome::SkippedError(SkipReason::TransientConnectivityFailure(
                format!("database unreachable (see {first})"),
            )),
            None => provision(driver, spec).await,
        };

        if let Some(reason) = outcome.skip_reason() {
            if reason.is_connectivity() && unreachable.is_none() {
                tracing::warn!(
                    error = %reason.detail(),
                    "database unreachable, skipping remaining indexes"
                );
                unreachable = Some(spec.to_string());
                report.mark_aborted();
            }
        }

        log_outcome(spec, &outcome);
        report.push(ReportEntry::new(&spec.collection, spec.index_name(), outcome));
    }

    if report.is_clean() {
        tracing::info!(summary = %report, "indexes provisioned");
    } else {
        tracing::warn!(summary = %report, "indexes provisioned with errors");
    }

    report
}

async fn provision(driver: &dyn Driver, spec: &IndexSpec) -> Outcome {
    let existing = match driver.list_indexes(&spec.collection).await {
        Ok(existing) => existing,
        Err(err) => {
            return skipped(err.context(err!("listing indexes on `{}`", spec.collection)));
        }
    };

    match plan(spec, &existing) {
        Plan::Satisfied(index) => {
            if spec.unique && !index.unique {
                tracing::warn!(
                    collection = %spec.collection,
                    index = %index.name,
                    "index exists without the requested unique constraint"
                );
            }
            return Outcome::SkippedExisting;
        }
        Plan::NameTaken(index) => {
            return Outcome::SkippedError(SkipReason::NameConflict(format!(
                "index `{}` on `{}` already exists with keys [{}]",
                index.name,
                spec.collection,
                display_fields(index)
            )));
        }
        Plan::Create => {}
    }

    match driver.create_index(spec).await {
        Ok(_) => Outcome::Created,
        Err(err) if err.is_index_conflict() => recheck(driver, spec, err).await,
        Err(err) => skipped(err),
    }
}

/// The database rejected the index as conflicting. Another process may have
/// created an equivalent index between listing and creating; if so, the entry
/// is satisfied.
async fn recheck(driver: &dyn Driver, spec: &IndexSpec, conflict: Error) -> Outcome {
    match driver.list_indexes(&spec.collection).await {
        Ok(existing) if existing.iter().any(|index| spec.is_satisfied_by(index)) => {
            Outcome::SkippedExisting
        }
        Ok(_) => skipped(conflict),
        Err(err) => skipped(err.context(err!("listing indexes on `{}`", spec.collection))),
    }
}

fn skipped(err: Error) -> Outcome {
    Outcome::SkippedError(SkipReason::classify(&err))
}

fn log_outcome(spec: &IndexSpec, outcome: &Outcome) {
    let collection = spec.collection.as_str();
    let index = spec.index_name();

    match outcome {
        Outcome::Created => {
            tracing::info!(collection, %index, unique = spec.unique, "index created");
        }
        Outcome::SkippedExisting => {
            tracing::debug!(collection, %index, "index already exists");
        }
        Outcome::SkippedError(reason) => {
            tracing::warn!(
                collection,
                %index,
                reason = reason.label(),
                error = %reason.detail(),
                "index skipped"
            );
        }
    }
}

fn display_fields(index: &ExistingIndex) -> String {
    index
        .fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, IndexField, IndexOp};

    fn existing(name: &str, fields: &[&str]) -> ExistingIndex {
        ExistingIndex::new(
            name,
            fields
                .iter()
                .map(|f| IndexField::new(*f, IndexOp::Sort(Direction::Asc)))
                .collect(),
        )
    }

    #[test]
    fn plan_matches_by_keys_not_name() {
        let indexes = [ExistingIndex::primary_key(), existing("A", &["email"])];
        let spec = IndexSpec::new("users").asc("email").named("B");

        assert_eq!(plan(&spec, &indexes), Plan::Satisfied(&indexes[1]));
    }

    #[test]
    fn plan_detects_taken_name() {
        let indexes = [existing("by_user", &["customerId"])];
        let spec = IndexSpec::new("orders").asc("userId").named("by_user");

        assert_eq!(plan(&spec, &indexes), Plan::NameTaken(&indexes[0]));
    }

    #[test]
    fn plan_default_name_collision_is_left_to_the_database() {
        // Only explicit names are checked up front
        let indexes = [existing("userId_1", &["customerId"])];
        let spec = IndexSpec::new("orders").asc("userId");

        assert_eq!(plan(&spec, &indexes), Plan::Create);
    }

    #[test]
    fn plan_create_when_missing() {
        let spec = IndexSpec::new("cart").asc("userId").unique();
        assert_eq!(plan(&spec, &[ExistingIndex::primary_key()]), Plan::Create);
    }
}
