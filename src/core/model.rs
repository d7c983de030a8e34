use chrono::{DateTime, Utc};

use super::remote::RawBranch;

/// Merge classification of a branch against the current target branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStatus {
    Unknown,
    Merged,
    NotMerged,
}

impl MergeStatus {
    pub fn is_merged(self) -> bool {
        matches!(self, MergeStatus::Merged)
    }
}

/// One branch at a point in classification time.
///
/// `last_commit_sha` is the optimistic-concurrency token used at
/// delete/archive time and is never mutated after construction. The name is
/// only mutable through the reconciliation rename.
#[derive(Debug, Clone)]
pub struct BranchRecord {
    name: String,
    last_commit_sha: String,
    pub last_commit_at: Option<DateTime<Utc>>,
    pub is_protected: bool,
    pub is_default: bool,
    pub developers_can_push: bool,
    pub developers_can_merge: bool,
    pub can_push: bool,
    pub merged_into_target: MergeStatus,
    pub is_selected: bool,
}

impl BranchRecord {
    pub fn from_raw(raw: &RawBranch) -> Self {
        let last_commit_at = raw
            .commit
            .committed_date
            .as_deref()
            .and_then(|date| DateTime::parse_from_rfc3339(date).ok())
            .map(|date| date.with_timezone(&Utc));

        Self {
            name: raw.name.clone(),
            last_commit_sha: raw.commit.id.clone(),
            last_commit_at,
            is_protected: raw.protected,
            is_default: raw.is_default,
            developers_can_push: raw.developers_can_push,
            developers_can_merge: raw.developers_can_merge,
            can_push: raw.can_push,
            merged_into_target: MergeStatus::Unknown,
            is_selected: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn last_commit_sha(&self) -> &str {
        &self.last_commit_sha
    }

    /// Same logical branch: name and SHA both match.
    pub fn matches_identity(&self, name: &str, sha: &str) -> bool {
        self.name == name && self.last_commit_sha == sha
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

/// Change notification emitted by [`SelectionModel`] on every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    RecordsReplaced,
    TargetChanged,
    SelectionChanged,
    Reconciled { removed: usize, renamed: usize },
}

pub type Observer = Box<dyn Fn(&ModelEvent) + Send>;

/// The canonical mutable set of branch records for a working context, kept
/// sorted case-insensitively by name.
///
/// Two instances may exist side by side: the canonical one and a
/// confirmation-scoped snapshot. Snapshots share no mutable state, so
/// filtering inside a confirmation step never leaks into the canonical
/// model until the caller folds results back through reconciliation.
#[derive(Default)]
pub struct SelectionModel {
    records: Vec<BranchRecord>,
    target_branch: Option<String>,
    observers: Vec<Observer>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[BranchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn target_branch(&self) -> Option<&str> {
        self.target_branch.as_deref()
    }

    pub fn subscribe(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    /// Replaces the whole record set, re-sorting it by name.
    pub fn replace_records(&mut self, records: Vec<BranchRecord>) {
        self.records = records;
        self.sort_records();
        self.notify(ModelEvent::RecordsReplaced);
    }

    /// Stores the new target and invalidates every merge flag. The actual
    /// re-classification is the classifier's job; with no target the flags
    /// stay reset and no network calls are warranted.
    pub fn set_target_branch(&mut self, target: Option<String>) {
        self.target_branch = target;
        let reset = match self.target_branch {
            Some(_) => MergeStatus::Unknown,
            None => MergeStatus::NotMerged,
        };
        for record in &mut self.records {
            record.merged_into_target = reset;
        }
        self.notify(ModelEvent::TargetChanged);
    }

    pub(crate) fn reset_merge_status(&mut self) {
        for record in &mut self.records {
            record.merged_into_target = MergeStatus::NotMerged;
        }
    }

    pub(crate) fn apply_merge_statuses(&mut self, statuses: &[(String, MergeStatus)]) {
        for (name, status) in statuses {
            if let Some(record) = self.records.iter_mut().find(|record| record.name() == name) {
                record.merged_into_target = *status;
            }
        }
    }

    /// Sets `is_selected` on every record matching the predicate; non-matches
    /// are left alone. The target branch itself never becomes selected.
    /// Returns how many records actually changed.
    pub fn bulk_set_selected(
        &mut self,
        predicate: impl Fn(&BranchRecord) -> bool,
        selected: bool,
    ) -> usize {
        let target = self.target_branch.clone();
        let mut changed = 0;
        for record in &mut self.records {
            if selected && target.as_deref() == Some(record.name()) {
                continue;
            }
            if record.is_selected != selected && predicate(record) {
                record.is_selected = selected;
                changed += 1;
            }
        }
        if changed > 0 {
            self.notify(ModelEvent::SelectionChanged);
        }
        changed
    }

    /// Flips a single record's selection. Returns the new state, or `None`
    /// when the record does not exist or is the target branch.
    pub fn toggle_selected(&mut self, name: &str) -> Option<bool> {
        if self.target_branch.as_deref() == Some(name) {
            return None;
        }
        let selected = {
            let record = self
                .records
                .iter_mut()
                .find(|record| record.name() == name)?;
            record.is_selected = !record.is_selected;
            record.is_selected
        };
        self.notify(ModelEvent::SelectionChanged);
        Some(selected)
    }

    /// Deep, independently-mutable duplicate for a confirmation step.
    /// Observers are not carried over.
    pub fn snapshot_copy(&self) -> SelectionModel {
        SelectionModel {
            records: self.records.clone(),
            target_branch: self.target_branch.clone(),
            observers: Vec::new(),
        }
    }

    pub fn selected(&self) -> Vec<BranchRecord> {
        self.records
            .iter()
            .filter(|record| record.is_selected)
            .cloned()
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.records.iter().filter(|record| record.is_selected).count()
    }

    pub(crate) fn remove_by_identity(&mut self, name: &str, sha: &str) -> bool {
        let before = self.records.len();
        self.records
            .retain(|record| !record.matches_identity(name, sha));
        self.records.len() != before
    }

    pub(crate) fn rename_record(&mut self, name: &str, sha: &str, new_name: &str) -> bool {
        match self
            .records
            .iter_mut()
            .find(|record| record.matches_identity(name, sha))
        {
            Some(record) => {
                record.set_name(new_name.to_string());
                true
            }
            None => false,
        }
    }

    pub(crate) fn finish_reconcile(&mut self, removed: usize, renamed: usize) {
        self.sort_records();
        self.notify(ModelEvent::Reconciled { removed, renamed });
    }

    fn sort_records(&mut self) {
        self.records
            .sort_by_key(|record| record.name().to_lowercase());
    }

    fn notify(&self, event: ModelEvent) {
        for observer in &self.observers {
            observer(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::remote::mock::raw_branch;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn record(name: &str) -> BranchRecord {
        BranchRecord::from_raw(&raw_branch(name, "aaa111", None))
    }

    fn model_with(names: &[&str]) -> SelectionModel {
        let mut model = SelectionModel::new();
        model.replace_records(names.iter().map(|name| record(name)).collect());
        model
    }

    #[test]
    fn test_records_sorted_case_insensitively() {
        let model = model_with(&["Zulu", "alpha", "Beta"]);
        let names: Vec<&str> = model.records().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["alpha", "Beta", "Zulu"]);
    }

    #[test]
    fn test_unparseable_commit_date_becomes_none() {
        let raw = raw_branch("x", "aaa", Some("not-a-date"));
        let record = BranchRecord::from_raw(&raw);
        assert!(record.last_commit_at.is_none());
    }

    #[test]
    fn test_set_target_branch_resets_merge_flags() {
        let mut model = model_with(&["a", "b"]);
        model.apply_merge_statuses(&[("a".to_string(), MergeStatus::Merged)]);

        model.set_target_branch(Some("main".to_string()));
        assert!(model
            .records()
            .iter()
            .all(|r| r.merged_into_target == MergeStatus::Unknown));

        model.set_target_branch(None);
        assert!(model
            .records()
            .iter()
            .all(|r| r.merged_into_target == MergeStatus::NotMerged));
    }

    #[test]
    fn test_bulk_set_selected_leaves_non_matches_alone() {
        let mut model = model_with(&["feature-1", "feature-2", "main"]);
        model.bulk_set_selected(|r| r.name().starts_with("feature"), true);

        let selected: Vec<String> = model
            .selected()
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(selected, vec!["feature-1", "feature-2"]);

        // Excluding feature-2 must not re-select or deselect anything else.
        model.bulk_set_selected(|r| r.name() == "feature-2", false);
        assert_eq!(model.selected_count(), 1);
    }

    #[test]
    fn test_target_branch_is_never_bulk_selected() {
        let mut model = model_with(&["main", "old"]);
        model.set_target_branch(Some("main".to_string()));

        let changed = model.bulk_set_selected(|_| true, true);
        assert_eq!(changed, 1);
        assert!(model
            .records()
            .iter()
            .find(|r| r.name() == "main")
            .map(|r| !r.is_selected)
            .unwrap_or(false));
    }

    #[test]
    fn test_toggle_selected_refuses_target() {
        let mut model = model_with(&["main", "old"]);
        model.set_target_branch(Some("main".to_string()));

        assert_eq!(model.toggle_selected("main"), None);
        assert_eq!(model.toggle_selected("old"), Some(true));
        assert_eq!(model.toggle_selected("old"), Some(false));
        assert_eq!(model.toggle_selected("ghost"), None);
    }

    #[test]
    fn test_snapshot_copy_is_independent() {
        let mut model = model_with(&["a", "b"]);
        let mut snapshot = model.snapshot_copy();

        snapshot.bulk_set_selected(|_| true, true);
        assert_eq!(snapshot.selected_count(), 2);
        assert_eq!(model.selected_count(), 0);

        model.toggle_selected("a");
        assert_eq!(snapshot.selected().len(), 2);
    }

    #[test]
    fn test_observers_fire_on_mutation() {
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = counter.clone();

        let mut model = SelectionModel::new();
        model.subscribe(Box::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        model.replace_records(vec![record("a")]);
        model.set_target_branch(Some("main".to_string()));
        model.toggle_selected("a");

        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_remove_by_identity_requires_matching_sha() {
        let mut model = model_with(&["a", "b"]);
        assert!(!model.remove_by_identity("a", "other-sha"));
        assert_eq!(model.len(), 2);
        assert!(model.remove_by_identity("a", "aaa111"));
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_rename_record_preserves_flags() {
        let mut model = model_with(&["old"]);
        model.toggle_selected("old");

        assert!(model.rename_record("old", "aaa111", "archive/old"));
        let record = &model.records()[0];
        assert_eq!(record.name(), "archive/old");
        assert!(record.is_selected);
    }
}
