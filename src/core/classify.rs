use super::model::{BranchRecord, MergeStatus, SelectionModel};
use super::remote::RemoteApi;
use crate::utils::Result;

/// Turns fetched branches into a classified [`SelectionModel`].
pub struct Classifier<'a, R: RemoteApi + ?Sized> {
    remote: &'a R,
    project: &'a str,
}

impl<'a, R: RemoteApi + ?Sized> Classifier<'a, R> {
    pub fn new(remote: &'a R, project: &'a str) -> Self {
        Self { remote, project }
    }

    /// Fetches all branches and classifies them against the given target.
    pub fn build_model(&self, target: Option<&str>) -> Result<SelectionModel> {
        let raw = self.remote.list_branches(self.project)?;
        let records: Vec<BranchRecord> = raw.iter().map(BranchRecord::from_raw).collect();

        let mut model = SelectionModel::new();
        model.replace_records(records);
        model.set_target_branch(target.map(str::to_string));
        self.refresh_merge_status(&mut model)?;
        Ok(model)
    }

    /// Recomputes every record's merge flag against the model's target
    /// branch. Without a target all flags reset to not-merged and no merge
    /// request queries are issued. The target branch itself always counts as
    /// not merged.
    pub fn refresh_merge_status(&self, model: &mut SelectionModel) -> Result<()> {
        let Some(target) = model.target_branch().map(str::to_string) else {
            model.reset_merge_status();
            return Ok(());
        };

        let names: Vec<String> = model
            .records()
            .iter()
            .map(|record| record.name().to_string())
            .collect();

        let mut statuses = Vec::with_capacity(names.len());
        for name in names {
            let status = if name == target {
                MergeStatus::NotMerged
            } else if self.remote.is_merged_into(self.project, &name, &target)? {
                MergeStatus::Merged
            } else {
                MergeStatus::NotMerged
            };
            statuses.push((name, status));
        }

        model.apply_merge_statuses(&statuses);
        Ok(())
    }
}
