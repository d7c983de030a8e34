use super::executor::{OperationResult, SweepMode};
use super::model::SelectionModel;

/// What the reconciliation changed on the canonical model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub removed: usize,
    pub renamed: usize,
}

/// Folds a batch result back into the canonical model with the minimal
/// mutation instead of a re-fetch: succeeded deletes are removed by
/// name+SHA identity, succeeded archives are renamed in place so selection
/// flags and target-branch context survive the operation.
pub fn apply(model: &mut SelectionModel, result: &OperationResult) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();

    for branch in &result.succeeded {
        match result.mode {
            SweepMode::Delete => {
                if model.remove_by_identity(&branch.name, &branch.sha) {
                    summary.removed += 1;
                }
            }
            SweepMode::Archive => {
                if let Some(archived_name) = &branch.archived_name {
                    if model.rename_record(&branch.name, &branch.sha, archived_name) {
                        summary.renamed += 1;
                    }
                }
            }
        }
    }

    model.finish_reconcile(summary.removed, summary.renamed);
    summary
}
