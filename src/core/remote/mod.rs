pub mod gitlab;
pub mod mock;
pub mod types;

pub use gitlab::GitLabRemote;
pub use mock::{MockCall, MockRemote};
pub use types::{RawBranch, RawCommit, RawMergeRequest};

use crate::utils::Result;

/// Page size used for every paginated listing call.
pub const PAGE_SIZE: usize = 100;

/// The hosting-service seam. Everything the engine does against the remote
/// goes through this trait, so the classifier and executor can be driven by
/// `MockRemote` in tests.
///
/// Implementations hold no branch state between calls.
pub trait RemoteApi {
    /// Fetch every branch of the project, walking all pages.
    fn list_branches(&self, project: &str) -> Result<Vec<RawBranch>>;

    /// Fetch a single branch by name. `Ok(None)` means the branch does not
    /// exist on the remote (anymore).
    fn branch(&self, project: &str, name: &str) -> Result<Option<RawBranch>>;

    /// Whether a merged merge request exists with the given source and
    /// target branch.
    fn is_merged_into(&self, project: &str, branch: &str, target: &str) -> Result<bool>;

    /// Create a new ref pinned to an explicit commit SHA, never to a moving
    /// branch tip.
    fn create_branch_ref(&self, project: &str, new_name: &str, from_sha: &str) -> Result<()>;

    /// Delete a branch by name. SHA verification happens in the executor,
    /// which holds the classification state.
    fn delete_branch_ref(&self, project: &str, name: &str) -> Result<()>;
}

/// Walks pages starting at 1 until a page comes back shorter than
/// [`PAGE_SIZE`] (or empty) and collects everything.
pub(crate) fn fetch_paged<T>(mut fetch: impl FnMut(usize) -> Result<Vec<T>>) -> Result<Vec<T>> {
    let mut all = Vec::new();
    let mut page = 1;
    loop {
        let batch = fetch(page)?;
        let last_page = batch.len() < PAGE_SIZE;
        all.extend(batch);
        if last_page {
            break;
        }
        page += 1;
    }
    Ok(all)
}
