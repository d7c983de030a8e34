use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use super::types::{RawBranch, RawCommit};
use super::RemoteApi;
use crate::utils::{Result, SweepError};

/// Call log entry recorded by [`MockRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    ListBranches,
    Branch(String),
    IsMergedInto { branch: String, target: String },
    CreateRef { name: String, sha: String },
    DeleteRef(String),
}

#[derive(Default)]
struct MockState {
    branches: Vec<RawBranch>,
    merged_pairs: HashSet<(String, String)>,
    fail_create: HashSet<String>,
    fail_delete: HashSet<String>,
    calls: Vec<MockCall>,
}

/// In-memory remote used by unit and integration tests. Holds a scriptable
/// branch set, records every call, and can be told to fail specific create
/// or delete operations.
#[derive(Clone, Default)]
pub struct MockRemote {
    state: Arc<Mutex<MockState>>,
}

/// Convenience constructor for branch fixtures.
pub fn raw_branch(name: &str, sha: &str, committed_date: Option<&str>) -> RawBranch {
    RawBranch {
        name: name.to_string(),
        protected: false,
        is_default: false,
        developers_can_push: false,
        developers_can_merge: false,
        can_push: true,
        commit: RawCommit {
            id: sha.to_string(),
            committed_date: committed_date.map(str::to_string),
        },
    }
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_branch(&self, branch: RawBranch) {
        self.state.lock().unwrap().branches.push(branch);
    }

    pub fn mark_merged(&self, branch: &str, target: &str) {
        self.state
            .lock()
            .unwrap()
            .merged_pairs
            .insert((branch.to_string(), target.to_string()));
    }

    /// Make `create_branch_ref` fail for the given new ref name.
    pub fn fail_create_for(&self, name: &str) {
        self.state.lock().unwrap().fail_create.insert(name.to_string());
    }

    /// Make `delete_branch_ref` fail for the given branch name.
    pub fn fail_delete_for(&self, name: &str) {
        self.state.lock().unwrap().fail_delete.insert(name.to_string());
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn branch_names(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .branches
            .iter()
            .map(|branch| branch.name.clone())
            .collect()
    }

    pub fn merge_query_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, MockCall::IsMergedInto { .. }))
            .count()
    }

    fn record(&self, call: MockCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl RemoteApi for MockRemote {
    fn list_branches(&self, _project: &str) -> Result<Vec<RawBranch>> {
        self.record(MockCall::ListBranches);
        Ok(self.state.lock().unwrap().branches.clone())
    }

    fn branch(&self, _project: &str, name: &str) -> Result<Option<RawBranch>> {
        self.record(MockCall::Branch(name.to_string()));
        Ok(self
            .state
            .lock()
            .unwrap()
            .branches
            .iter()
            .find(|branch| branch.name == name)
            .cloned())
    }

    fn is_merged_into(&self, _project: &str, branch: &str, target: &str) -> Result<bool> {
        self.record(MockCall::IsMergedInto {
            branch: branch.to_string(),
            target: target.to_string(),
        });
        Ok(self
            .state
            .lock()
            .unwrap()
            .merged_pairs
            .contains(&(branch.to_string(), target.to_string())))
    }

    fn create_branch_ref(&self, _project: &str, new_name: &str, from_sha: &str) -> Result<()> {
        self.record(MockCall::CreateRef {
            name: new_name.to_string(),
            sha: from_sha.to_string(),
        });

        let mut state = self.state.lock().unwrap();
        if state.fail_create.contains(new_name) {
            return Err(SweepError::transport(Some(403), "create ref forbidden"));
        }
        if state.branches.iter().any(|branch| branch.name == new_name) {
            return Err(SweepError::transport(Some(400), "branch already exists"));
        }
        let branch = raw_branch(new_name, from_sha, None);
        state.branches.push(branch);
        Ok(())
    }

    fn delete_branch_ref(&self, _project: &str, name: &str) -> Result<()> {
        self.record(MockCall::DeleteRef(name.to_string()));

        let mut state = self.state.lock().unwrap();
        if state.fail_delete.contains(name) {
            return Err(SweepError::transport(Some(403), "delete forbidden"));
        }
        let before = state.branches.len();
        state.branches.retain(|branch| branch.name != name);
        if state.branches.len() == before {
            return Err(SweepError::transport(Some(404), "branch not found"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_then_delete_round_trip() {
        let remote = MockRemote::new();
        remote.add_branch(raw_branch("main", "aaa", None));

        remote
            .create_branch_ref("1", "archive/old", "aaa")
            .expect("create failed");
        assert_eq!(remote.branch_names(), vec!["main", "archive/old"]);

        remote
            .delete_branch_ref("1", "archive/old")
            .expect("delete failed");
        assert_eq!(remote.branch_names(), vec!["main"]);
    }

    #[test]
    fn test_delete_missing_branch_is_an_error() {
        let remote = MockRemote::new();
        assert!(remote.delete_branch_ref("1", "ghost").is_err());
    }

    #[test]
    fn test_records_calls_in_order() {
        let remote = MockRemote::new();
        remote.add_branch(raw_branch("main", "aaa", None));
        let _ = remote.list_branches("1");
        let _ = remote.branch("1", "main");

        assert_eq!(
            remote.calls(),
            vec![MockCall::ListBranches, MockCall::Branch("main".to_string())]
        );
    }
}
