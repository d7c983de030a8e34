use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use super::model::BranchRecord;
use super::remote::RemoteApi;
use crate::utils::{Result, SweepError};

/// Operation performed on each confirmed branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepMode {
    Delete,
    Archive,
}

impl SweepMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SweepMode::Delete => "delete",
            SweepMode::Archive => "archive",
        }
    }
}

/// Batch run lifecycle. A run leaves `Running` exactly once, into either
/// `Completed` or `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// Cooperative cancellation flag, checked between records, never mid-call.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why one branch failed; per-record failures never abort the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Network/HTTP failure talking to the remote.
    Transport(String),
    /// The branch moved or vanished since it was fetched.
    StaleState,
    /// The archive ref could not be created; the original is untouched and
    /// the whole record is safe to retry.
    CreationFailure(String),
    /// The archive ref exists but the original could not be deleted. The
    /// duplicate is left in place on purpose; operator attention required.
    PartialFailure {
        archived_name: String,
        message: String,
    },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Transport(message) => write!(f, "transport failure: {}", message),
            FailureReason::StaleState => write!(f, "branch changed upstream since it was fetched"),
            FailureReason::CreationFailure(message) => {
                write!(f, "archive creation failed: {}", message)
            }
            FailureReason::PartialFailure {
                archived_name,
                message,
            } => write!(
                f,
                "archive '{}' created, delete failed: {}",
                archived_name, message
            ),
        }
    }
}

/// Identity of a branch handed to the batch (name + SHA at fetch time).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedBranch {
    pub name: String,
    pub sha: String,
}

#[derive(Debug, Clone)]
pub struct SucceededBranch {
    pub name: String,
    pub sha: String,
    /// Set in archive mode; the name the branch now lives under.
    pub archived_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FailedBranch {
    pub name: String,
    pub sha: String,
    pub reason: FailureReason,
}

/// Outcome of one record within a batch.
#[derive(Debug, Clone)]
pub enum BranchOutcome {
    Succeeded { archived_name: Option<String> },
    Failed(FailureReason),
}

/// Result of one batch run. Succeeded and failed partition the processed
/// prefix of the confirmed list; cancelled runs simply leave the remainder
/// out of both lists.
#[derive(Debug, Clone)]
pub struct OperationResult {
    pub mode: SweepMode,
    pub state: RunState,
    pub confirmed: Vec<ConfirmedBranch>,
    pub succeeded: Vec<SucceededBranch>,
    pub failed: Vec<FailedBranch>,
}

impl OperationResult {
    pub fn processed(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == RunState::Cancelled
    }
}

/// Progress notification stream for a batch run.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started { mode: SweepMode, total: usize },
    Processed { name: String, outcome: BranchOutcome },
    Finished(OperationResult),
}

/// Executes delete/archive batches sequentially, in confirmed-list order.
///
/// A busy flag refuses overlapping runs on the same executor; the engine
/// itself never parallelizes records, trading throughput for predictable
/// rollback reasoning.
pub struct BatchExecutor {
    remote: Arc<dyn RemoteApi + Send + Sync>,
    project: String,
    archive_prefix: String,
    busy: Arc<AtomicBool>,
}

struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl BatchExecutor {
    pub fn new(
        remote: Arc<dyn RemoteApi + Send + Sync>,
        project: impl Into<String>,
        archive_prefix: impl Into<String>,
    ) -> Self {
        Self {
            remote,
            project: project.into(),
            archive_prefix: archive_prefix.into(),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn run(
        &self,
        confirmed: Vec<BranchRecord>,
        mode: SweepMode,
        cancel: &CancelFlag,
        mut on_event: impl FnMut(BatchEvent),
    ) -> Result<OperationResult> {
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(SweepError::Busy);
        }
        let _guard = BusyGuard(self.busy.clone());

        let confirmed_ids: Vec<ConfirmedBranch> = confirmed
            .iter()
            .map(|record| ConfirmedBranch {
                name: record.name().to_string(),
                sha: record.last_commit_sha().to_string(),
            })
            .collect();

        on_event(BatchEvent::Started {
            mode,
            total: confirmed.len(),
        });

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        let mut state = RunState::Completed;

        for record in &confirmed {
            if cancel.is_requested() {
                state = RunState::Cancelled;
                break;
            }

            let outcome = match mode {
                SweepMode::Delete => self.delete_one(record),
                SweepMode::Archive => self.archive_one(record),
            };

            match &outcome {
                BranchOutcome::Succeeded { archived_name } => succeeded.push(SucceededBranch {
                    name: record.name().to_string(),
                    sha: record.last_commit_sha().to_string(),
                    archived_name: archived_name.clone(),
                }),
                BranchOutcome::Failed(reason) => failed.push(FailedBranch {
                    name: record.name().to_string(),
                    sha: record.last_commit_sha().to_string(),
                    reason: reason.clone(),
                }),
            }

            on_event(BatchEvent::Processed {
                name: record.name().to_string(),
                outcome,
            });
        }

        let result = OperationResult {
            mode,
            state,
            confirmed: confirmed_ids,
            succeeded,
            failed,
        };
        on_event(BatchEvent::Finished(result.clone()));
        Ok(result)
    }

    /// The record must still exist with the SHA observed at fetch time.
    fn verify_current(&self, record: &BranchRecord) -> std::result::Result<(), FailureReason> {
        match self.remote.branch(&self.project, record.name()) {
            Ok(Some(current)) if current.commit.id == record.last_commit_sha() => Ok(()),
            Ok(_) => Err(FailureReason::StaleState),
            Err(err) => Err(FailureReason::Transport(err.to_string())),
        }
    }

    fn delete_one(&self, record: &BranchRecord) -> BranchOutcome {
        if let Err(reason) = self.verify_current(record) {
            return BranchOutcome::Failed(reason);
        }
        match self.remote.delete_branch_ref(&self.project, record.name()) {
            Ok(()) => BranchOutcome::Succeeded {
                archived_name: None,
            },
            Err(err) => BranchOutcome::Failed(FailureReason::Transport(err.to_string())),
        }
    }

    /// Create the archive copy first; the original is only ever deleted once
    /// the copy provably exists.
    fn archive_one(&self, record: &BranchRecord) -> BranchOutcome {
        if let Err(reason) = self.verify_current(record) {
            return BranchOutcome::Failed(reason);
        }

        let archived_name = format!("{}{}", self.archive_prefix, record.name());
        if let Err(err) =
            self.remote
                .create_branch_ref(&self.project, &archived_name, record.last_commit_sha())
        {
            return BranchOutcome::Failed(FailureReason::CreationFailure(err.to_string()));
        }

        match self.remote.delete_branch_ref(&self.project, record.name()) {
            Ok(()) => BranchOutcome::Succeeded {
                archived_name: Some(archived_name),
            },
            Err(err) => BranchOutcome::Failed(FailureReason::PartialFailure {
                archived_name,
                message: err.to_string(),
            }),
        }
    }
}

/// Running batch on a background worker. The foreground drains `events`,
/// may request cancellation at any time, and joins for the final result.
pub struct BatchHandle {
    pub events: mpsc::Receiver<BatchEvent>,
    pub cancel: CancelFlag,
    worker: thread::JoinHandle<Result<OperationResult>>,
}

impl BatchHandle {
    pub fn join(self) -> Result<OperationResult> {
        self.worker
            .join()
            .map_err(|_| SweepError::worker("batch worker panicked"))?
    }
}

/// Runs the batch on a dedicated worker thread, streaming progress through
/// a channel. One batch per executor at a time; the foreground thread never
/// blocks on network calls.
pub fn spawn_batch(
    executor: BatchExecutor,
    confirmed: Vec<BranchRecord>,
    mode: SweepMode,
) -> BatchHandle {
    let cancel = CancelFlag::new();
    let worker_cancel = cancel.clone();
    let (events_tx, events_rx) = mpsc::channel();

    let worker = thread::spawn(move || {
        executor.run(confirmed, mode, &worker_cancel, |event| {
            // The receiver may be dropped early; the run itself continues.
            let _ = events_tx.send(event);
        })
    });

    BatchHandle {
        events: events_rx,
        cancel,
        worker,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::BranchRecord;
    use crate::core::remote::mock::{raw_branch, MockCall, MockRemote};

    fn record(name: &str, sha: &str) -> BranchRecord {
        BranchRecord::from_raw(&raw_branch(name, sha, None))
    }

    fn executor_for(remote: &MockRemote) -> BatchExecutor {
        BatchExecutor::new(Arc::new(remote.clone()), "1", "archive/")
    }

    fn no_events(_: BatchEvent) {}

    #[test]
    fn test_delete_mode_removes_branches() {
        let remote = MockRemote::new();
        remote.add_branch(raw_branch("old-1", "aaa", None));
        remote.add_branch(raw_branch("old-2", "bbb", None));

        let result = executor_for(&remote)
            .run(
                vec![record("old-1", "aaa"), record("old-2", "bbb")],
                SweepMode::Delete,
                &CancelFlag::new(),
                no_events,
            )
            .expect("run failed");

        assert_eq!(result.succeeded.len(), 2);
        assert!(result.failed.is_empty());
        assert_eq!(result.state, RunState::Completed);
        assert!(remote.branch_names().is_empty());
    }

    #[test]
    fn test_one_failure_does_not_abort_the_batch() {
        let remote = MockRemote::new();
        remote.add_branch(raw_branch("old-1", "aaa", None));
        remote.add_branch(raw_branch("old-2", "bbb", None));
        remote.fail_delete_for("old-1");

        let result = executor_for(&remote)
            .run(
                vec![record("old-1", "aaa"), record("old-2", "bbb")],
                SweepMode::Delete,
                &CancelFlag::new(),
                no_events,
            )
            .expect("run failed");

        assert_eq!(result.succeeded.len(), 1);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].name, "old-1");
        assert!(matches!(
            result.failed[0].reason,
            FailureReason::Transport(_)
        ));
    }

    #[test]
    fn test_stale_sha_fails_the_record() {
        let remote = MockRemote::new();
        remote.add_branch(raw_branch("moved", "new-sha", None));

        let result = executor_for(&remote)
            .run(
                vec![record("moved", "fetched-sha")],
                SweepMode::Delete,
                &CancelFlag::new(),
                no_events,
            )
            .expect("run failed");

        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].reason, FailureReason::StaleState);
        // The branch must not have been deleted.
        assert_eq!(remote.branch_names(), vec!["moved"]);
    }

    #[test]
    fn test_vanished_branch_fails_as_stale() {
        let remote = MockRemote::new();

        let result = executor_for(&remote)
            .run(
                vec![record("ghost", "aaa")],
                SweepMode::Delete,
                &CancelFlag::new(),
                no_events,
            )
            .expect("run failed");

        assert_eq!(result.failed[0].reason, FailureReason::StaleState);
    }

    #[test]
    fn test_archive_creates_copy_before_delete() {
        let remote = MockRemote::new();
        remote.add_branch(raw_branch("feature", "aaa", None));

        let result = executor_for(&remote)
            .run(
                vec![record("feature", "aaa")],
                SweepMode::Archive,
                &CancelFlag::new(),
                no_events,
            )
            .expect("run failed");

        assert_eq!(result.succeeded.len(), 1);
        assert_eq!(
            result.succeeded[0].archived_name.as_deref(),
            Some("archive/feature")
        );
        assert_eq!(remote.branch_names(), vec!["archive/feature"]);

        // Create must come before delete in the call order.
        let calls = remote.calls();
        let create_at = calls
            .iter()
            .position(|call| matches!(call, MockCall::CreateRef { .. }))
            .expect("create not called");
        let delete_at = calls
            .iter()
            .position(|call| matches!(call, MockCall::DeleteRef(_)))
            .expect("delete not called");
        assert!(create_at < delete_at);
    }

    #[test]
    fn test_archive_pins_the_fetched_sha() {
        let remote = MockRemote::new();
        remote.add_branch(raw_branch("feature", "aaa", None));

        executor_for(&remote)
            .run(
                vec![record("feature", "aaa")],
                SweepMode::Archive,
                &CancelFlag::new(),
                no_events,
            )
            .expect("run failed");

        assert!(remote.calls().contains(&MockCall::CreateRef {
            name: "archive/feature".to_string(),
            sha: "aaa".to_string(),
        }));
    }

    #[test]
    fn test_failed_archive_creation_never_deletes_the_original() {
        let remote = MockRemote::new();
        remote.add_branch(raw_branch("feature", "aaa", None));
        remote.fail_create_for("archive/feature");

        let result = executor_for(&remote)
            .run(
                vec![record("feature", "aaa")],
                SweepMode::Archive,
                &CancelFlag::new(),
                no_events,
            )
            .expect("run failed");

        assert!(matches!(
            result.failed[0].reason,
            FailureReason::CreationFailure(_)
        ));
        assert_eq!(remote.branch_names(), vec!["feature"]);
        assert!(!remote
            .calls()
            .iter()
            .any(|call| matches!(call, MockCall::DeleteRef(_))));
    }

    #[test]
    fn test_archive_delete_failure_reports_partial_and_keeps_copy() {
        let remote = MockRemote::new();
        remote.add_branch(raw_branch("x", "aaa", None));
        remote.fail_delete_for("x");

        let result = executor_for(&remote)
            .run(
                vec![record("x", "aaa")],
                SweepMode::Archive,
                &CancelFlag::new(),
                no_events,
            )
            .expect("run failed");

        match &result.failed[0].reason {
            FailureReason::PartialFailure { archived_name, .. } => {
                assert_eq!(archived_name, "archive/x");
            }
            other => panic!("expected PartialFailure, got {:?}", other),
        }
        // Both the original and the archive copy survive.
        assert_eq!(remote.branch_names(), vec!["x", "archive/x"]);
    }

    #[test]
    fn test_result_partition_is_within_confirmed_and_disjoint() {
        let remote = MockRemote::new();
        remote.add_branch(raw_branch("a", "aaa", None));
        remote.add_branch(raw_branch("b", "bbb", None));
        remote.fail_delete_for("b");

        let confirmed = vec![record("a", "aaa"), record("b", "bbb"), record("c", "ccc")];
        let result = executor_for(&remote)
            .run(confirmed, SweepMode::Delete, &CancelFlag::new(), no_events)
            .expect("run failed");

        let confirmed_names: Vec<&str> =
            result.confirmed.iter().map(|c| c.name.as_str()).collect();
        for branch in &result.succeeded {
            assert!(confirmed_names.contains(&branch.name.as_str()));
            assert!(!result.failed.iter().any(|f| f.name == branch.name));
        }
        for branch in &result.failed {
            assert!(confirmed_names.contains(&branch.name.as_str()));
        }
        assert_eq!(result.processed(), 3);
    }

    #[test]
    fn test_cancellation_stops_after_in_flight_record() {
        let remote = MockRemote::new();
        for name in ["a", "b", "c", "d", "e"] {
            remote.add_branch(raw_branch(name, "aaa", None));
        }
        let confirmed: Vec<BranchRecord> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|name| record(name, "aaa"))
            .collect();

        let cancel = CancelFlag::new();
        let cancel_after_two = cancel.clone();
        let mut processed = 0;

        let result = executor_for(&remote)
            .run(confirmed, SweepMode::Delete, &cancel, move |event| {
                if let BatchEvent::Processed { .. } = event {
                    processed += 1;
                    if processed == 2 {
                        cancel_after_two.request();
                    }
                }
            })
            .expect("run failed");

        assert_eq!(result.state, RunState::Cancelled);
        assert_eq!(result.processed(), 2);
        assert_eq!(result.confirmed.len(), 5);
        assert_eq!(remote.branch_names(), vec!["c", "d", "e"]);
    }

    #[test]
    fn test_overlapping_runs_are_refused() {
        let remote = MockRemote::new();
        remote.add_branch(raw_branch("a", "aaa", None));
        let executor = executor_for(&remote);

        let mut nested_outcome = None;
        let nested = &executor;
        let result = executor.run(
            vec![record("a", "aaa")],
            SweepMode::Delete,
            &CancelFlag::new(),
            |event| {
                if let BatchEvent::Started { .. } = event {
                    nested_outcome =
                        Some(nested.run(Vec::new(), SweepMode::Delete, &CancelFlag::new(), |_| {}));
                }
            },
        );

        assert!(result.is_ok());
        assert!(matches!(nested_outcome, Some(Err(SweepError::Busy))));

        // The guard must have released the flag for the next run.
        let again = executor.run(Vec::new(), SweepMode::Delete, &CancelFlag::new(), |_| {});
        assert!(again.is_ok());
    }

    #[test]
    fn test_spawn_batch_streams_events_and_joins() {
        let remote = MockRemote::new();
        remote.add_branch(raw_branch("a", "aaa", None));
        remote.add_branch(raw_branch("b", "bbb", None));

        let handle = spawn_batch(
            executor_for(&remote),
            vec![record("a", "aaa"), record("b", "bbb")],
            SweepMode::Delete,
        );

        let events: Vec<BatchEvent> = handle.events.iter().collect();
        assert!(matches!(events.first(), Some(BatchEvent::Started { total: 2, .. })));
        assert!(matches!(events.last(), Some(BatchEvent::Finished(_))));

        let result = handle.join().expect("worker failed");
        assert_eq!(result.succeeded.len(), 2);
    }
}
