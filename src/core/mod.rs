pub mod classify;
pub mod executor;
pub mod filter;
pub mod model;
pub mod reconcile;
pub mod remote;

pub use classify::Classifier;
pub use executor::{
    BatchEvent, BatchExecutor, BatchHandle, CancelFlag, OperationResult, SweepMode,
};
pub use filter::{DateRange, FilterAction};
pub use model::{BranchRecord, MergeStatus, ModelEvent, SelectionModel};
pub use remote::{GitLabRemote, RemoteApi};
