pub mod cli;
pub mod config;
pub mod core;
pub mod utils;

pub use config::Config;
pub use core::executor::{BatchExecutor, OperationResult, SweepMode};
pub use core::model::{BranchRecord, SelectionModel};
pub use core::remote::{GitLabRemote, RemoteApi};
pub use core::Classifier;
pub use utils::{Result, SweepError};
