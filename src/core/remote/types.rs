use serde::Deserialize;

/// Branch entry as returned by the hosting API, before classification.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBranch {
    pub name: String,
    #[serde(default)]
    pub protected: bool,
    #[serde(default, rename = "default")]
    pub is_default: bool,
    #[serde(default)]
    pub developers_can_push: bool,
    #[serde(default)]
    pub developers_can_merge: bool,
    #[serde(default)]
    pub can_push: bool,
    pub commit: RawCommit,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCommit {
    /// Full commit SHA of the branch tip at fetch time.
    pub id: String,
    #[serde(default)]
    pub committed_date: Option<String>,
}

/// Minimal merge request shape; listing endpoints only need to prove a
/// non-empty result page.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMergeRequest {
    pub iid: u64,
}
