use serde::Deserialize;

use crate::model::WatchProgressEntry;

/// The progress endpoint answers either with a bare list or wrapped in `progress`.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum ProgressListResp {
    Wrapped { progress: Vec<WatchProgressEntry> },
    Bare(Vec<WatchProgressEntry>),
}

impl ProgressListResp {
    pub fn into_entries(self) -> Vec<WatchProgressEntry> {
        match self {
            ProgressListResp::Wrapped { progress } => progress,
            ProgressListResp::Bare(entries) => entries,
        }
    }
}
