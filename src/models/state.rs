use std::path::PathBuf;

use serde::Serialize;

/// Number of items requested per page for every listing.
pub const PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub vcs_repo: Option<String>,
}

/// One entry of a workspace's state history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateFileRef {
    pub workspace: String,
    pub download_url: String,
    /// Zero-based position in the workspace's full state listing.
    pub index: usize,
    pub serial: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    pub number: u32,
    pub size: u32,
}

impl PageOptions {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            size: PAGE_SIZE,
        }
    }

    /// Index of the first item on this page within the whole listing.
    pub fn offset(&self) -> usize {
        (self.number.saturating_sub(1) as usize) * self.size as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub path: PathBuf,
    pub size: u64,
    pub retained: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSizeSummary {
    pub workspace: String,
    pub total_size: u64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestStateFileSize {
    pub workspace: String,
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub email: Option<String>,
}
