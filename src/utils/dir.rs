use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{
    models::config::TempDirPolicy,
    utils::errors::{StateInfoError, StateResult},
};

const TEMP_DIR_PREFIX: &str = "tfe-state-info";

pub struct DirUtils;

impl DirUtils {
    pub fn curr_dir() -> StateResult<PathBuf> {
        std::env::current_dir().map_err(|e| StateInfoError::fs(".", e))
    }

    /// Creates a new uniquely named directory under `base` that outlives the run.
    pub fn fresh_temp_dir(base: &Path) -> StateResult<PathBuf> {
        let dir = tempfile::Builder::new()
            .prefix(TEMP_DIR_PREFIX)
            .tempdir_in(base)
            .map_err(|e| StateInfoError::fs(base, e))?
            .keep();
        debug!("Created temporary directory {}", dir.display());
        Ok(dir)
    }

    pub fn latest_file_name(workspace: &str) -> String {
        format!("{workspace}-latest-state-file.json")
    }

    pub fn indexed_file_name(workspace: &str, index: usize) -> String {
        format!("{workspace}-latest-state-file-{index}.json")
    }
}

/// Decides where each downloaded statefile is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadLocator {
    /// Every file goes into this directory.
    Dir(PathBuf),
    /// Every file gets its own fresh directory under `base`.
    TempDirPerFile { base: PathBuf },
}

impl DownloadLocator {
    pub fn from_policy(policy: TempDirPolicy) -> StateResult<Self> {
        let temp_base = std::env::temp_dir();
        Ok(match policy {
            TempDirPolicy::Disabled => Self::Dir(DirUtils::curr_dir()?),
            TempDirPolicy::PerFile => Self::TempDirPerFile { base: temp_base },
            TempDirPolicy::Shared => Self::Dir(DirUtils::fresh_temp_dir(&temp_base)?),
        })
    }

    pub fn path_for(&self, file_name: &str) -> StateResult<PathBuf> {
        match self {
            Self::Dir(dir) => Ok(dir.join(file_name)),
            Self::TempDirPerFile { base } => Ok(DirUtils::fresh_temp_dir(base)?.join(file_name)),
        }
    }
}
