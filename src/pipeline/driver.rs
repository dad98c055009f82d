use std::path::Path;

use tracing::{info, warn};

use crate::{
    models::state::{Identity, LatestStateFileSize, Workspace, WorkspaceSizeSummary},
    pipeline::{
        aggregator::Aggregator,
        downloader::{Downloader, FileTransport},
        page_fetcher::WorkspacePages,
        paginator::Paginator,
    },
    remote::iface::RemoteService,
    utils::{
        dir::{DirUtils, DownloadLocator},
        errors::StateResult,
    },
};

/// Top-level orchestration of the listing and sizing commands.
pub struct Pipeline<S: RemoteService, T: FileTransport> {
    remote: S,
    downloader: Downloader<T>,
    org: String,
}

impl<S: RemoteService, T: FileTransport> Pipeline<S, T> {
    pub fn new(remote: S, downloader: Downloader<T>, org: impl Into<String>) -> Self {
        Self {
            remote,
            downloader,
            org: org.into(),
        }
    }

    pub fn list_workspaces(&self) -> StateResult<Vec<Workspace>> {
        Paginator::new(WorkspacePages::new(&self.remote, &self.org)).collect_all()
    }

    /// Sizes the full statefile history of every workspace, one workspace
    /// after another. Each summary is handed to `emit` as soon as it is ready.
    /// The first error stops the run.
    pub fn all_statefile_sizes<F>(
        &self,
        locator: &DownloadLocator,
        cleanup: bool,
        mut emit: F,
    ) -> StateResult<Vec<WorkspaceSizeSummary>>
    where
        F: FnMut(&WorkspaceSizeSummary),
    {
        let workspaces = self.list_workspaces()?;
        info!(
            "Found {} workspace(s) in {}, sizing statefiles",
            workspaces.len(),
            self.org
        );

        let aggregator = Aggregator::new(
            &self.remote,
            &self.downloader,
            locator,
            &self.org,
            cleanup,
        );

        let mut summaries = Vec::with_capacity(workspaces.len());
        for workspace in &workspaces {
            let summary = aggregator.summarize(&workspace.name)?;
            emit(&summary);
            summaries.push(summary);
        }

        Ok(summaries)
    }

    /// Sizes only the current statefile of each workspace. Workspaces without
    /// one, or whose lookup fails, are skipped; download failures still stop
    /// the run.
    pub fn latest_statefile_sizes<F>(
        &self,
        dir: &Path,
        mut emit: F,
    ) -> StateResult<Vec<LatestStateFileSize>>
    where
        F: FnMut(&LatestStateFileSize),
    {
        let workspaces = self.list_workspaces()?;

        let mut sizes = Vec::new();
        for workspace in &workspaces {
            let current = match self.remote.current_state_version(workspace) {
                Ok(Some(current)) => current,
                Ok(None) => {
                    warn!("Workspace {} has no current statefile, skipping", workspace.name);
                    continue;
                }
                Err(e) => {
                    warn!(
                        "Could not read current statefile of {}, skipping: {}",
                        workspace.name, e
                    );
                    continue;
                }
            };

            let dest = dir.join(DirUtils::latest_file_name(&current.workspace));
            let outcome = self.downloader.download(&current.download_url, &dest)?;

            let size = LatestStateFileSize {
                workspace: workspace.name.clone(),
                path: outcome.path,
                size: outcome.size,
            };
            emit(&size);
            sizes.push(size);
        }

        Ok(sizes)
    }

    pub fn validate(&self) -> StateResult<Identity> {
        self.remote.read_current_user()
    }
}
