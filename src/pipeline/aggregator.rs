use tracing::debug;

use crate::{
    models::state::WorkspaceSizeSummary,
    pipeline::{
        downloader::{Downloader, FileTransport},
        page_fetcher::StateVersionPages,
        paginator::Paginator,
    },
    remote::iface::RemoteService,
    utils::{
        dir::{DirUtils, DownloadLocator},
        errors::StateResult,
    },
};

/// Sums the size of every statefile in one workspace's history.
pub struct Aggregator<'a, S: RemoteService, T: FileTransport> {
    remote: &'a S,
    downloader: &'a Downloader<T>,
    locator: &'a DownloadLocator,
    org: &'a str,
    cleanup: bool,
}

impl<'a, S: RemoteService, T: FileTransport> Aggregator<'a, S, T> {
    pub fn new(
        remote: &'a S,
        downloader: &'a Downloader<T>,
        locator: &'a DownloadLocator,
        org: &'a str,
        cleanup: bool,
    ) -> Self {
        Self {
            remote,
            downloader,
            locator,
            org,
            cleanup,
        }
    }

    pub fn summarize(&self, workspace: &str) -> StateResult<WorkspaceSizeSummary> {
        let state_files =
            Paginator::new(StateVersionPages::new(self.remote, self.org, workspace)).collect_all()?;

        let mut total_size = 0u64;
        for state_file in &state_files {
            let dest = self.locator.path_for(&DirUtils::indexed_file_name(
                &state_file.workspace,
                state_file.index,
            ))?;

            // Measure before removing, one file at a time.
            let outcome = self.downloader.download(&state_file.download_url, &dest)?;
            total_size += outcome.size;
            let outcome = if self.cleanup {
                self.downloader.remove(outcome)?
            } else {
                outcome
            };
            debug!(
                "{} serial {:?} ({} bytes, kept: {})",
                outcome.path.display(),
                state_file.serial,
                outcome.size,
                outcome.retained
            );
        }

        debug!(
            "Workspace {} has {} statefile(s), {} bytes",
            workspace,
            state_files.len(),
            total_size
        );

        Ok(WorkspaceSizeSummary {
            workspace: workspace.to_owned(),
            total_size,
            count: state_files.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::{
        pipeline::mock::{MockRemote, MockTransport},
        remote::retry::RetryPolicy,
        utils::errors::StateInfoError,
    };

    fn run(
        remote: &MockRemote,
        transport: MockTransport,
        locator: &DownloadLocator,
        cleanup: bool,
        workspace: &str,
    ) -> StateResult<WorkspaceSizeSummary> {
        let downloader = Downloader::new(transport, RetryPolicy::none());
        Aggregator::new(remote, &downloader, locator, "acme", cleanup).summarize(workspace)
    }

    #[test]
    fn sums_sizes_and_counts_files() {
        let dir = tempfile::tempdir().unwrap();
        let locator = DownloadLocator::Dir(dir.path().to_path_buf());
        let remote =
            MockRemote::new().with_state_urls("net", &["https://archivist/0", "https://archivist/1"]);
        let transport = MockTransport::new()
            .with_sized("https://archivist/0", 1024)
            .with_sized("https://archivist/1", 2048);

        let summary = run(&remote, transport, &locator, true, "net").unwrap();

        assert_eq!(
            summary,
            WorkspaceSizeSummary {
                workspace: "net".to_owned(),
                total_size: 3072,
                count: 2,
            }
        );
    }

    #[test]
    fn cleanup_removes_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let locator = DownloadLocator::Dir(dir.path().to_path_buf());
        let remote = MockRemote::new().with_state_urls(
            "net",
            &["https://archivist/0", "https://archivist/1", "https://archivist/2"],
        );
        let transport = MockTransport::new()
            .with_sized("https://archivist/0", 10)
            .with_sized("https://archivist/1", 20)
            .with_sized("https://archivist/2", 30);

        let summary = run(&remote, transport, &locator, true, "net").unwrap();

        assert_eq!(summary.count, 3);
        assert_eq!(summary.total_size, 60);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn without_cleanup_every_file_remains() {
        let dir = tempfile::tempdir().unwrap();
        let locator = DownloadLocator::Dir(dir.path().to_path_buf());
        let remote =
            MockRemote::new().with_state_urls("net", &["https://archivist/0", "https://archivist/1"]);
        let transport = MockTransport::new()
            .with_sized("https://archivist/0", 5)
            .with_sized("https://archivist/1", 7);

        run(&remote, transport, &locator, false, "net").unwrap();

        assert_eq!(
            fs::metadata(dir.path().join("net-latest-state-file-0.json"))
                .unwrap()
                .len(),
            5
        );
        assert_eq!(
            fs::metadata(dir.path().join("net-latest-state-file-1.json"))
                .unwrap()
                .len(),
            7
        );
    }

    #[test]
    fn workspace_without_statefiles_sums_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let locator = DownloadLocator::Dir(dir.path().to_path_buf());
        let remote = MockRemote::new();

        let summary = run(&remote, MockTransport::new(), &locator, true, "empty").unwrap();

        assert_eq!(summary.total_size, 0);
        assert_eq!(summary.count, 0);
    }

    #[test]
    fn failure_mid_list_leaves_only_processed_files_cleaned() {
        let dir = tempfile::tempdir().unwrap();
        let locator = DownloadLocator::Dir(dir.path().to_path_buf());
        let remote = MockRemote::new().with_state_urls(
            "net",
            &["https://archivist/0", "https://archivist/1", "https://archivist/2"],
        );
        let transport = MockTransport::new()
            .with_sized("https://archivist/0", 10)
            .with_sized("https://archivist/2", 30);

        let err = run(&remote, transport, &locator, true, "net").unwrap_err();

        assert!(matches!(err, StateInfoError::Download { .. }));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(!dir.path().join("net-latest-state-file-2.json").exists());
    }

    #[test]
    fn per_file_temp_dirs_proliferate() {
        let base = tempfile::tempdir().unwrap();
        let locator = DownloadLocator::TempDirPerFile {
            base: base.path().to_path_buf(),
        };
        let remote = MockRemote::new().with_state_urls(
            "net",
            &["https://archivist/0", "https://archivist/1", "https://archivist/2"],
        );
        let transport = MockTransport::new()
            .with_sized("https://archivist/0", 1)
            .with_sized("https://archivist/1", 2)
            .with_sized("https://archivist/2", 3);

        let summary = run(&remote, transport, &locator, true, "net").unwrap();

        assert_eq!(summary.total_size, 6);
        let dirs: Vec<_> = fs::read_dir(base.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(dirs.len(), 3);
        for dir in dirs {
            assert!(dir.is_dir());
            assert_eq!(fs::read_dir(dir).unwrap().count(), 0);
        }
    }
}
