use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::{
    models::{
        args::OutputFormat,
        state::{LatestStateFileSize, Workspace, WorkspaceSizeSummary},
    },
    utils::{
        bytes::ByteFmt,
        errors::{ResultTrait as _, ResultWithError},
    },
};

#[derive(Tabled)]
struct WorkspaceRow<'a> {
    #[tabled(rename = "NAME")]
    name: &'a str,
    #[tabled(rename = "VCS REPO")]
    vcs_repo: &'a str,
}

pub struct Printer {
    format: OutputFormat,
}

impl Printer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn workspaces(&self, workspaces: &[Workspace]) -> ResultWithError<String> {
        match self.format {
            OutputFormat::Table => Ok(Self::workspace_table(workspaces)),
            _ => self.json(workspaces),
        }
    }

    fn json<T: Serialize + ?Sized>(&self, value: &T) -> ResultWithError<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string(value).auto_err("Could not encode JSON"),
            _ => serde_json::to_string_pretty(value).auto_err("Could not encode JSON"),
        }
    }

    pub fn summary_line(summary: &WorkspaceSizeSummary) -> String {
        format!(
            "Total of all state file sizes for {} was {} (Statefile Count: {})",
            summary.workspace,
            ByteFmt::format(summary.total_size),
            summary.count
        )
    }

    pub fn latest_line(latest: &LatestStateFileSize) -> String {
        format!(
            "File size for {} was {}",
            latest.workspace,
            ByteFmt::format(latest.size)
        )
    }

    fn workspace_table(workspaces: &[Workspace]) -> String {
        let rows = workspaces.iter().map(|ws| WorkspaceRow {
            name: &ws.name,
            vcs_repo: ws.vcs_repo.as_deref().unwrap_or("<NONE>"),
        });

        let mut table = Table::new(rows);
        table.with(Style::ascii());
        table.to_string()
    }
}
