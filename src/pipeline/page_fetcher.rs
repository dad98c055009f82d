use std::fmt;

use tracing::debug;

use crate::{
    models::state::{PageOptions, PageResult, StateFileRef, Workspace},
    remote::iface::RemoteService,
    utils::errors::{StateInfoError, StateResult},
};

/// Which listing a fetcher walks, used to label log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingKind<'a> {
    Workspaces { org: &'a str },
    StateFiles { org: &'a str, workspace: &'a str },
}

impl fmt::Display for ListingKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workspaces { org } => write!(f, "workspaces of {org}"),
            Self::StateFiles { org, workspace } => write!(f, "statefiles of {org}/{workspace}"),
        }
    }
}

/// Fetches single pages of one listing.
pub trait PageFetcher {
    type Item;

    fn kind(&self) -> ListingKind<'_>;

    fn fetch_page(&self, page: u32) -> StateResult<PageResult<Self::Item>>;
}

fn page_options(page: u32) -> StateResult<PageOptions> {
    if page == 0 {
        return Err(StateInfoError::InvalidPage(page));
    }
    Ok(PageOptions::new(page))
}

pub struct WorkspacePages<'a, S: RemoteService> {
    remote: &'a S,
    org: &'a str,
}

impl<'a, S: RemoteService> WorkspacePages<'a, S> {
    pub fn new(remote: &'a S, org: &'a str) -> Self {
        Self { remote, org }
    }
}

impl<S: RemoteService> PageFetcher for WorkspacePages<'_, S> {
    type Item = Workspace;

    fn kind(&self) -> ListingKind<'_> {
        ListingKind::Workspaces { org: self.org }
    }

    fn fetch_page(&self, page: u32) -> StateResult<PageResult<Workspace>> {
        let opts = page_options(page)?;
        let res = self.remote.list_workspaces(self.org, opts)?;
        for (itr, ws) in res.items.iter().enumerate() {
            debug!("Workspace {} - Workspace Iterate - {}", ws.name, itr);
        }
        Ok(res)
    }
}

pub struct StateVersionPages<'a, S: RemoteService> {
    remote: &'a S,
    org: &'a str,
    workspace: &'a str,
}

impl<'a, S: RemoteService> StateVersionPages<'a, S> {
    pub fn new(remote: &'a S, org: &'a str, workspace: &'a str) -> Self {
        Self {
            remote,
            org,
            workspace,
        }
    }
}

impl<S: RemoteService> PageFetcher for StateVersionPages<'_, S> {
    type Item = StateFileRef;

    fn kind(&self) -> ListingKind<'_> {
        ListingKind::StateFiles {
            org: self.org,
            workspace: self.workspace,
        }
    }

    fn fetch_page(&self, page: u32) -> StateResult<PageResult<StateFileRef>> {
        let opts = page_options(page)?;
        let res = self
            .remote
            .list_state_versions(self.org, self.workspace, opts)?;
        for (itr, _) in res.items.iter().enumerate() {
            debug!("Workspace {} - Statefile Iterate - {}", self.workspace, itr);
        }
        Ok(res)
    }
}
