use crate::{
    models::state::{Identity, PageOptions, PageResult, StateFileRef, Workspace},
    utils::errors::StateResult,
};

/// Read-only view of the workspace-management service.
pub trait RemoteService {
    fn list_workspaces(&self, org: &str, page: PageOptions) -> StateResult<PageResult<Workspace>>;

    fn list_state_versions(
        &self,
        org: &str,
        workspace: &str,
        page: PageOptions,
    ) -> StateResult<PageResult<StateFileRef>>;

    /// `None` when the workspace has no state yet.
    fn current_state_version(&self, workspace: &Workspace) -> StateResult<Option<StateFileRef>>;

    fn read_current_user(&self) -> StateResult<Identity>;
}
