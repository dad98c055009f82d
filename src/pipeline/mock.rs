//! In-memory stand-ins for the TFE API and the download transport.

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    io::Write,
};

use crate::{
    models::state::{Identity, PageOptions, PageResult, StateFileRef, Workspace},
    pipeline::downloader::FileTransport,
    remote::iface::RemoteService,
    utils::errors::{RemoteErrorKind, StateInfoError, StateResult},
};

/// One recorded listing call: `None` workspace means the workspace listing.
pub type PageCall = (Option<String>, u32);

#[derive(Default)]
pub struct MockRemote {
    workspaces: Vec<Workspace>,
    state_urls: HashMap<String, Vec<String>>,
    current: HashMap<String, String>,
    failing_pages: HashSet<PageCall>,
    transient_failures: RefCell<u32>,
    pub calls: RefCell<Vec<PageCall>>,
    pub current_lookups: RefCell<Vec<String>>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workspaces(mut self, names: &[&str]) -> Self {
        self.workspaces = names
            .iter()
            .map(|name| Workspace {
                id: format!("ws-{name}"),
                name: (*name).to_owned(),
                vcs_repo: None,
            })
            .collect();
        self
    }

    pub fn with_state_urls(mut self, workspace: &str, urls: &[&str]) -> Self {
        self.state_urls.insert(
            workspace.to_owned(),
            urls.iter().map(|url| (*url).to_owned()).collect(),
        );
        self
    }

    pub fn with_current(mut self, workspace: &str, url: &str) -> Self {
        self.current.insert(workspace.to_owned(), url.to_owned());
        self
    }

    pub fn failing_state_page(mut self, workspace: &str, page: u32) -> Self {
        self.failing_pages.insert((Some(workspace.to_owned()), page));
        self
    }

    /// The next `count` calls of any kind fail with a transient error.
    pub fn with_transient_failures(self, count: u32) -> Self {
        *self.transient_failures.borrow_mut() = count;
        self
    }

    fn transient(&self) -> StateResult<()> {
        let mut left = self.transient_failures.borrow_mut();
        if *left > 0 {
            *left -= 1;
            return Err(StateInfoError::remote(RemoteErrorKind::Transient, "503"));
        }
        Ok(())
    }

    fn page_of<T: Clone>(
        &self,
        key: PageCall,
        all: &[T],
        page: PageOptions,
    ) -> StateResult<PageResult<T>> {
        self.calls.borrow_mut().push(key.clone());
        self.transient()?;
        if self.failing_pages.contains(&key) {
            return Err(StateInfoError::remote(
                RemoteErrorKind::Other,
                format!("page {} unavailable", page.number),
            ));
        }

        let size = page.size as usize;
        let total_pages = all.len().div_ceil(size).max(1) as u32;
        let items = all
            .iter()
            .skip(page.offset())
            .take(size)
            .cloned()
            .collect();

        Ok(PageResult {
            items,
            current_page: page.number,
            total_pages,
        })
    }
}

impl RemoteService for MockRemote {
    fn list_workspaces(&self, _org: &str, page: PageOptions) -> StateResult<PageResult<Workspace>> {
        self.page_of((None, page.number), &self.workspaces, page)
    }

    fn list_state_versions(
        &self,
        _org: &str,
        workspace: &str,
        page: PageOptions,
    ) -> StateResult<PageResult<StateFileRef>> {
        let refs: Vec<StateFileRef> = self
            .state_urls
            .get(workspace)
            .map(|urls| {
                urls.iter()
                    .enumerate()
                    .map(|(index, url)| StateFileRef {
                        workspace: workspace.to_owned(),
                        download_url: url.clone(),
                        index,
                        serial: Some(index as u64),
                    })
                    .collect()
            })
            .unwrap_or_default();

        self.page_of((Some(workspace.to_owned()), page.number), &refs, page)
    }

    fn current_state_version(&self, workspace: &Workspace) -> StateResult<Option<StateFileRef>> {
        self.current_lookups.borrow_mut().push(workspace.name.clone());
        self.transient()?;
        Ok(self.current.get(&workspace.name).map(|url| StateFileRef {
            workspace: workspace.name.clone(),
            download_url: url.clone(),
            index: 0,
            serial: None,
        }))
    }

    fn read_current_user(&self) -> StateResult<Identity> {
        self.transient()?;
        Ok(Identity {
            username: "admin".to_owned(),
            email: Some("admin@example.com".to_owned()),
        })
    }
}

#[derive(Default)]
pub struct MockTransport {
    files: HashMap<String, Vec<u8>>,
    pub fetched: RefCell<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, url: &str, body: Vec<u8>) -> Self {
        self.files.insert(url.to_owned(), body);
        self
    }

    pub fn with_sized(self, url: &str, size: usize) -> Self {
        self.with_file(url, vec![b'x'; size])
    }
}

impl FileTransport for MockTransport {
    fn fetch(&self, url: &str, out: &mut dyn Write) -> StateResult<()> {
        self.fetched.borrow_mut().push(url.to_owned());
        let body = self.files.get(url).ok_or_else(|| StateInfoError::Download {
            url: url.to_owned(),
            message: "404 Not Found".to_owned(),
            transient: false,
        })?;
        out.write_all(body).map_err(|e| StateInfoError::Download {
            url: url.to_owned(),
            message: e.to_string(),
            transient: false,
        })
    }
}
