use reqwest::blocking::{Client, ClientBuilder, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    models::state::{Identity, PageOptions, PageResult, StateFileRef, Workspace},
    remote::iface::RemoteService,
    utils::errors::{RemoteErrorKind, StateInfoError, StateResult},
};

const JSON_API: &str = "application/vnd.api+json";

/// [`RemoteService`] backed by the TFE v2 JSON:API.
#[derive(Debug)]
pub struct TfeRemoteService {
    client: Client,
    base: Url,
}

impl TfeRemoteService {
    pub fn new(address: &Url, token: &str) -> StateResult<Self> {
        Self::with_builder(Client::builder(), address, token)
    }

    fn with_builder(builder: ClientBuilder, address: &Url, token: &str) -> StateResult<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| StateInfoError::config(format!("Invalid TFE token: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_API));

        let client = builder
            .default_headers(headers)
            .build()
            .map_err(|e| StateInfoError::config(format!("Failed to create HTTP client: {e}")))?;
        let base = address
            .join("api/v2/")
            .map_err(|e| StateInfoError::config(format!("Invalid TFE address: {e}")))?;

        Ok(Self { client, base })
    }

    fn endpoint(&self, path: &str) -> StateResult<Url> {
        self.base.join(path).map_err(|e| {
            StateInfoError::remote(RemoteErrorKind::Other, format!("Invalid path {path}: {e}"))
        })
    }

    fn send(&self, req: RequestBuilder) -> StateResult<Response> {
        let resp = req.send().map_err(|e| {
            let kind = if e.is_timeout() || e.is_connect() || e.is_request() {
                RemoteErrorKind::Transient
            } else {
                RemoteErrorKind::Other
            };
            StateInfoError::remote(kind, e.to_string())
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(StateInfoError::remote(
                kind_for_status(status),
                format!("TFE returned status {} for {}", status, resp.url()),
            ));
        }

        Ok(resp)
    }

    fn body(&self, resp: Response) -> StateResult<String> {
        resp.text()
            .map_err(|e| StateInfoError::remote(RemoteErrorKind::Transient, e.to_string()))
    }
}

impl RemoteService for TfeRemoteService {
    fn list_workspaces(&self, org: &str, page: PageOptions) -> StateResult<PageResult<Workspace>> {
        let url = self.endpoint(&format!("organizations/{org}/workspaces"))?;
        debug!("GET {} (page {})", url, page.number);

        let req = self.client.get(url).query(&page_query(page));
        let body = self.body(self.send(req)?)?;
        parse_workspace_page(&body, page)
    }

    fn list_state_versions(
        &self,
        org: &str,
        workspace: &str,
        page: PageOptions,
    ) -> StateResult<PageResult<StateFileRef>> {
        let url = self.endpoint("state-versions")?;
        debug!("GET {} for {} (page {})", url, workspace, page.number);

        let mut query = page_query(page);
        query.push(("filter[organization][name]", org.to_owned()));
        query.push(("filter[workspace][name]", workspace.to_owned()));

        let req = self.client.get(url).query(&query);
        let body = self.body(self.send(req)?)?;
        parse_state_version_page(&body, workspace, page)
    }

    fn current_state_version(&self, workspace: &Workspace) -> StateResult<Option<StateFileRef>> {
        let url = self.endpoint(&format!("workspaces/{}/current-state-version", workspace.id))?;
        debug!("GET {}", url);

        match self.send(self.client.get(url)) {
            Ok(resp) => parse_current_state_version(&self.body(resp)?, &workspace.name).map(Some),
            Err(StateInfoError::RemoteService {
                kind: RemoteErrorKind::NotFound,
                ..
            }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn read_current_user(&self) -> StateResult<Identity> {
        let url = self.endpoint("account/details")?;
        debug!("GET {}", url);

        let body = self.body(self.send(self.client.get(url))?)?;
        let doc: Document<UserAttributes> = decode(&body)?;
        Ok(Identity {
            username: doc.data.attributes.username,
            email: doc.data.attributes.email,
        })
    }
}

fn kind_for_status(status: StatusCode) -> RemoteErrorKind {
    match status.as_u16() {
        401 | 403 => RemoteErrorKind::Unauthorized,
        404 => RemoteErrorKind::NotFound,
        408 | 429 | 500..=599 => RemoteErrorKind::Transient,
        _ => RemoteErrorKind::Other,
    }
}

fn page_query(page: PageOptions) -> Vec<(&'static str, String)> {
    vec![
        ("page[number]", page.number.to_string()),
        ("page[size]", page.size.to_string()),
    ]
}

#[derive(Debug, Deserialize)]
struct ListDocument<A> {
    data: Vec<Resource<A>>,
    #[serde(default)]
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct Document<A> {
    data: Resource<A>,
}

#[derive(Debug, Deserialize)]
struct Resource<A> {
    id: String,
    attributes: A,
}

#[derive(Debug, Deserialize)]
struct Meta {
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Pagination {
    current_page: u32,
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct WorkspaceAttributes {
    name: String,
    #[serde(default)]
    vcs_repo: Option<VcsRepo>,
}

#[derive(Debug, Deserialize)]
struct VcsRepo {
    identifier: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct StateVersionAttributes {
    hosted_state_download_url: Option<String>,
    #[serde(default)]
    serial: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct UserAttributes {
    username: String,
    #[serde(default)]
    email: Option<String>,
}

fn decode<T: DeserializeOwned>(body: &str) -> StateResult<T> {
    serde_json::from_str(body).map_err(|e| {
        StateInfoError::remote(
            RemoteErrorKind::Other,
            format!("Unexpected TFE response: {e}"),
        )
    })
}

fn into_page<A, T>(
    doc: ListDocument<A>,
    page: PageOptions,
    mut map: impl FnMut(usize, Resource<A>) -> StateResult<T>,
) -> StateResult<PageResult<T>> {
    let (current_page, total_pages) = doc
        .meta
        .and_then(|meta| meta.pagination)
        .map(|p| (p.current_page, p.total_pages))
        .unwrap_or((page.number, 1));

    let offset = page.offset();
    let items = doc
        .data
        .into_iter()
        .enumerate()
        .map(|(i, resource)| map(offset + i, resource))
        .collect::<StateResult<Vec<_>>>()?;

    Ok(PageResult {
        items,
        current_page,
        total_pages,
    })
}

fn parse_workspace_page(body: &str, page: PageOptions) -> StateResult<PageResult<Workspace>> {
    let doc: ListDocument<WorkspaceAttributes> = decode(body)?;
    into_page(doc, page, |_, resource| {
        Ok(Workspace {
            id: resource.id,
            name: resource.attributes.name,
            vcs_repo: resource.attributes.vcs_repo.and_then(|repo| repo.identifier),
        })
    })
}

fn state_file_ref(
    resource: Resource<StateVersionAttributes>,
    workspace: &str,
    index: usize,
) -> StateResult<StateFileRef> {
    let download_url = resource.attributes.hosted_state_download_url.ok_or_else(|| {
        StateInfoError::remote(
            RemoteErrorKind::Other,
            format!("State version {} has no download URL", resource.id),
        )
    })?;

    Ok(StateFileRef {
        workspace: workspace.to_owned(),
        download_url,
        index,
        serial: resource.attributes.serial,
    })
}

fn parse_state_version_page(
    body: &str,
    workspace: &str,
    page: PageOptions,
) -> StateResult<PageResult<StateFileRef>> {
    let doc: ListDocument<StateVersionAttributes> = decode(body)?;
    into_page(doc, page, |index, resource| {
        state_file_ref(resource, workspace, index)
    })
}

fn parse_current_state_version(body: &str, workspace: &str) -> StateResult<StateFileRef> {
    let doc: Document<StateVersionAttributes> = decode(body)?;
    state_file_ref(doc.data, workspace, 0)
}
