use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use super::types::{RawBranch, RawMergeRequest};
use super::{fetch_paged, RemoteApi, PAGE_SIZE};
use crate::config::Config;
use crate::utils::{Result, SweepError};

const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// GitLab v4 REST implementation of [`RemoteApi`].
///
/// Branch names and project paths are pushed as single URL path segments, so
/// slashes in path-like branch names are percent-encoded exactly once.
pub struct GitLabRemote {
    client: Client,
    base_url: Url,
    token: String,
}

impl GitLabRemote {
    pub fn new(base_url: Url, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("glsweep/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: token.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.remote.base_url)?;
        let token = config.resolve_token()?;
        Self::new(base_url, token)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds `<base>/api/v4/<segments...>` with each segment encoded as one
    /// path component.
    fn api_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                SweepError::config_error(format!(
                    "base URL '{}' cannot be used as an API endpoint",
                    self.base_url
                ))
            })?;
            path.pop_if_empty();
            path.push("api");
            path.push("v4");
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(TOKEN_HEADER, &self.token)
    }

    fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(SweepError::transport(Some(status.as_u16()), body))
    }

    fn get_page<T: DeserializeOwned>(
        &self,
        url: &Url,
        page: usize,
        extra: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let mut url = url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page", &page.to_string());
            query.append_pair("per_page", &PAGE_SIZE.to_string());
            for (key, value) in extra {
                query.append_pair(key, value);
            }
        }

        let response = self.authorized(self.client.get(url)).send()?;
        let response = Self::check_status(response)?;
        Ok(response.json()?)
    }
}

impl RemoteApi for GitLabRemote {
    fn list_branches(&self, project: &str) -> Result<Vec<RawBranch>> {
        let url = self.api_url(&["projects", project, "repository", "branches"])?;
        fetch_paged(|page| self.get_page(&url, page, &[]))
    }

    fn branch(&self, project: &str, name: &str) -> Result<Option<RawBranch>> {
        let url = self.api_url(&["projects", project, "repository", "branches", name])?;
        let response = self.authorized(self.client.get(url)).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check_status(response)?;
        Ok(Some(response.json()?))
    }

    fn is_merged_into(&self, project: &str, branch: &str, target: &str) -> Result<bool> {
        let url = self.api_url(&["projects", project, "merge_requests"])?;
        let filters = [
            ("state", "merged"),
            ("source_branch", branch),
            ("target_branch", target),
        ];

        let mut page = 1;
        loop {
            let batch: Vec<RawMergeRequest> = self.get_page(&url, page, &filters)?;
            if !batch.is_empty() {
                return Ok(true);
            }
            if batch.len() < PAGE_SIZE {
                return Ok(false);
            }
            page += 1;
        }
    }

    fn create_branch_ref(&self, project: &str, new_name: &str, from_sha: &str) -> Result<()> {
        let mut url = self.api_url(&["projects", project, "repository", "branches"])?;
        url.query_pairs_mut()
            .append_pair("branch", new_name)
            .append_pair("ref", from_sha);

        let response = self.authorized(self.client.post(url)).send()?;
        Self::check_status(response)?;
        Ok(())
    }

    fn delete_branch_ref(&self, project: &str, name: &str) -> Result<()> {
        let url = self.api_url(&["projects", project, "repository", "branches", name])?;
        let response = self.authorized(self.client.delete(url)).send()?;
        Self::check_status(response)?;
        Ok(())
    }
}
