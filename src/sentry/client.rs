//! Sentry REST client for release and artifact operations

use crate::build::UploadFile;
use crate::config::UrlScheme;
use crate::error::{ConfigError, Result, UploaderError};
use futures::future::join_all;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Method, Response};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tokio_util::io::ReaderStream;
use url::Url;

/// Organization/project addressed by release calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseScope {
    /// Organization slug
    pub organization: String,
    /// Project slug used by [`UrlScheme::ProjectScoped`]
    pub project: String,
    /// URL layout
    pub scheme: UrlScheme,
}

/// Release artifact as listed by Sentry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Artifact {
    /// Service-assigned id
    #[serde(default)]
    pub id: Option<ArtifactId>,
    /// Artifact name, e.g. `~/app.js`
    #[serde(default)]
    pub name: Option<String>,
}

/// Artifact ids are strings in current API versions and numbers in old ones
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ArtifactId {
    /// String id
    Text(String),
    /// Numeric id
    Number(u64),
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactId::Text(id) => f.write_str(id),
            ArtifactId::Number(id) => write!(f, "{id}"),
        }
    }
}

/// Authenticated client for one organization's releases
#[derive(Debug, Clone)]
pub struct SentryApi {
    client: Client,
    base_url: Url,
    api_key: String,
    scope: ReleaseScope,
}

impl SentryApi {
    /// Create a client; the base URL must be able to take path segments
    pub fn new(client: Client, base_url: &str, api_key: &str, scope: ReleaseScope) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            }
            .into());
        }

        Ok(Self {
            client,
            base_url: parsed,
            api_key: api_key.to_string(),
            scope,
        })
    }

    /// `{base}/organizations/{org}/releases/` or `{base}/{org}/{project}/releases/`
    pub fn releases_url(&self) -> Result<Url> {
        self.endpoint(&[])
    }

    /// `{releases}/{version}/files/`
    pub fn files_url(&self, version: &str) -> Result<Url> {
        self.endpoint(&[version, "files"])
    }

    /// `{releases}/{version}/files/{id}/`
    pub fn file_url(&self, version: &str, id: &str) -> Result<Url> {
        self.endpoint(&[version, "files", id])
    }

    fn endpoint(&self, tail: &[&str]) -> Result<Url> {
        let scope: Vec<&str> = match self.scope.scheme {
            UrlScheme::Organizations => {
                vec!["organizations", self.scope.organization.as_str(), "releases"]
            }
            UrlScheme::ProjectScoped => vec![
                "projects",
                self.scope.organization.as_str(),
                self.scope.project.as_str(),
                "releases",
            ],
        };

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ConfigError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(scope)
            .extend(tail)
            .push("");
        Ok(url)
    }

    /// Create the release record
    pub async fn create_release(&self, body: &Value) -> Result<Value> {
        let url = self.releases_url()?;
        log::debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        let response = check_status(response, Method::POST).await?;

        // Some self-hosted proxies answer 201 with an empty body.
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// List artifacts already attached to a release
    pub async fn list_artifacts(&self, version: &str) -> Result<Vec<Artifact>> {
        let url = self.files_url(version)?;
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let response = check_status(response, Method::GET).await?;
        Ok(response.json().await?)
    }

    /// Delete one artifact
    pub async fn delete_artifact(&self, version: &str, id: &str) -> Result<()> {
        let url = self.file_url(version, id)?;
        log::debug!("DELETE {}", url);

        let response = self
            .client
            .delete(url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        check_status(response, Method::DELETE).await?;
        Ok(())
    }

    /// Delete every listed artifact that carries an id.
    ///
    /// Requests run concurrently; the first failure in list order is returned
    /// once all of them have settled.
    pub async fn delete_artifacts(&self, version: &str, artifacts: &[Artifact]) -> Result<usize> {
        let ids: Vec<String> = artifacts
            .iter()
            .filter_map(|artifact| artifact.id.as_ref().map(ToString::to_string))
            .collect();

        let results = join_all(ids.iter().map(|id| self.delete_artifact(version, id))).await;
        results.into_iter().collect::<Result<Vec<()>>>()?;
        Ok(ids.len())
    }

    /// Upload one file as a release artifact named `name`
    pub async fn upload_artifact(
        &self,
        version: &str,
        file: &UploadFile,
        name: &str,
    ) -> Result<()> {
        let url = self.files_url(version)?;
        log::debug!("POST {} ({} as {})", url, file.path.display(), name);

        let handle = tokio::fs::File::open(&file.path).await?;
        let length = handle.metadata().await?.len();
        let file_name = file
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.name.clone());

        let part = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(handle)), length)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        let form = Form::new().part("file", part).text("name", name.to_string());

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;
        check_status(response, Method::POST).await?;
        Ok(())
    }

    /// Upload every `(file, artifact name)` pair concurrently.
    ///
    /// Waits for all uploads to settle; any failure fails the whole batch.
    pub async fn upload_artifacts(
        &self,
        version: &str,
        uploads: &[(UploadFile, String)],
    ) -> Result<usize> {
        let results = join_all(
            uploads
                .iter()
                .map(|(file, name)| self.upload_artifact(version, file, name)),
        )
        .await;
        results.into_iter().collect::<Result<Vec<()>>>()?;
        Ok(uploads.len())
    }
}

/// Turn non-2xx responses into [`UploaderError::Api`]
async fn check_status(response: Response, method: Method) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(UploaderError::Api {
        method: method.to_string(),
        url,
        status: status.as_u16(),
        body,
    })
}
