//! HTTP-backed registry client.
//!
//! Each begin-operation fires the request on a background task and returns
//! at once; the task reports through the operation's completer. The caller
//! polls the handle from its tick loop and never blocks on the network.

use std::collections::HashSet;

use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{OpCompleter, OpHandle, OpKind, RegistryClient};

/// Body of the add request.
#[derive(Debug, Serialize)]
struct AddRequest {
    source: String,
}

/// One entry of the installed-packages listing.
#[derive(Debug, Deserialize)]
struct InstalledPackage {
    name: String,
    #[serde(default)]
    #[allow(dead_code)]
    version: Option<String>,
}

/// Registry client over a JSON HTTP API.
pub struct HttpRegistryClient {
    client: Client,
    base_url: String,
}

impl HttpRegistryClient {
    /// Build a client for the registry at `base_url`.
    ///
    /// Begin-operations spawn onto the ambient tokio runtime, so the client
    /// must be used from within one.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent("pkgkit-cli")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn packages_url(&self) -> String {
        format!("{}/v1/packages", self.base_url)
    }

    #[tracing::instrument(skip(client, url, body))]
    async fn post_add(client: Client, url: String, body: AddRequest) -> Result<()> {
        debug!("Adding package via {}...", url);

        let response = client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send add request to registry")?;

        response
            .error_for_status()
            .context("Registry rejected the add request")?;

        Ok(())
    }

    #[tracing::instrument(skip(client, url))]
    async fn delete_package(client: Client, url: String) -> Result<()> {
        debug!("Removing package via {}...", url);

        let response = client
            .delete(&url)
            .send()
            .await
            .context("Failed to send remove request to registry")?;

        response
            .error_for_status()
            .context("Registry rejected the remove request")?;

        Ok(())
    }

    #[tracing::instrument(skip(client, url))]
    async fn fetch_installed(client: Client, url: String) -> Result<HashSet<String>> {
        debug!("Listing installed packages from {}...", url);

        let response = client
            .get(&url)
            .send()
            .await
            .context("Failed to send list request to registry")?;

        let response = response
            .error_for_status()
            .context("Registry rejected the list request")?;

        let packages: Vec<InstalledPackage> = response
            .json()
            .await
            .context("Failed to parse JSON response from registry")?;

        Ok(packages.into_iter().map(|p| p.name).collect())
    }

    fn spawn_reporting<T, F>(completer: OpCompleter<T>, fut: F)
    where
        T: Send + 'static,
        F: std::future::Future<Output = Result<T>> + Send + 'static,
    {
        tokio::spawn(async move {
            match fut.await {
                Ok(value) => completer.succeed(value),
                Err(err) => completer.fail(format!("{:#}", err)),
            }
        });
    }
}

impl RegistryClient for HttpRegistryClient {
    fn begin_add(&self, source_locator: &str) -> OpHandle<()> {
        let (completer, handle) = OpHandle::pair(OpKind::Add);
        let client = self.client.clone();
        let url = self.packages_url();
        let body = AddRequest {
            source: source_locator.to_string(),
        };

        Self::spawn_reporting(completer, Self::post_add(client, url, body));
        handle
    }

    fn begin_remove(&self, canonical_id: &str) -> OpHandle<()> {
        let (completer, handle) = OpHandle::pair(OpKind::Remove);
        let client = self.client.clone();
        let url = format!("{}/{}", self.packages_url(), canonical_id);

        Self::spawn_reporting(completer, Self::delete_package(client, url));
        handle
    }

    fn begin_list(&self) -> OpHandle<HashSet<String>> {
        let (completer, handle) = OpHandle::pair(OpKind::List);
        let client = self.client.clone();
        let url = self.packages_url();

        Self::spawn_reporting(completer, Self::fetch_installed(client, url));
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::OpStatus;
    use std::time::Duration;

    /// Poll a handle from the test's tick loop until it resolves.
    async fn resolve<T>(mut handle: OpHandle<T>) -> OpStatus<T> {
        for _ in 0..200 {
            match handle.poll() {
                OpStatus::Pending => tokio::time::sleep(Duration::from_millis(10)).await,
                resolved => return resolved,
            }
        }
        panic!("operation did not resolve in time");
    }

    #[tokio::test]
    async fn test_begin_add_posts_source_locator() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/packages")
            .match_header("content-type", "application/json")
            .match_body(r#"{"source":"https://github.com/srawls1/core.git"}"#)
            .with_status(201)
            .create_async()
            .await;

        let client = HttpRegistryClient::new(server.url()).unwrap();
        let handle = client.begin_add("https://github.com/srawls1/core.git");

        assert!(matches!(resolve(handle).await, OpStatus::Succeeded(())));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_begin_add_failure_reports_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/packages")
            .with_status(500)
            .create_async()
            .await;

        let client = HttpRegistryClient::new(server.url()).unwrap();
        let handle = client.begin_add("https://github.com/srawls1/core.git");

        match resolve(handle).await {
            OpStatus::Failed(err) => assert_eq!(err.kind, OpKind::Add),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_begin_remove_deletes_by_canonical_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/v1/packages/com.srawls1.core")
            .with_status(204)
            .create_async()
            .await;

        let client = HttpRegistryClient::new(server.url()).unwrap();
        let handle = client.begin_remove("com.srawls1.core");

        assert!(matches!(resolve(handle).await, OpStatus::Succeeded(())));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_begin_list_collects_installed_names() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/packages")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"name": "com.srawls1.core", "version": "1.2.0"},
                    {"name": "com.srawls1.hitboxes"}
                ]"#,
            )
            .create_async()
            .await;

        let client = HttpRegistryClient::new(server.url()).unwrap();
        let handle = client.begin_list();

        match resolve(handle).await {
            OpStatus::Succeeded(installed) => {
                assert_eq!(installed.len(), 2);
                assert!(installed.contains("com.srawls1.core"));
                assert!(installed.contains("com.srawls1.hitboxes"));
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_begin_list_bad_payload_reports_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/packages")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = HttpRegistryClient::new(server.url()).unwrap();
        let handle = client.begin_list();

        match resolve(handle).await {
            OpStatus::Failed(err) => assert_eq!(err.kind, OpKind::List),
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
