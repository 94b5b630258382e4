//! HTTP-backed remote document store.
//!
//! Talks to a document-store REST API: documents live at
//! `/collections/{collection}/documents/{id}` and per-user membership lists
//! at `/users/{owner}/collections/{name}`. Requests carry a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};

use crate::auth::UserId;
use crate::remote::{RemoteDocumentStore, RemoteError};

#[derive(Clone, Debug)]
pub struct RestRemoteStore {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl RestRemoteStore {
    pub fn new(
        base_url: impl Into<String>,
        api_key: SecretString,
        timeout_secs: u64,
    ) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|error| RemoteError::Transport(error.to_string()))?;

        Ok(Self { client, base_url: base_url.into().trim_end_matches('/').to_string(), api_key })
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/collections/{collection}/documents/{id}", self.base_url)
    }

    fn membership_url(&self, owner: &UserId, name: &str) -> String {
        format!("{}/users/{}/collections/{name}", self.base_url, owner.0)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(self.api_key.expose_secret())
    }

    async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(RemoteError::Status { status: status.as_u16() })
    }
}

#[async_trait]
impl RemoteDocumentStore for RestRemoteStore {
    async fn create_with_id(
        &self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<(), RemoteError> {
        let request = self.client.put(self.document_url(collection, id)).json(&document);
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|error| RemoteError::Transport(error.to_string()))?;
        Self::expect_success(response).await.map(|_| ())
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, RemoteError> {
        let request = self.client.get(self.document_url(collection, id));
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|error| RemoteError::Transport(error.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::expect_success(response).await?;
        let document =
            response.json().await.map_err(|error| RemoteError::Decode(error.to_string()))?;
        Ok(Some(document))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), RemoteError> {
        let request =
            self.client.patch(self.document_url(collection, id)).json(&Value::Object(fields));
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|error| RemoteError::Transport(error.to_string()))?;
        Self::expect_success(response).await.map(|_| ())
    }

    async fn add_to_user_collection(
        &self,
        name: &str,
        owner: &UserId,
        id: &str,
    ) -> Result<(), RemoteError> {
        let url = format!("{}/{id}", self.membership_url(owner, name));
        let response = self
            .authorized(self.client.put(url))
            .send()
            .await
            .map_err(|error| RemoteError::Transport(error.to_string()))?;
        Self::expect_success(response).await.map(|_| ())
    }

    async fn remove_from_user_collection(
        &self,
        name: &str,
        owner: &UserId,
        id: &str,
    ) -> Result<(), RemoteError> {
        let url = format!("{}/{id}", self.membership_url(owner, name));
        let response = self
            .authorized(self.client.delete(url))
            .send()
            .await
            .map_err(|error| RemoteError::Transport(error.to_string()))?;
        Self::expect_success(response).await.map(|_| ())
    }

    async fn get_user_collection(
        &self,
        name: &str,
        owner: &UserId,
    ) -> Result<Vec<String>, RemoteError> {
        let response = self
            .authorized(self.client.get(self.membership_url(owner, name)))
            .send()
            .await
            .map_err(|error| RemoteError::Transport(error.to_string()))?;
        let response = Self::expect_success(response).await?;
        response.json().await.map_err(|error| RemoteError::Decode(error.to_string()))
    }
}
