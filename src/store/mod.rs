//! Client-side admin state store.
//!
//! A single store holding the auth flag, site configuration, and blog post
//! list for an admin session. Its only collaborator is the HTTP API; every
//! mutation round-trips through the server and the local copy is applied only
//! from the server's response, so a rejected call leaves the prior good state
//! visible.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::ErrorResponse;
use crate::models::{
    BlogPost, CreatePostRequest, LoginRequest, LoginResponse, SiteConfig, UpdateConfigRequest,
    UpdatePostRequest,
};

/// Errors surfaced to the admin console.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Api(String),
    #[error("not authenticated")]
    NotAuthenticated,
}

/// Store lifecycle phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePhase {
    Unauthenticated,
    Authenticating,
    /// Authenticated, a request is in flight.
    Loading,
    /// Authenticated, caught up with the server.
    Idle,
    /// Authenticated, the last operation failed; prior state is retained.
    Failed,
}

/// The persisted session-scoped subset, restored on page load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub is_authenticated: bool,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<SiteConfig>,
}

/// Admin console state store.
pub struct AdminStore {
    client: reqwest::Client,
    base_url: String,
    phase: StorePhase,
    token: Option<String>,
    config: Option<SiteConfig>,
    posts: Vec<BlogPost>,
    last_error: Option<String>,
}

impl AdminStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            phase: StorePhase::Unauthenticated,
            token: None,
            config: None,
            posts: Vec::new(),
            last_error: None,
        }
    }

    /// Rebuild a store from a persisted snapshot. The store starts in the
    /// loading phase; call [`initialize`](Self::initialize) to catch up.
    pub fn from_snapshot(base_url: impl Into<String>, snapshot: StoreSnapshot) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            phase: StorePhase::Loading,
            token: Some(snapshot.token),
            config: snapshot.config,
            posts: Vec::new(),
            last_error: None,
        }
    }

    pub fn phase(&self) -> StorePhase {
        self.phase
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn config(&self) -> Option<&SiteConfig> {
        self.config.as_ref()
    }

    pub fn posts(&self) -> &[BlogPost] {
        &self.posts
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The persisted subset (auth flag + config), if authenticated.
    pub fn snapshot(&self) -> Option<StoreSnapshot> {
        self.token.as_ref().map(|token| StoreSnapshot {
            is_authenticated: true,
            token: token.clone(),
            config: self.config.clone(),
        })
    }

    /// Dismiss a surfaced error and return to idle.
    pub fn acknowledge_error(&mut self) {
        if self.phase == StorePhase::Failed {
            self.last_error = None;
            self.phase = StorePhase::Idle;
        }
    }

    /// Authenticate and load initial state. A failed login stays
    /// unauthenticated and surfaces the error message.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), StoreError> {
        self.phase = StorePhase::Authenticating;

        let resp = self
            .client
            .post(self.url("/api/auth"))
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await;

        let resp = match resp {
            Ok(resp) => resp,
            Err(e) => {
                self.phase = StorePhase::Unauthenticated;
                self.last_error = Some(e.to_string());
                return Err(e.into());
            }
        };

        if !resp.status().is_success() {
            let err = api_error(resp).await;
            self.phase = StorePhase::Unauthenticated;
            self.last_error = Some(err.to_string());
            return Err(err);
        }

        let login: LoginResponse = match resp.json().await {
            Ok(login) => login,
            Err(e) => {
                self.phase = StorePhase::Unauthenticated;
                self.last_error = Some(e.to_string());
                return Err(e.into());
            }
        };
        self.token = Some(login.token);
        self.initialize().await
    }

    /// Fetch config and post list concurrently. The store advances to idle
    /// only when both resolve; either failure surfaces one aggregate error and
    /// applies neither result.
    pub async fn initialize(&mut self) -> Result<(), StoreError> {
        self.phase = StorePhase::Loading;

        let (config_res, posts_res) = tokio::join!(self.fetch_config(), self.fetch_posts());

        match (config_res, posts_res) {
            (Ok(config), Ok(posts)) => {
                self.config = Some(config);
                self.posts = posts;
                self.phase = StorePhase::Idle;
                Ok(())
            }
            (config_res, posts_res) => {
                let mut parts = Vec::new();
                if let Err(e) = config_res {
                    parts.push(format!("config: {}", e));
                }
                if let Err(e) = posts_res {
                    parts.push(format!("posts: {}", e));
                }
                let message = format!("initialization failed ({})", parts.join("; "));
                self.phase = StorePhase::Failed;
                self.last_error = Some(message.clone());
                Err(StoreError::Api(message))
            }
        }
    }

    /// Revoke the session and discard all local state. The persisted auth flag
    /// is gone with the snapshot.
    pub async fn logout(&mut self) {
        if let Some(token) = self.token.take() {
            // Best effort; local state clears regardless
            let _ = self
                .client
                .post(self.url("/api/auth/logout"))
                .bearer_auth(&token)
                .send()
                .await;
        }

        self.config = None;
        self.posts.clear();
        self.last_error = None;
        self.phase = StorePhase::Unauthenticated;
    }

    /// Create a post and prepend the server's copy to the list.
    pub async fn create_post(&mut self, request: &CreatePostRequest) -> Result<(), StoreError> {
        let token = self.require_token()?;
        self.phase = StorePhase::Loading;

        let result = self
            .request_json::<BlogPost>(
                self.client
                    .post(self.url("/api/blogs"))
                    .bearer_auth(token)
                    .json(request),
            )
            .await;

        match result {
            Ok(post) => {
                self.posts.insert(0, post);
                self.phase = StorePhase::Idle;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Update a post in place with the server's merged copy.
    pub async fn update_post(
        &mut self,
        id: &str,
        request: &UpdatePostRequest,
    ) -> Result<(), StoreError> {
        let token = self.require_token()?;
        self.phase = StorePhase::Loading;

        let result = self
            .request_json::<BlogPost>(
                self.client
                    .put(self.url(&format!("/api/blogs/{}", id)))
                    .bearer_auth(token)
                    .json(request),
            )
            .await;

        match result {
            Ok(post) => {
                if let Some(slot) = self.posts.iter_mut().find(|p| p.id == post.id) {
                    *slot = post;
                }
                self.phase = StorePhase::Idle;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Delete a post and drop it from the list.
    pub async fn delete_post(&mut self, id: &str) -> Result<(), StoreError> {
        let token = self.require_token()?;
        self.phase = StorePhase::Loading;

        let resp = self
            .client
            .delete(self.url(&format!("/api/blogs/{}", id)))
            .bearer_auth(token)
            .send()
            .await;

        match resp {
            Ok(resp) if resp.status().is_success() => {
                self.posts.retain(|p| p.id != id);
                self.phase = StorePhase::Idle;
                Ok(())
            }
            Ok(resp) => {
                let err = api_error(resp).await;
                Err(self.fail(err))
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Update the site configuration with the server's merged copy.
    pub async fn update_config(&mut self, request: &UpdateConfigRequest) -> Result<(), StoreError> {
        let token = self.require_token()?;
        self.phase = StorePhase::Loading;

        let result = self
            .request_json::<SiteConfig>(
                self.client
                    .post(self.url("/api/config"))
                    .bearer_auth(token)
                    .json(request),
            )
            .await;

        match result {
            Ok(config) => {
                self.config = Some(config);
                self.phase = StorePhase::Idle;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    async fn fetch_config(&self) -> Result<SiteConfig, StoreError> {
        self.request_json(self.client.get(self.url("/api/config")))
            .await
    }

    async fn fetch_posts(&self) -> Result<Vec<BlogPost>, StoreError> {
        self.request_json(self.client.get(self.url("/api/blogs")))
            .await
    }

    async fn request_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, StoreError> {
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        Ok(resp.json().await?)
    }

    fn require_token(&self) -> Result<String, StoreError> {
        self.token.clone().ok_or(StoreError::NotAuthenticated)
    }

    fn fail(&mut self, err: StoreError) -> StoreError {
        self.last_error = Some(err.to_string());
        self.phase = StorePhase::Failed;
        err
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Extract the server's error message, falling back to the status code.
async fn api_error(resp: reqwest::Response) -> StoreError {
    let status = resp.status();
    match resp.json::<ErrorResponse>().await {
        Ok(body) => StoreError::Api(body.error.message),
        Err(_) => StoreError::Api(format!("request failed with status {}", status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_is_unauthenticated() {
        let store = AdminStore::new("http://127.0.0.1:0");
        assert_eq!(store.phase(), StorePhase::Unauthenticated);
        assert!(!store.is_authenticated());
        assert!(store.snapshot().is_none());
        assert!(store.posts().is_empty());
    }

    #[test]
    fn test_snapshot_resume_carries_session() {
        let snapshot = StoreSnapshot {
            is_authenticated: true,
            token: "token-123".to_string(),
            config: None,
        };
        let store = AdminStore::from_snapshot("http://127.0.0.1:0", snapshot);
        assert_eq!(store.phase(), StorePhase::Loading);
        assert!(store.is_authenticated());
    }

    #[test]
    fn test_acknowledge_error_only_from_failed() {
        let mut store = AdminStore::new("http://127.0.0.1:0");
        store.acknowledge_error();
        assert_eq!(store.phase(), StorePhase::Unauthenticated);

        store.phase = StorePhase::Failed;
        store.last_error = Some("boom".to_string());
        store.acknowledge_error();
        assert_eq!(store.phase(), StorePhase::Idle);
        assert!(store.last_error().is_none());
    }
}
