use super::error::{Result, TrackerError};
use super::models::{Iteration, Project, Story, StoryId};
use super::request::StoryRequest;
use crate::config::Settings;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

#[derive(Clone)]
pub struct TrackerClient {
    client: Client,
    base_url: String,
    project: String,
    token: String,
}

impl TrackerClient {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            project: settings.project.clone(),
            token: settings.token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/projects/{}{}", self.base_url, self.project, path);
        tracing::debug!(method = method.as_str(), url = url.as_str(), "tracker request");

        self.client
            .request(method, &url)
            .header("X-TrackerToken", &self.token)
            .header("Content-Type", "application/json")
    }

    /// Identifier of the first story in the current iteration's backlog.
    ///
    /// `Ok(None)` when there is no current iteration or it holds no stories.
    pub async fn first_backlog_story(&self) -> Result<Option<StoryId>> {
        let req = self
            .request(Method::GET, "/iterations")
            .query(&[("limit", "1"), ("offset", "1"), ("scope", "current")]);

        let iterations: Vec<Iteration> = self.execute(req, "iteration").await?;
        let anchor = iterations.first().and_then(Iteration::first_story_id);

        tracing::debug!(?anchor, iterations = iterations.len(), "backlog lookup");
        Ok(anchor)
    }

    pub async fn create_story(&self, story: &StoryRequest) -> Result<Story> {
        let req = self.request(Method::POST, "/stories").json(story);
        self.execute(req, "story").await
    }

    pub async fn get_project(&self) -> Result<Project> {
        let req = self.request(Method::GET, "");
        self.execute(req, "project").await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        what: &'static str,
    ) -> Result<T> {
        let response = req.send().await.map_err(TrackerError::Transport)?;
        let body = Self::read_body(response).await?;

        serde_json::from_str(&body).map_err(|source| TrackerError::Decode { what, source })
    }

    async fn read_body(response: Response) -> Result<String> {
        let status = response.status();
        tracing::debug!(%status, "tracker response");

        let body = response.text().await.map_err(TrackerError::Transport)?;

        if !status.is_success() {
            return Err(TrackerError::from_response_body(status, &body));
        }

        Ok(body)
    }
}
