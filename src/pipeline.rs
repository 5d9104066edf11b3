use anyhow::{Context, Result};

use crate::tracker::{Placement, Story, StoryRequest, TrackerClient};
use crate::ui::output;

/// Lookup-then-create flow for a single story
pub struct StoryPipeline<'a> {
    client: &'a TrackerClient,
}

impl<'a> StoryPipeline<'a> {
    pub fn new(client: &'a TrackerClient) -> Self {
        Self { client }
    }

    /// Decide where the story goes.
    ///
    /// A failed backlog lookup is reported and the story falls back to the icebox.
    pub async fn resolve_placement(&self, important: bool) -> Placement {
        if !important {
            return Placement::Icebox;
        }

        match self.client.first_backlog_story().await {
            Ok(anchor) => Placement::before(anchor),
            Err(e) => {
                tracing::debug!(error = %e, "backlog lookup failed, using icebox");
                if let Err(write_err) = output::render_warning(&e.to_string()) {
                    tracing::warn!(error = %e, %write_err, "could not report backlog lookup failure");
                }
                Placement::Icebox
            }
        }
    }

    pub async fn submit(&self, request: &StoryRequest) -> Result<Story> {
        tracing::debug!(
            name = %request.name,
            story_type = %request.story_type,
            current_state = request.current_state.as_str(),
            "creating story"
        );

        self.client
            .create_story(request)
            .await
            .context("Failed to create story")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::tracker::models::StoryType;
    use crate::tracker::error::TrackerError;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(uri: &str) -> TrackerClient {
        TrackerClient::new(&Settings {
            api_url: uri.to_string(),
            token: "secret".to_string(),
            project: "7".to_string(),
        })
        .unwrap()
    }

    /// An address nothing listens on
    async fn dead_uri() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_not_important_skips_lookup() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects/7/iterations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let placement = StoryPipeline::new(&client).resolve_placement(false).await;
        assert_eq!(placement, Placement::Icebox);
    }

    #[tokio::test]
    async fn test_important_places_before_first_backlog_story() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects/7/iterations"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"stories": [{"id": 314}]}])),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let placement = StoryPipeline::new(&client).resolve_placement(true).await;
        assert_eq!(placement, Placement::TopOfBacklog { before_id: 314 });
    }

    #[tokio::test]
    async fn test_important_with_empty_backlog_still_creates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects/7/iterations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/projects/7/stories"))
            .and(body_partial_json(json!({"current_state": "unscheduled"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let pipeline = StoryPipeline::new(&client);

        let placement = pipeline.resolve_placement(true).await;
        assert_eq!(placement, Placement::Icebox);

        let request = StoryRequest::build(
            &["Urgent".to_string()],
            StoryType::Feature,
            "",
            0,
            placement,
        );
        assert!(request.before_id.is_none());

        let story = pipeline.submit(&request).await.unwrap();
        assert_eq!(story.id, 5);
    }

    #[tokio::test]
    async fn test_lookup_transport_failure_falls_back_to_icebox() {
        let client = client_for(&dead_uri().await);
        let placement = StoryPipeline::new(&client).resolve_placement(true).await;
        assert_eq!(placement, Placement::Icebox);
    }

    #[tokio::test]
    async fn test_lookup_api_error_falls_back_to_icebox() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects/7/iterations"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let placement = StoryPipeline::new(&client).resolve_placement(true).await;
        assert_eq!(placement, Placement::Icebox);
    }

    #[tokio::test]
    async fn test_submit_transport_failure_is_fatal() {
        let client = client_for(&dead_uri().await);
        let request = StoryRequest::build(
            &["Lost".to_string()],
            StoryType::Chore,
            "",
            0,
            Placement::Icebox,
        );

        let err = StoryPipeline::new(&client)
            .submit(&request)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrackerError>(),
            Some(TrackerError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_malformed_response_is_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/projects/7/stories"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"id\": \"oops\""))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let request = StoryRequest::build(
            &["Garbled".to_string()],
            StoryType::Feature,
            "",
            0,
            Placement::Icebox,
        );

        let err = StoryPipeline::new(&client)
            .submit(&request)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrackerError>(),
            Some(TrackerError::Decode { .. })
        ));
    }
}
