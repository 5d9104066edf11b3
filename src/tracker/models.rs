use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Story identifier as assigned by Pivotal Tracker
pub type StoryId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoryType {
    #[default]
    Feature,
    Bug,
    Chore,
    Release,
}

impl StoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Bug => "bug",
            Self::Chore => "chore",
            Self::Release => "release",
        }
    }
}

impl fmt::Display for StoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryState {
    Unscheduled,
    Unstarted,
    Planned,
    Started,
    Finished,
    Delivered,
    Accepted,
    Rejected,
    #[serde(untagged)]
    Other(String),
}

impl StoryState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unscheduled => "unscheduled",
            Self::Unstarted => "unstarted",
            Self::Planned => "planned",
            Self::Started => "started",
            Self::Finished => "finished",
            Self::Delivered => "delivered",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct Label {
    pub id: u64,
    #[serde(default)]
    pub project_id: Option<u64>,
    #[serde(default)]
    pub kind: Option<String>,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A story as returned by the Tracker API.
///
/// Only `id` is required; the API omits fields depending on the request's
/// `fields` parameter and on the story's state.
#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct Story {
    pub id: StoryId,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub story_type: Option<StoryType>,
    #[serde(default)]
    pub current_state: Option<StoryState>,
    #[serde(default)]
    pub estimate: Option<f64>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub requested_by_id: Option<u64>,
    #[serde(default)]
    pub owner_ids: Vec<u64>,
    #[serde(default)]
    pub owned_by_id: Option<u64>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub integration_id: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub project_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct Iteration {
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub project_id: Option<u64>,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub team_strength: Option<f64>,
    #[serde(default)]
    pub stories: Vec<Story>,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finish: Option<DateTime<Utc>>,
    #[serde(default)]
    pub kind: Option<String>,
}

impl Iteration {
    /// Identifier of the story at the front of this iteration, if any
    pub fn first_story_id(&self) -> Option<StoryId> {
        self.stories.first().map(|s| s.id).filter(|id| *id > 0)
    }
}

/// Minimal project record, used to verify access
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
}
