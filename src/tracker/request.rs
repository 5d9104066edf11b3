use serde::Serialize;

use super::models::{StoryId, StoryState, StoryType};

/// Where a new story should land in the project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Unscheduled, no ordering hint
    Icebox,
    /// Top of the backlog, inserted before the given story
    TopOfBacklog { before_id: StoryId },
}

impl Placement {
    /// Build a placement from an optional anchor story.
    pub fn before(anchor: Option<StoryId>) -> Self {
        match anchor {
            Some(id) if id > 0 => Self::TopOfBacklog { before_id: id },
            _ => Self::Icebox,
        }
    }

    pub fn current_state(&self) -> StoryState {
        match self {
            Self::Icebox => StoryState::Unscheduled,
            Self::TopOfBacklog { .. } => StoryState::Unstarted,
        }
    }

    fn before_id(&self) -> Option<StoryId> {
        match self {
            Self::Icebox => None,
            Self::TopOfBacklog { before_id } => Some(*before_id),
        }
    }
}

/// Outcome of resolving the `--bug`/`--chore` flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeResolution {
    pub story_type: StoryType,
    pub conflict: bool,
}

pub fn resolve_story_type(bug: bool, chore: bool) -> TypeResolution {
    let story_type = match (bug, chore) {
        (true, false) => StoryType::Bug,
        (false, true) => StoryType::Chore,
        _ => StoryType::Feature,
    };

    TypeResolution {
        story_type,
        conflict: bug && chore,
    }
}

/// Split a comma-separated label list.
///
/// An empty first element means "no labels"; later elements are kept as-is,
/// so `"a,"` yields `["a", ""]` while `",a"` yields nothing.
pub fn parse_labels(input: &str) -> Vec<String> {
    let labels: Vec<String> = input.split(',').map(str::to_string).collect();

    match labels.first() {
        Some(first) if !first.is_empty() => labels,
        _ => Vec::new(),
    }
}

/// JSON body for `POST /projects/{id}/stories`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryRequest {
    pub name: String,
    pub story_type: StoryType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    pub current_state: StoryState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_id: Option<StoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<u32>,
}

impl StoryRequest {
    pub fn build(
        title_words: &[String],
        story_type: StoryType,
        labels: &str,
        estimate: u32,
        placement: Placement,
    ) -> Self {
        Self {
            name: title_words.join(" "),
            story_type,
            labels: parse_labels(labels),
            current_state: placement.current_state(),
            before_id: placement.before_id(),
            estimate: (estimate > 0).then_some(estimate),
        }
    }
}
