mod client;
pub(crate) mod error;
pub(crate) mod models;
mod request;

pub use client::TrackerClient;
pub use models::Story;
pub use request::{Placement, StoryRequest, resolve_story_type};
