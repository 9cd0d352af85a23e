use chrono_tz::Tz;

pub mod content;
pub mod repository;
pub mod sweep;

#[cfg(test)]
pub mod test_utils;

use crate::domain::repository::ContentRepository;

/// The global application state shared between all request handlers.
pub trait AppState: Clone + Send + Sync + 'static {
    type R: ContentRepository;

    fn repository(&self) -> &Self::R;

    /// Zone whose civil rules editor-supplied publish instants follow.
    fn content_timezone(&self) -> Tz;
}
