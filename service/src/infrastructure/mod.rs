use chrono_tz::Tz;

use crate::domain::AppState;
use crate::infrastructure::persistence::PostgresContentRepository;

pub mod http;
pub mod persistence;
pub mod settings;
pub mod sweeper;

#[derive(Clone)]
pub struct AppStateImpl {
    repository: PostgresContentRepository,
    content_timezone: Tz,
}

impl AppStateImpl {
    pub fn new(repository: PostgresContentRepository, content_timezone: Tz) -> Self {
        Self {
            repository,
            content_timezone,
        }
    }
}

impl AppState for AppStateImpl {
    type R = PostgresContentRepository;

    fn repository(&self) -> &Self::R {
        &self.repository
    }

    fn content_timezone(&self) -> Tz {
        self.content_timezone
    }
}
