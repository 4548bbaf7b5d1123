use std::sync::Arc;

use crate::db::CourseRepository;

/// State shared by every request handler.
pub struct AppState {
    pub repository: Arc<dyn CourseRepository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn CourseRepository>) -> Self {
        Self { repository }
    }
}
