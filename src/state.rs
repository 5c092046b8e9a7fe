use std::sync::Arc;

use crate::repository::LogRepository;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<LogRepository>,
}

impl AppState {
    pub fn new(repo: LogRepository) -> Self {
        Self {
            repo: Arc::new(repo),
        }
    }
}
