//! Application state shared with request handlers.

use crate::data::DatabaseService;
use std::sync::Arc;

/// Cheap to clone; every clone points at the same [`DatabaseService`].
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseService>,
}

impl AppState {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }
}
