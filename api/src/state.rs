use prometheus::Registry;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::model::BlogModel;
use crate::store::BlogStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub blogs: BlogModel,
    pub started_at: Instant,
    pub registry: Registry,
}

impl AppState {
    pub fn new(store: Arc<dyn BlogStore>, query_timeout: Duration, registry: Registry) -> Self {
        Self {
            blogs: BlogModel::new(store, query_timeout),
            started_at: Instant::now(),
            registry,
        }
    }
}
