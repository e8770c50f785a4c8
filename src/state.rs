// src/state.rs
use std::sync::Arc;
use std::time::Duration;

use crate::services::faq_store::FaqStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub faq: FaqStore,
    /// Pause between streamed reply chunks.
    pub stream_delay: Duration,
}

impl AppState {
    pub fn new(faq: FaqStore, stream_delay: Duration) -> Self {
        Self { faq, stream_delay }
    }
}
