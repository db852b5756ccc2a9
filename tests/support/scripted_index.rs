//! Scripted customer index that records every query it receives.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use customer_explorer::{CustomerIndex, IndexPage, IndexQuery, StoreError};

/// Replays queued responses in order and records the queries issued.
///
/// Once the script runs out it answers with an empty, final page.
/// Clone-friendly via Arc, so a test can keep a handle after moving a
/// clone into a service.
#[derive(Clone, Default)]
pub struct ScriptedIndex {
    responses: Arc<Mutex<VecDeque<Result<IndexPage, StoreError>>>>,
    calls: Arc<Mutex<Vec<IndexQuery>>>,
}

impl ScriptedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, page: IndexPage) -> Self {
        self.responses.lock().unwrap().push_back(Ok(page));
        self
    }

    pub fn fail(self, error: StoreError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<IndexQuery> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CustomerIndex for ScriptedIndex {
    async fn query(&self, query: &IndexQuery) -> Result<IndexPage, StoreError> {
        self.calls.lock().unwrap().push(query.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(IndexPage::default()))
    }
}
