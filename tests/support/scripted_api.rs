//! Scripted customers API for driving the client feed.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use customer_explorer::feed::FetchParams;
use customer_explorer::{Customer, CustomersApi, CustomersPage, FetchError};

/// Replays queued outcomes in order and records the parameters of every
/// call. With a gate installed, each call waits for `release()` before
/// answering, so a test can hold a fetch in flight.
#[derive(Clone, Default)]
pub struct ScriptedApi {
    outcomes: Arc<Mutex<VecDeque<Result<CustomersPage, FetchError>>>>,
    calls: Arc<Mutex<Vec<FetchParams>>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Notify::new())),
            ..Self::default()
        }
    }

    pub fn page(self, page: CustomersPage) -> Self {
        self.outcomes.lock().unwrap().push_back(Ok(page));
        self
    }

    pub fn fail(self, error: FetchError) -> Self {
        self.outcomes.lock().unwrap().push_back(Err(error));
        self
    }

    /// Let one waiting call answer.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> Vec<FetchParams> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CustomersApi for ScriptedApi {
    async fn get_customers(&self, params: &FetchParams) -> Result<CustomersPage, FetchError> {
        self.calls.lock().unwrap().push(params.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Transport("script exhausted".into())))
    }
}

pub fn customer(id: &str) -> Customer {
    Customer {
        id: id.into(),
        full_name: format!("Customer {id}"),
        email: format!("{id}@example.com"),
        registration_date: "2024-01-01T00:00:00.000Z".into(),
    }
}

pub fn customers_page(ids: &[&str], cursor: Option<&str>) -> CustomersPage {
    CustomersPage {
        data: ids.iter().map(|id| customer(id)).collect(),
        page_size: ids.len().max(1) as u32,
        has_next: cursor.is_some(),
        cursor: cursor.map(str::to_string),
    }
}
