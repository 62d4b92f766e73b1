//! Scripted fetcher shared by the integration suites.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use tokio::sync::Semaphore;

use zenithsync::fetch::{AssetFetcher, BoxFuture, FetchOutcome};
use zenithsync::SyncError;

/// One recorded fetch invocation.
#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    /// Whether the request carried a conditional validator.
    pub conditional: bool,
}

/// Fetcher returning scripted responses per URL, in order.
///
/// An optional gate makes every fetch wait for a permit, which lets tests
/// hold a wave in flight and release it deliberately.
pub struct ScriptedFetcher {
    responses: Mutex<HashMap<String, VecDeque<Result<FetchOutcome, SyncError>>>>,
    calls: Mutex<Vec<Call>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Fetches block until the gate hands out a permit; each fetch consumes
    /// one permanently.
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new()
        }
    }

    pub fn respond(&self, url: &str, result: Result<FetchOutcome, SyncError>) {
        self.responses
            .lock()
            .entry(url.to_string())
            .or_default()
            .push_back(result);
    }

    pub fn respond_bytes(&self, url: &str, bytes: &[u8]) {
        self.respond(url, Ok(FetchOutcome::Fetched(bytes.to_vec())));
    }

    pub fn respond_not_modified(&self, url: &str) {
        self.respond(url, Ok(FetchOutcome::NotModified));
    }

    pub fn respond_error(&self, url: &str, error: SyncError) {
        self.respond(url, Err(error));
    }

    /// Every fetch seen so far, in completion order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }
}

impl Default for ScriptedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetFetcher for ScriptedFetcher {
    fn fetch(
        &self,
        url: &str,
        modified_since: Option<SystemTime>,
    ) -> BoxFuture<'_, Result<FetchOutcome, SyncError>> {
        let url = url.to_string();
        Box::pin(async move {
            if let Some(gate) = &self.gate {
                let permit = gate.acquire().await.expect("gate closed");
                permit.forget();
            }
            self.calls.lock().push(Call {
                url: url.clone(),
                conditional: modified_since.is_some(),
            });
            match self
                .responses
                .lock()
                .get_mut(&url)
                .and_then(|queue| queue.pop_front())
            {
                Some(result) => result,
                None => Err(SyncError::data_processing(format!("unscripted url {url}"))),
            }
        })
    }
}

/// Clock pinned to a fixed instant.
pub struct FixedClock(pub SystemTime);

impl zenithsync::sync::Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}
