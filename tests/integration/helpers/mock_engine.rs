use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use harvestrs::engines::traits::{EngineError, PageEngine, PageRequest, PageSnapshot};

/// Engine backed by pre-scripted responses, keyed by URL.
///
/// Each URL holds a queue of outcomes consumed in order, so retry
/// sequences can be scripted as [Err, Err, Ok]. The engine also tracks
/// the peak number of concurrent loads, which lets tests assert the
/// session bound end to end.
pub struct ScriptedEngine {
    responses: Mutex<HashMap<String, VecDeque<Result<String, EngineError>>>>,
    calls: Mutex<Vec<String>>,
    load_delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::with_load_delay(Duration::ZERO)
    }

    pub fn with_load_delay(load_delay: Duration) -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            load_delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn script(&self, url: &str, outcome: Result<String, EngineError>) {
        self.responses
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(outcome);
    }

    pub fn script_html(&self, url: &str, html: &str) {
        self.script(url, Ok(html.to_string()));
    }

    /// URLs in the order the engine received them.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_matching(&self, needle: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.contains(needle))
            .count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the gauge even when the load future is dropped mid-flight.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PageEngine for ScriptedEngine {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn load(&self, request: &PageRequest) -> Result<PageSnapshot, EngineError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);
        self.calls.lock().unwrap().push(request.url.clone());

        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }

        let outcome = self
            .responses
            .lock()
            .unwrap()
            .get_mut(&request.url)
            .and_then(|queue| queue.pop_front());

        match outcome {
            Some(Ok(html)) => Ok(PageSnapshot {
                url: request.url.clone(),
                html,
                elapsed: self.load_delay,
            }),
            Some(Err(error)) => Err(error),
            None => Err(EngineError::Navigation(format!(
                "no scripted response for {}",
                request.url
            ))),
        }
    }
}
