#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

use replug::build::{BuildOutcome, BuildRequest, BuildTrigger};
use replug::errors::Result;
use replug::reload::ReloadNotifier;

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Poll a condition until it holds or the timeout elapses.
pub async fn wait_until<F: Fn() -> bool>(condition: F, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// A fake build trigger that:
/// - records each invocation's request,
/// - reports an overlap if `run` is re-entered before the previous call
///   returned,
/// - pops outcomes from a queue (defaulting to success).
pub struct FakeBuildTrigger {
    pub calls: Arc<Mutex<Vec<BuildRequest>>>,
    pub outcomes: Arc<Mutex<VecDeque<BuildOutcome>>>,
    pub overlap_detected: Arc<AtomicBool>,
    pub delay: Duration,
    running: Arc<AtomicBool>,
}

impl FakeBuildTrigger {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            overlap_detected: Arc::new(AtomicBool::new(false)),
            delay: Duration::ZERO,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn push_outcome(&self, outcome: BuildOutcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl BuildTrigger for FakeBuildTrigger {
    fn run<'a>(
        &'a mut self,
        request: &'a BuildRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BuildOutcome>> + Send + 'a>> {
        Box::pin(async move {
            if self.running.swap(true, Ordering::SeqCst) {
                self.overlap_detected.store(true, Ordering::SeqCst);
            }
            self.calls.lock().unwrap().push(request.clone());

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            self.running.store(false, Ordering::SeqCst);
            let outcome = self
                .outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(BuildOutcome::Success);
            Ok(outcome)
        })
    }
}

/// A fake notifier that records every call in order and can be told to fail.
#[derive(Clone)]
pub struct RecordingNotifier {
    pub events: Arc<Mutex<Vec<String>>>,
    pub fail_initialize: Arc<AtomicBool>,
    pub fail_reload: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            fail_initialize: Arc::new(AtomicBool::new(false)),
            fail_reload: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn reload_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| e.starts_with("reload:"))
            .count()
    }
}

impl ReloadNotifier for RecordingNotifier {
    fn initialize<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.events.lock().unwrap().push("initialize".to_string());
            if self.fail_initialize.load(Ordering::SeqCst) {
                return Err(anyhow::anyhow!("simulated initialize failure").into());
            }
            Ok(())
        })
    }

    fn reload<'a>(&'a self, target: &'a str) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.events.lock().unwrap().push(format!("reload:{target}"));
            if self.fail_reload.load(Ordering::SeqCst) {
                return Err(anyhow::anyhow!("simulated reload failure").into());
            }
            Ok(())
        })
    }
}
