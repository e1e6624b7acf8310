//! In-memory capture of pipeline boundary events for tests
//!
//! `init_test_capture` installs a global layer once per test binary. Tests in
//! one binary share the buffer, so they look events up by operation name.

use recon_core_types::schema::{
    FIELD_COMPONENT, FIELD_DURATION_MS, FIELD_ENTRY_COUNT, FIELD_ERR_CODE, FIELD_ERR_KIND,
    FIELD_EVENT, FIELD_EXPRESSION, FIELD_OP,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One captured event with its fields rendered as text
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn component(&self) -> Option<&str> {
        self.field(FIELD_COMPONENT)
    }

    pub fn op(&self) -> Option<&str> {
        self.field(FIELD_OP)
    }

    /// `start`, `end` or `end_error`
    pub fn event(&self) -> Option<&str> {
        self.field(FIELD_EVENT)
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.field(FIELD_DURATION_MS)?.parse().ok()
    }

    pub fn entry_count(&self) -> Option<usize> {
        self.field(FIELD_ENTRY_COUNT)?.parse().ok()
    }

    pub fn expression(&self) -> Option<&str> {
        self.field(FIELD_EXPRESSION)
    }

    pub fn err_code(&self) -> Option<&str> {
        self.field(FIELD_ERR_CODE)
    }

    pub fn err_kind(&self) -> Option<&str> {
        self.field(FIELD_ERR_KIND)
    }
}

#[derive(Default)]
struct FieldVisitor(HashMap<String, String>);

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

struct CaptureLayer(Arc<Mutex<Vec<CapturedEvent>>>);

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let captured = CapturedEvent {
            level: *event.metadata().level(),
            fields: visitor.0,
        };
        self.0.lock().map(|mut events| events.push(captured)).ok();
    }
}

/// Read handle on the captured events
#[derive(Clone)]
pub struct TestCapture(Arc<Mutex<Vec<CapturedEvent>>>);

impl TestCapture {
    /// Events emitted by one operation, in emission order
    pub fn events_for_op(&self, op: &str) -> Vec<CapturedEvent> {
        self.0
            .lock()
            .map(|events| {
                events
                    .iter()
                    .filter(|e| e.op() == Some(op))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The latest `event` boundary (`start`, `end`, `end_error`) of `op`
    pub fn last_boundary(&self, op: &str, event: &str) -> Option<CapturedEvent> {
        self.events_for_op(op)
            .into_iter()
            .rev()
            .find(|e| e.event() == Some(event))
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer on first use and return the shared handle.
///
/// ```
/// use recon_core::logging_facility::test_capture::init_test_capture;
/// use recon_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_capture_op");
/// assert!(capture.last_boundary("doc_capture_op", "start").is_some());
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let events = Arc::new(Mutex::new(Vec::new()));
            tracing_subscriber::registry()
                .with(CaptureLayer(Arc::clone(&events)))
                .try_init()
                .ok();
            TestCapture(events)
        })
        .clone()
}
