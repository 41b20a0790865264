//! Test doubles shared by the unit tests.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::backend::LogBackend;
use crate::label::CategoryLabel;
use crate::message::SpyMessage;
use crate::threshold::Severity;

/// One call into [`RecordingBackend::log`], payload already rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub severity: Severity,
    pub label: CategoryLabel,
    pub text: String,
    pub exec_time: Option<i64>,
    pub error: Option<String>,
    pub debug_enabled: bool,
}

/// A backend that keeps everything it is given.
///
/// `min_severity` plays the part of the subscriber's level filter;
/// `disabled` removes labels entirely.
#[derive(Debug)]
pub struct RecordingBackend {
    pub min_severity: Severity,
    pub disabled: Vec<CategoryLabel>,
    records: Mutex<Vec<Record>>,
    debug_lines: Mutex<Vec<String>>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::with_min_severity(Severity::Info)
    }
}

impl RecordingBackend {
    pub fn with_min_severity(min_severity: Severity) -> Self {
        Self {
            min_severity,
            disabled: Vec::new(),
            records: Mutex::new(Vec::new()),
            debug_lines: Mutex::new(Vec::new()),
        }
    }

    pub fn disable(mut self, label: CategoryLabel) -> Self {
        self.disabled.push(label);
        self
    }

    pub fn records(&self) -> Vec<Record> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn debug_lines(&self) -> Vec<String> {
        self.debug_lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LogBackend for RecordingBackend {
    fn is_enabled(&self, severity: Severity, label: Option<CategoryLabel>) -> bool {
        let label_on = label.map_or(true, |label| {
            !self.disabled.iter().any(|off| label.is_descendant_of(*off))
        });
        label_on && severity >= self.min_severity
    }

    fn log(&self, severity: Severity, label: CategoryLabel, message: &SpyMessage<'_>) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Record {
                severity,
                label,
                text: message.to_string(),
                exec_time: message.exec_time(),
                error: message.error().map(|e| e.to_string()),
                debug_enabled: message.debug_enabled(),
            });
    }

    fn debug(&self, message: &str) {
        self.debug_lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

/// A tracing event as seen by [`CaptureLayer`].
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub target: String,
    pub level: Level,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Layer collecting every event it sees.
#[derive(Debug, Clone, Default)]
pub struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureLayer {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let metadata = event.metadata();
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(CapturedEvent {
                target: metadata.target().to_string(),
                level: *metadata.level(),
                fields: visitor.0,
            });
    }
}

#[derive(Default)]
struct FieldVisitor(HashMap<String, String>);

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}
