//! JSONL output: one [`LogEntry`] per event.
//!
//! Event fields other than `message` land under `fields`. `spans` lists the
//! enclosing spans from outermost to innermost, so a line written inside
//! `watch > resync` reads `"spans":["watch","resync"]`.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::io::Write;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

const MESSAGE_FIELD: &str = "message";

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub service: String,
    pub pid: u32,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub spans: Vec<String>,
}

/// Collects event fields straight into a JSON object.
///
/// Numbers and booleans keep their JSON type; everything else is rendered
/// as a string. Non-finite floats become strings too.
#[derive(Default)]
struct EventFields(Map<String, Value>);

impl EventFields {
    fn put(&mut self, field: &Field, value: impl Into<Value>) {
        self.0.insert(field.name().to_string(), value.into());
    }

    fn into_parts(mut self) -> (String, Map<String, Value>) {
        let message = match self.0.remove(MESSAGE_FIELD) {
            Some(Value::String(text)) => text,
            Some(other) => other.to_string(),
            None => String::new(),
        };
        (message, self.0)
    }
}

impl Visit for EventFields {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        match serde_json::Number::from_f64(value) {
            Some(number) => self.put(field, number),
            None => self.put(field, value.to_string()),
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.put(field, value.to_string());
    }
}

/// Writes every event it sees as a [`LogEntry`] line to `make_writer`.
pub struct JsonLayer<W> {
    service_name: String,
    pid: u32,
    make_writer: W,
}

impl<W> JsonLayer<W> {
    pub fn new(service_name: String, make_writer: W) -> Self {
        Self {
            service_name,
            pid: std::process::id(),
            make_writer,
        }
    }

    fn entry<S>(&self, event: &Event<'_>, ctx: &Context<'_, S>) -> LogEntry
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let mut visitor = EventFields::default();
        event.record(&mut visitor);
        let (message, fields) = visitor.into_parts();

        let spans = ctx
            .event_scope(event)
            .map(|scope| {
                scope
                    .from_root()
                    .map(|span| span.name().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let metadata = event.metadata();
        LogEntry {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level: metadata.level().as_str().to_string(),
            service: self.service_name.clone(),
            pid: self.pid,
            target: metadata.target().to_string(),
            message,
            fields,
            spans,
        }
    }
}

impl<S, W> Layer<S> for JsonLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'writer> MakeWriter<'writer> + 'static,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let entry = self.entry(event, &ctx);
        // write failures are dropped
        let Ok(line) = serde_json::to_string(&entry) else {
            return;
        };
        let _ = writeln!(self.make_writer.make_writer(), "{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FileLogWriter, WriterFactory};
    use tempfile::tempdir;
    use tracing_subscriber::layer::SubscriberExt;

    fn capture(emit: impl FnOnce()) -> Vec<Value> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("client.jsonl");
        let writer = FileLogWriter::new(&path).unwrap();
        let subscriber = tracing_subscriber::registry().with(JsonLayer::new(
            "test-service".to_string(),
            WriterFactory::new(writer),
        ));

        tracing::subscriber::with_default(subscriber, emit);

        std::fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_empty_fields_and_spans_are_omitted() {
        let entry = LogEntry {
            timestamp: "2024-01-15T10:30:00.000Z".to_string(),
            level: "INFO".to_string(),
            service: "jobboard-notify".to_string(),
            pid: 12345,
            target: "board_realtime::client".to_string(),
            message: "Notification socket connected".to_string(),
            fields: Map::new(),
            spans: Vec::new(),
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"service\":\"jobboard-notify\""));
        assert!(json.contains("\"pid\":12345"));
        assert!(!json.contains("\"fields\""));
        assert!(!json.contains("\"spans\""));
    }

    #[test]
    fn test_layer_writes_typed_fields() {
        let lines = capture(|| {
            tracing::warn!(attempt = 2u64, delay_ms = 4500u64, retrying = true, "Scheduling reconnect");
        });

        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line["level"], "WARN");
        assert_eq!(line["service"], "test-service");
        assert_eq!(line["message"], "Scheduling reconnect");
        assert_eq!(line["fields"]["attempt"], 2);
        assert_eq!(line["fields"]["delay_ms"], 4500);
        assert_eq!(line["fields"]["retrying"], true);
        assert!(line["fields"].get("message").is_none());
    }

    #[test]
    fn test_layer_lists_spans_outermost_first() {
        let lines = capture(|| {
            let outer = tracing::info_span!("watch");
            let _outer = outer.enter();
            let inner = tracing::info_span!("resync");
            let _inner = inner.enter();
            tracing::info!(notification_id = %"n1", "Merged page");
        });

        let line = &lines[0];
        assert_eq!(line["spans"], serde_json::json!(["watch", "resync"]));
        assert_eq!(line["fields"]["notification_id"], "n1");
    }
}
