//! JSON Event Sink
//!
//! Outputs deploy events as NDJSON for CI/automation consumption.

use crate::domain::ports::{DeployEvent, DeployEventSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Mutex to ensure thread-safe writes from parallel handlers
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

/// NDJSON representation of one event
pub fn event_json(event: &DeployEvent) -> serde_json::Value {
    match event {
        DeployEvent::Started {
            platform,
            target,
            component_count,
        } => serde_json::json!({
            "event": "start",
            "platform": platform.key(),
            "target": target.display().to_string(),
            "component_count": component_count,
        }),

        DeployEvent::StateChanged { from, to } => serde_json::json!({
            "event": "state",
            "from": from,
            "to": to,
        }),

        DeployEvent::ComponentStarted { component } => serde_json::json!({
            "event": "component_start",
            "component": component.as_str(),
        }),

        DeployEvent::FileWritten {
            component,
            path,
            dry_run,
        } => serde_json::json!({
            "event": if *dry_run { "item_planned" } else { "item_written" },
            "component": component.as_str(),
            "path": path.display().to_string(),
        }),

        DeployEvent::FileSkipped {
            component,
            path,
            reason,
        } => serde_json::json!({
            "event": "item_skipped",
            "component": component.as_str(),
            "path": path.display().to_string(),
            "reason": reason,
        }),

        DeployEvent::ConflictResolved { path, resolution } => serde_json::json!({
            "event": "conflict",
            "path": path.display().to_string(),
            "resolution": resolution,
        }),

        DeployEvent::ComponentFailed { component, error } => serde_json::json!({
            "event": "component_error",
            "component": component.as_str(),
            "error": error,
        }),

        DeployEvent::RolledBack { restored, removed } => serde_json::json!({
            "event": "rollback",
            "restored": restored,
            "removed": removed,
        }),

        DeployEvent::Completed {
            success,
            files_deployed,
            files_skipped,
            error_count,
        } => {
            let status = match (success, error_count) {
                (true, 0) => "success",
                (true, _) => "partial",
                (false, _) => "failed",
            };
            serde_json::json!({
                "event": "complete",
                "status": status,
                "deployed": files_deployed,
                "skipped": files_skipped,
                "errors": error_count,
            })
        }
    }
}

impl DeployEventSink for JsonEventSink {
    fn on_event(&self, event: DeployEvent) {
        self.write_event(event_json(&event));
    }
}
