//! Log Event Sink
//!
//! Forwards deploy events to the `log` facade. Used by the CLI in text mode
//! so `-v`/`-vv` show progress without a dedicated renderer.

use crate::domain::ports::{DeployEvent, DeployEventSink};

pub struct LogEventSink;

impl DeployEventSink for LogEventSink {
    fn on_event(&self, event: DeployEvent) {
        match event {
            DeployEvent::Started {
                platform,
                target,
                component_count,
            } => log::info!(
                "deploying {component_count} component(s) to {} ({platform})",
                target.display()
            ),
            DeployEvent::StateChanged { from, to } => log::debug!("state {from} -> {to}"),
            DeployEvent::ComponentStarted { component } => log::debug!("component {component}"),
            DeployEvent::FileWritten {
                path, dry_run: true, ..
            } => log::info!("would write {}", path.display()),
            DeployEvent::FileWritten { path, .. } => log::info!("wrote {}", path.display()),
            DeployEvent::FileSkipped { path, reason, .. } => {
                log::info!("skipped {} ({reason})", path.display())
            }
            DeployEvent::ConflictResolved { path, resolution } => {
                log::debug!("conflict at {}: {resolution:?}", path.display())
            }
            DeployEvent::ComponentFailed { component, error } => {
                log::error!("{component} failed: {error}")
            }
            DeployEvent::RolledBack { restored, removed } => {
                log::warn!("rolled back: {restored} restored, {removed} removed")
            }
            DeployEvent::Completed {
                success,
                files_deployed,
                files_skipped,
                error_count,
            } => log::info!(
                "finished (success={success}): {files_deployed} deployed, {files_skipped} skipped, {error_count} error(s)"
            ),
        }
    }

    fn wants_detailed_events(&self) -> bool {
        log::log_enabled!(log::Level::Info)
    }
}
