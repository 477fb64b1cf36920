//! Progress events emitted by pipeline components.
//!
//! Components never print. They emit [`ReleaseEvent`]s to an [`EventSink`] and
//! the sink decides how (or whether) to render them.

use crate::pipeline::ReleasePhase;
use semver::Version;

/// Something worth telling the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseEvent {
    /// The pipeline entered a new phase
    Phase(ReleasePhase),
    /// A step is about to do something
    Progress(String),
    /// A side effect that dry-run mode skipped
    DryRun {
        /// Equivalent command or call
        command: String,
    },
    /// Changelog text for the pending release
    Changelog(String),
    /// Computed version change
    VersionDelta {
        /// Current published version
        from: Version,
        /// Version about to be released
        to: Version,
    },
    /// Link to the created (or would-be) release
    ReleaseLink(String),
    /// Non-fatal problem
    Warning(String),
}

/// Receiver for [`ReleaseEvent`]s
pub trait EventSink {
    /// Handle one event
    fn emit(&self, event: &ReleaseEvent);

    /// Convenience for [`ReleaseEvent::Progress`]
    fn progress(&self, message: &str) {
        self.emit(&ReleaseEvent::Progress(message.to_string()));
    }

    /// Convenience for [`ReleaseEvent::Warning`]
    fn warning(&self, message: &str) {
        self.emit(&ReleaseEvent::Warning(message.to_string()));
    }

    /// Convenience for [`ReleaseEvent::DryRun`]
    fn dry_run(&self, command: &str) {
        self.emit(&ReleaseEvent::DryRun {
            command: command.to_string(),
        });
    }
}

/// Forwards events to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: &ReleaseEvent) {
        match event {
            ReleaseEvent::Phase(phase) => log::info!("phase: {phase}"),
            ReleaseEvent::Progress(message) => log::info!("{message}"),
            ReleaseEvent::DryRun { command } => log::info!("[dry run] {command}"),
            ReleaseEvent::Changelog(text) => log::info!("changelog:\n{text}"),
            ReleaseEvent::VersionDelta { from, to } => log::info!("version {from} -> {to}"),
            ReleaseEvent::ReleaseLink(link) => log::info!("release: {link}"),
            ReleaseEvent::Warning(message) => log::warn!("{message}"),
        }
    }
}
