//! Hook and changelog commands: a literal command line or one derived from a version.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::sync::Arc;

/// Placeholder substituted in command templates
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Function from a version string to a command line
pub type CommandFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A configured command
#[derive(Clone)]
pub enum HookCommand {
    /// Used verbatim
    Literal(String),
    /// Computed from a version string right before execution
    Derived(CommandFn),
}

impl HookCommand {
    /// Literal command line
    pub fn literal(command: impl Into<String>) -> Self {
        HookCommand::Literal(command.into())
    }

    /// Command computed by `f`
    pub fn derived<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        HookCommand::Derived(Arc::new(f))
    }

    /// Command line with every `{version}` replaced
    pub fn template(template: impl Into<String>) -> Self {
        let template = template.into();
        Self::derived(move |version| template.replace(VERSION_PLACEHOLDER, version))
    }

    /// Resolve to the command line to run
    pub fn resolve(&self, version: &str) -> String {
        match self {
            HookCommand::Literal(command) => command.clone(),
            HookCommand::Derived(f) => f(version),
        }
    }
}

impl fmt::Debug for HookCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookCommand::Literal(command) => f.debug_tuple("Literal").field(command).finish(),
            HookCommand::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawHookCommand {
    Literal(String),
    Template { template: String },
}

impl<'de> Deserialize<'de> for HookCommand {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawHookCommand::deserialize(deserializer)? {
            RawHookCommand::Literal(command) => HookCommand::Literal(command),
            RawHookCommand::Template { template } => HookCommand::template(template),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_closure_sees_version() {
        let cmd = HookCommand::derived(|v| format!("git log --merges {v}..HEAD"));
        assert_eq!(cmd.resolve("v1.2.3"), "git log --merges v1.2.3..HEAD");
    }

    #[test]
    fn test_template_replaces_every_placeholder() {
        let cmd = HookCommand::template("echo {version} > VERSION && git tag x{version}");
        assert_eq!(cmd.resolve("2.0.0"), "echo 2.0.0 > VERSION && git tag x2.0.0");
    }

    #[test]
    fn test_literal_ignores_version() {
        assert_eq!(HookCommand::literal("make").resolve("1.0.0"), "make");
    }
}
