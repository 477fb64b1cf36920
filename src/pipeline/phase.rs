//! Release pipeline states.

use std::fmt;

/// Where a release run currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleasePhase {
    /// Nothing has run yet
    Init,
    /// Branch and working tree checks passed
    Guarded,
    /// Current and next versions are known
    VersionResolved,
    /// Operator approved the release
    Confirmed,
    /// Pre-release hook finished
    PreHooked,
    /// Version bumped, committed and tagged
    Bumped,
    /// Branch and tags pushed
    Pushed,
    /// Remote release created
    Published,
    /// Post-release hook finished
    PostHooked,
    /// Release completed successfully
    Done,
    /// A step failed
    Failed,
}

impl ReleasePhase {
    /// Phases a successful run passes through, in order
    pub const SEQUENCE: [ReleasePhase; 10] = [
        ReleasePhase::Init,
        ReleasePhase::Guarded,
        ReleasePhase::VersionResolved,
        ReleasePhase::Confirmed,
        ReleasePhase::PreHooked,
        ReleasePhase::Bumped,
        ReleasePhase::Pushed,
        ReleasePhase::Published,
        ReleasePhase::PostHooked,
        ReleasePhase::Done,
    ];

    /// True once no further transition can happen
    pub fn is_terminal(self) -> bool {
        matches!(self, ReleasePhase::Done | ReleasePhase::Failed)
    }

    /// True for phases at or after the first repository mutation
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            ReleasePhase::Bumped
                | ReleasePhase::Pushed
                | ReleasePhase::Published
                | ReleasePhase::PostHooked
        )
    }

    /// Human-readable label
    pub fn as_str(self) -> &'static str {
        match self {
            ReleasePhase::Init => "init",
            ReleasePhase::Guarded => "guarded",
            ReleasePhase::VersionResolved => "version resolved",
            ReleasePhase::Confirmed => "confirmed",
            ReleasePhase::PreHooked => "pre-release hook",
            ReleasePhase::Bumped => "bumped",
            ReleasePhase::Pushed => "pushed",
            ReleasePhase::Published => "published",
            ReleasePhase::PostHooked => "post-release hook",
            ReleasePhase::Done => "done",
            ReleasePhase::Failed => "failed",
        }
    }
}

impl fmt::Display for ReleasePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_starts_at_init_and_ends_done() {
        assert_eq!(ReleasePhase::SEQUENCE[0], ReleasePhase::Init);
        assert_eq!(ReleasePhase::SEQUENCE[9], ReleasePhase::Done);
        assert!(!ReleasePhase::SEQUENCE.contains(&ReleasePhase::Failed));
    }

    #[test]
    fn test_terminal_phases() {
        assert!(ReleasePhase::Done.is_terminal());
        assert!(ReleasePhase::Failed.is_terminal());
        assert!(!ReleasePhase::Published.is_terminal());
    }
}
