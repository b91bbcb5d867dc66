//! Build pipeline state machine

use serde::{Deserialize, Serialize};

/// States a build run moves through
///
/// State transitions:
/// ```text
/// Init → Unpacking → ConfigEmitted → Generating → Placing → Done
///            Any non-terminal state → Failed (on error)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    /// Request accepted, nothing touched yet
    #[default]
    Init,
    /// Nested archives are being extracted into the source directory
    Unpacking,
    /// Classpath synthesized and the build descriptor written
    ConfigEmitted,
    /// The metadata generator is producing the artifact
    Generating,
    /// The generated artifact is being moved into the target directory
    Placing,
    /// Artifact placed and the source directory cleaned up
    Done,
    /// A stage failed; the source directory is preserved
    Failed,
}

impl BuildState {
    /// Check if this state can transition to the target state
    pub fn can_transition_to(&self, target: BuildState) -> bool {
        use BuildState::*;
        matches!(
            (self, target),
            (Init, Unpacking)
                | (Unpacking, ConfigEmitted)
                | (ConfigEmitted, Generating)
                | (Generating, Placing)
                | (Placing, Done)
                | (Init, Failed)
                | (Unpacking, Failed)
                | (ConfigEmitted, Failed)
                | (Generating, Failed)
                | (Placing, Failed)
        )
    }

    /// The state that follows this one on the success path
    pub fn next(&self) -> Option<BuildState> {
        match self {
            BuildState::Init => Some(BuildState::Unpacking),
            BuildState::Unpacking => Some(BuildState::ConfigEmitted),
            BuildState::ConfigEmitted => Some(BuildState::Generating),
            BuildState::Generating => Some(BuildState::Placing),
            BuildState::Placing => Some(BuildState::Done),
            BuildState::Done | BuildState::Failed => None,
        }
    }

    /// Check if the build is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildState::Done | BuildState::Failed)
    }

    /// Get a human-readable description of this state
    pub fn description(&self) -> &'static str {
        match self {
            BuildState::Init => "Build request accepted",
            BuildState::Unpacking => "Extracting nested archives",
            BuildState::ConfigEmitted => "Build descriptor written",
            BuildState::Generating => "Generating bundle artifact",
            BuildState::Placing => "Placing artifact into target directory",
            BuildState::Done => "Build finished",
            BuildState::Failed => "Build failed",
        }
    }
}

impl std::fmt::Display for BuildState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildState::Init => write!(f, "Init"),
            BuildState::Unpacking => write!(f, "Unpacking"),
            BuildState::ConfigEmitted => write!(f, "ConfigEmitted"),
            BuildState::Generating => write!(f, "Generating"),
            BuildState::Placing => write!(f, "Placing"),
            BuildState::Done => write!(f, "Done"),
            BuildState::Failed => write!(f, "Failed"),
        }
    }
}

#[cfg(test)]
#[path = "lifecycle/lifecycle_tests.rs"]
mod lifecycle_tests;
