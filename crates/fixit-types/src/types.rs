use std::fmt;

use serde::{Deserialize, Serialize};

/// A known fix for an error signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionRecord {
    pub category: String,
    pub solution: String,
}

impl SolutionRecord {
    /// Category marker for answers produced by a completion backend
    pub const AI_GENERATED: &'static str = "AI-generated";

    pub fn new(category: impl Into<String>, solution: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            solution: solution.into(),
        }
    }

    pub fn ai_generated(solution: impl Into<String>) -> Self {
        Self::new(Self::AI_GENERATED, solution)
    }

    pub fn is_ai_generated(&self) -> bool {
        self.category == Self::AI_GENERATED
    }
}

/// Whether a capture pipeline is currently running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Capturing,
}

/// Where a piece of captured text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    Clipboard,
    Stdin,
    Manual,
}

impl fmt::Display for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextSource::Clipboard => "clipboard",
            TextSource::Stdin => "stdin",
            TextSource::Manual => "argument",
        };
        f.write_str(name)
    }
}
