//! Practice verdicts and metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Outcome of evaluating a single practice against a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PracticeEvaluationResult {
    /// The project follows the practice.
    Practicing,
    /// The project does not follow the practice.
    NotPracticing,
    /// The practice could not be evaluated (missing collaborator, internal failure).
    Unknown,
}

impl fmt::Display for PracticeEvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Practicing => write!(f, "practicing"),
            Self::NotPracticing => write!(f, "notPracticing"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// How much a practice matters when it is not being followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PracticeImpact {
    /// Strongly recommended.
    High,
    /// Recommended.
    #[default]
    Medium,
    /// Nice to have.
    Small,
    /// Informational only.
    Hint,
    /// Disabled; the practice is skipped entirely.
    Off,
}

impl fmt::Display for PracticeImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Small => write!(f, "small"),
            Self::Hint => write!(f, "hint"),
            Self::Off => write!(f, "off"),
        }
    }
}

impl FromStr for PracticeImpact {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "small" => Ok(Self::Small),
            "hint" => Ok(Self::Hint),
            "off" => Ok(Self::Off),
            other => Err(format!("Unknown practice impact: {other}")),
        }
    }
}

/// Static description of a practice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeMetadata {
    /// Unique practice key (e.g. `Java.Log4JConfigured`).
    pub key: String,
    /// Human-readable name.
    pub name: String,
    /// Default impact when the practice is not followed.
    pub impact: PracticeImpact,
    /// What to do to start following the practice.
    pub suggestion: String,
    /// Documentation link.
    pub url: String,
}
