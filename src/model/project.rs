//! Static facts about the inspected project.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Primary programming language of a project component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProgrammingLanguage {
    /// Java (Maven/Gradle).
    Java,
    /// Kotlin (Gradle Kotlin DSL).
    Kotlin,
    /// Swift (Swift Package Manager).
    Swift,
    /// JavaScript (npm/yarn).
    JavaScript,
    /// TypeScript (npm/yarn with tsconfig).
    TypeScript,
    /// Python (pip/poetry).
    Python,
    /// Go modules.
    Go,
    /// Rust with Cargo.
    Rust,
    /// C# (.NET).
    CSharp,
    /// Ruby (Bundler).
    Ruby,
    /// PHP (Composer).
    Php,
    /// Language could not be detected.
    #[default]
    Unknown,
}

impl fmt::Display for ProgrammingLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Java => "Java",
            Self::Kotlin => "Kotlin",
            Self::Swift => "Swift",
            Self::JavaScript => "JavaScript",
            Self::TypeScript => "TypeScript",
            Self::Python => "Python",
            Self::Go => "Go",
            Self::Rust => "Rust",
            Self::CSharp => "C#",
            Self::Ruby => "Ruby",
            Self::Php => "PHP",
            Self::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

impl FromStr for ProgrammingLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "java" => Ok(Self::Java),
            "kotlin" => Ok(Self::Kotlin),
            "swift" => Ok(Self::Swift),
            "javascript" | "js" => Ok(Self::JavaScript),
            "typescript" | "ts" => Ok(Self::TypeScript),
            "python" | "py" => Ok(Self::Python),
            "go" | "golang" => Ok(Self::Go),
            "rust" => Ok(Self::Rust),
            "csharp" | "c#" => Ok(Self::CSharp),
            "ruby" => Ok(Self::Ruby),
            "php" => Ok(Self::Php),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("Unknown programming language: {other}")),
        }
    }
}

/// A detected component of the inspected project.
///
/// Built once per analysis run by the language detector (or by the caller)
/// and treated as immutable for the lifetime of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProjectComponent {
    /// Primary language of the component.
    pub language: ProgrammingLanguage,
    /// Root path of the component.
    pub path: PathBuf,
    /// Detected framework, if any (e.g. "spring").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    /// Package-manager descriptor file, if any (e.g. "pom.xml").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<String>,
}

impl ProjectComponent {
    /// Creates a component with only a language and a root path.
    pub fn new(language: ProgrammingLanguage, path: impl Into<PathBuf>) -> Self {
        Self {
            language,
            path: path.into(),
            framework: None,
            package_manager: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn language_parses_aliases() {
        assert_eq!("Java".parse(), Ok(ProgrammingLanguage::Java));
        assert_eq!("ts".parse(), Ok(ProgrammingLanguage::TypeScript));
        assert_eq!("c#".parse(), Ok(ProgrammingLanguage::CSharp));
        assert!("cobol".parse::<ProgrammingLanguage>().is_err());
    }

    #[test]
    fn language_serializes_lowercase() {
        let json = serde_json::to_string(&ProgrammingLanguage::Kotlin).unwrap();
        assert_eq!(json, "\"kotlin\"");
    }
}
