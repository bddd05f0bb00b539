//! Marker-file detection of a project's language and tooling.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::inspectors::{FileInspector, FileMatcher};
use crate::model::{ProgrammingLanguage, ProjectComponent};

/// Detects the primary language from root-level build files.
///
/// JVM builds count as Kotlin when any `.kt` source exists, Java otherwise.
pub fn detect_language(inspector: &dyn FileInspector) -> ProgrammingLanguage {
    let language = if any_exists(inspector, JVM_BUILD_FILES) {
        if has_files(inspector, &["**/*.kt", "*.kt"]) {
            ProgrammingLanguage::Kotlin
        } else {
            ProgrammingLanguage::Java
        }
    } else if inspector.exists("Package.swift") {
        ProgrammingLanguage::Swift
    } else if inspector.exists("Cargo.toml") {
        ProgrammingLanguage::Rust
    } else if inspector.exists("go.mod") {
        ProgrammingLanguage::Go
    } else if inspector.exists("package.json") {
        if inspector.exists("tsconfig.json") {
            ProgrammingLanguage::TypeScript
        } else {
            ProgrammingLanguage::JavaScript
        }
    } else if any_exists(
        inspector,
        &["pyproject.toml", "requirements.txt", "setup.py", "Pipfile"],
    ) {
        ProgrammingLanguage::Python
    } else if has_files(inspector, &["*.csproj", "*.sln", "**/*.csproj"]) {
        ProgrammingLanguage::CSharp
    } else if inspector.exists("Gemfile") {
        ProgrammingLanguage::Ruby
    } else if inspector.exists("composer.json") {
        ProgrammingLanguage::Php
    } else {
        ProgrammingLanguage::Unknown
    };

    debug!(%language, "Detected project language");
    language
}

/// Builds the [`ProjectComponent`] for the repository rooted at `root`.
pub fn detect_project_component(
    inspector: &dyn FileInspector,
    root: impl Into<PathBuf>,
) -> ProjectComponent {
    let language = detect_language(inspector);
    let mut component = ProjectComponent::new(language, root);
    component.package_manager = detect_package_manager(inspector, language).map(str::to_string);
    component.framework = detect_framework(inspector, language).map(str::to_string);
    component
}

fn detect_package_manager(
    inspector: &dyn FileInspector,
    language: ProgrammingLanguage,
) -> Option<&'static str> {
    use ProgrammingLanguage as L;

    match language {
        L::Java | L::Kotlin => Some(if inspector.exists("pom.xml") {
            "maven"
        } else {
            "gradle"
        }),
        L::JavaScript | L::TypeScript => Some(if inspector.exists("yarn.lock") {
            "yarn"
        } else if inspector.exists("pnpm-lock.yaml") {
            "pnpm"
        } else {
            "npm"
        }),
        L::Python => Some(if inspector.exists("poetry.lock") {
            "poetry"
        } else if inspector.exists("Pipfile") {
            "pipenv"
        } else {
            "pip"
        }),
        L::Swift => Some("swiftpm"),
        L::Rust => Some("cargo"),
        L::Go => Some("go"),
        L::CSharp => Some("nuget"),
        L::Ruby => Some("bundler"),
        L::Php => Some("composer"),
        L::Unknown => None,
    }
}

const JVM_BUILD_FILES: &[&str] = &["pom.xml", "build.gradle", "build.gradle.kts"];
const JVM_FRAMEWORKS: &[(&str, &str)] = &[
    ("com.android", "android"),
    ("spring-boot", "spring-boot"),
    ("io.quarkus", "quarkus"),
];

const NODE_BUILD_FILES: &[&str] = &["package.json"];
const NODE_FRAMEWORKS: &[(&str, &str)] = &[
    ("\"next\"", "next"),
    ("\"react\"", "react"),
    ("\"@angular/core\"", "angular"),
    ("\"vue\"", "vue"),
    ("\"express\"", "express"),
];

const PYTHON_BUILD_FILES: &[&str] = &["pyproject.toml", "requirements.txt"];
const PYTHON_FRAMEWORKS: &[(&str, &str)] = &[
    ("django", "django"),
    ("flask", "flask"),
    ("fastapi", "fastapi"),
];

/// First framework marker found in the language's build files.
fn detect_framework(
    inspector: &dyn FileInspector,
    language: ProgrammingLanguage,
) -> Option<&'static str> {
    use ProgrammingLanguage as L;

    let (files, markers) = match language {
        L::Java | L::Kotlin => (JVM_BUILD_FILES, JVM_FRAMEWORKS),
        L::JavaScript | L::TypeScript => (NODE_BUILD_FILES, NODE_FRAMEWORKS),
        L::Python => (PYTHON_BUILD_FILES, PYTHON_FRAMEWORKS),
        _ => return None,
    };

    files
        .iter()
        .filter_map(|f| inspector.read_file(f).ok())
        .find_map(|content| {
            markers
                .iter()
                .find(|(needle, _)| content.contains(needle))
                .map(|(_, framework)| *framework)
        })
}

fn any_exists(inspector: &dyn FileInspector, paths: &[&str]) -> bool {
    paths.iter().any(|p| inspector.exists(p))
}

fn has_files(inspector: &dyn FileInspector, patterns: &[&str]) -> bool {
    let matcher = match FileMatcher::glob(patterns) {
        Ok(matcher) => matcher,
        Err(e) => {
            warn!(error = %e, "Invalid detector pattern");
            return false;
        }
    };
    match inspector.find_files(&matcher) {
        Ok(mut matches) => matches.next().is_some(),
        Err(e) => {
            warn!(error = %e, "Failed to list files for detection");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::inspectors::{CachedFileInspector, VirtualFileSystem};

    fn inspector(files: &[(&str, &str)]) -> CachedFileInspector<VirtualFileSystem> {
        CachedFileInspector::new(Arc::new(VirtualFileSystem::from_files(files.iter().copied())))
    }

    #[test]
    fn detects_languages_from_markers() {
        let cases: Vec<(Vec<(&str, &str)>, ProgrammingLanguage)> = vec![
            (vec![("pom.xml", "<project/>")], ProgrammingLanguage::Java),
            (
                vec![("build.gradle.kts", ""), ("src/main/kotlin/App.kt", "")],
                ProgrammingLanguage::Kotlin,
            ),
            (vec![("Package.swift", "")], ProgrammingLanguage::Swift),
            (vec![("Cargo.toml", "")], ProgrammingLanguage::Rust),
            (vec![("go.mod", "")], ProgrammingLanguage::Go),
            (
                vec![("package.json", "{}"), ("tsconfig.json", "{}")],
                ProgrammingLanguage::TypeScript,
            ),
            (vec![("package.json", "{}")], ProgrammingLanguage::JavaScript),
            (vec![("requirements.txt", "")], ProgrammingLanguage::Python),
            (vec![("App.csproj", "")], ProgrammingLanguage::CSharp),
            (vec![("Gemfile", "")], ProgrammingLanguage::Ruby),
            (vec![("composer.json", "{}")], ProgrammingLanguage::Php),
            (vec![("README.md", "")], ProgrammingLanguage::Unknown),
        ];
        for (files, expected) in cases {
            assert_eq!(detect_language(&inspector(&files)), expected, "{files:?}");
        }
    }

    #[test]
    fn component_carries_tooling() {
        let inspector = inspector(&[
            ("pom.xml", "<parent><artifactId>spring-boot-starter-parent</artifactId></parent>"),
            ("src/main/java/App.java", ""),
        ]);
        let component = detect_project_component(&inspector, "/repo");
        assert_eq!(component.language, ProgrammingLanguage::Java);
        assert_eq!(component.path, PathBuf::from("/repo"));
        assert_eq!(component.package_manager.as_deref(), Some("maven"));
        assert_eq!(component.framework.as_deref(), Some("spring-boot"));
    }

    #[test]
    fn unknown_has_no_tooling() {
        let component = detect_project_component(&inspector(&[]), ".");
        assert_eq!(component.language, ProgrammingLanguage::Unknown);
        assert!(component.package_manager.is_none());
        assert!(component.framework.is_none());
    }
}
