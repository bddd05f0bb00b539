//! File matching by logical base name or glob.

use globset::{Glob, GlobSet, GlobSetBuilder};

use super::InspectorError;

/// Predicate over repository-relative file paths.
#[derive(Debug, Clone)]
pub enum FileMatcher {
    /// Matches files named `<name>.<extension>` in any directory.
    ///
    /// Names compare exactly; extensions compare case-insensitively and are
    /// stored without the leading dot.
    BaseName {
        /// Accepted logical base names (file stem).
        names: Vec<String>,
        /// Accepted extensions.
        extensions: Vec<String>,
    },
    /// Matches any of a set of glob patterns against the full path.
    Glob(GlobSet),
}

impl FileMatcher {
    /// Matcher for a family of configuration files, e.g.
    /// `{log4j, log4j2} × {xml, json}`.
    pub fn base_names<N, E>(names: N, extensions: E) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self::BaseName {
            names: names.into_iter().map(Into::into).collect(),
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Matcher for one or more glob patterns (e.g. `**/*.gradle.kts`).
    pub fn glob(patterns: &[&str]) -> Result<Self, InspectorError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| InspectorError::InvalidPattern {
                pattern: (*pattern).to_string(),
                message: e.to_string(),
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| InspectorError::InvalidPattern {
            pattern: patterns.join(", "),
            message: e.to_string(),
        })?;
        Ok(Self::Glob(set))
    }

    /// Returns whether `path` is accepted.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::BaseName { names, extensions } => {
                let Some((stem, ext)) = split_file_name(path) else {
                    return false;
                };
                let ext = ext.to_lowercase();
                names.iter().any(|n| n == stem) && extensions.iter().any(|e| *e == ext)
            }
            Self::Glob(set) => set.is_match(path),
        }
    }
}

/// Splits the last path segment into `(stem, extension)` at its last dot.
pub(crate) fn split_file_name(path: &str) -> Option<(&str, &str)> {
    let file_name = path.rsplit('/').next()?;
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some((stem, ext))
}

/// Returns the lowercase extension of `path`, if any.
pub fn extension_of(path: &str) -> Option<String> {
    split_file_name(path).map(|(_, ext)| ext.to_lowercase())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn log4j() -> FileMatcher {
        FileMatcher::base_names(["log4j", "log4j2"], [".xml", "json", "YAML"])
    }

    #[test]
    fn base_name_matches_in_any_directory() {
        let m = log4j();
        assert!(m.matches("log4j.xml"));
        assert!(m.matches("src/main/resources/log4j2.json"));
        assert!(m.matches("conf/log4j.yaml"));
    }

    #[test]
    fn base_name_extension_is_case_insensitive() {
        assert!(log4j().matches("log4j2.XML"));
    }

    #[test]
    fn base_name_rejects_other_names_and_extensions() {
        let m = log4j();
        assert!(!m.matches("terrible-naming-convention.xml"));
        assert!(!m.matches("log4j.raml"));
        assert!(!m.matches("log4j"));
        assert!(!m.matches("mylog4j.xml"));
        assert!(!m.matches("log4j.xml/child.txt"));
    }

    #[test]
    fn glob_matches_full_path() {
        let m = FileMatcher::glob(&["**/*.gradle.kts", "pom.xml"]).unwrap();
        assert!(m.matches("app/build.gradle.kts"));
        assert!(m.matches("pom.xml"));
        assert!(!m.matches("build.gradle"));
    }

    #[test]
    fn invalid_glob_is_reported() {
        let err = FileMatcher::glob(&["src/[unclosed"]).unwrap_err();
        assert!(matches!(err, InspectorError::InvalidPattern { .. }));
    }

    #[test]
    fn extension_of_lowercases() {
        assert_eq!(extension_of("a/b/Log4j.YML"), Some("yml".to_string()));
        assert_eq!(extension_of("Makefile"), None);
        assert_eq!(extension_of(".gitignore"), None);
    }

    mod prop {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn unrecognized_stems_never_match(
                stem in "[a-z\\-]{1,20}",
                dir in "([a-z]{1,8}/){0,3}",
            ) {
                prop_assume!(stem != "log4j" && stem != "log4j2");
                let path = format!("{dir}{stem}.xml");
                prop_assert!(!log4j().matches(&path));
            }

            #[test]
            fn recognized_pairs_match_at_any_depth(
                stem in prop_oneof![Just("log4j"), Just("log4j2")],
                ext in prop_oneof![Just("xml"), Just("json"), Just("yaml")],
                dir in "([a-z]{1,8}/){0,3}",
            ) {
                let path = format!("{dir}{stem}.{ext}");
                prop_assert!(log4j().matches(&path));
            }
        }
    }
}
