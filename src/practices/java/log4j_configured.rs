//! Checks that a JVM project ships a Log4j configuration file.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use tracing::{debug, warn};

use crate::inspectors::{extension_of, FileInspector, FileMatcher};
use crate::model::{
    PracticeEvaluationResult, PracticeImpact, PracticeMetadata, ProgrammingLanguage,
};
use crate::practices::config_formats::{
    json_top_level_keys, parse_properties, parse_xml_root, yaml_top_level_keys,
};
use crate::practices::practice::language_in;
use crate::practices::{Practice, PracticeContext, PracticeError};

/// Practice key.
pub const KEY: &str = "Java.Log4JConfigured";

const LANGUAGES: &[ProgrammingLanguage] = &[ProgrammingLanguage::Java, ProgrammingLanguage::Kotlin];
const BASE_NAMES: &[&str] = &["log4j", "log4j2"];

type Validator = fn(&str) -> Result<(), String>;

/// Extension to validator table. Matching is limited to these extensions.
const VALIDATORS: &[(&str, Validator)] = &[
    ("xml", validate_xml),
    ("json", validate_json),
    ("yaml", validate_yaml),
    ("yml", validate_yaml),
    ("properties", validate_properties),
];

/// Key prefixes recognised in `.properties` configurations.
const PROPERTY_PREFIXES: &[&str] = &[
    "log4j.",
    "log4j2.",
    "rootLogger",
    "appender",
    "logger",
    "filter",
    "property",
];

/// Exact top-level keys recognised in `.properties` configurations.
const PROPERTY_KEYS: &[&str] = &["status", "name", "dest", "monitorInterval"];

/// `Java.Log4JConfigured`: the repository contains a structurally valid
/// `log4j` / `log4j2` configuration in XML, JSON, YAML or properties form.
pub struct JavaLog4JConfiguredPractice {
    metadata: PracticeMetadata,
    matcher: FileMatcher,
}

impl Default for JavaLog4JConfiguredPractice {
    fn default() -> Self {
        Self::new()
    }
}

impl JavaLog4JConfiguredPractice {
    /// Creates the practice with its default metadata.
    pub fn new() -> Self {
        Self {
            metadata: PracticeMetadata {
                key: KEY.to_string(),
                name: "Use a Log4j Configuration".to_string(),
                impact: PracticeImpact::Medium,
                suggestion: "Add a log4j2.xml (or .json, .yaml, .properties) configuration so \
                             logging levels and appenders are explicit."
                    .to_string(),
                url: "https://logging.apache.org/log4j/2.x/manual/configuration.html".to_string(),
            },
            matcher: FileMatcher::base_names(
                BASE_NAMES.iter().copied(),
                VALIDATORS.iter().map(|(ext, _)| *ext),
            ),
        }
    }

    fn check(&self, ctx: &PracticeContext) -> PracticeEvaluationResult {
        let Some(inspector) = ctx.file_inspector.as_deref() else {
            debug!(
                practice = KEY,
                error = %PracticeError::MissingCollaborator("file_inspector"),
                "Cannot evaluate"
            );
            return PracticeEvaluationResult::Unknown;
        };

        let candidates = match inspector.find_files(&self.matcher) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(practice = KEY, error = %e, "Failed to list candidate files");
                return PracticeEvaluationResult::Unknown;
            }
        };

        for path in candidates {
            match validate_candidate(inspector, &path) {
                Ok(()) => {
                    debug!(practice = KEY, path = %path, "Found Log4j configuration");
                    return PracticeEvaluationResult::Practicing;
                }
                Err(e) => debug!(practice = KEY, error = %e, "Rejected candidate"),
            }
        }

        PracticeEvaluationResult::NotPracticing
    }
}

impl Practice for JavaLog4JConfiguredPractice {
    fn metadata(&self) -> &PracticeMetadata {
        &self.metadata
    }

    fn is_applicable(&self, ctx: &PracticeContext) -> bool {
        language_in(ctx, LANGUAGES)
    }

    fn evaluate<'a>(
        &'a self,
        ctx: &'a PracticeContext,
    ) -> Pin<Box<dyn Future<Output = Result<PracticeEvaluationResult>> + Send + 'a>> {
        Box::pin(async move { Ok(self.check(ctx)) })
    }
}

fn validate_candidate(inspector: &dyn FileInspector, path: &str) -> Result<(), PracticeError> {
    let malformed = |reason: String| PracticeError::MalformedConfiguration {
        path: path.to_string(),
        reason,
    };

    let extension = extension_of(path).unwrap_or_default();
    let validator = VALIDATORS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, validator)| *validator)
        .ok_or_else(|| malformed(format!("no validator for extension '{extension}'")))?;

    let content = inspector
        .read_file(path)
        .map_err(|e| malformed(e.to_string()))?;
    validator(&content).map_err(malformed)
}

fn validate_xml(content: &str) -> Result<(), String> {
    let root = parse_xml_root(content)?;
    let is_configuration = root.local_name.eq_ignore_ascii_case("configuration");

    let log4j2 = root.prefix.is_none() && is_configuration;
    let legacy_prefixed =
        root.prefix.as_deref() == Some("log4j") && root.local_name == "configuration";
    let legacy_doctype = is_configuration
        && root
            .doctype
            .as_deref()
            .is_some_and(|d| d.contains("log4j:configuration"));

    if log4j2 || legacy_prefixed || legacy_doctype {
        Ok(())
    } else {
        let name = match &root.prefix {
            Some(prefix) => format!("{prefix}:{}", root.local_name),
            None => root.local_name,
        };
        Err(format!("root element <{name}> is not a Log4j configuration"))
    }
}

fn validate_json(content: &str) -> Result<(), String> {
    require_key(json_top_level_keys(content)?, "configuration")
}

fn validate_yaml(content: &str) -> Result<(), String> {
    require_key(yaml_top_level_keys(content)?, "Configuration")
}

fn require_key(keys: Vec<String>, expected: &str) -> Result<(), String> {
    if keys.iter().any(|k| k.eq_ignore_ascii_case(expected)) {
        Ok(())
    } else {
        Err(format!("missing top-level '{expected}' key"))
    }
}

fn validate_properties(content: &str) -> Result<(), String> {
    let entries = parse_properties(content)?;
    if entries.is_empty() {
        return Err("no properties defined".to_string());
    }
    if entries.iter().any(|(key, _)| is_log4j_property(key)) {
        Ok(())
    } else {
        Err("no Log4j property keys found".to_string())
    }
}

fn is_log4j_property(key: &str) -> bool {
    PROPERTY_KEYS.contains(&key) || PROPERTY_PREFIXES.iter().any(|p| key.starts_with(p))
}
