//! Structural parsing of configuration file formats.
//!
//! Each function checks that the content is well formed for its format and
//! extracts the top-level shape practices key on. Errors are plain
//! descriptions; callers decide whether a malformed file matters.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Root element of an XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlRoot {
    /// Namespace prefix of the root element, if any.
    pub prefix: Option<String>,
    /// Local name of the root element.
    pub local_name: String,
    /// Raw DOCTYPE declaration, if present.
    pub doctype: Option<String>,
}

impl XmlRoot {
    fn from_start(start: &BytesStart<'_>, doctype: Option<String>) -> Result<Self, String> {
        let qualified = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let (prefix, local_name) = match qualified.split_once(':') {
            Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
            None => (None, qualified),
        };

        for attr in start.attributes() {
            attr.map_err(|e| format!("invalid attribute on root element: {e}"))?;
        }

        Ok(Self {
            prefix,
            local_name,
            doctype,
        })
    }
}

/// Parses a whole XML document and returns its root element.
///
/// Fails on syntax errors, mismatched or unclosed tags, multiple roots,
/// text outside the root and documents without any element.
pub fn parse_xml_root(content: &str) -> Result<XmlRoot, String> {
    let mut reader = Reader::from_str(content);
    let mut doctype: Option<String> = None;
    let mut root: Option<XmlRoot> = None;
    let mut depth: usize = 0;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("XML error at byte {}: {e}", reader.buffer_position()))?;
        match event {
            Event::DocType(text) => {
                doctype = Some(String::from_utf8_lossy(&text).trim().to_string());
            }
            Event::Start(start) => {
                if depth == 0 {
                    if root.is_some() {
                        return Err("multiple root elements".to_string());
                    }
                    root = Some(XmlRoot::from_start(&start, doctype.clone())?);
                }
                depth += 1;
            }
            Event::Empty(start) => {
                if depth == 0 {
                    if root.is_some() {
                        return Err("multiple root elements".to_string());
                    }
                    root = Some(XmlRoot::from_start(&start, doctype.clone())?);
                }
            }
            Event::End(_) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| "unexpected closing tag".to_string())?;
            }
            Event::Text(text) if depth == 0 => {
                if !text.iter().all(u8::is_ascii_whitespace) {
                    return Err("text outside of the root element".to_string());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(format!("{depth} unclosed element(s) at end of document"));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

/// Parses JSON and returns the keys of the top-level object.
pub fn json_top_level_keys(content: &str) -> Result<Vec<String>, String> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| format!("invalid JSON: {e}"))?;
    match value {
        serde_json::Value::Object(map) => Ok(map.keys().cloned().collect()),
        other => Err(format!("top-level JSON value is not an object: {other}")),
    }
}

/// Parses YAML and returns the string keys of the top-level mapping.
pub fn yaml_top_level_keys(content: &str) -> Result<Vec<String>, String> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| format!("invalid YAML: {e}"))?;
    match value {
        serde_yaml::Value::Mapping(map) => Ok(map
            .keys()
            .filter_map(|k| k.as_str().map(str::to_string))
            .collect()),
        _ => Err("top-level YAML value is not a mapping".to_string()),
    }
}

/// Parses Java `.properties` text into `(key, value)` pairs.
///
/// Handles `#`/`!` comments, backslash line continuations and the `=`, `:`
/// and whitespace separators. Escapes inside keys are kept verbatim.
pub fn parse_properties(content: &str) -> Result<Vec<(String, String)>, String> {
    let mut entries = Vec::new();
    let mut logical = String::new();
    let mut start_line = 0;

    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        if logical.is_empty() {
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }
            start_line = index + 1;
        }
        if ends_with_continuation(trimmed) {
            logical.push_str(&trimmed[..trimmed.len() - 1]);
            continue;
        }
        logical.push_str(trimmed);
        entries.push(split_property(&logical, start_line)?);
        logical.clear();
    }
    if !logical.is_empty() {
        entries.push(split_property(&logical, start_line)?);
    }

    Ok(entries)
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_property(line: &str, line_number: usize) -> Result<(String, String), String> {
    let mut escaped = false;
    let mut split_at = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\x0c' => {
                split_at = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..split_at];
    if key.is_empty() {
        return Err(format!("line {line_number}: property without a key"));
    }
    if key.chars().any(char::is_control) {
        return Err(format!("line {line_number}: control character in key"));
    }

    let rest = line[split_at..].trim_start_matches([' ', '\t', '\x0c']);
    let rest = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(':'))
        .unwrap_or(rest);
    let value = rest.trim_start_matches([' ', '\t', '\x0c']);

    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn xml_root_with_prefix_and_doctype() {
        let root = parse_xml_root(
            r#"<!DOCTYPE log4j:configuration SYSTEM "log4j.dtd">
<log4j:configuration debug="true" xmlns:log4j='http://jakarta.apache.org/log4j/'>
  <root><priority value="debug"/></root>
</log4j:configuration>"#,
        )
        .unwrap();
        assert_eq!(root.prefix.as_deref(), Some("log4j"));
        assert_eq!(root.local_name, "configuration");
        assert!(root.doctype.unwrap().contains("log4j:configuration"));
    }

    #[test]
    fn xml_self_closing_root() {
        let root =
            parse_xml_root(r#"<?xml version="1.0"?><Configuration status="WARN"/>"#).unwrap();
        assert_eq!(root.prefix, None);
        assert_eq!(root.local_name, "Configuration");
    }

    #[test]
    fn xml_rejects_broken_documents() {
        assert!(parse_xml_root("<Configuration><Appenders></Configuration>").is_err());
        assert!(parse_xml_root("<Configuration>").is_err());
        assert!(parse_xml_root("<a/><b/>").is_err());
        assert!(parse_xml_root("just text").is_err());
        assert!(parse_xml_root("").is_err());
    }

    #[test]
    fn json_keys() {
        let keys = json_top_level_keys(r#"{"configuration": {"status": "error"}}"#).unwrap();
        assert_eq!(keys, vec!["configuration"]);
        assert!(json_top_level_keys("[1, 2]").is_err());
        assert!(json_top_level_keys("{not json").is_err());
    }

    #[test]
    fn yaml_keys() {
        let keys = yaml_top_level_keys("Configuration:\n  status: warn\n").unwrap();
        assert_eq!(keys, vec!["Configuration"]);
        assert!(yaml_top_level_keys("- a\n- b\n").is_err());
        assert!(yaml_top_level_keys("key: [unclosed").is_err());
    }

    #[test]
    fn properties_separators_and_comments() {
        let entries = parse_properties(concat!(
            "# comment\n",
            "! also comment\n",
            "\n",
            "status = error\n",
            "name:PropertiesConfig\n",
            "appender.console.type Console\n",
        ))
        .unwrap();
        assert_eq!(
            entries,
            vec![
                ("status".to_string(), "error".to_string()),
                ("name".to_string(), "PropertiesConfig".to_string()),
                ("appender.console.type".to_string(), "Console".to_string()),
            ]
        );
    }

    #[test]
    fn properties_continuation_lines() {
        let entries = parse_properties("log4j.rootLogger=INFO, \\\n    stdout\n").unwrap();
        assert_eq!(
            entries,
            vec![("log4j.rootLogger".to_string(), "INFO, stdout".to_string())]
        );
    }

    #[test]
    fn properties_escaped_separator_stays_in_key() {
        let entries = parse_properties("a\\=b = c").unwrap();
        assert_eq!(entries, vec![("a\\=b".to_string(), "c".to_string())]);
    }

    #[test]
    fn properties_without_key_are_rejected() {
        let err = parse_properties("status = ok\n= orphan value\n").unwrap_err();
        assert!(err.contains("line 2"));
    }
}
