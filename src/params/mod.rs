//! Flat key-value parameter files.
//!
//! Both the factory defaults and the user configuration are plain text files
//! of `key = "value"` lines with `#` comments:
//!
//! ```text
//! # NSX Username
//! nsx_username = "admin"
//! ```
//!
//! [`ParamFile`] parses one such file, preserving entry order, and exposes
//! required-key lookups that fail with the file and key name so the operator
//! knows exactly what to fix. [`TemplateWriter`] produces the annotated files
//! written by `reset-defaults` and `reset-config`.

pub mod templates;

use crate::error::{Error, ErrorContext, Result};
use indexmap::IndexMap;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, warn};

pub use templates::{Template, TemplateItem};

/// A parsed key-value parameter file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamFile {
    /// Name used in error messages (usually the file path)
    source: String,
    /// Entries in file order
    entries: IndexMap<String, String>,
}

impl ParamFile {
    /// Load and parse a parameter file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ParamFileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let params = Self::parse(path.display().to_string(), &content)?;
        debug!(file = %path.display(), entries = params.len(), "Loaded parameter file");
        Ok(params)
    }

    /// Parse parameter text. `source` names the input in error messages.
    pub fn parse(source: impl Into<String>, content: &str) -> Result<Self> {
        let source = source.into();
        let mut entries = IndexMap::new();

        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(Error::ParamSyntax {
                    file: source,
                    line: idx + 1,
                    message: format!("expected 'key = \"value\"', found '{line}'"),
                });
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(Error::ParamSyntax {
                    file: source,
                    line: idx + 1,
                    message: "empty key".to_string(),
                });
            }

            let value = unquote(value.trim());
            if entries.insert(key.to_string(), value.to_string()).is_some() {
                warn!(file = %source, key, "Duplicate parameter, last value wins");
            }
        }

        Ok(Self { source, entries })
    }

    /// Name of the file this was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Get a value if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Get a value that must be present.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| Error::MissingParam {
            file: self.source.clone(),
            key: key.to_string(),
        })
    }

    /// Get a required value as an owned string.
    pub fn string(&self, key: &str) -> Result<String> {
        self.require(key).map(str::to_string)
    }

    /// Get a required value parsed as `u32`.
    pub fn require_u32(&self, key: &str) -> Result<u32> {
        let value = self.require(key)?;
        value
            .parse()
            .map_err(|_| Error::invalid_param(&self.source, key, value, "expected a non-negative integer"))
    }

    /// Get a required network prefix length (0..=32).
    pub fn require_prefix(&self, key: &str) -> Result<u8> {
        let value = self.require(key)?;
        match value.parse::<u8>() {
            Ok(prefix) if prefix <= 32 => Ok(prefix),
            _ => Err(Error::invalid_param(
                &self.source,
                key,
                value,
                "expected a prefix length between 0 and 32",
            )),
        }
    }

    /// Get a required boolean-ish flag (`true`, `yes`, `y`, `1`).
    pub fn require_bool(&self, key: &str) -> Result<bool> {
        let value = self.require(key)?;
        match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Ok(true),
            "false" | "no" | "n" | "0" => Ok(false),
            _ => Err(Error::invalid_param(
                &self.source,
                key,
                value,
                "expected true or false",
            )),
        }
    }

    /// True when the value is `yes` or `y` (any case). Missing keys are an error.
    pub fn is_affirmative(&self, key: &str) -> Result<bool> {
        let value = self.require(key)?.to_ascii_lowercase();
        Ok(value == "yes" || value == "y")
    }

    /// Iterate over entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the file had no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Drop one pair of surrounding double quotes.
///
/// Only a balanced pair is removed. A value with a quote on one side only, or
/// quotes inside it, is kept verbatim so a password such as `"pa"ss"` loses
/// just its outer pair.
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Renders annotated parameter files.
#[derive(Debug, Default)]
pub struct TemplateWriter {
    buf: String,
}

impl TemplateWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a comment, an optional example and (when `key` is non-empty)
    /// the `key = "value"` line.
    pub fn entry(&mut self, key: &str, value: &str, comment: &str, example: Option<&str>) {
        let _ = write!(self.buf, "\n# {comment}\n");
        if let Some(example) = example {
            let _ = writeln!(self.buf, "# Example: {example}");
        }
        if !key.is_empty() {
            let _ = writeln!(self.buf, "{key} = \"{value}\"");
        }
    }

    /// Emit a ruled section header.
    pub fn header(&mut self, title: &str) {
        let rule = "-".repeat(79);
        let _ = write!(self.buf, "\n#{rule}\n# {title}\n#{rule}\n");
    }

    /// Render a whole template.
    pub fn render(mut self, template: &Template) -> String {
        self.entry("", "", &format!("{}\n", template.title), None);
        for item in &template.items {
            match item {
                TemplateItem::Section(title) => self.header(title),
                TemplateItem::Entry {
                    key,
                    value,
                    comment,
                    example,
                } => self.entry(key, value, comment, *example),
            }
        }
        self.buf
    }
}

/// Write `template` to `path`, replacing any existing file.
pub fn write_template(path: impl AsRef<Path>, template: &Template) -> Result<()> {
    let path = path.as_ref();
    let content = TemplateWriter::new().render(template);
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(file = %path.display(), title = template.title, "Wrote parameter template");
    Ok(())
}
