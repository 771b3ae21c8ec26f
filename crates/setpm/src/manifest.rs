//! Editing the root `package.json`.
//!
//! Only the `packageManager` field is touched. Key order, indentation and
//! line endings of the existing file are kept.

use crate::errors::{Error, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use setpm_workspaces::MANIFEST_FILE;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Field holding the `name@version` pin.
pub const PACKAGE_MANAGER_FIELD: &str = "packageManager";

const DEFAULT_INDENT: &str = "  ";

/// A `package.json` loaded for editing.
#[derive(Debug, Clone)]
pub struct PackageJson {
    path: PathBuf,
    fields: Map<String, Value>,
    indent: String,
    crlf: bool,
}

impl PackageJson {
    /// Loads `dir/package.json`, or starts an empty one if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, is not valid
    /// JSON, or is not a JSON object.
    pub fn load_or_create(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No package.json yet, starting empty");
                return Ok(Self {
                    path,
                    fields: Map::new(),
                    indent: DEFAULT_INDENT.to_string(),
                    crlf: false,
                });
            }
            Err(source) => return Err(Error::ManifestRead { path, source }),
        };

        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        let fields = match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => return Err(Error::ManifestNotObject { path }),
            Err(source) => return Err(Error::ManifestParse { path, source }),
        };

        Ok(Self {
            indent: detect_indent(content),
            crlf: content.contains("\r\n"),
            path,
            fields,
        })
    }

    /// Path the manifest is read from and written to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current `packageManager` value, if it is a string.
    #[must_use]
    pub fn package_manager(&self) -> Option<&str> {
        self.fields.get(PACKAGE_MANAGER_FIELD).and_then(Value::as_str)
    }

    /// Sets `packageManager`, keeping its position if already present.
    pub fn set_package_manager(&mut self, value: impl Into<String>) {
        self.fields
            .insert(PACKAGE_MANAGER_FIELD.to_string(), Value::String(value.into()));
    }

    /// Renders the manifest in its original style.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(self.indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.fields
            .serialize(&mut serializer)
            .map_err(|source| Error::ManifestSerialize {
                path: self.path.clone(),
                source,
            })?;

        let mut rendered = String::from_utf8_lossy(&buffer).into_owned();
        rendered.push('\n');
        if self.crlf {
            rendered = rendered.replace('\n', "\r\n");
        }
        Ok(rendered)
    }

    /// Writes the manifest back to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    pub fn save(&self) -> Result<()> {
        let rendered = self.render()?;
        fs::write(&self.path, rendered).map_err(|source| Error::ManifestWrite {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), "Saved package.json");
        Ok(())
    }
}

/// Leading whitespace of the first indented line, or two spaces.
fn detect_indent(content: &str) -> String {
    content
        .lines()
        .skip(1)
        .map(|line| {
            let trimmed = line.trim_start_matches([' ', '\t']);
            &line[..line.len() - trimmed.len()]
        })
        .find(|indent| !indent.is_empty())
        .unwrap_or(DEFAULT_INDENT)
        .to_string()
}
