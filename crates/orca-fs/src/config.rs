//! Format-agnostic document loading

use crate::{Error, NormalizedPath, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs;

/// Document formats understood by [`ConfigStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
    Yaml,
    /// Flat `KEY=value` lines
    Dotenv,
}

impl Format {
    /// Infer the format from a file path.
    ///
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    /// - `.yaml`, `.yml` -> YAML
    /// - `.env` (or a file literally named `.env`) -> dotenv
    pub fn from_path(path: &NormalizedPath) -> Result<Self> {
        if path.file_name() == Some(".env") {
            return Ok(Self::Dotenv);
        }
        let extension = path.extension().unwrap_or("");
        match extension.to_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "env" => Ok(Self::Dotenv),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Dotenv => "dotenv",
        }
    }
}

/// Loads structured documents from disk.
///
/// Format is detected from the file extension and parsing happens through
/// `serde_json::Value`, so every format yields the same value model.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load and deserialize a document.
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let value = self.load_value(path)?;
        serde_json::from_value(value).map_err(|e| Error::ConfigParse {
            path: path.to_native(),
            format: Format::from_path(path)
                .map(Format::label)
                .unwrap_or("unknown")
                .to_string(),
            message: e.to_string(),
        })
    }

    /// Load a document as a raw JSON value.
    pub fn load_value(&self, path: &NormalizedPath) -> Result<Value> {
        let format = Format::from_path(path)?;
        let native = path.to_native();
        let content = fs::read_to_string(&native).map_err(|e| Error::io(&native, e))?;
        tracing::debug!(%path, format = format.label(), "Loading document");
        self.parse(&content, format).map_err(|message| Error::ConfigParse {
            path: native,
            format: format.label().to_string(),
            message,
        })
    }

    /// Parse document text in the given format.
    pub fn parse(&self, content: &str, format: Format) -> std::result::Result<Value, String> {
        match format {
            Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Format::Yaml => {
                // An empty YAML document is an empty mapping, not null.
                if content.trim().is_empty() {
                    return Ok(Value::Object(Map::new()));
                }
                serde_yaml::from_str(content).map_err(|e| e.to_string())
            }
            Format::Dotenv => parse_dotenv(content).map(Value::Object),
        }
    }
}

/// Parse `KEY=value` lines with dotenv quoting, escaping and comment rules.
///
/// Every value is a string.
fn parse_dotenv(content: &str) -> std::result::Result<Map<String, Value>, String> {
    let mut map = Map::new();
    for entry in dotenvy::from_read_iter(content.as_bytes()) {
        let (key, value) = entry.map_err(|e| e.to_string())?;
        map.insert(key, Value::String(value));
    }
    Ok(map)
}
