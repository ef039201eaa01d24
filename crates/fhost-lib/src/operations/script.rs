//! Command scripts: TOML files and line-oriented input.
//!
//! A script file lists raw commands as arrays:
//!
//! ```toml
//! commands = [
//!     ["FILE_UPLOAD", "a.txt", 10],
//!     ["FILE_UPLOAD_AT", "2023-01-01T00:00:00", "b.txt", "20", 60],
//!     ["FILE_SEARCH", ""],
//! ]
//! ```
//!
//! Arguments may be strings, integers or floats; they are stringified before
//! parsing so every argument reaches [`Command::parse`](super::Command::parse)
//! the same way.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("command #{index}: unsupported argument {value}")]
    UnsupportedValue { index: usize, value: String },

    #[error("unterminated quote in line: {0}")]
    UnterminatedQuote(String),
}

#[derive(Debug, Deserialize)]
struct ScriptFile {
    #[serde(default)]
    commands: Vec<Vec<toml::Value>>,
}

/// An ordered list of raw commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub commands: Vec<Vec<String>>,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ScriptError> {
        let file: ScriptFile = toml::from_str(content)?;
        let commands = file
            .commands
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                raw.into_iter()
                    .map(|value| stringify(index, value))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { commands })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

fn stringify(index: usize, value: toml::Value) -> Result<String, ScriptError> {
    match value {
        toml::Value::String(s) => Ok(s),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        other => Err(ScriptError::UnsupportedValue {
            index,
            value: other.to_string(),
        }),
    }
}

/// Split one input line into a raw command.
///
/// Tokens are separated by whitespace; double quotes group a token (so `""`
/// is an empty prefix). Returns `None` for blank lines and `#` comments.
pub fn parse_line(line: &str) -> Result<Option<Vec<String>>, ScriptError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;

    for c in trimmed.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quoted {
        return Err(ScriptError::UnterminatedQuote(trimmed.to_string()));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(Some(tokens))
}
