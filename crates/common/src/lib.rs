//! Common types and utilities for proto-client-gen
//!
//! This crate contains the shared error type, the closed set of target
//! languages, and the naming conventions used across the protoc driver,
//! the rewrite passes, and the CLI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while driving code generation
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not locate plugin or tool: {0}")]
    PluginNotFound(String),

    #[error("Compiler invocation failed ({status}): {command}")]
    CompilerInvocationFailed { command: String, status: String },

    #[error("Expected exactly one package declaration: {0}")]
    AmbiguousPackageDeclaration(String),

    #[error("Destination already exists: {0}")]
    DestinationConflict(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// A client-library target language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Csharp,
    Go,
    Java,
    Php,
    Python,
    Ruby,
}

impl Language {
    /// All supported target languages
    pub const ALL: [Language; 6] = [
        Language::Csharp,
        Language::Go,
        Language::Java,
        Language::Php,
        Language::Python,
        Language::Ruby,
    ];

    /// The token protoc uses for this language, as in `--<token>_out`
    pub fn token(&self) -> &'static str {
        match self {
            Language::Csharp => "csharp",
            Language::Go => "go",
            Language::Java => "java",
            Language::Php => "php",
            Language::Python => "python",
            Language::Ruby => "ruby",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Language {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csharp" | "c#" => Ok(Language::Csharp),
            "go" | "golang" => Ok(Language::Go),
            "java" => Ok(Language::Java),
            "php" => Ok(Language::Php),
            "python" | "py" => Ok(Language::Python),
            "ruby" => Ok(Language::Ruby),
            other => Err(PipelineError::InvalidInput(format!(
                "unknown language: {other}"
            ))),
        }
    }
}

/// Canonical name for an API; used for output directories and package names
pub fn api_name(organization: &str, short_name: &str, version: &str) -> String {
    format!("{organization}-{short_name}-{version}")
}

/// Root directory for one language's generated package:
/// `<output_dir>/<api_name>-gen-<language>`
pub fn pkg_root_dir(output_dir: &Path, api_name: &str, language: Language) -> PathBuf {
    output_dir.join(format!("{api_name}-gen-{language}"))
}
