//! File processing API for stub files
//!
//! This module exposes the pipeline at two stages (token, ast) in several formats
//! (simple, json, yaml, treeviz), selected by a `stage-format` string such as
//! `token-simple` or `ast-json`.
//!
//! # Sample Sources
//!
//! The `stub_sources` module gives tests access to the curated sample stubs under
//! `docs/samples/`. Tests should load those rather than inlining large stubs.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use pyi::pyi::processor::stub_sources::StubSources;
//!
//! let content = StubSources::get_string("020-classes.pyi").unwrap();
//! let tree = StubSources::get_processed("020-classes.pyi", "ast-treeviz").unwrap();
//! ```

use std::fs;
use std::path::Path;

use log::debug;
use thiserror::Error;

use crate::pyi::ast::to_treeviz_str;
use crate::pyi::config::TargetConfig;
use crate::pyi::lexer::{lex, tokenize_with_spans, Token};
use crate::pyi::parser::{parse_for_target, ParseError};

/// What part of the pipeline to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    Token,
    Ast,
}

/// How to render it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Simple,
    Json,
    RawSimple,
    RawJson,
    Yaml,
    Treeviz,
}

/// A complete processing specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingSpec {
    pub stage: ProcessingStage,
    pub format: OutputFormat,
}

const AVAILABLE_SPECS: &[ProcessingSpec] = &[
    ProcessingSpec::new(ProcessingStage::Token, OutputFormat::Simple),
    ProcessingSpec::new(ProcessingStage::Token, OutputFormat::Json),
    ProcessingSpec::new(ProcessingStage::Token, OutputFormat::RawSimple),
    ProcessingSpec::new(ProcessingStage::Token, OutputFormat::RawJson),
    ProcessingSpec::new(ProcessingStage::Ast, OutputFormat::Json),
    ProcessingSpec::new(ProcessingStage::Ast, OutputFormat::Yaml),
    ProcessingSpec::new(ProcessingStage::Ast, OutputFormat::Treeviz),
];

impl ProcessingSpec {
    pub const fn new(stage: ProcessingStage, format: OutputFormat) -> Self {
        Self { stage, format }
    }

    /// Parse a format string like "token-simple" or "ast-treeviz"
    pub fn from_string(format_str: &str) -> Result<Self, ProcessingError> {
        let (stage, format) = format_str
            .split_once('-')
            .ok_or_else(|| ProcessingError::InvalidFormat(format_str.to_string()))?;

        let stage = match stage {
            "token" => ProcessingStage::Token,
            "ast" => ProcessingStage::Ast,
            _ => return Err(ProcessingError::InvalidStage(stage.to_string())),
        };

        let format = match format {
            "simple" => OutputFormat::Simple,
            "json" => OutputFormat::Json,
            "raw-simple" => OutputFormat::RawSimple,
            "raw-json" => OutputFormat::RawJson,
            "yaml" => OutputFormat::Yaml,
            "treeviz" => OutputFormat::Treeviz,
            _ => return Err(ProcessingError::InvalidFormatType(format.to_string())),
        };

        let spec = ProcessingSpec { stage, format };
        if !AVAILABLE_SPECS.contains(&spec) {
            return Err(ProcessingError::InvalidFormatType(format!(
                "'{}' is not supported at the {} stage",
                format.name(),
                stage.name()
            )));
        }
        Ok(spec)
    }

    /// Get all available processing specifications
    pub fn available_specs() -> Vec<ProcessingSpec> {
        AVAILABLE_SPECS.to_vec()
    }
}

impl ProcessingStage {
    fn name(self) -> &'static str {
        match self {
            ProcessingStage::Token => "token",
            ProcessingStage::Ast => "ast",
        }
    }
}

impl OutputFormat {
    fn name(self) -> &'static str {
        match self {
            OutputFormat::Simple => "simple",
            OutputFormat::Json => "json",
            OutputFormat::RawSimple => "raw-simple",
            OutputFormat::RawJson => "raw-json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Treeviz => "treeviz",
        }
    }
}

impl std::fmt::Display for ProcessingSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.stage.name(), self.format.name())
    }
}

/// Errors that can occur during processing
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProcessingError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Invalid stage: {0}")]
    InvalidStage(String),
    #[error("Invalid format type: {0}")]
    InvalidFormatType(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Process stub source text according to the given specification
pub fn process_source(
    source: &str,
    spec: &ProcessingSpec,
    target: &TargetConfig,
) -> Result<String, ProcessingError> {
    debug!("processing {} bytes as {}", source.len(), spec);
    match spec.stage {
        ProcessingStage::Token => {
            let tokens: Vec<Token> = match spec.format {
                OutputFormat::RawSimple | OutputFormat::RawJson => tokenize_with_spans(source)
                    .into_iter()
                    .map(|(token, _)| token)
                    .collect(),
                _ => lex(source).into_iter().map(|(token, _)| token).collect(),
            };
            format_tokens(&tokens, spec.format)
        }
        ProcessingStage::Ast => {
            let module = parse_for_target(source, target)?;
            match spec.format {
                OutputFormat::Json => serde_json::to_string_pretty(&module)
                    .map_err(|e| ProcessingError::Serialization(e.to_string())),
                OutputFormat::Yaml => serde_yaml::to_string(&module)
                    .map_err(|e| ProcessingError::Serialization(e.to_string())),
                OutputFormat::Treeviz => Ok(to_treeviz_str(&module)),
                other => Err(ProcessingError::InvalidFormatType(other.name().to_string())),
            }
        }
    }
}

/// Process a stub file according to the given specification
pub fn process_file<P: AsRef<Path>>(
    file_path: P,
    spec: &ProcessingSpec,
    target: &TargetConfig,
) -> Result<String, ProcessingError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(ProcessingError::FileNotFound(file_path.display().to_string()));
    }
    let content =
        fs::read_to_string(file_path).map_err(|e| ProcessingError::IoError(e.to_string()))?;
    process_source(&content, spec, target)
}

/// Format tokens according to the specified format
fn format_tokens(tokens: &[Token], format: OutputFormat) -> Result<String, ProcessingError> {
    match format {
        // The raw stream keeps its own line breaks
        OutputFormat::RawSimple => {
            let mut result = String::new();
            for token in tokens {
                result.push_str(&token.to_string());
                if matches!(token, Token::Newline) {
                    result.push('\n');
                }
            }
            Ok(result)
        }
        OutputFormat::Simple => {
            let lines: Vec<String> = tokens.iter().map(|token| token.to_string()).collect();
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json | OutputFormat::RawJson => serde_json::to_string_pretty(tokens)
            .map_err(|e| ProcessingError::Serialization(e.to_string())),
        other => Err(ProcessingError::InvalidFormatType(format!(
            "{} only works with the ast stage",
            other.name()
        ))),
    }
}

/// Get all available format strings
pub fn available_formats() -> Vec<String> {
    AVAILABLE_SPECS.iter().map(|spec| spec.to_string()).collect()
}

/// Sample sources module for accessing the curated stub files
pub mod stub_sources {
    use super::*;

    /// Available sample files
    pub const AVAILABLE_SAMPLES: &[&str] = &[
        "000-constants.pyi",
        "010-functions.pyi",
        "020-classes.pyi",
        "030-imports-and-typevars.pyi",
        "040-conditions.pyi",
        "050-functional-types.pyi",
    ];

    /// Main interface for accessing sample stubs
    pub struct StubSources;

    impl StubSources {
        fn sample_path(filename: &str) -> String {
            format!("{}/docs/samples/{}", env!("CARGO_MANIFEST_DIR"), filename)
        }

        fn validate_sample(filename: &str) -> Result<(), ProcessingError> {
            if !AVAILABLE_SAMPLES.contains(&filename) {
                return Err(ProcessingError::FileNotFound(format!(
                    "Sample '{}' is not available. Available samples: {:?}",
                    filename, AVAILABLE_SAMPLES
                )));
            }
            Ok(())
        }

        /// Get sample content as raw string
        pub fn get_string(filename: &str) -> Result<String, ProcessingError> {
            Self::validate_sample(filename)?;
            let path = Self::sample_path(filename);
            fs::read_to_string(&path)
                .map_err(|e| ProcessingError::IoError(format!("Failed to read {}: {}", path, e)))
        }

        /// Get sample content processed with the specified format, for the default target
        pub fn get_processed(filename: &str, format: &str) -> Result<String, ProcessingError> {
            Self::validate_sample(filename)?;
            let spec = ProcessingSpec::from_string(format)?;
            process_file(Self::sample_path(filename), &spec, &TargetConfig::default())
        }

        /// List all available sample files
        pub fn list_samples() -> Vec<&'static str> {
            AVAILABLE_SAMPLES.to_vec()
        }
    }

}
