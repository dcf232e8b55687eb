//! Unit tests for the stub processor API

use std::fs;

use pyi::pyi::config::TargetConfig;
use pyi::pyi::parser::ErrorKind;
use pyi::pyi::processor::stub_sources::StubSources;
use pyi::pyi::processor::{
    available_formats, process_file, process_source, OutputFormat, ProcessingError,
    ProcessingSpec, ProcessingStage,
};

fn spec(format: &str) -> ProcessingSpec {
    ProcessingSpec::from_string(format).unwrap()
}

#[test]
fn test_processing_spec_parsing() {
    let parsed = spec("token-raw-simple");
    assert_eq!(parsed.stage, ProcessingStage::Token);
    assert_eq!(parsed.format, OutputFormat::RawSimple);

    let parsed = spec("ast-treeviz");
    assert_eq!(parsed.stage, ProcessingStage::Ast);
    assert_eq!(parsed.format, OutputFormat::Treeviz);

    assert!(matches!(
        ProcessingSpec::from_string("treeviz"),
        Err(ProcessingError::InvalidFormat(_))
    ));
    assert!(matches!(
        ProcessingSpec::from_string("cst-json"),
        Err(ProcessingError::InvalidStage(_))
    ));
    assert!(matches!(
        ProcessingSpec::from_string("ast-simple"),
        Err(ProcessingError::InvalidFormatType(_))
    ));
}

#[test]
fn test_every_available_format_round_trips_through_its_name() {
    for format in available_formats() {
        assert_eq!(spec(&format).to_string(), format);
    }
}

#[test]
fn test_process_file_treeviz() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mod.pyi");
    fs::write(&path, "import os\nclass C:\n    a: int\nx: bytes\n").unwrap();

    let output = process_file(&path, &spec("ast-treeviz"), &TargetConfig::default()).unwrap();
    assert_eq!(
        output,
        "Module\n├─ Import: import os\n├─ Class: C\n│ └─ Constant: a: int\n└─ Constant: x: bytes\n"
    );
}

#[test]
fn test_process_file_respects_target() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cond.pyi");
    fs::write(
        &path,
        "if sys.platform == 'win32':\n    handle: int\nelse:\n    fd: int\n",
    )
    .unwrap();

    let linux = process_file(&path, &spec("ast-treeviz"), &TargetConfig::default()).unwrap();
    assert!(linux.contains("fd: int"));
    assert!(!linux.contains("handle"));

    let windows = process_file(
        &path,
        &spec("ast-treeviz"),
        &TargetConfig::new("3.8", "win32"),
    )
    .unwrap();
    assert!(windows.contains("handle: int"));
    assert!(!windows.contains("fd"));
}

#[test]
fn test_token_json_is_valid_json() {
    let output = process_source("x: int\n", &spec("token-json"), &TargetConfig::default()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value.as_array().map(|a| a.len()), Some(4));
}

#[test]
fn test_raw_tokens_keep_layout() {
    let output =
        process_source("x: int\n", &spec("token-raw-simple"), &TargetConfig::default()).unwrap();
    assert!(output.contains("<WHITESPACE>"));
    assert!(output.contains("<NEWLINE>\n"));
}

#[test]
fn test_ast_yaml_mentions_definitions() {
    let output =
        process_source("def f() -> int: ...\n", &spec("ast-yaml"), &TargetConfig::default())
            .unwrap();
    assert!(output.contains("definitions:"));
    assert!(output.contains("f"));
}

#[test]
fn test_parse_errors_pass_through() {
    let error = process_source("class\n", &spec("ast-json"), &TargetConfig::default()).unwrap_err();
    match error {
        ProcessingError::Parse(parse_error) => assert_eq!(parse_error.kind, ErrorKind::Syntax),
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn test_token_stage_ignores_grammar_errors() {
    assert!(process_source("class\n", &spec("token-simple"), &TargetConfig::default()).is_ok());
}

#[test]
fn test_missing_file() {
    let result = process_file(
        "/nonexistent/stub.pyi",
        &spec("token-simple"),
        &TargetConfig::default(),
    );
    assert!(matches!(result, Err(ProcessingError::FileNotFound(_))));
}

#[test]
fn test_every_sample_processes_in_every_format() {
    for sample in StubSources::list_samples() {
        for format in available_formats() {
            let result = StubSources::get_processed(sample, &format);
            assert!(result.is_ok(), "{} as {}: {:?}", sample, format, result.err());
        }
    }
}
