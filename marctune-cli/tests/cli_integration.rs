//! Integration tests for the marctune CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to get the path to a test fixture
fn fixture_path(name: &str) -> String {
    format!("tests/fixtures/{}", name)
}

fn marctune() -> Command {
    let mut cmd = Command::cargo_bin("marctune").unwrap();
    cmd.env_remove("MARCTUNE_OUTPUT_DIR")
        .env_remove("MARCTUNE_CONFIG");
    cmd
}

fn chunk_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_split_by_records() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("chunks");

    marctune()
        .arg("split")
        .arg(fixture_path("sample.xml"))
        .arg("--records")
        .arg("2")
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 3 records to 2 chunk(s)"));

    assert_eq!(
        chunk_names(&output),
        vec!["marc_chunk_001.xml", "marc_chunk_002.xml"]
    );
    let first = fs::read_to_string(output.join("marc_chunk_001.xml")).unwrap();
    assert!(first.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<collection>\n"));
    assert!(first.contains(r#"<record xmlns="http://www.loc.gov/MARC21/slim">"#));
    assert!(first.contains("O segredo de Luísa /"));
    assert!(first.ends_with("</collection>\n"));

    let second = fs::read_to_string(output.join("marc_chunk_002.xml")).unwrap();
    assert!(second.contains(">0003<"));
    assert!(!second.contains(">0001<"));
}

#[test]
fn test_split_output_dir_from_env() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("from-env");

    marctune()
        .env("MARCTUNE_OUTPUT_DIR", &output)
        .arg("split")
        .arg(fixture_path("sample.xml"))
        .arg("--prefix")
        .arg("lc_")
        .arg("--width")
        .arg("5")
        .assert()
        .success();

    assert_eq!(chunk_names(&output), vec!["lc_00001.xml"]);
}

#[test]
fn test_split_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("from-config");
    let config = temp_dir.path().join("marctune.toml");
    fs::write(
        &config,
        format!(
            "[split]\noutput_dir = {:?}\nthreshold = {{ records = 1 }}\nstart_index = 10\n",
            output.display().to_string()
        ),
    )
    .unwrap();

    marctune()
        .arg("--config")
        .arg(&config)
        .arg("split")
        .arg(fixture_path("sample.xml"))
        .assert()
        .success();

    assert_eq!(
        chunk_names(&output),
        vec!["marc_chunk_010.xml", "marc_chunk_011.xml", "marc_chunk_012.xml"]
    );
}

#[test]
fn test_split_directory_continues_numbering() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("input");
    fs::create_dir(&input).unwrap();
    fs::copy(fixture_path("sample.xml"), input.join("a.xml")).unwrap();
    fs::copy(fixture_path("prefixed.xml"), input.join("b.xml")).unwrap();
    fs::write(input.join("readme.txt"), "ignored").unwrap();
    let output = temp_dir.path().join("out");

    marctune()
        .arg("split")
        .arg(&input)
        .arg("--records")
        .arg("2")
        .arg("--tag")
        .arg("{http://www.loc.gov/MARC21/slim}record")
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 5 records to 3 chunk(s)"));

    let second = fs::read_to_string(output.join("marc_chunk_002.xml")).unwrap();
    assert!(second.contains(">0003<"));
    assert!(second.contains(">0101<"));
    assert!(!second.contains("not a MARC record"));
}

#[test]
fn test_split_recovers_from_malformed_fragment() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out");

    marctune()
        .arg("split")
        .arg(fixture_path("malformed.xml"))
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 records to 1 chunk(s)"))
        .stdout(predicate::str::contains("Skipped 1 malformed fragment(s)"));

    let chunk = fs::read_to_string(output.join("marc_chunk_001.xml")).unwrap();
    assert!(chunk.contains(">0001<"));
    assert!(chunk.contains(">0002<"));
    assert!(!chunk.contains("broken"));
}

#[test]
fn test_split_strict_fails_on_malformed_fragment() {
    let temp_dir = TempDir::new().unwrap();

    marctune()
        .arg("split")
        .arg(fixture_path("malformed.xml"))
        .arg("--strict")
        .arg("-o")
        .arg(temp_dir.path().join("out"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to split"));
}

#[test]
fn test_split_missing_input() {
    let temp_dir = TempDir::new().unwrap();

    marctune()
        .arg("split")
        .arg("tests/fixtures/missing.xml")
        .arg("-o")
        .arg(temp_dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_split_zero_threshold_rejected() {
    marctune()
        .arg("split")
        .arg(fixture_path("sample.xml"))
        .arg("--bytes")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than 0"));
}

#[test]
fn test_prepare_jsonl() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("dataset.jsonl");

    marctune()
        .arg("prepare")
        .arg(fixture_path("sample.xml"))
        .arg("--docs")
        .arg(fixture_path("manual.txt"))
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote 4 examples (3 records, 1 passages)"));

    let content = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);

    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    let text = first["text"].as_str().unwrap();
    assert!(text.starts_with("<|im_start|>user\n"));
    assert!(text.contains("O segredo de Luísa / / Fernando Dolabela."));
    assert!(text.contains("Autor: Dolabela, Fernando\n"));
    assert!(text.contains("Ano: 2008.\n"));
    assert!(text.contains("=245  10$aO segredo de Luísa /$cFernando Dolabela."));
    assert!(lines[0].contains("Luísa"));

    let last: serde_json::Value = serde_json::from_str(lines[3]).unwrap();
    assert!(last["text"]
        .as_str()
        .unwrap()
        .contains("Explique as regras de catalogação MARC"));
}

#[test]
fn test_prepare_max_records_to_stdout() {
    marctune()
        .arg("prepare")
        .arg(fixture_path("sample.xml"))
        .arg("-n")
        .arg("1")
        .arg("--format")
        .arg("text")
        .assert()
        .success()
        .stdout(predicate::str::contains("--- example 1 ---"))
        .stdout(predicate::str::contains("--- example 2 ---").not());
}

#[test]
fn test_prompt() {
    marctune()
        .arg("prompt")
        .arg("--title")
        .arg("O segredo de Luísa")
        .arg("--author")
        .arg("Dolabela, Fernando")
        .arg("--year")
        .arg("2008")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<|im_start|>user\n"))
        .stdout(predicate::str::contains("Título completo: O segredo de Luísa"))
        .stdout(predicate::str::ends_with("<|im_start|>assistant\n"));
}

#[test]
fn test_format_file() {
    marctune()
        .arg("format")
        .arg(fixture_path("generated.mrk"))
        .assert()
        .success()
        .stdout(predicate::str::contains("245 10 |aO segredo de Luísa / |cFernando Dolabela."))
        .stdout(predicate::str::contains("650 _4 |aEmpreendedorismo"))
        .stdout(predicate::str::contains("001  0001"));
}

#[test]
fn test_format_stdin() {
    marctune()
        .arg("format")
        .write_stdin("=260  \\\\$aSão Paulo\n")
        .assert()
        .success()
        .stdout("260 __ |aSão Paulo\n");
}

#[test]
fn test_generate_and_validate_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("marctune.toml");

    marctune()
        .arg("generate-config")
        .arg("-o")
        .arg(&config)
        .assert()
        .success();

    marctune()
        .arg("--config")
        .arg(&config)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_validate_invalid_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("bad.toml");
    fs::write(&config, "[split]\nthreshold = { records = 0 }\n").unwrap();

    marctune()
        .arg("validate")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Configuration is invalid"));
}

#[test]
fn test_generated_template_usable() {
    let temp_dir = TempDir::new().unwrap();
    let template = temp_dir.path().join("training.toml");

    marctune()
        .arg("generate-config")
        .arg("--template")
        .arg("-o")
        .arg(&template)
        .assert()
        .success();

    marctune()
        .arg("validate")
        .arg("--template")
        .arg(&template)
        .assert()
        .success()
        .stdout(predicate::str::contains("full_title"));
}
