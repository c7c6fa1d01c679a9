use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/flow.json")
}

#[test]
fn generates_svg_from_json_file() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = fixture();
    assert!(fixture.exists(), "fixture diagram should exist");

    let tmp = tempdir()?;
    let output_path = tmp.path().join("diagram.svg");

    let mut cmd = Command::cargo_bin("oxflow")?;
    cmd.arg("--input")
        .arg(&fixture)
        .arg("--output")
        .arg(&output_path);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("diagram"));

    let svg_contents = fs::read_to_string(&output_path)?;
    assert!(
        svg_contents.contains("<svg"),
        "output should contain an <svg> element"
    );
    assert!(svg_contents.contains("oxflow-edge-freebend"));

    Ok(())
}

#[test]
fn render_subcommand_writes_to_stdout() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("oxflow")?;
    cmd.arg("render")
        .arg("-i")
        .arg(fixture())
        .arg("-o")
        .arg("-")
        .arg("-b")
        .arg("#fafafa");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("fill=\"#fafafa\""))
        .stdout(predicate::str::contains("Is it working?"));

    Ok(())
}

#[test]
fn reads_document_from_stdin() -> Result<(), Box<dyn std::error::Error>> {
    let document = fs::read_to_string(fixture())?;
    let mut cmd = Command::cargo_bin("oxflow")?;
    cmd.write_stdin(document);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("<?xml"));

    Ok(())
}

#[test]
fn quiet_flag_suppresses_messages() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let output_path = tmp.path().join("quiet.svg");

    let mut cmd = Command::cargo_bin("oxflow")?;
    cmd.arg("-i")
        .arg(fixture())
        .arg("-o")
        .arg(&output_path)
        .arg("-q");

    cmd.assert().success().stdout(predicate::str::is_empty());
    assert!(output_path.exists());

    Ok(())
}

#[test]
fn dangling_edges_fail_with_error() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let input = tmp.path().join("broken.json");
    fs::write(
        &input,
        r#"{"nodes": [], "edges": [{"id": "e", "source": "a", "target": "b"}]}"#,
    )?;

    let mut cmd = Command::cargo_bin("oxflow")?;
    cmd.arg("-i").arg(&input).arg("-o").arg("-");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("references missing node"));

    Ok(())
}
