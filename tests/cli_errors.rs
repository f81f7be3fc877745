#![cfg(feature = "cli")]

use predicates::prelude::*;

fn sample_json() -> serde_json::Value {
    // Noise-free titration of a sample with TA = 2300 umol/kg at 25 °C.
    serde_json::json!({
        "steps": [
            { "volume_ml": 6.3366577299238855, "potential_mv": 214.5629699361242, "temperature_c": 25.0 },
            { "volume_ml": 5.961137977861347, "potential_mv": 208.64700173730859, "temperature_c": 25.0 },
            { "volume_ml": 5.662911095568733, "potential_mv": 202.73103353849297, "temperature_c": 25.0 },
            { "volume_ml": 5.426000785198177, "potential_mv": 196.81506533967735, "temperature_c": 25.0 },
            { "volume_ml": 5.237768862713325, "potential_mv": 190.89909714086173, "temperature_c": 25.0 }
        ],
        "salinity": 35.0,
        "sample_mass_g": 200.0,
        "acid_molarity": 0.1,
        "acid_density": 1.02
    })
}

#[test]
fn cli_fails_without_any_input() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("alkalinity_rs");
    cmd.arg("alkalinity");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Missing titration data"));
}

#[test]
fn cli_reports_alkalinity_from_inline_sample() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("alkalinity_rs");
    cmd.arg("alkalinity")
        .arg("--json")
        .arg("--sample-json")
        .arg(sample_json().to_string());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"alkalinity\""))
        .stdout(predicate::str::contains("\"non-linear\""));
}

#[test]
fn cli_reads_input_document_from_stdin() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("alkalinity_rs");
    let doc = serde_json::json!({
        "sample": sample_json(),
        "options": { "max_iter": 50 }
    })
    .to_string();

    cmd.arg("alkalinity").arg("--input").arg("-").write_stdin(doc);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("TA: 2300.00 umol/kg"));
}

#[test]
fn cli_reports_invalid_json_for_sample_json() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("alkalinity_rs");
    cmd.arg("alkalinity").arg("--sample-json").arg("{not valid json}");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON for --sample-json"));
}

#[test]
fn cli_reports_invalid_json_in_file() {
    use std::fs::File;
    use std::io::Write as _;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let file_path = dir.path().join("bad.json");
    let mut f = File::create(&file_path).unwrap();
    writeln!(f, "this is not json").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("alkalinity_rs");
    cmd.arg("alkalinity").arg("--input").arg(file_path);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON in input document"));
}

#[test]
fn cli_falls_back_to_linear_estimate_when_asked() {
    let doc = serde_json::json!({
        "sample": sample_json(),
        "options": { "max_iter": 1 }
    })
    .to_string();

    let mut strict = assert_cmd::cargo::cargo_bin_cmd!("alkalinity_rs");
    strict.arg("alkalinity").arg("--input").arg("-").write_stdin(doc.clone());
    strict
        .assert()
        .failure()
        .stderr(predicate::str::contains("did not converge"));

    let mut lenient = assert_cmd::cargo::cargo_bin_cmd!("alkalinity_rs");
    lenient
        .arg("alkalinity")
        .arg("--json")
        .arg("--allow-linear-fallback")
        .arg("--input")
        .arg("-")
        .write_stdin(doc);
    lenient
        .assert()
        .success()
        .stdout(predicate::str::contains("\"linear\""));
}

#[test]
fn cli_density_reports_both_equations_of_state() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("alkalinity_rs");
    cmd.args(["density", "--temp", "20", "--salinity", "35", "--teos10"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Seawater (EOS-80): 1024.76"))
        .stdout(predicate::str::contains("Seawater (TEOS-10)"));
}

#[test]
fn cli_density_rejects_negative_salinity() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("alkalinity_rs");
    cmd.args(["density", "--temp", "-1.5", "--salinity", "-2"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Domain error"));
}
