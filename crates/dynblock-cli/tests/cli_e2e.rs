#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("config")).unwrap();
        Self { dir }
    }

    fn write(&self, name: &str, text: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(cargo_bin("dynblock"));
        cmd.current_dir(self.dir.path())
            .env("DYNBLOCK_CONFIG_DIR", self.dir.path().join("config"))
            .env_remove("RUST_LOG");
        cmd
    }
}

const BEAMS: &str = "ID,Material,Min,Max,Profile\n\
                     1,Steel,0,100,HEA 100\n\
                     2,Steel,100,200,HEA 200\n\
                     3,Timber,0,300,GL24h\n\
                     4,Steel,0,100,HEA 100\n";

#[test]
fn show_prints_rows() {
    let env = Env::new();
    env.write("beams.csv", BEAMS);
    env.cmd()
        .args(["show", "beams.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Material"))
        .stdout(predicate::str::contains("GL24h"))
        .stdout(predicate::str::contains("4 rows"));
}

#[test]
fn show_json_uses_schema_types() {
    let env = Env::new();
    env.write("beams.csv", BEAMS);
    let out = env
        .cmd()
        .args(["show", "beams.csv", "--json", "--schema", "Min:number"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["table_name"], "beams");
    assert_eq!(value["rows"][1]["Min"], 100.0);
    assert_eq!(value["rows"][1]["Max"], "200");
}

#[test]
fn bad_value_for_schema_type_fails() {
    let env = Env::new();
    env.write("bad.csv", "Input,Width\nA,wide\n");
    env.cmd()
        .args(["show", "bad.csv", "--schema", "Width:number"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("Width"));
}

#[test]
fn schema_for_missing_column_fails() {
    let env = Env::new();
    env.write("beams.csv", BEAMS);
    env.cmd()
        .args(["show", "beams.csv", "--schema", "Colour:text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown column 'Colour'"));
}

#[test]
fn duplicates_ignore_the_id_column() {
    let env = Env::new();
    env.write("beams.csv", BEAMS);
    env.cmd()
        .args(["duplicates", "beams.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rows 1, 4"))
        .stdout(predicate::str::contains("1 duplicate groups"));
}

#[test]
fn identity_column_comes_from_local_config() {
    let env = Env::new();
    env.write("keyed.csv", "Key,V\n1,a\n2,a\n");
    env.cmd()
        .args(["duplicates", "keyed.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No duplicate rows"));

    env.write("dynblock.toml", "identity_column = \"Key\"\n");
    env.cmd()
        .args(["duplicates", "keyed.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rows 1, 2"));
}

#[test]
fn optimize_writes_output_file() {
    let env = Env::new();
    env.write("beams.csv", BEAMS);
    env.cmd()
        .args(["optimize", "beams.csv", "-o", "clean.csv"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Removed 1 duplicate row"));

    let clean = fs::read_to_string(env.dir.path().join("clean.csv")).unwrap();
    assert_eq!(clean.lines().count(), 4);
    assert!(!clean.contains("\n4,"));
    // The input is left alone.
    assert_eq!(
        fs::read_to_string(env.dir.path().join("beams.csv")).unwrap(),
        BEAMS
    );
}

#[test]
fn optimize_without_output_prints_csv() {
    let env = Env::new();
    env.write("beams.csv", BEAMS);
    env.cmd()
        .args(["optimize", "beams.csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ID,Material,Min,Max,Profile\n"))
        .stdout(predicate::str::contains("3,Timber,0,300,GL24h"));
}

#[test]
fn range_match_over_two_columns() {
    let env = Env::new();
    env.write("beams.csv", BEAMS);
    env.cmd()
        .args([
            "match",
            "beams.csv",
            "150",
            "--input-col",
            "Min",
            "--input-col",
            "Max",
            "--output-col",
            "Profile",
            "--strategy",
            "range",
        ])
        .assert()
        .success()
        .stdout("Profile = HEA 200\n");
}

#[test]
fn exact_match_falls_back_to_default() {
    let env = Env::new();
    env.write("beams.csv", BEAMS);
    env.cmd()
        .args([
            "match",
            "beams.csv",
            "concrete",
            "--input-col",
            "Material",
            "--output-col",
            "Profile",
            "--default",
            "none",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("none"))
        .stdout(predicate::str::contains("(default)"));
}

#[test]
fn range_match_rejects_text_input() {
    let env = Env::new();
    env.write("beams.csv", BEAMS);
    env.cmd()
        .args([
            "match",
            "beams.csv",
            "wide",
            "--input-col",
            "Min",
            "--input-col",
            "Max",
            "--output-col",
            "Profile",
            "--strategy",
            "range",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("numeric input"));
}

#[test]
fn match_json_reports_row() {
    let env = Env::new();
    env.write("beams.csv", BEAMS);
    let out = env
        .cmd()
        .args([
            "match",
            "beams.csv",
            "tim",
            "--input-col",
            "Material",
            "--output-col",
            "Profile",
            "--strategy",
            "fuzzy",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["outcome"]["outcome"], "matched");
    assert_eq!(value["outcome"]["row"], 2);
    assert_eq!(value["skipped"], serde_json::json!([]));
}

#[test]
fn valid_property_and_value() {
    let env = Env::new();
    env.cmd()
        .args([
            "validate-property",
            "--name",
            "Width",
            "--type",
            "number",
            "--min",
            "10",
            "--max",
            "500",
            "--default",
            "100",
            "--value",
            "250",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Width is valid"))
        .stdout(predicate::str::contains("'250' is valid"));
}

#[test]
fn default_outside_range_is_reported() {
    let env = Env::new();
    env.cmd()
        .args([
            "validate-property",
            "--name",
            "Width",
            "--type",
            "number",
            "--min",
            "10",
            "--max",
            "500",
            "--default",
            "900",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Width is invalid"))
        .stderr(predicate::str::contains("Error: Schema error: invalid property"));
}

#[test]
fn value_outside_allowed_list_fails() {
    let env = Env::new();
    env.cmd()
        .args([
            "validate-property",
            "--name",
            "Grade",
            "--allowed",
            "S235,S355",
            "--value",
            "S460",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("'S460' is invalid"))
        .stderr(predicate::str::contains("column 'Grade' constraint violated"));
}

#[test]
fn config_shows_merged_values() {
    let env = Env::new();
    env.write("config/dynblock.toml", "default_strategy = \"fuzzy\"\n");
    env.write("dynblock.toml", "identity_column = \"Key\"\n");
    env.cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("default_strategy = \"fuzzy\""))
        .stdout(predicate::str::contains("identity_column = \"Key\""));
}

#[test]
fn missing_file_is_an_error() {
    let env = Env::new();
    env.cmd()
        .args(["show", "nope.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
}
