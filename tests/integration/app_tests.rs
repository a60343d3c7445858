use clap::Parser;
use halcyon::cli::Cli;
use halcyon::error::ExitCode;
use halcyon::run_app_with_output;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn fixture() -> TempDir {
    let dir = tempdir().unwrap();
    for name in ["document.txt", "document copy.txt", "document(1).txt", "report.pdf"] {
        File::create(dir.path().join(name))
            .unwrap()
            .write_all(b"0123456789")
            .unwrap();
    }
    dir
}

/// Run with an isolated config file so user settings never leak in.
fn run(dir: &Path, args: &[&str]) -> (anyhow::Result<ExitCode>, String) {
    let config = dir.join("no-such-config.toml");
    let mut argv = vec![
        "halcyon".to_string(),
        "-q".to_string(),
        "--config".to_string(),
        config.to_string_lossy().into_owned(),
    ];
    argv.extend(args.iter().map(|s| s.to_string()));

    let cli = Cli::try_parse_from(argv).unwrap();
    let mut out = Vec::new();
    let result = run_app_with_output(cli, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn test_json_output() {
    let dir = fixture();
    let root = dir.path().to_string_lossy().into_owned();

    let (result, out) = run(dir.path(), &["scan", "-d", &root, "-o", "json"]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["stats"]["total_visited"], 4);
    assert_eq!(json["stats"]["processed"], 4);
    assert_eq!(json["stats"]["skipped"], 0);
    assert_eq!(json["groups"].as_array().unwrap().len(), 1);
    assert_eq!(json["groups"][0]["canonical_name"], "document.txt");
    assert_eq!(json["groups"][0]["files"].as_array().unwrap().len(), 3);
}

#[test]
fn test_json_output_with_extension_filter() {
    let dir = fixture();
    let root = dir.path().to_string_lossy().into_owned();

    let (result, out) = run(
        dir.path(),
        &["scan", "-d", &root, "-e", ".txt", "-c", "false", "-o", "json"],
    );

    assert_eq!(result.unwrap(), ExitCode::Success);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["stats"]["processed"], 3);
    assert_eq!(json["stats"]["skipped"], 1);
}

#[test]
fn test_list_output() {
    let dir = fixture();
    let root = dir.path().to_string_lossy().into_owned();

    let (result, out) = run(dir.path(), &["--no-color", "scan", "-d", &root, "--list"]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(out.contains("Total files: 4"));
    assert!(out.contains("Processed:   4"));
    assert!(out.contains("Skipped:     0"));
    assert!(out.contains("Index"));
    assert!(out.contains("document copy.txt"));
    // Nothing was touched.
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 4);
}

#[test]
fn test_no_duplicates_exit_code() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("only.txt"), b"x").unwrap();
    let root = dir.path().to_string_lossy().into_owned();

    let (result, out) = run(dir.path(), &["scan", "-d", &root, "--list"]);

    assert_eq!(result.unwrap(), ExitCode::NoDuplicates);
    assert!(out.contains("No duplicates found."));
}

#[test]
fn test_missing_directory_is_general_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing").to_string_lossy().into_owned();

    let (result, _) = run(dir.path(), &["scan", "-d", &missing, "--list"]);

    let err = result.unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(format!("{err:#}").contains("failed to access path"));
}

#[test]
fn test_config_init_show_path() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("cfg").join("halcyon.toml");
    let config_arg = config.to_string_lossy().into_owned();

    let parse = |args: &[&str]| {
        let mut argv = vec!["halcyon", "-q", "--config", config_arg.as_str()];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    };

    let mut out = Vec::new();
    run_app_with_output(parse(&["config", "path"]), &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap().trim(), config_arg);

    let mut out = Vec::new();
    run_app_with_output(parse(&["config", "init"]), &mut out).unwrap();
    assert!(config.exists());

    // A second init without --force refuses to overwrite.
    let mut out = Vec::new();
    assert!(run_app_with_output(parse(&["config", "init"]), &mut out).is_err());
    let mut out = Vec::new();
    assert!(run_app_with_output(parse(&["config", "init", "--force"]), &mut out).is_ok());

    let mut out = Vec::new();
    run_app_with_output(parse(&["config", "show"]), &mut out).unwrap();
    let shown = String::from_utf8(out).unwrap();
    assert!(shown.contains("parallel = true"));
    assert!(shown.contains("concurrency = 10"));
}

#[test]
fn test_config_file_drives_scan() {
    let dir = fixture();
    let config = dir.path().join("halcyon.toml");
    fs::write(&config, "extensions = [\".pdf\"]\n").unwrap();
    let root = dir.path().to_string_lossy().into_owned();
    let config_arg = config.to_string_lossy().into_owned();

    let cli = Cli::try_parse_from([
        "halcyon", "-q", "--config", config_arg.as_str(), "scan", "-d", root.as_str(), "-o", "json",
    ])
    .unwrap();
    let mut out = Vec::new();
    let code = run_app_with_output(cli, &mut out).unwrap();

    assert_eq!(code, ExitCode::NoDuplicates);
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    // report.pdf only; the four .txt/.toml files are skipped.
    assert_eq!(json["stats"]["processed"], 1);
    assert_eq!(json["stats"]["skipped"], 4);
}
