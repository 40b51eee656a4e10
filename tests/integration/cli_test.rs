//! Integration tests for the command-line front end
//!
//! Tests cover:
//! - Argument parsing into conversion settings
//! - Running each command against files
//! - Writing output files and validation reports
//! - XQuery expressions and the nesting limit flag

use clap::Parser;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use xmlconv::cli::{execute, write_output, Args, CliConfig, Commands};
use xmlconv::conversion::{ColumnTypePolicy, DelimiterType};

fn write_file(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

fn config(args: &[&str]) -> CliConfig {
    let mut argv = vec!["xmlconv"];
    argv.extend_from_slice(args);
    CliConfig::from_args(Args::parse_from(argv)).unwrap()
}

fn run(args: &[&str]) -> (bool, String) {
    let output = execute(&config(args)).unwrap();
    (output.success, output.content)
}

#[cfg(test)]
mod cli_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_csv_flags_reach_conversion_config() {
        let config = config(&[
            "csv",
            "data.csv",
            "--delimiter",
            "pipe",
            "--policy",
            "first-non-null",
            "--null-marker",
            "-",
            "--source",
            "export",
            "--indent",
            "4",
        ]);
        let settings = &config.conversion_config;
        assert_eq!(settings.delimiter, DelimiterType::Pipe);
        assert_eq!(settings.type_policy, ColumnTypePolicy::FirstNonNull);
        assert_eq!(settings.null_markers, vec!["-".to_string()]);
        assert_eq!(settings.source_label, "export");
        assert_eq!(settings.indent_size, 4);
        assert!(matches!(config.args.command, Commands::Csv { .. }));
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let err = CliConfig::from_args(Args::parse_from(["xmlconv", "to-json", "a.xml", "--indent", "9"]))
            .unwrap_err();
        assert_eq!(err.kind_name(), "ConfigurationError");

        let err = CliConfig::from_args(Args::parse_from([
            "xmlconv",
            "from-json",
            "a.json",
            "--item-tag",
            "bad tag",
        ]))
        .unwrap_err();
        assert_eq!(err.kind_name(), "ConfigurationError");

        assert!(Args::try_parse_from(["xmlconv", "csv", "a.csv", "--delimiter", "colon"]).is_err());
    }

    #[test]
    fn test_csv_command() {
        let dir = TempDir::new().unwrap();
        let input = write_file(&dir, "produtos.csv", "Código,Preço\nA1,10.50\n");

        let (success, content) = run(&["csv", &input, "--root", "produtos", "--row", "item"]);
        assert!(success);
        assert!(content.starts_with("<produtos source=\"csv\""));
        assert!(content.contains("<preco data_type=\"decimal\">10.50</preco>"));
    }

    #[test]
    fn test_json_commands() {
        let dir = TempDir::new().unwrap();
        let xml = write_file(&dir, "in.xml", "<cfg><port>80</port><host>a</host></cfg>");

        let (_, json) = run(&["to-json", &xml, "--plain"]);
        assert_eq!(json, r#"{"cfg":{"port":"80","host":"a"}}"#);

        let json_path = write_file(&dir, "in.json", &json);
        let (_, markup) = run(&["from-json", &json_path, "--plain"]);
        assert_eq!(markup, "<cfg><port>80</port><host>a</host></cfg>");

        let (_, declared) = run(&["from-json", &json_path, "--declaration"]);
        assert!(declared.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<cfg>"));
    }

    #[test]
    fn test_query_command() {
        let dir = TempDir::new().unwrap();
        let xml = write_file(&dir, "in.xml", "<r><v>1</v><v>2</v></r>");

        let (_, content) = run(&["query", &xml, "sum(v)"]);
        let report: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(report["xpath"], "sum(v)");
        assert_eq!(report["results"][0], 3);

        let err = execute(&config(&["query", &xml, "v["])).unwrap_err();
        assert_eq!(err.kind_name(), "QueryError");
    }

    #[test]
    fn test_query_command_accepts_xquery() {
        let dir = TempDir::new().unwrap();
        let xml = write_file(&dir, "in.xml", "<r><v>1</v><v>2</v></r>");

        let (_, content) = run(&["query", &xml, "for $v in //v return $v", "--xquery"]);
        let report: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(report["results_count"], 2);
        assert_eq!(report["original_xquery"], "for $v in //v return $v");
        assert_eq!(report["converted_xpath"], "//v");
    }

    #[test]
    fn test_max_depth_flag() {
        let dir = TempDir::new().unwrap();
        let xml = write_file(&dir, "deep.xml", "<a><b><c/></b></a>");

        assert_eq!(config(&["to-json", &xml, "--max-depth", "2"]).conversion_config.max_depth, 2);
        let err = execute(&config(&["to-json", &xml, "--max-depth", "2"])).unwrap_err();
        assert_eq!(err.kind_name(), "ParseError");
        assert!(execute(&config(&["to-json", &xml])).is_ok());
    }

    #[test]
    fn test_schema_and_validate_commands() {
        let dir = TempDir::new().unwrap();
        let xml = write_file(&dir, "in.xml", "<r><n>1</n><n>2</n></r>");

        let (_, xsd) = run(&["schema", &xml, "--namespace", "urn:r"]);
        assert!(xsd.contains("targetNamespace=\"urn:r\""));
        let xsd_path = write_file(&dir, "r.xsd", &xsd);

        let (success, content) = run(&["validate", &xml, "--schema", &xsd_path]);
        assert!(success);
        let report: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(report["valid"], true);

        let bad = write_file(&dir, "bad.xml", "<r><n>one</n></r>");
        let (success, content) = run(&["validate", &bad, "--schema", &xsd_path]);
        assert!(!success);
        let report: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(report["valid"], false);
        assert!(!report["errors"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_validate_without_schema_checks_well_formedness() {
        let dir = TempDir::new().unwrap();
        let good = write_file(&dir, "good.xml", "<a><b/></a>");
        let bad = write_file(&dir, "bad.xml", "<a><b></a>");

        assert!(run(&["validate", &good]).0);
        let (success, content) = run(&["validate", &bad]);
        assert!(!success);
        assert!(content.contains("\"valid\": false"));
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let err = execute(&config(&["to-json", "/no/such/file.xml"])).unwrap_err();
        assert_eq!(err.kind_name(), "IoError");
    }

    #[test]
    fn test_write_output_creates_file() {
        let dir = TempDir::new().unwrap();
        let xml = write_file(&dir, "in.xml", "<a>1</a>");
        let target = dir.path().join("out").join("a.json");
        let target_arg = target.to_string_lossy().into_owned();

        let config = config(&["to-json", &xml, "--plain", "--quiet", "-o", &target_arg]);
        let output = execute(&config).unwrap();
        write_output(&config, &output).unwrap();

        assert!(Path::new(&target).exists());
        assert_eq!(fs::read_to_string(&target).unwrap(), r#"{"a":"1"}"#);
    }
}
