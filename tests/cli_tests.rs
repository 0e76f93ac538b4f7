use clap::Parser;
use drumbrute_pedal::cli::{preselect_port, validate_port, Args};
use std::path::PathBuf;

#[test]
fn test_parse_defaults() {
    let args = Args::parse_from(["drumbrute-pedal"]);
    assert!(!args.device_list);
    assert_eq!(args.input_port, None);
    assert_eq!(args.output_port, None);
    assert!(!args.auto_select);
    assert!(args.interactive());
}

#[test]
fn test_parse_ports_and_paths() {
    let args = Args::parse_from([
        "drumbrute-pedal",
        "--input-port",
        "1",
        "--output-port",
        "3",
        "--db-file-path",
        ":memory:",
        "--log-level",
        "debug",
        "--quiet",
    ]);
    assert_eq!(args.input_port, Some(1));
    assert_eq!(args.output_port, Some(3));
    assert_eq!(args.db_file_path, Some(PathBuf::from(":memory:")));
    assert_eq!(args.log_level.as_deref(), Some("debug"));
    assert!(!args.interactive());
}

#[test]
fn test_auto_select_is_not_interactive() {
    let args = Args::parse_from(["drumbrute-pedal", "--auto-select", "--input-query", "pedal"]);
    assert!(args.auto_select);
    assert_eq!(args.input_query.as_deref(), Some("pedal"));
    assert!(!args.interactive());
}

#[test]
fn test_preselect_order() {
    assert_eq!(preselect_port(Some(2), Some(1), Some(0), false), Some(2));
    assert_eq!(preselect_port(None, Some(1), Some(0), false), Some(1));
    assert_eq!(preselect_port(None, None, Some(0), false), Some(0));
    assert_eq!(preselect_port(None, None, None, false), None);
}

#[test]
fn test_auto_select_uses_query_only() {
    assert_eq!(preselect_port(Some(2), Some(1), Some(0), true), Some(1));
    assert_eq!(preselect_port(Some(2), None, Some(0), true), None);
}

#[test]
fn test_validate_port() {
    let ports = vec!["SINCO Pedal".to_string(), "Arturia DrumBrute".to_string()];

    assert_eq!(validate_port("input", Some(1), &ports), Ok(1));

    let err = validate_port("output", Some(5), &ports).unwrap_err();
    assert!(err.contains("output port 5 not found"));
    assert!(err.contains("1: Arturia DrumBrute"));

    let err = validate_port("input", None, &ports).unwrap_err();
    assert!(err.contains("input port must be set"));
}
