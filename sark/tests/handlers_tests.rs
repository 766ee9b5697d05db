use clap::ArgMatches;
use sark::commands::command_argument_builder;
use sark::handlers::*;
use std::path::PathBuf;

fn subcommand_matches(argv: &[&str]) -> ArgMatches {
    let matches = command_argument_builder()
        .try_get_matches_from(argv)
        .expect("argv should parse");
    let (_, sub_matches) = matches.subcommand().expect("subcommand expected");
    sub_matches.clone()
}

#[test]
fn test_parse_target_plain_host() {
    assert_eq!(parse_target("example.com"), Ok("example.com".to_string()));
}

#[test]
fn test_parse_target_strips_scheme_and_trailing_slash() {
    assert_eq!(
        parse_target("https://example.com/"),
        Ok("example.com".to_string())
    );
    assert_eq!(
        parse_target("http://sub.example.com"),
        Ok("sub.example.com".to_string())
    );
}

#[test]
fn test_parse_target_keeps_port() {
    assert_eq!(
        parse_target("example.com:8080"),
        Ok("example.com:8080".to_string())
    );
}

#[test]
fn test_parse_target_rejects_empty() {
    assert!(parse_target("").is_err());
    assert!(parse_target("   ").is_err());
    assert!(parse_target("https://").is_err());
}

#[test]
fn test_parse_target_rejects_spaces() {
    assert!(parse_target("not a host").is_err());
}

#[test]
fn test_validate_output_paths_distinct() {
    let json = PathBuf::from("report.json");
    let html = PathBuf::from("report.html");
    let txt = PathBuf::from("report.txt");
    assert!(validate_output_paths(Some(&json), Some(&html), Some(&txt)).is_ok());
    assert!(validate_output_paths(Some(&json), None, None).is_ok());
    assert!(validate_output_paths(None, None, None).is_ok());
}

#[test]
fn test_validate_output_paths_duplicate() {
    let json = PathBuf::from("report.out");
    let txt = PathBuf::from("report.out");
    let result = validate_output_paths(Some(&json), None, Some(&txt));
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("must all be different"));
}

#[test]
fn test_validate_port_timeout_bounds() {
    assert!(validate_port_timeout(0).is_err());
    assert!(validate_port_timeout(1).is_ok());
    assert!(validate_port_timeout(100).is_ok());
    assert!(validate_port_timeout(101).is_err());
}

#[test]
fn test_validate_subdomain_flags_no_check_requires_db() {
    let result = validate_subdomain_flags(false, true, None, None, false);
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("requires the db option"));
}

#[test]
fn test_validate_subdomain_flags_no_check_excludes_probe_options() {
    let wordlist = PathBuf::from("subs.txt");
    assert!(validate_subdomain_flags(true, true, Some(&wordlist), None, false).is_err());
    assert!(validate_subdomain_flags(true, true, None, Some(&"404".to_string()), false).is_err());
    assert!(validate_subdomain_flags(true, true, None, None, true).is_err());
}

#[test]
fn test_validate_subdomain_flags_accepts_db_no_check() {
    assert!(validate_subdomain_flags(true, true, None, None, false).is_ok());
}

#[test]
fn test_validate_subdomain_flags_accepts_probing_combinations() {
    let wordlist = PathBuf::from("subs.txt");
    assert!(validate_subdomain_flags(false, false, Some(&wordlist), None, true).is_ok());
    assert!(validate_subdomain_flags(true, false, None, None, false).is_ok());
}

#[test]
fn test_output_targets_from_matches() {
    let sub_matches = subcommand_matches(&[
        "sark",
        "dir",
        "-t",
        "example.com",
        "--output-json",
        "out.json",
        "--plain",
    ]);
    let targets = output_targets_from(&sub_matches).unwrap();
    assert_eq!(targets.json, Some(PathBuf::from("out.json")));
    assert_eq!(targets.html, None);
    assert_eq!(targets.txt, None);
    assert!(targets.plain);
    assert!(targets.has_files());
}

#[test]
fn test_output_targets_from_rejects_duplicates() {
    let sub_matches = subcommand_matches(&[
        "sark",
        "dir",
        "-t",
        "example.com",
        "--output-json",
        "same.out",
        "--output-txt",
        "same.out",
    ]);
    assert!(output_targets_from(&sub_matches).is_err());
}

#[test]
fn test_threads_default_is_applied() {
    let sub_matches = subcommand_matches(&["sark", "dir", "-t", "example.com"]);
    assert_eq!(*sub_matches.get_one::<usize>("threads").unwrap(), 10);

    let sub_matches = subcommand_matches(&["sark", "port", "-t", "example.com"]);
    assert_eq!(*sub_matches.get_one::<usize>("threads").unwrap(), 200);
}

#[test]
fn test_user_agent_conflicts_with_random_agent() {
    let result = command_argument_builder().try_get_matches_from([
        "sark",
        "dir",
        "-t",
        "example.com",
        "-u",
        "sark-probe/1.0",
        "--random-agent",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_ports_conflicts_with_common() {
    let result = command_argument_builder().try_get_matches_from([
        "sark",
        "port",
        "-t",
        "example.com",
        "-p",
        "80-90",
        "--common",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_scheme_values_are_restricted() {
    let result = command_argument_builder().try_get_matches_from([
        "sark",
        "dir",
        "-t",
        "example.com",
        "-s",
        "gopher",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_target_is_required() {
    let result = command_argument_builder().try_get_matches_from(["sark", "dns"]);
    assert!(result.is_err());
}
