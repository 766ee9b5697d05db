// Tests for ignored-status flag parsing.

use sark_core::ignore::parse_ignore_list;

#[test]
fn test_single_code() {
    let codes = parse_ignore_list("404").unwrap();
    assert_eq!(codes.len(), 1);
    assert!(codes.contains(&404));
}

#[test]
fn test_comma_separated_codes() {
    let codes = parse_ignore_list("404,500, 302").unwrap();
    assert_eq!(codes.len(), 3);
    assert!(codes.contains(&404));
    assert!(codes.contains(&500));
    assert!(codes.contains(&302));
}

#[test]
fn test_class_expands_to_hundred_codes() {
    let codes = parse_ignore_list("4**").unwrap();
    assert_eq!(codes.len(), 100);
    assert!(codes.contains(&400));
    assert!(codes.contains(&404));
    assert!(codes.contains(&499));
    assert!(!codes.contains(&500));
}

#[test]
fn test_class_and_literal_mix() {
    let codes = parse_ignore_list("5**,404").unwrap();
    assert_eq!(codes.len(), 101);
    assert!(codes.contains(&404));
    assert!(codes.contains(&503));
}

#[test]
fn test_overlapping_entries_deduplicate() {
    let codes = parse_ignore_list("4**,404,404").unwrap();
    assert_eq!(codes.len(), 100);
}

#[test]
fn test_rejects_code_outside_http_range() {
    assert!(parse_ignore_list("99").is_err());
    assert!(parse_ignore_list("600").is_err());
    assert!(parse_ignore_list("0").is_err());
}

#[test]
fn test_rejects_class_outside_http_range() {
    assert!(parse_ignore_list("0**").is_err());
    assert!(parse_ignore_list("6**").is_err());
    assert!(parse_ignore_list("9**").is_err());
}

#[test]
fn test_rejects_garbage_entries() {
    let result = parse_ignore_list("4xx");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Invalid status code"));

    let result = parse_ignore_list("abc**");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Invalid status class"));

    assert!(parse_ignore_list("404,,500").is_err());
    assert!(parse_ignore_list("").is_err());
}
