// Tests for the reporting pipeline: console rows, file sinks and the
// in-memory accumulator.

use colored::Colorize;
use sark_core::report::{
    OutputTargets, RecordKind, ReportFile, Reporter, console_row, is_not_found,
};
use sark_scanner::Asset;
use std::fs;
use tempfile::tempdir;

fn asset(key: &str, status_line: &str) -> Asset {
    Asset {
        key: key.to_string(),
        status_line: status_line.to_string(),
        printed: true,
    }
}

// ============================================================================
// Console Row Tests
// ============================================================================

#[test]
fn test_console_row_success_status_is_green() {
    let row = console_row("http://example.com/admin", "200 OK", false);
    assert_eq!(
        row,
        Some(format!("[+]FOUND: http://example.com/admin {}", "200 OK".green()))
    );
}

#[test]
fn test_console_row_error_status_is_red() {
    let row = console_row("http://example.com/cgi-bin", "500 Internal Server Error", false);
    assert_eq!(
        row,
        Some(format!(
            "[+]FOUND: http://example.com/cgi-bin {}",
            "500 Internal Server Error".red()
        ))
    );
}

#[test]
fn test_console_row_empty_status_is_green() {
    let row = console_row("mail.example.com", "", false);
    assert_eq!(row, Some(format!("[+]FOUND: mail.example.com {}", "".green())));
}

#[test]
fn test_console_row_not_found_withholds_status_text() {
    let row = console_row("http://example.com/missing", "404 Not Found", false);
    assert_eq!(row, Some("[+]FOUND: http://example.com/missing ".to_string()));
}

#[test]
fn test_console_row_plain_prints_bare_key() {
    let row = console_row("http://example.com/admin", "200 OK", true);
    assert_eq!(row, Some("http://example.com/admin".to_string()));
}

#[test]
fn test_console_row_plain_drops_not_found() {
    let row = console_row("http://example.com/missing", "404 Not Found", true);
    assert_eq!(row, None);
}

#[test]
fn test_is_not_found_matches_status_line_prefix() {
    assert!(is_not_found("404 Not Found"));
    assert!(is_not_found("404"));
    assert!(!is_not_found("200 OK"));
    assert!(!is_not_found("403 Forbidden"));
    assert!(!is_not_found(""));
}

// ============================================================================
// Report File Shape Tests
// ============================================================================

#[test]
fn test_report_file_push_routes_to_buckets() {
    let mut file = ReportFile::default();
    file.push("example.com:22", &RecordKind::Port);
    file.push("93.184.216.34", &RecordKind::Dns("A".to_string()));
    file.push("93.184.216.35", &RecordKind::Dns("A".to_string()));
    file.push("mail.example.com", &RecordKind::Dns("MX".to_string()));
    file.push("dev.example.com", &RecordKind::Subdomain);
    file.push("http://example.com/admin", &RecordKind::Dir);

    assert_eq!(file.port, vec!["example.com:22"]);
    assert_eq!(file.dns["A"], vec!["93.184.216.34", "93.184.216.35"]);
    assert_eq!(file.dns["MX"], vec!["mail.example.com"]);
    assert_eq!(file.subdomain, vec!["dev.example.com"]);
    assert_eq!(file.dir, vec!["http://example.com/admin"]);
    assert_eq!(file.total(), 6);
}

#[test]
fn test_report_file_omits_empty_buckets() {
    let mut file = ReportFile::default();
    file.push("dev.example.com", &RecordKind::Subdomain);

    let rendered = serde_json::to_string(&file).unwrap();
    assert_eq!(rendered, r#"{"subdomain":["dev.example.com"]}"#);
}

#[test]
fn test_report_file_parses_partial_document() {
    let file: ReportFile = serde_json::from_str(r#"{"dir":["http://example.com/a"]}"#).unwrap();
    assert_eq!(file.dir, vec!["http://example.com/a"]);
    assert!(file.port.is_empty());
    assert!(file.subdomain.is_empty());
    assert!(file.dns.is_empty());
}

// ============================================================================
// File Sink Tests
// ============================================================================

#[test]
fn test_init_creates_empty_json_and_txt_and_html_header() {
    let dir = tempdir().unwrap();
    let json = dir.path().join("report.json");
    let html = dir.path().join("report.html");
    let txt = dir.path().join("report.txt");
    let reporter = Reporter::new(OutputTargets {
        json: Some(json.clone()),
        html: Some(html.clone()),
        txt: Some(txt.clone()),
        plain: true,
    });

    reporter.init_files("example.com").unwrap();

    assert_eq!(fs::read_to_string(&json).unwrap(), "");
    assert_eq!(fs::read_to_string(&txt).unwrap(), "");
    let header = fs::read_to_string(&html).unwrap();
    assert!(header.starts_with("<!DOCTYPE html>"));
    assert!(header.contains("Target: example.com"));
    assert!(header.ends_with("<ul>\n"));
}

#[test]
fn test_emit_asset_feeds_every_configured_sink() {
    let dir = tempdir().unwrap();
    let json = dir.path().join("report.json");
    let html = dir.path().join("report.html");
    let txt = dir.path().join("report.txt");
    let reporter = Reporter::new(OutputTargets {
        json: Some(json.clone()),
        html: Some(html.clone()),
        txt: Some(txt.clone()),
        plain: true,
    });
    reporter.init_files("example.com").unwrap();

    reporter
        .emit_asset(&asset("http://example.com/admin", "200 OK"), &RecordKind::Dir)
        .unwrap();
    reporter
        .emit_asset(&asset("http://example.com/login", "302 Found"), &RecordKind::Dir)
        .unwrap();
    reporter.finish_files().unwrap();

    let parsed: ReportFile = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(
        parsed.dir,
        vec!["http://example.com/admin", "http://example.com/login"]
    );

    assert_eq!(
        fs::read_to_string(&txt).unwrap(),
        "http://example.com/admin\nhttp://example.com/login\n"
    );

    let html_out = fs::read_to_string(&html).unwrap();
    assert!(html_out.contains("<li><code>http://example.com/admin</code>"));
    assert!(html_out.contains("200 OK"));
    assert!(html_out.ends_with("</ul>\n</body>\n</html>\n"));
}

#[test]
fn test_emit_asset_keeps_not_found_out_of_files() {
    let dir = tempdir().unwrap();
    let json = dir.path().join("report.json");
    let txt = dir.path().join("report.txt");
    let reporter = Reporter::new(OutputTargets {
        json: Some(json.clone()),
        html: None,
        txt: Some(txt.clone()),
        plain: true,
    });
    reporter.init_files("example.com").unwrap();

    reporter
        .emit_asset(
            &asset("http://example.com/missing", "404 Not Found"),
            &RecordKind::Dir,
        )
        .unwrap();

    assert_eq!(fs::read_to_string(&json).unwrap(), "");
    assert_eq!(fs::read_to_string(&txt).unwrap(), "");
    assert_eq!(reporter.collected().total(), 0);
}

#[test]
fn test_json_append_preserves_other_buckets() {
    let dir = tempdir().unwrap();
    let json = dir.path().join("report.json");
    let reporter = Reporter::new(OutputTargets {
        json: Some(json.clone()),
        html: None,
        txt: None,
        plain: true,
    });
    reporter.init_files("example.com").unwrap();
    fs::write(&json, r#"{"port":["example.com:22"]}"#).unwrap();

    reporter
        .emit_asset(&asset("http://example.com/admin", "200 OK"), &RecordKind::Dir)
        .unwrap();

    let parsed: ReportFile = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(parsed.port, vec!["example.com:22"]);
    assert_eq!(parsed.dir, vec!["http://example.com/admin"]);
}

#[test]
fn test_corrupt_json_report_is_fatal() {
    let dir = tempdir().unwrap();
    let json = dir.path().join("report.json");
    let reporter = Reporter::new(OutputTargets {
        json: Some(json.clone()),
        html: None,
        txt: None,
        plain: true,
    });
    reporter.init_files("example.com").unwrap();
    fs::write(&json, "{ this is not json").unwrap();

    let result = reporter.emit_asset(&asset("http://example.com/a", "200 OK"), &RecordKind::Dir);
    assert!(result.is_err());
}

#[test]
fn test_unopenable_txt_sink_is_skipped_not_fatal() {
    let dir = tempdir().unwrap();
    let txt = dir.path().join("no-such-dir").join("report.txt");
    let reporter = Reporter::new(OutputTargets {
        json: None,
        html: None,
        txt: Some(txt),
        plain: true,
    });

    let result = reporter.emit_asset(&asset("http://example.com/a", "200 OK"), &RecordKind::Dir);
    assert!(result.is_ok());
    assert_eq!(reporter.collected().dir, vec!["http://example.com/a"]);
}

// ============================================================================
// Accumulator Tests
// ============================================================================

#[test]
fn test_emit_open_port_records_host_port_pair() {
    let reporter = Reporter::new(OutputTargets {
        plain: true,
        ..OutputTargets::default()
    });

    reporter.emit_open_port("example.com", 22).unwrap();
    reporter.emit_open_port("example.com", 443).unwrap();

    assert_eq!(
        reporter.collected().port,
        vec!["example.com:22", "example.com:443"]
    );
}

#[test]
fn test_emit_dns_record_buckets_by_record_type() {
    let reporter = Reporter::new(OutputTargets {
        plain: true,
        ..OutputTargets::default()
    });

    reporter.emit_dns_record("A", "93.184.216.34").unwrap();
    reporter.emit_dns_record("A", "93.184.216.35").unwrap();
    reporter.emit_dns_record("MX", "mail.example.com.").unwrap();

    let collected = reporter.collected();
    assert_eq!(collected.dns["A"], vec!["93.184.216.34", "93.184.216.35"]);
    assert_eq!(collected.dns["MX"], vec!["mail.example.com."]);
    assert_eq!(collected.total(), 3);
}
