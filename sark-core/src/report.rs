// Reporting pipeline: console rows plus optional JSON, HTML and TXT
// sinks, all fed through the asset registry drain so every discovery is
// reported at most once.

use chrono::Utc;
use colored::Colorize;
use sark_scanner::Asset;
use sark_scanner::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Which report bucket a discovery belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKind {
    Port,
    Dns(String),
    Subdomain,
    Dir,
}

/// On-disk shape of the JSON report. Empty buckets are omitted, so a
/// subdomain-only run serializes to just `{"subdomain": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportFile {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub port: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dns: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subdomain: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dir: Vec<String>,
}

impl ReportFile {
    pub fn push(&mut self, value: &str, kind: &RecordKind) {
        match kind {
            RecordKind::Port => self.port.push(value.to_string()),
            RecordKind::Dns(record) => self
                .dns
                .entry(record.clone())
                .or_default()
                .push(value.to_string()),
            RecordKind::Subdomain => self.subdomain.push(value.to_string()),
            RecordKind::Dir => self.dir.push(value.to_string()),
        }
    }

    pub fn total(&self) -> usize {
        self.port.len()
            + self.dns.values().map(Vec::len).sum::<usize>()
            + self.subdomain.len()
            + self.dir.len()
    }
}

/// Where report rows go. File members are `None` when that sink is off.
#[derive(Debug, Clone, Default)]
pub struct OutputTargets {
    pub json: Option<PathBuf>,
    pub html: Option<PathBuf>,
    pub txt: Option<PathBuf>,
    pub plain: bool,
}

impl OutputTargets {
    pub fn has_files(&self) -> bool {
        self.json.is_some() || self.html.is_some() || self.txt.is_some()
    }
}

/// A 404 probe is announced on the console but never written to files.
pub fn is_not_found(status_line: &str) -> bool {
    status_line.starts_with("404")
}

/// Console rendering of one discovery. Plain mode prints the bare key and
/// swallows 404s entirely; the default mode prefixes `[+]FOUND:` and, for
/// a 404, announces the key while withholding the status text. Successful
/// and empty statuses render green, everything else red.
pub fn console_row(key: &str, status_line: &str, plain: bool) -> Option<String> {
    if plain {
        if is_not_found(status_line) {
            return None;
        }
        return Some(key.to_string());
    }
    if is_not_found(status_line) {
        return Some(format!("[+]FOUND: {key} "));
    }
    let styled = if status_line.is_empty() || status_line.starts_with('2') {
        status_line.green()
    } else {
        status_line.red()
    };
    Some(format!("[+]FOUND: {key} {styled}"))
}

pub struct Reporter {
    targets: OutputTargets,
    collected: Mutex<ReportFile>,
}

impl Reporter {
    pub fn new(targets: OutputTargets) -> Self {
        Self {
            targets,
            collected: Mutex::new(ReportFile::default()),
        }
    }

    pub fn plain(&self) -> bool {
        self.targets.plain
    }

    /// Creates (or truncates) every configured output file. JSON and TXT
    /// start empty; HTML gets its document header.
    pub fn init_files(&self, target: &str) -> Result<()> {
        if let Some(path) = &self.targets.json {
            create_with(path, "")?;
        }
        if let Some(path) = &self.targets.txt {
            create_with(path, "")?;
        }
        if let Some(path) = &self.targets.html {
            create_with(path, &html_header(target))?;
        }
        Ok(())
    }

    /// Closes out the HTML document. JSON and TXT need no trailer.
    pub fn finish_files(&self) -> Result<()> {
        if let Some(path) = &self.targets.html {
            append_to(path, "</ul>\n</body>\n</html>\n")?;
        }
        Ok(())
    }

    /// Reports one registry asset: console row first, then the file sinks
    /// unless the status is a 404.
    pub fn emit_asset(&self, asset: &Asset, kind: &RecordKind) -> Result<()> {
        if let Some(row) = console_row(&asset.key, &asset.status_line, self.targets.plain) {
            println!("{row}");
        }
        if is_not_found(&asset.status_line) {
            return Ok(());
        }
        self.record(&asset.key, &asset.status_line, kind)
    }

    pub fn emit_open_port(&self, host: &str, port: u16) -> Result<()> {
        let key = format!("{host}:{port}");
        if self.targets.plain {
            println!("{key}");
        } else {
            println!("[+]FOUND: {} {}", key, "open".green());
        }
        self.record(&key, "open", &RecordKind::Port)
    }

    pub fn emit_dns_record(&self, record: &str, value: &str) -> Result<()> {
        if self.targets.plain {
            println!("{record} {value}");
        } else {
            println!("[+]FOUND: {} {}", record, value.green());
        }
        self.record(value, "", &RecordKind::Dns(record.to_string()))
    }

    /// Snapshot of everything recorded so far, for end-of-run summaries.
    pub fn collected(&self) -> ReportFile {
        self.collected
            .lock()
            .expect("report accumulator poisoned")
            .clone()
    }

    fn record(&self, value: &str, status_line: &str, kind: &RecordKind) -> Result<()> {
        if let Some(path) = &self.targets.json {
            append_json(path, value, kind)?;
        }
        if let Some(path) = &self.targets.html {
            append_to(path, &html_row(value, status_line))?;
        }
        if let Some(path) = &self.targets.txt {
            append_to(path, &format!("{value}\n"))?;
        }
        self.collected
            .lock()
            .expect("report accumulator poisoned")
            .push(value, kind);
        Ok(())
    }
}

fn create_with(path: &Path, contents: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

/// Appends to an already initialized file. A file that cannot be opened
/// is logged and skipped; a failed write on an open file is fatal.
fn append_to(path: &Path, chunk: &str) -> Result<()> {
    let mut file = match OpenOptions::new().append(true).open(path) {
        Ok(file) => file,
        Err(err) => {
            warn!("Skipping append to {}: {}", path.display(), err);
            return Ok(());
        }
    };
    file.write_all(chunk.as_bytes())?;
    Ok(())
}

/// Read-modify-write of the JSON report. The whole document is parsed,
/// the new value pushed into its bucket, and the result rewritten; any
/// read, parse or write failure here is fatal to the run.
fn append_json(path: &Path, value: &str, kind: &RecordKind) -> Result<()> {
    let raw = fs::read_to_string(path)?;
    let mut data: ReportFile = if raw.trim().is_empty() {
        ReportFile::default()
    } else {
        serde_json::from_str(&raw)?
    };
    data.push(value, kind);
    let rendered = serde_json::to_string_pretty(&data)?;
    fs::write(path, rendered)?;
    Ok(())
}

fn html_header(target: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>sark report - {target}</title>\n<style>\n\
         body {{ font-family: monospace; background: #101418; color: #d8dee9; margin: 2em; }}\n\
         h1 {{ color: #bf616a; }}\n\
         li {{ margin: 2px 0; }}\n\
         .status {{ color: #a3be8c; }}\n\
         </style>\n</head>\n<body>\n<h1>sark report</h1>\n\
         <p>Target: {target}</p>\n<p>Generated: {}</p>\n<ul>\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
}

fn html_row(value: &str, status_line: &str) -> String {
    if status_line.is_empty() {
        format!("<li><code>{value}</code></li>\n")
    } else {
        format!("<li><code>{value}</code> <span class=\"status\">{status_line}</span></li>\n")
    }
}
