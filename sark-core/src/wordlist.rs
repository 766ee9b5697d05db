// Wordlist-driven probing: forced browsing of paths in directory mode,
// candidate host checks in subdomain mode. Probes flow through the same
// registry and reporter as the crawler, so wordlist and crawl findings
// deduplicate against each other.

use crate::report::{RecordKind, Reporter};
use indicatif::{ProgressBar, ProgressStyle};
use sark_scanner::crawler::{
    REQUEST_TIMEOUT_SECS, build_probe_client, parse_status_code, probe_status,
};
use sark_scanner::{AssetRegistry, ScopeSpec, UserAgentPolicy};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use url::Url;

pub struct ProbeOptions {
    pub ignore: HashSet<u16>,
    pub agent: UserAgentPolicy,
    pub workers: usize,
    pub show_progress: bool,
}

/// Loads a wordlist, skipping blank lines and `#` comments.
pub fn load_wordlist(path: &Path) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read wordlist {}: {}", path.display(), e))?;

    let words: Vec<String> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !line.trim().starts_with('#'))
        .map(|line| line.trim().to_string())
        .collect();

    if words.is_empty() {
        return Err(format!(
            "Wordlist {} is empty or contains only comments",
            path.display()
        ));
    }

    Ok(words)
}

/// The URL a directory-mode word probes: the word appended below the
/// base path.
pub fn build_probe_url(base_url: &str, word: &str) -> Result<String, String> {
    let mut url =
        Url::parse(base_url).map_err(|e| format!("Invalid base URL {:?}: {}", base_url, e))?;

    let current_path = url.path().to_string();
    let path_base = if current_path.ends_with('/') {
        current_path
    } else {
        format!("{}/", current_path)
    };
    let new_path = format!("{}{}", path_base, word.trim_start_matches('/'));
    url.set_path(&new_path);

    Ok(url.to_string())
}

pub fn host_probe_urls(hosts: &[String], scheme: &str) -> Vec<String> {
    hosts
        .iter()
        .map(|host| format!("{}://{}", scheme, host))
        .collect()
}

/// Probes candidate URLs with a fixed worker pool, registering every
/// response that survives the ignore list. Unreachable candidates are
/// dropped quietly; an unparseable status line aborts the run just as it
/// does in the crawler.
pub async fn probe_candidates(
    candidates: Vec<String>,
    options: ProbeOptions,
    scope: Arc<ScopeSpec>,
    registry: Arc<AssetRegistry>,
    reporter: Arc<Reporter>,
    kind: RecordKind,
) -> Result<(), String> {
    let ProbeOptions {
        ignore,
        agent,
        workers,
        show_progress,
    } = options;
    let workers = workers.max(1);
    let total = candidates.len();
    if total == 0 {
        return Ok(());
    }

    let per_request_agent = agent.randomize_per_request();
    let client = Arc::new(
        build_probe_client(&agent, REQUEST_TIMEOUT_SECS)
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?,
    );
    let ignore = Arc::new(ignore);

    let progress = if show_progress {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}/{len} probes")
                .unwrap()
                .progress_chars("=>-"),
        );
        Some(Arc::new(bar))
    } else {
        None
    };

    let per_worker = (total + workers - 1) / workers;
    let mut tasks = Vec::new();

    for worker_id in 0..workers {
        let start = worker_id * per_worker;
        let end = std::cmp::min(start + per_worker, total);
        if start >= total {
            break;
        }
        let chunk = candidates[start..end].to_vec();

        let client = Arc::clone(&client);
        let ignore = Arc::clone(&ignore);
        let scope = Arc::clone(&scope);
        let registry = Arc::clone(&registry);
        let reporter = Arc::clone(&reporter);
        let kind = kind.clone();
        let progress = progress.clone();

        tasks.push(tokio::spawn(async move {
            for url in chunk {
                let outcome = probe_one(
                    &client,
                    &ignore,
                    &scope,
                    &registry,
                    &reporter,
                    &kind,
                    per_request_agent,
                    &url,
                )
                .await;
                if let Some(ref bar) = progress {
                    bar.inc(1);
                }
                outcome?;
            }
            Ok::<(), String>(())
        }));
    }

    for task in tasks {
        task.await.map_err(|e| format!("Worker task failed: {}", e))??;
    }

    if let Some(ref bar) = progress {
        bar.finish_and_clear();
    }
    Ok(())
}

async fn probe_one(
    client: &reqwest::Client,
    ignore: &HashSet<u16>,
    scope: &ScopeSpec,
    registry: &AssetRegistry,
    reporter: &Reporter,
    kind: &RecordKind,
    per_request_agent: bool,
    url: &str,
) -> Result<(), String> {
    let Some(key) = scope.asset_key(url) else {
        return Ok(());
    };
    if registry.present(&key) {
        return Ok(());
    }

    let status_line = match probe_status(client, url, per_request_agent).await {
        Ok(status_line) => status_line,
        Err(err) => {
            debug!("Dropping {}: {}", url, err);
            return Ok(());
        }
    };

    if !ignore.is_empty() {
        let code =
            parse_status_code(&status_line).map_err(|e| format!("Aborting probe run: {}", e))?;
        if ignore.contains(&code) {
            return Ok(());
        }
    }

    registry.add(&key, &status_line);
    registry
        .drain_with(|asset| reporter.emit_asset(asset, kind))
        .map_err(|e| format!("Failed to report {}: {}", key, e))?;
    Ok(())
}
